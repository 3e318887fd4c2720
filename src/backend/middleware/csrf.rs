//! CSRF middleware
//!
//! Applied as a `route_layer` on the POST auth routes. Safe methods pass
//! through so the layer can sit on a mixed router without breaking `GET`.

use axum::extract::Request;
use axum::http::Method;
use axum::middleware::Next;
use axum::response::Response;

use crate::backend::auth::csrf::CsrfGuard;
use crate::backend::error::AuthError;

pub async fn csrf_guard(request: Request, next: Next) -> Result<Response, AuthError> {
    let safe = matches!(*request.method(), Method::GET | Method::HEAD | Method::OPTIONS);
    if !safe && !CsrfGuard::is_valid(request.headers()) {
        tracing::warn!(
            "CSRF check failed for {} {}",
            request.method(),
            request.uri().path()
        );
        return Err(AuthError::Csrf);
    }
    Ok(next.run(request).await)
}
