//! CSRF guard
//!
//! State-changing auth requests must carry `X-Requested-With: XMLHttpRequest`.
//! Browsers do not attach custom headers to cross-site form posts, and a
//! cross-origin `fetch` that sets one triggers a CORS preflight the server
//! will not approve for foreign origins.
//!
//! This is a header-presence check, not a per-session token.

use axum::http::HeaderMap;

/// Header carrying the CSRF marker
pub const CSRF_HEADER: &str = "x-requested-with";

/// Required marker value
pub const CSRF_HEADER_VALUE: &str = "XMLHttpRequest";

#[derive(Debug, Clone, Copy, Default)]
pub struct CsrfGuard;

impl CsrfGuard {
    pub fn is_valid(headers: &HeaderMap) -> bool {
        headers
            .get(CSRF_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(|value| value == CSRF_HEADER_VALUE)
            .unwrap_or(false)
    }
}
