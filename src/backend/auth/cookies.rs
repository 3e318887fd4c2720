/**
 * Credential Store (cookie layer)
 *
 * Session credentials travel only as cookies:
 *
 * | Cookie          | Path              | Max-Age | Flags                                   |
 * |-----------------|-------------------|---------|-----------------------------------------|
 * | `session`       | `/`               | 900     | HttpOnly, SameSite=Lax, Secure in prod  |
 * | `refresh_token` | auth route prefix | 604800  | HttpOnly, SameSite=Lax, Secure in prod  |
 *
 * The refresh cookie is scoped to the auth routes so the browser only sends
 * the long-lived credential to the endpoints that can use it.
 */

use std::sync::Mutex;
use tower_cookies::cookie::time::Duration;
use tower_cookies::cookie::SameSite;
use tower_cookies::{Cookie, Cookies};

use crate::backend::auth::tokens::{IssuedToken, ACCESS_TOKEN_TTL_SECS, REFRESH_TOKEN_TTL_SECS};
use crate::shared::config::Environment;

/// Access credential cookie name
pub const ACCESS_COOKIE: &str = "session";

/// Refresh credential cookie name
pub const REFRESH_COOKIE: &str = "refresh_token";

/// Default mount point of the auth routes
pub const DEFAULT_AUTH_PREFIX: &str = "/api/auth";

/// Cookie attributes for the two session cookies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookiePolicy {
    secure: bool,
    refresh_path: String,
}

impl Default for CookiePolicy {
    fn default() -> Self {
        Self::new(Environment::Development, DEFAULT_AUTH_PREFIX)
    }
}

impl CookiePolicy {
    /// # Arguments
    /// * `environment` - `Secure` is set only in production
    /// * `refresh_path` - path the refresh cookie is scoped to
    pub fn new(environment: Environment, refresh_path: impl Into<String>) -> Self {
        Self {
            secure: environment.is_production(),
            refresh_path: refresh_path.into(),
        }
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }

    pub fn refresh_path(&self) -> &str {
        &self.refresh_path
    }

    pub fn access_cookie(&self, token: String) -> Cookie<'static> {
        self.build(ACCESS_COOKIE, token, "/".to_string(), ACCESS_TOKEN_TTL_SECS)
    }

    pub fn refresh_cookie(&self, token: String) -> Cookie<'static> {
        self.build(REFRESH_COOKIE, token, self.refresh_path.clone(), REFRESH_TOKEN_TTL_SECS)
    }

    /// Expired `session` cookie with the matching path
    pub fn access_removal(&self) -> Cookie<'static> {
        let mut cookie = self.access_cookie(String::new());
        cookie.make_removal();
        cookie
    }

    /// Expired `refresh_token` cookie with the matching path
    pub fn refresh_removal(&self) -> Cookie<'static> {
        let mut cookie = self.refresh_cookie(String::new());
        cookie.make_removal();
        cookie
    }

    fn build(&self, name: &'static str, value: String, path: String, max_age_secs: i64) -> Cookie<'static> {
        let mut cookie = Cookie::new(name, value);
        cookie.set_http_only(true);
        cookie.set_secure(self.secure);
        cookie.set_same_site(SameSite::Lax);
        cookie.set_path(path);
        cookie.set_max_age(Duration::seconds(max_age_secs));
        cookie
    }
}

/// Get/set/clear for the two session credentials
pub trait CredentialStore: Send + Sync {
    fn set_access(&self, token: &IssuedToken);

    fn set_refresh(&self, token: &IssuedToken);

    fn get_access(&self) -> Option<String>;

    fn get_refresh(&self) -> Option<String>;

    /// Remove both credentials. Always succeeds.
    fn clear_all(&self);
}

/// Credential store over the per-request `tower_cookies` jar
#[derive(Clone)]
pub struct CookieCredentialStore {
    cookies: Cookies,
    policy: CookiePolicy,
}

impl CookieCredentialStore {
    pub fn new(cookies: Cookies, policy: CookiePolicy) -> Self {
        Self { cookies, policy }
    }

    fn read(&self, name: &str) -> Option<String> {
        self.cookies
            .get(name)
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty())
    }
}

impl CredentialStore for CookieCredentialStore {
    fn set_access(&self, token: &IssuedToken) {
        self.cookies.add(self.policy.access_cookie(token.token.clone()));
    }

    fn set_refresh(&self, token: &IssuedToken) {
        self.cookies.add(self.policy.refresh_cookie(token.token.clone()));
    }

    fn get_access(&self) -> Option<String> {
        self.read(ACCESS_COOKIE)
    }

    fn get_refresh(&self) -> Option<String> {
        self.read(REFRESH_COOKIE)
    }

    fn clear_all(&self) {
        // Removal cookies are added rather than `remove`d so a Set-Cookie is
        // emitted even when the request carried no cookie.
        self.cookies.add(self.policy.access_removal());
        self.cookies.add(self.policy.refresh_removal());
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct MemoryJar {
    access: Option<String>,
    refresh: Option<String>,
    clears: usize,
}

/// In-process credential store for tests and non-HTTP callers
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    jar: Mutex<MemoryJar>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with raw cookie values, as if sent by a browser
    pub fn with_tokens(access: Option<String>, refresh: Option<String>) -> Self {
        Self {
            jar: Mutex::new(MemoryJar {
                access,
                refresh,
                clears: 0,
            }),
        }
    }

    /// Number of times `clear_all` has run
    pub fn clear_count(&self) -> usize {
        self.with_jar(|jar| jar.clears)
    }

    fn with_jar<R>(&self, f: impl FnOnce(&mut MemoryJar) -> R) -> R {
        let mut guard = self.jar.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard)
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn set_access(&self, token: &IssuedToken) {
        self.with_jar(|jar| jar.access = Some(token.token.clone()));
    }

    fn set_refresh(&self, token: &IssuedToken) {
        self.with_jar(|jar| jar.refresh = Some(token.token.clone()));
    }

    fn get_access(&self) -> Option<String> {
        self.with_jar(|jar| jar.access.clone())
    }

    fn get_refresh(&self) -> Option<String> {
        self.with_jar(|jar| jar.refresh.clone())
    }

    fn clear_all(&self) {
        self.with_jar(|jar| {
            jar.access = None;
            jar.refresh = None;
            jar.clears += 1;
        });
    }
}
