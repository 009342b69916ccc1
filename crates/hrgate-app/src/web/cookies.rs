//! Session cookie plumbing and the route guard's path rules.
//!
//! Cookies are built as raw Set-Cookie strings; attributes match what the
//! login flow issues: HttpOnly, SameSite=Lax, Path=/, 24h lifetime, Secure
//! only in production.

use axum::http::HeaderMap;

use hrgate_types::{SESSION_COOKIE, SESSION_COOKIE_MAX_AGE};

/// Set-Cookie value establishing a session
pub fn session_cookie(token: &str, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE, token, SESSION_COOKIE_MAX_AGE
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Set-Cookie value clearing the session (Max-Age=0 expires it immediately)
pub fn expired_session_cookie(secure: bool) -> String {
    let mut cookie = format!(
        "{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0",
        SESSION_COOKIE
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Pull the session token out of the request's Cookie header
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get("cookie")?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        if name == SESSION_COOKIE && !value.is_empty() {
            Some(value.to_string())
        } else {
            None
        }
    })
}

/// Paths reachable without a session: the login page, the health probe, and
/// the auth endpoints themselves, except /me which reports on the session
pub fn is_public_path(path: &str) -> bool {
    path == "/login"
        || path == "/api/health"
        || (path.starts_with("/api/auth/") && !path.ends_with("/me"))
}
