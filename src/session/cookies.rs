use axum_extra::extract::cookie::{Cookie, Key, SameSite};
use sha2::{Digest, Sha512};

use crate::config::SecretString;

/// Session cookie name derived from the application name.
pub fn cookie_name(app_name: &str) -> String {
    format!("{}_session_id", app_name)
}

/// Signing key for the session cookie.
///
/// The secret is stretched through SHA-512 so any configured length yields the
/// 64 bytes of key material the cookie jar needs.
pub fn signing_key(secret: &SecretString) -> Key {
    let digest = Sha512::digest(secret.expose().as_bytes());
    Key::from(digest.as_slice())
}

pub(super) fn session_cookie(
    name: &str,
    session_id: &str,
    ttl: chrono::Duration,
    secure: bool,
) -> Cookie<'static> {
    Cookie::build((name.to_string(), session_id.to_string()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::seconds(ttl.num_seconds()))
        .build()
}

/// Already-expired cookie that makes the browser drop its session cookie.
pub(super) fn clear_session_cookie(name: &str) -> Cookie<'static> {
    let mut cookie = Cookie::build((name.to_string(), ""))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .build();
    cookie.make_removal();
    cookie
}
