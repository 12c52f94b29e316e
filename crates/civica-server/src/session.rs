// SPDX-License-Identifier: Apache-2.0

//! Stateless sessions and flash notices, both carried in cookies.
//!
//! The session cookie is `<payload>.<signature>` where the payload is
//! URL-safe base64 of the serialized identity plus an expiry, and the
//! signature is HMAC-SHA256 over the payload under the server secret.
//! Tampering with either half invalidates the cookie. Flash notices are
//! a separate unsigned cookie: written on redirect, surfaced and cleared
//! by the next page read.

use axum::http::{HeaderMap, HeaderValue};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use civica_model::Identity;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::time::Duration;

pub const SESSION_COOKIE: &str = "civica_session";
pub const FLASH_COOKIE: &str = "civica_flash";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionClaims {
    identity: Identity,
    expires_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashNotice {
    pub kind: String,
    pub message: String,
}

impl FlashNotice {
    #[must_use]
    pub fn new(kind: &str, message: impl Into<String>) -> Self {
        Self {
            kind: kind.to_string(),
            message: message.into(),
        }
    }
}

fn sign(secret: &str, payload: &str) -> Option<String> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(payload.as_bytes());
    Some(hex::encode(mac.finalize().into_bytes()))
}

fn signature_matches(secret: &str, payload: &str, signature: &str) -> bool {
    let Ok(raw) = hex::decode(signature) else {
        return false;
    };
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(payload.as_bytes());
    mac.verify_slice(&raw).is_ok()
}

/// `Set-Cookie` value establishing a session for `identity`.
pub fn issue_session_cookie(
    identity: &Identity,
    secret: &str,
    ttl: Duration,
) -> Option<HeaderValue> {
    let claims = SessionClaims {
        identity: identity.clone(),
        expires_at: Utc::now().timestamp() + ttl.as_secs() as i64,
    };
    let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).ok()?);
    let signature = sign(secret, &payload)?;
    HeaderValue::from_str(&format!(
        "{SESSION_COOKIE}={payload}.{signature}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        ttl.as_secs()
    ))
    .ok()
}

/// `Set-Cookie` value that drops the session.
#[must_use]
pub fn clear_session_cookie() -> HeaderValue {
    HeaderValue::from_static("civica_session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    let raw = headers.get("cookie")?.to_str().ok()?;
    raw.split(';').find_map(|pair| {
        let (k, v) = pair.trim().split_once('=')?;
        (k == name).then_some(v)
    })
}

/// Decode and verify the session cookie. Returns `None` for absent,
/// malformed, tampered, or expired cookies alike.
#[must_use]
pub fn decode_session(headers: &HeaderMap, secret: &str) -> Option<Identity> {
    let value = cookie_value(headers, SESSION_COOKIE)?;
    let (payload, signature) = value.rsplit_once('.')?;
    if !signature_matches(secret, payload, signature) {
        return None;
    }
    let claims: SessionClaims =
        serde_json::from_slice(&URL_SAFE_NO_PAD.decode(payload).ok()?).ok()?;
    if claims.expires_at <= Utc::now().timestamp() {
        return None;
    }
    Some(claims.identity)
}

/// `Set-Cookie` value queuing a notice across the next redirect.
pub fn flash_cookie(notice: &FlashNotice) -> Option<HeaderValue> {
    let encoded = URL_SAFE_NO_PAD.encode(serde_json::to_vec(notice).ok()?);
    HeaderValue::from_str(&format!("{FLASH_COOKIE}={encoded}; Path=/; Max-Age=60")).ok()
}

#[must_use]
pub fn clear_flash_cookie() -> HeaderValue {
    HeaderValue::from_static("civica_flash=; Path=/; Max-Age=0")
}

/// The pending notice, if any. The caller clears the cookie with
/// [`clear_flash_cookie`] when it surfaces the notice.
#[must_use]
pub fn pending_flash(headers: &HeaderMap) -> Option<FlashNotice> {
    let value = cookie_value(headers, FLASH_COOKIE)?;
    serde_json::from_slice(&URL_SAFE_NO_PAD.decode(value).ok()?).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use civica_model::Role;

    fn identity() -> Identity {
        Identity {
            user_id: 7,
            username: "alice".to_string(),
            role: Role::student(),
            email: "a@x.com".to_string(),
            is_admin: false,
        }
    }

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("cookie", HeaderValue::from_str(value).expect("cookie"));
        headers
    }

    fn session_value(secret: &str, ttl: Duration) -> String {
        let cookie = issue_session_cookie(&identity(), secret, ttl).expect("issue");
        let raw = cookie.to_str().expect("ascii");
        raw.split(';').next().expect("pair").to_string()
    }

    #[test]
    fn session_round_trips() {
        let cookie = session_value("secret-key", Duration::from_secs(60));
        let headers = headers_with_cookie(&cookie);
        let decoded = decode_session(&headers, "secret-key").expect("decode");
        assert_eq!(decoded, identity());
    }

    #[test]
    fn tampered_payload_or_signature_is_rejected() {
        let cookie = session_value("secret-key", Duration::from_secs(60));
        let headers = headers_with_cookie(&format!("{cookie}x"));
        assert!(decode_session(&headers, "secret-key").is_none());

        let wrong_secret = headers_with_cookie(&cookie);
        assert!(decode_session(&wrong_secret, "other-secret").is_none());
    }

    #[test]
    fn expired_session_is_rejected() {
        let cookie = session_value("secret-key", Duration::ZERO);
        let headers = headers_with_cookie(&cookie);
        assert!(decode_session(&headers, "secret-key").is_none());
    }

    #[test]
    fn flash_round_trips_among_other_cookies() {
        let notice = FlashNotice::new("success", "Post created successfully!");
        let cookie = flash_cookie(&notice).expect("flash");
        let pair = cookie.to_str().expect("ascii").split(';').next().expect("pair").to_string();
        let headers = headers_with_cookie(&format!("other=1; {pair}; theme=dark"));
        assert_eq!(pending_flash(&headers).expect("pending"), notice);
    }

    #[test]
    fn absent_cookies_decode_to_none() {
        let headers = HeaderMap::new();
        assert!(decode_session(&headers, "secret-key").is_none());
        assert!(pending_flash(&headers).is_none());
    }
}
