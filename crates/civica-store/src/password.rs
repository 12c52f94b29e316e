// SPDX-License-Identifier: Apache-2.0

//! Salted PBKDF2-HMAC-SHA256 password hashing.
//!
//! Stored form is `pbkdf2-sha256$<iterations>$<salt hex>$<digest hex>`,
//! so the work factor can be raised later without invalidating existing
//! rows: verification always honors the iteration count recorded in the
//! hash itself.

use civica_model::DomainError;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;

const ALGORITHM_TAG: &str = "pbkdf2-sha256";
const SALT_LEN: usize = 16;
const DIGEST_LEN: usize = 32;
pub const PBKDF2_ITERATIONS: u32 = 50_000;

fn hmac_err(e: impl std::fmt::Display) -> DomainError {
    DomainError::Store(format!("hmac init failed: {e}"))
}

fn pbkdf2_sha256(
    password: &[u8],
    salt: &[u8],
    iterations: u32,
) -> Result<[u8; DIGEST_LEN], DomainError> {
    let mut mac = Hmac::<Sha256>::new_from_slice(password).map_err(hmac_err)?;
    mac.update(salt);
    mac.update(&1u32.to_be_bytes());
    let mut block: [u8; DIGEST_LEN] = mac.finalize().into_bytes().into();
    let mut out = block;
    for _ in 1..iterations {
        let mut mac = Hmac::<Sha256>::new_from_slice(password).map_err(hmac_err)?;
        mac.update(&block);
        block = mac.finalize().into_bytes().into();
        for (o, b) in out.iter_mut().zip(block.iter()) {
            *o ^= b;
        }
    }
    Ok(out)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

pub fn hash_password(password: &str) -> Result<String, DomainError> {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    let digest = pbkdf2_sha256(password.as_bytes(), &salt, PBKDF2_ITERATIONS)?;
    Ok(format!(
        "{ALGORITHM_TAG}${PBKDF2_ITERATIONS}${}${}",
        hex::encode(salt),
        hex::encode(digest)
    ))
}

/// Returns false both for a wrong password and for a stored value that is
/// not in the expected format; the caller cannot distinguish the two.
pub fn verify_password(stored: &str, password: &str) -> Result<bool, DomainError> {
    let mut parts = stored.split('$');
    let (Some(tag), Some(iter_raw), Some(salt_hex), Some(digest_hex), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return Ok(false);
    };
    if tag != ALGORITHM_TAG {
        return Ok(false);
    }
    let Ok(iterations) = iter_raw.parse::<u32>() else {
        return Ok(false);
    };
    let (Ok(salt), Ok(expected)) = (hex::decode(salt_hex), hex::decode(digest_hex)) else {
        return Ok(false);
    };
    if iterations == 0 || expected.len() != DIGEST_LEN {
        return Ok(false);
    }
    let digest = pbkdf2_sha256(password.as_bytes(), &salt, iterations)?;
    Ok(constant_time_eq(&digest, &expected))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_and_rejects_wrong_password() {
        let hash = hash_password("pw1").expect("hash");
        assert!(verify_password(&hash, "pw1").expect("verify"));
        assert!(!verify_password(&hash, "wrong").expect("verify"));
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("same").expect("hash a");
        let b = hash_password("same").expect("hash b");
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_stored_values_never_verify() {
        assert!(!verify_password("", "pw").expect("empty"));
        assert!(!verify_password("plaintext", "pw").expect("no fields"));
        assert!(!verify_password("md5$1$aa$bb", "pw").expect("wrong tag"));
        assert!(!verify_password("pbkdf2-sha256$x$aa$bb", "pw").expect("bad iterations"));
        assert!(!verify_password("pbkdf2-sha256$1$zz$bb", "pw").expect("bad hex"));
    }

    #[test]
    fn verification_honors_recorded_iteration_count() {
        let salt = [7u8; SALT_LEN];
        let digest = pbkdf2_sha256(b"pw", &salt, 100).expect("derive");
        let stored = format!(
            "{ALGORITHM_TAG}$100${}${}",
            hex::encode(salt),
            hex::encode(digest)
        );
        assert!(verify_password(&stored, "pw").expect("verify"));
    }
}
