use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};
use sha3::{Digest, Sha3_256};
use std::future::{ready, Ready};

use super::{ApiError, ApiSettings};

pub const AUTH_HEADER: &str = "X-Auth-Key";

/// SHA3-256 digest of the shared key clients send in `X-Auth-Key`.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthKey {
    digest: [u8; 32],
}

impl AuthKey {
    /// Parse a hex-encoded digest.
    pub fn from_hex_digest(hex_digest: &str) -> Result<Self, String> {
        let bytes = hex::decode(hex_digest.trim()).map_err(|e| format!("invalid auth key digest: {e}"))?;
        let digest: [u8; 32] = bytes
            .try_into()
            .map_err(|bytes: Vec<u8>| format!("auth key digest must be 32 bytes, got {}", bytes.len()))?;
        Ok(Self { digest })
    }

    #[cfg(test)]
    pub fn from_plain(key: &str) -> Self {
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&Sha3_256::digest(key.as_bytes()));
        Self { digest }
    }

    /// Compare the presented key's digest without early exit.
    pub fn verify(&self, presented: &str) -> bool {
        let presented = Sha3_256::digest(presented.as_bytes());
        presented
            .iter()
            .zip(self.digest.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

impl std::fmt::Debug for AuthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AuthKey(..)")
    }
}

/// Extractor guarding a handler behind `X-Auth-Key`. The handler never runs
/// when the header is missing or wrong.
#[derive(Debug)]
pub struct Authenticated;

impl FromRequest for Authenticated {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<Authenticated, ApiError> {
    let Some(settings) = req.app_data::<web::Data<ApiSettings>>() else {
        tracing::error!("ApiSettings missing from app data; refusing request");
        return Err(ApiError::Unauthorized);
    };

    let presented = req
        .headers()
        .get(AUTH_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty());

    match presented {
        Some(key) if settings.auth_key.verify(key) => Ok(Authenticated),
        Some(_) => {
            tracing::warn!(path = %req.path(), "Rejected request with invalid auth key");
            Err(ApiError::Unauthorized)
        }
        None => {
            tracing::debug!(path = %req.path(), "Rejected request without auth key");
            Err(ApiError::Unauthorized)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify() {
        let key = AuthKey::from_plain("s3cret");
        assert!(key.verify("s3cret"));
        assert!(!key.verify("s3cret "));
        assert!(!key.verify(""));
    }

    #[test]
    fn test_from_hex_digest_matches_plain() {
        let hex_digest = hex::encode(Sha3_256::digest(b"s3cret"));
        let key = AuthKey::from_hex_digest(&hex_digest).unwrap();
        assert_eq!(key, AuthKey::from_plain("s3cret"));
    }

    #[test]
    fn test_from_hex_digest_rejects_bad_input() {
        assert!(AuthKey::from_hex_digest("zz").is_err());
        assert!(AuthKey::from_hex_digest("abcd").is_err());
    }
}
