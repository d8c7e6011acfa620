use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::error::RelayerError;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Shared secret for routes that act with the operator's ledger roles
#[derive(Clone, Debug)]
pub struct OperatorAuth {
    /// `None` disables every operator route
    api_key: Option<String>,
}

impl OperatorAuth {
    pub fn new(api_key: Option<String>) -> Self {
        let api_key = api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        Self { api_key }
    }

    pub fn check(&self, supplied: Option<&str>) -> Result<(), RelayerError> {
        let expected = self
            .api_key
            .as_deref()
            .ok_or(RelayerError::OperatorApiDisabled)?;
        match supplied {
            Some(key) if keys_match(key.trim(), expected) => Ok(()),
            _ => Err(RelayerError::Unauthenticated),
        }
    }
}

/// Compares SHA-256 digests so the time taken does not depend on the key
/// lengths or on where they first differ
fn keys_match(supplied: &str, expected: &str) -> bool {
    let a = Sha256::digest(supplied.as_bytes());
    let b = Sha256::digest(expected.as_bytes());
    a.iter().zip(b.iter()).fold(0u8, |diff, (x, y)| diff | (x ^ y)) == 0
}

pub async fn require_operator_key(
    State(auth): State<OperatorAuth>,
    req: Request,
    next: Next,
) -> Result<Response, RelayerError> {
    let supplied = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    if let Err(e) = auth.check(supplied) {
        warn!("Rejected {} {}: {}", req.method(), req.uri().path(), e);
        return Err(e);
    }
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_requires_matching_key() {
        let auth = OperatorAuth::new(Some("s3cret".into()));

        assert!(auth.check(Some("s3cret")).is_ok());
        assert!(auth.check(Some(" s3cret ")).is_ok());
        assert!(matches!(auth.check(Some("s3cre")), Err(RelayerError::Unauthenticated)));
        assert!(matches!(auth.check(Some("s3cret!")), Err(RelayerError::Unauthenticated)));
        assert!(matches!(auth.check(None), Err(RelayerError::Unauthenticated)));
    }

    #[test]
    fn test_blank_key_disables_operator_routes() {
        for key in [None, Some(String::new()), Some("   ".to_string())] {
            let auth = OperatorAuth::new(key);
            assert!(matches!(auth.check(Some("")), Err(RelayerError::OperatorApiDisabled)));
        }
    }
}
