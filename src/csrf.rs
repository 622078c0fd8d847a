//! CSRF tokens signed with the startup secret and bound to a client session.
//!
//! Token layout: `{issued_at}.{nonce}.{signature}` where the signature is
//! base64url(SHA-256(secret | session | issued_at | nonce)). The session id
//! travels in the `csrf_session` cookie, see [`crate::middleware::CsrfSession`].

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Utc;
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

const MAX_CLOCK_SKEW_SECONDS: i64 = 60;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CsrfError {
    #[error("The CSRF token is missing.")]
    Missing,
    #[error("The CSRF session cookie is missing.")]
    MissingSession,
    #[error("The CSRF token is invalid.")]
    Malformed,
    #[error("The CSRF token is invalid.")]
    BadSignature,
    #[error("The CSRF token has expired.")]
    Expired,
}

#[derive(Clone)]
pub struct CsrfGuard {
    secret: String,
    ttl_seconds: i64,
}

impl CsrfGuard {
    pub fn new(secret: impl Into<String>, ttl_seconds: i64) -> Self {
        Self { secret: secret.into(), ttl_seconds }
    }

    /// Fresh token for the client holding `session`.
    pub fn issue(&self, session: &str) -> String {
        self.issue_at(session, Utc::now().timestamp())
    }

    /// `session` is the id from the client's cookie, `None` when it sent none.
    pub fn verify(&self, token: &str, session: Option<&str>) -> Result<(), CsrfError> {
        self.verify_at(token, session, Utc::now().timestamp())
    }

    fn issue_at(&self, session: &str, issued_at: i64) -> String {
        let nonce = Uuid::new_v4().simple().to_string();
        let signature = self.sign(session, issued_at, &nonce);
        format!("{issued_at}.{nonce}.{signature}")
    }

    fn verify_at(&self, token: &str, session: Option<&str>, now: i64) -> Result<(), CsrfError> {
        if token.trim().is_empty() {
            return Err(CsrfError::Missing);
        }
        let session = match session {
            Some(s) if !s.is_empty() => s,
            _ => return Err(CsrfError::MissingSession),
        };

        let mut parts = token.splitn(3, '.');
        let (Some(issued_at), Some(nonce), Some(signature)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(CsrfError::Malformed);
        };
        let issued_at: i64 = issued_at.parse().map_err(|_| CsrfError::Malformed)?;
        if nonce.is_empty() {
            return Err(CsrfError::Malformed);
        }

        let expected = self.sign(session, issued_at, nonce);
        if !constant_time_eq(expected.as_bytes(), signature.as_bytes()) {
            return Err(CsrfError::BadSignature);
        }

        if issued_at > now + MAX_CLOCK_SKEW_SECONDS || now - issued_at > self.ttl_seconds {
            return Err(CsrfError::Expired);
        }
        Ok(())
    }

    fn sign(&self, session: &str, issued_at: i64, nonce: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.secret.as_bytes());
        hasher.update(b"|");
        hasher.update(session.as_bytes());
        hasher.update(b"|");
        hasher.update(issued_at.to_string().as_bytes());
        hasher.update(b"|");
        hasher.update(nonce.as_bytes());
        URL_SAFE_NO_PAD.encode(hasher.finalize())
    }
}

/// Random id for a client that has no session cookie yet.
pub fn new_session_id() -> String {
    Uuid::new_v4().simple().to_string()
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLIENT: &str = "client-a";

    fn guard() -> CsrfGuard {
        CsrfGuard::new("secret", 3600)
    }

    #[test]
    fn issued_token_verifies_for_its_session() {
        let g = guard();
        let token = g.issue(CLIENT);
        assert_eq!(g.verify(&token, Some(CLIENT)), Ok(()));
    }

    #[test]
    fn token_from_another_session_is_rejected() {
        let g = guard();
        let token = g.issue(CLIENT);
        assert_eq!(g.verify(&token, Some("client-b")), Err(CsrfError::BadSignature));
    }

    #[test]
    fn token_without_session_cookie_is_rejected() {
        let g = guard();
        let token = g.issue(CLIENT);
        assert_eq!(g.verify(&token, None), Err(CsrfError::MissingSession));
        assert_eq!(g.verify(&token, Some("")), Err(CsrfError::MissingSession));
    }

    #[test]
    fn tokens_are_unique() {
        let g = guard();
        assert_ne!(g.issue(CLIENT), g.issue(CLIENT));
    }

    #[test]
    fn other_secret_is_rejected() {
        let token = CsrfGuard::new("other", 3600).issue(CLIENT);
        assert_eq!(guard().verify(&token, Some(CLIENT)), Err(CsrfError::BadSignature));
    }

    #[test]
    fn tampered_timestamp_is_rejected() {
        let g = guard();
        let token = g.issue_at(CLIENT, 1_000);
        let forged = token.replacen("1000", "2000", 1);
        assert_eq!(g.verify_at(&forged, Some(CLIENT), 2_000), Err(CsrfError::BadSignature));
    }

    #[test]
    fn expired_token_is_rejected() {
        let g = guard();
        let token = g.issue_at(CLIENT, 1_000);
        assert_eq!(g.verify_at(&token, Some(CLIENT), 1_000 + 3600), Ok(()));
        assert_eq!(g.verify_at(&token, Some(CLIENT), 1_000 + 3601), Err(CsrfError::Expired));
    }

    #[test]
    fn future_token_is_rejected() {
        let g = guard();
        let token = g.issue_at(CLIENT, 10_000);
        assert_eq!(g.verify_at(&token, Some(CLIENT), 10_000 - 3600), Err(CsrfError::Expired));
    }

    #[test]
    fn garbage_is_rejected() {
        let g = guard();
        assert_eq!(g.verify("", Some(CLIENT)), Err(CsrfError::Missing));
        assert_eq!(g.verify("abc", Some(CLIENT)), Err(CsrfError::Malformed));
        assert_eq!(g.verify("x.y.z", Some(CLIENT)), Err(CsrfError::Malformed));
        assert_eq!(g.verify("12..sig", Some(CLIENT)), Err(CsrfError::Malformed));
    }
}
