//! Admin session gate.
//!
//! The service has exactly one admin account, configured by email and a
//! SHA-256 password digest. Logging in mints an opaque bearer token with a
//! TTL; every route except login and health checks requires a live token.
//! Sessions live in memory and are an explicit object owned by the server
//! state, not ambient globals.
//!
//! # Examples
//!
//! ```rust
//! use chrono::Utc;
//! use gymdesk::auth::SessionGate;
//!
//! # async fn example() -> gymdesk::Result<()> {
//! // Digest of the password "secret".
//! let digest = "2bb80d537b1da3e38bd30361aa855686bde0eacd7162fef6a25fe97bf527a25b";
//! let gate = SessionGate::new("admin@example.com", digest, 12);
//!
//! let outcome = gate.login("admin@example.com", "secret", Utc::now()).await?;
//! let email = gate.current_user(&outcome.token, Utc::now()).await;
//! assert_eq!(email.as_deref(), Some("admin@example.com"));
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::error::{GymError, Result};

/// Opaque bearer token identifying one admin session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wraps a raw token string as presented by a client.
    #[must_use]
    pub fn new<S: Into<String>>(raw: S) -> Self {
        Self(raw.into())
    }

    /// Generates a fresh random token.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Returns the token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A live admin session.
#[derive(Debug, Clone)]
pub struct Session {
    /// Email the session was minted for.
    pub email: String,
    /// Instant after which the token is no longer honored.
    pub expires_at: DateTime<Utc>,
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// Bearer token to present on subsequent requests.
    pub token: SessionToken,
    /// Session expiry instant.
    pub expires_at: DateTime<Utc>,
}

/// Single-admin credential check and session registry.
#[derive(Debug)]
pub struct SessionGate {
    admin_email: String,
    password_digest: String,
    ttl: Duration,
    sessions: RwLock<HashMap<SessionToken, Session>>,
}

impl SessionGate {
    /// Creates a gate for the given admin credentials.
    ///
    /// `password_sha256` is the lowercase hex SHA-256 digest of the admin
    /// password; configuration validation guarantees its shape before the
    /// gate is built.
    #[must_use]
    pub fn new<E, D>(admin_email: E, password_sha256: D, ttl_hours: u32) -> Self
    where
        E: Into<String>,
        D: Into<String>,
    {
        Self {
            admin_email: admin_email.into(),
            password_digest: password_sha256.into().to_lowercase(),
            ttl: Duration::hours(i64::from(ttl_hours)),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Attempts a login and mints a session on success.
    ///
    /// The email comparison is case-insensitive; the password is compared
    /// by SHA-256 digest. Wrong email and wrong password both produce the
    /// same [`GymError::InvalidCredentials`] so callers cannot probe which
    /// part failed.
    ///
    /// # Errors
    ///
    /// Returns [`GymError::InvalidCredentials`] when the credentials do not
    /// match the configured admin account.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<LoginOutcome> {
        let digest = hex::encode(Sha256::digest(password.as_bytes()));
        let email_ok = email.trim().eq_ignore_ascii_case(&self.admin_email);
        let password_ok = digest == self.password_digest;
        if !email_ok || !password_ok {
            warn!(email = %email.trim(), "rejected login attempt");
            return Err(GymError::InvalidCredentials);
        }

        let token = SessionToken::generate();
        let expires_at = now + self.ttl;
        let session = Session { email: self.admin_email.clone(), expires_at };
        self.sessions.write().await.insert(token.clone(), session);
        info!(email = %self.admin_email, %expires_at, "admin logged in");
        Ok(LoginOutcome { token, expires_at })
    }

    /// Returns the session email if `token` is known and unexpired.
    ///
    /// Expired tokens are removed as they are seen, so the registry never
    /// accumulates dead sessions past their next use.
    pub async fn current_user(&self, token: &SessionToken, now: DateTime<Utc>) -> Option<String> {
        let mut sessions = self.sessions.write().await;
        match sessions.get(token) {
            Some(session) if session.expires_at > now => Some(session.email.clone()),
            Some(_) => {
                sessions.remove(token);
                None
            }
            None => None,
        }
    }

    /// Ends the session for `token`. Unknown tokens are a no-op.
    pub async fn logout(&self, token: &SessionToken) {
        if self.sessions.write().await.remove(token).is_some() {
            info!("admin logged out");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // SHA-256 of "secret".
    const SECRET_DIGEST: &str = "2bb80d537b1da3e38bd30361aa855686bde0eacd7162fef6a25fe97bf527a25b";

    fn gate() -> SessionGate {
        SessionGate::new("admin@example.com", SECRET_DIGEST, 12)
    }

    #[tokio::test]
    async fn test_login_with_correct_credentials() {
        let gate = gate();
        let now = Utc::now();

        let outcome = gate.login("admin@example.com", "secret", now).await.unwrap();
        assert_eq!(outcome.expires_at, now + Duration::hours(12));

        let email = gate.current_user(&outcome.token, now).await;
        assert_eq!(email.as_deref(), Some("admin@example.com"));
    }

    #[tokio::test]
    async fn test_login_email_is_case_insensitive() {
        let gate = gate();
        let result = gate.login("Admin@Example.COM", "secret", Utc::now()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_login_rejects_wrong_password() {
        let gate = gate();
        let result = gate.login("admin@example.com", "wrong", Utc::now()).await;
        assert!(matches!(result, Err(GymError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_rejects_unknown_email_with_same_error() {
        let gate = gate();
        let wrong_email = gate.login("intruder@example.com", "secret", Utc::now()).await;
        let wrong_password = gate.login("admin@example.com", "nope", Utc::now()).await;

        let Err(a) = wrong_email else { unreachable!("expected rejection") };
        let Err(b) = wrong_password else { unreachable!("expected rejection") };
        assert_eq!(a.to_string(), b.to_string(), "login failures must be indistinguishable");
    }

    #[tokio::test]
    async fn test_expired_session_is_rejected_and_pruned() {
        let gate = gate();
        let login_time = Utc::now();
        let outcome = gate.login("admin@example.com", "secret", login_time).await.unwrap();

        let after_expiry = login_time + Duration::hours(13);
        assert!(gate.current_user(&outcome.token, after_expiry).await.is_none());

        // Same token again, now pruned rather than re-checked.
        assert!(gate.current_user(&outcome.token, login_time).await.is_none());
    }

    #[tokio::test]
    async fn test_logout_invalidates_token() {
        let gate = gate();
        let now = Utc::now();
        let outcome = gate.login("admin@example.com", "secret", now).await.unwrap();

        gate.logout(&outcome.token).await;
        assert!(gate.current_user(&outcome.token, now).await.is_none());
    }

    #[tokio::test]
    async fn test_unknown_token_is_none() {
        let gate = gate();
        let token = SessionToken::new("made-up");
        assert!(gate.current_user(&token, Utc::now()).await.is_none());
    }
}
