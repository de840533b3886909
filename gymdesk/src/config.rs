//! Service configuration.
//!
//! Configuration is a TOML file with three tables (`[server]`, `[auth]`,
//! `[store]`), overridable per field through `GYMDESK_*` environment
//! variables. The `[auth]` table is mandatory: the service refuses to start
//! without admin credentials. Everything else has defaults.
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 8080
//!
//! [auth]
//! admin_email = "admin@example.com"
//! admin_password_sha256 = "2bb80d537b1da3e38bd30361aa855686bde0eacd7162fef6a25fe97bf527a25b"
//! session_ttl_hours = 12
//!
//! [store]
//! snapshot_path = "gymdesk.json"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{GymError, Result};

/// Top-level service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GymdeskConfig {
    /// Listen address settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Admin account and session policy. Required.
    pub auth: AuthConfig,
    /// Persistence settings.
    #[serde(default)]
    pub store: StoreConfig,
}

/// Listen address settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind. Default `127.0.0.1`.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind. Default `8080`.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port() }
    }
}

/// Admin account and session policy.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Email of the single admin account.
    pub admin_email: String,
    /// Lowercase hex SHA-256 digest of the admin password.
    pub admin_password_sha256: String,
    /// Session lifetime in hours. Default `12`.
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: u32,
}

/// Persistence settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
    /// Path of the JSON snapshot file. When absent the store is purely
    /// in-memory and state is lost on shutdown.
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,
}

fn default_host() -> String {
    "127.0.0.1".to_owned()
}

const fn default_port() -> u16 {
    8080
}

const fn default_session_ttl_hours() -> u32 {
    12
}

impl GymdeskConfig {
    /// Parses and validates configuration from a TOML string.
    ///
    /// Environment overrides are not consulted here; use
    /// [`GymdeskConfig::load`] for the full startup path.
    ///
    /// # Errors
    ///
    /// Returns [`GymError::Config`] on TOML syntax errors or validation
    /// failures.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)
            .map_err(|e| GymError::Config(format!("invalid TOML config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a TOML file, applies `GYMDESK_*` environment overrides, and
    /// validates the result.
    ///
    /// # Errors
    ///
    /// Returns [`GymError::Config`] if the file cannot be read or parsed,
    /// an override value is malformed, or validation fails.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())
            .map_err(|e| GymError::Config(format!("cannot read config file: {e}")))?;
        let mut config: Self = toml::from_str(&raw)
            .map_err(|e| GymError::Config(format!("invalid TOML config: {e}")))?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every field constraint.
    ///
    /// # Errors
    ///
    /// Returns [`GymError::Config`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        validate_server(&self.server)?;
        validate_auth(&self.auth)?;
        Ok(())
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(host) = std::env::var("GYMDESK_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("GYMDESK_PORT") {
            self.server.port = port.parse().map_err(|_| {
                GymError::Config(format!("GYMDESK_PORT is not a valid port: {port}"))
            })?;
        }
        if let Ok(email) = std::env::var("GYMDESK_ADMIN_EMAIL") {
            self.auth.admin_email = email;
        }
        if let Ok(digest) = std::env::var("GYMDESK_ADMIN_PASSWORD_SHA256") {
            self.auth.admin_password_sha256 = digest;
        }
        if let Ok(path) = std::env::var("GYMDESK_SNAPSHOT_PATH") {
            self.store.snapshot_path = Some(PathBuf::from(path));
        }
        Ok(())
    }
}

fn validate_server(server: &ServerConfig) -> Result<()> {
    if server.host.trim().is_empty() {
        return Err(GymError::Config("server host cannot be empty".into()));
    }
    if server.port == 0 {
        return Err(GymError::Config("server port cannot be 0".into()));
    }
    Ok(())
}

fn validate_auth(auth: &AuthConfig) -> Result<()> {
    let email = auth.admin_email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(GymError::Config("admin_email must be a valid email address".into()));
    }
    let digest = &auth.admin_password_sha256;
    if digest.len() != 64 || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(GymError::Config(
            "admin_password_sha256 must be 64 hex characters".into(),
        ));
    }
    if auth.session_ttl_hours == 0 {
        return Err(GymError::Config("session_ttl_hours must be at least 1".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIGEST: &str = "2bb80d537b1da3e38bd30361aa855686bde0eacd7162fef6a25fe97bf527a25b";

    fn minimal_toml() -> String {
        format!(
            r#"
            [auth]
            admin_email = "admin@example.com"
            admin_password_sha256 = "{DIGEST}"
            "#
        )
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = GymdeskConfig::from_toml_str(&minimal_toml()).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.auth.session_ttl_hours, 12);
        assert!(config.store.snapshot_path.is_none());
    }

    #[test]
    fn test_full_config_parses() {
        let toml = format!(
            r#"
            [server]
            host = "0.0.0.0"
            port = 9090

            [auth]
            admin_email = "coach@gym.test"
            admin_password_sha256 = "{DIGEST}"
            session_ttl_hours = 4

            [store]
            snapshot_path = "/var/lib/gymdesk/state.json"
            "#
        );
        let config = GymdeskConfig::from_toml_str(&toml).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.auth.session_ttl_hours, 4);
        assert_eq!(
            config.store.snapshot_path.as_deref(),
            Some(Path::new("/var/lib/gymdesk/state.json"))
        );
    }

    #[test]
    fn test_invalid_toml_rejected() {
        let result = GymdeskConfig::from_toml_str("not toml {{{");
        assert!(matches!(result, Err(GymError::Config(_))));
    }

    #[test]
    fn test_missing_auth_table_rejected() {
        let result = GymdeskConfig::from_toml_str("[server]\nport = 8080\n");
        assert!(matches!(result, Err(GymError::Config(_))));
    }

    #[test]
    fn test_bad_email_rejected() {
        let toml = format!(
            r#"
            [auth]
            admin_email = "not-an-email"
            admin_password_sha256 = "{DIGEST}"
            "#
        );
        let Err(GymError::Config(msg)) = GymdeskConfig::from_toml_str(&toml) else {
            unreachable!("expected config error");
        };
        assert!(msg.contains("admin_email"), "unexpected message: {msg}");
    }

    #[test]
    fn test_bad_digest_rejected() {
        for digest in
            ["short", "zz80d537b1da3e38bd30361aa855686bde0eacd7162fef6a25fe97bf527a25b1"]
        {
            let toml = format!(
                r#"
                [auth]
                admin_email = "admin@example.com"
                admin_password_sha256 = "{digest}"
                "#
            );
            let result = GymdeskConfig::from_toml_str(&toml);
            assert!(matches!(result, Err(GymError::Config(_))), "accepted digest {digest}");
        }
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let toml = format!(
            r#"
            [auth]
            admin_email = "admin@example.com"
            admin_password_sha256 = "{DIGEST}"
            session_ttl_hours = 0
            "#
        );
        assert!(GymdeskConfig::from_toml_str(&toml).is_err());
    }

    #[test]
    fn test_zero_port_rejected() {
        let toml = format!(
            r#"
            [server]
            port = 0

            [auth]
            admin_email = "admin@example.com"
            admin_password_sha256 = "{DIGEST}"
            "#
        );
        assert!(GymdeskConfig::from_toml_str(&toml).is_err());
    }

    #[test]
    fn test_env_port_override() {
        let mut config = GymdeskConfig::from_toml_str(&minimal_toml()).unwrap();

        // SAFETY: this is the only test that touches this variable, and
        // only `apply_env_overrides` reads it.
        unsafe { std::env::set_var("GYMDESK_PORT", "3000") };
        let valid = config.apply_env_overrides();

        // SAFETY: same as above.
        unsafe { std::env::set_var("GYMDESK_PORT", "not-a-port") };
        let invalid = config.apply_env_overrides();

        // SAFETY: same as above.
        unsafe { std::env::remove_var("GYMDESK_PORT") };

        valid.unwrap();
        assert_eq!(config.server.port, 3000);
        assert!(matches!(invalid, Err(GymError::Config(_))));
    }
}
