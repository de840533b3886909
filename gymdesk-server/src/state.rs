//! Shared application state.

use std::{sync::Arc, time::Instant};

use gymdesk::{auth::SessionGate, config::GymdeskConfig, store::MemoryStore};

use crate::error::ServerError;

/// State handed to every handler.
///
/// Cloning is cheap; the store and the gate live behind [`Arc`]s and their
/// own locks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The collections every operation reads and writes.
    pub store: Arc<MemoryStore>,
    /// The single-admin session gate.
    pub gate: Arc<SessionGate>,
    /// Configuration the server was started with.
    pub config: Arc<GymdeskConfig>,
    /// When this process came up, for uptime reporting.
    pub started_at: Instant,
}

impl AppState {
    /// Builds state from validated configuration.
    ///
    /// Opens the snapshot-backed store when a snapshot path is configured,
    /// otherwise runs purely in memory.
    ///
    /// # Errors
    ///
    /// Returns an error when the snapshot file exists but cannot be read
    /// or parsed.
    pub fn new(config: GymdeskConfig) -> Result<Self, ServerError> {
        let store = match &config.store.snapshot_path {
            Some(path) => MemoryStore::open(path)?,
            None => MemoryStore::in_memory(),
        };
        let gate = SessionGate::new(
            config.auth.admin_email.as_str(),
            config.auth.admin_password_sha256.as_str(),
            config.auth.session_ttl_hours,
        );
        Ok(Self {
            store: Arc::new(store),
            gate: Arc::new(gate),
            config: Arc::new(config),
            started_at: Instant::now(),
        })
    }
}
