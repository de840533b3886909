//! JSON snapshot persistence for the in-memory store.
//!
//! The whole store serializes to one pretty-printed JSON document with a
//! top-level object per collection (`users`, `plans`, `payments`,
//! `subscriptions`). Snapshots are written after every successful
//! transaction and loaded once when a store is opened.

use std::path::Path;

use super::StoreInner;
use crate::error::{GymError, Result};

/// Loads a snapshot from `path`.
///
/// A missing file is not an error: the store starts empty on first run.
///
/// # Errors
///
/// Returns [`GymError::Snapshot`] if the file exists but cannot be read or
/// does not parse as a store snapshot.
pub(crate) fn load(path: &Path) -> Result<StoreInner> {
    if !path.exists() {
        return Ok(StoreInner::default());
    }
    let raw = std::fs::read_to_string(path)
        .map_err(|e| GymError::Snapshot(format!("cannot read {}: {e}", path.display())))?;
    serde_json::from_str(&raw)
        .map_err(|e| GymError::Snapshot(format!("cannot parse {}: {e}", path.display())))
}

/// Writes `inner` to `path` as pretty JSON.
///
/// # Errors
///
/// Returns [`GymError::Snapshot`] if serialization or the write fails. The
/// caller aborts its transaction in that case, so memory never runs ahead
/// of disk.
pub(crate) fn save(path: &Path, inner: &StoreInner) -> Result<()> {
    let json = serde_json::to_string_pretty(inner)
        .map_err(|e| GymError::Snapshot(format!("cannot serialize snapshot: {e}")))?;
    std::fs::write(path, json)
        .map_err(|e| GymError::Snapshot(format!("cannot write {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let inner = load(&dir.path().join("absent.json")).unwrap();
        assert!(inner.plans.is_empty());
        assert!(inner.members.is_empty());
    }

    #[test]
    fn test_load_corrupt_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "not json {{{").unwrap();

        let result = load(&path);
        assert!(matches!(result, Err(GymError::Snapshot(_))));
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let inner = StoreInner::default();
        save(&path, &inner).unwrap();
        let loaded = load(&path).unwrap();
        assert!(loaded.plans.is_empty());

        let raw = std::fs::read_to_string(&path).unwrap();
        for collection in ["users", "plans", "payments", "subscriptions"] {
            assert!(raw.contains(&format!("\"{collection}\"")), "missing {collection}");
        }
    }
}
