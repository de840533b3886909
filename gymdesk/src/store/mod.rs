//! In-memory document store with atomic multi-record transactions.
//!
//! Administration workflows touch several collections in one step: a
//! registration writes a member, a payment, and a subscription; a cascade
//! delete empties rows from three maps. [`MemoryStore::transact`] applies
//! a whole workflow to a copy of the data and swaps it in only if every
//! step, including the snapshot write, succeeded, so a failure partway
//! never leaves mixed state behind.
//!
//! # Collections
//!
//! Four collections, each a top-level object in the snapshot document:
//!
//! - `users` - member records
//! - `plans` - membership plans
//! - `payments` - immutable fee records
//! - `subscriptions` - current coverage windows
//!
//! # Examples
//!
//! ```rust
//! use gymdesk::store::MemoryStore;
//!
//! # async fn example() -> gymdesk::Result<()> {
//! let store = MemoryStore::in_memory();
//!
//! let count = store.read(|inner| inner.plans.len()).await;
//! assert_eq!(count, 0);
//!
//! store
//!     .transact(|inner| {
//!         // Mutate any number of collections; all or nothing.
//!         inner.plans.clear();
//!         Ok(())
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod snapshot;

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use crate::{
    domain::{
        Member, MemberId, Payment, PaymentId, Plan, PlanId, Subscription, SubscriptionId,
    },
    error::Result,
};

/// The four collections, as plain maps keyed by record id.
///
/// Exposed to [`MemoryStore::read`] and [`MemoryStore::transact`] closures;
/// everything outside a closure works with owned copies.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreInner {
    /// Member records. Serialized under the collection name `users`.
    #[serde(rename = "users", default)]
    pub members: BTreeMap<MemberId, Member>,
    /// Membership plans.
    #[serde(default)]
    pub plans: BTreeMap<PlanId, Plan>,
    /// Immutable fee records.
    #[serde(default)]
    pub payments: BTreeMap<PaymentId, Payment>,
    /// Current coverage windows, at most one per member.
    #[serde(default)]
    pub subscriptions: BTreeMap<SubscriptionId, Subscription>,
}

impl StoreInner {
    /// Members whose current plan is `plan_id`.
    #[must_use]
    pub fn members_referencing(&self, plan_id: &PlanId) -> Vec<&Member> {
        self.members.values().filter(|m| m.plan_id.as_ref() == Some(plan_id)).collect()
    }

    /// Number of payments recorded for `member_id`.
    #[must_use]
    pub fn payment_count_for(&self, member_id: &MemberId) -> usize {
        self.payments.values().filter(|p| &p.member_id == member_id).count()
    }

    /// The member's current subscription, if one exists.
    #[must_use]
    pub fn subscription_for(&self, member_id: &MemberId) -> Option<&Subscription> {
        self.subscriptions.values().find(|s| &s.member_id == member_id)
    }

    /// Mutable access to the member's current subscription.
    pub fn subscription_for_mut(&mut self, member_id: &MemberId) -> Option<&mut Subscription> {
        self.subscriptions.values_mut().find(|s| &s.member_id == member_id)
    }
}

/// Thread-safe in-memory store with optional JSON snapshot persistence.
///
/// All four collections live behind one `tokio::sync::RwLock`, so a
/// transaction observes and produces a consistent view across collections.
/// When bound to a snapshot path, every committed transaction is persisted
/// before it becomes visible to readers.
#[derive(Debug)]
pub struct MemoryStore {
    inner: RwLock<StoreInner>,
    snapshot_path: Option<PathBuf>,
}

impl MemoryStore {
    /// Creates an empty store with no snapshot file.
    ///
    /// State is lost when the store is dropped. Intended for tests and
    /// ephemeral servers.
    #[must_use]
    pub fn in_memory() -> Self {
        Self { inner: RwLock::new(StoreInner::default()), snapshot_path: None }
    }

    /// Opens a store bound to a JSON snapshot file.
    ///
    /// An existing snapshot is loaded; a missing file starts empty. Every
    /// committed transaction rewrites the snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`GymError::Snapshot`](crate::GymError::Snapshot) if an
    /// existing snapshot cannot be read or parsed.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let inner = snapshot::load(&path)?;
        debug!(
            path = %path.display(),
            members = inner.members.len(),
            plans = inner.plans.len(),
            "store opened"
        );
        Ok(Self { inner: RwLock::new(inner), snapshot_path: Some(path) })
    }

    /// Runs a read-only closure against the current state.
    pub async fn read<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&StoreInner) -> T,
    {
        let guard = self.inner.read().await;
        f(&guard)
    }

    /// Runs a fallible closure against a copy of the state and commits the
    /// copy only on success.
    ///
    /// The closure may mutate any number of collections. If it returns an
    /// error, or the snapshot write fails, the store is left exactly as it
    /// was. Transactions serialize: the write lock is held for the whole
    /// clone-apply-persist-swap sequence.
    ///
    /// # Errors
    ///
    /// Propagates the closure's error, or
    /// [`GymError::Snapshot`](crate::GymError::Snapshot) if persisting the
    /// committed state fails.
    pub async fn transact<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut StoreInner) -> Result<T>,
    {
        let mut guard = self.inner.write().await;
        let mut next = guard.clone();
        let value = f(&mut next)?;
        if let Some(path) = &self.snapshot_path {
            snapshot::save(path, &next)?;
        }
        *guard = next;
        Ok(value)
    }
}
