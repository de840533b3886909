//! Error types for gym administration operations.
//!
//! # Error Categories
//!
//! Errors fall into these categories:
//!
//! - **Validation**: rejected input before any write ([`GymError::InvalidInput`])
//! - **Lookup**: a referenced record does not exist ([`GymError::PlanNotFound`],
//!   [`GymError::MemberNotFound`])
//! - **Referential**: a delete blocked by live references ([`GymError::PlanInUse`])
//! - **Authentication**: login or session failures ([`GymError::InvalidCredentials`])
//! - **Configuration**: bad or unreadable configuration ([`GymError::Config`])
//! - **Persistence**: snapshot file failures ([`GymError::Snapshot`])
//!
//! # Examples
//!
//! ```rust
//! use gymdesk::{GymError, Result};
//!
//! fn check_duration(months: u32) -> Result<()> {
//!     if months == 0 {
//!         return Err(GymError::InvalidInput("duration must be at least 1 month".into()));
//!     }
//!     Ok(())
//! }
//!
//! match check_duration(0) {
//!     Err(GymError::InvalidInput(msg)) => eprintln!("rejected: {msg}"),
//!     _ => unreachable!(),
//! }
//! ```

use thiserror::Error;

/// Convenience alias for `Result` with [`GymError`].
///
/// Prefer this alias in all fallible gym operations:
///
/// ```rust
/// use gymdesk::Result;
///
/// fn parse_amount(raw: &str) -> Result<u64> {
///     raw.parse()
///         .map_err(|_| gymdesk::GymError::InvalidInput(format!("bad amount: {raw}")))
/// }
/// ```
pub type Result<T> = std::result::Result<T, GymError>;

/// Errors from gym administration operations.
///
/// Every fallible operation in this crate returns [`Result`], which wraps
/// this enum. Variants map one-to-one onto the failure classes the HTTP
/// layer distinguishes (bad request, not found, conflict, unauthorized,
/// internal).
#[must_use = "errors should be handled, propagated, or explicitly panicked"]
#[derive(Debug, Error)]
pub enum GymError {
    /// Input failed validation before any write was attempted.
    ///
    /// Common causes:
    /// - Empty or whitespace-only name/phone fields
    /// - Plan duration of zero months
    /// - Non-positive price or payment amount
    /// - Malformed identifier strings
    ///
    /// # Recovery
    ///
    /// The message names the offending field. Correct the input and retry;
    /// no state was modified.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No plan exists with the given identifier.
    #[error("plan not found: {0}")]
    PlanNotFound(String),

    /// No member exists with the given identifier.
    #[error("member not found: {0}")]
    MemberNotFound(String),

    /// A plan delete was blocked because members still reference the plan.
    ///
    /// Common causes:
    /// - Attempting to retire a plan before migrating its members
    ///
    /// # Recovery
    ///
    /// Move or delete the blocking members first, then retry the delete.
    /// The failed attempt performs no writes: no payments or subscriptions
    /// are cascaded.
    #[error(
        "Cannot delete plan. {member_count} member(s) are still using this plan: {member_names}"
    )]
    PlanInUse {
        /// Number of members still referencing the plan.
        member_count: usize,
        /// Comma-separated names of the blocking members.
        member_names: String,
    },

    /// Login was rejected.
    ///
    /// The same error is returned for an unknown email and a wrong
    /// password, so callers cannot probe which accounts exist.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Configuration is missing, unreadable, or fails validation.
    ///
    /// Common causes:
    /// - TOML syntax errors
    /// - Admin password digest that is not 64 hex characters
    /// - Port or session TTL set to zero
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Reading or writing the JSON snapshot file failed.
    ///
    /// Common causes:
    /// - Snapshot path not writable
    /// - Corrupt or truncated snapshot from an earlier crash
    ///
    /// # Recovery
    ///
    /// A failed write aborts the enclosing transaction, so memory and disk
    /// stay consistent with each other. Fix the file or the path and retry
    /// the operation.
    #[error("snapshot persistence failed: {0}")]
    Snapshot(String),
}
