//! Subscription records.
//!
//! A subscription is the member's current coverage window. Each member has
//! at most one: the renewal workflow extends the existing record in place
//! rather than appending a new one per period.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{member::MemberId, plan::PlanId};
use crate::error::{GymError, Result};

/// Unique identifier for a subscription record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(String);

impl SubscriptionId {
    /// Creates a new subscription id with validation.
    ///
    /// # Errors
    ///
    /// Returns [`GymError::InvalidInput`] if the id is empty, exceeds 64
    /// characters, or contains invalid characters.
    pub fn new<S: Into<String>>(id: S) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(GymError::InvalidInput("subscription id cannot be empty".into()));
        }
        if id.len() > 64 {
            return Err(GymError::InvalidInput(
                "subscription id cannot exceed 64 characters".into(),
            ));
        }
        if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(GymError::InvalidInput(
                "subscription id must contain only alphanumeric characters, hyphens, and \
                 underscores"
                    .into(),
            ));
        }
        Ok(Self(id))
    }

    /// Generates a fresh random subscription id.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Lifecycle state of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Coverage window is current.
    Active,
    /// Coverage window has passed without renewal.
    Expired,
    /// Coverage was terminated by the admin.
    Cancelled,
}

/// A member's current coverage window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    /// Unique subscription identifier.
    pub id: SubscriptionId,
    /// Covered member.
    pub member_id: MemberId,
    /// Member name copied at creation time.
    pub member_name: String,
    /// Plan backing the coverage.
    pub plan_id: PlanId,
    /// Plan name copied at creation time.
    pub plan_name: String,
    /// First covered date.
    pub start_date: NaiveDate,
    /// Last covered date.
    pub end_date: NaiveDate,
    /// Price paid for the window.
    pub amount: Decimal,
    /// Lifecycle state.
    pub status: SubscriptionStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}
