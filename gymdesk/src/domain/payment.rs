//! Payment records.
//!
//! A payment is an immutable record of one fee collection event, either
//! the initial signup fee or a renewal. Payments are never edited after
//! creation; they only disappear when their member or plan is cascaded
//! away.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{member::MemberId, plan::PlanId};
use crate::error::{GymError, Result};

/// Unique identifier for a payment record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PaymentId(String);

impl PaymentId {
    /// Creates a new payment id with validation.
    ///
    /// # Errors
    ///
    /// Returns [`GymError::InvalidInput`] if the id is empty, exceeds 64
    /// characters, or contains invalid characters.
    pub fn new<S: Into<String>>(id: S) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(GymError::InvalidInput("payment id cannot be empty".into()));
        }
        if id.len() > 64 {
            return Err(GymError::InvalidInput("payment id cannot exceed 64 characters".into()));
        }
        if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(GymError::InvalidInput(
                "payment id must contain only alphanumeric characters, hyphens, and underscores"
                    .into(),
            ));
        }
        Ok(Self(id))
    }

    /// Generates a fresh random payment id.
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

/// Settlement state of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Fee was collected.
    Paid,
    /// Fee is owed but not yet collected.
    Pending,
}

/// What triggered the payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    /// First fee collected at registration.
    Initial,
    /// Fee collected when extending an existing membership.
    Renewal,
}

/// An immutable fee collection record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    /// Unique payment identifier.
    pub id: PaymentId,
    /// Member the fee was collected from.
    pub member_id: MemberId,
    /// Member name copied at collection time.
    pub member_name: String,
    /// Plan the fee paid for.
    pub plan_id: PlanId,
    /// Plan name copied at collection time.
    pub plan_name: String,
    /// Amount collected.
    pub amount: Decimal,
    /// When the fee was collected.
    pub payment_date: DateTime<Utc>,
    /// Coverage date the fee was due against: the join date for an initial
    /// payment, the previous end date for a renewal.
    pub due_date: NaiveDate,
    /// Ordinal of this payment in the member's history, starting at 1.
    pub month_number: u32,
    /// Settlement state.
    pub status: PaymentStatus,
    /// What triggered the payment.
    pub payment_type: PaymentType,
    /// Free-form note, e.g. the extension summary on renewals.
    #[serde(default)]
    pub notes: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
