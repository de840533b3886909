//! Member records.
//!
//! A member is a registered gym client. Plan linkage fields are
//! denormalized copies of the assigned plan taken at registration or
//! renewal time; they are `Option` because a member can outlive its plan
//! assignment (imported records, retired plans).

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::plan::PlanId;
use crate::error::{GymError, Result};

/// Unique identifier for a member.
///
/// Same shape as [`PlanId`](super::plan::PlanId): non-empty, at most 64
/// characters, ASCII alphanumerics plus `-` and `_`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MemberId(String);

impl MemberId {
    /// Creates a new member id with validation.
    ///
    /// # Errors
    ///
    /// Returns [`GymError::InvalidInput`] if the id is empty, exceeds 64
    /// characters, or contains invalid characters.
    pub fn new<S: Into<String>>(id: S) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(GymError::InvalidInput("member id cannot be empty".into()));
        }
        if id.len() > 64 {
            return Err(GymError::InvalidInput("member id cannot exceed 64 characters".into()));
        }
        if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(GymError::InvalidInput(
                "member id must contain only alphanumeric characters, hyphens, and underscores"
                    .into(),
            ));
        }
        Ok(Self(id))
    }

    /// Generates a fresh random member id.
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

/// Administrative member status, distinct from expiry classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    /// Member is in good standing.
    Active,
    /// Member was deactivated by the admin.
    Inactive,
}

/// Input for registering a new member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterMemberInput {
    /// Member display name. Trimmed before storage.
    pub name: String,
    /// Contact phone number. Trimmed before storage.
    pub phone: String,
    /// Date the membership starts. Defaults to today when omitted.
    pub join_date: Option<NaiveDate>,
    /// Plan assigned at registration.
    pub plan_id: String,
}

impl RegisterMemberInput {
    /// Trims and validates the contact fields, returning `(name, phone)`.
    ///
    /// # Errors
    ///
    /// Returns [`GymError::InvalidInput`] if either field is blank or the
    /// phone exceeds 15 characters.
    pub fn normalized_contact(&self) -> Result<(String, String)> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(GymError::InvalidInput("member name is required".into()));
        }
        let phone = self.phone.trim();
        if phone.is_empty() {
            return Err(GymError::InvalidInput("member phone is required".into()));
        }
        if phone.len() > 15 {
            return Err(GymError::InvalidInput("phone cannot exceed 15 characters".into()));
        }
        Ok((name.to_owned(), phone.to_owned()))
    }
}

/// A registered gym member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    /// Unique member identifier.
    pub id: MemberId,
    /// Display name.
    pub name: String,
    /// Contact phone number.
    pub phone: String,
    /// Date the membership started.
    pub join_date: NaiveDate,
    /// Assigned plan, if any.
    pub plan_id: Option<PlanId>,
    /// Plan name copied at assignment time.
    pub plan_name: Option<String>,
    /// Plan duration in months, copied at assignment time.
    pub plan_duration_months: Option<u32>,
    /// Plan price copied at assignment time; the basis for pending-amount
    /// calculations on the payment page.
    pub monthly_fee: Option<Decimal>,
    /// Current coverage end date. Absent for members without a plan.
    pub plan_end_date: Option<NaiveDate>,
    /// Administrative status.
    pub status: MemberStatus,
    /// Running sum of all fees this member has paid.
    pub total_fees_paid: Decimal,
    /// Timestamp of the most recent payment.
    pub last_payment_date: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_input(name: &str, phone: &str) -> RegisterMemberInput {
        RegisterMemberInput {
            name: name.to_owned(),
            phone: phone.to_owned(),
            join_date: None,
            plan_id: "plan-1".to_owned(),
        }
    }

    #[test]
    fn test_member_id_validation() {
        assert!(MemberId::new("member-1").is_ok());
        assert!(matches!(MemberId::new(""), Err(GymError::InvalidInput(_))));
        assert!(matches!(MemberId::new("has space"), Err(GymError::InvalidInput(_))));
    }

    #[test]
    fn test_normalized_contact_trims() {
        let (name, phone) =
            register_input("  Alice  ", " 9876543210 ").normalized_contact().unwrap();
        assert_eq!(name, "Alice");
        assert_eq!(phone, "9876543210");
    }

    #[test]
    fn test_normalized_contact_rejects_blank_name() {
        let result = register_input("   ", "9876543210").normalized_contact();
        let Err(GymError::InvalidInput(msg)) = result else {
            unreachable!("expected validation error");
        };
        assert_eq!(msg, "member name is required");
    }

    #[test]
    fn test_normalized_contact_rejects_blank_phone() {
        assert!(register_input("Alice", "  ").normalized_contact().is_err());
    }

    #[test]
    fn test_normalized_contact_rejects_long_phone() {
        assert!(register_input("Alice", "1234567890123456").normalized_contact().is_err());
    }

    #[test]
    fn test_member_status_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&MemberStatus::Active).unwrap(), r#""active""#);
        assert_eq!(serde_json::to_string(&MemberStatus::Inactive).unwrap(), r#""inactive""#);
    }

    #[test]
    fn test_member_deserializes_without_plan_fields() {
        let json = r#"{
            "id": "m-1",
            "name": "Alice",
            "phone": "9876543210",
            "join_date": "2024-01-01",
            "status": "active",
            "total_fees_paid": "0",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        }"#;
        let member: Member = serde_json::from_str(json).unwrap();
        assert!(member.plan_id.is_none());
        assert!(member.plan_end_date.is_none());
        assert!(member.last_payment_date.is_none());
    }
}
