//! Membership plan records.
//!
//! A plan is a named tier: a coverage duration in calendar months and a
//! total price for that duration. Members reference plans by id and carry
//! denormalized copies of the plan fields from the moment of assignment, so
//! editing a plan never rewrites member records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{GymError, Result};

/// Unique identifier for a membership plan.
///
/// Validated on construction: non-empty, at most 64 characters, ASCII
/// alphanumerics plus `-` and `_` only.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlanId(String);

impl PlanId {
    /// Creates a new plan id with validation.
    ///
    /// # Errors
    ///
    /// Returns [`GymError::InvalidInput`] if the id is empty, exceeds 64
    /// characters, or contains invalid characters.
    pub fn new<S: Into<String>>(id: S) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(GymError::InvalidInput("plan id cannot be empty".into()));
        }
        if id.len() > 64 {
            return Err(GymError::InvalidInput("plan id cannot exceed 64 characters".into()));
        }
        if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(GymError::InvalidInput(
                "plan id must contain only alphanumeric characters, hyphens, and underscores"
                    .into(),
            ));
        }
        Ok(Self(id))
    }

    /// Generates a fresh random plan id.
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

/// Input for creating or updating a plan.
///
/// Deserialized straight from client JSON; validation happens when the
/// input is turned into a [`Plan`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanInput {
    /// Display name. Trimmed before storage.
    pub name: String,
    /// Free-form description. May be empty.
    #[serde(default)]
    pub description: String,
    /// Coverage length in calendar months.
    pub duration_months: u32,
    /// Total price for the full duration.
    pub price: Decimal,
    /// Whether the plan is offered for signups and renewals.
    #[serde(default = "default_is_active")]
    pub is_active: bool,
}

fn default_is_active() -> bool {
    true
}

/// A membership plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    /// Unique plan identifier.
    pub id: PlanId,
    /// Display name.
    pub name: String,
    /// Free-form description. May be empty.
    #[serde(default)]
    pub description: String,
    /// Coverage length in calendar months. Always at least 1.
    pub duration_months: u32,
    /// Total price for the full duration. Always positive.
    pub price: Decimal,
    /// Whether the plan is offered for signups and renewals.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Plan {
    /// Validates input and creates a new plan with a generated id.
    ///
    /// # Errors
    ///
    /// Returns [`GymError::InvalidInput`] if the name is empty after
    /// trimming, the duration is zero, or the price is not positive.
    pub fn new(input: &PlanInput, now: DateTime<Utc>) -> Result<Self> {
        let (name, description) = validated_fields(input)?;
        Ok(Self {
            id: PlanId::generate(),
            name,
            description,
            duration_months: input.duration_months,
            price: input.price,
            is_active: input.is_active,
            created_at: now,
            updated_at: now,
        })
    }

    /// Re-validates input and overwrites the editable fields.
    ///
    /// `created_at` is preserved; `updated_at` is set to `now`.
    ///
    /// # Errors
    ///
    /// Same validation as [`Plan::new`].
    pub fn apply_update(&mut self, input: &PlanInput, now: DateTime<Utc>) -> Result<()> {
        let (name, description) = validated_fields(input)?;
        self.name = name;
        self.description = description;
        self.duration_months = input.duration_months;
        self.price = input.price;
        self.is_active = input.is_active;
        self.updated_at = now;
        Ok(())
    }

    /// Price per month, derived from the total price and the duration.
    ///
    /// Derived on demand rather than stored so it can never drift from the
    /// fields it is computed from. Duration is at least 1 for any validated
    /// plan, so the division is total.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use gymdesk::domain::{Plan, PlanInput};
    /// use rust_decimal::Decimal;
    ///
    /// let input = PlanInput {
    ///     name: "Annual".to_owned(),
    ///     description: String::new(),
    ///     duration_months: 12,
    ///     price: Decimal::from(1200),
    ///     is_active: true,
    /// };
    /// let plan = Plan::new(&input, chrono::Utc::now()).unwrap();
    /// assert_eq!(plan.monthly_rate(), Decimal::from(100));
    /// ```
    #[must_use]
    pub fn monthly_rate(&self) -> Decimal {
        self.price / Decimal::from(self.duration_months)
    }
}

fn validated_fields(input: &PlanInput) -> Result<(String, String)> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(GymError::InvalidInput("plan name is required".into()));
    }
    if input.duration_months == 0 {
        return Err(GymError::InvalidInput("duration must be at least 1 month".into()));
    }
    if input.price <= Decimal::ZERO {
        return Err(GymError::InvalidInput("price must be greater than 0".into()));
    }
    Ok((name.to_owned(), input.description.trim().to_owned()))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn input(name: &str, months: u32, price: Decimal) -> PlanInput {
        PlanInput {
            name: name.to_owned(),
            description: String::new(),
            duration_months: months,
            price,
            is_active: true,
        }
    }

    // ========================================================================
    // PlanId Tests
    // ========================================================================

    #[test]
    fn test_plan_id_valid() {
        let id = PlanId::new("plan-basic_01").unwrap();
        assert_eq!(id.as_str(), "plan-basic_01");
    }

    #[test]
    fn test_plan_id_empty() {
        let result = PlanId::new("");
        assert!(matches!(result, Err(GymError::InvalidInput(_))));
    }

    #[test]
    fn test_plan_id_too_long() {
        let result = PlanId::new("a".repeat(65));
        assert!(matches!(result, Err(GymError::InvalidInput(_))));
    }

    #[test]
    fn test_plan_id_invalid_chars() {
        let result = PlanId::new("plan id!");
        assert!(matches!(result, Err(GymError::InvalidInput(_))));
    }

    #[test]
    fn test_plan_id_generate_is_valid() {
        let id = PlanId::generate();
        let revalidated = PlanId::new(id.as_str()).unwrap();
        assert_eq!(revalidated.as_str(), id.as_str());
    }

    // ========================================================================
    // Validation Tests
    // ========================================================================

    #[test]
    fn test_new_plan_trims_name() {
        let plan = Plan::new(&input("  Monthly  ", 1, Decimal::from(1000)), Utc::now()).unwrap();
        assert_eq!(plan.name, "Monthly");
        assert_eq!(plan.duration_months, 1);
        assert!(plan.is_active);
    }

    #[test]
    fn test_new_plan_rejects_blank_name() {
        let result = Plan::new(&input("   ", 1, Decimal::from(1000)), Utc::now());
        let Err(GymError::InvalidInput(msg)) = result else {
            unreachable!("expected validation error");
        };
        assert_eq!(msg, "plan name is required");
    }

    #[test]
    fn test_new_plan_rejects_zero_duration() {
        let result = Plan::new(&input("Monthly", 0, Decimal::from(1000)), Utc::now());
        assert!(matches!(result, Err(GymError::InvalidInput(_))));
    }

    #[test]
    fn test_new_plan_rejects_non_positive_price() {
        for price in [Decimal::ZERO, Decimal::from(-5)] {
            let result = Plan::new(&input("Monthly", 1, price), Utc::now());
            assert!(matches!(result, Err(GymError::InvalidInput(_))), "price {price} accepted");
        }
    }

    #[test]
    fn test_apply_update_preserves_created_at() {
        let created = Utc::now();
        let mut plan = Plan::new(&input("Monthly", 1, Decimal::from(1000)), created).unwrap();

        let later = created + chrono::Duration::hours(1);
        plan.apply_update(&input("Quarterly", 3, Decimal::from(2700)), later).unwrap();

        assert_eq!(plan.name, "Quarterly");
        assert_eq!(plan.duration_months, 3);
        assert_eq!(plan.created_at, created);
        assert_eq!(plan.updated_at, later);
    }

    #[test]
    fn test_apply_update_rejects_bad_input_without_mutation() {
        let mut plan = Plan::new(&input("Monthly", 1, Decimal::from(1000)), Utc::now()).unwrap();
        let before = plan.clone();

        let result = plan.apply_update(&input("", 1, Decimal::from(500)), Utc::now());
        assert!(result.is_err());
        assert_eq!(plan.name, before.name);
        assert_eq!(plan.price, before.price);
    }

    // ========================================================================
    // Monthly Rate Tests
    // ========================================================================

    #[test]
    fn test_monthly_rate_divides_evenly() {
        let plan = Plan::new(&input("Annual", 12, Decimal::from(1200)), Utc::now()).unwrap();
        assert_eq!(plan.monthly_rate(), Decimal::from(100));
    }

    #[test]
    fn test_monthly_rate_fractional() {
        let plan = Plan::new(&input("Quarterly", 3, Decimal::from(1000)), Utc::now()).unwrap();
        let rate = plan.monthly_rate();
        // 1000 / 3 = 333.33..., exact to well past cent precision.
        assert_eq!(rate.round_dp(2), Decimal::new(33333, 2));
    }

    #[test]
    fn test_serde_round_trip() {
        let plan = Plan::new(&input("Monthly", 1, Decimal::new(99950, 2)), Utc::now()).unwrap();
        let json = serde_json::to_string(&plan).unwrap();
        let back: Plan = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, plan.id);
        assert_eq!(back.price, plan.price);
    }

    proptest! {
        #[test]
        fn prop_monthly_rate_times_duration_recovers_price(
            months in 1u32..=60,
            cents in 1i64..=10_000_000,
        ) {
            let price = Decimal::new(cents, 2);
            let plan = Plan::new(&input("P", months, price), Utc::now()).unwrap();
            let recovered = plan.monthly_rate() * Decimal::from(months);
            let delta = (recovered - price).abs();
            // Rate times duration matches the price to under a cent.
            prop_assert!(delta < Decimal::new(1, 2), "delta {delta} for {price} / {months}");
        }
    }
}
