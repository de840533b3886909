//! Operations over the store, one module per admin surface.
//!
//! - [`catalog`] - plan CRUD with the guarded cascade delete
//! - [`registry`] - member registration, listing, cascade delete
//! - [`billing`] - the renewal workflow and payment-page queries
//! - [`dashboard`] - read-only aggregation for the landing page
//!
//! Every operation takes the store plus explicit `today`/`now` values, so
//! callers (and tests) control the clock. Multi-record writes run inside
//! [`MemoryStore::transact`](crate::store::MemoryStore::transact) and
//! commit all-or-nothing.

pub mod billing;
pub mod catalog;
pub mod dashboard;
pub mod registry;

pub use billing::{
    BillingOverview, RenewMembershipRequest, RenewalOutcome, RenewalStatusFilter, billing_overview,
    list_payments, renew_membership, renewal_candidates,
};
pub use catalog::{
    PlanCascadeOutcome, PlanListing, create_plan, delete_plan, list_plans, update_plan,
};
pub use dashboard::{DashboardStats, DashboardSummary, UpcomingExpiry, dashboard_summary};
pub use registry::{
    MemberCascadeOutcome, MemberListStatus, MemberView, RegistrationOutcome, delete_member,
    get_member, list_members, register_member,
};

use chrono::{Months, NaiveDate};

use crate::error::{GymError, Result};

/// Adds whole calendar months to a coverage date.
///
/// Month-length overflow clamps to the last day of the target month:
/// Jan 31 + 1 month = Feb 28 or 29.
///
/// # Errors
///
/// Returns [`GymError::InvalidInput`] only if the result would leave the
/// representable date range.
pub fn coverage_end(start: NaiveDate, months: u32) -> Result<NaiveDate> {
    start
        .checked_add_months(Months::new(months))
        .ok_or_else(|| GymError::InvalidInput(format!("cannot add {months} months to {start}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_coverage_end_plain() {
        assert_eq!(coverage_end(date(2024, 1, 1), 1).unwrap(), date(2024, 2, 1));
        assert_eq!(coverage_end(date(2024, 2, 1), 3).unwrap(), date(2024, 5, 1));
    }

    #[test]
    fn test_coverage_end_clamps_to_month_end() {
        assert_eq!(coverage_end(date(2024, 1, 31), 1).unwrap(), date(2024, 2, 29));
        assert_eq!(coverage_end(date(2023, 1, 31), 1).unwrap(), date(2023, 2, 28));
        assert_eq!(coverage_end(date(2024, 8, 31), 1).unwrap(), date(2024, 9, 30));
    }

    #[test]
    fn test_coverage_end_across_year_boundary() {
        assert_eq!(coverage_end(date(2024, 11, 15), 3).unwrap(), date(2025, 2, 15));
        assert_eq!(coverage_end(date(2024, 1, 1), 12).unwrap(), date(2025, 1, 1));
    }
}
