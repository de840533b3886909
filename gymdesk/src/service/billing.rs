//! Renewal and payment operations.
//!
//! Renewal is the one workflow that touches all three collections at once:
//! it rewrites the member's plan linkage, appends a payment, and upserts
//! the subscription, in a single transaction.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use super::{coverage_end, registry::MemberView};
use crate::{
    domain::{
        ExpiryStatus, Member, MemberId, MemberStatus, Payment, PaymentId, PaymentStatus,
        PaymentType, PlanId, Subscription, SubscriptionId, SubscriptionStatus,
    },
    error::{GymError, Result},
    store::MemoryStore,
};

/// Input for [`renew_membership`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenewMembershipRequest {
    /// Member being renewed.
    pub member_id: String,
    /// Plan the renewal is charged against.
    pub plan_id: String,
    /// Amount charged. Defaults to the plan's price.
    #[serde(default)]
    pub amount: Option<Decimal>,
}

/// Everything a successful renewal produced.
#[derive(Debug, Clone, Serialize)]
pub struct RenewalOutcome {
    /// The member, after the plan linkage rewrite.
    pub member: Member,
    /// The recorded renewal payment.
    pub payment: Payment,
    /// The subscription after the upsert.
    pub subscription: Subscription,
    /// End date before the renewal, when there was one.
    pub previous_end_date: Option<NaiveDate>,
    /// End date after the renewal.
    pub new_end_date: NaiveDate,
    /// Days the membership had already lapsed when the renewal landed.
    /// Zero when coverage was still running.
    pub lapsed_days: i64,
}

/// Classification filter for the renewal candidate cards.
///
/// Matching is exact against [`ExpiryStatus`], except that `Warning` also
/// matches `critical`. Members with no end date classify as `unknown` and
/// only appear under `All`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenewalStatusFilter {
    /// Classified exactly `expired`.
    #[default]
    Expired,
    /// Classified exactly `active`.
    Active,
    /// Classified `warning` or `critical`.
    Warning,
    /// No classification filtering.
    All,
}

impl RenewalStatusFilter {
    fn matches(self, status: ExpiryStatus) -> bool {
        match self {
            Self::All => true,
            Self::Expired => status == ExpiryStatus::Expired,
            Self::Active => status == ExpiryStatus::Active,
            Self::Warning => {
                matches!(status, ExpiryStatus::Warning | ExpiryStatus::Critical)
            }
        }
    }
}

/// Aggregate figures for the payment page header.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BillingOverview {
    /// Members classified exactly `expired`.
    pub total_expired: usize,
    /// Members classified exactly `active`.
    pub total_active: usize,
    /// Sum of all `paid` payments.
    pub total_revenue: Decimal,
    /// Sum of `monthly_fee` over members classified exactly `expired`.
    pub pending_amount: Decimal,
}

/// Renews a member onto a plan.
///
/// Coverage extends from the member's current end date when one exists,
/// even if that date has already passed: a lapsed gap is credited to the
/// member, reported as `lapsed_days` on the outcome, and logged as a
/// warning. Without an end date on record, coverage extends from `today`.
///
/// The member rewrite, the renewal payment, and the subscription upsert
/// commit in one transaction.
///
/// # Errors
///
/// Returns [`GymError::InvalidInput`] for a non-positive amount,
/// [`GymError::MemberNotFound`] or [`GymError::PlanNotFound`] for unknown
/// ids. Nothing is written on any error.
#[instrument(
    skip(store, request),
    fields(member_id = %request.member_id, plan_id = %request.plan_id)
)]
pub async fn renew_membership(
    store: &MemoryStore,
    request: RenewMembershipRequest,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> Result<RenewalOutcome> {
    if let Some(amount) = request.amount {
        if amount <= Decimal::ZERO {
            return Err(GymError::InvalidInput("renewal amount must be greater than 0".into()));
        }
    }
    let member_id = MemberId::new(request.member_id.as_str())?;
    let plan_id = PlanId::new(request.plan_id.as_str())?;

    let outcome = store
        .transact(move |inner| {
            let Some(plan) = inner.plans.get(&plan_id).cloned() else {
                return Err(GymError::PlanNotFound(plan_id.as_str().to_owned()));
            };
            let prior_payments = inner.payment_count_for(&member_id);
            let Some(member) = inner.members.get_mut(&member_id) else {
                return Err(GymError::MemberNotFound(member_id.as_str().to_owned()));
            };

            let previous_end_date = member.plan_end_date;
            let base_date = previous_end_date.unwrap_or(today);
            let new_end_date = coverage_end(base_date, plan.duration_months)?;
            let amount = request.amount.unwrap_or(plan.price);

            member.plan_id = Some(plan.id.clone());
            member.plan_name = Some(plan.name.clone());
            member.plan_duration_months = Some(plan.duration_months);
            member.monthly_fee = Some(plan.price);
            member.plan_end_date = Some(new_end_date);
            member.status = MemberStatus::Active;
            member.total_fees_paid += amount;
            member.last_payment_date = Some(now);
            member.updated_at = now;
            let member = member.clone();

            let payment = Payment {
                id: PaymentId::generate(),
                member_id: member_id.clone(),
                member_name: member.name.clone(),
                plan_id: plan.id.clone(),
                plan_name: plan.name.clone(),
                amount,
                payment_date: now,
                due_date: base_date,
                month_number: u32::try_from(prior_payments).unwrap_or(u32::MAX).saturating_add(1),
                status: PaymentStatus::Paid,
                payment_type: PaymentType::Renewal,
                notes: format!("Extended membership by {} month(s)", plan.duration_months),
                created_at: now,
            };
            inner.payments.insert(payment.id.clone(), payment.clone());

            let subscription = match inner.subscription_for_mut(&member_id) {
                Some(existing) => {
                    existing.end_date = new_end_date;
                    existing.status = SubscriptionStatus::Active;
                    existing.updated_at = now;
                    existing.clone()
                }
                None => {
                    let fresh = Subscription {
                        id: SubscriptionId::generate(),
                        member_id: member_id.clone(),
                        member_name: member.name.clone(),
                        plan_id: plan.id,
                        plan_name: plan.name,
                        start_date: today,
                        end_date: new_end_date,
                        amount,
                        status: SubscriptionStatus::Active,
                        created_at: now,
                        updated_at: now,
                    };
                    inner.subscriptions.insert(fresh.id.clone(), fresh.clone());
                    fresh
                }
            };

            let lapsed_days =
                previous_end_date.map_or(0, |prev| (today - prev).num_days().max(0));
            Ok(RenewalOutcome {
                member,
                payment,
                subscription,
                previous_end_date,
                new_end_date,
                lapsed_days,
            })
        })
        .await?;

    if outcome.lapsed_days > 0 {
        warn!(
            lapsed_days = outcome.lapsed_days,
            new_end_date = %outcome.new_end_date,
            "renewal extended from an already-passed end date"
        );
    }
    info!(
        payment_id = %outcome.payment.id.as_str(),
        new_end_date = %outcome.new_end_date,
        "membership renewed"
    );
    Ok(outcome)
}

/// All payments, newest first.
#[instrument(skip(store))]
pub async fn list_payments(store: &MemoryStore) -> Vec<Payment> {
    store
        .read(|inner| {
            let mut payments: Vec<Payment> = inner.payments.values().cloned().collect();
            payments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            payments
        })
        .await
}

/// Members shown as renewal candidates, newest first.
///
/// `search` matches the name case-insensitively and the phone verbatim.
#[instrument(skip(store, search))]
pub async fn renewal_candidates(
    store: &MemoryStore,
    search: &str,
    filter: RenewalStatusFilter,
    today: NaiveDate,
) -> Vec<MemberView> {
    let needle = search.to_lowercase();
    let raw = search.to_owned();
    store
        .read(move |inner| {
            let mut members: Vec<&Member> = inner
                .members
                .values()
                .filter(|m| {
                    let matches_search = needle.is_empty()
                        || m.name.to_lowercase().contains(&needle)
                        || m.phone.contains(&raw);
                    matches_search
                        && filter.matches(ExpiryStatus::classify(m.plan_end_date, today))
                })
                .collect();
            members.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            members.into_iter().map(|m| MemberView::build(m.clone(), today)).collect()
        })
        .await
}

/// Computes the payment page header figures.
#[instrument(skip(store))]
pub async fn billing_overview(store: &MemoryStore, today: NaiveDate) -> BillingOverview {
    store
        .read(move |inner| {
            let mut overview = BillingOverview::default();
            for member in inner.members.values() {
                match ExpiryStatus::classify(member.plan_end_date, today) {
                    ExpiryStatus::Expired => {
                        overview.total_expired += 1;
                        overview.pending_amount +=
                            member.monthly_fee.unwrap_or(Decimal::ZERO);
                    }
                    ExpiryStatus::Active => overview.total_active += 1,
                    _ => {}
                }
            }
            overview.total_revenue = inner
                .payments
                .values()
                .filter(|p| p.status == PaymentStatus::Paid)
                .fold(Decimal::ZERO, |acc, p| acc + p.amount);
            overview
        })
        .await
}
