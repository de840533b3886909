//! Member registry operations.
//!
//! Registration writes three records in one transaction: the member, the
//! initial payment, and the first subscription. Deletion cascades the same
//! three collections in reverse.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::coverage_end;
use crate::{
    domain::{
        ExpiryStatus, Member, MemberId, MemberStatus, Payment, PaymentId, PaymentStatus,
        PaymentType, PlanId, RegisterMemberInput, Subscription, SubscriptionId,
        SubscriptionStatus, days_until,
    },
    error::{GymError, Result},
    store::MemoryStore,
};

/// Status filter for the member list page.
///
/// `Active` means the end date is on or after today; `Expired` is the
/// exact complement, including members with no end date at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberListStatus {
    /// No status filtering.
    #[default]
    All,
    /// End date present and not yet passed.
    Active,
    /// End date passed, or no end date on record.
    Expired,
}

/// A member plus the expiry classification the list pages display.
#[derive(Debug, Clone, Serialize)]
pub struct MemberView {
    /// The member record.
    pub member: Member,
    /// Expiry classification as of the request date.
    pub expiry_status: ExpiryStatus,
    /// Signed days until the end date; absent when there is none.
    pub days_until_expiry: Option<i64>,
}

impl MemberView {
    pub(super) fn build(member: Member, today: NaiveDate) -> Self {
        let expiry_status = ExpiryStatus::classify(member.plan_end_date, today);
        let days_until_expiry = member.plan_end_date.map(|end| days_until(end, today));
        Self { member, expiry_status, days_until_expiry }
    }
}

/// Everything created by one successful registration.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationOutcome {
    /// The new member, with plan linkage and end date filled in.
    pub member: Member,
    /// The initial payment, always `month_number` 1.
    pub payment: Payment,
    /// The first coverage window.
    pub subscription: Subscription,
}

/// Records removed by a member cascade delete.
#[derive(Debug, Clone, Serialize)]
pub struct MemberCascadeOutcome {
    /// Id of the deleted member.
    pub member_id: String,
    /// Payments removed by the cascade.
    pub payments_removed: usize,
    /// Subscriptions removed by the cascade.
    pub subscriptions_removed: usize,
}

/// Registers a member on a plan.
///
/// The join date defaults to `today`. Coverage runs from the join date for
/// the plan's full duration; the plan's price becomes the first payment
/// and the starting value of `total_fees_paid`. All three records commit
/// atomically.
///
/// # Errors
///
/// Returns [`GymError::InvalidInput`] for blank contact fields and
/// [`GymError::PlanNotFound`] when the chosen plan does not exist. Either
/// way nothing is written.
#[instrument(skip(store, input), fields(member_name = %input.name, plan_id = %input.plan_id))]
pub async fn register_member(
    store: &MemoryStore,
    input: RegisterMemberInput,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> Result<RegistrationOutcome> {
    let (name, phone) = input.normalized_contact()?;
    let plan_id = PlanId::new(input.plan_id.as_str())?;
    let join_date = input.join_date.unwrap_or(today);

    let outcome = store
        .transact(move |inner| {
            let Some(plan) = inner.plans.get(&plan_id).cloned() else {
                return Err(GymError::PlanNotFound(plan_id.as_str().to_owned()));
            };
            let end_date = coverage_end(join_date, plan.duration_months)?;

            let member = Member {
                id: MemberId::generate(),
                name,
                phone,
                join_date,
                plan_id: Some(plan.id.clone()),
                plan_name: Some(plan.name.clone()),
                plan_duration_months: Some(plan.duration_months),
                monthly_fee: Some(plan.price),
                plan_end_date: Some(end_date),
                status: MemberStatus::Active,
                total_fees_paid: plan.price,
                last_payment_date: Some(now),
                created_at: now,
                updated_at: now,
            };
            let payment = Payment {
                id: PaymentId::generate(),
                member_id: member.id.clone(),
                member_name: member.name.clone(),
                plan_id: plan.id.clone(),
                plan_name: plan.name.clone(),
                amount: plan.price,
                payment_date: now,
                due_date: join_date,
                month_number: 1,
                status: PaymentStatus::Paid,
                payment_type: PaymentType::Initial,
                notes: String::new(),
                created_at: now,
            };
            let subscription = Subscription {
                id: SubscriptionId::generate(),
                member_id: member.id.clone(),
                member_name: member.name.clone(),
                plan_id: plan.id,
                plan_name: plan.name,
                start_date: join_date,
                end_date,
                amount: plan.price,
                status: SubscriptionStatus::Active,
                created_at: now,
                updated_at: now,
            };

            inner.members.insert(member.id.clone(), member.clone());
            inner.payments.insert(payment.id.clone(), payment.clone());
            inner.subscriptions.insert(subscription.id.clone(), subscription.clone());

            Ok(RegistrationOutcome { member, payment, subscription })
        })
        .await?;
    info!(
        member_id = %outcome.member.id.as_str(),
        end_date = %outcome.subscription.end_date,
        "member registered"
    );
    Ok(outcome)
}

/// Lists members newest first, with search and status filtering.
///
/// `search` matches the name case-insensitively and the phone verbatim;
/// an empty string matches everyone.
#[instrument(skip(store, search))]
pub async fn list_members(
    store: &MemoryStore,
    search: &str,
    status: MemberListStatus,
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
                    let is_current = m.plan_end_date.is_some_and(|end| end >= today);
                    let matches_status = match status {
                        MemberListStatus::All => true,
                        MemberListStatus::Active => is_current,
                        MemberListStatus::Expired => !is_current,
                    };
                    matches_search && matches_status
                })
                .collect();
            members.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            members.into_iter().map(|m| MemberView::build(m.clone(), today)).collect()
        })
        .await
}

/// Fetches one member by id.
///
/// # Errors
///
/// Returns [`GymError::MemberNotFound`] for an unknown id.
#[instrument(skip(store), fields(member_id = %id))]
pub async fn get_member(store: &MemoryStore, id: &str) -> Result<Member> {
    let member_id = MemberId::new(id)?;
    store
        .read(move |inner| {
            inner
                .members
                .get(&member_id)
                .cloned()
                .ok_or_else(|| GymError::MemberNotFound(member_id.as_str().to_owned()))
        })
        .await
}

/// Deletes a member and every payment and subscription bearing its id.
///
/// # Errors
///
/// Returns [`GymError::MemberNotFound`] for an unknown id; nothing is
/// removed in that case.
#[instrument(skip(store), fields(member_id = %id))]
pub async fn delete_member(store: &MemoryStore, id: &str) -> Result<MemberCascadeOutcome> {
    let member_id = MemberId::new(id)?;
    let outcome = store
        .transact(move |inner| {
            if inner.members.remove(&member_id).is_none() {
                return Err(GymError::MemberNotFound(member_id.as_str().to_owned()));
            }

            let payments_before = inner.payments.len();
            inner.payments.retain(|_, p| p.member_id != member_id);
            let payments_removed = payments_before - inner.payments.len();

            let subscriptions_before = inner.subscriptions.len();
            inner.subscriptions.retain(|_, s| s.member_id != member_id);
            let subscriptions_removed = subscriptions_before - inner.subscriptions.len();

            Ok(MemberCascadeOutcome {
                member_id: member_id.as_str().to_owned(),
                payments_removed,
                subscriptions_removed,
            })
        })
        .await?;
    info!(
        payments_removed = outcome.payments_removed,
        subscriptions_removed = outcome.subscriptions_removed,
        "member deleted"
    );
    Ok(outcome)
}
