//! Plan catalog operations.
//!
//! Create, update, list, and delete membership plans. Deletion is guarded:
//! a plan with members still on it cannot be removed, and a successful
//! delete cascades to the plan's payments and subscriptions in the same
//! transaction.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, instrument};

use crate::{
    domain::{Plan, PlanId, PlanInput},
    error::{GymError, Result},
    store::MemoryStore,
};

/// A plan as shown on the catalog page, with its current member count.
#[derive(Debug, Clone, Serialize)]
pub struct PlanListing {
    /// The plan record.
    pub plan: Plan,
    /// Number of members currently on this plan. A non-zero count blocks
    /// deletion.
    pub member_count: usize,
}

/// Records removed by a successful plan cascade delete.
#[derive(Debug, Clone, Serialize)]
pub struct PlanCascadeOutcome {
    /// Id of the deleted plan.
    pub plan_id: String,
    /// Payments removed by the cascade.
    pub payments_removed: usize,
    /// Subscriptions removed by the cascade.
    pub subscriptions_removed: usize,
}

/// Validates input and creates a new plan.
///
/// # Errors
///
/// Returns [`GymError::InvalidInput`] for a blank name, zero duration, or
/// non-positive price.
#[instrument(skip(store, input), fields(plan_name = %input.name))]
pub async fn create_plan(
    store: &MemoryStore,
    input: PlanInput,
    now: DateTime<Utc>,
) -> Result<Plan> {
    let plan = Plan::new(&input, now)?;
    let created = store
        .transact(move |inner| {
            inner.plans.insert(plan.id.clone(), plan.clone());
            Ok(plan)
        })
        .await?;
    info!(plan_id = %created.id.as_str(), "plan created");
    Ok(created)
}

/// Re-validates input and overwrites an existing plan.
///
/// # Errors
///
/// Returns [`GymError::PlanNotFound`] for an unknown id, plus all
/// validation errors of [`create_plan`].
#[instrument(skip(store, input), fields(plan_id = %id))]
pub async fn update_plan(
    store: &MemoryStore,
    id: &str,
    input: PlanInput,
    now: DateTime<Utc>,
) -> Result<Plan> {
    let plan_id = PlanId::new(id)?;
    let updated = store
        .transact(move |inner| {
            let Some(plan) = inner.plans.get_mut(&plan_id) else {
                return Err(GymError::PlanNotFound(plan_id.as_str().to_owned()));
            };
            plan.apply_update(&input, now)?;
            Ok(plan.clone())
        })
        .await?;
    info!("plan updated");
    Ok(updated)
}

/// Lists all plans, shortest duration first, with member counts.
///
/// Ties on duration break by name so the catalog page is stable.
#[instrument(skip(store))]
pub async fn list_plans(store: &MemoryStore) -> Vec<PlanListing> {
    store
        .read(|inner| {
            let mut listings: Vec<PlanListing> = inner
                .plans
                .values()
                .map(|plan| PlanListing {
                    member_count: inner.members_referencing(&plan.id).len(),
                    plan: plan.clone(),
                })
                .collect();
            listings.sort_by(|a, b| {
                a.plan
                    .duration_months
                    .cmp(&b.plan.duration_months)
                    .then_with(|| a.plan.name.cmp(&b.plan.name))
            });
            listings
        })
        .await
}

/// Deletes a plan and cascades to its payments and subscriptions.
///
/// The delete is refused outright while any member references the plan; a
/// refused delete performs no writes at all.
///
/// # Errors
///
/// Returns [`GymError::PlanNotFound`] for an unknown id and
/// [`GymError::PlanInUse`] naming the blocking members when the guard
/// trips.
#[instrument(skip(store), fields(plan_id = %id))]
pub async fn delete_plan(store: &MemoryStore, id: &str) -> Result<PlanCascadeOutcome> {
    let plan_id = PlanId::new(id)?;
    let outcome = store
        .transact(move |inner| {
            if !inner.plans.contains_key(&plan_id) {
                return Err(GymError::PlanNotFound(plan_id.as_str().to_owned()));
            }

            let blocking: Vec<String> =
                inner.members_referencing(&plan_id).iter().map(|m| m.name.clone()).collect();
            if !blocking.is_empty() {
                return Err(GymError::PlanInUse {
                    member_count: blocking.len(),
                    member_names: blocking.join(", "),
                });
            }

            let payments_before = inner.payments.len();
            inner.payments.retain(|_, p| p.plan_id != plan_id);
            let payments_removed = payments_before - inner.payments.len();

            let subscriptions_before = inner.subscriptions.len();
            inner.subscriptions.retain(|_, s| s.plan_id != plan_id);
            let subscriptions_removed = subscriptions_before - inner.subscriptions.len();

            inner.plans.remove(&plan_id);

            Ok(PlanCascadeOutcome {
                plan_id: plan_id.as_str().to_owned(),
                payments_removed,
                subscriptions_removed,
            })
        })
        .await?;
    info!(
        payments_removed = outcome.payments_removed,
        subscriptions_removed = outcome.subscriptions_removed,
        "plan deleted"
    );
    Ok(outcome)
}
