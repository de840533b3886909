//! Dashboard aggregation.
//!
//! Everything here is read-only and recomputed per request from the store;
//! nothing is cached or persisted.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::instrument;

use crate::{
    domain::{ExpiryStatus, Member, PaymentStatus, days_until},
    store::MemoryStore,
};

/// Headline counters and money figures.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardStats {
    /// All members on record.
    pub total_members: usize,
    /// Members whose end date is today or later.
    pub active_members: usize,
    /// Members whose end date has passed. Members with no end date count
    /// in neither bucket.
    pub expired_members: usize,
    /// Sum of `paid` payments.
    pub total_revenue: Decimal,
    /// Sum of `pending` payments.
    pub pending_payments: Decimal,
}

/// One row of the expiring-soon panel.
#[derive(Debug, Clone, Serialize)]
pub struct UpcomingExpiry {
    /// The member running out of coverage.
    pub member: Member,
    /// When the coverage ends.
    pub end_date: NaiveDate,
    /// Days from today to the end date, zero on the last day.
    pub days_left: i64,
    /// Classification of the remaining window.
    pub expiry_status: ExpiryStatus,
}

/// The whole dashboard payload.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    /// Headline figures.
    pub stats: DashboardStats,
    /// Five most recent signups, newest join date first.
    pub recent_members: Vec<Member>,
    /// Members expiring within a week, soonest first, at most five.
    pub upcoming_expiries: Vec<UpcomingExpiry>,
}

/// Builds the dashboard from the current store contents.
#[instrument(skip(store))]
pub async fn dashboard_summary(store: &MemoryStore, today: NaiveDate) -> DashboardSummary {
    store
        .read(move |inner| {
            let mut stats =
                DashboardStats { total_members: inner.members.len(), ..Default::default() };
            for member in inner.members.values() {
                match member.plan_end_date {
                    Some(end) if end >= today => stats.active_members += 1,
                    Some(_) => stats.expired_members += 1,
                    None => {}
                }
            }
            for payment in inner.payments.values() {
                match payment.status {
                    PaymentStatus::Paid => stats.total_revenue += payment.amount,
                    PaymentStatus::Pending => stats.pending_payments += payment.amount,
                }
            }

            let mut recent_members: Vec<Member> = inner.members.values().cloned().collect();
            recent_members.sort_by(|a, b| b.join_date.cmp(&a.join_date));
            recent_members.truncate(5);

            let mut upcoming_expiries: Vec<UpcomingExpiry> = inner
                .members
                .values()
                .filter_map(|member| {
                    let end_date = member.plan_end_date?;
                    let days_left = days_until(end_date, today);
                    (0..=7).contains(&days_left).then(|| UpcomingExpiry {
                        member: member.clone(),
                        end_date,
                        days_left,
                        expiry_status: ExpiryStatus::classify(Some(end_date), today),
                    })
                })
                .collect();
            upcoming_expiries.sort_by(|a, b| a.end_date.cmp(&b.end_date));
            upcoming_expiries.truncate(5);

            DashboardSummary { stats, recent_members, upcoming_expiries }
        })
        .await
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::{
        MemberId, MemberStatus, Payment, PaymentId, PaymentType, PlanId,
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn seed_member(
        store: &MemoryStore,
        name: &str,
        join: NaiveDate,
        end: Option<NaiveDate>,
    ) {
        let member = Member {
            id: MemberId::generate(),
            name: name.to_owned(),
            phone: "1234567890".to_owned(),
            join_date: join,
            plan_id: None,
            plan_name: None,
            plan_duration_months: None,
            monthly_fee: Some(Decimal::from(500)),
            plan_end_date: end,
            status: MemberStatus::Active,
            total_fees_paid: Decimal::ZERO,
            last_payment_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        store
            .transact(move |inner| {
                inner.members.insert(member.id.clone(), member);
                Ok(())
            })
            .await
            .unwrap();
    }

    async fn seed_payment(store: &MemoryStore, amount: i64, status: PaymentStatus) {
        let payment = Payment {
            id: PaymentId::generate(),
            member_id: MemberId::generate(),
            member_name: "Seed".to_owned(),
            plan_id: PlanId::generate(),
            plan_name: "Monthly".to_owned(),
            amount: Decimal::from(amount),
            payment_date: Utc::now(),
            due_date: date(2024, 6, 1),
            month_number: 1,
            status,
            payment_type: PaymentType::Initial,
            notes: String::new(),
            created_at: Utc::now(),
        };
        store
            .transact(move |inner| {
                inner.payments.insert(payment.id.clone(), payment);
                Ok(())
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_dashboard_buckets_members_by_end_date() {
        let store = MemoryStore::in_memory();
        let today = date(2024, 6, 15);
        seed_member(&store, "Soon", date(2024, 6, 1), Some(date(2024, 6, 17))).await;
        seed_member(&store, "Later", date(2024, 5, 1), Some(date(2024, 6, 25))).await;
        seed_member(&store, "Gone", date(2024, 4, 1), Some(date(2024, 6, 10))).await;
        seed_member(&store, "Unlinked", date(2024, 3, 1), None).await;

        let summary = dashboard_summary(&store, today).await;
        assert_eq!(summary.stats.total_members, 4);
        assert_eq!(summary.stats.active_members, 2);
        assert_eq!(summary.stats.expired_members, 1);

        // Only "Soon" falls inside the seven-day window.
        assert_eq!(summary.upcoming_expiries.len(), 1);
        let row = &summary.upcoming_expiries[0];
        assert_eq!(row.member.name, "Soon");
        assert_eq!(row.days_left, 2);
        assert_eq!(row.expiry_status, ExpiryStatus::Critical);
    }

    #[tokio::test]
    async fn test_dashboard_revenue_split() {
        let store = MemoryStore::in_memory();
        seed_payment(&store, 1000, PaymentStatus::Paid).await;
        seed_payment(&store, 2500, PaymentStatus::Paid).await;
        seed_payment(&store, 300, PaymentStatus::Pending).await;

        let summary = dashboard_summary(&store, date(2024, 6, 15)).await;
        assert_eq!(summary.stats.total_revenue, Decimal::from(3500));
        assert_eq!(summary.stats.pending_payments, Decimal::from(300));
    }

    #[tokio::test]
    async fn test_dashboard_recent_members_capped_at_five() {
        let store = MemoryStore::in_memory();
        for day in 1..=7 {
            seed_member(&store, &format!("Member {day}"), date(2024, 6, day), None).await;
        }

        let summary = dashboard_summary(&store, date(2024, 6, 15)).await;
        assert_eq!(summary.recent_members.len(), 5);
        assert_eq!(summary.recent_members[0].name, "Member 7");
        assert_eq!(summary.recent_members[4].name, "Member 3");
    }

    #[tokio::test]
    async fn test_dashboard_upcoming_sorted_and_capped() {
        let store = MemoryStore::in_memory();
        let today = date(2024, 6, 15);
        // Seven members expiring across the window, seeded out of order.
        for (name, day) in
            [("D4", 19), ("D1", 16), ("D6", 21), ("D0", 15), ("D7", 22), ("D2", 17), ("D5", 20)]
        {
            seed_member(&store, name, date(2024, 6, 1), Some(date(2024, 6, day))).await;
        }

        let summary = dashboard_summary(&store, today).await;
        assert_eq!(summary.upcoming_expiries.len(), 5);
        let order: Vec<&str> =
            summary.upcoming_expiries.iter().map(|u| u.member.name.as_str()).collect();
        assert_eq!(order, ["D0", "D1", "D2", "D4", "D5"]);
        assert_eq!(summary.upcoming_expiries[0].days_left, 0);
    }

    #[tokio::test]
    async fn test_dashboard_empty_store() {
        let store = MemoryStore::in_memory();
        let summary = dashboard_summary(&store, date(2024, 6, 15)).await;
        assert_eq!(summary.stats.total_members, 0);
        assert_eq!(summary.stats.total_revenue, Decimal::ZERO);
        assert!(summary.recent_members.is_empty());
        assert!(summary.upcoming_expiries.is_empty());
    }
}
