//! Core domain model for gym administration.
//!
//! This module defines the four record types the service manages (plans,
//! members, payments, subscriptions), their validated identifiers, and the
//! expiry classification shared by every surface that displays membership
//! status.

pub mod expiry;
pub mod member;
pub mod payment;
pub mod plan;
pub mod subscription;

pub use expiry::{ExpiryStatus, days_until};
pub use member::{Member, MemberId, MemberStatus, RegisterMemberInput};
pub use payment::{Payment, PaymentId, PaymentStatus, PaymentType};
pub use plan::{Plan, PlanId, PlanInput};
pub use subscription::{Subscription, SubscriptionId, SubscriptionStatus};
