//! Gym Membership Administration Library
//!
//! Core domain and services for a single-tenant gym administration tool:
//! membership plans, member registration, renewal billing, and expiry
//! tracking, backed by an in-memory store with optional JSON snapshots.
//!
//! # Overview
//!
//! The crate is split along the same lines as the screens it serves:
//!
//! - [`domain`]: plans, members, payments, subscriptions, and the expiry
//!   classification shared by every listing.
//! - [`store`]: the [`store::MemoryStore`], four keyed collections behind
//!   one lock, with all-or-nothing transactions and snapshot persistence.
//! - [`service`]: the operations themselves, grouped into plan catalog,
//!   member registry, renewal billing, and dashboard aggregation.
//! - [`auth`]: the single-admin session gate.
//! - [`config`]: TOML configuration with environment overrides.
//!
//! No HTTP types appear anywhere here; serving this over the wire is the
//! `gymdesk-server` crate's job.
//!
//! # Examples
//!
//! ```no_run
//! use chrono::Utc;
//! use gymdesk::{
//!     domain::{PlanInput, RegisterMemberInput},
//!     service,
//!     store::MemoryStore,
//! };
//!
//! # async fn example() -> gymdesk::Result<()> {
//! // Open a store that snapshots to disk after every commit.
//! let store = MemoryStore::open("gymdesk.json")?;
//!
//! let plan = service::create_plan(
//!     &store,
//!     PlanInput {
//!         name: "Monthly".into(),
//!         description: String::new(),
//!         duration_months: 1,
//!         price: rust_decimal::Decimal::new(100_000, 2),
//!         is_active: true,
//!     },
//!     Utc::now(),
//! )
//! .await?;
//!
//! // Registration writes the member, the first payment, and the
//! // subscription in one transaction.
//! let outcome = service::register_member(
//!     &store,
//!     RegisterMemberInput {
//!         name: "Alice".into(),
//!         phone: "9876543210".into(),
//!         join_date: None,
//!         plan_id: plan.id.as_str().into(),
//!     },
//!     Utc::now().date_naive(),
//!     Utc::now(),
//! )
//! .await?;
//! println!("coverage until {:?}", outcome.member.plan_end_date);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod service;
pub mod store;

pub use error::{GymError, Result};
