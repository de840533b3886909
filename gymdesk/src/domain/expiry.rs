//! Expiry status classification.
//!
//! One classification shared by the member list, the payment page, and the
//! dashboard, so every surface agrees on who is expiring and when.
//!
//! # Classification Rules
//!
//! Given the signed number of whole days from today to the coverage end
//! date:
//!
//! | Days remaining | Status     |
//! |----------------|------------|
//! | < 0            | `expired`  |
//! | 0 to 3         | `critical` |
//! | 4 to 7         | `warning`  |
//! | > 7            | `active`   |
//! | no end date    | `unknown`  |

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// How close a member's coverage is to running out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryStatus {
    /// Coverage end date has passed.
    Expired,
    /// At most 3 days of coverage remain.
    Critical,
    /// More than 3 and at most 7 days of coverage remain.
    Warning,
    /// More than 7 days of coverage remain.
    Active,
    /// No end date on record.
    Unknown,
}

impl ExpiryStatus {
    /// Classifies an optional coverage end date against `today`.
    ///
    /// # Arguments
    ///
    /// * `end_date` - The member's coverage end date, if any
    /// * `today` - The date to classify against
    ///
    /// # Returns
    ///
    /// The classification per the table in the module docs. A member whose
    /// coverage ends today still counts as `critical`, not `expired`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chrono::NaiveDate;
    /// use gymdesk::domain::ExpiryStatus;
    ///
    /// let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
    /// let in_five_days = NaiveDate::from_ymd_opt(2024, 6, 20).unwrap();
    ///
    /// assert_eq!(ExpiryStatus::classify(Some(in_five_days), today), ExpiryStatus::Warning);
    /// assert_eq!(ExpiryStatus::classify(None, today), ExpiryStatus::Unknown);
    /// ```
    #[must_use]
    pub fn classify(end_date: Option<NaiveDate>, today: NaiveDate) -> Self {
        let Some(end) = end_date else {
            return Self::Unknown;
        };
        let days = days_until(end, today);
        if days < 0 {
            Self::Expired
        } else if days <= 3 {
            Self::Critical
        } else if days <= 7 {
            Self::Warning
        } else {
            Self::Active
        }
    }

    /// Returns the status as a static string, matching its serialized form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Expired => "expired",
            Self::Critical => "critical",
            Self::Warning => "warning",
            Self::Active => "active",
            Self::Unknown => "unknown",
        }
    }
}

/// Signed number of whole days from `today` until `end_date`.
///
/// Negative when the end date is already past. Zero means coverage ends
/// today.
#[must_use]
pub fn days_until(end_date: NaiveDate, today: NaiveDate) -> i64 {
    (end_date - today).num_days()
}
