//! Budget validation - decides whether a proposed allocation is admissible.
//!
//! Two rule sets are supported and never mixed:
//!
//! - [`ValidationMode::Cumulative`]: any number of top-ups, as long as the user's points on
//!   one language stay within `language_cap` and the user's month stays within `monthly_cap`.
//! - [`ValidationMode::Slots`]: each user holds a fixed set of slot values per month
//!   (5, 3 and 2 by default) and may give each one to a single, distinct language.
//!
//! The validator only reads. The vote path runs it inside the same transaction as the write,
//! under a per-user lock, so the snapshot it reads is the one the write lands on.

use crate::{
    core::{aggregate, ledger, period::Period},
    errors::{Error, Result},
};
use sea_orm::ConnectionTrait;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Which rule set the validator applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Per-language and per-month caps on cumulative points
    #[default]
    Cumulative,
    /// One language per slot value, one slot per language
    Slots,
}

/// Budget limits, overridable from config.toml.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetRules {
    /// Rule set in force
    pub mode: ValidationMode,
    /// Smallest allocation accepted in one request
    pub min_points: i32,
    /// Largest allocation accepted in one request
    pub max_points: i32,
    /// Ceiling on one user's points for one language in a month
    pub language_cap: i64,
    /// Ceiling on one user's points in a month
    pub monthly_cap: i64,
    /// Slot values available per month in slot mode
    pub slots: Vec<i32>,
}

impl Default for BudgetRules {
    fn default() -> Self {
        Self {
            mode: ValidationMode::Cumulative,
            min_points: 1,
            max_points: 5,
            language_cap: 5,
            monthly_cap: 10,
            slots: vec![5, 3, 2],
        }
    }
}

impl BudgetRules {
    /// Checks the rules are self-consistent.
    ///
    /// # Errors
    /// Returns [`Error::Config`] for an empty or inverted range, non-positive caps, or
    /// duplicate or out-of-range slot values.
    pub fn check(&self) -> Result<()> {
        let fail = |message: String| Err(Error::Config { message });

        if self.min_points < 1 || self.min_points > self.max_points {
            return fail(format!(
                "points range {}..={} is empty or below 1",
                self.min_points, self.max_points
            ));
        }
        if self.language_cap < 1 || self.monthly_cap < 1 {
            return fail("budget caps must be positive".to_string());
        }
        if self.mode == ValidationMode::Slots {
            if self.slots.is_empty() {
                return fail("slot mode needs at least one slot value".to_string());
            }
            let mut sorted = self.slots.clone();
            sorted.sort_unstable();
            sorted.dedup();
            if sorted.len() != self.slots.len() {
                return fail("slot values must be distinct".to_string());
            }
            if self.slots.iter().any(|s| !self.in_range(*s)) {
                return fail("slot values must lie within the points range".to_string());
            }
        }
        Ok(())
    }

    const fn in_range(&self, points: i32) -> bool {
        points >= self.min_points && points <= self.max_points
    }
}

/// Why an allocation was refused. Always returned to the caller as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
    /// Requested points fall outside the per-request range
    PointsOutOfRange {
        /// Requested points
        points: i32,
        /// Smallest accepted value
        min: i32,
        /// Largest accepted value
        max: i32,
    },
    /// The user's points on this language would exceed the language cap
    LanguageCapExceeded {
        /// Points already on the language this month
        current: i64,
        /// The cap
        cap: i64,
        /// Points still allocatable to the language
        remaining: i64,
    },
    /// The user's month would exceed the monthly cap
    MonthlyCapExceeded {
        /// Points already used this month
        current: i64,
        /// The cap
        cap: i64,
        /// Points still available this month
        remaining: i64,
    },
    /// Slot mode: the requested points are not a slot value
    InvalidSlot {
        /// Requested points
        points: i32,
        /// Slot values on offer
        slots: Vec<i32>,
    },
    /// Slot mode: the slot value was already given to another language this month
    SlotTaken {
        /// Requested points
        points: i32,
    },
    /// Slot mode: the language already holds a slot this month
    AlreadyVoted {
        /// Language that already holds a slot
        language_id: i64,
    },
}

impl Rejection {
    /// Stable machine-readable reason code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::PointsOutOfRange { .. } => "points_out_of_range",
            Self::LanguageCapExceeded { .. } => "language_cap_exceeded",
            Self::MonthlyCapExceeded { .. } => "monthly_cap_exceeded",
            Self::InvalidSlot { .. } => "invalid_slot",
            Self::SlotTaken { .. } => "slot_taken",
            Self::AlreadyVoted { .. } => "already_voted",
        }
    }

    /// Headroom left under the cap that caused the rejection, if a cap did.
    #[must_use]
    pub const fn remaining(&self) -> Option<i64> {
        match self {
            Self::LanguageCapExceeded { remaining, .. } | Self::MonthlyCapExceeded { remaining, .. } => {
                Some(*remaining)
            }
            _ => None,
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PointsOutOfRange { points, min, max } => {
                write!(f, "points out of range: {points} is not between {min} and {max}")
            }
            Self::LanguageCapExceeded {
                current,
                cap,
                remaining,
            } => write!(
                f,
                "language cap exceeded: {current}/{cap} points already on this language, {remaining} remaining"
            ),
            Self::MonthlyCapExceeded {
                current,
                cap,
                remaining,
            } => write!(
                f,
                "monthly budget exceeded: {current}/{cap} points used this month, {remaining} remaining"
            ),
            Self::InvalidSlot { points, slots } => {
                write!(f, "{points} is not a slot value, expected one of {slots:?}")
            }
            Self::SlotTaken { points } => {
                write!(f, "the {points}-point slot is already used this month")
            }
            Self::AlreadyVoted { .. } => write!(f, "this language already holds a slot this month"),
        }
    }
}

/// Outcome of validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The allocation may be written
    Accepted,
    /// The allocation must not be written
    Rejected(Rejection),
}

/// Range check, no reads.
#[must_use]
pub const fn check_range(rules: &BudgetRules, points: i32) -> Option<Rejection> {
    if rules.in_range(points) {
        None
    } else {
        Some(Rejection::PointsOutOfRange {
            points,
            min: rules.min_points,
            max: rules.max_points,
        })
    }
}

/// Per-language cap against the post-addition total.
#[must_use]
pub fn check_language_cap(rules: &BudgetRules, current: i64, points: i32) -> Option<Rejection> {
    (current + i64::from(points) > rules.language_cap).then(|| Rejection::LanguageCapExceeded {
        current,
        cap: rules.language_cap,
        remaining: (rules.language_cap - current).max(0),
    })
}

/// Per-month cap against the post-addition total.
#[must_use]
pub fn check_monthly_cap(rules: &BudgetRules, current: i64, points: i32) -> Option<Rejection> {
    (current + i64::from(points) > rules.monthly_cap).then(|| Rejection::MonthlyCapExceeded {
        current,
        cap: rules.monthly_cap,
        remaining: (rules.monthly_cap - current).max(0),
    })
}

/// Applies the configured rule set against the ledger.
#[derive(Debug, Clone, Default)]
pub struct BudgetValidator {
    rules: BudgetRules,
}

impl BudgetValidator {
    /// Creates a validator for the given rules.
    #[must_use]
    pub const fn new(rules: BudgetRules) -> Self {
        Self { rules }
    }

    /// Rules in force
    #[must_use]
    pub const fn rules(&self) -> &BudgetRules {
        &self.rules
    }

    /// Decides whether `points` may be added for the user and language in `period`.
    ///
    /// Checks short-circuit in a fixed order so the same request always gets the same reason.
    pub async fn validate<C>(
        &self,
        db: &C,
        user_id: i64,
        language_id: i64,
        points: i32,
        period: &Period,
    ) -> Result<Verdict>
    where
        C: ConnectionTrait,
    {
        let rejection = match self.rules.mode {
            ValidationMode::Cumulative => {
                self.check_cumulative(db, user_id, language_id, points, period)
                    .await?
            }
            ValidationMode::Slots => {
                self.check_slots(db, user_id, language_id, points, period)
                    .await?
            }
        };

        Ok(rejection.map_or(Verdict::Accepted, |rejection| {
            debug!(user_id, language_id, points, %period, reason = rejection.code(), "Vote rejected");
            Verdict::Rejected(rejection)
        }))
    }

    async fn check_cumulative<C>(
        &self,
        db: &C,
        user_id: i64,
        language_id: i64,
        points: i32,
        period: &Period,
    ) -> Result<Option<Rejection>>
    where
        C: ConnectionTrait,
    {
        if let Some(rejection) = check_range(&self.rules, points) {
            return Ok(Some(rejection));
        }

        let on_language =
            aggregate::monthly_points_for_user_language(db, user_id, language_id, period).await?;
        if let Some(rejection) = check_language_cap(&self.rules, on_language, points) {
            return Ok(Some(rejection));
        }

        let month = aggregate::monthly_points_for_user(db, user_id, period).await?;
        Ok(check_monthly_cap(&self.rules, month.total_points, points))
    }

    async fn check_slots<C>(
        &self,
        db: &C,
        user_id: i64,
        language_id: i64,
        points: i32,
        period: &Period,
    ) -> Result<Option<Rejection>>
    where
        C: ConnectionTrait,
    {
        if !self.rules.slots.contains(&points) {
            return Ok(Some(Rejection::InvalidSlot {
                points,
                slots: self.rules.slots.clone(),
            }));
        }

        if aggregate::has_user_voted_for_language(db, user_id, language_id, period).await? {
            return Ok(Some(Rejection::AlreadyVoted { language_id }));
        }

        let votes = ledger::get_votes_for_user_period(db, user_id, period).await?;
        if votes.iter().any(|v| v.points == points) {
            return Ok(Some(Rejection::SlotTaken { points }));
        }

        let used: i64 = votes.iter().map(|v| i64::from(v.points)).sum();
        Ok(check_monthly_cap(&self.rules, used, points))
    }

    /// Re-reads the user's totals after a write and reports whether both caps still hold.
    pub async fn caps_hold<C>(
        &self,
        db: &C,
        user_id: i64,
        language_id: i64,
        period: &Period,
    ) -> Result<bool>
    where
        C: ConnectionTrait,
    {
        let on_language =
            aggregate::monthly_points_for_user_language(db, user_id, language_id, period).await?;
        let month = aggregate::monthly_points_for_user(db, user_id, period).await?;
        Ok(on_language <= self.rules.language_cap && month.total_points <= self.rules.monthly_cap)
    }
}
