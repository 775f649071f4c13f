//! Vote submission - validate, append, re-aggregate, respond.
//!
//! [`VoteService`] owns the consistency contract of the ledger:
//!
//! 1. submissions for the same user are serialized by an in-process async lock;
//! 2. validation, the ledger append, a post-write cap re-check and the lifetime-total
//!    recompute all share one database transaction, so a crash or a concurrent writer from
//!    another process can never leave totals diverged or a cap exceeded;
//! 3. transient failures are retried once from validation, then surfaced as
//!    [`Error::TryAgain`].

use crate::{
    auth::session::SessionSigner,
    core::{
        aggregate,
        budget::{BudgetValidator, Rejection, Verdict},
        language, ledger,
        period::Period,
        user,
    },
    errors::{Error, Result},
};
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

/// Successful submission payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoteReceipt {
    /// Ledger row id of the new vote
    pub vote_id: i64,
    /// Language that received the points
    pub language_id: i64,
    /// Points recorded
    pub points: i32,
    /// Period the points count against
    pub period: Period,
    /// Monthly budget left after this vote
    pub remaining_monthly_points: i64,
    /// User's points on this language this period, after this vote
    pub language_points_after: i64,
    /// Language lifetime total after this vote
    pub language_lifetime_total: i64,
}

/// Result of a submission that reached the validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum VoteOutcome {
    /// Vote recorded
    Accepted(VoteReceipt),
    /// Vote refused; nothing was written
    Rejected(Rejection),
}

/// A user's budget usage for one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserMonthlyState {
    /// Period described
    pub period: Period,
    /// Points per language id; languages without votes are absent
    pub allocations_by_language: BTreeMap<i64, i64>,
    /// Points used this period
    pub total_used: i64,
    /// Points still available this period
    pub remaining: i64,
    /// Number of ledger rows this period
    pub vote_count: i64,
}

/// Vote request as received at the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VoteRequest {
    /// Target language
    pub language_id: i64,
    /// Points to add
    pub points: i32,
    /// Month key; defaults to the current month
    #[serde(default)]
    pub period: Option<String>,
}

impl VoteRequest {
    /// Parses a JSON body.
    ///
    /// # Errors
    /// Returns [`Error::InvalidRequest`] for malformed JSON, missing fields or unknown fields.
    pub fn from_json(body: &str) -> Result<Self> {
        serde_json::from_str(body).map_err(|e| Error::InvalidRequest {
            message: e.to_string(),
        })
    }

    /// Requested period, or the current month when absent.
    pub fn period(&self) -> Result<Period> {
        self.period
            .as_deref()
            .map_or_else(|| Ok(Period::current()), Period::parse)
    }
}

/// Orchestrates vote submissions and answers budget queries.
#[derive(Debug)]
pub struct VoteService {
    db: DatabaseConnection,
    validator: BudgetValidator,
    user_locks: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl VoteService {
    /// Creates a service over `db` applying `validator`'s rules.
    #[must_use]
    pub fn new(db: DatabaseConnection, validator: BudgetValidator) -> Self {
        Self {
            db,
            validator,
            user_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Database connection used by the service
    #[must_use]
    pub const fn database(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Validator used by the service
    #[must_use]
    pub const fn validator(&self) -> &BudgetValidator {
        &self.validator
    }

    /// Submits a vote.
    ///
    /// Rejections come back as [`VoteOutcome::Rejected`] with the validator's reason.
    ///
    /// # Errors
    /// - [`Error::UserNotFound`] / [`Error::LanguageNotFound`] for unknown references
    /// - [`Error::TryAgain`] if the store failed or a conflict was detected twice in a row
    #[instrument(skip(self, period), fields(period = %period))]
    pub async fn submit_vote(
        &self,
        user_id: i64,
        language_id: i64,
        points: i32,
        period: &Period,
    ) -> Result<VoteOutcome> {
        let lock = self.user_lock(user_id).await;
        let result = {
            let _guard = lock.lock().await;
            self.attempt_with_retry(user_id, language_id, points, period)
                .await
        };
        self.release_user_lock(user_id, lock).await;
        result
    }

    /// Verifies the session token and submits the request on behalf of its user.
    ///
    /// A missing or invalid token fails before the request is looked at.
    pub async fn submit_request(
        &self,
        signer: &SessionSigner,
        token: Option<&str>,
        request: &VoteRequest,
    ) -> Result<VoteOutcome> {
        let token = token.ok_or_else(|| Error::Unauthenticated {
            reason: "missing session token".to_string(),
        })?;
        let claims = signer.verify(token)?;
        let period = request.period()?;

        self.submit_vote(claims.user_id, request.language_id, request.points, &period)
            .await
    }

    async fn attempt_with_retry(
        &self,
        user_id: i64,
        language_id: i64,
        points: i32,
        period: &Period,
    ) -> Result<VoteOutcome> {
        match self.attempt(user_id, language_id, points, period).await {
            Err(first) if first.is_retryable() => {
                warn!(error = %first, "Vote attempt failed, retrying once");
                match self.attempt(user_id, language_id, points, period).await {
                    Err(second) if second.is_retryable() => Err(Error::TryAgain {
                        message: second.to_string(),
                    }),
                    other => other,
                }
            }
            other => other,
        }
    }

    async fn attempt(
        &self,
        user_id: i64,
        language_id: i64,
        points: i32,
        period: &Period,
    ) -> Result<VoteOutcome> {
        let txn = self.db.begin().await?;

        if user::get_user_by_id(&txn, user_id).await?.is_none() {
            return Err(Error::UserNotFound { user_id });
        }
        if language::get_language_by_id(&txn, language_id)
            .await?
            .is_none()
        {
            return Err(Error::LanguageNotFound {
                language: language_id.to_string(),
            });
        }

        if let Verdict::Rejected(rejection) = self
            .validator
            .validate(&txn, user_id, language_id, points, period)
            .await?
        {
            return Ok(VoteOutcome::Rejected(rejection));
        }

        self.record(txn, user_id, language_id, points, period)
            .await
            .map(VoteOutcome::Accepted)
    }

    /// Appends an already validated vote, re-checks the caps, recomputes the lifetime total
    /// and commits. Rolls back on a cap breach.
    async fn record(
        &self,
        txn: DatabaseTransaction,
        user_id: i64,
        language_id: i64,
        points: i32,
        period: &Period,
    ) -> Result<VoteReceipt> {
        let vote = ledger::append_vote(&txn, user_id, language_id, points, period).await?;

        if !self
            .validator
            .caps_hold(&txn, user_id, language_id, period)
            .await?
        {
            txn.rollback().await?;
            return Err(Error::ConcurrencyConflict { user_id });
        }

        let lifetime_total = language::recompute_lifetime_total(&txn, language_id).await?;
        let month = aggregate::monthly_points_for_user(&txn, user_id, period).await?;
        let on_language =
            aggregate::monthly_points_for_user_language(&txn, user_id, language_id, period).await?;

        txn.commit().await?;

        info!(vote_id = vote.id, user_id, language_id, points, "Vote recorded");

        Ok(VoteReceipt {
            vote_id: vote.id,
            language_id,
            points,
            period: *period,
            remaining_monthly_points: self.remaining(month.total_points),
            language_points_after: on_language,
            language_lifetime_total: lifetime_total,
        })
    }

    /// The user's per-language usage and remaining budget for a period.
    pub async fn get_user_monthly_state(
        &self,
        user_id: i64,
        period: &Period,
    ) -> Result<UserMonthlyState> {
        if user::get_user_by_id(&self.db, user_id).await?.is_none() {
            return Err(Error::UserNotFound { user_id });
        }

        let allocations_by_language =
            aggregate::monthly_points_by_language(&self.db, user_id, period).await?;
        let month = aggregate::monthly_points_for_user(&self.db, user_id, period).await?;

        Ok(UserMonthlyState {
            period: *period,
            allocations_by_language,
            total_used: month.total_points,
            remaining: self.remaining(month.total_points),
            vote_count: month.vote_count,
        })
    }

    fn remaining(&self, used: i64) -> i64 {
        (self.validator.rules().monthly_cap - used).max(0)
    }

    async fn user_lock(&self, user_id: i64) -> Arc<Mutex<()>> {
        let mut locks = self.user_locks.lock().await;
        Arc::clone(locks.entry(user_id).or_default())
    }

    /// Drops the user's lock entry unless another submission holds or awaits it.
    async fn release_user_lock(&self, user_id: i64, lock: Arc<Mutex<()>>) {
        let mut locks = self.user_locks.lock().await;
        // one reference in the map, one in `lock`
        if Arc::strong_count(&lock) == 2 {
            locks.remove(&user_id);
        }
    }
}
