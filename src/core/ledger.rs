//! Vote ledger - append-only storage of point allocations.
//!
//! Rows are only ever inserted through the validated vote path in [`crate::core::vote`];
//! nothing in the crate updates or deletes them.

use crate::{
    core::period::Period,
    entities::{Vote, vote},
    errors::Result,
};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Appends one allocation to the ledger.
///
/// No budget checks happen here; callers validate first, on the same transaction.
pub async fn append_vote<C>(
    db: &C,
    user_id: i64,
    language_id: i64,
    points: i32,
    period: &Period,
) -> Result<vote::Model>
where
    C: ConnectionTrait,
{
    let model = vote::ActiveModel {
        user_id: Set(user_id),
        language_id: Set(language_id),
        points: Set(points),
        period: Set(period.key()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    model.insert(db).await.map_err(Into::into)
}

/// All of a user's votes in a period, oldest first.
pub async fn get_votes_for_user_period<C>(
    db: &C,
    user_id: i64,
    period: &Period,
) -> Result<Vec<vote::Model>>
where
    C: ConnectionTrait,
{
    Vote::find()
        .filter(vote::Column::UserId.eq(user_id))
        .filter(vote::Column::Period.eq(period.key()))
        .order_by_asc(vote::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
