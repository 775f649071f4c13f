//! Aggregation queries over the vote ledger.
//!
//! Every figure here is a SQL sum over `votes`; nothing is cached. All functions are
//! generic over [`ConnectionTrait`] so the vote path can run them inside its transaction.

use crate::{
    core::period::Period,
    entities::{Vote, vote},
    errors::Result,
};
use sea_orm::{QuerySelect, Select, prelude::*, sea_query::Expr};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// A user's spending in one period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MonthlyTotals {
    /// Sum of points over the user's votes in the period
    pub total_points: i64,
    /// Number of vote rows in the period
    pub vote_count: i64,
}

/// Total points and row count for a user in a period.
pub async fn monthly_points_for_user<C>(db: &C, user_id: i64, period: &Period) -> Result<MonthlyTotals>
where
    C: ConnectionTrait,
{
    let row = Vote::find()
        .select_only()
        .column_as(Expr::col(vote::Column::Points).sum(), "total_points")
        .column_as(Expr::col(vote::Column::Id).count(), "vote_count")
        .filter(vote::Column::UserId.eq(user_id))
        .filter(vote::Column::Period.eq(period.key()))
        .into_tuple::<(Option<i64>, i64)>()
        .one(db)
        .await?;

    Ok(row.map_or_else(MonthlyTotals::default, |(total, count)| MonthlyTotals {
        total_points: total.unwrap_or(0),
        vote_count: count,
    }))
}

/// Points a user has put on one language in a period.
pub async fn monthly_points_for_user_language<C>(
    db: &C,
    user_id: i64,
    language_id: i64,
    period: &Period,
) -> Result<i64>
where
    C: ConnectionTrait,
{
    sum_points(
        db,
        Vote::find()
            .filter(vote::Column::UserId.eq(user_id))
            .filter(vote::Column::LanguageId.eq(language_id))
            .filter(vote::Column::Period.eq(period.key())),
    )
    .await
}

/// Points a language has received across all periods and users.
pub async fn lifetime_total_for_language<C>(db: &C, language_id: i64) -> Result<i64>
where
    C: ConnectionTrait,
{
    sum_points(db, Vote::find().filter(vote::Column::LanguageId.eq(language_id))).await
}

/// Whether the user has any vote for the language in the period.
pub async fn has_user_voted_for_language<C>(
    db: &C,
    user_id: i64,
    language_id: i64,
    period: &Period,
) -> Result<bool>
where
    C: ConnectionTrait,
{
    let count = Vote::find()
        .filter(vote::Column::UserId.eq(user_id))
        .filter(vote::Column::LanguageId.eq(language_id))
        .filter(vote::Column::Period.eq(period.key()))
        .count(db)
        .await?;
    Ok(count > 0)
}

/// A user's points per language in a period. Languages without votes are absent.
pub async fn monthly_points_by_language<C>(
    db: &C,
    user_id: i64,
    period: &Period,
) -> Result<BTreeMap<i64, i64>>
where
    C: ConnectionTrait,
{
    let rows = Vote::find()
        .select_only()
        .column(vote::Column::LanguageId)
        .column_as(Expr::col(vote::Column::Points).sum(), "total_points")
        .filter(vote::Column::UserId.eq(user_id))
        .filter(vote::Column::Period.eq(period.key()))
        .group_by(vote::Column::LanguageId)
        .into_tuple::<(i64, Option<i64>)>()
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(language_id, total)| (language_id, total.unwrap_or(0)))
        .collect())
}

/// Every language's points within one period, across all users.
pub async fn period_totals_by_language<C>(db: &C, period: &Period) -> Result<HashMap<i64, i64>>
where
    C: ConnectionTrait,
{
    let rows = Vote::find()
        .select_only()
        .column(vote::Column::LanguageId)
        .column_as(Expr::col(vote::Column::Points).sum(), "total_points")
        .filter(vote::Column::Period.eq(period.key()))
        .group_by(vote::Column::LanguageId)
        .into_tuple::<(i64, Option<i64>)>()
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(language_id, total)| (language_id, total.unwrap_or(0)))
        .collect())
}

async fn sum_points<C>(db: &C, query: Select<Vote>) -> Result<i64>
where
    C: ConnectionTrait,
{
    let total = query
        .select_only()
        .column_as(Expr::col(vote::Column::Points).sum(), "total_points")
        .into_tuple::<Option<i64>>()
        .one(db)
        .await?;
    Ok(total.flatten().unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_empty_ledger_sums_to_zero() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "ext-1").await?;
        let rust = create_test_language(&db, "Rust").await?;
        let period = test_period();

        assert_eq!(
            monthly_points_for_user(&db, user.id, &period).await?,
            MonthlyTotals::default()
        );
        assert_eq!(
            monthly_points_for_user_language(&db, user.id, rust.id, &period).await?,
            0
        );
        assert_eq!(lifetime_total_for_language(&db, rust.id).await?, 0);
        assert!(!has_user_voted_for_language(&db, user.id, rust.id, &period).await?);
        assert!(monthly_points_by_language(&db, user.id, &period).await?.is_empty());
        assert!(period_totals_by_language(&db, &period).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_sums_respect_scoping() -> Result<()> {
        let db = setup_test_db().await?;
        let alice = create_test_user(&db, "alice").await?;
        let bob = create_test_user(&db, "bob").await?;
        let rust = create_test_language(&db, "Rust").await?;
        let go = create_test_language(&db, "Go").await?;

        insert_raw_vote(&db, alice.id, rust.id, 3, "2025-01").await?;
        insert_raw_vote(&db, alice.id, rust.id, 2, "2025-01").await?;
        insert_raw_vote(&db, alice.id, go.id, 4, "2025-01").await?;
        insert_raw_vote(&db, alice.id, go.id, 1, "2025-02").await?;
        insert_raw_vote(&db, bob.id, rust.id, 5, "2025-01").await?;

        let january = test_period();

        let alice_totals = monthly_points_for_user(&db, alice.id, &january).await?;
        assert_eq!(alice_totals.total_points, 9);
        assert_eq!(alice_totals.vote_count, 3);

        assert_eq!(
            monthly_points_for_user_language(&db, alice.id, rust.id, &january).await?,
            5
        );
        assert_eq!(lifetime_total_for_language(&db, rust.id).await?, 10);
        assert_eq!(lifetime_total_for_language(&db, go.id).await?, 5);

        assert!(has_user_voted_for_language(&db, bob.id, rust.id, &january).await?);
        assert!(!has_user_voted_for_language(&db, bob.id, go.id, &january).await?);

        let by_language = monthly_points_by_language(&db, alice.id, &january).await?;
        assert_eq!(by_language.get(&rust.id), Some(&5));
        assert_eq!(by_language.get(&go.id), Some(&4));

        let period_totals = period_totals_by_language(&db, &january).await?;
        assert_eq!(period_totals.get(&rust.id), Some(&10));
        assert_eq!(period_totals.get(&go.id), Some(&4));

        Ok(())
    }
}
