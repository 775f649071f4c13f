//! Ranking projection.
//!
//! Standings are computed at read time. The lifetime view reads each language's
//! denormalized total; the period view sums that month's ledger. Both feed the same
//! ordering: points descending, then name ascending, with row-number ranks.

use crate::{
    core::{aggregate, language, period::Period},
    entities::language as language_entity,
    errors::Result,
};
use sea_orm::ConnectionTrait;
use serde::Serialize;
use std::cmp::Ordering;

/// Which totals a ranking is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankingScope {
    /// All-time totals
    Lifetime,
    /// Points cast within one month
    Period(Period),
}

impl RankingScope {
    /// Parses `"lifetime"` or a `YYYY-MM` key.
    pub fn parse(value: &str) -> Result<Self> {
        if value.eq_ignore_ascii_case("lifetime") {
            Ok(Self::Lifetime)
        } else {
            Period::parse(value).map(Self::Period)
        }
    }
}

/// One row of a ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Standing {
    /// 1-based position
    pub rank: usize,
    /// Language id
    pub language_id: i64,
    /// Display name
    pub name: String,
    /// Display color
    pub color: String,
    /// Points in the ranking's scope
    pub total_points: i64,
}

/// Computes the ordered standings for `scope`, truncated to `limit` rows if given.
///
/// Every catalog language appears, including those with no points in the scope.
pub async fn get_ranking<C>(db: &C, scope: RankingScope, limit: Option<usize>) -> Result<Vec<Standing>>
where
    C: ConnectionTrait,
{
    let languages = language::get_all_languages(db).await?;

    let totals: Vec<(language_entity::Model, i64)> = match scope {
        RankingScope::Lifetime => languages
            .into_iter()
            .map(|l| {
                let total = l.lifetime_total_points;
                (l, total)
            })
            .collect(),
        RankingScope::Period(period) => {
            let by_language = aggregate::period_totals_by_language(db, &period).await?;
            languages
                .into_iter()
                .map(|l| {
                    let total = by_language.get(&l.id).copied().unwrap_or(0);
                    (l, total)
                })
                .collect()
        }
    };

    Ok(project(totals, limit))
}

/// Orders `(language, points)` pairs and assigns ranks.
#[must_use]
pub fn project(mut totals: Vec<(language_entity::Model, i64)>, limit: Option<usize>) -> Vec<Standing> {
    totals.sort_by(|(a, a_points), (b, b_points)| compare(*a_points, &a.name, *b_points, &b.name));
    if let Some(limit) = limit {
        totals.truncate(limit);
    }

    totals
        .into_iter()
        .enumerate()
        .map(|(index, (language, total_points))| Standing {
            rank: index + 1,
            language_id: language.id,
            name: language.name,
            color: language.color,
            total_points,
        })
        .collect()
}

fn compare(a_points: i64, a_name: &str, b_points: i64, b_name: &str) -> Ordering {
    b_points.cmp(&a_points).then_with(|| a_name.cmp(b_name))
}
