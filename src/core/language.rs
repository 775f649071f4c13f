//! Language catalog business logic.
//!
//! Provides lookups over the fixed catalog, seeding from configuration, and maintenance of
//! the denormalized lifetime total that ranking reads.

use crate::{
    config::settings::LanguageConfig,
    core::aggregate,
    entities::{Language, language},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*, sea_query::Expr};
use serde::Serialize;
use tracing::{debug, info};

/// Lifetime statistics for one language, computed from the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageStats {
    /// Language id
    pub language_id: i64,
    /// Display name
    pub name: String,
    /// Sum of all points ever allocated to the language
    pub total_points: i64,
}

/// Retrieves every language in the catalog, ordered alphabetically by name.
pub async fn get_all_languages<C>(db: &C) -> Result<Vec<language::Model>>
where
    C: ConnectionTrait,
{
    Language::find()
        .order_by_asc(language::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a language by its unique ID.
pub async fn get_language_by_id<C>(db: &C, language_id: i64) -> Result<Option<language::Model>>
where
    C: ConnectionTrait,
{
    Language::find_by_id(language_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a language by its display name.
pub async fn get_language_by_name<C>(db: &C, name: &str) -> Result<Option<language::Model>>
where
    C: ConnectionTrait,
{
    Language::find()
        .filter(language::Column::Name.eq(name.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Adds a language to the catalog with a zero lifetime total.
///
/// # Errors
/// Returns an error if the name is empty or already taken.
pub async fn create_language<C>(db: &C, name: &str, color: &str) -> Result<language::Model>
where
    C: ConnectionTrait,
{
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::Config {
            message: "Language name cannot be empty".to_string(),
        });
    }

    let model = language::ActiveModel {
        name: Set(name.to_string()),
        color: Set(color.to_string()),
        lifetime_total_points: Set(0),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    model.insert(db).await.map_err(Into::into)
}

/// Inserts every configured language that is not in the catalog yet.
///
/// Existing languages are left untouched, so their lifetime totals survive restarts.
/// Returns the number of languages inserted.
pub async fn seed_languages(db: &DatabaseConnection, languages: &[LanguageConfig]) -> Result<usize> {
    let mut inserted = 0;
    for config in languages {
        if get_language_by_name(db, &config.name).await?.is_some() {
            debug!("Language '{}' already seeded", config.name);
            continue;
        }
        create_language(db, &config.name, &config.color).await?;
        inserted += 1;
    }
    info!("Seeded {} new languages", inserted);
    Ok(inserted)
}

/// Recomputes a language's lifetime total from the ledger and stores it.
///
/// Must run on the same connection or transaction as the write that changed the ledger.
pub async fn recompute_lifetime_total<C>(db: &C, language_id: i64) -> Result<i64>
where
    C: ConnectionTrait,
{
    let total = aggregate::lifetime_total_for_language(db, language_id).await?;

    let result = Language::update_many()
        .col_expr(language::Column::LifetimeTotalPoints, Expr::value(total))
        .filter(language::Column::Id.eq(language_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::LanguageNotFound {
            language: language_id.to_string(),
        });
    }

    Ok(total)
}

/// Lifetime statistics for a language, summed from the ledger.
pub async fn get_language_lifetime_stats<C>(db: &C, language_id: i64) -> Result<LanguageStats>
where
    C: ConnectionTrait,
{
    let language = get_language_by_id(db, language_id)
        .await?
        .ok_or_else(|| Error::LanguageNotFound {
            language: language_id.to_string(),
        })?;
    let total_points = aggregate::lifetime_total_for_language(db, language_id).await?;

    Ok(LanguageStats {
        language_id,
        name: language.name,
        total_points,
    })
}
