//! Database configuration module for langrank.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`;
//! the composite indexes backing the aggregation queries are added explicitly since they span
//! more than one column.

use crate::entities::{Language, User, Vote, vote};
use crate::errors::Result;
use sea_orm::sea_query::Index;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use tracing::{debug, info};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/langrank.sqlite?mode=rwc";

/// Gets the database URL from environment variable or returns default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by `DATABASE_URL`.
///
/// Falls back to a local `SQLite` file if no environment variable is set.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    debug!("Connecting to database at {}", database_url);
    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates all tables and indexes if they do not exist yet.
///
/// The vote ledger gets one index on `(user_id, period)` for budget checks and one on
/// `(language_id, period)` for per-language totals.
pub async fn create_tables<C>(db: &C) -> Result<()>
where
    C: ConnectionTrait,
{
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut language_table = schema.create_table_from_entity(Language);
    let mut user_table = schema.create_table_from_entity(User);
    let mut vote_table = schema.create_table_from_entity(Vote);

    language_table.if_not_exists();
    user_table.if_not_exists();
    vote_table.if_not_exists();

    db.execute(builder.build(&language_table)).await?;
    db.execute(builder.build(&user_table)).await?;
    db.execute(builder.build(&vote_table)).await?;

    let user_period_index = Index::create()
        .name("idx_votes_user_period")
        .table(Vote)
        .col(vote::Column::UserId)
        .col(vote::Column::Period)
        .if_not_exists()
        .to_owned();
    let language_period_index = Index::create()
        .name("idx_votes_language_period")
        .table(Vote)
        .col(vote::Column::LanguageId)
        .col(vote::Column::Period)
        .if_not_exists()
        .to_owned();

    db.execute(builder.build(&user_period_index)).await?;
    db.execute(builder.build(&language_period_index)).await?;

    info!("Database tables ensured.");
    Ok(())
}
