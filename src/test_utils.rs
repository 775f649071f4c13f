//! Shared test utilities for langrank.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    auth::{
        identity::{ExternalIdentity, IdentityProvider},
        session::SessionSigner,
    },
    core::{
        budget::BudgetValidator,
        language,
        period::Period,
        user,
        vote::VoteService,
    },
    entities,
    errors::{Error, Result},
};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use std::collections::HashMap;
use tracing_subscriber::EnvFilter;

/// Routes tracing output to the test harness. Safe to call from every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    init_test_tracing();
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// The period most tests vote in: `2025-01`.
pub fn test_period() -> Period {
    Period::new(2025, 1).unwrap_or_else(|_| Period::current())
}

/// Identity as a provider would return it, without an avatar.
pub fn test_identity(external_id: &str, display_name: &str) -> ExternalIdentity {
    ExternalIdentity {
        external_id: external_id.to_string(),
        display_name: display_name.to_string(),
        avatar_url: None,
    }
}

/// Creates a user through the login upsert path, with the external id as display name.
pub async fn create_test_user(
    db: &DatabaseConnection,
    external_id: &str,
) -> Result<entities::user::Model> {
    user::upsert_user(db, &test_identity(external_id, external_id)).await
}

/// Creates a catalog language with a neutral color.
pub async fn create_test_language(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::language::Model> {
    language::create_language(db, name, "#888888").await
}

/// Writes a ledger row directly, bypassing validation and the lifetime recompute.
/// Use this to arrange prior state.
pub async fn insert_raw_vote(
    db: &DatabaseConnection,
    user_id: i64,
    language_id: i64,
    points: i32,
    period: &str,
) -> Result<entities::vote::Model> {
    let model = entities::vote::ActiveModel {
        user_id: Set(user_id),
        language_id: Set(language_id),
        points: Set(points),
        period: Set(period.to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    model.insert(db).await.map_err(Into::into)
}

/// Signer with a fixed test key and the default 7-day lifetime.
pub fn test_signer() -> SessionSigner {
    SessionSigner::new(b"test-secret", chrono::Duration::days(7))
}

/// Sets up a vote service with default rules and one user.
/// Returns (service, user) for common vote scenarios.
pub async fn setup_vote_service() -> Result<(VoteService, entities::user::Model)> {
    let db = setup_test_db().await?;
    let user = create_test_user(&db, "test_user").await?;
    Ok((VoteService::new(db, BudgetValidator::default()), user))
}

/// Identity provider backed by a fixed code table.
#[derive(Debug, Default)]
pub struct StaticIdentityProvider {
    identities: HashMap<String, ExternalIdentity>,
}

impl StaticIdentityProvider {
    /// Provider that knows a single code.
    pub fn with(code: &str, identity: ExternalIdentity) -> Self {
        let mut identities = HashMap::new();
        identities.insert(code.to_string(), identity);
        Self { identities }
    }
}

impl IdentityProvider for StaticIdentityProvider {
    async fn authenticate(&self, code: &str) -> Result<ExternalIdentity> {
        self.identities
            .get(code)
            .cloned()
            .ok_or_else(|| Error::Identity {
                message: format!("unknown or expired authorization code '{code}'"),
            })
    }
}
