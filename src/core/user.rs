//! User business logic.
//!
//! Users are never created directly: every successful login upserts the row keyed by the
//! provider's `external_id`.

use crate::{
    auth::identity::ExternalIdentity,
    entities::{User, user},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};
use tracing::debug;

/// Inserts a new user or refreshes the display fields of an existing one.
///
/// The `external_id` of an existing row is never modified.
pub async fn upsert_user<C>(db: &C, identity: &ExternalIdentity) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    if identity.external_id.trim().is_empty() {
        return Err(Error::Identity {
            message: "identity provider returned an empty external id".to_string(),
        });
    }

    let now = chrono::Utc::now();
    let existing = get_user_by_external_id(db, &identity.external_id).await?;

    if let Some(existing) = existing {
        debug!(user_id = existing.id, "Refreshing user profile");
        let mut active_model: user::ActiveModel = existing.into();
        active_model.display_name = Set(identity.display_name.clone());
        active_model.avatar_url = Set(identity.avatar_url.clone());
        active_model.updated_at = Set(now);
        active_model.update(db).await.map_err(Into::into)
    } else {
        debug!(external_id = %identity.external_id, "Creating user");
        let new_user = user::ActiveModel {
            external_id: Set(identity.external_id.clone()),
            display_name: Set(identity.display_name.clone()),
            avatar_url: Set(identity.avatar_url.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        new_user.insert(db).await.map_err(Into::into)
    }
}

/// Finds a user by internal ID.
pub async fn get_user_by_id<C>(db: &C, user_id: i64) -> Result<Option<user::Model>>
where
    C: ConnectionTrait,
{
    User::find_by_id(user_id).one(db).await.map_err(Into::into)
}

/// Finds a user by the provider's identifier.
pub async fn get_user_by_external_id<C>(db: &C, external_id: &str) -> Result<Option<user::Model>>
where
    C: ConnectionTrait,
{
    User::find()
        .filter(user::Column::ExternalId.eq(external_id))
        .one(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_upsert_creates_then_refreshes() -> Result<()> {
        let db = setup_test_db().await?;

        let first = upsert_user(&db, &test_identity("gh-42", "ferris")).await?;
        assert_eq!(first.display_name, "ferris");

        let refreshed = ExternalIdentity {
            external_id: "gh-42".to_string(),
            display_name: "Ferris the Crab".to_string(),
            avatar_url: Some("https://example.invalid/ferris.png".to_string()),
        };
        let second = upsert_user(&db, &refreshed).await?;

        assert_eq!(second.id, first.id);
        assert_eq!(second.external_id, "gh-42");
        assert_eq!(second.display_name, "Ferris the Crab");
        assert_eq!(
            second.avatar_url.as_deref(),
            Some("https://example.invalid/ferris.png")
        );
        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at >= first.updated_at);

        assert_eq!(User::find().count(&db).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_upsert_rejects_empty_external_id() -> Result<()> {
        let db = setup_test_db().await?;
        let result = upsert_user(&db, &test_identity(" ", "nobody")).await;
        assert!(matches!(result, Err(Error::Identity { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_lookups() -> Result<()> {
        let db = setup_test_db().await?;
        let created = create_test_user(&db, "gh-7").await?;

        let by_id = get_user_by_id(&db, created.id).await?.unwrap();
        let by_external = get_user_by_external_id(&db, "gh-7").await?.unwrap();
        assert_eq!(by_id, by_external);

        assert!(get_user_by_id(&db, 999).await?.is_none());
        assert!(get_user_by_external_id(&db, "gh-8").await?.is_none());
        Ok(())
    }
}
