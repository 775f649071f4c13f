//! Authentication - identity provider contract, session tokens and the login flow.

/// Identity provider contract
pub mod identity;
/// Session token signing and verification
pub mod session;

use crate::{core::user, entities, errors::Result};
use identity::IdentityProvider;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use session::SessionSigner;
use tracing::{info, instrument};

/// A logged-in user and the token that proves it.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    /// The upserted user row
    pub user: entities::user::Model,
    /// Signed session token
    pub token: String,
}

/// Exchanges an authorization code for a session.
///
/// The user row is created on first login and its display fields refreshed afterwards.
///
/// # Errors
/// Returns [`crate::errors::Error::Identity`] if the provider refuses the code.
#[instrument(skip_all)]
pub async fn login<P>(
    provider: &P,
    signer: &SessionSigner,
    db: &DatabaseConnection,
    code: &str,
) -> Result<Session>
where
    P: IdentityProvider + Sync,
{
    let identity = provider.authenticate(code).await?;
    let user = user::upsert_user(db, &identity).await?;
    let token = signer.issue(&user)?;
    info!(user_id = user.id, "User logged in");
    Ok(Session { user, token })
}
