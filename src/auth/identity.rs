//! Identity provider contract.
//!
//! The OAuth code exchange itself lives outside this crate; implementations of
//! [`IdentityProvider`] turn an authorization code into the provider's view of the user.

use crate::errors::Result;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// The provider's description of an authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalIdentity {
    /// Stable identifier at the provider
    pub external_id: String,
    /// Display name
    pub display_name: String,
    /// Avatar URL, if the provider has one
    pub avatar_url: Option<String>,
}

/// Exchanges authorization codes for identities.
pub trait IdentityProvider {
    /// Resolves `code` to an identity.
    ///
    /// # Errors
    /// Returns [`crate::errors::Error::Identity`] when the code is invalid or expired.
    fn authenticate(&self, code: &str) -> impl Future<Output = Result<ExternalIdentity>> + Send;
}
