//! User entity - A voter, identified by the external identity provider.
//!
//! Rows are upserted on every login: `external_id` never changes once created, while the
//! display fields are refreshed from the provider.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Identifier assigned by the identity provider
    #[sea_orm(unique)]
    pub external_id: String,
    /// Display name as last reported by the provider
    pub display_name: String,
    /// Avatar URL as last reported by the provider
    pub avatar_url: Option<String>,
    /// First login
    pub created_at: DateTimeUtc,
    /// Last login
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user casts many votes
    #[sea_orm(has_many = "super::vote::Entity")]
    Votes,
}

impl Related<super::vote::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Votes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
