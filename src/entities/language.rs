//! Language entity - One entry of the fixed voting catalog.
//!
//! Languages are seeded from config.toml and never deleted. The `lifetime_total_points`
//! column is a denormalized sum of every vote ever cast for the language; it is rewritten
//! inside the same database transaction as each accepted vote.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Language database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "languages")]
pub struct Model {
    /// Unique identifier for the language
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name (e.g., "Rust", "Go"), unique across the catalog
    #[sea_orm(unique)]
    pub name: String,
    /// Display color as a CSS hex string
    pub color: String,
    /// Sum of all points ever allocated to this language
    pub lifetime_total_points: i64,
    /// When the language was seeded
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Language and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One language receives many votes
    #[sea_orm(has_many = "super::vote::Entity")]
    Votes,
}

impl Related<super::vote::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Votes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
