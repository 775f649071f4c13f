//! Vote entity - The ledger of point allocations.
//!
//! Each row records `points` spent by a user on a language within a `period` (`YYYY-MM`).
//! Rows are append-only: repeated rows for the same (user, language, period) are top-ups,
//! and budget totals are always the sum over rows.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Vote database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "votes")]
pub struct Model {
    /// Unique identifier for the vote
    #[sea_orm(primary_key)]
    pub id: i64,
    /// User who cast the vote
    pub user_id: i64,
    /// Language that received the points
    pub language_id: i64,
    /// Points allocated by this row, always within the configured range
    pub points: i32,
    /// Month key, `YYYY-MM`
    pub period: String,
    /// When the vote was recorded
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Vote and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each vote belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    /// Each vote is for one language
    #[sea_orm(
        belongs_to = "super::language::Entity",
        from = "Column::LanguageId",
        to = "super::language::Column::Id"
    )]
    Language,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::language::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Language.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
