//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod language;
pub mod user;
pub mod vote;

// Re-export specific types to avoid conflicts
pub use language::{Column as LanguageColumn, Entity as Language, Model as LanguageModel};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
pub use vote::{Column as VoteColumn, Entity as Vote, Model as VoteModel};
