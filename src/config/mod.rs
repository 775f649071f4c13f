/// Database connection and table creation
pub mod database;

/// Session signing settings from environment variables
pub mod session;

/// Catalog and budget configuration loading from config.toml
pub mod settings;
