/// Settings from config.toml and secrets from the environment
pub mod app;

/// Database configuration and connection management
pub mod database;
