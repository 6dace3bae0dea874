//! Infrastructure layer - External concerns
//! 
//! This layer contains:
//! - Config: Configuration loading
//! - Database: SQLite persistence
//! - Storage: In-memory persistence
//! - Adapters: Platform integrations (Slack, console)

pub mod config;
pub mod database;
pub mod storage;
pub mod adapters;
