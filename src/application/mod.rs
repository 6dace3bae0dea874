//! Application layer - Use cases and business logic
//! 
//! This layer contains:
//! - Services: Inventory mutation, trade matching, command execution
//! - Errors: Domain-specific errors
//! - Messaging: Command parsing and event dispatching

pub mod errors;
pub mod services;
pub mod messaging;
