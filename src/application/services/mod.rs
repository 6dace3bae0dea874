//! Application services - Inventory mutation, trade matching, command execution

pub mod command_service;
pub mod inventory_service;
pub mod trade_matcher;

pub use command_service::CommandService;
pub use trade_matcher::TradeMatch;
