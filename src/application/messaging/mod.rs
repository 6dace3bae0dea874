//! Message handling - Event-driven command processing

pub mod dispatcher;
pub mod parser;

pub use dispatcher::{Dispatch, EventDispatcher};
pub use parser::CommandParser;
