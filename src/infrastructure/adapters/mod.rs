//! Platform adapters - Inbound event decoding and outbound delivery

pub mod console;
pub mod slack;

pub use console::ConsoleAdapter;
pub use slack::SlackAdapter;
