//! Console adapter for development/testing

use async_trait::async_trait;
use crate::domain::traits::Delivery;
use crate::application::errors::DeliveryError;

/// Console delivery adapter for local development
pub struct ConsoleAdapter {
    name: String,
}

impl ConsoleAdapter {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn read_line(&self, prompt: &str) -> Option<String> {
        use std::io::Write;
        print!("{}", prompt);
        std::io::stdout().flush().ok()?;

        let mut input = String::new();
        match std::io::stdin().read_line(&mut input) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(input.trim().to_string()),
        }
    }
}

#[async_trait]
impl Delivery for ConsoleAdapter {
    async fn deliver(&self, channel_id: &str, text: &str, _credential: &str) -> Result<(), DeliveryError> {
        println!("[{} #{}] {}", self.name, channel_id, text);
        Ok(())
    }

    fn platform(&self) -> &str {
        "console"
    }
}
