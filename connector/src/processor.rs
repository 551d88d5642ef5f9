//! Processor contract shared by simple functions and protocol adapters

use async_trait::async_trait;

use crate::error::Result;
use crate::types::Message;

/// A named unit of delivery logic, resolvable by handler name.
///
/// Implementations must be safe to invoke from any number of workers; the
/// message is the only per-call state.
#[async_trait]
pub trait Processor: Send + Sync {
    /// Run one delivery attempt; the `Ok` string is the delivery report
    async fn process(&self, message: &Message) -> Result<String>;
}

/// Adapts a plain function for side-effect-only integrations that need no
/// wire protocol (notification webhooks and the like).
pub struct SimpleProcessor {
    func: Box<dyn Fn(&Message) -> Result<String> + Send + Sync>,
}

impl SimpleProcessor {
    /// Wrap a function as a processor
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&Message) -> Result<String> + Send + Sync + 'static,
    {
        Self {
            func: Box::new(func),
        }
    }
}

#[async_trait]
impl Processor for SimpleProcessor {
    async fn process(&self, message: &Message) -> Result<String> {
        (self.func)(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DeliveryError;
    use serde_json::json;

    #[tokio::test]
    async fn test_simple_processor_runs_the_function() {
        let processor = SimpleProcessor::new(|message: &Message| {
            let recipient = message.context_str("recipient")?;
            Ok(format!("notified {recipient}"))
        });

        let msg = Message::new("notify", json!({"recipient": "prefecture"}));
        assert_eq!(processor.process(&msg).await.unwrap(), "notified prefecture");
    }

    #[tokio::test]
    async fn test_simple_processor_missing_field_is_a_configuration_error() {
        let processor =
            SimpleProcessor::new(|message: &Message| Ok(message.context_str("recipient")?.to_string()));

        let msg = Message::new("notify", json!({}));
        let err = processor.process(&msg).await.unwrap_err();
        assert!(matches!(err, DeliveryError::Configuration(_)));
    }
}
