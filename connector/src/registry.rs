//! Name-keyed processor registry and dispatch

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::{DeliveryError, Result};
use crate::metrics::{DELIVERY_ATTEMPTS_TOTAL, DELIVERY_DURATION};
use crate::processor::Processor;
use crate::types::Message;

/// Registry of processors, populated at bootstrap and read-only afterwards.
///
/// Pure bookkeeping plus dispatch; the registry itself never touches the
/// network or the backend.
#[derive(Default)]
pub struct ProcessorRegistry {
    entries: HashMap<String, Arc<dyn Processor>>,
}

impl ProcessorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a processor under `name`.
    ///
    /// Upsert semantics: re-registering an existing name replaces the prior
    /// entry, so a configuration layer can rebuild its processor set when
    /// its own configuration changes.
    pub fn register(&mut self, name: impl Into<String>, processor: Arc<dyn Processor>) {
        let name = name.into();
        if self.entries.insert(name.clone(), processor).is_some() {
            debug!("processor {} re-registered, prior entry replaced", name);
        }
    }

    /// Resolve a handler name; an unregistered name is a hard error,
    /// never a silent no-op
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn Processor>> {
        self.entries
            .get(name)
            .cloned()
            .ok_or_else(|| DeliveryError::UnknownProcessor(name.to_string()))
    }

    /// Registered handler names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered processors
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is registered yet
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve `message.handler` and run the processor.
    ///
    /// Returns whatever the processor returns or raises, untouched apart
    /// from instrumentation.
    pub async fn dispatch(&self, message: &Message) -> Result<String> {
        let processor = match self.resolve(&message.handler) {
            Ok(processor) => processor,
            Err(e) => {
                warn!("no processor registered for handler {}", message.handler);
                DELIVERY_ATTEMPTS_TOTAL
                    .with_label_values(&[&message.handler, e.outcome_label()])
                    .inc();
                return Err(e);
            }
        };

        info!(
            "dispatching message {} to handler {}",
            message.id, message.handler
        );
        let start = std::time::Instant::now();
        let result = processor.process(message).await;
        let duration = start.elapsed();

        DELIVERY_DURATION
            .with_label_values(&[&message.handler])
            .observe(duration.as_secs_f64());

        match &result {
            Ok(_) => {
                DELIVERY_ATTEMPTS_TOTAL
                    .with_label_values(&[&message.handler, "delivered"])
                    .inc();
            }
            Err(e) => {
                warn!(
                    "delivery failed for message {} ({}): {}",
                    message.id, message.handler, e
                );
                DELIVERY_ATTEMPTS_TOTAL
                    .with_label_values(&[&message.handler, e.outcome_label()])
                    .inc();
            }
        }

        result
    }
}
