//! Message envelope handed over by the external queue

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DeliveryError, Result};

/// One unit of queued work.
///
/// The external queue owns persistence, scheduling and status transitions;
/// this layer only reads the handler name and the opaque context, and hands
/// back a classified result for the queue to interpret.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Message ID (UUIDv7 for ordering)
    pub id: Uuid,

    /// Handler name used for dispatch
    pub handler: String,

    /// Opaque context blob, semantically a map from field name to value
    pub context: serde_json::Value,

    /// Enqueue instant; also the emission clock for payload building, so
    /// rebuilding the same message yields the same payload
    pub queued_at: DateTime<Utc>,
}

impl Message {
    /// Create new message
    pub fn new(handler: impl Into<String>, context: serde_json::Value) -> Self {
        Self {
            id: Uuid::now_v7(),
            handler: handler.into(),
            context,
            queued_at: Utc::now(),
        }
    }

    /// Set the enqueue instant
    pub fn with_queued_at(mut self, queued_at: DateTime<Utc>) -> Self {
        self.queued_at = queued_at;
        self
    }

    /// Mandatory string field from the context.
    ///
    /// A missing or non-string value is a wiring defect on the producing
    /// side, not a partner failure.
    pub fn context_str(&self, key: &str) -> Result<&str> {
        self.context_str_opt(key).ok_or_else(|| {
            DeliveryError::Configuration(format!(
                "missing mandatory context field `{key}` for handler {}",
                self.handler
            ))
        })
    }

    /// Optional string field from the context
    pub fn context_str_opt(&self, key: &str) -> Option<&str> {
        self.context.get(key).and_then(|value| value.as_str())
    }
}
