//! Error taxonomy for outbound deliveries

use thiserror::Error;

use crate::audit::AuditTrail;

/// Result type for delivery operations
pub type Result<T> = std::result::Result<T, DeliveryError>;

/// Classified outcome of one failed delivery attempt.
///
/// Every failure a processor can produce resolves to exactly one of these
/// kinds. The external queue never inspects error strings; it matches on
/// [`DeliveryError::disposition`] to decide what happens to the message.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Partner or network unreachable, or transiently failing
    #[error("partner unavailable: {detail}")]
    Retryable {
        /// Failure detail
        detail: String,
    },

    /// Response received but malformed, unexpected or definitively rejected
    #[error("permanent partner failure: {detail}\n{trail}")]
    Permanent {
        /// Failure detail
        detail: String,
        /// Frozen request/response pair for operator review
        trail: AuditTrail,
    },

    /// Business rules say this message must not be sent at all
    #[error("delivery skipped: {0}")]
    Skip(String),

    /// Message is neither ready nor failed; leave it for a later pass
    #[error("delivery deferred: {0}")]
    Wait(String),

    /// Caller or wiring defect; retrying will never help
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Dispatch on a handler name nothing was registered under
    #[error("unknown processor: {0}")]
    UnknownProcessor(String),
}

/// Queue-visible effect of a failed delivery attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Keep the message ready and re-attempt later
    Retry,
    /// Mark the message failed for manual review
    Failed,
    /// Mark the message skipped, not failed
    Skipped,
    /// Leave the message untouched
    Deferred,
}

impl DeliveryError {
    /// Map this error onto the disposition the queue should apply
    pub fn disposition(&self) -> Disposition {
        match self {
            DeliveryError::Retryable { .. } => Disposition::Retry,
            DeliveryError::Permanent { .. } => Disposition::Failed,
            DeliveryError::Skip(_) => Disposition::Skipped,
            DeliveryError::Wait(_) => Disposition::Deferred,
            DeliveryError::Configuration(_) => Disposition::Failed,
            DeliveryError::UnknownProcessor(_) => Disposition::Failed,
        }
    }

    /// Stable lowercase label for metrics and logs
    pub fn outcome_label(&self) -> &'static str {
        match self {
            DeliveryError::Retryable { .. } => "retryable",
            DeliveryError::Permanent { .. } => "permanent",
            DeliveryError::Skip(_) => "skipped",
            DeliveryError::Wait(_) => "deferred",
            DeliveryError::Configuration(_) => "configuration",
            DeliveryError::UnknownProcessor(_) => "unknown_processor",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispositions() {
        let retryable = DeliveryError::Retryable {
            detail: "down".to_string(),
        };
        assert_eq!(retryable.disposition(), Disposition::Retry);

        let permanent = DeliveryError::Permanent {
            detail: "rejected".to_string(),
            trail: AuditTrail::default(),
        };
        assert_eq!(permanent.disposition(), Disposition::Failed);

        assert_eq!(
            DeliveryError::Skip("n/a".to_string()).disposition(),
            Disposition::Skipped
        );
        assert_eq!(
            DeliveryError::Wait("later".to_string()).disposition(),
            Disposition::Deferred
        );
        assert_eq!(
            DeliveryError::Configuration("bad".to_string()).disposition(),
            Disposition::Failed
        );
        assert_eq!(
            DeliveryError::UnknownProcessor("nope".to_string()).disposition(),
            Disposition::Failed
        );
    }

    #[test]
    fn test_permanent_error_text_carries_the_trail() {
        let err = DeliveryError::Permanent {
            detail: "partner rejected the request, code 999".to_string(),
            trail: AuditTrail::default(),
        };

        let text = err.to_string();
        assert!(text.contains("code 999"));
        assert!(text.contains("<no request sent>"));
        assert!(text.contains("<no response received>"));
    }
}
