//! Shared delivery lifecycle for protocol-adapter processors

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use crate::audit;
use crate::error::{DeliveryError, Result};
use crate::processor::Processor;
use crate::soap::{self, PartnerResponse};
use crate::transport::Transport;
use crate::types::Message;

/// Context flag recognized as fake partner data in stub mode
pub const STUB_CONTEXT_FLAG: &str = "fake_partner";

/// Per-flow capability interface.
///
/// One shared driver ([`PartnerAdapter`]) runs the whole lifecycle; flows
/// only supply the payload and, optionally, a nicer success report.
pub trait FlowHandler: Send + Sync {
    /// Handler name this flow registers under
    fn name(&self) -> &str;

    /// Render the wire payload from the message context.
    ///
    /// Must be a pure function of the message, so a failed build leaves no
    /// partial external state and re-sending the same context is safe.
    fn build(&self, message: &Message) -> Result<String>;

    /// Recognize canned test data that must never reach the partner
    fn is_stub(&self, message: &Message) -> bool {
        message
            .context
            .get(STUB_CONTEXT_FLAG)
            .and_then(|value| value.as_bool())
            .unwrap_or(false)
    }

    /// Flow-specific success text; `None` falls back to the audit narration
    fn success_report(&self, _response: &PartnerResponse) -> Option<String> {
        None
    }
}

/// Operator-administered switches, captured immutably at construction
#[derive(Debug, Clone, Copy, Default)]
pub struct FlowSwitches {
    /// Never send messages of this class
    pub skip: bool,

    /// Partner connector administratively disabled; deliveries are held
    /// back as retryable until it is re-enabled
    pub disabled: bool,

    /// Short-circuit recognized fake data with a canned success
    pub stub_mode: bool,
}

/// Partition of partner return codes, fixed at configuration time
#[derive(Debug, Clone, Deserialize)]
pub struct ReturnCodePolicy {
    /// Response element carrying the return code
    #[serde(default = "default_code_field")]
    pub code_field: String,

    /// The one success code
    #[serde(default = "default_success_code")]
    pub success: String,

    /// Codes the partner wants re-attempted later
    #[serde(default)]
    pub retryable: BTreeSet<String>,
}

fn default_code_field() -> String {
    "codeErreur".to_string()
}

fn default_success_code() -> String {
    "000".to_string()
}

impl Default for ReturnCodePolicy {
    fn default() -> Self {
        Self {
            code_field: default_code_field(),
            success: default_success_code(),
            retryable: BTreeSet::new(),
        }
    }
}

/// How a partner return code classifies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeClass {
    /// Delivery accepted
    Success,
    /// Partner asks for a later re-attempt
    Retry,
    /// Definitive partner-side rejection
    Fatal,
}

impl ReturnCodePolicy {
    /// Classify a return code; absence of any code is success
    pub fn classify(&self, code: Option<&str>) -> CodeClass {
        match code {
            None => CodeClass::Success,
            Some(code) if code == self.success => CodeClass::Success,
            Some(code) if self.retryable.contains(code) => CodeClass::Retry,
            Some(_) => CodeClass::Fatal,
        }
    }
}

/// Drives one partner flow through the delivery lifecycle.
///
/// Every step is a potential early exit, in this order: skip flag, stub
/// short-circuit, disabled connector, build, submit, parse and classify.
/// Whatever happens, the caller sees exactly one classified outcome.
pub struct PartnerAdapter {
    flow: Arc<dyn FlowHandler>,
    transport: Arc<Transport>,
    switches: FlowSwitches,
    policy: ReturnCodePolicy,
}

impl PartnerAdapter {
    /// Create new adapter
    pub fn new(
        flow: Arc<dyn FlowHandler>,
        transport: Arc<Transport>,
        switches: FlowSwitches,
        policy: ReturnCodePolicy,
    ) -> Self {
        Self {
            flow,
            transport,
            switches,
            policy,
        }
    }

    /// Handler name of the wrapped flow
    pub fn name(&self) -> &str {
        self.flow.name()
    }
}

#[async_trait]
impl Processor for PartnerAdapter {
    async fn process(&self, message: &Message) -> Result<String> {
        if self.switches.skip {
            return Err(DeliveryError::Skip(format!(
                "handler {} is marked to be skipped",
                self.flow.name()
            )));
        }

        if self.switches.stub_mode && self.flow.is_stub(message) {
            debug!("handler {} short-circuited on fake data", self.flow.name());
            return Ok(format!(
                "stubbed delivery for handler {}, nothing sent",
                self.flow.name()
            ));
        }

        if self.switches.disabled {
            return Err(DeliveryError::Retryable {
                detail: format!("connector for handler {} is disabled", self.flow.name()),
            });
        }

        audit::capture(|recorder| async move {
            let payload = self.flow.build(message)?;
            recorder.record_request(&payload);

            let response = self.transport.send(payload).await?;
            recorder.record_response(response.status, &response.body);

            let parsed = soap::parse_partner_response(&response.body)?;
            let code = parsed.field(&self.policy.code_field);

            match self.policy.classify(code) {
                CodeClass::Success => {
                    info!(
                        "handler {} delivered, partner code {}",
                        self.flow.name(),
                        code.unwrap_or("-")
                    );
                    Ok(self.flow.success_report(&parsed))
                }
                CodeClass::Retry => Err(DeliveryError::Retryable {
                    detail: format!(
                        "partner asked for a re-attempt, code {}",
                        code.unwrap_or("-")
                    ),
                }
                .into()),
                CodeClass::Fatal => Err(DeliveryError::Permanent {
                    detail: format!(
                        "partner rejected the request, code {}",
                        code.unwrap_or("-")
                    ),
                    trail: recorder.snapshot(),
                }
                .into()),
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_return_code_partition() {
        let policy = ReturnCodePolicy {
            code_field: "codeErreur".to_string(),
            success: "000".to_string(),
            retryable: ["008".to_string(), "107".to_string()].into(),
        };

        assert_eq!(policy.classify(None), CodeClass::Success);
        assert_eq!(policy.classify(Some("000")), CodeClass::Success);
        assert_eq!(policy.classify(Some("008")), CodeClass::Retry);
        assert_eq!(policy.classify(Some("107")), CodeClass::Retry);
        assert_eq!(policy.classify(Some("999")), CodeClass::Fatal);
        assert_eq!(policy.classify(Some("001")), CodeClass::Fatal);
    }

    #[test]
    fn test_default_stub_marker() {
        struct NoopFlow;

        impl FlowHandler for NoopFlow {
            fn name(&self) -> &str {
                "noop"
            }

            fn build(&self, _message: &Message) -> Result<String> {
                Ok(String::new())
            }
        }

        let flow = NoopFlow;
        assert!(flow.is_stub(&Message::new("noop", json!({"fake_partner": true}))));
        assert!(!flow.is_stub(&Message::new("noop", json!({"fake_partner": false}))));
        assert!(!flow.is_stub(&Message::new("noop", json!({}))));
    }
}
