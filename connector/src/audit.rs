//! Request/response audit capture around partner calls

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{DeliveryError, Result};

/// Request/response pair for one delivery attempt.
///
/// Starts out empty ("not sent" / "not received"), is populated as the
/// request is built and the response arrives, and is frozen into the final
/// outcome when the attempt completes or fails.
#[derive(Debug, Clone, Default)]
pub struct AuditTrail {
    request: Option<String>,
    response_status: Option<u16>,
    response_body: Option<String>,
}

impl AuditTrail {
    /// Outbound payload, if one was built
    pub fn request(&self) -> Option<&str> {
        self.request.as_deref()
    }

    /// HTTP status of the inbound response, if one arrived
    pub fn response_status(&self) -> Option<u16> {
        self.response_status
    }

    /// Raw inbound body, if one arrived
    pub fn response_body(&self) -> Option<&str> {
        self.response_body.as_deref()
    }
}

impl fmt::Display for AuditTrail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- request ---")?;
        writeln!(
            f,
            "{}",
            self.request.as_deref().unwrap_or("<no request sent>")
        )?;
        match self.response_status {
            Some(status) => writeln!(f, "--- response (HTTP {status}) ---")?,
            None => writeln!(f, "--- response ---")?,
        }
        write!(
            f,
            "{}",
            self.response_body
                .as_deref()
                .unwrap_or("<no response received>")
        )
    }
}

/// Cheap clone handle through which the wrapped work updates the trail.
///
/// Owned by the single delivery attempt that created it, never shared across
/// concurrent invocations. Updating it is the wrapped work's responsibility,
/// since only the work knows when the request is final.
#[derive(Clone, Default)]
pub struct AuditRecorder {
    inner: Arc<Mutex<AuditTrail>>,
}

impl AuditRecorder {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outbound payload once it is final
    pub fn record_request(&self, body: &str) {
        self.inner.lock().request = Some(body.to_string());
    }

    /// Record the inbound response
    pub fn record_response(&self, status: u16, body: &str) {
        let mut trail = self.inner.lock();
        trail.response_status = Some(status);
        trail.response_body = Some(body.to_string());
    }

    /// Freeze the trail as recorded so far
    pub fn snapshot(&self) -> AuditTrail {
        self.inner.lock().clone()
    }
}

/// Run one delivery step under audit capture.
///
/// Already-classified [`DeliveryError`]s pass through untouched; any other
/// failure is coerced into [`DeliveryError::Permanent`] with the trail
/// embedded, so a defect in one partner flow never retries forever. A work
/// result of `Ok(None)` yields a success report narrating the trail; an
/// explicit `Ok(Some(report))` is returned as-is.
pub async fn capture<F, Fut>(work: F) -> Result<String>
where
    F: FnOnce(AuditRecorder) -> Fut,
    Fut: Future<Output = anyhow::Result<Option<String>>>,
{
    let recorder = AuditRecorder::new();

    match work(recorder.clone()).await {
        Ok(Some(report)) => Ok(report),
        Ok(None) => Ok(format!("delivered\n{}", recorder.snapshot())),
        Err(err) => match err.downcast::<DeliveryError>() {
            Ok(classified) => Err(classified),
            Err(other) => Err(DeliveryError::Permanent {
                detail: format!("unclassified failure: {other:#}"),
                trail: recorder.snapshot(),
            }),
        },
    }
}
