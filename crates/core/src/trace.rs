use std::fmt;

use uuid::Uuid;

/// Correlation token for a single inbound call.
///
/// Created once when a call enters the gateway and carried, by reference,
/// through dispatch and into every outbound backend request. The same token
/// is attached to every diagnostic record emitted while servicing the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceContext {
    trace_id: String,
    span_id: String,
}

impl TraceContext {
    /// Mint a fresh context for a new inbound call.
    pub fn new() -> Self {
        let trace = Uuid::new_v4().simple().to_string();
        let span = &Uuid::new_v4().simple().to_string()[..16];
        Self {
            trace_id: trace,
            span_id: span.to_string(),
        }
    }

    /// Continue a trace from an inbound `traceparent` header value.
    ///
    /// Returns `None` if the value is not a well-formed W3C traceparent;
    /// callers fall back to `TraceContext::new()`.
    pub fn from_traceparent(value: &str) -> Option<Self> {
        let mut parts = value.split('-');
        let version = parts.next()?;
        let trace_id = parts.next()?;
        let span_id = parts.next()?;
        let _flags = parts.next()?;
        if version.len() != 2 || trace_id.len() != 32 || span_id.len() != 16 {
            return None;
        }
        if !trace_id.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        // Keep the caller's trace id, mint our own span id for this hop.
        Some(Self {
            trace_id: trace_id.to_ascii_lowercase(),
            span_id: Uuid::new_v4().simple().to_string()[..16].to_string(),
        })
    }

    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    pub fn span_id(&self) -> &str {
        &self.span_id
    }

    /// `traceparent` header value for outbound requests.
    pub fn traceparent(&self) -> String {
        format!("00-{}-{}-01", self.trace_id, self.span_id)
    }
}

impl Default for TraceContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TraceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.trace_id)
    }
}
