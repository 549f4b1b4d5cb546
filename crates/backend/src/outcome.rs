/// Normalized result of one call against the backend service.
///
/// Exactly one variant per call; executors must handle all five. This is
/// deliberately not a `Result`: a 404 or a rejected payload is an ordinary
/// outcome the caller turns into an agent-visible message, not an error to
/// propagate.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendOutcome<T> {
    /// 2xx with the body deserialized into the operation's output type.
    Success(T),
    /// The backend rejected the payload as a client-side problem (4xx with
    /// an error body).
    ValidationRejected { detail: String },
    /// 404 for the requested identifier.
    NotFound { id: u32 },
    /// 5xx, or a 4xx the backend didn't explain.
    UpstreamError { status: u16, detail: String },
    /// The call never produced an HTTP response: connect/DNS failure,
    /// timeout, or an undecodable body.
    TransportFailure { cause: String },
}

impl<T> BackendOutcome<T> {
    /// Short label for span/log annotation.
    pub fn classification(&self) -> &'static str {
        match self {
            BackendOutcome::Success(_) => "success",
            BackendOutcome::ValidationRejected { .. } => "validation_rejected",
            BackendOutcome::NotFound { .. } => "not_found",
            BackendOutcome::UpstreamError { .. } => "upstream_error",
            BackendOutcome::TransportFailure { .. } => "transport_failure",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, BackendOutcome::Success(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_labels() {
        assert_eq!(BackendOutcome::Success(1).classification(), "success");
        assert_eq!(
            BackendOutcome::<()>::NotFound { id: 7 }.classification(),
            "not_found"
        );
        assert_eq!(
            BackendOutcome::<()>::TransportFailure {
                cause: "timeout".to_string()
            }
            .classification(),
            "transport_failure"
        );
    }

    #[test]
    fn test_is_success() {
        assert!(BackendOutcome::Success("ok").is_success());
        assert!(!BackendOutcome::<()>::UpstreamError {
            status: 500,
            detail: "boom".to_string()
        }
        .is_success());
    }
}
