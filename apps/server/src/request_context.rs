//! Per-request context injected by middleware.

/// Identifiers attached to every request by `request_id_middleware`.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Server-assigned id, echoed as `x-request-id`.
    pub request_id: String,
    /// Caller-supplied `x-request-id`, when it differs from ours.
    pub correlation_id: Option<String>,
}

impl RequestContext {
    pub fn new(client_id: Option<String>) -> Self {
        let request_id = uuid::Uuid::new_v4().to_string();
        let correlation_id = client_id.filter(|id| !id.is_empty() && *id != request_id);
        Self {
            request_id,
            correlation_id,
        }
    }
}
