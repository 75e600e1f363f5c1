//! An abstraction layer for the form that collects a replacement request.

use crate::core::ReplacementRequest;

/// Defines a common interface for whatever collects the user's input.
/// This allows for a mock implementation during tests, avoiding the need
/// to interact with an actual form.
pub trait RequestSource: Send + Sync {
    /// Returns the confirmed request, or `None` if the user dismissed the form.
    fn request_replacement(&self) -> Option<ReplacementRequest>;
}

/// A request that arrived as the JSON payload of an IPC message.
pub struct PayloadRequestSource {
    payload: serde_json::Value,
}

impl PayloadRequestSource {
    pub fn new(payload: serde_json::Value) -> Self {
        Self { payload }
    }
}

impl RequestSource for PayloadRequestSource {
    fn request_replacement(&self) -> Option<ReplacementRequest> {
        match serde_json::from_value::<ReplacementRequest>(self.payload.clone()) {
            Ok(request) => Some(request),
            Err(e) => {
                tracing::warn!(
                    "Failed to deserialize replacement request from payload: {} ({:?})",
                    e,
                    self.payload
                );
                None
            }
        }
    }
}
