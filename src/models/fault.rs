use serde::{Deserialize, Serialize};

/// Structured error body reported by the server on business failures.
///
/// Both transports use the same shape: a numeric code from the server's own
/// error catalogue, a human-readable message and an optional remote stack
/// trace. A payload with `error_code == 0` is not a failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FaultPayload {
    pub error_code: i32,
    pub error_message: String,
    pub stack_trace: String,
}

impl FaultPayload {
    pub fn is_error(&self) -> bool {
        self.error_code != 0
    }
}
