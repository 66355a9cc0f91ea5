//! Request and response envelopes for the JSON boundary.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;

/// One renderer call: a method name plus method-specific arguments.
///
/// `args` stays opaque here; [`dispatch`](crate::dispatch::dispatch)
/// deserializes it into the shape the named method expects.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiRequest {
    pub method: String,
    #[serde(default)]
    pub args: Value,
}

/// Uniform response envelope.
///
/// Exactly one of `data` / `error` is present, keyed off `success`, so the
/// renderer handles every method the same way.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

impl ApiResponse {
    pub fn ok(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(error: ApiError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
