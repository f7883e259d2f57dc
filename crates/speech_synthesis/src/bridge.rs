//! Host method-call bridge
//!
//! Dispatches named method calls coming from a host application (over a
//! local pipe, a native binding or similar) to the synthesis adapter and
//! turns the outcome into a serializable response.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::{debug, instrument, warn};

use crate::adapter::SynthesisAdapter;

/// Method name that runs the synthesis adapter
pub const SYNTHESIZE_METHOD: &str = "synthesize";

/// Name existing Flutter hosts use for the synthesis call
pub const HOST_SYNTHESIZE_METHOD: &str = "runPythonTTS";

/// Error code for requests that could not be decoded
pub const BAD_REQUEST_CODE: &str = "BAD_REQUEST";

/// A method call received from the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    /// Method name
    pub method: String,
    /// Named arguments
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl MethodCall {
    /// Create a call without arguments
    #[must_use]
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            arguments: Map::new(),
        }
    }

    /// Add a string argument
    #[must_use]
    pub fn with_argument(mut self, name: &str, value: impl Into<String>) -> Self {
        self.arguments
            .insert(name.to_string(), Value::String(value.into()));
        self
    }

    /// String argument, or `""` when missing or not a string
    fn string_argument(&self, name: &str) -> &str {
        self.arguments
            .get(name)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }
}

/// Outcome of a method call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MethodResponse {
    /// The call succeeded
    Success {
        /// Value returned to the host
        result: String,
    },
    /// The call failed
    Error {
        /// Stable error code
        code: String,
        /// Human-readable message
        message: String,
        /// Underlying cause chain, if any
        #[serde(default, skip_serializing_if = "Option::is_none")]
        details: Option<String>,
    },
    /// The method is unknown
    NotImplemented,
}

impl MethodResponse {
    /// Error response for input that is not a valid method call
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::Error {
            code: BAD_REQUEST_CODE.to_string(),
            message: message.into(),
            details: None,
        }
    }
}

/// Routes host method calls to the synthesis adapter
#[derive(Debug, Clone)]
pub struct MethodChannel {
    adapter: SynthesisAdapter,
}

impl MethodChannel {
    /// Create a channel around an adapter
    #[must_use]
    pub const fn new(adapter: SynthesisAdapter) -> Self {
        Self { adapter }
    }

    /// Handle a single method call
    #[instrument(skip(self, call), fields(method = %call.method))]
    pub async fn handle(&self, call: MethodCall) -> MethodResponse {
        if call.method != SYNTHESIZE_METHOD && call.method != HOST_SYNTHESIZE_METHOD {
            debug!("Unknown method");
            return MethodResponse::NotImplemented;
        }

        let text = call.string_argument("text");
        let path = call.string_argument("path");

        match self.adapter.synthesize(text, path).await {
            Ok(path) => MethodResponse::Success {
                result: path.to_string(),
            },
            Err(e) => {
                warn!(error = %e, "Method call failed");
                MethodResponse::Error {
                    code: e.code().to_string(),
                    message: e.to_string(),
                    details: std::error::Error::source(&e).map(ToString::to_string),
                }
            },
        }
    }

    /// Decode a JSON call, handle it and encode the response
    ///
    /// Malformed input yields a `BAD_REQUEST` error response rather than
    /// an error, so a host loop can keep serving.
    pub async fn handle_json(&self, line: &str) -> String {
        let response = match serde_json::from_str::<MethodCall>(line) {
            Ok(call) => self.handle(call).await,
            Err(e) => MethodResponse::bad_request(format!("Invalid method call: {e}")),
        };

        serde_json::to_string(&response).unwrap_or_else(|e| encoding_failure(&e))
    }
}

/// Response line for a response that could not be encoded
fn encoding_failure(error: &serde_json::Error) -> String {
    json!({
        "status": "error",
        "code": BAD_REQUEST_CODE,
        "message": format!("Failed to encode response: {error}"),
    })
    .to_string()
}
