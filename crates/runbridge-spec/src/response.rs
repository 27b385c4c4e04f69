use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The fixed-shape response returned to the host's dispatch layer.
///
/// Every invocation produces exactly one response; failures are converted
/// into a 500 response rather than escaping as errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
  pub body: String,
  pub status: u16,
  pub content_type: String,
}

impl Response {
  /// The success response: body "OK", status 200.
  pub fn ok() -> Self {
    Self {
      body: "OK".to_string(),
      status: 200,
      content_type: "text/plain".to_string(),
    }
  }

  /// The uniform failure response: human-readable message, status 500.
  pub fn failure(message: impl Into<String>) -> Self {
    Self {
      body: message.into(),
      status: 500,
      content_type: "text/plain".to_string(),
    }
  }

  /// A 200 response carrying a JSON body (serve mode).
  pub fn json(value: &Value) -> Self {
    match serde_json::to_string(value) {
      Ok(body) => Self {
        body,
        status: 200,
        content_type: "application/json".to_string(),
      },
      Err(e) => Self::failure(format!("failed to encode response body: {e}")),
    }
  }
}
