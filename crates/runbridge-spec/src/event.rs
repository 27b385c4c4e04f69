use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::spec::RunSpec;

/// Error decoding an inbound event body.
#[derive(Debug, thiserror::Error)]
pub enum EventError {
  #[error("malformed event body: {0}")]
  Malformed(#[from] serde_json::Error),
}

/// Body of an inbound event: either raw bytes that still need deserializing,
/// or an already-structured mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum EventBody {
  Raw(Vec<u8>),
  Structured(Value),
}

/// An inbound message delivered by the host's dispatch layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
  pub body: EventBody,
}

impl Event {
  /// Event carrying a serialized body.
  pub fn raw(bytes: impl Into<Vec<u8>>) -> Self {
    Self {
      body: EventBody::Raw(bytes.into()),
    }
  }

  /// Event carrying an already-structured body.
  pub fn structured(value: Value) -> Self {
    Self {
      body: EventBody::Structured(value),
    }
  }

  /// The body as structured JSON, deserializing raw bytes if necessary.
  pub fn body_json(&self) -> Result<Value, EventError> {
    match &self.body {
      EventBody::Raw(bytes) => Ok(serde_json::from_slice(bytes)?),
      EventBody::Structured(value) => Ok(value.clone()),
    }
  }

  /// Decode the run-identifying payload from the body.
  pub fn payload(&self) -> Result<EventPayload, EventError> {
    Ok(serde_json::from_value(self.body_json()?)?)
  }
}

/// The run-identifying payload of an inbound event.
///
/// Some deployments re-deliver the full run spec inside the event body; when
/// present it is authoritative over the previously fetched run spec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventPayload {
  pub project: String,

  /// Run id or full run key.
  #[serde(alias = "id")]
  pub run: String,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub spec: Option<RunSpec>,
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn raw_body_is_deserialized() {
    let event = Event::raw(br#"{"project":"p1","run":"r1"}"#.to_vec());
    let payload = event.payload().unwrap();
    assert_eq!(payload.project, "p1");
    assert_eq!(payload.run, "r1");
    assert!(payload.spec.is_none());
  }

  #[test]
  fn structured_body_accepts_id_alias_and_spec() {
    let event = Event::structured(json!({
      "project": "p1",
      "id": "r1",
      "spec": { "parameters": { "x": 5 } }
    }));

    let payload = event.payload().unwrap();
    assert_eq!(payload.run, "r1");
    let spec = payload.spec.unwrap();
    assert_eq!(spec.parameters["x"], json!(5));
  }

  #[test]
  fn malformed_raw_body_is_an_error() {
    let event = Event::raw(b"not json".to_vec());
    assert!(matches!(event.payload(), Err(EventError::Malformed(_))));
  }
}
