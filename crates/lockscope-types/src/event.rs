//! Stream message decoding.
//!
//! The state stream mostly carries snapshots, but the backend also pushes
//! out-of-band events on the same socket (e.g. after it kills a deadlock
//! victim). Events are recognised by an `event` key.

use serde::{Deserialize, Deserializer, Serialize};

use crate::DecodeError;
use crate::snapshot::SystemSnapshot;

/// One decoded stream message.
#[derive(Clone, Debug, PartialEq)]
pub enum StreamMessage {
    Snapshot(SystemSnapshot),
    Event(ServerEvent),
}

impl StreamMessage {
    /// Decode and validate one UTF-8 JSON message.
    pub fn decode(text: &str) -> Result<Self, DecodeError> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        let Some(object) = value.as_object() else {
            return Err(DecodeError::NotAnObject);
        };

        match object.get("event").and_then(|e| e.as_str()) {
            Some(name) => {
                let name = name.to_string();
                let event: ServerEvent = serde_json::from_value(value)
                    .map_err(|_| DecodeError::UnknownEvent(name))?;
                Ok(StreamMessage::Event(event))
            }
            None => Ok(StreamMessage::Snapshot(SystemSnapshot::from_value(value)?)),
        }
    }
}

/// Events pushed by the backend alongside snapshots.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ServerEvent {
    /// The backend terminated a process to break a deadlock.
    DeadlockResolved {
        #[serde(deserialize_with = "id_as_string")]
        victim: String,
    },
}

/// Backend ids show up as numbers or strings depending on the code path.
fn id_as_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum WireId {
        Number(u64),
        Text(String),
    }

    Ok(match WireId::deserialize(deserializer)? {
        WireId::Number(n) => n.to_string(),
        WireId::Text(s) => s,
    })
}
