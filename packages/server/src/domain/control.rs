//! Control messages decoded from inbound room frames.
//!
//! A frame carries a whitespace-separated sequence of JSON objects. Each object
//! may hold any of three optional facets:
//!
//! ```json
//! { "content": {"text": "hi"}, "create": {"username": "alice"}, "error": {"error": "oops"} }
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::error::ControlDecodeError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<ChatContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create: Option<CreateRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorReport>,
}

/// Chat payload relayed to the other participants
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatContent {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub text: String,
}

/// Join directive carrying the requested display name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub username: String,
}

/// Error reported by the client
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub error: String,
}

/// A `null` facet field reads the same as an absent one
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl ControlMessage {
    /// Build a message carrying only chat text
    pub fn chat(text: impl Into<String>) -> Self {
        Self {
            content: Some(ChatContent { text: text.into() }),
            ..Self::default()
        }
    }

    /// Build a message carrying only a join directive
    pub fn create(username: impl Into<String>) -> Self {
        Self {
            create: Some(CreateRequest {
                username: username.into(),
            }),
            ..Self::default()
        }
    }

    /// Non-empty chat text, if any
    pub fn chat_text(&self) -> Option<&str> {
        self.content
            .as_ref()
            .map(|content| content.text.as_str())
            .filter(|text| !text.is_empty())
    }

    /// Non-empty requested username, if any
    pub fn requested_username(&self) -> Option<&str> {
        self.create
            .as_ref()
            .map(|create| create.username.as_str())
            .filter(|username| !username.is_empty())
    }

    /// Non-empty client error report, if any
    pub fn reported_error(&self) -> Option<&str> {
        self.error
            .as_ref()
            .map(|report| report.error.as_str())
            .filter(|error| !error.is_empty())
    }
}

/// Decode every control message in a frame, in order.
///
/// A value with the wrong shape yields a [`ControlDecodeError::Shape`] and
/// decoding moves on to the next value. Malformed JSON yields a
/// [`ControlDecodeError::Syntax`] as the last item: the stream cannot
/// resynchronize, so the rest of the frame is dropped.
pub fn decode_frame(frame: &str) -> Vec<Result<ControlMessage, ControlDecodeError>> {
    let mut decoded = Vec::new();
    for value in serde_json::Deserializer::from_str(frame).into_iter::<Value>() {
        match value {
            Ok(value) => decoded.push(
                serde_json::from_value::<ControlMessage>(value).map_err(ControlDecodeError::Shape),
            ),
            Err(e) => {
                decoded.push(Err(ControlDecodeError::Syntax(e)));
                break;
            }
        }
    }
    decoded
}
