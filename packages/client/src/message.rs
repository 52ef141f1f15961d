//! Outbound control messages.

use serde::Serialize;

#[derive(Debug, Default, Serialize)]
struct OutboundMessage<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    create: Option<Create<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct Create<'a> {
    username: &'a str,
}

/// Encode a chat line as `{"content":{"text":...}}`
pub fn chat_frame(text: &str) -> Result<String, serde_json::Error> {
    serde_json::to_string(&OutboundMessage {
        content: Some(Content { text }),
        ..OutboundMessage::default()
    })
}

/// Encode a join directive as `{"create":{"username":...}}`
pub fn create_frame(username: &str) -> Result<String, serde_json::Error> {
    serde_json::to_string(&OutboundMessage {
        create: Some(Create { username }),
        ..OutboundMessage::default()
    })
}
