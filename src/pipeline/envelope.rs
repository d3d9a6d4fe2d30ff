use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// A batch of queue messages as delivered by the queue runtime.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueueEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<QueueMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueMessage {
    #[serde(default)]
    pub message_id: String,
    #[serde(default)]
    pub event_source: String,
    pub body: String,
}

/// Wrapper some event routers put around the actual message.
#[derive(Debug, Deserialize)]
struct RoutingEnvelope {
    #[serde(default)]
    content: String,
}

/// Returns the payload carried by `body`: the envelope's `content` when `body` is a
/// routing envelope with non-empty content, otherwise `body` itself.
pub fn unwrap_payload(body: &str) -> Cow<'_, str> {
    match serde_json::from_str::<RoutingEnvelope>(body) {
        Ok(envelope) if !envelope.content.is_empty() => Cow::Owned(envelope.content),
        Ok(_) => Cow::Borrowed(body),
        Err(err) => {
            tracing::debug!(error = %err, "Message body is not a routing envelope");
            Cow::Borrowed(body)
        }
    }
}
