//! Serde payload types carried in frame bodies.

use serde::{Deserialize, Serialize};

use crate::protocol::frame::{Frame, EVENT_SERVER_MESSAGE, EVENT_TOOL_FINISH};
use crate::Result;

/// Intention name the host uses to route replies from this skill.
pub const INTENTION: &str = "checkAutoStatus";

/// Message content block shared by inbound and outbound payloads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageBody {
    /// Free-form message text.
    pub content: String,
    /// Attachments; always empty for this skill but kept on the wire.
    #[serde(default)]
    pub attachments: Vec<serde_json::Value>,
}

/// Inbound user-turn payload (event type 1001).
#[derive(Debug, Clone, Deserialize)]
pub struct InboundMessage {
    /// Conversation identifier the session is keyed on.
    pub dialog_id: String,
    /// User identifier; also the scope for memory lookups.
    pub user_id: String,
    /// Message content block.
    #[serde(default)]
    pub messages: MessageBody,
}

/// Outbound reply payload (event types 2001 and 2002).
#[derive(Debug, Clone, Serialize)]
pub struct ReplyMessage {
    /// Mirrors the frame's event type inside the body, as the host expects.
    pub event_type: u16,
    /// Conversation identifier.
    pub dialog_id: String,
    /// User identifier.
    pub user_id: String,
    /// Fixed skill intention name.
    pub intention: String,
    /// Fresh identifier for this reply.
    pub message_id: String,
    /// Marks the final reply of a turn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<bool>,
    /// Message content block.
    pub messages: MessageBody,
}

impl ReplyMessage {
    fn new(event_type: u16, dialog_id: &str, user_id: &str, content: String) -> Self {
        Self {
            event_type,
            dialog_id: dialog_id.to_owned(),
            user_id: user_id.to_owned(),
            intention: INTENTION.to_owned(),
            message_id: uuid::Uuid::new_v4().to_string(),
            end: None,
            messages: MessageBody {
                content,
                attachments: Vec::new(),
            },
        }
    }

    /// Intermediate agent reply; the turn is not finished yet.
    #[must_use]
    pub fn reply(dialog_id: &str, user_id: &str, content: String) -> Self {
        Self::new(EVENT_SERVER_MESSAGE, dialog_id, user_id, content)
    }

    /// Final agent reply of a turn, flagged with `end: true`.
    #[must_use]
    pub fn final_reply(dialog_id: &str, user_id: &str, content: String) -> Self {
        let mut msg = Self::new(EVENT_SERVER_MESSAGE, dialog_id, user_id, content);
        msg.end = Some(true);
        msg
    }

    /// End-of-turn acknowledgement sent when the user exits the flow.
    #[must_use]
    pub fn flow_exited(dialog_id: &str, user_id: &str, content: String) -> Self {
        Self::new(EVENT_TOOL_FINISH, dialog_id, user_id, content)
    }

    /// Convert the reply into a wire [`Frame`].
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Channel`](crate::AppError::Channel) if the reply
    /// fails to serialize; cannot occur for these plain-data fields.
    pub fn into_frame(self) -> Result<Frame> {
        let event_type = self.event_type;
        let body = serde_json::to_value(self)?;
        Ok(Frame { event_type, body })
    }
}
