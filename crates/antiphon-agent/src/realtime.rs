use crate::error::AgentError;
use crate::model::SessionOptions;
use crate::tools::ToolRegistry;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies the room and participant a session serves. Carried into the
/// provider for logging and correlation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub room_name: String,
    pub participant_identity: String,
}

/// Role of a conversation message item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemRole {
    System,
    Assistant,
    User,
}

/// One piece of content inside a message item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContentPart {
    #[serde(rename = "text")]
    Text { text: String },
}

/// An item appended to a session's conversation. Field layout follows the
/// realtime conversation wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ConversationItem {
    #[serde(rename = "message")]
    Message {
        role: ItemRole,
        content: Vec<ContentPart>,
    },
    #[serde(rename = "function_call_output")]
    FunctionCallOutput { call_id: String, output: String },
}

impl ConversationItem {
    /// A plain-text item in the assistant's voice.
    pub fn assistant_text(text: impl Into<String>) -> Self {
        Self::Message {
            role: ItemRole::Assistant,
            content: vec![ContentPart::Text { text: text.into() }],
        }
    }
}

/// Starts realtime model sessions.
#[async_trait]
pub trait RealtimeProvider: Send + Sync {
    /// Opens a session configured with `options` and the given tools, bound
    /// to the room and participant in `ctx`. Resolves once the provider has
    /// acknowledged the session.
    async fn start_session(
        &self,
        ctx: &SessionContext,
        options: SessionOptions,
        tools: ToolRegistry,
    ) -> Result<Box<dyn RealtimeSession>, AgentError>;
}

/// A live model session.
///
/// Tool calls are served inside the provider adapter; callers only append
/// items and request responses.
#[async_trait]
pub trait RealtimeSession: Send + Sync {
    /// Appends an item to the conversation.
    async fn create_item(&self, item: ConversationItem) -> Result<(), AgentError>;

    /// Asks the model to respond to the conversation so far.
    async fn create_response(&self) -> Result<(), AgentError>;

    /// Resolves when the session has ended, for any reason.
    async fn wait_closed(&self);

    /// Tears the session down. Closing an already-closed session is a
    /// no-op.
    async fn close(&self);
}

impl fmt::Debug for dyn RealtimeSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RealtimeSession")
    }
}
