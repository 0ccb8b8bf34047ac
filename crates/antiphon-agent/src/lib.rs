//! Voice assistant agents for LiveKit rooms.
//!
//! Runs one assistant per room: connect through the LiveKit server API,
//! wait for a participant, derive the agent's configuration from room
//! metadata, then drive an OpenAI realtime session with callable tools
//! registered. Media transport stays with LiveKit and inference with the
//! model provider; this crate speaks only their control planes.
//!
//! Room metadata is untrusted input. The configuration resolver falls
//! back to defaults on anything it cannot parse, so a bad document can
//! change what the assistant says but never whether it starts.

pub mod config;
pub mod entry;
pub mod error;
pub mod model;
pub mod openai;
pub mod realtime;
pub mod room;
pub mod service;
pub mod tools;
pub mod weather;

pub use config::{AgentConfig, LiveKitConfig, DEFAULT_PROMPT};
pub use entry::VoiceAssistant;
pub use error::{AgentError, ToolError};
pub use model::SessionOptions;
pub use openai::{OpenAiRealtime, RealtimeConfig};
pub use realtime::{
    ContentPart, ConversationItem, ItemRole, RealtimeProvider, RealtimeSession, SessionContext,
};
pub use room::{ConnectedRoom, Participant, RoomConnector};
pub use service::RoomService;
pub use tools::{Tool, ToolDescriptor, ToolRegistry};
pub use weather::{WeatherConfig, WeatherTool};
