use crate::error::AgentError;
use async_trait::async_trait;

/// A remote participant observed in a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub identity: String,
    pub name: Option<String>,
}

/// Connects agents to rooms by name.
#[async_trait]
pub trait RoomConnector: Send + Sync {
    /// Connects to the named room, creating it if necessary.
    async fn connect(&self, room_name: &str) -> Result<Box<dyn ConnectedRoom>, AgentError>;
}

/// A room the agent is connected to, scoped to a single job.
#[async_trait]
pub trait ConnectedRoom: Send + Sync {
    fn name(&self) -> &str;

    /// Current room metadata, if any was set.
    async fn metadata(&self) -> Result<Option<String>, AgentError>;

    /// Waits until a remote participant is present in the room and returns
    /// it. Suspends indefinitely; cancellation belongs to the caller.
    async fn wait_for_participant(&self) -> Result<Participant, AgentError>;
}
