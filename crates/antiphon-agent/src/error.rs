use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Room service error: {0}")]
    RoomService(String),

    #[error("Realtime session error: {0}")]
    Session(String),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors raised while executing a tool call.
///
/// The rendered message is what the session runtime reports back into the
/// conversation when a call fails, so it must stand on its own.
#[derive(Error, Debug)]
pub enum ToolError {
    /// The upstream service answered with a non-success status.
    #[error("{service} returned status: {status}")]
    UpstreamStatus {
        service: &'static str,
        status: reqwest::StatusCode,
    },

    #[error("Request error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(#[from] serde_json::Error),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),
}
