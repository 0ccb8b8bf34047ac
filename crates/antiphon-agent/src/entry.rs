use crate::config::AgentConfig;
use crate::error::AgentError;
use crate::model::SessionOptions;
use crate::realtime::{ConversationItem, RealtimeProvider, RealtimeSession, SessionContext};
use crate::room::RoomConnector;
use crate::tools::ToolRegistry;
use crate::weather::WeatherTool;
use std::sync::Arc;
use tracing::info;

/// Text of the first assistant turn. The model is told to speak the
/// greeting rather than having it injected as output, so the configured
/// voice applies to it.
const GREETING_INSTRUCTION: &str = "Say \"How can I help you today?\"";

/// Runs voice assistant jobs against rooms.
///
/// Holds the room and model services shared by every job. Each [`run`]
/// call is independent and may execute concurrently with others.
///
/// [`run`]: VoiceAssistant::run
pub struct VoiceAssistant {
    rooms: Arc<dyn RoomConnector>,
    provider: Arc<dyn RealtimeProvider>,
    weather: WeatherTool,
}

impl VoiceAssistant {
    pub fn new(
        rooms: Arc<dyn RoomConnector>,
        provider: Arc<dyn RealtimeProvider>,
        weather: WeatherTool,
    ) -> Self {
        Self {
            rooms,
            provider,
            weather,
        }
    }

    /// Runs one assistant job to the point where the session is live and
    /// the opening response has been requested.
    ///
    /// The sequence is fixed: connect to the room, wait for a participant,
    /// resolve the configuration from room metadata, start the session
    /// with the weather tool registered, then seed the greeting. The wait
    /// for a participant is unbounded; the caller owns cancellation.
    ///
    /// Returns the live session handle so the caller can track or tear
    /// down the conversation.
    pub async fn run(&self, room_name: &str) -> Result<Box<dyn RealtimeSession>, AgentError> {
        let room = self.rooms.connect(room_name).await?;

        info!(room = %room.name(), "waiting for participant");
        let participant = room.wait_for_participant().await?;
        info!(
            room = %room.name(),
            participant = %participant.identity,
            "starting assistant for participant"
        );

        let metadata = room.metadata().await?;
        let config = AgentConfig::resolve(metadata.as_deref());
        let options = SessionOptions::from(&config);

        let mut tools = ToolRegistry::new();
        tools.register(Arc::new(self.weather.clone()));

        let ctx = SessionContext {
            room_name: room.name().to_string(),
            participant_identity: participant.identity.clone(),
        };
        let session = self.provider.start_session(&ctx, options, tools).await?;

        session
            .create_item(ConversationItem::assistant_text(GREETING_INSTRUCTION))
            .await?;
        session.create_response().await?;

        Ok(session)
    }
}
