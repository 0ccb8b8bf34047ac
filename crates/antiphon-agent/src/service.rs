use crate::config::LiveKitConfig;
use crate::error::AgentError;
use crate::room::{ConnectedRoom, Participant, RoomConnector};
use async_trait::async_trait;
use livekit_api::services::room::{CreateRoomOptions, RoomClient};
use livekit_protocol::ParticipantInfo;
use std::sync::Arc;
use std::time::Duration;

/// Room control plane backed by the LiveKit server API.
///
/// The worker never joins rooms as a media participant. Creating rooms,
/// reading their metadata, and watching for participants all go through
/// the HTTP service, which is everything the assistant bootstrap needs.
#[derive(Debug)]
pub struct RoomService {
    config: LiveKitConfig,
    room_client: Arc<RoomClient>,
}

impl RoomService {
    pub fn new(config: LiveKitConfig) -> Self {
        let room_client = Arc::new(RoomClient::with_api_key(
            &config.url,
            &config.api_key,
            &config.api_secret,
        ));
        Self {
            config,
            room_client,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.config.url.is_empty()
    }

    pub fn url(&self) -> &str {
        &self.config.url
    }
}

#[async_trait]
impl RoomConnector for RoomService {
    async fn connect(&self, room_name: &str) -> Result<Box<dyn ConnectedRoom>, AgentError> {
        let options = CreateRoomOptions::default();

        let room = self
            .room_client
            .create_room(room_name, options)
            .await
            .map_err(|e| AgentError::RoomService(e.to_string()))?;

        tracing::info!(room = %room.name, "connected to room");

        Ok(Box::new(LiveKitRoom {
            client: self.room_client.clone(),
            name: room.name,
            poll_interval: Duration::from_millis(self.config.participant_poll_ms),
        }))
    }
}

/// Handle to one LiveKit room.
struct LiveKitRoom {
    client: Arc<RoomClient>,
    name: String,
    poll_interval: Duration,
}

#[async_trait]
impl ConnectedRoom for LiveKitRoom {
    fn name(&self) -> &str {
        &self.name
    }

    /// Re-reads the room from the server so metadata set after connect is
    /// still observed. LiveKit stores metadata as a plain string; an empty
    /// string means none was set.
    async fn metadata(&self) -> Result<Option<String>, AgentError> {
        let rooms = self
            .client
            .list_rooms(vec![self.name.clone()])
            .await
            .map_err(|e| AgentError::RoomService(e.to_string()))?;

        Ok(rooms
            .into_iter()
            .next()
            .map(|room| room.metadata)
            .filter(|metadata| !metadata.is_empty()))
    }

    async fn wait_for_participant(&self) -> Result<Participant, AgentError> {
        loop {
            let participants = self
                .client
                .list_participants(&self.name)
                .await
                .map_err(|e| AgentError::RoomService(e.to_string()))?;

            if let Some(info) = participants.into_iter().next() {
                return Ok(participant_from_info(info));
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

fn participant_from_info(info: ParticipantInfo) -> Participant {
    Participant {
        identity: info.identity,
        name: if info.name.is_empty() {
            None
        } else {
            Some(info.name)
        },
    }
}
