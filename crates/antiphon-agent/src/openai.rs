use crate::error::AgentError;
use crate::model::SessionOptions;
use crate::realtime::{ConversationItem, RealtimeProvider, RealtimeSession, SessionContext};
use crate::tools::{ToolDescriptor, ToolRegistry};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::{mpsc, oneshot, watch};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::{HeaderValue, AUTHORIZATION};
use tokio_tungstenite::tungstenite::Message;

/// Default realtime endpoint.
const DEFAULT_REALTIME_URL: &str = "wss://api.openai.com/v1/realtime";

/// Default realtime-capable model.
const DEFAULT_REALTIME_MODEL: &str = "gpt-4o-realtime-preview";

/// Outbound queue depth per session. Senders beyond this wait until the
/// socket writer catches up.
const OUTBOUND_BUFFER: usize = 64;

fn default_realtime_url() -> String {
    DEFAULT_REALTIME_URL.to_string()
}

fn default_realtime_model() -> String {
    DEFAULT_REALTIME_MODEL.to_string()
}

/// Settings for the OpenAI realtime provider.
#[derive(Debug, Clone, Deserialize)]
pub struct RealtimeConfig {
    /// WebSocket endpoint of the realtime API.
    #[serde(default = "default_realtime_url")]
    pub url: String,

    /// Model to request sessions for.
    #[serde(default = "default_realtime_model")]
    pub model: String,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            url: default_realtime_url(),
            model: default_realtime_model(),
        }
    }
}

/// Session fields sent with `session.update`.
#[derive(Debug, Serialize)]
struct SessionConfig {
    #[serde(flatten)]
    options: SessionOptions,
    tools: Vec<ToolDescriptor>,
    tool_choice: &'static str,
}

/// Client-to-server events. Field layout follows the realtime wire format.
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
enum ClientEvent {
    #[serde(rename = "session.update")]
    SessionUpdate { session: SessionConfig },
    #[serde(rename = "conversation.item.create")]
    ConversationItemCreate { item: ConversationItem },
    #[serde(rename = "response.create")]
    ResponseCreate,
}

/// Server-to-client events the adapter reacts to. Everything else,
/// including all audio traffic, lands in `Unhandled` and is dropped.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ServerEvent {
    #[serde(rename = "session.created")]
    SessionCreated,
    #[serde(rename = "response.function_call_arguments.done")]
    FunctionCallArgumentsDone {
        call_id: String,
        name: String,
        arguments: String,
    },
    #[serde(rename = "error")]
    Error { error: ApiErrorDetail },
    #[serde(other)]
    Unhandled,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
}

/// Realtime provider backed by the OpenAI realtime API over WebSocket.
///
/// This adapter speaks only the session control plane: it configures the
/// session, appends conversation items, requests responses, and serves
/// function calls. Audio flows directly between the provider and the room
/// and never passes through here.
pub struct OpenAiRealtime {
    api_key: String,
    config: RealtimeConfig,
}

impl OpenAiRealtime {
    pub fn new(api_key: impl Into<String>, config: RealtimeConfig) -> Self {
        Self {
            api_key: api_key.into(),
            config,
        }
    }
}

impl fmt::Debug for OpenAiRealtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiRealtime")
            .field("api_key", &"[REDACTED]")
            .field("config", &self.config)
            .finish()
    }
}

/// Serializes an event and queues it for the socket writer.
async fn send_event(tx: &mpsc::Sender<Message>, event: &ClientEvent) -> Result<(), AgentError> {
    let json = serde_json::to_string(event)?;
    tx.send(Message::Text(json.into()))
        .await
        .map_err(|_| AgentError::Session("realtime session is closed".to_string()))
}

#[async_trait]
impl RealtimeProvider for OpenAiRealtime {
    async fn start_session(
        &self,
        ctx: &SessionContext,
        options: SessionOptions,
        tools: ToolRegistry,
    ) -> Result<Box<dyn RealtimeSession>, AgentError> {
        let url = format!("{}?model={}", self.config.url, self.config.model);

        let mut request = url
            .into_client_request()
            .map_err(|e| AgentError::Session(e.to_string()))?;
        let auth = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
            .map_err(|e| AgentError::Session(e.to_string()))?;
        request.headers_mut().insert(AUTHORIZATION, auth);
        request
            .headers_mut()
            .insert("OpenAI-Beta", HeaderValue::from_static("realtime=v1"));

        let (stream, _) = connect_async(request)
            .await
            .map_err(|e| AgentError::Session(e.to_string()))?;

        tracing::info!(
            room = %ctx.room_name,
            participant = %ctx.participant_identity,
            model = %self.config.model,
            "realtime socket connected"
        );

        let descriptors = tools.descriptors();
        let (mut ws_sink, mut ws_stream) = stream.split();

        let (outbound_tx, mut outbound_rx) = mpsc::channel::<Message>(OUTBOUND_BUFFER);
        let (ready_tx, ready_rx) = oneshot::channel::<Result<(), String>>();
        let (closed_tx, closed_rx) = watch::channel(false);

        // Writer: drains the outbound queue onto the socket. Stops after a
        // close frame so nothing is sent on a closing socket.
        tokio::spawn(async move {
            while let Some(message) = outbound_rx.recv().await {
                let closing = matches!(message, Message::Close(_));
                if ws_sink.send(message).await.is_err() || closing {
                    break;
                }
            }
            let _ = ws_sink.close().await;
        });

        // Reader: resolves the start handshake, serves function calls, and
        // marks the session closed when the socket ends.
        let registry = tools;
        let dispatch_tx = outbound_tx.clone();
        let room = ctx.room_name.clone();
        let mut ready = Some(ready_tx);
        tokio::spawn(async move {
            while let Some(message) = ws_stream.next().await {
                let message = match message {
                    Ok(message) => message,
                    Err(e) => {
                        tracing::warn!(room = %room, "realtime socket error: {}", e);
                        break;
                    }
                };

                let text = match message {
                    Message::Text(text) => text,
                    Message::Close(_) => break,
                    _ => continue,
                };

                let event = match serde_json::from_str::<ServerEvent>(text.as_str()) {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::debug!(room = %room, "ignoring unparseable server event: {}", e);
                        continue;
                    }
                };

                match event {
                    ServerEvent::SessionCreated => {
                        tracing::info!(room = %room, "realtime session created");
                        if let Some(tx) = ready.take() {
                            let _ = tx.send(Ok(()));
                        }
                    }
                    ServerEvent::FunctionCallArgumentsDone {
                        call_id,
                        name,
                        arguments,
                    } => {
                        let registry = registry.clone();
                        let out = dispatch_tx.clone();
                        let room = room.clone();

                        // Calls may overlap; each runs in its own task so a
                        // slow tool does not stall the event loop.
                        tokio::spawn(async move {
                            let output = match registry.dispatch(&name, &arguments).await {
                                Ok(output) => output,
                                Err(e) => {
                                    tracing::warn!(
                                        room = %room,
                                        tool = %name,
                                        "tool call failed: {}",
                                        e
                                    );
                                    e.to_string()
                                }
                            };

                            let item = ClientEvent::ConversationItemCreate {
                                item: ConversationItem::FunctionCallOutput { call_id, output },
                            };
                            if send_event(&out, &item).await.is_ok() {
                                let _ = send_event(&out, &ClientEvent::ResponseCreate).await;
                            }
                        });
                    }
                    ServerEvent::Error { error } => {
                        tracing::warn!(room = %room, "realtime API error: {}", error.message);
                        if let Some(tx) = ready.take() {
                            let _ = tx.send(Err(error.message));
                        }
                    }
                    ServerEvent::Unhandled => {}
                }
            }

            if let Some(tx) = ready.take() {
                let _ = tx.send(Err("socket closed before session was created".to_string()));
            }
            let _ = closed_tx.send(true);
            tracing::info!(room = %room, "realtime session closed");
        });

        let session = OpenAiSession {
            outbound: outbound_tx,
            closed: closed_rx,
        };

        let update = ClientEvent::SessionUpdate {
            session: SessionConfig {
                options,
                tools: descriptors,
                tool_choice: "auto",
            },
        };
        session.send(&update).await?;

        match ready_rx.await {
            Ok(Ok(())) => Ok(Box::new(session)),
            Ok(Err(message)) => Err(AgentError::Session(message)),
            Err(_) => Err(AgentError::Session(
                "socket closed before session was created".to_string(),
            )),
        }
    }
}

/// A live session on the realtime socket.
struct OpenAiSession {
    outbound: mpsc::Sender<Message>,
    closed: watch::Receiver<bool>,
}

impl OpenAiSession {
    async fn send(&self, event: &ClientEvent) -> Result<(), AgentError> {
        send_event(&self.outbound, event).await
    }
}

#[async_trait]
impl RealtimeSession for OpenAiSession {
    async fn create_item(&self, item: ConversationItem) -> Result<(), AgentError> {
        self.send(&ClientEvent::ConversationItemCreate { item })
            .await
    }

    async fn create_response(&self) -> Result<(), AgentError> {
        self.send(&ClientEvent::ResponseCreate).await
    }

    async fn wait_closed(&self) {
        let mut closed = self.closed.clone();
        while !*closed.borrow_and_update() {
            if closed.changed().await.is_err() {
                break;
            }
        }
    }

    async fn close(&self) {
        let _ = self.outbound.send(Message::Close(None)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AgentConfig, DEFAULT_PROMPT};
    use crate::weather::{WeatherConfig, WeatherTool};
    use std::sync::Arc;

    fn registry_with_weather() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(WeatherTool::new(&WeatherConfig::default())));
        registry
    }

    #[test]
    fn session_update_carries_options_and_tools() {
        let event = ClientEvent::SessionUpdate {
            session: SessionConfig {
                options: SessionOptions::from(&AgentConfig::default()),
                tools: registry_with_weather().descriptors(),
                tool_choice: "auto",
            },
        };

        let json = serde_json::to_value(&event).expect("serialization should not fail");
        assert_eq!(json["type"], "session.update");
        assert_eq!(json["session"]["instructions"], DEFAULT_PROMPT);
        assert_eq!(json["session"]["tool_choice"], "auto");
        assert_eq!(json["session"]["tools"][0]["type"], "function");
        assert_eq!(json["session"]["tools"][0]["name"], "weather");
        assert!(
            json["session"].get("voice").is_none(),
            "unset voice must not appear in session.update"
        );
    }

    #[test]
    fn session_update_includes_a_configured_voice() {
        let config = AgentConfig {
            prompt: "You are brief.".to_string(),
            voice: Some("ash".to_string()),
        };
        let event = ClientEvent::SessionUpdate {
            session: SessionConfig {
                options: SessionOptions::from(&config),
                tools: Vec::new(),
                tool_choice: "auto",
            },
        };

        let json = serde_json::to_value(&event).expect("serialization should not fail");
        assert_eq!(json["session"]["voice"], "ash");
    }

    #[test]
    fn response_create_is_a_bare_event() {
        let json =
            serde_json::to_value(ClientEvent::ResponseCreate).expect("serialization should not fail");
        assert_eq!(json, serde_json::json!({ "type": "response.create" }));
    }

    #[test]
    fn item_create_matches_the_conversation_wire_shape() {
        let event = ClientEvent::ConversationItemCreate {
            item: ConversationItem::assistant_text("hello"),
        };

        let json = serde_json::to_value(&event).expect("serialization should not fail");
        assert_eq!(json["type"], "conversation.item.create");
        assert_eq!(json["item"]["type"], "message");
        assert_eq!(json["item"]["role"], "assistant");
        assert_eq!(json["item"]["content"][0]["text"], "hello");
    }

    #[test]
    fn function_call_events_parse() {
        let raw = r#"{
            "type": "response.function_call_arguments.done",
            "event_id": "event_123",
            "response_id": "resp_1",
            "item_id": "item_1",
            "output_index": 0,
            "call_id": "call_1",
            "name": "weather",
            "arguments": "{\"location\":\"Paris\"}"
        }"#;

        let event: ServerEvent = serde_json::from_str(raw).expect("event should parse");
        match event {
            ServerEvent::FunctionCallArgumentsDone {
                call_id,
                name,
                arguments,
            } => {
                assert_eq!(call_id, "call_1");
                assert_eq!(name, "weather");
                assert_eq!(arguments, r#"{"location":"Paris"}"#);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn session_created_parses_with_extra_fields() {
        let event: ServerEvent = serde_json::from_str(
            r#"{"type":"session.created","event_id":"e1","session":{"id":"sess_1"}}"#,
        )
        .expect("session.created should parse");
        assert!(matches!(event, ServerEvent::SessionCreated));
    }

    #[test]
    fn unknown_server_events_are_ignored() {
        let event: ServerEvent =
            serde_json::from_str(r#"{"type":"response.audio.delta","delta":"AAAA"}"#)
                .expect("unknown events should still parse");
        assert!(matches!(event, ServerEvent::Unhandled));
    }

    #[test]
    fn api_key_is_redacted_in_debug_output() {
        let provider = OpenAiRealtime::new("sk-secret", RealtimeConfig::default());
        let debug = format!("{:?}", provider);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("sk-secret"));
    }
}
