use serde::{Deserialize, Serialize};
use std::fmt;

/// Instructions used when room metadata supplies no usable prompt.
pub const DEFAULT_PROMPT: &str = "You are a helpful assistant.";

fn default_prompt() -> String {
    DEFAULT_PROMPT.to_string()
}

/// Per-room agent configuration, built once per job from the room's
/// metadata and immutable afterwards.
///
/// `prompt` is never empty. `voice` is forwarded to the realtime provider
/// only when the metadata supplied one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentConfig {
    pub prompt: String,
    pub voice: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            prompt: default_prompt(),
            voice: None,
        }
    }
}

/// Shape of the JSON document carried in room metadata.
///
/// Rooms created outside this system may hold arbitrary metadata, so every
/// field is optional. Parsing is strict on types: a prompt that is not a
/// string is a parse failure, not a value to coerce.
#[derive(Debug, Default, Deserialize)]
struct MetadataEnvelope {
    #[serde(default)]
    config: MetadataConfig,
}

#[derive(Debug, Default, Deserialize)]
struct MetadataConfig {
    #[serde(default)]
    prompt: Option<String>,
    #[serde(default)]
    voice: Option<String>,
}

impl AgentConfig {
    /// Resolves the agent configuration from raw room metadata.
    ///
    /// Absent, empty, or unparsable metadata yields the default
    /// configuration. A missing or empty `config.prompt` falls back to
    /// [`DEFAULT_PROMPT`]; an empty `config.voice` counts as unset.
    ///
    /// This never fails. Metadata is untrusted input and a bad document
    /// must not take the agent down, so parse failures are logged and the
    /// defaults apply.
    pub fn resolve(metadata: Option<&str>) -> Self {
        let raw = match metadata {
            Some(raw) if !raw.is_empty() => raw,
            _ => return Self::default(),
        };

        let envelope: MetadataEnvelope = match serde_json::from_str(raw) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!("failed to parse room metadata, using default config: {}", e);
                return Self::default();
            }
        };

        let prompt = match envelope.config.prompt {
            Some(prompt) if !prompt.is_empty() => prompt,
            _ => default_prompt(),
        };
        let voice = envelope.config.voice.filter(|voice| !voice.is_empty());

        Self { prompt, voice }
    }
}

fn default_participant_poll_ms() -> u64 {
    500
}

#[derive(Clone, Serialize, Deserialize)]
pub struct LiveKitConfig {
    pub url: String,
    pub api_key: String,
    #[serde(skip_serializing)]
    pub api_secret: String,
    /// Interval in milliseconds between participant list polls while waiting
    /// for someone to join a room. Default: 500.
    #[serde(default = "default_participant_poll_ms")]
    pub participant_poll_ms: u64,
}

impl Default for LiveKitConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            participant_poll_ms: default_participant_poll_ms(),
        }
    }
}

impl fmt::Debug for LiveKitConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveKitConfig")
            .field("url", &self.url)
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("participant_poll_ms", &self.participant_poll_ms)
            .finish()
    }
}

impl LiveKitConfig {
    pub fn new(
        url: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            participant_poll_ms: default_participant_poll_ms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_metadata_yields_defaults() {
        let config = AgentConfig::resolve(None);
        assert_eq!(config.prompt, DEFAULT_PROMPT);
        assert!(config.voice.is_none());
    }

    #[test]
    fn empty_metadata_yields_defaults() {
        assert_eq!(AgentConfig::resolve(Some("")), AgentConfig::default());
    }

    #[test]
    fn malformed_metadata_yields_defaults() {
        assert_eq!(AgentConfig::resolve(Some("{not json")), AgentConfig::default());
    }

    #[test]
    fn wrong_shape_metadata_yields_defaults() {
        // A numeric prompt fails the typed parse rather than being coerced.
        assert_eq!(
            AgentConfig::resolve(Some(r#"{"config": {"prompt": 42}}"#)),
            AgentConfig::default()
        );
    }

    #[test]
    fn metadata_without_config_key_yields_defaults() {
        assert_eq!(
            AgentConfig::resolve(Some(r#"{"other": true}"#)),
            AgentConfig::default()
        );
    }

    #[test]
    fn voice_only_metadata_keeps_default_prompt() {
        let config = AgentConfig::resolve(Some(r#"{"config": {"voice": "alloy"}}"#));
        assert_eq!(config.prompt, DEFAULT_PROMPT);
        assert_eq!(config.voice.as_deref(), Some("alloy"));
    }

    #[test]
    fn full_metadata_carries_both_fields() {
        let config = AgentConfig::resolve(Some(
            r#"{"config": {"prompt": "You are a travel guide.", "voice": "ash"}}"#,
        ));
        assert_eq!(config.prompt, "You are a travel guide.");
        assert_eq!(config.voice.as_deref(), Some("ash"));
    }

    #[test]
    fn empty_prompt_falls_back_to_default() {
        let config = AgentConfig::resolve(Some(r#"{"config": {"prompt": ""}}"#));
        assert_eq!(config.prompt, DEFAULT_PROMPT);
        assert!(config.voice.is_none());
    }

    #[test]
    fn empty_voice_counts_as_unset() {
        let config = AgentConfig::resolve(Some(r#"{"config": {"voice": ""}}"#));
        assert!(config.voice.is_none());
    }

    #[test]
    fn extra_metadata_fields_are_ignored() {
        let config = AgentConfig::resolve(Some(
            r#"{"config": {"prompt": "Hi.", "theme": "dark"}, "created_by": "console"}"#,
        ));
        assert_eq!(config.prompt, "Hi.");
    }

    #[test]
    fn livekit_secret_is_redacted_in_debug_output() {
        let config = LiveKitConfig::new("wss://livekit.example.com", "key", "super-secret");
        let debug = format!("{:?}", config);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("super-secret"));
    }

    #[test]
    fn livekit_config_parses_with_default_poll_interval() {
        let config: LiveKitConfig = toml::from_str(
            r#"
            url = "wss://livekit.example.com"
            api_key = "key"
            api_secret = "secret"
            "#,
        )
        .expect("config should parse");
        assert_eq!(config.participant_poll_ms, 500);
    }
}
