use crate::config::AgentConfig;
use serde::Serialize;

/// Options for a realtime model session, derived from the resolved
/// [`AgentConfig`].
///
/// `voice` is omitted from the serialized payload when unset so the
/// provider's own default applies; an explicit null would override it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionOptions {
    pub instructions: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
}

impl From<&AgentConfig> for SessionOptions {
    fn from(config: &AgentConfig) -> Self {
        Self {
            instructions: config.prompt.clone(),
            voice: config.voice.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_PROMPT;

    #[test]
    fn voice_is_omitted_from_the_payload_when_unset() {
        let options = SessionOptions::from(&AgentConfig::default());

        let json = serde_json::to_value(&options).expect("serialization should not fail");
        assert_eq!(json["instructions"], DEFAULT_PROMPT);
        assert!(
            json.get("voice").is_none(),
            "unset voice must not appear in the payload"
        );
    }

    #[test]
    fn voice_is_present_when_configured() {
        let config = AgentConfig {
            prompt: "You are terse.".to_string(),
            voice: Some("ash".to_string()),
        };

        let json =
            serde_json::to_value(SessionOptions::from(&config)).expect("serialization should not fail");
        assert_eq!(json["instructions"], "You are terse.");
        assert_eq!(json["voice"], "ash");
    }
}
