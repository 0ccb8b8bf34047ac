use crate::error::ToolError;
use crate::tools::Tool;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

/// Default endpoint for weather lookups. Answers plain-text conditions,
/// e.g. "Sunny +25°C" for `?format=%C+%t`.
const DEFAULT_WEATHER_URL: &str = "https://wttr.in";

fn default_weather_url() -> String {
    DEFAULT_WEATHER_URL.to_string()
}

/// Settings for the weather tool.
#[derive(Debug, Clone, Deserialize)]
pub struct WeatherConfig {
    /// Base URL of the weather service.
    #[serde(default = "default_weather_url")]
    pub base_url: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_weather_url(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WeatherArgs {
    location: String,
}

/// Fetches current conditions for a location and phrases them for the
/// model.
///
/// Holds no per-call state; concurrent calls share only the HTTP client.
#[derive(Debug, Clone)]
pub struct WeatherTool {
    client: reqwest::Client,
    base_url: String,
}

impl WeatherTool {
    pub fn new(config: &WeatherConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Looks up the weather for a location.
    ///
    /// The location is forwarded verbatim; validating it is the weather
    /// service's job. A non-success status becomes a [`ToolError`] carrying
    /// the status code, and transport failures propagate as-is. No retries:
    /// the model decides what to tell the user when a lookup fails.
    pub async fn lookup(&self, location: &str) -> Result<String, ToolError> {
        let url = format!("{}/{}?format=%C+%t", self.base_url, location);

        tracing::debug!(location = %location, "fetching weather");

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(ToolError::UpstreamStatus {
                service: "Weather API",
                status: response.status(),
            });
        }

        let weather = response.text().await?;
        Ok(format!(
            "The weather in {} right now is {}.",
            location,
            weather.trim()
        ))
    }
}

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        "weather"
    }

    fn description(&self) -> &str {
        "Get the weather in a location"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": "The location to get the weather for"
                }
            },
            "required": ["location"]
        })
    }

    async fn call(&self, arguments: Value) -> Result<String, ToolError> {
        let args: WeatherArgs = serde_json::from_value(arguments)?;
        self.lookup(&args.location).await
    }
}
