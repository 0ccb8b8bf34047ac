//! Weather tool tests against a local HTTP stub.

use antiphon_agent::{Tool, ToolError, WeatherConfig, WeatherTool};
use axum::http::StatusCode;
use axum::{routing::get, Router};
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Starts a local server that answers every location with a fixed status
/// and body, returning its base URL.
async fn spawn_weather_stub(status: StatusCode, body: &'static str) -> String {
    let app = Router::new().route("/{location}", get(move || async move { (status, body) }));

    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .expect("failed to bind stub listener");
    let addr = listener.local_addr().expect("failed to read stub address");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub server error");
    });

    format!("http://{}", addr)
}

fn tool_for(base_url: String) -> WeatherTool {
    WeatherTool::new(&WeatherConfig { base_url })
}

#[tokio::test]
async fn lookup_phrases_a_successful_response() {
    let base_url = spawn_weather_stub(StatusCode::OK, "Sunny +25°C").await;
    let tool = tool_for(base_url);

    let result = tool.lookup("Paris").await.expect("lookup should succeed");
    assert_eq!(result, "The weather in Paris right now is Sunny +25°C.");
}

#[tokio::test]
async fn lookup_trims_the_response_body() {
    let base_url = spawn_weather_stub(StatusCode::OK, "Cloudy +18°C\n").await;
    let tool = tool_for(base_url);

    let result = tool.lookup("Berlin").await.expect("lookup should succeed");
    assert_eq!(result, "The weather in Berlin right now is Cloudy +18°C.");
}

#[tokio::test]
async fn lookup_surfaces_the_upstream_status() {
    let base_url = spawn_weather_stub(StatusCode::SERVICE_UNAVAILABLE, "down for maintenance").await;
    let tool = tool_for(base_url);

    let err = tool.lookup("Paris").await.expect_err("lookup should fail");
    assert!(
        err.to_string().contains("503"),
        "error message should carry the upstream status, got: {}",
        err
    );
    match err {
        ToolError::UpstreamStatus { status, .. } => {
            assert_eq!(status, reqwest::StatusCode::SERVICE_UNAVAILABLE);
        }
        other => panic!("unexpected error variant: {:?}", other),
    }
}

#[tokio::test]
async fn lookup_surfaces_transport_failures() {
    // Nothing listens on port 1; the connection is refused outright.
    let tool = tool_for("http://127.0.0.1:1".to_string());

    let err = tool.lookup("Paris").await.expect_err("lookup should fail");
    assert!(matches!(err, ToolError::Transport(_)));
}

#[tokio::test]
async fn tool_call_parses_model_arguments() {
    let base_url = spawn_weather_stub(StatusCode::OK, "Rainy +9°C").await;
    let tool = tool_for(base_url);

    let output = tool
        .call(serde_json::json!({ "location": "Oslo" }))
        .await
        .expect("call should succeed");
    assert_eq!(output, "The weather in Oslo right now is Rainy +9°C.");
}

#[tokio::test]
async fn tool_call_rejects_missing_location() {
    let base_url = spawn_weather_stub(StatusCode::OK, "Sunny +25°C").await;
    let tool = tool_for(base_url);

    let err = tool
        .call(serde_json::json!({}))
        .await
        .expect_err("call without a location should fail");
    assert!(matches!(err, ToolError::InvalidArguments(_)));
}
