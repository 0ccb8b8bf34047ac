use crate::error::ToolError;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A function the model may call during a session.
///
/// Implementations must tolerate concurrent calls: the session runtime
/// dispatches each invocation independently and does not serialize them.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name the model uses to refer to this tool.
    fn name(&self) -> &str;

    /// Description surfaced to the model.
    fn description(&self) -> &str;

    /// JSON schema of the tool's arguments.
    fn parameters(&self) -> Value;

    /// Executes the tool with the model-supplied arguments.
    async fn call(&self, arguments: Value) -> Result<String, ToolError>;
}

/// Wire descriptor for a registered tool, sent with the session config.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDescriptor {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// The set of tools available to one session, keyed by name.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Registers a tool under its own name. A later registration with the
    /// same name replaces the earlier one.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Wire descriptors for every registered tool.
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.tools
            .values()
            .map(|tool| ToolDescriptor {
                kind: "function",
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                parameters: tool.parameters(),
            })
            .collect()
    }

    /// Parses the raw argument JSON and runs the named tool.
    pub async fn dispatch(&self, name: &str, raw_arguments: &str) -> Result<String, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        let arguments: Value = serde_json::from_str(raw_arguments)?;
        tool.call(arguments).await
    }
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tools.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echoes the text argument back"
        }

        fn parameters(&self) -> Value {
            serde_json::json!({
                "type": "object",
                "properties": {
                    "text": { "type": "string" }
                },
                "required": ["text"]
            })
        }

        async fn call(&self, arguments: Value) -> Result<String, ToolError> {
            Ok(arguments["text"].as_str().unwrap_or_default().to_string())
        }
    }

    #[tokio::test]
    async fn dispatch_runs_the_named_tool() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool));

        let output = registry
            .dispatch("echo", r#"{"text":"hi"}"#)
            .await
            .expect("dispatch should succeed");
        assert_eq!(output, "hi");
    }

    #[tokio::test]
    async fn dispatch_rejects_unknown_tools() {
        let registry = ToolRegistry::new();

        let err = registry
            .dispatch("nope", "{}")
            .await
            .expect_err("unknown tool should fail");
        assert!(matches!(err, ToolError::UnknownTool(_)));
    }

    #[tokio::test]
    async fn dispatch_rejects_malformed_arguments() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool));

        let err = registry
            .dispatch("echo", "{not json")
            .await
            .expect_err("malformed arguments should fail");
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[test]
    fn descriptors_use_the_function_type() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool));

        let descriptors = registry.descriptors();
        assert_eq!(descriptors.len(), 1);

        let json = serde_json::to_value(&descriptors[0]).expect("serialization should not fail");
        assert_eq!(json["type"], "function");
        assert_eq!(json["name"], "echo");
        assert_eq!(json["parameters"]["type"], "object");
    }
}
