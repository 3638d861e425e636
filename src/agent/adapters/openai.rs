//! Chat model adapter for OpenAI-compatible chat-completions endpoints.

use crate::agent::domain::{ChatMessage, ToolCall, ToolChoice};
use crate::agent::ports::{
    AssistantTurn, ChatModel, ModelError, ModelResult, ToolCompletionRequest,
};
use crate::tool_registry::domain::ToolDefinition;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Chat model speaking the `/chat/completions` protocol.
#[derive(Debug, Clone)]
pub struct OpenAiChatModel {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
}

impl OpenAiChatModel {
    /// Creates an adapter for `model` served at `base_url`.
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            api_key: api_key.into(),
            model: model.into(),
            max_tokens: None,
            temperature: None,
        }
    }

    /// Caps the number of generated tokens.
    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    fn build_request(&self, request: ToolCompletionRequest) -> WireRequest {
        let ToolCompletionRequest {
            system_messages,
            messages,
            tools,
            tool_choice,
        } = request;

        let offered_choice = (!tools.is_empty()).then_some(tool_choice);
        WireRequest {
            model: self.model.clone(),
            messages: system_messages
                .iter()
                .chain(messages.iter())
                .map(WireMessage::from_domain)
                .collect(),
            tools: tools.iter().map(WireTool::from_domain).collect(),
            tool_choice: offered_choice.map(ToolChoice::as_str),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

#[async_trait]
impl ChatModel for OpenAiChatModel {
    async fn ask_tool(&self, request: ToolCompletionRequest) -> ModelResult<AssistantTurn> {
        let body = self.build_request(request);
        debug!(model = %self.model, messages = body.messages.len(), tools = body.tools.len(), "requesting chat completion");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(ModelError::transport)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.map_err(ModelError::transport)?;
            return Err(ModelError::Api {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: WireResponse = response.json().await.map_err(ModelError::transport)?;
        parsed.into_turn()
    }
}

#[derive(Debug, Serialize)]
struct WireRequest {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<WireToolCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

impl WireMessage {
    fn from_domain(message: &ChatMessage) -> Self {
        Self {
            role: message.role().as_str(),
            content: message.content().map(str::to_owned),
            tool_calls: message
                .tool_calls()
                .iter()
                .map(WireToolCall::from_domain)
                .collect(),
            tool_call_id: message.tool_call_id().map(str::to_owned),
            name: message.name().map(str::to_owned),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type", default = "function_type")]
    call_type: String,
    function: WireFunctionCall,
}

impl WireToolCall {
    fn from_domain(call: &ToolCall) -> Self {
        Self {
            id: call.id.clone(),
            call_type: function_type(),
            function: WireFunctionCall {
                name: call.function.name.clone(),
                arguments: call.function.arguments.clone(),
            },
        }
    }
}

fn function_type() -> String {
    "function".to_owned()
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Serialize)]
struct WireTool {
    #[serde(rename = "type")]
    tool_type: &'static str,
    function: WireFunction,
}

impl WireTool {
    fn from_domain(tool: &ToolDefinition) -> Self {
        Self {
            tool_type: "function",
            function: WireFunction {
                name: tool.name().to_owned(),
                description: tool.description().to_owned(),
                parameters: tool.input_schema().clone(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct WireFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    choices: Vec<WireChoice>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireResponseMessage,
}

#[derive(Debug, Deserialize)]
struct WireResponseMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<WireToolCall>,
}

impl WireResponse {
    fn into_turn(self) -> ModelResult<AssistantTurn> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or(ModelError::EmptyResponse)?;

        Ok(AssistantTurn {
            content: choice.message.content.filter(|text| !text.is_empty()),
            tool_calls: choice
                .message
                .tool_calls
                .into_iter()
                .map(|call| ToolCall::new(call.id, call.function.name, call.function.arguments))
                .collect(),
        })
    }
}
