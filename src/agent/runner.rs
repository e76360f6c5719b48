//! Tool-calling agent loop over the chat completions API.

use super::{ChatTurn, Responder, Role};
use crate::error::{PlacementError, Result};
use crate::tools::Toolbox;
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use tracing::{debug, info, instrument};

/// Agent that lets the model call tools until it produces an answer.
pub struct ToolCallingAgent {
    client: Client<OpenAIConfig>,
    model: String,
    system_prompt: String,
    max_iterations: usize,
    temperature: f32,
}

impl ToolCallingAgent {
    /// Create a new agent for `model` with the given system prompt.
    pub fn new(client: Client<OpenAIConfig>, model: &str, system_prompt: &str) -> Self {
        Self {
            client,
            model: model.to_string(),
            system_prompt: system_prompt.to_string(),
            max_iterations: 15,
            temperature: 0.0,
        }
    }

    /// Set maximum iterations for the agent loop.
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    fn initial_messages(
        &self,
        query: &str,
        history: &[ChatTurn],
    ) -> Result<Vec<ChatCompletionRequestMessage>> {
        let mut messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.system_prompt.clone())
                .build()
                .map_err(|e| PlacementError::Agent(e.to_string()))?
                .into(),
        ];

        for turn in history {
            let message: ChatCompletionRequestMessage = match turn.role {
                Role::User => ChatCompletionRequestUserMessageArgs::default()
                    .content(turn.content.clone())
                    .build()
                    .map_err(|e| PlacementError::Agent(e.to_string()))?
                    .into(),
                Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                    .content(turn.content.clone())
                    .build()
                    .map_err(|e| PlacementError::Agent(e.to_string()))?
                    .into(),
            };
            messages.push(message);
        }

        messages.push(
            ChatCompletionRequestUserMessageArgs::default()
                .content(query)
                .build()
                .map_err(|e| PlacementError::Agent(e.to_string()))?
                .into(),
        );

        Ok(messages)
    }

    /// Run the loop and return the answer together with the tool calls made.
    #[instrument(skip(self, history, tools), fields(model = %self.model))]
    pub async fn run(
        &self,
        query: &str,
        history: &[ChatTurn],
        tools: &Toolbox,
    ) -> Result<(String, Vec<ToolCallRecord>)> {
        let mut messages = self.initial_messages(query, history)?;
        let mut tool_calls_made = Vec::new();
        let mut iterations = 0;

        loop {
            iterations += 1;
            if iterations > self.max_iterations {
                return Err(PlacementError::Agent(format!(
                    "Agent exceeded maximum iterations ({})",
                    self.max_iterations
                )));
            }

            debug!("Agent iteration {}", iterations);

            let mut args = CreateChatCompletionRequestArgs::default();
            args.model(&self.model)
                .messages(messages.clone())
                .temperature(self.temperature);
            if !tools.is_empty() {
                args.tools(tools.definitions());
            }
            let request = args
                .build()
                .map_err(|e| PlacementError::Agent(e.to_string()))?;

            let response = self
                .client
                .chat()
                .create(request)
                .await
                .map_err(|e| PlacementError::Llm(format!("Agent API error: {}", e)))?;

            let choice = response
                .choices
                .into_iter()
                .next()
                .ok_or_else(|| PlacementError::Agent("No response from model".to_string()))?;

            let tool_calls = match choice.message.tool_calls {
                Some(calls) if !calls.is_empty() => calls,
                _ => {
                    info!(
                        "Agent finished after {} iterations and {} tool calls",
                        iterations,
                        tool_calls_made.len()
                    );
                    return Ok((choice.message.content.unwrap_or_default(), tool_calls_made));
                }
            };

            let assistant_msg = ChatCompletionRequestAssistantMessageArgs::default()
                .tool_calls(tool_calls.clone())
                .build()
                .map_err(|e| PlacementError::Agent(e.to_string()))?;
            messages.push(assistant_msg.into());

            for tool_call in &tool_calls {
                let record = execute_tool_call(tools, tool_call).await?;

                let tool_msg = ChatCompletionRequestToolMessageArgs::default()
                    .tool_call_id(&tool_call.id)
                    .content(record.result.clone())
                    .build()
                    .map_err(|e| PlacementError::Agent(e.to_string()))?;
                messages.push(tool_msg.into());

                tool_calls_made.push(record);
            }
        }
    }
}

#[async_trait]
impl Responder for ToolCallingAgent {
    async fn respond(&self, query: &str, history: &[ChatTurn], tools: &Toolbox) -> Result<String> {
        let (answer, _) = self.run(query, history, tools).await?;
        Ok(answer)
    }
}

/// Execute a single tool call and return a record of it.
async fn execute_tool_call(
    tools: &Toolbox,
    tool_call: &ChatCompletionMessageToolCall,
) -> Result<ToolCallRecord> {
    let name = &tool_call.function.name;
    let arguments = &tool_call.function.arguments;

    let result = tools.execute(name, arguments).await?;

    Ok(ToolCallRecord {
        name: name.clone(),
        arguments: arguments.clone(),
        result,
    })
}

/// Record of a tool call made by the agent.
#[derive(Debug, Clone)]
pub struct ToolCallRecord {
    /// Name of the tool called.
    pub name: String,
    /// JSON arguments passed to the tool.
    pub arguments: String,
    /// Result returned by the tool.
    pub result: String,
}

impl std::fmt::Display for ToolCallRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.arguments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LlmSettings;
    use crate::openai::create_client;

    fn agent() -> ToolCallingAgent {
        let client = create_client(&LlmSettings::default(), "test-key").unwrap();
        ToolCallingAgent::new(client, "gemini-2.5-flash", "You are helpful.")
    }

    #[test]
    fn test_tool_call_record_display() {
        let record = ToolCallRecord {
            name: "SQL_Query_Executor".to_string(),
            arguments: r#"{"query": "SELECT 1"}"#.to_string(),
            result: "Query executed successfully.".to_string(),
        };
        assert_eq!(
            format!("{}", record),
            r#"SQL_Query_Executor({"query": "SELECT 1"})"#
        );
    }

    #[test]
    fn test_initial_messages_order() {
        let history = vec![
            ChatTurn {
                role: Role::User,
                content: "Which companies came in phase 1?".to_string(),
            },
            ChatTurn {
                role: Role::Assistant,
                content: "Google and Microsoft.".to_string(),
            },
        ];
        let messages = agent().initial_messages("And their CTC?", &history).unwrap();

        assert_eq!(messages.len(), 4);
        assert!(matches!(messages[0], ChatCompletionRequestMessage::System(_)));
        assert!(matches!(messages[1], ChatCompletionRequestMessage::User(_)));
        assert!(matches!(messages[2], ChatCompletionRequestMessage::Assistant(_)));
        assert!(matches!(messages[3], ChatCompletionRequestMessage::User(_)));
    }

    #[tokio::test]
    async fn test_zero_iterations_fails_before_calling_model() {
        let agent = agent().with_max_iterations(0);
        let err = agent.run("hi", &[], &Toolbox::new()).await.unwrap_err();
        assert!(err.to_string().contains("maximum iterations"));
    }
}
