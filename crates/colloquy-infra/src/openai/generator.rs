//! Response generation through the OpenAI chat completions API.

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestAssistantMessage, ChatCompletionRequestAssistantMessageContent,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
    ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest,
};
use secrecy::{ExposeSecret, SecretString};

use colloquy_core::gateway::ResponseGenerator;
use colloquy_types::context::{ContextMessage, MessageRole};
use colloquy_types::error::GenerationError;
use colloquy_types::persona::PersonaConfig;

/// [`ResponseGenerator`] backed by any OpenAI-compatible chat endpoint.
///
/// The model, temperature and token limit come from the persona on each
/// call. Does NOT derive Debug: the client holds the API key.
pub struct OpenAiGenerator {
    client: Client<OpenAIConfig>,
}

impl OpenAiGenerator {
    pub fn new(api_key: &SecretString, base_url: &str) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key.expose_secret())
            .with_api_base(base_url);
        Self {
            client: Client::with_config(config),
        }
    }
}

/// Build the chat request: persona system prompt, prior context, then the
/// new user message.
fn build_request(
    context: &[ContextMessage],
    persona: &PersonaConfig,
    user_text: &str,
) -> CreateChatCompletionRequest {
    let mut messages = Vec::with_capacity(context.len() + 2);
    messages.push(system_message(&persona.system_prompt));
    for msg in context {
        messages.push(match msg.role {
            MessageRole::System => system_message(&msg.content),
            MessageRole::User => user_message(&msg.content),
            MessageRole::Assistant => assistant_message(&msg.content),
        });
    }
    messages.push(user_message(user_text));

    CreateChatCompletionRequest {
        model: persona.model.model_id.clone(),
        messages,
        max_completion_tokens: Some(persona.model.max_tokens),
        temperature: Some(persona.model.temperature as f32),
        ..Default::default()
    }
}

fn system_message(content: &str) -> ChatCompletionRequestMessage {
    ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
        content: ChatCompletionRequestSystemMessageContent::Text(content.to_string()),
        name: None,
    })
}

fn user_message(content: &str) -> ChatCompletionRequestMessage {
    ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
        content: ChatCompletionRequestUserMessageContent::Text(content.to_string()),
        name: None,
    })
}

fn assistant_message(content: &str) -> ChatCompletionRequestMessage {
    #[allow(deprecated)]
    ChatCompletionRequestMessage::Assistant(ChatCompletionRequestAssistantMessage {
        content: Some(ChatCompletionRequestAssistantMessageContent::Text(
            content.to_string(),
        )),
        refusal: None,
        name: None,
        audio: None,
        tool_calls: None,
        function_call: None,
    })
}

impl ResponseGenerator for OpenAiGenerator {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(
        &self,
        context: &[ContextMessage],
        persona: &PersonaConfig,
        user_text: &str,
    ) -> Result<String, GenerationError> {
        let request = build_request(context, persona, user_text);

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(map_openai_error)?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        let content = content.trim();
        if content.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(content.to_string())
    }
}

/// Map an `async_openai::error::OpenAIError` to a [`GenerationError`].
fn map_openai_error(err: async_openai::error::OpenAIError) -> GenerationError {
    use async_openai::error::OpenAIError;

    match &err {
        OpenAIError::ApiError(api_err) => {
            let code = api_err.code.as_deref().unwrap_or("");
            let error_type = api_err.r#type.as_deref().unwrap_or("");

            if code == "invalid_api_key"
                || error_type == "authentication_error"
                || api_err.message.contains("Incorrect API key")
            {
                GenerationError::AuthenticationFailed
            } else if code == "rate_limit_exceeded" || error_type == "rate_limit_error" {
                GenerationError::RateLimited {
                    retry_after_ms: None,
                }
            } else {
                GenerationError::Backend(api_err.message.clone())
            }
        }
        OpenAIError::Reqwest(reqwest_err) => match reqwest_err.status().map(|s| s.as_u16()) {
            Some(401) => GenerationError::AuthenticationFailed,
            Some(429) => GenerationError::RateLimited {
                retry_after_ms: None,
            },
            _ => GenerationError::Backend(err.to_string()),
        },
        _ => GenerationError::Backend(err.to_string()),
    }
}
