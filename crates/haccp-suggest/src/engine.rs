use std::time::Duration;

use llm::builder::{LLMBackend, LLMBuilder};
use llm::chat::ChatMessage;

use haccp_core::{AiSettings, GenerateError};

/// Upper bound for one backend round trip. Full reports are long.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

fn map_backend(provider: &str) -> Result<LLMBackend, GenerateError> {
    match provider {
        "openai" => Ok(LLMBackend::OpenAI),
        "anthropic" => Ok(LLMBackend::Anthropic),
        "google" => Ok(LLMBackend::Google),
        "ollama" => Ok(LLMBackend::Ollama),
        "groq" => Ok(LLMBackend::Groq),
        "mistral" => Ok(LLMBackend::Mistral),
        "deepseek" => Ok(LLMBackend::DeepSeek),
        other => Err(GenerateError::Backend(format!("unknown provider: {other}"))),
    }
}

/// Send one system + user exchange and return the raw text answer.
pub async fn generate(
    settings: &AiSettings,
    system: &str,
    user_msg: &str,
) -> Result<String, GenerateError> {
    let backend = map_backend(&settings.provider)?;

    let mut builder = LLMBuilder::new()
        .backend(backend)
        .model(&settings.model)
        .system(system);

    if !settings.api_key.is_empty() {
        builder = builder.api_key(&settings.api_key);
    }

    let llm = builder
        .build()
        .map_err(|e| GenerateError::Backend(format!("build LLM: {e}")))?;

    let messages = vec![ChatMessage::user().content(user_msg).build()];

    let response = tokio::time::timeout(REQUEST_TIMEOUT, llm.chat(&messages))
        .await
        .map_err(|_| GenerateError::Timeout {
            secs: REQUEST_TIMEOUT.as_secs(),
        })?
        .map_err(|e| GenerateError::Backend(format!("chat: {e}")))?;

    match response.text() {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(GenerateError::EmptyResponse),
    }
}
