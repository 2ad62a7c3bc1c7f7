//! LLM-backed report generation and form suggestions.

pub mod engine;
mod parse;
mod prompt;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use haccp_core::collab::{
    AllergenSuggestion, ContentGenerator, DishSuggestion, HazardSuggestion, StageSuggestion,
    Suggester,
};
use haccp_core::{
    ai_configured, read_settings, AiSettings, Category, FormData, GenerateError, GeneratedResult,
    ProcedureBlock,
};

/// Talks to the provider configured in [`AiSettings`].
#[derive(Debug, Clone)]
pub struct LlmAssistant {
    settings: AiSettings,
}

impl LlmAssistant {
    pub fn new(settings: AiSettings) -> Self {
        Self { settings }
    }

    /// Use the settings saved on disk.
    pub fn from_saved_settings() -> Self {
        Self::new(read_settings())
    }

    pub fn settings(&self) -> &AiSettings {
        &self.settings
    }

    pub fn is_configured(&self) -> bool {
        ai_configured(&self.settings)
    }

    async fn suggest<T: DeserializeOwned>(
        &self,
        what: &'static str,
        user_msg: String,
        key: &str,
    ) -> Vec<T> {
        if !self.is_configured() {
            tracing::debug!(what, "AI not configured, no suggestions");
            return vec![];
        }
        tracing::debug!(
            what,
            provider = %self.settings.provider,
            model = %self.settings.model,
            "requesting suggestions"
        );

        match engine::generate(&self.settings, prompt::SUGGEST_SYSTEM, &user_msg).await {
            Ok(raw) => {
                let items: Vec<T> = parse::parse_list(&raw, key);
                tracing::debug!(
                    what,
                    raw_len = raw.len(),
                    parsed = items.len(),
                    "suggestions parsed"
                );
                items
            }
            Err(e) => {
                tracing::warn!(what, error = %e, "suggestion request failed");
                vec![]
            }
        }
    }
}

#[async_trait]
impl ContentGenerator for LlmAssistant {
    async fn generate(&self, form: &FormData) -> Result<GeneratedResult, GenerateError> {
        if !self.is_configured() {
            return Err(GenerateError::NotConfigured);
        }
        let system = prompt::generation_system_prompt();
        let user_msg = prompt::generation_user_message(form);

        tracing::debug!(
            provider = %self.settings.provider,
            model = %self.settings.model,
            "sending generation request"
        );

        let raw = engine::generate(&self.settings, &system, &user_msg).await?;
        tracing::debug!(raw_len = raw.len(), "generation response received");
        parse::parse_generated(&raw)
    }
}

#[async_trait]
impl Suggester for LlmAssistant {
    async fn suggest_dishes(&self, category: Category) -> Vec<DishSuggestion> {
        self.suggest("dishes", prompt::dishes_prompt(category), "dishes").await
    }

    async fn suggest_allergens(&self, products: &[String]) -> Vec<AllergenSuggestion> {
        if products.is_empty() {
            return vec![];
        }
        self.suggest("allergens", prompt::allergens_prompt(products), "suggestions").await
    }

    async fn suggest_hazards(&self, products: &[String]) -> Vec<HazardSuggestion> {
        if products.is_empty() {
            return vec![];
        }
        self.suggest("hazards", prompt::hazards_prompt(products), "hazards").await
    }

    async fn suggest_stages(&self, category: Category) -> Vec<StageSuggestion> {
        self.suggest("stages", prompt::stages_prompt(category), "stages").await
    }

    async fn suggest_procedures(&self, category: Category) -> Vec<ProcedureBlock> {
        self.suggest("procedures", prompt::procedures_prompt(category), "sops").await
    }
}
