//! Abstracción sobre Rig para las capacidades respaldadas por un LLM.
//! De momento se implementa OpenAI (extracción de respuestas y traducción).

use anyhow::{anyhow, Result};
use rig::client::{CompletionClient as _, ProviderClient as _};
use rig::completion::Prompt;
use rig::providers::openai;

use crate::config::AppConfig;

const SPAN_PROMPT: &str = r#"
You are an extractive question answering model.
Answer the user's question by copying the shortest span of the supplied context that answers it.
Copy the span verbatim: do not paraphrase, translate, or add words.
Reply with the span only, without quotes or explanations.
If the context does not contain the answer, reply with the most relevant sentence of the context.
"#;

const TRANSLATION_PROMPT: &str = r#"
You are a translation engine.
Translate the user's message into the requested target language.
Reply with the translation only, without quotes, notes, or explanations.
Preserve line breaks and formatting.
"#;

/// Gestor del modelo de chat usado por los backends `openai`.
#[derive(Debug, Clone)]
pub struct LlmManager {
    pub chat_model: String,
}

impl LlmManager {
    /// Construye el manager a partir de la configuración.
    pub fn from_config(cfg: &AppConfig) -> Self {
        Self {
            chat_model: cfg.llm_chat_model.clone(),
        }
    }

    /// Rig lee la clave de `OPENAI_API_KEY`; sin ella no se puede crear el cliente.
    pub fn openai_available() -> bool {
        std::env::var("OPENAI_API_KEY")
            .map(|key| !key.trim().is_empty())
            .unwrap_or(false)
    }

    fn model_name(&self) -> &str {
        if self.chat_model.is_empty() {
            "gpt-4o-mini"
        } else {
            self.chat_model.as_str()
        }
    }

    fn client() -> Result<openai::Client> {
        if !Self::openai_available() {
            return Err(anyhow!("OPENAI_API_KEY no está definida"));
        }
        Ok(openai::Client::from_env())
    }

    // ---------------------------------------------------------------------
    // RESPUESTAS EXTRACTIVAS
    // ---------------------------------------------------------------------

    /// Pide al modelo el fragmento del contexto que responde a la pregunta.
    pub async fn extract_span(&self, question: &str, context: &str) -> Result<String> {
        let client = Self::client()?;
        let agent = client
            .agent(self.model_name())
            .preamble(SPAN_PROMPT)
            .context(context)
            .temperature(0.0)
            .build();

        let answer = agent.prompt(question).await?;
        Ok(clean_completion(&answer))
    }

    // ---------------------------------------------------------------------
    // TRADUCCIÓN
    // ---------------------------------------------------------------------

    /// Traduce `text` al idioma `target` (nombre en inglés, p. ej. "Spanish").
    /// Con `source` en `None` el modelo detecta el idioma de origen.
    pub async fn translate(&self, text: &str, source: Option<&str>, target: &str) -> Result<String> {
        let client = Self::client()?;
        let direction = match source {
            Some(source) => format!("Source language: {source}. Target language: {target}."),
            None => format!("Detect the source language. Target language: {target}."),
        };
        let agent = client
            .agent(self.model_name())
            .preamble(TRANSLATION_PROMPT)
            .context(&direction)
            .temperature(0.0)
            .build();

        let translation = agent.prompt(text).await?;
        Ok(clean_completion(&translation))
    }
}

/// Limpia la respuesta del LLM: espacios y comillas o bloques de código envolventes.
fn clean_completion(raw: &str) -> String {
    let trimmed = raw
        .trim()
        .trim_start_matches("```text")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let unquoted = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed);
    unquoted.trim().to_string()
}
