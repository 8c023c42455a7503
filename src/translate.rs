//! Componente de traducción: texto + idioma destino → texto traducido.
//!
//! Cada llamada abre una sesión nueva configurada para el idioma destino; no
//! hay reintentos ni caché de sesiones. Los errores (idioma no soportado,
//! fallo del servicio) se convierten en un resultado fallido.

use std::fmt;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::llm::LlmManager;
use crate::models::{Outcome, Reason};

/// Idioma destino por defecto.
pub const DEFAULT_TARGET_LANG: &str = "en";

/// Idiomas soportados (ISO 639-1 → nombre en inglés).
pub const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("ar", "Arabic"),
    ("bn", "Bengali"),
    ("ca", "Catalan"),
    ("cs", "Czech"),
    ("da", "Danish"),
    ("de", "German"),
    ("el", "Greek"),
    ("en", "English"),
    ("es", "Spanish"),
    ("eu", "Basque"),
    ("fa", "Persian"),
    ("fi", "Finnish"),
    ("fr", "French"),
    ("gl", "Galician"),
    ("he", "Hebrew"),
    ("hi", "Hindi"),
    ("hu", "Hungarian"),
    ("id", "Indonesian"),
    ("it", "Italian"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("nl", "Dutch"),
    ("no", "Norwegian"),
    ("pl", "Polish"),
    ("pt", "Portuguese"),
    ("ro", "Romanian"),
    ("ru", "Russian"),
    ("sv", "Swedish"),
    ("sw", "Swahili"),
    ("th", "Thai"),
    ("tr", "Turkish"),
    ("uk", "Ukrainian"),
    ("ur", "Urdu"),
    ("vi", "Vietnamese"),
    ("zh", "Chinese"),
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LanguageError {
    #[error("unsupported language code '{0}'")]
    Unsupported(String),
}

/// Idioma validado contra la tabla de idiomas soportados.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Language {
    pub code: &'static str,
    pub name: &'static str,
}

impl Language {
    /// Acepta códigos sin distinguir mayúsculas y con subetiqueta de región
    /// (`pt-BR`, `zh_TW`) si el idioma principal está soportado.
    pub fn parse(raw: &str) -> Result<Self, LanguageError> {
        let normalized = raw.trim().to_ascii_lowercase();
        let primary = normalized
            .split(['-', '_'])
            .next()
            .unwrap_or_default();

        SUPPORTED_LANGUAGES
            .iter()
            .find(|(code, _)| *code == primary)
            .map(|&(code, name)| Self { code, name })
            .ok_or_else(|| LanguageError::Unsupported(raw.trim().to_string()))
    }

    pub fn all() -> impl Iterator<Item = Language> {
        SUPPORTED_LANGUAGES
            .iter()
            .map(|&(code, name)| Language { code, name })
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.code)
    }
}

/// Servicio de traducción externo.
#[async_trait]
pub trait TranslationCapability: Send + Sync {
    fn name(&self) -> &str;

    async fn translate(&self, text: &str, source: Option<Language>, target: Language)
        -> Result<String>;
}

/// Sesión de traducción configurada para un par de idiomas. Se crea por llamada.
pub struct TranslationSession {
    backend: Arc<dyn TranslationCapability>,
    source: Option<Language>,
    target: Language,
}

impl TranslationSession {
    /// Valida los códigos de idioma y prepara la sesión. `source` vacío o
    /// `"auto"` deja la detección al servicio.
    pub fn open(
        backend: Arc<dyn TranslationCapability>,
        target_lang: &str,
        source_lang: Option<&str>,
    ) -> Result<Self, LanguageError> {
        let target = Language::parse(target_lang)?;
        let source = match source_lang.map(str::trim) {
            None | Some("") => None,
            Some(s) if s.eq_ignore_ascii_case("auto") => None,
            Some(s) => Some(Language::parse(s)?),
        };
        Ok(Self {
            backend,
            source,
            target,
        })
    }

    pub async fn translate(&self, text: &str) -> Result<String> {
        if self.source == Some(self.target) {
            return Ok(text.to_string());
        }
        debug!(
            "Traduciendo {} caracteres a {} con '{}'",
            text.chars().count(),
            self.target,
            self.backend.name()
        );
        self.backend.translate(text, self.source, self.target).await
    }
}

/// Traduce `text` a `target_lang`, degradando en lugar de fallar.
pub async fn translate(
    backend: Arc<dyn TranslationCapability>,
    text: &str,
    target_lang: &str,
    source_lang: Option<&str>,
) -> Outcome {
    let session = match TranslationSession::open(backend, target_lang, source_lang) {
        Ok(session) => session,
        Err(e) => {
            return Outcome::failed(Reason::UnsupportedLanguage, format!("Translation error: {e}"))
        }
    };

    match session.translate(text).await {
        Ok(translated) => Outcome::ok(translated),
        Err(e) => {
            warn!("El backend de traducción '{}' falló: {e:#}", session.backend.name());
            Outcome::failed(Reason::CapabilityError, format!("Translation error: {e}"))
        }
    }
}

// --- Backends ---

/// Traducción vía el modelo de chat de OpenAI.
pub struct LlmTranslator {
    llm: LlmManager,
}

impl LlmTranslator {
    pub fn new(llm: LlmManager) -> Arc<Self> {
        Arc::new(Self { llm })
    }
}

#[async_trait]
impl TranslationCapability for LlmTranslator {
    fn name(&self) -> &str {
        "openai"
    }

    async fn translate(
        &self,
        text: &str,
        source: Option<Language>,
        target: Language,
    ) -> Result<String> {
        let translated = self
            .llm
            .translate(text, source.map(|l| l.name), target.name)
            .await?;
        if translated.is_empty() {
            return Err(anyhow!("the model returned an empty translation"));
        }
        Ok(translated)
    }
}

/// Backend usado cuando no hay servicio de traducción configurado: cada
/// llamada falla con un mensaje explícito.
#[derive(Debug, Default)]
pub struct UnconfiguredTranslator;

impl UnconfiguredTranslator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self)
    }
}

#[async_trait]
impl TranslationCapability for UnconfiguredTranslator {
    fn name(&self) -> &str {
        "none"
    }

    async fn translate(&self, _text: &str, _source: Option<Language>, _target: Language)
        -> Result<String> {
        Err(anyhow!("no translation service is configured"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Backend de prueba que etiqueta el texto con el idioma destino.
    #[derive(Default)]
    struct TaggingTranslator {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TranslationCapability for TaggingTranslator {
        fn name(&self) -> &str {
            "tagging"
        }

        async fn translate(
            &self,
            text: &str,
            _source: Option<Language>,
            target: Language,
        ) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("[{}] {text}", target.code))
        }
    }

    #[test]
    fn language_codes_are_normalized() {
        assert_eq!(Language::parse("ES").unwrap().code, "es");
        assert_eq!(Language::parse(" pt-BR ").unwrap().name, "Portuguese");
        assert_eq!(Language::parse("zh_TW").unwrap().code, "zh");
        assert_eq!(
            Language::parse("xx"),
            Err(LanguageError::Unsupported("xx".to_string()))
        );
        assert!(Language::parse("").is_err());
    }

    #[tokio::test]
    async fn unsupported_target_is_a_failed_outcome() {
        let backend = Arc::new(TaggingTranslator::default());
        let outcome = translate(backend.clone(), "hello", "xx", None).await;

        assert_eq!(outcome.reason, Some(Reason::UnsupportedLanguage));
        assert!(outcome.text.starts_with("Translation error"));
        assert!(outcome.text.contains("'xx'"));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn supported_target_reaches_the_backend() {
        let backend = Arc::new(TaggingTranslator::default());
        let outcome = translate(backend.clone(), "hello", "fr", Some("auto")).await;

        assert!(outcome.is_ok());
        assert_eq!(outcome.text, "[fr] hello");
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn same_source_and_target_skips_the_backend() {
        let backend = Arc::new(TaggingTranslator::default());
        let outcome = translate(backend.clone(), "hola", "es", Some("ES")).await;

        assert_eq!(outcome.text, "hola");
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn backend_failures_become_diagnostics() {
        let outcome = translate(UnconfiguredTranslator::new(), "hello", "de", None).await;

        assert_eq!(outcome.reason, Some(Reason::CapabilityError));
        assert_eq!(
            outcome.text,
            "Translation error: no translation service is configured"
        );
    }

    #[tokio::test]
    async fn unsupported_source_is_rejected_too() {
        let outcome = translate(UnconfiguredTranslator::new(), "hello", "de", Some("qq")).await;
        assert_eq!(outcome.reason, Some(Reason::UnsupportedLanguage));
    }
}
