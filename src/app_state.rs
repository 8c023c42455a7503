use std::sync::Arc;

use tracing::{info, warn};

use crate::answer::{AnswerCapability, LexicalAnswerer, LlmAnswerer};
use crate::config::{AnswerBackend, AppConfig, TranslationBackend};
use crate::llm::LlmManager;
use crate::translate::{LlmTranslator, TranslationCapability, UnconfiguredTranslator};

/// Estado compartido por todos los handlers. Inmutable una vez construido.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub capabilities: Arc<Capabilities>,
}

impl AppState {
    pub fn new(config: AppConfig, capabilities: Capabilities) -> Self {
        Self {
            config: Arc::new(config),
            capabilities: Arc::new(capabilities),
        }
    }
}

/// Capacidades externas resueltas al arrancar. La disponibilidad del modelo
/// de respuestas se fija aquí una sola vez y no se reintenta.
pub struct Capabilities {
    answerer: Option<Arc<dyn AnswerCapability>>,
    translator: Arc<dyn TranslationCapability>,
}

impl Capabilities {
    pub fn new(
        answerer: Option<Arc<dyn AnswerCapability>>,
        translator: Arc<dyn TranslationCapability>,
    ) -> Self {
        Self {
            answerer,
            translator,
        }
    }

    /// Resuelve los backends configurados. Un backend `openai` sin clave de
    /// API queda como no disponible, igual que un modelo que no carga.
    pub fn from_config(cfg: &AppConfig) -> Self {
        let llm = LlmManager::from_config(cfg);

        let answerer: Option<Arc<dyn AnswerCapability>> = match cfg.answer_backend {
            AnswerBackend::Local => Some(LexicalAnswerer::new()),
            AnswerBackend::OpenAI if LlmManager::openai_available() => {
                Some(LlmAnswerer::new(llm.clone()))
            }
            AnswerBackend::OpenAI => {
                warn!("ANSWER_BACKEND=openai pero falta OPENAI_API_KEY; las preguntas se responderán en modo degradado.");
                None
            }
            AnswerBackend::Disabled => None,
        };

        let translator: Arc<dyn TranslationCapability> = match cfg.translation_backend {
            TranslationBackend::OpenAI if LlmManager::openai_available() => LlmTranslator::new(llm),
            TranslationBackend::OpenAI => {
                warn!("TRANSLATION_BACKEND=openai pero falta OPENAI_API_KEY; las traducciones devolverán un error.");
                UnconfiguredTranslator::new()
            }
            TranslationBackend::Disabled => UnconfiguredTranslator::new(),
        };

        let capabilities = Self::new(answerer, translator);
        info!(
            "Capacidades: respuestas = {}, traducción = {}",
            capabilities.answer_backend_name().unwrap_or("no disponible"),
            capabilities.translator().name()
        );
        capabilities
    }

    /// `None` si el modelo de respuestas no está cargado.
    pub fn answerer(&self) -> Option<&Arc<dyn AnswerCapability>> {
        self.answerer.as_ref()
    }

    pub fn answering_available(&self) -> bool {
        self.answerer.is_some()
    }

    pub fn answer_backend_name(&self) -> Option<&str> {
        self.answerer.as_ref().map(|a| a.name())
    }

    pub fn translator(&self) -> Arc<dyn TranslationCapability> {
        Arc::clone(&self.translator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_backends_leave_answering_unavailable() {
        let cfg = AppConfig {
            answer_backend: AnswerBackend::Disabled,
            translation_backend: TranslationBackend::Disabled,
            ..AppConfig::default()
        };
        let caps = Capabilities::from_config(&cfg);

        assert!(!caps.answering_available());
        assert_eq!(caps.answer_backend_name(), None);
        assert_eq!(caps.translator().name(), "none");
    }

    #[test]
    fn local_backend_is_always_loaded() {
        let cfg = AppConfig {
            translation_backend: TranslationBackend::Disabled,
            ..AppConfig::default()
        };
        let caps = Capabilities::from_config(&cfg);

        assert!(caps.answering_available());
        assert_eq!(caps.answer_backend_name(), Some("local"));
    }
}
