//! Carga y gestión de configuración de la aplicación (servidor, subidas y capacidades).

use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Result};

/// Tamaño máximo del cuerpo de una subida: 16 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Motor usado para extraer respuestas de un contexto.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnswerBackend {
    /// Extractor léxico en proceso, siempre disponible.
    Local,
    /// Modelo de chat de OpenAI vía Rig.
    OpenAI,
    /// Sin capacidad de respuesta (modo degradado permanente).
    Disabled,
}

impl AnswerBackend {
    pub fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "openai" => Ok(Self::OpenAI),
            "none" | "disabled" => Ok(Self::Disabled),
            other => Err(anyhow!("Backend de respuestas no soportado: {other}")),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::OpenAI => "openai",
            Self::Disabled => "none",
        }
    }
}

/// Motor usado para traducir texto.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TranslationBackend {
    OpenAI,
    Disabled,
}

impl TranslationBackend {
    pub fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "none" | "disabled" => Ok(Self::Disabled),
            other => Err(anyhow!("Backend de traducción no soportado: {other}")),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::Disabled => "none",
        }
    }
}

/// Configuración completa de la aplicación.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server_addr: String,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub frontend_dir: PathBuf,
    pub open_browser: bool,

    pub answer_backend: AnswerBackend,
    pub translation_backend: TranslationBackend,
    pub llm_chat_model: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_addr: "127.0.0.1:5000".to_string(),
            upload_dir: PathBuf::from("uploads"),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            frontend_dir: PathBuf::from("frontend"),
            open_browser: false,
            answer_backend: AnswerBackend::Local,
            translation_backend: TranslationBackend::OpenAI,
            llm_chat_model: "gpt-4o-mini".to_string(),
        }
    }
}

impl AppConfig {
    /// Carga la configuración desde variables de entorno (usando .env si existe).
    /// Cualquier variable ausente conserva su valor por defecto.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let server_addr = env::var("SERVER_ADDR").unwrap_or(defaults.server_addr);
        let upload_dir = env::var("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.upload_dir);
        let frontend_dir = env::var("FRONTEND_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.frontend_dir);

        let max_upload_bytes = match env::var("MAX_UPLOAD_BYTES") {
            Ok(raw) => raw
                .trim()
                .parse::<usize>()
                .map_err(|e| anyhow!("MAX_UPLOAD_BYTES inválido ('{raw}'): {e}"))?,
            Err(_) => defaults.max_upload_bytes,
        };

        let open_browser = match env::var("OPEN_BROWSER") {
            Ok(raw) => parse_bool(&raw)
                .ok_or_else(|| anyhow!("OPEN_BROWSER inválido ('{raw}'), se esperaba true/false"))?,
            Err(_) => defaults.open_browser,
        };

        let answer_backend = match env::var("ANSWER_BACKEND") {
            Ok(raw) => AnswerBackend::from_str(&raw)?,
            Err(_) => defaults.answer_backend,
        };
        let translation_backend = match env::var("TRANSLATION_BACKEND") {
            Ok(raw) => TranslationBackend::from_str(&raw)?,
            Err(_) => defaults.translation_backend,
        };

        let llm_chat_model = env::var("LLM_CHAT_MODEL").unwrap_or(defaults.llm_chat_model);

        Ok(Self {
            server_addr,
            upload_dir,
            max_upload_bytes,
            frontend_dir,
            open_browser,
            answer_backend,
            translation_backend,
            llm_chat_model,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backends_parse_case_insensitively() {
        assert_eq!(AnswerBackend::from_str("LOCAL").unwrap(), AnswerBackend::Local);
        assert_eq!(AnswerBackend::from_str("OpenAI").unwrap(), AnswerBackend::OpenAI);
        assert_eq!(AnswerBackend::from_str("none").unwrap(), AnswerBackend::Disabled);
        assert_eq!(
            TranslationBackend::from_str("disabled").unwrap(),
            TranslationBackend::Disabled
        );
        assert!(AnswerBackend::from_str("gemini").is_err());
    }

    #[test]
    fn defaults_match_documented_limits() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.max_upload_bytes, 16 * 1024 * 1024);
        assert_eq!(cfg.upload_dir, PathBuf::from("uploads"));
        assert_eq!(cfg.answer_backend, AnswerBackend::Local);
    }

    #[test]
    fn parse_bool_accepts_common_spellings() {
        assert_eq!(parse_bool("Yes"), Some(true));
        assert_eq!(parse_bool(" 0 "), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
