//! Modelos de dominio: documentos subidos, formatos soportados y resultados etiquetados.

use axum::body::Bytes;
use serde::Serialize;

/// Formatos de documento soportados. Es a la vez la lista de extensiones
/// permitidas y el selector de extracción.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Text,
}

impl DocumentFormat {
    pub const ALL: [DocumentFormat; 2] = [DocumentFormat::Pdf, DocumentFormat::Text];

    /// Detecta el formato a partir de la extensión (sin distinguir mayúsculas).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "txt" | "text" => Some(Self::Text),
            _ => None,
        }
    }

    /// Detecta el formato a partir del último sufijo `.ext` del nombre.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let (_, ext) = filename.rsplit_once('.')?;
        Self::from_extension(ext)
    }

    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Pdf => &["pdf"],
            Self::Text => &["txt", "text"],
        }
    }

    /// Extensión canónica usada al guardar el fichero temporal.
    pub fn canonical_extension(&self) -> &'static str {
        self.extensions()[0]
    }
}

/// Documento recibido en una subida. Vive sólo durante la petición.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub filename: String,
    pub format: DocumentFormat,
    pub bytes: Bytes,
}

/// Estado de un resultado de las capacidades de respuesta y traducción.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Ok,
    Degraded,
    Failed,
}

/// Motivo de un resultado degradado o fallido.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    CapabilityUnavailable,
    MissingContext,
    CapabilityError,
    UnsupportedLanguage,
}

/// Resultado etiquetado: el texto siempre es legible por una persona, y
/// `status`/`reason` permiten decidir sin inspeccionar el texto.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub status: OutcomeStatus,
    pub reason: Option<Reason>,
    pub text: String,
}

impl Outcome {
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Ok,
            reason: None,
            text: text.into(),
        }
    }

    pub fn degraded(reason: Reason, text: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Degraded,
            reason: Some(reason),
            text: text.into(),
        }
    }

    pub fn failed(reason: Reason, text: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Failed,
            reason: Some(reason),
            text: text.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == OutcomeStatus::Ok
    }
}
