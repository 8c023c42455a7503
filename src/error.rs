//! Errores de la capa HTTP y su traducción a respuestas `{"error": ...}`.

use axum::{
    extract::{multipart::MultipartError, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::extract::ExtractionError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Falta un campo obligatorio o está vacío.
    #[error("{0}")]
    Validation(&'static str),

    #[error("File type not allowed")]
    UnsupportedType,

    #[error("{0}")]
    MalformedJson(#[from] JsonRejection),

    #[error("{0}")]
    Multipart(#[from] MultipartError),

    #[error("{0}")]
    Extraction(#[from] ExtractionError),

    #[error("Failed to store upload: {0}")]
    Storage(#[from] std::io::Error),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::UnsupportedType => StatusCode::BAD_REQUEST,
            Self::MalformedJson(rejection) => rejection.status(),
            Self::Multipart(err) => err.status(),
            Self::Extraction(_) | Self::Storage(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn message(&self) -> String {
        match self {
            Self::MalformedJson(rejection) => rejection.body_text(),
            Self::Multipart(err) => err.body_text(),
            // El detalle de E/S incluye rutas del servidor: sólo va al log.
            Self::Storage(_) => "Failed to store upload".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Error procesando la petición: {}", self);
        }
        (status, Json(json!({ "error": self.message() }))).into_response()
    }
}
