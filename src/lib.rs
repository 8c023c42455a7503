//! docqa: preguntas y respuestas sobre un documento subido y traducción de texto.
//!
//! Flujo sin estado entre peticiones:
//!   1. `POST /upload` extrae el texto del documento y lo devuelve al cliente.
//!   2. `POST /ask` recibe la pregunta junto con ese texto como contexto.
//!   3. `POST /translate` traduce texto libre a un idioma destino.

pub mod answer;
pub mod api;
pub mod app_state;
pub mod config;
pub mod error;
pub mod extract;
pub mod llm;
pub mod models;
pub mod storage;
pub mod translate;

pub use app_state::{AppState, Capabilities};
pub use config::AppConfig;
pub use error::ApiError;
pub use models::{DocumentFormat, Outcome, OutcomeStatus, Reason};
