use axum::{
    extract::{
        multipart::MultipartRejection, rejection::JsonRejection, DefaultBodyLimit, Json,
        Multipart, State,
    },
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tokio::task;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::info;

use crate::{
    answer,
    app_state::AppState,
    error::ApiError,
    extract,
    models::{DocumentFormat, Outcome, OutcomeStatus, Reason, UploadedDocument},
    storage::{self, ScopedUpload},
    translate::{self, Language, DEFAULT_TARGET_LANG},
};

const NO_QUESTION: &str = "No question provided";
const NO_TEXT: &str = "No text provided";
const NO_FILE: &str = "No file uploaded";
const NO_SELECTED_FILE: &str = "No selected file";

// --- Payloads y Respuestas de la API ---

#[derive(Deserialize)]
pub struct AskPayload {
    question: Option<String>,
    #[serde(default)]
    context: Option<String>,
}

#[derive(Serialize)]
pub struct AskResponse {
    answer: String,
    status: OutcomeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<Reason>,
}

impl From<Outcome> for AskResponse {
    fn from(outcome: Outcome) -> Self {
        Self {
            answer: outcome.text,
            status: outcome.status,
            reason: outcome.reason,
        }
    }
}

#[derive(Deserialize)]
pub struct TranslatePayload {
    text: Option<String>,
    #[serde(default)]
    target_lang: Option<String>,
    #[serde(default)]
    source_lang: Option<String>,
}

#[derive(Serialize)]
pub struct TranslateResponse {
    translated_text: String,
    status: OutcomeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<Reason>,
}

impl From<Outcome> for TranslateResponse {
    fn from(outcome: Outcome) -> Self {
        Self {
            translated_text: outcome.text,
            status: outcome.status,
            reason: outcome.reason,
        }
    }
}

#[derive(Serialize)]
pub struct UploadResponse {
    text: String,
    filename: String,
}

#[derive(Serialize)]
pub struct AnsweringInfo {
    available: bool,
    backend: Option<String>,
}

#[derive(Serialize)]
pub struct TranslationInfo {
    backend: String,
}

#[derive(Serialize)]
pub struct CapabilitiesResponse {
    answering: AnsweringInfo,
    translation: TranslationInfo,
    languages: Vec<Language>,
    allowed_extensions: Vec<&'static str>,
    max_upload_bytes: usize,
}

// --- Router ---

pub fn create_router(app_state: AppState) -> Router {
    let max_body = app_state.config.max_upload_bytes;
    Router::new()
        .route("/ask", post(ask_handler))
        .route("/translate", post(translate_handler))
        .route("/upload", post(upload_handler))
        .route("/health", get(health_handler))
        .route("/api/capabilities", get(capabilities_handler))
        .layer(DefaultBodyLimit::max(max_body))
        .with_state(app_state)
}

/// Aplicación completa: API, UI estática como fallback, trazas y CORS.
pub fn create_app(app_state: AppState) -> Router {
    let frontend_dir = app_state.config.frontend_dir.clone();
    Router::new()
        .merge(create_router(app_state))
        .fallback_service(ServeDir::new(frontend_dir))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

// --- Handlers ---

#[axum::debug_handler]
async fn ask_handler(
    State(state): State<AppState>,
    payload: Result<Json<AskPayload>, JsonRejection>,
) -> Result<Json<AskResponse>, ApiError> {
    let Json(payload) = payload?;
    let question = required(payload.question).ok_or(ApiError::Validation(NO_QUESTION))?;
    let context = payload.context.unwrap_or_default();

    let outcome = answer::answer(&state.capabilities, &question, &context).await;
    Ok(Json(outcome.into()))
}

#[axum::debug_handler]
async fn translate_handler(
    State(state): State<AppState>,
    payload: Result<Json<TranslatePayload>, JsonRejection>,
) -> Result<Json<TranslateResponse>, ApiError> {
    let Json(payload) = payload?;
    let text = required(payload.text).ok_or(ApiError::Validation(NO_TEXT))?;
    let target_lang = required(payload.target_lang).unwrap_or_else(|| DEFAULT_TARGET_LANG.to_string());

    let outcome = translate::translate(
        state.capabilities.translator(),
        &text,
        &target_lang,
        payload.source_lang.as_deref(),
    )
    .await;
    Ok(Json(outcome.into()))
}

/// Subida de documento: validar → guardar → extraer → limpiar.
/// El fichero temporal se borra en cualquier salida, incluida la de error.
#[axum::debug_handler]
async fn upload_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut multipart = multipart.map_err(|_| ApiError::Validation(NO_FILE))?;

    let field = loop {
        match multipart.next_field().await? {
            Some(field) if field.name() == Some("file") => break field,
            Some(_) => continue,
            None => return Err(ApiError::Validation(NO_FILE)),
        }
    };

    let declared_name = field.file_name().unwrap_or_default().to_string();
    if declared_name.is_empty() {
        return Err(ApiError::Validation(NO_SELECTED_FILE));
    }
    let format = DocumentFormat::from_filename(&declared_name).ok_or(ApiError::UnsupportedType)?;

    let bytes = field.bytes().await?;

    // Si el saneado se lleva la extensión (p. ej. ".txt" -> "txt"), se usa un nombre genérico.
    let mut safe_name = storage::sanitize_filename(&declared_name);
    if DocumentFormat::from_filename(&safe_name) != Some(format) {
        safe_name = format!("upload.{}", format.canonical_extension());
    }
    info!(
        "Subida recibida: '{}' -> '{}' ({} bytes, {:?})",
        declared_name,
        safe_name,
        bytes.len(),
        format
    );

    let document = UploadedDocument {
        filename: safe_name,
        format,
        bytes,
    };
    let upload_dir = state.config.upload_dir.clone();

    let (text, document) = task::spawn_blocking(move || -> Result<_, ApiError> {
        let upload = ScopedUpload::persist(&upload_dir, &document)?;
        let text = extract::extract_text(document.format, upload.path())?;
        Ok((text, document))
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Extraction task failed: {e}")))??;

    info!(
        "Extraídos {} caracteres de '{}'",
        text.chars().count(),
        document.filename
    );
    Ok(Json(UploadResponse {
        text,
        filename: document.filename,
    }))
}

async fn health_handler() -> &'static str {
    "OK"
}

#[axum::debug_handler]
async fn capabilities_handler(State(state): State<AppState>) -> Json<CapabilitiesResponse> {
    let caps = &state.capabilities;
    Json(CapabilitiesResponse {
        answering: AnsweringInfo {
            available: caps.answering_available(),
            backend: caps.answer_backend_name().map(str::to_string),
        },
        translation: TranslationInfo {
            backend: caps.translator().name().to_string(),
        },
        languages: Language::all().collect(),
        allowed_extensions: DocumentFormat::ALL
            .iter()
            .flat_map(|f| f.extensions().iter().copied())
            .collect(),
        max_upload_bytes: state.config.max_upload_bytes,
    })
}

/// Un campo obligatorio ausente o vacío cuenta como no enviado.
/// Sólo espacios sí es un valor.
fn required(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
