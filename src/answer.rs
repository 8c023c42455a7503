//! Componente de respuestas: pregunta + contexto → respuesta extractiva.
//!
//! Nunca devuelve error: la falta de modelo o de contexto se traduce en un
//! resultado degradado y los fallos del modelo en un resultado fallido.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tracing::warn;

use crate::app_state::Capabilities;
use crate::llm::LlmManager;
use crate::models::{Outcome, Reason};

pub const MODEL_NOT_LOADED: &str =
    "Error: Question answering model not loaded. Please try again later.";
pub const MISSING_CONTEXT: &str = "Please provide some context by uploading a document first.";

/// Capacidad de respuesta extractiva: selecciona un fragmento del contexto.
#[async_trait]
pub trait AnswerCapability: Send + Sync {
    /// Nombre del backend, para logs y `/api/capabilities`.
    fn name(&self) -> &str;

    async fn extract_answer(&self, question: &str, context: &str) -> Result<String>;
}

/// Responde a `question` usando `context`, degradando en lugar de fallar.
pub async fn answer(capabilities: &Capabilities, question: &str, context: &str) -> Outcome {
    let Some(answerer) = capabilities.answerer() else {
        return Outcome::degraded(Reason::CapabilityUnavailable, MODEL_NOT_LOADED);
    };

    if context.is_empty() {
        return Outcome::degraded(Reason::MissingContext, MISSING_CONTEXT);
    }

    match answerer.extract_answer(question, context).await {
        Ok(span) => Outcome::ok(span),
        Err(e) => {
            warn!("El backend de respuestas '{}' falló: {e:#}", answerer.name());
            Outcome::failed(
                Reason::CapabilityError,
                format!("Error answering question: {e}"),
            )
        }
    }
}

// --- Backend OpenAI ---

/// Respuestas extractivas delegadas en un modelo de chat vía Rig.
pub struct LlmAnswerer {
    llm: LlmManager,
}

impl LlmAnswerer {
    pub fn new(llm: LlmManager) -> Arc<Self> {
        Arc::new(Self { llm })
    }
}

#[async_trait]
impl AnswerCapability for LlmAnswerer {
    fn name(&self) -> &str {
        "openai"
    }

    async fn extract_answer(&self, question: &str, context: &str) -> Result<String> {
        let span = self.llm.extract_span(question, context).await?;
        if span.is_empty() {
            return Err(anyhow!("the model returned an empty answer"));
        }
        Ok(span)
    }
}

// --- Backend local ---

const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "can", "did", "do", "does", "for", "from",
    "how", "in", "is", "it", "of", "on", "or", "that", "the", "this", "to", "was", "were",
    "what", "when", "where", "which", "who", "whom", "whose", "why", "will", "with",
];

/// Extractor léxico: devuelve la frase del contexto que más términos de la
/// pregunta contiene, ponderando cada término por su longitud.
#[derive(Debug, Default)]
pub struct LexicalAnswerer;

impl LexicalAnswerer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self)
    }

    fn best_sentence<'a>(question: &str, context: &'a str) -> Option<&'a str> {
        let terms = key_terms(question);
        let mut best: Option<(&str, usize)> = None;

        for sentence in split_sentences(context) {
            let words = sentence_words(sentence);
            let score: usize = terms
                .iter()
                .filter(|term| words.iter().any(|w| w == *term))
                .map(|term| term.chars().count())
                .sum();

            // Sólo una puntuación estrictamente mayor desplaza a la anterior.
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((sentence, score));
            }
        }

        best.map(|(sentence, _)| sentence)
    }
}

#[async_trait]
impl AnswerCapability for LexicalAnswerer {
    fn name(&self) -> &str {
        "local"
    }

    async fn extract_answer(&self, question: &str, context: &str) -> Result<String> {
        Self::best_sentence(question, context)
            .map(str::to_string)
            .ok_or_else(|| anyhow!("context contains no answerable text"))
    }
}

fn normalize_word(word: &str) -> String {
    word.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase()
}

fn key_terms(question: &str) -> Vec<String> {
    let mut terms: Vec<String> = question
        .split_whitespace()
        .map(normalize_word)
        .filter(|w| !w.is_empty() && !STOP_WORDS.contains(&w.as_str()))
        .collect();
    terms.sort();
    terms.dedup();
    terms
}

fn sentence_words(sentence: &str) -> Vec<String> {
    sentence
        .split_whitespace()
        .map(normalize_word)
        .filter(|w| !w.is_empty())
        .collect()
}

/// Parte el texto en frases: fin de línea, o `.`/`!`/`?` seguidos de espacio.
/// Devuelve fragmentos recortados y no vacíos del texto original.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        let boundary = match c {
            '\n' => Some(idx),
            '.' | '!' | '?' => match chars.peek() {
                Some((_, next)) if next.is_whitespace() => Some(idx + c.len_utf8()),
                None => Some(idx + c.len_utf8()),
                _ => None,
            },
            _ => None,
        };

        if let Some(end) = boundary {
            let sentence = text[start..end].trim();
            if !sentence.is_empty() {
                sentences.push(sentence);
            }
            start = end;
        }
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }
    sentences
}
