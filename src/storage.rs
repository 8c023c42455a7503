//! Almacenamiento temporal de las subidas.
//!
//! Cada subida se guarda en un fichero con nombre único por petición dentro del
//! directorio de subidas, y se borra al soltar el `ScopedUpload`, tanto si la
//! extracción termina bien como si falla.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tempfile::{Builder, NamedTempFile};
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::UploadedDocument;

/// Longitud máxima de un nombre de fichero en los sistemas de ficheros habituales.
const NAME_MAX: usize = 255;
/// `Uuid::simple` ocupa 32 caracteres.
const PREFIX_LEN: usize = 32;
const RANDOM_LEN: usize = 6;

static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_.-]").expect("static regex"));

/// Crea el directorio de subidas si no existe.
pub fn ensure_upload_dir(dir: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dir)?;
    info!("Directorio de subidas listo: {}", dir.display());
    Ok(())
}

/// Convierte un nombre de fichero arbitrario en un nombre base seguro:
/// sin componentes de ruta, sólo `[A-Za-z0-9_.-]`, espacios como `_` y sin
/// puntos ni guiones bajos al principio o al final. Puede devolver una cadena vacía.
pub fn sanitize_filename(filename: &str) -> String {
    let flattened: String = filename
        .chars()
        .filter(|c| c.is_ascii() && !c.is_ascii_control())
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = flattened.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned = UNSAFE_CHARS.replace_all(&joined, "");
    cleaned.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// Fichero temporal de una subida. Se elimina del disco al soltarse.
#[derive(Debug)]
pub struct ScopedUpload {
    file: NamedTempFile,
}

impl ScopedUpload {
    /// Guarda `document` en `dir` bajo un nombre único derivado de su nombre
    /// (ya saneado). Los nombres largos se recortan para caber en `NAME_MAX`.
    pub fn persist(dir: &Path, document: &UploadedDocument) -> std::io::Result<Self> {
        let suffix = format!("-{}", fit_name(&document.filename, stored_name_budget()));
        let mut file = Builder::new()
            .prefix(&Uuid::new_v4().simple().to_string())
            .rand_bytes(RANDOM_LEN)
            .suffix(&suffix)
            .tempfile_in(dir)?;
        file.write_all(&document.bytes)?;
        file.flush()?;

        debug!(
            "Subida '{}' guardada en {} ({} bytes)",
            document.filename,
            file.path().display(),
            document.bytes.len()
        );
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

fn stored_name_budget() -> usize {
    NAME_MAX - PREFIX_LEN - RANDOM_LEN - 1
}

/// Recorta `name` a `max` bytes conservando la extensión.
fn fit_name(name: &str, max: usize) -> String {
    if name.len() <= max {
        return name.to_string();
    }
    match name.rsplit_once('.') {
        Some((stem, ext)) if ext.len() < max => {
            format!("{}.{}", truncate(stem, max - ext.len() - 1), ext)
        }
        _ => truncate(name, max).to_string(),
    }
}

fn truncate(s: &str, max: usize) -> &str {
    let mut end = max.min(s.len());
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

impl Drop for ScopedUpload {
    fn drop(&mut self) {
        debug!("Eliminando fichero temporal {}", self.file.path().display());
    }
}
