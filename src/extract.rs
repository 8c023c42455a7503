//! Extracción de texto plano de un documento almacenado, según su formato.
//!
//! - PDF: texto página a página, concatenado en orden. Una página sin texto
//!   aporta un segmento vacío.
//! - Texto: UTF-8 devuelto tal cual.
//!
//! El componente sólo lee: nunca borra ni modifica el fichero de origen.

use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::string::FromUtf8Error;

use thiserror::Error;
use tracing::debug;

use crate::models::DocumentFormat;

/// Errores de extracción. Se propagan a la capa de orquestación sin reintentos.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Failed to read document: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode text file as UTF-8: {0}")]
    Decode(#[from] FromUtf8Error),

    #[error("Failed to parse PDF: {0}")]
    Pdf(String),
}

/// Lee el fichero en `path` y extrae su texto según `format`.
pub fn extract_text(format: DocumentFormat, path: &Path) -> Result<String, ExtractionError> {
    let bytes = fs::read(path)?;
    debug!("Extrayendo {} bytes de {} ({:?})", bytes.len(), path.display(), format);
    extract_from_bytes(format, &bytes)
}

/// Extrae el texto de un documento ya cargado en memoria.
pub fn extract_from_bytes(format: DocumentFormat, bytes: &[u8]) -> Result<String, ExtractionError> {
    match format {
        DocumentFormat::Pdf => extract_pdf(bytes),
        DocumentFormat::Text => Ok(String::from_utf8(bytes.to_vec())?),
    }
}

fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractionError> {
    // pdf-extract puede entrar en pánico con ciertas fuentes o estructuras rotas.
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(bytes)
    }));

    match result {
        Ok(Ok(pages)) => {
            debug!("PDF con {} páginas", pages.len());
            Ok(concat_pages(pages))
        }
        Ok(Err(e)) => Err(ExtractionError::Pdf(e.to_string())),
        Err(payload) => Err(ExtractionError::Pdf(panic_message(payload.as_ref()))),
    }
}

/// Une el texto de cada página respetando el orden, sin separadores añadidos.
fn concat_pages<I>(pages: I) -> String
where
    I: IntoIterator<Item = String>,
{
    pages.into_iter().fold(String::new(), |mut acc, page| {
        acc.push_str(&page);
        acc
    })
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("extractor panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("extractor panicked: {s}")
    } else {
        "extractor panicked".to_string()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    /// Construye un PDF con una página por elemento; `None` es una página sin texto.
    pub(crate) fn build_pdf(pages: &[Option<&str>]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in pages {
            let operations = match text {
                Some(text) => vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![72.into(), 700.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
                None => vec![],
            };
            let content = Content { operations };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    #[test]
    fn text_is_returned_verbatim() {
        let raw = "línea uno\r\nlínea dos\n\n\ttabulada  ✓";
        let text = extract_from_bytes(DocumentFormat::Text, raw.as_bytes()).unwrap();
        assert_eq!(text, raw);
    }

    #[test]
    fn invalid_utf8_is_a_decode_error() {
        let err = extract_from_bytes(DocumentFormat::Text, &[0x66, 0x6f, 0xff, 0xfe]).unwrap_err();
        assert!(matches!(err, ExtractionError::Decode(_)));
    }

    #[test]
    fn pages_are_concatenated_in_order() {
        let joined = concat_pages(vec!["uno ".to_string(), String::new(), "tres".to_string()]);
        assert_eq!(joined, "uno tres");
        assert_eq!(concat_pages(Vec::<String>::new()), "");
    }

    #[test]
    fn multi_page_pdf_keeps_page_order() {
        let pdf = build_pdf(&[Some("Alpha"), None, Some("Omega")]);
        let text = extract_from_bytes(DocumentFormat::Pdf, &pdf).unwrap();

        let pages = pdf_extract::extract_text_from_mem_by_pages(&pdf).unwrap();
        assert_eq!(pages.len(), 3);
        assert!(pages[0].contains("Alpha"));
        assert!(!pages[1].contains("Alpha") && !pages[1].contains("Omega"));
        assert!(pages[2].contains("Omega"));
        assert_eq!(text, pages.concat());
    }

    #[test]
    fn malformed_pdf_is_an_extraction_error() {
        let err = extract_from_bytes(DocumentFormat::Pdf, b"this is not a pdf").unwrap_err();
        assert!(matches!(err, ExtractionError::Pdf(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = extract_text(DocumentFormat::Text, &dir.path().join("missing.txt")).unwrap_err();
        assert!(matches!(err, ExtractionError::Io(_)));
    }

    #[test]
    fn extraction_does_not_remove_the_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "hola").unwrap();

        assert_eq!(extract_text(DocumentFormat::Text, &path).unwrap(), "hola");
        assert!(path.exists());
    }
}
