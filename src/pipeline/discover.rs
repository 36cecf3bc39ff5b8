//! Input discovery: expand the selector glob into processable documents.
//!
//! The filter is deliberately trivial: a file is an input if its name ends
//! in `.pdf` or its leading bytes identify a PNG or JPEG. Sniffing magic
//! bytes rather than trusting image extensions means a `scan.jpeg`,
//! `photo.JPG`, or even a misnamed image all classify the same way.

use crate::error::ExtractError;
use crate::pipeline::render;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// What kind of input a path is, which decides how its pages render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Paginated document rasterised via pdfium.
    Pdf,
    /// Standalone PNG/JPEG; always exactly one page.
    Image,
}

/// One input document with its pages enumerated.
#[derive(Debug, Clone)]
pub struct Document {
    pub path: PathBuf,
    /// File stem; names the output artifact `{base_name}.md`.
    pub base_name: String,
    pub kind: DocumentKind,
    /// 1 for image inputs.
    pub page_count: usize,
}

impl Document {
    /// Display name used in logs and progress lines.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// A discovered input path, not yet opened for page enumeration.
#[derive(Debug, Clone)]
pub struct DiscoveredInput {
    pub path: PathBuf,
    pub kind: DocumentKind,
}

/// Expand the selector and keep PDF and image files, in glob order.
///
/// An empty result is the one discovery-level error that ends the run
/// before any document is processed.
pub fn discover(pattern: &str) -> Result<Vec<DiscoveredInput>, ExtractError> {
    let entries = glob::glob(pattern).map_err(|source| ExtractError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })?;

    let mut inputs = Vec::new();
    for entry in entries {
        let path = match entry {
            Ok(p) => p,
            Err(e) => {
                debug!("skipping unreadable glob entry: {e}");
                continue;
            }
        };
        if !path.is_file() {
            continue;
        }
        if let Some(kind) = classify(&path) {
            inputs.push(DiscoveredInput { path, kind });
        } else {
            debug!("ignoring non-document input: {}", path.display());
        }
    }

    if inputs.is_empty() {
        return Err(ExtractError::NoInputsMatched {
            pattern: pattern.to_string(),
        });
    }

    Ok(inputs)
}

/// Enumerate a discovered input's pages, producing a processable document.
///
/// An unopenable PDF yields [`ExtractError::DocumentOpen`]; the run loop
/// skips that document and continues with the next one.
pub async fn open_document(input: &DiscoveredInput) -> Result<Document, ExtractError> {
    let page_count = match input.kind {
        DocumentKind::Image => 1,
        DocumentKind::Pdf => {
            let path = input.path.clone();
            tokio::task::spawn_blocking(move || render::pdf_page_count(&path))
                .await
                .map_err(|e| ExtractError::Internal(format!("page enumeration panicked: {e}")))??
        }
    };

    let base_name = input
        .path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());

    Ok(Document {
        path: input.path.clone(),
        base_name,
        kind: input.kind,
        page_count,
    })
}

/// Classify a path as a processable document, or `None` to ignore it.
fn classify(path: &Path) -> Option<DocumentKind> {
    let is_pdf_name = path
        .extension()
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);
    if is_pdf_name {
        return Some(DocumentKind::Pdf);
    }

    let magic = read_magic(path)?;
    if is_png(&magic) || is_jpeg(&magic) {
        return Some(DocumentKind::Image);
    }
    None
}

fn read_magic(path: &Path) -> Option<[u8; 8]> {
    let mut f = File::open(path).ok()?;
    let mut magic = [0u8; 8];
    f.read_exact(&mut magic).ok()?;
    Some(magic)
}

fn is_png(magic: &[u8; 8]) -> bool {
    magic.starts_with(b"\x89PNG\r\n\x1a\n")
}

fn is_jpeg(magic: &[u8; 8]) -> bool {
    magic.starts_with(b"\xFF\xD8\xFF")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(path: &Path, bytes: &[u8]) {
        fs::write(path, bytes).unwrap();
    }

    #[test]
    fn classifies_pdf_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("paper.PDF");
        write(&p, b"%PDF-1.7 stub");
        assert_eq!(classify(&p), Some(DocumentKind::Pdf));
    }

    #[test]
    fn classifies_images_by_magic_not_extension() {
        let dir = tempfile::tempdir().unwrap();

        let png = dir.path().join("scan.data");
        write(&png, b"\x89PNG\r\n\x1a\n rest");
        assert_eq!(classify(&png), Some(DocumentKind::Image));

        let jpeg = dir.path().join("photo.jpg");
        write(&jpeg, b"\xFF\xD8\xFF\xE0 rest of jpeg");
        assert_eq!(classify(&jpeg), Some(DocumentKind::Image));
    }

    #[test]
    fn rejects_other_files() {
        let dir = tempfile::tempdir().unwrap();
        let txt = dir.path().join("notes.txt");
        write(&txt, b"plain text, no magic");
        assert_eq!(classify(&txt), None);
    }

    #[test]
    fn discover_filters_and_orders() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("a.pdf"), b"%PDF-1.4");
        write(&dir.path().join("b.png"), b"\x89PNG\r\n\x1a\n data");
        write(&dir.path().join("c.txt"), b"ignored text");

        let pattern = format!("{}/*", dir.path().display());
        let inputs = discover(&pattern).unwrap();
        let names: Vec<_> = inputs
            .iter()
            .map(|i| i.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.pdf", "b.png"]);
        assert_eq!(inputs[0].kind, DocumentKind::Pdf);
        assert_eq!(inputs[1].kind, DocumentKind::Image);
    }

    #[test]
    fn discover_reports_empty_match() {
        let dir = tempfile::tempdir().unwrap();
        let pattern = format!("{}/*.pdf", dir.path().display());
        let err = discover(&pattern).unwrap_err();
        assert!(matches!(err, ExtractError::NoInputsMatched { .. }));
    }

    #[tokio::test]
    async fn image_document_has_one_page() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("page.png");
        write(&p, b"\x89PNG\r\n\x1a\n data");

        let doc = open_document(&DiscoveredInput {
            path: p,
            kind: DocumentKind::Image,
        })
        .await
        .unwrap();
        assert_eq!(doc.page_count, 1);
        assert_eq!(doc.base_name, "page");
        assert_eq!(doc.name(), "page.png");
    }
}
