//! Plain text of downloaded gazette PDFs.

use std::path::{Path, PathBuf};

use gdmonitor_core::{DocumentSource, Gazette};
use tracing::debug;

use crate::StoreError;

/// Reads gazette PDFs from the download directory.
#[derive(Debug, Clone)]
pub struct PdfDocumentSource {
    download_dir: PathBuf,
}

impl PdfDocumentSource {
    pub fn new(download_dir: impl Into<PathBuf>) -> Self {
        Self {
            download_dir: download_dir.into(),
        }
    }

    /// Where the PDF of `gazette` is expected on disk.
    pub fn path_of(&self, gazette: &Gazette) -> PathBuf {
        self.download_dir.join(&gazette.filename)
    }
}

impl DocumentSource for PdfDocumentSource {
    type Error = StoreError;

    fn text(&self, gazette: &Gazette) -> Result<String, StoreError> {
        let path = self.path_of(gazette);
        let data = std::fs::read(&path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        let raw = extract_pdf(&path, &data)?;
        let text = normalize_whitespace(&raw);
        debug!(gazette_id = gazette.id, chars = text.len(), "extracted text");
        Ok(text)
    }
}

#[cfg(feature = "pdf")]
fn extract_pdf(path: &Path, data: &[u8]) -> Result<String, StoreError> {
    pdf_extract::extract_text_from_mem(data).map_err(|e| StoreError::Pdf {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

#[cfg(not(feature = "pdf"))]
fn extract_pdf(_path: &Path, _data: &[u8]) -> Result<String, StoreError> {
    Err(StoreError::FeatureDisabled("pdf"))
}

/// Collapse every whitespace run to one space and trim the ends.
///
/// PDF extraction breaks lines mid-sentence and pads columns with spaces;
/// downstream matching only cares about word order.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gazette(filename: &str) -> Gazette {
        Gazette {
            id: 1,
            title: "Magyar Közlöny".into(),
            publication_date: String::new(),
            url: "https://example.test/1/letoltes".into(),
            filename: filename.into(),
            download_date: String::new(),
            analyzed: false,
            relevant: false,
        }
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(
            normalize_whitespace("  A Kormány\n1234/2024.\t\t(V.  15.)\r\n"),
            "A Kormány 1234/2024. (V. 15.)"
        );
        assert_eq!(normalize_whitespace(" \n\t "), "");
    }

    #[test]
    fn path_is_relative_to_download_dir() {
        let source = PdfDocumentSource::new("/data/downloads");
        assert_eq!(
            source.path_of(&gazette("a.pdf")),
            PathBuf::from("/data/downloads/a.pdf")
        );
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = PdfDocumentSource::new(dir.path());
        let err = source.text(&gazette("missing.pdf")).unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn garbage_file_is_pdf_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.pdf"), b"not a pdf").unwrap();
        let source = PdfDocumentSource::new(dir.path());
        let err = source.text(&gazette("bad.pdf")).unwrap_err();
        assert!(matches!(err, StoreError::Pdf { .. }));
    }

    #[cfg(not(feature = "pdf"))]
    #[test]
    fn extraction_requires_feature() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.pdf"), b"%PDF-1.4").unwrap();
        let source = PdfDocumentSource::new(dir.path());
        let err = source.text(&gazette("a.pdf")).unwrap_err();
        assert!(matches!(err, StoreError::FeatureDisabled("pdf")));
    }
}
