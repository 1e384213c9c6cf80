//! Document Text Extraction
//!
//! Turns an uploaded byte stream into plain text. Parsing is delegated to
//! `lopdf` for PDF and `docx-rs` for Word documents; plain text is decoded
//! as UTF-8.

pub mod docx;
pub mod pdf;

use crate::types::{AppError, AppResult};
use std::path::Path;
use tracing::info;

/// Declared type of an uploaded document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Pdf,
    Doc,
    Docx,
    Txt,
}

/// Extensions accepted by the upload control and the type each declares
pub const SUPPORTED_EXTENSIONS: [(&str, FileType); 4] = [
    ("pdf", FileType::Pdf),
    ("doc", FileType::Doc),
    ("docx", FileType::Docx),
    ("txt", FileType::Txt),
];

/// Accepted extensions for display, e.g. `.pdf, .doc, .docx, .txt`
pub fn supported_extensions_list() -> String {
    SUPPORTED_EXTENSIONS
        .iter()
        .map(|(ext, _)| format!(".{}", ext))
        .collect::<Vec<_>>()
        .join(", ")
}

impl FileType {
    /// Resolve a type tag (an extension without the dot), case-insensitively
    pub fn from_tag(tag: &str) -> AppResult<Self> {
        let tag = tag.trim().to_lowercase();
        SUPPORTED_EXTENSIONS
            .iter()
            .find(|(ext, _)| *ext == tag)
            .map(|(_, file_type)| *file_type)
            .ok_or(AppError::UnsupportedFileType(tag))
    }

    /// Resolve the type from the text after the last `.` of a file name
    pub fn from_filename(name: &str) -> AppResult<Self> {
        let file_name = Path::new(name)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(name);
        match file_name.rsplit_once('.') {
            Some((_, ext)) => Self::from_tag(ext),
            None => Err(AppError::UnsupportedFileType(file_name.to_string())),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FileType::Pdf => "PDF",
            FileType::Doc | FileType::Docx => "DOC/DOCX",
            FileType::Txt => "TXT",
        }
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Extract plain text from `bytes` of the given type.
///
/// Parser failures come back as `AppError::Extraction` for the caller to
/// report; no document text is produced in that case.
pub fn extract(bytes: &[u8], file_type: FileType) -> AppResult<String> {
    let text = match file_type {
        FileType::Pdf => pdf::extract_text(bytes)?,
        FileType::Doc | FileType::Docx => docx::extract_text(bytes)?,
        FileType::Txt => String::from_utf8(bytes.to_vec()).map_err(|e| AppError::Extraction {
            kind: file_type.label().to_string(),
            message: e.to_string(),
        })?,
    };

    info!(file_type = %file_type, bytes = bytes.len(), text_len = text.len(), "Extracted document text");
    Ok(text)
}

/// True when the text has nothing but whitespace
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_type_from_filename() {
        assert_eq!(FileType::from_filename("contract.pdf").unwrap(), FileType::Pdf);
        assert_eq!(FileType::from_filename("Lease.DOCX").unwrap(), FileType::Docx);
        assert_eq!(FileType::from_filename("old.doc").unwrap(), FileType::Doc);
        assert_eq!(FileType::from_filename("/tmp/a.b/notes.txt").unwrap(), FileType::Txt);
    }

    #[test]
    fn test_unsupported_file_type() {
        assert!(matches!(
            FileType::from_filename("notes.xyz"),
            Err(AppError::UnsupportedFileType(ref ext)) if ext == "xyz"
        ));
        assert!(matches!(
            FileType::from_filename("README"),
            Err(AppError::UnsupportedFileType(_))
        ));
    }

    #[test]
    fn test_txt_is_decoded_verbatim() {
        let text = extract("This Agreement is made\nbetween the parties.".as_bytes(), FileType::Txt).unwrap();
        assert_eq!(text, "This Agreement is made\nbetween the parties.");
    }

    #[test]
    fn test_invalid_utf8_is_extraction_error() {
        let err = extract(&[0xff, 0xfe, 0xfd], FileType::Txt).unwrap_err();
        assert!(err.to_string().starts_with("Error reading TXT file"));
    }

    #[test]
    fn test_malformed_docx_is_extraction_error() {
        assert!(matches!(
            extract(b"definitely not a zip", FileType::Docx),
            Err(AppError::Extraction { ref kind, .. }) if kind == "DOC/DOCX"
        ));
    }

    #[test]
    fn test_legacy_doc_uses_word_parser() {
        let bytes = docx::tests::build_docx(&[&["Lease of premises"], &["Term: one year"]]);
        assert_eq!(
            extract(&bytes, FileType::Doc).unwrap(),
            "Lease of premises\nTerm: one year"
        );

        // a binary .doc is not a ZIP package
        let err = extract(&[0xd0, 0xcf, 0x11, 0xe0, 0xa1, 0xb1, 0x1a, 0xe1], FileType::Doc).unwrap_err();
        assert!(err.to_string().starts_with("Error reading DOC/DOCX file"));
    }

    #[test]
    fn test_supported_extensions_list() {
        assert_eq!(supported_extensions_list(), ".pdf, .doc, .docx, .txt");
        assert_eq!(FileType::from_tag(" PDF ").unwrap(), FileType::Pdf);
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank(""));
        assert!(is_blank(" \n\t "));
        assert!(!is_blank(" a "));
    }
}
