// Word document text extraction via docx-rs
//
// A .docx is a ZIP of XML parts; docx-rs exposes the body as
// Document -> Paragraph -> Run -> Text.

use crate::types::{AppError, AppResult};
use docx_rs::{read_docx, DocumentChild, Paragraph, ParagraphChild, RunChild};

/// Paragraph texts in document order, joined by newlines
pub fn extract_text(bytes: &[u8]) -> AppResult<String> {
    let docx = read_docx(bytes).map_err(|e| AppError::Extraction {
        kind: "DOC/DOCX".to_string(),
        message: format!("{:?}", e),
    })?;

    let paragraphs: Vec<String> = docx
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(para) => Some(paragraph_text(para)),
            _ => None,
        })
        .collect();

    Ok(paragraphs.join("\n"))
}

/// Runs inside one paragraph are joined without a separator. Tabs and
/// breaks inside a run become `\t` and `\n`.
fn paragraph_text(para: &Paragraph) -> String {
    let mut text = String::new();
    for child in &para.children {
        if let ParagraphChild::Run(run) = child {
            for rc in &run.children {
                match rc {
                    RunChild::Text(t) => text.push_str(&t.text),
                    RunChild::Tab(_) => text.push('\t'),
                    RunChild::Break(_) => text.push('\n'),
                    _ => {}
                }
            }
        }
    }
    text
}
