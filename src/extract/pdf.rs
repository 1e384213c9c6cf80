// PDF text extraction via lopdf

use crate::types::{AppError, AppResult};
use lopdf::Document;
use tracing::debug;

/// Concatenate the text of every page as extracted, each followed by a
/// newline. Pages without extractable text contribute nothing.
pub fn extract_text(bytes: &[u8]) -> AppResult<String> {
    let doc = Document::load_mem(bytes).map_err(|e| extraction_error(e.to_string()))?;

    let mut text = String::new();
    for (page_num, _page_id) in doc.get_pages() {
        match doc.extract_text(&[page_num]) {
            Ok(page_text) if !page_text.is_empty() => {
                text.push_str(&page_text);
                text.push('\n');
            }
            Ok(_) => debug!(page = page_num, "Page has no extractable text"),
            Err(e) => debug!(page = page_num, error = %e, "Skipping page without text"),
        }
    }

    Ok(text)
}

fn extraction_error(message: String) -> AppError {
    AppError::Extraction {
        kind: "PDF".to_string(),
        message,
    }
}
