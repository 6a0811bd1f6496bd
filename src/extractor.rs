use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Failed to parse PDF '{path}': {reason}")]
    Parse { path: String, reason: String },
}

/// Extract the text of every page of one PDF, in page order.
///
/// Pages with no extractable text (scanned images, empty pages) yield an
/// empty string rather than an error.
pub fn extract_pages<P: AsRef<Path>>(path: P) -> Result<Vec<String>, ExtractionError> {
    let path = path.as_ref();
    let pages = pdf_extract::extract_text_by_pages(path).map_err(|e| ExtractionError::Parse {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    debug!(path = %path.display(), pages = pages.len(), "Extracted PDF pages");
    Ok(pages)
}

/// Concatenate the text of every page of every source, in source-then-page
/// order, joined by a single space.
///
/// Page boundaries are not preserved: downstream chunking sees one flat
/// string, and content can merge across page breaks. Callers that need
/// per-page provenance should use [`extract_pages`] directly.
pub fn combine_documents<P: AsRef<Path>>(paths: &[P]) -> Result<String, ExtractionError> {
    let mut all_texts = Vec::new();
    for path in paths {
        all_texts.extend(extract_pages(path)?);
    }
    debug!(
        sources = paths.len(),
        pages = all_texts.len(),
        "Combined extracted text"
    );
    Ok(all_texts.join(" "))
}
