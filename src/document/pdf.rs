use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("PDF file not found: {0}")]
    NotFound(PathBuf),
    #[error("Failed to extract text: {0}")]
    Extraction(String),
    #[error("No text could be extracted from {0}")]
    Empty(PathBuf),
}

/// Extracts the full text of a PDF file.
pub fn extract_text(path: &Path) -> Result<String, DocumentError> {
    if !path.exists() {
        return Err(DocumentError::NotFound(path.to_path_buf()));
    }

    log::info!("Extracting text from {}", path.display());

    let text = pdf_extract::extract_text(path)
        .map_err(|e| DocumentError::Extraction(e.to_string()))?;

    if text.trim().is_empty() {
        return Err(DocumentError::Empty(path.to_path_buf()));
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_reported() {
        let err = extract_text(Path::new("no/such/file.pdf")).unwrap_err();
        assert!(matches!(err, DocumentError::NotFound(_)));
    }
}
