//! Corpus loading.
//!
//! The corpus is the ingestion pipeline's output: a JSON array of chunks in
//! reading order.

use crate::types::Chunk;
use std::path::Path;
use vidya_core::{AppError, AppResult};

/// Read the chunk corpus at `path`.
///
/// A missing file is `NotFound`; malformed JSON is `Serialization`. An empty
/// array is returned as is; building an index from it fails later.
pub fn load_corpus(path: &Path) -> AppResult<Vec<Chunk>> {
    if !path.is_file() {
        return Err(AppError::NotFound(format!(
            "Corpus file not found: {}",
            path.display()
        )));
    }

    let contents = std::fs::read_to_string(path)?;
    let chunks: Vec<Chunk> = serde_json::from_str(&contents).map_err(|e| {
        AppError::Serialization(format!("Invalid corpus {}: {}", path.display(), e))
    })?;

    tracing::info!(path = %path.display(), chunks = chunks.len(), "Loaded corpus");
    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_corpus() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("cleaned_chunks.json");
        std::fs::write(
            &path,
            r#"[
                {"content": "Use group work.", "metadata": {"source": "NCERT", "category": "pedagogy"}},
                {"text": "Check understanding often."}
            ]"#,
        )
        .unwrap();

        let chunks = load_corpus(&path).unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, "Use group work.");
        assert_eq!(chunks[0].metadata["category"], "pedagogy");
        assert!(chunks[1].metadata.is_empty());
    }

    #[test]
    fn test_missing_corpus_is_not_found() {
        let temp = TempDir::new().unwrap();
        let result = load_corpus(&temp.path().join("missing.json"));
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_malformed_corpus_is_serialization_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("corpus.json");
        std::fs::write(&path, r#"{"not": "an array"}"#).unwrap();

        assert!(matches!(
            load_corpus(&path),
            Err(AppError::Serialization(_))
        ));
    }

    #[test]
    fn test_empty_array_loads() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("corpus.json");
        std::fs::write(&path, "[]").unwrap();

        assert!(load_corpus(&path).unwrap().is_empty());
    }
}
