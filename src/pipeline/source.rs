//! Block sources: where a document's text blocks come from.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::model::TextBlock;

/// A document whose text blocks can be loaded.
///
/// Implement this trait to feed blocks from a PDF analysis backend. Loading
/// runs on a segmentation worker thread.
pub trait BlockSource: Send + Sync {
    /// Identifier of the document.
    fn document_id(&self) -> &str;

    /// Load the document's blocks in reading order.
    fn load_blocks(&self) -> Result<Vec<TextBlock>>;
}

/// Blocks already in memory.
#[derive(Debug, Clone)]
pub struct MemorySource {
    document_id: String,
    blocks: Vec<TextBlock>,
}

impl MemorySource {
    /// Create a source from blocks.
    pub fn new(document_id: impl Into<String>, blocks: Vec<TextBlock>) -> Self {
        Self {
            document_id: document_id.into(),
            blocks,
        }
    }

    /// Number of blocks held.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }
}

impl BlockSource for MemorySource {
    fn document_id(&self) -> &str {
        &self.document_id
    }

    fn load_blocks(&self) -> Result<Vec<TextBlock>> {
        Ok(self.blocks.clone())
    }
}

/// A JSON file holding an array of blocks.
///
/// Blocks without a `document_id` take the source's id.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    document_id: String,
    path: PathBuf,
}

impl JsonFileSource {
    /// Create a source with an explicit document id.
    pub fn new(document_id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            document_id: document_id.into(),
            path: path.into(),
        }
    }

    /// Create a source named after the file stem.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let document_id = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { document_id, path }
    }

    /// Path of the block file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BlockSource for JsonFileSource {
    fn document_id(&self) -> &str {
        &self.document_id
    }

    fn load_blocks(&self) -> Result<Vec<TextBlock>> {
        let data = std::fs::read(&self.path).map_err(|e| {
            Error::input(
                &self.document_id,
                format!("cannot read {}: {}", self.path.display(), e),
            )
        })?;
        let mut blocks: Vec<TextBlock> = serde_json::from_slice(&data).map_err(|e| {
            Error::input(
                &self.document_id,
                format!("malformed block file {}: {}", self.path.display(), e),
            )
        })?;
        for block in blocks.iter_mut().filter(|b| b.document_id.is_empty()) {
            block.document_id = self.document_id.clone();
        }
        Ok(blocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_memory_source() {
        let source = MemorySource::new("doc", vec![TextBlock::new("doc", 1, 0, "text", 10.0)]);
        assert_eq!(source.document_id(), "doc");
        assert_eq!(source.block_count(), 1);
        assert_eq!(source.load_blocks().unwrap().len(), 1);
    }

    #[test]
    fn test_json_source_fills_document_id() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"[
                {{"page_number": 1, "text": "1. Overview", "font_size": 14.0, "is_bold": true, "reading_order_index": 0}},
                {{"document_id": "report", "page_number": 1, "text": "Body.", "font_size": 10.0, "reading_order_index": 1}}
            ]"#
        )
        .unwrap();

        let source = JsonFileSource::new("report", file.path());
        let blocks = source.load_blocks().unwrap();
        assert_eq!(blocks.len(), 2);
        assert!(blocks.iter().all(|b| b.document_id == "report"));
        assert!(blocks[0].is_bold);
        assert!(!blocks[1].is_italic);
    }

    #[test]
    fn test_json_source_errors_are_input_errors() {
        let missing = JsonFileSource::new("gone", "/nonexistent/blocks.json");
        let err = missing.load_blocks().unwrap_err();
        assert!(matches!(err, Error::Input { .. }));
        assert!(err.to_string().contains("gone"));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{\"not\": \"an array\"}}").unwrap();
        let bad = JsonFileSource::new("bad", file.path());
        assert!(matches!(bad.load_blocks(), Err(Error::Input { .. })));
    }

    #[test]
    fn test_from_path_uses_file_stem() {
        let source = JsonFileSource::from_path("/data/blocks/annual-report.json");
        assert_eq!(source.document_id(), "annual-report");
    }
}
