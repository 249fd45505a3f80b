//! Text block types produced by the structural parser.

use serde::{Deserialize, Serialize};

/// A block of text with position and typography, as produced by the
/// PDF analysis collaborator.
///
/// Blocks are immutable once created. A document is an ordered sequence of
/// blocks; a block's position in that sequence is its block id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    /// Document the block belongs to
    #[serde(default)]
    pub document_id: String,

    /// Page number (1-indexed)
    pub page_number: u32,

    /// Text content (may be empty, never null)
    pub text: String,

    /// Font size in points
    pub font_size: f32,

    /// Whether the block is set in a bold face
    #[serde(default)]
    pub is_bold: bool,

    /// Whether the block is set in an italic face
    #[serde(default)]
    pub is_italic: bool,

    /// Bounding box on the page
    #[serde(default)]
    pub bounding_box: BoundingBox,

    /// Position in reading order within the document
    pub reading_order_index: u32,
}

impl TextBlock {
    /// Create a plain body block.
    pub fn new(
        document_id: impl Into<String>,
        page_number: u32,
        reading_order_index: u32,
        text: impl Into<String>,
        font_size: f32,
    ) -> Self {
        Self {
            document_id: document_id.into(),
            page_number,
            text: text.into(),
            font_size,
            is_bold: false,
            is_italic: false,
            bounding_box: BoundingBox::default(),
            reading_order_index,
        }
    }

    /// Mark the block as bold.
    pub fn bold(mut self) -> Self {
        self.is_bold = true;
        self
    }

    /// Mark the block as italic.
    pub fn italic(mut self) -> Self {
        self.is_italic = true;
        self
    }

    /// Set the bounding box.
    pub fn with_bounding_box(mut self, bounding_box: BoundingBox) -> Self {
        self.bounding_box = bounding_box;
        self
    }

    /// Check if the block has no visible text.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Whitespace-separated word count.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    /// Whether the block carries a bold or italic face.
    pub fn is_emphasized(&self) -> bool {
        self.is_bold || self.is_italic
    }
}

/// Axis-aligned bounding box in page coordinates (points).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge
    pub x0: f32,
    /// Top edge
    pub y0: f32,
    /// Right edge
    pub x1: f32,
    /// Bottom edge
    pub y1: f32,
}

impl BoundingBox {
    /// Create a new bounding box.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Width of the box.
    pub fn width(&self) -> f32 {
        (self.x1 - self.x0).abs()
    }

    /// Height of the box.
    pub fn height(&self) -> f32 {
        (self.y1 - self.y0).abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_builder() {
        let block = TextBlock::new("doc", 1, 0, "Abstract", 14.0).bold();
        assert!(block.is_bold);
        assert!(!block.is_italic);
        assert!(block.is_emphasized());
        assert_eq!(block.word_count(), 1);
    }

    #[test]
    fn test_blank_block() {
        assert!(TextBlock::new("doc", 1, 0, "  \n ", 10.0).is_blank());
        assert!(!TextBlock::new("doc", 1, 0, "x", 10.0).is_blank());
    }

    #[test]
    fn test_block_deserialize_defaults() {
        let json = r#"{"page_number": 2, "text": "Hello", "font_size": 11.0, "reading_order_index": 4}"#;
        let block: TextBlock = serde_json::from_str(json).unwrap();
        assert_eq!(block.document_id, "");
        assert!(!block.is_bold);
        assert_eq!(block.bounding_box, BoundingBox::default());
    }

    #[test]
    fn test_bounding_box_dimensions() {
        let bbox = BoundingBox::new(72.0, 100.0, 540.0, 120.0);
        assert_eq!(bbox.width(), 468.0);
        assert_eq!(bbox.height(), 20.0);
    }
}
