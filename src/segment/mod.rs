//! Structural segmentation.
//!
//! Headings are detected from three independent cues (wording, font size
//! relative to the running body size, and emphasis). Each heading opens a
//! new section that runs until the next heading.

mod cues;
mod font_stats;
mod options;
mod segmenter;

pub use cues::{CueMatch, HeadingCues, DEFAULT_MARKERS};
pub use font_stats::{FontStatistics, RunningMedian};
pub use options::SegmentOptions;
pub use segmenter::{validate_blocks, Segmenter};
