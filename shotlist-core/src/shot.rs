// ============================================================================
// shotlist-core/src/shot.rs
// ============================================================================
//
// SHOT MODEL: Normalized shot records and their annotation types
//
// A `Shot` is only ever built by the normalizer, so its temporal fields are
// private. Annotation fields belong to downstream analysis stages and start
// out empty.

use serde::{Deserialize, Serialize};

/// Visual category assigned to a shot by a downstream classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShotType {
    TalkingHead,
    Broll,
    Screen,
    Unknown,
}

/// Where on the frame an overlay text block was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TextPosition {
    Top,
    Bottom,
    Center,
    Unknown,
}

/// On-screen text observed within a shot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayTextBlock {
    pub t_start: f64,
    pub t_end: f64,
    pub text: String,
    pub position: TextPosition,
    pub is_caption: bool,
}

/// A contiguous, non-overlapping segment of the video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shot {
    index: usize,
    t_start: f64,
    t_end: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shot_type: Option<ShotType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faces_present: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlay_texts: Option<Vec<OverlayTextBlock>>,
}

impl Shot {
    pub(crate) fn new(index: usize, t_start: f64, t_end: f64) -> Self {
        Self {
            index,
            t_start,
            t_end,
            shot_type: None,
            faces_present: None,
            overlay_texts: None,
        }
    }

    /// 0-based position in the shot list.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Start time in seconds.
    pub fn t_start(&self) -> f64 {
        self.t_start
    }

    /// End time in seconds.
    pub fn t_end(&self) -> f64 {
        self.t_end
    }

    pub fn duration(&self) -> f64 {
        self.t_end - self.t_start
    }

    pub(crate) fn set_index(&mut self, index: usize) {
        self.index = index;
    }

    pub(crate) fn set_t_end(&mut self, t_end: f64) {
        self.t_end = t_end;
    }
}

/// Engine output before normalization. May be out of range, inverted or tiny.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct RawInterval {
    pub start: f64,
    pub end: f64,
}

impl RawInterval {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }
}
