//! Decides whether a finished answer is big enough to be shown full screen.

/// Rendered height above which an answer is promoted
pub const DEFAULT_HEIGHT_THRESHOLD: u32 = 400;
/// Line count above which an answer is promoted
pub const DEFAULT_LINE_THRESHOLD: usize = 8;

/// Size of a rendered answer, taken after layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Measurement {
    /// Rendered height; `None` when the front end cannot measure it
    pub rendered_height: Option<u32>,
    pub line_count: usize,
}

impl Measurement {
    pub fn new(rendered_height: Option<u32>, line_count: usize) -> Self {
        Measurement {
            rendered_height,
            line_count,
        }
    }

    /// Measure text alone, without a rendered height
    pub fn of_text(text: &str) -> Self {
        Measurement::new(None, line_count(text))
    }
}

/// Number of lines in `text`, counting every line break
pub fn line_count(text: &str) -> usize {
    text.split('\n').count()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromotionDecision {
    pub promote: bool,
    /// Index of the turn the decision is about
    pub turn_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverflowPromoter {
    height_threshold: u32,
    line_threshold: usize,
}

impl Default for OverflowPromoter {
    fn default() -> Self {
        OverflowPromoter::new(DEFAULT_HEIGHT_THRESHOLD, DEFAULT_LINE_THRESHOLD)
    }
}

impl OverflowPromoter {
    pub fn new(height_threshold: u32, line_threshold: usize) -> Self {
        OverflowPromoter {
            height_threshold,
            line_threshold,
        }
    }

    /// Either threshold being exceeded is enough to promote
    pub fn decide(&self, turn_index: usize, measurement: Measurement) -> PromotionDecision {
        let too_tall = measurement
            .rendered_height
            .is_some_and(|height| height > self.height_threshold);
        let too_long = measurement.line_count > self.line_threshold;

        PromotionDecision {
            promote: too_tall || too_long,
            turn_index,
        }
    }
}
