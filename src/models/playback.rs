use serde::{Deserialize, Serialize};

/// Trim range for one comparison slot, in seconds.
///
/// `{0, 0}` means untrimmed, not zero-length. An `end` of zero means "play to
/// the natural end of the clip".
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VideoTiming {
    pub start: f64,
    pub end: f64,
}

impl VideoTiming {
    pub fn is_untrimmed(&self) -> bool {
        self.start == 0.0 && self.end == 0.0
    }

    pub fn has_end(&self) -> bool {
        self.end > 0.0
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum DisplayMode {
    SideBySide,
    Overlay,
}

impl Default for DisplayMode {
    fn default() -> Self {
        DisplayMode::SideBySide
    }
}

/// What synchronized playback does when one slot reaches its trim end.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum BoundaryPolicy {
    /// The first slot to reach its end halts playback of every slot.
    StopAll,
    /// Each slot pauses at its own end; playback ends once all have stopped.
    Independent,
}

impl Default for BoundaryPolicy {
    fn default() -> Self {
        BoundaryPolicy::StopAll
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OverlaySettings {
    pub opacity: f64,
    pub sync_playback: bool,
    pub show_timeline: bool,
    pub highlight_differences: bool,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            opacity: 0.5,
            sync_playback: true,
            show_timeline: true,
            highlight_differences: false,
        }
    }
}

impl OverlaySettings {
    pub fn set_opacity(&mut self, value: f64) {
        self.opacity = clamp_opacity(value);
    }

    pub fn toggle_sync_playback(&mut self) {
        self.sync_playback = !self.sync_playback;
    }

    pub fn toggle_timeline(&mut self) {
        self.show_timeline = !self.show_timeline;
    }

    pub fn toggle_highlight_differences(&mut self) {
        self.highlight_differences = !self.highlight_differences;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Clamps into `[0, 1]`; NaN falls back to fully transparent.
pub fn clamp_opacity(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}
