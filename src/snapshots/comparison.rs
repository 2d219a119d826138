use std::collections::HashSet;

use serde::Serialize;

use crate::models::{AnalysisStatus, PoseAnalysis, SwingEvent};

use super::Frame;

/// Events the side-by-side pose view steps through, in order.
pub const COMPARISON_EVENTS: [SwingEvent; 3] = [
    SwingEvent::Setup,
    SwingEvent::TopBackswing,
    SwingEvent::FollowThrough,
];

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SideFrame {
    pub heading: String,
    pub swing_id: Option<String>,
    pub status: AnalysisStatus,
    pub frame: Frame,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonFrames {
    pub event: SwingEvent,
    pub label: &'static str,
    /// 1-based, for "N of 3".
    pub position: usize,
    pub total: usize,
    pub sides: Vec<SideFrame>,
}

/// Which event is on screen, plus the images that failed to load.
#[derive(Debug, Clone)]
pub struct PoseComparisonView {
    index: usize,
    failed: HashSet<(String, SwingEvent)>,
}

impl Default for PoseComparisonView {
    fn default() -> Self {
        Self::new(SwingEvent::Setup)
    }
}

impl PoseComparisonView {
    /// Starts on `alignment`, or on setup if that event is not one the view
    /// steps through.
    pub fn new(alignment: SwingEvent) -> Self {
        Self {
            index: position_of(alignment).unwrap_or(0),
            failed: HashSet::new(),
        }
    }

    pub fn current(&self) -> SwingEvent {
        COMPARISON_EVENTS[self.index]
    }

    /// Returns false for events outside the cycle; the view stays put.
    pub fn select(&mut self, event: SwingEvent) -> bool {
        match position_of(event) {
            Some(index) => {
                self.index = index;
                true
            }
            None => false,
        }
    }

    pub fn next(&mut self) -> SwingEvent {
        self.index = (self.index + 1) % COMPARISON_EVENTS.len();
        self.current()
    }

    pub fn prev(&mut self) -> SwingEvent {
        self.index = (self.index + COMPARISON_EVENTS.len() - 1) % COMPARISON_EVENTS.len();
        self.current()
    }

    pub fn mark_image_failed(&mut self, swing_id: &str, event: SwingEvent) {
        self.failed.insert((swing_id.to_string(), event));
    }

    pub fn has_failed(&self, swing_id: &str, event: SwingEvent) -> bool {
        self.failed.contains(&(swing_id.to_string(), event))
    }

    /// Lays out the current event for each side, in slot order.
    pub fn render(&self, sides: &[(Option<&str>, Option<&PoseAnalysis>)]) -> ComparisonFrames {
        let event = self.current();
        let sides = sides
            .iter()
            .enumerate()
            .map(|(index, &(swing_id, analysis))| {
                let heading = format!("Swing {}", index + 1);
                let url = analysis.and_then(|analysis| analysis.snapshot(event));
                let failed = swing_id
                    .map(|id| self.has_failed(id, event))
                    .unwrap_or(false);
                SideFrame {
                    frame: Frame::resolve(url, failed, format!("{heading} - {}", event.key())),
                    heading,
                    swing_id: swing_id.map(str::to_string),
                    status: analysis
                        .map(|analysis| analysis.status)
                        .unwrap_or(AnalysisStatus::NotGenerated),
                }
            })
            .collect();

        ComparisonFrames {
            event,
            label: event.label(),
            position: self.index + 1,
            total: COMPARISON_EVENTS.len(),
            sides,
        }
    }
}

fn position_of(event: SwingEvent) -> Option<usize> {
    COMPARISON_EVENTS.iter().position(|candidate| *candidate == event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshots::{PlaceholderReason, IMAGE_FAILED_MESSAGE};
    use crate::testing::snapshot_set;

    #[test]
    fn cycles_three_events_with_wraparound() {
        let mut view = PoseComparisonView::default();
        assert_eq!(view.current(), SwingEvent::Setup);
        assert_eq!(view.next(), SwingEvent::TopBackswing);
        assert_eq!(view.next(), SwingEvent::FollowThrough);
        assert_eq!(view.next(), SwingEvent::Setup);
        assert_eq!(view.prev(), SwingEvent::FollowThrough);
    }

    #[test]
    fn impact_is_not_part_of_the_cycle() {
        let mut view = PoseComparisonView::new(SwingEvent::Impact);
        assert_eq!(view.current(), SwingEvent::Setup);
        assert!(!view.select(SwingEvent::Impact));
        assert!(view.select(SwingEvent::FollowThrough));
        assert_eq!(view.render(&[]).position, 3);
    }

    #[test]
    fn failed_image_becomes_placeholder_for_that_swing_only() {
        let left = PoseAnalysis::available("a", snapshot_set("a"));
        let right = PoseAnalysis::available("b", snapshot_set("b"));
        let mut view = PoseComparisonView::default();
        view.mark_image_failed("a", SwingEvent::Setup);

        let frames = view.render(&[(Some("a"), Some(&left)), (Some("b"), Some(&right))]);
        assert_eq!(frames.label, "Setup");
        assert_eq!(frames.total, 3);
        assert_eq!(
            frames.sides[0].frame,
            Frame::Placeholder {
                reason: PlaceholderReason::ImageFailed,
                message: IMAGE_FAILED_MESSAGE.into(),
            }
        );
        assert!(frames.sides[1].frame.is_image());

        view.next();
        let frames = view.render(&[(Some("a"), Some(&left)), (Some("b"), Some(&right))]);
        assert!(frames.sides[0].frame.is_image());
    }

    #[test]
    fn unanalyzed_swing_shows_no_snapshot() {
        let processing = PoseAnalysis::processing("a");
        let view = PoseComparisonView::default();
        let frames = view.render(&[(Some("a"), Some(&processing)), (Some("b"), None)]);
        assert!(matches!(
            frames.sides[0].frame,
            Frame::Placeholder { reason: PlaceholderReason::NoSnapshot, .. }
        ));
        assert_eq!(frames.sides[0].status, AnalysisStatus::Processing);
        assert_eq!(frames.sides[1].status, AnalysisStatus::NotGenerated);
        assert_eq!(frames.sides[1].heading, "Swing 2");
    }
}
