use std::collections::HashSet;

use serde::Serialize;

use crate::models::{AnalysisStatus, PoseAnalysis, SwingEvent};

use super::Frame;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GridCell {
    pub event: SwingEvent,
    pub label: &'static str,
    pub description: &'static str,
    pub frame: Frame,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GridView {
    pub swing_id: String,
    pub status: AnalysisStatus,
    pub loading: bool,
    pub error: Option<String>,
    pub cells: Vec<GridCell>,
}

/// All four events for a single swing.
#[derive(Debug, Clone, Default)]
pub struct SnapshotGrid {
    failed: HashSet<SwingEvent>,
}

impl SnapshotGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_image_failed(&mut self, event: SwingEvent) {
        self.failed.insert(event);
    }

    pub fn render(&self, swing_id: &str, analysis: Option<&PoseAnalysis>) -> GridView {
        let status = analysis
            .map(|analysis| analysis.status)
            .unwrap_or(AnalysisStatus::NotGenerated);

        let cells = SwingEvent::ALL
            .iter()
            .map(|&event| GridCell {
                event,
                label: event.label(),
                description: event.description(),
                frame: Frame::resolve(
                    analysis.and_then(|analysis| analysis.snapshot(event)),
                    self.failed.contains(&event),
                    format!("{} pose analysis", event.label()),
                ),
            })
            .collect();

        GridView {
            swing_id: swing_id.to_string(),
            status,
            loading: status == AnalysisStatus::Processing,
            error: analysis.and_then(|analysis| analysis.error.clone()),
            cells,
        }
    }
}
