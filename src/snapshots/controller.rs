use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::analysis::AnalysisController;
use crate::models::{PoseAnalysis, SwingEvent};

use super::{ComparisonFrames, GridView, PoseComparisonView, SnapshotGrid};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

/// Serves the still-frame views. Analysis state comes from the shared
/// [`AnalysisController`]; only the view position and failed images are
/// kept here.
#[derive(Clone)]
pub struct SnapshotsController {
    analysis: AnalysisController,
    comparison: Arc<Mutex<PoseComparisonView>>,
    grids: Arc<Mutex<HashMap<String, SnapshotGrid>>>,
}

impl SnapshotsController {
    pub fn new(analysis: AnalysisController) -> Self {
        Self {
            analysis,
            comparison: Arc::new(Mutex::new(PoseComparisonView::default())),
            grids: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Frames for the current comparison event, one side per swing id.
    pub async fn comparison_view(&self, swing_ids: &[String]) -> ComparisonFrames {
        let mut analyses = Vec::with_capacity(swing_ids.len());
        for swing_id in swing_ids {
            analyses.push(self.analysis_for(swing_id).await);
        }
        let sides: Vec<(Option<&str>, Option<&PoseAnalysis>)> = swing_ids
            .iter()
            .zip(&analyses)
            .map(|(swing_id, analysis)| (Some(swing_id.as_str()), analysis.as_ref()))
            .collect();

        self.comparison.lock().await.render(&sides)
    }

    pub async fn next_event(&self, swing_ids: &[String]) -> ComparisonFrames {
        self.comparison.lock().await.next();
        self.comparison_view(swing_ids).await
    }

    pub async fn prev_event(&self, swing_ids: &[String]) -> ComparisonFrames {
        self.comparison.lock().await.prev();
        self.comparison_view(swing_ids).await
    }

    pub async fn select_event(&self, event: SwingEvent, swing_ids: &[String]) -> ComparisonFrames {
        if !self.comparison.lock().await.select(event) {
            log_warn!("{} is not shown in the pose comparison", event.key());
        }
        self.comparison_view(swing_ids).await
    }

    pub async fn report_comparison_image_error(&self, swing_id: &str, event: SwingEvent) {
        log_info!("comparison image failed for {swing_id} at {}", event.key());
        self.comparison.lock().await.mark_image_failed(swing_id, event);
    }

    /// All four events for one swing. A pending generate counts as loading.
    pub async fn grid_view(&self, swing_id: &str) -> GridView {
        let analysis = self.analysis_for(swing_id).await;
        let generating = self.analysis.view(swing_id).await.generating;

        let grids = self.grids.lock().await;
        let mut view = match grids.get(swing_id) {
            Some(grid) => grid.render(swing_id, analysis.as_ref()),
            None => SnapshotGrid::new().render(swing_id, analysis.as_ref()),
        };
        view.loading |= generating;
        view
    }

    pub async fn report_grid_image_error(&self, swing_id: &str, event: SwingEvent) {
        log_info!("grid image failed for {swing_id} at {}", event.key());
        self.grids
            .lock()
            .await
            .entry(swing_id.to_string())
            .or_default()
            .mark_image_failed(event);
    }

    /// Drops failed-image marks for a deleted swing.
    pub async fn forget(&self, swing_id: &str) {
        self.grids.lock().await.remove(swing_id);
    }

    /// Fresh status when reachable, otherwise whatever was cached last.
    async fn analysis_for(&self, swing_id: &str) -> Option<PoseAnalysis> {
        match self.analysis.status(swing_id).await {
            Ok(analysis) => Some(analysis),
            Err(err) => {
                log_warn!("using cached analysis for {swing_id}: {err}");
                self.analysis.view(swing_id).await.analysis
            }
        }
    }
}
