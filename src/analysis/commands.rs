use tauri::State;

use crate::{
    analysis::{AnalysisView, GenerateOutcome},
    models::PoseAnalysis,
    AppState,
};

#[tauri::command]
pub async fn get_analysis(
    state: State<'_, AppState>,
    swing_id: String,
) -> Result<PoseAnalysis, String> {
    state
        .analysis
        .status(&swing_id)
        .await
        .map_err(|e| e.to_string())
}

/// Skips the cache and reads the backend again.
#[tauri::command]
pub async fn refetch_analysis(
    state: State<'_, AppState>,
    swing_id: String,
) -> Result<PoseAnalysis, String> {
    state
        .analysis
        .fetch_status(&swing_id)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn get_analysis_view(
    state: State<'_, AppState>,
    swing_id: String,
) -> Result<AnalysisView, String> {
    Ok(state.analysis.view(&swing_id).await)
}

#[tauri::command]
pub async fn generate_analysis(
    state: State<'_, AppState>,
    swing_id: String,
) -> Result<GenerateOutcome, String> {
    state
        .analysis
        .generate(&swing_id)
        .await
        .map_err(|e| e.to_string())
}

/// Stops polling for swings whose view was closed.
#[tauri::command]
pub async fn release_analysis(
    state: State<'_, AppState>,
    swing_ids: Vec<String>,
) -> Result<(), String> {
    state.analysis.release(&swing_ids).await;
    Ok(())
}
