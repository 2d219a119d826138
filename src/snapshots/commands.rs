use tauri::State;

use crate::{
    app::ComparisonSession,
    models::SwingEvent,
    snapshots::{ComparisonFrames, GridView},
    AppState,
};

/// Opens the comparison screen: loads the player, auto-generates missing
/// analyses and renders the first event.
#[tauri::command]
pub async fn open_comparison(state: State<'_, AppState>) -> Result<ComparisonSession, String> {
    state.open_comparison().await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn refresh_comparison(
    state: State<'_, AppState>,
) -> Result<Option<ComparisonFrames>, String> {
    Ok(state.refresh_comparison().await)
}

#[tauri::command]
pub async fn close_comparison(state: State<'_, AppState>) -> Result<(), String> {
    state.close_comparison().await;
    Ok(())
}

async fn selection(state: &AppState) -> Vec<String> {
    state.library.snapshot().await.selection
}

#[tauri::command]
pub async fn next_pose_event(state: State<'_, AppState>) -> Result<ComparisonFrames, String> {
    let ids = selection(&state).await;
    Ok(state.snapshots.next_event(&ids).await)
}

#[tauri::command]
pub async fn prev_pose_event(state: State<'_, AppState>) -> Result<ComparisonFrames, String> {
    let ids = selection(&state).await;
    Ok(state.snapshots.prev_event(&ids).await)
}

#[tauri::command]
pub async fn select_pose_event(
    state: State<'_, AppState>,
    event: SwingEvent,
) -> Result<ComparisonFrames, String> {
    let ids = selection(&state).await;
    Ok(state.snapshots.select_event(event, &ids).await)
}

#[tauri::command]
pub async fn report_comparison_image_error(
    state: State<'_, AppState>,
    swing_id: String,
    event: SwingEvent,
) -> Result<(), String> {
    state
        .snapshots
        .report_comparison_image_error(&swing_id, event)
        .await;
    Ok(())
}

#[tauri::command]
pub async fn get_snapshot_grid(
    state: State<'_, AppState>,
    swing_id: String,
) -> Result<GridView, String> {
    Ok(state.snapshots.grid_view(&swing_id).await)
}

#[tauri::command]
pub async fn report_grid_image_error(
    state: State<'_, AppState>,
    swing_id: String,
    event: SwingEvent,
) -> Result<(), String> {
    state.snapshots.report_grid_image_error(&swing_id, event).await;
    Ok(())
}
