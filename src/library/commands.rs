use tauri::State;

use crate::{
    app::SelectionSync,
    library::LibrarySnapshot,
    models::{Comparison, ComparisonInput, Swing, SwingPatch},
    AppState,
};

#[tauri::command]
pub async fn load_swings(
    state: State<'_, AppState>,
    page: Option<u32>,
    limit: Option<u32>,
) -> Result<LibrarySnapshot, String> {
    state
        .load_library(page, limit)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn refresh_swings(state: State<'_, AppState>) -> Result<LibrarySnapshot, String> {
    state.refresh_library().await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn get_library(state: State<'_, AppState>) -> Result<LibrarySnapshot, String> {
    Ok(state.library.snapshot().await)
}

#[tauri::command]
pub async fn get_swing(state: State<'_, AppState>, swing_id: String) -> Result<Swing, String> {
    state
        .library
        .get_swing(&swing_id)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn update_swing(
    state: State<'_, AppState>,
    swing_id: String,
    patch: SwingPatch,
) -> Result<Swing, String> {
    state
        .library
        .update_swing(&swing_id, patch)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn delete_swing(
    state: State<'_, AppState>,
    swing_id: String,
) -> Result<LibrarySnapshot, String> {
    state
        .delete_swing(&swing_id)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn toggle_swing_selection(
    state: State<'_, AppState>,
    swing_id: String,
) -> Result<SelectionSync, String> {
    Ok(state.toggle_selection(&swing_id).await)
}

#[tauri::command]
pub async fn clear_swing_selection(state: State<'_, AppState>) -> Result<SelectionSync, String> {
    Ok(state.clear_selection().await)
}

#[tauri::command]
pub async fn list_comparisons(state: State<'_, AppState>) -> Result<Vec<Comparison>, String> {
    state.comparisons.list().await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn get_comparison(
    state: State<'_, AppState>,
    comparison_id: String,
) -> Result<Comparison, String> {
    state
        .comparisons
        .get(&comparison_id)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn create_comparison(
    state: State<'_, AppState>,
    input: ComparisonInput,
) -> Result<Comparison, String> {
    state
        .comparisons
        .create(input)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn update_comparison(
    state: State<'_, AppState>,
    comparison_id: String,
    input: ComparisonInput,
) -> Result<Comparison, String> {
    state
        .comparisons
        .update(&comparison_id, input)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn delete_comparison(
    state: State<'_, AppState>,
    comparison_id: String,
) -> Result<(), String> {
    state
        .comparisons
        .delete(&comparison_id)
        .await
        .map_err(|e| e.to_string())
}
