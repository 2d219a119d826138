use tauri::State;

use crate::{
    models::{BoundaryPolicy, DisplayMode, OverlaySettings, VideoTiming},
    player::{PlayerUpdate, PlayerView},
    AppState,
};

#[tauri::command]
pub async fn get_player_view(state: State<'_, AppState>) -> Result<PlayerView, String> {
    Ok(state.player.view().await)
}

#[tauri::command]
pub async fn player_loaded_metadata(
    state: State<'_, AppState>,
    slot: usize,
    duration: f64,
) -> Result<PlayerView, String> {
    state
        .player
        .on_loaded_metadata(slot, duration)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn player_time_update(
    state: State<'_, AppState>,
    slot: usize,
    position: f64,
) -> Result<PlayerUpdate, String> {
    state
        .player
        .on_time_update(slot, position)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn player_ended(state: State<'_, AppState>, slot: usize) -> Result<PlayerUpdate, String> {
    state.player.on_ended(slot).await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn player_played(state: State<'_, AppState>, slot: usize) -> Result<PlayerView, String> {
    state.player.on_play(slot).await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn player_paused(state: State<'_, AppState>, slot: usize) -> Result<PlayerView, String> {
    state.player.on_pause(slot).await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn set_start_time(
    state: State<'_, AppState>,
    slot: usize,
) -> Result<VideoTiming, String> {
    state.player.set_start(slot).await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn set_end_time(state: State<'_, AppState>, slot: usize) -> Result<VideoTiming, String> {
    state.player.set_end(slot).await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn reset_timing(state: State<'_, AppState>, slot: usize) -> Result<VideoTiming, String> {
    state
        .player
        .reset_timing(slot)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn play_both(state: State<'_, AppState>) -> Result<PlayerUpdate, String> {
    Ok(state.player.play_both().await)
}

#[tauri::command]
pub async fn pause_both(state: State<'_, AppState>) -> Result<PlayerUpdate, String> {
    Ok(state.player.pause_both().await)
}

#[tauri::command]
pub async fn toggle_play_both(state: State<'_, AppState>) -> Result<PlayerUpdate, String> {
    Ok(state.player.toggle_play_both().await)
}

#[tauri::command]
pub async fn scrub(
    state: State<'_, AppState>,
    slot: usize,
    position: f64,
) -> Result<PlayerUpdate, String> {
    state
        .player
        .scrub(slot, position)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn set_display_mode(
    state: State<'_, AppState>,
    mode: DisplayMode,
) -> Result<PlayerView, String> {
    state
        .player
        .set_display_mode(mode)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn toggle_overlay_mode(state: State<'_, AppState>) -> Result<PlayerView, String> {
    state.player.toggle_overlay().await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn set_boundary_policy(
    state: State<'_, AppState>,
    policy: BoundaryPolicy,
) -> Result<PlayerView, String> {
    state
        .player
        .set_boundary_policy(policy)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn get_overlay_settings(state: State<'_, AppState>) -> Result<OverlaySettings, String> {
    Ok(state.player.overlay_settings().await)
}

#[tauri::command]
pub async fn set_overlay_opacity(
    state: State<'_, AppState>,
    opacity: f64,
) -> Result<OverlaySettings, String> {
    state
        .player
        .set_opacity(opacity)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn toggle_sync_playback(state: State<'_, AppState>) -> Result<OverlaySettings, String> {
    state
        .player
        .update_overlay(OverlaySettings::toggle_sync_playback)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn toggle_timeline(state: State<'_, AppState>) -> Result<OverlaySettings, String> {
    state
        .player
        .update_overlay(OverlaySettings::toggle_timeline)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn toggle_highlight_differences(
    state: State<'_, AppState>,
) -> Result<OverlaySettings, String> {
    state
        .player
        .update_overlay(OverlaySettings::toggle_highlight_differences)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn reset_overlay_settings(state: State<'_, AppState>) -> Result<OverlaySettings, String> {
    state.player.reset_overlay().await.map_err(|e| e.to_string())
}
