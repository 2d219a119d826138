use tauri::State;

use crate::{
    upload::{SwingMetadata, UploadOutcome, VideoFile},
    AppState,
};

/// Checks a picked file against the upload limits without sending anything.
#[tauri::command]
pub async fn validate_video(state: State<'_, AppState>, path: String) -> Result<(), String> {
    let file = VideoFile::from_path(&path).await.map_err(|e| e.to_string())?;
    file.validate(state.uploads.limits())
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn upload_swing(
    state: State<'_, AppState>,
    path: String,
    metadata: Option<SwingMetadata>,
) -> Result<UploadOutcome, String> {
    let file = VideoFile::from_path(&path).await.map_err(|e| e.to_string())?;
    state
        .uploads
        .upload(file, metadata.unwrap_or_default())
        .await
        .map_err(|e| e.to_string())
}

/// Creates the record for a video that was stored by an earlier upload
/// whose create step failed.
#[tauri::command]
pub async fn retry_swing_creation(
    state: State<'_, AppState>,
    file_url: String,
    metadata: Option<SwingMetadata>,
) -> Result<UploadOutcome, String> {
    state
        .uploads
        .retry_create(file_url, metadata.unwrap_or_default())
        .await
        .map_err(|e| e.to_string())
}
