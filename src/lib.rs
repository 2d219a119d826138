pub mod analysis;
pub mod app;
pub mod config;
pub mod error;
pub mod events;
pub mod gateway;
pub mod library;
pub mod models;
pub mod player;
pub mod query;
pub mod settings;
pub mod snapshots;
pub mod upload;
mod utils;

#[cfg(test)]
mod testing;

pub use app::AppState;

#[cfg(feature = "desktop")]
mod desktop {
    use std::sync::Arc;

    use tauri::{Manager, State};

    use crate::{
        analysis::commands::{
            generate_analysis, get_analysis, get_analysis_view, refetch_analysis,
            release_analysis,
        },
        config::AppConfig,
        library::commands::{
            clear_swing_selection, create_comparison, delete_comparison, delete_swing,
            get_comparison, get_library, get_swing, list_comparisons, load_swings,
            refresh_swings, toggle_swing_selection, update_comparison, update_swing,
        },
        player::commands::{
            get_overlay_settings, get_player_view, pause_both, play_both, player_ended,
            player_loaded_metadata, player_paused, player_played, player_time_update,
            reset_overlay_settings, reset_timing, scrub, set_boundary_policy, set_display_mode,
            set_end_time, set_overlay_opacity, set_start_time, toggle_highlight_differences,
            toggle_overlay_mode, toggle_play_both, toggle_sync_playback, toggle_timeline,
        },
        snapshots::commands::{
            close_comparison, get_snapshot_grid, next_pose_event, open_comparison,
            prev_pose_event, refresh_comparison, report_comparison_image_error,
            report_grid_image_error, select_pose_event,
        },
        upload::commands::{retry_swing_creation, upload_swing, validate_video},
        AppState,
    };

    /// Receives the bearer token the webview got from the identity provider.
    /// `None` signs out.
    #[tauri::command]
    async fn set_auth_token(state: State<'_, AppState>, token: Option<String>) -> Result<(), String> {
        if state.set_auth_token(token).await {
            Ok(())
        } else {
            Err("No API client configured".into())
        }
    }

    #[tauri::command]
    fn get_api_base_url(state: State<'_, AppState>) -> Result<String, String> {
        Ok(state.config.api_base_url.clone())
    }

    pub fn run() {
        // Initialize logging (reads RUST_LOG env var)
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();

        log::info!("SwingView starting up...");

        tauri::Builder::default()
            .plugin(tauri_plugin_opener::init())
            .setup(|app| {
                let result = (|| -> anyhow::Result<()> {
                    let app_data_dir = app
                        .path()
                        .app_data_dir()
                        .map_err(|err| anyhow::anyhow!(err))?;
                    std::fs::create_dir_all(&app_data_dir)?;

                    let config = AppConfig::from_env();
                    let settings_path = app_data_dir.join("settings.json");
                    let state = AppState::connect(
                        config,
                        settings_path,
                        Arc::new(app.handle().clone()),
                    )?;

                    app.manage(state);
                    Ok(())
                })();

                result.map_err(|err| err.into())
            })
            .invoke_handler(tauri::generate_handler![
                set_auth_token,
                get_api_base_url,
                // Library and selection
                load_swings,
                refresh_swings,
                get_library,
                get_swing,
                update_swing,
                delete_swing,
                toggle_swing_selection,
                clear_swing_selection,
                list_comparisons,
                get_comparison,
                create_comparison,
                update_comparison,
                delete_comparison,
                // Upload
                validate_video,
                upload_swing,
                retry_swing_creation,
                // Pose analysis
                get_analysis,
                refetch_analysis,
                get_analysis_view,
                generate_analysis,
                release_analysis,
                // Comparison player
                get_player_view,
                player_loaded_metadata,
                player_time_update,
                player_ended,
                player_played,
                player_paused,
                set_start_time,
                set_end_time,
                reset_timing,
                play_both,
                pause_both,
                toggle_play_both,
                scrub,
                set_display_mode,
                toggle_overlay_mode,
                set_boundary_policy,
                get_overlay_settings,
                set_overlay_opacity,
                toggle_sync_playback,
                toggle_timeline,
                toggle_highlight_differences,
                reset_overlay_settings,
                // Pose snapshots
                open_comparison,
                refresh_comparison,
                close_comparison,
                next_pose_event,
                prev_pose_event,
                select_pose_event,
                report_comparison_image_error,
                get_snapshot_grid,
                report_grid_image_error,
            ])
            .build(tauri::generate_context!())
            .expect("error while building tauri application")
            .run(|handle, event| {
                if let tauri::RunEvent::Exit = event {
                    let state = handle.state::<AppState>();
                    tauri::async_runtime::block_on(state.shutdown());
                }
            });
    }
}

#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    desktop::run();
}
