use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::analysis::AnalysisController;
use crate::config::AppConfig;
use crate::error::LibraryError;
use crate::events::EventSink;
use crate::gateway::{GatewayClient, SwingGateway};
use crate::library::{
    ComparisonsController, LibraryController, LibrarySnapshot, SelectionChange, SelectionUpdate,
    MIN_COMPARE,
};
use crate::models::Swing;
use crate::player::{PlayerController, PlayerView};
use crate::settings::SettingsStore;
use crate::snapshots::{ComparisonFrames, SnapshotsController};
use crate::upload::UploadPipeline;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

/// Result of a selection change after the player and analysis caught up.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionSync {
    pub change: SelectionChange,
    pub library: LibrarySnapshot,
    pub player: PlayerView,
    /// Swings a generate was started for because the comparison view is open.
    pub auto_generated: Vec<String>,
}

/// Everything the comparison screen needs when it opens.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonSession {
    pub swings: Vec<Swing>,
    pub player: PlayerView,
    pub frames: ComparisonFrames,
    pub auto_generated: Vec<String>,
}

/// The controllers behind the app, wired to one gateway and one event sink.
pub struct AppState {
    pub config: AppConfig,
    client: Option<GatewayClient>,
    pub library: LibraryController,
    pub comparisons: ComparisonsController,
    pub uploads: UploadPipeline,
    pub analysis: AnalysisController,
    pub player: PlayerController,
    pub snapshots: SnapshotsController,
    pub settings: Arc<SettingsStore>,
    comparing: Mutex<bool>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        gateway: Arc<dyn SwingGateway>,
        settings: Arc<SettingsStore>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        let library = LibraryController::new(&config, gateway.clone(), events.clone());
        let comparisons = ComparisonsController::new(&config, gateway.clone());
        let uploads = UploadPipeline::new(gateway.clone(), library.clone(), config.upload.clone());
        let analysis = AnalysisController::new(&config, gateway, events.clone());
        let player = PlayerController::new(settings.clone(), events);
        let snapshots = SnapshotsController::new(analysis.clone());

        Self {
            config,
            client: None,
            library,
            comparisons,
            uploads,
            analysis,
            player,
            snapshots,
            settings,
            comparing: Mutex::new(false),
        }
    }

    /// Builds the HTTP gateway from `config` and opens the settings file.
    pub fn connect(config: AppConfig, settings_path: PathBuf, events: Arc<dyn EventSink>) -> Result<Self> {
        let client = GatewayClient::new(&config)
            .with_context(|| format!("Failed to build API client for {}", config.api_base_url))?;
        let settings = SettingsStore::new(settings_path)?;
        log_info!("using swing API at {}", client.base_url());

        let mut state = Self::new(config, Arc::new(client.clone()), Arc::new(settings), events);
        state.client = Some(client);
        Ok(state)
    }

    /// Hands the identity provider's token to the HTTP gateway. Returns false
    /// when the app runs without one.
    pub async fn set_auth_token(&self, token: Option<String>) -> bool {
        match &self.client {
            Some(client) => {
                client.set_auth_token(token).await;
                true
            }
            None => {
                log_warn!("no HTTP gateway to receive the auth token");
                false
            }
        }
    }

    pub async fn is_comparing(&self) -> bool {
        *self.comparing.lock().await
    }

    /// Loads a page of swings. Selected swings that are gone from the
    /// listing are dropped and the player follows.
    pub async fn load_library(
        &self,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<LibrarySnapshot, LibraryError> {
        let library = self.library.load(page, limit).await?;
        self.sync_selection(&library.selection).await;
        Ok(library)
    }

    pub async fn refresh_library(&self) -> Result<LibrarySnapshot, LibraryError> {
        let library = self.library.refresh().await?;
        self.sync_selection(&library.selection).await;
        Ok(library)
    }

    pub async fn toggle_selection(&self, swing_id: &str) -> SelectionSync {
        let SelectionUpdate { change, library } = self.library.toggle_selection(swing_id).await;
        if change == SelectionChange::Ignored {
            log_info!("selection unchanged for {swing_id}");
            return SelectionSync {
                change,
                library,
                player: self.player.view().await,
                auto_generated: Vec::new(),
            };
        }
        let (player, auto_generated) = self.sync_selection(&library.selection).await;
        SelectionSync {
            change,
            library,
            player,
            auto_generated,
        }
    }

    pub async fn clear_selection(&self) -> SelectionSync {
        let library = self.library.clear_selection().await;
        let (player, auto_generated) = self.sync_selection(&library.selection).await;
        SelectionSync {
            change: SelectionChange::Removed,
            library,
            player,
            auto_generated,
        }
    }

    /// Opens the comparison screen for the current selection. Needs at
    /// least two selected swings.
    pub async fn open_comparison(&self) -> Result<ComparisonSession, LibraryError> {
        let library = self.library.snapshot().await;
        if !library.can_compare {
            return Err(LibraryError::TooFewSwings { min: MIN_COMPARE });
        }

        *self.comparing.lock().await = true;
        let swings = self.library.selected_swings().await;
        let player = self.player.load_selection(&swings).await.view;
        let auto_generated = self.analysis.auto_trigger(&library.selection).await;
        let frames = self.snapshots.comparison_view(&library.selection).await;

        Ok(ComparisonSession {
            swings,
            player,
            frames,
            auto_generated,
        })
    }

    /// Re-applies the auto-generate policy after an analysis update. Returns
    /// `None` when the comparison screen is closed.
    pub async fn refresh_comparison(&self) -> Option<ComparisonFrames> {
        if !self.is_comparing().await {
            return None;
        }
        let selection = self.library.snapshot().await.selection;
        self.analysis.auto_trigger(&selection).await;
        Some(self.snapshots.comparison_view(&selection).await)
    }

    pub async fn close_comparison(&self) -> PlayerView {
        *self.comparing.lock().await = false;
        let selection = self.library.snapshot().await.selection;
        self.analysis.release(&selection).await;
        self.player.pause_both().await.view
    }

    /// Deletes remotely, then drops the swing from the selection, the
    /// player and the analysis state.
    pub async fn delete_swing(&self, swing_id: &str) -> Result<LibrarySnapshot, LibraryError> {
        let library = self.library.delete_swing(swing_id).await?;
        self.analysis.forget(swing_id).await;
        self.snapshots.forget(swing_id).await;
        self.sync_selection(&library.selection).await;
        Ok(library)
    }

    pub async fn shutdown(&self) {
        self.analysis.shutdown().await;
        self.player.pause_both().await;
    }

    async fn sync_selection(&self, selection: &[String]) -> (PlayerView, Vec<String>) {
        let swings = self.library.selected_swings().await;
        let player = self.player.load_selection(&swings).await.view;
        let auto_generated = if self.is_comparing().await {
            self.analysis.auto_trigger(selection).await
        } else {
            Vec::new()
        };
        (player, auto_generated)
    }
}
