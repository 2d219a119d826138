use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::error::PlayerError;
use crate::events::{self, EventSink};
use crate::models::{BoundaryPolicy, DisplayMode, OverlaySettings, Swing, VideoTiming};
use crate::settings::{PlaybackPreferences, SettingsStore};

use super::state::{ComparisonPlayer, MediaCommand, PlayerView};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = false;

use crate::{log_info, log_warn};

/// Commands for the media elements plus the state to render afterwards.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerUpdate {
    pub commands: Vec<MediaCommand>,
    pub view: PlayerView,
}

/// Shared handle on the comparison player. Overlay settings, display mode
/// and boundary policy are persisted on every change.
#[derive(Clone)]
pub struct PlayerController {
    player: Arc<Mutex<ComparisonPlayer>>,
    settings: Arc<SettingsStore>,
    events: Arc<dyn EventSink>,
}

impl PlayerController {
    pub fn new(settings: Arc<SettingsStore>, events: Arc<dyn EventSink>) -> Self {
        let preferences = settings.playback();
        let player = ComparisonPlayer::new(
            preferences.mode,
            preferences.overlay,
            preferences.boundary_policy,
        );
        Self {
            player: Arc::new(Mutex::new(player)),
            settings,
            events,
        }
    }

    pub async fn view(&self) -> PlayerView {
        self.player.lock().await.view()
    }

    pub async fn load_selection(&self, swings: &[Swing]) -> PlayerUpdate {
        let mut player = self.player.lock().await;
        let commands = player.load_selection(swings);
        log_info!("player loaded {} swings", swings.len().min(super::SLOT_COUNT));
        self.dispatch(commands, &player)
    }

    pub async fn on_loaded_metadata(&self, slot: usize, duration: f64) -> Result<PlayerView, PlayerError> {
        let mut player = self.player.lock().await;
        player.on_loaded_metadata(slot, duration)?;
        Ok(player.view())
    }

    pub async fn set_start(&self, slot: usize) -> Result<VideoTiming, PlayerError> {
        self.player.lock().await.set_start(slot)
    }

    pub async fn set_end(&self, slot: usize) -> Result<VideoTiming, PlayerError> {
        let mut player = self.player.lock().await;
        let timing = player.set_end(slot)?;
        if timing.has_end() && timing.end < timing.start {
            log_warn!("slot {slot} end {} is before start {}", timing.end, timing.start);
        }
        Ok(timing)
    }

    pub async fn reset_timing(&self, slot: usize) -> Result<VideoTiming, PlayerError> {
        self.player.lock().await.reset_timing(slot)
    }

    pub async fn play_both(&self) -> PlayerUpdate {
        let mut player = self.player.lock().await;
        let commands = player.play_both();
        self.dispatch(commands, &player)
    }

    pub async fn pause_both(&self) -> PlayerUpdate {
        let mut player = self.player.lock().await;
        let commands = player.pause_both();
        self.dispatch(commands, &player)
    }

    pub async fn toggle_play_both(&self) -> PlayerUpdate {
        let mut player = self.player.lock().await;
        let commands = player.toggle_play_both();
        self.dispatch(commands, &player)
    }

    pub async fn on_time_update(&self, slot: usize, position: f64) -> Result<PlayerUpdate, PlayerError> {
        let mut player = self.player.lock().await;
        let commands = player.on_time_update(slot, position)?;
        Ok(self.dispatch(commands, &player))
    }

    pub async fn on_ended(&self, slot: usize) -> Result<PlayerUpdate, PlayerError> {
        let mut player = self.player.lock().await;
        let commands = player.on_ended(slot)?;
        Ok(self.dispatch(commands, &player))
    }

    pub async fn on_play(&self, slot: usize) -> Result<PlayerView, PlayerError> {
        let mut player = self.player.lock().await;
        player.on_play(slot)?;
        Ok(player.view())
    }

    pub async fn on_pause(&self, slot: usize) -> Result<PlayerView, PlayerError> {
        let mut player = self.player.lock().await;
        player.on_pause(slot)?;
        Ok(player.view())
    }

    pub async fn scrub(&self, slot: usize, position: f64) -> Result<PlayerUpdate, PlayerError> {
        let mut player = self.player.lock().await;
        let commands = player.scrub(slot, position)?;
        Ok(self.dispatch(commands, &player))
    }

    pub async fn set_display_mode(&self, mode: DisplayMode) -> Result<PlayerView> {
        let mut player = self.player.lock().await;
        self.apply_persisted(&mut player, |player| player.set_mode(mode))?;
        Ok(player.view())
    }

    pub async fn toggle_overlay(&self) -> Result<PlayerView> {
        let mut player = self.player.lock().await;
        self.apply_persisted(&mut player, ComparisonPlayer::toggle_overlay)?;
        Ok(player.view())
    }

    pub async fn set_boundary_policy(&self, policy: BoundaryPolicy) -> Result<PlayerView> {
        let mut player = self.player.lock().await;
        self.apply_persisted(&mut player, |player| player.set_policy(policy))?;
        Ok(player.view())
    }

    pub async fn overlay_settings(&self) -> OverlaySettings {
        self.player.lock().await.overlay()
    }

    /// Applies a change to the overlay settings, clamps, persists and
    /// broadcasts the result.
    pub async fn update_overlay(
        &self,
        change: impl FnOnce(&mut OverlaySettings),
    ) -> Result<OverlaySettings> {
        let mut player = self.player.lock().await;
        let mut overlay = player.overlay();
        change(&mut overlay);
        self.apply_persisted(&mut player, |player| player.set_overlay(overlay))?;

        let applied = player.overlay();
        events::emit(self.events.as_ref(), events::OVERLAY_SETTINGS_UPDATED, &applied);
        Ok(applied)
    }

    pub async fn set_opacity(&self, value: f64) -> Result<OverlaySettings> {
        self.update_overlay(|overlay| overlay.set_opacity(value)).await
    }

    pub async fn reset_overlay(&self) -> Result<OverlaySettings> {
        self.update_overlay(OverlaySettings::reset).await
    }

    /// Applies `change` and writes the preferences. The player is put back
    /// as it was when the write fails.
    fn apply_persisted<T>(
        &self,
        player: &mut ComparisonPlayer,
        change: impl FnOnce(&mut ComparisonPlayer) -> T,
    ) -> Result<T> {
        let previous = player.clone();
        let applied = change(player);
        if let Err(err) = self.persist(player) {
            log_warn!("keeping previous player preferences: {err:#}");
            *player = previous;
            return Err(err);
        }
        Ok(applied)
    }

    fn persist(&self, player: &ComparisonPlayer) -> Result<()> {
        self.settings.update_playback(PlaybackPreferences {
            overlay: player.overlay(),
            mode: player.mode(),
            boundary_policy: player.policy(),
        })
    }

    fn dispatch(&self, commands: Vec<MediaCommand>, player: &ComparisonPlayer) -> PlayerUpdate {
        if !commands.is_empty() {
            events::emit(self.events.as_ref(), events::PLAYER_COMMANDS, &commands);
        }
        PlayerUpdate {
            commands,
            view: player.view(),
        }
    }
}
