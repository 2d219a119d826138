use serde::Serialize;

use crate::error::PlayerError;
use crate::models::playback::clamp_opacity;
use crate::models::swing::is_playable_url;
use crate::models::{BoundaryPolicy, DisplayMode, OverlaySettings, Swing, VideoTiming};

pub const SLOT_COUNT: usize = 2;
/// Drawn on top, with the overlay opacity, in overlay mode.
pub const FOREGROUND_SLOT: usize = 1;

/// An instruction for the media element backing a slot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum MediaCommand {
    Seek { slot: usize, position: f64 },
    Play { slot: usize },
    Pause { slot: usize },
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Slot {
    swing_id: Option<String>,
    video_url: Option<String>,
    poster_url: Option<String>,
    position: f64,
    duration: Option<f64>,
    playing: bool,
    timing: VideoTiming,
    /// Halted at its own end while playing both.
    done: bool,
}

impl Slot {
    fn has_video(&self) -> bool {
        self.video_url.is_some()
    }

    fn clamp_position(&self, position: f64) -> f64 {
        let position = if position.is_finite() { position.max(0.0) } else { 0.0 };
        match self.duration {
            Some(duration) => position.min(duration),
            None => position,
        }
    }

    fn past_end(&self) -> bool {
        self.timing.has_end() && self.position >= self.timing.end
    }
}

/// Render state for one slot.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SlotView {
    pub index: usize,
    pub swing_id: Option<String>,
    /// `None` renders a placeholder instead of a media element.
    pub video_url: Option<String>,
    pub poster_url: Option<String>,
    pub position: f64,
    pub duration: Option<f64>,
    pub playing: bool,
    pub timing: VideoTiming,
    pub muted: bool,
    pub native_controls: bool,
    pub opacity: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub mode: DisplayMode,
    pub policy: BoundaryPolicy,
    pub is_playing: bool,
    pub is_playing_both: bool,
    pub overlay: OverlaySettings,
    pub slots: Vec<SlotView>,
}

/// Two trimmed videos played side by side or blended as an overlay.
///
/// The media elements own their clocks; this mirrors what they report and
/// answers with `MediaCommand`s. Trim ranges only bound synchronized
/// playback. Manual play through native controls ignores them.
#[derive(Debug, Clone, Default)]
pub struct ComparisonPlayer {
    slots: [Slot; SLOT_COUNT],
    mode: DisplayMode,
    overlay: OverlaySettings,
    policy: BoundaryPolicy,
    playing_both: bool,
}

impl ComparisonPlayer {
    pub fn new(mode: DisplayMode, overlay: OverlaySettings, policy: BoundaryPolicy) -> Self {
        Self {
            mode,
            overlay,
            policy,
            ..Self::default()
        }
    }

    /// Puts a swing (or nothing) in a slot. A different swing starts with a
    /// fresh trim range; the same swing keeps its state.
    pub fn assign(&mut self, index: usize, swing: Option<&Swing>) -> Result<Vec<MediaCommand>, PlayerError> {
        check(index)?;
        let incoming = swing.map(|s| s.id.as_str());
        if self.slots[index].swing_id.as_deref() == incoming {
            return Ok(Vec::new());
        }

        let commands = if self.playing_both {
            self.stop_all()
        } else if self.slots[index].playing {
            vec![MediaCommand::Pause { slot: index }]
        } else {
            Vec::new()
        };

        self.slots[index] = match swing {
            Some(swing) => Slot {
                swing_id: Some(swing.id.clone()),
                video_url: swing.video_url.clone().filter(|url| is_playable_url(url)),
                poster_url: swing.thumbnail_url.clone().filter(|url| is_playable_url(url)),
                ..Slot::default()
            },
            None => Slot::default(),
        };
        Ok(commands)
    }

    /// Fills the slots from a selection in order; extra slots are emptied.
    pub fn load_selection(&mut self, swings: &[Swing]) -> Vec<MediaCommand> {
        let mut commands = Vec::new();
        for index in 0..SLOT_COUNT {
            if let Ok(mut issued) = self.assign(index, swings.get(index)) {
                commands.append(&mut issued);
            }
        }
        commands
    }

    pub fn on_loaded_metadata(&mut self, index: usize, duration: f64) -> Result<(), PlayerError> {
        check(index)?;
        self.slots[index].duration = (duration.is_finite() && duration > 0.0).then_some(duration);
        Ok(())
    }

    /// Marks the current position as the clip start. An unset end defaults
    /// to the known duration.
    pub fn set_start(&mut self, index: usize) -> Result<VideoTiming, PlayerError> {
        check(index)?;
        let slot = &mut self.slots[index];
        slot.timing.start = slot.position;
        if !slot.timing.has_end() {
            slot.timing.end = slot.duration.unwrap_or(0.0);
        }
        Ok(slot.timing)
    }

    /// Marks the current position as the clip end, keeping the start.
    ///
    /// An end before the start is stored as given; synchronized playback
    /// then halts as soon as it begins.
    pub fn set_end(&mut self, index: usize) -> Result<VideoTiming, PlayerError> {
        check(index)?;
        let slot = &mut self.slots[index];
        slot.timing.end = slot.position;
        Ok(slot.timing)
    }

    pub fn reset_timing(&mut self, index: usize) -> Result<VideoTiming, PlayerError> {
        check(index)?;
        self.slots[index].timing = VideoTiming::default();
        Ok(VideoTiming::default())
    }

    pub fn timing(&self, index: usize) -> Result<VideoTiming, PlayerError> {
        check(index)?;
        Ok(self.slots[index].timing)
    }

    /// Seeks every loaded slot to its start and plays it.
    pub fn play_both(&mut self) -> Vec<MediaCommand> {
        let mut commands = Vec::new();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if !slot.has_video() {
                continue;
            }
            slot.position = slot.timing.start;
            slot.playing = true;
            slot.done = false;
            commands.push(MediaCommand::Seek {
                slot: index,
                position: slot.timing.start,
            });
            commands.push(MediaCommand::Play { slot: index });
        }
        self.playing_both = !commands.is_empty();
        commands
    }

    pub fn pause_both(&mut self) -> Vec<MediaCommand> {
        let commands = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.has_video())
            .map(|(index, _)| MediaCommand::Pause { slot: index })
            .collect();
        for slot in self.slots.iter_mut() {
            slot.playing = false;
            slot.done = false;
        }
        self.playing_both = false;
        commands
    }

    pub fn toggle_play_both(&mut self) -> Vec<MediaCommand> {
        if self.playing_both {
            self.pause_both()
        } else {
            self.play_both()
        }
    }

    /// Periodic position report from a media element.
    pub fn on_time_update(&mut self, index: usize, position: f64) -> Result<Vec<MediaCommand>, PlayerError> {
        check(index)?;
        let slot = &mut self.slots[index];
        slot.position = slot.clamp_position(position);

        if !self.playing_both || slot.done || !slot.past_end() {
            return Ok(Vec::new());
        }
        Ok(self.halt(index))
    }

    /// The media element ran off the end of its clip.
    pub fn on_ended(&mut self, index: usize) -> Result<Vec<MediaCommand>, PlayerError> {
        check(index)?;
        self.slots[index].playing = false;
        if !self.playing_both || self.slots[index].done {
            return Ok(Vec::new());
        }
        Ok(self.halt(index))
    }

    pub fn on_play(&mut self, index: usize) -> Result<(), PlayerError> {
        check(index)?;
        self.slots[index].playing = true;
        Ok(())
    }

    pub fn on_pause(&mut self, index: usize) -> Result<(), PlayerError> {
        check(index)?;
        self.slots[index].playing = false;
        if self.playing_both && !self.slots.iter().any(|slot| slot.playing) {
            self.playing_both = false;
        }
        Ok(())
    }

    /// Seeks from the external scrubber, clamped to `[0, duration]`.
    ///
    /// In overlay mode with sync playback on, both slots follow.
    pub fn scrub(&mut self, index: usize, position: f64) -> Result<Vec<MediaCommand>, PlayerError> {
        check(index)?;
        let linked = self.mode == DisplayMode::Overlay && self.overlay.sync_playback;

        let mut commands = Vec::new();
        for (slot_index, slot) in self.slots.iter_mut().enumerate() {
            if slot_index != index && !linked {
                continue;
            }
            if !slot.has_video() {
                continue;
            }
            slot.position = slot.clamp_position(position);
            commands.push(MediaCommand::Seek {
                slot: slot_index,
                position: slot.position,
            });
        }
        Ok(commands)
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: DisplayMode) {
        self.mode = mode;
    }

    pub fn toggle_overlay(&mut self) -> DisplayMode {
        self.mode = match self.mode {
            DisplayMode::SideBySide => DisplayMode::Overlay,
            DisplayMode::Overlay => DisplayMode::SideBySide,
        };
        self.mode
    }

    pub fn policy(&self) -> BoundaryPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: BoundaryPolicy) {
        self.policy = policy;
    }

    pub fn overlay(&self) -> OverlaySettings {
        self.overlay
    }

    pub fn set_overlay(&mut self, overlay: OverlaySettings) {
        self.overlay = overlay;
        self.overlay.opacity = clamp_opacity(overlay.opacity);
    }

    /// Returns the opacity actually applied.
    pub fn set_opacity(&mut self, value: f64) -> f64 {
        self.overlay.set_opacity(value);
        self.overlay.opacity
    }

    pub fn is_playing(&self) -> bool {
        self.slots.iter().any(|slot| slot.playing)
    }

    pub fn is_playing_both(&self) -> bool {
        self.playing_both
    }

    pub fn view(&self) -> PlayerView {
        let overlay_mode = self.mode == DisplayMode::Overlay;
        let slots = self
            .slots
            .iter()
            .enumerate()
            .map(|(index, slot)| SlotView {
                index,
                swing_id: slot.swing_id.clone(),
                video_url: slot.video_url.clone(),
                poster_url: slot.poster_url.clone(),
                position: slot.position,
                duration: slot.duration,
                playing: slot.playing,
                timing: slot.timing,
                muted: overlay_mode,
                native_controls: !overlay_mode,
                opacity: if overlay_mode && index == FOREGROUND_SLOT {
                    self.overlay.opacity
                } else {
                    1.0
                },
            })
            .collect();

        PlayerView {
            mode: self.mode,
            policy: self.policy,
            is_playing: self.is_playing(),
            is_playing_both: self.playing_both,
            overlay: self.overlay,
            slots,
        }
    }

    /// A slot reached its end while playing both.
    fn halt(&mut self, index: usize) -> Vec<MediaCommand> {
        match self.policy {
            BoundaryPolicy::StopAll => self.stop_all(),
            BoundaryPolicy::Independent => {
                let slot = &mut self.slots[index];
                let was_playing = slot.playing;
                slot.playing = false;
                slot.done = true;
                if !self.slots.iter().any(|slot| slot.playing) {
                    self.playing_both = false;
                }
                if was_playing {
                    vec![MediaCommand::Pause { slot: index }]
                } else {
                    Vec::new()
                }
            }
        }
    }

    fn stop_all(&mut self) -> Vec<MediaCommand> {
        let mut commands = Vec::new();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.has_video() {
                commands.push(MediaCommand::Pause { slot: index });
            }
            slot.playing = false;
            slot.done = false;
        }
        self.playing_both = false;
        commands
    }
}

fn check(index: usize) -> Result<(), PlayerError> {
    if index < SLOT_COUNT {
        Ok(())
    } else {
        Err(PlayerError::InvalidSlot(index))
    }
}
