//! Background music direction
//!
//! The simulation only emits cues. The director turns them into track
//! requests for the frontend's sound layer. A missing track is logged and
//! otherwise ignored: audio never affects the simulation.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::util::assets::check_file;

/// Discrete audio cues emitted by the match controller
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cue", content = "value", rename_all = "snake_case")]
pub enum AudioCue {
    EnteredBattle,
    EnteredSelect,
    VolumeChanged(f32),
}

/// Which loop is playing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Track {
    Menu,
    Battle,
}

/// A request for the frontend's sound layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MusicRequest {
    pub track: Track,
    /// Track file, `None` when it could not be found
    pub path: Option<String>,
    pub volume: f32,
    /// Loop forever
    pub looped: bool,
}

pub struct MusicDirector {
    menu_path: String,
    battle_path: String,
    current: Track,
    volume: f32,
}

impl MusicDirector {
    pub fn new(menu_path: impl Into<String>, battle_path: impl Into<String>, volume: f32) -> Self {
        Self {
            menu_path: menu_path.into(),
            battle_path: battle_path.into(),
            current: Track::Menu,
            volume: volume.clamp(0.0, 1.0),
        }
    }

    pub fn current(&self) -> Track {
        self.current
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Menu music at launch
    pub fn start(&mut self) -> MusicRequest {
        self.play(Track::Menu)
    }

    /// Translate a cue into a request
    pub fn handle(&mut self, cue: AudioCue) -> MusicRequest {
        match cue {
            AudioCue::EnteredBattle => self.play(Track::Battle),
            AudioCue::EnteredSelect => self.play(Track::Menu),
            AudioCue::VolumeChanged(volume) => {
                self.volume = volume.clamp(0.0, 1.0);
                debug!(volume = self.volume, "Music volume changed");
                self.request(self.current)
            }
        }
    }

    fn play(&mut self, track: Track) -> MusicRequest {
        self.current = track;
        debug!(track = ?track, "Switching music");
        self.request(track)
    }

    fn request(&self, track: Track) -> MusicRequest {
        let path = match track {
            Track::Menu => &self.menu_path,
            Track::Battle => &self.battle_path,
        };

        let path = match check_file(path) {
            Ok(()) => Some(path.clone()),
            Err(e) => {
                warn!(track = ?track, error = %e, "Music unavailable, continuing without it");
                None
            }
        };

        MusicRequest {
            track,
            path,
            volume: self.volume,
            looped: true,
        }
    }
}
