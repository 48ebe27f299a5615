//! Menu cursors: stage select, pause menu, settings

use serde::{Deserialize, Serialize};

use super::input::MenuEvent;

/// Wrapping cursor over `len` entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuCursor {
    selected: usize,
    len: usize,
}

impl MenuCursor {
    pub fn new(len: usize) -> Self {
        Self {
            selected: 0,
            len: len.max(1),
        }
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn up(&mut self) {
        self.selected = (self.selected + self.len - 1) % self.len;
    }

    pub fn down(&mut self) {
        self.selected = (self.selected + 1) % self.len;
    }

    pub fn reset(&mut self) {
        self.selected = 0;
    }

    /// Jump straight to `index`. Out-of-range indices leave the cursor alone.
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.len {
            return false;
        }
        self.selected = index;
        true
    }
}

/// Outcome of a stage-select confirm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectChoice {
    Stage(usize),
    Quit,
}

/// Stage list followed by a trailing "Quit" entry
#[derive(Debug, Clone)]
pub struct StageSelect {
    cursor: MenuCursor,
    stage_count: usize,
}

impl StageSelect {
    pub fn new(stage_count: usize) -> Self {
        Self {
            cursor: MenuCursor::new(stage_count + 1),
            stage_count,
        }
    }

    pub fn highlighted(&self) -> usize {
        self.cursor.selected()
    }

    pub fn handle(&mut self, event: MenuEvent) -> Option<SelectChoice> {
        match event {
            MenuEvent::Up => self.cursor.up(),
            MenuEvent::Down => self.cursor.down(),
            MenuEvent::Confirm if self.highlighted() == self.stage_count => {
                return Some(SelectChoice::Quit)
            }
            MenuEvent::Confirm => return Some(SelectChoice::Stage(self.highlighted())),
            _ => {}
        }
        None
    }

    /// Entry clicked directly
    pub fn select(&mut self, index: usize) -> Option<SelectChoice> {
        if !self.cursor.select(index) {
            return None;
        }
        if index == self.stage_count {
            Some(SelectChoice::Quit)
        } else {
            Some(SelectChoice::Stage(index))
        }
    }
}

/// Pause menu options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PauseOption {
    Continue,
    Settings,
    Quit,
}

impl PauseOption {
    pub const ALL: [PauseOption; 3] = [PauseOption::Continue, PauseOption::Settings, PauseOption::Quit];
}

#[derive(Debug, Clone)]
pub struct PauseMenu {
    cursor: MenuCursor,
}

impl PauseMenu {
    pub fn new() -> Self {
        Self {
            cursor: MenuCursor::new(PauseOption::ALL.len()),
        }
    }

    pub fn highlighted(&self) -> PauseOption {
        PauseOption::ALL[self.cursor.selected()]
    }

    /// Cursor starts on "Continue" every time the menu opens
    pub fn open(&mut self) {
        self.cursor.reset();
    }

    pub fn handle(&mut self, event: MenuEvent) -> Option<PauseOption> {
        match event {
            MenuEvent::Up => self.cursor.up(),
            MenuEvent::Down => self.cursor.down(),
            MenuEvent::Confirm => return Some(self.highlighted()),
            MenuEvent::Continue => return Some(PauseOption::Continue),
            _ => {}
        }
        None
    }

    /// Option clicked directly
    pub fn select(&mut self, index: usize) -> Option<PauseOption> {
        self.cursor.select(index).then(|| self.highlighted())
    }
}

impl Default for PauseMenu {
    fn default() -> Self {
        Self::new()
    }
}

pub const VOLUME_STEP: f32 = 0.05;

/// Result of a settings input
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SettingsAction {
    VolumeChanged(f32),
    Back,
}

/// Settings screen (music volume)
#[derive(Debug, Clone)]
pub struct Settings {
    volume: f32,
}

impl Settings {
    pub fn new(volume: f32) -> Self {
        Self {
            volume: volume.clamp(0.0, 1.0),
        }
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn handle(&mut self, event: MenuEvent) -> Option<SettingsAction> {
        match event {
            MenuEvent::Left => self.nudge(-VOLUME_STEP),
            MenuEvent::Right => self.nudge(VOLUME_STEP),
            MenuEvent::Back | MenuEvent::Confirm => Some(SettingsAction::Back),
            _ => None,
        }
    }

    /// Absolute volume from the volume bar, clamped to `[0, 1]`
    pub fn set_volume(&mut self, volume: f32) -> Option<SettingsAction> {
        if !volume.is_finite() {
            return None;
        }
        let volume = volume.clamp(0.0, 1.0);
        if volume == self.volume {
            return None;
        }
        self.volume = volume;
        Some(SettingsAction::VolumeChanged(volume))
    }

    fn nudge(&mut self, delta: f32) -> Option<SettingsAction> {
        // Snap to whole steps so repeated nudges don't drift
        let steps = ((self.volume + delta) / VOLUME_STEP).round();
        let volume = (steps * VOLUME_STEP).clamp(0.0, 1.0);
        if volume == self.volume {
            return None;
        }
        self.volume = volume;
        Some(SettingsAction::VolumeChanged(volume))
    }
}
