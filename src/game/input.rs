//! Keyboard state, control bindings and menu event derivation

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Physical key code as reported by the frontend (e.g. "a", "left", "return")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct KeyCode(String);

impl KeyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for KeyCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl From<String> for KeyCode {
    fn from(code: String) -> Self {
        Self::new(code)
    }
}

impl From<KeyCode> for String {
    fn from(code: KeyCode) -> Self {
        code.0
    }
}

/// Keyboard snapshot for one tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyboardState {
    /// Keys currently held down
    pub held: HashSet<KeyCode>,
    /// Keys that went down since the previous tick (press edges)
    pub pressed: HashSet<KeyCode>,
}

impl KeyboardState {
    pub fn is_held(&self, key: &KeyCode) -> bool {
        self.held.contains(key)
    }

    pub fn was_pressed(&self, key: &KeyCode) -> bool {
        self.pressed.contains(key)
    }

    /// Build a state directly (tests and scripted frontends)
    pub fn from_keys(held: &[&str], pressed: &[&str]) -> Self {
        let pressed: HashSet<KeyCode> = pressed.iter().map(|k| KeyCode::new(*k)).collect();
        let mut held: HashSet<KeyCode> = held.iter().map(|k| KeyCode::new(*k)).collect();
        // A press always implies the key is down this tick
        held.extend(pressed.iter().cloned());
        Self { held, pressed }
    }
}

/// Accumulates key events between ticks.
///
/// Press edges survive until the next `take_frame`, so a key that goes down
/// and up again within one tick still registers as pressed.
#[derive(Debug, Default)]
pub struct InputTracker {
    held: HashSet<KeyCode>,
    pressed: HashSet<KeyCode>,
}

impl InputTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, key: KeyCode) {
        // Auto-repeat downs are not new edges
        if self.held.insert(key.clone()) {
            self.pressed.insert(key);
        }
    }

    pub fn key_up(&mut self, key: &KeyCode) {
        self.held.remove(key);
    }

    /// Snapshot the keyboard for this tick and clear the press edges
    pub fn take_frame(&mut self) -> KeyboardState {
        KeyboardState {
            held: self.held.clone(),
            pressed: std::mem::take(&mut self.pressed),
        }
    }
}

/// Logical fighter actions resolved from the keyboard for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Actions {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    /// Punch key went down this tick
    pub punch: bool,
    /// Kick key went down this tick
    pub kick: bool,
}

/// Maps logical actions to physical keys for one fighter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlBinding {
    pub left: KeyCode,
    pub right: KeyCode,
    pub jump: KeyCode,
    pub punch: KeyCode,
    pub kick: KeyCode,
}

impl ControlBinding {
    /// A / D move, W jump, C punch, V kick
    pub fn player_one() -> Self {
        Self {
            left: "a".into(),
            right: "d".into(),
            jump: "w".into(),
            punch: "c".into(),
            kick: "v".into(),
        }
    }

    /// Arrow keys move and jump, period punch, slash kick
    pub fn player_two() -> Self {
        Self {
            left: "left".into(),
            right: "right".into(),
            jump: "up".into(),
            punch: "period".into(),
            kick: "slash".into(),
        }
    }

    /// Movement reads held keys, attacks read press edges only
    pub fn resolve(&self, keyboard: &KeyboardState) -> Actions {
        Actions {
            left: keyboard.is_held(&self.left),
            right: keyboard.is_held(&self.right),
            jump: keyboard.is_held(&self.jump),
            punch: keyboard.was_pressed(&self.punch),
            kick: keyboard.was_pressed(&self.kick),
        }
    }

    /// Control legend shown in the battle HUD
    pub fn legend(&self) -> String {
        format!(
            "{}/{} Move  {} Jump  {} Punch  {} Kick",
            self.left.as_str(),
            self.right.as_str(),
            self.jump.as_str(),
            self.punch.as_str(),
            self.kick.as_str()
        )
    }
}

/// Discrete menu navigation events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuEvent {
    Up,
    Down,
    Left,
    Right,
    Confirm,
    /// Escape: pauses a battle, leaves settings
    Back,
    /// Shortcut that resumes from the pause menu
    Continue,
}

/// Pointer-driven menu actions. The frontend hit-tests its own widgets and
/// reports what was clicked.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "pointer", content = "value", rename_all = "snake_case")]
pub enum PointerEvent {
    /// Entry `index` of the menu on screen
    Select(usize),
    /// Volume bar clicked at this fraction of its width
    SetVolume(f32),
    /// HUD pause button
    Pause,
    /// Settings back button
    Back,
}

/// Menu key layout
#[derive(Debug, Clone)]
pub struct MenuKeys {
    bindings: Vec<(KeyCode, MenuEvent)>,
}

impl MenuKeys {
    /// Events for every menu key pressed this tick, in binding order
    pub fn events(&self, keyboard: &KeyboardState) -> Vec<MenuEvent> {
        self.bindings
            .iter()
            .filter(|(key, _)| keyboard.was_pressed(key))
            .map(|(_, event)| *event)
            .collect()
    }
}

impl Default for MenuKeys {
    fn default() -> Self {
        Self {
            bindings: vec![
                ("up".into(), MenuEvent::Up),
                ("down".into(), MenuEvent::Down),
                ("left".into(), MenuEvent::Left),
                ("right".into(), MenuEvent::Right),
                ("return".into(), MenuEvent::Confirm),
                ("escape".into(), MenuEvent::Back),
                ("space".into(), MenuEvent::Continue),
            ],
        }
    }
}

/// Everything the match controller consumes in one tick
#[derive(Debug, Clone, Default)]
pub struct InputFrame {
    pub keyboard: KeyboardState,
    pub menu: Vec<MenuEvent>,
    /// Applied after the key-driven menu events
    pub pointer: Vec<PointerEvent>,
}

impl InputFrame {
    pub fn new(keyboard: KeyboardState, menu_keys: &MenuKeys) -> Self {
        let menu = menu_keys.events(&keyboard);
        Self {
            keyboard,
            menu,
            pointer: Vec::new(),
        }
    }

    /// Frame with no keys and no menu events
    pub fn idle() -> Self {
        Self::default()
    }

    /// Frame carrying only menu events
    pub fn with_menu(events: impl IntoIterator<Item = MenuEvent>) -> Self {
        Self {
            menu: events.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Frame carrying only pointer events
    pub fn with_pointer(events: impl IntoIterator<Item = PointerEvent>) -> Self {
        Self {
            pointer: events.into_iter().collect(),
            ..Self::default()
        }
    }
}
