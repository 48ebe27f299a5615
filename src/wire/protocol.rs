//! Wire protocol message definitions
//! JSON lines exchanged with the frontend: input on stdin, output on stdout

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audio::MusicRequest;
use crate::game::combat::HitResult;
use crate::game::hitbox::AttackKind;
use crate::game::input::{KeyCode, PointerEvent};
use crate::game::r#match::{MatchPhase, RoundResult, Scores};
use crate::game::snapshot::Snapshot;
use crate::game::PlayerSlot;

/// Messages read from the frontend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputMsg {
    /// Physical key went down
    KeyDown { key: KeyCode },

    /// Physical key went up
    KeyUp { key: KeyCode },

    /// Menu entry clicked, by position in the menu on screen
    Select { index: usize },

    /// Volume bar clicked, as a fraction of the bar width
    SetVolume { value: f32 },

    /// HUD pause button clicked
    Pause,

    /// Settings back button clicked
    Back,

    /// Window closed
    Quit,
}

impl InputMsg {
    /// Pointer action carried by this message, if any
    pub fn pointer(&self) -> Option<PointerEvent> {
        match *self {
            InputMsg::Select { index } => Some(PointerEvent::Select(index)),
            InputMsg::SetVolume { value } => Some(PointerEvent::SetVolume(value)),
            InputMsg::Pause => Some(PointerEvent::Pause),
            InputMsg::Back => Some(PointerEvent::Back),
            InputMsg::KeyDown { .. } | InputMsg::KeyUp { .. } | InputMsg::Quit => None,
        }
    }
}

/// Messages written to the frontend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputMsg {
    /// First message of a session
    Hello {
        session_id: Uuid,
        started_at: u64,
        tick_rate: u32,
    },

    /// Render state (sent at regular intervals and on phase changes)
    Snapshot(Box<Snapshot>),

    /// Events produced during one tick
    Events { tick: u64, events: Vec<GameEvent> },

    /// Background music request
    Music(MusicRequest),

    /// Last message before exit
    Goodbye { scores: Scores },
}

/// Simulation events (phase changes, attacks, hits, round results)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum GameEvent {
    PhaseChanged { from: MatchPhase, to: MatchPhase },

    AttackStarted { slot: PlayerSlot, kind: AttackKind },

    Hit(HitResult),

    RoundOver(RoundResult),
}
