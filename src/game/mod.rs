//! Game simulation modules

pub mod combat;
pub mod fighter;
pub mod hitbox;
pub mod input;
pub mod r#match;
pub mod menu;
pub mod session;
pub mod snapshot;
pub mod stage;

pub use r#match::{MatchController, MatchPhase, MatchRules, TickReport};
pub use session::GameSession;

use serde::{Deserialize, Serialize};

/// Player slot. Fighters are identified by slot; volumes refer to their
/// owner through it instead of holding a reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerSlot {
    P1,
    P2,
}

impl PlayerSlot {
    pub const ALL: [PlayerSlot; 2] = [PlayerSlot::P1, PlayerSlot::P2];
}

/// Horizontal facing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    /// -1.0 for Left, 1.0 for Right
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }
}
