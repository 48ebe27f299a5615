//! Snapshot building for the render collaborator

use serde::{Deserialize, Serialize};

use crate::wire::protocol::OutputMsg;

use super::fighter::{Fighter, FighterState, Pose};
use super::hitbox::{AttackKind, HurtVolume, Rect};
use super::menu::PauseOption;
use super::r#match::{MatchController, MatchPhase, RoundResult, Scores};
use super::{Facing, PlayerSlot};

/// Clock at or below this many whole seconds blinks in the HUD
pub const LOW_TIME_SECS: u32 = 30;

/// Fighter as the renderer sees it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FighterView {
    pub slot: PlayerSlot,
    /// Bottom-left anchor
    pub x: f32,
    pub y: f32,
    pub facing: Facing,
    pub pose: Pose,
    pub state: FighterState,
    pub health: u32,
    pub on_ground: bool,
    /// Control legend for the HUD strip
    pub controls: String,
}

impl FighterView {
    fn from_fighter(fighter: &Fighter) -> Self {
        Self {
            slot: fighter.slot,
            x: fighter.x,
            y: fighter.y,
            facing: fighter.facing,
            pose: fighter.pose(),
            state: fighter.state(),
            health: fighter.health,
            on_ground: fighter.on_ground,
            controls: fighter.binding().legend(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackView {
    pub owner: PlayerSlot,
    pub kind: AttackKind,
    pub bounds: Rect,
}

/// Match clock as shown in the HUD
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockView {
    pub seconds: u32,
    /// Low on time and on an even second (blink phase)
    pub warning: bool,
}

impl ClockView {
    pub fn from_seconds(clock: f32) -> Self {
        let seconds = clock.max(0.0) as u32;
        Self {
            seconds,
            warning: seconds <= LOW_TIME_SECS && seconds % 2 == 0,
        }
    }
}

/// Everything drawn during a battle frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleView {
    pub stage: usize,
    pub clock: ClockView,
    pub fighters: Vec<FighterView>,
    pub attacks: Vec<AttackView>,
    pub hurtboxes: Vec<HurtVolume>,
}

impl BattleView {
    pub fn capture(controller: &MatchController) -> Self {
        Self {
            stage: controller.selected_stage(),
            clock: ClockView::from_seconds(controller.clock()),
            fighters: controller.fighters().iter().map(FighterView::from_fighter).collect(),
            attacks: controller
                .attacks()
                .iter()
                .map(|a| AttackView {
                    owner: a.owner,
                    kind: a.kind,
                    bounds: a.bounds,
                })
                .collect(),
            hurtboxes: controller.hurt_volumes().to_vec(),
        }
    }
}

/// Menu state for the current phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "menu", rename_all = "snake_case")]
pub enum MenuView {
    None,
    StageSelect {
        stages: Vec<String>,
        /// Index into `stages`; equal to its length when "Quit" is highlighted
        highlighted: usize,
    },
    Pause {
        options: Vec<PauseOption>,
        highlighted: PauseOption,
    },
    Settings {
        volume: f32,
    },
}

/// Full render snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: u64,
    pub phase: MatchPhase,
    pub scores: Scores,
    pub volume: f32,
    /// Live battle frame while in Battle
    pub battle: Option<BattleView>,
    /// Frozen battle frame behind the pause and settings menus
    pub backdrop: Option<BattleView>,
    pub menu: MenuView,
    /// Result currently on display
    pub round_result: Option<RoundResult>,
}

impl Snapshot {
    pub fn capture(controller: &MatchController) -> Self {
        let phase = controller.phase();
        let menu = match phase {
            MatchPhase::Title | MatchPhase::Battle => MenuView::None,
            MatchPhase::Select => MenuView::StageSelect {
                stages: controller.stages().iter().map(|s| s.name.clone()).collect(),
                highlighted: controller.stage_select().highlighted(),
            },
            MatchPhase::Paused => MenuView::Pause {
                options: PauseOption::ALL.to_vec(),
                highlighted: controller.pause_menu().highlighted(),
            },
            MatchPhase::Settings => MenuView::Settings {
                volume: controller.volume(),
            },
        };

        Self {
            tick: controller.tick_count(),
            phase,
            scores: controller.scores(),
            volume: controller.volume(),
            battle: (phase == MatchPhase::Battle).then(|| BattleView::capture(controller)),
            backdrop: controller.backdrop().cloned(),
            menu,
            round_result: controller.round_result(),
        }
    }
}

/// Decides when to publish snapshots
pub struct SnapshotBuilder {
    /// Tick counter since last snapshot
    ticks_since_snapshot: u32,
    /// Snapshot interval in ticks
    snapshot_interval: u32,
}

impl SnapshotBuilder {
    pub fn new(snapshot_interval: u32) -> Self {
        let snapshot_interval = snapshot_interval.max(1);
        Self {
            // First check always publishes
            ticks_since_snapshot: snapshot_interval - 1,
            snapshot_interval,
        }
    }

    /// Check if it's time to send a snapshot
    pub fn should_send(&mut self) -> bool {
        self.ticks_since_snapshot += 1;
        if self.ticks_since_snapshot >= self.snapshot_interval {
            self.ticks_since_snapshot = 0;
            true
        } else {
            false
        }
    }

    /// Force snapshot on next check (used for phase changes and round results)
    pub fn force_next(&mut self) {
        self.ticks_since_snapshot = self.snapshot_interval;
    }

    /// Build a snapshot message
    pub fn build(&self, controller: &MatchController) -> OutputMsg {
        OutputMsg::Snapshot(Box::new(Snapshot::capture(controller)))
    }
}
