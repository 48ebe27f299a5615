//! Fighter state, movement physics and the attack/recovery state machine

use serde::{Deserialize, Serialize};

use super::hitbox::{AttackKind, AttackStats, AttackVolume, HurtVolume, HurtboxModel, Rect};
use super::input::{Actions, ControlBinding};
use super::{Facing, PlayerSlot};

/// Arena and body dimensions (screen space, y grows downward)
pub const ARENA_WIDTH: f32 = 1000.0;
pub const ARENA_HEIGHT: f32 = 600.0;
pub const FLOOR_Y: f32 = ARENA_HEIGHT - 50.0;
pub const FIGHTER_WIDTH: f32 = 150.0;
pub const FIGHTER_HEIGHT: f32 = 200.0;

pub const MAX_HEALTH: u32 = 100;

// Movement, tuned per 60 Hz tick
pub const MOVE_SPEED: f32 = 6.0;
pub const JUMP_VELOCITY: f32 = -20.0;
pub const GRAVITY: f32 = 1.0;

// Timing
pub const RECOVERY_TICKS: u32 = 20; // post-attack stiffness
pub const HIT_STUN_TICKS: u32 = 15;

// Knockback
pub const KNOCKBACK_COEFFICIENT: f32 = 0.8;
pub const KNOCKBACK_DECAY: f32 = 0.85;
pub const KNOCKBACK_EPSILON: f32 = 0.5;

/// Start marks (left edge of the fighter)
pub const P1_START_X: f32 = 200.0;
pub const P2_START_X: f32 = 700.0;

/// Fighter action state, derived from the two timers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "kind", rename_all = "snake_case")]
pub enum FighterState {
    Idle,
    Attacking(AttackKind),
    Recovering,
}

/// Sprite pose for the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pose {
    Idle,
    Punch,
    Kick,
    /// Recovering from a hit rather than from an own attack
    Stunned,
}

/// One combatant. Created once per process and reset between rounds.
#[derive(Debug, Clone)]
pub struct Fighter {
    pub slot: PlayerSlot,
    binding: ControlBinding,
    start_x: f32,
    start_facing: Facing,

    // Position (bottom-left anchor) and movement
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub on_ground: bool,
    pub facing: Facing,

    // Combat
    pub health: u32,
    pub attack_timer: u32,
    pub recover_timer: u32,
    pub knockback_vx: f32,
    /// Move being performed or recovered from, cleared by a hit or on idle
    current_attack: Option<AttackKind>,
}

impl Fighter {
    pub fn new(slot: PlayerSlot, start_x: f32, facing: Facing, binding: ControlBinding) -> Self {
        Self {
            slot,
            binding,
            start_x,
            start_facing: facing,
            x: start_x,
            y: FLOOR_Y,
            vx: 0.0,
            vy: 0.0,
            on_ground: true,
            facing,
            health: MAX_HEALTH,
            attack_timer: 0,
            recover_timer: 0,
            knockback_vx: 0.0,
            current_attack: None,
        }
    }

    /// The default fighter for a slot: start mark, facing and key layout
    pub fn for_slot(slot: PlayerSlot) -> Self {
        match slot {
            PlayerSlot::P1 => Self::new(slot, P1_START_X, Facing::Right, ControlBinding::player_one()),
            PlayerSlot::P2 => Self::new(slot, P2_START_X, Facing::Left, ControlBinding::player_two()),
        }
    }

    pub fn binding(&self) -> &ControlBinding {
        &self.binding
    }

    /// Put the fighter back on its start mark with full health
    pub fn reset(&mut self) {
        self.x = self.start_x;
        self.y = FLOOR_Y;
        self.vx = 0.0;
        self.vy = 0.0;
        self.on_ground = true;
        self.facing = self.start_facing;
        self.health = MAX_HEALTH;
        self.attack_timer = 0;
        self.recover_timer = 0;
        self.knockback_vx = 0.0;
        self.current_attack = None;
    }

    pub fn state(&self) -> FighterState {
        if self.attack_timer > 0 {
            FighterState::Attacking(self.current_attack.unwrap_or(AttackKind::Punch))
        } else if self.recover_timer > 0 {
            FighterState::Recovering
        } else {
            FighterState::Idle
        }
    }

    /// Free to move, jump or start an attack
    pub fn can_act(&self) -> bool {
        self.attack_timer == 0 && self.recover_timer == 0
    }

    pub fn is_down(&self) -> bool {
        self.health == 0
    }

    pub fn pose(&self) -> Pose {
        match (self.state(), self.current_attack) {
            (FighterState::Idle, _) => Pose::Idle,
            (_, Some(AttackKind::Punch)) => Pose::Punch,
            (_, Some(AttackKind::Kick)) => Pose::Kick,
            (_, None) => Pose::Stunned,
        }
    }

    /// Current body rectangle
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y - FIGHTER_HEIGHT, FIGHTER_WIDTH, FIGHTER_HEIGHT)
    }

    /// Advance one tick: input, action timers, gravity, integration, knockback decay
    pub fn update(&mut self, actions: &Actions) {
        self.vx = 0.0;

        if self.can_act() {
            if actions.left {
                self.vx = -MOVE_SPEED;
                self.facing = Facing::Left;
            }
            if actions.right {
                self.vx = MOVE_SPEED;
                self.facing = Facing::Right;
            }
            if actions.jump && self.on_ground {
                self.vy = JUMP_VELOCITY;
                self.on_ground = false;
            }
        }

        self.advance_timers();

        // Gravity and integration
        self.vy += GRAVITY;
        self.x = (self.x + self.vx + self.knockback_vx).clamp(0.0, ARENA_WIDTH - FIGHTER_WIDTH);
        self.y += self.vy;

        if self.y >= FLOOR_Y {
            self.y = FLOOR_Y;
            self.vy = 0.0;
            self.on_ground = true;
        } else {
            self.on_ground = false;
        }

        self.decay_knockback();
    }

    fn advance_timers(&mut self) {
        if self.attack_timer > 0 {
            self.attack_timer -= 1;
            if self.attack_timer == 0 {
                self.recover_timer = RECOVERY_TICKS;
            }
        } else if self.recover_timer > 0 {
            self.recover_timer -= 1;
            if self.recover_timer == 0 {
                self.current_attack = None;
            }
        }
    }

    fn decay_knockback(&mut self) {
        if self.knockback_vx != 0.0 {
            self.knockback_vx *= KNOCKBACK_DECAY;
            if self.knockback_vx.abs() < KNOCKBACK_EPSILON {
                self.knockback_vx = 0.0;
            }
        }
    }

    /// Start an attack if free to act. Returns the spawned volume.
    pub fn try_attack(&mut self, kind: AttackKind, volume_id: u64) -> Option<AttackVolume> {
        if !self.can_act() {
            return None;
        }

        self.attack_timer = AttackStats::for_kind(kind).duration;
        self.current_attack = Some(kind);

        Some(AttackVolume::spawn(volume_id, self.slot, kind, &self.bounds(), self.facing))
    }

    /// Apply a landed hit: damage, knockback impulse and hit stun.
    /// Any move in progress is interrupted so only the stun timer runs.
    pub fn take_hit(&mut self, damage: u32, attacker_facing: Facing) {
        self.health = self.health.saturating_sub(damage);
        self.knockback_vx += attacker_facing.sign() * damage as f32 * KNOCKBACK_COEFFICIENT;
        self.attack_timer = 0;
        self.recover_timer = HIT_STUN_TICKS;
        self.current_attack = None;
    }

    /// Hurt volumes under the given model
    pub fn hurt_volumes(&self, model: HurtboxModel) -> Vec<HurtVolume> {
        let bounds = self.bounds();
        let mut volumes = vec![HurtVolume::body(self.slot, &bounds)];

        if model == HurtboxModel::BodyAndLimb {
            if let FighterState::Attacking(kind) = self.state() {
                volumes.push(HurtVolume::limb(self.slot, kind, &bounds, self.facing));
            }
        }

        volumes
    }
}
