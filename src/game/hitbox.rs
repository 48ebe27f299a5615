//! Attack and hurt volumes - axis-aligned geometry for hit detection

use serde::{Deserialize, Serialize};

use super::{Facing, PlayerSlot};

/// Axis-aligned rectangle in screen space (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.w / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.h / 2.0
    }

    /// Strict overlap: rectangles that only share an edge do not collide
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// Rectangle of size `w x h` placed just ahead of `self` in the facing
    /// direction, `gap` pixels away, vertically centered at `center_y`.
    fn ahead(&self, facing: Facing, gap: f32, w: f32, h: f32, center_y: f32) -> Rect {
        let x = match facing {
            Facing::Right => self.right() + gap,
            Facing::Left => self.left() - gap - w,
        };
        Rect::new(x, center_y - h / 2.0, w, h)
    }
}

/// Attack kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackKind {
    /// Short, fast, light
    Punch,
    /// Long, slow, heavy
    Kick,
}

/// Attack stats per kind
#[derive(Debug, Clone, Copy)]
pub struct AttackStats {
    /// Ticks the attacker is committed to the move
    pub duration: u32,
    /// Attack volume size
    pub width: f32,
    pub height: f32,
    /// Ticks the attack volume stays live
    pub life: u32,
    /// Health removed on hit
    pub damage: u32,
    /// Vertical offset of the volume center from the attacker's center
    pub offset_y: f32,
    /// Exposed limb size while the move is out
    pub limb_width: f32,
    pub limb_height: f32,
}

impl AttackStats {
    pub fn for_kind(kind: AttackKind) -> Self {
        match kind {
            AttackKind::Punch => Self {
                duration: 12,
                width: 40.0,
                height: 20.0,
                life: 8,
                damage: 5,
                offset_y: -10.0,
                limb_width: 60.0,
                limb_height: 30.0,
            },
            AttackKind::Kick => Self {
                duration: 16,
                width: 60.0,
                height: 25.0,
                life: 10,
                damage: 8,
                offset_y: 30.0,
                limb_width: 80.0,
                limb_height: 40.0,
            },
        }
    }
}

/// Gap between the attacker's leading edge and a fresh attack volume
pub const ATTACK_GAP: f32 = 10.0;

/// Body hurtbox size, centered on the fighter and resting on its bottom edge
pub const BODY_WIDTH: f32 = 80.0;
pub const BODY_HEIGHT: f32 = 180.0;

/// Live attack volume. Frozen in world space once spawned.
#[derive(Debug, Clone, PartialEq)]
pub struct AttackVolume {
    pub id: u64,
    pub owner: PlayerSlot,
    pub kind: AttackKind,
    pub bounds: Rect,
    pub remaining_life: u32,
    pub damage: u32,
    /// Facing of the attacker at spawn, decides the knockback direction
    pub facing: Facing,
}

impl AttackVolume {
    /// Spawn a volume ahead of an attacker occupying `attacker`
    pub fn spawn(
        id: u64,
        owner: PlayerSlot,
        kind: AttackKind,
        attacker: &Rect,
        facing: Facing,
    ) -> Self {
        let stats = AttackStats::for_kind(kind);
        let bounds = attacker.ahead(
            facing,
            ATTACK_GAP,
            stats.width,
            stats.height,
            attacker.center_y() + stats.offset_y,
        );

        Self {
            id,
            owner,
            kind,
            bounds,
            remaining_life: stats.life,
            damage: stats.damage,
            facing,
        }
    }

    /// Age by one tick, returns false once expired
    pub fn age(&mut self) -> bool {
        self.remaining_life = self.remaining_life.saturating_sub(1);
        self.remaining_life > 0
    }
}

/// Hurtbox model shared by both fighters for the whole process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HurtboxModel {
    /// Only the persistent body box
    Body,
    /// Body box plus an exposed limb box while attacking
    #[default]
    BodyAndLimb,
}

/// Which part of the fighter a hurt volume covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "region", content = "kind", rename_all = "snake_case")]
pub enum HurtRegion {
    Body,
    Limb(AttackKind),
}

/// Vulnerable region, re-anchored to its owner every tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HurtVolume {
    pub owner: PlayerSlot,
    pub region: HurtRegion,
    pub bounds: Rect,
}

impl HurtVolume {
    pub fn body(owner: PlayerSlot, fighter: &Rect) -> Self {
        Self {
            owner,
            region: HurtRegion::Body,
            bounds: Rect::new(
                fighter.center_x() - BODY_WIDTH / 2.0,
                fighter.bottom() - BODY_HEIGHT,
                BODY_WIDTH,
                BODY_HEIGHT,
            ),
        }
    }

    pub fn limb(owner: PlayerSlot, kind: AttackKind, fighter: &Rect, facing: Facing) -> Self {
        let stats = AttackStats::for_kind(kind);
        Self {
            owner,
            region: HurtRegion::Limb(kind),
            bounds: fighter.ahead(
                facing,
                0.0,
                stats.limb_width,
                stats.limb_height,
                fighter.center_y() + stats.offset_y,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fighter_at(x: f32) -> Rect {
        // 150x200 fighter standing on y = 550
        Rect::new(x, 350.0, 150.0, 200.0)
    }

    #[test]
    fn touching_edges_do_not_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&Rect::new(9.5, 9.5, 10.0, 10.0)));
    }

    #[test]
    fn punch_volume_sits_ahead_of_attacker() {
        let vol = AttackVolume::spawn(1, PlayerSlot::P1, AttackKind::Punch, &fighter_at(200.0), Facing::Right);
        assert_eq!(vol.bounds, Rect::new(360.0, 430.0, 40.0, 20.0));
        assert_eq!(vol.remaining_life, 8);
        assert_eq!(vol.damage, 5);
    }

    #[test]
    fn kick_volume_mirrors_when_facing_left() {
        let vol = AttackVolume::spawn(1, PlayerSlot::P2, AttackKind::Kick, &fighter_at(700.0), Facing::Left);
        assert_eq!(vol.bounds.right(), 690.0);
        assert_eq!(vol.bounds.w, 60.0);
        assert_eq!(vol.bounds.center_y(), 480.0);
        assert_eq!(vol.damage, 8);
    }

    #[test]
    fn volume_expires_after_its_life() {
        let mut vol = AttackVolume::spawn(1, PlayerSlot::P1, AttackKind::Punch, &fighter_at(0.0), Facing::Right);
        let live_ticks = std::iter::from_fn(|| Some(vol.age())).take_while(|alive| *alive).count();
        assert_eq!(live_ticks, 7);
        assert_eq!(vol.remaining_life, 0);
    }

    #[test]
    fn body_is_centered_and_grounded() {
        let body = HurtVolume::body(PlayerSlot::P2, &fighter_at(300.0));
        assert_eq!(body.bounds, Rect::new(335.0, 370.0, 80.0, 180.0));
        assert_eq!(body.region, HurtRegion::Body);
    }

    #[test]
    fn limb_is_flush_with_leading_edge() {
        let limb = HurtVolume::limb(PlayerSlot::P1, AttackKind::Kick, &fighter_at(200.0), Facing::Right);
        assert_eq!(limb.bounds.left(), 350.0);
        assert_eq!(limb.bounds.w, 80.0);

        let limb = HurtVolume::limb(PlayerSlot::P1, AttackKind::Punch, &fighter_at(200.0), Facing::Left);
        assert_eq!(limb.bounds.right(), 200.0);
        assert_eq!(limb.region, HurtRegion::Limb(AttackKind::Punch));
    }
}
