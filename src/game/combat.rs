//! Combat resolution - attack volume aging, hit detection, damage and knockback

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::fighter::Fighter;
use super::hitbox::{AttackKind, AttackVolume, HurtRegion, HurtVolume, HurtboxModel};
use super::PlayerSlot;

/// Hit result from combat resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitResult {
    pub volume_id: u64,
    pub attacker: PlayerSlot,
    pub defender: PlayerSlot,
    pub kind: AttackKind,
    pub region: HurtRegion,
    pub damage: u32,
    /// Defender health after the hit
    pub defender_health: u32,
    pub knocked_out: bool,
}

/// Resolves attack volumes against hurt volumes once per tick
pub struct CombatResolver;

impl CombatResolver {
    /// Age every volume by one tick and drop the expired ones
    pub fn age_volumes(attacks: &mut Vec<AttackVolume>) {
        attacks.retain_mut(|volume| volume.age());
    }

    /// Hurt volumes of every fighter, in fighter order
    pub fn hurt_volumes(fighters: &[Fighter], model: HurtboxModel) -> Vec<HurtVolume> {
        fighters
            .iter()
            .flat_map(|fighter| fighter.hurt_volumes(model))
            .collect()
    }

    /// Find the first overlap and apply it. At most one hit lands per call;
    /// the consumed volume is removed.
    pub fn resolve(
        fighters: &mut [Fighter],
        attacks: &mut Vec<AttackVolume>,
        hurtboxes: &[HurtVolume],
    ) -> Option<HitResult> {
        // Volumes whose owner is not in play cannot hit anything
        attacks.retain(|volume| {
            let owned = fighters.iter().any(|f| f.slot == volume.owner);
            if !owned {
                warn!(volume_id = volume.id, owner = ?volume.owner, "Dropping attack volume with no owner");
            }
            owned
        });

        let (index, hurt) = attacks.iter().enumerate().find_map(|(idx, volume)| {
            hurtboxes
                .iter()
                .find(|hurt| hurt.owner != volume.owner && volume.bounds.overlaps(&hurt.bounds))
                .map(|hurt| (idx, *hurt))
        })?;

        let volume = attacks.remove(index);
        let defender = fighters.iter_mut().find(|f| f.slot == hurt.owner)?;
        defender.take_hit(volume.damage, volume.facing);

        let hit = HitResult {
            volume_id: volume.id,
            attacker: volume.owner,
            defender: hurt.owner,
            kind: volume.kind,
            region: hurt.region,
            damage: volume.damage,
            defender_health: defender.health,
            knocked_out: defender.is_down(),
        };

        debug!(
            attacker = ?hit.attacker,
            defender = ?hit.defender,
            kind = ?hit.kind,
            damage = hit.damage,
            health = hit.defender_health,
            "Hit landed"
        );

        Some(hit)
    }

    /// Full per-tick combat step: age volumes, re-anchor hurtboxes, resolve.
    /// Returns the hurt volumes used this tick alongside any hit.
    pub fn step(
        fighters: &mut [Fighter],
        attacks: &mut Vec<AttackVolume>,
        model: HurtboxModel,
    ) -> (Option<HitResult>, Vec<HurtVolume>) {
        Self::age_volumes(attacks);
        let hurtboxes = Self::hurt_volumes(fighters, model);
        let hit = Self::resolve(fighters, attacks, &hurtboxes);
        (hit, hurtboxes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::fighter::{HIT_STUN_TICKS, MAX_HEALTH};
    use crate::game::hitbox::Rect;
    use crate::game::input::Actions;
    use crate::game::Facing;

    fn facing_pair(p2_x: f32) -> [Fighter; 2] {
        let p1 = Fighter::for_slot(PlayerSlot::P1);
        let mut p2 = Fighter::for_slot(PlayerSlot::P2);
        p2.x = p2_x;
        [p1, p2]
    }

    #[test]
    fn punch_in_range_lands_once() {
        let mut fighters = facing_pair(300.0);
        let mut attacks = vec![fighters[0].try_attack(AttackKind::Punch, 1).unwrap()];

        let (hit, _) = CombatResolver::step(&mut fighters, &mut attacks, HurtboxModel::BodyAndLimb);
        let hit = hit.expect("punch should connect");

        assert_eq!(hit.defender, PlayerSlot::P2);
        assert_eq!(hit.region, HurtRegion::Body);
        assert_eq!(fighters[1].health, MAX_HEALTH - 5);
        assert_eq!(fighters[1].recover_timer, HIT_STUN_TICKS);
        assert!(attacks.is_empty(), "consumed volume must be destroyed");

        let (again, _) = CombatResolver::step(&mut fighters, &mut attacks, HurtboxModel::BodyAndLimb);
        assert!(again.is_none());
        assert_eq!(fighters[1].health, MAX_HEALTH - 5);
    }

    #[test]
    fn out_of_range_punch_expires() {
        let mut fighters = facing_pair(700.0);
        let mut attacks = vec![fighters[0].try_attack(AttackKind::Punch, 1).unwrap()];

        let mut ticks = 0;
        while !attacks.is_empty() {
            let (hit, _) = CombatResolver::step(&mut fighters, &mut attacks, HurtboxModel::Body);
            assert!(hit.is_none());
            ticks += 1;
        }
        assert_eq!(ticks, 8);
        assert_eq!(fighters[1].health, MAX_HEALTH);
    }

    #[test]
    fn attacker_never_hits_itself() {
        let mut fighters = facing_pair(700.0);
        let mut volume = fighters[0].try_attack(AttackKind::Punch, 1).unwrap();
        // Drag the volume back over its owner
        volume.bounds = Rect::new(fighters[0].x + 50.0, 450.0, 40.0, 20.0);
        let mut attacks = vec![volume];

        let (hit, _) = CombatResolver::step(&mut fighters, &mut attacks, HurtboxModel::BodyAndLimb);
        assert!(hit.is_none());
        assert_eq!(fighters[0].health, MAX_HEALTH);
    }

    #[test]
    fn one_damage_event_per_tick_with_body_and_limb_overlapping() {
        let mut fighters = facing_pair(300.0);
        // P2 attacks too so its limb is exposed; both P1 volumes overlap P2
        fighters[1].facing = Facing::Left;
        let p2_volume = fighters[1].try_attack(AttackKind::Kick, 3).unwrap();
        let first = fighters[0].try_attack(AttackKind::Punch, 1).unwrap();
        let mut second = first.clone();
        second.id = 2;
        let mut attacks = vec![first, second, p2_volume];

        let (hit, hurtboxes) = CombatResolver::step(&mut fighters, &mut attacks, HurtboxModel::BodyAndLimb);
        assert_eq!(hurtboxes.iter().filter(|h| h.owner == PlayerSlot::P2).count(), 2);

        let hit = hit.unwrap();
        assert_eq!(hit.volume_id, 1);
        assert_eq!(attacks.len(), 2);
        let total_lost = (MAX_HEALTH - fighters[0].health) + (MAX_HEALTH - fighters[1].health);
        assert_eq!(total_lost, hit.damage);
    }

    #[test]
    fn resolution_order_is_spawn_order() {
        let mut fighters = facing_pair(300.0);
        fighters[1].facing = Facing::Left;
        let p2_kick = fighters[1].try_attack(AttackKind::Kick, 7).unwrap();
        let p1_punch = fighters[0].try_attack(AttackKind::Punch, 8).unwrap();

        let mut attacks = vec![p2_kick, p1_punch];
        let (hit, _) = CombatResolver::step(&mut fighters, &mut attacks, HurtboxModel::Body);
        let hit = hit.unwrap();
        assert_eq!(hit.attacker, PlayerSlot::P2);
        assert_eq!(fighters[0].health, MAX_HEALTH - 8);
        assert_eq!(fighters[1].health, MAX_HEALTH);
    }

    #[test]
    fn knockback_follows_attacker_facing() {
        let mut fighters = facing_pair(300.0);
        let mut attacks = vec![fighters[0].try_attack(AttackKind::Punch, 1).unwrap()];
        CombatResolver::step(&mut fighters, &mut attacks, HurtboxModel::Body);
        assert!((fighters[1].knockback_vx - 4.0).abs() < 1e-5);
    }

    #[test]
    fn volume_stays_put_when_attacker_is_pushed_away() {
        let mut fighters = facing_pair(700.0);
        let mut attacks = vec![fighters[0].try_attack(AttackKind::Punch, 1).unwrap()];
        let spawned = attacks[0].bounds;

        // Something shoves P1 backwards while the punch is still live
        fighters[0].knockback_vx = -12.0;
        for _ in 0..3 {
            for fighter in fighters.iter_mut() {
                fighter.update(&Actions::default());
            }
            let (hit, _) = CombatResolver::step(&mut fighters, &mut attacks, HurtboxModel::Body);
            assert!(hit.is_none());
        }

        assert!(fighters[0].x < 180.0);
        assert_eq!(attacks.len(), 1);
        assert_eq!(attacks[0].bounds, spawned);

        // A defender stepping into the original spot still gets hit
        fighters[1].x = 300.0;
        let (hit, _) = CombatResolver::step(&mut fighters, &mut attacks, HurtboxModel::Body);
        let hit = hit.expect("frozen volume should connect");
        assert_eq!(hit.volume_id, 1);
        assert_eq!(fighters[1].health, MAX_HEALTH - 5);
    }

    #[test]
    fn orphaned_volume_is_dropped() {
        let mut fighters = facing_pair(300.0);
        let volume = fighters[0].try_attack(AttackKind::Punch, 1).unwrap();
        let mut attacks = vec![volume];

        // Only P2 remains in play
        let (hit, _) = CombatResolver::step(&mut fighters[1..], &mut attacks, HurtboxModel::Body);
        assert!(hit.is_none());
        assert!(attacks.is_empty());
    }

    #[test]
    fn knockout_is_reported() {
        let mut fighters = facing_pair(300.0);
        fighters[1].health = 4;
        let mut attacks = vec![fighters[0].try_attack(AttackKind::Punch, 1).unwrap()];
        let (hit, _) = CombatResolver::step(&mut fighters, &mut attacks, HurtboxModel::Body);
        let hit = hit.unwrap();
        assert!(hit.knocked_out);
        assert_eq!(hit.defender_health, 0);
    }
}
