//! Match controller - application phase machine and round lifecycle

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use crate::audio::AudioCue;
use crate::config::Config;
use crate::util::time::TickClock;
use crate::wire::protocol::GameEvent;

use super::combat::CombatResolver;
use super::fighter::{Fighter, ARENA_WIDTH, FIGHTER_WIDTH};
use super::hitbox::{AttackKind, AttackVolume, HurtVolume, HurtboxModel};
use super::input::{Actions, InputFrame, MenuEvent, PointerEvent};
use super::menu::{PauseMenu, PauseOption, SelectChoice, Settings, SettingsAction, StageSelect};
use super::snapshot::BattleView;
use super::stage::Stage;
use super::PlayerSlot;

/// Top-level application phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPhase {
    /// Title screen
    Title,
    /// Stage select
    Select,
    /// Fight in progress (including the round result display)
    Battle,
    /// Pause menu over a frozen battle
    Paused,
    /// Settings opened from the pause menu
    Settings,
}

/// Inputs to the phase machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Confirm,
    StageChosen,
    QuitChosen,
    Pause,
    RoundFinished,
    Continue,
    OpenSettings,
    QuitToSelect,
    Back,
}

/// Where a trigger leads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    To(MatchPhase),
    Exit,
}

impl MatchPhase {
    /// Transition table. `None` means the trigger is ignored in this phase.
    pub fn on(self, trigger: Trigger) -> Option<Transition> {
        use MatchPhase::*;
        use Trigger::*;

        let next = match (self, trigger) {
            (Title, Confirm) => Transition::To(Select),
            (Select, StageChosen) => Transition::To(Battle),
            (Select, QuitChosen) => Transition::Exit,
            (Battle, Pause) => Transition::To(Paused),
            (Battle, RoundFinished) => Transition::To(Select),
            (Paused, Continue) => Transition::To(Battle),
            (Paused, OpenSettings) => Transition::To(Settings),
            (Paused, QuitToSelect) => Transition::To(Select),
            (Settings, Back) => Transition::To(Paused),
            _ => return None,
        };
        Some(next)
    }

    /// Only battles advance fighters, volumes and the clock
    pub fn simulates(self) -> bool {
        self == MatchPhase::Battle
    }
}

/// Round winner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Winner {
    P1,
    P2,
    Draw,
}

impl Winner {
    /// Higher health wins, equal health is a draw
    pub fn from_health(p1: u32, p2: u32) -> Self {
        match p1.cmp(&p2) {
            std::cmp::Ordering::Greater => Winner::P1,
            std::cmp::Ordering::Less => Winner::P2,
            std::cmp::Ordering::Equal => Winner::Draw,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundEndReason {
    KnockOut,
    TimeUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    pub winner: Winner,
    pub reason: RoundEndReason,
    pub p1_health: u32,
    pub p2_health: u32,
}

/// Per-player round wins, kept for the life of the process
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
    pub p1: u32,
    pub p2: u32,
}

impl Scores {
    pub fn record(&mut self, winner: Winner) {
        match winner {
            Winner::P1 => self.p1 += 1,
            Winner::P2 => self.p2 += 1,
            Winner::Draw => {}
        }
    }
}

/// Match timing and combat rules
#[derive(Debug, Clone)]
pub struct MatchRules {
    pub clock: TickClock,
    /// Round clock in seconds
    pub match_seconds: f32,
    /// Ticks the round result stays up before returning to stage select
    pub result_delay_ticks: u32,
    pub hurtbox_model: HurtboxModel,
    pub initial_volume: f32,
}

impl MatchRules {
    pub fn from_config(config: &Config) -> Self {
        let clock = TickClock::new(config.tick_rate);
        Self {
            clock,
            match_seconds: config.match_seconds as f32,
            result_delay_ticks: clock.ticks_for(config.result_delay),
            hurtbox_model: config.hurtbox_model,
            initial_volume: config.music_volume,
        }
    }
}

impl Default for MatchRules {
    fn default() -> Self {
        let clock = TickClock::default();
        Self {
            clock,
            match_seconds: 90.0,
            result_delay_ticks: clock.ticks_for(Duration::from_secs(2)),
            hurtbox_model: HurtboxModel::default(),
            initial_volume: 0.5,
        }
    }
}

/// Result display in progress
#[derive(Debug, Clone, Copy)]
struct RoundEnd {
    result: RoundResult,
    remaining_ticks: u32,
}

/// What happened during one controller tick
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub events: Vec<GameEvent>,
    pub cues: Vec<AudioCue>,
    pub phase_changed: bool,
    /// The player chose to quit from stage select
    pub exit: bool,
}

/// Owns the whole simulation: fighters, live volumes, clock, scores and menus
pub struct MatchController {
    rules: MatchRules,
    phase: MatchPhase,
    tick: u64,
    fighters: [Fighter; 2],
    attacks: Vec<AttackVolume>,
    hurtboxes: Vec<HurtVolume>,
    next_volume_id: u64,
    clock: f32,
    scores: Scores,
    stages: Vec<Stage>,
    stage_select: StageSelect,
    selected_stage: usize,
    pause_menu: PauseMenu,
    settings: Settings,
    round_end: Option<RoundEnd>,
    last_result: Option<RoundResult>,
    backdrop: Option<BattleView>,
}

impl MatchController {
    pub fn new(rules: MatchRules, stages: Vec<Stage>) -> Self {
        let settings = Settings::new(rules.initial_volume);
        let clock = rules.match_seconds;
        Self {
            phase: MatchPhase::Title,
            tick: 0,
            fighters: [Fighter::for_slot(PlayerSlot::P1), Fighter::for_slot(PlayerSlot::P2)],
            attacks: Vec::new(),
            hurtboxes: Vec::new(),
            next_volume_id: 1,
            clock,
            scores: Scores::default(),
            stage_select: StageSelect::new(stages.len()),
            stages,
            selected_stage: 0,
            pause_menu: PauseMenu::new(),
            settings,
            round_end: None,
            last_result: None,
            backdrop: None,
            rules,
        }
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn rules(&self) -> &MatchRules {
        &self.rules
    }

    /// Remaining round time in seconds
    pub fn clock(&self) -> f32 {
        self.clock
    }

    pub fn scores(&self) -> Scores {
        self.scores
    }

    pub fn fighters(&self) -> &[Fighter; 2] {
        &self.fighters
    }

    #[cfg(test)]
    pub(crate) fn fighters_mut(&mut self) -> &mut [Fighter; 2] {
        &mut self.fighters
    }

    pub fn fighter(&self, slot: PlayerSlot) -> &Fighter {
        match slot {
            PlayerSlot::P1 => &self.fighters[0],
            PlayerSlot::P2 => &self.fighters[1],
        }
    }

    fn fighter_mut(&mut self, slot: PlayerSlot) -> &mut Fighter {
        match slot {
            PlayerSlot::P1 => &mut self.fighters[0],
            PlayerSlot::P2 => &mut self.fighters[1],
        }
    }

    /// Move a fighter along the floor line, clamped to the arena.
    /// Health, timers and velocity are untouched.
    pub fn place_fighter(&mut self, slot: PlayerSlot, x: f32) {
        self.fighter_mut(slot).x = x.clamp(0.0, ARENA_WIDTH - FIGHTER_WIDTH);
    }

    pub fn attacks(&self) -> &[AttackVolume] {
        &self.attacks
    }

    pub fn hurt_volumes(&self) -> &[HurtVolume] {
        &self.hurtboxes
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn selected_stage(&self) -> usize {
        self.selected_stage
    }

    pub fn stage_select(&self) -> &StageSelect {
        &self.stage_select
    }

    pub fn pause_menu(&self) -> &PauseMenu {
        &self.pause_menu
    }

    pub fn volume(&self) -> f32 {
        self.settings.volume()
    }

    /// Result currently on screen, if the round just ended
    pub fn round_result(&self) -> Option<RoundResult> {
        self.round_end.map(|end| end.result)
    }

    /// Result of the most recently finished round
    pub fn last_result(&self) -> Option<RoundResult> {
        self.last_result
    }

    /// Battle frame captured when the pause menu opened
    pub fn backdrop(&self) -> Option<&BattleView> {
        self.backdrop.as_ref()
    }

    #[cfg(test)]
    pub(crate) fn set_clock(&mut self, seconds: f32) {
        self.clock = seconds.max(0.0);
    }

    /// Run one indivisible tick: menu routing, then the battle step if the
    /// phase simulates.
    pub fn tick(&mut self, frame: &InputFrame) -> TickReport {
        self.tick += 1;
        let mut report = TickReport::default();

        for event in &frame.menu {
            self.handle_menu(*event, &mut report);
            if report.exit {
                return report;
            }
        }

        for event in &frame.pointer {
            self.handle_pointer(*event, &mut report);
            if report.exit {
                return report;
            }
        }

        if self.phase.simulates() {
            self.step_battle(frame, &mut report);
        }

        report
    }

    fn handle_menu(&mut self, event: MenuEvent, report: &mut TickReport) {
        match self.phase {
            MatchPhase::Title => {
                if event == MenuEvent::Confirm {
                    self.apply(Trigger::Confirm, report);
                }
            }
            MatchPhase::Select => {
                if let Some(choice) = self.stage_select.handle(event) {
                    self.choose_stage(choice, report);
                }
            }
            MatchPhase::Battle => {
                if event == MenuEvent::Back {
                    self.request_pause(report);
                }
            }
            MatchPhase::Paused => {
                if let Some(option) = self.pause_menu.handle(event) {
                    self.choose_pause(option, report);
                }
            }
            MatchPhase::Settings => {
                if let Some(action) = self.settings.handle(event) {
                    self.settings_action(action, report);
                }
            }
        }
    }

    fn handle_pointer(&mut self, event: PointerEvent, report: &mut TickReport) {
        match (self.phase, event) {
            (MatchPhase::Select, PointerEvent::Select(index)) => {
                if let Some(choice) = self.stage_select.select(index) {
                    self.choose_stage(choice, report);
                }
            }
            (MatchPhase::Battle, PointerEvent::Pause) => self.request_pause(report),
            (MatchPhase::Paused, PointerEvent::Select(index)) => {
                if let Some(option) = self.pause_menu.select(index) {
                    self.choose_pause(option, report);
                }
            }
            (MatchPhase::Settings, PointerEvent::SetVolume(volume)) => {
                if let Some(action) = self.settings.set_volume(volume) {
                    self.settings_action(action, report);
                }
            }
            (MatchPhase::Settings, PointerEvent::Back) => self.settings_action(SettingsAction::Back, report),
            (phase, event) => debug!(phase = ?phase, event = ?event, "Pointer event ignored"),
        }
    }

    fn choose_stage(&mut self, choice: SelectChoice, report: &mut TickReport) {
        match choice {
            SelectChoice::Stage(index) => {
                self.selected_stage = index;
                self.apply(Trigger::StageChosen, report);
            }
            SelectChoice::Quit => self.apply(Trigger::QuitChosen, report),
        }
    }

    fn request_pause(&mut self, report: &mut TickReport) {
        // No pausing over the result display
        if self.round_end.is_none() {
            self.apply(Trigger::Pause, report);
        }
    }

    fn choose_pause(&mut self, option: PauseOption, report: &mut TickReport) {
        let trigger = match option {
            PauseOption::Continue => Trigger::Continue,
            PauseOption::Settings => Trigger::OpenSettings,
            PauseOption::Quit => Trigger::QuitToSelect,
        };
        self.apply(trigger, report);
    }

    fn settings_action(&mut self, action: SettingsAction, report: &mut TickReport) {
        match action {
            SettingsAction::VolumeChanged(volume) => report.cues.push(AudioCue::VolumeChanged(volume)),
            SettingsAction::Back => self.apply(Trigger::Back, report),
        }
    }

    fn apply(&mut self, trigger: Trigger, report: &mut TickReport) {
        let from = self.phase;
        match from.on(trigger) {
            None => debug!(phase = ?from, trigger = ?trigger, "Trigger ignored"),
            Some(Transition::Exit) => {
                info!(tick = self.tick, "Quit selected");
                report.exit = true;
            }
            Some(Transition::To(to)) => {
                self.enter(from, to, report);
                self.phase = to;
                report.phase_changed = true;
                report.events.push(GameEvent::PhaseChanged { from, to });
                info!(tick = self.tick, from = ?from, to = ?to, "Phase changed");
            }
        }
    }

    /// Side effects of entering `to` from `from`
    fn enter(&mut self, from: MatchPhase, to: MatchPhase, report: &mut TickReport) {
        match (from, to) {
            (MatchPhase::Select, MatchPhase::Battle) => {
                self.reset_round();
                self.last_result = None;
                report.cues.push(AudioCue::EnteredBattle);
                info!(
                    stage = %self.stages.get(self.selected_stage).map(|s| s.name.as_str()).unwrap_or("?"),
                    "Round started"
                );
            }
            (MatchPhase::Battle, MatchPhase::Paused) => {
                self.backdrop = Some(BattleView::capture(self));
                self.pause_menu.open();
            }
            (MatchPhase::Paused, MatchPhase::Battle) => {
                self.backdrop = None;
            }
            (_, MatchPhase::Select) if from != MatchPhase::Title => {
                self.reset_round();
                self.backdrop = None;
                report.cues.push(AudioCue::EnteredSelect);
            }
            _ => {}
        }
    }

    /// Fighters back to start marks, clock full, volumes cleared
    fn reset_round(&mut self) {
        for fighter in &mut self.fighters {
            fighter.reset();
        }
        self.attacks.clear();
        self.hurtboxes.clear();
        self.clock = self.rules.match_seconds;
        self.round_end = None;
    }

    fn step_battle(&mut self, frame: &InputFrame, report: &mut TickReport) {
        // Result display freezes the simulation until the delay runs out
        if let Some(end) = self.round_end.as_mut() {
            end.remaining_ticks = end.remaining_ticks.saturating_sub(1);
            if end.remaining_ticks == 0 {
                self.apply(Trigger::RoundFinished, report);
            }
            return;
        }

        self.clock = (self.clock - self.rules.clock.delta()).max(0.0);

        // P1 always before P2
        let actions: [Actions; 2] = [
            self.fighters[0].binding().resolve(&frame.keyboard),
            self.fighters[1].binding().resolve(&frame.keyboard),
        ];

        for (fighter, actions) in self.fighters.iter_mut().zip(actions.iter()) {
            fighter.update(actions);
        }

        for (fighter, actions) in self.fighters.iter_mut().zip(actions.iter()) {
            let kind = if actions.punch {
                AttackKind::Punch
            } else if actions.kick {
                AttackKind::Kick
            } else {
                continue;
            };

            if let Some(volume) = fighter.try_attack(kind, self.next_volume_id) {
                self.next_volume_id += 1;
                debug!(slot = ?fighter.slot, kind = ?kind, volume_id = volume.id, "Attack started");
                report.events.push(GameEvent::AttackStarted {
                    slot: fighter.slot,
                    kind,
                });
                self.attacks.push(volume);
            }
        }

        let (hit, hurtboxes) =
            CombatResolver::step(&mut self.fighters, &mut self.attacks, self.rules.hurtbox_model);
        self.hurtboxes = hurtboxes;

        if let Some(hit) = hit {
            report.events.push(GameEvent::Hit(hit));
        }

        self.check_round_end(report);
    }

    fn check_round_end(&mut self, report: &mut TickReport) {
        let knocked_out = self.fighters.iter().any(Fighter::is_down);
        if !knocked_out && self.clock > 0.0 {
            return;
        }

        let [p1, p2] = &self.fighters;
        let result = RoundResult {
            winner: Winner::from_health(p1.health, p2.health),
            reason: if knocked_out {
                RoundEndReason::KnockOut
            } else {
                RoundEndReason::TimeUp
            },
            p1_health: p1.health,
            p2_health: p2.health,
        };

        self.scores.record(result.winner);
        self.last_result = Some(result);
        self.round_end = Some(RoundEnd {
            result,
            remaining_ticks: self.rules.result_delay_ticks,
        });

        info!(
            tick = self.tick,
            winner = ?result.winner,
            reason = ?result.reason,
            p1_wins = self.scores.p1,
            p2_wins = self.scores.p2,
            "Round over"
        );
        report.events.push(GameEvent::RoundOver(result));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::fighter::{HIT_STUN_TICKS, MAX_HEALTH, P1_START_X, RECOVERY_TICKS};
    use crate::game::hitbox::AttackStats;
    use crate::game::input::KeyboardState;

    fn controller() -> MatchController {
        MatchController::new(MatchRules::default(), Stage::catalog())
    }

    fn in_battle() -> MatchController {
        let mut c = controller();
        c.tick(&InputFrame::with_menu([MenuEvent::Confirm]));
        c.tick(&InputFrame::with_menu([MenuEvent::Confirm]));
        assert_eq!(c.phase(), MatchPhase::Battle);
        c
    }

    fn keys(held: &[&str], pressed: &[&str]) -> InputFrame {
        InputFrame {
            keyboard: KeyboardState::from_keys(held, pressed),
            ..InputFrame::default()
        }
    }

    fn assert_invariants(c: &MatchController) {
        for f in c.fighters() {
            assert!(f.health <= MAX_HEALTH);
            assert!(f.attack_timer == 0 || f.recover_timer == 0);
        }
    }

    #[test]
    fn transition_table() {
        use MatchPhase::*;
        assert_eq!(Title.on(Trigger::Confirm), Some(Transition::To(Select)));
        assert_eq!(Select.on(Trigger::StageChosen), Some(Transition::To(Battle)));
        assert_eq!(Select.on(Trigger::QuitChosen), Some(Transition::Exit));
        assert_eq!(Battle.on(Trigger::Pause), Some(Transition::To(Paused)));
        assert_eq!(Battle.on(Trigger::RoundFinished), Some(Transition::To(Select)));
        assert_eq!(Paused.on(Trigger::Continue), Some(Transition::To(Battle)));
        assert_eq!(Paused.on(Trigger::OpenSettings), Some(Transition::To(Settings)));
        assert_eq!(Paused.on(Trigger::QuitToSelect), Some(Transition::To(Select)));
        assert_eq!(Settings.on(Trigger::Back), Some(Transition::To(Paused)));

        assert_eq!(Title.on(Trigger::Pause), None);
        assert_eq!(Battle.on(Trigger::Confirm), None);
        assert_eq!(Settings.on(Trigger::Continue), None);
        assert!(Battle.simulates());
        assert!(!Paused.simulates());
    }

    #[test]
    fn entering_battle_resets_and_cues_music() {
        let mut c = controller();
        c.tick(&InputFrame::with_menu([MenuEvent::Confirm]));
        c.fighters_mut()[0].health = 10;
        c.fighters_mut()[0].x = 20.0;

        let report = c.tick(&InputFrame::with_menu([MenuEvent::Down, MenuEvent::Confirm]));
        assert_eq!(c.phase(), MatchPhase::Battle);
        assert_eq!(c.selected_stage(), 1);
        assert!(report.cues.contains(&AudioCue::EnteredBattle));
        assert_eq!(c.fighters()[0].health, MAX_HEALTH);
        assert_eq!(c.fighters()[0].x, P1_START_X);
        assert!(c.clock() < 90.0 && c.clock() > 89.9);
    }

    #[test]
    fn quit_from_stage_select_exits() {
        let mut c = controller();
        c.tick(&InputFrame::with_menu([MenuEvent::Confirm]));
        let report = c.tick(&InputFrame::with_menu([MenuEvent::Up, MenuEvent::Confirm]));
        assert!(report.exit);
        assert_eq!(c.phase(), MatchPhase::Select);
    }

    #[test]
    fn punch_scenario() {
        let mut c = in_battle();
        c.fighters_mut()[1].x = 300.0;

        let report = c.tick(&keys(&[], &["c"]));
        let hit = report
            .events
            .iter()
            .find_map(|e| match e {
                GameEvent::Hit(hit) => Some(hit.clone()),
                _ => None,
            })
            .expect("punch should land on the first tick");

        assert_eq!(hit.damage, 5);
        assert_eq!(c.fighter(PlayerSlot::P2).health, 95);
        assert_eq!(c.fighter(PlayerSlot::P2).recover_timer, HIT_STUN_TICKS);
        assert!(c.attacks().is_empty());
        assert_eq!(c.fighter(PlayerSlot::P1).attack_timer, 12);
    }

    #[test]
    fn attack_then_recovery_timing() {
        let mut c = in_battle();
        c.tick(&keys(&[], &["v"]));
        let n = AttackStats::for_kind(AttackKind::Kick).duration;
        assert_eq!(c.fighter(PlayerSlot::P1).attack_timer, n);

        for _ in 0..n {
            c.tick(&InputFrame::idle());
            assert_invariants(&c);
        }
        let p1 = c.fighter(PlayerSlot::P1);
        assert_eq!(p1.attack_timer, 0);
        assert_eq!(p1.recover_timer, RECOVERY_TICKS);
    }

    #[test]
    fn holding_attack_key_does_not_repeat() {
        let mut c = in_battle();
        c.tick(&keys(&[], &["c"]));
        for _ in 0..60 {
            c.tick(&keys(&["c"], &[]));
        }
        let p1 = c.fighter(PlayerSlot::P1);
        assert!(p1.can_act());
        assert!(c.attacks().is_empty());
    }

    #[test]
    fn knockout_scores_and_returns_to_select() {
        let mut c = in_battle();
        c.fighters_mut()[0].health = 40;
        c.fighters_mut()[1].health = 0;

        let report = c.tick(&InputFrame::idle());
        let result = c.round_result().expect("round should be over");
        assert_eq!(result.winner, Winner::P1);
        assert_eq!(result.reason, RoundEndReason::KnockOut);
        assert_eq!(c.scores(), Scores { p1: 1, p2: 0 });
        assert!(report.events.iter().any(|e| matches!(e, GameEvent::RoundOver(_))));

        // Frozen during the result display, no pausing either
        let clock = c.clock();
        for _ in 0..c.rules().result_delay_ticks - 1 {
            let report = c.tick(&InputFrame::with_menu([MenuEvent::Back]));
            assert!(!report.phase_changed);
        }
        assert_eq!(c.clock(), clock);
        assert_eq!(c.scores(), Scores { p1: 1, p2: 0 });

        let report = c.tick(&InputFrame::idle());
        assert_eq!(c.phase(), MatchPhase::Select);
        assert!(report.cues.contains(&AudioCue::EnteredSelect));
        assert_eq!(c.fighters()[1].health, MAX_HEALTH);
        assert_eq!(c.clock(), 90.0);
        assert_eq!(c.last_result().map(|r| r.winner), Some(Winner::P1));
    }

    #[test]
    fn timeout_with_equal_health_is_a_draw() {
        let mut c = in_battle();
        c.fighters_mut()[0].health = 70;
        c.fighters_mut()[1].health = 70;
        c.set_clock(0.01);

        c.tick(&InputFrame::idle());
        let result = c.round_result().unwrap();
        assert_eq!(result.winner, Winner::Draw);
        assert_eq!(result.reason, RoundEndReason::TimeUp);
        assert_eq!(c.scores(), Scores::default());
        assert_eq!(c.clock(), 0.0);
    }

    #[test]
    fn pause_resume_is_lossless() {
        let mut c = in_battle();
        c.tick(&keys(&[], &["c"]));
        c.tick(&InputFrame::idle());

        let snapshot = |c: &MatchController| {
            (
                c.clock(),
                c.fighters().iter().map(|f| (f.attack_timer, f.recover_timer, f.x, f.y)).collect::<Vec<_>>(),
                c.attacks().to_vec(),
            )
        };
        let before = snapshot(&c);

        let report = c.tick(&InputFrame::with_menu([MenuEvent::Back]));
        assert_eq!(c.phase(), MatchPhase::Paused);
        assert!(report.phase_changed);
        assert!(c.backdrop().is_some());

        for _ in 0..50 {
            c.tick(&keys(&["a", "left"], &["v", "slash"]));
        }
        c.tick(&InputFrame::with_menu([MenuEvent::Down, MenuEvent::Confirm]));
        assert_eq!(c.phase(), MatchPhase::Settings);
        c.tick(&InputFrame::with_menu([MenuEvent::Back]));
        assert_eq!(c.phase(), MatchPhase::Paused);

        assert_eq!(snapshot(&c), before);

        c.tick(&InputFrame::with_menu([MenuEvent::Continue]));
        assert_eq!(c.phase(), MatchPhase::Battle);
        assert!(c.backdrop().is_none());
    }

    #[test]
    fn settings_volume_emits_cue() {
        let mut c = in_battle();
        c.tick(&InputFrame::with_menu([MenuEvent::Back]));
        c.tick(&InputFrame::with_menu([MenuEvent::Down, MenuEvent::Confirm]));

        let report = c.tick(&InputFrame::with_menu([MenuEvent::Left]));
        assert!(matches!(report.cues.as_slice(), [AudioCue::VolumeChanged(v)] if (*v - 0.45).abs() < 1e-6));
        assert!((c.volume() - 0.45).abs() < 1e-6);
    }

    #[test]
    fn quit_from_pause_returns_to_select() {
        let mut c = in_battle();
        c.tick(&keys(&[], &["c"]));
        c.tick(&InputFrame::with_menu([MenuEvent::Back]));
        let report = c.tick(&InputFrame::with_menu([MenuEvent::Up, MenuEvent::Confirm]));

        assert_eq!(c.phase(), MatchPhase::Select);
        assert!(report.cues.contains(&AudioCue::EnteredSelect));
        assert!(c.attacks().is_empty());
        assert_eq!(c.scores(), Scores::default());
    }

    #[test]
    fn menus_freeze_simulation() {
        let mut c = controller();
        for _ in 0..10 {
            c.tick(&keys(&["d"], &["c"]));
        }
        assert_eq!(c.phase(), MatchPhase::Title);
        assert_eq!(c.fighters()[0].x, P1_START_X);
        assert!(c.attacks().is_empty());
    }

    #[test]
    fn clicks_choose_stage_and_pause_options() {
        let mut c = controller();
        c.tick(&InputFrame::with_menu([MenuEvent::Confirm]));

        // Out-of-range clicks are ignored
        let report = c.tick(&InputFrame::with_pointer([PointerEvent::Select(9)]));
        assert!(!report.phase_changed);

        c.tick(&InputFrame::with_pointer([PointerEvent::Select(2)]));
        assert_eq!(c.phase(), MatchPhase::Battle);
        assert_eq!(c.selected_stage(), 2);

        let report = c.tick(&InputFrame::with_pointer([PointerEvent::Pause]));
        assert_eq!(c.phase(), MatchPhase::Paused);
        assert!(report.phase_changed);
        assert!(c.backdrop().is_some());

        c.tick(&InputFrame::with_pointer([PointerEvent::Select(1)]));
        assert_eq!(c.phase(), MatchPhase::Settings);

        c.tick(&InputFrame::with_pointer([PointerEvent::Back]));
        assert_eq!(c.phase(), MatchPhase::Paused);

        c.tick(&InputFrame::with_pointer([PointerEvent::Select(0)]));
        assert_eq!(c.phase(), MatchPhase::Battle);
        assert!(c.backdrop().is_none());
    }

    #[test]
    fn clicking_quit_on_stage_select_exits() {
        let mut c = controller();
        c.tick(&InputFrame::with_menu([MenuEvent::Confirm]));
        let report = c.tick(&InputFrame::with_pointer([PointerEvent::Select(3)]));
        assert!(report.exit);
    }

    #[test]
    fn volume_bar_emits_absolute_cue() {
        let mut c = in_battle();
        c.tick(&InputFrame::with_pointer([PointerEvent::Pause]));
        c.tick(&InputFrame::with_pointer([PointerEvent::Select(1)]));

        let report = c.tick(&InputFrame::with_pointer([PointerEvent::SetVolume(0.8)]));
        assert_eq!(report.cues, vec![AudioCue::VolumeChanged(0.8)]);
        assert_eq!(c.volume(), 0.8);

        let report = c.tick(&InputFrame::with_pointer([PointerEvent::SetVolume(1.4)]));
        assert_eq!(report.cues, vec![AudioCue::VolumeChanged(1.0)]);

        // Volume clicks outside settings do nothing
        c.tick(&InputFrame::with_pointer([PointerEvent::Back]));
        let report = c.tick(&InputFrame::with_pointer([PointerEvent::SetVolume(0.1)]));
        assert!(report.cues.is_empty());
        assert_eq!(c.volume(), 1.0);
    }

    #[test]
    fn pause_button_respects_result_display() {
        let mut c = in_battle();
        c.fighters_mut()[1].health = 0;
        c.tick(&InputFrame::idle());
        assert!(c.round_result().is_some());

        let report = c.tick(&InputFrame::with_pointer([PointerEvent::Pause]));
        assert!(!report.phase_changed);
        assert_eq!(c.phase(), MatchPhase::Battle);

        // Pause clicks in menus are ignored too
        let mut c = controller();
        let report = c.tick(&InputFrame::with_pointer([PointerEvent::Pause]));
        assert!(!report.phase_changed);
        assert_eq!(c.phase(), MatchPhase::Title);
    }

    #[test]
    fn placing_fighters_stays_inside_arena() {
        let mut c = in_battle();
        c.place_fighter(PlayerSlot::P2, 5000.0);
        assert_eq!(c.fighter(PlayerSlot::P2).x, ARENA_WIDTH - FIGHTER_WIDTH);
        c.place_fighter(PlayerSlot::P1, -40.0);
        assert_eq!(c.fighter(PlayerSlot::P1).x, 0.0);
        assert_eq!(c.fighter(PlayerSlot::P1).health, MAX_HEALTH);
    }

    #[test]
    fn health_never_increases_in_battle() {
        let mut c = in_battle();
        c.fighters_mut()[1].x = 300.0;
        let mut last = [MAX_HEALTH; 2];

        for i in 0..400 {
            let frame = if i % 9 == 0 {
                keys(&["d"], &["c", "slash"])
            } else if i % 5 == 0 {
                keys(&["right"], &["v", "period"])
            } else {
                keys(&["d", "left"], &[])
            };
            c.tick(&frame);
            if c.phase() != MatchPhase::Battle || c.round_result().is_some() {
                break;
            }
            assert_invariants(&c);
            for (slot, f) in c.fighters().iter().enumerate() {
                assert!(f.health <= last[slot]);
                last[slot] = f.health;
            }
        }
    }
}
