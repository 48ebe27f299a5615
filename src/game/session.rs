//! Game session - fixed-rate tick loop between the wire and the controller

use std::future::Future;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::audio::MusicDirector;
use crate::util::time::{unix_millis, Timer};
use crate::wire::protocol::{GameEvent, InputMsg, OutputMsg};

use super::input::{InputFrame, InputTracker, MenuKeys, PointerEvent};
use super::r#match::{MatchController, Scores};
use super::snapshot::SnapshotBuilder;

/// Default capacity for the session channels
pub const CHANNEL_CAPACITY: usize = 256;

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// "Quit" chosen on stage select
    QuitChosen,
    /// Frontend sent quit or closed its input
    FrontendQuit,
    /// Ctrl+C / SIGTERM
    Shutdown,
    /// Nobody is reading the output any more
    OutputClosed,
}

/// One running game
pub struct GameSession {
    id: Uuid,
    controller: MatchController,
    menu_keys: MenuKeys,
    tracker: InputTracker,
    /// Pointer actions received since the last tick
    pointer: Vec<PointerEvent>,
    input_rx: mpsc::Receiver<InputMsg>,
    output_tx: mpsc::Sender<OutputMsg>,
    snapshot_builder: SnapshotBuilder,
    music: MusicDirector,
    quit_requested: bool,
    output_closed: bool,
}

impl GameSession {
    pub fn new(
        controller: MatchController,
        music: MusicDirector,
        snapshot_every: u32,
        input_rx: mpsc::Receiver<InputMsg>,
        output_tx: mpsc::Sender<OutputMsg>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            controller,
            menu_keys: MenuKeys::default(),
            tracker: InputTracker::new(),
            pointer: Vec::new(),
            input_rx,
            output_tx,
            snapshot_builder: SnapshotBuilder::new(snapshot_every),
            music,
            quit_requested: false,
            output_closed: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn controller(&self) -> &MatchController {
        &self.controller
    }

    /// Main session loop. Runs until quit, shutdown or a closed output.
    pub async fn run<S>(mut self, shutdown: S) -> (SessionEnd, Scores)
    where
        S: Future<Output = ()>,
    {
        let tick_duration = self.controller.rules().clock.tick_duration();
        info!(
            session_id = %self.id,
            tick_rate = self.controller.rules().clock.tps(),
            "Session started"
        );

        self.send(OutputMsg::Hello {
            session_id: self.id,
            started_at: unix_millis(),
            tick_rate: self.controller.rules().clock.tps(),
        });
        let request = self.music.start();
        self.send(OutputMsg::Music(request));

        let mut tick_interval = interval(tick_duration);
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        let end = loop {
            tokio::select! {
                _ = &mut shutdown => break SessionEnd::Shutdown,
                _ = tick_interval.tick() => {}
            }

            if let Some(end) = self.step() {
                break end;
            }
        };

        let scores = self.controller.scores();
        self.send(OutputMsg::Goodbye { scores });
        info!(
            session_id = %self.id,
            reason = ?end,
            ticks = self.controller.tick_count(),
            p1_wins = scores.p1,
            p2_wins = scores.p2,
            "Session ended"
        );
        (end, scores)
    }

    /// Run one indivisible tick: drain input, tick the controller, publish.
    /// Returns why the session should end, if it should.
    pub fn step(&mut self) -> Option<SessionEnd> {
        let timer = Timer::new();

        self.process_inputs();

        // A quit from the frontend wins over anything in progress, result display included
        if self.quit_requested {
            return Some(SessionEnd::FrontendQuit);
        }

        let mut frame = InputFrame::new(self.tracker.take_frame(), &self.menu_keys);
        frame.pointer = std::mem::take(&mut self.pointer);
        let report = self.controller.tick(&frame);
        if report.exit {
            return Some(SessionEnd::QuitChosen);
        }

        for cue in &report.cues {
            let request = self.music.handle(*cue);
            self.send(OutputMsg::Music(request));
        }

        let round_over = report
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::RoundOver(_)));
        if report.phase_changed || round_over {
            self.snapshot_builder.force_next();
        }

        if !report.events.is_empty() {
            self.send(OutputMsg::Events {
                tick: self.controller.tick_count(),
                events: report.events,
            });
        }

        if self.snapshot_builder.should_send() {
            let snapshot = self.snapshot_builder.build(&self.controller);
            self.send(snapshot);
        }

        let elapsed = timer.elapsed();
        if elapsed > self.controller.rules().clock.tick_duration() {
            warn!(
                session_id = %self.id,
                tick = self.controller.tick_count(),
                elapsed_us = timer.elapsed_micros(),
                "Tick overran its budget"
            );
        }

        self.output_closed.then_some(SessionEnd::OutputClosed)
    }

    /// Process all pending input messages
    fn process_inputs(&mut self) {
        while let Ok(msg) = self.input_rx.try_recv() {
            match msg {
                InputMsg::KeyDown { key } => self.tracker.key_down(key),
                InputMsg::KeyUp { key } => self.tracker.key_up(&key),
                InputMsg::Quit => {
                    info!(session_id = %self.id, "Frontend quit");
                    self.quit_requested = true;
                }
                other => self.pointer.extend(other.pointer()),
            }
        }
    }

    /// Queue a message without waiting. A full queue drops the message.
    fn send(&mut self, msg: OutputMsg) {
        match self.output_tx.try_send(msg) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!(session_id = %self.id, "Frontend lagging, dropping output message");
            }
            Err(TrySendError::Closed(_)) => {
                if !self.output_closed {
                    debug!(session_id = %self.id, "Output channel closed");
                }
                self.output_closed = true;
            }
        }
    }
}
