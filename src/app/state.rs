//! Application state: configuration and collaborators for one process

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::info;

use crate::audio::MusicDirector;
use crate::config::Config;
use crate::game::session::CHANNEL_CAPACITY;
use crate::game::stage::Stage;
use crate::game::{GameSession, MatchController, MatchRules};
use crate::util::assets::report_missing;
use crate::util::rate_limit::InputRateLimiter;
use crate::wire::protocol::{InputMsg, OutputMsg};

/// Channel ends the stdio pumps attach to
pub struct SessionChannels {
    pub input_tx: mpsc::Sender<InputMsg>,
    pub output_rx: mpsc::Receiver<OutputMsg>,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub stages: Arc<Vec<Stage>>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let config = Arc::new(config);
        let stages = Arc::new(Stage::catalog());

        // Missing backgrounds and tracks only degrade the frontend
        let assets = stages
            .iter()
            .map(|s| s.background.as_str())
            .chain([config.menu_bgm.as_str(), config.battle_bgm.as_str()]);
        let available = report_missing(assets);

        info!(
            stages = stages.len(),
            assets_available = available,
            tick_rate = config.tick_rate,
            hurtbox_model = ?config.hurtbox_model,
            "Application state ready"
        );

        Self { config, stages }
    }

    pub fn music_director(&self) -> MusicDirector {
        MusicDirector::new(
            self.config.menu_bgm.clone(),
            self.config.battle_bgm.clone(),
            self.config.music_volume,
        )
    }

    pub fn input_limiter(&self) -> InputRateLimiter {
        InputRateLimiter::new(self.config.input_rate_limit)
    }

    /// Build a session plus the channel ends for its pumps
    pub fn create_session(&self) -> (GameSession, SessionChannels) {
        let (input_tx, input_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (output_tx, output_rx) = mpsc::channel(CHANNEL_CAPACITY);

        let controller = MatchController::new(MatchRules::from_config(&self.config), self.stages.to_vec());
        let session = GameSession::new(
            controller,
            self.music_director(),
            self.config.snapshot_every,
            input_rx,
            output_tx,
        );

        (session, SessionChannels { input_tx, output_rx })
    }
}
