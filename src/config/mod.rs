//! Configuration module - environment variable parsing

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::game::hitbox::HurtboxModel;
use crate::util::time::{MAX_SIMULATION_TPS, SIMULATION_TPS};

/// Longest allowed round result display (10 minutes)
pub const MAX_RESULT_DELAY_MS: u64 = 600_000;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    pub log_format: LogFormat,

    /// Simulation ticks per second
    pub tick_rate: u32,
    /// Publish a snapshot every N ticks
    pub snapshot_every: u32,
    /// Round clock in seconds
    pub match_seconds: u32,
    /// How long the round result stays up
    pub result_delay: Duration,
    /// Which hurt volumes fighters expose
    pub hurtbox_model: HurtboxModel,

    /// Initial music volume (0.0 - 1.0)
    pub music_volume: f32,
    /// Menu background track
    pub menu_bgm: String,
    /// Battle background track
    pub battle_bgm: String,

    /// Max input messages per second accepted from stdin
    pub input_rate_limit: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            tick_rate: SIMULATION_TPS,
            snapshot_every: 1,
            match_seconds: 90,
            result_delay: Duration::from_millis(2000),
            hurtbox_model: HurtboxModel::BodyAndLimb,
            music_volume: 0.5,
            menu_bgm: "sound/bgm/menu-bgm.mp3".to_string(),
            battle_bgm: "sound/bgm/vhs-tape.mp3".to_string(),
            input_rate_limit: 600,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let defaults = Self::default();

        let tick_rate = parse_or(&lookup, "TICK_RATE", defaults.tick_rate)?;
        if !(1..=MAX_SIMULATION_TPS).contains(&tick_rate) {
            return Err(ConfigError::OutOfRange {
                var: "TICK_RATE",
                value: tick_rate.to_string(),
            });
        }

        let snapshot_every = parse_or(&lookup, "SNAPSHOT_EVERY", defaults.snapshot_every)?;
        if snapshot_every == 0 {
            return Err(ConfigError::OutOfRange {
                var: "SNAPSHOT_EVERY",
                value: "0".to_string(),
            });
        }

        let match_seconds = parse_or(&lookup, "MATCH_SECONDS", defaults.match_seconds)?;
        if match_seconds == 0 {
            return Err(ConfigError::OutOfRange {
                var: "MATCH_SECONDS",
                value: "0".to_string(),
            });
        }

        let result_delay_ms: u64 = parse_or(&lookup, "RESULT_DELAY_MS", 2000)?;
        if result_delay_ms > MAX_RESULT_DELAY_MS {
            return Err(ConfigError::OutOfRange {
                var: "RESULT_DELAY_MS",
                value: result_delay_ms.to_string(),
            });
        }

        let music_volume: f32 = parse_or(&lookup, "MUSIC_VOLUME", defaults.music_volume)?;
        if !(0.0..=1.0).contains(&music_volume) {
            return Err(ConfigError::OutOfRange {
                var: "MUSIC_VOLUME",
                value: music_volume.to_string(),
            });
        }

        let log_format = match lookup("LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("") | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: "LOG_FORMAT",
                    value: other.to_string(),
                })
            }
        };

        let hurtbox_model = match lookup("HURTBOX_MODEL").as_deref().map(str::trim) {
            None | Some("") => defaults.hurtbox_model,
            Some("body") => HurtboxModel::Body,
            Some("body_and_limb") => HurtboxModel::BodyAndLimb,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: "HURTBOX_MODEL",
                    value: other.to_string(),
                })
            }
        };

        Ok(Self {
            log_level: lookup("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_format,
            tick_rate,
            snapshot_every,
            match_seconds,
            result_delay: Duration::from_millis(result_delay_ms),
            hurtbox_model,
            music_volume,
            menu_bgm: lookup("MENU_BGM").unwrap_or(defaults.menu_bgm),
            battle_bgm: lookup("BATTLE_BGM").unwrap_or(defaults.battle_bgm),
            input_rate_limit: parse_or(&lookup, "INPUT_RATE_LIMIT", defaults.input_rate_limit)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&'static str) -> Option<String>,
    T: FromStr,
{
    match lookup(var) {
        None => Ok(default),
        Some(raw) if raw.trim().is_empty() => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid { var, value: raw }),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },

    #[error("Value for {var} out of range: {value}")]
    OutOfRange { var: &'static str, value: String },
}
