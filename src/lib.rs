//! Duel Arena - two-player local fighting game simulation
//!
//! The simulation core is frontend-agnostic: a renderer and sound layer talk
//! to it over JSON lines (see [`wire::protocol`]).

pub mod app;
pub mod audio;
pub mod config;
pub mod game;
pub mod util;
pub mod wire;
