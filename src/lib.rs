//! Quiz Arcade - real-time multiple-choice arcade engine
//!
//! Core modules:
//! - `sim`: Deterministic simulation (questions, lanes, carriers, collisions, score, effects)
//! - `config`: Engine configuration and validation
//! - `settings`: Cosmetic feedback preferences
//! - `error`: Error taxonomy

pub mod config;
pub mod error;
pub mod settings;
pub mod sim;

pub use config::{CarrierShape, EngineConfig, Playfield, SelectionPolicy, TravelAxis, WeightTuning};
pub use error::EngineError;
pub use settings::{FeedbackSettings, QualityPreset};
pub use sim::{Engine, GameEvent, GamePhase, Question, Snapshot, TickInput};

use glam::Vec2;

/// Gameplay defaults
pub mod consts {
    /// Upper bound for a single frame delta (seconds)
    pub const MAX_FRAME_DT: f32 = 0.033;

    /// Playfield dimensions (pixels)
    pub const PLAYFIELD_WIDTH: f32 = 480.0;
    pub const PLAYFIELD_HEIGHT: f32 = 720.0;

    /// Lane defaults
    pub const DEFAULT_LANES: usize = 4;
    pub const DEFAULT_MAX_ACTIVE: usize = 3;
    /// Jittered pause before a lane respawns (seconds)
    pub const COOLDOWN_MIN: f32 = 0.6;
    pub const COOLDOWN_MAX: f32 = 1.6;
    /// Minimum gap between carriers travelling in the same lane
    pub const MIN_SPAWN_SPACING: f32 = 120.0;

    /// Carrier defaults
    pub const CARRIER_SPEED: f32 = 180.0;
    pub const CARRIER_WIDTH: f32 = 80.0;
    pub const CARRIER_HEIGHT: f32 = 48.0;
    /// Alpha lost per second while fading out
    pub const CARRIER_FADE_RATE: f32 = 3.0;
    /// How far past the far edge a carrier may travel before eviction
    pub const OFFSCREEN_MARGIN: f32 = 40.0;

    /// Avatar defaults
    pub const AVATAR_SIZE: f32 = 64.0;
    /// Position of the avatar along the travel axis (0 = spawn edge, 1 = far edge)
    pub const AVATAR_DEPTH: f32 = 0.85;
    /// Max lateral speed of the built-in follower (pixels/s)
    pub const AVATAR_SPEED: f32 = 900.0;
    /// Max cosmetic lean (radians)
    pub const AVATAR_MAX_LEAN: f32 = 0.35;

    /// Score/lives defaults
    pub const LIVES_START: u32 = 3;
    /// Delay between lives hitting 0 and the game-over overlay (seconds)
    pub const GAME_OVER_DELAY: f32 = 0.6;

    /// Feedback durations (seconds)
    pub const SHAKE_DURATION: f32 = 0.35;
    pub const DAMAGE_FLASH_DURATION: f32 = 0.3;
    pub const SUCCESS_FLASH_DURATION: f32 = 0.25;
    pub const AVATAR_PULSE_DURATION: f32 = 0.2;
    /// Peak screen shake offset (pixels)
    pub const SHAKE_AMPLITUDE: f32 = 10.0;
    /// Particles emitted per burst
    pub const BURST_PARTICLES: usize = 16;
    /// Downward drift applied to particles (pixels/s²)
    pub const PARTICLE_GRAVITY: f32 = 240.0;

    /// Particle colors (0xRRGGBB)
    pub const SUCCESS_COLOR: u32 = 0x4ade80;
    pub const DAMAGE_COLOR: u32 = 0xf87171;
    pub const GAME_OVER_COLOR: u32 = 0xfacc15;
}

/// Move `current` toward `target` by at most `max_delta`
#[inline]
pub fn move_toward(current: f32, target: f32, max_delta: f32) -> f32 {
    let delta = target - current;
    current + delta.clamp(-max_delta, max_delta)
}

/// Cross-axis center of a lane, given the playfield extent across lanes
#[inline]
pub fn lane_center(lane: usize, lanes: usize, extent: f32) -> f32 {
    let lane_width = extent / lanes as f32;
    lane_width * (lane as f32 + 0.5)
}

/// Unit vector at `angle` radians
#[inline]
pub fn unit_from_angle(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}
