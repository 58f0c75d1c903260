//! Engine configuration
//!
//! Everything tunable about a run lives in [`EngineConfig`]. Configs are
//! validated before the engine accepts them.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::EngineError;
use crate::lane_center;
use crate::settings::FeedbackSettings;

/// Direction carriers travel across the playfield
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TravelAxis {
    /// Top to bottom, lanes are columns (runner / dodger)
    #[default]
    Down,
    /// Right to left, lanes are rows (side-scrolling shooter)
    Left,
}

/// Playfield geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Playfield {
    pub width: f32,
    pub height: f32,
    pub axis: TravelAxis,
}

impl Default for Playfield {
    fn default() -> Self {
        Self {
            width: PLAYFIELD_WIDTH,
            height: PLAYFIELD_HEIGHT,
            axis: TravelAxis::Down,
        }
    }
}

impl Playfield {
    /// Extent across lanes
    pub fn lane_extent(&self) -> f32 {
        match self.axis {
            TravelAxis::Down => self.width,
            TravelAxis::Left => self.height,
        }
    }

    /// Extent along the travel axis
    pub fn travel_extent(&self) -> f32 {
        match self.axis {
            TravelAxis::Down => self.height,
            TravelAxis::Left => self.width,
        }
    }

    /// Unit travel direction in screen space
    pub fn travel_dir(&self) -> Vec2 {
        match self.axis {
            TravelAxis::Down => Vec2::Y,
            TravelAxis::Left => Vec2::NEG_X,
        }
    }

    /// Screen point from (cross-axis coordinate, travel progress)
    pub fn point(&self, cross: f32, progress: f32) -> Vec2 {
        match self.axis {
            TravelAxis::Down => Vec2::new(cross, progress),
            TravelAxis::Left => Vec2::new(self.width - progress, cross),
        }
    }

    /// Screen point at the center of `lane`
    pub fn lane_point(&self, lane: usize, lanes: usize, progress: f32) -> Vec2 {
        self.point(lane_center(lane, lanes, self.lane_extent()), progress)
    }

    /// Travel progress of a screen point (0 = spawn edge)
    pub fn progress_of(&self, pos: Vec2) -> f32 {
        match self.axis {
            TravelAxis::Down => pos.y,
            TravelAxis::Left => self.width - pos.x,
        }
    }

    /// Cross-axis coordinate of a screen point
    pub fn cross_of(&self, pos: Vec2) -> f32 {
        match self.axis {
            TravelAxis::Down => pos.x,
            TravelAxis::Left => pos.y,
        }
    }

    /// Lane whose band contains the cross-axis coordinate (clamped)
    pub fn lane_at(&self, cross: f32, lanes: usize) -> usize {
        let lane_width = self.lane_extent() / lanes as f32;
        let lane = (cross / lane_width).floor();
        (lane.max(0.0) as usize).min(lanes - 1)
    }
}

/// Collision shape of a carrier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CarrierShape {
    Box { width: f32, height: f32 },
    Circle { radius: f32 },
}

impl Default for CarrierShape {
    fn default() -> Self {
        CarrierShape::Box {
            width: CARRIER_WIDTH,
            height: CARRIER_HEIGHT,
        }
    }
}

impl CarrierShape {
    /// Half extent along the travel axis
    pub fn travel_half_extent(&self, axis: TravelAxis) -> f32 {
        match (*self, axis) {
            (CarrierShape::Box { height, .. }, TravelAxis::Down) => height / 2.0,
            (CarrierShape::Box { width, .. }, TravelAxis::Left) => width / 2.0,
            (CarrierShape::Circle { radius }, _) => radius,
        }
    }

    fn is_valid(&self) -> bool {
        match *self {
            CarrierShape::Box { width, height } => width > 0.0 && height > 0.0,
            CarrierShape::Circle { radius } => radius > 0.0,
        }
    }
}

/// Question selection policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SelectionPolicy {
    /// Random permutation consumed in order, reshuffled when exhausted
    #[default]
    Shuffle,
    /// Weighted random; missed questions resurface more often
    Weighted,
}

/// Weight adjustments for [`SelectionPolicy::Weighted`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightTuning {
    /// Multiplier applied on a correct hit (< 1)
    pub correct_factor: f32,
    /// Multiplier applied on a wrong hit (> 1)
    pub wrong_factor: f32,
    pub min: f32,
    pub max: f32,
}

impl Default for WeightTuning {
    fn default() -> Self {
        Self {
            correct_factor: 0.5,
            wrong_factor: 2.0,
            min: 0.125,
            max: 8.0,
        }
    }
}

/// Full engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of lanes (>= 2)
    pub lanes: usize,
    /// Density cap on simultaneously active carriers (>= 1)
    pub max_active_carriers: usize,
    /// Jittered respawn pause per lane, seconds (min, max)
    pub cooldown_range: (f32, f32),
    /// Carrier speed along the travel axis (pixels/s)
    pub travel_speed: f32,
    /// Seconds between lives reaching 0 and game over
    pub game_over_delay: f32,
    pub lives_start: u32,
    /// Seed for the default RNG
    pub seed: u64,

    pub playfield: Playfield,
    pub carrier_shape: CarrierShape,
    /// Avatar bounding box (width, height)
    pub avatar_size: (f32, f32),
    /// Avatar position along the travel axis (fraction of travel extent)
    pub avatar_depth: f32,
    /// Max cross-axis speed of the built-in avatar follower
    pub avatar_speed: f32,
    pub min_spawn_spacing: f32,
    /// Alpha lost per second by hit carriers
    pub fade_rate: f32,
    pub offscreen_margin: f32,
    /// Upper bound for one frame delta (seconds)
    pub max_frame_dt: f32,

    pub policy: SelectionPolicy,
    pub weights: WeightTuning,
    /// Permute the answer-to-lane binding for each question
    pub shuffle_lanes: bool,

    pub feedback: FeedbackSettings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lanes: DEFAULT_LANES,
            max_active_carriers: DEFAULT_MAX_ACTIVE,
            cooldown_range: (COOLDOWN_MIN, COOLDOWN_MAX),
            travel_speed: CARRIER_SPEED,
            game_over_delay: GAME_OVER_DELAY,
            lives_start: LIVES_START,
            seed: 0x5eed,

            playfield: Playfield::default(),
            carrier_shape: CarrierShape::default(),
            avatar_size: (AVATAR_SIZE, AVATAR_SIZE),
            avatar_depth: AVATAR_DEPTH,
            avatar_speed: AVATAR_SPEED,
            min_spawn_spacing: MIN_SPAWN_SPACING,
            fade_rate: CARRIER_FADE_RATE,
            offscreen_margin: OFFSCREEN_MARGIN,
            max_frame_dt: MAX_FRAME_DT,

            policy: SelectionPolicy::Shuffle,
            weights: WeightTuning::default(),
            shuffle_lanes: false,

            feedback: FeedbackSettings::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a config from JSON (missing fields take defaults) and validate it
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| EngineError::config(format!("unreadable config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the engine cannot run
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.lanes < 2 {
            return Err(EngineError::config(format!(
                "lanes must be >= 2 (got {})",
                self.lanes
            )));
        }
        if self.max_active_carriers < 1 {
            return Err(EngineError::config("max_active_carriers must be >= 1"));
        }
        let (min, max) = self.cooldown_range;
        if !min.is_finite() || !max.is_finite() || min < 0.0 || min > max {
            return Err(EngineError::config(format!(
                "cooldown_range must satisfy 0 <= min <= max (got {min}..{max})"
            )));
        }
        if !(self.travel_speed > 0.0) {
            return Err(EngineError::config("travel_speed must be > 0"));
        }
        if self.lives_start < 1 {
            return Err(EngineError::config("lives_start must be >= 1"));
        }
        if !(self.game_over_delay >= 0.0) {
            return Err(EngineError::config("game_over_delay must be >= 0"));
        }
        if !(self.max_frame_dt > 0.0) {
            return Err(EngineError::config("max_frame_dt must be > 0"));
        }
        if !(self.playfield.width > 0.0 && self.playfield.height > 0.0) {
            return Err(EngineError::config("playfield dimensions must be > 0"));
        }
        if !self.carrier_shape.is_valid() {
            return Err(EngineError::config("carrier shape dimensions must be > 0"));
        }
        if !(self.avatar_size.0 > 0.0 && self.avatar_size.1 > 0.0) {
            return Err(EngineError::config("avatar_size must be > 0"));
        }
        if !(0.0..=1.0).contains(&self.avatar_depth) {
            return Err(EngineError::config("avatar_depth must be within 0..=1"));
        }
        if !(self.avatar_speed > 0.0) {
            return Err(EngineError::config("avatar_speed must be > 0"));
        }
        if !(self.min_spawn_spacing >= 0.0) {
            return Err(EngineError::config("min_spawn_spacing must be >= 0"));
        }
        if !(self.fade_rate > 0.0) {
            return Err(EngineError::config("fade_rate must be > 0"));
        }
        if !(self.offscreen_margin >= 0.0) {
            return Err(EngineError::config("offscreen_margin must be >= 0"));
        }
        let w = &self.weights;
        if !(w.correct_factor > 0.0 && w.correct_factor <= 1.0) {
            return Err(EngineError::config("weights.correct_factor must be within (0, 1]"));
        }
        if !(w.wrong_factor >= 1.0) {
            return Err(EngineError::config("weights.wrong_factor must be >= 1"));
        }
        if !(w.min > 0.0 && w.min <= w.max) {
            return Err(EngineError::config("weights must satisfy 0 < min <= max"));
        }
        Ok(())
    }

    /// Travel progress at which the avatar sits
    pub fn avatar_progress(&self) -> f32 {
        self.playfield.travel_extent() * self.avatar_depth
    }
}
