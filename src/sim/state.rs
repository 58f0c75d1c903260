//! Avatar, phases, events and the render snapshot

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::carrier::Carrier;
use super::collision::Aabb;
use super::fx::FxSnapshot;
use super::lanes::AnswerSlot;
use super::question::Question;
use crate::config::{EngineConfig, TravelAxis};
use crate::consts::AVATAR_MAX_LEAN;
use crate::{lane_center, move_toward};

/// Current phase of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// No question bank loaded yet
    Idle,
    Playing,
    Paused,
    /// Run ended; waits for `restart`
    GameOver,
}

/// Events for the UI collaborator (answer-row flash, HUD text, overlay)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    QuestionChanged { cycle: u64, bank_index: usize },
    CorrectAnswer { answer_index: usize, cycle: u64 },
    WrongAnswer { answer_index: usize, cycle: u64, lives_left: u32 },
    /// Lives hit zero; the overlay follows after the delay
    GameOverPending,
    GameOver { score: u32 },
}

/// The player's avatar.
///
/// Collision only ever reads [`Avatar::bounds`]. Position is either supplied
/// by the input collaborator or produced by the built-in follower.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Avatar {
    pub pos: Vec2,
    pub half_size: Vec2,
    pub desired_lane: usize,
    /// Continuous steering in -1..=1 (shooter variant); 0 = lane steering
    pub thrust: f32,
    /// Cosmetic lean (radians) from lateral speed
    pub lean: f32,
}

impl Avatar {
    pub fn new(config: &EngineConfig) -> Self {
        let lane = config.lanes / 2;
        let half_size = Vec2::new(config.avatar_size.0, config.avatar_size.1) * 0.5;
        Self {
            pos: config
                .playfield
                .lane_point(lane, config.lanes, config.avatar_progress()),
            half_size,
            desired_lane: lane,
            thrust: 0.0,
            lean: 0.0,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.pos, self.half_size)
    }

    fn cross_half(&self, axis: TravelAxis) -> f32 {
        match axis {
            TravelAxis::Down => self.half_size.x,
            TravelAxis::Left => self.half_size.y,
        }
    }

    /// Ease toward the desired lane, or drift with thrust
    pub fn follow(&mut self, dt: f32, config: &EngineConfig) {
        let field = &config.playfield;
        let cross = field.cross_of(self.pos);
        let max_step = config.avatar_speed * dt;

        let next = if self.thrust != 0.0 {
            let half = self.cross_half(field.axis);
            let moved = cross + self.thrust * max_step;
            let clamped = moved.clamp(half, (field.lane_extent() - half).max(half));
            self.desired_lane = field.lane_at(clamped, config.lanes);
            clamped
        } else {
            let target = lane_center(self.desired_lane, config.lanes, field.lane_extent());
            move_toward(cross, target, max_step)
        };

        self.lean = if dt > 0.0 {
            let lateral = (next - cross) / dt;
            (lateral / config.avatar_speed).clamp(-1.0, 1.0) * AVATAR_MAX_LEAN
        } else {
            0.0
        };
        self.pos = field.point(next, config.avatar_progress());
    }

    /// Take a position from the input collaborator
    pub fn place(&mut self, pos: Vec2, dt: f32, config: &EngineConfig) {
        let field = &config.playfield;
        let lateral = field.cross_of(pos) - field.cross_of(self.pos);
        self.lean = if dt > 0.0 {
            (lateral / dt / config.avatar_speed).clamp(-1.0, 1.0) * AVATAR_MAX_LEAN
        } else {
            0.0
        };
        self.pos = pos;
        self.desired_lane = field.lane_at(field.cross_of(pos), config.lanes);
    }
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub phase: GamePhase,
    pub cycle: u64,
    pub question: Option<Question>,
    pub slots: Vec<AnswerSlot>,
    pub carriers: Vec<Carrier>,
    pub avatar_box: Aabb,
    pub avatar_lean: f32,
    pub score: u32,
    pub lives: u32,
    pub streak: u32,
    pub is_over: bool,
    pub pending_game_over: bool,
    pub effects: FxSnapshot,
    /// Events raised since the previous snapshot
    pub events: Vec<GameEvent>,
}
