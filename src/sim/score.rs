//! Score, lives and the delayed game-over transition
//!
//! Lives reaching zero only arms a countdown. The run ends when the countdown
//! runs out, so the feedback for the fatal hit is visible before the
//! game-over overlay.

use serde::{Deserialize, Serialize};

/// Slack for float accumulation when the countdown lands on zero
const DELAY_EPSILON: f32 = 1e-6;

/// What a wrong answer cost
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Penalty {
    /// Question already solved this cycle, or the run is ending
    Ignored,
    LifeLost { lives_left: u32 },
    /// Last life gone; game over is pending
    LastLife,
}

/// Score and lives bookkeeping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scoreboard {
    pub score: u32,
    pub lives: u32,
    pub is_over: bool,
    pub pending_game_over: bool,
    pub game_over_delay_remaining: f32,
    /// Consecutive correct answers
    pub streak: u32,
    pub best_streak: u32,
    /// Cycle already answered correctly
    solved_cycle: Option<u64>,
    lives_start: u32,
    game_over_delay: f32,
}

impl Scoreboard {
    pub fn new(lives_start: u32, game_over_delay: f32) -> Self {
        Self {
            score: 0,
            lives: lives_start,
            is_over: false,
            pending_game_over: false,
            game_over_delay_remaining: 0.0,
            streak: 0,
            best_streak: 0,
            solved_cycle: None,
            lives_start,
            game_over_delay,
        }
    }

    /// No further score or lives changes
    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.is_over || self.pending_game_over
    }

    pub fn is_solved(&self, cycle: u64) -> bool {
        self.solved_cycle == Some(cycle)
    }

    /// Record a correct answer. Returns false if this cycle already scored.
    pub fn on_correct(&mut self, cycle: u64) -> bool {
        if self.is_frozen() || self.is_solved(cycle) {
            return false;
        }
        self.score = self.score.saturating_add(1);
        self.streak += 1;
        self.best_streak = self.best_streak.max(self.streak);
        self.solved_cycle = Some(cycle);
        true
    }

    /// Record a wrong answer for `cycle`
    pub fn on_wrong(&mut self, cycle: u64) -> Penalty {
        if self.is_frozen() || self.is_solved(cycle) {
            return Penalty::Ignored;
        }
        self.streak = 0;
        self.lives = self.lives.saturating_sub(1);
        if self.lives == 0 {
            self.pending_game_over = true;
            self.game_over_delay_remaining = self.game_over_delay;
            log::info!("Last life lost, game over in {:.2}s", self.game_over_delay);
            Penalty::LastLife
        } else {
            Penalty::LifeLost {
                lives_left: self.lives,
            }
        }
    }

    /// Run the game-over countdown. Returns true on the tick the run ends.
    pub fn tick(&mut self, dt: f32) -> bool {
        if !self.pending_game_over || self.is_over {
            return false;
        }
        self.game_over_delay_remaining = (self.game_over_delay_remaining - dt).max(0.0);
        if self.game_over_delay_remaining <= DELAY_EPSILON {
            self.game_over_delay_remaining = 0.0;
            self.is_over = true;
            log::info!("Game over (score {})", self.score);
            return true;
        }
        false
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.lives_start, self.game_over_delay);
    }
}
