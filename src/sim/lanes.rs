//! Lanes: answer slots, per-lane cooldowns and spawn decisions
//!
//! A lane may spawn when its cooldown has run out, it holds no active
//! carrier, and the field is under the density cap. The correct answer's lane
//! is always considered first and may exceed the cap so that no question can
//! become unsolvable.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::carrier::{Carrier, CarrierState, EntityPool};
use super::question::Question;
use crate::config::{CarrierShape, EngineConfig, Playfield};

/// Binding of one answer to one lane for the current question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerSlot {
    pub lane: usize,
    pub answer_index: usize,
    pub is_correct: bool,
}

/// Per-lane answer bindings for the current question cycle
#[derive(Debug, Clone, Default)]
pub struct SlotTable {
    lanes: Vec<Option<AnswerSlot>>,
    cycle: u64,
}

impl SlotTable {
    pub fn new(lanes: usize) -> Self {
        Self {
            lanes: vec![None; lanes],
            cycle: 0,
        }
    }

    /// Rebind lanes for a newly current question.
    ///
    /// Identity binding (answer `i` in lane `i`) unless `shuffle` is set. When
    /// there are more answers than lanes the correct answer always gets a lane.
    pub fn bind<R: Rng>(&mut self, question: &Question, cycle: u64, shuffle: bool, rng: &mut R) {
        let lane_count = self.lanes.len();
        let mut answers: Vec<usize> = if question.answers.len() <= lane_count {
            (0..question.answers.len()).collect()
        } else {
            let mut distractors: Vec<usize> = (0..question.answers.len())
                .filter(|&i| i != question.correct_index)
                .collect();
            distractors.shuffle(rng);
            distractors.truncate(lane_count - 1);
            distractors.push(question.correct_index);
            distractors.sort_unstable();
            distractors
        };

        let mut lanes: Vec<usize> = (0..lane_count).collect();
        if shuffle {
            lanes.shuffle(rng);
        }

        self.lanes.iter_mut().for_each(|slot| *slot = None);
        for (answer_index, lane) in answers.drain(..).zip(lanes) {
            self.lanes[lane] = Some(AnswerSlot {
                lane,
                answer_index,
                is_correct: question.is_correct(answer_index),
            });
        }
        self.cycle = cycle;
    }

    pub fn get(&self, lane: usize) -> Option<&AnswerSlot> {
        self.lanes.get(lane).and_then(|s| s.as_ref())
    }

    pub fn correct_lane(&self) -> Option<usize> {
        self.iter().find(|s| s.is_correct).map(|s| s.lane)
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AnswerSlot> {
        self.lanes.iter().flatten()
    }
}

/// Per-lane cooldowns and spawn policy
#[derive(Debug, Clone)]
pub struct LaneSpawnManager {
    cooldowns: Vec<f32>,
    /// Round-robin start for the next pass
    cursor: usize,
    cooldown_range: (f32, f32),
    max_active: usize,
    min_spacing: f32,
    speed: f32,
    shape: CarrierShape,
    playfield: Playfield,
    next_id: u32,
}

impl LaneSpawnManager {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            cooldowns: vec![0.0; config.lanes],
            cursor: 0,
            cooldown_range: config.cooldown_range,
            max_active: config.max_active_carriers,
            min_spacing: config.min_spawn_spacing,
            speed: config.travel_speed,
            shape: config.carrier_shape,
            playfield: config.playfield,
            next_id: 1,
        }
    }

    /// Stagger the initial cooldowns within `[0, min]` so lanes don't open in sync
    pub fn reset<R: Rng>(&mut self, rng: &mut R) {
        let stagger = self.cooldown_range.0;
        for cooldown in &mut self.cooldowns {
            *cooldown = rng.random_range(0.0..=stagger);
        }
        self.cursor = 0;
        self.next_id = 1;
    }

    /// Count every lane's cooldown down, floored at zero
    pub fn tick(&mut self, dt: f32) {
        for cooldown in &mut self.cooldowns {
            *cooldown = (*cooldown - dt).max(0.0);
        }
    }

    pub fn remaining(&self, lane: usize) -> f32 {
        self.cooldowns.get(lane).copied().unwrap_or(0.0)
    }

    pub fn lane_count(&self) -> usize {
        self.cooldowns.len()
    }

    pub fn max_active(&self) -> usize {
        self.max_active
    }

    /// A lane's carrier was consumed: start a jittered pause
    pub fn rearm<R: Rng>(&mut self, lane: usize, rng: &mut R) {
        let (min, max) = self.cooldown_range;
        if let Some(cooldown) = self.cooldowns.get_mut(lane) {
            *cooldown = rng.random_range(min..=max);
        }
    }

    fn lane_ready(&self, lane: usize, pool: &EntityPool) -> bool {
        self.remaining(lane) <= 0.0 && !pool.active_in_lane(lane)
    }

    /// Lane of the current correct answer, if it needs a carrier and may spawn
    /// one right now (density cap ignored)
    fn pending_correct_lane(&self, slots: &SlotTable, pool: &EntityPool) -> Option<usize> {
        if pool.has_active_correct(slots.cycle()) {
            return None;
        }
        slots
            .correct_lane()
            .filter(|&lane| self.lane_ready(lane, pool))
    }

    /// Spawn a carrier for `lane` if its cooldown is over, it holds no active
    /// carrier and the field is under the density cap
    pub fn try_spawn(
        &mut self,
        lane: usize,
        slots: &SlotTable,
        pool: &EntityPool,
    ) -> Option<Carrier> {
        if pool.active_count() >= self.max_active || !self.lane_ready(lane, pool) {
            return None;
        }
        let slot = *slots.get(lane)?;
        Some(self.build_carrier(slot, slots.cycle(), pool, false))
    }

    /// Spawn the correct answer's carrier, bypassing the density cap
    pub fn force_correct(&mut self, slots: &SlotTable, pool: &EntityPool) -> Option<Carrier> {
        let lane = self.pending_correct_lane(slots, pool)?;
        let slot = *slots.get(lane)?;
        let over_cap = pool.active_count() >= self.max_active;
        Some(self.build_carrier(slot, slots.cycle(), pool, over_cap))
    }

    /// Which lane the next spawn attempt would pick
    pub fn next_spawn_lane(&self, slots: &SlotTable, pool: &EntityPool) -> Option<usize> {
        if let Some(lane) = self.pending_correct_lane(slots, pool) {
            return Some(lane);
        }
        if pool.active_count() >= self.max_active {
            return None;
        }
        let lanes = self.lane_count();
        (0..lanes)
            .map(|offset| (self.cursor + offset) % lanes)
            .find(|&lane| slots.get(lane).is_some() && self.lane_ready(lane, pool))
    }

    /// One frame of spawning: correct lane first, then round-robin under the cap.
    /// Returns the number of carriers spawned.
    pub fn spawn_pass(&mut self, slots: &SlotTable, pool: &mut EntityPool) -> usize {
        let mut spawned = 0;
        if let Some(carrier) = self.force_correct(slots, pool) {
            if carrier.forced {
                log::debug!("Forced correct carrier into lane {}", carrier.lane);
            }
            pool.insert(carrier);
            spawned += 1;
        }

        let lanes = self.lane_count();
        let start = self.cursor;
        for offset in 0..lanes {
            let lane = (start + offset) % lanes;
            if let Some(carrier) = self.try_spawn(lane, slots, pool) {
                pool.insert(carrier);
                spawned += 1;
                self.cursor = (lane + 1) % lanes;
            }
        }
        spawned
    }

    fn build_carrier(
        &mut self,
        slot: AnswerSlot,
        cycle: u64,
        pool: &EntityPool,
        forced: bool,
    ) -> Carrier {
        let field = &self.playfield;
        // Start just behind the spawn edge, pushed back to keep the lane gap
        let mut progress = -self.shape.travel_half_extent(field.axis);
        for other in pool.iter().filter(|c| c.lane == slot.lane) {
            progress = progress.min(field.progress_of(other.pos) - self.min_spacing);
        }

        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);

        Carrier {
            id,
            lane: slot.lane,
            answer_index: slot.answer_index,
            cycle,
            is_correct: slot.is_correct,
            pos: field.lane_point(slot.lane, self.lane_count(), progress),
            vel: field.travel_dir() * self.speed,
            shape: self.shape,
            state: CarrierState::Active,
            alpha: 1.0,
            forced,
        }
    }
}
