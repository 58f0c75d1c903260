//! Answer carriers and the pool that owns them
//!
//! Lifecycle: `Active -> Hit -> (fade) -> removed`, or
//! `Active -> Expired -> removed` when a carrier leaves the playfield unhit.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::{CarrierShape, Playfield};

/// Carrier lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CarrierState {
    /// Moving, collidable
    Active,
    /// Consumed by a collision (or retired with its question); fading out
    Hit,
    /// Left the playfield without being hit
    Expired,
}

/// A moving entity representing one answer choice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Carrier {
    pub id: u32,
    pub lane: usize,
    pub answer_index: usize,
    /// Question cycle this carrier was spawned for
    pub cycle: u64,
    /// Correctness at spawn time (only trusted while `cycle` is current)
    pub is_correct: bool,
    pub pos: Vec2,
    pub vel: Vec2,
    pub shape: CarrierShape,
    pub state: CarrierState,
    /// Render opacity (1 = opaque); decays once no longer active
    pub alpha: f32,
    /// Spawned through the density-cap override
    #[serde(default)]
    pub forced: bool,
}

impl Carrier {
    #[inline]
    pub fn is_active(&self) -> bool {
        self.state == CarrierState::Active
    }

    /// Transition `Active -> Hit`. Returns false if the carrier was not active.
    pub fn mark_hit(&mut self) -> bool {
        if self.is_active() {
            self.state = CarrierState::Hit;
            true
        } else {
            false
        }
    }
}

/// Live carriers, kept in id order for deterministic iteration
#[derive(Debug, Clone)]
pub struct EntityPool {
    carriers: Vec<Carrier>,
    fade_rate: f32,
}

impl EntityPool {
    pub fn new(fade_rate: f32) -> Self {
        Self {
            carriers: Vec::new(),
            fade_rate,
        }
    }

    pub fn insert(&mut self, carrier: Carrier) {
        let at = self.carriers.partition_point(|c| c.id < carrier.id);
        self.carriers.insert(at, carrier);
    }

    /// Move active carriers; fade the rest and drop the fully faded
    pub fn advance(&mut self, dt: f32) {
        for carrier in self.carriers.iter_mut().filter(|c| c.is_active()) {
            carrier.pos += carrier.vel * dt;
        }
        self.fade(dt);
    }

    /// Fade consumed carriers without moving anything
    pub fn fade(&mut self, dt: f32) {
        let fade = self.fade_rate * dt;
        for carrier in self.carriers.iter_mut().filter(|c| !c.is_active()) {
            carrier.alpha = (carrier.alpha - fade).max(0.0);
        }
        self.carriers.retain(|c| c.is_active() || c.alpha > 0.0);
    }

    /// Evict active carriers that passed the far edge by more than `margin`.
    ///
    /// Returned carriers are in the `Expired` state; the caller owns rearming
    /// their lanes.
    pub fn remove_offscreen(&mut self, playfield: &Playfield, margin: f32) -> Vec<Carrier> {
        let limit = playfield.travel_extent() + margin;
        let mut expired = Vec::new();
        self.carriers.retain_mut(|c| {
            let trailing_edge =
                playfield.progress_of(c.pos) - c.shape.travel_half_extent(playfield.axis);
            if c.is_active() && trailing_edge > limit {
                c.state = CarrierState::Expired;
                expired.push(c.clone());
                false
            } else {
                true
            }
        });
        expired
    }

    pub fn get(&self, id: u32) -> Option<&Carrier> {
        self.carriers.iter().find(|c| c.id == id)
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut Carrier> {
        self.carriers.iter_mut().find(|c| c.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Carrier> {
        self.carriers.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Carrier> {
        self.carriers.iter_mut()
    }

    pub fn active(&self) -> impl Iterator<Item = &Carrier> {
        self.carriers.iter().filter(|c| c.is_active())
    }

    pub fn active_count(&self) -> usize {
        self.active().count()
    }

    pub fn active_in_lane(&self, lane: usize) -> bool {
        self.active().any(|c| c.lane == lane)
    }

    /// Is a correct carrier for `cycle` currently on the field?
    pub fn has_active_correct(&self, cycle: u64) -> bool {
        self.active().any(|c| c.cycle == cycle && c.is_correct)
    }

    pub fn is_empty(&self) -> bool {
        self.carriers.is_empty()
    }

    pub fn clear(&mut self) {
        self.carriers.clear();
    }

    /// Snapshot copy for the renderer
    pub fn to_vec(&self) -> Vec<Carrier> {
        self.carriers.clone()
    }
}
