//! Collision detection and resolution
//!
//! Detection is a plain overlap test between the avatar's box and each active
//! carrier. Resolution is deterministic: correct overlaps are handled before
//! wrong ones, and a correct hit retires every other carrier of the same
//! question in the same frame.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::carrier::{Carrier, EntityPool};
use super::question::Question;
use crate::config::CarrierShape;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn from_center(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn half_extents(&self) -> Vec2 {
        (self.max - self.min) * 0.5
    }

    /// Strict overlap (touching edges do not count)
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }

    /// Closest point inside the box to `p`
    #[inline]
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min, self.max)
    }
}

/// Circle vs box overlap
pub fn circle_aabb_overlap(center: Vec2, radius: f32, aabb: &Aabb) -> bool {
    let closest = aabb.closest_point(center);
    closest.distance_squared(center) < radius * radius
}

/// Does an active carrier's shape overlap the avatar box?
pub fn carrier_overlaps(carrier: &Carrier, avatar: &Aabb) -> bool {
    match carrier.shape {
        CarrierShape::Box { width, height } => {
            Aabb::from_center(carrier.pos, Vec2::new(width, height) * 0.5).intersects(avatar)
        }
        CarrierShape::Circle { radius } => circle_aabb_overlap(carrier.pos, radius, avatar),
    }
}

/// What a collision meant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutcomeKind {
    Correct,
    Wrong,
}

/// A scoring collision
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub carrier_id: u32,
    pub lane: usize,
    pub answer_index: usize,
    pub cycle: u64,
    pub pos: Vec2,
    pub result: OutcomeKind,
}

impl Outcome {
    fn from_carrier(carrier: &Carrier, result: OutcomeKind) -> Self {
        Self {
            carrier_id: carrier.id,
            lane: carrier.lane,
            answer_index: carrier.answer_index,
            cycle: carrier.cycle,
            pos: carrier.pos,
            result,
        }
    }
}

/// Result of one frame of collision resolution
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Scoring outcomes, correct first
    pub outcomes: Vec<Outcome>,
    /// Lanes of carriers retired without scoring (same-question sweep, stale cycles)
    pub retired_lanes: Vec<usize>,
}

impl Resolution {
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty() && self.retired_lanes.is_empty()
    }

    pub fn correct(&self) -> Option<&Outcome> {
        self.outcomes
            .iter()
            .find(|o| o.result == OutcomeKind::Correct)
    }
}

/// Resolve avatar collisions against the pool for the current question.
///
/// Correctness is derived from `(cycle, question)` at call time, never from a
/// carrier's cached flag. Carriers already `Hit` are ignored, so each carrier
/// produces at most one outcome.
pub fn resolve(
    avatar: &Aabb,
    pool: &mut EntityPool,
    cycle: u64,
    question: &Question,
) -> Resolution {
    let mut resolution = Resolution::default();

    let overlapping: Vec<u32> = pool
        .active()
        .filter(|c| carrier_overlaps(c, avatar))
        .map(|c| c.id)
        .collect();
    if overlapping.is_empty() {
        return resolution;
    }

    let mut correct = Vec::new();
    let mut wrong = Vec::new();
    for id in overlapping {
        let Some(carrier) = pool.get_mut(id) else {
            continue;
        };
        if carrier.cycle != cycle {
            // Left over from an earlier question: retire quietly
            carrier.mark_hit();
            resolution.retired_lanes.push(carrier.lane);
        } else if question.is_correct(carrier.answer_index) {
            correct.push(id);
        } else {
            wrong.push(id);
        }
    }

    if let Some(&winner) = correct.first() {
        if let Some(carrier) = pool.get_mut(winner) {
            carrier.mark_hit();
            resolution
                .outcomes
                .push(Outcome::from_carrier(carrier, OutcomeKind::Correct));
        }
        // Question solved: every other carrier of this cycle goes, hit or not
        for carrier in pool.iter_mut().filter(|c| c.cycle == cycle) {
            if carrier.mark_hit() {
                resolution.retired_lanes.push(carrier.lane);
            }
        }
        return resolution;
    }

    for id in wrong {
        if let Some(carrier) = pool.get_mut(id) {
            carrier.mark_hit();
            resolution
                .outcomes
                .push(Outcome::from_carrier(carrier, OutcomeKind::Wrong));
        }
    }
    resolution
}
