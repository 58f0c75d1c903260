//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Injected RNG only
//! - Stable iteration order (by carrier ID)
//! - No rendering, input or platform dependencies

pub mod carrier;
pub mod collision;
pub mod fx;
pub mod lanes;
pub mod question;
pub mod score;
pub mod state;
pub mod tick;

pub use carrier::{Carrier, CarrierState, EntityPool};
pub use collision::{Aabb, Outcome, OutcomeKind, Resolution, carrier_overlaps, resolve};
pub use fx::{EffectTimers, Feedback, FxSnapshot, Particle};
pub use lanes::{AnswerSlot, LaneSpawnManager, SlotTable};
pub use question::{Question, QuestionScheduler, load_bank, validate_bank};
pub use score::{Penalty, Scoreboard};
pub use state::{Avatar, GameEvent, GamePhase, Snapshot};
pub use tick::{Engine, FrameClock, TickInput, clamp_dt};
