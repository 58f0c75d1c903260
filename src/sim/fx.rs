//! Time-decayed feedback effects
//!
//! Shake, flashes, avatar pulse and particles. All of it is observational
//! state for the renderer; it has its own RNG stream and is never read back
//! by gameplay.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::settings::FeedbackSettings;
use crate::unit_from_angle;

/// Stream offset so effect randomness never mirrors gameplay randomness
const FX_SEED_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

/// A cosmetic particle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub age: f32,
    pub lifespan: f32,
    /// 0xRRGGBB
    pub color: u32,
    pub size: f32,
}

impl Particle {
    /// Remaining life in 0..=1
    pub fn life_fraction(&self) -> f32 {
        if self.lifespan <= 0.0 {
            0.0
        } else {
            (1.0 - self.age / self.lifespan).clamp(0.0, 1.0)
        }
    }
}

/// Seconds left on each effect
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectTimers {
    pub shake: f32,
    pub damage_flash: f32,
    pub success_flash: f32,
    pub avatar_pulse: f32,
}

/// Render parameters derived from the current effect state
#[derive(Debug, Clone, Serialize)]
pub struct FxSnapshot {
    /// Camera offset in pixels
    pub shake_offset: Vec2,
    /// Shake intensity 0..=1
    pub shake: f32,
    /// Overlay opacities 0..=1
    pub damage_flash: f32,
    pub success_flash: f32,
    /// Avatar scale multiplier (1 = rest)
    pub avatar_pulse_scale: f32,
    pub particles: Vec<Particle>,
}

#[derive(Debug, Clone)]
pub struct Feedback {
    settings: FeedbackSettings,
    timers: EffectTimers,
    particles: Vec<Particle>,
    rng: Pcg32,
    seed: u64,
    /// Seconds since reset; drives the shake wobble
    clock: f32,
}

fn ratio(remaining: f32, duration: f32) -> f32 {
    if duration <= 0.0 {
        0.0
    } else {
        (remaining / duration).clamp(0.0, 1.0)
    }
}

impl Feedback {
    pub fn new(settings: FeedbackSettings, seed: u64) -> Self {
        Self {
            settings,
            timers: EffectTimers::default(),
            particles: Vec::new(),
            rng: Pcg32::seed_from_u64(seed ^ FX_SEED_SALT),
            seed,
            clock: 0.0,
        }
    }

    pub fn settings(&self) -> &FeedbackSettings {
        &self.settings
    }

    pub fn timers(&self) -> EffectTimers {
        self.timers
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Correct answer: success flash, avatar pulse, green burst
    pub fn trigger_success(&mut self, origin: Vec2) {
        if self.settings.effective_flashes() {
            self.timers.success_flash = self.settings.success_flash_duration;
        }
        self.timers.avatar_pulse = self.settings.avatar_pulse_duration;
        self.burst(origin, SUCCESS_COLOR, self.settings.burst_size());
    }

    /// Wrong answer: damage flash, shake, red burst
    pub fn trigger_damage(&mut self, origin: Vec2) {
        if self.settings.effective_flashes() {
            self.timers.damage_flash = self.settings.damage_flash_duration;
        }
        if self.settings.effective_screen_shake() {
            self.timers.shake = self.settings.shake_duration;
        }
        self.burst(origin, DAMAGE_COLOR, self.settings.burst_size());
    }

    /// Run ending: double-length shake and a large burst
    pub fn trigger_game_over(&mut self, origin: Vec2) {
        if self.settings.effective_screen_shake() {
            self.timers.shake = self.settings.shake_duration * 2.0;
        }
        if self.settings.effective_flashes() {
            self.timers.damage_flash = self.settings.damage_flash_duration;
        }
        self.burst(origin, GAME_OVER_COLOR, self.settings.burst_size() * 2);
    }

    /// Emit `count` particles from `origin` in random directions
    pub fn burst(&mut self, origin: Vec2, color: u32, count: usize) {
        let cap = self.settings.max_particles();
        if cap == 0 {
            return;
        }
        for _ in 0..count {
            let angle: f32 = self.rng.random_range(0.0..std::f32::consts::TAU);
            let speed: f32 = self.rng.random_range(80.0..260.0);
            self.particles.push(Particle {
                pos: origin,
                vel: unit_from_angle(angle) * speed,
                age: 0.0,
                lifespan: self.rng.random_range(0.4..0.9),
                color,
                size: self.rng.random_range(2.0..5.0),
            });
        }
        // Oldest particles make room for new ones
        if self.particles.len() > cap {
            let excess = self.particles.len() - cap;
            self.particles.drain(..excess);
        }
    }

    /// Decay timers and integrate particles
    pub fn tick(&mut self, dt: f32) {
        self.clock += dt;

        let t = &mut self.timers;
        t.shake = (t.shake - dt).max(0.0);
        t.damage_flash = (t.damage_flash - dt).max(0.0);
        t.success_flash = (t.success_flash - dt).max(0.0);
        t.avatar_pulse = (t.avatar_pulse - dt).max(0.0);

        let gravity = self.settings.particle_gravity;
        for particle in &mut self.particles {
            particle.age += dt;
            particle.vel.y += gravity * dt;
            particle.pos += particle.vel * dt;
        }
        self.particles.retain(|p| p.age < p.lifespan);
    }

    /// Render parameters for the current instant
    pub fn snapshot(&self) -> FxSnapshot {
        let s = &self.settings;
        let shake_ratio = ratio(self.timers.shake, s.shake_duration);
        // Ease out: strong at first, tails off quickly
        let shake = shake_ratio * shake_ratio;
        let wobble = Vec2::new((self.clock * 47.0).sin(), (self.clock * 59.0).cos());
        let pulse = ratio(self.timers.avatar_pulse, s.avatar_pulse_duration);

        FxSnapshot {
            shake_offset: wobble * s.shake_amplitude * shake,
            shake,
            damage_flash: ratio(self.timers.damage_flash, s.damage_flash_duration),
            success_flash: ratio(self.timers.success_flash, s.success_flash_duration),
            avatar_pulse_scale: 1.0 + 0.25 * (pulse * std::f32::consts::PI).sin(),
            particles: self.particles.clone(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.settings.clone(), self.seed);
    }
}
