//! Feedback preferences
//!
//! Purely cosmetic: nothing here may change score, lives or collisions.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Maximum live particles for this preset
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 48,
            QualityPreset::Medium => 160,
            QualityPreset::High => 512,
        }
    }

    /// Burst size multiplier (1.0 = full)
    pub fn burst_scale(&self) -> f32 {
        match self {
            QualityPreset::Low => 0.5,
            QualityPreset::Medium => 1.0,
            QualityPreset::High => 1.5,
        }
    }
}

/// Feedback settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackSettings {
    pub quality: QualityPreset,

    // === Toggles ===
    /// Screen shake on wrong answers and game over
    pub screen_shake: bool,
    /// Full-screen damage/success flashes
    pub flashes: bool,
    /// Particle bursts
    pub particles: bool,
    /// Reduced motion (suppresses shake and flashes)
    pub reduced_motion: bool,

    // === Durations (seconds) ===
    pub shake_duration: f32,
    pub damage_flash_duration: f32,
    pub success_flash_duration: f32,
    pub avatar_pulse_duration: f32,

    // === Particles ===
    pub burst_particles: usize,
    /// Downward drift (pixels/s²)
    pub particle_gravity: f32,
    /// Peak shake offset (pixels)
    pub shake_amplitude: f32,
}

impl Default for FeedbackSettings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,

            screen_shake: true,
            flashes: true,
            particles: true,
            reduced_motion: false,

            shake_duration: SHAKE_DURATION,
            damage_flash_duration: DAMAGE_FLASH_DURATION,
            success_flash_duration: SUCCESS_FLASH_DURATION,
            avatar_pulse_duration: AVATAR_PULSE_DURATION,

            burst_particles: BURST_PARTICLES,
            particle_gravity: PARTICLE_GRAVITY,
            shake_amplitude: SHAKE_AMPLITUDE,
        }
    }
}

impl FeedbackSettings {
    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Apply a quality preset (Low also drops flashes)
    pub fn apply_preset(&mut self, preset: QualityPreset) {
        self.quality = preset;
        if preset == QualityPreset::Low {
            self.flashes = false;
        }
    }

    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// Effective flashes (respects reduced_motion)
    pub fn effective_flashes(&self) -> bool {
        self.flashes && !self.reduced_motion
    }

    /// Effective particle cap
    pub fn max_particles(&self) -> usize {
        if !self.particles {
            0
        } else {
            self.quality.max_particles()
        }
    }

    /// Particles per burst after quality scaling
    pub fn burst_size(&self) -> usize {
        (self.burst_particles as f32 * self.quality.burst_scale()).round() as usize
    }
}
