//! Animation configuration.
//!
//! Every tunable is fixed once the [`Starfield`](crate::Starfield) is built.
//! Configs can be assembled with the `with_*` builder methods or loaded from
//! a JSON file; fields missing from the file keep their defaults.
//!
//! ```ignore
//! let config = StarfieldConfig::default()
//!     .with_num_stars(200)
//!     .with_line_color([40, 80, 160])
//!     .with_seed(7);
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Which frame scheduling strategy the host uses.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerKind {
    /// Frames follow the window's redraw cadence.
    #[default]
    Native,
    /// Frames are paced by a fixed timer at `fallback_fps`.
    Timer,
}

/// Hints for how the drawing surface sits on the desktop.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SurfaceHints {
    /// Opacity of the whole surface, 0.0-1.0. Applied once to the finished
    /// frame, so overlapping lines do not build up past it.
    pub opacity: f32,
    /// Stacking hint: negative keeps the window below others, positive above.
    pub layer: i32,
    /// Clear color. `None` requests a transparent window.
    pub background: Option<[u8; 3]>,
}

impl Default for SurfaceHints {
    fn default() -> Self {
        Self {
            opacity: 0.5,
            layer: -1,
            background: Some([255, 255, 255]),
        }
    }
}

/// Tunables for the star field.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StarfieldConfig {
    /// Number of stars. Large counts cost quadratically per frame.
    pub num_stars: usize,
    /// How strongly the pointer pulls stars toward itself.
    pub gravitational_pull: f32,
    /// Maximum speed of a new star, and the band friction restores.
    pub normal_max_speed: f32,
    /// Squared distance at which two stars notice each other.
    pub star_radius_sq: f32,
    /// Squared distance at which the pointer notices a star.
    pub mouse_radius_sq: f32,
    /// Per-frame slowdown for stars above `normal_max_speed`.
    pub friction: f32,
    /// Base RGB of connecting lines.
    pub line_color: [u8; 3],
    /// Fill RGB of stars.
    pub star_color: [u8; 3],
    /// Side length of a star square, in pixels.
    pub star_size: f32,
    pub surface: SurfaceHints,
    pub scheduler: SchedulerKind,
    /// Cadence of the timer scheduler.
    pub fallback_fps: f32,
    /// Delay before the first frame, in milliseconds.
    pub start_delay_ms: u64,
    /// Seed for star placement. `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for StarfieldConfig {
    fn default() -> Self {
        Self {
            num_stars: 150,
            gravitational_pull: 0.0004,
            normal_max_speed: 1.0,
            star_radius_sq: 6e3,
            mouse_radius_sq: 2e4,
            friction: 0.01,
            line_color: [99, 99, 99],
            star_color: [0, 0, 0],
            star_size: 1.0,
            surface: SurfaceHints::default(),
            scheduler: SchedulerKind::Native,
            fallback_fps: 45.0,
            start_delay_ms: 100,
            seed: None,
        }
    }
}

impl StarfieldConfig {
    /// Load and validate a config from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parse and validate a config from JSON text.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the frame loop cannot do anything sensible with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let non_negative = [
            ("gravitational_pull", self.gravitational_pull),
            ("normal_max_speed", self.normal_max_speed),
            ("star_radius_sq", self.star_radius_sq),
            ("mouse_radius_sq", self.mouse_radius_sq),
            ("friction", self.friction),
            ("star_size", self.star_size),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{} must be finite and >= 0, got {}",
                    name, value
                )));
            }
        }

        if !self.fallback_fps.is_finite() || self.fallback_fps <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "fallback_fps must be > 0, got {}",
                self.fallback_fps
            )));
        }

        if !(0.0..=1.0).contains(&self.surface.opacity) {
            return Err(ConfigError::Invalid(format!(
                "surface.opacity must be within 0.0-1.0, got {}",
                self.surface.opacity
            )));
        }

        Ok(())
    }

    pub fn with_num_stars(mut self, count: usize) -> Self {
        self.num_stars = count;
        self
    }

    pub fn with_gravitational_pull(mut self, pull: f32) -> Self {
        self.gravitational_pull = pull;
        self
    }

    pub fn with_normal_max_speed(mut self, speed: f32) -> Self {
        self.normal_max_speed = speed;
        self
    }

    /// Set both squared effective radii.
    pub fn with_radii_sq(mut self, star_radius_sq: f32, mouse_radius_sq: f32) -> Self {
        self.star_radius_sq = star_radius_sq;
        self.mouse_radius_sq = mouse_radius_sq;
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    pub fn with_line_color(mut self, rgb: [u8; 3]) -> Self {
        self.line_color = rgb;
        self
    }

    pub fn with_star_color(mut self, rgb: [u8; 3]) -> Self {
        self.star_color = rgb;
        self
    }

    pub fn with_surface(mut self, surface: SurfaceHints) -> Self {
        self.surface = surface;
        self
    }

    pub fn with_scheduler(mut self, kind: SchedulerKind) -> Self {
        self.scheduler = kind;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
