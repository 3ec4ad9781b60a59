//! Spawn context for star initialization.
//!
//! Positions are spread uniformly over the surface and velocities uniformly
//! over `[-max_speed, max_speed)` per axis. Sampling multiplies a unit draw
//! by the extent, so a zero-sized surface simply puts every star at the
//! origin instead of panicking on an empty range.

use glam::Vec2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::star::{Bounds, Constellation, Star};

/// Random source plus the parameters every new star shares.
pub struct SpawnContext {
    /// Area stars are placed in.
    pub bounds: Bounds,
    /// Per-axis speed limit for initial velocities.
    pub max_speed: f32,
    /// Effective radius given to every star.
    pub radius_sq: f32,
    rng: SmallRng,
}

impl SpawnContext {
    /// Create a context. With `seed` set, the same seed yields the same stars.
    pub fn new(bounds: Bounds, max_speed: f32, radius_sq: f32, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };

        Self {
            bounds,
            max_speed,
            radius_sq,
            rng,
        }
    }

    /// Random f32 between 0.0 and 1.0.
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Random point in `[0, width) x [0, height)`.
    pub fn random_position(&mut self) -> Vec2 {
        Vec2::new(
            self.random() * self.bounds.width,
            self.random() * self.bounds.height,
        )
    }

    /// Random velocity with each axis in `[-max_speed, max_speed)`.
    pub fn random_velocity(&mut self) -> Vec2 {
        Vec2::new(
            (2.0 * self.random() - 1.0) * self.max_speed,
            (2.0 * self.random() - 1.0) * self.max_speed,
        )
    }

    /// A fresh star with random position and velocity.
    pub fn spawn_star(&mut self) -> Star {
        let position = self.random_position();
        let velocity = self.random_velocity();
        Star::new(position, velocity, self.radius_sq)
    }
}

/// Build a constellation of `num_stars` randomly placed stars.
pub fn create_constellation(num_stars: usize, ctx: &mut SpawnContext) -> Constellation {
    (0..num_stars)
        .map(|_| ctx.spawn_star())
        .collect::<Vec<_>>()
        .into()
}
