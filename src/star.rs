//! Stars, the pointer attractor, and the per-star motion steps.

use glam::Vec2;

/// Size of the drawable surface in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// A moving point of the constellation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Squared distance under which another star is considered near.
    pub radius_sq: f32,
}

impl Star {
    pub fn new(position: Vec2, velocity: Vec2, radius_sq: f32) -> Self {
        Self {
            position,
            velocity,
            radius_sq,
        }
    }

    /// Move by one frame's worth of velocity.
    #[inline]
    pub fn integrate(&mut self) {
        self.position += self.velocity;
    }

    /// Flip each velocity axis whose coordinate lies outside `[0, extent]`.
    ///
    /// This looks at the current position only, so a star that stays outside
    /// keeps flipping every frame until it drifts back in.
    #[inline]
    pub fn reflect(&mut self, bounds: Bounds) {
        if self.position.x > bounds.width || self.position.x < 0.0 {
            self.velocity.x = -self.velocity.x;
        }
        if self.position.y > bounds.height || self.position.y < 0.0 {
            self.velocity.y = -self.velocity.y;
        }
    }

    /// Accelerate toward `target`, proportionally to the offset.
    #[inline]
    pub fn attract_to(&mut self, target: Vec2, pull: f32) {
        self.velocity -= pull * (self.position - target);
    }

    /// Nudge each velocity axis back toward `[-max_speed, max_speed]`.
    #[inline]
    pub fn apply_friction(&mut self, max_speed: f32, friction: f32) {
        self.velocity.x = damp_axis(self.velocity.x, max_speed, friction);
        self.velocity.y = damp_axis(self.velocity.y, max_speed, friction);
    }
}

fn damp_axis(v: f32, max_speed: f32, friction: f32) -> f32 {
    if v > max_speed {
        v - friction
    } else if v < -max_speed {
        v + friction
    } else {
        v
    }
}

/// The pointer, as seen by the frame loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attractor {
    /// `None` while the pointer is outside the surface.
    pub position: Option<Vec2>,
    pub radius_sq: f32,
}

impl Attractor {
    pub fn new(radius_sq: f32) -> Self {
        Self {
            position: None,
            radius_sq,
        }
    }
}

/// Closeness score for a pair at squared distance `d2`.
///
/// Returns `None` unless `d2 < radius_sq`; otherwise a value in `(0, 1]`,
/// reaching 1 when the points coincide.
#[inline]
pub fn proximity(d2: f32, radius_sq: f32) -> Option<f32> {
    if d2 < radius_sq {
        Some((radius_sq - d2) / radius_sq)
    } else {
        None
    }
}

/// Fixed-size collection of every star.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constellation {
    stars: Vec<Star>,
}

impl Constellation {
    pub fn new(stars: Vec<Star>) -> Self {
        Self { stars }
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    /// Mutable access to the stars. The population itself cannot change.
    pub fn stars_mut(&mut self) -> &mut [Star] {
        &mut self.stars
    }
}

impl From<Vec<Star>> for Constellation {
    fn from(stars: Vec<Star>) -> Self {
        Self::new(stars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn star(x: f32, y: f32, vx: f32, vy: f32) -> Star {
        Star::new(Vec2::new(x, y), Vec2::new(vx, vy), 6000.0)
    }

    #[test]
    fn test_integrate_adds_velocity_exactly() {
        let mut s = star(10.25, -3.5, 0.75, -1.125);
        s.integrate();
        assert_eq!(s.position, Vec2::new(11.0, -4.625));
    }

    #[test]
    fn test_reflect_inside_bounds_is_noop() {
        let mut s = star(50.0, 50.0, 1.0, -1.0);
        s.reflect(Bounds::new(100.0, 100.0));
        assert_eq!(s.velocity, Vec2::new(1.0, -1.0));
    }

    #[test]
    fn test_reflect_edges_are_inclusive() {
        let mut s = star(100.0, 0.0, 1.0, -1.0);
        s.reflect(Bounds::new(100.0, 100.0));
        assert_eq!(s.velocity, Vec2::new(1.0, -1.0));
    }

    #[test]
    fn test_reflect_axes_independent() {
        let mut s = star(101.0, 50.0, 1.0, 0.5);
        s.reflect(Bounds::new(100.0, 100.0));
        assert_eq!(s.velocity, Vec2::new(-1.0, 0.5));

        let mut s = star(50.0, -0.1, 1.0, -0.5);
        s.reflect(Bounds::new(100.0, 100.0));
        assert_eq!(s.velocity, Vec2::new(1.0, 0.5));
    }

    #[test]
    fn test_reflect_keeps_flipping_while_outside() {
        let mut s = star(-5.0, 50.0, 1.0, 0.0);
        let bounds = Bounds::new(100.0, 100.0);
        s.reflect(bounds);
        assert_eq!(s.velocity.x, -1.0);
        s.reflect(bounds);
        assert_eq!(s.velocity.x, 1.0);
    }

    #[test]
    fn test_attract_pulls_toward_target() {
        let mut s = star(110.0, 90.0, 0.0, 0.0);
        s.attract_to(Vec2::new(100.0, 100.0), 0.5);
        assert_eq!(s.velocity, Vec2::new(-5.0, 5.0));
    }

    #[test]
    fn test_friction_within_band_is_noop() {
        let mut s = star(0.0, 0.0, 1.0, -0.99);
        s.apply_friction(1.0, 0.01);
        assert_eq!(s.velocity, Vec2::new(1.0, -0.99));
    }

    #[test]
    fn test_friction_moves_toward_band() {
        let mut s = star(0.0, 0.0, 3.0, -3.0);
        s.apply_friction(1.0, 0.25);
        assert_eq!(s.velocity, Vec2::new(2.75, -2.75));
    }

    #[test]
    fn test_proximity_threshold_is_strict() {
        assert_eq!(proximity(6000.0, 6000.0), None);
        assert_eq!(proximity(6001.0, 6000.0), None);
        assert_eq!(proximity(0.0, 6000.0), Some(1.0));
        assert_eq!(proximity(3000.0, 6000.0), Some(0.5));
    }

    #[test]
    fn test_attractor_starts_absent() {
        let a = Attractor::new(2e4);
        assert!(a.position.is_none());
        assert_eq!(a.radius_sq, 2e4);
    }
}
