//! The star field context and its per-frame loop.

use glam::Vec2;

use crate::canvas::{Canvas, Rgba};
use crate::config::StarfieldConfig;
use crate::scheduler::FrameScheduler;
use crate::spawn::{create_constellation, SpawnContext};
use crate::star::{proximity, Attractor, Bounds, Constellation, Star};

/// What one call to [`Starfield::advance_and_render`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Connecting lines stroked this frame, pointer lines included.
    pub lines_drawn: usize,
    /// Stars pulled by the pointer this frame.
    pub mouse_influenced: usize,
}

/// All animation state: stars, pointer, surface size and tunables.
///
/// The host builds one, feeds it input through the `on_*` callbacks and calls
/// [`advance_and_render`](Self::advance_and_render) once per scheduled frame.
/// Dropping it ends the animation.
#[derive(Debug, Clone)]
pub struct Starfield {
    constellation: Constellation,
    attractor: Attractor,
    bounds: Bounds,
    pull: f32,
    normal_max_speed: f32,
    friction: f32,
    line_color: Rgba,
    star_color: Rgba,
    star_size: f32,
}

impl Starfield {
    /// Create a star field with `config.num_stars` randomly placed stars.
    pub fn new(config: &StarfieldConfig, bounds: Bounds) -> Self {
        let mut ctx = SpawnContext::new(
            bounds,
            config.normal_max_speed,
            config.star_radius_sq,
            config.seed,
        );
        let constellation = create_constellation(config.num_stars, &mut ctx);
        Self::from_constellation(config, bounds, constellation)
    }

    /// Create a star field around an existing set of stars.
    pub fn from_constellation(
        config: &StarfieldConfig,
        bounds: Bounds,
        constellation: Constellation,
    ) -> Self {
        Self {
            constellation,
            attractor: Attractor::new(config.mouse_radius_sq),
            bounds,
            pull: config.gravitational_pull,
            normal_max_speed: config.normal_max_speed,
            friction: config.friction,
            line_color: Rgba::from_rgb8(config.line_color, 1.0),
            star_color: Rgba::from_rgb8(config.star_color, 1.0),
            star_size: config.star_size,
        }
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn attractor(&self) -> &Attractor {
        &self.attractor
    }

    pub fn constellation(&self) -> &Constellation {
        &self.constellation
    }

    pub fn stars(&self) -> &[Star] {
        self.constellation.stars()
    }

    /// The surface changed size. Stars are left where they are; any now
    /// outside get reflected back on their next frame.
    pub fn on_resize(&mut self, bounds: Bounds) {
        self.bounds = bounds;
    }

    /// The pointer moved to `(x, y)` in surface pixels.
    pub fn on_pointer_move(&mut self, x: f32, y: f32) {
        self.attractor.position = Some(Vec2::new(x, y));
    }

    /// The pointer left the surface.
    pub fn on_pointer_leave(&mut self) {
        self.attractor.position = None;
    }

    /// Advance every star by one frame, draw the result and request the
    /// next frame.
    ///
    /// Each star is moved, reflected off the surface edges and drawn, then
    /// linked to every nearby point of interest: the pointer, and the stars
    /// after it in iteration order. A star-star pair is therefore examined
    /// once per frame, against the later star's not-yet-moved position.
    pub fn advance_and_render<C, S>(&mut self, canvas: &mut C, scheduler: &mut S) -> FrameReport
    where
        C: Canvas + ?Sized,
        S: FrameScheduler + ?Sized,
    {
        canvas.clear(self.bounds);

        let bounds = self.bounds;
        let pointer = self.attractor.position;
        let mouse_radius_sq = self.attractor.radius_sq;
        let pull = self.pull;
        let line_color = self.line_color;
        let mut report = FrameReport::default();

        let stars = self.constellation.stars_mut();
        for i in 0..stars.len() {
            let (visited, pending) = stars.split_at_mut(i + 1);
            let star = &mut visited[i];

            star.integrate();
            star.reflect(bounds);
            canvas.fill_square(star.position, self.star_size, self.star_color);

            let mut near_mouse = false;
            if let Some(target) = pointer {
                let d2 = star.position.distance_squared(target);
                if let Some(closeness) = proximity(d2, mouse_radius_sq) {
                    star.attract_to(target, pull);
                    near_mouse = true;
                    draw_link(canvas, star.position, target, closeness, line_color);
                    report.lines_drawn += 1;
                }
            }

            for other in pending.iter() {
                let d2 = star.position.distance_squared(other.position);
                if let Some(closeness) = proximity(d2, other.radius_sq) {
                    draw_link(canvas, star.position, other.position, closeness, line_color);
                    report.lines_drawn += 1;
                }
            }

            if near_mouse {
                report.mouse_influenced += 1;
            } else {
                star.apply_friction(self.normal_max_speed, self.friction);
            }
        }

        scheduler.request_frame();
        report
    }
}

/// Nearer pairs get thicker, darker lines.
fn draw_link<C: Canvas + ?Sized>(canvas: &mut C, from: Vec2, to: Vec2, closeness: f32, base: Rgba) {
    canvas.stroke_line(from, to, closeness / 2.0, base.with_alpha(closeness + 0.2));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Tally {
        clears: usize,
        squares: usize,
        lines: Vec<(Vec2, Vec2, f32, Rgba)>,
    }

    impl Canvas for Tally {
        fn clear(&mut self, _bounds: Bounds) {
            self.clears += 1;
        }

        fn fill_square(&mut self, _center: Vec2, _size: f32, _color: Rgba) {
            self.squares += 1;
        }

        fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgba) {
            self.lines.push((from, to, width, color));
        }
    }

    #[derive(Default)]
    struct Requests(usize);

    impl FrameScheduler for Requests {
        fn request_frame(&mut self) {
            self.0 += 1;
        }
    }

    fn field(stars: Vec<Star>) -> Starfield {
        Starfield::from_constellation(
            &StarfieldConfig::default(),
            Bounds::new(100.0, 100.0),
            stars.into(),
        )
    }

    fn still(x: f32, y: f32) -> Star {
        Star::new(Vec2::new(x, y), Vec2::ZERO, 6000.0)
    }

    #[test]
    fn test_new_spawns_configured_count() {
        let config = StarfieldConfig::default().with_num_stars(12).with_seed(5);
        let field = Starfield::new(&config, Bounds::new(320.0, 240.0));
        assert_eq!(field.stars().len(), 12);
        assert!(field.attractor().position.is_none());
        assert_eq!(field.attractor().radius_sq, config.mouse_radius_sq);
    }

    #[test]
    fn test_frame_clears_draws_and_reschedules_once() {
        let mut field = field(vec![still(10.0, 10.0), still(90.0, 90.0)]);
        let mut canvas = Tally::default();
        let mut scheduler = Requests::default();

        field.advance_and_render(&mut canvas, &mut scheduler);

        assert_eq!(canvas.clears, 1);
        assert_eq!(canvas.squares, 2);
        assert_eq!(scheduler.0, 1);
    }

    #[test]
    fn test_pair_linked_once_per_frame() {
        let mut field = field(vec![still(10.0, 10.0), still(20.0, 10.0)]);
        let mut canvas = Tally::default();

        let report = field.advance_and_render(&mut canvas, &mut Requests::default());

        assert_eq!(report.lines_drawn, 1);
        assert_eq!(canvas.lines.len(), 1);
        let (from, to, width, color) = canvas.lines[0];
        assert_eq!(from, Vec2::new(10.0, 10.0));
        assert_eq!(to, Vec2::new(20.0, 10.0));
        let closeness = (6000.0 - 100.0) / 6000.0;
        assert_eq!(width, closeness / 2.0);
        assert_eq!(color.a, closeness + 0.2);
    }

    #[test]
    fn test_pointer_link_uses_pointer_radius() {
        let mut field = field(vec![still(50.0, 50.0)]);
        field.on_pointer_move(150.0, 50.0);
        let mut canvas = Tally::default();

        let report = field.advance_and_render(&mut canvas, &mut Requests::default());

        // 100px apart: outside a star's radius, inside the pointer's.
        assert_eq!(report.lines_drawn, 1);
        assert_eq!(report.mouse_influenced, 1);
        assert_eq!(canvas.lines[0].1, Vec2::new(150.0, 50.0));
        assert!(field.stars()[0].velocity.x > 0.0);
    }

    #[test]
    fn test_pointer_leave_stops_attraction() {
        let mut field = field(vec![still(50.0, 50.0)]);
        field.on_pointer_move(60.0, 50.0);
        field.on_pointer_leave();

        let report = field.advance_and_render(&mut Tally::default(), &mut Requests::default());

        assert_eq!(report, FrameReport::default());
        assert_eq!(field.stars()[0].velocity, Vec2::ZERO);
    }

    #[test]
    fn test_resize_keeps_positions() {
        let mut field = field(vec![still(90.0, 90.0)]);
        field.on_resize(Bounds::new(50.0, 50.0));
        assert_eq!(field.bounds(), Bounds::new(50.0, 50.0));
        assert_eq!(field.stars()[0].position, Vec2::new(90.0, 90.0));
    }
}
