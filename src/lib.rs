//! # star-wireframe
//!
//! An ambient background animation: a field of drifting stars joined by
//! lines whose weight grows as they get closer, with the pointer acting as
//! an attractor.
//!
//! The simulation is a plain context object, [`Starfield`], advanced one
//! frame at a time. It draws through the [`Canvas`] trait and asks a
//! [`FrameScheduler`] for its next frame, so it runs the same under the
//! bundled winit/wgpu host or any other surface.
//!
//! ## Quick Start
//!
//! ```ignore
//! use star_wireframe::prelude::*;
//!
//! fn main() -> Result<(), HostError> {
//!     star_wireframe::run(StarfieldConfig::default().with_num_stars(200))
//! }
//! ```
//!
//! ## Driving it yourself
//!
//! ```ignore
//! let mut field = Starfield::new(&config, Bounds::new(1280.0, 720.0));
//!
//! field.on_pointer_move(640.0, 360.0);
//! field.advance_and_render(&mut my_canvas, &mut my_scheduler);
//! field.on_pointer_leave();
//! ```
//!
//! ## Each frame
//!
//! 1. The canvas is cleared.
//! 2. Every star moves by its velocity and bounces off the surface edges.
//! 3. Each star is linked to the pointer and to the other stars within their
//!    effective radius; the pointer also pulls it closer.
//! 4. Stars not near the pointer and faster than `normal_max_speed` are
//!    slowed by `friction`.
//! 5. The next frame is requested.

pub mod canvas;
pub mod config;
pub mod error;
pub mod gpu;
pub mod input;
pub mod scheduler;
mod simulation;
pub mod spawn;
pub mod star;
pub mod time;
mod window;

pub use canvas::{Canvas, Rgba};
pub use config::{SchedulerKind, StarfieldConfig, SurfaceHints};
pub use error::{ConfigError, GpuError, HostError};
pub use glam::Vec2;
pub use scheduler::{FrameScheduler, RedrawScheduler, RedrawTarget, TimerScheduler};
pub use simulation::{FrameReport, Starfield};
pub use spawn::{create_constellation, SpawnContext};
pub use star::{Attractor, Bounds, Constellation, Star};
pub use window::run;

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use star_wireframe::prelude::*;
/// ```
pub mod prelude {
    pub use crate::canvas::{Canvas, Rgba};
    pub use crate::config::{SchedulerKind, StarfieldConfig, SurfaceHints};
    pub use crate::error::HostError;
    pub use crate::scheduler::FrameScheduler;
    pub use crate::simulation::{FrameReport, Starfield};
    pub use crate::star::{Bounds, Star};
    pub use crate::Vec2;
}
