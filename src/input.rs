//! Input handling for the star field.
//!
//! Raw window events are reduced to the three things the animation cares
//! about: the surface size, where the pointer is, and whether it has left.
//!
//! Everything is converted to logical pixels, so star size, line width and
//! both radii keep their on-screen size on high-DPI displays.
//!
//! ```ignore
//! if let Some(event) = SurfaceEvent::from_window_event(&event, window.scale_factor()) {
//!     event.apply(&mut starfield);
//! }
//! ```

use glam::Vec2;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::WindowEvent;

use crate::simulation::Starfield;
use crate::star::Bounds;

/// A window event the star field reacts to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SurfaceEvent {
    /// The drawable area changed size, in logical pixels.
    Resized(Bounds),
    /// The pointer moved, in logical pixels from the top-left corner.
    PointerMoved(Vec2),
    /// The pointer left the window.
    PointerLeft,
}

impl SurfaceEvent {
    /// Translate a winit event using the window's current scale factor.
    /// Events the animation ignores map to `None`.
    pub fn from_window_event(event: &WindowEvent, scale_factor: f64) -> Option<Self> {
        match event {
            WindowEvent::Resized(size) => {
                Some(SurfaceEvent::Resized(logical_bounds(*size, scale_factor)))
            }
            WindowEvent::CursorMoved { position, .. } => {
                Some(SurfaceEvent::PointerMoved(logical_point(*position, scale_factor)))
            }
            WindowEvent::CursorLeft { .. } => Some(SurfaceEvent::PointerLeft),
            _ => None,
        }
    }

    /// Forward the event to the matching star field callback.
    pub fn apply(self, starfield: &mut Starfield) {
        match self {
            SurfaceEvent::Resized(bounds) => starfield.on_resize(bounds),
            SurfaceEvent::PointerMoved(p) => starfield.on_pointer_move(p.x, p.y),
            SurfaceEvent::PointerLeft => starfield.on_pointer_leave(),
        }
    }
}

/// Surface bounds in logical pixels for a physical window size.
pub fn logical_bounds(size: PhysicalSize<u32>, scale_factor: f64) -> Bounds {
    let logical = size.to_logical::<f32>(scale_factor);
    Bounds::new(logical.width, logical.height)
}

/// Pointer position in logical pixels.
pub fn logical_point(position: PhysicalPosition<f64>, scale_factor: f64) -> Vec2 {
    let logical = position.to_logical::<f32>(scale_factor);
    Vec2::new(logical.x, logical.y)
}
