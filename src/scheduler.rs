//! Frame scheduling.
//!
//! The frame loop ends every frame by asking a [`FrameScheduler`] for the
//! next one. Two implementations exist:
//!
//! - [`RedrawScheduler`] asks the window for a redraw and follows the
//!   display's cadence.
//! - [`TimerScheduler`] sets a deadline a fixed interval away, for hosts
//!   without a usable redraw cadence.
//!
//! [`FramePacer`] picks one of them at startup and answers the event loop's
//! questions about when to wake up and whether a redraw is a real frame.

use std::sync::Arc;
use std::time::{Duration, Instant};

use winit::event_loop::ControlFlow;
use winit::window::Window;

use crate::config::SchedulerKind;

/// Interval used when a timer is asked for a rate it cannot represent.
pub const DEFAULT_INTERVAL: Duration = Duration::from_nanos(1_000_000_000 / 45);

/// Something that can arrange one more frame.
pub trait FrameScheduler {
    /// Request exactly one more call to the frame loop.
    fn request_frame(&mut self);
}

impl<S: FrameScheduler + ?Sized> FrameScheduler for &mut S {
    fn request_frame(&mut self) {
        (**self).request_frame()
    }
}

/// A surface that can be asked to redraw itself.
pub trait RedrawTarget {
    fn request_redraw(&self);
}

impl RedrawTarget for Window {
    fn request_redraw(&self) {
        Window::request_redraw(self)
    }
}

impl<T: RedrawTarget + ?Sized> RedrawTarget for Arc<T> {
    fn request_redraw(&self) {
        (**self).request_redraw()
    }
}

/// Native scheduler: frames follow the window's redraw requests.
pub struct RedrawScheduler<W: RedrawTarget = Arc<Window>> {
    target: W,
    pending: bool,
}

impl<W: RedrawTarget> RedrawScheduler<W> {
    pub fn new(target: W) -> Self {
        Self {
            target,
            pending: false,
        }
    }

    /// Consume a pending request. Redraws without one were initiated by the
    /// OS and must not advance the simulation.
    pub fn take_pending(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }
}

impl<W: RedrawTarget> FrameScheduler for RedrawScheduler<W> {
    fn request_frame(&mut self) {
        self.pending = true;
        self.target.request_redraw();
    }
}

/// Fallback scheduler: one frame per fixed interval.
#[derive(Debug, Clone)]
pub struct TimerScheduler {
    interval: Duration,
    deadline: Option<Instant>,
}

impl TimerScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            deadline: None,
        }
    }

    /// Scheduler ticking `fps` times per second. A rate that is not a
    /// positive finite number, or is too small to express as a
    /// [`Duration`], falls back to [`DEFAULT_INTERVAL`].
    pub fn from_fps(fps: f32) -> Self {
        let interval = if fps.is_finite() && fps > 0.0 {
            Duration::try_from_secs_f64(1.0 / fps as f64).ok()
        } else {
            None
        };

        Self::new(interval.unwrap_or_else(|| {
            log::warn!("Unusable frame rate {}, using {:?}", fps, DEFAULT_INTERVAL);
            DEFAULT_INTERVAL
        }))
    }

    #[inline]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// When the pending frame is due, if one was requested.
    #[inline]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Schedule the next frame one interval after `now`.
    pub fn request_frame_at(&mut self, now: Instant) {
        self.deadline = Some(now + self.interval);
    }

    /// Consume the pending request if its deadline has passed.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

impl FrameScheduler for TimerScheduler {
    fn request_frame(&mut self) {
        self.request_frame_at(Instant::now());
    }
}

/// The scheduler chosen for this run, driven by the host event loop.
pub struct FramePacer<W: RedrawTarget + Clone = Arc<Window>> {
    mode: PacerMode<W>,
    target: W,
    /// Startup deadline, cleared once the first frame has been armed.
    start: Option<Instant>,
    /// Set when the timer fired and its redraw has not been consumed yet.
    timer_fired: bool,
}

enum PacerMode<W: RedrawTarget> {
    Native(RedrawScheduler<W>),
    Timer(TimerScheduler),
}

impl<W: RedrawTarget + Clone> FramePacer<W> {
    /// Select a scheduler. Nothing is drawn before `first_frame`.
    pub fn new(
        kind: SchedulerKind,
        target: W,
        fallback_fps: f32,
        first_frame: Instant,
    ) -> Self {
        let mode = match kind {
            SchedulerKind::Native => PacerMode::Native(RedrawScheduler::new(target.clone())),
            SchedulerKind::Timer => PacerMode::Timer(TimerScheduler::from_fps(fallback_fps)),
        };

        Self {
            mode,
            target,
            start: Some(first_frame),
            timer_fired: false,
        }
    }

    pub fn kind(&self) -> SchedulerKind {
        match self.mode {
            PacerMode::Native(_) => SchedulerKind::Native,
            PacerMode::Timer(_) => SchedulerKind::Timer,
        }
    }

    /// Called when the event loop is about to sleep. Requests a redraw if a
    /// frame is due and returns how long the loop may wait.
    pub fn poll(&mut self, now: Instant) -> ControlFlow {
        if let Some(start) = self.start {
            if now < start {
                return ControlFlow::WaitUntil(start);
            }
            self.start = None;
            match &mut self.mode {
                PacerMode::Native(redraw) => redraw.request_frame(),
                PacerMode::Timer(timer) => timer.deadline = Some(now),
            }
        }

        match &mut self.mode {
            PacerMode::Native(_) => ControlFlow::Wait,
            PacerMode::Timer(timer) => {
                if timer.take_due(now) {
                    self.timer_fired = true;
                    self.target.request_redraw();
                    ControlFlow::Wait
                } else {
                    match timer.deadline() {
                        Some(deadline) => ControlFlow::WaitUntil(deadline),
                        None => ControlFlow::Wait,
                    }
                }
            }
        }
    }

    /// Whether the current redraw should advance the simulation.
    pub fn take_frame(&mut self) -> bool {
        match &mut self.mode {
            PacerMode::Native(redraw) => redraw.take_pending(),
            PacerMode::Timer(_) => std::mem::take(&mut self.timer_fired),
        }
    }

    /// The scheduler the frame loop requests its next frame from.
    pub fn scheduler(&mut self) -> &mut dyn FrameScheduler {
        match &mut self.mode {
            PacerMode::Native(redraw) => redraw,
            PacerMode::Timer(timer) => timer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Redraw target that counts requests.
    #[derive(Clone, Default)]
    struct Redraws(Rc<Cell<usize>>);

    impl Redraws {
        fn count(&self) -> usize {
            self.0.get()
        }
    }

    impl RedrawTarget for Redraws {
        fn request_redraw(&self) {
            self.0.set(self.0.get() + 1);
        }
    }

    fn pacer(kind: SchedulerKind, first_frame: Instant) -> (FramePacer<Redraws>, Redraws) {
        let redraws = Redraws::default();
        (FramePacer::new(kind, redraws.clone(), 50.0, first_frame), redraws)
    }

    #[test]
    fn test_timer_from_fps() {
        let timer = TimerScheduler::from_fps(50.0);
        assert_eq!(timer.interval(), Duration::from_millis(20));
        assert!(timer.deadline().is_none());
    }

    #[test]
    fn test_timer_not_due_before_interval() {
        let now = Instant::now();
        let mut timer = TimerScheduler::new(Duration::from_millis(22));
        timer.request_frame_at(now);

        assert_eq!(timer.deadline(), Some(now + Duration::from_millis(22)));
        assert!(!timer.take_due(now + Duration::from_millis(10)));
        assert!(timer.deadline().is_some());
    }

    #[test]
    fn test_timer_fires_once() {
        let now = Instant::now();
        let mut timer = TimerScheduler::new(Duration::from_millis(22));
        timer.request_frame_at(now);

        let later = now + Duration::from_millis(30);
        assert!(timer.take_due(later));
        assert!(!timer.take_due(later));
        assert!(timer.deadline().is_none());
    }

    #[test]
    fn test_timer_without_request_never_fires() {
        let mut timer = TimerScheduler::new(Duration::from_millis(1));
        assert!(!timer.take_due(Instant::now() + Duration::from_secs(1)));
    }

    #[test]
    fn test_request_frame_through_trait() {
        let mut timer = TimerScheduler::new(Duration::from_millis(5));
        {
            let scheduler: &mut dyn FrameScheduler = &mut timer;
            scheduler.request_frame();
        }
        assert!(timer.deadline().is_some());
    }

    #[test]
    fn test_timer_from_unusable_fps_falls_back() {
        for fps in [0.0, -5.0, f32::NAN, f32::INFINITY, f32::MIN_POSITIVE] {
            assert_eq!(TimerScheduler::from_fps(fps).interval(), DEFAULT_INTERVAL);
        }
    }

    #[test]
    fn test_pacer_waits_for_start_delay() {
        let now = Instant::now();
        let start = now + Duration::from_millis(100);
        let (mut pacer, redraws) = pacer(SchedulerKind::Native, start);

        assert!(matches!(pacer.poll(now), ControlFlow::WaitUntil(t) if t == start));
        assert!(!pacer.take_frame());
        assert_eq!(redraws.count(), 0);
    }

    #[test]
    fn test_native_redraw_without_request_does_not_advance() {
        let start = Instant::now();
        let (mut pacer, redraws) = pacer(SchedulerKind::Native, start);

        assert!(matches!(pacer.poll(start), ControlFlow::Wait));
        assert_eq!(redraws.count(), 1);
        assert!(pacer.take_frame());

        // A second redraw before the frame loop asks again came from the OS.
        assert!(!pacer.take_frame());
    }

    #[test]
    fn test_native_request_frame_yields_one_frame() {
        let start = Instant::now();
        let (mut pacer, redraws) = pacer(SchedulerKind::Native, start);
        pacer.poll(start);
        assert!(pacer.take_frame());

        pacer.scheduler().request_frame();

        assert_eq!(redraws.count(), 2);
        assert!(pacer.take_frame());
        assert!(!pacer.take_frame());
    }

    #[test]
    fn test_timer_pacer_fires_once_per_deadline() {
        let start = Instant::now();
        let (mut pacer, redraws) = pacer(SchedulerKind::Timer, start);
        assert_eq!(pacer.kind(), SchedulerKind::Timer);

        // First frame is due as soon as the start delay is over.
        assert!(matches!(pacer.poll(start), ControlFlow::Wait));
        assert_eq!(redraws.count(), 1);
        assert!(pacer.take_frame());
        assert!(!pacer.take_frame());

        pacer.scheduler().request_frame();
        let deadline = match pacer.poll(start) {
            ControlFlow::WaitUntil(deadline) => deadline,
            other => panic!("expected WaitUntil, got {:?}", other),
        };
        assert!(deadline > start);
        assert!(!pacer.take_frame());
        assert_eq!(redraws.count(), 1);

        pacer.poll(deadline);
        assert_eq!(redraws.count(), 2);
        assert!(pacer.take_frame());
        assert!(!pacer.take_frame());
    }
}
