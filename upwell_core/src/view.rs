// Copyright 2026 the Upwell Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The windowed view that hosts the compositor surface.
//!
//! The host view has one job: keep the surface's geometry truthful and its
//! clock alive exactly as long as the view can be seen. Layout passes and
//! backing-scale changes are pushed into the surface synchronously — no
//! animation, no deferral — so the next draw reads bounds that match the
//! window server's reality.
//!
//! The hardware clock runs while the view sits in a window. Detaching stops
//! it, with one exception: while a PiP transplant is in flight the view is
//! briefly windowless, and stopping the clock there would freeze the last
//! frame mid-move. The transition flag set by the PiP session suppresses the
//! stop.

use core::fmt;

use kurbo::Size;

use crate::events::{CompositorEvent, DecoderEvent};
use crate::geometry::SurfaceBounds;
use crate::range::{DynamicRangeManager, ScreenInfo};
use crate::surface::CompositorSurface;

/// Start/stop handle for the hardware clock driving this view.
///
/// Backends wrap their vsync source (display link, timer fallback) in this;
/// tests substitute a scripted clock.
pub trait ClockControl {
    /// Starts tick delivery.
    fn start(&mut self);

    /// Stops tick delivery.
    fn stop(&mut self);

    /// Whether ticks are currently being delivered.
    fn is_running(&self) -> bool;
}

/// The windowed control owning the compositor surface.
pub struct HostView<C> {
    surface: CompositorSurface<C>,
    clock: Box<dyn ClockControl>,
    attached: bool,
    transitioning: bool,
}

impl<C> fmt::Debug for HostView<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostView")
            .field("surface", &self.surface)
            .field("attached", &self.attached)
            .field("transitioning", &self.transitioning)
            .field("clock_running", &self.clock.is_running())
            .finish_non_exhaustive()
    }
}

impl<C> HostView<C> {
    /// Creates a view over `surface`, driven by `clock`.
    ///
    /// The clock is not started until the view lands in a window.
    #[must_use]
    pub fn new(surface: CompositorSurface<C>, clock: Box<dyn ClockControl>) -> Self {
        Self {
            surface,
            clock,
            attached: false,
            transitioning: false,
        }
    }

    /// The hosted surface.
    #[must_use]
    pub fn surface(&self) -> &CompositorSurface<C> {
        &self.surface
    }

    /// Mutable access to the hosted surface.
    pub fn surface_mut(&mut self) -> &mut CompositorSurface<C> {
        &mut self.surface
    }

    /// Layout pass: pushes the view's current logical size into the surface,
    /// keeping the existing backing scale.
    pub fn layout(&mut self, size: Size) {
        let scale = self.surface.bounds().scale;
        self.surface.set_bounds(SurfaceBounds::new(size, scale));
        self.surface.mark_needs_redraw();
    }

    /// Backing-scale change (window moved to a different-DPI display).
    pub fn set_backing_scale(&mut self, scale: f64) {
        let size = self.surface.bounds().size;
        self.surface.set_bounds(SurfaceBounds::new(size, scale));
        self.surface.mark_needs_redraw();
    }

    /// Re-reads the backing scale from the screen currently hosting the
    /// view.
    pub fn sync_backing_scale(&mut self, screen: &dyn ScreenInfo) {
        self.set_backing_scale(screen.backing_scale());
    }

    /// Called when the view lands in a window. Starts the clock on first
    /// attachment.
    pub fn window_attached(&mut self) {
        self.attached = true;
        if !self.clock.is_running() {
            self.clock.start();
        }
    }

    /// Called when the view leaves its window. Stops the clock — unless a
    /// PiP transition is in progress, where the detach is the first half of
    /// a move and playback must keep running.
    pub fn window_detached(&mut self) {
        self.attached = false;
        if !self.transitioning && self.clock.is_running() {
            self.clock.stop();
        }
    }

    /// Whether the view currently sits in a window.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Sets the PiP-transition flag. Only the PiP session does this; the
    /// flag is advisory and checked cooperatively by the detach path.
    pub fn set_transitioning(&mut self, transitioning: bool) {
        self.transitioning = transitioning;
    }

    /// Whether a PiP transition is in flight.
    #[must_use]
    pub fn is_transitioning(&self) -> bool {
        self.transitioning
    }

    /// Whether the clock is delivering ticks.
    #[must_use]
    pub fn clock_running(&self) -> bool {
        self.clock.is_running()
    }

    /// UI-thread endpoint for one drained event.
    ///
    /// Ticks and frame-ready callbacks mark the surface for redraw; color
    /// changes run a dynamic-range transition against the given screen.
    pub fn handle_event(
        &mut self,
        event: CompositorEvent,
        screen: &dyn ScreenInfo,
        range: &mut DynamicRangeManager,
    ) {
        match event {
            CompositorEvent::Tick(_) | CompositorEvent::Decoder(DecoderEvent::FrameReady) => {
                self.surface.mark_needs_redraw();
            }
            CompositorEvent::Decoder(DecoderEvent::ColorChanged(profile)) => {
                let (color, bridge) = self.surface.range_parts();
                range.apply(profile, screen, color, bridge);
                self.surface.mark_needs_redraw();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{Colorspace, IccProfile};
    use crate::context::{GpuContext, NegotiatedFormat};
    use crate::geometry::ColorDepth;
    use crate::time::HostTime;
    use crate::timing::{DisplayId, TickConfidence, VsyncTick};
    use std::cell::Cell;
    use std::rc::Rc;
    use std::sync::Arc;

    /// Clock double flipping a shared running flag.
    struct FlagClock {
        running: Rc<Cell<bool>>,
    }

    impl ClockControl for FlagClock {
        fn start(&mut self) {
            self.running.set(true);
        }

        fn stop(&mut self) {
            self.running.set(false);
        }

        fn is_running(&self) -> bool {
            self.running.get()
        }
    }

    struct NullScreen;

    impl ScreenInfo for NullScreen {
        fn colorspace(&self) -> Option<Colorspace> {
            None
        }

        fn icc_profile(&self) -> Option<IccProfile> {
            None
        }

        fn backing_scale(&self) -> f64 {
            2.0
        }
    }

    fn test_view() -> (HostView<()>, Rc<Cell<bool>>) {
        let context = Arc::new(GpuContext::new(
            (),
            NegotiatedFormat {
                depth: ColorDepth::Standard8,
                float_color: false,
                double_buffered: true,
                accelerated: true,
            },
        ));
        let running = Rc::new(Cell::new(false));
        let clock = Box::new(FlagClock {
            running: Rc::clone(&running),
        });
        (HostView::new(CompositorSurface::new(context), clock), running)
    }

    #[test]
    fn clock_follows_window_attachment() {
        let (mut view, running) = test_view();
        assert!(!running.get(), "clock idle before first attach");

        view.window_attached();
        assert!(running.get());

        view.window_detached();
        assert!(!running.get());
    }

    #[test]
    fn transition_flag_keeps_clock_alive_across_detach() {
        let (mut view, running) = test_view();
        view.window_attached();

        view.set_transitioning(true);
        view.window_detached();
        assert!(running.get(), "detach during a transition must not stop the clock");

        view.window_attached();
        view.set_transitioning(false);
        assert!(running.get());
    }

    #[test]
    fn layout_updates_bounds_synchronously() {
        let (mut view, _running) = test_view();
        view.set_backing_scale(2.0);
        view.layout(Size::new(800.0, 450.0));

        let bounds = view.surface().bounds();
        assert_eq!(bounds.size, Size::new(800.0, 450.0));
        assert_eq!(bounds.scale, 2.0);
        assert!(view.surface().needs_redraw());
    }

    #[test]
    fn scale_change_preserves_size() {
        let (mut view, _running) = test_view();
        view.layout(Size::new(640.0, 360.0));
        view.set_backing_scale(3.0);

        let bounds = view.surface().bounds();
        assert_eq!(bounds.size, Size::new(640.0, 360.0));
        assert_eq!(bounds.scale, 3.0);
    }

    #[test]
    fn tick_event_marks_redraw() {
        let (mut view, _running) = test_view();
        let mut range = DynamicRangeManager::new();
        let tick = VsyncTick {
            now: HostTime(1),
            predicted_present: None,
            refresh_interval: None,
            confidence: TickConfidence::Predictive,
            frame_index: 0,
            display: DisplayId(0),
        };

        view.handle_event(CompositorEvent::Tick(tick), &NullScreen, &mut range);
        assert!(view.surface().needs_redraw());
    }
}
