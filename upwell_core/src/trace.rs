// Copyright 2026 the Upwell Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame-loop instrumentation.
//!
//! [`TraceSink`] receives one call per interesting event in the presentation
//! loop; every method defaults to a no-op so sinks implement only what they
//! record. [`Tracer`] wraps an optional `&mut dyn TraceSink`: with the
//! `trace` cargo feature off, its methods compile to nothing; with it on,
//! each call costs one `Option` branch.
//!
//! The embedding frame loop emits the events — core components stay free of
//! instrumentation arguments. `upwell_debug` provides recording and export
//! sinks.

use crate::color::Colorspace;
use crate::geometry::{FramebufferId, Viewport};
use crate::surface::DrawOutcome;
use crate::time::HostTime;
use crate::timing::{TickConfidence, VsyncTick};

/// Emitted when a vsync tick reaches the UI thread.
#[derive(Clone, Copy, Debug)]
pub struct TickEvent {
    /// Tick counter.
    pub frame_index: u64,
    /// Host time the tick fired.
    pub now: HostTime,
    /// Predicted present time, if the clock knows one.
    pub predicted_present: Option<HostTime>,
    /// Timing confidence of the tick source.
    pub confidence: TickConfidence,
}

impl From<&VsyncTick> for TickEvent {
    fn from(tick: &VsyncTick) -> Self {
        Self {
            frame_index: tick.frame_index,
            now: tick.now,
            predicted_present: tick.predicted_present,
            confidence: tick.confidence,
        }
    }
}

/// Emitted just before a draw enters the GPU gate.
#[derive(Clone, Copy, Debug)]
pub struct DrawBeginEvent {
    /// Tick counter of the driving tick.
    pub frame_index: u64,
    /// Viewport the draw will use.
    pub viewport: Viewport,
    /// Host time at draw start.
    pub timestamp: HostTime,
}

/// Emitted after a draw released the GPU gate.
#[derive(Clone, Copy, Debug)]
pub struct DrawEndEvent {
    /// Tick counter of the driving tick.
    pub frame_index: u64,
    /// What the draw produced.
    pub outcome: DrawOutcome,
    /// Framebuffer the draw targeted.
    pub framebuffer: FramebufferId,
    /// Host time at draw end.
    pub timestamp: HostTime,
}

/// Emitted when the dynamic-range manager runs a transition.
#[derive(Clone, Copy, Debug)]
pub struct RangeSwitchEvent {
    /// Whether the surface is now in extended range.
    pub hdr: bool,
    /// Colorspace selected by the transition, if any was.
    pub colorspace: Option<Colorspace>,
    /// Host time of the switch.
    pub timestamp: HostTime,
}

/// Direction of a PiP transplant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransplantDirection {
    /// Main window → floating window.
    Enter,
    /// Floating window → main window.
    Exit,
}

/// Emitted when a PiP transplant completes.
#[derive(Clone, Copy, Debug)]
pub struct TransplantEvent {
    /// Which way the view moved.
    pub direction: TransplantDirection,
    /// Host time of completion.
    pub timestamp: HostTime,
}

/// Receives frame-loop events. All methods default to no-ops.
pub trait TraceSink {
    /// A vsync tick was drained on the UI thread.
    fn on_tick(&mut self, e: &TickEvent) {
        _ = e;
    }

    /// A draw is about to start.
    fn on_draw_begin(&mut self, e: &DrawBeginEvent) {
        _ = e;
    }

    /// A draw finished.
    fn on_draw_end(&mut self, e: &DrawEndEvent) {
        _ = e;
    }

    /// A dynamic-range transition ran.
    fn on_range_switch(&mut self, e: &RangeSwitchEvent) {
        _ = e;
    }

    /// A PiP transplant completed.
    fn on_transplant(&mut self, e: &TransplantEvent) {
        _ = e;
    }
}

/// Zero-overhead wrapper over an optional [`TraceSink`].
#[derive(Default)]
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a ()>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let enabled = cfg!(feature = "trace");
        f.debug_struct("Tracer").field("enabled", &enabled).finish()
    }
}

impl<'a> Tracer<'a> {
    /// A tracer that records nothing.
    #[must_use]
    pub fn disabled() -> Self {
        Self::default()
    }

    /// A tracer forwarding to `sink` (when the `trace` feature is enabled).
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self::default()
        }
    }

    /// Forwards a tick event.
    #[inline]
    pub fn tick(&mut self, e: &TickEvent) {
        #[cfg(feature = "trace")]
        if let Some(sink) = self.sink.as_deref_mut() {
            sink.on_tick(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Forwards a draw-begin event.
    #[inline]
    pub fn draw_begin(&mut self, e: &DrawBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(sink) = self.sink.as_deref_mut() {
            sink.on_draw_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Forwards a draw-end event.
    #[inline]
    pub fn draw_end(&mut self, e: &DrawEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(sink) = self.sink.as_deref_mut() {
            sink.on_draw_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Forwards a range-switch event.
    #[inline]
    pub fn range_switch(&mut self, e: &RangeSwitchEvent) {
        #[cfg(feature = "trace")]
        if let Some(sink) = self.sink.as_deref_mut() {
            sink.on_range_switch(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Forwards a transplant event.
    #[inline]
    pub fn transplant(&mut self, e: &TransplantEvent) {
        #[cfg(feature = "trace")]
        if let Some(sink) = self.sink.as_deref_mut() {
            sink.on_transplant(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }
}

#[cfg(all(test, feature = "trace"))]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingSink {
        ticks: u32,
        draws: u32,
    }

    impl TraceSink for CountingSink {
        fn on_tick(&mut self, _e: &TickEvent) {
            self.ticks += 1;
        }

        fn on_draw_end(&mut self, _e: &DrawEndEvent) {
            self.draws += 1;
        }
    }

    #[test]
    fn tracer_forwards_to_sink() {
        let mut sink = CountingSink::default();
        {
            let mut tracer = Tracer::new(&mut sink);
            tracer.tick(&TickEvent {
                frame_index: 0,
                now: HostTime(0),
                predicted_present: None,
                confidence: TickConfidence::Predictive,
            });
            tracer.draw_end(&DrawEndEvent {
                frame_index: 0,
                outcome: DrawOutcome::Presented,
                framebuffer: FramebufferId(0),
                timestamp: HostTime(1),
            });
        }
        assert_eq!((sink.ticks, sink.draws), (1, 1));
    }

    #[test]
    fn disabled_tracer_is_inert() {
        let mut tracer = Tracer::disabled();
        tracer.tick(&TickEvent {
            frame_index: 0,
            now: HostTime(0),
            predicted_present: None,
            confidence: TickConfidence::PacingOnly,
        });
    }
}
