// Copyright 2026 the Upwell Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The GPU-backed surface that presents decoded video.
//!
//! Each vsync tick the host asks two questions: *should* we draw
//! ([`CompositorSurface::can_draw`], cheap, no GPU) and, if so, *draw*
//! ([`CompositorSurface::draw`]). A draw always runs the same sequence under
//! the GPU gate:
//!
//! 1. bind the window-system-supplied draw target for **this** tick,
//! 2. clear to black,
//! 3. recompute the viewport from the bounds in effect right now,
//! 4. query the bound draw framebuffer from the target,
//! 5. hand the decoder a fresh [`FrameTarget`],
//! 6. flush, then tell the decoder the frame was presented.
//!
//! Two of those steps are load-bearing corrections rather than setup:
//! rebinding the supplied target (the surface may serve different
//! window-system targets across its life, especially around PiP moves, and
//! a stale private binding renders to the wrong destination), and
//! re-applying the viewport every frame (the window system's cached viewport
//! loses resize races and shows up as letterboxing or clipping).
//!
//! A surface with no decoder attached draws a black frame and returns —
//! never an error, never a panic.

use core::fmt;
use std::sync::Arc;

use crate::bridge::{DecoderBridge, RenderError};
use crate::color::Colorspace;
use crate::context::GpuContext;
use crate::geometry::{ColorDepth, FrameTarget, FramebufferId, SurfaceBounds, Viewport};
use crate::range::RangeTarget;

/// Per-tick draw operations supplied by the window system.
///
/// Implementations wrap whatever the platform hands the compositor for this
/// tick (a GL context + default framebuffer, typically). The compositor
/// treats the target as owned by the window system: it queries the bound
/// framebuffer rather than binding its own.
pub trait DrawTarget {
    /// Makes this tick's context/drawable current. Called first, under the
    /// GPU gate, every draw.
    fn bind_current(&mut self);

    /// Clears the full target to opaque black.
    fn clear_black(&mut self);

    /// Applies the viewport, overriding whatever the window system cached.
    fn set_viewport(&mut self, viewport: Viewport);

    /// The framebuffer object currently bound for drawing.
    fn bound_framebuffer(&self) -> FramebufferId;

    /// Flushes the GPU command stream for this tick.
    fn flush(&mut self);
}

/// What a [`CompositorSurface::draw`] call produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawOutcome {
    /// The decoder wrote a frame and it was presented.
    Presented,
    /// Black was presented: no decoder attached, or the render call failed.
    BlackFrame,
}

/// Running draw counters, reset only with the surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrawStats {
    /// Frames the decoder successfully presented.
    pub presented: u64,
    /// Ticks that produced a black frame.
    pub black_frames: u64,
    /// Render calls that returned an error (a subset of `black_frames`).
    pub render_failures: u64,
}

/// Colorspace/EDR state the platform layer applies to the native surface.
///
/// Mutated exclusively by the dynamic-range manager (the surface implements
/// [`RangeTarget`] with it); backends read it after each color event and
/// push the values into the native layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SurfaceColorState {
    /// Extended-dynamic-range mode on the native surface.
    pub extended_range: bool,
    /// Colorspace currently selected, if any transition has picked one.
    pub colorspace: Option<Colorspace>,
    /// Whether the host compositor's ICC auto-correction is active. Off
    /// whenever the decoder is the color-accurate path.
    pub icc_managed: bool,
}

impl SurfaceColorState {
    const INITIAL: Self = Self {
        extended_range: false,
        colorspace: None,
        icc_managed: true,
    };
}

impl RangeTarget for SurfaceColorState {
    fn set_extended_range(&mut self, enabled: bool) {
        self.extended_range = enabled;
    }

    fn set_colorspace(&mut self, colorspace: Colorspace) {
        self.colorspace = Some(colorspace);
    }

    fn set_icc_managed(&mut self, enabled: bool) {
        self.icc_managed = enabled;
    }
}

/// The embedded video surface.
///
/// Owns the decoder bridge while one is attached and shares the session's
/// [`GpuContext`]. Bounds are pushed in by the host view; the surface never
/// caches a viewport across draws.
pub struct CompositorSurface<C> {
    context: Arc<GpuContext<C>>,
    bounds: SurfaceBounds,
    bridge: Option<Box<dyn DecoderBridge>>,
    color: SurfaceColorState,
    needs_redraw: bool,
    stats: DrawStats,
}

impl<C> fmt::Debug for CompositorSurface<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositorSurface")
            .field("bounds", &self.bounds)
            .field("has_bridge", &self.bridge.is_some())
            .field("color", &self.color)
            .field("needs_redraw", &self.needs_redraw)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl<C> CompositorSurface<C> {
    /// Creates a surface presenting through `context`.
    #[must_use]
    pub fn new(context: Arc<GpuContext<C>>) -> Self {
        Self {
            context,
            bounds: SurfaceBounds::EMPTY,
            bridge: None,
            color: SurfaceColorState::INITIAL,
            needs_redraw: false,
            stats: DrawStats::default(),
        }
    }

    /// The session context this surface presents through.
    #[must_use]
    pub fn context(&self) -> &Arc<GpuContext<C>> {
        &self.context
    }

    /// Negotiated color depth forwarded to the decoder.
    #[must_use]
    pub fn depth(&self) -> ColorDepth {
        self.context.depth()
    }

    /// Current bounds.
    #[must_use]
    pub fn bounds(&self) -> SurfaceBounds {
        self.bounds
    }

    /// Replaces the bounds. Called by the host view on every layout pass and
    /// backing-scale change, before the next draw reads them.
    pub fn set_bounds(&mut self, bounds: SurfaceBounds) {
        self.bounds = bounds;
    }

    /// Marks the surface as wanting a redraw at the next opportunity.
    pub fn mark_needs_redraw(&mut self) {
        self.needs_redraw = true;
    }

    /// Whether a redraw request is outstanding.
    #[must_use]
    pub fn needs_redraw(&self) -> bool {
        self.needs_redraw
    }

    /// Attaches the decoder bridge, running its one-time GPU initialization
    /// under the gate.
    ///
    /// # Errors
    ///
    /// Propagates the bridge's initialization failure; the bridge is dropped
    /// and the surface keeps degrading to black frames.
    pub fn attach_bridge(&mut self, mut bridge: Box<dyn DecoderBridge>) -> Result<(), RenderError> {
        {
            let _gate = self.context.lock();
            bridge.initialize_rendering()?;
        }
        self.bridge = Some(bridge);
        Ok(())
    }

    /// Detaches and returns the bridge, if one is attached.
    pub fn detach_bridge(&mut self) -> Option<Box<dyn DecoderBridge>> {
        self.bridge.take()
    }

    /// Whether a decoder is attached.
    #[must_use]
    pub fn has_bridge(&self) -> bool {
        self.bridge.is_some()
    }

    /// Mutable access to the attached bridge, for overlay controls.
    pub fn bridge_mut(&mut self) -> Option<&mut (dyn DecoderBridge + 'static)> {
        self.bridge.as_deref_mut()
    }

    /// Colorspace/EDR state for the platform layer to mirror.
    #[must_use]
    pub fn color_state(&self) -> &SurfaceColorState {
        &self.color
    }

    /// Splits out the pieces the dynamic-range manager mutates: the color
    /// state and the bridge (for ICC handoff).
    pub fn range_parts(&mut self) -> (&mut SurfaceColorState, Option<&mut (dyn DecoderBridge + 'static)>) {
        (&mut self.color, self.bridge.as_deref_mut())
    }

    /// Whether drawing now would present new content.
    ///
    /// True only when the decoder reports a decoded frame waiting. Cheap —
    /// polled every tick, holds no locks, touches no GPU state — and false
    /// while the stream is paused or stalled so ticks don't burn redraws.
    #[must_use]
    pub fn can_draw(&self) -> bool {
        self.bridge.as_deref().is_some_and(|bridge| bridge.frame_pending())
    }

    /// Draws one frame into the window-supplied `target`.
    ///
    /// Runs the full sequence described in the module docs under the GPU
    /// gate. With no decoder attached (or a failing render call) the target
    /// is left cleared to black and the call still succeeds.
    pub fn draw(&mut self, target: &mut dyn DrawTarget) -> DrawOutcome {
        let _gate = self.context.lock();
        self.needs_redraw = false;

        // The window system may have handed us a different target than last
        // tick (PiP transitions); never trust a previous binding.
        target.bind_current();
        target.clear_black();

        // Viewport from the bounds in effect *now*, overriding anything the
        // window system cached before layout settled.
        let viewport = self.bounds.viewport();
        target.set_viewport(viewport);

        let framebuffer = target.bound_framebuffer();

        let outcome = match self.bridge.as_deref_mut() {
            None => DrawOutcome::BlackFrame,
            Some(bridge) => {
                let frame = FrameTarget::new(framebuffer, viewport, self.context.depth());
                match bridge.render(frame) {
                    Ok(()) => DrawOutcome::Presented,
                    Err(_) => {
                        self.stats.render_failures += 1;
                        DrawOutcome::BlackFrame
                    }
                }
            }
        };

        target.flush();

        match outcome {
            DrawOutcome::Presented => {
                if let Some(bridge) = self.bridge.as_deref_mut() {
                    bridge.report_presented();
                }
                self.stats.presented += 1;
            }
            DrawOutcome::BlackFrame => {
                self.stats.black_frames += 1;
            }
        }

        outcome
    }

    /// Draw counters since creation.
    #[must_use]
    pub fn stats(&self) -> DrawStats {
        self.stats
    }
}
