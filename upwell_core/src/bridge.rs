// Copyright 2026 the Upwell Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The contract with the external decoder's render API.
//!
//! The decoder is a trusted black box that decodes and renders video pixels
//! from its own threads. [`DecoderBridge`] is the only seam the rest of the
//! system speaks to it through; no other module may assume anything about
//! the decoder beyond what this trait states.
//!
//! Callbacks flow the other way: at initialization the embedding gives the
//! decoder an [`EventSender`](crate::events::EventSender) clone, and the
//! decoder's callback thread publishes
//! [`DecoderEvent`](crate::events::DecoderEvent)s through it instead of
//! calling into view code.

use core::fmt;

use crate::color::IccProfile;
use crate::geometry::FrameTarget;

/// Errors surfaced by decoder render calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderError {
    /// The decoder's render context has been torn down.
    ContextLost,
    /// The decoder reported a render failure with a platform code.
    RenderFailed(i32),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ContextLost => write!(f, "decoder render context lost"),
            Self::RenderFailed(code) => write!(f, "decoder render failed ({code})"),
        }
    }
}

impl core::error::Error for RenderError {}

/// Narrow, stable contract consumed from the external decoder.
///
/// Threading: [`render`](Self::render) and
/// [`initialize_rendering`](Self::initialize_rendering) are called on the
/// draw path with the GPU gate held; the decoder may fan work out to its own
/// render thread internally but returns only when the target framebuffer
/// holds the frame. Property accessors are cheap and callable from the UI
/// thread at any time.
pub trait DecoderBridge {
    /// One-time setup: lets the decoder create its internal GPU objects
    /// against the session context. Called exactly once, under the GPU
    /// gate, with the context current.
    ///
    /// # Errors
    ///
    /// Any [`RenderError`] aborts the playback session before the first
    /// frame.
    fn initialize_rendering(&mut self) -> Result<(), RenderError>;

    /// Renders the next frame into `target`, blocking until pixels are
    /// written.
    ///
    /// # Errors
    ///
    /// Failures degrade the current draw to the already-cleared black frame;
    /// they do not tear down the session.
    fn render(&mut self, target: FrameTarget) -> Result<(), RenderError>;

    /// Tells the decoder its frame reached the display pipeline, after the
    /// GPU flush. The decoder uses this for pacing and statistics.
    fn report_presented(&mut self);

    /// Whether a decoded frame is waiting to be drawn. Polled every tick;
    /// must not touch the GPU.
    fn frame_pending(&self) -> bool;

    /// Current pause state, for overlay controls.
    fn paused(&self) -> bool;

    /// Toggles playback, for overlay controls.
    fn toggle_play_pause(&mut self);

    /// Hands the decoder the host screen's ICC profile (or clears it) so the
    /// decoder can color-correct for that display itself. `None` tells the
    /// decoder to target the display's native transfer function directly.
    fn apply_icc_profile(&mut self, profile: Option<&IccProfile>);
}

impl fmt::Debug for dyn DecoderBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecoderBridge").finish_non_exhaustive()
    }
}
