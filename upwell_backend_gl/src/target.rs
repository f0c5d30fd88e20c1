// Copyright 2026 the Upwell Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-tick draw operations against the window's default framebuffer.

use std::fmt;
use std::num::NonZeroU32;

use glow::HasContext as _;
use glutin::context::PossiblyCurrentGlContext as _;
use glutin::surface::GlSurface as _;

use upwell_core::geometry::{FramebufferId, Viewport};
use upwell_core::surface::DrawTarget;

use crate::context::GlSessionContext;

/// One tick's draw target over the session's GL state.
///
/// Constructed inside the GPU gate each draw and dropped before the gate is
/// released; never stored. [`DrawTarget::flush`] both flushes the command
/// stream and swaps buffers, which is what presents on a double-buffered
/// window surface.
pub struct GlDrawTarget<'a> {
    session: &'a GlSessionContext,
}

impl fmt::Debug for GlDrawTarget<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlDrawTarget").finish_non_exhaustive()
    }
}

impl<'a> GlDrawTarget<'a> {
    /// Borrows the session state for one draw.
    #[must_use]
    pub fn new(session: &'a GlSessionContext) -> Self {
        Self { session }
    }
}

impl DrawTarget for GlDrawTarget<'_> {
    fn bind_current(&mut self) {
        // The surface may have been rehosted since the previous tick; always
        // re-make the pair current rather than trusting the old binding.
        let _ = self
            .session
            .context
            .make_current(&self.session.surface);
    }

    fn clear_black(&mut self) {
        let gl = &self.session.gl;
        // SAFETY: the context was made current by `bind_current` under the
        // GPU gate.
        unsafe {
            gl.clear_color(0.0, 0.0, 0.0, 1.0);
            gl.clear(glow::COLOR_BUFFER_BIT);
        }
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        // Keep the window surface itself in step with the viewport; EGL
        // surfaces do not track the window on their own.
        if let (Some(width), Some(height)) = (
            NonZeroU32::new(viewport.width),
            NonZeroU32::new(viewport.height),
        ) {
            self.session
                .surface
                .resize(&self.session.context, width, height);
        }

        let gl = &self.session.gl;
        #[expect(
            clippy::cast_possible_wrap,
            reason = "viewports are far below i32::MAX"
        )]
        let (width, height) = (viewport.width as i32, viewport.height as i32);
        // SAFETY: context is current.
        unsafe {
            gl.viewport(0, 0, width, height);
        }
    }

    fn bound_framebuffer(&self) -> FramebufferId {
        let gl = &self.session.gl;
        // SAFETY: context is current.
        let id = unsafe { gl.get_parameter_i32(glow::DRAW_FRAMEBUFFER_BINDING) };
        #[expect(
            clippy::cast_sign_loss,
            reason = "GL framebuffer names are non-negative"
        )]
        let id = id as u32;
        FramebufferId(id)
    }

    fn flush(&mut self) {
        let gl = &self.session.gl;
        // SAFETY: context is current.
        unsafe {
            gl.flush();
        }
        let _ = self
            .session
            .surface
            .swap_buffers(&self.session.context);
    }
}
