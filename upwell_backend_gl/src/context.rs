// Copyright 2026 the Upwell Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pixel-format negotiation and context creation through glutin.

use std::ffi::CStr;
use std::fmt;
use std::num::NonZeroU32;

use glutin::config::{ColorBufferType, Config, ConfigTemplateBuilder, GlConfig as _};
use glutin::context::{ContextAttributesBuilder, NotCurrentGlContext as _, PossiblyCurrentContext};
use glutin::display::{Display, GlDisplay as _};
use glutin::surface::{GlSurface as _, Surface, SurfaceAttributesBuilder, SwapInterval, WindowSurface};
use raw_window_handle::RawWindowHandle;

use upwell_core::context::{ContextError, ContextProvider, ContextRequest, NegotiatedFormat};
use upwell_core::geometry::ColorDepth;

/// Creates GL contexts against one window for the core's negotiation loop.
///
/// Built from the application's `glutin` [`Display`] plus the window the
/// video surface is embedded in. [`upwell_core::context::negotiate`] calls
/// [`try_create`](ContextProvider::try_create) with the extended request
/// first and the standard request on fallback.
///
/// The request's multithreaded-engine hint has no portable GL equivalent
/// and is ignored here; platform backends that expose one honor it
/// themselves.
pub struct GlContextProvider {
    display: Display,
    window: RawWindowHandle,
    width: NonZeroU32,
    height: NonZeroU32,
}

impl fmt::Debug for GlContextProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlContextProvider")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl GlContextProvider {
    /// Wraps a display and target window.
    ///
    /// `width`/`height` are the window surface's initial pixel size; the
    /// surface is resized on every draw anyway, so approximate values are
    /// fine.
    #[must_use]
    pub fn new(
        display: Display,
        window: RawWindowHandle,
        width: NonZeroU32,
        height: NonZeroU32,
    ) -> Self {
        Self {
            display,
            window,
            width,
            height,
        }
    }

    fn find_config(&self, request: &ContextRequest) -> Result<Config, ContextError> {
        let bits = request.color_bits;
        let template = ConfigTemplateBuilder::new()
            .with_buffer_type(ColorBufferType::Rgb {
                r_size: bits,
                g_size: bits,
                b_size: bits,
            })
            .with_float_pixels(request.float_color)
            .with_single_buffering(!request.double_buffered)
            .prefer_hardware_accelerated(Some(true))
            .compatible_with_native_window(self.window)
            .build();

        // SAFETY: the window handle stored in the template outlives this
        // call; the display was created by the embedding application and is
        // valid for the provider's lifetime.
        let mut configs = unsafe {
            self.display
                .find_configs(template)
                .map_err(|_| ContextError::FormatUnavailable)?
        };
        configs.next().ok_or(ContextError::FormatUnavailable)
    }
}

impl ContextProvider for GlContextProvider {
    type Context = GlSessionContext;

    fn try_create(
        &mut self,
        request: &ContextRequest,
    ) -> Result<(GlSessionContext, NegotiatedFormat), ContextError> {
        let config = self.find_config(request)?;

        let context_attributes = ContextAttributesBuilder::new().build(Some(self.window));
        // SAFETY: config comes from this display; the window handle is valid.
        let not_current = unsafe {
            self.display
                .create_context(&config, &context_attributes)
                .map_err(raw_error)?
        };

        let surface_attributes = SurfaceAttributesBuilder::<WindowSurface>::new().build(
            self.window,
            self.width,
            self.height,
        );
        // SAFETY: as above.
        let surface = unsafe {
            self.display
                .create_window_surface(&config, &surface_attributes)
                .map_err(raw_error)?
        };

        let context = not_current.make_current(&surface).map_err(raw_error)?;

        // Vsync-locked presentation: one swap per refresh.
        if let Some(interval) = NonZeroU32::new(request.swap_interval) {
            surface
                .set_swap_interval(&context, SwapInterval::Wait(interval))
                .map_err(raw_error)?;
        }

        // SAFETY: the loader queries symbols from the live display.
        let gl = unsafe {
            glow::Context::from_loader_function_cstr(|symbol: &CStr| {
                self.display.get_proc_address(symbol)
            })
        };

        let depth = granted_depth(&config, request);
        let format = NegotiatedFormat {
            depth,
            float_color: config.float_pixels(),
            double_buffered: request.double_buffered,
            accelerated: config.hardware_accelerated(),
        };

        Ok((
            GlSessionContext {
                gl,
                context,
                surface,
            },
            format,
        ))
    }
}

/// Color depth the chosen config actually provides.
fn granted_depth(config: &Config, request: &ContextRequest) -> ColorDepth {
    let wide = match config.color_buffer_type() {
        Some(ColorBufferType::Rgb { r_size, .. }) => r_size >= 16,
        _ => false,
    };
    if wide && config.float_pixels() && request.float_color {
        ColorDepth::Extended16
    } else {
        ColorDepth::Standard8
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "platform error codes fit in i32; the value is diagnostic only"
)]
fn raw_error(error: glutin::error::Error) -> ContextError {
    ContextError::CreateFailed(error.raw_code().unwrap_or(-1) as i32)
}

/// The native GL state owned by the session's
/// [`GpuContext`](upwell_core::context::GpuContext).
///
/// Lives behind the context lock; a [`GlDrawTarget`](crate::GlDrawTarget)
/// borrows it for the duration of one draw.
pub struct GlSessionContext {
    pub(crate) gl: glow::Context,
    pub(crate) context: PossiblyCurrentContext,
    pub(crate) surface: Surface<WindowSurface>,
}

impl fmt::Debug for GlSessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlSessionContext").finish_non_exhaustive()
    }
}

impl GlSessionContext {
    /// The loaded GL function table, e.g. for handing to a decoder that
    /// creates its own GL objects against this context.
    #[must_use]
    pub fn gl(&self) -> &glow::Context {
        &self.gl
    }
}
