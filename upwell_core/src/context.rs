// Copyright 2026 the Upwell Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! GPU context ownership and pixel-format negotiation.
//!
//! Exactly one [`GpuContext`] exists per playback session. It is created
//! before the first host view and outlives any view it is presented through,
//! so relocating the surface (notably into the PiP window) never re-creates
//! the native context.
//!
//! Negotiation tries an extended-precision format first (16-bit float color
//! for HDR output) and falls back to a standard 8-bit format when the
//! platform refuses. The depth that sticks is forwarded to the decoder on
//! every render call via [`FrameTarget`](crate::geometry::FrameTarget).
//!
//! The context doubles as the system-wide GPU gate: every code path that
//! binds or issues commands against it — draw, decoder initialization,
//! teardown — must hold the guard returned by [`GpuContext::lock`] for the
//! duration. The decoder renders from its own thread, so this is a real
//! mutex, not a re-entrancy convention.

use core::fmt;
use core::ops::{Deref, DerefMut};

use parking_lot::{Mutex, MutexGuard};

use crate::geometry::ColorDepth;

/// Pixel-format request handed to a [`ContextProvider`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ContextRequest {
    /// Bits per color channel.
    pub color_bits: u8,
    /// Whether color channels are floating point.
    pub float_color: bool,
    /// Whether the format is double buffered.
    pub double_buffered: bool,
    /// Buffer-swap interval in refresh periods; 1 means vsync-locked.
    pub swap_interval: u32,
    /// Hint that GPU command submission happens from more than one thread.
    /// The decoder renders concurrently with presentation, so both request
    /// presets set this.
    pub multithreaded_engine: bool,
}

impl ContextRequest {
    /// Extended-precision request: 16-bit float color for HDR output.
    #[must_use]
    pub const fn extended() -> Self {
        Self {
            color_bits: 16,
            float_color: true,
            double_buffered: true,
            swap_interval: 1,
            multithreaded_engine: true,
        }
    }

    /// Standard request: 8-bit fixed-point color.
    #[must_use]
    pub const fn standard() -> Self {
        Self {
            color_bits: 8,
            float_color: false,
            double_buffered: true,
            swap_interval: 1,
            multithreaded_engine: true,
        }
    }
}

/// What the platform actually granted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NegotiatedFormat {
    /// Granted color depth.
    pub depth: ColorDepth,
    /// Whether color channels are floating point.
    pub float_color: bool,
    /// Whether the context is double buffered.
    pub double_buffered: bool,
    /// Whether the context is hardware accelerated.
    pub accelerated: bool,
}

/// Errors from context creation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContextError {
    /// The requested pixel format does not exist on this hardware. The
    /// negotiator retries once with the standard format before giving up.
    FormatUnavailable,
    /// The platform failed to create a context for a format it claims to
    /// support.
    CreateFailed(i32),
    /// No GPU rendering is available at all. The playback session reports
    /// "hardware rendering unavailable" and ends; the host application
    /// keeps running.
    Unavailable,
}

impl fmt::Display for ContextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FormatUnavailable => write!(f, "requested pixel format unavailable"),
            Self::CreateFailed(code) => write!(f, "context creation failed ({code})"),
            Self::Unavailable => write!(f, "hardware rendering unavailable"),
        }
    }
}

impl core::error::Error for ContextError {}

/// Platform seam for creating native rendering contexts.
///
/// Backends implement this once per window-system API. `try_create` is
/// called at most twice per session: with [`ContextRequest::extended`] and,
/// if that yields [`ContextError::FormatUnavailable`], with
/// [`ContextRequest::standard`].
pub trait ContextProvider {
    /// The native context type this provider produces.
    type Context;

    /// Attempts to create a context matching `request`.
    ///
    /// # Errors
    ///
    /// [`ContextError::FormatUnavailable`] when no such pixel format exists;
    /// any other variant when creation fails outright.
    fn try_create(
        &mut self,
        request: &ContextRequest,
    ) -> Result<(Self::Context, NegotiatedFormat), ContextError>;
}

/// Negotiates a context: extended precision first, standard fallback.
///
/// # Errors
///
/// Returns the provider's error when both attempts fail, mapped to
/// [`ContextError::Unavailable`] if the fallback format is also missing.
pub fn negotiate<P: ContextProvider>(provider: &mut P) -> Result<GpuContext<P::Context>, ContextError> {
    match provider.try_create(&ContextRequest::extended()) {
        Ok((native, format)) => Ok(GpuContext::new(native, format)),
        Err(ContextError::FormatUnavailable) => {
            match provider.try_create(&ContextRequest::standard()) {
                Ok((native, format)) => Ok(GpuContext::new(native, format)),
                Err(ContextError::FormatUnavailable) => Err(ContextError::Unavailable),
                Err(other) => Err(other),
            }
        }
        Err(other) => Err(other),
    }
}

/// Exclusive owner of the session's native rendering context.
///
/// Not `Clone`: share it behind an `Arc` where the host view and decoder
/// glue both need it.
pub struct GpuContext<C> {
    native: Mutex<C>,
    format: NegotiatedFormat,
}

impl<C> fmt::Debug for GpuContext<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GpuContext")
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}

impl<C> GpuContext<C> {
    /// Wraps an already-negotiated native context.
    #[must_use]
    pub fn new(native: C, format: NegotiatedFormat) -> Self {
        Self {
            native: Mutex::new(native),
            format,
        }
    }

    /// The format negotiation settled on.
    #[must_use]
    pub fn format(&self) -> NegotiatedFormat {
        self.format
    }

    /// Color depth forwarded to the decoder with every frame target.
    #[must_use]
    pub fn depth(&self) -> ColorDepth {
        self.format.depth
    }

    /// Acquires the GPU gate, blocking until it is free.
    ///
    /// All GPU work in the system happens inside this scope. The guard
    /// dereferences to the native context.
    #[must_use]
    pub fn lock(&self) -> ContextGuard<'_, C> {
        ContextGuard {
            inner: self.native.lock(),
        }
    }
}

/// Scoped exclusive access to the native context.
pub struct ContextGuard<'a, C> {
    inner: MutexGuard<'a, C>,
}

impl<C> fmt::Debug for ContextGuard<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextGuard").finish_non_exhaustive()
    }
}

impl<C> Deref for ContextGuard<'_, C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.inner
    }
}

impl<C> DerefMut for ContextGuard<'_, C> {
    fn deref_mut(&mut self) -> &mut C {
        &mut self.inner
    }
}
