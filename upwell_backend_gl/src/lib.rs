// Copyright 2026 the Upwell Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! OpenGL backend for upwell.
//!
//! Implements the core's GPU seams with the GL stack the decoder contract is
//! written against: [`GlContextProvider`] negotiates a pixel format and
//! creates the session context through `glutin`; [`GlDrawTarget`] performs
//! the per-tick draw operations through `glow` against the window's default
//! framebuffer.
//!
//! The embedding application owns the `glutin` [`Display`] and the window
//! (via `raw-window-handle`); this crate only turns those into the core's
//! [`ContextProvider`](upwell_core::context::ContextProvider) and
//! [`DrawTarget`](upwell_core::surface::DrawTarget).
//!
//! [`Display`]: glutin::display::Display

#![expect(
    unsafe_code,
    reason = "glutin display/config/context creation is an unsafe API surface"
)]

mod context;
mod target;

pub use context::{GlContextProvider, GlSessionContext};
pub use target::GlDrawTarget;
