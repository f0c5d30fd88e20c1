// Copyright 2026 the Upwell Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! macOS backend for upwell.
//!
//! - [`DisplayLink`] — `CVDisplayLink`-driven vsync source that publishes
//!   [`VsyncTick`](upwell_core::timing::VsyncTick)s with predictive timing
//!   onto the event channel, and implements
//!   [`ClockControl`](upwell_core::view::ClockControl) for the host view.
//! - [`mach_time`] — Mach absolute time and its timebase.
//! - [`NsScreenInfo`] — screen colorspace / ICC / backing-scale lookup via
//!   `NSScreen`, for the dynamic-range manager's SDR path.
//! - [`main_queue_waker`] — a channel waker that pokes the main dispatch
//!   queue so drains happen promptly after off-thread pushes.

#![expect(
    unsafe_code,
    reason = "CoreVideo callback registration and Mach clock calls are FFI"
)]

mod display_link;
pub mod mach_time;
mod screen;

pub use display_link::{DisplayLink, DisplayLinkError};
pub use screen::NsScreenInfo;

use dispatch2::DispatchQueue;

/// Returns a waker for
/// [`channel_with_waker`](upwell_core::events::channel_with_waker) that
/// schedules an empty block on the main dispatch queue.
///
/// Draining still happens on the UI thread's own schedule; the block only
/// ensures the run loop turns over soon after a tick or decoder callback
/// lands.
#[must_use]
pub fn main_queue_waker() -> impl Fn() + Send + Sync + 'static {
    || DispatchQueue::main().exec_async(|| {})
}
