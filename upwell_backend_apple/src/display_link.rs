// Copyright 2026 the Upwell Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `CVDisplayLink` vsync source.
//!
//! Wraps `CVDisplayLink` so each output callback becomes a
//! [`VsyncTick`] with [`TickConfidence::Predictive`], published straight
//! onto the session's event channel. The callback runs on a high-priority
//! `CoreVideo` thread and touches nothing but the pinned callback state and
//! the `Send + Sync` [`EventSender`] — the UI thread picks the tick up when
//! it drains the channel.

use std::ffi::c_void;
use std::fmt;
use std::pin::Pin;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicU64, Ordering};

use objc2_core_foundation::CFRetained;
use objc2_core_video::{CVDisplayLink as CVDisplayLinkRaw, CVTimeStamp, kCVReturnSuccess};

use upwell_core::events::EventSender;
use upwell_core::time::{HostTime, Ticks};
use upwell_core::timing::{DisplayId, TickConfidence, VsyncTick};
use upwell_core::view::ClockControl;

/// Errors from [`DisplayLink`] operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayLinkError {
    /// Creating the link failed.
    CreateFailed(i32),
    /// Installing the output callback failed.
    CallbackFailed(i32),
    /// Starting tick delivery failed.
    StartFailed(i32),
    /// Stopping tick delivery failed.
    StopFailed(i32),
}

impl fmt::Display for DisplayLinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateFailed(code) => write!(f, "display link creation failed ({code})"),
            Self::CallbackFailed(code) => write!(f, "display link callback setup failed ({code})"),
            Self::StartFailed(code) => write!(f, "display link start failed ({code})"),
            Self::StopFailed(code) => write!(f, "display link stop failed ({code})"),
        }
    }
}

impl core::error::Error for DisplayLinkError {}

struct CallbackState {
    sender: EventSender,
    frame_counter: AtomicU64,
    display: DisplayId,
}

/// Vsync source for one display, feeding the event channel.
///
/// `!Send`: the underlying `CVDisplayLink` is not thread-safe for mutation.
/// The output callback itself runs on a `CoreVideo` background thread by
/// design and uses only atomics plus the channel sender.
pub struct DisplayLink {
    /// Retained reference; `CFRetained` releases on drop.
    raw: CFRetained<CVDisplayLinkRaw>,
    /// Pinned state shared with the C callback. Declared after `raw` so the
    /// link is torn down first.
    _state: Pin<Box<CallbackState>>,
}

impl fmt::Debug for DisplayLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisplayLink")
            .field("display", &self._state.display)
            .finish_non_exhaustive()
    }
}

impl DisplayLink {
    /// Creates a link over all active displays, publishing ticks to
    /// `sender`.
    ///
    /// The link is created stopped; the host view's attach path starts it
    /// through [`ClockControl`].
    ///
    /// # Errors
    ///
    /// Returns [`DisplayLinkError`] when the underlying `CoreVideo` calls
    /// fail.
    #[expect(
        deprecated,
        reason = "CVDisplayLink is deprecated by Apple but still the vsync source with predictive timing"
    )]
    pub fn new(sender: EventSender, display: DisplayId) -> Result<Self, DisplayLinkError> {
        let state = Box::pin(CallbackState {
            sender,
            frame_counter: AtomicU64::new(0),
            display,
        });

        let mut link_ptr: *mut CVDisplayLinkRaw = std::ptr::null_mut();
        // SAFETY: link_ptr is a valid out-pointer.
        let ret = unsafe {
            CVDisplayLinkRaw::create_with_active_cg_displays(NonNull::new_unchecked(&mut link_ptr))
        };
        if ret != kCVReturnSuccess {
            return Err(DisplayLinkError::CreateFailed(ret));
        }
        let raw_nn = NonNull::new(link_ptr).ok_or(DisplayLinkError::CreateFailed(ret))?;
        // SAFETY: creation follows the Create Rule and returns +1 retained.
        let raw = unsafe { CFRetained::from_raw(raw_nn) };

        let state_ptr: *const CallbackState = &*state;
        // SAFETY: output_callback matches the C signature; state_ptr stays
        // valid for as long as this DisplayLink exists.
        let ret = unsafe { raw.set_output_callback(Some(output_callback), state_ptr as *mut c_void) };
        if ret != kCVReturnSuccess {
            return Err(DisplayLinkError::CallbackFailed(ret));
        }

        Ok(Self { raw, _state: state })
    }

    /// Starts tick delivery.
    ///
    /// # Errors
    ///
    /// [`DisplayLinkError::StartFailed`] when already running or on a
    /// `CoreVideo` error.
    #[expect(
        deprecated,
        reason = "CVDisplayLink is deprecated by Apple but still the vsync source with predictive timing"
    )]
    pub fn start_link(&self) -> Result<(), DisplayLinkError> {
        let ret = self.raw.start();
        if ret != kCVReturnSuccess {
            return Err(DisplayLinkError::StartFailed(ret));
        }
        Ok(())
    }

    /// Stops tick delivery.
    ///
    /// # Errors
    ///
    /// [`DisplayLinkError::StopFailed`] when not running or on a
    /// `CoreVideo` error.
    #[expect(
        deprecated,
        reason = "CVDisplayLink is deprecated by Apple but still the vsync source with predictive timing"
    )]
    pub fn stop_link(&self) -> Result<(), DisplayLinkError> {
        let ret = self.raw.stop();
        if ret != kCVReturnSuccess {
            return Err(DisplayLinkError::StopFailed(ret));
        }
        Ok(())
    }

    /// Whether the link is delivering ticks.
    #[expect(
        deprecated,
        reason = "CVDisplayLink is deprecated by Apple but still the vsync source with predictive timing"
    )]
    #[must_use]
    pub fn running(&self) -> bool {
        self.raw.is_running()
    }
}

impl ClockControl for DisplayLink {
    fn start(&mut self) {
        // The attach path treats clock start as advisory; a start race with
        // an already-running link is harmless.
        let _ = self.start_link();
    }

    fn stop(&mut self) {
        let _ = self.stop_link();
    }

    fn is_running(&self) -> bool {
        self.running()
    }
}

impl Drop for DisplayLink {
    fn drop(&mut self) {
        if self.is_running() {
            let _ = self.stop_link();
        }
    }
}

/// The C callback, invoked by `CoreVideo` on its background thread.
///
/// # Safety
///
/// - `user_info` must point to a valid, pinned `CallbackState`.
/// - `in_now` / `in_output_time` are valid `CVTimeStamp`s (guaranteed by
///   `CoreVideo`).
unsafe extern "C-unwind" fn output_callback(
    _display_link: NonNull<CVDisplayLinkRaw>,
    in_now: NonNull<CVTimeStamp>,
    in_output_time: NonNull<CVTimeStamp>,
    _flags_in: u64,
    _flags_out: NonNull<u64>,
    user_info: *mut c_void,
) -> i32 {
    // SAFETY: user_info is the pinned CallbackState set in `new`.
    let state = unsafe { &*(user_info.cast::<CallbackState>()) };

    let now_ts = unsafe { in_now.as_ref() };
    let out_ts = unsafe { in_output_time.as_ref() };

    let now = HostTime(now_ts.hostTime);
    let predicted_present = HostTime(out_ts.hostTime);
    let refresh_interval = (out_ts.hostTime > now_ts.hostTime)
        .then(|| Ticks(out_ts.hostTime - now_ts.hostTime));

    let frame_index = state.frame_counter.fetch_add(1, Ordering::Relaxed);

    state.sender.send_tick(VsyncTick {
        now,
        predicted_present: Some(predicted_present),
        refresh_interval,
        confidence: TickConfidence::Predictive,
        frame_index,
        display: state.display,
    });

    kCVReturnSuccess
}
