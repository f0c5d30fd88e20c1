// Copyright 2026 the Upwell Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Vsync tick types delivered by clock backends.
//!
//! The hardware clock carries no rendering logic: each refresh it produces a
//! [`VsyncTick`] whose only job is to prompt a redraw request on the UI
//! thread. Platforms differ in how much they can say about presentation, so
//! ticks are capability-graded via [`TickConfidence`] — backends fill in the
//! optional fields they can actually vouch for.

use crate::time::{HostTime, Ticks};

/// How reliable a tick's presentation timing is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TickConfidence {
    /// Predicted present time is trustworthy (e.g. macOS `CVDisplayLink`).
    Predictive,
    /// Vsync-aligned but loosely predicted (e.g. Android Choreographer).
    Estimated,
    /// Cadence only, no present time (e.g. a timer fallback).
    PacingOnly,
}

/// Identifies the display a tick or surface belongs to.
///
/// Backends assign the values; core passes them through opaquely.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct DisplayId(pub u32);

impl core::fmt::Debug for DisplayId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "DisplayId({})", self.0)
    }
}

/// One display-refresh opportunity, produced on the clock's real-time thread.
///
/// The tick must travel through the event channel to the UI thread before any
/// view or surface state is touched; see [`events`](crate::events).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VsyncTick {
    /// Host time when the tick fired.
    pub now: HostTime,
    /// Predicted time the next frame will reach glass, if the platform knows.
    pub predicted_present: Option<HostTime>,
    /// Display refresh interval, if the platform reports it.
    pub refresh_interval: Option<Ticks>,
    /// Confidence grade for the fields above.
    pub confidence: TickConfidence,
    /// Monotonically increasing tick counter.
    pub frame_index: u64,
    /// Display this tick came from.
    pub display: DisplayId,
}

impl VsyncTick {
    /// Refresh interval as a frame rate, if the interval is known.
    #[must_use]
    pub fn refresh_hz(&self, timebase: crate::time::Timebase) -> Option<f64> {
        let nanos = self.refresh_interval?.to_nanos(timebase);
        (nanos > 0).then(|| 1_000_000_000.0 / nanos as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::Timebase;

    #[test]
    fn refresh_hz_from_interval() {
        let tick = VsyncTick {
            now: HostTime(0),
            predicted_present: None,
            refresh_interval: Some(Ticks(16_666_667)),
            confidence: TickConfidence::Predictive,
            frame_index: 0,
            display: DisplayId(0),
        };
        let hz = tick.refresh_hz(Timebase::NANOS).expect("interval known");
        assert!((hz - 60.0).abs() < 0.01, "expected ~60 Hz, got {hz}");
    }

    #[test]
    fn refresh_hz_unknown_interval() {
        let tick = VsyncTick {
            now: HostTime(0),
            predicted_present: None,
            refresh_interval: None,
            confidence: TickConfidence::PacingOnly,
            frame_index: 0,
            display: DisplayId(0),
        };
        assert_eq!(tick.refresh_hz(Timebase::NANOS), None);
    }
}
