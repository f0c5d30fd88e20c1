// Copyright 2026 the Upwell Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mach absolute time as the host clock.
//!
//! `CVDisplayLink` timestamps and `mach_absolute_time` share the same tick
//! domain, so [`now`] and the [`timebase`] conversion apply uniformly to
//! everything this backend produces.

use upwell_core::time::{HostTime, Timebase};

/// Current Mach absolute time.
#[must_use]
pub fn now() -> HostTime {
    // SAFETY: mach_absolute_time has no preconditions.
    HostTime(unsafe { libc::mach_absolute_time() })
}

/// The ticks→nanoseconds timebase reported by the kernel.
#[must_use]
pub fn timebase() -> Timebase {
    let mut info = libc::mach_timebase_info { numer: 0, denom: 0 };
    // SAFETY: info is a valid out-pointer; the call fills both fields.
    let ret = unsafe { libc::mach_timebase_info(&mut info) };
    if ret != 0 || info.denom == 0 {
        // The call cannot fail on supported systems; fall back to 1:1
        // rather than dividing by zero if it somehow does.
        return Timebase::NANOS;
    }
    Timebase::new(info.numer, info.denom)
}
