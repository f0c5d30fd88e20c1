// Copyright 2026 the Upwell Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! SDR/HDR switching driven by decoder color metadata.
//!
//! A two-state machine that transitions only on explicit decoder
//! notifications — never on anything inferred locally. Every notification is
//! applied as a complete, fresh transition: re-entering HDR with different
//! primaries reconfigures the surface the same way a cold entry would, and
//! repeating identical metadata lands in the identical configuration.
//!
//! The decoder is the color-accurate path. In HDR the host compositor's ICC
//! correction is switched off and the decoder targets the display's transfer
//! function directly; letting both correct produces visibly wrong color. In
//! SDR the screen's ICC profile (when the host exposes one) is forwarded to
//! the decoder so it can self-correct for that display.

use core::fmt;

use crate::bridge::DecoderBridge;
use crate::color::{ColorProfile, Colorspace, IccProfile, hdr_colorspace_for};

/// Current dynamic-range state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RangeState {
    /// Standard dynamic range.
    Sdr,
    /// High dynamic range (extended-range surface mode).
    Hdr,
}

/// Surface-side knobs a range transition turns.
///
/// Implemented by
/// [`SurfaceColorState`](crate::surface::SurfaceColorState); platform
/// layers mirror the resulting state onto the native surface.
pub trait RangeTarget {
    /// Switches the surface's extended-dynamic-range mode.
    fn set_extended_range(&mut self, enabled: bool);

    /// Selects the surface colorspace. Not called at all when an HDR
    /// transition carries unrecognized primaries — the previous colorspace
    /// stays in place.
    fn set_colorspace(&mut self, colorspace: Colorspace);

    /// Enables or disables the host compositor's ICC auto-correction.
    fn set_icc_managed(&mut self, enabled: bool);
}

/// Host-side lookup for the screen currently showing the view.
pub trait ScreenInfo {
    /// The screen's colorspace, if the host can name one.
    fn colorspace(&self) -> Option<Colorspace>;

    /// The screen's ICC profile, if the host exposes it.
    fn icc_profile(&self) -> Option<IccProfile>;

    /// Backing scale of the screen (pixels per point).
    fn backing_scale(&self) -> f64;
}

/// The SDR/HDR state machine.
pub struct DynamicRangeManager {
    state: RangeState,
    profile: ColorProfile,
}

impl fmt::Debug for DynamicRangeManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicRangeManager")
            .field("state", &self.state)
            .field("profile", &self.profile)
            .finish()
    }
}

impl Default for DynamicRangeManager {
    fn default() -> Self {
        Self::new()
    }
}

impl DynamicRangeManager {
    /// Starts in SDR with the default BT.709 profile.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: RangeState::Sdr,
            profile: ColorProfile::SDR_DEFAULT,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> RangeState {
        self.state
    }

    /// The profile most recently reported by the decoder.
    #[must_use]
    pub fn profile(&self) -> ColorProfile {
        self.profile
    }

    /// Applies a decoder color notification.
    ///
    /// `target` receives the surface-side changes; `screen` answers
    /// colorspace/ICC questions for the SDR path; `bridge` (when a decoder
    /// is attached) receives the ICC handoff. The stored profile is replaced
    /// wholesale.
    pub fn apply(
        &mut self,
        profile: ColorProfile,
        screen: &dyn ScreenInfo,
        target: &mut dyn RangeTarget,
        bridge: Option<&mut (dyn DecoderBridge + 'static)>,
    ) {
        self.profile = profile;
        if profile.hdr {
            self.enter_hdr(profile, target, bridge);
        } else {
            self.enter_sdr(screen, target, bridge);
        }
    }

    fn enter_hdr(
        &mut self,
        profile: ColorProfile,
        target: &mut dyn RangeTarget,
        bridge: Option<&mut (dyn DecoderBridge + 'static)>,
    ) {
        self.state = RangeState::Hdr;
        target.set_extended_range(true);
        if let Some(colorspace) = hdr_colorspace_for(profile.primaries, profile.transfer) {
            target.set_colorspace(colorspace);
        }
        // The decoder drives the display's native transfer function; keep
        // the host compositor out of the loop.
        target.set_icc_managed(false);
        if let Some(bridge) = bridge {
            bridge.apply_icc_profile(None);
        }
    }

    fn enter_sdr(
        &mut self,
        screen: &dyn ScreenInfo,
        target: &mut dyn RangeTarget,
        bridge: Option<&mut (dyn DecoderBridge + 'static)>,
    ) {
        self.state = RangeState::Sdr;
        target.set_extended_range(false);
        target.set_colorspace(screen.colorspace().unwrap_or(Colorspace::Srgb));
        target.set_icc_managed(false);
        if let Some(bridge) = bridge {
            let profile = screen.icc_profile();
            bridge.apply_icc_profile(profile.as_ref());
        }
    }
}
