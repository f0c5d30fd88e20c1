// Copyright 2026 the Upwell Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Screen colorspace / ICC / scale lookup via `NSScreen`.

use std::fmt;

use objc2::MainThreadMarker;
use objc2::rc::Retained;
use objc2_app_kit::{NSColorSpace, NSScreen};

use upwell_core::color::{Colorspace, IccProfile};
use upwell_core::range::ScreenInfo;

/// [`ScreenInfo`] over an `NSScreen`.
///
/// Hold the screen the video view's window currently sits on; re-create on
/// window-moved-to-screen notifications so SDR transitions pick up the new
/// display's colorspace and profile.
pub struct NsScreenInfo {
    screen: Retained<NSScreen>,
}

impl fmt::Debug for NsScreenInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NsScreenInfo").finish_non_exhaustive()
    }
}

impl NsScreenInfo {
    /// Wraps a specific screen.
    #[must_use]
    pub fn new(screen: Retained<NSScreen>) -> Self {
        Self { screen }
    }

    /// The screen currently holding keyboard focus's window, if any.
    #[must_use]
    pub fn main(mtm: MainThreadMarker) -> Option<Self> {
        NSScreen::mainScreen(mtm).map(Self::new)
    }

    fn ns_colorspace(&self) -> Option<Retained<NSColorSpace>> {
        self.screen.colorSpace()
    }
}

impl ScreenInfo for NsScreenInfo {
    fn colorspace(&self) -> Option<Colorspace> {
        let colorspace = self.ns_colorspace()?;
        let srgb = NSColorSpace::sRGBColorSpace();
        let p3 = NSColorSpace::displayP3ColorSpace();
        if colorspace == p3 {
            Some(Colorspace::DisplayP3)
        } else if colorspace == srgb {
            Some(Colorspace::Srgb)
        } else {
            // Wide-gamut panels commonly report a device-specific space; the
            // dynamic-range manager's sRGB fallback handles those.
            None
        }
    }

    fn icc_profile(&self) -> Option<IccProfile> {
        let data = self.ns_colorspace()?.ICCProfileData()?;
        Some(IccProfile::new(data.to_vec()))
    }

    fn backing_scale(&self) -> f64 {
        self.screen.backingScaleFactor()
    }
}
