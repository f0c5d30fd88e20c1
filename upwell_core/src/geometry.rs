// Copyright 2026 the Upwell Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Surface geometry and per-draw render targets.
//!
//! [`SurfaceBounds`] is the single source of truth for the video surface's
//! size: logical points plus the backing scale of the hosting window. The
//! host view mutates it on layout and display changes; the compositor reads
//! it at the start of every draw and derives a fresh [`Viewport`] — never a
//! value cached at surface creation, because bounds routinely change between
//! draws (resize, DPI change, PiP relocation).
//!
//! [`FrameTarget`] is the framebuffer descriptor handed to the decoder for
//! exactly one render call. It is built per draw and passed by value; nothing
//! retains it.

use core::fmt;

use kurbo::Size;

/// Logical surface size plus the backing scale of the hosting window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceBounds {
    /// Size in logical points.
    pub size: Size,
    /// Pixels per point of the hosting window's backing store.
    pub scale: f64,
}

impl SurfaceBounds {
    /// Zero-sized bounds at 1x scale, the state before any layout pass.
    pub const EMPTY: Self = Self {
        size: Size::ZERO,
        scale: 1.0,
    };

    /// Creates bounds from a logical size and backing scale.
    #[must_use]
    pub const fn new(size: Size, scale: f64) -> Self {
        Self { size, scale }
    }

    /// Pixel viewport for these bounds: `size * scale`, rounded.
    ///
    /// Negative or non-finite dimensions collapse to zero rather than
    /// wrapping.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "dimensions are clamped non-negative and far below u32::MAX"
    )]
    pub fn viewport(&self) -> Viewport {
        let px = |logical: f64| -> u32 {
            let scaled = logical * self.scale;
            if scaled.is_finite() && scaled > 0.0 {
                scaled.round() as u32
            } else {
                0
            }
        };
        Viewport {
            width: px(self.size.width),
            height: px(self.size.height),
        }
    }
}

/// A pixel-space viewport.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Viewport {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Viewport {
    /// True when either dimension is zero.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Debug for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Viewport({}x{})", self.width, self.height)
    }
}

/// An opaque framebuffer-object id owned by the window system.
///
/// The compositor queries it from the bound draw target each tick; it never
/// allocates or deletes one.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FramebufferId(pub u32);

impl fmt::Debug for FramebufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FramebufferId({})", self.0)
    }
}

/// Color depth negotiated for the GPU context, forwarded to the decoder on
/// every render call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorDepth {
    /// 8 bits per channel, fixed point.
    Standard8,
    /// 16 bits per channel, floating point (extended precision).
    Extended16,
}

impl ColorDepth {
    /// Bits per color channel.
    #[must_use]
    pub const fn bits_per_channel(self) -> u8 {
        match self {
            Self::Standard8 => 8,
            Self::Extended16 => 16,
        }
    }
}

/// Framebuffer descriptor for a single decoder render call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameTarget {
    /// Destination framebuffer object.
    pub framebuffer: FramebufferId,
    /// Target width in pixels.
    pub width: u32,
    /// Target height in pixels.
    pub height: u32,
    /// Whether the decoder must render upside down. Window-system
    /// framebuffers have a flipped y axis relative to decoder output, so
    /// this is true for every on-screen target.
    pub flip_y: bool,
    /// Negotiated color depth of the destination.
    pub depth: ColorDepth,
}

impl FrameTarget {
    /// Builds a target for the given framebuffer and viewport.
    #[must_use]
    pub const fn new(framebuffer: FramebufferId, viewport: Viewport, depth: ColorDepth) -> Self {
        Self {
            framebuffer,
            width: viewport.width,
            height: viewport.height,
            flip_y: true,
            depth,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_scales_and_rounds() {
        let bounds = SurfaceBounds::new(Size::new(640.0, 360.0), 2.0);
        assert_eq!(
            bounds.viewport(),
            Viewport {
                width: 1280,
                height: 720
            }
        );

        // Fractional logical sizes round to the nearest pixel.
        let bounds = SurfaceBounds::new(Size::new(640.4, 360.6), 1.0);
        let vp = bounds.viewport();
        assert_eq!((vp.width, vp.height), (640, 361));
    }

    #[test]
    fn degenerate_bounds_collapse_to_zero() {
        let bounds = SurfaceBounds::new(Size::new(-10.0, f64::NAN), 2.0);
        assert!(bounds.viewport().is_empty());
        assert_eq!(bounds.viewport(), Viewport::default());
    }

    #[test]
    fn frame_target_always_flips() {
        let vp = Viewport {
            width: 1920,
            height: 1080,
        };
        let target = FrameTarget::new(FramebufferId(3), vp, ColorDepth::Extended16);
        assert!(target.flip_y, "on-screen targets are y-flipped");
        assert_eq!(target.depth.bits_per_channel(), 16);
        assert_eq!((target.width, target.height), (1920, 1080));
    }
}
