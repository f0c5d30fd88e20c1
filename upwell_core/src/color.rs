// Copyright 2026 the Upwell Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Color metadata surfaced by the decoder and colorspace selection.
//!
//! The decoder reports stream color out-of-band as string tags (the mpv-style
//! `"bt.2020"` / `"pq"` vocabulary). Tags are parsed once at the bridge
//! boundary into [`TransferTag`] / [`PrimariesTag`]; everything downstream
//! works with the enums. A whole [`ColorProfile`] is replaced on every
//! notification — profiles are never patched field by field.

use core::fmt;

/// Transfer function reported for the stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransferTag {
    /// SDR broadcast gamma (BT.1886).
    Bt1886,
    /// Piecewise sRGB.
    Srgb,
    /// SMPTE ST 2084 perceptual quantizer.
    Pq,
    /// Hybrid log-gamma.
    Hlg,
    /// Anything this module does not recognize.
    Other,
}

impl TransferTag {
    /// Parses a decoder-reported transfer tag.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "bt.1886" | "1886" => Self::Bt1886,
            "srgb" => Self::Srgb,
            "pq" | "smpte2084" | "st2084" => Self::Pq,
            "hlg" | "arib-std-b67" => Self::Hlg,
            _ => Self::Other,
        }
    }
}

/// Color primaries reported for the stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrimariesTag {
    /// BT.709 / sRGB primaries.
    Bt709,
    /// BT.2020 wide gamut.
    Bt2020,
    /// DCI/Display P3.
    DisplayP3,
    /// Anything this module does not recognize.
    Other,
}

impl PrimariesTag {
    /// Parses a decoder-reported primaries tag.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "bt.709" | "709" => Self::Bt709,
            "bt.2020" | "2020" | "bt.2100" => Self::Bt2020,
            "display-p3" | "dci-p3" | "p3" => Self::DisplayP3,
            _ => Self::Other,
        }
    }
}

/// Stream color metadata, owned by the dynamic-range manager.
///
/// Replaced wholesale whenever the decoder reports a change (new segment,
/// stream switch).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ColorProfile {
    /// Whether the stream is high dynamic range.
    pub hdr: bool,
    /// Transfer function tag.
    pub transfer: TransferTag,
    /// Color primaries tag.
    pub primaries: PrimariesTag,
}

impl ColorProfile {
    /// The profile assumed before the decoder reports anything: SDR BT.709.
    pub const SDR_DEFAULT: Self = Self {
        hdr: false,
        transfer: TransferTag::Bt1886,
        primaries: PrimariesTag::Bt709,
    };

    /// Builds a profile from the raw tag strings of a decoder notification.
    #[must_use]
    pub fn from_tags(hdr: bool, transfer: &str, primaries: &str) -> Self {
        Self {
            hdr,
            transfer: TransferTag::from_tag(transfer),
            primaries: PrimariesTag::from_tag(primaries),
        }
    }
}

/// Platform colorspace the surface can be switched to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Colorspace {
    /// Standard sRGB.
    Srgb,
    /// BT.709 video.
    Bt709,
    /// Display P3.
    DisplayP3,
    /// BT.2020 with the PQ transfer (wide-gamut HDR).
    Bt2020Pq,
    /// BT.2020 with the HLG transfer.
    Bt2020Hlg,
}

impl fmt::Display for Colorspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Srgb => "sRGB",
            Self::Bt709 => "BT.709",
            Self::DisplayP3 => "Display P3",
            Self::Bt2020Pq => "BT.2020 PQ",
            Self::Bt2020Hlg => "BT.2020 HLG",
        };
        f.write_str(name)
    }
}

/// Fixed lookup from HDR stream primaries to a surface colorspace.
///
/// Only wide-gamut primaries the platform has a native HDR colorspace for
/// are mapped. An unrecognized tag returns `None`, which callers treat as
/// "leave the current colorspace in place" — deliberately not a fallback to
/// some default.
#[must_use]
pub fn hdr_colorspace_for(primaries: PrimariesTag, transfer: TransferTag) -> Option<Colorspace> {
    match primaries {
        PrimariesTag::Bt2020 => Some(match transfer {
            TransferTag::Hlg => Colorspace::Bt2020Hlg,
            _ => Colorspace::Bt2020Pq,
        }),
        PrimariesTag::DisplayP3 => Some(Colorspace::DisplayP3),
        PrimariesTag::Bt709 | PrimariesTag::Other => None,
    }
}

/// An ICC display profile exposed by the host window system.
#[derive(Clone, PartialEq, Eq)]
pub struct IccProfile {
    data: Vec<u8>,
}

impl IccProfile {
    /// Wraps raw ICC profile bytes.
    #[must_use]
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// The raw profile bytes, as handed to the decoder.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

impl fmt::Debug for IccProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IccProfile")
            .field("len", &self.data.len())
            .finish()
    }
}
