// Copyright 2026 the Upwell Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and appends each event to a
//! `Vec<u8>` as a tagged little-endian record. [`decode`] walks the bytes
//! back as an iterator of [`RecordedEvent`]; a truncated or corrupt tail
//! simply ends the iteration.

use upwell_core::color::Colorspace;
use upwell_core::geometry::FramebufferId;
use upwell_core::surface::DrawOutcome;
use upwell_core::time::HostTime;
use upwell_core::timing::TickConfidence;
use upwell_core::trace::{
    DrawBeginEvent, DrawEndEvent, RangeSwitchEvent, TickEvent, TraceSink, TransplantDirection,
    TransplantEvent,
};

const TAG_TICK: u8 = 1;
const TAG_DRAW_BEGIN: u8 = 2;
const TAG_DRAW_END: u8 = 3;
const TAG_RANGE_SWITCH: u8 = 4;
const TAG_TRANSPLANT: u8 = 5;

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder, returning the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers ----------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_option_u64(&mut self, v: Option<u64>) {
        match v {
            Some(val) => {
                self.write_u8(1);
                self.write_u64(val);
            }
            None => {
                self.write_u8(0);
                self.write_u64(0);
            }
        }
    }
}

fn confidence_code(c: TickConfidence) -> u8 {
    match c {
        TickConfidence::Predictive => 0,
        TickConfidence::Estimated => 1,
        TickConfidence::PacingOnly => 2,
    }
}

fn confidence_from(code: u8) -> Option<TickConfidence> {
    match code {
        0 => Some(TickConfidence::Predictive),
        1 => Some(TickConfidence::Estimated),
        2 => Some(TickConfidence::PacingOnly),
        _ => None,
    }
}

fn colorspace_code(cs: Option<Colorspace>) -> u8 {
    match cs {
        None => 0,
        Some(Colorspace::Srgb) => 1,
        Some(Colorspace::Bt709) => 2,
        Some(Colorspace::DisplayP3) => 3,
        Some(Colorspace::Bt2020Pq) => 4,
        Some(Colorspace::Bt2020Hlg) => 5,
    }
}

fn colorspace_from(code: u8) -> Option<Option<Colorspace>> {
    match code {
        0 => Some(None),
        1 => Some(Some(Colorspace::Srgb)),
        2 => Some(Some(Colorspace::Bt709)),
        3 => Some(Some(Colorspace::DisplayP3)),
        4 => Some(Some(Colorspace::Bt2020Pq)),
        5 => Some(Some(Colorspace::Bt2020Hlg)),
        _ => None,
    }
}

impl TraceSink for RecorderSink {
    fn on_tick(&mut self, e: &TickEvent) {
        self.write_u8(TAG_TICK);
        self.write_u64(e.frame_index);
        self.write_u64(e.now.ticks());
        self.write_option_u64(e.predicted_present.map(|t| t.ticks()));
        self.write_u8(confidence_code(e.confidence));
    }

    fn on_draw_begin(&mut self, e: &DrawBeginEvent) {
        self.write_u8(TAG_DRAW_BEGIN);
        self.write_u64(e.frame_index);
        self.write_u32(e.viewport.width);
        self.write_u32(e.viewport.height);
        self.write_u64(e.timestamp.ticks());
    }

    fn on_draw_end(&mut self, e: &DrawEndEvent) {
        self.write_u8(TAG_DRAW_END);
        self.write_u64(e.frame_index);
        self.write_u8(match e.outcome {
            DrawOutcome::Presented => 0,
            DrawOutcome::BlackFrame => 1,
        });
        self.write_u32(e.framebuffer.0);
        self.write_u64(e.timestamp.ticks());
    }

    fn on_range_switch(&mut self, e: &RangeSwitchEvent) {
        self.write_u8(TAG_RANGE_SWITCH);
        self.write_u8(u8::from(e.hdr));
        self.write_u8(colorspace_code(e.colorspace));
        self.write_u64(e.timestamp.ticks());
    }

    fn on_transplant(&mut self, e: &TransplantEvent) {
        self.write_u8(TAG_TRANSPLANT);
        self.write_u8(match e.direction {
            TransplantDirection::Enter => 0,
            TransplantDirection::Exit => 1,
        });
        self.write_u64(e.timestamp.ticks());
    }
}

/// A decoded trace record.
#[derive(Clone, Copy, Debug)]
pub enum RecordedEvent {
    /// A vsync tick reached the UI thread.
    Tick(TickEvent),
    /// A draw started.
    DrawBegin(DrawBeginEvent),
    /// A draw finished.
    DrawEnd(DrawEndEvent),
    /// A dynamic-range transition ran.
    RangeSwitch(RangeSwitchEvent),
    /// A PiP transplant completed.
    Transplant(TransplantEvent),
}

/// Decodes a recording produced by [`RecorderSink`].
///
/// Iteration ends at the first malformed or truncated record.
#[must_use]
pub fn decode(bytes: &[u8]) -> Decoder<'_> {
    Decoder { bytes, pos: 0 }
}

/// Iterator over the records in a recording.
#[derive(Debug)]
pub struct Decoder<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Decoder<'_> {
    fn read_u8(&mut self) -> Option<u8> {
        let v = *self.bytes.get(self.pos)?;
        self.pos += 1;
        Some(v)
    }

    fn read_u32(&mut self) -> Option<u32> {
        let slice = self.bytes.get(self.pos..self.pos + 4)?;
        self.pos += 4;
        Some(u32::from_le_bytes(slice.try_into().ok()?))
    }

    fn read_u64(&mut self) -> Option<u64> {
        let slice = self.bytes.get(self.pos..self.pos + 8)?;
        self.pos += 8;
        Some(u64::from_le_bytes(slice.try_into().ok()?))
    }

    fn read_option_u64(&mut self) -> Option<Option<u64>> {
        let flag = self.read_u8()?;
        let value = self.read_u64()?;
        Some((flag == 1).then_some(value))
    }
}

impl Iterator for Decoder<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<RecordedEvent> {
        let tag = self.read_u8()?;
        match tag {
            TAG_TICK => {
                let frame_index = self.read_u64()?;
                let now = HostTime(self.read_u64()?);
                let predicted_present = self.read_option_u64()?.map(HostTime);
                let confidence = confidence_from(self.read_u8()?)?;
                Some(RecordedEvent::Tick(TickEvent {
                    frame_index,
                    now,
                    predicted_present,
                    confidence,
                }))
            }
            TAG_DRAW_BEGIN => {
                let frame_index = self.read_u64()?;
                let width = self.read_u32()?;
                let height = self.read_u32()?;
                let timestamp = HostTime(self.read_u64()?);
                Some(RecordedEvent::DrawBegin(DrawBeginEvent {
                    frame_index,
                    viewport: upwell_core::geometry::Viewport { width, height },
                    timestamp,
                }))
            }
            TAG_DRAW_END => {
                let frame_index = self.read_u64()?;
                let outcome = match self.read_u8()? {
                    0 => DrawOutcome::Presented,
                    1 => DrawOutcome::BlackFrame,
                    _ => return None,
                };
                let framebuffer = FramebufferId(self.read_u32()?);
                let timestamp = HostTime(self.read_u64()?);
                Some(RecordedEvent::DrawEnd(DrawEndEvent {
                    frame_index,
                    outcome,
                    framebuffer,
                    timestamp,
                }))
            }
            TAG_RANGE_SWITCH => {
                let hdr = self.read_u8()? == 1;
                let colorspace = colorspace_from(self.read_u8()?)?;
                let timestamp = HostTime(self.read_u64()?);
                Some(RecordedEvent::RangeSwitch(RangeSwitchEvent {
                    hdr,
                    colorspace,
                    timestamp,
                }))
            }
            TAG_TRANSPLANT => {
                let direction = match self.read_u8()? {
                    0 => TransplantDirection::Enter,
                    1 => TransplantDirection::Exit,
                    _ => return None,
                };
                let timestamp = HostTime(self.read_u64()?);
                Some(RecordedEvent::Transplant(TransplantEvent {
                    direction,
                    timestamp,
                }))
            }
            _ => None,
        }
    }
}
