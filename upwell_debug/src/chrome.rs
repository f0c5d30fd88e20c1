// Copyright 2026 the Upwell Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a
//! [`RecorderSink`](super::recorder::RecorderSink) and writes Chrome Trace
//! Event Format JSON to the given writer, loadable in `chrome://tracing` or
//! [Perfetto](https://ui.perfetto.dev/). Draw begin/end pairs become
//! duration slices; everything else becomes instant events.

use std::io::{self, Write};

use serde_json::{Value, json};

use upwell_core::time::Timebase;

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// Timestamps are converted to microseconds using `timebase`.
///
/// # Errors
///
/// Propagates write failures from `writer`.
pub fn export(bytes: &[u8], timebase: Timebase, writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::Tick(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "VsyncTick",
                    "cat": "Clock",
                    "ts": ticks_to_us(e.now.ticks(), timebase),
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "frame_index": e.frame_index,
                        "confidence": format!("{:?}", e.confidence),
                    }
                }));
            }
            RecordedEvent::DrawBegin(e) => {
                events.push(json!({
                    "ph": "B",
                    "name": "Draw",
                    "cat": "Frame",
                    "ts": ticks_to_us(e.timestamp.ticks(), timebase),
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "frame_index": e.frame_index,
                        "viewport": format!("{}x{}", e.viewport.width, e.viewport.height),
                    }
                }));
            }
            RecordedEvent::DrawEnd(e) => {
                events.push(json!({
                    "ph": "E",
                    "name": "Draw",
                    "cat": "Frame",
                    "ts": ticks_to_us(e.timestamp.ticks(), timebase),
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "frame_index": e.frame_index,
                        "outcome": format!("{:?}", e.outcome),
                        "framebuffer": e.framebuffer.0,
                    }
                }));
            }
            RecordedEvent::RangeSwitch(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "RangeSwitch",
                    "cat": "Color",
                    "ts": ticks_to_us(e.timestamp.ticks(), timebase),
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "hdr": e.hdr,
                        "colorspace": e.colorspace.map(|c| c.to_string()),
                    }
                }));
            }
            RecordedEvent::Transplant(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Transplant",
                    "cat": "Pip",
                    "ts": ticks_to_us(e.timestamp.ticks(), timebase),
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "direction": format!("{:?}", e.direction),
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn ticks_to_us(ticks: u64, timebase: Timebase) -> f64 {
    timebase.ticks_to_nanos(ticks) as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use upwell_core::geometry::{FramebufferId, Viewport};
    use upwell_core::surface::DrawOutcome;
    use upwell_core::time::HostTime;
    use upwell_core::timing::TickConfidence;
    use upwell_core::trace::{DrawBeginEvent, DrawEndEvent, TickEvent, TraceSink};

    #[test]
    fn export_produces_valid_json() {
        let mut rec = RecorderSink::new();
        rec.on_tick(&TickEvent {
            frame_index: 0,
            now: HostTime(1_000_000),
            predicted_present: None,
            confidence: TickConfidence::Predictive,
        });
        rec.on_draw_begin(&DrawBeginEvent {
            frame_index: 0,
            viewport: Viewport {
                width: 1280,
                height: 720,
            },
            timestamp: HostTime(1_000_100),
        });
        rec.on_draw_end(&DrawEndEvent {
            frame_index: 0,
            outcome: DrawOutcome::Presented,
            framebuffer: FramebufferId(0),
            timestamp: HostTime(1_004_000),
        });

        let mut out = Vec::new();
        export(rec.as_bytes(), Timebase::NANOS, &mut out).expect("export succeeds");
        let parsed: Vec<Value> =
            serde_json::from_slice(&out).expect("output must be a JSON array");
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0]["ph"], "i");
        assert_eq!(parsed[0]["name"], "VsyncTick");
        assert_eq!(parsed[1]["ph"], "B");
        assert_eq!(parsed[2]["ph"], "E");
        assert_eq!(parsed[2]["args"]["outcome"], "Presented");
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], Timebase::NANOS, &mut out).expect("export succeeds");
        let parsed: Vec<Value> = serde_json::from_slice(&out).expect("valid JSON");
        assert!(parsed.is_empty());
    }
}
