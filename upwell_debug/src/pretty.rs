// Copyright 2026 the Upwell Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per
//! event to a [`Write`](std::io::Write) destination. Timestamps are
//! converted to microseconds with a [`Timebase`].

use std::io::Write;

use upwell_core::surface::DrawOutcome;
use upwell_core::time::Timebase;
use upwell_core::trace::{
    DrawBeginEvent, DrawEndEvent, RangeSwitchEvent, TickEvent, TraceSink, TransplantDirection,
    TransplantEvent,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write)
/// destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    timebase: Timebase,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("timebase", &self.timebase)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr(timebase: Timebase) -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
            timebase,
        }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W, timebase: Timebase) -> Self {
        Self { writer, timebase }
    }

    fn us(&self, ticks: u64) -> f64 {
        self.timebase.ticks_to_nanos(ticks) as f64 / 1000.0
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_tick(&mut self, e: &TickEvent) {
        let _ = writeln!(
            self.writer,
            "[tick] frame={} now={:.1}µs confidence={:?}",
            e.frame_index,
            self.us(e.now.ticks()),
            e.confidence,
        );
    }

    fn on_draw_begin(&mut self, e: &DrawBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[draw:begin] frame={} viewport={}x{} at {:.1}µs",
            e.frame_index,
            e.viewport.width,
            e.viewport.height,
            self.us(e.timestamp.ticks()),
        );
    }

    fn on_draw_end(&mut self, e: &DrawEndEvent) {
        let outcome = match e.outcome {
            DrawOutcome::Presented => "presented",
            DrawOutcome::BlackFrame => "BLACK",
        };
        let _ = writeln!(
            self.writer,
            "[draw:end] frame={} fbo={} {outcome} at {:.1}µs",
            e.frame_index,
            e.framebuffer.0,
            self.us(e.timestamp.ticks()),
        );
    }

    fn on_range_switch(&mut self, e: &RangeSwitchEvent) {
        let colorspace = e
            .colorspace
            .map_or_else(|| "(unchanged)".to_owned(), |c| c.to_string());
        let _ = writeln!(
            self.writer,
            "[range] hdr={} colorspace={colorspace}",
            e.hdr,
        );
    }

    fn on_transplant(&mut self, e: &TransplantEvent) {
        let direction = match e.direction {
            TransplantDirection::Enter => "enter-pip",
            TransplantDirection::Exit => "exit-pip",
        };
        let _ = writeln!(
            self.writer,
            "[pip] {direction} at {:.1}µs",
            self.us(e.timestamp.ticks()),
        );
    }
}
