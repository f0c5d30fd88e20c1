// Copyright 2026 the Upwell Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Diagnostics tooling for the upwell frame loop.
//!
//! - [`recorder`] — [`RecorderSink`](recorder::RecorderSink) encodes trace
//!   events into a compact binary buffer; [`decode`](recorder::decode) reads
//!   them back.
//! - [`chrome`] — exports a recording as Chrome Trace Event Format JSON for
//!   `chrome://tracing` / Perfetto.
//! - [`pretty`] — one human-readable line per event, for stderr or a log
//!   file.

pub mod chrome;
pub mod pretty;
pub mod recorder;
