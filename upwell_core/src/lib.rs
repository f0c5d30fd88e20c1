// Copyright 2026 the Upwell Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core state machines and contracts for vsync-synchronized video
//! presentation.
//!
//! `upwell_core` is the platform-neutral heart of an embedded video
//! compositor: it takes decoded frames produced by an external,
//! independently threaded decoder and gets them on screen on time, in the
//! right colorspace, and relocatable into a floating picture-in-picture
//! window — without ever owning the decoder, the window system, or the
//! native GPU API. Those live behind traits that backend crates implement.
//!
//! # Frame loop
//!
//! ```text
//!   clock backend (vsync thread)      decoder (callback thread)
//!         │                                  │
//!         ▼                                  ▼
//!   EventSender::send_tick()        EventSender::send_decoder()
//!         └───────────────┬────────────────┘
//!                         ▼
//!            EventReceiver::drain()            (UI thread)
//!                         │
//!                         ▼
//!            HostView::handle_event() ──► surface marked for redraw
//!                         │
//!        window system asks: CompositorSurface::can_draw()
//!                         │
//!                         ▼
//!            CompositorSurface::draw(&mut dyn DrawTarget)
//!              lock GPU gate → bind tick's target → clear →
//!              viewport from live bounds → FrameTarget →
//!              DecoderBridge::render() → flush → report_presented
//! ```
//!
//! **[`context`]** — One [`GpuContext`](context::GpuContext) per playback
//! session: pixel-format negotiation (extended precision with 8-bit
//! fallback) and the system-wide GPU lock.
//!
//! **[`surface`]** — The draw decision and the draw itself, degrading to a
//! black frame when no decoder is attached.
//!
//! **[`bridge`]** — The narrow contract with the external decoder.
//!
//! **[`range`]** — SDR/HDR state machine driven by decoder color metadata.
//!
//! **[`view`]** — Geometry truthfulness and clock lifecycle for the hosting
//! view.
//!
//! **[`pip`]** — The [`PipSession`](pip::PipSession) state machine that
//! transplants the live surface between windows.
//!
//! **[`events`]** — The channel that marshals clock and decoder callbacks
//! onto the UI thread.
//!
//! **[`overlay`]** — Control intents for the floating window's overlay.
//!
//! **[`time`]**, **[`timing`]**, **[`geometry`]**, **[`color`]** — The value
//! types the above trade in.
//!
//! **[`trace`]** — Frame-loop instrumentation behind the `trace` feature.
//!
//! # Threading
//!
//! Three execution contexts touch this crate: the clock's real-time thread
//! and the decoder's callback thread only ever push into
//! [`events::EventSender`]; everything else belongs to the UI thread. The
//! one cross-thread resource is the GPU context, gated by
//! [`context::GpuContext::lock`].
//!
//! # Crate features
//!
//! - `trace` (disabled by default): enables [`trace::Tracer`] method bodies.

pub mod bridge;
pub mod color;
pub mod context;
pub mod events;
pub mod geometry;
pub mod overlay;
pub mod pip;
pub mod range;
pub mod surface;
pub mod time;
pub mod timing;
pub mod trace;
pub mod view;
