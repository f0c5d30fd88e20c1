// Copyright 2026 the Upwell Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cross-thread event handoff into the UI thread.
//!
//! Two kinds of threads produce events the UI thread must act on: the
//! hardware clock's real-time callback (vsync ticks) and the decoder's
//! callback thread (frame-ready, color metadata). Neither may touch view or
//! surface state directly. Instead of dispatching closures at the UI thread
//! from inside each callback, producers push [`CompositorEvent`]s onto a
//! channel and the UI thread drains it on its own schedule.
//!
//! [`EventSender`] is `Send + Sync + Clone` and safe to call from any thread.
//! An optional waker lets a sender poke the host run loop so a drain happens
//! promptly after a push; senders created without one rely on the host
//! polling every tick.

use std::fmt;
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender, TryRecvError, unbounded};

use crate::color::ColorProfile;
use crate::timing::VsyncTick;

/// An event published by the decoder's callback thread.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DecoderEvent {
    /// A new decoded frame is ready; the surface should be redrawn.
    FrameReady,
    /// The stream's color metadata changed.
    ColorChanged(ColorProfile),
}

/// Any event the UI thread drains from the channel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CompositorEvent {
    /// A vsync tick from the hardware clock.
    Tick(VsyncTick),
    /// A decoder callback.
    Decoder(DecoderEvent),
}

/// Creates a connected sender/receiver pair with no waker.
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    let (tx, rx) = unbounded();
    (
        EventSender { tx, waker: None },
        EventReceiver { rx },
    )
}

/// Creates a connected pair whose sender invokes `waker` after every push.
///
/// The waker runs on the *producing* thread and must only poke the host's
/// run loop (post an empty message, signal an event source) — it must not
/// touch view state.
#[must_use]
pub fn channel_with_waker<F>(waker: F) -> (EventSender, EventReceiver)
where
    F: Fn() + Send + Sync + 'static,
{
    let (tx, rx) = unbounded();
    (
        EventSender {
            tx,
            waker: Some(Arc::new(waker)),
        },
        EventReceiver { rx },
    )
}

/// Thread-safe producer handle. Cloning is cheap.
#[derive(Clone)]
pub struct EventSender {
    tx: Sender<CompositorEvent>,
    waker: Option<Arc<dyn Fn() + Send + Sync>>,
}

impl fmt::Debug for EventSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSender")
            .field("has_waker", &self.waker.is_some())
            .finish_non_exhaustive()
    }
}

impl EventSender {
    /// Publishes an event. Safe from any thread; never blocks.
    ///
    /// Events pushed after the receiver is dropped are discarded silently —
    /// a clock or decoder outliving its session must not panic the callback
    /// thread.
    pub fn send(&self, event: CompositorEvent) {
        let _ = self.tx.send(event);
        if let Some(waker) = &self.waker {
            waker();
        }
    }

    /// Publishes a vsync tick.
    pub fn send_tick(&self, tick: VsyncTick) {
        self.send(CompositorEvent::Tick(tick));
    }

    /// Publishes a decoder callback event.
    pub fn send_decoder(&self, event: DecoderEvent) {
        self.send(CompositorEvent::Decoder(event));
    }
}

/// UI-thread consumer handle.
#[derive(Debug)]
pub struct EventReceiver {
    rx: Receiver<CompositorEvent>,
}

impl EventReceiver {
    /// Pops one pending event, if any. Never blocks.
    #[must_use]
    pub fn poll(&self) -> Option<CompositorEvent> {
        match self.rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Drains everything currently queued, in publication order.
    pub fn drain(&self) -> impl Iterator<Item = CompositorEvent> + '_ {
        self.rx.try_iter()
    }
}
