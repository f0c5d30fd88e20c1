// Copyright 2026 the Upwell Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scripted doubles and pacing metrics for exercising the compositor.
//!
//! Everything the core hides behind a trait has a scripted stand-in here:
//!
//! - [`ScriptedDecoder`] — a [`DecoderBridge`] whose frames and color
//!   notifications are injected by the test, with a [`DecoderProbe`] for
//!   inspecting what the compositor did to it.
//! - [`ScriptedClock`] / [`ClockDriver`] — a [`ClockControl`] plus a handle
//!   that fires vsync ticks "from the clock thread".
//! - [`FakeWindowHost`] — an in-memory window hierarchy implementing
//!   [`WindowHost`].
//! - [`ScriptedScreen`] — a mutable [`ScreenInfo`].
//! - [`RecordingDrawTarget`] — a [`DrawTarget`] that records the draw
//!   sequence instead of issuing GPU calls.
//!
//! [`PacingTracker`] grades presentation quality the way a demo HUD would:
//! a rolling window of tick deltas plus black-frame rate, letter-graded with
//! thresholds scaled to the clock's timing confidence.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use kurbo::{Rect, Size};
use parking_lot::Mutex;

use upwell_core::bridge::{DecoderBridge, RenderError};
use upwell_core::color::{ColorProfile, Colorspace, IccProfile};
use upwell_core::context::{GpuContext, NegotiatedFormat};
use upwell_core::events::{DecoderEvent, EventSender};
use upwell_core::geometry::{ColorDepth, FrameTarget, FramebufferId, Viewport};
use upwell_core::pip::WindowHost;
use upwell_core::range::ScreenInfo;
use upwell_core::surface::{DrawOutcome, DrawTarget};
use upwell_core::time::{HostTime, Ticks};
use upwell_core::timing::{DisplayId, TickConfidence, VsyncTick};
use upwell_core::view::ClockControl;

// ---------------------------------------------------------------------------
// Scripted decoder
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct DecoderState {
    initialized: bool,
    pending_frames: u32,
    fail_render: bool,
    paused: bool,
    rendered: Vec<FrameTarget>,
    presented: u32,
    icc_handoffs: Vec<Option<usize>>,
    play_pause_toggles: u32,
}

/// A decoder whose output is scripted by the test.
///
/// Frames are queued through the [`DecoderProbe`] (optionally announcing
/// them on the event channel, as a real decoder's frame-ready callback
/// would); each successful render consumes one.
#[derive(Debug)]
pub struct ScriptedDecoder {
    state: Arc<Mutex<DecoderState>>,
    events: Option<EventSender>,
}

impl Default for ScriptedDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedDecoder {
    /// A decoder with no event channel; frames are queued silently.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(DecoderState::default())),
            events: None,
        }
    }

    /// A decoder that announces frames and color changes on `events`.
    #[must_use]
    pub fn with_events(events: EventSender) -> Self {
        Self {
            state: Arc::new(Mutex::new(DecoderState::default())),
            events: Some(events),
        }
    }

    /// A probe sharing this decoder's state and event channel, usable after
    /// the decoder is boxed into the surface. The probe both inspects what
    /// the compositor did and scripts what the decoder does next.
    #[must_use]
    pub fn probe(&self) -> DecoderProbe {
        DecoderProbe {
            state: Arc::clone(&self.state),
            events: self.events.clone(),
        }
    }
}

impl DecoderBridge for ScriptedDecoder {
    fn initialize_rendering(&mut self) -> Result<(), RenderError> {
        self.state.lock().initialized = true;
        Ok(())
    }

    fn render(&mut self, target: FrameTarget) -> Result<(), RenderError> {
        let mut state = self.state.lock();
        if state.fail_render {
            return Err(RenderError::RenderFailed(-1));
        }
        state.rendered.push(target);
        state.pending_frames = state.pending_frames.saturating_sub(1);
        Ok(())
    }

    fn report_presented(&mut self) {
        self.state.lock().presented += 1;
    }

    fn frame_pending(&self) -> bool {
        self.state.lock().pending_frames > 0
    }

    fn paused(&self) -> bool {
        self.state.lock().paused
    }

    fn toggle_play_pause(&mut self) {
        let mut state = self.state.lock();
        state.paused = !state.paused;
        state.play_pause_toggles += 1;
    }

    fn apply_icc_profile(&mut self, profile: Option<&IccProfile>) {
        self.state
            .lock()
            .icc_handoffs
            .push(profile.map(|p| p.as_bytes().len()));
    }
}

/// Script-and-inspect handle into a [`ScriptedDecoder`].
#[derive(Clone, Debug)]
pub struct DecoderProbe {
    state: Arc<Mutex<DecoderState>>,
    events: Option<EventSender>,
}

impl DecoderProbe {
    /// Queues one decoded frame and announces it, mimicking the decoder's
    /// frame-ready callback thread.
    pub fn produce_frame(&self) {
        self.state.lock().pending_frames += 1;
        if let Some(events) = &self.events {
            events.send_decoder(DecoderEvent::FrameReady);
        }
    }

    /// Announces a color metadata change, mimicking the decoder's
    /// out-of-band callback thread.
    pub fn report_color(&self, profile: ColorProfile) {
        if let Some(events) = &self.events {
            events.send_decoder(DecoderEvent::ColorChanged(profile));
        }
    }

    /// Makes subsequent render calls fail.
    pub fn break_renderer(&self) {
        self.state.lock().fail_render = true;
    }

    /// Whether `initialize_rendering` ran.
    #[must_use]
    pub fn initialized(&self) -> bool {
        self.state.lock().initialized
    }

    /// Every frame target the compositor handed to `render`, in order.
    #[must_use]
    pub fn rendered(&self) -> Vec<FrameTarget> {
        self.state.lock().rendered.clone()
    }

    /// How many presentation reports arrived.
    #[must_use]
    pub fn presented(&self) -> u32 {
        self.state.lock().presented
    }

    /// ICC handoffs, as `Some(byte_len)` / `None` per call.
    #[must_use]
    pub fn icc_handoffs(&self) -> Vec<Option<usize>> {
        self.state.lock().icc_handoffs.clone()
    }

    /// Frames queued but not yet rendered.
    #[must_use]
    pub fn pending_frames(&self) -> u32 {
        self.state.lock().pending_frames
    }

    /// Play/pause toggle count.
    #[must_use]
    pub fn play_pause_toggles(&self) -> u32 {
        self.state.lock().play_pause_toggles
    }
}

// ---------------------------------------------------------------------------
// Scripted clock
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct ClockShared {
    running: AtomicBool,
    frame_index: AtomicU64,
}

/// Creates a scripted clock and its driver.
///
/// The [`ScriptedClock`] half is boxed into the host view as its
/// [`ClockControl`]; the [`ClockDriver`] half stays with the test and fires
/// ticks on `events` while the clock is running — the scripted equivalent of
/// the display link's callback thread.
#[must_use]
pub fn scripted_clock(events: EventSender) -> (ScriptedClock, ClockDriver) {
    let shared = Arc::new(ClockShared {
        running: AtomicBool::new(false),
        frame_index: AtomicU64::new(0),
    });
    (
        ScriptedClock {
            shared: Arc::clone(&shared),
        },
        ClockDriver {
            shared,
            events,
            refresh_interval: Ticks(16_666_667),
        },
    )
}

/// The [`ClockControl`] half of [`scripted_clock`].
#[derive(Debug)]
pub struct ScriptedClock {
    shared: Arc<ClockShared>,
}

impl ClockControl for ScriptedClock {
    fn start(&mut self) {
        self.shared.running.store(true, Ordering::SeqCst);
    }

    fn stop(&mut self) {
        self.shared.running.store(false, Ordering::SeqCst);
    }

    fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }
}

/// The tick-firing half of [`scripted_clock`].
#[derive(Debug)]
pub struct ClockDriver {
    shared: Arc<ClockShared>,
    events: EventSender,
    refresh_interval: Ticks,
}

impl ClockDriver {
    /// Whether the view has the clock running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    /// Fires one vsync tick if the clock is running; returns the tick.
    pub fn fire(&self) -> Option<VsyncTick> {
        if !self.is_running() {
            return None;
        }
        let index = self.shared.frame_index.fetch_add(1, Ordering::SeqCst);
        let now = HostTime(index * self.refresh_interval.get());
        let tick = VsyncTick {
            now,
            predicted_present: Some(now + self.refresh_interval),
            refresh_interval: Some(self.refresh_interval),
            confidence: TickConfidence::Predictive,
            frame_index: index,
            display: DisplayId(0),
        };
        self.events.send_tick(tick);
        Some(tick)
    }
}

// ---------------------------------------------------------------------------
// Fake window hierarchy
// ---------------------------------------------------------------------------

/// Restore record used by [`FakeWindowHost`].
#[derive(Clone, Debug, PartialEq)]
pub struct ViewPlacement {
    /// Window the view lives in.
    pub window: u32,
    /// Frame within that window, in points.
    pub frame: Rect,
    /// Whether the view is constraint-anchored (false = manual frame).
    pub constrained: bool,
}

/// In-memory window hierarchy: one main window, one pooled floating window,
/// one view. Records every surgery call in order for assertions.
#[derive(Debug)]
pub struct FakeWindowHost {
    /// Surgery log, e.g. `"detach"`, `"attach-floating"`.
    pub log: Vec<String>,
    placement: Option<ViewPlacement>,
    floating_window: Option<u32>,
    floating_visible: bool,
    main_metrics: (Size, f64),
    floating_metrics: (Size, f64),
    next_window_id: u32,
}

impl Default for FakeWindowHost {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeWindowHost {
    /// A hierarchy with the view constraint-anchored in the main window.
    #[must_use]
    pub fn new() -> Self {
        Self {
            log: Vec::new(),
            placement: Some(ViewPlacement {
                window: 1,
                frame: Rect::new(0.0, 0.0, 1280.0, 720.0),
                constrained: true,
            }),
            floating_window: None,
            floating_visible: false,
            main_metrics: (Size::new(1280.0, 720.0), 2.0),
            floating_metrics: (Size::new(480.0, 270.0), 2.0),
            next_window_id: 2,
        }
    }

    /// Removes the view from every window (for error-path tests).
    pub fn orphan_view(&mut self) {
        self.placement = None;
    }

    /// Current placement, for restore assertions.
    #[must_use]
    pub fn placement(&self) -> Option<&ViewPlacement> {
        self.placement.as_ref()
    }

    /// How many floating windows were ever created.
    #[must_use]
    pub fn floating_windows_created(&self) -> u32 {
        self.next_window_id - 2
    }

    /// Whether the floating window is on screen.
    #[must_use]
    pub fn floating_visible(&self) -> bool {
        self.floating_visible
    }

    /// Changes the metrics reported for the floating window (e.g. to mimic
    /// the user dragging it to another display).
    pub fn set_floating_metrics(&mut self, size: Size, scale: f64) {
        self.floating_metrics = (size, scale);
    }
}

impl WindowHost for FakeWindowHost {
    type ViewId = ();
    type WindowId = u32;
    type Placement = ViewPlacement;

    fn placement_of(&self, _view: ()) -> Option<ViewPlacement> {
        self.placement.clone()
    }

    fn create_floating_window(&mut self) -> u32 {
        let id = self.next_window_id;
        self.next_window_id += 1;
        self.floating_window = Some(id);
        self.log.push("create-floating".into());
        id
    }

    fn show_floating(&mut self, _window: u32) {
        self.floating_visible = true;
        self.log.push("show-floating".into());
    }

    fn hide_floating(&mut self, _window: u32) {
        self.floating_visible = false;
        self.log.push("hide-floating".into());
    }

    fn detach_view(&mut self, _view: ()) {
        self.placement = None;
        self.log.push("detach".into());
    }

    fn attach_to_floating(&mut self, _view: (), window: u32) {
        let (size, _) = self.floating_metrics;
        self.placement = Some(ViewPlacement {
            window,
            frame: Rect::new(0.0, 0.0, size.width, size.height),
            constrained: true,
        });
        self.log.push("attach-floating".into());
    }

    fn restore_view(&mut self, _view: (), placement: &ViewPlacement) {
        self.placement = Some(placement.clone());
        self.log.push("restore".into());
    }

    fn view_metrics(&self, _view: ()) -> (Size, f64) {
        match &self.placement {
            Some(p) if Some(p.window) == self.floating_window => self.floating_metrics,
            _ => self.main_metrics,
        }
    }

    fn request_redraw(&mut self, _view: ()) {
        self.log.push("redraw".into());
    }
}

// ---------------------------------------------------------------------------
// Scripted screen
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct ScreenState {
    colorspace: Option<Colorspace>,
    icc: Option<IccProfile>,
    scale: f64,
}

/// A [`ScreenInfo`] whose answers the test can change mid-run.
#[derive(Clone, Debug)]
pub struct ScriptedScreen {
    state: Arc<Mutex<ScreenState>>,
}

impl Default for ScriptedScreen {
    fn default() -> Self {
        Self::new(Some(Colorspace::Srgb), None, 2.0)
    }
}

impl ScriptedScreen {
    /// A screen with the given answers.
    #[must_use]
    pub fn new(colorspace: Option<Colorspace>, icc: Option<IccProfile>, scale: f64) -> Self {
        Self {
            state: Arc::new(Mutex::new(ScreenState {
                colorspace,
                icc,
                scale,
            })),
        }
    }

    /// Replaces the reported colorspace.
    pub fn set_colorspace(&self, colorspace: Option<Colorspace>) {
        self.state.lock().colorspace = colorspace;
    }

    /// Replaces the reported ICC profile.
    pub fn set_icc(&self, icc: Option<IccProfile>) {
        self.state.lock().icc = icc;
    }

    /// Replaces the reported backing scale.
    pub fn set_backing_scale(&self, scale: f64) {
        self.state.lock().scale = scale;
    }
}

impl ScreenInfo for ScriptedScreen {
    fn colorspace(&self) -> Option<Colorspace> {
        self.state.lock().colorspace
    }

    fn icc_profile(&self) -> Option<IccProfile> {
        self.state.lock().icc.clone()
    }

    fn backing_scale(&self) -> f64 {
        self.state.lock().scale
    }
}

// ---------------------------------------------------------------------------
// Recording draw target
// ---------------------------------------------------------------------------

/// A [`DrawTarget`] that records the draw sequence instead of touching a GPU.
#[derive(Debug, Default)]
pub struct RecordingDrawTarget {
    /// Call sequence: `"bind"`, `"clear"`, `"viewport"`, `"flush"`.
    pub calls: Vec<&'static str>,
    /// Last viewport applied.
    pub viewport: Option<Viewport>,
    /// Framebuffer id this target reports as bound.
    pub framebuffer: u32,
}

impl RecordingDrawTarget {
    /// A target reporting `framebuffer` as the bound draw FBO.
    #[must_use]
    pub fn with_framebuffer(framebuffer: u32) -> Self {
        Self {
            framebuffer,
            ..Self::default()
        }
    }
}

impl DrawTarget for RecordingDrawTarget {
    fn bind_current(&mut self) {
        self.calls.push("bind");
    }

    fn clear_black(&mut self) {
        self.calls.push("clear");
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);
        self.calls.push("viewport");
    }

    fn bound_framebuffer(&self) -> FramebufferId {
        FramebufferId(self.framebuffer)
    }

    fn flush(&mut self) {
        self.calls.push("flush");
    }
}

// ---------------------------------------------------------------------------
// Context shorthand
// ---------------------------------------------------------------------------

/// A session context with no native handle, for driving the compositor
/// without a GPU.
#[must_use]
pub fn headless_context(depth: ColorDepth) -> Arc<GpuContext<()>> {
    Arc::new(GpuContext::new(
        (),
        NegotiatedFormat {
            depth,
            float_color: depth == ColorDepth::Extended16,
            double_buffered: true,
            accelerated: false,
        },
    ))
}

// ---------------------------------------------------------------------------
// Pacing metrics
// ---------------------------------------------------------------------------

/// Per-tick observation fed to [`PacingTracker::observe`].
#[derive(Clone, Copy, Debug)]
pub struct PacingSample {
    /// Timing confidence of the driving clock.
    pub confidence: TickConfidence,
    /// What the tick produced, or `None` when `can_draw` said skip.
    pub outcome: Option<DrawOutcome>,
    /// Delta to the previous tick in milliseconds.
    pub tick_delta_ms: f64,
}

/// Letter grade for presentation quality.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PacingGrade {
    /// Smooth cadence, essentially no black frames.
    A,
    /// Minor cadence wobble or occasional black frame.
    B,
    /// Visibly degraded.
    C,
    /// Broken presentation.
    D,
}

impl PacingGrade {
    /// Short label for HUD rendering.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }
}

/// Aggregated report returned by [`PacingTracker::observe`].
#[derive(Clone, Copy, Debug)]
pub struct PacingReport {
    /// Current grade.
    pub grade: PacingGrade,
    /// Black frames per 1000 ticks.
    pub black_rate_per_1000: f64,
    /// Ticks observed.
    pub total_ticks: u64,
    /// Frames actually presented.
    pub presented: u64,
    /// Black frames shown.
    pub black_frames: u64,
}

/// Rolling presentation-quality tracker with fixed-size tick-delta history.
#[derive(Debug)]
pub struct PacingTracker<const N: usize> {
    deltas_ms: [f64; N],
    cursor: usize,
    total_ticks: u64,
    presented: u64,
    black_frames: u64,
}

impl<const N: usize> Default for PacingTracker<N> {
    fn default() -> Self {
        Self::new(16.67)
    }
}

impl<const N: usize> PacingTracker<N> {
    /// Creates a tracker with `seed_delta_ms` prefilled in the history.
    #[must_use]
    pub const fn new(seed_delta_ms: f64) -> Self {
        Self {
            deltas_ms: [seed_delta_ms; N],
            cursor: 0,
            total_ticks: 0,
            presented: 0,
            black_frames: 0,
        }
    }

    /// Observes one tick and returns an updated report.
    #[must_use]
    pub fn observe(&mut self, sample: PacingSample) -> PacingReport {
        self.total_ticks = self.total_ticks.saturating_add(1);
        self.deltas_ms[self.cursor % N] = sample.tick_delta_ms;
        self.cursor = (self.cursor + 1) % N;

        match sample.outcome {
            Some(DrawOutcome::Presented) => self.presented += 1,
            Some(DrawOutcome::BlackFrame) => self.black_frames += 1,
            None => {}
        }

        let black_rate = self.black_frames as f64 * 1000.0 / self.total_ticks as f64;
        let jitter = self.delta_jitter_ms();
        let grade = grade_for(sample.confidence, jitter, black_rate);

        PacingReport {
            grade,
            black_rate_per_1000: black_rate,
            total_ticks: self.total_ticks,
            presented: self.presented,
            black_frames: self.black_frames,
        }
    }

    /// Peak-to-peak spread of the delta history, in milliseconds.
    #[must_use]
    pub fn delta_jitter_ms(&self) -> f64 {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &d in &self.deltas_ms {
            min = min.min(d);
            max = max.max(d);
        }
        (max - min).max(0.0)
    }
}

fn grade_for(confidence: TickConfidence, jitter_ms: f64, black_rate_per_1000: f64) -> PacingGrade {
    // Looser thresholds for clocks that cannot promise present times.
    let (a_jitter, b_jitter, c_jitter, a_black, b_black, c_black) = match confidence {
        TickConfidence::Predictive => (2.0, 6.0, 12.0, 1.0, 10.0, 50.0),
        TickConfidence::Estimated => (4.0, 9.0, 18.0, 3.0, 20.0, 80.0),
        TickConfidence::PacingOnly => (8.0, 16.0, 33.0, 10.0, 50.0, 150.0),
    };

    if jitter_ms < a_jitter && black_rate_per_1000 < a_black {
        PacingGrade::A
    } else if jitter_ms < b_jitter && black_rate_per_1000 < b_black {
        PacingGrade::B
    } else if jitter_ms < c_jitter && black_rate_per_1000 < c_black {
        PacingGrade::C
    } else {
        PacingGrade::D
    }
}
