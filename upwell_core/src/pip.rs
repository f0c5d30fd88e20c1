// Copyright 2026 the Upwell Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Picture-in-picture: relocating the live surface between windows.
//!
//! A [`PipSession`] moves the host view (and its live compositor surface)
//! from the main window into a floating always-on-top window and back,
//! without touching the GPU context and without stopping the hardware clock.
//! The session is a plain value owned by the playback controller — created
//! with it, dropped with it — not process-global state, and its phase is an
//! explicit [`PipState`] rather than a set of booleans.
//!
//! The floating window is pooled in a single slot: torn down windows holding
//! live GPU-surface references are a crash magnet under rapid PiP toggling,
//! so exit hides the window and the next entry reuses it. The reuse-or-create
//! decision is the one branch in [`FloatingSlot::acquire`].
//!
//! Window-hierarchy surgery itself happens behind [`WindowHost`]; this module
//! owns only the ordering, the guards, and the put-it-back bookkeeping.

use core::fmt;

use crate::view::HostView;

/// Phase of the PiP state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PipState {
    /// Video lives in the main window.
    Idle,
    /// Mid-move into the floating window.
    TransitioningIn,
    /// Video lives in the floating window.
    InPip,
    /// Mid-move back to the main window.
    TransitioningOut,
}

/// Which window a session record refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WindowKind {
    /// The application's main window.
    Main,
    /// The floating PiP window.
    Pip,
}

/// Record of where the view came from and how to put it back.
///
/// Created on PiP entry, consumed on exit. Never owns the view or the GPU
/// context — `placement` is whatever the [`WindowHost`] needs to restore the
/// original parent and layout (constraints, or a manual frame plus
/// autoresizing for views that never had constraints).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WindowSession<P> {
    /// The window the view returns to.
    pub kind: WindowKind,
    /// Host-defined restore record.
    pub placement: P,
}

/// Errors surfaced by PiP transitions.
///
/// Re-entrant calls are *not* errors — they are timing races and come back
/// as [`PipOutcome::Refused`] with nothing changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipError {
    /// The view is not in any window hierarchy; there is nothing to
    /// transplant. Reported to the user, playback continues untouched.
    ViewNotInWindow,
}

impl fmt::Display for PipError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ViewNotInWindow => write!(f, "video view is not attached to a window"),
        }
    }
}

impl core::error::Error for PipError {}

/// How a transition call resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipOutcome {
    /// The transplant ran to completion.
    Completed,
    /// Guarded no-op: a transition was already in progress, or the session
    /// was not in the right phase (double close, enter-while-entering).
    Refused,
}

/// Window-system surgery the session drives.
///
/// Implementations own the native window objects. The floating window they
/// create is expected to be always-on-top with a fixed aspect ratio; the
/// session never inspects it, only routes the view through it.
pub trait WindowHost {
    /// Identifies a view in the host's hierarchy.
    type ViewId: Copy;
    /// Identifies a window.
    type WindowId: Copy;
    /// Restore record for a view's parent + layout.
    type Placement: Clone + PartialEq + fmt::Debug;

    /// Current placement of `view`, or `None` when the view is not in any
    /// window.
    fn placement_of(&self, view: Self::ViewId) -> Option<Self::Placement>;

    /// Creates the floating PiP window (hidden). Called at most once per
    /// slot lifetime; subsequent entries reuse the pooled window.
    fn create_floating_window(&mut self) -> Self::WindowId;

    /// Shows the floating window.
    fn show_floating(&mut self, window: Self::WindowId);

    /// Hides (never destroys) the floating window.
    fn hide_floating(&mut self, window: Self::WindowId);

    /// Removes `view` from its current parent.
    fn detach_view(&mut self, view: Self::ViewId);

    /// Installs `view` in the floating window, deriving fresh layout
    /// constraints for that container.
    fn attach_to_floating(&mut self, view: Self::ViewId, window: Self::WindowId);

    /// Re-installs `view` according to a recorded placement.
    fn restore_view(&mut self, view: Self::ViewId, placement: &Self::Placement);

    /// Logical size and backing scale of `view` in its current window.
    /// Queried immediately after each attach so geometry is corrected now,
    /// not at the next natural layout pass.
    fn view_metrics(&self, view: Self::ViewId) -> (kurbo::Size, f64);

    /// Asks the window system to redraw `view` promptly.
    fn request_redraw(&mut self, view: Self::ViewId);
}

/// Observer of PiP entry/exit, e.g. to resynchronize external UI state.
pub trait PipListener {
    /// The view finished moving into the floating window.
    fn pip_entered(&mut self) {}

    /// The view is fully restored to its original window.
    fn pip_exited(&mut self) {}
}

/// One-slot pool for the floating window.
#[derive(Clone, Copy, Debug, Default)]
pub struct FloatingSlot<W> {
    window: Option<W>,
}

impl<W: Copy> FloatingSlot<W> {
    /// An empty slot.
    #[must_use]
    pub const fn empty() -> Self {
        Self { window: None }
    }

    /// Returns the pooled window, creating it on first use. This is the
    /// single reuse-or-create branch.
    pub fn acquire(&mut self, create: impl FnOnce() -> W) -> W {
        match self.window {
            Some(window) => window,
            None => {
                let window = create();
                self.window = Some(window);
                window
            }
        }
    }

    /// The pooled window, if one was ever created.
    #[must_use]
    pub fn peek(&self) -> Option<W> {
        self.window
    }
}

/// Session coordinator for one playback screen's PiP lifecycle.
pub struct PipSession<H: WindowHost> {
    state: PipState,
    session: Option<WindowSession<H::Placement>>,
    floating: FloatingSlot<H::WindowId>,
    listeners: Vec<Box<dyn PipListener>>,
}

impl<H: WindowHost> fmt::Debug for PipSession<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipSession")
            .field("state", &self.state)
            .field("has_floating_window", &self.floating.peek().is_some())
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl<H: WindowHost> Default for PipSession<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: WindowHost> PipSession<H> {
    /// Creates an idle session with an empty window slot.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: PipState::Idle,
            session: None,
            floating: FloatingSlot::empty(),
            listeners: Vec::new(),
        }
    }

    /// Current phase.
    #[must_use]
    pub fn state(&self) -> PipState {
        self.state
    }

    /// Whether video is currently presented in the floating window.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == PipState::InPip
    }

    /// Registers an entry/exit observer.
    pub fn add_listener(&mut self, listener: Box<dyn PipListener>) {
        self.listeners.push(listener);
    }

    /// Moves the view into the floating window.
    ///
    /// Refused (no state change, no hierarchy change) unless the session is
    /// [`PipState::Idle`].
    ///
    /// # Errors
    ///
    /// [`PipError::ViewNotInWindow`] when the view is not in any hierarchy;
    /// the session stays idle and playback in the main window is
    /// unaffected.
    pub fn enter<C>(
        &mut self,
        view: &mut HostView<C>,
        view_id: H::ViewId,
        host: &mut H,
    ) -> Result<PipOutcome, PipError> {
        if self.state != PipState::Idle {
            return Ok(PipOutcome::Refused);
        }
        let placement = host.placement_of(view_id).ok_or(PipError::ViewNotInWindow)?;

        self.state = PipState::TransitioningIn;
        self.session = Some(WindowSession {
            kind: WindowKind::Main,
            placement,
        });

        // The detach below must not stop the clock mid-move.
        view.set_transitioning(true);

        let window = self.floating.acquire(|| host.create_floating_window());
        host.detach_view(view_id);
        view.window_detached();
        host.attach_to_floating(view_id, window);
        view.window_attached();
        host.show_floating(window);

        // Correct geometry against the new window immediately; the floating
        // window must never present a frame sized for the old one.
        let (size, scale) = host.view_metrics(view_id);
        view.set_backing_scale(scale);
        view.layout(size);

        view.set_transitioning(false);
        self.state = PipState::InPip;

        view.surface_mut().mark_needs_redraw();
        host.request_redraw(view_id);

        for listener in &mut self.listeners {
            listener.pip_entered();
        }
        Ok(PipOutcome::Completed)
    }

    /// Moves the view back to its recorded parent and placement.
    ///
    /// Refused unless the session is [`PipState::InPip`] — which also
    /// swallows the double invocation that happens when a programmatic
    /// close races the user closing the floating window.
    pub fn exit<C>(
        &mut self,
        view: &mut HostView<C>,
        view_id: H::ViewId,
        host: &mut H,
    ) -> PipOutcome {
        if self.state != PipState::InPip {
            return PipOutcome::Refused;
        }
        let Some(session) = self.session.take() else {
            return PipOutcome::Refused;
        };

        self.state = PipState::TransitioningOut;
        view.set_transitioning(true);

        host.detach_view(view_id);
        view.window_detached();
        host.restore_view(view_id, &session.placement);
        view.window_attached();

        let (size, scale) = host.view_metrics(view_id);
        view.set_backing_scale(scale);
        view.layout(size);

        view.surface_mut().mark_needs_redraw();
        host.request_redraw(view_id);

        view.set_transitioning(false);
        self.state = PipState::Idle;

        // Only now, with the view safely out, park the floating window for
        // reuse.
        if let Some(window) = self.floating.peek() {
            host.hide_floating(window);
        }

        // Listeners may immediately query view state; the view is fully
        // restored at this point.
        for listener in &mut self.listeners {
            listener.pip_exited();
        }
        PipOutcome::Completed
    }

    #[cfg(test)]
    pub(crate) fn force_state_for_test(&mut self, state: PipState) {
        self.state = state;
    }
}
