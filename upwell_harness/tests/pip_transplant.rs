// Copyright 2026 the Upwell Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Picture-in-picture transplants against the fake window hierarchy.

use kurbo::Size;

use upwell_core::events::channel;
use upwell_core::geometry::ColorDepth;
use upwell_core::pip::{PipError, PipListener, PipOutcome, PipSession, PipState, WindowHost};
use upwell_core::surface::CompositorSurface;
use upwell_core::view::HostView;
use upwell_harness::{
    ClockDriver, FakeWindowHost, RecordingDrawTarget, ScriptedDecoder, headless_context,
    scripted_clock,
};

fn rig() -> (HostView<()>, ClockDriver, PipSession<FakeWindowHost>, FakeWindowHost) {
    let (tx, _rx) = channel();
    let (clock, driver) = scripted_clock(tx.clone());

    let decoder = ScriptedDecoder::with_events(tx);
    let mut surface = CompositorSurface::new(headless_context(ColorDepth::Standard8));
    surface.attach_bridge(Box::new(decoder)).expect("attach");

    let mut view = HostView::new(surface, Box::new(clock));
    view.window_attached();
    view.set_backing_scale(2.0);
    view.layout(Size::new(1280.0, 720.0));

    (view, driver, PipSession::new(), FakeWindowHost::new())
}

#[test]
fn immediate_enter_exit_restores_placement_exactly() {
    let (mut view, _driver, mut session, mut host) = rig();
    let original = host.placement_of(()).expect("view starts in main window");

    session.enter(&mut view, (), &mut host).expect("enter");
    // No frames rendered in between.
    session.exit(&mut view, (), &mut host);

    assert_eq!(
        host.placement_of(()).as_ref(),
        Some(&original),
        "placement after exit must equal the pre-PiP record exactly"
    );
    assert_eq!(session.state(), PipState::Idle);
}

#[test]
fn clock_runs_through_every_transition() {
    let (mut view, driver, mut session, mut host) = rig();
    assert!(driver.is_running(), "clock started with the window attach");

    for _ in 0..3 {
        session.enter(&mut view, (), &mut host).expect("enter");
        assert!(
            driver.is_running(),
            "the detach inside a transition must not stop the clock"
        );
        session.exit(&mut view, (), &mut host);
        assert!(driver.is_running(), "clock still running after restore");
    }

    // A plain detach outside any transition does stop it.
    view.window_detached();
    assert!(!driver.is_running());
}

#[test]
fn floating_window_pooled_across_toggles() {
    let (mut view, _driver, mut session, mut host) = rig();

    for _ in 0..5 {
        session.enter(&mut view, (), &mut host).expect("enter");
        session.exit(&mut view, (), &mut host);
    }

    assert_eq!(
        host.floating_windows_created(),
        1,
        "rapid toggling must reuse the floating window, not reallocate it"
    );
    assert!(!host.floating_visible(), "hidden for reuse, not destroyed");
}

#[test]
fn reentrant_enter_is_refused_without_side_effects() {
    let (mut view, _driver, mut session, mut host) = rig();

    session.enter(&mut view, (), &mut host).expect("first enter");
    let log_len = host.log.len();

    let outcome = session.enter(&mut view, (), &mut host).expect("guarded");
    assert_eq!(outcome, PipOutcome::Refused);
    assert_eq!(host.log.len(), log_len, "refused call touches nothing");
    assert_eq!(session.state(), PipState::InPip);
}

#[test]
fn programmatic_and_user_close_race_is_harmless() {
    let (mut view, _driver, mut session, mut host) = rig();
    session.enter(&mut view, (), &mut host).expect("enter");

    // Programmatic close wins; the floating window's close callback loses.
    assert_eq!(session.exit(&mut view, (), &mut host), PipOutcome::Completed);
    assert_eq!(session.exit(&mut view, (), &mut host), PipOutcome::Refused);
    assert_eq!(session.state(), PipState::Idle);
}

#[test]
fn orphaned_view_cannot_enter() {
    let (mut view, _driver, mut session, mut host) = rig();
    host.orphan_view();

    let err = session
        .enter(&mut view, (), &mut host)
        .expect_err("no window to transplant from");
    assert_eq!(err, PipError::ViewNotInWindow);
    assert_eq!(session.state(), PipState::Idle, "session stays idle");
}

#[test]
fn geometry_tracks_each_container() {
    let (mut view, _driver, mut session, mut host) = rig();
    host.set_floating_metrics(Size::new(512.0, 288.0), 1.0);

    session.enter(&mut view, (), &mut host).expect("enter");
    let bounds = view.surface().bounds();
    assert_eq!(bounds.size, Size::new(512.0, 288.0));
    assert_eq!(bounds.scale, 1.0);
    assert!(
        view.surface().needs_redraw(),
        "one explicit redraw so the floating window never shows a stale frame"
    );

    session.exit(&mut view, (), &mut host);
    let bounds = view.surface().bounds();
    assert_eq!(bounds.size, Size::new(1280.0, 720.0));
    assert_eq!(bounds.scale, 2.0);
}

#[test]
fn frames_keep_presenting_inside_pip() {
    let (mut view, _driver, mut session, mut host) = rig();
    session.enter(&mut view, (), &mut host).expect("enter");

    // Draw while in PiP: the same surface, the same GPU context, the new
    // window's draw target.
    let mut target = RecordingDrawTarget::with_framebuffer(4);
    view.surface_mut().draw(&mut target);
    assert_eq!(target.calls, ["bind", "clear", "viewport", "flush"]);
}

#[test]
fn overlay_controls_route_through_bridge_and_session() {
    use upwell_core::overlay::{OverlayIntent, OverlayResponse, dispatch};

    let (tx, _rx) = channel();
    let (clock, _driver) = scripted_clock(tx.clone());
    let decoder = ScriptedDecoder::with_events(tx);
    let probe = decoder.probe();

    let mut surface = CompositorSurface::new(headless_context(ColorDepth::Standard8));
    surface.attach_bridge(Box::new(decoder)).expect("attach");
    let mut view = HostView::new(surface, Box::new(clock));
    view.window_attached();
    view.layout(Size::new(1280.0, 720.0));

    let mut session: PipSession<FakeWindowHost> = PipSession::new();
    let mut host = FakeWindowHost::new();
    session.enter(&mut view, (), &mut host).expect("enter");

    // Play/pause is handled entirely at the bridge.
    let bridge = view.surface_mut().bridge_mut().expect("bridge attached");
    assert_eq!(dispatch(OverlayIntent::PlayPause, bridge), OverlayResponse::Handled);
    assert_eq!(probe.play_pause_toggles(), 1);

    // Close bubbles up; the session performs the transplant.
    let bridge = view.surface_mut().bridge_mut().expect("bridge attached");
    let response = dispatch(OverlayIntent::Close, bridge);
    assert_eq!(response, OverlayResponse::ExitPip);
    assert_eq!(session.exit(&mut view, (), &mut host), PipOutcome::Completed);
    assert_eq!(session.state(), PipState::Idle);
}

#[test]
fn listeners_hear_exit_only_after_restore() {
    struct ParentCheck {
        // Host placement observed at notification time, recorded via a
        // shared cell written by the listener.
        seen: std::rc::Rc<std::cell::RefCell<Vec<&'static str>>>,
    }

    impl PipListener for ParentCheck {
        fn pip_entered(&mut self) {
            self.seen.borrow_mut().push("entered");
        }

        fn pip_exited(&mut self) {
            self.seen.borrow_mut().push("exited");
        }
    }

    let (mut view, _driver, mut session, mut host) = rig();
    let seen = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
    session.add_listener(Box::new(ParentCheck {
        seen: std::rc::Rc::clone(&seen),
    }));

    session.enter(&mut view, (), &mut host).expect("enter");
    session.exit(&mut view, (), &mut host);

    assert_eq!(*seen.borrow(), vec!["entered", "exited"]);
    // By notification time the hierarchy log already ends with the restore
    // sequence and the hide.
    assert_eq!(host.log.last().map(String::as_str), Some("hide-floating"));
}
