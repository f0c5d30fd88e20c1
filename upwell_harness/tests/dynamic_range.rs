// Copyright 2026 the Upwell Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dynamic-range transitions driven through the event channel.

use kurbo::Size;

use upwell_core::color::{ColorProfile, Colorspace, IccProfile};
use upwell_core::events::{EventReceiver, channel};
use upwell_core::geometry::ColorDepth;
use upwell_core::range::{DynamicRangeManager, RangeState};
use upwell_core::surface::CompositorSurface;
use upwell_core::view::HostView;
use upwell_harness::{DecoderProbe, ScriptedDecoder, ScriptedScreen, headless_context, scripted_clock};

fn rig() -> (HostView<()>, EventReceiver, DecoderProbe) {
    let (tx, rx) = channel();
    let (clock, _driver) = scripted_clock(tx.clone());

    let decoder = ScriptedDecoder::with_events(tx);
    let probe = decoder.probe();
    let mut surface = CompositorSurface::new(headless_context(ColorDepth::Extended16));
    surface.attach_bridge(Box::new(decoder)).expect("attach");

    let mut view = HostView::new(surface, Box::new(clock));
    view.window_attached();
    view.layout(Size::new(1280.0, 720.0));
    (view, rx, probe)
}

fn drain(
    rx: &EventReceiver,
    view: &mut HostView<()>,
    screen: &ScriptedScreen,
    range: &mut DynamicRangeManager,
) {
    for event in rx.drain() {
        view.handle_event(event, screen, range);
    }
}

#[test]
fn hdr_stream_switches_to_wide_gamut_then_reverts() {
    let (mut view, rx, probe) = rig();
    let screen = ScriptedScreen::new(Some(Colorspace::DisplayP3), None, 2.0);
    let mut range = DynamicRangeManager::new();

    // Stream reports {hdr, primaries: bt.2020, transfer: pq}.
    probe.report_color(ColorProfile::from_tags(true, "pq", "bt.2020"));
    drain(&rx, &mut view, &screen, &mut range);

    assert_eq!(range.state(), RangeState::Hdr);
    let color = view.surface().color_state();
    assert!(color.extended_range);
    assert_eq!(color.colorspace, Some(Colorspace::Bt2020Pq));
    assert!(!color.icc_managed, "decoder owns color accuracy in HDR");

    // Stream drops back to SDR.
    probe.report_color(ColorProfile::from_tags(false, "bt.1886", "bt.709"));
    drain(&rx, &mut view, &screen, &mut range);

    assert_eq!(range.state(), RangeState::Sdr);
    let color = view.surface().color_state();
    assert!(!color.extended_range);
    assert_eq!(
        color.colorspace,
        Some(Colorspace::DisplayP3),
        "SDR reverts to the hosting screen's colorspace"
    );
}

#[test]
fn repeated_identical_metadata_is_idempotent() {
    let screen = ScriptedScreen::new(Some(Colorspace::Srgb), None, 2.0);

    let (mut cycled_view, rx, probe) = rig();
    let mut range = DynamicRangeManager::new();
    probe.report_color(ColorProfile::from_tags(true, "pq", "bt.2020"));
    probe.report_color(ColorProfile::from_tags(false, "bt.1886", "bt.709"));
    probe.report_color(ColorProfile::from_tags(true, "pq", "bt.2020"));
    drain(&rx, &mut cycled_view, &screen, &mut range);

    let (mut single_view, rx, probe) = rig();
    let mut range_single = DynamicRangeManager::new();
    probe.report_color(ColorProfile::from_tags(true, "pq", "bt.2020"));
    drain(&rx, &mut single_view, &screen, &mut range_single);

    assert_eq!(
        cycled_view.surface().color_state(),
        single_view.surface().color_state(),
        "HDR→SDR→HDR with identical metadata equals a single HDR entry"
    );
    assert_eq!(range.state(), range_single.state());
}

#[test]
fn unknown_hdr_primaries_keep_previous_colorspace() {
    let (mut view, rx, probe) = rig();
    let screen = ScriptedScreen::default();
    let mut range = DynamicRangeManager::new();

    probe.report_color(ColorProfile::from_tags(true, "pq", "bt.2020"));
    drain(&rx, &mut view, &screen, &mut range);
    assert_eq!(
        view.surface().color_state().colorspace,
        Some(Colorspace::Bt2020Pq)
    );

    // A tag this build does not know. Extended range still switches; the
    // colorspace is left alone.
    probe.report_color(ColorProfile::from_tags(true, "pq", "film-c"));
    drain(&rx, &mut view, &screen, &mut range);

    let color = view.surface().color_state();
    assert!(color.extended_range);
    assert_eq!(color.colorspace, Some(Colorspace::Bt2020Pq));
}

#[test]
fn sdr_hands_the_screen_profile_to_the_decoder() {
    let (mut view, rx, probe) = rig();
    let screen = ScriptedScreen::new(
        Some(Colorspace::Srgb),
        Some(IccProfile::new(vec![0x42; 548])),
        2.0,
    );
    let mut range = DynamicRangeManager::new();

    probe.report_color(ColorProfile::from_tags(false, "bt.1886", "bt.709"));
    drain(&rx, &mut view, &screen, &mut range);
    assert_eq!(probe.icc_handoffs(), vec![Some(548)]);

    probe.report_color(ColorProfile::from_tags(true, "pq", "bt.2020"));
    drain(&rx, &mut view, &screen, &mut range);
    assert_eq!(
        probe.icc_handoffs(),
        vec![Some(548), None],
        "HDR entry clears the decoder-side profile"
    );
}
