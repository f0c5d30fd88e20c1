// Copyright 2026 the Upwell Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Control overlay for the floating PiP window.
//!
//! The floating window composites a small strip of controls above the video:
//! close, return-to-main, play/pause. The overlay owns no decoder state — it
//! reads pause state through the bridge and forwards intents either back
//! through the bridge (play/pause) or up to the PiP session (both close
//! variants end the floating presentation; the host decides whether playback
//! also stops).

use crate::bridge::DecoderBridge;

/// A control the user activated in the overlay.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OverlayIntent {
    /// Toggle playback.
    PlayPause,
    /// Close the floating window.
    Close,
    /// Return the video to the main window.
    ReturnToMain,
}

/// What the host must do after an intent was dispatched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverlayResponse {
    /// Nothing further; the intent was fully handled at the bridge.
    Handled,
    /// The host should run the PiP session's exit transition.
    ExitPip,
}

/// Routes an overlay intent.
///
/// Play/pause goes straight to the decoder; both close intents bubble up as
/// [`OverlayResponse::ExitPip`] so the session (not the overlay) performs
/// the transplant.
pub fn dispatch(intent: OverlayIntent, bridge: &mut dyn DecoderBridge) -> OverlayResponse {
    match intent {
        OverlayIntent::PlayPause => {
            bridge.toggle_play_pause();
            OverlayResponse::Handled
        }
        OverlayIntent::Close | OverlayIntent::ReturnToMain => OverlayResponse::ExitPip,
    }
}

/// Current glyph the play/pause control should show.
#[must_use]
pub fn play_pause_glyph(bridge: &dyn DecoderBridge) -> PlayPauseGlyph {
    if bridge.paused() {
        PlayPauseGlyph::Play
    } else {
        PlayPauseGlyph::Pause
    }
}

/// Play/pause button appearance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayPauseGlyph {
    /// Stream is paused; the button offers play.
    Play,
    /// Stream is playing; the button offers pause.
    Pause,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::RenderError;
    use crate::color::IccProfile;
    use crate::geometry::FrameTarget;

    #[derive(Default)]
    struct ToggleBridge {
        paused: bool,
        toggles: u32,
    }

    impl DecoderBridge for ToggleBridge {
        fn initialize_rendering(&mut self) -> Result<(), RenderError> {
            Ok(())
        }

        fn render(&mut self, _target: FrameTarget) -> Result<(), RenderError> {
            Ok(())
        }

        fn report_presented(&mut self) {}

        fn frame_pending(&self) -> bool {
            false
        }

        fn paused(&self) -> bool {
            self.paused
        }

        fn toggle_play_pause(&mut self) {
            self.paused = !self.paused;
            self.toggles += 1;
        }

        fn apply_icc_profile(&mut self, _profile: Option<&IccProfile>) {}
    }

    #[test]
    fn play_pause_forwards_to_decoder() {
        let mut bridge = ToggleBridge::default();
        assert_eq!(play_pause_glyph(&bridge), PlayPauseGlyph::Pause);

        let response = dispatch(OverlayIntent::PlayPause, &mut bridge);
        assert_eq!(response, OverlayResponse::Handled);
        assert_eq!(bridge.toggles, 1);
        assert_eq!(play_pause_glyph(&bridge), PlayPauseGlyph::Play);
    }

    #[test]
    fn close_intents_bubble_to_session() {
        let mut bridge = ToggleBridge::default();
        assert_eq!(
            dispatch(OverlayIntent::Close, &mut bridge),
            OverlayResponse::ExitPip
        );
        assert_eq!(
            dispatch(OverlayIntent::ReturnToMain, &mut bridge),
            OverlayResponse::ExitPip
        );
        assert_eq!(bridge.toggles, 0, "close must not touch playback state");
    }
}
