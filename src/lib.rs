// SPDX-License-Identifier: GPL-3.0-only

//! Keyboard positioner - Places a virtual keyboard overlay next to the focused field
//!
//! This crate keeps a virtual keyboard from covering the text field being
//! edited. When a field gains focus the keyboard slides into a resting position
//! near the vertical center of the window, and the window content is scrolled
//! up just enough for the field to stay visible above it.
//!
//! # Architecture
//!
//! The crate consists of three layers:
//!
//! 1. **Scene** (`scene`): Non-owning handles to windows and items, plus the
//!    [`Scene`](scene::Scene) trait the host implements to read and move them.
//!
//! 2. **Positioner** (`positioner`): The single-threaded state machine that
//!    computes the scroll offset, parks or raises the keyboard and runs the
//!    slide animation.
//!
//! 3. **Driver** (`driver`): A tokio event loop that feeds host commands to the
//!    positioner over a channel and wakes it for deferred work and frames.
//!
//! # Modules
//!
//! - `app_settings`: Centralized constants
//! - `clock`: Time source used by the positioner
//! - `config`: Positioner configuration loaded from JSON
//! - `driver`: Channel driven event loop
//! - `positioner`: Positioning state machine, animation and center bias
//! - `scene`: Scene handles, the `Scene` trait and an in-memory scene
//! - `settings`: Persistent user keyboard settings
//! - `state`: Transient positioner state

pub mod app_settings;
pub mod clock;
pub mod config;
pub mod driver;
pub mod positioner;
pub mod scene;
pub mod settings;
pub mod state;

// ============================================================================
// Integration Tests
// ============================================================================

#[cfg(test)]
mod integration_tests {
    use crate::clock::ManualClock;
    use crate::config::PositionerConfig;
    use crate::driver::{self, PositionerCommand, PositionerDriver};
    use crate::positioner::Positioner;
    use crate::scene::{FocusTarget, ItemId, MemoryScene, SurfaceId};
    use futures::SinkExt;
    use std::time::Duration;

    const SURFACE: SurfaceId = SurfaceId(1);
    const KEYBOARD: ItemId = ItemId(100);
    const FIELD: ItemId = ItemId(10);

    fn create_scene() -> MemoryScene {
        let mut scene = MemoryScene::new().with_screen_dpi(Some(96.0));
        scene.add_surface(SURFACE, 800.0);
        scene.add_item(FIELD, SURFACE, 700.0, 50.0);
        scene.add_keyboard(KEYBOARD, 300.0, Some(0.0));
        scene
    }

    /// Integration Test 1: Configuration file drives the positioner
    ///
    /// A configuration that disables content scrolling leaves the window in
    /// place and rests the keyboard at its centered position.
    #[test]
    fn test_config_file_disables_scrolling() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("positioner.json");
        std::fs::write(&path, r#"{ "scroll_content": false, "animated": false }"#).unwrap();

        let config = PositionerConfig::load_or_default(&path);
        let mut positioner = Positioner::with_clock(create_scene(), ManualClock::new(), config);
        positioner.attach(KEYBOARD);
        positioner.on_focus_changed(Some(FocusTarget::new(FIELD, SURFACE)));
        positioner.show();
        positioner.poll();

        assert!(positioner.is_shown());
        assert_eq!(positioner.offset(), 0.0);
        assert_eq!(positioner.scene().surface(SURFACE).unwrap().y, 0.0);
        assert_eq!(positioner.scene().keyboard(KEYBOARD).unwrap().y, 250.0);
    }

    /// Integration Test 2: Focus margin from a configuration file
    ///
    /// A larger margin loaded from disk pushes the content further up and parks
    /// the hidden keyboard correspondingly lower.
    #[test]
    fn test_config_focus_margin_moves_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("positioner.json");
        std::fs::write(&path, r#"{ "focus_margin": 20.0, "animated": false }"#).unwrap();

        let config = PositionerConfig::load(&path).unwrap();
        let mut positioner = Positioner::with_clock(create_scene(), ManualClock::new(), config);
        positioner.attach(KEYBOARD);
        positioner.on_focus_changed(Some(FocusTarget::new(FIELD, SURFACE)));
        positioner.show();
        positioner.poll();

        // Field bottom 750 + margin 20 - keyboard top 250
        assert_eq!(positioner.offset(), 520.0);
        assert_eq!(positioner.scene().surface(SURFACE).unwrap().y, -520.0);
        assert_eq!(positioner.scene().keyboard(KEYBOARD).unwrap().y, 770.0);

        positioner.hide();
        assert_eq!(positioner.scene().keyboard(KEYBOARD).unwrap().y, 1320.0);
        assert_eq!(positioner.scene().surface(SURFACE).unwrap().y, 0.0);
    }

    /// Integration Test 3: Full show/hide workflow over the command channel
    ///
    /// Commands sent by the host are applied in order; hiding parks the
    /// keyboard below the window and resets the scroll.
    #[tokio::test]
    async fn test_show_hide_over_channel() {
        let (mut tx, rx) = driver::channel();
        let positioner = Positioner::new(
            create_scene(),
            PositionerConfig {
                animated: false,
                ..Default::default()
            },
        );
        let handle = tokio::spawn(PositionerDriver::new(positioner, rx).run());

        tx.send(PositionerCommand::Attach(KEYBOARD)).await.unwrap();
        tx.send(PositionerCommand::FocusChanged(Some(FocusTarget::new(FIELD, SURFACE))))
            .await
            .unwrap();
        tx.send(PositionerCommand::Show).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        tx.send(PositionerCommand::Hide).await.unwrap();
        tx.send(PositionerCommand::Quit).await.unwrap();

        let positioner = handle.await.unwrap();
        assert!(!positioner.is_shown());
        assert_eq!(positioner.offset(), 505.0);
        assert_eq!(positioner.scene().keyboard(KEYBOARD).unwrap().y, 1305.0);
        assert_eq!(positioner.scene().surface(SURFACE).unwrap().y, 0.0);
    }
}
