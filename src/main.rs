// SPDX-License-Identifier: GPL-3.0-only

//! Keyboard positioner demo
//!
//! Runs the positioner against an in-memory scene: a form with a field near
//! the bottom of an 800px window. The keyboard is shown for that field, moved
//! to a second window and hidden again. Run with
//! `RUST_LOG=keyboard_positioner=debug` to follow every transition.
//!
//! An optional first argument points to a JSON positioner configuration.

use std::time::Duration;

use futures::SinkExt;
use keyboard_positioner::app_settings::APP_ID;
use keyboard_positioner::config::PositionerConfig;
use keyboard_positioner::driver::{self, PositionerCommand, PositionerDriver};
use keyboard_positioner::positioner::Positioner;
use keyboard_positioner::scene::{ApplicationState, FocusTarget, ItemId, MemoryScene, SurfaceId};
use keyboard_positioner::settings::KeyboardSettings;

const FORM: SurfaceId = SurfaceId(1);
const DIALOG: SurfaceId = SurfaceId(2);
const KEYBOARD: ItemId = ItemId(1);
const NAME_FIELD: ItemId = ItemId(10);
const SEARCH_FIELD: ItemId = ItemId(20);

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("keyboard_positioner=info")),
        )
        .init();

    let config = std::env::args()
        .nth(1)
        .map(PositionerConfig::load_or_default)
        .unwrap_or_default();

    let settings_root = std::env::temp_dir().join(APP_ID);
    match KeyboardSettings::open(&settings_root) {
        Ok(settings) => tracing::info!(
            "Language layout index {} ({})",
            settings.current_language_index(),
            settings.path().display()
        ),
        Err(err) => tracing::warn!("Keyboard settings unavailable, using defaults: {}", err),
    }

    let mut scene = MemoryScene::new().with_screen_dpi(Some(96.0));
    scene.set_application_state(ApplicationState::Active);
    scene.add_surface(FORM, 800.0);
    scene.add_surface(DIALOG, 600.0);
    scene.add_item(NAME_FIELD, FORM, 700.0, 40.0);
    scene.add_item(SEARCH_FIELD, DIALOG, 40.0, 40.0);
    scene.add_keyboard(KEYBOARD, 300.0, Some(100.0));

    let (mut tx, rx) = driver::channel();
    let positioner = Positioner::new(scene, config);
    tracing::debug!("Positioner configuration: {:?}", positioner.config());
    let handle = tokio::spawn(PositionerDriver::new(positioner, rx).run());

    let settle = Duration::from_millis(400);
    tx.send(PositionerCommand::Attach(KEYBOARD)).await?;
    tx.send(PositionerCommand::FocusChanged(Some(FocusTarget::new(NAME_FIELD, FORM))))
        .await?;
    tx.send(PositionerCommand::Show).await?;
    tokio::time::sleep(settle).await;

    tx.send(PositionerCommand::FocusChanged(Some(FocusTarget::new(SEARCH_FIELD, DIALOG))))
        .await?;
    tx.send(PositionerCommand::Show).await?;
    tokio::time::sleep(settle).await;

    tx.send(PositionerCommand::Hide).await?;
    tokio::time::sleep(settle).await;
    tx.send(PositionerCommand::Quit).await?;

    let positioner = handle.await?;
    if let (Some(keyboard), Some(surface)) = (
        positioner.scene().keyboard(KEYBOARD),
        positioner.surface().and_then(|id| positioner.scene().surface(id)),
    ) {
        tracing::info!(
            "Final state: shown={} offset={} keyboard y={} surface y={}",
            positioner.is_shown(),
            positioner.offset(),
            keyboard.y,
            surface.y
        );
    }

    Ok(())
}
