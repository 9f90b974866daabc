// SPDX-License-Identifier: GPL-3.0-only

//! Single-threaded event loop hosting a [`Positioner`].
//!
//! The host (input method glue, window system callbacks) sends
//! [`PositionerCommand`]s over a channel. The driver applies them in order,
//! pumps deferred tasks once everything already queued has been applied, and
//! emits animation frames while a slide is running.
//!
//! ```rust,ignore
//! let (tx, rx) = driver::channel();
//! let positioner = Positioner::new(scene, PositionerConfig::default());
//! let handle = tokio::spawn(PositionerDriver::new(positioner, rx).run());
//!
//! tx.send(PositionerCommand::Attach(keyboard)).await?;
//! tx.send(PositionerCommand::FocusChanged(Some(target))).await?;
//! tx.send(PositionerCommand::Show).await?;
//! ```

use std::ops::ControlFlow;

use futures::{FutureExt, StreamExt};
use futures::channel::mpsc;

use crate::app_settings::COMMAND_CHANNEL_CAPACITY;
use crate::clock::SystemClock;
use crate::positioner::Positioner;
use crate::scene::{ApplicationState, FocusTarget, ItemId, Scene, SurfaceId};

/// Commands accepted by the driver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PositionerCommand {
    /// Bind the keyboard item.
    Attach(ItemId),
    /// Enable or disable animated transitions.
    SetAnimated(bool),
    /// A new element (or none) gained focus.
    FocusChanged(Option<FocusTarget>),
    /// Show the keyboard.
    Show,
    /// Hide the keyboard.
    Hide,
    /// A surface changed height.
    SurfaceHeightChanged(SurfaceId),
    /// The keyboard changed height.
    KeyboardHeightChanged,
    /// The application lifecycle state changed.
    AppStateChanged(ApplicationState),
    /// An item was destroyed by the host.
    ItemDestroyed(ItemId),
    /// A surface was destroyed by the host.
    SurfaceDestroyed(SurfaceId),
    /// Stop the loop.
    Quit,
}

/// Creates the command channel for a driver.
pub fn channel() -> (
    mpsc::Sender<PositionerCommand>,
    mpsc::Receiver<PositionerCommand>,
) {
    mpsc::channel(COMMAND_CHANNEL_CAPACITY)
}

/// Event loop owning a positioner.
pub struct PositionerDriver<S: Scene> {
    positioner: Positioner<S, SystemClock>,
    commands: mpsc::Receiver<PositionerCommand>,
}

impl<S: Scene> PositionerDriver<S> {
    pub fn new(
        positioner: Positioner<S, SystemClock>,
        commands: mpsc::Receiver<PositionerCommand>,
    ) -> Self {
        Self {
            positioner,
            commands,
        }
    }

    pub fn positioner(&self) -> &Positioner<S, SystemClock> {
        &self.positioner
    }

    /// Applies one command. Returns `Break` on [`PositionerCommand::Quit`].
    pub fn apply(&mut self, command: PositionerCommand) -> ControlFlow<()> {
        tracing::trace!("Applying {:?}", command);
        let positioner = &mut self.positioner;
        match command {
            PositionerCommand::Attach(keyboard) => positioner.attach(keyboard),
            PositionerCommand::SetAnimated(enabled) => positioner.set_animated(enabled),
            PositionerCommand::FocusChanged(focus) => positioner.on_focus_changed(focus),
            PositionerCommand::Show => positioner.show(),
            PositionerCommand::Hide => positioner.hide(),
            PositionerCommand::SurfaceHeightChanged(surface) => {
                positioner.on_surface_height_changed(surface)
            }
            PositionerCommand::KeyboardHeightChanged => positioner.on_keyboard_height_changed(),
            PositionerCommand::AppStateChanged(state) => positioner.on_app_state_changed(state),
            PositionerCommand::ItemDestroyed(item) => positioner.on_item_destroyed(item),
            PositionerCommand::SurfaceDestroyed(surface) => {
                positioner.on_surface_destroyed(surface)
            }
            PositionerCommand::Quit => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    /// Runs until [`PositionerCommand::Quit`] or until every sender is dropped,
    /// then hands the positioner back.
    ///
    /// Work that is due when the loop stops still runs; slides in flight are
    /// left where they are.
    pub async fn run(mut self) -> Positioner<S, SystemClock> {
        tracing::debug!("Positioner driver started");

        loop {
            // Everything already queued lands before deferred work runs
            let mut stop = false;
            loop {
                match self.commands.next().now_or_never() {
                    Some(Some(command)) => {
                        if self.apply(command).is_break() {
                            stop = true;
                            break;
                        }
                    }
                    Some(None) => {
                        tracing::warn!("Positioner command channel closed");
                        stop = true;
                        break;
                    }
                    None => break,
                }
            }

            self.positioner.poll();
            if stop {
                break;
            }

            let deadline = self.positioner.next_deadline();
            let sleep = tokio::time::sleep_until(tokio::time::Instant::from_std(
                deadline.unwrap_or_else(std::time::Instant::now),
            ));

            let received = tokio::select! {
                command = self.commands.next() => Some(command),
                () = sleep, if deadline.is_some() => None,
            };

            match received {
                Some(Some(command)) => {
                    if self.apply(command).is_break() {
                        self.positioner.poll();
                        break;
                    }
                }
                Some(None) => {
                    tracing::warn!("Positioner command channel closed");
                    self.positioner.poll();
                    break;
                }
                None => {}
            }
        }

        tracing::debug!("Positioner driver stopped");
        self.positioner
    }
}
