// SPDX-License-Identifier: GPL-3.0-only

//! Keyboard positioning state machine.
//!
//! The [`Positioner`] decides where the keyboard and the scrollable content sit
//! and drives the show/hide transition. It reacts to:
//!
//! - focus changes ([`Positioner::on_focus_changed`]),
//! - height changes of the bound surface or of the keyboard,
//! - application lifecycle changes,
//! - show/hide requests from the input method.
//!
//! # Geometry
//!
//! ```text
//!  surface (y = -offset)
//! +-----------------------+
//! |                       |
//! |   [ focused field ]   |  <- focus bottom + margin
//! |-----------------------|  <- keyboard top = (surface h - keyboard h) / 2 + bias
//! |       keyboard        |
//! +-----------------------+
//!         (parked)            <- surface h + offset while hidden
//! ```
//!
//! The offset is `max(0, focus bottom - keyboard top)` when content scrolling is
//! enabled, zero otherwise.
//!
//! # Event loop
//!
//! `show()` never acts right away. It posts a one-shot task which runs on the
//! next [`Positioner::poll`], because focus and show notifications from the
//! input method arrive in an order that would otherwise position the keyboard
//! for the previous field. The owner of the loop calls `poll()` whenever
//! [`Positioner::next_deadline`] is reached.

pub mod animation;
pub mod bias;
pub mod deferred;

use std::time::{Duration, Instant};

use crate::app_settings::ANIMATION_FRAME_INTERVAL_MS;
use crate::clock::{Clock, SystemClock};
use crate::config::PositionerConfig;
use crate::scene::{ApplicationState, FocusTarget, ItemId, Scene, SurfaceId};
use crate::state::PositionerState;

use animation::{AnimationEvent, KeyboardAnimation};
use deferred::DeferredQueue;

/// Work posted to a later turn of the event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeferredTask {
    Show,
}

/// Positions the keyboard relative to the focused field and animates it.
#[derive(Debug)]
pub struct Positioner<S: Scene, C: Clock = SystemClock> {
    scene: S,
    clock: C,
    config: PositionerConfig,
    state: PositionerState,
    keyboard: Option<ItemId>,
    surface: Option<SurfaceId>,
    focus: Option<FocusTarget>,
    animation: Option<KeyboardAnimation>,
    deferred: DeferredQueue<DeferredTask>,
}

impl<S: Scene> Positioner<S, SystemClock> {
    /// Creates a positioner running on the system clock.
    pub fn new(scene: S, config: PositionerConfig) -> Self {
        Self::with_clock(scene, SystemClock, config)
    }
}

impl<S: Scene, C: Clock> Positioner<S, C> {
    /// Creates a positioner with an explicit time source.
    ///
    /// Animation is enabled according to `config.animated`.
    pub fn with_clock(scene: S, clock: C, config: PositionerConfig) -> Self {
        let animated = config.animated;
        let mut positioner = Self {
            scene,
            clock,
            config,
            state: PositionerState::default(),
            keyboard: None,
            surface: None,
            focus: None,
            animation: None,
            deferred: DeferredQueue::new(),
        };
        positioner.set_animated(animated);
        positioner
    }

    // ========================================================================
    // Setup
    // ========================================================================

    /// Binds the keyboard item.
    ///
    /// Binds the surface of a focus target recorded before this call, parks the
    /// keyboard below the bound surface (or at `0` without one) and feeds the
    /// current application state through [`Self::on_app_state_changed`].
    pub fn attach(&mut self, keyboard: ItemId) {
        if let Some(previous) = self.keyboard.replace(keyboard) {
            tracing::warn!(
                "Keyboard {:?} replaced by {:?} while attached",
                previous,
                keyboard
            );
            if let Some(animation) = &mut self.animation {
                animation.detach_target(previous);
            }
        } else {
            tracing::info!("Attached keyboard {:?}", keyboard);
        }

        if let Some(surface) = self.surface {
            self.scene.reparent_keyboard(keyboard, surface);
        }
        self.bind_focus_surface();

        let y = self
            .surface
            .and_then(|surface| self.scene.surface_height(surface))
            .map_or(0.0, |height| self.state.parked_y(height));
        self.scene.set_keyboard_y(keyboard, y);

        let app_state = self.scene.application_state();
        self.on_app_state_changed(app_state);
    }

    /// Turns animated transitions on or off.
    ///
    /// Turning animation off in the middle of a transition jumps to the
    /// transition's end and runs the animation-finished handling.
    pub fn set_animated(&mut self, enabled: bool) {
        self.config.animated = enabled;

        if enabled {
            if self.animation.is_none() {
                tracing::debug!("Keyboard animation enabled");
                self.animation = Some(KeyboardAnimation::with_easing(
                    self.config.animation_duration(),
                    self.config.easing,
                ));
            }
            return;
        }

        let Some(mut animation) = self.animation.take() else {
            return;
        };
        tracing::debug!("Keyboard animation disabled");
        if let Some(run) = animation.stop() {
            if let Some(target) = run.target {
                self.scene.set_keyboard_y(target, run.to);
            }
            self.on_animation_finished();
        }
    }

    // ========================================================================
    // Notifications
    // ========================================================================

    /// Records the new focus target and rebinds the surface if it moved to another window.
    ///
    /// Does not reposition anything; the next `show()` or height change does.
    pub fn on_focus_changed(&mut self, focus: Option<FocusTarget>) {
        if self.focus != focus {
            self.state.focus_changed = true;
        }
        self.focus = focus;
        tracing::debug!("Focus changed to {:?}", focus);

        self.bind_focus_surface();
    }

    /// Height notification for a content surface.
    ///
    /// Notifications for surfaces other than the bound one are ignored.
    pub fn on_surface_height_changed(&mut self, surface: SurfaceId) {
        if self.surface != Some(surface) {
            tracing::trace!("Ignoring height change of unbound surface {:?}", surface);
            return;
        }
        self.on_height_changed();
    }

    /// Height notification for the keyboard item.
    pub fn on_keyboard_height_changed(&mut self) {
        self.on_height_changed();
    }

    /// Application lifecycle notification.
    ///
    /// Every activation after the first marks the next show as a re-activation.
    /// Going inactive asks the input method to hide the keyboard.
    pub fn on_app_state_changed(&mut self, state: ApplicationState) {
        if self.keyboard.is_none() {
            return;
        }

        match state {
            ApplicationState::Active => {
                if self.state.ever_active {
                    tracing::debug!("Application re-activated");
                    self.state.reactivated = true;
                }
                self.state.ever_active = true;
            }
            ApplicationState::Inactive => {
                tracing::debug!("Application inactive, requesting keyboard hide");
                self.scene.hide_input_method();
            }
            ApplicationState::Hidden | ApplicationState::Suspended => {}
        }
    }

    /// The host destroyed an item. Clears any handle referring to it.
    pub fn on_item_destroyed(&mut self, item: ItemId) {
        if self.focus.is_some_and(|focus| focus.item == item) {
            tracing::debug!("Focused item {:?} destroyed", item);
            self.focus = None;
            self.state.focus_changed = true;
        }

        if self.keyboard == Some(item) {
            tracing::warn!("Keyboard {:?} destroyed while attached", item);
            self.keyboard = None;
            self.state.shown = false;
            if let Some(animation) = &mut self.animation {
                animation.detach_target(item);
            }
        }
    }

    /// The host destroyed a surface. Unbinds it if it is the bound one.
    pub fn on_surface_destroyed(&mut self, surface: SurfaceId) {
        if self.surface == Some(surface) {
            tracing::debug!("Bound surface {:?} destroyed", surface);
            self.surface = None;
            self.state.shown = false;
        }
    }

    // ========================================================================
    // Show / hide
    // ========================================================================

    /// Requests the keyboard to become visible on the next turn of the event loop.
    ///
    /// Right after a re-activation (with animation enabled) the task is delayed
    /// so the application can finish its layout first.
    pub fn show(&mut self) {
        let delay = if self.animation.is_some() && self.state.reactivated {
            self.config.reactivation_delay()
        } else {
            Duration::ZERO
        };

        tracing::debug!("Show requested (delay {:?})", delay);
        self.deferred.post(self.clock.now(), delay, DeferredTask::Show);
    }

    /// Hides the keyboard.
    ///
    /// Without animation the keyboard is parked with the current offset and the
    /// surface scroll is reset; with animation both happen when the slide ends.
    pub fn hide(&mut self) {
        self.state.shown = false;

        let (Some(keyboard), Some(surface)) = (self.keyboard, self.surface) else {
            return;
        };
        let Some(height) = self.scene.surface_height(surface) else {
            return;
        };
        let parked = self.state.parked_y(height);
        tracing::debug!("Hiding keyboard (parked at {})", parked);

        if let Some(animation) = &mut self.animation {
            let from = self.scene.keyboard_y(keyboard).unwrap_or(parked);
            animation.start(keyboard, from, parked, self.clock.now());
            self.scene.set_keyboard_y(keyboard, from);
        } else {
            self.scene.set_keyboard_y(keyboard, parked);
            self.scene.set_surface_y(surface, 0.0);
        }
    }

    /// Returns `true` while an animation drives the keyboard.
    pub fn is_animating(&self) -> bool {
        self.animation
            .as_ref()
            .is_some_and(KeyboardAnimation::is_running)
    }

    // ========================================================================
    // Event loop integration
    // ========================================================================

    /// Runs due deferred tasks, then advances the animation.
    pub fn poll(&mut self) {
        let now = self.clock.now();

        for task in self.deferred.take_due(now) {
            match task {
                DeferredTask::Show => self.run_show(),
            }
        }

        self.advance_animation(now);
    }

    /// When [`Self::poll`] should run next, `None` when idle.
    pub fn next_deadline(&self) -> Option<Instant> {
        let frame = self
            .animation
            .as_ref()
            .filter(|animation| animation.has_pending_runs())
            .map(|_| self.clock.now() + Duration::from_millis(ANIMATION_FRAME_INTERVAL_MS));

        [self.deferred.next_deadline(), frame]
            .into_iter()
            .flatten()
            .min()
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    pub fn state(&self) -> &PositionerState {
        &self.state
    }

    pub fn config(&self) -> &PositionerConfig {
        &self.config
    }

    /// Whether the keyboard is logically visible.
    pub fn is_shown(&self) -> bool {
        self.state.shown
    }

    /// Current scroll compensation.
    pub fn offset(&self) -> f64 {
        self.state.offset
    }

    pub fn keyboard(&self) -> Option<ItemId> {
        self.keyboard
    }

    pub fn surface(&self) -> Option<SurfaceId> {
        self.surface
    }

    pub fn focus(&self) -> Option<FocusTarget> {
        self.focus
    }

    /// Density bias of the attached keyboard, `0` without one.
    pub fn center_bias(&self) -> f64 {
        let density_scale = self
            .keyboard
            .map(|keyboard| self.scene.density_scale(keyboard).unwrap_or(0.0));
        bias::center_bias(density_scale, self.scene.screen_dpi())
    }

    /// Resting top edge of the visible keyboard with unscrolled content.
    pub fn visible_keyboard_top(&self) -> Option<f64> {
        let keyboard = self.keyboard?;
        let surface_height = self.scene.surface_height(self.surface?)?;
        let keyboard_height = self.scene.keyboard_height(keyboard)?;
        Some((surface_height - keyboard_height) / 2.0 + self.center_bias())
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Binds the focus target's surface if it differs from the bound one.
    fn bind_focus_surface(&mut self) {
        let (Some(keyboard), Some(focus)) = (self.keyboard, self.focus) else {
            return;
        };
        if focus.surface == self.surface {
            return;
        }

        if let Some(old) = self.surface {
            self.scene.unwatch_surface_height(old);
        }
        self.surface = focus.surface;

        let Some(surface) = focus.surface else {
            tracing::debug!("Focus target has no surface, keyboard unbound");
            return;
        };
        tracing::info!("Keyboard moved to surface {:?}", surface);
        self.scene.reparent_keyboard(keyboard, surface);
        self.scene.watch_surface_height(surface);

        if !self.state.shown {
            if let Some(height) = self.scene.surface_height(surface) {
                self.move_keyboard(keyboard, self.state.parked_y(height));
            }
        }
    }

    /// Body of the deferred `show()` task.
    fn run_show(&mut self) {
        let (Some(keyboard), Some(surface)) = (self.keyboard, self.surface) else {
            self.state.shown = false;
            return;
        };

        if self.state.shown {
            if self.state.focus_changed {
                self.update_position(true);
                self.state.focus_changed = false;
            }
            return;
        }

        if self.focus.is_none() {
            tracing::debug!("No focus target, keyboard stays hidden");
            return;
        }

        self.state.shown = true;
        self.state.focus_changed = false;
        self.update_position(true);

        let (Some(height), Some(top)) = (
            self.scene.surface_height(surface),
            self.visible_keyboard_top(),
        ) else {
            return;
        };
        let from = self.state.parked_y(height);
        let to = top + self.state.offset;
        tracing::debug!("Showing keyboard ({} -> {})", from, to);

        if let Some(animation) = &mut self.animation {
            animation.start(keyboard, from, to, self.clock.now());
            self.scene.set_keyboard_y(keyboard, from);
        } else {
            self.scene.set_keyboard_y(keyboard, to);
        }
    }

    /// Recomputes the offset, scrolls the surface and optionally moves the keyboard.
    fn update_position(&mut self, update_keyboard: bool) {
        let (Some(keyboard), Some(surface), Some(focus)) = (self.keyboard, self.surface, self.focus)
        else {
            return;
        };
        let (Some(surface_height), Some(item_bottom), Some(keyboard_top)) = (
            self.scene.surface_height(surface),
            self.scene.item_bottom_in(focus.item, surface),
            self.visible_keyboard_top(),
        ) else {
            tracing::warn!("Missing geometry for focus {:?} in {:?}", focus.item, surface);
            return;
        };

        if !self.state.shown {
            self.scene.set_keyboard_visible(keyboard, false);
        }

        let focus_bottom = item_bottom + self.config.focus_margin;
        self.state.offset = if self.config.scroll_content {
            (focus_bottom - keyboard_top).max(0.0)
        } else {
            0.0
        };
        self.scene.set_surface_y(surface, -self.state.offset);

        if update_keyboard {
            let base = if self.state.shown {
                keyboard_top
            } else {
                surface_height
            };
            self.move_keyboard(keyboard, base + self.state.offset);
        }

        self.scene.set_keyboard_visible(keyboard, true);
    }

    fn on_height_changed(&mut self) {
        let (Some(keyboard), Some(surface)) = (self.keyboard, self.surface) else {
            return;
        };

        if self.state.shown {
            self.update_position(true);
        } else if let Some(height) = self.scene.surface_height(surface) {
            self.move_keyboard(keyboard, self.state.parked_y(height));
        }
    }

    /// Writes the keyboard position, or moves the end of the running slide there.
    fn move_keyboard(&mut self, keyboard: ItemId, y: f64) {
        let retargeted = self
            .animation
            .as_mut()
            .is_some_and(|animation| animation.retarget_end(y));
        if !retargeted {
            self.scene.set_keyboard_y(keyboard, y);
        }
    }

    fn advance_animation(&mut self, now: Instant) {
        let Some(animation) = &mut self.animation else {
            return;
        };

        for event in animation.tick(now) {
            match event {
                AnimationEvent::Frame { target, value } => {
                    tracing::trace!("Keyboard frame y={}", value);
                    self.scene.set_keyboard_y(target, value);
                }
                AnimationEvent::Finished => self.on_animation_finished(),
            }
        }
    }

    /// Settles the hidden state once no slide drives the keyboard anymore.
    fn on_animation_finished(&mut self) {
        self.state.reactivated = false;

        if self.state.shown || self.is_animating() {
            return;
        }
        let (Some(keyboard), Some(surface)) = (self.keyboard, self.surface) else {
            return;
        };
        let Some(height) = self.scene.surface_height(surface) else {
            return;
        };
        self.scene.set_surface_y(surface, 0.0);
        self.scene.set_keyboard_y(keyboard, self.state.parked_y(height));
    }
}
