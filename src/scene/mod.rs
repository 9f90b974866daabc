// SPDX-License-Identifier: GPL-3.0-only

//! The host scene the positioner works on.
//!
//! The positioner never owns the elements it moves. It refers to them through
//! plain handles ([`SurfaceId`], [`ItemId`]) and talks to the host through the
//! [`Scene`] trait. Every query returns `Option` so a handle to an element the
//! host has already destroyed degrades to a no-op; writes to such handles are
//! ignored by the host.
//!
//! # Coordinates
//!
//! A surface is the content root of a window. Its `y` is the scroll offset the
//! positioner applies (negative values move content up). The keyboard is
//! parented under the bound surface and its `y` is expressed in that surface's
//! unscrolled coordinate space.

pub mod memory;

pub use memory::MemoryScene;

/// Handle of a scrollable content surface (the content root of a window).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u64);

/// Handle of a scene item: the keyboard or a focusable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub u64);

/// The element currently accepting input, with the surface of its window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusTarget {
    /// The focused item.
    pub item: ItemId,
    /// Content surface of the window containing the item, if it has one.
    pub surface: Option<SurfaceId>,
}

impl FocusTarget {
    /// Creates a focus target living in `surface`.
    pub fn new(item: ItemId, surface: SurfaceId) -> Self {
        Self {
            item,
            surface: Some(surface),
        }
    }
}

/// Application lifecycle states reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApplicationState {
    /// Visible and focused.
    Active,
    /// Visible but not focused.
    #[default]
    Inactive,
    /// Not visible.
    Hidden,
    /// Suspended by the platform.
    Suspended,
}

/// Host environment of the positioner.
pub trait Scene {
    /// Height of a content surface.
    fn surface_height(&self, surface: SurfaceId) -> Option<f64>;

    /// Moves a content surface vertically.
    fn set_surface_y(&mut self, surface: SurfaceId, y: f64);

    /// Bottom edge of `item`, mapped into the unscrolled coordinates of `surface`.
    fn item_bottom_in(&self, item: ItemId, surface: SurfaceId) -> Option<f64>;

    /// Height of the keyboard item.
    fn keyboard_height(&self, keyboard: ItemId) -> Option<f64>;

    /// Current vertical position of the keyboard item.
    fn keyboard_y(&self, keyboard: ItemId) -> Option<f64>;

    /// Moves the keyboard item vertically.
    fn set_keyboard_y(&mut self, keyboard: ItemId, y: f64);

    /// Shows or hides the keyboard item.
    fn set_keyboard_visible(&mut self, keyboard: ItemId, visible: bool);

    /// Makes `surface` the parent of the keyboard item.
    fn reparent_keyboard(&mut self, keyboard: ItemId, surface: SurfaceId);

    /// The keyboard's density scale property in percent, `None` if it has none.
    fn density_scale(&self, keyboard: ItemId) -> Option<f64>;

    /// Starts delivering height notifications for `surface`.
    fn watch_surface_height(&mut self, surface: SurfaceId);

    /// Stops delivering height notifications for `surface`.
    fn unwatch_surface_height(&mut self, surface: SurfaceId);

    /// Physical dots per inch of the primary display, `None` if unknown.
    fn screen_dpi(&self) -> Option<f64>;

    /// Current application lifecycle state.
    fn application_state(&self) -> ApplicationState;

    /// Asks the input method layer to hide the keyboard.
    fn hide_input_method(&mut self);
}
