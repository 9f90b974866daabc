// SPDX-License-Identifier: GPL-3.0-only

//! In-memory [`Scene`] used by the demo binary and the tests.

use std::collections::{HashMap, HashSet};

use super::{ApplicationState, ItemId, Scene, SurfaceId};

/// A content surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceNode {
    pub height: f64,
    /// Scroll offset applied by the positioner.
    pub y: f64,
}

/// A focusable field, positioned in its surface's unscrolled coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemNode {
    pub surface: SurfaceId,
    pub top: f64,
    pub height: f64,
}

/// The keyboard item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyboardNode {
    pub height: f64,
    pub y: f64,
    pub visible: bool,
    pub parent: Option<SurfaceId>,
    pub density_scale: Option<f64>,
}

/// A scene made of plain maps.
#[derive(Debug, Clone, Default)]
pub struct MemoryScene {
    surfaces: HashMap<SurfaceId, SurfaceNode>,
    items: HashMap<ItemId, ItemNode>,
    keyboards: HashMap<ItemId, KeyboardNode>,
    watched: HashSet<SurfaceId>,
    screen_dpi: Option<f64>,
    application_state: ApplicationState,
    hide_requests: usize,
}

impl MemoryScene {
    /// Creates an empty scene without a known display density.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the primary display density.
    #[must_use]
    pub fn with_screen_dpi(mut self, dpi: Option<f64>) -> Self {
        self.screen_dpi = dpi;
        self
    }

    /// Adds (or replaces) a content surface.
    pub fn add_surface(&mut self, id: SurfaceId, height: f64) {
        self.surfaces.insert(id, SurfaceNode { height, y: 0.0 });
    }

    /// Adds (or replaces) a focusable field.
    pub fn add_item(&mut self, id: ItemId, surface: SurfaceId, top: f64, height: f64) {
        self.items.insert(
            id,
            ItemNode {
                surface,
                top,
                height,
            },
        );
    }

    /// Adds (or replaces) a keyboard item.
    pub fn add_keyboard(&mut self, id: ItemId, height: f64, density_scale: Option<f64>) {
        self.keyboards.insert(
            id,
            KeyboardNode {
                height,
                y: 0.0,
                visible: true,
                parent: None,
                density_scale,
            },
        );
    }

    /// Removes a surface, as if its window was destroyed.
    pub fn remove_surface(&mut self, id: SurfaceId) {
        self.surfaces.remove(&id);
        self.watched.remove(&id);
    }

    /// Removes a field or keyboard.
    pub fn remove_item(&mut self, id: ItemId) {
        self.items.remove(&id);
        self.keyboards.remove(&id);
    }

    /// Changes a surface's height. Returns `true` if the positioner watches it.
    pub fn resize_surface(&mut self, id: SurfaceId, height: f64) -> bool {
        if let Some(surface) = self.surfaces.get_mut(&id) {
            surface.height = height;
        }
        self.watched.contains(&id)
    }

    /// Changes a keyboard's height.
    pub fn resize_keyboard(&mut self, id: ItemId, height: f64) {
        if let Some(keyboard) = self.keyboards.get_mut(&id) {
            keyboard.height = height;
        }
    }

    /// Sets the state returned by [`Scene::application_state`].
    pub fn set_application_state(&mut self, state: ApplicationState) {
        self.application_state = state;
    }

    pub fn surface(&self, id: SurfaceId) -> Option<&SurfaceNode> {
        self.surfaces.get(&id)
    }

    pub fn item(&self, id: ItemId) -> Option<&ItemNode> {
        self.items.get(&id)
    }

    pub fn keyboard(&self, id: ItemId) -> Option<&KeyboardNode> {
        self.keyboards.get(&id)
    }

    /// Returns `true` if height notifications are requested for `surface`.
    pub fn is_watched(&self, surface: SurfaceId) -> bool {
        self.watched.contains(&surface)
    }

    /// How many times the input method was asked to hide the keyboard.
    pub fn hide_requests(&self) -> usize {
        self.hide_requests
    }
}

impl Scene for MemoryScene {
    fn surface_height(&self, surface: SurfaceId) -> Option<f64> {
        self.surfaces.get(&surface).map(|s| s.height)
    }

    fn set_surface_y(&mut self, surface: SurfaceId, y: f64) {
        if let Some(s) = self.surfaces.get_mut(&surface) {
            s.y = y;
        }
    }

    fn item_bottom_in(&self, item: ItemId, surface: SurfaceId) -> Option<f64> {
        let item = self.items.get(&item)?;
        // Items of other windows have no mapping into this surface
        (item.surface == surface && self.surfaces.contains_key(&surface))
            .then_some(item.top + item.height)
    }

    fn keyboard_height(&self, keyboard: ItemId) -> Option<f64> {
        self.keyboards.get(&keyboard).map(|k| k.height)
    }

    fn keyboard_y(&self, keyboard: ItemId) -> Option<f64> {
        self.keyboards.get(&keyboard).map(|k| k.y)
    }

    fn set_keyboard_y(&mut self, keyboard: ItemId, y: f64) {
        if let Some(k) = self.keyboards.get_mut(&keyboard) {
            k.y = y;
        }
    }

    fn set_keyboard_visible(&mut self, keyboard: ItemId, visible: bool) {
        if let Some(k) = self.keyboards.get_mut(&keyboard) {
            k.visible = visible;
        }
    }

    fn reparent_keyboard(&mut self, keyboard: ItemId, surface: SurfaceId) {
        if let Some(k) = self.keyboards.get_mut(&keyboard) {
            k.parent = Some(surface);
        }
    }

    fn density_scale(&self, keyboard: ItemId) -> Option<f64> {
        self.keyboards.get(&keyboard).and_then(|k| k.density_scale)
    }

    fn watch_surface_height(&mut self, surface: SurfaceId) {
        self.watched.insert(surface);
    }

    fn unwatch_surface_height(&mut self, surface: SurfaceId) {
        self.watched.remove(&surface);
    }

    fn screen_dpi(&self) -> Option<f64> {
        self.screen_dpi
    }

    fn application_state(&self) -> ApplicationState {
        self.application_state
    }

    fn hide_input_method(&mut self) {
        self.hide_requests += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_bottom_only_maps_into_own_surface() {
        let mut scene = MemoryScene::new();
        scene.add_surface(SurfaceId(1), 800.0);
        scene.add_surface(SurfaceId(2), 600.0);
        scene.add_item(ItemId(10), SurfaceId(1), 700.0, 50.0);

        assert_eq!(scene.item_bottom_in(ItemId(10), SurfaceId(1)), Some(750.0));
        assert_eq!(scene.item_bottom_in(ItemId(10), SurfaceId(2)), None);
        assert_eq!(scene.item_bottom_in(ItemId(99), SurfaceId(1)), None);
    }

    #[test]
    fn test_writes_to_missing_handles_are_ignored() {
        let mut scene = MemoryScene::new();
        scene.set_surface_y(SurfaceId(1), -10.0);
        scene.set_keyboard_y(ItemId(1), 10.0);
        scene.set_keyboard_visible(ItemId(1), false);

        assert!(scene.surface(SurfaceId(1)).is_none());
        assert!(scene.keyboard(ItemId(1)).is_none());
    }

    #[test]
    fn test_resize_reports_watch_state() {
        let mut scene = MemoryScene::new();
        scene.add_surface(SurfaceId(1), 800.0);
        assert!(!scene.resize_surface(SurfaceId(1), 700.0));

        scene.watch_surface_height(SurfaceId(1));
        assert!(scene.resize_surface(SurfaceId(1), 600.0));
        assert_eq!(scene.surface_height(SurfaceId(1)), Some(600.0));

        scene.remove_surface(SurfaceId(1));
        assert!(!scene.is_watched(SurfaceId(1)));
    }
}
