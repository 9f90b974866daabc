// SPDX-License-Identifier: GPL-3.0-only

/// Transient state of the positioner.
///
/// Nothing here is persisted; it lives as long as the positioner.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PositionerState {
    /// Whether the keyboard is logically visible.
    pub shown: bool,
    /// Scroll compensation applied to the bound surface, always `>= 0`.
    pub offset: f64,
    /// The focus target changed since the position was last committed.
    pub focus_changed: bool,
    /// The next animation follows an application re-activation.
    pub reactivated: bool,
    /// The application has been active at least once.
    pub ever_active: bool,
}

impl PositionerState {
    /// Where the keyboard sits while hidden: just below the surface, shifted by the offset.
    pub fn parked_y(&self, surface_height: f64) -> f64 {
        surface_height + self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_hidden_and_clean() {
        let state = PositionerState::default();
        assert!(!state.shown);
        assert_eq!(state.offset, 0.0);
        assert!(!state.focus_changed);
        assert!(!state.reactivated);
        assert!(!state.ever_active);
    }

    #[test]
    fn test_parked_position_includes_offset() {
        let state = PositionerState {
            offset: 505.0,
            ..Default::default()
        };
        assert_eq!(state.parked_y(800.0), 1305.0);
    }
}
