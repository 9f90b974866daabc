// SPDX-License-Identifier: GPL-3.0-only

//! Centralized application settings and constants.

/// Application ID in RDNN (reverse domain name notation) format.
pub const APP_ID: &str = "io.github.KeyboardPositioner";

/// Spacing kept between the bottom edge of the focused field and the keyboard top.
pub const FOCUS_MARGIN: f64 = 5.0;

/// Delay before showing the keyboard right after the application was re-activated.
pub const REACTIVATION_DELAY_MS: u64 = 100;

/// Duration of the keyboard slide animation in milliseconds.
pub const ANIMATION_DURATION_MS: u64 = 250;

/// Animation frame interval for smooth 60fps animations in milliseconds.
pub const ANIMATION_FRAME_INTERVAL_MS: u64 = 16;

/// Center bias used when the primary display reports no pixel density.
pub const FALLBACK_CENTER_BIAS: f64 = 45.0;

/// Millimetres per inch.
pub const MM_PER_INCH: f64 = 25.4;

/// Physical distance (in millimetres) the keyboard center is biased downwards at 100% scale.
pub const CENTER_BIAS_MM: f64 = 11.0;

/// Capacity of the command channel feeding the positioner driver.
pub const COMMAND_CHANNEL_CAPACITY: usize = 32;

/// File name of the user keyboard settings.
pub const SETTINGS_FILE_NAME: &str = "keyboard.json";

/// Sub-folder (below the settings root) holding the user keyboard settings.
pub const SETTINGS_SUB_FOLDER: &str = "platforminputcontexts";
