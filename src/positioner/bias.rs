// SPDX-License-Identifier: GPL-3.0-only

//! Density-dependent center bias of the keyboard.
//!
//! A fixed pixel offset looks very different on a 96 dpi desktop monitor and on
//! a 400 dpi phone panel, so the bias is expressed as a physical distance
//! ([`CENTER_BIAS_MM`](crate::app_settings::CENTER_BIAS_MM)) converted into
//! pixels for the primary display and scaled by the keyboard's own density
//! scale property (a percentage).

use crate::app_settings::{CENTER_BIAS_MM, FALLBACK_CENTER_BIAS, MM_PER_INCH};

/// Computes the vertical bias added to the keyboard's centered resting position.
///
/// # Arguments
///
/// * `density_scale` - The keyboard's density scale in percent, or `None` when no
///   keyboard is bound.
/// * `dots_per_inch` - Physical dots per inch of the primary display, or `None`
///   when the display density is unknown.
///
/// # Returns
///
/// `0.0` without a keyboard, [`FALLBACK_CENTER_BIAS`] without a display density,
/// otherwise `(dpi / 25.4) * 11 * (scale / 100)`.
pub fn center_bias(density_scale: Option<f64>, dots_per_inch: Option<f64>) -> f64 {
    let Some(scale) = density_scale else {
        return 0.0;
    };
    let Some(dpi) = dots_per_inch else {
        return FALLBACK_CENTER_BIAS;
    };

    let pixels_per_mm = dpi / MM_PER_INCH;
    pixels_per_mm * CENTER_BIAS_MM * (scale / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_keyboard_means_no_bias() {
        assert_eq!(center_bias(None, Some(96.0)), 0.0);
        assert_eq!(center_bias(None, None), 0.0);
    }

    #[test]
    fn test_unknown_density_uses_fallback() {
        assert_eq!(center_bias(Some(100.0), None), FALLBACK_CENTER_BIAS);
        assert_eq!(center_bias(Some(0.0), None), FALLBACK_CENTER_BIAS);
    }

    /// 254 dpi is exactly 10 px/mm, so 11 mm at 100% is 110 px.
    #[test]
    fn test_bias_scales_with_density() {
        let full = center_bias(Some(100.0), Some(254.0));
        assert!((full - 110.0).abs() < 1e-9, "got {}", full);

        let half = center_bias(Some(50.0), Some(254.0));
        assert!((half - 55.0).abs() < 1e-9, "got {}", half);

        let doubled_dpi = center_bias(Some(100.0), Some(508.0));
        assert!((doubled_dpi - 220.0).abs() < 1e-9, "got {}", doubled_dpi);
    }

    #[test]
    fn test_zero_scale_cancels_bias() {
        assert_eq!(center_bias(Some(0.0), Some(300.0)), 0.0);
    }
}
