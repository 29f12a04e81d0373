//! # Slider Interpolation
//!
//! A slider position (0-100) maps linearly onto `[low_factor, high_factor]`:
//!
//! ```text
//! factor   = low + (high - low) * (position / 100)
//! position = (default - low) / (high - low) * 100     (clamped to 0-100)
//! ```
//!
//! Positions are not clamped on the way in. A position of 120 extrapolates
//! past `high_factor`; the UI keeps sliders within range.

use crate::config::SliderConfig;

/// Forward interpolation from a 0-100 position to a factor.
pub fn interpolate(position: f64, low_factor: f64, high_factor: f64) -> f64 {
    low_factor + (high_factor - low_factor) * (position / 100.0)
}

/// Factor for a slider: interpolated from the supplied position, or the
/// configured default factor when no position was supplied.
pub fn slider_factor(slider: &SliderConfig, position: Option<f64>) -> f64 {
    match position {
        Some(value) => interpolate(value, slider.low_factor, slider.high_factor),
        None => slider.default_value,
    }
}

/// Initial 0-100 position whose interpolation reproduces `default_value`.
///
/// Returns 50 for a flat slider (`high == low`), where every position
/// yields the same factor.
pub fn default_position(slider: &SliderConfig) -> f64 {
    let span = slider.high_factor - slider.low_factor;
    if span == 0.0 {
        return 50.0;
    }
    let position = (slider.default_value - slider.low_factor) / span * 100.0;
    position.clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CostConfig;

    #[test]
    fn test_interpolation_endpoints() {
        assert_eq!(interpolate(0.0, 0.8, 1.4), 0.8);
        assert!((interpolate(100.0, 0.8, 1.4) - 1.4).abs() < 1e-12);
        assert!((interpolate(50.0, 0.8, 1.4) - 1.1).abs() < 1e-12);
    }

    #[test]
    fn test_interpolation_with_descending_bounds() {
        // low > high is allowed; the line simply slopes down
        assert!((interpolate(25.0, 1.2, 0.8) - 1.1).abs() < 1e-12);
    }

    #[test]
    fn test_out_of_range_positions_extrapolate() {
        assert!((interpolate(150.0, 1.0, 2.0) - 2.5).abs() < 1e-12);
        assert!((interpolate(-50.0, 1.0, 2.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_missing_position_uses_default_factor() {
        let slider = SliderConfig::new("s", "S", 1.0, 0.5, 1.5, 1.2);
        assert_eq!(slider_factor(&slider, None), 1.2);
        assert_eq!(slider_factor(&slider, Some(0.0)), 0.5);
    }

    #[test]
    fn test_default_position_is_inverse_for_every_configured_slider() {
        let config = CostConfig::default();
        for (_, slider) in config.sliders.iter() {
            let position = default_position(slider);
            let factor = interpolate(position, slider.low_factor, slider.high_factor);
            assert!(
                (factor - slider.default_value).abs() < 1e-9,
                "slider {} round-trips to {}",
                slider.id,
                factor
            );
        }
    }

    #[test]
    fn test_default_position_clamps() {
        let above = SliderConfig::new("s", "S", 1.0, 1.0, 2.0, 3.0);
        assert_eq!(default_position(&above), 100.0);
        let below = SliderConfig::new("s", "S", 1.0, 1.0, 2.0, 0.0);
        assert_eq!(default_position(&below), 0.0);
    }

    #[test]
    fn test_flat_slider_position() {
        let flat = SliderConfig::new("s", "S", 1.0, 1.0, 1.0, 1.0);
        assert_eq!(default_position(&flat), 50.0);
        assert_eq!(interpolate(default_position(&flat), 1.0, 1.0), 1.0);
    }

    #[test]
    fn test_known_default_positions() {
        let config = CostConfig::default();
        let positions = config.default_positions();
        // (1.0 - 0.8) / (1.4 - 0.8) * 100
        assert!((positions["finish_level"] - 33.333_333_333).abs() < 1e-6);
        // Default sits on the low bound
        assert_eq!(positions["schedule_acceleration"], 0.0);
    }
}
