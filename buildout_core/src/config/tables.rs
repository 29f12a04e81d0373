//! # Preset Tables
//!
//! Default factor tables, slider definitions and base rates. Size, floor and
//! location factors and the slider definitions are shared by every market
//! tier; only the base-rate table changes between tiers.
//!
//! | Size (RSF)        | Factor |
//! |-------------------|--------|
//! | 0 - 5,000         | 1.30   |
//! | 5,001 - 15,000    | 1.20   |
//! | 15,001 - 30,000   | 1.10   |
//! | 30,001 - 60,000   | 1.00   |
//! | 60,001 - 100,000  | 0.95   |
//! | 100,001 +         | 0.90   |

use std::collections::BTreeMap;

use super::{BaseValues, CategorySliders, MarketTier, SizeRange, SliderConfig, TechnologyRates};

/// Default contingency (5%)
pub const DEFAULT_CONTINGENCY_PERCENT: f64 = 0.05;

pub fn size_ranges() -> Vec<SizeRange> {
    vec![
        SizeRange { min: 0.0, max: Some(5_000.0), factor: 1.3 },
        SizeRange { min: 5_001.0, max: Some(15_000.0), factor: 1.2 },
        SizeRange { min: 15_001.0, max: Some(30_000.0), factor: 1.1 },
        SizeRange { min: 30_001.0, max: Some(60_000.0), factor: 1.0 },
        SizeRange { min: 60_001.0, max: Some(100_000.0), factor: 0.95 },
        SizeRange { min: 100_001.0, max: None, factor: 0.9 },
    ]
}

/// Floors 1 through 7. Taller buildings reuse the 7-floor factor.
pub fn floor_factors() -> BTreeMap<u32, f64> {
    BTreeMap::from([
        (1, 1.0),
        (2, 1.02),
        (3, 1.04),
        (4, 1.06),
        (5, 1.08),
        (6, 1.1),
        (7, 1.12),
    ])
}

/// Metro cost indices relative to New York.
pub fn location_factors() -> BTreeMap<String, f64> {
    [
        ("New York, NY", 1.0),
        ("San Francisco, CA", 1.05),
        ("Boston, MA", 0.98),
        ("Los Angeles, CA", 0.95),
        ("Washington, DC", 0.95),
        ("Seattle, WA", 0.93),
        ("Chicago, IL", 0.9),
        ("Miami, FL", 0.85),
        ("Denver, CO", 0.84),
        ("Austin, TX", 0.82),
        ("Atlanta, GA", 0.8),
        ("Dallas, TX", 0.8),
    ]
    .into_iter()
    .map(|(name, factor)| (name.to_string(), factor))
    .collect()
}

pub fn sliders() -> CategorySliders {
    CategorySliders {
        construction: vec![
            SliderConfig::new("finish_level", "Finish Level", 0.4, 0.8, 1.4, 1.0),
            SliderConfig::new("mep_complexity", "MEP Complexity", 0.3, 0.85, 1.3, 1.0),
            SliderConfig::new("ceiling_treatment", "Ceiling Treatment", 0.15, 0.9, 1.2, 1.0),
            SliderConfig::new("demolition_scope", "Demolition Scope", 0.15, 0.9, 1.25, 1.0),
        ],
        ffe_appliances: vec![
            SliderConfig::new("furniture_grade", "Furniture Grade", 0.5, 0.7, 1.5, 1.0),
            SliderConfig::new("appliance_package", "Appliance Package", 0.3, 0.8, 1.3, 1.0),
            SliderConfig::new("workstation_density", "Workstation Density", 0.2, 0.85, 1.2, 1.0),
        ],
        signage: vec![
            SliderConfig::new("signage_scope", "Signage Scope", 0.6, 0.6, 1.6, 1.0),
            SliderConfig::new("illumination", "Illuminated Signage", 0.4, 0.9, 1.3, 1.0),
        ],
        technology: vec![
            SliderConfig::new("av_sophistication", "AV Sophistication", 0.4, 0.7, 1.6, 1.0),
            SliderConfig::new("it_infrastructure", "IT Infrastructure", 0.35, 0.85, 1.3, 1.0),
            SliderConfig::new("security_level", "Security Level", 0.25, 0.8, 1.4, 1.0),
        ],
        other: vec![
            SliderConfig::new("moving_logistics", "Moving & Logistics", 0.5, 0.8, 1.3, 1.0),
            SliderConfig::new("schedule_acceleration", "Schedule Acceleration", 0.5, 1.0, 1.3, 1.0),
        ],
        permitting: SliderConfig::new("permitting_complexity", "Permitting Complexity", 1.0, 0.8, 1.5, 1.0),
    }
}

/// Default $/RSF rates per tier.
pub fn base_values(tier: MarketTier) -> BaseValues {
    match tier {
        MarketTier::Low => BaseValues {
            construction_costs: 110.0,
            design_fees: 9.0,
            ffe_appliances: 25.0,
            signage: 2.0,
            technology: TechnologyRates { av: 8.0, it: 8.0, sec: 3.0 },
            other: 4.0,
        },
        MarketTier::Medium => BaseValues {
            construction_costs: 150.0,
            design_fees: 12.0,
            ffe_appliances: 35.0,
            signage: 3.0,
            technology: TechnologyRates { av: 12.0, it: 10.0, sec: 4.0 },
            other: 6.0,
        },
        MarketTier::High => BaseValues {
            construction_costs: 210.0,
            design_fees: 18.0,
            ffe_appliances: 55.0,
            signage: 5.0,
            technology: TechnologyRates { av: 20.0, it: 14.0, sec: 6.0 },
            other: 9.0,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_medium_base_total() {
        // 150 + 12 + 35 + 3 + (12 + 10 + 4) + 6
        assert_eq!(base_values(MarketTier::Medium).total_per_rsf(), 232.0);
    }

    #[test]
    fn test_standard_category_weights_sum_to_one() {
        let sliders = sliders();
        for group in [
            &sliders.construction,
            &sliders.ffe_appliances,
            &sliders.signage,
            &sliders.technology,
            &sliders.other,
        ] {
            let total: f64 = group.iter().map(|s| s.weight).sum();
            assert!((total - 1.0).abs() < 1e-12, "weights sum to {}", total);
        }
    }

    #[test]
    fn test_defaults_lie_within_bounds() {
        for (_, slider) in sliders().iter() {
            let (lo, hi) = if slider.low_factor <= slider.high_factor {
                (slider.low_factor, slider.high_factor)
            } else {
                (slider.high_factor, slider.low_factor)
            };
            assert!((lo..=hi).contains(&slider.default_value), "{}", slider.id);
        }
    }

    #[test]
    fn test_size_ranges_ascending_with_unbounded_top() {
        let ranges = size_ranges();
        for pair in ranges.windows(2) {
            assert!(pair[0].min < pair[1].min);
        }
        assert!(ranges.last().unwrap().max.is_none());
    }

    #[test]
    fn test_tiers_are_ordered() {
        let low = base_values(MarketTier::Low).total_per_rsf();
        let medium = base_values(MarketTier::Medium).total_per_rsf();
        let high = base_values(MarketTier::High).total_per_rsf();
        assert!(low < medium && medium < high);
    }
}
