// Lap filtering rules: invalid lap removal and median based outlier removal

use itertools::Itertools;

use crate::model::LapSample;

/// Laps at or above `median * OUTLIER_FACTOR` count as outliers
pub const DEFAULT_OUTLIER_FACTOR: f64 = 1.06;

/// Drop every lap without a usable time
pub fn remove_invalid_laps(laps: &[LapSample]) -> Vec<LapSample> {
    laps.iter()
        .filter(|lap| !lap.lap_time.is_invalid())
        .cloned()
        .collect()
}

/// Median of the numeric lap times. Sentinel and malformed times are not counted.
///
/// For `n` sorted values and `mid = ceil(n / 2)` this is `sorted[mid - 1]` when `n` is
/// odd and the mean of `sorted[mid - 1]` and `sorted[mid]` when it is even.
pub fn median_lap_time(laps: &[LapSample]) -> Option<f64> {
    let sorted = laps
        .iter()
        .filter_map(|lap| lap.lap_time.seconds())
        .sorted_by(|a, b| a.total_cmp(b))
        .collect_vec();
    if sorted.is_empty() {
        return None;
    }
    let mid = sorted.len().div_ceil(2);
    if sorted.len() % 2 == 0 {
        Some((sorted[mid] + sorted[mid - 1]) / 2.)
    } else {
        Some(sorted[mid - 1])
    }
}

pub fn outlier_threshold(laps: &[LapSample], outlier_factor: f64) -> Option<f64> {
    median_lap_time(laps).map(|median| median * outlier_factor)
}

/// Keep laps strictly faster than the outlier threshold. Laps without a numeric time
/// are never treated as outliers.
pub fn remove_outliers(laps: &[LapSample], outlier_factor: f64) -> Vec<LapSample> {
    let Some(threshold) = outlier_threshold(laps, outlier_factor) else {
        return laps.to_vec();
    };
    laps.iter()
        .filter(|lap| {
            lap.lap_time
                .seconds()
                .is_none_or(|seconds| seconds < threshold)
        })
        .cloned()
        .collect()
}

/// The laps to display for the given toggle state, sorted by lap number.
///
/// Always derived from the full raw list so that toggling back and forth can never
/// drift away from what the two flags describe.
pub fn display_laps(
    raw_laps: &[LapSample],
    show_invalid: bool,
    show_outliers: bool,
    outlier_factor: f64,
) -> Vec<LapSample> {
    let base = if show_invalid {
        raw_laps.to_vec()
    } else {
        remove_invalid_laps(raw_laps)
    };
    let mut displayed = if show_outliers {
        base
    } else {
        remove_outliers(&base, outlier_factor)
    };
    displayed.sort_by_key(|lap| lap.lap_number);
    displayed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LapTime;
    use proptest::prelude::*;

    fn lap(lap_number: u32, lap_time: &str) -> LapSample {
        LapSample {
            lap_number,
            lap_time: LapTime::from_raw(lap_time),
            compound: Some("SOFT".to_string()),
            tyre_life: Some(lap_number as f32),
            deleted: false,
        }
    }

    fn scenario_laps() -> Vec<LapSample> {
        vec![
            lap(1, "80.0"),
            lap(2, "81.0"),
            lap(3, "82.0"),
            lap(4, "NaT"),
            lap(5, "200.0"),
        ]
    }

    fn lap_numbers(laps: &[LapSample]) -> Vec<u32> {
        laps.iter().map(|l| l.lap_number).collect()
    }

    #[test]
    fn test_median_even_and_odd() {
        let laps = scenario_laps();
        assert_eq!(median_lap_time(&laps), Some(81.5));

        let odd = vec![lap(1, "90.0"), lap(2, "85.0"), lap(3, "100.0")];
        assert_eq!(median_lap_time(&odd), Some(90.0));

        assert_eq!(median_lap_time(&[lap(1, "NaT")]), None);
        assert_eq!(median_lap_time(&[]), None);
    }

    #[test]
    fn test_threshold_scenario() {
        let threshold = outlier_threshold(&scenario_laps(), DEFAULT_OUTLIER_FACTOR).unwrap();
        assert!((threshold - 86.39).abs() < 1e-9);
    }

    #[test]
    fn test_remove_invalid_then_outliers() {
        let laps = scenario_laps();
        let valid = remove_invalid_laps(&laps);
        assert_eq!(lap_numbers(&valid), vec![1, 2, 3, 5]);
        let clean = remove_outliers(&valid, DEFAULT_OUTLIER_FACTOR);
        assert_eq!(lap_numbers(&clean), vec![1, 2, 3]);
    }

    #[test]
    fn test_outlier_removal_keeps_invalid_laps() {
        let clean = remove_outliers(&scenario_laps(), DEFAULT_OUTLIER_FACTOR);
        assert_eq!(lap_numbers(&clean), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_malformed_times_are_not_counted() {
        let laps = vec![
            lap(1, "80.0"),
            lap(2, "garbage"),
            lap(3, "82.0"),
            lap(4, "120.0"),
        ];
        // numeric times [80, 82, 120] -> median 82
        assert_eq!(median_lap_time(&laps), Some(82.0));
        let clean = remove_outliers(&laps, DEFAULT_OUTLIER_FACTOR);
        assert_eq!(lap_numbers(&clean), vec![1, 2, 3]);
        assert_eq!(lap_numbers(&remove_invalid_laps(&laps)), vec![1, 3, 4]);
    }

    #[test]
    fn test_outlier_threshold_is_strict() {
        // median 100, only laps strictly below the threshold survive
        let laps = vec![lap(1, "100.0"), lap(2, "106.0"), lap(3, "94.0")];
        let threshold = outlier_threshold(&laps, DEFAULT_OUTLIER_FACTOR).unwrap();
        let clean = remove_outliers(&laps, DEFAULT_OUTLIER_FACTOR);
        let expected: Vec<u32> = laps
            .iter()
            .filter(|l| l.lap_time.seconds().unwrap() < threshold)
            .map(|l| l.lap_number)
            .collect();
        assert_eq!(lap_numbers(&clean), expected);
    }

    #[test]
    fn test_display_laps_for_every_toggle_state() {
        let raw = scenario_laps();
        let f = DEFAULT_OUTLIER_FACTOR;
        assert_eq!(lap_numbers(&display_laps(&raw, false, false, f)), vec![1, 2, 3]);
        assert_eq!(lap_numbers(&display_laps(&raw, true, false, f)), vec![1, 2, 3, 4]);
        assert_eq!(lap_numbers(&display_laps(&raw, false, true, f)), vec![1, 2, 3, 5]);
        assert_eq!(
            lap_numbers(&display_laps(&raw, true, true, f)),
            vec![1, 2, 3, 4, 5]
        );
    }

    #[test]
    fn test_display_laps_sorted_by_lap_number() {
        let raw = vec![lap(3, "82.0"), lap(1, "80.0"), lap(2, "NaT")];
        let shown = display_laps(&raw, true, true, DEFAULT_OUTLIER_FACTOR);
        assert_eq!(lap_numbers(&shown), vec![1, 2, 3]);
    }

    fn arb_lap_time() -> impl Strategy<Value = String> {
        prop_oneof![
            8 => (60.0f64..200.0).prop_map(|t| format!("{t:.3}")),
            1 => Just("NaT".to_string()),
            1 => Just("n/a".to_string()),
        ]
    }

    fn arb_laps() -> impl Strategy<Value = Vec<LapSample>> {
        proptest::collection::vec(arb_lap_time(), 0..40).prop_map(|times| {
            times
                .iter()
                .enumerate()
                .map(|(i, t)| lap(i as u32 + 1, t))
                .collect()
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_cleaning_never_grows_and_respects_threshold(raw in arb_laps()) {
            let valid = remove_invalid_laps(&raw);
            let clean = remove_outliers(&valid, DEFAULT_OUTLIER_FACTOR);
            prop_assert!(valid.len() <= raw.len());
            prop_assert!(clean.len() <= valid.len());
            if let Some(threshold) = outlier_threshold(&valid, DEFAULT_OUTLIER_FACTOR) {
                for lap in &clean {
                    if let Some(seconds) = lap.lap_time.seconds() {
                        prop_assert!(seconds < threshold);
                    }
                }
            }
        }

        #[test]
        fn prop_display_is_subset_of_raw(raw in arb_laps(), show_invalid in any::<bool>(), show_outliers in any::<bool>()) {
            let shown = display_laps(&raw, show_invalid, show_outliers, DEFAULT_OUTLIER_FACTOR);
            for lap in &shown {
                prop_assert!(raw.contains(lap));
            }
            prop_assert!(shown.windows(2).all(|w| w[0].lap_number < w[1].lap_number));
        }
    }
}
