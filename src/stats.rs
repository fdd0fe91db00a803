use crate::error::StudyError;
use crate::models::{Band, Statistics, DAYS_PER_WEEK};

pub const HIGH_BAND_FLOOR: f64 = 6.0;
pub const MID_BAND_FLOOR: f64 = 4.0;

impl Statistics {
    /// Mean, max and min over exactly one week of hours.
    pub fn from_hours(hours: &[f64]) -> Result<Self, StudyError> {
        if hours.len() != DAYS_PER_WEEK {
            return Err(StudyError::WrongLength {
                expected: DAYS_PER_WEEK,
                actual: hours.len(),
            });
        }

        let sum: f64 = hours.iter().sum();
        let max = hours.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = hours.iter().copied().fold(f64::INFINITY, f64::min);

        Ok(Self {
            mean: sum / DAYS_PER_WEEK as f64,
            max,
            min,
        })
    }
}

/// Lower bounds are inclusive; anything that is not at least 4.0 (NaN
/// included) lands in the low band.
pub fn evaluate(mean: f64) -> Band {
    if mean >= HIGH_BAND_FLOOR {
        Band::High
    } else if mean >= MID_BAND_FLOOR {
        Band::Mid
    } else {
        Band::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn bands_follow_expected_thresholds() {
        let means = [3.99, 4.0, 5.99, 6.0, 6.01];
        let bands: Vec<Band> = means.iter().map(|mean| evaluate(*mean)).collect();
        assert_eq!(
            bands,
            vec![Band::Low, Band::Mid, Band::Mid, Band::High, Band::High]
        );
    }

    #[test]
    fn nan_mean_is_low() {
        assert_eq!(evaluate(f64::NAN), Band::Low);
    }

    #[test]
    fn sample_week_lands_in_mid_band() {
        let stats = Statistics::from_hours(&[2.0, 4.0, 6.0, 8.0, 10.0, 0.0, 1.0]).unwrap();
        assert!((stats.mean - 31.0 / 7.0).abs() < 1e-12);
        assert_eq!(format!("{:.2}", stats.mean), "4.43");
        assert_eq!(stats.max, 10.0);
        assert_eq!(stats.min, 0.0);
        assert_eq!(evaluate(stats.mean), Band::Mid);
    }

    #[test]
    fn rejects_wrong_length() {
        assert_eq!(
            Statistics::from_hours(&[]).unwrap_err(),
            StudyError::WrongLength {
                expected: 7,
                actual: 0
            }
        );
        assert!(Statistics::from_hours(&[1.0; 8]).is_err());
    }

    fn week() -> impl Strategy<Value = Vec<f64>> {
        prop::collection::vec((0u8..=24).prop_map(|steps| steps as f64 * 0.5), 7)
    }

    proptest! {
        #[test]
        fn prop_statistics_bound_the_week(hours in week()) {
            let stats = Statistics::from_hours(&hours).unwrap();
            let sum: f64 = hours.iter().sum();
            prop_assert!((stats.mean - sum / 7.0).abs() < 1e-9);
            for value in &hours {
                prop_assert!(stats.max >= *value);
                prop_assert!(stats.min <= *value);
            }
            prop_assert!(stats.min <= stats.mean && stats.mean <= stats.max);
        }

        #[test]
        fn prop_bands_never_drop_as_mean_grows(a in -20.0..20.0f64, b in -20.0..20.0f64) {
            let rank = |band: Band| match band {
                Band::Low => 0,
                Band::Mid => 1,
                Band::High => 2,
            };
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(rank(evaluate(low)) <= rank(evaluate(high)));
        }
    }
}
