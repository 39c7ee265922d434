use crate::models::OhlcSample;
use crate::utils::ChartError;

/// Round to 2 decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Multiply open/high/low/close of every sample by `factor`, rounded to 2 decimals.
/// Times and ordering are left untouched and the input is not modified.
pub fn scale_series(series: &[OhlcSample], factor: f64) -> Result<Vec<OhlcSample>, ChartError> {
    if !(factor.is_finite() && factor > 0.0) {
        return Err(ChartError::InvalidScaleFactor(factor));
    }

    Ok(series
        .iter()
        .map(|s| OhlcSample {
            time: s.time,
            open: round2(s.open * factor),
            high: round2(s.high * factor),
            low: round2(s.low * factor),
            close: round2(s.close * factor),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SampleTime;

    #[test]
    fn test_scale_rounds_and_preserves_order() {
        let series = vec![
            OhlcSample::new(SampleTime::Ordinal(0), 0.000001234, 0.000001301, 0.000001200, 0.000001299),
            OhlcSample::new(SampleTime::Ordinal(1), 0.000001299, 0.000001350, 0.000001280, 0.000001281),
        ];
        let scaled = scale_series(&series, 1_000_000_000.0).unwrap();

        assert_eq!(scaled.len(), 2);
        assert_eq!(scaled[0].time, SampleTime::Ordinal(0));
        assert_eq!(scaled[1].time, SampleTime::Ordinal(1));
        for (raw, s) in series.iter().zip(&scaled) {
            assert_eq!(s.open, round2(raw.open * 1_000_000_000.0));
            assert_eq!(s.high, round2(raw.high * 1_000_000_000.0));
            assert_eq!(s.low, round2(raw.low * 1_000_000_000.0));
            assert_eq!(s.close, round2(raw.close * 1_000_000_000.0));
        }
        assert!((scaled[0].open - 1234.0).abs() < 1e-6);
    }

    #[test]
    fn test_scale_rounds_to_two_decimals() {
        let series = vec![OhlcSample::new(SampleTime::Ordinal(0), 1.23456, 2.0, 1.0, 1.5)];
        let scaled = scale_series(&series, 1.0).unwrap();
        assert_eq!(scaled[0].open, 1.23);
        assert_eq!(scaled[0].close, 1.5);
    }

    #[test]
    fn test_scale_rejects_non_positive_factor() {
        let series = vec![OhlcSample::new(SampleTime::Ordinal(0), 1.0, 2.0, 0.5, 1.5)];
        assert!(matches!(scale_series(&series, 0.0), Err(ChartError::InvalidScaleFactor(_))));
        assert!(matches!(scale_series(&series, -2.0), Err(ChartError::InvalidScaleFactor(_))));
        assert!(scale_series(&series, f64::NAN).is_err());
    }

    #[test]
    fn test_scale_empty_series() {
        assert!(scale_series(&[], 10.0).unwrap().is_empty());
    }
}
