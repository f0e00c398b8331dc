use crate::error::AnalyticsError;
use crate::report::Dispersion;
use rust_decimal::prelude::*;

pub(crate) fn mean(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<Decimal>() / Decimal::from(values.len()))
}

/// Sample (n - 1) coefficient of variation, rounded to four places.
pub(crate) fn coefficient_of_variation(values: &[Decimal]) -> Result<Dispersion, AnalyticsError> {
    if values.len() < 2 {
        return Ok(Dispersion::Unavailable);
    }
    let Some(mean) = mean(values) else {
        return Ok(Dispersion::Unavailable);
    };
    if mean.is_zero() {
        return Ok(Dispersion::ZeroMean);
    }

    let variance = values
        .iter()
        .map(|v| (*v - mean) * (*v - mean))
        .sum::<Decimal>()
        / Decimal::from(values.len() - 1);

    let std_dev = variance.sqrt().ok_or_else(|| {
        AnalyticsError::Calculation("Failed to calculate square root for variance".to_string())
    })?;

    Ok(Dispersion::Coefficient((std_dev / mean.abs()).round_dp(4)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_cv_of_constant_series_is_zero() {
        let cv = coefficient_of_variation(&[dec!(500), dec!(500), dec!(500)]).unwrap();
        assert_eq!(cv, Dispersion::Coefficient(Decimal::ZERO));
    }

    #[test]
    fn test_cv_sample_formula() {
        // mean 20, sample sd 10 -> 0.5
        let cv = coefficient_of_variation(&[dec!(10), dec!(20), dec!(30)]).unwrap();
        assert_eq!(cv, Dispersion::Coefficient(dec!(0.5)));
    }

    #[test]
    fn test_cv_sentinels() {
        assert_eq!(coefficient_of_variation(&[dec!(0), dec!(0)]).unwrap(), Dispersion::ZeroMean);
        assert_eq!(coefficient_of_variation(&[dec!(7)]).unwrap(), Dispersion::Unavailable);
    }
}
