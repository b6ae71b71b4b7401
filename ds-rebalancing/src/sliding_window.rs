use chrono::{Datelike, Months, NaiveDate, Utc};
use ds_protocol::OrganizationId;
use ds_quotas::Quotas;

use crate::error::RebalancingError;

/// Returns the number of days in the month of `date`.
pub fn days_in_month(date: NaiveDate) -> u32 {
    let first = date.with_day(1).unwrap_or(date);
    match first.checked_add_months(Months::new(1)) {
        Some(next) => next.signed_duration_since(first).num_days() as u32,
        // Only reachable in the last month of the representable range.
        None => 31,
    }
}

/// Extrapolates the volume observed over `window_hours` to the current month.
///
/// See [`extrapolate_monthly_volume_at`].
pub fn extrapolate_monthly_volume(volume: f64, window_hours: f64) -> Result<f64, RebalancingError> {
    extrapolate_monthly_volume_at(volume, window_hours, Utc::now().date_naive())
}

/// Extrapolates the volume observed over `window_hours` to the month of `date`.
///
/// The window must span a positive number of hours.
pub fn extrapolate_monthly_volume_at(
    volume: f64,
    window_hours: f64,
    date: NaiveDate,
) -> Result<f64, RebalancingError> {
    if !(window_hours.is_finite() && window_hours > 0.0) {
        return Err(RebalancingError::InvalidWindow(window_hours));
    }

    crate::error::check_count(volume)?;

    let hours_in_month = f64::from(days_in_month(date)) * 24.0;
    Ok(volume * hours_in_month / window_hours)
}

/// Computes the sample rate of an organization from the volume of a sliding window.
///
/// See [`sliding_window_sample_rate_at`].
pub fn sliding_window_sample_rate(
    quotas: &dyn Quotas,
    organization_id: OrganizationId,
    volume: f64,
    window_hours: f64,
) -> Result<Option<f64>, RebalancingError> {
    sliding_window_sample_rate_at(
        quotas,
        organization_id,
        volume,
        window_hours,
        Utc::now().date_naive(),
    )
}

/// Computes the sample rate of an organization from the volume of a sliding window.
///
/// The volume is extrapolated to the month of `date` and looked up in the organization's
/// transaction sampling tiers. Returns `None` if no tier applies.
pub fn sliding_window_sample_rate_at(
    quotas: &dyn Quotas,
    organization_id: OrganizationId,
    volume: f64,
    window_hours: f64,
    date: NaiveDate,
) -> Result<Option<f64>, RebalancingError> {
    let monthly_volume = extrapolate_monthly_volume_at(volume, window_hours, date)?;

    let tier = quotas.transaction_sampling_tier_for_volume(organization_id, monthly_volume as u64);
    if tier.is_none() {
        ds_log::debug!(
            organization_id = %organization_id,
            monthly_volume,
            "no sampling tier for extrapolated volume"
        );
    }

    Ok(tier.map(|tier| tier.sample_rate))
}

#[cfg(test)]
mod tests {
    use ds_quotas::{SamplingTier, StaticQuotas};
    use similar_asserts::assert_eq;

    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(date(2023, 2, 14)), 28);
        assert_eq!(days_in_month(date(2024, 2, 29)), 29);
        assert_eq!(days_in_month(date(2023, 4, 30)), 30);
        assert_eq!(days_in_month(date(2023, 12, 31)), 31);
    }

    #[test]
    fn test_extrapolate_monthly_volume() {
        assert_eq!(
            extrapolate_monthly_volume_at(10.0, 24.0, date(2023, 2, 1)).unwrap(),
            280.0
        );
        assert_eq!(
            extrapolate_monthly_volume_at(10.0, 24.0, date(2024, 2, 1)).unwrap(),
            290.0
        );
        assert_eq!(
            extrapolate_monthly_volume_at(10.0, 24.0, date(2023, 6, 15)).unwrap(),
            300.0
        );
        assert_eq!(
            extrapolate_monthly_volume_at(10.0, 24.0, date(2023, 7, 15)).unwrap(),
            310.0
        );
        assert_eq!(
            extrapolate_monthly_volume_at(10.0, 1.0, date(2023, 7, 15)).unwrap(),
            7440.0
        );
    }

    #[test]
    fn test_extrapolate_invalid_window() {
        assert_eq!(
            extrapolate_monthly_volume_at(10.0, 0.0, date(2023, 7, 15)).unwrap_err(),
            RebalancingError::InvalidWindow(0.0)
        );
        assert!(extrapolate_monthly_volume(10.0, f64::NAN).is_err());
    }

    #[test]
    fn test_current_month() {
        let volume = extrapolate_monthly_volume(1.0, 24.0).unwrap();
        assert!((28.0..=31.0).contains(&volume));
    }

    #[test]
    fn test_sliding_window_sample_rate() {
        let quotas = StaticQuotas {
            tiers: vec![
                SamplingTier {
                    volume: 1_000,
                    sample_rate: 1.0,
                },
                SamplingTier {
                    volume: 100_000,
                    sample_rate: 0.5,
                },
                SamplingTier {
                    volume: 1_000_000,
                    sample_rate: 0.1,
                },
            ],
            ..Default::default()
        };

        let org = OrganizationId::new(1);
        let june = date(2023, 6, 15);

        // 30 * 24 / 24 * 10 = 300
        let rate = sliding_window_sample_rate_at(&quotas, org, 10.0, 24.0, june).unwrap();
        assert_eq!(rate, Some(1.0));

        // 30_000
        let rate = sliding_window_sample_rate_at(&quotas, org, 1_000.0, 24.0, june).unwrap();
        assert_eq!(rate, Some(0.5));

        // above the largest tier
        let rate = sliding_window_sample_rate_at(&quotas, org, 1e9, 24.0, june).unwrap();
        assert_eq!(rate, Some(0.1));
    }

    #[test]
    fn test_sliding_window_without_tiers() {
        ds_log::init_test!();

        let rate = sliding_window_sample_rate_at(
            &StaticQuotas::default(),
            OrganizationId::new(1),
            10.0,
            24.0,
            date(2023, 6, 15),
        )
        .unwrap();

        assert_eq!(rate, None);
    }
}
