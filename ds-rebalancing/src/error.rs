/// An error raised by rebalancing computations for invalid inputs.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum RebalancingError {
    /// There are no items to compute adjustments for.
    #[error("no items to rebalance")]
    EmptyInput,
    /// The fidelity rate is not a finite value in `(0, 1]`.
    #[error("invalid fidelity rate {0}")]
    InvalidFidelityRate(f64),
    /// A sample rate is not a finite value in `[0, 1]`.
    #[error("invalid sample rate {0}")]
    InvalidSampleRate(f64),
    /// The rebalancing intensity is not a finite value in `[0, 1]`.
    #[error("invalid intensity {0}")]
    InvalidIntensity(f64),
    /// An item count is negative or not finite.
    #[error("invalid count {0}")]
    InvalidCount(f64),
    /// The observation window is not positive.
    #[error("invalid window of {0} hours")]
    InvalidWindow(f64),
}

pub(crate) fn check_rate(value: f64) -> Result<(), RebalancingError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(RebalancingError::InvalidSampleRate(value))
    }
}

pub(crate) fn check_intensity(value: f64) -> Result<(), RebalancingError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(RebalancingError::InvalidIntensity(value))
    }
}

pub(crate) fn check_count(value: f64) -> Result<(), RebalancingError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(RebalancingError::InvalidCount(value))
    }
}
