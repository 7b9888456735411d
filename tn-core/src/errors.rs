//! Error taxonomy shared by every temporal network routine.
//!
//! All variants are fail-fast: no routine retries internally, and validation happens before any
//! randomness is drawn or any state is mutated, so an `Err` never comes with a partial record.
use thiserror::Error;

/// Errors reported by the temporal network core and the generators built on top of it.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum TemporalNetworkError {
    /// Mutually exclusive parameters were both set or both unset, or a parameter is outside of
    /// its admissible range.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Declared times are inconsistent, e.g. `tmax` precedes the last event time.
    #[error("ordering error: {0}")]
    Ordering(String),

    /// A process or the scheduler broke its own contract; the run must be aborted.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// A uniform draw was attempted over an empty collection.
    #[error("invariant violation: attempted a uniform draw from empty {0}")]
    EmptySelection(&'static str),
}

impl TemporalNetworkError {
    /// Shorthand constructor for [`TemporalNetworkError::Configuration`].
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Shorthand constructor for [`TemporalNetworkError::InvariantViolation`].
    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    /// Reports `tmax` preceding the last recorded event time.
    #[must_use]
    pub fn tmax_before_last_event(tmax: f64, last: f64) -> Self {
        Self::Ordering(format!("tmax = {tmax} precedes the last event time {last}"))
    }

    /// Empty selections are contract breaches of the same kind as out-of-range channels.
    #[must_use]
    pub const fn is_invariant_violation(&self) -> bool {
        matches!(self, Self::InvariantViolation(_) | Self::EmptySelection(_))
    }
}

/// Result alias used throughout the library crates.
pub type Result<T> = std::result::Result<T, TemporalNetworkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_selection_counts_as_invariant_violation() {
        assert!(TemporalNetworkError::EmptySelection("SI edges").is_invariant_violation());
        assert!(TemporalNetworkError::invariant("channel 7").is_invariant_violation());
        assert!(!TemporalNetworkError::configuration("dt").is_invariant_violation());
    }

    #[test]
    fn test_ordering_message_names_both_times() {
        let err = TemporalNetworkError::tmax_before_last_event(1.0, 2.5);
        assert_eq!(err.to_string(), "ordering error: tmax = 1 precedes the last event time 2.5");
    }
}
