//! Closing window policy.

use chrono::{Days, NaiveDate};
use treasury_shared::ClosingConfig;

use super::error::ClosingValidationError;

/// Business policy applied by the closing service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClosingPolicy {
    /// Days back from today a closing is still accepted.
    pub max_backdays: u32,
    /// Halt cascade recalculation at the first failure.
    pub stop_on_error: bool,
}

impl Default for ClosingPolicy {
    fn default() -> Self {
        Self {
            max_backdays: 3,
            stop_on_error: false,
        }
    }
}

impl From<&ClosingConfig> for ClosingPolicy {
    fn from(config: &ClosingConfig) -> Self {
        Self {
            max_backdays: config.max_backdays,
            stop_on_error: config.stop_on_error,
        }
    }
}

impl ClosingPolicy {
    /// Oldest date that may still be closed on `today`.
    #[must_use]
    pub fn earliest_allowed(&self, today: NaiveDate) -> NaiveDate {
        today
            .checked_sub_days(Days::new(u64::from(self.max_backdays)))
            .unwrap_or(NaiveDate::MIN)
    }

    /// Checks that `date` lies within `[today - max_backdays, today]`.
    ///
    /// # Errors
    ///
    /// Returns `FutureDate` or `OutsideWindow`.
    pub fn validate_window(
        &self,
        date: NaiveDate,
        today: NaiveDate,
    ) -> Result<(), ClosingValidationError> {
        if date > today {
            return Err(ClosingValidationError::FutureDate { date, today });
        }
        let earliest_allowed = self.earliest_allowed(today);
        if date < earliest_allowed {
            return Err(ClosingValidationError::OutsideWindow {
                date,
                earliest_allowed,
            });
        }
        Ok(())
    }
}
