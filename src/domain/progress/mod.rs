//! Progress projection for streamed generation.
//!
//! The backend never says how many tokens a response will have, so progress is
//! an estimate: tokens seen over a per-task expected count. The estimate stays
//! below 100% while the stream is open and reaches 100% only through
//! [`ProgressEstimate::finish`].

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Percentage, ValidationError};
use crate::domain::prompts::TaskKind;

/// Highest value reported while a stream is still in flight.
pub const IN_FLIGHT_CEILING: u8 = 99;

/// Steps seen so far against the steps expected for one stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEstimate {
    steps_seen: u32,
    steps_expected: u32,
}

impl ProgressEstimate {
    /// Starts an estimate expecting `steps_expected` steps.
    ///
    /// # Errors
    ///
    /// Returns `OutOfRange` if `steps_expected` is zero.
    pub fn new(steps_expected: u32) -> Result<Self, ValidationError> {
        if steps_expected == 0 {
            return Err(ValidationError::out_of_range(
                "steps_expected",
                1,
                i64::from(u32::MAX),
                0,
            ));
        }
        Ok(Self {
            steps_seen: 0,
            steps_expected,
        })
    }

    /// Starts an estimate calibrated for `task`.
    pub fn for_task(task: TaskKind) -> Self {
        Self {
            steps_seen: 0,
            steps_expected: task.expected_steps().max(1),
        }
    }

    pub fn steps_seen(&self) -> u32 {
        self.steps_seen
    }

    pub fn steps_expected(&self) -> u32 {
        self.steps_expected
    }

    /// Percentage for the current step count, capped for an open stream.
    pub fn percentage(&self) -> Percentage {
        let raw = Percentage::from_ratio(u64::from(self.steps_seen), u64::from(self.steps_expected));
        raw.min(Percentage::new(IN_FLIGHT_CEILING))
    }

    /// Records one more step and returns the new estimate with its percentage.
    pub fn advance(self) -> (Self, Percentage) {
        let next = Self {
            steps_seen: self.steps_seen.saturating_add(1),
            ..self
        };
        (next, next.percentage())
    }

    /// Closes the estimate. The stream is over, so this is always 100%.
    pub fn finish(self) -> Percentage {
        Percentage::HUNDRED
    }
}
