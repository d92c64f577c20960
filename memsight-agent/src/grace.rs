//! Consecutive publish failure budget.

/// What the loop should do after a publish attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Abort,
}

/// Counts consecutive publish failures.
///
/// Up to `threshold` failures in a row are tolerated; failure number
/// `threshold + 1` aborts. Any success resets the count.
#[derive(Debug, Clone)]
pub struct GraceController {
    consecutive_failures: u64,
    threshold: u64,
}

impl GraceController {
    pub fn new(threshold: u64) -> Self {
        Self {
            consecutive_failures: 0,
            threshold,
        }
    }

    /// Record the outcome of a publish attempt.
    pub fn record<E>(&mut self, outcome: Result<(), &E>) -> Action {
        match outcome {
            Ok(()) => {
                self.consecutive_failures = 0;
                Action::Continue
            }
            Err(_) => {
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
                if self.is_exhausted() {
                    Action::Abort
                } else {
                    Action::Continue
                }
            }
        }
    }

    pub fn consecutive_failures(&self) -> u64 {
        self.consecutive_failures
    }

    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    pub fn is_exhausted(&self) -> bool {
        self.consecutive_failures > self.threshold
    }
}
