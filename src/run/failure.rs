// SPDX-License-Identifier: MIT

//! Step failure simulation
//!
//! When the `enableStepFailure` setting is on, the machine consults a
//! [`FailurePolicy`] before starting each step. The default policy never
//! trips; the probability policy backs the CLI's `--failure-rate` flag.

/// Decides whether the step about to start should fail
pub trait FailurePolicy: Send + Sync {
    /// `step_index` is the zero-based index of the step about to start
    fn should_fail(&self, workflow_id: &str, step_index: usize) -> bool;
}

/// Never fails a step
#[derive(Debug, Default, Clone, Copy)]
pub struct NeverFail;

impl FailurePolicy for NeverFail {
    fn should_fail(&self, _workflow_id: &str, _step_index: usize) -> bool {
        false
    }
}

/// Fails each step independently with a fixed probability
#[derive(Debug, Clone, Copy)]
pub struct RandomFailure {
    probability: f64,
}

impl RandomFailure {
    /// `probability` is clamped to [0.0, 1.0]
    pub fn new(probability: f64) -> Self {
        Self {
            probability: probability.clamp(0.0, 1.0),
        }
    }
}

impl FailurePolicy for RandomFailure {
    fn should_fail(&self, _workflow_id: &str, _step_index: usize) -> bool {
        rand::random::<f64>() < self.probability
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_fail() {
        let policy = NeverFail;
        for i in 0..10 {
            assert!(!policy.should_fail("wf", i));
        }
    }

    #[test]
    fn test_random_failure_extremes() {
        let always = RandomFailure::new(1.0);
        let never = RandomFailure::new(0.0);
        for i in 0..10 {
            assert!(always.should_fail("wf", i));
            assert!(!never.should_fail("wf", i));
        }
    }

    #[test]
    fn test_probability_clamped() {
        let policy = RandomFailure::new(7.5);
        assert!(policy.should_fail("wf", 0));

        let policy = RandomFailure::new(-1.0);
        assert!(!policy.should_fail("wf", 0));
    }
}
