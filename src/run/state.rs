// SPDX-License-Identifier: MIT

//! Run state types and the pure tick transition
//!
//! A run is the transient execution of one workflow: derived steps with
//! statuses, a cursor, and a mode. All timer-driven mutation funnels
//! through [`RunState::advance`], a pure function of the state and the
//! current instant, so playback semantics are testable without time
//! passing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analytics::RunOutcome;
use crate::catalog::WorkflowDefinition;

/// Status of a single step within a run
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Pending,
    Running,
    Completed,
    Error,
}

/// Playback mode of the run
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Idle,
    Running,
    Paused,
}

/// Simulation speed, mapped to the tick interval
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Speed {
    Slow,
    #[default]
    Normal,
    Fast,
}

impl Speed {
    /// Tick interval in milliseconds
    pub fn interval_ms(&self) -> u64 {
        match self {
            Speed::Slow => 2000,
            Speed::Normal => 1000,
            Speed::Fast => 500,
        }
    }

    pub fn interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.interval_ms())
    }
}

/// Severity of a log entry
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warning,
    Success,
    Error,
}

/// One entry in the session log
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub level: LogLevel,
}

impl LogEntry {
    pub fn new(message: impl Into<String>, level: LogLevel, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            message: message.into(),
            level,
        }
    }
}

/// A step definition joined with its run status
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RunStep {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: StepStatus,
}

/// Result of one tick applied to a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// The tick fired while the run was not in running mode; nothing changed
    Stale,
    /// The step at `index` entered running
    Advanced { index: usize },
    /// The step at `index` was marked error and the run stopped
    Failed { index: usize, outcome: RunOutcome },
    /// All steps consumed; the run stopped
    Completed { outcome: RunOutcome },
}

/// Transient state of one workflow execution. Never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct RunState {
    /// Selected workflow id, `None` when nothing is selected
    pub workflow_id: Option<String>,
    pub steps: Vec<RunStep>,
    /// -1 = not started
    pub current_step_index: i32,
    pub mode: RunMode,
    pub started_at: Option<DateTime<Utc>>,
}

impl RunState {
    /// State with no selection
    pub fn empty() -> Self {
        Self {
            workflow_id: None,
            steps: Vec::new(),
            current_step_index: -1,
            mode: RunMode::Idle,
            started_at: None,
        }
    }

    /// Fresh state for a selected workflow: all steps pending, cursor at -1
    pub fn for_workflow(workflow: &WorkflowDefinition) -> Self {
        Self {
            workflow_id: Some(workflow.id.clone()),
            steps: workflow
                .steps
                .iter()
                .map(|s| RunStep {
                    id: s.id.clone(),
                    title: s.title.clone(),
                    description: s.description.clone(),
                    status: StepStatus::Pending,
                })
                .collect(),
            current_step_index: -1,
            mode: RunMode::Idle,
            started_at: None,
        }
    }

    pub fn has_selection(&self) -> bool {
        self.workflow_id.is_some()
    }

    /// Back to idle with all steps pending. Keeps the selection.
    pub fn reset(&mut self) {
        self.mode = RunMode::Idle;
        self.current_step_index = -1;
        self.started_at = None;
        for step in &mut self.steps {
            step.status = StepStatus::Pending;
        }
    }

    /// Apply one tick.
    ///
    /// Marks the prior step completed, then either starts the next step
    /// (or marks it error when `fail_next` is set) or detects completion
    /// when all steps are consumed. A tick observed outside running mode
    /// is stale and leaves the state untouched. On the completion tick
    /// the cursor does not advance past the last index.
    pub fn advance(&mut self, now: DateTime<Utc>, fail_next: bool) -> TickOutcome {
        if self.mode != RunMode::Running {
            return TickOutcome::Stale;
        }

        let prev = self.current_step_index;
        let next = prev + 1;

        if prev >= 0 && (prev as usize) < self.steps.len() {
            self.steps[prev as usize].status = StepStatus::Completed;
        }

        let next_idx = next as usize;
        if next_idx < self.steps.len() {
            if fail_next {
                self.steps[next_idx].status = StepStatus::Error;
                self.mode = RunMode::Idle;
                let outcome = self.outcome(false, next_idx as u64, now);
                return TickOutcome::Failed {
                    index: next_idx,
                    outcome,
                };
            }
            self.steps[next_idx].status = StepStatus::Running;
            self.current_step_index = next;
            TickOutcome::Advanced { index: next_idx }
        } else {
            self.mode = RunMode::Idle;
            let outcome = self.outcome(true, self.steps.len() as u64, now);
            TickOutcome::Completed { outcome }
        }
    }

    fn outcome(&self, success: bool, steps_completed: u64, now: DateTime<Utc>) -> RunOutcome {
        let duration = self
            .started_at
            .map(|started| (now - started).num_milliseconds().max(0) as u64)
            .unwrap_or(0);
        RunOutcome {
            workflow_id: self.workflow_id.clone().unwrap_or_default(),
            success,
            steps_completed,
            duration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StepDefinition;
    use chrono::TimeZone;

    fn definition(n: usize) -> WorkflowDefinition {
        WorkflowDefinition {
            id: "wf-test".to_string(),
            name: "Test".to_string(),
            description: String::new(),
            steps: (1..=n)
                .map(|i| StepDefinition {
                    id: format!("step-{}", i),
                    title: format!("Step {}", i),
                    description: String::new(),
                })
                .collect(),
        }
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn started(n: usize) -> RunState {
        let mut state = RunState::for_workflow(&definition(n));
        state.mode = RunMode::Running;
        state.started_at = Some(at(0));
        state
    }

    #[test]
    fn test_for_workflow_all_pending() {
        let state = RunState::for_workflow(&definition(3));
        assert_eq!(state.workflow_id.as_deref(), Some("wf-test"));
        assert_eq!(state.current_step_index, -1);
        assert_eq!(state.mode, RunMode::Idle);
        assert!(state.steps.iter().all(|s| s.status == StepStatus::Pending));
    }

    #[test]
    fn test_advance_marks_running_then_completed() {
        let mut state = started(2);

        let out = state.advance(at(1), false);
        assert_eq!(out, TickOutcome::Advanced { index: 0 });
        assert_eq!(state.steps[0].status, StepStatus::Running);
        assert_eq!(state.steps[1].status, StepStatus::Pending);
        assert_eq!(state.current_step_index, 0);

        let out = state.advance(at(2), false);
        assert_eq!(out, TickOutcome::Advanced { index: 1 });
        assert_eq!(state.steps[0].status, StepStatus::Completed);
        assert_eq!(state.steps[1].status, StepStatus::Running);
    }

    #[test]
    fn test_completion_tick() {
        let mut state = started(2);
        state.advance(at(1), false);
        state.advance(at(2), false);

        let out = state.advance(at(3), false);
        match out {
            TickOutcome::Completed { outcome } => {
                assert!(outcome.success);
                assert_eq!(outcome.steps_completed, 2);
                assert_eq!(outcome.duration, 3000);
                assert_eq!(outcome.workflow_id, "wf-test");
            }
            other => panic!("Expected Completed, got {:?}", other),
        }
        assert_eq!(state.mode, RunMode::Idle);
        // Cursor must not run past the last index
        assert_eq!(state.current_step_index, 1);
        assert!(state.steps.iter().all(|s| s.status == StepStatus::Completed));
    }

    #[test]
    fn test_zero_step_workflow_completes_instantly() {
        let mut state = started(0);

        let out = state.advance(at(1), false);
        match out {
            TickOutcome::Completed { outcome } => {
                assert!(outcome.success);
                assert_eq!(outcome.steps_completed, 0);
            }
            other => panic!("Expected Completed, got {:?}", other),
        }
        assert_eq!(state.mode, RunMode::Idle);
        assert_eq!(state.current_step_index, -1);
    }

    #[test]
    fn test_stale_tick_is_suppressed() {
        let mut state = started(2);
        state.advance(at(1), false);

        state.mode = RunMode::Paused;
        assert_eq!(state.advance(at(2), false), TickOutcome::Stale);
        assert_eq!(state.current_step_index, 0);
        assert_eq!(state.steps[0].status, StepStatus::Running);

        state.mode = RunMode::Idle;
        assert_eq!(state.advance(at(3), false), TickOutcome::Stale);
    }

    #[test]
    fn test_failed_step() {
        let mut state = started(3);
        state.advance(at(1), false);
        state.advance(at(2), false);

        let out = state.advance(at(3), true);
        match out {
            TickOutcome::Failed { index, outcome } => {
                assert_eq!(index, 2);
                assert!(!outcome.success);
                assert_eq!(outcome.steps_completed, 2);
                assert_eq!(outcome.duration, 3000);
            }
            other => panic!("Expected Failed, got {:?}", other),
        }
        assert_eq!(state.steps[0].status, StepStatus::Completed);
        assert_eq!(state.steps[1].status, StepStatus::Completed);
        assert_eq!(state.steps[2].status, StepStatus::Error);
        assert_eq!(state.mode, RunMode::Idle);
    }

    #[test]
    fn test_reset_mid_run() {
        let mut state = started(5);
        for _ in 0..3 {
            state.advance(at(1), false);
        }
        assert_eq!(state.current_step_index, 2);

        state.reset();
        assert_eq!(state.mode, RunMode::Idle);
        assert_eq!(state.current_step_index, -1);
        assert!(state.started_at.is_none());
        assert!(state.steps.iter().all(|s| s.status == StepStatus::Pending));
    }

    #[test]
    fn test_speed_intervals() {
        assert_eq!(Speed::Slow.interval_ms(), 2000);
        assert_eq!(Speed::Normal.interval_ms(), 1000);
        assert_eq!(Speed::Fast.interval_ms(), 500);
    }
}
