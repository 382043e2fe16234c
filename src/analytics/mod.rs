// SPDX-License-Identifier: MIT

//! Run analytics aggregation
//!
//! [`AnalyticsSnapshot`] is the persisted, cumulative view of all runs:
//! global counters, per-workflow stats, and a bounded execution history.
//! [`AnalyticsSnapshot::record`] is a pure fold of one run outcome into
//! the snapshot; the store persists the result in a single write.
//!
//! The running mean is weighted by the pre-increment run count. The
//! sum-like counters are order-independent; the mean is not.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Execution history keeps the most recent 50 runs
pub const HISTORY_LIMIT: usize = 50;

/// The result record of one completed run
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RunOutcome {
    pub workflow_id: String,
    pub success: bool,
    pub steps_completed: u64,
    /// Elapsed wall time in milliseconds
    pub duration: u64,
}

/// One entry in the execution history
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRecord {
    pub workflow_id: String,
    pub success: bool,
    pub steps_completed: u64,
    pub duration: u64,
    pub timestamp: DateTime<Utc>,
}

/// Cumulative counters for a single workflow
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStats {
    pub runs: u64,
    pub successful: u64,
    pub failed: u64,
    pub total_steps: u64,
    pub total_duration: u64,
}

impl WorkflowStats {
    /// Mean duration over this workflow's runs, 0 when there are none
    pub fn average_duration(&self) -> u64 {
        if self.runs > 0 {
            (self.total_duration as f64 / self.runs as f64).round() as u64
        } else {
            0
        }
    }
}

/// The persisted analytics snapshot
///
/// Every field is serde-defaulted so a partially written or older
/// document still parses; the zero value doubles as the cleared state.
/// `workflow_stats` preserves insertion order of first-seen workflow id,
/// which fixes CSV row order.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSnapshot {
    #[serde(default)]
    pub total_runs: u64,
    #[serde(default)]
    pub successful_runs: u64,
    #[serde(default)]
    pub failed_runs: u64,
    #[serde(default)]
    pub total_steps_completed: u64,
    /// Running mean of run durations in milliseconds
    #[serde(default)]
    pub average_duration: u64,
    #[serde(default)]
    pub workflow_stats: IndexMap<String, WorkflowStats>,
    #[serde(default)]
    pub execution_history: Vec<ExecutionRecord>,
}

impl AnalyticsSnapshot {
    /// Fold one outcome into the snapshot.
    ///
    /// Counters first, then the per-workflow upsert, then the history
    /// append with front eviction past [`HISTORY_LIMIT`], then the
    /// running mean weighted by the pre-increment run count.
    pub fn record(&mut self, outcome: &RunOutcome, timestamp: DateTime<Utc>) {
        let runs_before = self.total_runs;

        self.total_runs += 1;
        if outcome.success {
            self.successful_runs += 1;
        } else {
            self.failed_runs += 1;
        }
        self.total_steps_completed += outcome.steps_completed;

        let stats = self
            .workflow_stats
            .entry(outcome.workflow_id.clone())
            .or_default();
        stats.runs += 1;
        if outcome.success {
            stats.successful += 1;
        } else {
            stats.failed += 1;
        }
        stats.total_steps += outcome.steps_completed;
        stats.total_duration += outcome.duration;

        self.execution_history.push(ExecutionRecord {
            workflow_id: outcome.workflow_id.clone(),
            success: outcome.success,
            steps_completed: outcome.steps_completed,
            duration: outcome.duration,
            timestamp,
        });
        if self.execution_history.len() > HISTORY_LIMIT {
            let excess = self.execution_history.len() - HISTORY_LIMIT;
            self.execution_history.drain(..excess);
        }

        self.average_duration = ((self.average_duration as f64 * runs_before as f64
            + outcome.duration as f64)
            / self.total_runs as f64)
            .round() as u64;
    }

    /// Render the legacy CSV layout: global metrics, a blank line, then
    /// the per-workflow table in insertion order.
    pub fn to_csv(&self) -> String {
        let mut csv = String::from("Metric,Value\n");
        csv.push_str(&format!("Total Runs,{}\n", self.total_runs));
        csv.push_str(&format!("Successful Runs,{}\n", self.successful_runs));
        csv.push_str(&format!("Failed Runs,{}\n", self.failed_runs));
        csv.push_str(&format!(
            "Total Steps Completed,{}\n",
            self.total_steps_completed
        ));
        csv.push_str(&format!("Average Duration (ms),{}\n", self.average_duration));
        csv.push_str("\nWorkflow Stats\n");
        csv.push_str("Workflow ID,Runs,Successful,Failed,Total Steps,Avg Duration\n");

        for (id, stats) in &self.workflow_stats {
            csv.push_str(&format!(
                "{},{},{},{},{},{}\n",
                id,
                stats.runs,
                stats.successful,
                stats.failed,
                stats.total_steps,
                stats.average_duration()
            ));
        }

        csv
    }
}
