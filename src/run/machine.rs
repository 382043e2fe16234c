// SPDX-License-Identifier: MIT

//! Run state machine
//!
//! [`RunMachine`] owns the lifecycle of one workflow execution: the
//! transient [`RunState`], the session log, and the ticker task that
//! drives playback. Commands come in from the presentation layer
//! (select/start/pause/reset/set_speed); completed runs are reported to
//! the store's analytics contract.
//!
//! Illegal transitions are deliberately silent no-ops. The ticker is a
//! cancellable tokio task: it is aborted on reset, exits on its own
//! after completion or failure, and keeps firing while paused with every
//! tick suppressed by the mode check.

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;

use crate::catalog::WorkflowDefinition;
use crate::run::clock::{Clock, SystemClock};
use crate::run::failure::{FailurePolicy, NeverFail};
use crate::run::state::{LogEntry, LogLevel, RunMode, RunState, Speed, TickOutcome};
use crate::store::Store;

/// Drives one workflow execution at a time
///
/// Cheap to clone; clones share the same underlying run.
#[derive(Clone)]
pub struct RunMachine {
    store: Arc<Store>,
    clock: Arc<dyn Clock>,
    failure: Arc<dyn FailurePolicy>,
    state: Arc<RwLock<RunState>>,
    logs: Arc<RwLock<Vec<LogEntry>>>,
    speed: Arc<RwLock<Speed>>,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl RunMachine {
    /// Machine with the wall clock and the never-fail policy. The
    /// initial speed comes from the persisted settings.
    pub fn new(store: Arc<Store>) -> Self {
        Self::with_components(store, Arc::new(SystemClock), Arc::new(NeverFail))
    }

    /// Machine with injected clock and failure policy (tests, CLI flags)
    pub fn with_components(
        store: Arc<Store>,
        clock: Arc<dyn Clock>,
        failure: Arc<dyn FailurePolicy>,
    ) -> Self {
        let speed = store.settings().default_speed;
        Self {
            store,
            clock,
            failure,
            state: Arc::new(RwLock::new(RunState::empty())),
            logs: Arc::new(RwLock::new(Vec::new())),
            speed: Arc::new(RwLock::new(speed)),
            ticker: Arc::new(Mutex::new(None)),
        }
    }

    // ----- Observables -----

    pub async fn state(&self) -> RunState {
        self.state.read().await.clone()
    }

    pub async fn logs(&self) -> Vec<LogEntry> {
        self.logs.read().await.clone()
    }

    pub async fn speed(&self) -> Speed {
        *self.speed.read().await
    }

    pub async fn clear_logs(&self) {
        self.logs.write().await.clear();
    }

    // ----- Commands -----

    /// Select a workflow and build a fresh run for it. No-op while a run
    /// is active; re-selecting while idle re-initializes the steps.
    pub async fn select(&self, workflow: &WorkflowDefinition) {
        {
            let mut state = self.state.write().await;
            if state.mode != RunMode::Idle {
                return;
            }
            *state = RunState::for_workflow(workflow);
        }
        self.logs.write().await.clear();
        self.push_log(
            format!("Selected workflow: {}", workflow.name),
            LogLevel::Info,
        )
        .await;
        log::info!("Selected workflow '{}'", workflow.id);
    }

    /// Drop the selection entirely (after deleting the selected
    /// workflow). No-op unless idle.
    pub async fn clear_selection(&self) {
        let mut state = self.state.write().await;
        if state.mode != RunMode::Idle {
            return;
        }
        *state = RunState::empty();
    }

    /// Begin playback. Requires a selection and idle mode; otherwise a
    /// no-op.
    pub async fn start(&self) {
        {
            let mut state = self.state.write().await;
            if !state.has_selection() || state.mode != RunMode::Idle {
                return;
            }
            state.mode = RunMode::Running;
            state.started_at = Some(self.clock.now());
        }
        self.push_log("Simulation started", LogLevel::Info).await;
        self.spawn_ticker().await;
    }

    /// Toggle running and paused. No-op while idle. Ticks keep firing
    /// while paused and are suppressed, not canceled.
    pub async fn pause(&self) {
        let entered_pause = {
            let mut state = self.state.write().await;
            match state.mode {
                RunMode::Running => {
                    state.mode = RunMode::Paused;
                    Some(true)
                }
                RunMode::Paused => {
                    state.mode = RunMode::Running;
                    Some(false)
                }
                RunMode::Idle => None,
            }
        };
        match entered_pause {
            Some(true) => self.push_log("Simulation paused", LogLevel::Warning).await,
            Some(false) => self.push_log("Simulation resumed", LogLevel::Warning).await,
            None => {}
        }
    }

    /// Abort the run: back to idle with all steps pending. Requires a
    /// selection; legal from any mode. No outcome is recorded.
    pub async fn reset(&self) {
        {
            let mut state = self.state.write().await;
            if !state.has_selection() {
                return;
            }
            state.reset();
        }
        self.stop_ticker().await;
        self.push_log("Simulation reset", LogLevel::Info).await;
    }

    /// Change the tick interval. Takes effect on the next scheduling
    /// cycle without resetting progress.
    pub async fn set_speed(&self, speed: Speed) {
        *self.speed.write().await = speed;
    }

    /// Resolve once the run has stopped (completion, failure, or reset)
    pub async fn wait_until_idle(&self) {
        loop {
            if self.state.read().await.mode == RunMode::Idle {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        }
    }

    // ----- Ticker -----

    async fn spawn_ticker(&self) {
        let mut guard = self.ticker.lock().await;
        if let Some(stale) = guard.take() {
            stale.abort();
        }
        let machine = self.clone();
        *guard = Some(tokio::spawn(async move {
            loop {
                let interval = machine.speed.read().await.interval();
                tokio::time::sleep(interval).await;
                if !machine.tick_once().await {
                    break;
                }
            }
        }));
    }

    async fn stop_ticker(&self) {
        if let Some(handle) = self.ticker.lock().await.take() {
            handle.abort();
        }
    }

    /// Apply one tick. Returns false when the ticker should stop.
    async fn tick_once(&self) -> bool {
        // The failure setting is read through the store on every tick,
        // never cached across ticks.
        let enable_failure = self.store.settings().enable_step_failure;
        let now = self.clock.now();

        let (result, step_title) = {
            let mut state = self.state.write().await;
            let fail_next = enable_failure && state.mode == RunMode::Running && {
                let next = (state.current_step_index + 1) as usize;
                next < state.steps.len()
                    && self
                        .failure
                        .should_fail(state.workflow_id.as_deref().unwrap_or(""), next)
            };
            let result = state.advance(now, fail_next);
            let title = match &result {
                TickOutcome::Advanced { index } | TickOutcome::Failed { index, .. } => {
                    state.steps.get(*index).map(|s| s.title.clone())
                }
                _ => None,
            };
            (result, title)
        };

        match result {
            TickOutcome::Stale => {
                // Suppressed while paused; a tick observed after the run
                // already stopped ends the ticker.
                self.state.read().await.mode == RunMode::Paused
            }
            TickOutcome::Advanced { .. } => {
                self.push_log(
                    format!("Starting: {}", step_title.unwrap_or_default()),
                    LogLevel::Info,
                )
                .await;
                true
            }
            TickOutcome::Failed { outcome, .. } => {
                self.push_log(
                    format!("Step failed: {}", step_title.unwrap_or_default()),
                    LogLevel::Error,
                )
                .await;
                self.record_outcome(outcome).await;
                false
            }
            TickOutcome::Completed { outcome } => {
                self.push_log("Simulation completed successfully!", LogLevel::Success)
                    .await;
                self.record_outcome(outcome).await;
                false
            }
        }
    }

    async fn record_outcome(&self, outcome: crate::analytics::RunOutcome) {
        match self.store.record_run(&outcome) {
            Ok(snapshot) => log::info!(
                "Recorded run of '{}' ({} total)",
                outcome.workflow_id,
                snapshot.total_runs
            ),
            Err(e) => log::error!("Failed to record run outcome: {}", e),
        }
    }

    async fn push_log(&self, message: impl Into<String>, level: LogLevel) {
        self.logs
            .write()
            .await
            .push(LogEntry::new(message, level, self.clock.now()));
    }
}
