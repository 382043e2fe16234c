// SPDX-License-Identifier: MIT

//! Run lifecycle: state, clock, failure simulation, and the machine

pub mod clock;
pub mod failure;
pub mod machine;
pub mod state;

pub use clock::{Clock, SystemClock};
pub use failure::{FailurePolicy, NeverFail, RandomFailure};
pub use machine::RunMachine;
pub use state::{LogEntry, LogLevel, RunMode, RunState, RunStep, Speed, StepStatus, TickOutcome};
