// SPDX-License-Identifier: MIT

//! flowsim - a headless workflow playback simulator
//!
//! A workflow is a named, ordered sequence of steps. The simulator plays
//! one back step-by-step on a timer, accumulates run statistics across
//! sessions, and persists settings, custom workflows, and analytics
//! behind a keyed store with a portable export/import document.
//!
//! The crate is the core only; presentation (the `flowsim` binary here,
//! a UI elsewhere) consumes it by issuing commands to [`run::RunMachine`]
//! and the [`store::Store`] contract and rendering their observable
//! state.

pub mod analytics;
pub mod catalog;
pub mod error;
pub mod run;
pub mod store;

pub use error::FlowsimError;
