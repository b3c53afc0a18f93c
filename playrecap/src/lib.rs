// Copyright (c) The playrecap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns the event stream of a test playbook run into a timed, per-test pass/fail report.
//!
//! This crate holds the `playrecap` command-line interface. The session tracking and report
//! rendering live in [`playrecap_runner`].

#![warn(missing_docs)]

mod dispatch;
mod errors;
mod output;

#[doc(hidden)]
pub use dispatch::*;
#[doc(hidden)]
pub use errors::*;
#[doc(hidden)]
pub use output::{Color, OutputContext, OutputWriter, StderrStyles};
