// Copyright (c) The playrecap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Core functionality for playrecap: turns the task lifecycle events of a test playbook run into a
//! timed, per-test pass/fail report.
//!
//! The basic flow is: [`wire::EventReader`] decodes events, a [`session::Session`] resolves each
//! task to a [test identifier](test_id::TestId) through the [`resolver`], updates the
//! [`ledger`], and writes output through the [`reporter`].

pub mod config;
pub mod errors;
pub mod events;
pub mod exit_codes;
pub mod ledger;
pub mod reporter;
pub mod resolver;
pub mod session;
pub mod test_id;
pub mod wire;
pub mod write_str;
