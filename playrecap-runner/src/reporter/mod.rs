// Copyright (c) The playrecap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Renders the human-readable report.
//!
//! The main type here is [`Reporter`], which is constructed via a [`ReporterBuilder`].

mod displayer;
mod duration;
mod helpers;
mod imp;

pub use displayer::DisplayLayout;
pub(crate) use displayer::SuccessDisplay;
pub use duration::DisplayElapsed;
pub use imp::*;
