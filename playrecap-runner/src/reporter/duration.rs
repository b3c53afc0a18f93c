// Copyright (c) The playrecap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Display helpers for durations.

use std::{fmt, time::Duration};

/// Displays an elapsed time the way the report shows it.
///
/// Durations under a minute are shown in seconds with one decimal place (`59.9s`); longer
/// durations are shown in whole minutes and seconds (`2m 5s`), truncating fractional seconds.
#[derive(Copy, Clone, Debug)]
pub struct DisplayElapsed(pub Duration);

impl fmt::Display for DisplayElapsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.0.as_secs_f64();
        if secs < 60.0 {
            // Rounding to one decimal would carry [59.95, 60) into "60.0s". The seconds form
            // never shows a full minute.
            let shown = if secs >= 59.95 { 59.9 } else { secs };
            write!(f, "{shown:.1}s")
        } else {
            let total_secs = self.0.as_secs();
            write!(f, "{}m {}s", total_secs / 60, total_secs % 60)
        }
    }
}
