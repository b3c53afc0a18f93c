// Copyright (c) The playrecap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Writes report output to its destination.
//!
//! The main structure in this module is [`Reporter`].

use super::displayer::{DisplayLayout, DisplayReporter};
use crate::{errors::WriteEventError, write_str::WriteStr};
use std::io::{self, BufWriter};

/// Destination for the report.
///
/// This is usually a terminal, but can be an in-memory buffer for tests.
pub enum ReporterOutput<'a> {
    /// Produce output on the (possibly piped) standard output.
    Terminal,

    /// Write output to a buffer.
    Buffer(&'a mut String),
}

/// Reporter builder.
#[derive(Debug, Default)]
pub struct ReporterBuilder {
    should_colorize: bool,
    layout: DisplayLayout,
}

impl ReporterBuilder {
    /// Set to true if the reporter should colorize output.
    pub fn set_colorize(&mut self, should_colorize: bool) -> &mut Self {
        self.should_colorize = should_colorize;
        self
    }

    /// Sets the widths used for separators, banners and the recap.
    pub fn set_layout(&mut self, layout: DisplayLayout) -> &mut Self {
        self.layout = layout;
        self
    }

    /// Creates a new reporter writing to `output`.
    pub fn build<'a>(&self, output: ReporterOutput<'a>) -> Reporter<'a> {
        let use_unicode = match output {
            ReporterOutput::Terminal => supports_unicode::on(supports_unicode::Stream::Stdout),
            // Always use Unicode for internal buffers.
            ReporterOutput::Buffer(_) => true,
        };

        Reporter {
            display: DisplayReporter::new(self.should_colorize, use_unicode, self.layout),
            output,
        }
    }
}

/// Writes formatted report output to its destination.
pub struct Reporter<'a> {
    display: DisplayReporter,
    output: ReporterOutput<'a>,
}

impl Reporter<'_> {
    /// Formats one unit of output with the display reporter and writes it out.
    ///
    /// Terminal output is flushed after every call, so that each event shows up as it arrives.
    pub(crate) fn write_with<F>(&mut self, f: F) -> Result<(), WriteEventError>
    where
        F: FnOnce(&DisplayReporter, &mut dyn WriteStr) -> io::Result<()>,
    {
        match &mut self.output {
            ReporterOutput::Terminal => {
                let mut writer = BufWriter::new(io::stdout());
                f(&self.display, &mut writer).map_err(WriteEventError::Io)?;
                writer.write_str_flush().map_err(WriteEventError::Io)
            }
            ReporterOutput::Buffer(buf) => {
                f(&self.display, &mut **buf).map_err(WriteEventError::Io)
            }
        }
    }
}
