// Copyright (c) The playrecap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by playrecap.
//!
//! Nothing in the session tracker itself fails on malformed or partial events: those degrade to
//! best-effort output. The errors here cover the edges of the system: reading configuration,
//! decoding the event stream, and writing the report.

use camino::{Utf8Path, Utf8PathBuf};
use config::ConfigError;
use thiserror::Error;

/// An error that occurred while parsing the config.
#[derive(Debug, Error)]
#[error("failed to parse playrecap config at `{config_file}`")]
#[non_exhaustive]
pub struct ConfigParseError {
    config_file: Utf8PathBuf,
    #[source]
    err: ConfigError,
}

impl ConfigParseError {
    pub(crate) fn new(config_file: impl Into<Utf8PathBuf>, err: ConfigError) -> Self {
        Self {
            config_file: config_file.into(),
            err,
        }
    }

    /// Returns the config file for this error.
    pub fn config_file(&self) -> &Utf8Path {
        &self.config_file
    }

    /// Returns the underlying error.
    pub fn inner(&self) -> &ConfigError {
        &self.err
    }
}

/// A string that does not match the test identifier grammar.
#[derive(Clone, Debug, Error)]
#[error(
    "invalid test identifier `{input}` \
     (expected uppercase segments joined by `-`, ending in a number, e.g. `BOND-001`)"
)]
pub struct InvalidTestId {
    input: String,
}

impl InvalidTestId {
    pub(crate) fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }

    /// Returns the input that failed to parse.
    pub fn input(&self) -> &str {
        &self.input
    }
}

/// An error that occurred while reading the event stream.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EventReadError {
    /// Reading from the underlying stream failed.
    #[error("error reading event stream after line {line_number}")]
    Io {
        /// The number of the last line read successfully.
        line_number: usize,

        /// The underlying error.
        #[source]
        error: std::io::Error,
    },

    /// A line could not be decoded as an event.
    #[error("line {line_number}: malformed event")]
    Parse {
        /// The 1-based line number.
        line_number: usize,

        /// The underlying error.
        #[source]
        error: serde_json::Error,
    },
}

impl EventReadError {
    /// Returns the line number this error is attributed to.
    pub fn line_number(&self) -> usize {
        match self {
            Self::Io { line_number, .. } | Self::Parse { line_number, .. } => *line_number,
        }
    }

    /// Returns true if this is a decoding error rather than an I/O error.
    ///
    /// Decoding errors are recoverable: the next line can still be read.
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }
}

/// An error that occurs while writing an event.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WriteEventError {
    /// An error occurred while writing the event to the provided output.
    #[error("error writing to output")]
    Io(#[source] std::io::Error),
}
