// Copyright (c) The playrecap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::output::{NO_HEADING_TARGET, StderrStyles};
use camino::Utf8PathBuf;
use owo_colors::OwoColorize;
use playrecap_runner::{
    errors::{ConfigParseError, EventReadError, WriteEventError},
    exit_codes::PlayRecapExitCode,
};
use std::{error::Error, path::PathBuf};
use thiserror::Error;
use tracing::error;

pub(crate) type Result<T, E = ExpectedError> = std::result::Result<T, E>;

// Note that the #[error()] strings are mostly placeholder messages -- the expected way to print out
// errors is with the display_to_stderr method, which colorizes errors.

/// An expected error: one caused by the environment or the input rather than a bug in playrecap.
#[derive(Debug, Error)]
#[doc(hidden)]
pub enum ExpectedError {
    #[error("could not determine current directory")]
    CurrentDirFailed {
        #[source]
        error: std::io::Error,
    },
    #[error("current directory is not valid UTF-8")]
    CurrentDirInvalidUtf8 { path: PathBuf },
    #[error("config parse error")]
    ConfigParseError {
        #[from]
        err: ConfigParseError,
    },
    #[error("failed to open input")]
    InputOpenError {
        path: Utf8PathBuf,
        #[source]
        error: std::io::Error,
    },
    #[error("event stream error")]
    EventReadError {
        #[from]
        err: EventReadError,
    },
    #[error("error writing report")]
    WriteEventError {
        #[from]
        err: WriteEventError,
    },
    #[error("error writing output")]
    WriteOutputError {
        #[source]
        error: std::io::Error,
    },
}

impl ExpectedError {
    pub(crate) fn input_open_error(path: impl Into<Utf8PathBuf>, error: std::io::Error) -> Self {
        Self::InputOpenError {
            path: path.into(),
            error,
        }
    }

    /// Returns the exit code for the process.
    pub fn process_exit_code(&self) -> i32 {
        match self {
            Self::CurrentDirFailed { .. }
            | Self::CurrentDirInvalidUtf8 { .. }
            | Self::ConfigParseError { .. }
            | Self::InputOpenError { .. } => PlayRecapExitCode::SETUP_ERROR,
            Self::EventReadError { .. } => PlayRecapExitCode::EVENT_STREAM_INVALID,
            Self::WriteEventError { .. } | Self::WriteOutputError { .. } => {
                PlayRecapExitCode::WRITE_OUTPUT_ERROR
            }
        }
    }

    /// Displays this error to stderr.
    pub fn display_to_stderr(&self, styles: &StderrStyles) {
        let mut next_error = match self {
            Self::CurrentDirFailed { error } => {
                error!("could not determine current directory");
                Some(error as &dyn Error)
            }
            Self::CurrentDirInvalidUtf8 { path } => {
                error!(
                    "current directory `{}` is not valid UTF-8",
                    path.display().style(styles.bold)
                );
                None
            }
            Self::ConfigParseError { err } => {
                error!(
                    "failed to parse config at `{}`",
                    err.config_file().style(styles.bold)
                );
                Some(err.inner() as &dyn Error)
            }
            Self::InputOpenError { path, error } => {
                error!("failed to open input `{}`", path.style(styles.bold));
                Some(error as &dyn Error)
            }
            Self::EventReadError { err } => {
                error!("failed to read event stream");
                Some(err as &dyn Error)
            }
            Self::WriteEventError { err } => {
                error!("failed to write report");
                Some(err as &dyn Error)
            }
            Self::WriteOutputError { error } => {
                error!("failed to write output");
                Some(error as &dyn Error)
            }
        };

        while let Some(err) = next_error {
            error!(target: NO_HEADING_TARGET, "\nCaused by:\n  {}", err);
            next_error = err.source();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes() {
        let io_error = || std::io::Error::other("boom");
        assert_eq!(
            ExpectedError::input_open_error("events.jsonl", io_error()).process_exit_code(),
            PlayRecapExitCode::SETUP_ERROR
        );
        assert_eq!(
            ExpectedError::from(WriteEventError::Io(io_error())).process_exit_code(),
            PlayRecapExitCode::WRITE_OUTPUT_ERROR
        );
        assert_eq!(
            ExpectedError::from(EventReadError::Io {
                line_number: 3,
                error: io_error(),
            })
            .process_exit_code(),
            PlayRecapExitCode::EVENT_STREAM_INVALID
        );
    }
}
