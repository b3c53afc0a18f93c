// Copyright (c) The playrecap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command-line parsing and command routing.

use crate::{
    ExpectedError, Result,
    output::{OutputContext, OutputOpts, OutputWriter},
};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, Parser, Subcommand};
use playrecap_runner::{
    config::RecapConfig,
    events::{FinalStats, PlayEvent, TaskDescriptor},
    exit_codes::PlayRecapExitCode,
    reporter::ReporterBuilder,
    session::Session,
    wire::EventReader,
    write_str::WriteStr,
};
use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    time::Instant,
};
use tracing::{info, warn};

/// Turns the event stream of a test playbook run into a timed, per-test pass/fail report.
///
/// Events are read as JSON lines, one event per line.
#[derive(Debug, Parser)]
#[command(
    version,
    styles = crate::output::clap_styles::style(),
    max_term_width = 100,
)]
pub struct PlayRecapApp {
    #[clap(flatten)]
    output: OutputOpts,

    #[clap(subcommand)]
    command: Command,
}

impl PlayRecapApp {
    /// Initializes the output context.
    pub fn init_output(&self) -> OutputContext {
        self.output.init()
    }

    /// Executes the app.
    ///
    /// Returns the exit code.
    pub fn exec(self, output: OutputContext, output_writer: &mut OutputWriter) -> Result<i32> {
        match self.command {
            Command::Report(opts) => opts.exec(output, output_writer),
            Command::Resolve(opts) => opts.exec(output_writer),
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Render a report from an event stream
    ///
    /// Reads events until the stream ends or final statistics arrive, writing output for each
    /// event as it is read. Exits with a non-zero code if any test failed.
    Report(ReportOpts),

    /// Show which test a task belongs to
    ///
    /// Prints the test identifier, or `none` if the task is outside any test.
    Resolve(ResolveOpts),
}

#[derive(Debug, Args)]
struct ConfigOpts {
    /// Config file [default: .config/playrecap.toml]
    #[arg(long = "config", value_name = "PATH")]
    config_file: Option<Utf8PathBuf>,
}

impl ConfigOpts {
    fn make_config(&self) -> Result<RecapConfig> {
        let current_dir = current_dir()?;
        Ok(RecapConfig::from_sources(
            &current_dir,
            self.config_file.as_deref(),
        )?)
    }
}

#[derive(Debug, Args)]
struct ReportOpts {
    /// Event stream to read, or `-` for standard input
    #[arg(long, short, value_name = "PATH", default_value = "-")]
    input: Utf8PathBuf,

    /// Fail on the first malformed event instead of skipping it
    #[arg(long)]
    strict: bool,

    #[clap(flatten)]
    config_opts: ConfigOpts,
}

impl ReportOpts {
    fn exec(self, output: OutputContext, output_writer: &mut OutputWriter) -> Result<i32> {
        let config = self.config_opts.make_config()?;
        let input = open_input(&self.input)?;

        let mut builder = ReporterBuilder::default();
        builder
            .set_colorize(output.color.should_colorize(supports_color::Stream::Stdout))
            .set_layout(config.layout());
        let reporter = builder.build(output_writer.reporter_output());

        let mut session = Session::new(&config, reporter, Instant::now());
        let mut skipped = 0;
        for event in EventReader::new(input) {
            match event {
                Ok(kind) => {
                    session.handle_event(&PlayEvent::new(Instant::now(), kind))?;
                }
                Err(err) if err.is_parse() && !self.strict => {
                    warn!("{err} ({}), skipping", DisplaySource(&err));
                    skipped += 1;
                }
                Err(err) => return Err(err.into()),
            }
        }

        let summary = session.finalize(&FinalStats::default(), Instant::now())?;
        if skipped > 0 {
            warn!("skipped {skipped} malformed {}", plural(skipped, "event", "events"));
        }
        if output.verbose {
            info!(
                "{} passed, {} failed, {} {} with failures",
                summary.passed,
                summary.failed,
                summary.failed_hosts,
                plural(summary.failed_hosts, "host", "hosts"),
            );
        }

        Ok(if summary.is_success() {
            PlayRecapExitCode::OK
        } else {
            PlayRecapExitCode::TEST_RUN_FAILED
        })
    }
}

#[derive(Debug, Args)]
struct ResolveOpts {
    /// A tag declared on the task (can be specified multiple times)
    #[arg(long = "tag", value_name = "TAG")]
    tags: Vec<String>,

    /// The task name, as reported by the engine
    #[arg(long, default_value = "")]
    name: String,

    #[clap(flatten)]
    config_opts: ConfigOpts,
}

impl ResolveOpts {
    fn exec(self, output_writer: &mut OutputWriter) -> Result<i32> {
        let config = self.config_opts.make_config()?;
        let resolver = config.resolver();
        let task = TaskDescriptor::new(self.name).with_tags(self.tags);

        let mut writer = output_writer.stdout_writer();
        let written = match resolver.resolve(&task) {
            Some(id) => writeln!(writer, "{id}"),
            None => writeln!(writer, "none"),
        };
        written
            .and_then(|()| writer.write_str_flush())
            .map_err(|error| ExpectedError::WriteOutputError { error })?;

        Ok(PlayRecapExitCode::OK)
    }
}

fn current_dir() -> Result<Utf8PathBuf> {
    let current_dir =
        std::env::current_dir().map_err(|error| ExpectedError::CurrentDirFailed { error })?;
    Utf8PathBuf::try_from(current_dir)
        .map_err(|err| ExpectedError::CurrentDirInvalidUtf8 {
            path: err.into_path_buf(),
        })
}

fn open_input(path: &Utf8Path) -> Result<Box<dyn BufRead>> {
    if path == "-" {
        return Ok(Box::new(io::stdin().lock()));
    }
    let file = File::open(path).map_err(|error| ExpectedError::input_open_error(path, error))?;
    Ok(Box::new(BufReader::new(file)))
}

fn plural(n: usize, singular: &'static str, plural: &'static str) -> &'static str {
    if n == 1 { singular } else { plural }
}

struct DisplaySource<'a>(&'a dyn std::error::Error);

impl std::fmt::Display for DisplaySource<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0.source() {
            Some(source) => write!(f, "{source}"),
            None => f.write_str("(no details)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        let app = PlayRecapApp::try_parse_from([
            "playrecap",
            "--color",
            "never",
            "report",
            "--input",
            "events.jsonl",
            "--strict",
        ])
        .expect("valid arguments");
        let Command::Report(opts) = app.command else {
            panic!("expected the report command");
        };
        assert_eq!(opts.input, "events.jsonl");
        assert!(opts.strict);

        let app = PlayRecapApp::try_parse_from([
            "playrecap",
            "resolve",
            "--tag",
            "cleanup",
            "--tag",
            "BOND-001",
            "--config",
            "custom.toml",
        ])
        .expect("valid arguments");
        let Command::Resolve(opts) = app.command else {
            panic!("expected the resolve command");
        };
        assert_eq!(opts.tags, ["cleanup", "BOND-001"]);
        assert_eq!(opts.name, "");
        assert_eq!(
            opts.config_opts.config_file.as_deref(),
            Some(Utf8Path::new("custom.toml"))
        );
    }

    #[test]
    fn report_reads_stdin_by_default() {
        let app = PlayRecapApp::try_parse_from(["playrecap", "report"]).expect("valid arguments");
        let Command::Report(opts) = app.command else {
            panic!("expected the report command");
        };
        assert_eq!(opts.input, "-");
        assert!(!opts.strict);
    }

    #[test]
    fn verify_app() {
        use clap::CommandFactory;
        PlayRecapApp::command().debug_assert();
    }
}
