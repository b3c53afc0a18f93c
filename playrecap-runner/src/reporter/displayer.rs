// Copyright (c) The playrecap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Formats report lines.
//!
//! Everything here is a pure function of its inputs: per-host action lines, per-test footers, and
//! the end-of-session recap. Missing payload fields render as nothing rather than as errors.

use super::{
    duration::DisplayElapsed,
    helpers::{Styles, ThemeCharacters},
};
use crate::{
    events::{ActionKind, FinalStats, OutcomeEvent},
    ledger::{ClosedTest, TestLedger, TestStatus},
    write_str::WriteStr,
};
use owo_colors::{OwoColorize, Style};
use std::{io, time::Duration};

/// Layout settings for the display reporter.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DisplayLayout {
    /// The width of the separator printed after each test.
    pub footer_width: usize,

    /// The width of banners such as `PLAY RECAP`.
    pub banner_width: usize,

    /// The column width of test identifiers in the recap.
    pub recap_id_width: usize,
}

impl Default for DisplayLayout {
    fn default() -> Self {
        Self {
            footer_width: 72,
            banner_width: 80,
            recap_id_width: 20,
        }
    }
}

/// Which flavor of success line a task gets.
///
/// Computed once per success event from the action kind and task flags.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum SuccessDisplay {
    /// Nothing is shown.
    Hidden,
    /// `name [host] ok`, for tasks whose output must not be logged.
    NoLog,
    /// `name [host] changed|ok`.
    ChangedOrOk,
    /// The pushed configuration commands.
    Config,
    /// The declared remote commands and their output.
    Command,
    /// `name [host] PASS`.
    Assert,
    /// The diagnostic message.
    Debug,
}

impl SuccessDisplay {
    pub(crate) fn new(outcome: &OutcomeEvent, is_cleanup: bool) -> Self {
        // The order matters: variable assignment is silent even when it can't be logged, and
        // cleanup tasks always get the short form.
        if outcome.action == ActionKind::SetFact {
            return Self::Hidden;
        }
        if outcome.no_log {
            return Self::NoLog;
        }
        if is_cleanup {
            return Self::ChangedOrOk;
        }
        match outcome.action {
            ActionKind::Config => Self::Config,
            ActionKind::Command => Self::Command,
            ActionKind::Assert => Self::Assert,
            ActionKind::Debug => Self::Debug,
            ActionKind::SetFact | ActionKind::Other(_) => Self::ChangedOrOk,
        }
    }
}

pub(crate) struct DisplayReporter {
    styles: Box<Styles>,
    theme_characters: ThemeCharacters,
    layout: DisplayLayout,
}

impl DisplayReporter {
    pub(crate) fn new(should_colorize: bool, use_unicode: bool, layout: DisplayLayout) -> Self {
        let mut styles: Box<Styles> = Box::default();
        if should_colorize {
            styles.colorize();
        }
        let mut theme_characters = ThemeCharacters::default();
        if use_unicode {
            theme_characters.use_unicode();
        }
        Self {
            styles,
            theme_characters,
            layout,
        }
    }

    /// Writes a banner: an empty line, then the title followed by a row of stars.
    pub(crate) fn write_banner(&self, title: &str, writer: &mut dyn WriteStr) -> io::Result<()> {
        let title = title.trim();
        let stars = self
            .layout
            .banner_width
            .saturating_sub(title.chars().count())
            .max(3);
        writeln!(writer)?;
        writeln!(writer, "{} {}", title, "*".repeat(stars))
    }

    pub(crate) fn write_play_start(&self, name: &str, writer: &mut dyn WriteStr) -> io::Result<()> {
        let name = name.trim();
        if name.is_empty() {
            self.write_banner("PLAY", writer)
        } else {
            self.write_banner(&format!("PLAY [{name}]"), writer)
        }
    }

    pub(crate) fn write_success(
        &self,
        display_name: &str,
        outcome: &OutcomeEvent,
        display: SuccessDisplay,
        writer: &mut dyn WriteStr,
    ) -> io::Result<()> {
        let styles = &self.styles;
        let host = &outcome.host;
        let result = &outcome.result;

        match display {
            SuccessDisplay::Hidden => Ok(()),
            SuccessDisplay::NoLog => {
                write_header(display_name, host, Some("ok"), styles.ok, writer)
            }
            SuccessDisplay::ChangedOrOk => {
                let suffix = if result.changed { "changed" } else { "ok" };
                let style = styles.changed_or_ok(result.changed);
                write_header(display_name, host, Some(suffix), style, writer)
            }
            SuccessDisplay::Config => {
                let style = styles.changed_or_ok(result.changed);
                write_header(display_name, host, None, style, writer)?;
                if result.commands.is_empty() {
                    writeln!(writer, "{}", "  (no changes)".style(styles.ok))?;
                }
                for command in &result.commands {
                    writeln!(writer, "{}", format_args!("  {command}").style(style))?;
                }
                Ok(())
            }
            SuccessDisplay::Command => {
                write_header(display_name, host, None, styles.ok, writer)?;
                for (i, block) in result.stdout.iter().enumerate() {
                    if let Some(command) = outcome.task.commands.get(i) {
                        writeln!(writer, "{}", format_args!("  > {command}").style(styles.ok))?;
                    }
                    write_indented(block, Style::new(), writer)?;
                }
                Ok(())
            }
            SuccessDisplay::Assert => {
                write_header(display_name, host, Some("PASS"), styles.ok, writer)
            }
            SuccessDisplay::Debug => {
                write_header(display_name, host, None, styles.ok, writer)?;
                if let Some(msg) = &result.msg {
                    write_indented(msg.as_str(), Style::new(), writer)?;
                }
                Ok(())
            }
        }
    }

    pub(crate) fn write_failure(
        &self,
        display_name: &str,
        outcome: &OutcomeEvent,
        writer: &mut dyn WriteStr,
    ) -> io::Result<()> {
        let error = self.styles.error;
        let result = &outcome.result;

        if outcome.action == ActionKind::Assert {
            let msg = result
                .msg
                .as_ref()
                .map_or("assertion failed", |msg| msg.as_str());
            write_header(display_name, &outcome.host, Some("FAIL"), error, writer)?;
            writeln!(writer, "{}", format_args!("  {msg}").style(error))?;
        } else {
            write_header(display_name, &outcome.host, Some("FAILED"), error, writer)?;
            for text in [&result.msg, &result.stderr, &result.module_stderr]
                .into_iter()
                .flatten()
            {
                write_indented(text.as_str(), error, writer)?;
            }
            write_indented(&result.stdout.joined(), error, writer)?;
        }

        if outcome.ignore_errors {
            writeln!(writer, "{}", "  ...ignoring".style(self.styles.skip))?;
        }
        Ok(())
    }

    pub(crate) fn write_unreachable(
        &self,
        display_name: &str,
        outcome: &OutcomeEvent,
        writer: &mut dyn WriteStr,
    ) -> io::Result<()> {
        let style = self.styles.unreachable;
        let msg = outcome
            .result
            .msg
            .as_ref()
            .map_or("host unreachable", |msg| msg.as_str());
        write_header(display_name, &outcome.host, Some("UNREACHABLE"), style, writer)?;
        writeln!(writer, "{}", format_args!("  {msg}").style(style))
    }

    pub(crate) fn write_retry(
        &self,
        display_name: &str,
        outcome: &OutcomeEvent,
        writer: &mut dyn WriteStr,
    ) -> io::Result<()> {
        let result = &outcome.result;
        writeln!(
            writer,
            "{}",
            format_args!(
                "  {display_name} [{}] retry {}/{}...",
                outcome.host, result.attempts, result.retries
            )
            .style(self.styles.warn)
        )
    }

    /// Writes the separator closing a test: its identifier, elapsed time, and status.
    pub(crate) fn write_footer(
        &self,
        closed: &ClosedTest,
        writer: &mut dyn WriteStr,
    ) -> io::Result<()> {
        let mid = format!(
            "  {}  {}  {}  ",
            closed.id,
            DisplayElapsed(closed.elapsed),
            closed.status
        );
        let lead = self
            .layout
            .footer_width
            .saturating_sub(mid.chars().count())
            .max(4);
        let line = format!(
            "{}{mid}{}",
            self.theme_characters.hbar(lead),
            self.theme_characters.hbar(4)
        );

        writeln!(writer)?;
        writeln!(writer, "{}", line.style(self.status_style(closed.status)))?;
        writeln!(writer)
    }

    /// Writes the end-of-session recap.
    pub(crate) fn write_recap(
        &self,
        ledger: &TestLedger,
        total: Duration,
        stats: &FinalStats,
        writer: &mut dyn WriteStr,
    ) -> io::Result<()> {
        let styles = &self.styles;
        self.write_banner("PLAY RECAP", writer)?;

        if !ledger.is_empty() {
            let width = self.layout.recap_id_width;
            for record in ledger.iter() {
                writeln!(
                    writer,
                    "{}",
                    format_args!("  {:<width$} {}", record.id(), record.status())
                        .style(self.status_style(record.status()))
                )?;
            }
            writeln!(writer)?;

            let counts = ledger.counts();
            let summary_style = if counts.failed > 0 {
                styles.error
            } else {
                styles.ok
            };
            let n = counts.total();
            writeln!(
                writer,
                "{}",
                format_args!(
                    "  {n} {}   {} passed   {} failed   total {}",
                    if n == 1 { "test" } else { "tests" },
                    counts.passed,
                    counts.failed,
                    DisplayElapsed(total),
                )
                .style(summary_style)
            )?;
            writeln!(writer)?;
        }

        for (host, host_stats) in &stats.hosts {
            if host_stats.unreachable {
                writeln!(
                    writer,
                    "{}",
                    format_args!("  {host}   UNREACHABLE").style(styles.unreachable)
                )?;
            } else if host_stats.failures > 0 {
                writeln!(
                    writer,
                    "{}",
                    format_args!("  {host}   FAILED").style(styles.error)
                )?;
            } else {
                writeln!(writer, "{}", format_args!("  {host}   ok").style(styles.ok))?;
            }
        }

        Ok(())
    }

    fn status_style(&self, status: TestStatus) -> Style {
        match status {
            TestStatus::Pass => self.styles.ok,
            TestStatus::Fail => self.styles.error,
        }
    }
}

/// Writes `name [host]`, followed by ` suffix` if there is one.
fn write_header(
    display_name: &str,
    host: &str,
    suffix: Option<&str>,
    style: Style,
    writer: &mut dyn WriteStr,
) -> io::Result<()> {
    match suffix {
        Some(suffix) => writeln!(
            writer,
            "{}",
            format_args!("{display_name} [{host}] {suffix}").style(style)
        ),
        None => writeln!(
            writer,
            "{}",
            format_args!("{display_name} [{host}]").style(style)
        ),
    }
}

/// Writes each line of `text` indented by two spaces.
fn write_indented(text: &str, style: Style, writer: &mut dyn WriteStr) -> io::Result<()> {
    for line in text.lines() {
        writeln!(writer, "{}", format_args!("  {line}").style(style))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        events::{DisplayText, HostStats, OutputBlocks, TaskDescriptor},
        test_id::TestId,
    };
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use std::time::Instant;
    use test_case::test_case;

    fn reporter() -> DisplayReporter {
        DisplayReporter::new(false, true, DisplayLayout::default())
    }

    fn outcome(action: ActionKind) -> OutcomeEvent {
        OutcomeEvent::new("r1", TaskDescriptor::new("Push config"), action)
    }

    fn render(f: impl FnOnce(&DisplayReporter, &mut dyn WriteStr) -> io::Result<()>) -> String {
        let mut out = String::new();
        f(&reporter(), &mut out).expect("writing to a string succeeds");
        out
    }

    fn success(outcome: &OutcomeEvent, is_cleanup: bool) -> String {
        render(|r, w| {
            r.write_success(
                "Push config",
                outcome,
                SuccessDisplay::new(outcome, is_cleanup),
                w,
            )
        })
    }

    #[test_case(ActionKind::SetFact, false, false, SuccessDisplay::Hidden; "set_fact")]
    #[test_case(ActionKind::SetFact, true, true, SuccessDisplay::Hidden; "set_fact beats everything")]
    #[test_case(ActionKind::Config, true, true, SuccessDisplay::NoLog; "no_log beats cleanup")]
    #[test_case(ActionKind::Config, false, true, SuccessDisplay::ChangedOrOk; "cleanup beats kind")]
    #[test_case(ActionKind::Config, false, false, SuccessDisplay::Config; "config")]
    #[test_case(ActionKind::Command, false, false, SuccessDisplay::Command; "command")]
    #[test_case(ActionKind::Assert, false, false, SuccessDisplay::Assert; "assert")]
    #[test_case(ActionKind::Debug, false, false, SuccessDisplay::Debug; "debug")]
    #[test_case(ActionKind::Other("wait_for".to_owned()), false, false, SuccessDisplay::ChangedOrOk; "other")]
    fn success_display_dispatch(
        action: ActionKind,
        no_log: bool,
        is_cleanup: bool,
        expected: SuccessDisplay,
    ) {
        let mut outcome = outcome(action);
        outcome.no_log = no_log;
        assert_eq!(SuccessDisplay::new(&outcome, is_cleanup), expected);
    }

    #[test]
    fn config_success() {
        let mut event = outcome(ActionKind::Config);
        event.result.changed = true;
        event.result.commands = vec![
            "set interfaces bonding bond0".to_owned(),
            "set interfaces bonding bond0 mode 802.3ad".to_owned(),
        ];
        assert_eq!(
            success(&event, false),
            indoc! {"
                Push config [r1]
                  set interfaces bonding bond0
                  set interfaces bonding bond0 mode 802.3ad
            "}
        );

        event.result.commands.clear();
        assert_eq!(
            success(&event, false),
            "Push config [r1]\n  (no changes)\n"
        );
    }

    #[test]
    fn command_success() {
        let mut event = OutcomeEvent::new(
            "r1",
            TaskDescriptor::new("Show").with_commands(["show interfaces", "show version"]),
            ActionKind::Command,
        );
        event.result.stdout = OutputBlocks::new(["eth0 up\neth1 down", "VyOS 1.4", "extra"]);
        assert_eq!(
            success(&event, false),
            indoc! {"
                Push config [r1]
                  > show interfaces
                  eth0 up
                  eth1 down
                  > show version
                  VyOS 1.4
                  extra
            "}
        );
    }

    #[test]
    fn short_successes() {
        let mut event = outcome(ActionKind::Assert);
        assert_eq!(success(&event, false), "Push config [r1] PASS\n");

        event.action = ActionKind::Other("ansible.builtin.wait_for".to_owned());
        assert_eq!(success(&event, false), "Push config [r1] ok\n");
        event.result.changed = true;
        assert_eq!(success(&event, false), "Push config [r1] changed\n");

        // Cleanup tasks get the short form whatever their kind.
        event.action = ActionKind::Config;
        assert_eq!(success(&event, true), "Push config [r1] changed\n");

        event.no_log = true;
        assert_eq!(success(&event, false), "Push config [r1] ok\n");

        event.action = ActionKind::SetFact;
        assert_eq!(success(&event, false), "");
    }

    #[test]
    fn debug_success() {
        let mut event = outcome(ActionKind::Debug);
        assert_eq!(success(&event, false), "Push config [r1]\n");

        event.result.msg = Some(DisplayText::new("bond0: up\nslaves: 2"));
        assert_eq!(
            success(&event, false),
            "Push config [r1]\n  bond0: up\n  slaves: 2\n"
        );
    }

    #[test]
    fn failures() {
        let mut event = outcome(ActionKind::Assert);
        let out = render(|r, w| r.write_failure("Check", &event, w));
        assert_eq!(out, "Check [r1] FAIL\n  assertion failed\n");

        event.result.msg = Some(DisplayText::new("bond0 is down"));
        event.ignore_errors = true;
        let out = render(|r, w| r.write_failure("Check", &event, w));
        assert_eq!(out, "Check [r1] FAIL\n  bond0 is down\n  ...ignoring\n");

        let mut event = outcome(ActionKind::Command);
        event.result.msg = Some(DisplayText::new("command timeout"));
        event.result.stderr = Some(DisplayText::new(""));
        event.result.module_stderr = Some(DisplayText::new("Traceback\n  boom"));
        event.result.stdout = OutputBlocks::new(["partial", "output"]);
        let out = render(|r, w| r.write_failure("Show", &event, w));
        assert_eq!(
            out,
            indoc! {"
                Show [r1] FAILED
                  command timeout
                  Traceback
                    boom
                  partial
                  output
            "}
        );
    }

    #[test]
    fn unreachable_and_retry() {
        let mut event = outcome(ActionKind::Command);
        let out = render(|r, w| r.write_unreachable("Show", &event, w));
        assert_eq!(out, "Show [r1] UNREACHABLE\n  host unreachable\n");

        event.result.msg = Some(DisplayText::new("ssh: connection refused"));
        let out = render(|r, w| r.write_unreachable("Show", &event, w));
        assert_eq!(out, "Show [r1] UNREACHABLE\n  ssh: connection refused\n");

        event.result.attempts = 2;
        event.result.retries = 5;
        let out = render(|r, w| r.write_retry("Wait for eth1", &event, w));
        assert_eq!(out, "  Wait for eth1 [r1] retry 2/5...\n");
    }

    #[test]
    fn footer() {
        let closed = ClosedTest {
            id: TestId::new("BOND-001").expect("valid test ID"),
            elapsed: Duration::from_millis(12_300),
            status: TestStatus::Pass,
        };
        let out = render(|r, w| r.write_footer(&closed, w));
        // mid is "  BOND-001  12.3s  PASS  ", 25 characters wide.
        let expected = format!(
            "\n{}  BOND-001  12.3s  PASS  ────\n\n",
            "─".repeat(72 - 25)
        );
        assert_eq!(out, expected);
        let line = out.lines().nth(1).expect("footer line");
        assert_eq!(line.chars().count(), 72 + 4);
    }

    #[test]
    fn footer_minimum_dashes() {
        let reporter = DisplayReporter::new(
            false,
            false,
            DisplayLayout {
                footer_width: 10,
                ..DisplayLayout::default()
            },
        );
        let closed = ClosedTest {
            id: TestId::new("FW-1").expect("valid test ID"),
            elapsed: Duration::from_secs(125),
            status: TestStatus::Fail,
        };
        let mut out = String::new();
        reporter
            .write_footer(&closed, &mut out)
            .expect("writing to a string succeeds");
        assert_eq!(out, "\n----  FW-1  2m 5s  FAIL  ----\n\n");
    }

    #[test_case("Release verification", "PLAY [Release verification]"; "named")]
    #[test_case("  ", "PLAY"; "blank")]
    fn play_banner(name: &str, title: &str) {
        let out = render(|r, w| r.write_play_start(name, w));
        let stars = "*".repeat(80 - title.len());
        assert_eq!(out, format!("\n{title} {stars}\n"));
    }

    #[test]
    fn banner_minimum_stars() {
        let title = "X".repeat(100);
        let out = render(|r, w| r.write_banner(&title, w));
        assert_eq!(out, format!("\n{title} ***\n"));
    }

    #[test]
    fn recap() {
        let t0 = Instant::now();
        let mut ledger = TestLedger::new();
        let bond = TestId::new("BOND-001").expect("valid test ID");
        let fw = TestId::new("FW-1").expect("valid test ID");
        ledger.enter(Some(bond), t0);
        ledger.enter(Some(fw.clone()), t0);
        ledger.mark_failed(&fw);

        let mut stats = FinalStats::default();
        stats.hosts.insert("r2".to_owned(), HostStats {
            unreachable: false,
            failures: 1,
        });
        stats.hosts.insert("r1".to_owned(), HostStats::default());
        stats.hosts.insert("r3".to_owned(), HostStats {
            unreachable: true,
            failures: 1,
        });

        let out = render(|r, w| r.write_recap(&ledger, Duration::from_secs(125), &stats, w));
        let expected = [
            String::new(),
            format!("PLAY RECAP {}", "*".repeat(70)),
            format!("  {:<20} PASS", "BOND-001"),
            format!("  {:<20} FAIL", "FW-1"),
            String::new(),
            "  2 tests   1 passed   1 failed   total 2m 5s".to_owned(),
            String::new(),
            "  r1   ok".to_owned(),
            "  r2   FAILED".to_owned(),
            "  r3   UNREACHABLE".to_owned(),
        ]
        .join("\n")
            + "\n";
        assert_eq!(out, expected);
    }

    #[test]
    fn recap_without_tests() {
        let mut stats = FinalStats::default();
        stats.hosts.insert("r1".to_owned(), HostStats::default());
        let out = render(|r, w| {
            r.write_recap(&TestLedger::new(), Duration::from_secs(3), &stats, w)
        });
        assert_eq!(out, format!("\nPLAY RECAP {}\n  r1   ok\n", "*".repeat(70)));
    }

    #[test]
    fn recap_single_test() {
        let mut ledger = TestLedger::new();
        ledger.enter(TestId::new("FW-1"), Instant::now());
        let out = render(|r, w| {
            r.write_recap(&ledger, Duration::from_millis(4_200), &FinalStats::default(), w)
        });
        assert!(
            out.contains("  1 test   1 passed   0 failed   total 4.2s\n"),
            "unexpected recap:\n{out}"
        );
    }

    #[test]
    fn colorized_output_keeps_text() {
        let reporter = DisplayReporter::new(true, true, DisplayLayout::default());
        let mut out = String::new();
        reporter
            .write_unreachable("Show", &outcome(ActionKind::Command), &mut out)
            .expect("writing to a string succeeds");
        assert!(out.contains("\u{1b}["), "output is colorized: {out:?}");
        assert!(out.contains("Show [r1] UNREACHABLE"));
    }
}
