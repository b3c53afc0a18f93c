// Copyright (c) The playrecap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Events produced by the orchestration engine and consumed by a
//! [`Session`](crate::session::Session).
//!
//! Every payload field is optional on the wire and defaults when absent or `null`, so that a
//! partial event renders as much as it can instead of failing.

use serde::Deserialize;
use serde_json::Value;
use std::{collections::BTreeMap, fmt, time::Instant};

/// An event in a playbook run.
#[derive(Clone, Debug)]
pub struct PlayEvent {
    /// The time at which the event was observed.
    ///
    /// This is the "now" used for all timing decisions made while handling the event.
    pub at: Instant,

    /// The kind of event this is.
    pub kind: PlayEventKind,
}

impl PlayEvent {
    /// Creates a new event observed at `at`.
    pub fn new(at: Instant, kind: PlayEventKind) -> Self {
        Self { at, kind }
    }
}

/// The kind of event this is.
///
/// Forms part of [`PlayEvent`].
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum PlayEventKind {
    /// A play started.
    #[serde(rename = "play-start")]
    PlayStarted {
        /// The name of the play, possibly empty.
        #[serde(default, deserialize_with = "null_as_default")]
        name: String,
    },

    /// A task started. Exactly one of these precedes the per-host outcomes of a task.
    #[serde(rename = "task-start")]
    TaskStarted {
        /// The task that started.
        #[serde(default, deserialize_with = "null_as_default")]
        task: TaskDescriptor,
    },

    /// A task succeeded on a host.
    Ok(OutcomeEvent),

    /// A task failed on a host.
    Failed(OutcomeEvent),

    /// A host could not be reached.
    Unreachable(OutcomeEvent),

    /// A task is being retried on a host.
    Retry(OutcomeEvent),

    /// A task was skipped on a host.
    Skipped(OutcomeEvent),

    /// A loop item succeeded on a host.
    ItemOk(OutcomeEvent),

    /// A loop item failed on a host.
    ItemFailed(OutcomeEvent),

    /// A loop item was skipped on a host.
    ItemSkipped(OutcomeEvent),

    /// The run finished, with the engine's per-host statistics.
    Stats(FinalStats),
}

impl PlayEventKind {
    /// Returns a short name for this kind of event, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::PlayStarted { .. } => "play-start",
            Self::TaskStarted { .. } => "task-start",
            Self::Ok(_) => "ok",
            Self::Failed(_) => "failed",
            Self::Unreachable(_) => "unreachable",
            Self::Retry(_) => "retry",
            Self::Skipped(_) => "skipped",
            Self::ItemOk(_) => "item-ok",
            Self::ItemFailed(_) => "item-failed",
            Self::ItemSkipped(_) => "item-skipped",
            Self::Stats(_) => "stats",
        }
    }
}

/// A declared unit of work in the playbook.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct TaskDescriptor {
    /// The raw task name, as reported by the engine.
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,

    /// The tags declared on the task, in declaration order.
    #[serde(deserialize_with = "null_as_default")]
    pub tags: Vec<String>,

    /// The remote commands declared in the task's arguments, if any.
    #[serde(deserialize_with = "null_as_default")]
    pub commands: Vec<TaskCommand>,
}

impl TaskDescriptor {
    /// Creates a new task with the given name and no tags.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Adds tags to this task.
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Adds declared commands to this task.
    pub fn with_commands(mut self, commands: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.commands
            .extend(commands.into_iter().map(|c| TaskCommand(c.into())));
        self
    }

    /// Returns true if the task carries the given tag.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// A command declared on a task.
///
/// On the wire this is either a plain string or an object with a `command` field.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(from = "Value")]
pub struct TaskCommand(String);

impl TaskCommand {
    /// Returns the command line.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<Value> for TaskCommand {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(mut map) => match map.remove("command") {
                Some(Value::String(command)) => Self(command),
                Some(other) => Self(value_to_text(other)),
                None => Self(value_to_text(Value::Object(map))),
            },
            other => Self(value_to_text(other)),
        }
    }
}

impl fmt::Display for TaskCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The kind of action a task performs.
///
/// The engine reports actions either by their fully-qualified or their short name; both map to the
/// same kind.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum ActionKind {
    /// A declarative configuration push.
    Config,

    /// Remote command execution.
    Command,

    /// An assertion.
    Assert,

    /// A diagnostic message.
    Debug,

    /// Assigns derived variables; produces no output.
    SetFact,

    /// Any other action.
    Other(String),
}

impl ActionKind {
    /// Maps an action name reported by the engine to its kind.
    pub fn from_action(action: &str) -> Self {
        match action {
            "vyos.vyos.vyos_config" | "vyos_config" => Self::Config,
            "vyos.vyos.vyos_command" | "vyos_command" => Self::Command,
            "ansible.builtin.assert" | "assert" => Self::Assert,
            "ansible.builtin.debug" | "debug" => Self::Debug,
            "ansible.builtin.set_fact" | "set_fact" => Self::SetFact,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl Default for ActionKind {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<String> for ActionKind {
    fn from(action: String) -> Self {
        match Self::from_action(&action) {
            Self::Other(_) => Self::Other(action),
            kind => kind,
        }
    }
}

/// The outcome of a task on one host.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct OutcomeEvent {
    /// The host the task ran against.
    #[serde(default, deserialize_with = "null_as_default")]
    pub host: String,

    /// The task that produced this outcome.
    #[serde(default, deserialize_with = "null_as_default")]
    pub task: TaskDescriptor,

    /// The kind of action the task performs.
    #[serde(default, deserialize_with = "null_as_default")]
    pub action: ActionKind,

    /// The result payload returned by the action.
    #[serde(default, deserialize_with = "null_as_default")]
    pub result: TaskResult,

    /// True if the playbook author marked failures of this task as non-fatal.
    #[serde(default, deserialize_with = "null_as_default")]
    pub ignore_errors: bool,

    /// True if the task's output must not be logged.
    #[serde(default, deserialize_with = "null_as_default")]
    pub no_log: bool,
}

impl OutcomeEvent {
    /// Creates a new outcome for `task` on `host`.
    pub fn new(host: impl Into<String>, task: TaskDescriptor, action: ActionKind) -> Self {
        Self {
            host: host.into(),
            task,
            action,
            ..Default::default()
        }
    }
}

/// The result payload of an action.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct TaskResult {
    /// True if the action changed the host.
    #[serde(deserialize_with = "null_as_default")]
    pub changed: bool,

    /// Configuration commands pushed to the host.
    #[serde(deserialize_with = "null_as_default")]
    pub commands: Vec<String>,

    /// Output blocks, one per executed command.
    pub stdout: OutputBlocks,

    /// A human-readable message.
    pub msg: Option<DisplayText>,

    /// Standard error of the action.
    pub stderr: Option<DisplayText>,

    /// Standard error of the module wrapper, if the module itself crashed.
    pub module_stderr: Option<DisplayText>,

    /// The number of attempts made so far.
    #[serde(deserialize_with = "null_as_default")]
    pub attempts: u64,

    /// The total number of retries allowed.
    #[serde(deserialize_with = "null_as_default")]
    pub retries: u64,
}

/// Free-form text from a result payload.
///
/// Strings are kept verbatim; any other JSON value is kept as compact JSON.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Value")]
pub struct DisplayText(String);

impl DisplayText {
    /// Creates a new text value.
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Returns the text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if there is nothing to display.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Value> for DisplayText {
    fn from(value: Value) -> Self {
        Self(value_to_text(value))
    }
}

/// Output blocks from a result payload.
///
/// The wire form is either a list of strings (one per command) or a single string.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Value")]
pub struct OutputBlocks(Vec<String>);

impl OutputBlocks {
    /// Creates a new set of output blocks.
    pub fn new(blocks: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self(blocks.into_iter().map(Into::into).collect())
    }

    /// Iterates over the blocks.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Returns all blocks joined by newlines.
    pub fn joined(&self) -> String {
        self.0.join("\n")
    }

    /// Returns true if there are no blocks.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Value> for OutputBlocks {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::default(),
            Value::Array(items) => Self(items.into_iter().map(value_to_text).collect()),
            other => Self(vec![value_to_text(other)]),
        }
    }
}

/// The engine's final statistics, keyed by host.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct FinalStats {
    /// Per-host statistics, sorted by host name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub hosts: BTreeMap<String, HostStats>,
}

/// Final statistics for a single host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HostStats {
    /// True if the host was unreachable at any point.
    #[serde(deserialize_with = "deserialize_flag_or_count")]
    pub unreachable: bool,

    /// The number of failed tasks on the host.
    #[serde(deserialize_with = "null_as_default")]
    pub failures: usize,
}

fn value_to_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn deserialize_flag_or_count<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FlagOrCount {
        Flag(bool),
        Count(u64),
    }

    Ok(match Option::<FlagOrCount>::deserialize(deserializer)? {
        Some(FlagOrCount::Flag(flag)) => flag,
        Some(FlagOrCount::Count(count)) => count > 0,
        None => false,
    })
}
