// Copyright (c) The playrecap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Maps tasks to the test they belong to.
//!
//! Tags are the primary signal, but the engine does not reliably propagate tags from an imported
//! task group to deeply nested helper tasks. Tasks are therefore also named `"<ID> - description"`
//! by convention, and the name prefix is used as a fallback.

use crate::{events::TaskDescriptor, test_id::TestId};

/// A single way of deriving a test identifier from a task.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ResolveStrategy {
    /// The first tag that is a valid test identifier.
    Tags,

    /// The part of the display name before the first `" - "`, if it is a valid test identifier.
    NamePrefix,
}

impl ResolveStrategy {
    /// The separator between the test identifier and the description in a task name.
    pub const NAME_SEPARATOR: &'static str = " - ";

    /// Attempts to resolve a test identifier for `task`, whose display name is `display_name`.
    pub fn resolve(self, task: &TaskDescriptor, display_name: &str) -> Option<TestId> {
        match self {
            Self::Tags => task.tags.iter().find_map(|tag| TestId::new(tag)),
            Self::NamePrefix => {
                let (prefix, _) = display_name.split_once(Self::NAME_SEPARATOR)?;
                TestId::new(prefix)
            }
        }
    }
}

/// Resolves tasks to test identifiers using an ordered list of strategies.
///
/// The first strategy to produce an identifier wins.
#[derive(Clone, Debug)]
pub struct TestBoundaryResolver {
    strategies: Vec<ResolveStrategy>,
    role_prefix: String,
}

impl TestBoundaryResolver {
    /// The default order of strategies.
    pub const DEFAULT_STRATEGIES: &'static [ResolveStrategy] =
        &[ResolveStrategy::Tags, ResolveStrategy::NamePrefix];

    /// Creates a resolver with the default strategies, stripping `role_prefix` from task names.
    pub fn new(role_prefix: impl Into<String>) -> Self {
        Self::with_strategies(role_prefix, Self::DEFAULT_STRATEGIES.iter().copied())
    }

    /// Creates a resolver with a custom list of strategies.
    pub fn with_strategies(
        role_prefix: impl Into<String>,
        strategies: impl IntoIterator<Item = ResolveStrategy>,
    ) -> Self {
        Self {
            strategies: strategies.into_iter().collect(),
            role_prefix: role_prefix.into(),
        }
    }

    /// Returns the strategies in the order they are tried.
    pub fn strategies(&self) -> &[ResolveStrategy] {
        &self.strategies
    }

    /// Returns the test identifier for `task`, or `None` if the task is outside any test.
    pub fn resolve(&self, task: &TaskDescriptor) -> Option<TestId> {
        let display_name = self.display_name(task);
        self.strategies
            .iter()
            .find_map(|strategy| strategy.resolve(task, display_name))
    }

    /// Returns the name of `task` as shown in the report: trimmed, with the structural prefix
    /// removed.
    pub fn display_name<'a>(&self, task: &'a TaskDescriptor) -> &'a str {
        let name = task.name.trim();
        if self.role_prefix.is_empty() {
            return name;
        }
        name.strip_prefix(self.role_prefix.as_str()).unwrap_or(name)
    }
}

/// Returns true if `task` is a cleanup task: one that runs regardless of test outcome.
pub fn is_cleanup(task: &TaskDescriptor, cleanup_tag: &str) -> bool {
    task.has_tag(cleanup_tag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;
    use test_strategy::proptest;

    const PREFIX: &str = "release_verification : ";

    fn resolver() -> TestBoundaryResolver {
        TestBoundaryResolver::new(PREFIX)
    }

    #[test_case(&["smoke", "BOND-001"], "Configure bond", Some("BOND-001"); "tag match")]
    #[test_case(&["FW-1", "BOND-001"], "Configure bond", Some("FW-1"); "first valid tag wins")]
    #[test_case(&["bond-001", "cleanup"], "Configure bond", None; "malformed tag")]
    #[test_case(&[], "TUN-001 - Wait for eth1", Some("TUN-001"); "name prefix")]
    #[test_case(&[], "release_verification : TUN-001 - Wait for eth1", Some("TUN-001"); "role prefix stripped")]
    #[test_case(&[], "  TUN-001 - Wait for eth1  ", Some("TUN-001"); "surrounding whitespace")]
    #[test_case(&["BOND-001"], "TUN-001 - Wait for eth1", Some("BOND-001"); "tags before name")]
    #[test_case(&[], "TUN-001 - step - 2", Some("TUN-001"); "split on first separator")]
    #[test_case(&[], "TUN-001- Wait", None; "separator without leading space")]
    #[test_case(&[], "tun-001 - Wait", None; "malformed prefix")]
    #[test_case(&[], "TUN-001", None; "no separator")]
    #[test_case(&[], "Gather facts", None; "setup task")]
    fn resolves(tags: &[&str], name: &str, expected: Option<&str>) {
        let task = TaskDescriptor::new(name).with_tags(tags.iter().copied());
        let resolved = resolver().resolve(&task);
        assert_eq!(resolved.as_ref().map(TestId::as_str), expected);
    }

    #[test]
    fn strategies_are_independent() {
        let task = TaskDescriptor::new("FW-2 - Check rules").with_tags(["FW-1"]);
        let display_name = resolver().display_name(&task);

        assert_eq!(
            ResolveStrategy::Tags.resolve(&task, display_name),
            TestId::new("FW-1")
        );
        assert_eq!(
            ResolveStrategy::NamePrefix.resolve(&task, display_name),
            TestId::new("FW-2")
        );

        let name_only =
            TestBoundaryResolver::with_strategies(PREFIX, [ResolveStrategy::NamePrefix]);
        assert_eq!(name_only.resolve(&task), TestId::new("FW-2"));
        assert_eq!(
            name_only.strategies(),
            [ResolveStrategy::NamePrefix].as_slice()
        );
    }

    #[test_case("release_verification : BOND-001 - Push", "BOND-001 - Push"; "prefix")]
    #[test_case("  Gather facts ", "Gather facts"; "trimmed")]
    #[test_case("other_role : Push", "other_role : Push"; "other prefix kept")]
    fn display_names(name: &str, expected: &str) {
        assert_eq!(resolver().display_name(&TaskDescriptor::new(name)), expected);
    }

    #[test]
    fn empty_role_prefix() {
        let resolver = TestBoundaryResolver::new("");
        let task = TaskDescriptor::new(" FW-1 - x ");
        assert_eq!(resolver.display_name(&task), "FW-1 - x");
        assert_eq!(resolver.resolve(&task), TestId::new("FW-1"));
    }

    #[test]
    fn cleanup_tasks() {
        let task = TaskDescriptor::new("BOND-001 - Remove bond").with_tags(["BOND-001", "cleanup"]);
        assert!(is_cleanup(&task, "cleanup"));
        assert!(!is_cleanup(&task, "teardown"));
        assert!(!is_cleanup(&TaskDescriptor::new("cleanup"), "cleanup"));
    }

    // Whatever the resolver returns is always a valid identifier, drawn from the task's metadata.
    #[proptest(cases = 256)]
    fn resolved_ids_are_valid(
        #[strategy(proptest::collection::vec("[A-Za-z0-9-]{0,10}", 0..4))] tags: Vec<String>,
        #[strategy("[A-Za-z0-9 -]{0,20}")] name: String,
    ) {
        let task = TaskDescriptor::new(name.clone()).with_tags(tags.clone());
        if let Some(id) = resolver().resolve(&task) {
            prop_assert!(TestId::is_valid(id.as_str()));
            prop_assert!(
                tags.iter().any(|t| t == id.as_str()) || name.trim().starts_with(id.as_str())
            );
        }
    }
}
