// Copyright (c) The playrecap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test identifiers.
//!
//! A test identifier is the domain-level key that groups the tasks of a single test case, for
//! example `BOND-001` or `FW-NAT-12`. Identifiers are one or more segments of uppercase letters and
//! digits (each starting with a letter) joined by `-`, followed by a numeric suffix.

use crate::errors::InvalidTestId;
use regex::Regex;
use std::{borrow::Borrow, fmt, str::FromStr, sync::LazyLock};

static TEST_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z][A-Z0-9]*(-[A-Z][A-Z0-9]*)*-\d+$").expect("test ID regex is valid")
});

/// A validated test identifier.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TestId(String);

impl TestId {
    /// Returns a new `TestId` if `s` matches the identifier grammar.
    ///
    /// Near misses such as `bond-001`, `BOND`, or ` BOND-001` are rejected.
    pub fn new(s: &str) -> Option<Self> {
        Self::is_valid(s).then(|| Self(s.to_owned()))
    }

    /// Returns true if `s` matches the identifier grammar.
    pub fn is_valid(s: &str) -> bool {
        TEST_ID_RE.is_match(s)
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for TestId {
    type Err = InvalidTestId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or_else(|| InvalidTestId::new(s))
    }
}

impl fmt::Display for TestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Use pad so that width and alignment specifiers work in the recap.
        f.pad(&self.0)
    }
}

impl AsRef<str> for TestId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for TestId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("BOND-001"; "single segment")]
    #[test_case("FW-1"; "short suffix")]
    #[test_case("FW-NAT-12"; "two segments")]
    #[test_case("V6-OSPF3-0042"; "digits inside segments")]
    #[test_case("TUN-001"; "tunnel")]
    fn valid_ids(input: &str) {
        let id = TestId::new(input).expect("valid test ID");
        assert_eq!(id.as_str(), input);
        assert_eq!(input.parse::<TestId>().expect("parses").as_str(), input);
    }

    #[test_case(""; "empty")]
    #[test_case("BOND"; "no numeric suffix")]
    #[test_case("bond-001"; "lowercase")]
    #[test_case("BOND-001 "; "trailing whitespace")]
    #[test_case(" BOND-001"; "leading whitespace")]
    #[test_case("1BOND-001"; "segment starts with digit")]
    #[test_case("BOND--001"; "empty segment")]
    #[test_case("BOND-001a"; "alphanumeric suffix")]
    #[test_case("001"; "suffix only")]
    #[test_case("BOND_001"; "underscore separator")]
    #[test_case("cleanup"; "cleanup tag")]
    fn invalid_ids(input: &str) {
        assert_eq!(TestId::new(input), None);
        let err = input.parse::<TestId>().expect_err("invalid test ID");
        assert_eq!(err.input(), input);
    }

    #[test]
    fn display_respects_width() {
        let id = TestId::new("FW-1").expect("valid test ID");
        assert_eq!(format!("[{id:<8}]"), "[FW-1    ]");
    }
}
