// Copyright (c) The playrecap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use owo_colors::Style;

/// Styles for each severity class of report output.
///
/// All styles are plain unless [`colorize`](Self::colorize) is called, so that uncolored output
/// contains nothing but text.
#[derive(Debug, Default, Clone)]
pub(super) struct Styles {
    pub(super) ok: Style,
    pub(super) changed: Style,
    pub(super) error: Style,
    pub(super) unreachable: Style,
    pub(super) warn: Style,
    pub(super) skip: Style,
}

impl Styles {
    pub(super) fn colorize(&mut self) {
        self.ok = Style::new().green();
        self.changed = Style::new().yellow();
        self.error = Style::new().red().bold();
        self.unreachable = Style::new().bright_red().bold();
        self.warn = Style::new().magenta();
        self.skip = Style::new().cyan();
    }

    /// Returns the style for a changed/unchanged line.
    pub(super) fn changed_or_ok(&self, changed: bool) -> Style {
        if changed { self.changed } else { self.ok }
    }
}

/// Characters used to draw separators.
#[derive(Clone, Debug)]
pub(super) struct ThemeCharacters {
    hbar: char,
}

impl Default for ThemeCharacters {
    fn default() -> Self {
        Self { hbar: '-' }
    }
}

impl ThemeCharacters {
    pub(super) fn use_unicode(&mut self) {
        self.hbar = '─';
    }

    pub(super) fn hbar(&self, width: usize) -> String {
        std::iter::repeat_n(self.hbar, width).collect()
    }
}
