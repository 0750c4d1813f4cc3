// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Source location tracking.
//!
//! Tokens and AST nodes carry a [`Location`] describing where they came from.
//! Locations serve two purposes only: error messages, and reproducing the
//! author's vertical whitespace when printing.

use serde::{Deserialize, Serialize};

/// A point in the source text.
///
/// `offset` is a byte offset; `line` and `column` are 1-based, with the
/// column counted in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub offset: u32,
    pub line: u32,
    pub column: u32,
}

impl Position {
    /// The position of the first character of a source file.
    pub const START: Self = Self {
        offset: 0,
        line: 1,
        column: 1,
    };

    #[must_use]
    pub const fn new(offset: u32, line: u32, column: u32) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::START
    }
}

/// A half-open range of source text.
///
/// # Examples
///
/// ```
/// use vclkit_core::source_analysis::{Location, Position};
///
/// let loc = Location::new(Position::new(4, 1, 5), Position::new(9, 1, 10));
/// assert_eq!(loc.len(), 5);
/// assert_eq!(loc.start.line, 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Location {
    pub start: Position,
    pub end: Position,
}

impl Location {
    #[must_use]
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// A zero-width location at `position`.
    #[must_use]
    pub const fn point(position: Position) -> Self {
        Self {
            start: position,
            end: position,
        }
    }

    /// Length of the location in bytes.
    #[must_use]
    pub const fn len(self) -> u32 {
        self.end.offset.saturating_sub(self.start.offset)
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.len() == 0
    }

    /// Creates a location spanning from the start of `self` to the end of `other`.
    #[must_use]
    pub const fn to(self, other: Self) -> Self {
        Self {
            start: self.start,
            end: other.end,
        }
    }
}

impl From<Location> for miette::SourceSpan {
    fn from(loc: Location) -> Self {
        (loc.start.offset as usize, loc.len() as usize).into()
    }
}
