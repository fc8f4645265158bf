//! Combination Enumeration
//!
//! Iterative Cartesian product over the flag groups. The iterator keeps one
//! cursor per axis and advances them like an odometer, last axis fastest, so
//! the first declared axis is the outermost loop.
//!
//! ```text
//! axes:   opt = [O1, O2]   lto = [nolto, lto]
//!
//! cursor  [0,0] -> O1-nolto
//!         [0,1] -> O1-lto
//!         [1,0] -> O2-nolto
//!         [1,1] -> O2-lto
//! ```

use crate::axis::{FlagGroup, LABEL_SEPARATOR};
use std::iter::FusedIterator;

/// One fully resolved selection across all axes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Combination {
    /// Zero-based position in enumeration order
    pub index: usize,
    /// Per-axis labels joined with [`LABEL_SEPARATOR`]
    pub label: String,
    /// Chosen argument lists concatenated in axis order
    pub args: Vec<String>,
}

/// Lazy iterator over every combination of a set of flag groups
#[derive(Debug, Clone)]
pub struct Combinations<'a> {
    groups: &'a [FlagGroup],
    /// `None` once exhausted
    cursor: Option<Vec<usize>>,
    index: usize,
    remaining: usize,
}

impl<'a> Combinations<'a> {
    pub(crate) fn new(groups: &'a [FlagGroup]) -> Self {
        let remaining: usize = groups.iter().map(FlagGroup::len).product();
        Self {
            groups,
            cursor: (remaining > 0).then(|| vec![0; groups.len()]),
            index: 0,
            remaining,
        }
    }

    fn resolve(&self, cursor: &[usize]) -> Combination {
        let mut pieces = Vec::with_capacity(cursor.len());
        let mut args = Vec::new();

        for (group, &selected) in self.groups.iter().zip(cursor) {
            let choice = &group.choices[selected];
            pieces.push(choice.label.as_str());
            args.extend(choice.args.iter().cloned());
        }

        Combination {
            index: self.index,
            label: pieces.join(LABEL_SEPARATOR),
            args,
        }
    }

    /// Step the odometer; `None` when the last axis wraps past the first.
    fn advance(&self, mut cursor: Vec<usize>) -> Option<Vec<usize>> {
        for axis in (0..cursor.len()).rev() {
            cursor[axis] += 1;
            if cursor[axis] < self.groups[axis].len() {
                return Some(cursor);
            }
            cursor[axis] = 0;
        }
        None
    }
}

impl Iterator for Combinations<'_> {
    type Item = Combination;

    fn next(&mut self) -> Option<Combination> {
        let cursor = self.cursor.take()?;
        let combination = self.resolve(&cursor);

        self.cursor = self.advance(cursor);
        self.index += 1;
        self.remaining -= 1;

        Some(combination)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Combinations<'_> {}

impl FusedIterator for Combinations<'_> {}
