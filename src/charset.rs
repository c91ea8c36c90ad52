/// Compiled character sets.
///
/// A `MatchSet` keeps its ranges sorted and merged so membership is a binary search.

use std::cmp::Ordering;
use std::fmt;

use crate::ast::{CharacterGroup, CharacterGroupItem};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSet {
    ranges: Vec<(char, char)>,
    is_inverted: bool,
}

impl MatchSet {
    /// Build a set from inclusive ranges. Ranges whose end precedes their start are dropped.
    pub fn new(ranges: impl IntoIterator<Item = (char, char)>, is_inverted: bool) -> Self {
        let mut ranges: Vec<(char, char)> = ranges.into_iter().filter(|(lo, hi)| lo <= hi).collect();
        ranges.sort_unstable();
        let mut merged: Vec<(char, char)> = Vec::with_capacity(ranges.len());
        for (lo, hi) in ranges {
            match merged.last_mut() {
                Some((_, last_hi)) if (lo as u32) <= (*last_hi as u32) + 1 => {
                    if hi > *last_hi {
                        *last_hi = hi;
                    }
                }
                _ => merged.push((lo, hi)),
            }
        }
        MatchSet { ranges: merged, is_inverted }
    }

    pub fn from_group(group: &CharacterGroup) -> Self {
        let ranges = group.items.iter().map(|item| match *item {
            CharacterGroupItem::Character(ch) => (ch, ch),
            CharacterGroupItem::Range(start, end) => (start, end),
        });
        MatchSet::new(ranges, group.is_inverted)
    }

    /// `\d`
    pub fn digit() -> Self {
        MatchSet::new([('0', '9')], false)
    }

    /// `\w`
    pub fn word() -> Self {
        MatchSet::new([('0', '9'), ('A', 'Z'), ('_', '_'), ('a', 'z')], false)
    }

    /// `\s`
    pub fn space() -> Self {
        MatchSet::new([('\t', '\n'), ('\x0C', '\r'), (' ', ' ')], false)
    }

    /// The complement of this set (`\D`, `\W`, `\S`).
    pub fn negate(self) -> Self {
        MatchSet { is_inverted: !self.is_inverted, ..self }
    }

    pub fn is_inverted(&self) -> bool {
        self.is_inverted
    }

    pub fn ranges(&self) -> &[(char, char)] {
        &self.ranges
    }

    pub fn contains(&self, ch: char) -> bool {
        let found = self
            .ranges
            .binary_search_by(|&(lo, hi)| {
                if hi < ch {
                    Ordering::Less
                } else if lo > ch {
                    Ordering::Greater
                } else {
                    Ordering::Equal
                }
            })
            .is_ok();
        found != self.is_inverted
    }
}

impl fmt::Display for MatchSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        if self.is_inverted {
            write!(f, "^")?;
        }
        for &(lo, hi) in &self.ranges {
            if lo == hi {
                write!(f, "{}", lo.escape_debug())?;
            } else {
                write!(f, "{}-{}", lo.escape_debug(), hi.escape_debug())?;
            }
        }
        write!(f, "]")
    }
}

/// Word characters for `\b`, same as `\w`.
pub fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}
