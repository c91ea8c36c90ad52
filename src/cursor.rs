/// Cursor: the input text plus the scan position and capture bookkeeping of one search.

use std::collections::BTreeMap;
use std::fmt;

use crate::charset::is_word_char;
use crate::matcher::MatchResult;

/// Bookkeeping for one active repetition loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopFrame {
    /// Index at which the current iteration started.
    pub entry: usize,
}

/// Position in an immutable input, indexed by `char`.
///
/// `start_index` is the start of the search window and stays put while the
/// matcher retries successive offsets; `match_start` is the offset of the
/// current attempt.
#[derive(Debug, Clone)]
pub struct Cursor {
    chars: Vec<char>,
    start_index: usize,
    end_index: usize,
    match_start: usize,
    index: usize,
    groups: BTreeMap<usize, (usize, usize)>,
    group_starts: BTreeMap<usize, usize>,
    loops: Vec<Option<LoopFrame>>,
    previous_match_index: Option<usize>,
}

impl Cursor {
    pub fn new(text: &str) -> Self {
        let chars: Vec<char> = text.chars().collect();
        let end_index = chars.len();
        Cursor {
            chars,
            start_index: 0,
            end_index,
            match_start: 0,
            index: 0,
            groups: BTreeMap::new(),
            group_starts: BTreeMap::new(),
            loops: Vec::new(),
            previous_match_index: None,
        }
    }

    /// A cursor whose search window begins at `start_index` (clamped to the input length).
    pub fn with_window(text: &str, start_index: usize) -> Self {
        let mut cursor = Cursor::new(text);
        cursor.start_index = start_index.min(cursor.end_index);
        cursor.start_at(cursor.start_index);
        cursor
    }

    /// Reset the scan position to `index` and forget every capture.
    pub fn start_at(&mut self, index: usize) {
        self.match_start = index;
        self.index = index;
        self.groups.clear();
        self.group_starts.clear();
        self.loops.clear();
    }

    pub fn advance_to(&mut self, index: usize) {
        self.index = index;
    }

    /// Move past `m` so the next search cannot find the same match again.
    /// An empty match moves one character further.
    pub fn advance_to_end_of_match(&mut self, m: &MatchResult) {
        self.previous_match_index = Some(m.end());
        self.index = if m.is_empty() { m.end() + 1 } else { m.end() };
    }

    pub fn start_index(&self) -> usize {
        self.start_index
    }

    pub fn end_index(&self) -> usize {
        self.end_index
    }

    pub fn match_start(&self) -> usize {
        self.match_start
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn previous_match_index(&self) -> Option<usize> {
        self.previous_match_index
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// Character at the current index, or `None` at the end of input.
    pub fn character(&self) -> Option<char> {
        self.chars.get(self.index).copied().filter(|_| self.index < self.end_index)
    }

    pub fn character_offset_by(&self, offset: isize) -> Option<char> {
        let index = self.index.checked_add_signed(offset)?;
        if index < self.end_index { self.chars.get(index).copied() } else { None }
    }

    /// The index `offset` characters ahead, if it still lies inside the input.
    pub fn index_offset_by(&self, offset: usize) -> Option<usize> {
        let index = self.index.checked_add(offset)?;
        if index < self.end_index { Some(index) } else { None }
    }

    pub fn index_after(&self, index: usize) -> usize {
        index + 1
    }

    pub fn is_empty(&self) -> bool {
        self.index >= self.end_index
    }

    /// True when exactly one character remains.
    pub fn is_at_last_index(&self) -> bool {
        self.index < self.end_index && self.index + 1 == self.end_index
    }

    /// Whether the input continues with `expected` at the current index.
    pub fn starts_with(&self, expected: &[char]) -> bool {
        self.chars
            .get(self.index..)
            .is_some_and(|rest| rest.starts_with(expected))
    }

    pub fn is_at_word_boundary(&self) -> bool {
        let before = self.index > 0 && self.chars.get(self.index - 1).copied().is_some_and(is_word_char);
        let after = self.character().is_some_and(is_word_char);
        before != after
    }

    /// Characters in `start..end`, or `None` if the range is not inside the input.
    pub fn slice(&self, start: usize, end: usize) -> Option<&[char]> {
        self.chars.get(start..end)
    }

    /// Captured span of group `index`, if it has closed on the current path.
    pub fn group(&self, index: usize) -> Option<(usize, usize)> {
        self.groups.get(&index).copied()
    }

    pub fn groups(&self) -> &BTreeMap<usize, (usize, usize)> {
        &self.groups
    }

    pub fn loop_frame(&self, id: usize) -> Option<LoopFrame> {
        self.loops.get(id).copied().flatten()
    }

    /// Record where group `index` opens. Returns the previous open position.
    pub(crate) fn open_group(&mut self, index: usize) -> Option<usize> {
        self.group_starts.insert(index, self.index)
    }

    /// Commit the span of group `index` ending here. Returns the previous span.
    pub(crate) fn close_group(&mut self, index: usize) -> Option<(usize, usize)> {
        let start = self.group_starts.get(&index).copied().unwrap_or(self.index);
        self.groups.insert(index, (start, self.index))
    }

    pub(crate) fn restore_group_start(&mut self, index: usize, previous: Option<usize>) {
        match previous {
            Some(start) => self.group_starts.insert(index, start),
            None => self.group_starts.remove(&index),
        };
    }

    pub(crate) fn restore_group(&mut self, index: usize, previous: Option<(usize, usize)>) {
        match previous {
            Some(span) => self.groups.insert(index, span),
            None => self.groups.remove(&index),
        };
    }

    /// Replace the frame of loop `id`, returning the previous one.
    pub(crate) fn set_loop_frame(&mut self, id: usize, frame: Option<LoopFrame>) -> Option<LoopFrame> {
        if self.loops.len() <= id {
            self.loops.resize(id + 1, None);
        }
        std::mem::replace(&mut self.loops[id], frame)
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.character() {
            Some('\n') => write!(f, "{}, \\n", self.index),
            Some(ch) => write!(f, "{}, {}", self.index, ch),
            None => write!(f, "{}, <end>", self.index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_character_queries() {
        let mut cursor = Cursor::new("ab\n");
        assert_eq!(cursor.character(), Some('a'));
        assert_eq!(cursor.character_offset_by(1), Some('b'));
        assert_eq!(cursor.character_offset_by(-1), None);
        assert_eq!(cursor.index_offset_by(2), Some(2));
        assert_eq!(cursor.index_offset_by(3), None);
        assert_eq!(cursor.index_after(4), 5);
        assert!(!cursor.is_at_last_index());
        cursor.advance_to(2);
        assert!(cursor.is_at_last_index());
        assert_eq!(cursor.to_string(), "2, \\n");
        cursor.advance_to(3);
        assert!(cursor.is_empty());
        assert_eq!(cursor.character(), None);
        assert_eq!(cursor.to_string(), "3, <end>");
    }

    #[test]
    fn test_start_at_clears_groups() {
        let mut cursor = Cursor::new("abc");
        cursor.open_group(1);
        cursor.advance_to(2);
        cursor.close_group(1);
        assert_eq!(cursor.group(1), Some((0, 2)));
        cursor.start_at(1);
        assert_eq!(cursor.index(), 1);
        assert_eq!(cursor.match_start(), 1);
        assert_eq!(cursor.start_index(), 0);
        assert!(cursor.groups().is_empty());
    }

    #[test]
    fn test_restore_group() {
        let mut cursor = Cursor::new("abc");
        let previous = cursor.close_group(2);
        assert_eq!(previous, None);
        cursor.restore_group(2, previous);
        assert_eq!(cursor.group(2), None);
    }

    #[test]
    fn test_word_boundary() {
        let mut cursor = Cursor::new("ab cd");
        assert!(cursor.is_at_word_boundary());
        cursor.advance_to(1);
        assert!(!cursor.is_at_word_boundary());
        cursor.advance_to(2);
        assert!(cursor.is_at_word_boundary());
        cursor.advance_to(5);
        assert!(cursor.is_at_word_boundary());
        assert!(!Cursor::new("").is_at_word_boundary());
    }

    #[test]
    fn test_starts_with() {
        let mut cursor = Cursor::new("hello");
        cursor.advance_to(1);
        assert!(cursor.starts_with(&['e', 'l']));
        assert!(!cursor.starts_with(&['l']));
        cursor.advance_to(5);
        assert!(cursor.starts_with(&[]));
        assert!(!cursor.starts_with(&['o']));
    }

    #[test]
    fn test_window() {
        let cursor = Cursor::with_window("abc", 10);
        assert_eq!(cursor.start_index(), 3);
        assert_eq!(cursor.index(), 3);
    }

    #[test]
    fn test_loop_frames() {
        let mut cursor = Cursor::new("aaa");
        let frame = LoopFrame { entry: 1 };
        assert_eq!(cursor.set_loop_frame(3, Some(frame)), None);
        assert_eq!(cursor.loop_frame(3), Some(frame));
        assert_eq!(cursor.loop_frame(0), None);
        cursor.start_at(0);
        assert_eq!(cursor.loop_frame(3), None);
    }

    #[test]
    fn test_slice_out_of_range() {
        let cursor = Cursor::new("abc");
        assert_eq!(cursor.slice(1, 3), Some(&['b', 'c'][..]));
        assert_eq!(cursor.slice(0, 0), Some(&[][..]));
        assert_eq!(cursor.slice(2, 5), None);
        assert_eq!(cursor.slice(3, 1), None);
    }
}
