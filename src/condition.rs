/// Transition conditions: predicates over a cursor that decide whether an edge
/// may be taken and how many characters it consumes.

use std::fmt;

use crate::ast::Anchor;
use crate::charset::MatchSet;
use crate::cursor::Cursor;

/// Outcome of evaluating a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionResult {
    /// The transition may fire, consuming `count` characters.
    Accepted(usize),
    Rejected,
}

impl ConditionResult {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ConditionResult::Accepted(_))
    }

    pub fn count(&self) -> Option<usize> {
        match self {
            ConditionResult::Accepted(count) => Some(*count),
            ConditionResult::Rejected => None,
        }
    }
}

/// Which side of a capturing group a marker sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    Open,
    Close,
}

/// Zero-width transitions. Only `Unconditional` is free of side effects;
/// the matcher applies the effect of markers when it takes the edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Epsilon {
    Unconditional,
    /// Fires only where the anchor holds.
    Guarded(Anchor),
    /// Records a group boundary at the current index.
    GroupMarker { index: usize, boundary: Boundary },
    /// Enters loop `id`: starts its first iteration here.
    LoopEnter { id: usize },
    /// Starts another iteration of loop `id`. Requires progress since the current iteration began.
    LoopIterate { id: usize },
    /// Leaves loop `id`. Always allowed once the loop was entered, so an
    /// iteration that matched empty ends the loop instead of being discarded.
    LoopExit { id: usize },
}

/// Condition attached to a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// A single literal character.
    Character(char),
    /// A literal string, consumed as a whole.
    String(Vec<char>),
    AnyCharacter { including_newline: bool },
    Set(MatchSet),
    Epsilon(Epsilon),
    Anchor(Anchor),
    /// The text captured by group `index`.
    Backreference(usize),
}

impl Condition {
    pub fn epsilon() -> Self {
        Condition::Epsilon(Epsilon::Unconditional)
    }

    /// Evaluate against `cursor` without moving it.
    pub fn can_perform_transition(&self, cursor: &Cursor) -> ConditionResult {
        match self {
            Condition::Character(expected) => accept_if(cursor.character() == Some(*expected), 1),
            Condition::String(expected) => accept_if(cursor.starts_with(expected), expected.len()),
            Condition::AnyCharacter { including_newline } => match cursor.character() {
                Some('\n') => accept_if(*including_newline, 1),
                Some(_) => ConditionResult::Accepted(1),
                None => ConditionResult::Rejected,
            },
            Condition::Set(set) => accept_if(cursor.character().is_some_and(|ch| set.contains(ch)), 1),
            Condition::Epsilon(epsilon) => accept_if(epsilon_holds(*epsilon, cursor), 0),
            Condition::Anchor(anchor) => accept_if(anchor_holds(*anchor, cursor), 0),
            Condition::Backreference(index) => {
                match cursor.group(*index).and_then(|(start, end)| cursor.slice(start, end)) {
                    Some(captured) => accept_if(cursor.starts_with(captured), captured.len()),
                    None => ConditionResult::Rejected,
                }
            }
        }
    }

    /// True for conditions that never consume input.
    pub fn is_zero_width(&self) -> bool {
        matches!(self, Condition::Epsilon(_) | Condition::Anchor(_))
    }
}

fn accept_if(cond: bool, count: usize) -> ConditionResult {
    if cond { ConditionResult::Accepted(count) } else { ConditionResult::Rejected }
}

fn anchor_holds(anchor: Anchor, cursor: &Cursor) -> bool {
    match anchor {
        Anchor::StartOfString => cursor.index() == cursor.start_index(),
        Anchor::EndOfString => cursor.index() == cursor.end_index(),
        Anchor::WordBoundary => cursor.is_at_word_boundary(),
    }
}

fn epsilon_holds(epsilon: Epsilon, cursor: &Cursor) -> bool {
    match epsilon {
        Epsilon::Unconditional | Epsilon::GroupMarker { .. } | Epsilon::LoopEnter { .. } => true,
        Epsilon::Guarded(anchor) => anchor_holds(anchor, cursor),
        Epsilon::LoopIterate { id } => match cursor.loop_frame(id) {
            Some(frame) => cursor.index() != frame.entry,
            None => false,
        },
        Epsilon::LoopExit { id } => cursor.loop_frame(id).is_some(),
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Character(ch) => write!(f, "char {:?}", ch),
            Condition::String(chars) => write!(f, "string {:?}", chars.iter().collect::<String>()),
            Condition::AnyCharacter { including_newline: true } => write!(f, "any"),
            Condition::AnyCharacter { including_newline: false } => write!(f, "any except \\n"),
            Condition::Set(set) => write!(f, "set {}", set),
            Condition::Anchor(anchor) => write!(f, "anchor {}", anchor),
            Condition::Backreference(index) => write!(f, "backref \\{}", index),
            Condition::Epsilon(Epsilon::Unconditional) => write!(f, "epsilon"),
            Condition::Epsilon(Epsilon::Guarded(anchor)) => write!(f, "epsilon if {}", anchor),
            Condition::Epsilon(Epsilon::GroupMarker { index, boundary: Boundary::Open }) => {
                write!(f, "open group {}", index)
            }
            Condition::Epsilon(Epsilon::GroupMarker { index, boundary: Boundary::Close }) => {
                write!(f, "close group {}", index)
            }
            Condition::Epsilon(Epsilon::LoopEnter { id }) => write!(f, "enter loop {}", id),
            Condition::Epsilon(Epsilon::LoopIterate { id }) => write!(f, "repeat loop {}", id),
            Condition::Epsilon(Epsilon::LoopExit { id }) => write!(f, "exit loop {}", id),
        }
    }
}
