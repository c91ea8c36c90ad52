//! A backtracking regular-expression engine over a state/transition graph.
//!
//! Patterns arrive as an [`Ast`], are compiled into an [`Automaton`] of
//! states connected by conditioned transitions, and are matched by walking
//! that graph with a [`Cursor`], trying transitions in priority order.
//!
//! ```
//! use nfa_regex::{Ast, Regex, Unit};
//!
//! // (a)(b)
//! let ast = Ast::new(Unit::sequence(vec![
//!     Unit::capture(1, vec![Unit::literal('a')]),
//!     Unit::capture(2, vec![Unit::literal('b')]),
//! ]));
//! let re = Regex::new(&ast).unwrap();
//! let m = re.find("xab").unwrap().unwrap();
//! assert_eq!(m.span(), 1..3);
//! assert_eq!(m.group(2), Some(2..3));
//! ```

pub mod ast;
pub mod charset;
pub mod compiler;
pub mod condition;
pub mod cursor;
pub mod error;
pub mod matcher;
pub mod regex;
pub mod state;

pub use crate::ast::{
    Anchor, Ast, CharacterGroup, CharacterGroupItem, Group, Quantifier, QuantifierKind, RangeQuantifier, Unit,
};
pub use crate::charset::MatchSet;
pub use crate::compiler::{CompileOptions, compile};
pub use crate::condition::{Condition, ConditionResult};
pub use crate::cursor::Cursor;
pub use crate::error::{CompileError, Error, Result, RuntimeError};
pub use crate::matcher::{MatchResult, Matcher, find_first_match};
pub use crate::regex::{Captures, Matches, Regex, RegexBuilder};
pub use crate::state::{Automaton, StateId, Transition};
