/// State/transition graph produced by the compiler.
///
/// States live in an arena and are identified by their position in it, so two
/// states with identical edges are still distinct.

use std::fmt;

use crate::condition::{Condition, Epsilon};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(usize);

impl StateId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub target: StateId,
    pub condition: Condition,
}

impl Transition {
    pub fn new(target: StateId, condition: Condition) -> Self {
        Transition { target, condition }
    }

    /// A transition that consumes nothing and always fires.
    pub fn epsilon(target: StateId) -> Self {
        Transition::new(target, Condition::epsilon())
    }

    pub fn is_unconditional_epsilon(&self) -> bool {
        matches!(self.condition, Condition::Epsilon(Epsilon::Unconditional))
    }
}

/// A node of the graph. Outgoing transitions are kept in priority order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct State {
    transitions: Vec<Transition>,
}

impl State {
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }
}

/// Arena of states under construction.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    states: Vec<State>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_state(&mut self) -> StateId {
        self.states.push(State::default());
        StateId(self.states.len() - 1)
    }

    /// Append a transition; earlier transitions are tried first.
    pub fn add_transition(&mut self, from: StateId, transition: Transition) {
        self.states[from.0].transitions.push(transition);
    }

    pub fn add_epsilon(&mut self, from: StateId, to: StateId) {
        self.add_transition(from, Transition::epsilon(to));
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn finish(self, start: StateId, accept: StateId) -> Automaton {
        Automaton {
            states: self.states,
            start,
            accept,
            group_indices: Vec::new(),
            loop_count: 0,
            anchored: false,
            first_char: None,
        }
    }
}

/// Compiled, immutable automaton with one start and one accepting state.
#[derive(Debug, Clone)]
pub struct Automaton {
    states: Vec<State>,
    start: StateId,
    accept: StateId,
    pub(crate) group_indices: Vec<usize>,
    pub(crate) loop_count: usize,
    /// Only try a match at the start of the search window.
    pub(crate) anchored: bool,
    /// A literal every match must begin with, used to skip hopeless offsets.
    pub(crate) first_char: Option<char>,
}

impl Automaton {
    pub fn start(&self) -> StateId {
        self.start
    }

    pub fn is_accepting(&self, state: StateId) -> bool {
        state == self.accept
    }

    pub fn state(&self, id: StateId) -> &State {
        &self.states[id.0]
    }

    pub fn transitions(&self, id: StateId) -> &[Transition] {
        self.states[id.0].transitions()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn transition_count(&self) -> usize {
        self.states.iter().map(|s| s.transitions.len()).sum()
    }

    /// Indices of the capturing groups, ascending.
    pub fn group_indices(&self) -> &[usize] {
        &self.group_indices
    }

    pub fn loop_count(&self) -> usize {
        self.loop_count
    }

    pub fn is_anchored(&self) -> bool {
        self.anchored
    }

    pub fn first_char(&self) -> Option<char> {
        self.first_char
    }
}

impl fmt::Display for Automaton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, state) in self.states.iter().enumerate() {
            let id = StateId(i);
            let mut tags = String::new();
            if id == self.start {
                tags.push_str(" (start)");
            }
            if id == self.accept {
                tags.push_str(" (accept)");
            }
            writeln!(f, "{}{}", id, tags)?;
            for t in &state.transitions {
                writeln!(f, "  -> {} on {}", t.target, t.condition)?;
            }
        }
        Ok(())
    }
}
