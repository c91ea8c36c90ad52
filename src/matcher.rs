/// Matcher: walks a compiled automaton against a cursor.
/// Uses ordered backtracking so that transition order decides which match wins
/// (leftmost-first, like Perl-style engines).
///
/// Implementation notes:
/// - Choice points live on an explicit stack, so deep inputs cannot overflow the call stack
/// - Undo log instead of cloning the group map at every choice point
/// - Step ceiling so pathological patterns end with an error instead of running forever

use std::collections::BTreeMap;
use std::ops::Range;

use log::{debug, trace, warn};

use crate::condition::{Boundary, Condition, ConditionResult, Epsilon};
use crate::cursor::{Cursor, LoopFrame};
use crate::error::RuntimeError;
use crate::state::{Automaton, StateId};

/// Default ceiling on transition evaluations per search.
pub const DEFAULT_STEP_LIMIT: usize = 1_000_000;

/// Result of a successful match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    start: usize,
    end: usize,
    groups: BTreeMap<usize, (usize, usize)>,
}

impl MatchResult {
    /// Start position in the input.
    pub fn start(&self) -> usize {
        self.start
    }

    /// End position in the input (exclusive).
    pub fn end(&self) -> usize {
        self.end
    }

    pub fn span(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Span of capturing group `index`; `None` if the group did not take part in the match.
    pub fn group(&self, index: usize) -> Option<Range<usize>> {
        self.groups.get(&index).map(|&(start, end)| start..end)
    }

    /// Every group that captured, by ascending index.
    pub fn groups(&self) -> impl Iterator<Item = (usize, Range<usize>)> + '_ {
        self.groups.iter().map(|(&index, &(start, end))| (index, start..end))
    }
}

/// Entry in the undo log: the value a mutation replaced.
#[derive(Debug, Clone, Copy)]
enum Undo {
    GroupStart(usize, Option<usize>),
    GroupSpan(usize, Option<(usize, usize)>),
    Loop(usize, Option<LoopFrame>),
}

/// A state with transitions left to try.
#[derive(Debug, Clone, Copy)]
struct Choice {
    state: StateId,
    next: usize,
    index: usize,
    undo_mark: usize,
}

/// Backtracking executor for one automaton. Reusable across searches.
pub struct Matcher<'a> {
    automaton: &'a Automaton,
    step_limit: usize,
    steps: usize,
    stack: Vec<Choice>,
    undo_log: Vec<Undo>,
}

/// Find the first match anywhere in `text` with the default step ceiling.
pub fn find_first_match(automaton: &Automaton, text: &str) -> Result<Option<MatchResult>, RuntimeError> {
    let mut cursor = Cursor::new(text);
    Matcher::new(automaton).search(&mut cursor, 0)
}

impl<'a> Matcher<'a> {
    pub fn new(automaton: &'a Automaton) -> Self {
        Self::with_step_limit(automaton, DEFAULT_STEP_LIMIT)
    }

    pub fn with_step_limit(automaton: &'a Automaton, step_limit: usize) -> Self {
        Matcher { automaton, step_limit, steps: 0, stack: Vec::new(), undo_log: Vec::new() }
    }

    /// Steps spent by the last search.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Try offsets `from..=end` in order and return the first that matches.
    /// An anchored automaton is only tried at the cursor's window start.
    pub fn search(&mut self, cursor: &mut Cursor, from: usize) -> Result<Option<MatchResult>, RuntimeError> {
        self.steps = 0;
        let end = cursor.end_index();
        if self.automaton.is_anchored() {
            let start = cursor.start_index();
            if from > start {
                return Ok(None);
            }
            return self.attempt(cursor, start);
        }

        let from = from.max(cursor.start_index());
        for offset in from..=end {
            // Skip offsets where the required first literal can't match
            if let Some(fc) = self.automaton.first_char() {
                if cursor.chars().get(offset) != Some(&fc) {
                    continue;
                }
            }
            if let Some(m) = self.attempt(cursor, offset)? {
                return Ok(Some(m));
            }
        }
        Ok(None)
    }

    /// Match starting exactly at `offset`, without trying later offsets.
    pub fn match_at(&mut self, cursor: &mut Cursor, offset: usize) -> Result<Option<MatchResult>, RuntimeError> {
        self.steps = 0;
        self.attempt(cursor, offset)
    }

    fn attempt(&mut self, cursor: &mut Cursor, offset: usize) -> Result<Option<MatchResult>, RuntimeError> {
        trace!("attempting match at offset {}", offset);
        cursor.start_at(offset);
        if !self.run(cursor)? {
            return Ok(None);
        }
        let m = MatchResult { start: offset, end: cursor.index(), groups: cursor.groups().clone() };
        debug!("match found at {}..{}", m.start, m.end);
        Ok(Some(m))
    }

    /// Depth-first walk from the start state. Returns true once the accepting
    /// state is reached; the cursor then holds the end index and the groups.
    fn run(&mut self, cursor: &mut Cursor) -> Result<bool, RuntimeError> {
        self.stack.clear();
        self.undo_log.clear();
        let mut state = self.automaton.start();
        loop {
            if self.automaton.is_accepting(state) {
                return Ok(true);
            }
            self.stack.push(Choice { state, next: 0, index: cursor.index(), undo_mark: self.undo_log.len() });
            match self.step(cursor)? {
                Some(next) => state = next,
                None => return Ok(false),
            }
        }
    }

    /// Take the next viable transition from the innermost choice point,
    /// backtracking through exhausted ones. `None` means no path is left.
    fn step(&mut self, cursor: &mut Cursor) -> Result<Option<StateId>, RuntimeError> {
        let automaton = self.automaton;
        while let Some(choice) = self.stack.last_mut() {
            cursor.advance_to(choice.index);
            rollback(cursor, &mut self.undo_log, choice.undo_mark);

            let transitions = automaton.transitions(choice.state);
            let mut taken = None;
            while let Some(transition) = transitions.get(choice.next) {
                choice.next += 1;
                self.steps += 1;
                if self.steps > self.step_limit {
                    warn!("step limit of {} exceeded, abandoning search", self.step_limit);
                    return Err(RuntimeError::StepLimitExceeded { limit: self.step_limit });
                }
                if let ConditionResult::Accepted(count) = transition.condition.can_perform_transition(cursor) {
                    apply_effect(&transition.condition, cursor, &mut self.undo_log);
                    cursor.advance_to(cursor.index() + count);
                    taken = Some(transition.target);
                    break;
                }
            }

            // The last alternative needs no choice point; its effects are
            // undone by whichever choice below it is retried.
            if choice.next >= transitions.len() {
                self.stack.pop();
            }
            if taken.is_some() {
                return Ok(taken);
            }
        }
        Ok(None)
    }
}

/// Apply the side effect of a marker transition, logging what it replaced.
fn apply_effect(condition: &Condition, cursor: &mut Cursor, undo_log: &mut Vec<Undo>) {
    let Condition::Epsilon(epsilon) = condition else {
        return;
    };
    match *epsilon {
        Epsilon::GroupMarker { index, boundary: Boundary::Open } => {
            let previous = cursor.open_group(index);
            undo_log.push(Undo::GroupStart(index, previous));
        }
        Epsilon::GroupMarker { index, boundary: Boundary::Close } => {
            let previous = cursor.close_group(index);
            undo_log.push(Undo::GroupSpan(index, previous));
        }
        Epsilon::LoopEnter { id } | Epsilon::LoopIterate { id } => {
            let previous = cursor.set_loop_frame(id, Some(LoopFrame { entry: cursor.index() }));
            undo_log.push(Undo::Loop(id, previous));
        }
        Epsilon::Unconditional | Epsilon::Guarded(_) | Epsilon::LoopExit { .. } => {}
    }
}

/// Undo every mutation logged after `mark`, newest first.
fn rollback(cursor: &mut Cursor, undo_log: &mut Vec<Undo>, mark: usize) {
    while undo_log.len() > mark {
        match undo_log.pop() {
            Some(Undo::GroupStart(index, previous)) => cursor.restore_group_start(index, previous),
            Some(Undo::GroupSpan(index, previous)) => cursor.restore_group(index, previous),
            Some(Undo::Loop(id, previous)) => {
                cursor.set_loop_frame(id, previous);
            }
            None => break,
        }
    }
}
