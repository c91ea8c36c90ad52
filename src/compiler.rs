/// Compiler: converts an AST into a state/transition graph for the matcher.

use std::collections::BTreeSet;

use log::debug;

use crate::ast::*;
use crate::charset::MatchSet;
use crate::condition::{Boundary, Condition, Epsilon};
use crate::error::CompileError;
use crate::state::{Automaton, GraphBuilder, StateId, Transition};

/// Compile-time switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompileOptions {
    /// `AnyCharacter` also matches `\n`.
    pub dot_matches_newline: bool,
    /// Treat the pattern as if `is_from_start_of_string` were set.
    pub anchored: bool,
}

/// A piece of graph with a single entry and a single exit.
#[derive(Debug, Clone, Copy)]
struct Fragment {
    start: StateId,
    accept: StateId,
}

struct Compiler {
    builder: GraphBuilder,
    options: CompileOptions,
    loop_count: usize,
}

/// Compile an AST into an automaton.
pub fn compile(ast: &Ast, options: CompileOptions) -> Result<Automaton, CompileError> {
    let groups = collect_groups(&ast.root)?;
    check_backreferences(&ast.root, &groups)?;

    let mut compiler = Compiler { builder: GraphBuilder::new(), options, loop_count: 0 };
    let body = compiler.emit(&ast.root)?;
    let anchored = ast.is_from_start_of_string || options.anchored;
    let start = if anchored {
        let start = compiler.builder.add_state();
        compiler.builder.add_transition(
            start,
            Transition::new(body.start, Condition::Epsilon(Epsilon::Guarded(Anchor::StartOfString))),
        );
        start
    } else {
        body.start
    };

    let loop_count = compiler.loop_count;
    let mut automaton = compiler.builder.finish(start, body.accept);
    automaton.group_indices = groups.into_iter().collect();
    automaton.loop_count = loop_count;
    automaton.anchored = anchored;
    automaton.first_char = first_char(&ast.root);
    debug!(
        "compiled pattern: {} states, {} transitions, {} groups, {} loops",
        automaton.len(),
        automaton.transition_count(),
        automaton.group_indices().len(),
        loop_count
    );
    Ok(automaton)
}

/// Capturing group indices, checked for presence and uniqueness.
fn collect_groups(root: &Unit) -> Result<BTreeSet<usize>, CompileError> {
    let mut groups = BTreeSet::new();
    for (unit, _) in root.visit() {
        if let Unit::Group(Group { index, is_capturing: true, .. }) = unit {
            match *index {
                None => return Err(CompileError::MissingGroupIndex),
                Some(0) => return Err(CompileError::InvalidGroupIndex(0)),
                Some(i) => {
                    if !groups.insert(i) {
                        return Err(CompileError::DuplicateGroupIndex(i));
                    }
                }
            }
        }
    }
    Ok(groups)
}

fn check_backreferences(root: &Unit, groups: &BTreeSet<usize>) -> Result<(), CompileError> {
    for (unit, _) in root.visit() {
        if let Unit::Backreference(index) = unit {
            if !groups.contains(index) {
                return Err(CompileError::InvalidBackreference(*index));
            }
        }
    }
    Ok(())
}

/// The literal every match of `unit` must start with, if there is one.
fn first_char(unit: &Unit) -> Option<char> {
    match unit {
        Unit::MatchCharacter(ch) => Some(*ch),
        Unit::MatchString(s) => s.chars().next(),
        Unit::ImplicitGroup(children) => children.first().and_then(first_char),
        Unit::Group(group) => group.children.first().and_then(first_char),
        Unit::QuantifiedExpression { expression, quantifier } => match quantifier.kind {
            QuantifierKind::OneOrMore => first_char(expression),
            QuantifierKind::Range(RangeQuantifier { lower_bound, .. }) if lower_bound > 0 => first_char(expression),
            _ => None,
        },
        _ => None,
    }
}

impl Compiler {
    fn emit(&mut self, unit: &Unit) -> Result<Fragment, CompileError> {
        match unit {
            Unit::MatchCharacter(ch) => Ok(self.leaf(Condition::Character(*ch))),
            Unit::MatchString(s) if s.is_empty() => Ok(self.leaf(Condition::epsilon())),
            Unit::MatchString(s) => Ok(self.leaf(Condition::String(s.chars().collect()))),
            Unit::AnyCharacter => Ok(self.leaf(Condition::AnyCharacter {
                including_newline: self.options.dot_matches_newline,
            })),
            Unit::MatchSet(set) => Ok(self.leaf(Condition::Set(set.clone()))),
            Unit::CharacterGroup(group) => {
                for item in &group.items {
                    if let CharacterGroupItem::Range(start, end) = *item {
                        if end < start {
                            return Err(CompileError::InvalidCharacterRange { start, end });
                        }
                    }
                }
                Ok(self.leaf(Condition::Set(MatchSet::from_group(group))))
            }
            Unit::Anchor(anchor) => Ok(self.leaf(Condition::Anchor(*anchor))),
            Unit::Backreference(index) => Ok(self.leaf(Condition::Backreference(*index))),
            Unit::ImplicitGroup(children) => self.emit_sequence(children),
            Unit::Group(Group { children, index, is_capturing }) => {
                let inner = self.emit_sequence(children)?;
                match (*is_capturing, *index) {
                    (true, Some(index)) => Ok(self.wrap_capture(inner, index)),
                    _ => Ok(inner),
                }
            }
            Unit::Alternation(branches) => self.emit_alternation(branches),
            Unit::QuantifiedExpression { expression, quantifier } => self.emit_quantifier(expression, quantifier),
        }
    }

    /// start --condition--> accept
    fn leaf(&mut self, condition: Condition) -> Fragment {
        let start = self.builder.add_state();
        let accept = self.builder.add_state();
        self.builder.add_transition(start, Transition::new(accept, condition));
        Fragment { start, accept }
    }

    fn emit_sequence(&mut self, children: &[Unit]) -> Result<Fragment, CompileError> {
        let parts = children.iter().map(|child| self.emit(child)).collect::<Result<Vec<_>, _>>()?;
        Ok(self.chain(parts))
    }

    fn wrap_capture(&mut self, inner: Fragment, index: usize) -> Fragment {
        let start = self.builder.add_state();
        let accept = self.builder.add_state();
        self.builder.add_transition(
            start,
            Transition::new(inner.start, Condition::Epsilon(Epsilon::GroupMarker { index, boundary: Boundary::Open })),
        );
        self.builder.add_transition(
            inner.accept,
            Transition::new(accept, Condition::Epsilon(Epsilon::GroupMarker { index, boundary: Boundary::Close })),
        );
        Fragment { start, accept }
    }

    fn emit_alternation(&mut self, branches: &[Unit]) -> Result<Fragment, CompileError> {
        if branches.is_empty() {
            return Err(CompileError::EmptyAlternation);
        }
        let start = self.builder.add_state();
        let accept = self.builder.add_state();
        // Edge order from `start` is branch priority.
        for branch in branches {
            let frag = self.emit(branch)?;
            self.builder.add_epsilon(start, frag.start);
            self.builder.add_epsilon(frag.accept, accept);
        }
        Ok(Fragment { start, accept })
    }

    fn emit_quantifier(&mut self, sub: &Unit, quantifier: &Quantifier) -> Result<Fragment, CompileError> {
        let lazy = quantifier.is_lazy;
        match quantifier.kind {
            QuantifierKind::ZeroOrMore => self.emit_loop(sub, 0, lazy),
            QuantifierKind::OneOrMore => self.emit_loop(sub, 1, lazy),
            QuantifierKind::ZeroOrOne => self.emit_optional(sub, lazy),
            QuantifierKind::Range(RangeQuantifier { lower_bound, upper_bound }) => {
                if let Some(upper) = upper_bound {
                    if upper < lower_bound {
                        return Err(CompileError::InvalidRange { lower: lower_bound, upper });
                    }
                }
                // First `lower_bound` copies are required
                let mut parts = Vec::new();
                for _ in 0..lower_bound {
                    parts.push(self.emit(sub)?);
                }
                // Then up to (upper - lower) optional copies, or an open-ended loop
                match upper_bound {
                    Some(upper) => {
                        for _ in 0..(upper - lower_bound) {
                            parts.push(self.emit_optional(sub, lazy)?);
                        }
                    }
                    None => parts.push(self.emit_loop(sub, 0, lazy)?),
                }
                Ok(self.chain(parts))
            }
        }
    }

    fn chain(&mut self, parts: Vec<Fragment>) -> Fragment {
        let mut iter = parts.into_iter();
        let Some(head) = iter.next() else {
            return self.leaf(Condition::epsilon());
        };
        let mut accept = head.accept;
        for next in iter {
            self.builder.add_epsilon(accept, next.start);
            accept = next.accept;
        }
        Fragment { start: head.start, accept }
    }

    /// start --> <sub> --> accept, with a bypass edge.
    /// Greedy tries the body first, lazy tries the bypass first.
    fn emit_optional(&mut self, sub: &Unit, lazy: bool) -> Result<Fragment, CompileError> {
        let start = self.builder.add_state();
        let accept = self.builder.add_state();
        let body = self.emit(sub)?;
        if lazy {
            self.builder.add_epsilon(start, accept);
            self.builder.add_epsilon(start, body.start);
        } else {
            self.builder.add_epsilon(start, body.start);
            self.builder.add_epsilon(start, accept);
        }
        self.builder.add_epsilon(body.accept, accept);
        Ok(Fragment { start, accept })
    }

    /// `*` (min 0) or `+` (min 1) around a single copy of `sub`.
    ///
    ///   start --enter--> <sub> --iterate--> <sub start>
    ///     |                  \--exit------> accept
    ///     \--(min 0 only)----------------> accept
    fn emit_loop(&mut self, sub: &Unit, min: usize, lazy: bool) -> Result<Fragment, CompileError> {
        let id = self.loop_count;
        self.loop_count += 1;
        let start = self.builder.add_state();
        let accept = self.builder.add_state();
        let body = self.emit(sub)?;

        let enter = Transition::new(body.start, Condition::Epsilon(Epsilon::LoopEnter { id }));
        if min == 0 {
            if lazy {
                self.builder.add_epsilon(start, accept);
                self.builder.add_transition(start, enter);
            } else {
                self.builder.add_transition(start, enter);
                self.builder.add_epsilon(start, accept);
            }
        } else {
            self.builder.add_transition(start, enter);
        }

        let iterate = Transition::new(body.start, Condition::Epsilon(Epsilon::LoopIterate { id }));
        let exit = Transition::new(accept, Condition::Epsilon(Epsilon::LoopExit { id }));
        if lazy {
            self.builder.add_transition(body.accept, exit);
            self.builder.add_transition(body.accept, iterate);
        } else {
            self.builder.add_transition(body.accept, iterate);
            self.builder.add_transition(body.accept, exit);
        }
        Ok(Fragment { start, accept })
    }
}
