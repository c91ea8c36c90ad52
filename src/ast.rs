/// AST types for the regex engine.

use std::fmt;

use crate::charset::MatchSet;

/// A single unit of a pattern.
///
/// Composite units (`ImplicitGroup`, `Group`, `Alternation`, `QuantifiedExpression`)
/// own their children; every other variant is a leaf. The tree is never mutated
/// once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unit {
    /// Concatenation of units; does not capture.
    ImplicitGroup(Vec<Unit>),
    /// Explicit group `(...)` or `(?:...)`.
    Group(Group),
    /// Ordered alternatives (`a|b`). The first alternative that leads to a match wins.
    Alternation(Vec<Unit>),
    /// A unit repeated according to a quantifier.
    QuantifiedExpression {
        expression: Box<Unit>,
        quantifier: Quantifier,
    },
    /// Backreference `\1`, `\2`, etc.
    Backreference(usize),
    /// Zero-width positional assertion.
    Anchor(Anchor),
    /// Matches any character (except newline unless configured otherwise).
    AnyCharacter,
    /// Matches a single literal character.
    MatchCharacter(char),
    /// Matches a literal string as a whole.
    MatchString(String),
    /// Matches one character from a precompiled set.
    MatchSet(MatchSet),
    /// Character group like `[abc]`, `[a-z]`, `[^abc]`.
    CharacterGroup(CharacterGroup),
}

/// An explicit group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub children: Vec<Unit>,
    /// 1-based index, present for capturing groups only.
    pub index: Option<usize>,
    pub is_capturing: bool,
}

/// Repetition operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quantifier {
    pub kind: QuantifierKind,
    pub is_lazy: bool,
}

/// Kind of quantifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantifierKind {
    /// `*`
    ZeroOrMore,
    /// `+`
    OneOrMore,
    /// `?`
    ZeroOrOne,
    /// `{n}`, `{n,}`, `{n,m}`
    Range(RangeQuantifier),
}

/// Bounds of a `{n,m}` quantifier. An absent upper bound means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeQuantifier {
    pub lower_bound: usize,
    pub upper_bound: Option<usize>,
}

/// Anchor kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anchor {
    /// `^`
    StartOfString,
    /// `$`
    EndOfString,
    /// `\b`
    WordBoundary,
}

/// `[...]` character group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterGroup {
    pub is_inverted: bool,
    pub items: Vec<CharacterGroupItem>,
}

/// Item within a character group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharacterGroupItem {
    /// Single character.
    Character(char),
    /// Inclusive code point range `a-z`.
    Range(char, char),
}

/// A whole pattern: its root unit and whether it only matches at the start of the string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ast {
    pub is_from_start_of_string: bool,
    pub root: Unit,
}

impl Quantifier {
    pub fn zero_or_more() -> Self {
        Quantifier { kind: QuantifierKind::ZeroOrMore, is_lazy: false }
    }

    pub fn one_or_more() -> Self {
        Quantifier { kind: QuantifierKind::OneOrMore, is_lazy: false }
    }

    pub fn zero_or_one() -> Self {
        Quantifier { kind: QuantifierKind::ZeroOrOne, is_lazy: false }
    }

    pub fn range(lower_bound: usize, upper_bound: Option<usize>) -> Self {
        Quantifier {
            kind: QuantifierKind::Range(RangeQuantifier { lower_bound, upper_bound }),
            is_lazy: false,
        }
    }

    /// The same quantifier, preferring fewer repetitions.
    pub fn lazy(self) -> Self {
        Quantifier { is_lazy: true, ..self }
    }
}

impl Unit {
    pub fn literal(ch: char) -> Unit {
        Unit::MatchCharacter(ch)
    }

    pub fn string(s: &str) -> Unit {
        Unit::MatchString(s.to_string())
    }

    pub fn sequence(children: Vec<Unit>) -> Unit {
        Unit::ImplicitGroup(children)
    }

    pub fn alternation(children: Vec<Unit>) -> Unit {
        Unit::Alternation(children)
    }

    pub fn capture(index: usize, children: Vec<Unit>) -> Unit {
        Unit::Group(Group { children, index: Some(index), is_capturing: true })
    }

    pub fn non_capturing(children: Vec<Unit>) -> Unit {
        Unit::Group(Group { children, index: None, is_capturing: false })
    }

    pub fn quantified(expression: Unit, quantifier: Quantifier) -> Unit {
        Unit::QuantifiedExpression { expression: Box::new(expression), quantifier }
    }

    pub fn star(expression: Unit) -> Unit {
        Unit::quantified(expression, Quantifier::zero_or_more())
    }

    pub fn plus(expression: Unit) -> Unit {
        Unit::quantified(expression, Quantifier::one_or_more())
    }

    pub fn optional(expression: Unit) -> Unit {
        Unit::quantified(expression, Quantifier::zero_or_one())
    }

    pub fn repeat(expression: Unit, lower_bound: usize, upper_bound: Option<usize>) -> Unit {
        Unit::quantified(expression, Quantifier::range(lower_bound, upper_bound))
    }

    pub fn class(is_inverted: bool, items: Vec<CharacterGroupItem>) -> Unit {
        Unit::CharacterGroup(CharacterGroup { is_inverted, items })
    }

    /// Children of a composite unit; empty for leaves.
    pub fn children(&self) -> &[Unit] {
        match self {
            Unit::ImplicitGroup(children) | Unit::Alternation(children) => children.as_slice(),
            Unit::Group(group) => group.children.as_slice(),
            Unit::QuantifiedExpression { expression, .. } => std::slice::from_ref(expression.as_ref()),
            _ => &[],
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(
            self,
            Unit::ImplicitGroup(_) | Unit::Group(_) | Unit::Alternation(_) | Unit::QuantifiedExpression { .. }
        )
    }

    /// Pre-order traversal of this unit and its descendants.
    pub fn visit(&self) -> Visit<'_> {
        Visit { stack: vec![(self, 0)] }
    }

    /// One-line description of this unit, without its children.
    pub fn description(&self) -> String {
        match self {
            Unit::ImplicitGroup(_) => "ImplicitGroup".to_string(),
            Unit::Group(Group { index: Some(index), is_capturing: true, .. }) => {
                format!("Group(index: {})", index)
            }
            Unit::Group(Group { is_capturing: true, .. }) => "Group(index: none)".to_string(),
            Unit::Group(_) => "Group(non-capturing)".to_string(),
            Unit::Alternation(_) => "Alternation".to_string(),
            Unit::QuantifiedExpression { quantifier, .. } => {
                format!("QuantifiedExpression({})", quantifier)
            }
            Unit::Backreference(index) => format!("Backreference({})", index),
            Unit::Anchor(anchor) => format!("Anchor({})", anchor),
            Unit::AnyCharacter => "AnyCharacter".to_string(),
            Unit::MatchCharacter(ch) => format!("Character({:?})", ch),
            Unit::MatchString(s) => format!("String({:?})", s),
            Unit::MatchSet(set) => format!("Set({})", set),
            Unit::CharacterGroup(group) => format!("CharacterGroup({})", group),
        }
    }
}

impl Ast {
    pub fn new(root: Unit) -> Self {
        Ast { is_from_start_of_string: false, root }
    }

    /// A pattern anchored at the start of the string.
    pub fn anchored(root: Unit) -> Self {
        Ast { is_from_start_of_string: true, root }
    }

    /// Pre-order traversal yielding `(unit, depth)` pairs, the root at depth 0.
    pub fn visit(&self) -> Visit<'_> {
        self.root.visit()
    }
}

/// Explicit-stack pre-order iterator over a unit tree.
pub struct Visit<'a> {
    stack: Vec<(&'a Unit, usize)>,
}

impl<'a> Iterator for Visit<'a> {
    type Item = (&'a Unit, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (unit, depth) = self.stack.pop()?;
        for child in unit.children().iter().rev() {
            self.stack.push((child, depth + 1));
        }
        Some((unit, depth))
    }
}

impl fmt::Display for Ast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (unit, depth)) in self.visit().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{:indent$}- {}", "", unit.description(), indent = depth * 2)?;
        }
        Ok(())
    }
}

impl fmt::Display for Quantifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            QuantifierKind::ZeroOrMore => write!(f, "*")?,
            QuantifierKind::OneOrMore => write!(f, "+")?,
            QuantifierKind::ZeroOrOne => write!(f, "?")?,
            QuantifierKind::Range(RangeQuantifier { lower_bound, upper_bound: Some(upper) })
                if upper == lower_bound =>
            {
                write!(f, "{{{}}}", lower_bound)?
            }
            QuantifierKind::Range(RangeQuantifier { lower_bound, upper_bound: Some(upper) }) => {
                write!(f, "{{{},{}}}", lower_bound, upper)?
            }
            QuantifierKind::Range(RangeQuantifier { lower_bound, upper_bound: None }) => {
                write!(f, "{{{},}}", lower_bound)?
            }
        }
        if self.is_lazy {
            write!(f, "?")?;
        }
        Ok(())
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Anchor::StartOfString => "startOfString",
            Anchor::EndOfString => "endOfString",
            Anchor::WordBoundary => "wordBoundary",
        };
        f.write_str(name)
    }
}

impl fmt::Display for CharacterGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        if self.is_inverted {
            write!(f, "^")?;
        }
        for item in &self.items {
            match item {
                CharacterGroupItem::Character(ch) => write!(f, "{}", ch.escape_debug())?,
                CharacterGroupItem::Range(start, end) => {
                    write!(f, "{}-{}", start.escape_debug(), end.escape_debug())?
                }
            }
        }
        write!(f, "]")
    }
}
