//! Compiled regular expressions and their search API.

use crate::ast::Ast;
use crate::compiler::{CompileOptions, compile};
use crate::cursor::Cursor;
use crate::error::Result;
use crate::matcher::{DEFAULT_STEP_LIMIT, MatchResult, Matcher};
use crate::state::Automaton;

#[derive(Debug, Clone, Copy)]
struct RegexOptions {
    backtrack_limit: usize,
    dot_matches_newline: bool,
    anchored: bool,
}

impl Default for RegexOptions {
    fn default() -> Self {
        RegexOptions { backtrack_limit: DEFAULT_STEP_LIMIT, dot_matches_newline: false, anchored: false }
    }
}

/// A builder for a `Regex` to allow configuring options.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexBuilder(RegexOptions);

impl RegexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile `ast` with the configured options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Compile`](crate::Error::Compile) if the pattern is malformed.
    pub fn build(&self, ast: &Ast) -> Result<Regex> {
        let options = CompileOptions { dot_matches_newline: self.0.dot_matches_newline, anchored: self.0.anchored };
        let automaton = compile(ast, options)?;
        Ok(Regex { automaton, options: self.0 })
    }

    /// Limit on transition evaluations per search. Exceeding it makes the search
    /// return [`RuntimeError::StepLimitExceeded`](crate::RuntimeError::StepLimitExceeded).
    ///
    /// Default is `1_000_000`.
    pub fn backtrack_limit(&mut self, limit: usize) -> &mut Self {
        self.0.backtrack_limit = limit;
        self
    }

    /// Let `AnyCharacter` match `\n`. Default is `false`.
    pub fn dot_matches_newline(&mut self, yes: bool) -> &mut Self {
        self.0.dot_matches_newline = yes;
        self
    }

    /// Only match at the start of the search window, whatever the AST says.
    pub fn anchored(&mut self, yes: bool) -> &mut Self {
        self.0.anchored = yes;
        self
    }
}

/// A compiled pattern.
#[derive(Debug, Clone)]
pub struct Regex {
    automaton: Automaton,
    options: RegexOptions,
}

impl Regex {
    /// Compile `ast` with default options.
    pub fn new(ast: &Ast) -> Result<Regex> {
        RegexBuilder::new().build(ast)
    }

    pub fn automaton(&self) -> &Automaton {
        &self.automaton
    }

    fn matcher(&self) -> Matcher<'_> {
        Matcher::with_step_limit(&self.automaton, self.options.backtrack_limit)
    }

    pub fn is_match(&self, text: &str) -> Result<bool> {
        Ok(self.find(text)?.is_some())
    }

    /// First match in `text`. Positions are `char` indices.
    pub fn find(&self, text: &str) -> Result<Option<MatchResult>> {
        self.find_at(text, 0)
    }

    /// First match in the window of `text` that begins at char index `start`.
    /// `startOfString` holds at `start`.
    pub fn find_at(&self, text: &str, start: usize) -> Result<Option<MatchResult>> {
        let mut cursor = Cursor::with_window(text, start);
        let from = cursor.start_index();
        Ok(self.matcher().search(&mut cursor, from)?)
    }

    pub fn captures<'t>(&self, text: &'t str) -> Result<Option<Captures<'t>>> {
        Ok(self.find(text)?.map(|result| Captures::new(text, result)))
    }

    /// Successive non-overlapping matches, left to right.
    pub fn find_iter<'r>(&'r self, text: &str) -> Matches<'r> {
        Matches { matcher: self.matcher(), cursor: Cursor::new(text), done: false }
    }
}

/// A match together with the text it was found in.
#[derive(Debug, Clone)]
pub struct Captures<'t> {
    text: &'t str,
    // Byte offset of each char, plus the end of the text.
    offsets: Vec<usize>,
    result: MatchResult,
}

impl<'t> Captures<'t> {
    fn new(text: &'t str, result: MatchResult) -> Self {
        let offsets = text.char_indices().map(|(i, _)| i).chain(std::iter::once(text.len())).collect();
        Captures { text, offsets, result }
    }

    pub fn result(&self) -> &MatchResult {
        &self.result
    }

    /// Text of group `index`; group 0 is the whole match.
    pub fn get(&self, index: usize) -> Option<&'t str> {
        let span = if index == 0 { Some(self.result.span()) } else { self.result.group(index) }?;
        let start = *self.offsets.get(span.start)?;
        let end = *self.offsets.get(span.end)?;
        self.text.get(start..end)
    }
}

/// Iterator returned by [`Regex::find_iter`].
pub struct Matches<'r> {
    matcher: Matcher<'r>,
    cursor: Cursor,
    done: bool,
}

impl Iterator for Matches<'_> {
    type Item = Result<MatchResult>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let from = match self.cursor.previous_match_index() {
            None => self.cursor.start_index(),
            Some(_) => self.cursor.index(),
        };
        if from > self.cursor.end_index() {
            self.done = true;
            return None;
        }
        match self.matcher.search(&mut self.cursor, from) {
            Ok(Some(m)) => {
                self.cursor.advance_to_end_of_match(&m);
                Some(Ok(m))
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e.into()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Anchor, CharacterGroupItem, Unit};
    use crate::error::{CompileError, Error, RuntimeError};

    fn regex(root: Unit) -> Regex {
        Regex::new(&Ast::new(root)).unwrap()
    }

    #[test]
    fn test_is_match() {
        let re = regex(Unit::string("needle"));
        assert!(re.is_match("haystack with needle").unwrap());
        assert!(!re.is_match("haystack").unwrap());
    }

    #[test]
    fn test_captures_text() {
        // ([a-z]+)@([a-z]+)
        let word = || Unit::plus(Unit::class(false, vec![CharacterGroupItem::Range('a', 'z')]));
        let re = regex(Unit::sequence(vec![
            Unit::capture(1, vec![word()]),
            Unit::literal('@'),
            Unit::capture(2, vec![word()]),
        ]));
        let caps = re.captures("mail: ann@host!").unwrap().unwrap();
        assert_eq!(caps.get(0), Some("ann@host"));
        assert_eq!(caps.get(1), Some("ann"));
        assert_eq!(caps.get(2), Some("host"));
        assert_eq!(caps.get(3), None);
    }

    #[test]
    fn test_captures_multibyte_text() {
        // (é+)ü
        let re = regex(Unit::sequence(vec![Unit::capture(1, vec![Unit::plus(Unit::literal('é'))]), Unit::literal('ü')]));
        let caps = re.captures("naïve ééü!").unwrap().unwrap();
        assert_eq!(caps.result().span(), 6..9);
        assert_eq!(caps.get(0), Some("ééü"));
        assert_eq!(caps.get(1), Some("éé"));
    }

    #[test]
    fn test_char_indices() {
        let re = regex(Unit::literal('é'));
        let m = re.find("caféé").unwrap().unwrap();
        assert_eq!(m.span(), 3..4);
    }

    #[test]
    fn test_find_iter() {
        let re = regex(Unit::plus(Unit::literal('a')));
        let spans: Vec<_> = re.find_iter("aa b aaa").map(|m| m.unwrap().span()).collect();
        assert_eq!(spans, vec![0..2, 5..8]);
    }

    #[test]
    fn test_find_iter_empty_matches_advance() {
        let re = regex(Unit::star(Unit::literal('a')));
        let spans: Vec<_> = re.find_iter("baa").map(|m| m.unwrap().span()).collect();
        assert_eq!(spans, vec![0..0, 1..3, 3..3]);
    }

    #[test]
    fn test_find_iter_keeps_start_anchor() {
        let re = regex(Unit::sequence(vec![Unit::Anchor(Anchor::StartOfString), Unit::literal('a')]));
        let spans: Vec<_> = re.find_iter("aaa").map(|m| m.unwrap().span()).collect();
        assert_eq!(spans, vec![0..1]);
    }

    #[test]
    fn test_find_at() {
        let re = regex(Unit::sequence(vec![Unit::Anchor(Anchor::StartOfString), Unit::literal('b')]));
        assert_eq!(re.find("ab").unwrap(), None);
        assert_eq!(re.find_at("ab", 1).unwrap().map(|m| m.span()), Some(1..2));
    }

    #[test]
    fn test_builder_options() {
        let ast = Ast::new(Unit::AnyCharacter);
        let strict = Regex::new(&ast).unwrap();
        assert!(!strict.is_match("\n").unwrap());
        let lenient = RegexBuilder::new().dot_matches_newline(true).build(&ast).unwrap();
        assert!(lenient.is_match("\n").unwrap());

        let anchored = RegexBuilder::new().anchored(true).build(&Ast::new(Unit::literal('b'))).unwrap();
        assert!(!anchored.is_match("ab").unwrap());
        assert!(anchored.is_match("ba").unwrap());
    }

    #[test]
    fn test_backtrack_limit() {
        let ast = Ast::new(Unit::sequence(vec![
            Unit::star(Unit::non_capturing(vec![Unit::star(Unit::literal('a'))])),
            Unit::literal('c'),
        ]));
        let re = RegexBuilder::new().backtrack_limit(1_000).build(&ast).unwrap();
        let err = re.is_match(&"a".repeat(30)).unwrap_err();
        assert_eq!(err, Error::Runtime(RuntimeError::StepLimitExceeded { limit: 1_000 }));
        let mut iter = re.find_iter("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
        assert!(iter.next().unwrap().is_err());
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_invalid_pattern() {
        let err = Regex::new(&Ast::new(Unit::Backreference(1))).unwrap_err();
        assert_eq!(err, Error::Compile(CompileError::InvalidBackreference(1)));
    }
}
