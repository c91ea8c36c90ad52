/// Error types for pattern compilation and matching.

use std::fmt;

/// A structural fault in a pattern, found while compiling it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// A range quantifier whose upper bound is below its lower bound.
    InvalidRange { lower: usize, upper: usize },
    /// A character group range whose end precedes its start.
    InvalidCharacterRange { start: char, end: char },
    /// A backreference to a group index that no capturing group carries.
    InvalidBackreference(usize),
    /// Two capturing groups share the same index.
    DuplicateGroupIndex(usize),
    /// A capturing group without an index.
    MissingGroupIndex,
    /// Group indices are 1-based.
    InvalidGroupIndex(usize),
    /// An alternation without any alternatives.
    EmptyAlternation,
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::InvalidRange { lower, upper } => {
                write!(f, "Invalid range quantifier {{{},{}}}: upper bound below lower bound", lower, upper)
            }
            CompileError::InvalidCharacterRange { start, end } => {
                write!(f, "Invalid character range {:?}-{:?}", start, end)
            }
            CompileError::InvalidBackreference(n) => write!(f, "Invalid backreference \\{}", n),
            CompileError::DuplicateGroupIndex(n) => write!(f, "Duplicate capturing group index {}", n),
            CompileError::MissingGroupIndex => write!(f, "Capturing group without an index"),
            CompileError::InvalidGroupIndex(n) => write!(f, "Invalid capturing group index {}", n),
            CompileError::EmptyAlternation => write!(f, "Alternation without alternatives"),
        }
    }
}

impl std::error::Error for CompileError {}

/// A fault raised while a search is running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// The search evaluated more transitions than the configured ceiling allows.
    StepLimitExceeded { limit: usize },
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::StepLimitExceeded { limit } => {
                write!(f, "Search exhausted: more than {} steps", limit)
            }
        }
    }
}

impl std::error::Error for RuntimeError {}

/// Any error produced by this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    Compile(CompileError),
    Runtime(RuntimeError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Compile(e) => write!(f, "Invalid pattern: {}", e),
            Error::Runtime(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Compile(e) => Some(e),
            Error::Runtime(e) => Some(e),
        }
    }
}

impl From<CompileError> for Error {
    fn from(e: CompileError) -> Self {
        Error::Compile(e)
    }
}

impl From<RuntimeError> for Error {
    fn from(e: RuntimeError) -> Self {
        Error::Runtime(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let e = Error::from(CompileError::InvalidRange { lower: 3, upper: 2 });
        assert_eq!(
            e.to_string(),
            "Invalid pattern: Invalid range quantifier {3,2}: upper bound below lower bound"
        );
        let e = Error::from(RuntimeError::StepLimitExceeded { limit: 10 });
        assert_eq!(e.to_string(), "Search exhausted: more than 10 steps");
    }

    #[test]
    fn test_source() {
        use std::error::Error as _;
        let e = Error::from(CompileError::InvalidBackreference(4));
        assert!(e.source().is_some());
    }
}
