use crate::node::NodeKind;

/// A position in the input stream.
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct Mark {
    /// The byte offset from the start of the stream.
    pub index: u64,
    /// The position line, 0-based.
    pub line: u64,
    /// The position column within the line, 0-based.
    pub column: u64,
}

impl std::fmt::Display for Mark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {} column {}", self.line, self.column)
    }
}

/// Errors produced while detecting or decoding the input encoding.
#[derive(Debug, thiserror::Error)]
pub enum EncodingError {
    #[error("invalid leading UTF-8 octet {value:#04x} at offset {offset}")]
    InvalidLeadingOctet { offset: usize, value: u8 },
    #[error("invalid trailing UTF-8 octet {value:#04x} at offset {offset}")]
    InvalidTrailingOctet { offset: usize, value: u8 },
    #[error("non-shortest UTF-8 sequence at offset {offset}")]
    OverlongSequence { offset: usize },
    #[error("incomplete code unit sequence at offset {offset}")]
    IncompleteUnit { offset: usize },
    #[error("unpaired UTF-16 surrogate {value:#06x} at offset {offset}")]
    UnpairedSurrogate { offset: usize, value: u16 },
    #[error("code point {value:#x} at offset {offset} is not valid Unicode")]
    InvalidCodePoint { offset: usize, value: u32 },
    #[error("control character {value:#x} at offset {offset} is not allowed in YAML content")]
    DisallowedCharacter { offset: usize, value: u32 },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors produced by the lexical analyzer.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("{}:{}: {} {} ({}:{})", problem_mark.line, problem_mark.column, problem, context, context_mark.line, context_mark.column)]
    InvalidIndentation {
        context: &'static str,
        context_mark: Mark,
        problem: &'static str,
        problem_mark: Mark,
    },
    #[error("{}:{}: found a character that is not allowed in a tag ({}:{})", problem_mark.line, problem_mark.column, context_mark.line, context_mark.column)]
    InvalidCharacterInTag {
        context_mark: Mark,
        problem_mark: Mark,
    },
    #[error("{}:{}: unterminated quoted scalar started at {}:{}", problem_mark.line, problem_mark.column, context_mark.line, context_mark.column)]
    UnterminatedString {
        context_mark: Mark,
        problem_mark: Mark,
    },
    #[error("{}:{}: found unknown escape character in a quoted scalar", problem_mark.line, problem_mark.column)]
    InvalidEscape { problem_mark: Mark },
    #[error("{}:{}: {}", problem_mark.line, problem_mark.column, problem)]
    InvalidEncoding {
        problem: &'static str,
        problem_mark: Mark,
    },
    #[error("{}:{}: {} {} ({}:{})", problem_mark.line, problem_mark.column, problem, context, context_mark.line, context_mark.column)]
    Problem {
        context: &'static str,
        context_mark: Mark,
        problem: &'static str,
        problem_mark: Mark,
    },
    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

impl ScanError {
    /// The position the error was raised at, when one was recorded.
    pub fn mark(&self) -> Option<Mark> {
        match self {
            ScanError::InvalidIndentation { problem_mark, .. }
            | ScanError::InvalidCharacterInTag { problem_mark, .. }
            | ScanError::UnterminatedString { problem_mark, .. }
            | ScanError::InvalidEscape { problem_mark }
            | ScanError::InvalidEncoding { problem_mark, .. }
            | ScanError::Problem { problem_mark, .. } => Some(*problem_mark),
            ScanError::Encoding(_) => None,
        }
    }
}

/// Errors produced while composing the node tree from the token stream.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("{}:{}: {}", mark.line, mark.column, problem)]
    Problem { problem: &'static str, mark: Mark },
    #[error("{}:{}: {} {} ({}:{})", mark.line, mark.column, problem, context, context_mark.line, context_mark.column)]
    ProblemWithContext {
        context: &'static str,
        context_mark: Mark,
        problem: &'static str,
        mark: Mark,
    },
    #[error("{}:{}: cannot parse {value:?} as a number", mark.line, mark.column)]
    InvalidNumber { value: String, mark: Mark },
    #[error("{}:{}: found alias to undefined anchor {name:?}", mark.line, mark.column)]
    InvalidAlias { name: String, mark: Mark },
    #[error("{}:{}: found duplicate mapping key", mark.line, mark.column)]
    DuplicateKey { mark: Mark },
    #[error("{}:{}: empty mapping keys are not supported", mark.line, mark.column)]
    EmptyKey { mark: Mark },
    #[error("the input stream contains no documents")]
    NoDocument,
    #[error("{}:{}: expected a single document but found another", mark.line, mark.column)]
    MoreThanOneDocument { mark: Mark },
    #[error(transparent)]
    Scan(#[from] ScanError),
}

impl From<EncodingError> for ParseError {
    fn from(err: EncodingError) -> Self {
        ParseError::Scan(ScanError::Encoding(err))
    }
}

/// Errors produced by node accessors and conversions.
#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    #[error("node is a {actual}, but the operation requires a {expected}")]
    Type {
        expected: NodeKind,
        actual: NodeKind,
    },
    #[error("sequence index {index} is out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("mapping does not contain the requested key")]
    KeyNotFound,
    #[error("value cannot be represented by the requested type")]
    Conversion,
    #[error("{0}")]
    InvalidUsage(&'static str),
}

/// Errors produced by the serializer.
#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    #[error("{0}")]
    Problem(&'static str),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
