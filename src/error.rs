use std::fmt;
use std::io;

/// What went wrong while parsing a block file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// An expected literal tag (`Polygons`, `bbox`, ...) was not found
    MalformedTag,
    /// A number the stream framing depends on could not be read
    MalformedNumber,
    /// The block holds more points than the configured budget allows
    PointBudgetExceeded,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ParseErrorKind::MalformedTag => "malformed tag",
            ParseErrorKind::MalformedNumber => "malformed number",
            ParseErrorKind::PointBudgetExceeded => "point budget exceeded",
        })
    }
}

/// Fatal parse failure for a single block. Never escapes further than the
/// load of that block.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at line {line}: {context}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// 1-based line of the block file where the failure was detected
    pub line: usize,
    pub context: String,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, line: usize, context: impl Into<String>) -> Self {
        Self {
            kind,
            line,
            context: context.into(),
        }
    }
}

/// Failure to bring one block into the cache
#[derive(Debug, thiserror::Error)]
pub enum BlockError {
    #[error("block file not found: {key}")]
    NotFound { key: String },
    #[error("block read failed: {0}")]
    Io(#[from] io::Error),
    #[error("block parse failed: {0}")]
    Parse(#[from] ParseError),
}

impl BlockError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, BlockError::NotFound { .. })
    }

    /// Parse failure kind, if this is a parse failure
    pub fn parse_kind(&self) -> Option<ParseErrorKind> {
        match self {
            BlockError::Parse(e) => Some(e.kind),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::new(ParseErrorKind::MalformedTag, 4, "expected `bbox`, found `box`");
        assert_eq!(err.to_string(), "malformed tag at line 4: expected `bbox`, found `box`");
    }

    #[test]
    fn test_block_error_kinds() {
        let missing = BlockError::NotFound { key: "+000+000/0_0".into() };
        assert!(missing.is_not_found());
        assert_eq!(missing.parse_kind(), None);

        let parse: BlockError = ParseError::new(ParseErrorKind::MalformedNumber, 1, "count").into();
        assert!(!parse.is_not_found());
        assert_eq!(parse.parse_kind(), Some(ParseErrorKind::MalformedNumber));
    }
}
