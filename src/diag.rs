use thiserror::Error;

/// Line number (starting at one).
pub type Position = u32;

/// Syntax error together with the line it was detected on.
#[derive(Debug, PartialEq, Eq, Error)]
#[error("parse error: line {line}: {kind}")]
pub struct ParseError {
    pub line: Position,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub fn new(line: Position, kind: ParseErrorKind) -> ParseError {
        ParseError { line, kind }
    }
}

#[derive(Debug, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("unexpected token '{found}', expected '{expected}'")]
    UnexpectedToken { found: String, expected: String },
    #[error("expected expression, found '{0}'")]
    ExpectedExpression(String),
    #[error("expected identifier, found '{0}'")]
    ExpectedIdentifier(String),
    #[error("unexpected character: {0}")]
    IllegalCharacter(String),
    #[error("integer literal too large: {0}")]
    IntegerTooLarge(String),
    #[error("expected function call after '->', found '{0}'")]
    ExpectedCall(String),
    #[error("expression nested deeper than {0} levels")]
    NestingTooDeep(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_carries_line() {
        let e = ParseError::new(
            4,
            ParseErrorKind::UnexpectedToken {
                found: "EOF".to_string(),
                expected: ")".to_string(),
            },
        );
        assert_eq!(
            e.to_string(),
            "parse error: line 4: unexpected token 'EOF', expected ')'"
        );
    }
}
