use std::fmt;

use crate::diag::Position;

/// Category of a token produced by `Lexer`.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TokenKind {
    Illegal,
    Eof,

    Identifier,
    Integer,

    // Operators
    Assign,
    Plus,
    Minus,
    Star,
    Slash,
    Bang,
    Arrow,
    Equal,
    NotEqual,
    Less,
    Greater,

    // Delimiters
    Comma,
    Semicolon,
    LeftParen,
    RightParen,
    LeftCurly,
    RightCurly,
    LeftBracket,
    RightBracket,
    Bar,

    // Keywords
    Var,
    Return,
    True,
    False,
    If,
    Else,
}

impl TokenKind {
    /// Classify an identifier-shaped word as a keyword, if it is one.
    pub fn keyword(word: &str) -> Option<TokenKind> {
        match word {
            "var" => Some(TokenKind::Var),
            "return" => Some(TokenKind::Return),
            "true" => Some(TokenKind::True),
            "false" => Some(TokenKind::False),
            "if" => Some(TokenKind::If),
            "else" => Some(TokenKind::Else),
            _ => None,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Illegal => write!(f, "ILLEGAL"),
            TokenKind::Eof => write!(f, "EOF"),
            TokenKind::Identifier => write!(f, "identifier"),
            TokenKind::Integer => write!(f, "integer"),
            TokenKind::Assign => write!(f, "="),
            TokenKind::Plus => write!(f, "+"),
            TokenKind::Minus => write!(f, "-"),
            TokenKind::Star => write!(f, "*"),
            TokenKind::Slash => write!(f, "/"),
            TokenKind::Bang => write!(f, "!"),
            TokenKind::Arrow => write!(f, "->"),
            TokenKind::Equal => write!(f, "=="),
            TokenKind::NotEqual => write!(f, "!="),
            TokenKind::Less => write!(f, "<"),
            TokenKind::Greater => write!(f, ">"),
            TokenKind::Comma => write!(f, ","),
            TokenKind::Semicolon => write!(f, ";"),
            TokenKind::LeftParen => write!(f, "("),
            TokenKind::RightParen => write!(f, ")"),
            TokenKind::LeftCurly => write!(f, "{{"),
            TokenKind::RightCurly => write!(f, "}}"),
            TokenKind::LeftBracket => write!(f, "["),
            TokenKind::RightBracket => write!(f, "]"),
            TokenKind::Bar => write!(f, "|"),
            TokenKind::Var => write!(f, "var"),
            TokenKind::Return => write!(f, "return"),
            TokenKind::True => write!(f, "true"),
            TokenKind::False => write!(f, "false"),
            TokenKind::If => write!(f, "if"),
            TokenKind::Else => write!(f, "else"),
        }
    }
}

/// "Words" produced by `Lexer`, with the source text they were read from.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
    pub line: Position,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<String>, line: Position) -> Token {
        Token {
            kind,
            literal: literal.into(),
            line,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => write!(f, "EOF"),
            _ => write!(f, "{}", self.literal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_are_recognized() {
        assert_eq!(TokenKind::keyword("var"), Some(TokenKind::Var));
        assert_eq!(TokenKind::keyword("else"), Some(TokenKind::Else));
        assert_eq!(TokenKind::keyword("variable"), None);
    }

    #[test]
    fn eof_displays_as_eof() {
        assert_eq!(Token::new(TokenKind::Eof, "", 3).to_string(), "EOF");
        assert_eq!(Token::new(TokenKind::Identifier, "foo", 3).to_string(), "foo");
    }
}
