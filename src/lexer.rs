//! Lexical analyzer

use std::iter::Peekable;
use std::str::Chars;

use crate::diag::Position;
use crate::token::{Token, TokenKind};

/// Turn source text into a sequence of tokens, one per call to `next_token()`.
///
/// Never fails: characters that do not start any token become `TokenKind::Illegal` and are
/// rejected by the parser.
#[derive(Debug)]
pub struct Lexer<'a> {
    input: Peekable<Chars<'a>>,
    line: Position,

    // Buffer used when scanning longer tokens.  Allocated here to reuse memory.
    buf: String,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer operating on `input`.
    pub fn new(input: &'a str) -> Lexer<'a> {
        Lexer {
            input: input.chars().peekable(),
            line: 1,
            buf: String::new(),
        }
    }

    /// Scan next token and return it.  Returns `Eof` tokens forever once input is exhausted.
    pub fn next_token(&mut self) -> Token {
        loop {
            let Some(ch) = self.input.next() else {
                return Token::new(TokenKind::Eof, "", self.line);
            };
            let kind = match ch {
                '\n' => {
                    self.line += 1;
                    continue;
                }
                ' ' | '\t' | '\r' => continue,
                '#' => {
                    self.skip_comment();
                    continue;
                }
                '+' => TokenKind::Plus,
                '*' => TokenKind::Star,
                '/' => TokenKind::Slash,
                '<' => TokenKind::Less,
                '>' => TokenKind::Greater,
                '(' => TokenKind::LeftParen,
                ')' => TokenKind::RightParen,
                '{' => TokenKind::LeftCurly,
                '}' => TokenKind::RightCurly,
                '[' => TokenKind::LeftBracket,
                ']' => TokenKind::RightBracket,
                '|' => TokenKind::Bar,
                ',' => TokenKind::Comma,
                ';' => TokenKind::Semicolon,
                '=' => return self.one_or_two(ch, '=', TokenKind::Assign, TokenKind::Equal),
                '!' => return self.one_or_two(ch, '=', TokenKind::Bang, TokenKind::NotEqual),
                '-' => return self.one_or_two(ch, '>', TokenKind::Minus, TokenKind::Arrow),
                '0'..='9' => return self.scan_integer(ch),
                'a'..='z' | 'A'..='Z' | '_' => return self.scan_identifier(ch),
                _ => TokenKind::Illegal,
            };
            return Token::new(kind, ch.to_string(), self.line);
        }
    }

    /// Produce `double` if the next character is `second`, else `single`.
    fn one_or_two(&mut self, first: char, second: char, single: TokenKind, double: TokenKind) -> Token {
        if self.input.next_if_eq(&second).is_some() {
            Token::new(double, format!("{}{}", first, second), self.line)
        } else {
            Token::new(single, first.to_string(), self.line)
        }
    }

    fn scan_integer(&mut self, first_digit: char) -> Token {
        self.buf.clear();
        self.buf.push(first_digit);
        while let Some(ch) = self.input.next_if(char::is_ascii_digit) {
            self.buf.push(ch);
        }
        Token::new(TokenKind::Integer, self.buf.as_str(), self.line)
    }

    fn scan_identifier(&mut self, first_char: char) -> Token {
        self.buf.clear();
        self.buf.push(first_char);
        while let Some(ch) = self
            .input
            .next_if(|ch| ch.is_ascii_alphanumeric() || *ch == '_')
        {
            self.buf.push(ch);
        }

        let kind = TokenKind::keyword(&self.buf).unwrap_or(TokenKind::Identifier);
        Token::new(kind, self.buf.as_str(), self.line)
    }

    /// Consume everything up to, but not including, the next newline.
    fn skip_comment(&mut self) {
        while self.input.next_if(|ch| *ch != '\n').is_some() {}
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_token() {
            Token {
                kind: TokenKind::Eof,
                ..
            } => None,
            t => Some(t),
        }
    }
}
