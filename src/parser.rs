//! Precedence-climbing parser.
//!
//! The parser looks at two tokens at a time: `current`, the token being parsed, and `peek`,
//! the one after it.  Expression rules leave `current` on the last token of the expression
//! they built.

use std::mem;

use tracing::{debug, trace};

use crate::ast::{Block, Expr, ExprKind, FunctionLiteral, InfixOp, PrefixOp, Program, Stmt, StmtKind};
use crate::diag::{ParseError, ParseErrorKind};
use crate::lexer::Lexer;
use crate::stack::ensure_sufficient_stack;
use crate::token::{Token, TokenKind};

/// Binding power of infix operators, weakest first.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
enum Precedence {
    Lowest,
    Arrow,
    Equality,
    Comparison,
    Addition,
    Multiplication,
    Prefix,
    Call,
}

impl Precedence {
    fn of(kind: TokenKind) -> Precedence {
        match kind {
            TokenKind::Arrow => Precedence::Arrow,
            TokenKind::Equal | TokenKind::NotEqual => Precedence::Equality,
            TokenKind::Less | TokenKind::Greater => Precedence::Comparison,
            TokenKind::Plus | TokenKind::Minus => Precedence::Addition,
            TokenKind::Star | TokenKind::Slash => Precedence::Multiplication,
            TokenKind::LeftParen | TokenKind::LeftBracket => Precedence::Call,
            _ => Precedence::Lowest,
        }
    }
}

/// Deepest expression nesting accepted.  Trees are dropped and rendered recursively, so the
/// limit bounds the host stack those need.
pub const MAX_NESTING: usize = 2_000;

/// Parse a whole program, stopping at the first syntax error.
pub fn parse(source: &str) -> Result<Program, ParseError> {
    Parser::new(source).parse_program()
}

#[derive(Debug)]
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    peek: Token,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Parser<'a> {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token();
        let peek = lexer.next_token();
        Parser {
            lexer,
            current,
            peek,
            depth: 0,
        }
    }

    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut statements = vec![];
        while self.current.kind != TokenKind::Eof {
            statements.push(self.statement()?);
            self.advance();
        }
        debug!(statements = statements.len(), "parsed program");
        Ok(Program { statements })
    }

    #[cfg(test)]
    fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        let expr = self.expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::Eof)?;
        Ok(expr)
    }

    fn statement(&mut self) -> Result<Stmt, ParseError> {
        let line = self.current.line;
        let kind = match self.current.kind {
            TokenKind::Var => {
                let name = self.identifier()?;
                self.expect_peek(TokenKind::Assign)?;
                self.advance();
                StmtKind::Var(name, self.expression(Precedence::Lowest)?)
            }
            TokenKind::Return => {
                self.advance();
                StmtKind::Return(self.expression(Precedence::Lowest)?)
            }
            _ => StmtKind::Expr(self.expression(Precedence::Lowest)?),
        };
        self.terminator()?;
        Ok(Stmt::new(line, kind))
    }

    /// A statement ends with `;`, with the `}` closing its block, or with the input.
    fn terminator(&mut self) -> Result<(), ParseError> {
        match self.peek.kind {
            TokenKind::Semicolon => {
                self.advance();
                Ok(())
            }
            TokenKind::RightCurly | TokenKind::Eof => Ok(()),
            _ => Err(self.unexpected_peek(TokenKind::Semicolon)),
        }
    }

    /// Parse a block.  Current token is `{`; leaves current on the matching `}`.
    fn block(&mut self) -> Result<Block, ParseError> {
        let line = self.current.line;
        let mut statements = vec![];
        self.advance();
        loop {
            match self.current.kind {
                TokenKind::RightCurly => break,
                TokenKind::Eof => {
                    return Err(ParseError::new(
                        self.current.line,
                        ParseErrorKind::UnexpectedToken {
                            found: self.current.to_string(),
                            expected: TokenKind::RightCurly.to_string(),
                        },
                    ))
                }
                _ => {
                    statements.push(self.statement()?);
                    self.advance();
                }
            }
        }
        Ok(Block { line, statements })
    }

    fn expression(&mut self, precedence: Precedence) -> Result<Expr, ParseError> {
        if self.depth >= MAX_NESTING {
            return Err(ParseError::new(
                self.current.line,
                ParseErrorKind::NestingTooDeep(MAX_NESTING),
            ));
        }
        self.depth += 1;
        let result = ensure_sufficient_stack(|| {
            let mut lhs = self.prefix()?;
            while precedence < Precedence::of(self.peek.kind) {
                self.advance();
                lhs = self.infix(lhs)?;
            }
            Ok(lhs)
        });
        self.depth -= 1;
        result
    }

    fn prefix(&mut self) -> Result<Expr, ParseError> {
        let line = self.current.line;
        let kind = match self.current.kind {
            TokenKind::Identifier => ExprKind::Identifier(self.current.literal.clone()),
            TokenKind::Integer => {
                let n = self.current.literal.parse::<i64>().map_err(|_| {
                    ParseError::new(
                        line,
                        ParseErrorKind::IntegerTooLarge(self.current.literal.clone()),
                    )
                })?;
                ExprKind::Integer(n)
            }
            TokenKind::True => ExprKind::Boolean(true),
            TokenKind::False => ExprKind::Boolean(false),
            // `i64::MIN` has no positive counterpart, so its negation is folded here.
            TokenKind::Minus
                if self.peek.kind == TokenKind::Integer
                    && self.peek.literal.parse::<i64>().is_err() =>
            {
                let negated = format!("-{}", self.peek.literal);
                match negated.parse::<i64>() {
                    Ok(n) => {
                        self.advance();
                        ExprKind::Integer(n)
                    }
                    Err(_) => {
                        return Err(ParseError::new(
                            self.peek.line,
                            ParseErrorKind::IntegerTooLarge(self.peek.literal.clone()),
                        ))
                    }
                }
            }
            TokenKind::Minus | TokenKind::Bang => {
                let op = if self.current.kind == TokenKind::Minus {
                    PrefixOp::Minus
                } else {
                    PrefixOp::Not
                };
                self.advance();
                ExprKind::Prefix(op, Box::new(self.expression(Precedence::Prefix)?))
            }
            TokenKind::LeftParen => {
                self.advance();
                let expr = self.expression(Precedence::Lowest)?;
                self.expect_peek(TokenKind::RightParen)?;
                return Ok(expr);
            }
            TokenKind::Bar => ExprKind::Function(self.function_literal()?.into()),
            TokenKind::LeftBracket => ExprKind::Array(self.expression_list(TokenKind::RightBracket)?),
            TokenKind::If => self.if_expression()?,
            TokenKind::Illegal => {
                return Err(ParseError::new(
                    line,
                    ParseErrorKind::IllegalCharacter(self.current.literal.clone()),
                ))
            }
            _ => {
                return Err(ParseError::new(
                    line,
                    ParseErrorKind::ExpectedExpression(self.current.to_string()),
                ))
            }
        };
        Ok(Expr::new(line, kind))
    }

    /// Extend `lhs` with the infix construct introduced by the current token.
    fn infix(&mut self, lhs: Expr) -> Result<Expr, ParseError> {
        let line = self.current.line;
        let op = match self.current.kind {
            TokenKind::Plus => InfixOp::Add,
            TokenKind::Minus => InfixOp::Sub,
            TokenKind::Star => InfixOp::Mul,
            TokenKind::Slash => InfixOp::Div,
            TokenKind::Equal => InfixOp::Equal,
            TokenKind::NotEqual => InfixOp::NotEqual,
            TokenKind::Less => InfixOp::Less,
            TokenKind::Greater => InfixOp::Greater,
            TokenKind::LeftParen => {
                let args = self.expression_list(TokenKind::RightParen)?;
                return Ok(Expr::new(line, ExprKind::Call(Box::new(lhs), args)));
            }
            TokenKind::LeftBracket => {
                self.advance();
                let index = self.expression(Precedence::Lowest)?;
                self.expect_peek(TokenKind::RightBracket)?;
                return Ok(Expr::new(
                    line,
                    ExprKind::Index(Box::new(lhs), Box::new(index)),
                ));
            }
            TokenKind::Arrow => return self.pipe(lhs),
            _ => {
                return Err(ParseError::new(
                    line,
                    ParseErrorKind::ExpectedExpression(self.current.to_string()),
                ))
            }
        };
        let precedence = Precedence::of(self.current.kind);
        self.advance();
        let rhs = self.expression(precedence)?;
        Ok(Expr::new(line, ExprKind::Infix(op, Box::new(lhs), Box::new(rhs))))
    }

    /// `lhs -> f(args)` becomes `f(lhs, args)`.  Current token is `->`.
    fn pipe(&mut self, lhs: Expr) -> Result<Expr, ParseError> {
        let line = self.current.line;
        self.advance();
        let rhs = self.expression(Precedence::Arrow)?;
        match rhs.kind {
            ExprKind::Call(callee, mut args) => {
                args.insert(0, lhs);
                Ok(Expr::new(rhs.line, ExprKind::Call(callee, args)))
            }
            _ => Err(ParseError::new(
                line,
                ParseErrorKind::ExpectedCall(rhs.to_string()),
            )),
        }
    }

    /// Parse `|a, b| { ... }`.  Current token is the opening `|`.
    fn function_literal(&mut self) -> Result<FunctionLiteral, ParseError> {
        let mut parameters = vec![];
        if self.peek.kind == TokenKind::Bar {
            self.advance();
        } else {
            loop {
                parameters.push(self.identifier()?);
                if self.peek.kind != TokenKind::Comma {
                    break;
                }
                self.advance();
            }
            self.expect_peek(TokenKind::Bar)?;
        }
        self.expect_peek(TokenKind::LeftCurly)?;
        let body = self.block()?;
        Ok(FunctionLiteral { parameters, body })
    }

    /// Parse `if (cond) { ... } else { ... }`.  Current token is `if`.
    fn if_expression(&mut self) -> Result<ExprKind, ParseError> {
        self.expect_peek(TokenKind::LeftParen)?;
        self.advance();
        let cond = self.expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::RightParen)?;
        self.expect_peek(TokenKind::LeftCurly)?;
        let consequence = self.block()?;
        let alternative = if self.peek.kind == TokenKind::Else {
            self.advance();
            self.expect_peek(TokenKind::LeftCurly)?;
            Some(self.block()?)
        } else {
            None
        };
        Ok(ExprKind::If(Box::new(cond), consequence, alternative))
    }

    /// Parse comma-separated expressions up to `end`.  Current token is the opening delimiter.
    fn expression_list(&mut self, end: TokenKind) -> Result<Vec<Expr>, ParseError> {
        let mut list = vec![];
        if self.peek.kind == end {
            self.advance();
            return Ok(list);
        }
        self.advance();
        list.push(self.expression(Precedence::Lowest)?);
        while self.peek.kind == TokenKind::Comma {
            self.advance();
            self.advance();
            list.push(self.expression(Precedence::Lowest)?);
        }
        self.expect_peek(end)?;
        Ok(list)
    }

    /// Move to the next token and return the name it holds if it is an identifier.
    fn identifier(&mut self) -> Result<String, ParseError> {
        if self.peek.kind == TokenKind::Identifier {
            self.advance();
            Ok(self.current.literal.clone())
        } else {
            Err(ParseError::new(
                self.peek.line,
                ParseErrorKind::ExpectedIdentifier(self.peek.to_string()),
            ))
        }
    }

    fn advance(&mut self) {
        let next = self.lexer.next_token();
        self.current = mem::replace(&mut self.peek, next);
        trace!(line = self.current.line, token = %self.current, "advance");
    }

    fn expect_peek(&mut self, expected: TokenKind) -> Result<(), ParseError> {
        if self.peek.kind == expected {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected_peek(expected))
        }
    }

    fn unexpected_peek(&self, expected: TokenKind) -> ParseError {
        let kind = match self.peek.kind {
            TokenKind::Illegal => ParseErrorKind::IllegalCharacter(self.peek.literal.clone()),
            _ => ParseErrorKind::UnexpectedToken {
                found: self.peek.to_string(),
                expected: expected.to_string(),
            },
        };
        ParseError::new(self.peek.line, kind)
    }
}
