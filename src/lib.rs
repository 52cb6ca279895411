//! Ether, a small expression language with first-class closures and a pipe operator.
//!
//! Source text goes through a lexer and a precedence-climbing parser into an AST, which a
//! tree-walking evaluator runs against shared, reference-counted environments.
//!
//! # Examples
//!
//! See [`crate::interpreter::Interpreter`].
//!
//! # Limitations
//!
//! - The lexer and parser do not attempt any error recovery.  They bail out on the first
//! encountered error.
//! - A closure stored in the scope it captures keeps that scope alive until exit.

#![warn(rust_2018_idioms)]
#![warn(missing_debug_implementations)]

pub mod interpreter;

mod ast;
mod builtins;
mod diag;
mod env;
mod eval;
mod lexer;
mod parser;
mod stack;
mod token;
mod value;

pub use crate::ast::{Block, Expr, ExprKind, FunctionLiteral, InfixOp, PrefixOp, Program, Stmt, StmtKind};
pub use crate::builtins::{Builtin, BuiltinFn, Builtins, CallContext};
pub use crate::diag::{ParseError, ParseErrorKind, Position};
pub use crate::env::Env;
pub use crate::eval::{Evaluator, RuntimeError, RuntimeErrorKind, DEFAULT_MAX_CALL_DEPTH};
pub use crate::interpreter::{EtherError, Interpreter};
pub use crate::lexer::Lexer;
pub use crate::parser::{parse, MAX_NESTING};
pub use crate::token::{Token, TokenKind};
pub use crate::value::{Function, Value};
