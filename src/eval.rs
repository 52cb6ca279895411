use std::io;
use std::io::prelude::*;
use std::rc::Rc;

use thiserror::Error;
use tracing::debug;

use crate::ast::{Block, Expr, ExprKind, InfixOp, PrefixOp, Program, Stmt, StmtKind};
use crate::builtins::{Builtins, CallContext};
use crate::diag::Position;
use crate::env::Env;
use crate::stack::ensure_sufficient_stack;
use crate::value::{Function, Value};

/// Nesting limit for user function calls unless configured otherwise.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 10_000;

/// Evaluation error together with the line of the construct that raised it.
#[derive(Debug, Error)]
#[error("line {line}: {kind}")]
pub struct RuntimeError {
    pub line: Position,
    pub kind: RuntimeErrorKind,
}

impl RuntimeError {
    pub fn new(line: Position, kind: RuntimeErrorKind) -> RuntimeError {
        RuntimeError { line, kind }
    }
}

#[derive(Debug, Error)]
pub enum RuntimeErrorKind {
    #[error("undefined identifier: {0}")]
    UndefinedIdentifier(String),
    #[error("type mismatch: {left} {op} {right}")]
    TypeMismatch {
        left: String,
        op: InfixOp,
        right: String,
    },
    #[error("unknown operator: {op}{operand}")]
    UnknownPrefixOperator { op: PrefixOp, operand: String },
    #[error("unknown operator: {left} {op} {right}")]
    UnknownInfixOperator {
        left: String,
        op: InfixOp,
        right: String,
    },
    #[error("division by zero")]
    DivisionByZero,
    #[error("index out of range: {index} for {array} of length {length}")]
    IndexOutOfRange {
        array: String,
        index: i64,
        length: usize,
    },
    #[error("cannot index {array} with {index}")]
    NotIndexable { array: String, index: String },
    #[error("not a function: {0}")]
    NotCallable(String),
    #[error("wrong number of arguments: expected {expected}, got {got}")]
    WrongArgumentCount { expected: usize, got: usize },
    #[error("wrong argument type for {function}: expected {expected}, got {got}")]
    WrongArgumentType {
        function: String,
        expected: &'static str,
        got: &'static str,
    },
    #[error("maximum call depth of {0} exceeded")]
    StackOverflow(usize),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Outcome of evaluating a statement, a block, or an expression containing blocks.
#[derive(Debug, PartialEq)]
enum Flow {
    Normal(Value),
    /// A `return` was executed; unwinds to the enclosing call or to the program.
    Return(Value),
}

impl Flow {
    fn into_value(self) -> Value {
        match self {
            Flow::Normal(v) | Flow::Return(v) => v,
        }
    }
}

/// Unwrap a normal value, or propagate a `return` out of the current function.
macro_rules! normal {
    ($flow:expr) => {
        match $flow {
            Flow::Normal(v) => v,
            ret @ Flow::Return(_) => return Ok(ret),
        }
    };
}

#[derive(Debug)]
pub struct Evaluator<'t, W: Write> {
    output: &'t mut W,
    builtins: Builtins,
    depth: usize,
    max_depth: usize,
}

impl<'a, W: Write> Evaluator<'a, W> {
    pub fn new(output: &'a mut W) -> Evaluator<'a, W> {
        Evaluator::with_builtins(output, Builtins::standard())
    }

    pub fn with_builtins(output: &'a mut W, builtins: Builtins) -> Evaluator<'a, W> {
        Evaluator {
            output,
            builtins,
            depth: 0,
            max_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }

    pub fn set_max_call_depth(&mut self, max_depth: usize) {
        self.max_depth = max_depth;
    }

    /// Run `program` in `env` and return the value of its last statement.  A top-level
    /// `return` ends the program with its value.
    pub fn eval_program(&mut self, program: &Program, env: &Rc<Env>) -> Result<Value, RuntimeError> {
        debug!(statements = program.statements.len(), "evaluating program");
        self.depth = 0;
        Ok(self.eval_stmts(&program.statements, env)?.into_value())
    }

    fn eval_stmts(&mut self, stmts: &[Stmt], env: &Rc<Env>) -> Result<Flow, RuntimeError> {
        let mut last = Value::Null;
        for stmt in stmts {
            last = normal!(self.eval_stmt(stmt, env)?);
        }
        Ok(Flow::Normal(last))
    }

    fn eval_block(&mut self, block: &Block, env: &Rc<Env>) -> Result<Flow, RuntimeError> {
        self.eval_stmts(&block.statements, env)
    }

    fn eval_stmt(&mut self, stmt: &Stmt, env: &Rc<Env>) -> Result<Flow, RuntimeError> {
        match &stmt.kind {
            StmtKind::Var(name, e) => {
                let v = normal!(self.eval_expr(e, env)?);
                env.set(name, v);
                Ok(Flow::Normal(Value::Null))
            }
            StmtKind::Return(e) => Ok(Flow::Return(normal!(self.eval_expr(e, env)?))),
            StmtKind::Expr(e) => self.eval_expr(e, env),
        }
    }

    fn eval_expr(&mut self, expr: &Expr, env: &Rc<Env>) -> Result<Flow, RuntimeError> {
        ensure_sufficient_stack(|| self.eval_expr_inner(expr, env))
    }

    fn eval_expr_inner(&mut self, expr: &Expr, env: &Rc<Env>) -> Result<Flow, RuntimeError> {
        let line = expr.line;
        let value = match &expr.kind {
            ExprKind::Identifier(name) => self.lookup(name, env, line)?,
            ExprKind::Integer(n) => Value::Integer(*n),
            ExprKind::Boolean(b) => Value::Boolean(*b),
            ExprKind::Prefix(op, rhs) => {
                let rhs = normal!(self.eval_expr(rhs, env)?);
                eval_prefix(*op, rhs, line)?
            }
            ExprKind::Infix(op, lhs, rhs) => {
                let lhs = normal!(self.eval_expr(lhs, env)?);
                let rhs = normal!(self.eval_expr(rhs, env)?);
                eval_infix(*op, lhs, rhs, line)?
            }
            ExprKind::Function(literal) => Value::Function(Function {
                literal: literal.clone(),
                env: env.clone(),
            }),
            ExprKind::Call(callee, args) => {
                let callee = normal!(self.eval_expr(callee, env)?);
                let mut evaluated_args = Vec::with_capacity(args.len());
                for a in args {
                    evaluated_args.push(normal!(self.eval_expr(a, env)?));
                }
                self.call(callee, evaluated_args, line)?
            }
            ExprKind::Array(elements) => {
                let mut evaluated = Vec::with_capacity(elements.len());
                for e in elements {
                    evaluated.push(normal!(self.eval_expr(e, env)?));
                }
                Value::from(evaluated)
            }
            ExprKind::Index(array, index) => {
                let array = normal!(self.eval_expr(array, env)?);
                let index = normal!(self.eval_expr(index, env)?);
                eval_index(array, index, line)?
            }
            ExprKind::If(cond, consequence, alternative) => {
                let cond = normal!(self.eval_expr(cond, env)?);
                return if cond.is_truthy() {
                    self.eval_block(consequence, env)
                } else if let Some(alternative) = alternative {
                    self.eval_block(alternative, env)
                } else {
                    Ok(Flow::Normal(Value::Null))
                };
            }
        };
        Ok(Flow::Normal(value))
    }

    /// Variables shadow builtins.
    fn lookup(&self, name: &str, env: &Rc<Env>, line: Position) -> Result<Value, RuntimeError> {
        env.get(name)
            .or_else(|| self.builtins.get(name).map(Value::Builtin))
            .ok_or_else(|| {
                RuntimeError::new(line, RuntimeErrorKind::UndefinedIdentifier(name.to_owned()))
            })
    }

    fn call_function(&mut self, f: Function, args: Vec<Value>, line: Position) -> Result<Value, RuntimeError> {
        if args.len() != f.arity() {
            return Err(RuntimeError::new(
                line,
                RuntimeErrorKind::WrongArgumentCount {
                    expected: f.arity(),
                    got: args.len(),
                },
            ));
        }
        if self.depth >= self.max_depth {
            return Err(RuntimeError::new(
                line,
                RuntimeErrorKind::StackOverflow(self.max_depth),
            ));
        }
        debug!(line, arity = f.arity(), depth = self.depth, "calling function");

        // Parameters live in a fresh frame nested in the defining scope, not the caller's.
        let frame = Env::with_parent(f.env.clone());
        for (p, v) in f.literal.parameters.iter().zip(args) {
            frame.set(p, v);
        }
        self.depth += 1;
        let result = self.eval_block(&f.literal.body, &frame);
        self.depth -= 1;
        Ok(result?.into_value())
    }
}

impl<W: Write> CallContext for Evaluator<'_, W> {
    fn call(&mut self, callee: Value, args: Vec<Value>, line: Position) -> Result<Value, RuntimeError> {
        match callee {
            Value::Function(f) => self.call_function(f, args, line),
            Value::Builtin(b) => b.invoke(self, line, args),
            other => Err(RuntimeError::new(
                line,
                RuntimeErrorKind::NotCallable(other.to_string()),
            )),
        }
    }

    fn output(&mut self) -> &mut dyn Write {
        &mut *self.output
    }
}

fn eval_prefix(op: PrefixOp, rhs: Value, line: Position) -> Result<Value, RuntimeError> {
    match (op, rhs) {
        (PrefixOp::Minus, Value::Integer(n)) => Ok(Value::Integer(n.wrapping_neg())),
        (PrefixOp::Not, v) => Ok(Value::Boolean(!v.is_truthy())),
        (op, v) => Err(RuntimeError::new(
            line,
            RuntimeErrorKind::UnknownPrefixOperator {
                op,
                operand: v.to_string(),
            },
        )),
    }
}

fn eval_infix(op: InfixOp, lhs: Value, rhs: Value, line: Position) -> Result<Value, RuntimeError> {
    match (&lhs, &rhs) {
        (Value::Integer(l), Value::Integer(r)) => eval_integer_infix(op, *l, *r, line),
        (Value::Boolean(l), Value::Boolean(r)) if op == InfixOp::Equal => Ok(Value::Boolean(l == r)),
        (Value::Boolean(l), Value::Boolean(r)) if op == InfixOp::NotEqual => {
            Ok(Value::Boolean(l != r))
        }
        _ if !Value::have_same_type(&lhs, &rhs) => Err(RuntimeError::new(
            line,
            RuntimeErrorKind::TypeMismatch {
                left: lhs.to_string(),
                op,
                right: rhs.to_string(),
            },
        )),
        _ => Err(RuntimeError::new(
            line,
            RuntimeErrorKind::UnknownInfixOperator {
                left: lhs.to_string(),
                op,
                right: rhs.to_string(),
            },
        )),
    }
}

/// Integer arithmetic wraps around on overflow; division truncates toward zero.
fn eval_integer_infix(op: InfixOp, l: i64, r: i64, line: Position) -> Result<Value, RuntimeError> {
    let v = match op {
        InfixOp::Add => Value::Integer(l.wrapping_add(r)),
        InfixOp::Sub => Value::Integer(l.wrapping_sub(r)),
        InfixOp::Mul => Value::Integer(l.wrapping_mul(r)),
        InfixOp::Div => {
            if r == 0 {
                return Err(RuntimeError::new(line, RuntimeErrorKind::DivisionByZero));
            }
            Value::Integer(l.wrapping_div(r))
        }
        InfixOp::Equal => Value::Boolean(l == r),
        InfixOp::NotEqual => Value::Boolean(l != r),
        InfixOp::Less => Value::Boolean(l < r),
        InfixOp::Greater => Value::Boolean(l > r),
    };
    Ok(v)
}

fn eval_index(array: Value, index: Value, line: Position) -> Result<Value, RuntimeError> {
    match (&array, &index) {
        (Value::Array(elements), Value::Integer(i)) => usize::try_from(*i)
            .ok()
            .and_then(|i| elements.get(i))
            .cloned()
            .ok_or_else(|| {
                RuntimeError::new(
                    line,
                    RuntimeErrorKind::IndexOutOfRange {
                        array: array.to_string(),
                        index: *i,
                        length: elements.len(),
                    },
                )
            }),
        _ => Err(RuntimeError::new(
            line,
            RuntimeErrorKind::NotIndexable {
                array: array.to_string(),
                index: index.to_string(),
            },
        )),
    }
}
