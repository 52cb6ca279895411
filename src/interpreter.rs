//! API to control the interpreter.

use std::io::prelude::*;
use std::rc::Rc;

use thiserror::Error;

use crate::diag::ParseError;
use crate::env::Env;
use crate::eval::{Evaluator, RuntimeError};
use crate::parser::parse;
use crate::value::Value;

/// Tree-walk interpreter.
///
/// Global bindings survive from one call to [`Interpreter::eval`] to the next.
///
/// # Example
///
/// Invoke the interpreter a first time to define a function then additional times to call this
/// function:
///
/// ```
/// # use ether::{EtherError, Interpreter, Value};
///
/// let mut output: Vec<u8> = Vec::new();
/// let mut interp = Interpreter::new(&mut output);
///
/// let func_def = r#"
///     var max = |x, y| {
///         if (x > y) {
///             return x;
///         } else {
///             return y;
///         };
///     };
/// "#;
/// interp.eval(func_def)?;
///
/// assert_eq!(interp.eval("max(10, 20);")?, Value::Integer(20));
/// interp.eval("puts(max(5, 4));").expect("interpreter error");
///
/// assert_eq!(output, b"5\n");
/// # Ok::<(), EtherError>(())
/// ```
#[derive(Debug)]
pub struct Interpreter<'t, W: Write> {
    globals: Rc<Env>,
    evaluator: Evaluator<'t, W>,
}

/// Errors the interpreter can raise.
#[derive(Debug, Error)]
pub enum EtherError {
    /// Error occurring during lexical or syntactic analysis.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Error occurring during evaluation.
    #[error("runtime error: {0}")]
    Runtime(#[from] RuntimeError),
}

impl EtherError {
    /// Process exit status for a script that failed with this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            EtherError::Parse(_) => 2,
            EtherError::Runtime(_) => 3,
        }
    }
}

impl<W: Write> Interpreter<'_, W> {
    pub fn new(output: &mut W) -> Interpreter<'_, W> {
        Interpreter {
            globals: Env::new(),
            evaluator: Evaluator::new(output),
        }
    }

    pub fn with_max_call_depth(mut self, max_depth: usize) -> Self {
        self.evaluator.set_max_call_depth(max_depth);
        self
    }

    /// Parse and run `source`, returning the value of its last statement.  Nothing runs if
    /// `source` does not parse.
    pub fn eval(&mut self, source: &str) -> Result<Value, EtherError> {
        let prg = parse(source)?;
        Ok(self.evaluator.eval_program(&prg, &self.globals)?)
    }

    pub fn globals(&self) -> &Rc<Env> {
        &self.globals
    }
}
