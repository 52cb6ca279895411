//! Host-provided functions.
//!
//! The registry is built once per interpreter and is read-only afterwards.  User bindings take
//! precedence over it, so a script may define its own `len`.

use std::collections::HashMap;
use std::fmt;
use std::io::Write;

use crate::diag::Position;
use crate::eval::{RuntimeError, RuntimeErrorKind};
use crate::value::Value;

/// What a builtin may ask of the evaluator invoking it.
pub trait CallContext {
    /// Call a user function or builtin with already evaluated arguments.
    fn call(&mut self, callee: Value, args: Vec<Value>, line: Position) -> Result<Value, RuntimeError>;

    /// Sink for program output.
    fn output(&mut self) -> &mut dyn Write;
}

pub type BuiltinFn = fn(&mut dyn CallContext, Position, Vec<Value>) -> Result<Value, RuntimeError>;

#[derive(Clone, Copy)]
pub struct Builtin {
    name: &'static str,
    func: BuiltinFn,
}

impl Builtin {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn invoke(
        &self,
        ctx: &mut dyn CallContext,
        line: Position,
        args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        (self.func)(ctx, line, args)
    }
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builtin").field("name", &self.name).finish()
    }
}

impl PartialEq for Builtin {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

#[derive(Debug, Default)]
pub struct Builtins {
    table: HashMap<&'static str, Builtin>,
}

impl Builtins {
    /// The functions every program can use: `len`, `map` and `puts`.
    pub fn standard() -> Builtins {
        Builtins::default()
            .with("len", builtin_len)
            .with("map", builtin_map)
            .with("puts", builtin_puts)
    }

    pub fn with(mut self, name: &'static str, func: BuiltinFn) -> Builtins {
        self.table.insert(name, Builtin { name, func });
        self
    }

    pub fn get(&self, name: &str) -> Option<Builtin> {
        self.table.get(name).copied()
    }
}

/// Move exactly `N` arguments out of `args`.
fn take_args<const N: usize>(args: Vec<Value>, line: Position) -> Result<[Value; N], RuntimeError> {
    <[Value; N]>::try_from(args).map_err(|args| {
        RuntimeError::new(
            line,
            RuntimeErrorKind::WrongArgumentCount {
                expected: N,
                got: args.len(),
            },
        )
    })
}

fn wrong_type(function: &str, expected: &'static str, got: &Value, line: Position) -> RuntimeError {
    RuntimeError::new(
        line,
        RuntimeErrorKind::WrongArgumentType {
            function: function.to_owned(),
            expected,
            got: got.type_name(),
        },
    )
}

fn builtin_len(_ctx: &mut dyn CallContext, line: Position, args: Vec<Value>) -> Result<Value, RuntimeError> {
    match take_args(args, line)? {
        [Value::Array(elements)] => Ok(Value::Integer(
            i64::try_from(elements.len()).unwrap_or(i64::MAX),
        )),
        [other] => Err(wrong_type("len", "array", &other, line)),
    }
}

fn builtin_map(ctx: &mut dyn CallContext, line: Position, args: Vec<Value>) -> Result<Value, RuntimeError> {
    match take_args(args, line)? {
        [Value::Array(elements), func] => {
            let mut mapped = Vec::with_capacity(elements.len());
            for e in elements.iter() {
                mapped.push(ctx.call(func.clone(), vec![e.clone()], line)?);
            }
            Ok(Value::from(mapped))
        }
        [other, _] => Err(wrong_type("map", "array", &other, line)),
    }
}

fn builtin_puts(ctx: &mut dyn CallContext, line: Position, args: Vec<Value>) -> Result<Value, RuntimeError> {
    for arg in &args {
        writeln!(ctx.output(), "{}", arg).map_err(|e| RuntimeError::new(line, e.into()))?;
    }
    Ok(Value::Null)
}
