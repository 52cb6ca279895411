//! Runtime values.

use std::fmt;
use std::rc::Rc;

use crate::ast::FunctionLiteral;
use crate::builtins::Builtin;
use crate::env::Env;

#[derive(Debug, PartialEq, Clone)]
pub enum Value {
    Null,
    Integer(i64),
    Boolean(bool),
    // Fixed length once built; clones share the elements.
    Array(Rc<[Value]>),
    Function(Function),
    Builtin(Builtin),
}

/// A closure: a function literal paired with the environment it was evaluated in.
#[derive(Clone)]
pub struct Function {
    pub literal: Rc<FunctionLiteral>,
    pub env: Rc<Env>,
}

impl Function {
    pub fn arity(&self) -> usize {
        self.literal.parameters.len()
    }
}

// The captured environment may hold the function itself, so it is not dumped.
impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("parameters", &self.literal.parameters)
            .field("arity", &self.arity())
            .finish()
    }
}

/// Two closures are equal when they come from the same literal evaluated in the same scope.
impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.literal, &other.literal) && Rc::ptr_eq(&self.env, &other.env)
    }
}

impl Value {
    /// Only `false` and `null` are falsy.  In particular every integer, zero included, is
    /// truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Null | Value::Boolean(false))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Integer(_) => "integer",
            Value::Boolean(_) => "boolean",
            Value::Array(_) => "array",
            Value::Function(_) => "function",
            Value::Builtin(_) => "builtin function",
        }
    }

    pub fn have_same_type(lhs: &Value, rhs: &Value) -> bool {
        lhs.type_name() == rhs.type_name()
    }
}

impl From<Vec<Value>> for Value {
    fn from(elements: Vec<Value>) -> Value {
        Value::Array(elements.into())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Array(elements) => {
                write!(f, "[")?;
                for (i, e) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", e)?;
                }
                write!(f, "]")
            }
            Value::Function(func) => write!(f, "{}", func.literal),
            Value::Builtin(b) => write!(f, "builtin function {}", b.name()),
        }
    }
}
