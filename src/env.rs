//! Lexical scopes.
//!
//! Frames are shared (`Rc`) between the call that created them and every closure created
//! while they were active.  A closure keeps its defining frame, and that frame's ancestors,
//! alive for as long as it exists.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::value::Value;

#[derive(Debug, Default)]
pub struct Env {
    parent: Option<Rc<Env>>,
    bindings: RefCell<HashMap<String, Value>>,
}

impl Env {
    /// Creates a top-level scope.
    pub fn new() -> Rc<Env> {
        Rc::new(Env::default())
    }

    /// Creates a scope nested in `parent`.
    pub fn with_parent(parent: Rc<Env>) -> Rc<Env> {
        Rc::new(Env {
            parent: Some(parent),
            bindings: RefCell::new(HashMap::new()),
        })
    }

    /// Bind `name` in this frame, shadowing any binding in enclosing frames and replacing any
    /// previous binding in this one.
    pub fn set(&self, name: &str, val: Value) {
        self.bindings.borrow_mut().insert(name.to_owned(), val);
    }

    /// Look `name` up in this frame, then in enclosing ones.
    pub fn get(&self, name: &str) -> Option<Value> {
        match self.bindings.borrow().get(name) {
            Some(v) => Some(v.clone()),
            None => self.parent.as_ref().and_then(|p| p.get(name)),
        }
    }
}
