// ABOUTME: Lexically-scoped variable bindings, chained from a block up to globals

use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// A single scope. Scopes form a chain toward globals via `parent`; a function's
/// closure is just a reference to the environment active when it was declared.
#[derive(Debug)]
pub struct Environment {
    values: RefCell<HashMap<String, Value>>,
    parent: Option<Rc<Environment>>,
}

impl Environment {
    pub fn new() -> Rc<Environment> {
        Rc::new(Environment {
            values: RefCell::new(HashMap::new()),
            parent: None,
        })
    }

    pub fn with_parent(parent: Rc<Environment>) -> Rc<Environment> {
        Rc::new(Environment {
            values: RefCell::new(HashMap::new()),
            parent: Some(parent),
        })
    }

    /// Binds `name` in this scope, shadowing any binding of the same name in an
    /// enclosing scope. Re-declaring a name already present in this exact scope
    /// silently replaces it.
    pub fn define(&self, name: impl Into<String>, value: Value) {
        self.values.borrow_mut().insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.values.borrow().get(name) {
            return Some(value.clone());
        }
        self.parent.as_ref().and_then(|p| p.get(name))
    }

    /// Walks the scope chain looking for an existing binding of `name` and
    /// updates it in place. Returns `false` if no scope in the chain has bound
    /// `name`, leaving it to the caller to decide what happens next (the
    /// interpreter defines it at globals, matching assignment-creates-globals
    /// semantics).
    pub fn assign(&self, name: &str, value: Value) -> bool {
        if self.values.borrow().contains_key(name) {
            self.values.borrow_mut().insert(name.to_string(), value);
            return true;
        }
        match &self.parent {
            Some(parent) => parent.assign(name, value),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_falls_through_to_parent() {
        let globals = Environment::new();
        globals.define("x", Value::Integer(1));
        let child = Environment::with_parent(globals);
        assert!(matches!(child.get("x"), Some(Value::Integer(1))));
    }

    #[test]
    fn define_in_child_shadows_parent() {
        let globals = Environment::new();
        globals.define("x", Value::Integer(1));
        let child = Environment::with_parent(globals.clone());
        child.define("x", Value::Integer(2));
        assert!(matches!(child.get("x"), Some(Value::Integer(2))));
        assert!(matches!(globals.get("x"), Some(Value::Integer(1))));
    }

    #[test]
    fn assign_updates_enclosing_scope_in_place() {
        let globals = Environment::new();
        globals.define("x", Value::Integer(1));
        let child = Environment::with_parent(globals.clone());
        assert!(child.assign("x", Value::Integer(99)));
        assert!(matches!(globals.get("x"), Some(Value::Integer(99))));
    }

    #[test]
    fn assign_to_unbound_name_returns_false() {
        let globals = Environment::new();
        assert!(!globals.assign("missing", Value::Nil));
    }
}
