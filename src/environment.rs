// ABOUTME: Lexically-scoped variable bindings with a parent chain

use crate::error::RuntimeError;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug)]
pub struct Environment {
    bindings: RefCell<HashMap<String, Value>>,
    parent: Option<Rc<Environment>>,
}

impl Environment {
    /// Creates a new global environment with no parent.
    pub fn new() -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: None,
        })
    }

    /// Creates a new child scope, e.g. for a block, call, or method bind.
    pub fn with_parent(parent: &Rc<Environment>) -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: Some(Rc::clone(parent)),
        })
    }

    /// Binds a name in THIS scope, shadowing any outer binding of the same name.
    pub fn define(&self, name: impl Into<String>, value: Value) {
        self.bindings.borrow_mut().insert(name.into(), value);
    }

    /// Reads a global (or undepth-resolved) binding, walking the parent chain.
    pub fn get(&self, name: &str, line: usize) -> Result<Value, RuntimeError> {
        if let Some(value) = self.bindings.borrow().get(name) {
            return Ok(value.clone());
        }
        if let Some(parent) = &self.parent {
            return parent.get(name, line);
        }
        Err(RuntimeError::new(line, format!("Undefined variable '{name}'.")))
    }

    /// Writes to an existing global (or undepth-resolved) binding.
    pub fn assign(&self, name: &str, value: Value, line: usize) -> Result<(), RuntimeError> {
        if self.bindings.borrow().contains_key(name) {
            self.bindings.borrow_mut().insert(name.to_string(), value);
            return Ok(());
        }
        if let Some(parent) = &self.parent {
            return parent.assign(name, value, line);
        }
        Err(RuntimeError::new(line, format!("Undefined variable '{name}'.")))
    }

    fn ancestor(self: &Rc<Self>, depth: usize) -> Rc<Environment> {
        let mut env = Rc::clone(self);
        for _ in 0..depth {
            env = Rc::clone(env.parent.as_ref().expect("resolver depth out of range"));
        }
        env
    }

    /// Reads a binding at a resolver-computed depth. Panics if the depth is
    /// wrong, since that would mean the resolver and interpreter disagree
    /// about scope structure -- a bug, not a user-facing error.
    pub fn get_at(self: &Rc<Self>, depth: usize, name: &str) -> Value {
        self.ancestor(depth)
            .bindings
            .borrow()
            .get(name)
            .cloned()
            .unwrap_or_else(|| panic!("resolver recorded depth {depth} for undefined '{name}'"))
    }

    /// Writes a binding at a resolver-computed depth.
    pub fn assign_at(self: &Rc<Self>, depth: usize, name: &str, value: Value) {
        self.ancestor(depth)
            .bindings
            .borrow_mut()
            .insert(name.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_and_get() {
        let env = Environment::new();
        env.define("x", Value::Number(42.0));
        assert_eq!(env.get("x", 1).unwrap(), Value::Number(42.0));
    }

    #[test]
    fn undefined_variable_is_error() {
        let env = Environment::new();
        let err = env.get("missing", 3).unwrap_err();
        assert_eq!(err.message, "Undefined variable 'missing'.");
    }

    #[test]
    fn shadowing_in_child_scope() {
        let parent = Environment::new();
        parent.define("x", Value::Number(1.0));

        let child = Environment::with_parent(&parent);
        child.define("x", Value::Number(2.0));

        assert_eq!(child.get("x", 1).unwrap(), Value::Number(2.0));
        assert_eq!(parent.get("x", 1).unwrap(), Value::Number(1.0));
    }

    #[test]
    fn parent_lookup_through_child() {
        let parent = Environment::new();
        parent.define("x", Value::Number(7.0));
        let child = Environment::with_parent(&parent);
        assert_eq!(child.get("x", 1).unwrap(), Value::Number(7.0));
    }

    #[test]
    fn assign_updates_defining_scope() {
        let parent = Environment::new();
        parent.define("x", Value::Number(1.0));
        let child = Environment::with_parent(&parent);
        child.assign("x", Value::Number(9.0), 1).unwrap();
        assert_eq!(parent.get("x", 1).unwrap(), Value::Number(9.0));
    }

    #[test]
    fn assign_to_undefined_is_error() {
        let env = Environment::new();
        let err = env.assign("missing", Value::Nil, 2).unwrap_err();
        assert_eq!(err.message, "Undefined variable 'missing'.");
    }

    #[test]
    fn depth_indexed_access() {
        let global = Environment::new();
        global.define("a", Value::Number(1.0));
        let one = Environment::with_parent(&global);
        let two = Environment::with_parent(&one);
        two.define("a", Value::Number(2.0));

        assert_eq!(two.get_at(0, "a"), Value::Number(2.0));
        assert_eq!(two.get_at(2, "a"), Value::Number(1.0));

        two.assign_at(2, "a", Value::Number(5.0));
        assert_eq!(global.get("a", 1).unwrap(), Value::Number(5.0));
    }
}
