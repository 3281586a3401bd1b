// ABOUTME: Callable values -- user functions, classes, instances, and natives

use crate::ast::FunctionDecl;
use crate::environment::Environment;
use crate::error::RuntimeError;
use crate::interpreter::Interpreter;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

#[derive(Clone)]
pub enum Callable {
    Native(Rc<NativeFunction>),
    Function(Rc<LoxFunction>),
    Class(Rc<LoxClass>),
}

impl Callable {
    pub fn arity(&self) -> usize {
        match self {
            Callable::Native(f) => f.arity,
            Callable::Function(f) => f.decl.params.len(),
            Callable::Class(c) => c.initializer().map(|i| i.decl.params.len()).unwrap_or(0),
        }
    }

    pub fn call(
        &self,
        interpreter: &mut Interpreter,
        arguments: Vec<Value>,
        line: usize,
    ) -> Result<Value, RuntimeError> {
        match self {
            Callable::Native(f) => (f.func)(&arguments),
            Callable::Function(f) => f.call(interpreter, arguments),
            Callable::Class(c) => c.instantiate(interpreter, arguments, line),
        }
    }

    pub fn identity_eq(&self, other: &Callable) -> bool {
        match (self, other) {
            (Callable::Native(a), Callable::Native(b)) => Rc::ptr_eq(a, b),
            (Callable::Function(a), Callable::Function(b)) => Rc::ptr_eq(a, b),
            (Callable::Class(a), Callable::Class(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::Native(n) => write!(f, "<native fn {}>", n.name),
            Callable::Function(func) => write!(f, "<fn {}>", func.decl.name.lexeme),
            Callable::Class(c) => write!(f, "{}", c.name),
        }
    }
}

/// A built-in, e.g. `clock`.
pub struct NativeFunction {
    pub name: String,
    pub arity: usize,
    pub func: Box<dyn Fn(&[Value]) -> Result<Value, RuntimeError>>,
}

impl NativeFunction {
    pub fn new(
        name: impl Into<String>,
        arity: usize,
        func: impl Fn(&[Value]) -> Result<Value, RuntimeError> + 'static,
    ) -> Self {
        NativeFunction {
            name: name.into(),
            arity,
            func: Box::new(func),
        }
    }
}

/// A user-defined function or method, with the environment it closed over.
pub struct LoxFunction {
    pub decl: Rc<FunctionDecl>,
    pub closure: Rc<Environment>,
    pub is_initializer: bool,
}

impl LoxFunction {
    pub fn new(decl: Rc<FunctionDecl>, closure: Rc<Environment>, is_initializer: bool) -> Self {
        LoxFunction {
            decl,
            closure,
            is_initializer,
        }
    }

    /// Produces a new function whose closure extends this one with a `this`
    /// binding, for method dispatch on a particular instance.
    pub fn bind(&self, instance: &Rc<LoxInstance>) -> Rc<LoxFunction> {
        let env = Environment::with_parent(&self.closure);
        env.define("this", Value::Instance(Rc::clone(instance)));
        Rc::new(LoxFunction::new(
            Rc::clone(&self.decl),
            env,
            self.is_initializer,
        ))
    }

    pub fn call(
        &self,
        interpreter: &mut Interpreter,
        arguments: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        let env = Environment::with_parent(&self.closure);
        for (param, arg) in self.decl.params.iter().zip(arguments) {
            env.define(param.lexeme.clone(), arg);
        }

        let result = interpreter.execute_block(&self.decl.body, env)?;

        if self.is_initializer {
            return Ok(self.closure.get_at(0, "this"));
        }

        Ok(result.unwrap_or(Value::Nil))
    }
}

/// A class; calling it constructs an instance.
pub struct LoxClass {
    pub name: String,
    pub superclass: Option<Rc<LoxClass>>,
    pub methods: HashMap<String, Rc<LoxFunction>>,
}

impl LoxClass {
    pub fn new(
        name: impl Into<String>,
        superclass: Option<Rc<LoxClass>>,
        methods: HashMap<String, Rc<LoxFunction>>,
    ) -> Self {
        LoxClass {
            name: name.into(),
            superclass,
            methods,
        }
    }

    pub fn find_method(&self, name: &str) -> Option<Rc<LoxFunction>> {
        if let Some(method) = self.methods.get(name) {
            return Some(Rc::clone(method));
        }
        self.superclass.as_ref().and_then(|s| s.find_method(name))
    }

    fn initializer(&self) -> Option<Rc<LoxFunction>> {
        self.find_method("init")
    }

    fn instantiate(
        self: &Rc<Self>,
        interpreter: &mut Interpreter,
        arguments: Vec<Value>,
        _line: usize,
    ) -> Result<Value, RuntimeError> {
        let instance = Rc::new(LoxInstance::new(Rc::clone(self)));
        if let Some(initializer) = self.initializer() {
            initializer.bind(&instance).call(interpreter, arguments)?;
        }
        Ok(Value::Instance(instance))
    }
}

/// An instance of a class; fields are mutable, the class reference is not.
pub struct LoxInstance {
    pub class: Rc<LoxClass>,
    fields: RefCell<HashMap<String, Value>>,
}

impl LoxInstance {
    pub fn new(class: Rc<LoxClass>) -> Self {
        LoxInstance {
            class,
            fields: RefCell::new(HashMap::new()),
        }
    }

    pub fn get(self: &Rc<Self>, name: &str, line: usize) -> Result<Value, RuntimeError> {
        if let Some(value) = self.fields.borrow().get(name) {
            return Ok(value.clone());
        }
        if let Some(method) = self.class.find_method(name) {
            return Ok(Value::Callable(Callable::Function(method.bind(self))));
        }
        Err(RuntimeError::new(line, format!("Undefined property '{name}'.")))
    }

    pub fn set(&self, name: &str, value: Value) {
        self.fields.borrow_mut().insert(name.to_string(), value);
    }
}
