// ABOUTME: Tree-walking evaluator over the resolved AST

use crate::ast::{Expr, LiteralValue, NodeId, Stmt};
use crate::callable::{Callable, LoxClass, LoxFunction, NativeFunction};
use crate::environment::Environment;
use crate::error::RuntimeError;
use crate::token::TokenKind;
use crate::value::Value;
use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

/// `Ok(Some(value))` means a `return` is unwinding through the current call
/// frame; `Ok(None)` means keep executing statements in this block.
type ExecResult = Result<Option<Value>, RuntimeError>;

pub struct Interpreter {
    pub globals: Rc<Environment>,
    environment: Rc<Environment>,
    locals: HashMap<NodeId, usize>,
    output: Box<dyn Write>,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_output(Box::new(std::io::stdout()))
    }

    /// Builds an interpreter that writes `print` output to `output` instead
    /// of stdout, so tests can assert on it without capturing the process's
    /// real standard output.
    pub fn with_output(output: Box<dyn Write>) -> Self {
        let globals = Environment::new();
        globals.define(
            "clock",
            Value::Callable(Callable::Native(Rc::new(NativeFunction::new(
                "clock",
                0,
                |_args| {
                    let now = SystemTime::now()
                        .duration_since(UNIX_EPOCH)
                        .unwrap_or_default();
                    Ok(Value::Number(now.as_secs_f64()))
                },
            )))),
        );

        Interpreter {
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
            output,
        }
    }

    pub fn set_locals(&mut self, locals: HashMap<NodeId, usize>) {
        self.locals = locals;
    }

    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<(), RuntimeError> {
        for stmt in statements {
            self.execute(stmt)?;
        }
        Ok(())
    }

    fn execute(&mut self, stmt: &Stmt) -> ExecResult {
        match stmt {
            Stmt::Expression { expr } => {
                self.evaluate(expr)?;
                Ok(None)
            }
            Stmt::Print { expr } => {
                let value = self.evaluate(expr)?;
                let _ = write!(self.output, "{value}");
                Ok(None)
            }
            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(init) => self.evaluate(init)?,
                    None => Value::Nil,
                };
                self.environment.define(name.lexeme.clone(), value);
                Ok(None)
            }
            Stmt::Block { statements } => {
                let env = Environment::with_parent(&self.environment);
                self.execute_block(statements, env)
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(None)
                }
            }
            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    if let Some(value) = self.execute(body)? {
                        return Ok(Some(value));
                    }
                }
                Ok(None)
            }
            Stmt::Function { decl } => {
                let function = LoxFunction::new(Rc::clone(decl), Rc::clone(&self.environment), false);
                self.environment.define(
                    decl.name.lexeme.clone(),
                    Value::Callable(Callable::Function(Rc::new(function))),
                );
                Ok(None)
            }
            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                Ok(Some(value))
            }
            Stmt::Class {
                name,
                superclass,
                methods,
            } => self.execute_class(name, superclass, methods),
        }
    }

    /// Executes a block's statements in `env`; propagates an in-flight
    /// `return` unchanged without running further statements.
    pub fn execute_block(&mut self, statements: &[Stmt], env: Rc<Environment>) -> ExecResult {
        let previous = std::mem::replace(&mut self.environment, env);
        let result = (|| {
            for stmt in statements {
                if let Some(value) = self.execute(stmt)? {
                    return Ok(Some(value));
                }
            }
            Ok(None)
        })();
        self.environment = previous;
        result
    }

    fn execute_class(
        &mut self,
        name: &crate::token::Token,
        superclass_expr: &Option<Expr>,
        methods: &[Rc<crate::ast::FunctionDecl>],
    ) -> ExecResult {
        let superclass = match superclass_expr {
            Some(expr) => {
                let value = self.evaluate(expr)?;
                match value {
                    Value::Callable(Callable::Class(class)) => Some(class),
                    _ => {
                        return Err(RuntimeError::new(name.line, "Superclass must be a class."));
                    }
                }
            }
            None => None,
        };

        self.environment.define(name.lexeme.clone(), Value::Nil);

        let defining_env = if let Some(superclass) = &superclass {
            let env = Environment::with_parent(&self.environment);
            env.define(
                "super",
                Value::Callable(Callable::Class(Rc::clone(superclass))),
            );
            env
        } else {
            Rc::clone(&self.environment)
        };

        let mut method_table = HashMap::new();
        for method in methods {
            let is_initializer = method.name.lexeme == "init";
            let function = LoxFunction::new(Rc::clone(method), Rc::clone(&defining_env), is_initializer);
            method_table.insert(method.name.lexeme.clone(), Rc::new(function));
        }

        let class = LoxClass::new(name.lexeme.clone(), superclass, method_table);

        self.environment
            .assign(&name.lexeme, Value::Callable(Callable::Class(Rc::new(class))), name.line)?;
        Ok(None)
    }

    fn evaluate(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Literal { value } => Ok(literal_value(value)),
            Expr::Group { inner } => self.evaluate(inner),
            Expr::Variable { id, name } => self.lookup_variable(*id, &name.lexeme, name.line),
            Expr::Assign { id, name, value } => {
                let value = self.evaluate(value)?;
                match self.locals.get(id) {
                    Some(&depth) => self.environment.assign_at(depth, &name.lexeme, value.clone()),
                    None => self.globals.assign(&name.lexeme, value.clone(), name.line)?,
                }
                Ok(value)
            }
            Expr::Unary { operator, operand } => self.evaluate_unary(operator, operand),
            Expr::Binary {
                left,
                operator,
                right,
            } => self.evaluate_binary(left, operator, right),
            Expr::Logical {
                left,
                operator,
                right,
            } => self.evaluate_logical(left, operator, right),
            Expr::Call {
                callee,
                paren,
                arguments,
            } => self.evaluate_call(callee, paren, arguments),
            Expr::Get { object, name } => {
                let object = self.evaluate(object)?;
                match object {
                    Value::Instance(instance) => instance.get(&name.lexeme, name.line),
                    _ => Err(RuntimeError::new(name.line, "Only instances have properties.")),
                }
            }
            Expr::Set {
                object,
                name,
                value,
            } => {
                let object = self.evaluate(object)?;
                match object {
                    Value::Instance(instance) => {
                        let value = self.evaluate(value)?;
                        instance.set(&name.lexeme, value.clone());
                        Ok(value)
                    }
                    _ => Err(RuntimeError::new(name.line, "Only instances have properties.")),
                }
            }
            Expr::This { id, keyword } => self.lookup_variable(*id, "this", keyword.line),
            Expr::Super { id, keyword, method } => self.evaluate_super(*id, keyword, method),
        }
    }

    fn lookup_variable(&self, id: NodeId, name: &str, line: usize) -> Result<Value, RuntimeError> {
        match self.locals.get(&id) {
            Some(&depth) => Ok(self.environment.get_at(depth, name)),
            None => self.globals.get(name, line),
        }
    }

    fn evaluate_unary(&mut self, operator: &crate::token::Token, operand: &Expr) -> Result<Value, RuntimeError> {
        let right = self.evaluate(operand)?;
        match operator.kind {
            TokenKind::Minus => match right {
                Value::Number(n) => Ok(Value::Number(-n)),
                _ => Err(RuntimeError::new(operator.line, "Operand must be a number.")),
            },
            TokenKind::Bang => Ok(Value::Bool(!right.is_truthy())),
            _ => unreachable!("unary operator outside lexer's token set"),
        }
    }

    fn evaluate_binary(
        &mut self,
        left: &Expr,
        operator: &crate::token::Token,
        right: &Expr,
    ) -> Result<Value, RuntimeError> {
        let left = self.evaluate(left)?;
        let right = self.evaluate(right)?;
        let line = operator.line;

        match operator.kind {
            TokenKind::Minus => numeric_op(&left, &right, line, |a, b| a - b),
            TokenKind::Slash => numeric_op(&left, &right, line, |a, b| a / b),
            TokenKind::Star => numeric_op(&left, &right, line, |a, b| a * b),
            TokenKind::Plus => match (&left, &right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (Value::String(a), Value::String(b)) => {
                    Ok(Value::string(format!("{a}{b}")))
                }
                _ => Err(RuntimeError::new(
                    line,
                    "Operands must be two numbers or two strings.",
                )),
            },
            TokenKind::Greater => numeric_cmp(&left, &right, line, |a, b| a > b),
            TokenKind::GreaterEqual => numeric_cmp(&left, &right, line, |a, b| a >= b),
            TokenKind::Less => numeric_cmp(&left, &right, line, |a, b| a < b),
            TokenKind::LessEqual => numeric_cmp(&left, &right, line, |a, b| a <= b),
            TokenKind::BangEqual => Ok(Value::Bool(!values_equal(&left, &right))),
            TokenKind::EqualEqual => Ok(Value::Bool(values_equal(&left, &right))),
            _ => unreachable!("binary operator outside lexer's token set"),
        }
    }

    fn evaluate_logical(
        &mut self,
        left: &Expr,
        operator: &crate::token::Token,
        right: &Expr,
    ) -> Result<Value, RuntimeError> {
        let left = self.evaluate(left)?;
        match operator.kind {
            TokenKind::Or if left.is_truthy() => Ok(left),
            TokenKind::And if !left.is_truthy() => Ok(left),
            _ => self.evaluate(right),
        }
    }

    fn evaluate_call(
        &mut self,
        callee: &Expr,
        paren: &crate::token::Token,
        arguments: &[Expr],
    ) -> Result<Value, RuntimeError> {
        let callee = self.evaluate(callee)?;

        let mut args = Vec::with_capacity(arguments.len());
        for arg in arguments {
            args.push(self.evaluate(arg)?);
        }

        let callable = match callee {
            Value::Callable(c) => c,
            _ => {
                return Err(RuntimeError::new(
                    paren.line,
                    "Can only call functions and classes.",
                ))
            }
        };

        let arity = callable.arity();
        if args.len() != arity {
            return Err(RuntimeError::new(
                paren.line,
                format!("Expected {arity} arguments but got {}.", args.len()),
            ));
        }

        callable.call(self, args, paren.line)
    }

    fn evaluate_super(
        &mut self,
        id: NodeId,
        keyword: &crate::token::Token,
        method: &crate::token::Token,
    ) -> Result<Value, RuntimeError> {
        let depth = *self
            .locals
            .get(&id)
            .expect("resolver always records a depth for 'super'");
        let superclass = match self.environment.get_at(depth, "super") {
            Value::Callable(Callable::Class(class)) => class,
            _ => unreachable!("resolver only binds 'super' to a class"),
        };
        let instance = match self.environment.get_at(depth - 1, "this") {
            Value::Instance(instance) => instance,
            _ => unreachable!("'this' always binds to an instance one frame inside 'super'"),
        };

        match superclass.find_method(&method.lexeme) {
            Some(found) => Ok(Value::Callable(Callable::Function(found.bind(&instance)))),
            None => Err(RuntimeError::new(
                keyword.line,
                format!("Undefined property '{}'.", method.lexeme),
            )),
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

fn literal_value(value: &LiteralValue) -> Value {
    match value {
        LiteralValue::Number(n) => Value::Number(*n),
        LiteralValue::Str(s) => Value::string(s.clone()),
        LiteralValue::Bool(b) => Value::Bool(*b),
        LiteralValue::Nil => Value::Nil,
    }
}

/// `nil == nil`; numbers/strings/bools by value; instances/callables by
/// identity; any other pairing (including one side `nil`) is unequal.
fn values_equal(a: &Value, b: &Value) -> bool {
    a == b
}

fn numeric_op(
    left: &Value,
    right: &Value,
    line: usize,
    op: fn(f64, f64) -> f64,
) -> Result<Value, RuntimeError> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(op(*a, *b))),
        _ => Err(RuntimeError::new(line, "Operands must be numbers.")),
    }
}

fn numeric_cmp(
    left: &Value,
    right: &Value,
    line: usize,
    op: fn(f64, f64) -> bool,
) -> Result<Value, RuntimeError> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(op(*a, *b))),
        _ => Err(RuntimeError::new(line, "Operands must be numbers.")),
    }
}
