// ABOUTME: Full lex -> parse -> resolve -> interpret pipeline tests

use lox_interpreter::interpreter::Interpreter;
use lox_interpreter::lexer::Lexer;
use lox_interpreter::parser::Parser;
use lox_interpreter::resolver::Resolver;
use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

#[derive(Clone)]
struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn run_capturing(source: &str) -> Result<String, String> {
    let buffer = Rc::new(RefCell::new(Vec::new()));

    let tokens = Lexer::new(source)
        .scan_tokens()
        .map_err(|errs| join(&errs))?;
    let statements = Parser::new(tokens).parse().map_err(|errs| join(&errs))?;
    let locals = Resolver::new()
        .resolve(&statements)
        .map_err(|errs| join(&errs))?;

    let mut interpreter = Interpreter::with_output(Box::new(SharedBuffer(Rc::clone(&buffer))));
    interpreter.set_locals(locals);
    interpreter
        .interpret(&statements)
        .map_err(|e| e.to_string())?;

    let bytes = buffer.borrow().clone();
    Ok(String::from_utf8(bytes).expect("print only ever writes Display output"))
}

fn join<E: std::fmt::Display>(errs: &[E]) -> String {
    errs.iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn scenario_arithmetic() {
    assert_eq!(run_capturing("print 1 + 2;").unwrap(), "3");
}

#[test]
fn scenario_string_concatenation() {
    assert_eq!(
        run_capturing("var a = \"hello \"; var b = \"world\"; print a + b;").unwrap(),
        "hello world"
    );
}

#[test]
fn scenario_block_shadowing() {
    assert_eq!(
        run_capturing("var a = 1; { var a = 2; print a; } print a;").unwrap(),
        "21"
    );
}

#[test]
fn scenario_recursive_fibonacci() {
    let src = "fun fib(n) { if (n < 2) return n; return fib(n - 1) + fib(n - 2); } print fib(10);";
    assert_eq!(run_capturing(src).unwrap(), "55");
}

#[test]
fn scenario_closure_over_mutable_upvalue() {
    let src = "fun makeCounter() { var i = 0; fun c() { i = i + 1; return i; } return c; } \
               var c = makeCounter(); c(); c(); print c();";
    assert_eq!(run_capturing(src).unwrap(), "3");
}

#[test]
fn scenario_class_method_call() {
    let src = "class A { greet() { print \"hi\"; } } var a = A(); a.greet();";
    assert_eq!(run_capturing(src).unwrap(), "hi");
}

#[test]
fn scenario_inheritance_and_super() {
    let src = "class A { init(x) { this.x = x; } } \
               class B < A { init(x) { super.init(x + 1); } } \
               print B(1).x;";
    assert_eq!(run_capturing(src).unwrap(), "2");
}

#[test]
fn error_self_initialization() {
    let err = run_capturing("{ var a = a; }").unwrap_err();
    assert!(err.contains("Can't read local variable in its own initializer."));
}

#[test]
fn error_top_level_return() {
    let err = run_capturing("return 1;").unwrap_err();
    assert!(err.contains("Can't return from top-level code."));
}

#[test]
fn error_class_self_inheritance() {
    let err = run_capturing("class A < A {}").unwrap_err();
    assert!(err.contains("A class can't inherit from itself."));
}

#[test]
fn error_operand_type_mismatch() {
    let err = run_capturing("print \"a\" + 1;").unwrap_err();
    assert!(err.contains("Operands must be two numbers or two strings."));
}

#[test]
fn while_loop_reevaluates_condition() {
    let src = "var i = 0; while (i < 3) { print i; i = i + 1; }";
    assert_eq!(run_capturing(src).unwrap(), "012");
}

#[test]
fn logical_operators_short_circuit_and_return_operand() {
    assert_eq!(run_capturing("print nil or \"default\";").unwrap(), "default");
    assert_eq!(run_capturing("print false and \"unreached\";").unwrap(), "false");
}

#[test]
fn for_loop_desugars_correctly() {
    let src = "var sum = 0; for (var i = 1; i <= 3; i = i + 1) sum = sum + i; print sum;";
    assert_eq!(run_capturing(src).unwrap(), "6");
}
