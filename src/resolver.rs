// ABOUTME: Static scope-depth pass run between parsing and evaluation

use crate::ast::{Expr, FunctionDecl, NodeId, Stmt};
use crate::error::ResolveError;
use crate::token::Token;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Clone, Copy, PartialEq)]
enum FunctionKind {
    None,
    Function,
    Initializer,
    Method,
}

#[derive(Clone, Copy, PartialEq)]
enum ClassKind {
    None,
    Class,
    Subclass,
}

pub struct Resolver {
    scopes: Vec<HashMap<String, bool>>,
    locals: HashMap<NodeId, usize>,
    current_function: FunctionKind,
    current_class: ClassKind,
    errors: Vec<ResolveError>,
}

impl Resolver {
    pub fn new() -> Self {
        Resolver {
            scopes: Vec::new(),
            locals: HashMap::new(),
            current_function: FunctionKind::None,
            current_class: ClassKind::None,
            errors: Vec::new(),
        }
    }

    pub fn resolve(
        mut self,
        statements: &[Stmt],
    ) -> Result<HashMap<NodeId, usize>, Vec<ResolveError>> {
        self.resolve_statements(statements);
        if self.errors.is_empty() {
            Ok(self.locals)
        } else {
            Err(self.errors)
        }
    }

    fn resolve_statements(&mut self, statements: &[Stmt]) {
        for stmt in statements {
            self.resolve_stmt(stmt);
        }
    }

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expression { expr } | Stmt::Print { expr } => self.resolve_expr(expr),
            Stmt::Var { name, initializer } => {
                self.declare(name);
                if let Some(init) = initializer {
                    self.resolve_expr(init);
                }
                self.define(name);
            }
            Stmt::Block { statements } => {
                self.begin_scope();
                self.resolve_statements(statements);
                self.end_scope();
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.resolve_expr(condition);
                self.resolve_stmt(then_branch);
                if let Some(else_branch) = else_branch {
                    self.resolve_stmt(else_branch);
                }
            }
            Stmt::While { condition, body } => {
                self.resolve_expr(condition);
                self.resolve_stmt(body);
            }
            Stmt::Function { decl } => {
                self.declare(&decl.name);
                self.define(&decl.name);
                self.resolve_function(decl, FunctionKind::Function);
            }
            Stmt::Return { keyword, value } => {
                if self.current_function == FunctionKind::None {
                    self.error(keyword.clone(), "Can't return from top-level code.");
                }
                if let Some(value) = value {
                    if self.current_function == FunctionKind::Initializer {
                        self.error(
                            keyword.clone(),
                            "Can't return a value from an initializer.",
                        );
                    }
                    self.resolve_expr(value);
                }
            }
            Stmt::Class {
                name,
                superclass,
                methods,
            } => self.resolve_class(name, superclass, methods),
        }
    }

    fn resolve_class(
        &mut self,
        name: &Token,
        superclass: &Option<Expr>,
        methods: &[Rc<FunctionDecl>],
    ) {
        let enclosing_class = self.current_class;
        self.current_class = ClassKind::Class;

        self.declare(name);
        self.define(name);

        if let Some(Expr::Variable {
            name: super_name, ..
        }) = superclass
        {
            if super_name.lexeme == name.lexeme {
                self.error(super_name.clone(), "A class can't inherit from itself.");
            }
            self.current_class = ClassKind::Subclass;
            self.resolve_expr(superclass.as_ref().unwrap());

            self.begin_scope();
            self.scopes
                .last_mut()
                .expect("scope just pushed")
                .insert("super".to_string(), true);
        }

        self.begin_scope();
        self.scopes
            .last_mut()
            .expect("scope just pushed")
            .insert("this".to_string(), true);

        for method in methods {
            let kind = if method.name.lexeme == "init" {
                FunctionKind::Initializer
            } else {
                FunctionKind::Method
            };
            self.resolve_function(method, kind);
        }

        self.end_scope();

        if superclass.is_some() {
            self.end_scope();
        }

        self.current_class = enclosing_class;
    }

    fn resolve_function(&mut self, decl: &FunctionDecl, kind: FunctionKind) {
        let enclosing_function = self.current_function;
        self.current_function = kind;

        self.begin_scope();
        for param in &decl.params {
            self.declare(param);
            self.define(param);
        }
        self.resolve_statements(&decl.body);
        self.end_scope();

        self.current_function = enclosing_function;
    }

    fn resolve_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Variable { id, name } => {
                if let Some(scope) = self.scopes.last() {
                    if scope.get(&name.lexeme) == Some(&false) {
                        self.error(
                            name.clone(),
                            "Can't read local variable in its own initializer.",
                        );
                    }
                }
                self.resolve_local(*id, &name.lexeme);
            }
            Expr::Assign { id, name, value } => {
                self.resolve_expr(value);
                self.resolve_local(*id, &name.lexeme);
            }
            Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }
            Expr::Unary { operand, .. } => self.resolve_expr(operand),
            Expr::Group { inner } => self.resolve_expr(inner),
            Expr::Call {
                callee, arguments, ..
            } => {
                self.resolve_expr(callee);
                for arg in arguments {
                    self.resolve_expr(arg);
                }
            }
            Expr::Get { object, .. } => self.resolve_expr(object),
            Expr::Set { object, value, .. } => {
                self.resolve_expr(value);
                self.resolve_expr(object);
            }
            Expr::This { id, keyword } => {
                if self.current_class == ClassKind::None {
                    self.error(keyword.clone(), "Can't use 'this' outside of a class.");
                    return;
                }
                self.resolve_local(*id, "this");
            }
            Expr::Super { id, keyword, .. } => {
                match self.current_class {
                    ClassKind::None => {
                        self.error(keyword.clone(), "Can't use 'super' outside of a class.");
                        return;
                    }
                    ClassKind::Class => {
                        self.error(
                            keyword.clone(),
                            "Can't use 'super' in a class with no superclass.",
                        );
                        return;
                    }
                    ClassKind::Subclass => {}
                }
                self.resolve_local(*id, "super");
            }
            Expr::Literal { .. } => {}
        }
    }

    fn resolve_local(&mut self, id: NodeId, name: &str) {
        for (depth, scope) in self.scopes.iter().rev().enumerate() {
            if scope.contains_key(name) {
                self.locals.insert(id, depth);
                return;
            }
        }
        // Not found in any scope: treated as global, no entry recorded.
    }

    fn declare(&mut self, name: &Token) {
        let Some(scope) = self.scopes.last_mut() else {
            return;
        };
        if scope.contains_key(&name.lexeme) {
            self.error(
                name.clone(),
                "Already a variable with this name in this scope.",
            );
        }
        scope.insert(name.lexeme.clone(), false);
    }

    fn define(&mut self, name: &Token) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.lexeme.clone(), true);
        }
    }

    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    fn error(&mut self, token: Token, message: &str) {
        self.errors.push(ResolveError::new(token, message));
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    fn resolve(src: &str) -> Result<HashMap<NodeId, usize>, Vec<ResolveError>> {
        let tokens = Lexer::new(src).scan_tokens().unwrap();
        let statements = Parser::new(tokens).parse().unwrap();
        Resolver::new().resolve(&statements)
    }

    #[test]
    fn self_initialization_is_rejected() {
        let errs = resolve("{ var a = a; }").unwrap_err();
        assert_eq!(
            errs[0].message,
            "Can't read local variable in its own initializer."
        );
    }

    #[test]
    fn top_level_return_is_rejected() {
        let errs = resolve("return 1;").unwrap_err();
        assert_eq!(errs[0].message, "Can't return from top-level code.");
    }

    #[test]
    fn class_cannot_inherit_from_itself() {
        let errs = resolve("class A < A {}").unwrap_err();
        assert_eq!(errs[0].message, "A class can't inherit from itself.");
    }

    #[test]
    fn duplicate_declaration_in_scope_is_rejected() {
        let errs = resolve("{ var a = 1; var a = 2; }").unwrap_err();
        assert_eq!(
            errs[0].message,
            "Already a variable with this name in this scope."
        );
    }

    #[test]
    fn global_redeclaration_is_allowed() {
        assert!(resolve("var a = 1; var a = 2;").is_ok());
    }

    #[test]
    fn shadowed_local_resolves_to_inner_depth() {
        let locals = resolve("var a = 1; { var a = 2; print a; }").unwrap();
        assert_eq!(locals.values().copied().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn this_outside_class_is_rejected() {
        let errs = resolve("print this;").unwrap_err();
        assert_eq!(errs[0].message, "Can't use 'this' outside of a class.");
    }

    #[test]
    fn super_without_superclass_is_rejected() {
        let errs = resolve("class A { f() { super.f(); } }").unwrap_err();
        assert_eq!(
            errs[0].message,
            "Can't use 'super' in a class with no superclass."
        );
    }
}
