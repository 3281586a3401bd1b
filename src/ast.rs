// ABOUTME: Abstract syntax tree for expressions and statements

use crate::token::Token;
use std::cell::Cell;
use std::rc::Rc;

/// Stable identity for an expression node, assigned at parse time.
/// The resolver keys its side-table by this instead of by AST structure,
/// so two syntactically identical expressions never collide.
pub type NodeId = usize;

thread_local! {
    static NEXT_ID: Cell<NodeId> = const { Cell::new(0) };
}

pub fn next_node_id() -> NodeId {
    NEXT_ID.with(|id| {
        let current = id.get();
        id.set(current + 1);
        current
    })
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Number(f64),
    Str(String),
    Bool(bool),
    Nil,
}

#[derive(Debug, Clone)]
pub enum Expr {
    Literal {
        value: LiteralValue,
    },
    Variable {
        id: NodeId,
        name: Token,
    },
    Assign {
        id: NodeId,
        name: Token,
        value: Box<Expr>,
    },
    Binary {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },
    Logical {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },
    Unary {
        operator: Token,
        operand: Box<Expr>,
    },
    Group {
        inner: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        paren: Token,
        arguments: Vec<Expr>,
    },
    Get {
        object: Box<Expr>,
        name: Token,
    },
    Set {
        object: Box<Expr>,
        name: Token,
        value: Box<Expr>,
    },
    This {
        id: NodeId,
        keyword: Token,
    },
    Super {
        id: NodeId,
        keyword: Token,
        method: Token,
    },
}

impl Expr {
    pub fn variable(name: Token) -> Self {
        Expr::Variable {
            id: next_node_id(),
            name,
        }
    }

    pub fn assign(name: Token, value: Expr) -> Self {
        Expr::Assign {
            id: next_node_id(),
            name,
            value: Box::new(value),
        }
    }

    pub fn this(keyword: Token) -> Self {
        Expr::This {
            id: next_node_id(),
            keyword,
        }
    }

    pub fn super_(keyword: Token, method: Token) -> Self {
        Expr::Super {
            id: next_node_id(),
            keyword,
            method,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FunctionDecl {
    pub name: Token,
    pub params: Vec<Token>,
    pub body: Rc<Vec<Stmt>>,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Expression {
        expr: Expr,
    },
    Print {
        expr: Expr,
    },
    Var {
        name: Token,
        initializer: Option<Expr>,
    },
    Block {
        statements: Vec<Stmt>,
    },
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While {
        condition: Expr,
        body: Box<Stmt>,
    },
    Function {
        decl: Rc<FunctionDecl>,
    },
    Return {
        keyword: Token,
        value: Option<Expr>,
    },
    Class {
        name: Token,
        superclass: Option<Expr>,
        methods: Vec<Rc<FunctionDecl>>,
    },
}
