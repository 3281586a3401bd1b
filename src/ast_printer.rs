// ABOUTME: Debug S-expression rendering of expressions, used by tests

use crate::ast::{Expr, LiteralValue};

pub fn print(expr: &Expr) -> String {
    match expr {
        Expr::Literal { value } => print_literal(value),
        Expr::Variable { name, .. } => name.lexeme.clone(),
        Expr::Assign { name, value, .. } => parenthesize(&name.lexeme, &[value]),
        Expr::Binary {
            left,
            operator,
            right,
        } => parenthesize(&operator.lexeme, &[left, right]),
        Expr::Logical {
            left,
            operator,
            right,
        } => parenthesize(&operator.lexeme, &[left, right]),
        Expr::Unary { operator, operand } => parenthesize(&operator.lexeme, &[operand]),
        Expr::Group { inner } => parenthesize("group", &[inner]),
        Expr::Call {
            callee, arguments, ..
        } => {
            let mut parts = vec![print(callee)];
            parts.extend(arguments.iter().map(print));
            format!("({})", parts.join(" "))
        }
        Expr::Get { object, name } => format!("(. {} {})", print(object), name.lexeme),
        Expr::Set {
            object,
            name,
            value,
        } => format!("(= (. {} {}) {})", print(object), name.lexeme, print(value)),
        Expr::This { .. } => "this".to_string(),
        Expr::Super { method, .. } => format!("(. super {})", method.lexeme),
    }
}

fn print_literal(value: &LiteralValue) -> String {
    match value {
        LiteralValue::Number(n) => format!("{n}"),
        LiteralValue::Str(s) => s.clone(),
        LiteralValue::Bool(b) => b.to_string(),
        LiteralValue::Nil => "nil".to_string(),
    }
}

fn parenthesize(name: &str, exprs: &[&Expr]) -> String {
    let mut parts = vec![name.to_string()];
    parts.extend(exprs.iter().map(|e| print(e)));
    format!("({})", parts.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{Literal, Token, TokenKind};

    #[test]
    fn prints_binary_expression() {
        let expr = Expr::Binary {
            left: Box::new(Expr::Literal {
                value: LiteralValue::Number(1.0),
            }),
            operator: Token::new(TokenKind::Plus, "+", Literal::None, 1),
            right: Box::new(Expr::Literal {
                value: LiteralValue::Number(2.0),
            }),
        };
        assert_eq!(print(&expr), "(+ 1 2)");
    }

    #[test]
    fn prints_nested_group_and_unary() {
        let expr = Expr::Group {
            inner: Box::new(Expr::Unary {
                operator: Token::new(TokenKind::Minus, "-", Literal::None, 1),
                operand: Box::new(Expr::Literal {
                    value: LiteralValue::Number(5.0),
                }),
            }),
        };
        assert_eq!(print(&expr), "(group (- 5))");
    }

    #[test]
    fn prints_nil_literal() {
        let expr = Expr::Literal {
            value: LiteralValue::Nil,
        };
        assert_eq!(print(&expr), "nil");
    }
}
