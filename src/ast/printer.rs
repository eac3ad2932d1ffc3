use crate::ast::*;

pub fn to_sexp(expr: &Expr) -> String {
    let mut buf = String::new();
    sexp_expr(&mut buf, expr);
    buf
}

pub fn to_json(expr: &Expr) -> String {
    serde_json::to_string_pretty(expr).expect("AST should be serializable")
}

fn sexp_expr(buf: &mut String, expr: &Expr) {
    match expr {
        Expr::Literal(l) => buf.push_str(&format!("{}", l.value)),
        Expr::Vector(v) => {
            buf.push_str("(vec");
            for element in &v.elements {
                buf.push(' ');
                sexp_expr(buf, element);
            }
            buf.push(')');
        }
        Expr::Unary(u) => {
            buf.push('(');
            buf.push_str(&u.operator.to_string());
            buf.push(' ');
            sexp_expr(buf, &u.operand);
            buf.push(')');
        }
        Expr::Binary(b) => {
            buf.push('(');
            buf.push_str(&b.operator.to_string());
            buf.push(' ');
            sexp_expr(buf, &b.left);
            buf.push(' ');
            sexp_expr(buf, &b.right);
            buf.push(')');
        }
        Expr::Variable(v) => match &v.value {
            None => buf.push_str(&v.name),
            Some(value) => {
                buf.push_str("(= ");
                buf.push_str(&v.name);
                buf.push(' ');
                sexp_expr(buf, value);
                buf.push(')');
            }
        },
        Expr::Call(c) => {
            buf.push_str("(call ");
            buf.push_str(&c.name);
            buf.push(' ');
            sexp_expr(buf, &c.argument);
            buf.push(')');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(value: f64, offset: usize) -> Expr {
        Expr::number(value, Span::new(offset, 1))
    }

    #[test]
    fn sexp_binary_expression() {
        let expr = Expr::Binary(BinaryExpr {
            left: Box::new(num(1.0, 0)),
            operator: BinaryOp::Add,
            right: Box::new(Expr::Binary(BinaryExpr {
                left: Box::new(num(2.0, 4)),
                operator: BinaryOp::Multiply,
                right: Box::new(num(3.0, 8)),
                span: Span::new(4, 5),
            })),
            span: Span::new(0, 9),
        });
        assert_eq!(to_sexp(&expr), "(+ 1 (* 2 3))");
    }

    #[test]
    fn sexp_assignment_of_vector() {
        let expr = Expr::Variable(VariableExpr {
            name: "v".to_string(),
            value: Some(Box::new(Expr::Vector(VectorExpr {
                elements: vec![num(1.0, 5), num(2.5, 7)],
                span: Span::new(4, 7),
            }))),
            span: Span::new(0, 11),
        });
        assert_eq!(to_sexp(&expr), "(= v (vec 1 2.5))");
    }

    #[test]
    fn json_output_is_valid() {
        let expr = Expr::Unary(UnaryExpr {
            operator: UnaryOp::Abs,
            operand: Box::new(Expr::Variable(VariableExpr {
                name: "x".to_string(),
                value: None,
                span: Span::new(1, 1),
            })),
            span: Span::new(0, 3),
        });
        let json = to_json(&expr);
        let parsed: serde_json::Value =
            serde_json::from_str(&json).expect("JSON output should be valid");
        assert_eq!(parsed["type"], "Unary");
        assert_eq!(parsed["operand"]["name"], "x");
    }
}
