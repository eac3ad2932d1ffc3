use std::fmt;

use crate::ast::{Expr, VectorExpr};
use crate::scanner::token::Span;

/// A fully resolved result. Vectors are flat by construction.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Vector(Vec<f64>),
}

impl Value {
    /// Rebuild a literal tree for this value, so it can be stored as a binding.
    pub fn to_expr(&self, span: Span) -> Expr {
        match self {
            Self::Number(n) => Expr::number(*n, span),
            Self::Vector(fields) => Expr::Vector(VectorExpr {
                elements: fields.iter().map(|&n| Expr::number(n, span)).collect(),
                span,
            }),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Number(_) => "num",
            Self::Vector(_) => "vec",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Vector(fields) => {
                write!(f, "vec(")?;
                for (i, n) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{n}")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Combine two vectors element-wise, treating the shorter one as zero-padded.
pub fn zip_padded(a: &[f64], b: &[f64], op: fn(f64, f64) -> f64) -> Vec<f64> {
    let len = a.len().max(b.len());
    (0..len)
        .map(|i| {
            let x = a.get(i).copied().unwrap_or(0.0);
            let y = b.get(i).copied().unwrap_or(0.0);
            op(x, y)
        })
        .collect()
}

/// Dot product; missing trailing elements of the shorter vector count as zero.
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

pub fn scale(v: &[f64], k: f64) -> Vec<f64> {
    v.iter().map(|x| x * k).collect()
}

/// Euclidean norm.
pub fn norm(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_numbers() {
        assert_eq!(Value::Number(3.0).to_string(), "3");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        assert_eq!(Value::Number(-0.125).to_string(), "-0.125");
        assert_eq!(Value::Number(1e21).to_string(), "1000000000000000000000");
    }

    #[test]
    fn display_vectors() {
        assert_eq!(Value::Vector(vec![1.0, 2.5, -3.0]).to_string(), "vec(1 2.5 -3)");
        assert_eq!(Value::Vector(vec![]).to_string(), "vec()");
    }

    #[test]
    fn zip_padded_extends_shorter() {
        assert_eq!(zip_padded(&[1.0, 2.0], &[1.0, 2.0, 3.0], |a, b| a + b), vec![2.0, 4.0, 3.0]);
        assert_eq!(zip_padded(&[1.0, 2.0, 3.0], &[1.0], |a, b| a - b), vec![0.0, 2.0, 3.0]);
        assert_eq!(zip_padded(&[], &[], |a, b| a + b), Vec::<f64>::new());
    }

    #[test]
    fn dot_ignores_missing_tail() {
        assert_eq!(dot(&[1.0, 2.0, 3.0], &[4.0, 5.0]), 14.0);
        assert_eq!(dot(&[], &[4.0]), 0.0);
    }

    #[test]
    fn norm_is_euclidean() {
        assert_eq!(norm(&[3.0, 4.0]), 5.0);
        assert_eq!(norm(&[]), 0.0);
    }

    #[test]
    fn to_expr_keeps_shape() {
        let span = Span::new(0, 1);
        let expr = Value::Vector(vec![1.0, 2.0]).to_expr(span);
        match expr {
            Expr::Vector(v) => assert_eq!(v.elements.len(), 2),
            other => panic!("expected vector literal, got {other:?}"),
        }
        assert_eq!(Value::Number(4.0).to_expr(span), Expr::number(4.0, span));
    }
}
