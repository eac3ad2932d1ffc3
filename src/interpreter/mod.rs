pub mod environment;
mod rewrite;
pub mod value;

use crate::ast::*;
use crate::error::{Interrupt, RuntimeError};
use crate::interpreter::environment::Environment;
use crate::interpreter::value::{Value, dot, norm, scale, zip_padded};
use crate::parser;
use crate::scanner::token::{Keyword, Span};

/// How many bindings a single read may pass through before giving up.
const MAX_BINDING_DEPTH: usize = 200;

/// Tree-walking evaluator. Owns the binding table for one session; separate
/// interpreters never share bindings.
#[derive(Debug, Default)]
pub struct Interpreter {
    environment: Environment,
    /// Names whose bindings are currently being resolved, innermost last.
    resolving: Vec<String>,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_environment(environment: Environment) -> Self {
        Self {
            environment,
            resolving: Vec::new(),
        }
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Lex, parse and resolve one line. Does not record `ans`.
    pub fn run(&mut self, source: &str) -> Result<Option<Value>, Interrupt> {
        let expr = parser::parse_source(source)?;
        Ok(self.resolve(&expr)?)
    }

    /// Lex, parse and execute one line, recording `ans`.
    pub fn interpret_line(&mut self, source: &str) -> Result<Option<Value>, Interrupt> {
        let expr = parser::parse_source(source)?;
        Ok(self.execute(&expr)?)
    }

    /// Resolve a parsed line and remember a produced value as `ans`.
    pub fn execute(&mut self, expr: &Expr) -> Result<Option<Value>, RuntimeError> {
        let result = self.resolve(expr)?;
        if let Some(ref value) = result {
            tracing::trace!(kind = value.type_name(), "recording ans");
            self.environment
                .define(Keyword::Ans.to_string(), value.to_expr(expr.span()));
        }
        Ok(result)
    }

    /// Reduce a node to its value. Assignments and function calls produce no value.
    pub fn resolve(&mut self, expr: &Expr) -> Result<Option<Value>, RuntimeError> {
        match expr {
            Expr::Variable(VariableExpr {
                name,
                value: Some(value),
                ..
            }) => {
                self.assign(name, value)?;
                Ok(None)
            }
            Expr::Call(_) => Ok(None),
            _ => self.evaluate(expr).map(Some),
        }
    }

    /// Like `resolve`, for positions that need a value.
    fn evaluate(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Literal(l) => Ok(Value::Number(l.value)),
            Expr::Vector(v) => {
                let mut fields = Vec::with_capacity(v.elements.len());
                for element in &v.elements {
                    match self.evaluate(element)? {
                        Value::Number(n) => fields.push(n),
                        Value::Vector(_) => {
                            return Err(RuntimeError::with_span(
                                "vec in vec not allowed",
                                element.span(),
                            ));
                        }
                    }
                }
                Ok(Value::Vector(fields))
            }
            Expr::Unary(u) => {
                let operand = self.evaluate(&u.operand)?;
                Ok(match (u.operator, operand) {
                    (UnaryOp::Plus, value) => value,
                    (UnaryOp::Negate, Value::Number(n)) => Value::Number(-n),
                    (UnaryOp::Negate, Value::Vector(v)) => Value::Vector(scale(&v, -1.0)),
                    (UnaryOp::Abs, Value::Number(n)) => Value::Number(n.abs()),
                    (UnaryOp::Abs, Value::Vector(v)) => Value::Number(norm(&v)),
                })
            }
            Expr::Binary(b) => {
                let left = self.evaluate(&b.left)?;
                let right = self.evaluate(&b.right)?;
                apply_binary(b.operator, left, right, b.span)
            }
            Expr::Variable(v) => match v.value {
                None => self.look_up(&v.name, v.span),
                Some(_) => Err(RuntimeError::with_span(
                    "assignment has no value",
                    v.span,
                )),
            },
            Expr::Call(c) => Err(RuntimeError::with_span(
                format!("`{}` has no value", c.name),
                c.span,
            )),
        }
    }

    fn look_up(&mut self, name: &str, span: Span) -> Result<Value, RuntimeError> {
        let Some(bound) = self.environment.get(name).cloned() else {
            return Err(RuntimeError::with_span(format!("`{name}` is not defined"), span));
        };

        self.enter_binding(name, span)?;
        let result = self.evaluate(&bound);
        self.resolving.pop();
        result
    }

    /// Mark `name` as being resolved. Callers pop it once they are done.
    fn enter_binding(&mut self, name: &str, span: Span) -> Result<(), RuntimeError> {
        if self.resolving.iter().any(|n| n == name) {
            return Err(RuntimeError::with_span(
                format!("`{name}` is defined in terms of itself"),
                span,
            ));
        }
        if self.resolving.len() >= MAX_BINDING_DEPTH {
            return Err(RuntimeError::with_span(
                format!("`{name}` is nested too deeply"),
                span,
            ));
        }
        self.resolving.push(name.to_string());
        Ok(())
    }

    /// Bind `name` to `value` without leaving partial state behind on failure:
    /// the right-hand side is resolved first, then references to `name` inside
    /// it are replaced by the value `name` had before this assignment.
    fn assign(&mut self, name: &str, value: &Expr) -> Result<(), RuntimeError> {
        let value = match value {
            // `x = y = e`: bind y first, then give x a copy of y's binding.
            Expr::Variable(VariableExpr {
                name: inner,
                value: Some(inner_value),
                span,
            }) => {
                self.assign(inner, inner_value)?;
                match self.environment.get(inner) {
                    Some(stored) => stored.clone(),
                    None => {
                        return Err(RuntimeError::with_span(
                            format!("`{inner}` is not defined"),
                            *span,
                        ));
                    }
                }
            }
            other => other.clone(),
        };

        self.evaluate(&value)?;
        let stored = self.substitute_previous(&value, name)?;
        tracing::debug!(variable = name, binding = %printer::to_sexp(&stored), "bound variable");
        self.environment.define(name.to_string(), stored);
        Ok(())
    }
}

/// Every (operator, left kind, right kind) combination is listed explicitly.
fn apply_binary(op: BinaryOp, left: Value, right: Value, span: Span) -> Result<Value, RuntimeError> {
    use Value::{Number, Vector};

    match (op, left, right) {
        (BinaryOp::Add, Number(a), Number(b)) => Ok(Number(a + b)),
        (BinaryOp::Add, Vector(a), Vector(b)) => Ok(Vector(zip_padded(&a, &b, |x, y| x + y))),
        (BinaryOp::Add, Number(_), Vector(_)) | (BinaryOp::Add, Vector(_), Number(_)) => Err(
            RuntimeError::with_span("cannot add vec and num", span),
        ),

        (BinaryOp::Subtract, Number(a), Number(b)) => Ok(Number(a - b)),
        (BinaryOp::Subtract, Vector(a), Vector(b)) => {
            Ok(Vector(zip_padded(&a, &b, |x, y| x - y)))
        }
        (BinaryOp::Subtract, Number(_), Vector(_)) | (BinaryOp::Subtract, Vector(_), Number(_)) => {
            Err(RuntimeError::with_span("cannot subtract vec and num", span))
        }

        (BinaryOp::Multiply, Number(a), Number(b)) => Ok(Number(a * b)),
        (BinaryOp::Multiply, Number(k), Vector(v)) | (BinaryOp::Multiply, Vector(v), Number(k)) => {
            Ok(Vector(scale(&v, k)))
        }
        (BinaryOp::Multiply, Vector(a), Vector(b)) => Ok(Number(dot(&a, &b))),

        (BinaryOp::Divide, Number(_), Number(b)) | (BinaryOp::Divide, Vector(_), Number(b))
            if b == 0.0 =>
        {
            Err(RuntimeError::with_span("Division by zero", span))
        }
        (BinaryOp::Divide, Number(a), Number(b)) => Ok(Number(a / b)),
        (BinaryOp::Divide, Vector(v), Number(k)) => Ok(Vector(v.iter().map(|x| x / k).collect())),
        (BinaryOp::Divide, Number(_), Vector(_)) => {
            Err(RuntimeError::with_span("cannot divide by vec", span))
        }
        (BinaryOp::Divide, Vector(_), Vector(_)) => Err(RuntimeError::unimplemented(
            "division of vec by vec not implemented",
            span,
        )),

        (BinaryOp::Power, Number(a), Number(b)) => Ok(Number(a.powf(b))),
        (BinaryOp::Power, _, _) => Err(RuntimeError::unimplemented(
            "pow for vec not implemented",
            span,
        )),

        // `a \ b` is the a-th root of b.
        (BinaryOp::Root, Number(_), Number(radicand)) if radicand < 0.0 => {
            Err(RuntimeError::with_span("negative number in root", span))
        }
        (BinaryOp::Root, Number(_), Number(radicand)) if radicand == 0.0 => Ok(Number(0.0)),
        (BinaryOp::Root, Number(index), Number(radicand)) => Ok(Number(radicand.powf(1.0 / index))),
        (BinaryOp::Root, _, _) => Err(RuntimeError::unimplemented(
            "root for vec not implemented",
            span,
        )),
    }
}
