use crate::ast::*;
use crate::error::RuntimeError;
use crate::interpreter::Interpreter;

impl Interpreter {
    /// Replace every read of `target` inside `expr` with the value `target`
    /// holds right now, i.e. before the assignment that owns `expr` is stored.
    ///
    /// Reads of other names are followed into their bindings, so
    /// `y = x * 10; x = y + 1` stores `21` for `x` rather than a tree that
    /// points back at `x` through `y`. Any unary or binary node with a
    /// rewritten child is reduced to a literal on the spot.
    ///
    /// Vector literals are left alone. A self-reference hidden inside one
    /// survives into the table and is reported when the binding is read.
    pub(super) fn substitute_previous(
        &mut self,
        expr: &Expr,
        target: &str,
    ) -> Result<Expr, RuntimeError> {
        let (rewritten, changed) = self.rewrite(expr, target)?;
        if changed {
            tracing::trace!(
                variable = target,
                rewritten = %printer::to_sexp(&rewritten),
                "substituted previous binding"
            );
        }
        Ok(rewritten)
    }

    fn rewrite(&mut self, expr: &Expr, target: &str) -> Result<(Expr, bool), RuntimeError> {
        match expr {
            Expr::Literal(_) | Expr::Vector(_) | Expr::Call(_) => Ok((expr.clone(), false)),

            Expr::Variable(v) if v.value.is_some() => Ok((expr.clone(), false)),
            Expr::Variable(v) if v.name == target => {
                let previous = self.look_up(&v.name, v.span)?;
                Ok((previous.to_expr(v.span), true))
            }
            Expr::Variable(v) => {
                let Some(bound) = self.environment.get(&v.name).cloned() else {
                    return Ok((expr.clone(), false));
                };
                self.enter_binding(&v.name, v.span)?;
                let rewritten = self.rewrite(&bound, target);
                self.resolving.pop();
                match rewritten? {
                    (rewritten, true) => Ok((rewritten, true)),
                    (_, false) => Ok((expr.clone(), false)),
                }
            }

            Expr::Unary(u) => {
                let (operand, changed) = self.rewrite(&u.operand, target)?;
                if !changed {
                    return Ok((expr.clone(), false));
                }
                let rebuilt = Expr::Unary(UnaryExpr {
                    operator: u.operator,
                    operand: Box::new(operand),
                    span: u.span,
                });
                self.reduce(&rebuilt)
            }

            Expr::Binary(b) => {
                let (left, left_changed) = self.rewrite(&b.left, target)?;
                let (right, right_changed) = self.rewrite(&b.right, target)?;
                if !left_changed && !right_changed {
                    return Ok((expr.clone(), false));
                }
                let rebuilt = Expr::Binary(BinaryExpr {
                    left: Box::new(left),
                    operator: b.operator,
                    right: Box::new(right),
                    span: b.span,
                });
                self.reduce(&rebuilt)
            }
        }
    }

    fn reduce(&mut self, expr: &Expr) -> Result<(Expr, bool), RuntimeError> {
        let value = self.evaluate(expr)?;
        Ok((value.to_expr(expr.span()), true))
    }
}
