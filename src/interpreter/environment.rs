use std::collections::HashMap;

use crate::ast::Expr;

/// The binding table: identifier to its stored (possibly unresolved) tree.
///
/// Bindings are never removed. Reads resolve the stored tree afresh every
/// time, so a binding that mentions another variable follows that variable's
/// later redefinitions.
#[derive(Debug, Default, Clone)]
pub struct Environment {
    values: HashMap<String, Expr>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name`, replacing any previous binding.
    pub fn define(&mut self, name: String, value: Expr) {
        self.values.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<&Expr> {
        self.values.get(name)
    }
}
