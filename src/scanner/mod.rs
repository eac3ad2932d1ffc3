pub mod lexer;
pub mod token;

use crate::error::CompileError;
use token::Token;

/// Scan one line of input into a list of tokens.
pub fn scan(source: &str) -> Result<Vec<Token>, CompileError> {
    let tokens = lexer::scan_all(source)?;
    tracing::trace!(count = tokens.len(), "scanned tokens");
    Ok(tokens)
}
