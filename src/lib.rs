pub mod ast;
pub mod error;
pub mod interpreter;
pub mod parser;
pub mod repl;
pub mod scanner;

// Re-export the types a host needs for one session
pub use error::{CompileError, ErrorKind, Interrupt, RuntimeError, Signal};
pub use interpreter::Interpreter;
pub use interpreter::value::Value;
