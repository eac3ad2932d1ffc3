use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use crate::scanner::token::Span;

/// Classification of a failed line, independent of which stage raised it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum ErrorKind {
    #[strum(serialize = "CharacterError")]
    Character,
    #[strum(serialize = "SyntaxError")]
    Syntax,
    #[strum(serialize = "RuntimeError")]
    Runtime,
    #[strum(serialize = "ImplementError")]
    Implement,
}

// ============= Compile-time errors (with miette diagnostics) =============

#[derive(Error, Debug, Diagnostic)]
pub enum CompileError {
    #[error("character error: {message}")]
    #[diagnostic(code(vecalc::character))]
    Character {
        message: String,
        #[label("here")]
        span: SourceSpan,
        #[source_code]
        src: miette::NamedSource<String>,
    },

    #[error("syntax error: {message}")]
    #[diagnostic(code(vecalc::syntax))]
    Syntax {
        message: String,
        #[label("here")]
        span: SourceSpan,
        #[source_code]
        src: miette::NamedSource<String>,
    },

    #[error("implement error: {message}")]
    #[diagnostic(code(vecalc::implement))]
    Implement {
        message: String,
        #[label("not implemented")]
        span: SourceSpan,
        #[source_code]
        src: miette::NamedSource<String>,
    },
}

impl CompileError {
    pub fn character(message: impl Into<String>, offset: usize, len: usize) -> Self {
        Self::Character {
            message: message.into(),
            span: SourceSpan::new(offset.into(), len),
            src: miette::NamedSource::new("input", String::new()),
        }
    }

    pub fn syntax(message: impl Into<String>, offset: usize, len: usize) -> Self {
        Self::Syntax {
            message: message.into(),
            span: SourceSpan::new(offset.into(), len),
            src: miette::NamedSource::new("input", String::new()),
        }
    }

    pub fn implement(message: impl Into<String>, offset: usize, len: usize) -> Self {
        Self::Implement {
            message: message.into(),
            span: SourceSpan::new(offset.into(), len),
            src: miette::NamedSource::new("input", String::new()),
        }
    }

    /// Attach source code for fancy miette diagnostics
    pub fn with_source_code(self, name: impl Into<String>, source: impl Into<String>) -> Self {
        let src = miette::NamedSource::new(name.into(), source.into());
        match self {
            Self::Character { message, span, .. } => Self::Character { message, span, src },
            Self::Syntax { message, span, .. } => Self::Syntax { message, span, src },
            Self::Implement { message, span, .. } => Self::Implement { message, span, src },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Character { .. } => ErrorKind::Character,
            Self::Syntax { .. } => ErrorKind::Syntax,
            Self::Implement { .. } => ErrorKind::Implement,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Character { message, .. }
            | Self::Syntax { message, .. }
            | Self::Implement { message, .. } => message,
        }
    }
}

// ============= Runtime errors (simple, no miette) =============

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("runtime error: {message}")]
    Runtime { message: String, span: Option<Span> },

    #[error("implement error: {message}")]
    Implement { message: String, span: Option<Span> },
}

impl RuntimeError {
    /// Create a runtime error pointing at the expression that failed
    pub fn with_span(message: impl Into<String>, span: Span) -> Self {
        Self::Runtime {
            message: message.into(),
            span: Some(span),
        }
    }

    /// A feature the evaluator recognizes but does not support
    pub fn unimplemented(message: impl Into<String>, span: Span) -> Self {
        Self::Implement {
            message: message.into(),
            span: Some(span),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Runtime { .. } => ErrorKind::Runtime,
            Self::Implement { .. } => ErrorKind::Implement,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Runtime { message, .. } | Self::Implement { message, .. } => message,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Runtime { span, .. } | Self::Implement { span, .. } => *span,
        }
    }

    /// Format error with the 1-based column it points at
    pub fn display_with_column(&self, source: &str) -> String {
        match self.span() {
            Some(span) => {
                let column = offset_to_column(source, span.offset);
                format!("Error: col {}: {}", column, self.message())
            }
            None => format!("Error: {}", self.message()),
        }
    }
}

/// Calculate the 1-based character column from a byte offset in a line
fn offset_to_column(source: &str, offset: usize) -> usize {
    let mut end = offset.min(source.len());
    while !source.is_char_boundary(end) {
        end -= 1;
    }
    source[..end].chars().count() + 1
}

// ============= Session control =============

/// Requests from the input line to the session host. These interrupt the
/// normal parse/resolve flow but are not failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Signal {
    Exit,
    Help,
    Clear,
}

/// Everything that can stop a line from producing a value.
#[derive(Error, Debug)]
pub enum Interrupt {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error("{0}")]
    Signal(Signal),
}

impl From<Signal> for Interrupt {
    fn from(signal: Signal) -> Self {
        Self::Signal(signal)
    }
}

impl Interrupt {
    /// The error classification, or `None` for a control signal.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Compile(e) => Some(e.kind()),
            Self::Runtime(e) => Some(e.kind()),
            Self::Signal(_) => None,
        }
    }

    pub fn signal(&self) -> Option<Signal> {
        match self {
            Self::Signal(signal) => Some(*signal),
            _ => None,
        }
    }
}

// ============= Tests =============
