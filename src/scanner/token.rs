use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum TokenKind {
    // Single-character tokens
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    Backslash,
    Equal,
    Question,
    Pipe,
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    Delimiter,

    // Only produced directly inside a vector literal
    Space,

    // Literals
    Number,
    Identifier,
    Keyword,
    Function,

    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plus => write!(f, "+"),
            Self::Minus => write!(f, "-"),
            Self::Star => write!(f, "*"),
            Self::Slash => write!(f, "/"),
            Self::Caret => write!(f, "^"),
            Self::Backslash => write!(f, "\\"),
            Self::Equal => write!(f, "="),
            Self::Question => write!(f, "?"),
            Self::Pipe => write!(f, "|"),
            Self::LeftParen => write!(f, "("),
            Self::RightParen => write!(f, ")"),
            Self::LeftBracket => write!(f, "["),
            Self::RightBracket => write!(f, "]"),
            Self::Delimiter => write!(f, ";"),
            Self::Space => write!(f, "SPACE"),
            Self::Number => write!(f, "NUMBER"),
            Self::Identifier => write!(f, "IDENTIFIER"),
            Self::Keyword => write!(f, "KEYWORD"),
            Self::Function => write!(f, "FUNCTION"),
            Self::Eof => write!(f, "EOF"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Span {
    pub offset: usize,
    pub len: usize,
}

impl Span {
    pub fn new(offset: usize, len: usize) -> Self {
        Self { offset, len }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        let end = (other.offset + other.len).max(self.offset + self.len);
        Span::new(self.offset, end - self.offset)
    }
}

impl From<Span> for miette::SourceSpan {
    fn from(span: Span) -> Self {
        miette::SourceSpan::new(span.offset.into(), span.len)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            span,
        }
    }

    /// The keyword this token spells, if it is a keyword token.
    pub fn keyword(&self) -> Option<Keyword> {
        match self.kind {
            TokenKind::Keyword => Keyword::lookup(&self.lexeme),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} '{}' @{}", self.kind, self.lexeme, self.span.offset)
    }
}

/// Reserved words. Each keyword has one canonical spelling and optional aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Keyword {
    Vec,
    Quit,
    Clear,
    Help,
    Ans,
    Export,
}

impl Keyword {
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Quit => &["end", "exit", "close"],
            Self::Clear => &["cls"],
            Self::Export => &["save"],
            Self::Vec | Self::Help | Self::Ans => &[],
        }
    }

    /// Resolve a canonical name or alias to its keyword.
    pub fn lookup(word: &str) -> Option<Keyword> {
        use strum::IntoEnumIterator;

        Keyword::iter().find(|kw| kw.to_string() == word || kw.aliases().contains(&word))
    }
}

/// Names reserved for built-in functions. Calls to them parse but produce no value.
pub const FUNCTION_NAMES: &[&str] = &["sin", "cos", "tan", "log", "ln"];

pub fn is_function_name(ident: &str) -> bool {
    FUNCTION_NAMES.contains(&ident)
}
