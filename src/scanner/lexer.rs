use winnow::error::ContextError;
use winnow::prelude::*;
use winnow::stream::{LocatingSlice, Location};
use winnow::token::{any, take_while};

use crate::error::CompileError;
use crate::scanner::token::{Keyword, Span, Token, TokenKind, is_function_name};

type Input<'a> = LocatingSlice<&'a str>;

/// Whitespace is only meaningful directly inside the outermost vector delimiter.
/// `depth` counts open parentheses, starting at 1 for `[` and at 0 after `vec`
/// (the following `(` brings it to 1).
#[derive(Debug, Default, Clone, Copy)]
struct VectorMode {
    active: bool,
    depth: usize,
}

impl VectorMode {
    fn spaces_significant(&self) -> bool {
        self.active && self.depth == 1
    }

    fn observe(&mut self, token: &Token) {
        match token.kind {
            TokenKind::Keyword if token.keyword() == Some(Keyword::Vec) => {
                self.active = true;
                self.depth = 0;
            }
            TokenKind::LeftBracket => {
                self.active = true;
                self.depth = 1;
            }
            TokenKind::RightBracket => *self = Self::default(),
            TokenKind::LeftParen if self.active => self.depth += 1,
            TokenKind::RightParen if self.active => {
                self.depth = self.depth.saturating_sub(1);
                if self.depth == 0 {
                    self.active = false;
                }
            }
            _ => {}
        }
    }
}

fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t' || c == '\r' || c == '\n'
}

fn blanks<'a>(input: &mut Input<'a>) -> ModalResult<Span> {
    let start = input.current_token_start();
    let run: &str = take_while(1.., is_blank).parse_next(input)?;
    Ok(Span::new(start, run.len()))
}

/// Digits with decimal separators (`.` or `,`). The separator count is checked
/// by the caller so that a malformed number reports the whole text.
fn number_literal<'a>(input: &mut Input<'a>) -> ModalResult<(&'a str, Span)> {
    let start = input.current_token_start();
    let text: &str = (
        any.verify(|c: &char| c.is_ascii_digit()),
        take_while(0.., |c: char| c.is_ascii_digit() || c == '.' || c == ','),
    )
        .take()
        .parse_next(input)?;
    Ok((text, Span::new(start, text.len())))
}

fn identifier_or_keyword<'a>(input: &mut Input<'a>) -> ModalResult<Token> {
    let start = input.current_token_start();
    let lexeme: &str = (
        any.verify(|c: &char| c.is_ascii_alphabetic() || *c == '_'),
        take_while(0.., |c: char| c.is_ascii_alphanumeric() || c == '_'),
    )
        .take()
        .parse_next(input)?;
    let kind = if Keyword::lookup(lexeme).is_some() {
        TokenKind::Keyword
    } else if is_function_name(lexeme) {
        TokenKind::Function
    } else {
        TokenKind::Identifier
    };
    Ok(Token::new(kind, lexeme, Span::new(start, lexeme.len())))
}

fn single_char_token<'a>(input: &mut Input<'a>) -> ModalResult<Token> {
    let start = input.current_token_start();
    let c = any
        .verify(|c: &char| "+-*/:^\\=?|()[];".contains(*c))
        .parse_next(input)?;
    let kind = match c {
        '+' => TokenKind::Plus,
        '-' => TokenKind::Minus,
        '*' => TokenKind::Star,
        '/' | ':' => TokenKind::Slash,
        '^' => TokenKind::Caret,
        '\\' => TokenKind::Backslash,
        '=' => TokenKind::Equal,
        '?' => TokenKind::Question,
        '|' => TokenKind::Pipe,
        '(' => TokenKind::LeftParen,
        ')' => TokenKind::RightParen,
        '[' => TokenKind::LeftBracket,
        ']' => TokenKind::RightBracket,
        ';' => TokenKind::Delimiter,
        _ => unreachable!("verify guarantees valid char"),
    };
    Ok(Token::new(kind, c.to_string(), Span::new(start, 1)))
}

fn number_token(text: &str, span: Span) -> Result<Token, CompileError> {
    let separators = text.chars().filter(|&c| c == '.' || c == ',').count();
    if separators > 1 {
        return Err(CompileError::syntax(
            format!("`{text}` is not a number"),
            span.offset,
            span.len,
        ));
    }
    Ok(Token::new(TokenKind::Number, text.replace(',', "."), span))
}

/// Scan a whole line into tokens, stopping at the first error.
pub fn scan_all(source: &str) -> Result<Vec<Token>, CompileError> {
    let mut input = LocatingSlice::new(source);
    let mut mode = VectorMode::default();
    let mut tokens = Vec::new();

    while !input.is_empty() {
        if let Ok(span) = blanks(&mut input) {
            if mode.spaces_significant() {
                tokens.push(Token::new(TokenKind::Space, " ", span));
            }
            continue;
        }

        let token = if let Ok((text, span)) = number_literal(&mut input) {
            number_token(text, span)?
        } else if let Ok(token) = identifier_or_keyword(&mut input) {
            token
        } else if let Ok(token) = single_char_token(&mut input) {
            token
        } else {
            let offset = input.current_token_start();
            let ch = any::<_, ContextError>.parse_next(&mut input).unwrap_or('?');
            return Err(CompileError::character(
                format!("invalid character '{ch}'"),
                offset,
                ch.len_utf8(),
            ));
        };

        mode.observe(&token);
        tokens.push(token);
    }

    tokens.push(Token::new(TokenKind::Eof, "", Span::new(source.len(), 0)));
    Ok(tokens)
}
