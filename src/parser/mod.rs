use crate::ast::*;
use crate::error::{CompileError, Interrupt, Signal};
use crate::scanner;
use crate::scanner::token::{Keyword, Span, Token, TokenKind};

/// Recursive-descent parser for one input line.
///
/// ```text
/// expr   := term   ( ('+'|'-') term )*
/// term   := atom   ( ('*'|'/') atom )*
/// atom   := factor ( ('^'|'\') factor )*
/// factor := number | ('+'|'-'|'?') factor | '|' expr '|' | '(' expr ')'
///         | vector | identifier [ '=' expr ] | function '(' expr ')' | keyword
/// ```
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    /// Open `|` bars around the current position. A space between bars is
    /// padding, never an element separator.
    bar_depth: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            current: 0,
            bar_depth: 0,
        }
    }

    pub fn parse(mut self) -> Result<Expr, Interrupt> {
        let expr = self.expression()?;
        if !self.is_at_end() {
            return Err(self.error_at_current("Expected expression").into());
        }
        check_assignment_placement(&expr, true)?;
        tracing::debug!(ast = %printer::to_sexp(&expr), "parsed line");
        Ok(expr)
    }

    fn expression(&mut self) -> Result<Expr, Interrupt> {
        let mut expr = self.term()?;
        while let Some(op) = self.match_binary_op(&[TokenKind::Plus, TokenKind::Minus]) {
            let right = self.term()?;
            expr = binary(expr, op, right);
        }
        Ok(expr)
    }

    fn term(&mut self) -> Result<Expr, Interrupt> {
        let mut expr = self.atom()?;
        while let Some(op) = self.match_binary_op(&[TokenKind::Star, TokenKind::Slash]) {
            let right = self.atom()?;
            expr = binary(expr, op, right);
        }
        Ok(expr)
    }

    fn atom(&mut self) -> Result<Expr, Interrupt> {
        let mut expr = self.factor()?;
        while let Some(op) = self.match_binary_op(&[TokenKind::Caret, TokenKind::Backslash]) {
            let right = self.factor()?;
            expr = binary(expr, op, right);
        }
        Ok(expr)
    }

    fn factor(&mut self) -> Result<Expr, Interrupt> {
        // An element separator can never end in an operator, so a space that
        // lands where an operand is expected is just padding.
        self.skip_spaces();

        let token = self.peek().clone();
        match token.kind {
            TokenKind::Number => {
                self.advance();
                let value: f64 = token.lexeme.parse().map_err(|_| {
                    CompileError::syntax(
                        format!("`{}` is not a number", token.lexeme),
                        token.span.offset,
                        token.span.len,
                    )
                })?;
                Ok(Expr::number(value, token.span))
            }
            TokenKind::Plus | TokenKind::Minus | TokenKind::Question => {
                self.advance();
                let operator = match token.kind {
                    TokenKind::Plus => UnaryOp::Plus,
                    TokenKind::Minus => UnaryOp::Negate,
                    _ => UnaryOp::Abs,
                };
                let operand = self.factor()?;
                Ok(Expr::Unary(UnaryExpr {
                    operator,
                    span: token.span.to(operand.span()),
                    operand: Box::new(operand),
                }))
            }
            TokenKind::Pipe => {
                self.advance();
                self.bar_depth += 1;
                let operand = self.expression();
                self.bar_depth -= 1;
                let operand = operand?;
                self.skip_spaces();
                self.consume(TokenKind::Pipe)?;
                Ok(Expr::Unary(UnaryExpr {
                    operator: UnaryOp::Abs,
                    operand: Box::new(operand),
                    span: self.span_from(token.span),
                }))
            }
            TokenKind::LeftParen => {
                self.advance();
                let expr = self.expression()?;
                self.consume(TokenKind::RightParen)?;
                Ok(expr)
            }
            TokenKind::LeftBracket => {
                self.advance();
                self.vector_literal(token.span, TokenKind::RightBracket)
            }
            TokenKind::Identifier => {
                self.advance();
                self.variable(token)
            }
            TokenKind::Function => {
                self.advance();
                self.consume(TokenKind::LeftParen)?;
                let argument = self.expression()?;
                self.consume(TokenKind::RightParen)?;
                Ok(Expr::Call(CallExpr {
                    name: token.lexeme,
                    argument: Box::new(argument),
                    span: self.span_from(token.span),
                }))
            }
            TokenKind::Keyword => self.keyword(token),
            _ => Err(self.error_at_current("Expected expression").into()),
        }
    }

    fn variable(&mut self, ident: Token) -> Result<Expr, Interrupt> {
        if !self.match_token(TokenKind::Equal) {
            return Ok(Expr::Variable(VariableExpr {
                name: ident.lexeme,
                value: None,
                span: ident.span,
            }));
        }

        let value = self.expression()?;
        if let Expr::Variable(VariableExpr { value: None, .. }) = value {
            let span = value.span();
            return Err(CompileError::syntax(
                "cannot assign variable in variable assignment",
                span.offset,
                span.len.max(1),
            )
            .into());
        }
        Ok(Expr::Variable(VariableExpr {
            name: ident.lexeme,
            span: ident.span.to(value.span()),
            value: Some(Box::new(value)),
        }))
    }

    fn keyword(&mut self, token: Token) -> Result<Expr, Interrupt> {
        match token.keyword() {
            Some(Keyword::Vec) => {
                self.advance();
                self.consume(TokenKind::LeftParen)?;
                self.vector_literal(token.span, TokenKind::RightParen)
            }
            Some(Keyword::Quit) => Err(Signal::Exit.into()),
            Some(Keyword::Help) => Err(Signal::Help.into()),
            Some(Keyword::Clear) => Err(Signal::Clear.into()),
            Some(Keyword::Ans) => {
                self.advance();
                Ok(Expr::Variable(VariableExpr {
                    name: Keyword::Ans.to_string(),
                    value: None,
                    span: token.span,
                }))
            }
            Some(Keyword::Export) | None => Err(CompileError::implement(
                format!("keyword `{}` not implemented", token.lexeme),
                token.span.offset,
                token.span.len,
            )
            .into()),
        }
    }

    /// Parse vector elements up to `close`; the opening delimiter is already consumed.
    ///
    /// A run of n delimiters between two elements stands for n-1 elided zeros,
    /// and a run touching either end of the literal adds one more zero for that end:
    /// `[1;;3]` is `[1 0 3]`, `[;1;]` is `[0 1 0]`.
    fn vector_literal(&mut self, open: Span, close: TokenKind) -> Result<Expr, Interrupt> {
        let outer_bars = std::mem::take(&mut self.bar_depth);
        let result = self.vector_elements(open, close);
        self.bar_depth = outer_bars;
        result
    }

    fn vector_elements(&mut self, open: Span, close: TokenKind) -> Result<Expr, Interrupt> {
        let mut elements = Vec::new();
        let mut at_start = true;

        loop {
            let token = self.peek().clone();
            match token.kind {
                kind if kind == close => break,
                TokenKind::Eof => {
                    return Err(self.error_at_current(&format!("Expected {close}")).into());
                }
                TokenKind::Space => {
                    self.advance();
                }
                TokenKind::Delimiter => {
                    let run = self.delimiter_run();
                    let zeros = run - 1 + usize::from(at_start) + usize::from(self.check(close));
                    elements.extend((0..zeros).map(|_| Expr::number(0.0, token.span)));
                    at_start = false;
                }
                _ => {
                    let element = self.expression()?;
                    let span = element.span();
                    match element {
                        Expr::Vector(_) => {
                            return Err(CompileError::syntax(
                                "vec in vec not allowed",
                                span.offset,
                                span.len,
                            )
                            .into());
                        }
                        ref e if e.is_assignment() => {
                            return Err(CompileError::syntax(
                                "cannot assign variable in vec",
                                span.offset,
                                span.len,
                            )
                            .into());
                        }
                        _ => elements.push(element),
                    }
                    at_start = false;
                }
            }
        }
        self.advance(); // consume close

        Ok(Expr::Vector(VectorExpr {
            elements,
            span: self.span_from(open),
        }))
    }

    /// Consume consecutive delimiters (spaces between them are ignored) and
    /// return how many there were.
    fn delimiter_run(&mut self) -> usize {
        let mut count = 0;
        loop {
            match self.peek().kind {
                TokenKind::Delimiter => count += 1,
                TokenKind::Space => {}
                _ => return count,
            }
            self.advance();
        }
    }

    // --- Helper methods ---

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        &self.tokens[self.current - 1]
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn skip_spaces(&mut self) {
        while self.match_token(TokenKind::Space) {}
    }

    fn match_binary_op(&mut self, kinds: &[TokenKind]) -> Option<BinaryOp> {
        if self.bar_depth > 0 {
            self.skip_spaces();
        }
        for &kind in kinds {
            if self.check(kind) {
                self.advance();
                return Some(token_to_binary_op(kind));
            }
        }
        None
    }

    fn consume(&mut self, kind: TokenKind) -> Result<&Token, CompileError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error_at_current(&format!("Expected {kind}")))
        }
    }

    fn error_at_current(&self, message: &str) -> CompileError {
        let span = self.peek().span;
        CompileError::syntax(message, span.offset, span.len.max(1))
    }

    fn previous_span(&self) -> Span {
        self.tokens[self.current.saturating_sub(1)].span
    }

    fn span_from(&self, start: Span) -> Span {
        start.to(self.previous_span())
    }
}

/// Scan and parse one line. Compile errors carry the line as source code so
/// miette can render them.
pub fn parse_source(source: &str) -> Result<Expr, Interrupt> {
    let tokens = scanner::scan(source).map_err(|e| e.with_source_code("input", source))?;
    Parser::new(tokens).parse().map_err(|interrupt| match interrupt {
        Interrupt::Compile(e) => Interrupt::Compile(e.with_source_code("input", source)),
        other => other,
    })
}

fn binary(left: Expr, operator: BinaryOp, right: Expr) -> Expr {
    Expr::Binary(BinaryExpr {
        span: left.span().to(right.span()),
        left: Box::new(left),
        operator,
        right: Box::new(right),
    })
}

fn token_to_binary_op(kind: TokenKind) -> BinaryOp {
    match kind {
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Subtract,
        TokenKind::Star => BinaryOp::Multiply,
        TokenKind::Slash => BinaryOp::Divide,
        TokenKind::Caret => BinaryOp::Power,
        TokenKind::Backslash => BinaryOp::Root,
        _ => unreachable!("only called with matched operator tokens"),
    }
}

/// Assignments are statements: they may only form the whole line, or the
/// right-hand side of another assignment (`x = y = 3`).
fn check_assignment_placement(expr: &Expr, allowed: bool) -> Result<(), CompileError> {
    match expr {
        Expr::Literal(_) => Ok(()),
        Expr::Vector(v) => v
            .elements
            .iter()
            .try_for_each(|e| check_assignment_placement(e, false)),
        Expr::Unary(u) => check_assignment_placement(&u.operand, false),
        Expr::Binary(b) => {
            check_assignment_placement(&b.left, false)?;
            check_assignment_placement(&b.right, false)
        }
        Expr::Call(c) => check_assignment_placement(&c.argument, false),
        Expr::Variable(v) => match &v.value {
            None => Ok(()),
            Some(_) if !allowed => Err(CompileError::syntax(
                "assignment is only allowed as a whole expression",
                v.span.offset,
                v.span.len,
            )),
            Some(value) => check_assignment_placement(value, true),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use rstest::rstest;

    fn parse_ok(source: &str) -> Expr {
        let tokens = scanner::scan(source).expect("scan should succeed");
        Parser::new(tokens).parse().expect("parse should succeed")
    }

    fn parse_err(source: &str) -> Interrupt {
        let tokens = scanner::scan(source).expect("scan should succeed");
        Parser::new(tokens).parse().unwrap_err()
    }

    fn parse_sexp(source: &str) -> String {
        printer::to_sexp(&parse_ok(source))
    }

    #[rstest]
    #[case("1 + 2 * 3", "(+ 1 (* 2 3))")]
    #[case("(1 + 2) * 3", "(* (+ 1 2) 3)")]
    #[case("1 - 2 - 3", "(- (- 1 2) 3)")]
    #[case("2 * 3 ^ 2", "(* 2 (^ 3 2))")]
    #[case("2 ^ 3 ^ 2", "(^ (^ 2 3) 2)")]
    #[case("2 \\ 9", "(\\ 2 9)")]
    #[case("8 : 2", "(/ 8 2)")]
    #[case("-1 + +2", "(+ (- 1) (+ 2))")]
    #[case("-2 ^ 2", "(^ (- 2) 2)")]
    #[case("?-3", "(? (- 3))")]
    #[case("|1 - 4|", "(? (- 1 4))")]
    #[case("1,5", "1.5")]
    fn precedence_and_unary(#[case] source: &str, #[case] expected: &str) {
        assert_eq!(parse_sexp(source), expected);
    }

    #[rstest]
    #[case("[1 2 3]", "(vec 1 2 3)")]
    #[case("[1;2;3]", "(vec 1 2 3)")]
    #[case("vec(1 2 3)", "(vec 1 2 3)")]
    #[case("vec(1;2;3)", "(vec 1 2 3)")]
    #[case("[ 1  2 ]", "(vec 1 2)")]
    #[case("[1 -2]", "(vec 1 (- 2))")]
    #[case("[1 + 2]", "(vec 1 (+ 2))")]
    #[case("[1+ 2]", "(vec (+ 1 2))")]
    #[case("[(1 + 2) 3]", "(vec (+ 1 2) 3)")]
    #[case("[|1 - 2| 3]", "(vec (? (- 1 2)) 3)")]
    #[case("[| 1 * 2 | 3]", "(vec (? (* 1 2)) 3)")]
    #[case("[|[3 -4]| 1]", "(vec (? (vec 3 (- 4))) 1)")]
    #[case("[x y]", "(vec x y)")]
    #[case("[]", "(vec)")]
    fn vector_literals(#[case] source: &str, #[case] expected: &str) {
        assert_eq!(parse_sexp(source), expected);
    }

    #[rstest]
    #[case("[1;;3]", "(vec 1 0 3)")]
    #[case("[1;;;4]", "(vec 1 0 0 4)")]
    #[case("[;1]", "(vec 0 1)")]
    #[case("[1;]", "(vec 1 0)")]
    #[case("[;1;]", "(vec 0 1 0)")]
    #[case("[;]", "(vec 0 0)")]
    #[case("[1 ; ; 3]", "(vec 1 0 3)")]
    #[case("vec(;2)", "(vec 0 2)")]
    #[case("[1 2;3]", "(vec 1 2 3)")]
    fn elided_elements(#[case] source: &str, #[case] expected: &str) {
        assert_eq!(parse_sexp(source), expected);
    }

    #[test]
    fn assignment() {
        assert_eq!(parse_sexp("x = 42"), "(= x 42)");
        assert_eq!(parse_sexp("x = x + 1"), "(= x (+ x 1))");
        assert_eq!(parse_sexp("x = y = 3"), "(= x (= y 3))");
    }

    #[test]
    fn ans_keyword_is_a_reference() {
        assert_eq!(parse_sexp("ans * 2"), "(* ans 2)");
    }

    #[test]
    fn function_call_placeholder() {
        assert_eq!(parse_sexp("sin(1 + 2)"), "(call sin (+ 1 2))");
    }

    #[rstest]
    #[case("quit", Signal::Exit)]
    #[case("exit", Signal::Exit)]
    #[case("close", Signal::Exit)]
    #[case("end", Signal::Exit)]
    #[case("help", Signal::Help)]
    #[case("clear", Signal::Clear)]
    #[case("cls", Signal::Clear)]
    #[case("1 + quit", Signal::Exit)]
    fn control_signals(#[case] source: &str, #[case] signal: Signal) {
        assert_eq!(parse_err(source).signal(), Some(signal));
    }

    #[rstest]
    #[case("(1 2)", "Expected )")]
    #[case("(1 + 2", "Expected )")]
    #[case("|1 + 2", "Expected |")]
    #[case("1 2", "Expected expression")]
    #[case("1 +", "Expected expression")]
    #[case("*3", "Expected expression")]
    #[case("[1 2", "Expected ]")]
    #[case("vec(1 2", "Expected )")]
    #[case("vec 1", "Expected (")]
    #[case("[1 [2 3]]", "vec in vec not allowed")]
    #[case("[1 vec(2 3)]", "vec in vec not allowed")]
    #[case("[x=2]", "cannot assign variable in vec")]
    #[case("[x = 2]", "Expected expression")]
    #[case("x = y", "cannot assign variable in variable assignment")]
    #[case("x = (y)", "cannot assign variable in variable assignment")]
    #[case("x = ans", "cannot assign variable in variable assignment")]
    #[case("1 + (x = 2)", "assignment is only allowed as a whole expression")]
    #[case("|x = 2|", "assignment is only allowed as a whole expression")]
    #[case("sin 1", "Expected (")]
    fn syntax_errors(#[case] source: &str, #[case] message: &str) {
        let err = parse_err(source);
        assert_eq!(err.kind(), Some(ErrorKind::Syntax), "{source}: {err}");
        assert!(err.to_string().contains(message), "{source}: {err}");
    }

    #[test]
    fn unknown_keyword_is_implement_error() {
        let err = parse_err("export");
        assert_eq!(err.kind(), Some(ErrorKind::Implement));
        let err = parse_err("save");
        assert!(err.to_string().contains("not implemented"));
    }

    #[test]
    fn vector_spans_cover_delimiters() {
        let expr = parse_ok("x + [1 2]");
        match expr {
            Expr::Binary(b) => assert_eq!(b.right.span(), Span::new(4, 5)),
            other => panic!("expected binary, got {other:?}"),
        }
    }
}
