//! Kisumu - front end for the Kisumu scripting language.
//!
//! Source text is tokenized by [`lexer`] and turned into an AST by
//! [`parser`]. Neither stage stops at the first problem: the parser
//! collects every diagnostic and returns whatever tree it could build.
//!
//! # Example
//!
//! ```
//! use kisumu::parse_source;
//!
//! let outcome = parse_source("let add = fn(a, b) { a + b };");
//! assert!(outcome.is_ok());
//! assert_eq!(outcome.program.to_string(), "let add = fn(a, b) { (a + b) };");
//! ```

pub use kisumu_lexer as lexer;
pub use kisumu_parser as parser;

// Re-export commonly used types
pub use kisumu_lexer::{Lexer, Position, Token, TokenKind, tokenize};
pub use kisumu_parser::{
    Expression, Node, ParseErrorKind, Parser, ParserError, Precedence, Program, Statement, parse,
};

/// The result of parsing a whole source text.
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    /// The program as far as it could be built. Unparseable expressions
    /// appear as [`Expression::Invalid`].
    pub program: Program,
    /// Diagnostics in encounter order.
    pub errors: Vec<ParserError>,
}

impl ParseOutcome {
    /// True when no diagnostics were recorded.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Diagnostic texts without locations.
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.message()).collect()
    }

    pub fn into_result(self) -> Result<Program, Vec<ParserError>> {
        if self.errors.is_empty() {
            Ok(self.program)
        } else {
            Err(self.errors)
        }
    }
}

/// Tokenize and parse Kisumu source code, keeping both the partial
/// program and the diagnostics.
///
/// # Example
///
/// ```
/// use kisumu::parse_source;
///
/// let outcome = parse_source("let x 5;");
/// assert!(!outcome.is_ok());
/// assert_eq!(outcome.messages(), ["expected next token to be =, got INT instead"]);
/// ```
pub fn parse_source(source: &str) -> ParseOutcome {
    let mut parser = Parser::new(tokenize(source));
    let program = parser.parse_program();
    ParseOutcome {
        program,
        errors: parser.into_errors(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(source: &str) -> String {
        let outcome = parse_source(source);
        assert!(outcome.is_ok(), "errors for {:?}: {:?}", source, outcome.messages());
        outcome.program.to_string()
    }

    #[test]
    fn test_parse_source_ok() {
        let outcome = parse_source("let five = 5;\nlet result = add(five, 10);");
        assert!(outcome.is_ok());
        assert_eq!(outcome.program.len(), 2);
        assert!(matches!(outcome.program.statements[0], Statement::Let(_)));
    }

    #[test]
    fn test_parse_source_keeps_partial_program() {
        let outcome = parse_source("let a = 1;\nlet b 2;\nlet c = 3;");
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.program.to_string(), "let a = 1;\n2\nlet c = 3;");
    }

    #[test]
    fn test_into_result() {
        assert!(parse_source("1 + 2").into_result().is_ok());
        let errors = parse_source("(").into_result().unwrap_err();
        assert_eq!(errors[0].kind, ParseErrorKind::NoPrefixParseFn(TokenKind::Eof));
    }

    #[test]
    fn test_render_round_trip() {
        // Rendering is fully parenthesized, so re-parsing it is stable.
        let sources = [
            "let x = 1 + 2 * 3 - -4;",
            "if (a < b) { a } else { b }",
            "let f = fn(x) { return x * x; };",
            "map(xs, fn(x) { x % 2 == 0 })[0]",
            "[1, 2.5, \"three\", true]",
        ];
        for source in sources {
            let once = render(source);
            let twice = render(&once);
            assert_eq!(once, twice, "source: {}", source);
        }
    }

    #[test]
    fn test_tokens_and_parser_agree() {
        let kinds: Vec<TokenKind> = tokenize("x <= 10").map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            [TokenKind::Ident, TokenKind::LtEquals, TokenKind::Int, TokenKind::Eof]
        );
        assert_eq!(render("x <= 10"), "(x <= 10)");
    }
}
