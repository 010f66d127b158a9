//! Lexer for the Kisumu scripting language.

use crate::token::{lookup_identifier, Position, Token, TokenKind};

/// Lexer tokenizes Kisumu source code on demand.
///
/// The lexer never fails: characters it cannot classify, and strings that
/// are still open at end of input, come back as [`TokenKind::Illegal`]
/// tokens. Once the end of input is reached every further call returns an
/// [`TokenKind::Eof`] token.
#[derive(Debug, Clone)]
pub struct Lexer {
    chars: Vec<char>,
    position: usize,
    next_position: usize,
    ch: char,
    line: usize,
    column: isize,
    line_start: usize,
    token_start: Position,
    finished: bool,
}

impl Lexer {
    /// Create a new lexer for the given input.
    pub fn new(input: &str) -> Self {
        let chars: Vec<char> = input.chars().collect();
        let mut lexer = Self {
            chars,
            position: 0,
            next_position: 0,
            ch: '\0',
            line: 0,
            column: -1,
            line_start: 0,
            token_start: Position::default(),
            finished: false,
        };
        lexer.read_char();
        lexer
    }

    /// Get the current position.
    fn current_position(&self) -> Position {
        Position::new(
            self.position,
            self.line_start,
            self.line,
            self.column.max(0) as usize,
        )
    }

    fn at_eof(&self) -> bool {
        self.position >= self.chars.len()
    }

    /// Read the next character. Offsets stop moving at end of input.
    fn read_char(&mut self) {
        if self.next_position > self.chars.len() {
            return;
        }
        if self.ch == '\n' && !self.at_eof() {
            self.handle_newline();
        }
        self.ch = self.chars.get(self.next_position).copied().unwrap_or('\0');
        self.position = self.next_position;
        self.next_position += 1;
        self.column += 1;
    }

    /// Peek at the next character without consuming it.
    fn peek_char(&self) -> char {
        self.chars.get(self.next_position).copied().unwrap_or('\0')
    }

    fn skip_whitespace(&mut self) {
        loop {
            match self.ch {
                ' ' | '\t' | '\n' | '\r' if !self.at_eof() => self.read_char(),
                '/' if self.peek_char() == '/' => self.skip_to_end_of_line(),
                _ => break,
            }
        }
    }

    fn skip_to_end_of_line(&mut self) {
        while self.ch != '\n' && !self.at_eof() {
            self.read_char();
        }
    }

    /// Update line tracking; called when stepping past a newline.
    fn handle_newline(&mut self) {
        self.line += 1;
        self.column = -1;
        self.line_start = self.next_position;
    }

    /// Start tracking a new token.
    fn start_token(&mut self) {
        self.token_start = self.current_position();
    }

    /// Create a token ending at the current position.
    fn make_token(&self, kind: TokenKind, literal: impl Into<String>) -> Token {
        Token::new(kind, literal, self.token_start, self.current_position())
    }

    fn slice(&self, start: usize, end: usize) -> String {
        self.chars[start..end].iter().collect()
    }

    /// Get the next token.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();
        self.start_token();

        if self.at_eof() {
            self.finished = true;
            return self.make_token(TokenKind::Eof, "");
        }

        if self.ch == '"' || self.ch == '\'' {
            return self.read_string(self.ch);
        }

        if self.ch.is_ascii_digit() {
            return self.read_number();
        }

        if is_letter(self.ch) {
            return self.read_identifier();
        }

        if let Some(tok) = self.read_operator() {
            return tok;
        }

        // Unknown character
        let ch = self.ch;
        self.read_char();
        self.make_token(TokenKind::Illegal, ch.to_string())
    }

    /// Read an identifier or keyword.
    fn read_identifier(&mut self) -> Token {
        let start = self.position;
        while is_letter(self.ch) || self.ch.is_ascii_digit() {
            self.read_char();
        }
        let literal = self.slice(start, self.position);
        let kind = lookup_identifier(&literal);
        self.make_token(kind, literal)
    }

    /// Read an integer or a `digits.digits` float.
    fn read_number(&mut self) -> Token {
        let start = self.position;
        while self.ch.is_ascii_digit() {
            self.read_char();
        }

        let mut kind = TokenKind::Int;
        if self.ch == '.' && self.peek_char().is_ascii_digit() {
            kind = TokenKind::Float;
            self.read_char(); // consume .
            while self.ch.is_ascii_digit() {
                self.read_char();
            }
        }

        let literal = self.slice(start, self.position);
        self.make_token(kind, literal)
    }

    /// Read a quoted string. Backslashes keep the next character in the
    /// literal verbatim; no escape translation happens here.
    fn read_string(&mut self, quote: char) -> Token {
        let open = self.position;
        self.read_char(); // consume opening quote
        let start = self.position;

        while self.ch != quote && !self.at_eof() {
            if self.ch == '\\' {
                self.read_char();
                if self.at_eof() {
                    break;
                }
            }
            self.read_char();
        }

        if self.at_eof() {
            let literal = self.slice(open, self.chars.len());
            return self.make_token(TokenKind::Illegal, literal);
        }

        let literal = self.slice(start, self.position);
        self.read_char(); // consume closing quote
        self.make_token(TokenKind::String, literal)
    }

    /// Read an operator or punctuation token, longest spelling first.
    fn read_operator(&mut self) -> Option<Token> {
        let ch = self.ch;
        let next = self.peek_char();

        if ch == '.' && next == '.' {
            self.read_char();
            self.read_char();
            if self.ch == '.' {
                self.read_char();
                return Some(self.make_token(TokenKind::DotDotDot, "..."));
            }
            return Some(self.make_token(TokenKind::DotDot, ".."));
        }

        let two_char = match (ch, next) {
            ('=', '=') => Some(TokenKind::Eq),
            ('!', '=') => Some(TokenKind::NotEq),
            ('<', '=') => Some(TokenKind::LtEquals),
            ('>', '=') => Some(TokenKind::GtEquals),
            ('&', '&') => Some(TokenKind::AndAnd),
            ('|', '|') => Some(TokenKind::OrOr),
            ('+', '+') => Some(TokenKind::PlusPlus),
            ('+', '=') => Some(TokenKind::PlusEquals),
            ('-', '-') => Some(TokenKind::MinusMinus),
            ('-', '=') => Some(TokenKind::MinusEquals),
            ('*', '=') => Some(TokenKind::AsteriskEquals),
            ('/', '=') => Some(TokenKind::SlashEquals),
            _ => None,
        };

        if let Some(kind) = two_char {
            self.read_char();
            self.read_char();
            return Some(self.make_token(kind, format!("{}{}", ch, next)));
        }

        let single_char = match ch {
            '+' => Some(TokenKind::Plus),
            '-' => Some(TokenKind::Minus),
            '*' => Some(TokenKind::Asterisk),
            '/' => Some(TokenKind::Slash),
            '%' => Some(TokenKind::Percent),
            '=' => Some(TokenKind::Assign),
            '!' => Some(TokenKind::Bang),
            '<' => Some(TokenKind::Lt),
            '>' => Some(TokenKind::Gt),
            '&' => Some(TokenKind::Ampersand),
            '|' => Some(TokenKind::Pipe),
            '(' => Some(TokenKind::LParen),
            ')' => Some(TokenKind::RParen),
            '[' => Some(TokenKind::LBracket),
            ']' => Some(TokenKind::RBracket),
            '{' => Some(TokenKind::LBrace),
            '}' => Some(TokenKind::RBrace),
            ',' => Some(TokenKind::Comma),
            ';' => Some(TokenKind::Semicolon),
            ':' => Some(TokenKind::Colon),
            '?' => Some(TokenKind::Question),
            '.' => Some(TokenKind::Dot),
            _ => None,
        };

        let kind = single_char?;
        self.read_char();
        Some(self.make_token(kind, ch.to_string()))
    }

    /// Get the source line containing the given position.
    pub fn source_line(&self, pos: &Position) -> String {
        self.chars
            .iter()
            .skip(pos.line_start)
            .take_while(|&&c| c != '\n')
            .filter(|&&c| c != '\r')
            .collect()
    }
}

impl Iterator for Lexer {
    type Item = Token;

    /// Yields every token up to and including the first `Eof`.
    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }
        Some(self.next_token())
    }
}

/// Check if a character may start an identifier.
fn is_letter(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

/// Create a lexer over `input`. Tokens are produced as they are pulled.
pub fn tokenize(input: &str) -> Lexer {
    Lexer::new(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input).map(|t| t.kind).collect()
    }

    fn assert_tokens(input: &str, expected: &[(TokenKind, &str)]) {
        let mut lexer = tokenize(input);
        for (i, (kind, literal)) in expected.iter().enumerate() {
            let tok = lexer.next_token();
            assert_eq!(tok.kind, *kind, "token {} kind, input {:?}", i, input);
            assert_eq!(tok.literal, *literal, "token {} literal, input {:?}", i, input);
        }
    }

    #[test]
    fn test_empty_input() {
        let tokens: Vec<Token> = tokenize("").collect();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Eof);
    }

    #[test]
    fn test_eof_is_idempotent() {
        let mut lexer = tokenize("x");
        assert_eq!(lexer.next_token().kind, TokenKind::Ident);
        for _ in 0..5 {
            let tok = lexer.next_token();
            assert_eq!(tok.kind, TokenKind::Eof);
            assert_eq!(tok.start.char, 1);
        }
    }

    #[test]
    fn test_iterator_stops_after_eof() {
        let mut lexer = tokenize("a b");
        assert_eq!(lexer.next().map(|t| t.kind), Some(TokenKind::Ident));
        assert_eq!(lexer.next().map(|t| t.kind), Some(TokenKind::Ident));
        assert_eq!(lexer.next().map(|t| t.kind), Some(TokenKind::Eof));
        assert_eq!(lexer.next(), None);
        assert_eq!(lexer.next(), None);
    }

    #[test]
    fn test_operators_mixed() {
        assert_tokens(
            "=+=-*/<>=!&&||...;:, \t\n\r",
            &[
                (TokenKind::Assign, "="),
                (TokenKind::PlusEquals, "+="),
                (TokenKind::Minus, "-"),
                (TokenKind::Asterisk, "*"),
                (TokenKind::Slash, "/"),
                (TokenKind::Lt, "<"),
                (TokenKind::GtEquals, ">="),
                (TokenKind::Bang, "!"),
                (TokenKind::AndAnd, "&&"),
                (TokenKind::OrOr, "||"),
                (TokenKind::DotDotDot, "..."),
                (TokenKind::Semicolon, ";"),
                (TokenKind::Colon, ":"),
                (TokenKind::Comma, ","),
                (TokenKind::Eof, ""),
            ],
        );
    }

    #[test]
    fn test_maximal_munch() {
        let tests = [
            ("=", TokenKind::Assign),
            ("==", TokenKind::Eq),
            ("+", TokenKind::Plus),
            ("++", TokenKind::PlusPlus),
            ("+=", TokenKind::PlusEquals),
            ("-", TokenKind::Minus),
            ("--", TokenKind::MinusMinus),
            ("-=", TokenKind::MinusEquals),
            ("*", TokenKind::Asterisk),
            ("*=", TokenKind::AsteriskEquals),
            ("/", TokenKind::Slash),
            ("/=", TokenKind::SlashEquals),
            ("<", TokenKind::Lt),
            ("<=", TokenKind::LtEquals),
            (">", TokenKind::Gt),
            (">=", TokenKind::GtEquals),
            ("!", TokenKind::Bang),
            ("!=", TokenKind::NotEq),
            ("&", TokenKind::Ampersand),
            ("&&", TokenKind::AndAnd),
            ("|", TokenKind::Pipe),
            ("||", TokenKind::OrOr),
            (".", TokenKind::Dot),
            ("..", TokenKind::DotDot),
            ("...", TokenKind::DotDotDot),
        ];
        for (input, kind) in tests {
            let tokens: Vec<Token> = tokenize(input).collect();
            assert_eq!(tokens.len(), 2, "input {:?}", input);
            assert_eq!(tokens[0].kind, kind, "input {:?}", input);
            assert_eq!(tokens[0].literal, input);
        }
    }

    #[test]
    fn test_longer_dot_runs() {
        assert_eq!(
            kinds("...."),
            vec![TokenKind::DotDotDot, TokenKind::Dot, TokenKind::Eof]
        );
        assert_eq!(
            kinds("+++"),
            vec![TokenKind::PlusPlus, TokenKind::Plus, TokenKind::Eof]
        );
        assert_eq!(
            kinds("==="),
            vec![TokenKind::Eq, TokenKind::Assign, TokenKind::Eof]
        );
    }

    #[test]
    fn test_punctuation() {
        assert_eq!(
            kinds("( ) [ ] { } , ; : ? %"),
            vec![
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::LBracket,
                TokenKind::RBracket,
                TokenKind::LBrace,
                TokenKind::RBrace,
                TokenKind::Comma,
                TokenKind::Semicolon,
                TokenKind::Colon,
                TokenKind::Question,
                TokenKind::Percent,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_identifiers() {
        assert_tokens(
            "foo bar _baz x1 snake_case2 a_1_b",
            &[
                (TokenKind::Ident, "foo"),
                (TokenKind::Ident, "bar"),
                (TokenKind::Ident, "_baz"),
                (TokenKind::Ident, "x1"),
                (TokenKind::Ident, "snake_case2"),
                (TokenKind::Ident, "a_1_b"),
            ],
        );
    }

    #[test]
    fn test_digit_then_letters_splits() {
        assert_tokens(
            "1abc",
            &[(TokenKind::Int, "1"), (TokenKind::Ident, "abc")],
        );
    }

    #[test]
    fn test_keywords() {
        assert_eq!(
            kinds("let const fn function if else return true false and or null"),
            vec![
                TokenKind::Let,
                TokenKind::Const,
                TokenKind::Function,
                TokenKind::Function,
                TokenKind::If,
                TokenKind::Else,
                TokenKind::Return,
                TokenKind::True,
                TokenKind::False,
                TokenKind::And,
                TokenKind::Or,
                TokenKind::Null,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_tokens(
            "42 0 3.14 10.0",
            &[
                (TokenKind::Int, "42"),
                (TokenKind::Int, "0"),
                (TokenKind::Float, "3.14"),
                (TokenKind::Float, "10.0"),
                (TokenKind::Eof, ""),
            ],
        );
    }

    #[test]
    fn test_number_followed_by_dots() {
        assert_tokens(
            "1..5 2.x",
            &[
                (TokenKind::Int, "1"),
                (TokenKind::DotDot, ".."),
                (TokenKind::Int, "5"),
                (TokenKind::Int, "2"),
                (TokenKind::Dot, "."),
                (TokenKind::Ident, "x"),
            ],
        );
    }

    #[test]
    fn test_no_exponent_floats() {
        assert_tokens(
            "2e10",
            &[(TokenKind::Int, "2"), (TokenKind::Ident, "e10")],
        );
    }

    #[test]
    fn test_strings() {
        assert_tokens(
            r#""hello" 'world' "" "foo bar""#,
            &[
                (TokenKind::String, "hello"),
                (TokenKind::String, "world"),
                (TokenKind::String, ""),
                (TokenKind::String, "foo bar"),
                (TokenKind::Eof, ""),
            ],
        );
    }

    #[test]
    fn test_escaped_quote_is_kept_raw() {
        assert_tokens(
            r#""say \"hi\"" x"#,
            &[
                (TokenKind::String, r#"say \"hi\""#),
                (TokenKind::Ident, "x"),
            ],
        );
        assert_tokens(r#""tab\t""#, &[(TokenKind::String, r"tab\t")]);
    }

    #[test]
    fn test_unterminated_string() {
        assert_tokens(
            r#"let s = "hello"#,
            &[
                (TokenKind::Let, "let"),
                (TokenKind::Ident, "s"),
                (TokenKind::Assign, "="),
                (TokenKind::Illegal, "\"hello"),
                (TokenKind::Eof, ""),
            ],
        );
        assert_tokens(r#""abc\"#, &[(TokenKind::Illegal, r#""abc\"#), (TokenKind::Eof, "")]);
    }

    #[test]
    fn test_illegal_characters() {
        assert_tokens(
            "@ # $ x",
            &[
                (TokenKind::Illegal, "@"),
                (TokenKind::Illegal, "#"),
                (TokenKind::Illegal, "$"),
                (TokenKind::Ident, "x"),
            ],
        );
    }

    #[test]
    fn test_nul_character_is_not_eof() {
        assert_eq!(
            kinds("a\0b"),
            vec![
                TokenKind::Ident,
                TokenKind::Illegal,
                TokenKind::Ident,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_whitespace_is_skipped() {
        assert_eq!(
            kinds(" \t\r\n x \n\n y \r\n"),
            vec![TokenKind::Ident, TokenKind::Ident, TokenKind::Eof]
        );
    }

    #[test]
    fn test_line_comments() {
        assert_tokens(
            "foo // comment\nbar // trailing",
            &[
                (TokenKind::Ident, "foo"),
                (TokenKind::Ident, "bar"),
                (TokenKind::Eof, ""),
            ],
        );
    }

    #[test]
    fn test_position_tracking() {
        let tokens: Vec<Token> = tokenize("foo\n  bar = 1").collect();
        assert_eq!(tokens[0].start.line, 0);
        assert_eq!(tokens[0].start.column, 0);
        assert_eq!(tokens[0].end.column, 3);
        assert_eq!(tokens[1].start.line, 1);
        assert_eq!(tokens[1].start.column, 2);
        assert_eq!(tokens[2].start.column, 6);
        assert_eq!(tokens[3].start.line_number(), 2);
        assert_eq!(tokens[3].start.column_number(), 9);
    }

    #[test]
    fn test_position_after_multiline_string() {
        let tokens: Vec<Token> = tokenize("\"a\nb\" c").collect();
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].literal, "a\nb");
        assert_eq!(tokens[1].start.line, 1);
        assert_eq!(tokens[1].start.column, 3);
    }

    #[test]
    fn test_source_line() {
        let mut lexer = tokenize("let a = 1;\nlet b = @;\n");
        let illegal = lexer
            .by_ref()
            .find(|t| t.kind == TokenKind::Illegal)
            .expect("illegal token");
        assert_eq!(lexer.source_line(&illegal.start), "let b = @;");
    }

    #[test]
    fn test_let_statement() {
        assert_eq!(
            kinds("let five = 5;"),
            vec![
                TokenKind::Let,
                TokenKind::Ident,
                TokenKind::Assign,
                TokenKind::Int,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_function_definition() {
        assert_eq!(
            kinds("let add = fn(x, y) { x + y; };"),
            vec![
                TokenKind::Let,
                TokenKind::Ident,
                TokenKind::Assign,
                TokenKind::Function,
                TokenKind::LParen,
                TokenKind::Ident,
                TokenKind::Comma,
                TokenKind::Ident,
                TokenKind::RParen,
                TokenKind::LBrace,
                TokenKind::Ident,
                TokenKind::Plus,
                TokenKind::Ident,
                TokenKind::Semicolon,
                TokenKind::RBrace,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_offsets_are_monotonic() {
        let tokens: Vec<Token> = tokenize("let x = [1, 2.5, \"s\"] // c\n(x)").collect();
        for pair in tokens.windows(2) {
            assert!(pair[0].start.char <= pair[1].start.char);
            assert!(pair[0].end.char <= pair[1].start.char);
        }
    }
}
