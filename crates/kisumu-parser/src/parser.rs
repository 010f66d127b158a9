//! Pratt parser for Kisumu.
//!
//! The parser keeps a two-token window (`cur_token`, `peek_token`) over the
//! lexer. Each statement and expression handler starts with `cur_token` on
//! the first token of its construct and returns with `cur_token` on the
//! last one. Problems are recorded in `errors` and parsing carries on;
//! expressions that cannot be built are replaced by
//! [`Expression::Invalid`].

use crate::ast::*;
use crate::precedence::Precedence;
use kisumu_lexer::{Lexer, Position, Token, TokenKind};
use log::{debug, trace};
use thiserror::Error;

/// What went wrong, without the location.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    #[error("expected next token to be {expected}, got {got} instead")]
    UnexpectedToken { expected: TokenKind, got: TokenKind },

    #[error("no prefix parse function for {0} found")]
    NoPrefixParseFn(TokenKind),

    #[error("unterminated block")]
    UnterminatedBlock,

    #[error("could not parse {0:?} as integer")]
    InvalidInteger(String),

    #[error("could not parse {0:?} as float")]
    InvalidFloat(String),

    #[error("maximum expression depth exceeded")]
    MaxDepthExceeded,
}

/// A diagnostic recorded while parsing.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind} at line {}, column {}", .position.line_number(), .position.column_number())]
pub struct ParserError {
    pub kind: ParseErrorKind,
    pub position: Position,
}

impl ParserError {
    fn new(kind: ParseErrorKind, position: Position) -> Self {
        Self { kind, position }
    }

    /// The diagnostic text without the location suffix.
    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

type PrefixParseFn = fn(&mut Parser) -> Expression;
type InfixParseFn = fn(&mut Parser, Expression) -> Expression;

/// Pratt parser for Kisumu source code.
pub struct Parser {
    lexer: Lexer,
    cur_token: Token,
    peek_token: Token,
    errors: Vec<ParserError>,
    max_depth: usize,
    depth: usize,
}

impl Parser {
    /// Create a new parser reading from the given lexer.
    pub fn new(mut lexer: Lexer) -> Self {
        let cur_token = lexer.next_token();
        let peek_token = lexer.next_token();
        Self {
            lexer,
            cur_token,
            peek_token,
            errors: Vec::new(),
            max_depth: 256,
            depth: 0,
        }
    }

    fn next_token(&mut self) {
        let next = self.lexer.next_token();
        self.cur_token = std::mem::replace(&mut self.peek_token, next);
    }

    fn cur_token_is(&self, kind: TokenKind) -> bool {
        self.cur_token.kind == kind
    }

    fn peek_token_is(&self, kind: TokenKind) -> bool {
        self.peek_token.kind == kind
    }

    /// Advance only if the next token has the given kind.
    fn expect_peek(&mut self, kind: TokenKind) -> bool {
        if self.peek_token_is(kind) {
            self.next_token();
            true
        } else {
            self.peek_error(kind);
            false
        }
    }

    fn peek_error(&mut self, kind: TokenKind) {
        let got = self.peek_token.kind;
        self.error(
            ParseErrorKind::UnexpectedToken {
                expected: kind,
                got,
            },
            self.peek_token.start,
        );
    }

    fn error(&mut self, kind: ParseErrorKind, position: Position) {
        let err = ParserError::new(kind, position);
        debug!("parse error: {}", err);
        self.errors.push(err);
    }

    fn invalid(&self) -> Expression {
        Expression::Invalid(InvalidExpression {
            token: self.cur_token.clone(),
        })
    }

    fn cur_precedence(&self) -> Precedence {
        Precedence::from_token(self.cur_token.kind)
    }

    fn peek_precedence(&self) -> Precedence {
        Precedence::from_token(self.peek_token.kind)
    }

    fn skip_optional_semicolon(&mut self) {
        if self.peek_token_is(TokenKind::Semicolon) {
            self.next_token();
        }
    }

    /// Parse the entire program. Always returns; check [`Parser::errors`]
    /// before handing the result to anything that executes it.
    pub fn parse_program(&mut self) -> Program {
        let mut program = Program::default();

        while !self.cur_token_is(TokenKind::Eof) {
            if let Some(stmt) = self.parse_statement() {
                program.statements.push(stmt);
            }
            self.next_token();
        }

        debug!(
            "parsed {} statements with {} errors",
            program.statements.len(),
            self.errors.len()
        );
        program
    }

    /// All diagnostics, in the order they were encountered.
    pub fn errors(&self) -> &[ParserError] {
        &self.errors
    }

    /// Diagnostic texts without locations, in encounter order.
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.message()).collect()
    }

    pub fn into_errors(self) -> Vec<ParserError> {
        self.errors
    }

    /// The lexer feeding this parser, e.g. for [`Lexer::source_line`].
    pub fn lexer(&self) -> &Lexer {
        &self.lexer
    }

    // =========================================================================
    // Statement Parsing
    // =========================================================================

    fn parse_statement(&mut self) -> Option<Statement> {
        match self.cur_token.kind {
            TokenKind::Let => self.parse_let_statement(),
            TokenKind::Return => Some(self.parse_return_statement()),
            _ => Some(self.parse_expression_statement()),
        }
    }

    fn parse_let_statement(&mut self) -> Option<Statement> {
        trace!("parse_let_statement at {}", self.cur_token.start);
        let token = self.cur_token.clone();

        if !self.expect_peek(TokenKind::Ident) {
            return None;
        }
        let name = Identifier {
            token: self.cur_token.clone(),
            name: self.cur_token.literal.clone(),
        };

        if !self.expect_peek(TokenKind::Assign) {
            return None;
        }
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest);
        self.skip_optional_semicolon();

        Some(Statement::Let(LetStatement { token, name, value }))
    }

    fn parse_return_statement(&mut self) -> Statement {
        trace!("parse_return_statement at {}", self.cur_token.start);
        let token = self.cur_token.clone();
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest);
        self.skip_optional_semicolon();

        Statement::Return(ReturnStatement { token, value })
    }

    fn parse_expression_statement(&mut self) -> Statement {
        trace!("parse_expression_statement at {}", self.cur_token.start);
        let token = self.cur_token.clone();
        let value = self.parse_expression(Precedence::Lowest);
        self.skip_optional_semicolon();

        Statement::Expression(ExpressionStatement { token, value })
    }

    /// Parse `{ ... }` with `cur_token` on the opening brace.
    fn parse_block_statement(&mut self) -> Option<BlockStatement> {
        if !self.enter() {
            return None;
        }
        let block = self.parse_block_body();
        self.leave();
        block
    }

    fn parse_block_body(&mut self) -> Option<BlockStatement> {
        let token = self.cur_token.clone();
        self.next_token();

        let mut statements = Vec::new();
        while !self.cur_token_is(TokenKind::RBrace) && !self.cur_token_is(TokenKind::Eof) {
            if let Some(stmt) = self.parse_statement() {
                statements.push(stmt);
            }
            self.next_token();
        }

        if self.cur_token_is(TokenKind::Eof) {
            self.error(ParseErrorKind::UnterminatedBlock, token.start);
            return None;
        }

        Some(BlockStatement { token, statements })
    }

    // =========================================================================
    // Expression Parsing
    // =========================================================================

    fn parse_expression(&mut self, precedence: Precedence) -> Expression {
        trace!(
            "parse_expression({:?}) at {} {}",
            precedence,
            self.cur_token.start,
            self.cur_token
        );
        if !self.enter() {
            return self.invalid();
        }
        let expr = self.parse_expression_at(precedence);
        self.leave();
        expr
    }

    fn parse_expression_at(&mut self, precedence: Precedence) -> Expression {
        let Some(prefix_fn) = Self::prefix_fn(self.cur_token.kind) else {
            self.error(
                ParseErrorKind::NoPrefixParseFn(self.cur_token.kind),
                self.cur_token.start,
            );
            return self.invalid();
        };

        let mut left = prefix_fn(self);

        while !self.peek_token_is(TokenKind::Semicolon) && precedence < self.peek_precedence() {
            let Some(infix_fn) = Self::infix_fn(self.peek_token.kind) else {
                break;
            };
            self.next_token();
            left = infix_fn(self, left);
        }

        left
    }

    /// Charge one nesting level. Expressions, blocks and delimited lists
    /// each count, so every recursive cycle through the grammar is bounded.
    fn enter(&mut self) -> bool {
        if self.depth >= self.max_depth {
            self.error(ParseErrorKind::MaxDepthExceeded, self.cur_token.start);
            return false;
        }
        self.depth += 1;
        true
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn prefix_fn(kind: TokenKind) -> Option<PrefixParseFn> {
        match kind {
            TokenKind::Ident => Some(Parser::parse_identifier),
            TokenKind::Int => Some(Parser::parse_integer_literal),
            TokenKind::Float => Some(Parser::parse_float_literal),
            TokenKind::String => Some(Parser::parse_string_literal),
            TokenKind::True | TokenKind::False => Some(Parser::parse_boolean),
            TokenKind::Bang | TokenKind::Minus => Some(Parser::parse_prefix_expression),
            TokenKind::LParen => Some(Parser::parse_grouped_expression),
            TokenKind::If => Some(Parser::parse_if_expression),
            TokenKind::Function => Some(Parser::parse_function_literal),
            TokenKind::LBracket => Some(Parser::parse_array_literal),
            _ => None,
        }
    }

    fn infix_fn(kind: TokenKind) -> Option<InfixParseFn> {
        match kind {
            TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Asterisk
            | TokenKind::Slash
            | TokenKind::Percent
            | TokenKind::Eq
            | TokenKind::NotEq
            | TokenKind::Lt
            | TokenKind::Gt
            | TokenKind::LtEquals
            | TokenKind::GtEquals => Some(Parser::parse_infix_expression),
            TokenKind::LParen => Some(Parser::parse_call_expression),
            TokenKind::LBracket => Some(Parser::parse_index_expression),
            _ => None,
        }
    }

    // =========================================================================
    // Literal Parsing
    // =========================================================================

    fn parse_identifier(&mut self) -> Expression {
        Expression::Identifier(Identifier {
            token: self.cur_token.clone(),
            name: self.cur_token.literal.clone(),
        })
    }

    fn parse_integer_literal(&mut self) -> Expression {
        trace!("parse_integer_literal {}", self.cur_token.literal);
        match self.cur_token.literal.parse::<i64>() {
            Ok(value) => Expression::Integer(IntegerLiteral {
                token: self.cur_token.clone(),
                value,
            }),
            Err(_) => {
                let literal = self.cur_token.literal.clone();
                self.error(ParseErrorKind::InvalidInteger(literal), self.cur_token.start);
                self.invalid()
            }
        }
    }

    fn parse_float_literal(&mut self) -> Expression {
        match self.cur_token.literal.parse::<f64>() {
            Ok(value) => Expression::Float(FloatLiteral {
                token: self.cur_token.clone(),
                value,
            }),
            Err(_) => {
                let literal = self.cur_token.literal.clone();
                self.error(ParseErrorKind::InvalidFloat(literal), self.cur_token.start);
                self.invalid()
            }
        }
    }

    fn parse_string_literal(&mut self) -> Expression {
        Expression::String(StringLiteral {
            token: self.cur_token.clone(),
            value: self.cur_token.literal.clone(),
        })
    }

    fn parse_boolean(&mut self) -> Expression {
        Expression::Boolean(BooleanLiteral {
            token: self.cur_token.clone(),
            value: self.cur_token_is(TokenKind::True),
        })
    }

    fn parse_array_literal(&mut self) -> Expression {
        let token = self.cur_token.clone();
        match self.parse_expression_list(TokenKind::RBracket) {
            Some(elements) => Expression::Array(ArrayLiteral { token, elements }),
            None => self.invalid(),
        }
    }

    // =========================================================================
    // Operator Parsing
    // =========================================================================

    fn parse_prefix_expression(&mut self) -> Expression {
        trace!("parse_prefix_expression {}", self.cur_token.literal);
        let token = self.cur_token.clone();
        let operator = token.literal.clone();
        self.next_token();

        let operand = self.parse_expression(Precedence::Prefix);

        Expression::Prefix(Box::new(PrefixExpression {
            token,
            operator,
            operand,
        }))
    }

    fn parse_infix_expression(&mut self, left: Expression) -> Expression {
        trace!("parse_infix_expression {}", self.cur_token.literal);
        let token = self.cur_token.clone();
        let operator = token.literal.clone();
        let precedence = self.cur_precedence();
        self.next_token();

        let right = self.parse_expression(precedence);

        Expression::Infix(Box::new(InfixExpression {
            token,
            operator,
            left,
            right,
        }))
    }

    fn parse_grouped_expression(&mut self) -> Expression {
        self.next_token();

        let expr = self.parse_expression(Precedence::Lowest);

        if !self.expect_peek(TokenKind::RParen) {
            return self.invalid();
        }
        expr
    }

    // =========================================================================
    // Control Flow and Functions
    // =========================================================================

    fn parse_if_expression(&mut self) -> Expression {
        trace!("parse_if_expression at {}", self.cur_token.start);
        let token = self.cur_token.clone();

        if !self.expect_peek(TokenKind::LParen) {
            return self.invalid();
        }
        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest);

        if !self.expect_peek(TokenKind::RParen) {
            return self.invalid();
        }
        if !self.expect_peek(TokenKind::LBrace) {
            return self.invalid();
        }
        let Some(consequence) = self.parse_block_statement() else {
            return self.invalid();
        };

        let mut alternative = None;
        if self.peek_token_is(TokenKind::Else) {
            self.next_token();
            if !self.expect_peek(TokenKind::LBrace) {
                return self.invalid();
            }
            let Some(block) = self.parse_block_statement() else {
                return self.invalid();
            };
            alternative = Some(block);
        }

        Expression::If(Box::new(IfExpression {
            token,
            condition,
            consequence,
            alternative,
        }))
    }

    fn parse_function_literal(&mut self) -> Expression {
        trace!("parse_function_literal at {}", self.cur_token.start);
        let token = self.cur_token.clone();

        if !self.expect_peek(TokenKind::LParen) {
            return self.invalid();
        }
        let Some(parameters) = self.parse_list(TokenKind::RParen, Parser::parse_parameter) else {
            return self.invalid();
        };

        if !self.expect_peek(TokenKind::LBrace) {
            return self.invalid();
        }
        let Some(body) = self.parse_block_statement() else {
            return self.invalid();
        };

        Expression::Function(Box::new(FunctionLiteral {
            token,
            parameters,
            body,
        }))
    }

    fn parse_parameter(&mut self) -> Option<Identifier> {
        if !self.cur_token_is(TokenKind::Ident) {
            let got = self.cur_token.kind;
            self.error(
                ParseErrorKind::UnexpectedToken {
                    expected: TokenKind::Ident,
                    got,
                },
                self.cur_token.start,
            );
            return None;
        }
        Some(Identifier {
            token: self.cur_token.clone(),
            name: self.cur_token.literal.clone(),
        })
    }

    // =========================================================================
    // Access Expressions
    // =========================================================================

    fn parse_call_expression(&mut self, callee: Expression) -> Expression {
        trace!("parse_call_expression at {}", self.cur_token.start);
        let token = self.cur_token.clone();
        match self.parse_expression_list(TokenKind::RParen) {
            Some(arguments) => Expression::Call(Box::new(CallExpression {
                token,
                callee,
                arguments,
            })),
            None => self.invalid(),
        }
    }

    fn parse_index_expression(&mut self, collection: Expression) -> Expression {
        let token = self.cur_token.clone();
        self.next_token();
        let index = self.parse_expression(Precedence::Lowest);

        if !self.expect_peek(TokenKind::RBracket) {
            return self.invalid();
        }

        Expression::Index(Box::new(IndexExpression {
            token,
            collection,
            index,
        }))
    }

    // =========================================================================
    // List Parsing
    // =========================================================================

    fn parse_expression_list(&mut self, end: TokenKind) -> Option<Vec<Expression>> {
        self.parse_list(end, |p| Some(p.parse_expression(Precedence::Lowest)))
    }

    /// Parse `elem (, elem)* end` with `cur_token` on the opening delimiter.
    /// Returns `None` once a diagnostic has been recorded.
    fn parse_list<T, F>(&mut self, end: TokenKind, parse_element: F) -> Option<Vec<T>>
    where
        F: FnMut(&mut Parser) -> Option<T>,
    {
        if !self.enter() {
            return None;
        }
        let list = self.parse_list_items(end, parse_element);
        self.leave();
        list
    }

    fn parse_list_items<T, F>(&mut self, end: TokenKind, mut parse_element: F) -> Option<Vec<T>>
    where
        F: FnMut(&mut Parser) -> Option<T>,
    {
        let mut list = Vec::new();

        if self.peek_token_is(end) {
            self.next_token();
            return Some(list);
        }

        self.next_token();
        list.push(parse_element(self)?);

        while self.peek_token_is(TokenKind::Comma) {
            self.next_token();
            self.next_token();
            list.push(parse_element(self)?);
        }

        if !self.expect_peek(end) {
            return None;
        }
        Some(list)
    }
}

/// Parse source code into an AST, returning every diagnostic on failure.
pub fn parse(source: &str) -> Result<Program, Vec<ParserError>> {
    let lexer = Lexer::new(source);
    let mut parser = Parser::new(lexer);
    let program = parser.parse_program();
    if parser.errors().is_empty() {
        Ok(program)
    } else {
        Err(parser.into_errors())
    }
}
