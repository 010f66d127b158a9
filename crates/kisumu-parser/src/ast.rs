//! AST node types for the Kisumu parser.
//!
//! Every node owns its children and keeps the token it was built from.
//! `Display` renders a node back to canonical source text, which is what
//! diagnostics and tests compare against.

use kisumu_lexer::{tokenize, Position, Token, TokenKind};
use std::fmt;

/// Base trait for all AST nodes.
pub trait Node: fmt::Display {
    /// The token this node was built from.
    fn token(&self) -> &Token;

    /// Literal text of the token that introduced this node.
    fn token_literal(&self) -> &str {
        &self.token().literal
    }

    fn pos(&self) -> Position {
        self.token().start
    }
}

/// Token for an operator spelled out in code, e.g. `"+"` or `"!"`.
fn operator_token(op: &str) -> Token {
    let tok = tokenize(op).next_token();
    if tok.literal == op {
        Token::synthetic(tok.kind, op)
    } else {
        Token::synthetic(TokenKind::Illegal, op)
    }
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// Expressions
// ============================================================================

/// Expression node enumeration.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Identifier(Identifier),
    Integer(IntegerLiteral),
    Float(FloatLiteral),
    String(StringLiteral),
    Boolean(BooleanLiteral),
    Prefix(Box<PrefixExpression>),
    Infix(Box<InfixExpression>),
    If(Box<IfExpression>),
    Function(Box<FunctionLiteral>),
    Call(Box<CallExpression>),
    Array(ArrayLiteral),
    Index(Box<IndexExpression>),
    /// Placeholder for an expression that failed to parse. A diagnostic is
    /// always recorded alongside it.
    Invalid(InvalidExpression),
}

impl Expression {
    /// True if this expression is the parse-failure sentinel.
    pub fn is_invalid(&self) -> bool {
        matches!(self, Expression::Invalid(_))
    }

    fn as_node(&self) -> &dyn Node {
        match self {
            Expression::Identifier(e) => e,
            Expression::Integer(e) => e,
            Expression::Float(e) => e,
            Expression::String(e) => e,
            Expression::Boolean(e) => e,
            Expression::Prefix(e) => &**e,
            Expression::Infix(e) => &**e,
            Expression::If(e) => &**e,
            Expression::Function(e) => &**e,
            Expression::Call(e) => &**e,
            Expression::Array(e) => e,
            Expression::Index(e) => &**e,
            Expression::Invalid(e) => e,
        }
    }
}

impl Node for Expression {
    fn token(&self) -> &Token {
        self.as_node().token()
    }
    fn pos(&self) -> Position {
        self.as_node().pos()
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Identifier(e) => write!(f, "{}", e),
            Expression::Integer(e) => write!(f, "{}", e),
            Expression::Float(e) => write!(f, "{}", e),
            Expression::String(e) => write!(f, "{}", e),
            Expression::Boolean(e) => write!(f, "{}", e),
            Expression::Prefix(e) => write!(f, "{}", e),
            Expression::Infix(e) => write!(f, "{}", e),
            Expression::If(e) => write!(f, "{}", e),
            Expression::Function(e) => write!(f, "{}", e),
            Expression::Call(e) => write!(f, "{}", e),
            Expression::Array(e) => write!(f, "{}", e),
            Expression::Index(e) => write!(f, "{}", e),
            Expression::Invalid(e) => write!(f, "{}", e),
        }
    }
}

impl From<Identifier> for Expression {
    fn from(e: Identifier) -> Self {
        Expression::Identifier(e)
    }
}

impl From<IntegerLiteral> for Expression {
    fn from(e: IntegerLiteral) -> Self {
        Expression::Integer(e)
    }
}

impl From<FloatLiteral> for Expression {
    fn from(e: FloatLiteral) -> Self {
        Expression::Float(e)
    }
}

impl From<StringLiteral> for Expression {
    fn from(e: StringLiteral) -> Self {
        Expression::String(e)
    }
}

impl From<BooleanLiteral> for Expression {
    fn from(e: BooleanLiteral) -> Self {
        Expression::Boolean(e)
    }
}

impl From<PrefixExpression> for Expression {
    fn from(e: PrefixExpression) -> Self {
        Expression::Prefix(Box::new(e))
    }
}

impl From<InfixExpression> for Expression {
    fn from(e: InfixExpression) -> Self {
        Expression::Infix(Box::new(e))
    }
}

impl From<IfExpression> for Expression {
    fn from(e: IfExpression) -> Self {
        Expression::If(Box::new(e))
    }
}

impl From<FunctionLiteral> for Expression {
    fn from(e: FunctionLiteral) -> Self {
        Expression::Function(Box::new(e))
    }
}

impl From<CallExpression> for Expression {
    fn from(e: CallExpression) -> Self {
        Expression::Call(Box::new(e))
    }
}

impl From<ArrayLiteral> for Expression {
    fn from(e: ArrayLiteral) -> Self {
        Expression::Array(e)
    }
}

impl From<IndexExpression> for Expression {
    fn from(e: IndexExpression) -> Self {
        Expression::Index(Box::new(e))
    }
}

// ============================================================================
// Statements
// ============================================================================

/// Statement node enumeration.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Let(LetStatement),
    Return(ReturnStatement),
    Expression(ExpressionStatement),
    Block(BlockStatement),
}

impl Statement {
    fn as_node(&self) -> &dyn Node {
        match self {
            Statement::Let(s) => s,
            Statement::Return(s) => s,
            Statement::Expression(s) => s,
            Statement::Block(s) => s,
        }
    }
}

impl Node for Statement {
    fn token(&self) -> &Token {
        self.as_node().token()
    }
    fn pos(&self) -> Position {
        self.as_node().pos()
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Let(s) => write!(f, "{}", s),
            Statement::Return(s) => write!(f, "{}", s),
            Statement::Expression(s) => write!(f, "{}", s),
            Statement::Block(s) => write!(f, "{}", s),
        }
    }
}

// ============================================================================
// Literal Expressions
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct IntegerLiteral {
    pub token: Token,
    pub value: i64,
}

impl IntegerLiteral {
    pub fn new(value: i64) -> Self {
        Self {
            token: Token::synthetic(TokenKind::Int, value.to_string()),
            value,
        }
    }
}

impl Node for IntegerLiteral {
    fn token(&self) -> &Token {
        &self.token
    }
}

impl fmt::Display for IntegerLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token.literal)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FloatLiteral {
    pub token: Token,
    pub value: f64,
}

impl FloatLiteral {
    pub fn new(value: f64) -> Self {
        Self {
            token: Token::synthetic(TokenKind::Float, format!("{:?}", value)),
            value,
        }
    }
}

impl Node for FloatLiteral {
    fn token(&self) -> &Token {
        &self.token
    }
}

impl fmt::Display for FloatLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token.literal)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StringLiteral {
    pub token: Token,
    pub value: String,
}

impl StringLiteral {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            token: Token::synthetic(TokenKind::String, value.clone()),
            value,
        }
    }
}

impl Node for StringLiteral {
    fn token(&self) -> &Token {
        &self.token
    }
}

impl fmt::Display for StringLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BooleanLiteral {
    pub token: Token,
    pub value: bool,
}

impl BooleanLiteral {
    pub fn new(value: bool) -> Self {
        let kind = if value {
            TokenKind::True
        } else {
            TokenKind::False
        };
        Self {
            token: Token::synthetic(kind, value.to_string()),
            value,
        }
    }
}

impl Node for BooleanLiteral {
    fn token(&self) -> &Token {
        &self.token
    }
}

impl fmt::Display for BooleanLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayLiteral {
    /// The opening `[`.
    pub token: Token,
    pub elements: Vec<Expression>,
}

impl ArrayLiteral {
    pub fn new(elements: Vec<Expression>) -> Self {
        Self {
            token: Token::synthetic(TokenKind::LBracket, "["),
            elements,
        }
    }
}

impl Node for ArrayLiteral {
    fn token(&self) -> &Token {
        &self.token
    }
}

impl fmt::Display for ArrayLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", join(&self.elements))
    }
}

// ============================================================================
// Identifier
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub token: Token,
    pub name: String,
}

impl Identifier {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            token: Token::synthetic(TokenKind::Ident, name.clone()),
            name,
        }
    }
}

impl Node for Identifier {
    fn token(&self) -> &Token {
        &self.token
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

// ============================================================================
// Operator Expressions
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct PrefixExpression {
    pub token: Token,
    pub operator: String,
    pub operand: Expression,
}

impl PrefixExpression {
    pub fn new(operator: &str, operand: impl Into<Expression>) -> Self {
        Self {
            token: operator_token(operator),
            operator: operator.to_string(),
            operand: operand.into(),
        }
    }
}

impl Node for PrefixExpression {
    fn token(&self) -> &Token {
        &self.token
    }
}

impl fmt::Display for PrefixExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}{})", self.operator, self.operand)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InfixExpression {
    /// The operator token.
    pub token: Token,
    pub operator: String,
    pub left: Expression,
    pub right: Expression,
}

impl InfixExpression {
    pub fn new(left: impl Into<Expression>, operator: &str, right: impl Into<Expression>) -> Self {
        Self {
            token: operator_token(operator),
            operator: operator.to_string(),
            left: left.into(),
            right: right.into(),
        }
    }
}

impl Node for InfixExpression {
    fn token(&self) -> &Token {
        &self.token
    }
    fn pos(&self) -> Position {
        self.left.pos()
    }
}

impl fmt::Display for InfixExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {} {})", self.left, self.operator, self.right)
    }
}

// ============================================================================
// Control Flow and Functions
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct IfExpression {
    pub token: Token,
    pub condition: Expression,
    pub consequence: BlockStatement,
    pub alternative: Option<BlockStatement>,
}

impl IfExpression {
    pub fn new(
        condition: impl Into<Expression>,
        consequence: BlockStatement,
        alternative: Option<BlockStatement>,
    ) -> Self {
        Self {
            token: Token::synthetic(TokenKind::If, "if"),
            condition: condition.into(),
            consequence,
            alternative,
        }
    }
}

impl Node for IfExpression {
    fn token(&self) -> &Token {
        &self.token
    }
}

impl fmt::Display for IfExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "if ({}) {}", self.condition, self.consequence)?;
        if let Some(alt) = &self.alternative {
            write!(f, " else {}", alt)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionLiteral {
    pub token: Token,
    pub parameters: Vec<Identifier>,
    pub body: BlockStatement,
}

impl FunctionLiteral {
    pub fn new(parameters: Vec<Identifier>, body: BlockStatement) -> Self {
        Self {
            token: Token::synthetic(TokenKind::Function, "fn"),
            parameters,
            body,
        }
    }
}

impl Node for FunctionLiteral {
    fn token(&self) -> &Token {
        &self.token
    }
}

impl fmt::Display for FunctionLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn({}) {}", join(&self.parameters), self.body)
    }
}

// ============================================================================
// Access Expressions
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpression {
    /// The opening `(`.
    pub token: Token,
    pub callee: Expression,
    pub arguments: Vec<Expression>,
}

impl CallExpression {
    pub fn new(callee: impl Into<Expression>, arguments: Vec<Expression>) -> Self {
        Self {
            token: Token::synthetic(TokenKind::LParen, "("),
            callee: callee.into(),
            arguments,
        }
    }
}

impl Node for CallExpression {
    fn token(&self) -> &Token {
        &self.token
    }
    fn pos(&self) -> Position {
        self.callee.pos()
    }
}

impl fmt::Display for CallExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.callee, join(&self.arguments))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexExpression {
    /// The opening `[`.
    pub token: Token,
    pub collection: Expression,
    pub index: Expression,
}

impl IndexExpression {
    pub fn new(collection: impl Into<Expression>, index: impl Into<Expression>) -> Self {
        Self {
            token: Token::synthetic(TokenKind::LBracket, "["),
            collection: collection.into(),
            index: index.into(),
        }
    }
}

impl Node for IndexExpression {
    fn token(&self) -> &Token {
        &self.token
    }
    fn pos(&self) -> Position {
        self.collection.pos()
    }
}

impl fmt::Display for IndexExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}[{}])", self.collection, self.index)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvalidExpression {
    /// Token the parser was looking at when it gave up.
    pub token: Token,
}

impl Node for InvalidExpression {
    fn token(&self) -> &Token {
        &self.token
    }
}

impl fmt::Display for InvalidExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<invalid>")
    }
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct LetStatement {
    pub token: Token,
    pub name: Identifier,
    pub value: Expression,
}

impl LetStatement {
    pub fn new(name: Identifier, value: impl Into<Expression>) -> Self {
        Self {
            token: Token::synthetic(TokenKind::Let, "let"),
            name,
            value: value.into(),
        }
    }
}

impl Node for LetStatement {
    fn token(&self) -> &Token {
        &self.token
    }
}

impl fmt::Display for LetStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "let {} = {};", self.name, self.value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStatement {
    pub token: Token,
    pub value: Expression,
}

impl ReturnStatement {
    pub fn new(value: impl Into<Expression>) -> Self {
        Self {
            token: Token::synthetic(TokenKind::Return, "return"),
            value: value.into(),
        }
    }
}

impl Node for ReturnStatement {
    fn token(&self) -> &Token {
        &self.token
    }
}

impl fmt::Display for ReturnStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "return {};", self.value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStatement {
    /// First token of the expression.
    pub token: Token,
    pub value: Expression,
}

impl ExpressionStatement {
    pub fn new(value: impl Into<Expression>) -> Self {
        let value = value.into();
        let token = value.token().clone();
        Self { token, value }
    }
}

impl Node for ExpressionStatement {
    fn token(&self) -> &Token {
        &self.token
    }
}

impl fmt::Display for ExpressionStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockStatement {
    /// The opening `{`.
    pub token: Token,
    pub statements: Vec<Statement>,
}

impl BlockStatement {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self {
            token: Token::synthetic(TokenKind::LBrace, "{"),
            statements,
        }
    }
}

impl Node for BlockStatement {
    fn token(&self) -> &Token {
        &self.token
    }
}

impl fmt::Display for BlockStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.statements.is_empty() {
            return write!(f, "{{ }}");
        }
        let stmts: Vec<String> = self.statements.iter().map(|s| s.to_string()).collect();
        write!(f, "{{ {} }}", stmts.join(" "))
    }
}

// ============================================================================
// Program
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl Program {
    pub fn token_literal(&self) -> &str {
        self.statements
            .first()
            .map(|s| s.token_literal())
            .unwrap_or_default()
    }
    pub fn pos(&self) -> Position {
        self.statements.first().map(|s| s.pos()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stmts: Vec<String> = self.statements.iter().map(|s| s.to_string()).collect();
        write!(f, "{}", stmts.join("\n"))
    }
}
