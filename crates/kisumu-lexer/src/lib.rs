//! Kisumu lexer - tokenization for the Kisumu scripting language.
//!
//! This crate provides the lexer for Kisumu, which converts source text into
//! tokens for parsing. Tokens are produced on demand; the lexer never fails,
//! and anything it cannot classify comes back as [`TokenKind::Illegal`].
//!
//! # Example
//!
//! ```
//! use kisumu_lexer::{tokenize, TokenKind};
//!
//! let mut lexer = tokenize("let x = 42;");
//! let token = lexer.next_token();
//! assert_eq!(token.kind, TokenKind::Let);
//!
//! let rest: Vec<TokenKind> = lexer.map(|t| t.kind).collect();
//! assert_eq!(
//!     rest,
//!     [TokenKind::Ident, TokenKind::Assign, TokenKind::Int, TokenKind::Semicolon, TokenKind::Eof]
//! );
//! ```

pub mod lexer;
pub mod token;

pub use lexer::{tokenize, Lexer};
pub use token::{lookup_identifier, Position, Token, TokenKind};
