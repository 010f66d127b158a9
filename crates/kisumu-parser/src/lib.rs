//! Kisumu parser - AST construction for the Kisumu scripting language.
//!
//! Tokens from `kisumu-lexer` are turned into a [`Program`] by a Pratt
//! parser. Parsing never stops at the first problem: every diagnostic is
//! collected and a partial tree is still returned.
//!
//! ```
//! use kisumu_parser::parse;
//!
//! let program = parse("let x = 1 + 2 * 3;").unwrap();
//! assert_eq!(program.to_string(), "let x = (1 + (2 * 3));");
//! ```

pub mod ast;
pub mod parser;
pub mod precedence;

pub use ast::*;
pub use parser::{ParseErrorKind, Parser, ParserError, parse};
pub use precedence::Precedence;
