//! ZenScript front end - lexer, token model and recoverable parser
//!
//! # Architecture
//!
//! - `token`: `TokenKind` (derived with `logos`) and positioned `Token`s
//! - `lexer`: `tokenize`, splitting code tokens from comments
//! - `stream`: token cursor implementing the recovery protocol
//! - `grammar`: one recursive-descent function per production
//! - `node`: the typed parse tree
//! - `error`: recovered syntax errors
//!
//! # Usage
//!
//! ```ignore
//! use zenscript_language_server::parsers::zenscript::{parse, tokenize};
//!
//! let lexed = tokenize("val x = 1 + 2 * 3;");
//! let tree = parse(&lexed.tokens);
//! assert!(tree.errors.is_empty());
//! ```

pub mod error;
pub mod grammar;
pub mod lexer;
pub mod node;
pub mod token;

mod stream;

pub use error::{SyntaxError, SyntaxErrorKind};
pub use grammar::{parse, parse_expression, parse_statement, parse_type};
pub use lexer::{Lexed, tokenize};
pub use node::{ParseTree, Parsed, Span};
pub use token::{Token, TokenKind, TokenSequence};
