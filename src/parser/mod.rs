//! C source code parser
//!
//! This module transforms C source text into a parse tree:
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`predictive`]: Table-driven LL(1) parsing (tokens → tree)
//! - [`ast`]: Tree node definitions
//!
//! # Parser Implementation
//!
//! There is no hand-written grammar here. The parser is generic over any
//! [`Ll1Grammar`](crate::grammar::Ll1Grammar); the shape of the tree follows
//! the rules of that grammar one-to-one, so each interior node is a
//! nonterminal and its children are the right side of the rule used.
//!
//! # Error Recovery
//!
//! Panic mode: SYNCH cells pop the nonterminal, empty cells skip the input
//! token, terminal mismatches do both. A tree is always returned.

pub mod ast;
pub mod lexer;
pub mod predictive;

pub use ast::AstNode;
pub use lexer::{tokenize, Category, Lexer, Token};
pub use predictive::{ParseOutcome, PredictiveParser};
