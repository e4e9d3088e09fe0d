//! Semantic analysis and three-address code generation
//!
//! This module walks a parse tree produced with the built-in grammar:
//! - [`analyzer`]: Analyzer state, statement lists and declarations
//! - [`symbols`]: Type descriptors and the symbol table
//! - [`code`]: Three-address instructions and backpatching
//!
//! Expression and control-flow generation add further methods to
//! [`SemanticAnalyzer`] from private modules.
//!
//! # Scoping
//!
//! One flat namespace. Declarations inside `if`/loop bodies land in the same
//! table as top-level ones.

pub mod analyzer;
pub mod code;
mod control;
mod expressions;
pub mod symbols;

pub use analyzer::{Analysis, SemanticAnalyzer};
pub use code::{CodeBuffer, CodeLine, Instruction, Quad};
pub use symbols::{SymbolEntry, SymbolTable, TypeDescriptor};

use crate::parser::ast::AstNode;

/// Analyze `root` with a fresh analyzer.
pub fn analyze(root: &AstNode) -> Analysis {
    SemanticAnalyzer::new().analyze(root)
}
