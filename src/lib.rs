//! # Introduction
//!
//! llfront is the front half of a compiler for a small C subset. It scans
//! source text, parses it with a table-driven LL(1) parser generated from a
//! textual grammar, and lowers the resulting tree to three-address code.
//!
//! ## Pipeline
//!
//! ```text
//! Grammar text → normalize → FIRST/FOLLOW/SELECT → predictive table
//!                                                        │
//! Source → Lexer → tokens → PredictiveParser ←───────────┘
//!                                  │
//!                                 AST → SemanticAnalyzer → symbols + code
//! ```
//!
//! 1. [`grammar`]: parses grammar text, left-factors it, removes left
//!    recursion, solves the sets and fills the predictive table. This runs
//!    once per grammar; the resulting [`grammar::Ll1Grammar`] is read-only.
//! 2. [`parser`]: the lexer, the predictive parser and the tree it builds.
//! 3. [`semantic`]: symbol table, type checks and backpatched code.
//! 4. [`diagnostics`]: the shared, non-fatal error record.
//!
//! [`compile`] runs the per-source stages in order. No stage stops on bad
//! input; each returns its best-effort output with diagnostics attached.

pub mod diagnostics;
pub mod grammar;
pub mod parser;
pub mod semantic;

use diagnostics::Diagnostics;
use grammar::Ll1Grammar;
use parser::ast::AstNode;
use parser::lexer::{tokenize, Token};
use parser::predictive::PredictiveParser;
use semantic::{CodeBuffer, SymbolTable};
use serde::Serialize;

/// Everything one run over a source text produced.
#[derive(Debug, Clone, Serialize)]
pub struct Compilation {
    pub tokens: Vec<Token>,
    pub tree: AstNode,
    /// Every real token was consumed by the parser
    pub complete: bool,
    pub symbols: SymbolTable,
    pub code: CodeBuffer,
    /// Lexical, syntax and semantic diagnostics in stage order
    pub diagnostics: Diagnostics,
}

/// Lex, parse and analyze `source` against `grammar`.
pub fn compile(source: &str, grammar: &Ll1Grammar) -> Compilation {
    let (tokens, mut diagnostics) = tokenize(source);

    let outcome = PredictiveParser::new(grammar).parse(&tokens);
    diagnostics.extend(outcome.diagnostics);

    let analysis = semantic::analyze(&outcome.tree);
    diagnostics.extend(analysis.diagnostics);

    Compilation {
        tokens,
        tree: outcome.tree,
        complete: outcome.complete,
        symbols: analysis.symbols,
        code: analysis.code,
        diagnostics,
    }
}
