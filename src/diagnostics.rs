//! Non-fatal diagnostics shared by every stage
//!
//! Nothing in the front end aborts on bad input. Each stage records what went
//! wrong as a [`Diagnostic`], keeps going, and hands the collected list back
//! alongside its best-effort output.

use serde::Serialize;
use thiserror::Error;

/// A single lexical, syntax, semantic or grammar diagnostic.
///
/// The `Display` output is the user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    #[error("Lexical error at Line {line}: Unrecognized Character: {character}")]
    Lexical { line: usize, character: char },

    #[error("Lexical error at Line {line}: Unterminated block comment")]
    UnterminatedComment { line: usize },

    #[error("Syntax error at Line {line}: {note}")]
    Syntax { line: usize, note: String },

    #[error("Semantic error at Line {line}: {message}")]
    Semantic { line: usize, message: String },

    /// Two rules of the same nonterminal both select `terminal`.
    #[error("({nonterminal}, {terminal}) conflict at rule {existing} vs {incoming}")]
    GrammarConflict {
        nonterminal: String,
        terminal: String,
        existing: usize,
        incoming: usize,
    },
}

impl Diagnostic {
    /// Source line the diagnostic points at, if it has one.
    pub fn line(&self) -> Option<usize> {
        match self {
            Diagnostic::Lexical { line, .. }
            | Diagnostic::UnterminatedComment { line }
            | Diagnostic::Syntax { line, .. }
            | Diagnostic::Semantic { line, .. } => Some(*line),
            Diagnostic::GrammarConflict { .. } => None,
        }
    }
}

/// Ordered collection of diagnostics. Every push is also logged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        log::warn!("{}", diagnostic);
        self.items.push(diagnostic);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        // already logged by whoever produced them
        self.items.extend(other.items);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.items.iter()
    }

    /// Messages in report order.
    pub fn messages(&self) -> Vec<String> {
        self.items.iter().map(|d| d.to_string()).collect()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_match_report_format() {
        let lexical = Diagnostic::Lexical {
            line: 3,
            character: '@',
        };
        assert_eq!(
            lexical.to_string(),
            "Lexical error at Line 3: Unrecognized Character: @"
        );

        let conflict = Diagnostic::GrammarConflict {
            nonterminal: "A".to_string(),
            terminal: "x".to_string(),
            existing: 0,
            incoming: 2,
        };
        assert_eq!(conflict.to_string(), "(A, x) conflict at rule 0 vs 2");
        assert_eq!(conflict.line(), None);
    }

    #[test]
    fn test_collector_keeps_order() {
        let mut diags = Diagnostics::new();
        diags.push(Diagnostic::Syntax {
            line: 1,
            note: "first".to_string(),
        });
        diags.push(Diagnostic::Semantic {
            line: 2,
            message: "second".to_string(),
        });

        assert_eq!(diags.len(), 2);
        assert_eq!(
            diags.messages(),
            vec![
                "Syntax error at Line 1: first".to_string(),
                "Semantic error at Line 2: second".to_string(),
            ]
        );
    }
}
