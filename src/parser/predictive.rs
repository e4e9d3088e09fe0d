//! Table-driven predictive parser
//!
//! This module provides [`PredictiveParser`], which turns a token sequence
//! into an [`AstNode`] tree using an [`Ll1Grammar`]'s predictive table.
//!
//! # Algorithm
//!
//! An explicit stack holds grammar symbols still to be matched, each paired
//! with the tree node it will fill. The bottom is `$`, above it the start
//! symbol. Each step looks at the top symbol and the current token:
//!
//! - nonterminal with a rule in the table: expand it, pushing the right side
//!   in reverse so the leftmost symbol is on top
//! - nonterminal with a SYNCH cell: pop it without consuming input
//! - nonterminal with no cell: skip the input token
//! - terminal that matches: fill the leaf, pop, advance
//! - `ε`: pop
//! - terminal that does not match: pop it and skip the input token
//!
//! Nodes live in a flat arena while parsing and are assembled into an owned
//! [`AstNode`] tree at the end, so a step costs the same at any depth.
//!
//! A grammar with conflicts can keep a rule that derives its own left-hand
//! side again without consuming input. Expanding a nonterminal whose
//! ancestor with the same symbol was expanded at the same token is reported
//! as an expansion cycle and the nonterminal is popped instead.
//!
//! Every recovery action is reported as a syntax diagnostic and parsing
//! always runs to the end, so the caller gets a tree even for broken input.

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::grammar::{Ll1Grammar, TableEntry, END_MARKER, EPSILON};
use crate::parser::ast::AstNode;
use crate::parser::lexer::Token;

/// Result of one parse.
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    pub tree: AstNode,
    /// Real tokens consumed (matched or skipped)
    pub consumed: usize,
    /// True when every real token was consumed
    pub complete: bool,
    pub diagnostics: Diagnostics,
}

/// A stack frame: the symbol to match and the arena slot it fills.
struct Frame {
    symbol: String,
    node: usize,
}

/// A tree node under construction.
struct Slot {
    symbol: String,
    line: usize,
    value: Option<String>,
    children: Vec<usize>,
    parent: Option<usize>,
    /// Input position at which this node was expanded
    expanded_at: Option<usize>,
}

/// Parse-tree arena. Slot 0 is the root; children always come after their
/// parent.
struct TreeArena {
    slots: Vec<Slot>,
}

impl TreeArena {
    fn new(root: &str) -> Self {
        TreeArena {
            slots: vec![Slot {
                symbol: root.to_string(),
                line: 1,
                value: None,
                children: Vec::new(),
                parent: None,
                expanded_at: None,
            }],
        }
    }

    fn add_child(&mut self, parent: usize, symbol: &str) -> usize {
        let index = self.slots.len();
        self.slots.push(Slot {
            symbol: symbol.to_string(),
            line: 0,
            value: None,
            children: Vec::new(),
            parent: Some(parent),
            expanded_at: None,
        });
        self.slots[parent].children.push(index);
        index
    }

    fn set_line(&mut self, node: usize, line: usize) {
        if let Some(slot) = self.slots.get_mut(node) {
            slot.line = line;
        }
    }

    /// True when an ancestor of `node` with the same symbol was expanded at
    /// input position `cursor`.
    fn reexpands(&self, node: usize, cursor: usize) -> bool {
        let symbol = &self.slots[node].symbol;
        let mut current = self.slots[node].parent;
        while let Some(index) = current {
            let slot = &self.slots[index];
            if slot.expanded_at != Some(cursor) {
                return false;
            }
            if slot.symbol == *symbol {
                return true;
            }
            current = slot.parent;
        }
        false
    }

    /// Assemble the owned tree, children first.
    fn into_tree(self) -> AstNode {
        let mut built: Vec<Option<AstNode>> = Vec::with_capacity(self.slots.len());
        built.resize_with(self.slots.len(), || None);

        for (index, slot) in self.slots.into_iter().enumerate().rev() {
            let mut node = AstNode::new(&slot.symbol, slot.line);
            node.value = slot.value;
            node.children = slot
                .children
                .iter()
                .filter_map(|&child| built[child].take())
                .collect();
            built[index] = Some(node);
        }
        built
            .first_mut()
            .and_then(Option::take)
            .unwrap_or_else(|| AstNode::new(EPSILON, 1))
    }
}

/// Predictive parser over a prepared grammar
pub struct PredictiveParser<'g> {
    grammar: &'g Ll1Grammar,
}

impl<'g> PredictiveParser<'g> {
    pub fn new(grammar: &'g Ll1Grammar) -> Self {
        Self { grammar }
    }

    /// Parse `tokens`. A `$` token is appended internally; callers pass only
    /// the lexer's output.
    pub fn parse(&self, tokens: &[Token]) -> ParseOutcome {
        let grammar = self.grammar.grammar();
        let table = self.grammar.table();
        let start = grammar.start_symbol();

        let end_line = tokens.last().map_or(1, |t| t.line);
        let end = Token::end_marker(tokens.len() + 1, end_line);
        let input: Vec<&Token> = tokens.iter().chain(std::iter::once(&end)).collect();

        let mut tree = TreeArena::new(start);
        let mut diagnostics = Diagnostics::new();
        let mut stack = vec![
            Frame {
                symbol: END_MARKER.to_string(),
                node: 0,
            },
            Frame {
                symbol: start.to_string(),
                node: 0,
            },
        ];
        let mut cursor = 0;

        while stack.len() > 1 && cursor < input.len() {
            let token = input[cursor];
            let category = token.category.as_str();
            let Some(top) = stack.last() else {
                break;
            };

            if grammar.is_nonterminal(&top.symbol) {
                match table.get(&top.symbol, category) {
                    Some(TableEntry::Rule(_)) if tree.reexpands(top.node, cursor) => {
                        diagnostics.push(Diagnostic::Syntax {
                            line: token.line,
                            note: format!("expansion cycle on {}", top.symbol),
                        });
                        if let Some(frame) = stack.pop() {
                            tree.set_line(frame.node, token.line);
                        }
                    }
                    Some(TableEntry::Rule(index)) => {
                        let Some(frame) = stack.pop() else {
                            break;
                        };
                        let rule = &grammar.rules()[index];
                        log::trace!("expand {} with rule {}: {}", frame.symbol, index, rule);

                        let symbols: &[String] = if rule.is_epsilon() { &[] } else { &rule.right };
                        tree.set_line(frame.node, token.line);
                        tree.slots[frame.node].expanded_at = Some(cursor);
                        let children: Vec<usize> =
                            symbols.iter().map(|s| tree.add_child(frame.node, s)).collect();
                        for (symbol, node) in symbols.iter().zip(children).rev() {
                            stack.push(Frame {
                                symbol: symbol.clone(),
                                node,
                            });
                        }
                    }
                    Some(TableEntry::Synch) => {
                        diagnostics.push(Diagnostic::Syntax {
                            line: token.line,
                            note: format!("synch: popped {} at {}", top.symbol, category),
                        });
                        if let Some(frame) = stack.pop() {
                            tree.set_line(frame.node, token.line);
                        }
                    }
                    None => {
                        diagnostics.push(Diagnostic::Syntax {
                            line: token.line,
                            note: format!(
                                "no entry for ({}, {}); skipped input {}",
                                top.symbol, category, category
                            ),
                        });
                        cursor += 1;
                    }
                }
                continue;
            }

            let Some(frame) = stack.pop() else {
                break;
            };
            tree.set_line(frame.node, token.line);
            if frame.symbol == EPSILON {
                continue;
            }

            if frame.symbol == category {
                log::trace!("match {} at line {}", category, token.line);
                tree.slots[frame.node].value = token.value.clone();
            } else {
                diagnostics.push(Diagnostic::Syntax {
                    line: token.line,
                    note: format!(
                        "expected {} but found {}; popped {} and skipped input",
                        frame.symbol, category, frame.symbol
                    ),
                });
            }
            cursor += 1;
        }

        let real = input.len() - 1;
        let consumed = cursor.min(real);
        if stack.len() <= 1 && cursor < real {
            diagnostics.push(Diagnostic::Syntax {
                line: input[cursor].line,
                note: format!("unexpected trailing input starting at {}", input[cursor].category),
            });
        }

        let complete = cursor == real;
        if complete {
            log::info!("parse complete: consumed all {} tokens", real);
        } else {
            log::info!("parse stopped after {} of {} tokens", consumed, real);
        }

        ParseOutcome {
            tree: tree.into_tree(),
            consumed,
            complete,
            diagnostics,
        }
    }
}
