//! FIRST, FOLLOW and SELECT sets
//!
//! FIRST and FOLLOW are monotone fixed points: every pass over the rules only
//! ever grows the sets, and iteration stops after a pass in which no set
//! changed size. SELECT is derived from both in a single pass.
//!
//! Sets are `BTreeSet`s so every report and table build sees the symbols in
//! the same order.

use super::{Grammar, END_MARKER, EPSILON};
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::collections::BTreeSet;

pub type SymbolSet = BTreeSet<String>;

/// FIRST and FOLLOW per nonterminal, SELECT per rule index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarSets {
    first: FxHashMap<String, SymbolSet>,
    follow: FxHashMap<String, SymbolSet>,
    select: Vec<SymbolSet>,
}

/// One row of the FIRST/FOLLOW report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetRow {
    pub nonterminal: String,
    pub first: Vec<String>,
    pub follow: Vec<String>,
}

/// One row of the SELECT report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectRow {
    pub index: usize,
    pub production: String,
    pub select: String,
}

impl GrammarSets {
    pub fn compute(grammar: &Grammar) -> Self {
        let first = compute_first(grammar);
        let follow = compute_follow(grammar, &first);
        let select = grammar
            .rules()
            .iter()
            .map(|rule| {
                let mut set = sequence_first(grammar, &first, &rule.right);
                if set.remove(EPSILON) {
                    if let Some(follow) = follow.get(&rule.left) {
                        set.extend(follow.iter().cloned());
                    }
                }
                set
            })
            .collect();

        GrammarSets {
            first,
            follow,
            select,
        }
    }

    pub fn first(&self, nonterminal: &str) -> Option<&SymbolSet> {
        self.first.get(nonterminal)
    }

    pub fn follow(&self, nonterminal: &str) -> Option<&SymbolSet> {
        self.follow.get(nonterminal)
    }

    pub fn select(&self, rule: usize) -> Option<&SymbolSet> {
        self.select.get(rule)
    }

    pub fn is_nullable(&self, nonterminal: &str) -> bool {
        self.first(nonterminal).is_some_and(|f| f.contains(EPSILON))
    }

    /// FIRST of a symbol sequence; contains `ε` iff the whole sequence can
    /// vanish.
    pub fn first_of(&self, grammar: &Grammar, symbols: &[String]) -> SymbolSet {
        sequence_first(grammar, &self.first, symbols)
    }

    /// FIRST/FOLLOW rows in nonterminal order.
    pub fn set_rows(&self, grammar: &Grammar) -> Vec<SetRow> {
        grammar
            .nonterminals()
            .iter()
            .map(|nt| SetRow {
                nonterminal: nt.clone(),
                first: self.first(nt).map(sorted).unwrap_or_default(),
                follow: self.follow(nt).map(sorted).unwrap_or_default(),
            })
            .collect()
    }

    /// SELECT rows in rule order.
    pub fn select_rows(&self, grammar: &Grammar) -> Vec<SelectRow> {
        grammar
            .rules()
            .iter()
            .enumerate()
            .map(|(index, rule)| SelectRow {
                index,
                production: rule.to_string(),
                select: self
                    .select(index)
                    .map(|s| sorted(s).join(" "))
                    .unwrap_or_default(),
            })
            .collect()
    }
}

fn sorted(set: &SymbolSet) -> Vec<String> {
    set.iter().cloned().collect()
}

/// FIRST of `symbols` against a (possibly partial) FIRST map.
fn sequence_first(
    grammar: &Grammar,
    first: &FxHashMap<String, SymbolSet>,
    symbols: &[String],
) -> SymbolSet {
    let mut out = SymbolSet::new();
    for symbol in symbols {
        if symbol == EPSILON {
            continue;
        }
        if !grammar.is_nonterminal(symbol) {
            out.insert(symbol.clone());
            return out;
        }
        let Some(set) = first.get(symbol) else {
            return out;
        };
        out.extend(set.iter().filter(|s| *s != EPSILON).cloned());
        if !set.contains(EPSILON) {
            return out;
        }
    }
    out.insert(EPSILON.to_string());
    out
}

fn compute_first(grammar: &Grammar) -> FxHashMap<String, SymbolSet> {
    let mut first: FxHashMap<String, SymbolSet> = grammar
        .nonterminals()
        .iter()
        .map(|nt| (nt.clone(), SymbolSet::new()))
        .collect();

    let mut passes = 0;
    loop {
        passes += 1;
        let mut changed = false;
        for rule in grammar.rules() {
            let add = sequence_first(grammar, &first, &rule.right);
            if let Some(set) = first.get_mut(&rule.left) {
                let before = set.len();
                set.extend(add);
                changed |= set.len() != before;
            }
        }
        if !changed {
            break;
        }
    }

    log::debug!("FIRST sets settled after {} passes", passes);
    first
}

fn compute_follow(
    grammar: &Grammar,
    first: &FxHashMap<String, SymbolSet>,
) -> FxHashMap<String, SymbolSet> {
    let mut follow: FxHashMap<String, SymbolSet> = grammar
        .nonterminals()
        .iter()
        .map(|nt| (nt.clone(), SymbolSet::new()))
        .collect();
    if let Some(set) = follow.get_mut(grammar.start_symbol()) {
        set.insert(END_MARKER.to_string());
    }

    let mut passes = 0;
    loop {
        passes += 1;
        let mut changed = false;
        for rule in grammar.rules() {
            for (i, symbol) in rule.right.iter().enumerate() {
                if !grammar.is_nonterminal(symbol) {
                    continue;
                }
                let mut add = sequence_first(grammar, first, &rule.right[i + 1..]);
                if add.remove(EPSILON) {
                    if let Some(trailing) = follow.get(&rule.left) {
                        add.extend(trailing.iter().cloned());
                    }
                }
                if let Some(set) = follow.get_mut(symbol) {
                    let before = set.len();
                    set.extend(add);
                    changed |= set.len() != before;
                }
            }
        }
        if !changed {
            break;
        }
    }

    log::debug!("FOLLOW sets settled after {} passes", passes);
    follow
}
