//! LL(1) predictive table
//!
//! Cells map `(nonterminal, terminal)` to the rule to expand, or to SYNCH:
//! pop the nonterminal without consuming input. SYNCH cells are exactly the
//! FOLLOW terminals that no rule claimed.

use super::sets::GrammarSets;
use super::Grammar;
use crate::diagnostics::{Diagnostic, Diagnostics};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableEntry {
    /// Expand with this rule index
    Rule(usize),
    /// Panic-mode synchronization point
    Synch,
}

impl Serialize for TableEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TableEntry::Rule(index) => serializer.serialize_u64(*index as u64),
            TableEntry::Synch => serializer.serialize_str("synch"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PredictiveTable {
    cells: FxHashMap<String, FxHashMap<String, TableEntry>>,
}

impl PredictiveTable {
    /// Fill the table from SELECT sets, then mark SYNCH cells.
    ///
    /// When two rules select the same cell the first one stays and one
    /// [`Diagnostic::GrammarConflict`] is pushed for that cell.
    pub fn build(grammar: &Grammar, sets: &GrammarSets, diagnostics: &mut Diagnostics) -> Self {
        let mut cells: FxHashMap<String, FxHashMap<String, TableEntry>> = grammar
            .nonterminals()
            .iter()
            .map(|nt| (nt.clone(), FxHashMap::default()))
            .collect();
        let mut reported: FxHashSet<(String, String)> = FxHashSet::default();

        for (index, rule) in grammar.rules().iter().enumerate() {
            let Some(select) = sets.select(index) else {
                continue;
            };
            let row = cells.entry(rule.left.clone()).or_default();
            for terminal in select {
                match row.get(terminal) {
                    None => {
                        row.insert(terminal.clone(), TableEntry::Rule(index));
                    }
                    Some(TableEntry::Rule(existing)) => {
                        if reported.insert((rule.left.clone(), terminal.clone())) {
                            diagnostics.push(Diagnostic::GrammarConflict {
                                nonterminal: rule.left.clone(),
                                terminal: terminal.clone(),
                                existing: *existing,
                                incoming: index,
                            });
                        }
                    }
                    Some(TableEntry::Synch) => {}
                }
            }
        }

        let mut synch = 0;
        for nt in grammar.nonterminals() {
            let Some(follow) = sets.follow(nt) else {
                continue;
            };
            let row = cells.entry(nt.clone()).or_default();
            for terminal in follow {
                if !row.contains_key(terminal) {
                    row.insert(terminal.clone(), TableEntry::Synch);
                    synch += 1;
                }
            }
        }

        log::debug!(
            "predictive table: {} rows, {} synch cells, {} conflicts",
            cells.len(),
            synch,
            reported.len()
        );
        PredictiveTable { cells }
    }

    pub fn get(&self, nonterminal: &str, terminal: &str) -> Option<TableEntry> {
        self.cells.get(nonterminal)?.get(terminal).copied()
    }

    /// Number of filled cells, SYNCH included.
    pub fn len(&self) -> usize {
        self.cells.values().map(|row| row.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The whole table as nonterminal → terminal → entry, sorted by name.
    pub fn to_nested(&self) -> BTreeMap<String, BTreeMap<String, TableEntry>> {
        self.cells
            .iter()
            .map(|(nt, row)| {
                let row = row.iter().map(|(t, e)| (t.clone(), *e)).collect();
                (nt.clone(), row)
            })
            .collect()
    }
}

impl Serialize for PredictiveTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_nested().serialize(serializer)
    }
}
