//! Grammar processing and LL(1) table generation
//!
//! - [`rules`]: production rules, the grammar text format, the built-in grammar
//! - [`transform`]: left-factoring and left-recursion elimination
//! - [`sets`]: FIRST / FOLLOW / SELECT fixed points
//! - [`table`]: the predictive table with conflict and SYNCH handling
//!
//! [`Ll1Grammar`] bundles all of it. It is built once per grammar text and
//! then shared read-only by every parse.

pub mod rules;
pub mod sets;
pub mod table;
pub mod transform;

pub use rules::{parse_rules, rules_to_input, Rule, BUILTIN_GRAMMAR};
pub use sets::{GrammarSets, SelectRow, SetRow};
pub use table::{PredictiveTable, TableEntry};

use crate::diagnostics::Diagnostics;
use rustc_hash::FxHashSet;
use std::collections::BTreeSet;
use thiserror::Error;

/// The empty-production marker.
pub const EPSILON: &str = "ε";

/// The end-of-input terminal.
pub const END_MARKER: &str = "$";

/// Grammar errors that stop table generation outright.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("grammar has no productions")]
    Empty,
}

/// An ordered list of rules. Rule 0's left side is the start symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    rules: Vec<Rule>,
    /// Left-hand names in order of first appearance
    nonterminals: Vec<String>,
    lookup: FxHashSet<String>,
}

impl Grammar {
    pub fn new(rules: Vec<Rule>) -> Result<Self, GrammarError> {
        if rules.is_empty() {
            return Err(GrammarError::Empty);
        }
        Ok(Self::assemble(rules))
    }

    /// Parse grammar text; see [`parse_rules`].
    pub fn parse(text: &str) -> Result<Self, GrammarError> {
        Self::new(parse_rules(text))
    }

    /// The built-in C-subset grammar, before normalization.
    pub fn builtin() -> Self {
        Self::assemble(parse_rules(BUILTIN_GRAMMAR))
    }

    fn assemble(rules: Vec<Rule>) -> Self {
        let mut nonterminals = Vec::new();
        let mut lookup = FxHashSet::default();
        for rule in &rules {
            if lookup.insert(rule.left.clone()) {
                nonterminals.push(rule.left.clone());
            }
        }
        Grammar {
            rules,
            nonterminals,
            lookup,
        }
    }

    /// Common prefixes factored out; left recursion still in place.
    pub fn left_factored(&self) -> Self {
        Self::assemble(transform::left_factor(self.rules.clone()))
    }

    /// Direct left recursion replaced by right-recursive tails.
    pub fn without_left_recursion(&self) -> Self {
        Self::assemble(transform::remove_left_recursion(self.rules.clone()))
    }

    /// Left-factor, then remove direct left recursion.
    pub fn normalized(&self) -> Self {
        self.left_factored().without_left_recursion()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn start_symbol(&self) -> &str {
        self.nonterminals.first().map(String::as_str).unwrap_or(EPSILON)
    }

    pub fn nonterminals(&self) -> &[String] {
        &self.nonterminals
    }

    pub fn is_nonterminal(&self, symbol: &str) -> bool {
        self.lookup.contains(symbol)
    }

    /// Every right-hand symbol that is neither a nonterminal nor `ε`.
    pub fn terminals(&self) -> BTreeSet<String> {
        self.rules
            .iter()
            .flat_map(|r| r.right.iter())
            .filter(|s| *s != EPSILON && !self.is_nonterminal(s))
            .cloned()
            .collect()
    }

    /// Rules whose left side is `nonterminal`, with their indices.
    pub fn rules_for<'a>(
        &'a self,
        nonterminal: &'a str,
    ) -> impl Iterator<Item = (usize, &'a Rule)> + 'a {
        self.rules
            .iter()
            .enumerate()
            .filter(move |(_, r)| r.left == nonterminal)
    }

    pub fn to_text(&self) -> String {
        rules_to_input(&self.rules)
    }
}

/// A normalized grammar with its sets and predictive table.
#[derive(Debug, Clone)]
pub struct Ll1Grammar {
    source: Grammar,
    factored: Grammar,
    grammar: Grammar,
    sets: GrammarSets,
    table: PredictiveTable,
    conflicts: Diagnostics,
}

impl Ll1Grammar {
    /// Normalize `source` and build sets and table for the result.
    pub fn prepare(source: Grammar) -> Self {
        let factored = source.left_factored();
        let grammar = factored.without_left_recursion();
        log::debug!(
            "normalized grammar: {} rules -> {} factored -> {} rules",
            source.rules().len(),
            factored.rules().len(),
            grammar.rules().len()
        );

        let sets = GrammarSets::compute(&grammar);
        let mut conflicts = Diagnostics::new();
        let table = PredictiveTable::build(&grammar, &sets, &mut conflicts);

        Ll1Grammar {
            source,
            factored,
            grammar,
            sets,
            table,
            conflicts,
        }
    }

    pub fn from_text(text: &str) -> Result<Self, GrammarError> {
        Ok(Self::prepare(Grammar::parse(text)?))
    }

    pub fn builtin() -> Self {
        Self::prepare(Grammar::builtin())
    }

    /// The grammar as written, before normalization.
    pub fn source(&self) -> &Grammar {
        &self.source
    }

    /// The grammar after left-factoring, before left recursion is removed.
    pub fn factored(&self) -> &Grammar {
        &self.factored
    }

    /// The normalized grammar the table was built from.
    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn sets(&self) -> &GrammarSets {
        &self.sets
    }

    pub fn table(&self) -> &PredictiveTable {
        &self.table
    }

    /// Conflicts found while filling the table.
    pub fn conflicts(&self) -> &Diagnostics {
        &self.conflicts
    }

    pub fn set_rows(&self) -> Vec<SetRow> {
        self.sets.set_rows(&self.grammar)
    }

    pub fn select_rows(&self) -> Vec<SelectRow> {
        self.sets.select_rows(&self.grammar)
    }
}
