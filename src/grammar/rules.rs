//! Production rules, the line-oriented grammar text format, and the
//! built-in C-subset grammar.

use super::EPSILON;
use serde::Serialize;
use std::fmt;

/// The built-in C-subset grammar.
///
/// Written naturally (left-recursive expressions, a shared `Sum` prefix in
/// `Relation`, shared operator prefixes in `Sum` and `Term`); it becomes
/// LL(1) after [`Grammar::normalized`](super::Grammar::normalized).
pub const BUILTIN_GRAMMAR: &str = "\
Program -> ε
Program -> VariableDeclaration SEMI Program
Program -> StructDeclaration SEMI Program
Program -> IfStatement Program
Program -> WhileStatement Program
Program -> DoWhileStatement SEMI Program
Program -> ForStatement Program

StructDeclaration -> STRUCT ID LC StructBody RC
StructBody -> TYPE ID SEMI StructBody
StructBody -> ε

VariableDeclaration -> TYPE ID Init
VariableDeclaration -> ID Init
Init -> ASSIGNOP Expression
Init -> LB INT RB Init
Init -> ε

IfStatement -> IF LP Expression RP LC Program RC ElsePart
ElsePart -> ELSE LC Program RC
ElsePart -> ε
WhileStatement -> WHILE LP Expression RP LC Program RC
DoWhileStatement -> DO LC Program RC WHILE LP Expression RP
ForStatement -> FOR LP ForInit SEMI Expression SEMI ForStep RP LC Program RC
ForInit -> VariableDeclaration
ForInit -> ε
ForStep -> ID ASSIGNOP Expression
ForStep -> ε

Expression -> Expression OR Conjunction
Expression -> Conjunction
Conjunction -> Conjunction AND Relation
Conjunction -> Relation
Relation -> Sum RELOP Sum
Relation -> Sum
Sum -> Sum PLUS Term
Sum -> Sum MINUS Term
Sum -> Term
Term -> Term STAR Factor
Term -> Term DIV Factor
Term -> Term MOD Factor
Term -> Factor
Factor -> ID
Factor -> INT
Factor -> FLOAT
Factor -> LP Expression RP
";

/// A production `left -> right[0] right[1] ...`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Rule {
    pub left: String,
    pub right: Vec<String>,
}

impl Rule {
    pub fn new(left: &str, right: &[&str]) -> Self {
        Rule {
            left: left.to_string(),
            right: right.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// `A -> ε`
    pub fn is_epsilon(&self) -> bool {
        self.right.iter().all(|s| s == EPSILON)
    }

    /// `A -> A α`
    pub fn is_left_recursive(&self) -> bool {
        self.right.first() == Some(&self.left)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.left, self.right.join(" "))
    }
}

/// Parse grammar text, one production per line.
///
/// Lines without `->`, with an empty side, or with whitespace inside the
/// left-hand name are ignored.
pub fn parse_rules(input: &str) -> Vec<Rule> {
    input
        .lines()
        .filter_map(|line| {
            let (left, right) = line.split_once("->")?;
            let left = left.trim();
            let right = right.trim();
            if left.is_empty() || right.is_empty() || left.contains(char::is_whitespace) {
                return None;
            }
            Some(Rule {
                left: left.to_string(),
                right: right.split_whitespace().map(str::to_string).collect(),
            })
        })
        .collect()
}

/// Serialize rules back to grammar text, one line per rule.
pub fn rules_to_input(rules: &[Rule]) -> String {
    let mut out = String::new();
    for rule in rules {
        out.push_str(&rule.to_string());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skips_blank_and_malformed_lines() {
        let rules = parse_rules("A -> a B\n\nnot a rule\n -> x\nB ->   \nB -> ε\n");
        assert_eq!(rules, vec![Rule::new("A", &["a", "B"]), Rule::new("B", &["ε"])]);
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let rules = parse_rules("  Sum   ->  Sum   PLUS\tTerm  ");
        assert_eq!(rules, vec![Rule::new("Sum", &["Sum", "PLUS", "Term"])]);
        assert!(rules[0].is_left_recursive());
    }

    #[test]
    fn test_round_trip() {
        let text = rules_to_input(&parse_rules(BUILTIN_GRAMMAR));
        assert_eq!(rules_to_input(&parse_rules(&text)), text);
    }

    #[test]
    fn test_builtin_starts_with_program() {
        let rules = parse_rules(BUILTIN_GRAMMAR);
        assert_eq!(rules[0].left, "Program");
        assert!(rules[0].is_epsilon());
    }
}
