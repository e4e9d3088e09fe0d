//! Grammar rewriting for top-down parsing: left-factoring and direct
//! left-recursion elimination.
//!
//! Both passes keep the start symbol's rules first so rule 0 still names the
//! start symbol afterwards.

use super::rules::Rule;
use super::EPSILON;
use rustc_hash::FxHashSet;

/// Factor out common first symbols until no two rules of a nonterminal
/// start with the same symbol.
///
/// `A -> x α | x β` becomes `A -> x Ax`, `Ax -> α | β`. The new rule sits
/// where the first member of the group was and the `Ax` rules follow it.
pub fn left_factor(mut rules: Vec<Rule>) -> Vec<Rule> {
    while let Some(group) = find_common_prefix(&rules) {
        let first = group[0];
        let left = rules[first].left.clone();
        let prefix = rules[first].right[0].clone();
        let factored = fresh_name(&rules, format!("{left}{prefix}"));

        let mut tails: Vec<Rule> = Vec::with_capacity(group.len());
        for &k in &group {
            let rest = &rules[k].right[1..];
            let right = if rest.is_empty() {
                vec![EPSILON.to_string()]
            } else {
                rest.to_vec()
            };
            let tail = Rule {
                left: factored.clone(),
                right,
            };
            if !tails.contains(&tail) {
                tails.push(tail);
            }
        }

        log::debug!(
            "left-factoring {} rules of {} on {} into {}",
            group.len(),
            left,
            prefix,
            factored
        );

        let head = Rule {
            left,
            right: vec![prefix, factored],
        };
        let mut out = Vec::with_capacity(rules.len() + 1);
        let mut tails = Some(tails);
        for (i, rule) in rules.into_iter().enumerate() {
            if i == first {
                out.push(head.clone());
                out.extend(tails.take().unwrap_or_default());
            } else if !group.contains(&i) {
                out.push(rule);
            }
        }
        rules = out;
    }
    rules
}

/// Indices of the first group of two or more rules sharing left side and
/// first symbol. `ε` is never a shared prefix.
fn find_common_prefix(rules: &[Rule]) -> Option<Vec<usize>> {
    for (i, rule) in rules.iter().enumerate() {
        let Some(head) = rule.right.first() else {
            continue;
        };
        if head == EPSILON {
            continue;
        }
        let group: Vec<usize> = std::iter::once(i)
            .chain(
                rules
                    .iter()
                    .enumerate()
                    .skip(i + 1)
                    .filter(|(_, other)| {
                        other.left == rule.left && other.right.first() == Some(head)
                    })
                    .map(|(j, _)| j),
            )
            .collect();
        if group.len() > 1 {
            return Some(group);
        }
    }
    None
}

/// Rewrite direct left recursion into right recursion.
///
/// For each left-recursive `A`: `A -> β` becomes `A -> β A'`,
/// `A -> A α` becomes `A' -> α A'`, and `A' -> ε` is added. Rules of other
/// nonterminals pass through unchanged and in order.
pub fn remove_left_recursion(rules: Vec<Rule>) -> Vec<Rule> {
    let recursive: FxHashSet<&str> = rules
        .iter()
        .filter(|r| r.is_left_recursive())
        .map(|r| r.left.as_str())
        .collect();

    let mut visited: FxHashSet<&str> = FxHashSet::default();
    let mut out: Vec<Rule> = Vec::with_capacity(rules.len() + recursive.len() * 2);

    for rule in &rules {
        if !recursive.contains(rule.left.as_str()) {
            out.push(rule.clone());
            continue;
        }
        if !visited.insert(rule.left.as_str()) {
            continue;
        }

        let left = &rule.left;
        let prime = fresh_name_among(&[rules.as_slice(), out.as_slice()], format!("{left}'"));
        log::debug!("removing left recursion of {} via {}", left, prime);

        let mut primed = Vec::new();
        for member in rules.iter().filter(|r| &r.left == left) {
            if member.is_left_recursive() {
                let alpha = &member.right[1..];
                if alpha.iter().all(|s| s == EPSILON) {
                    // A -> A derives nothing new
                    continue;
                }
                let mut right = alpha.to_vec();
                right.push(prime.clone());
                primed.push(Rule {
                    left: prime.clone(),
                    right,
                });
            } else {
                let mut right: Vec<String> = member
                    .right
                    .iter()
                    .filter(|s| *s != EPSILON)
                    .cloned()
                    .collect();
                right.push(prime.clone());
                out.push(Rule {
                    left: left.clone(),
                    right,
                });
            }
        }
        out.extend(primed);
        out.push(Rule {
            left: prime,
            right: vec![EPSILON.to_string()],
        });
    }

    out
}

/// `base`, or `base` with primes appended until no rule uses the name.
fn fresh_name(rules: &[Rule], base: String) -> String {
    fresh_name_among(&[rules], base)
}

fn fresh_name_among(sets: &[&[Rule]], mut name: String) -> String {
    let taken = |name: &str| {
        sets.iter()
            .flat_map(|rules| rules.iter())
            .any(|r| r.left == name || r.right.iter().any(|s| s == name))
    };
    while taken(&name) {
        name.push('\'');
    }
    name
}
