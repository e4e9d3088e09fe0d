// Grammar processing tests: rewriting, sets and table construction

use llfront::diagnostics::Diagnostic;
use llfront::grammar::transform::{left_factor, remove_left_recursion};
use llfront::grammar::{
    parse_rules, rules_to_input, Grammar, Ll1Grammar, TableEntry, BUILTIN_GRAMMAR, END_MARKER,
    EPSILON,
};

const GRAMMARS: [&str; 4] = [
    BUILTIN_GRAMMAR,
    "E -> E PLUS T\nE -> T\nT -> T STAR F\nT -> F\nF -> LP E RP\nF -> ID",
    "S -> IF E THEN S\nS -> IF E THEN S ELSE S\nS -> OTHER\nE -> B",
    "A -> a b c\nA -> a b d\nA -> a e\nA -> f\nA -> A g",
];

#[test]
fn test_rule_text_round_trips() {
    for text in GRAMMARS {
        let once = rules_to_input(&parse_rules(text));
        let twice = rules_to_input(&parse_rules(&once));
        assert_eq!(once, twice);
    }
}

#[test]
fn test_left_factoring_is_idempotent() {
    for text in GRAMMARS {
        let once = left_factor(parse_rules(text));
        let twice = left_factor(once.clone());
        assert_eq!(once, twice);
    }
}

#[test]
fn test_no_left_recursion_after_elimination() {
    for text in GRAMMARS {
        let rules = remove_left_recursion(left_factor(parse_rules(text)));
        assert!(
            rules.iter().all(|r| r.right.first() != Some(&r.left)),
            "{}",
            rules_to_input(&rules)
        );
    }
}

#[test]
fn test_start_symbol_survives_normalization() {
    for text in GRAMMARS {
        let source = Grammar::parse(text).expect("grammar");
        let normalized = source.normalized();
        assert_eq!(source.start_symbol(), normalized.start_symbol());
    }
}

#[test]
fn test_nested_prefixes_are_factored() {
    let grammar = Grammar::parse("A -> a b c\nA -> a b d\nA -> a e\nA -> f").expect("grammar");
    let text = grammar.normalized().to_text();
    assert_eq!(
        text,
        "A -> a Aa\nAa -> b Aab\nAab -> c\nAab -> d\nAa -> e\nA -> f\n"
    );
}

#[test]
fn test_set_properties() {
    for text in GRAMMARS {
        let ll1 = Ll1Grammar::from_text(text).expect("grammar");
        let grammar = ll1.grammar();
        let terminals = grammar.terminals();

        for nt in grammar.nonterminals() {
            let first = ll1.sets().first(nt).expect("FIRST");
            let nullable = grammar.rules_for(nt).any(|(_, rule)| {
                ll1.sets().first_of(grammar, &rule.right).contains(EPSILON)
            });
            assert_eq!(first.contains(EPSILON), nullable, "FIRST({})", nt);

            let follow = ll1.sets().follow(nt).expect("FOLLOW");
            assert!(follow
                .iter()
                .all(|s| s == END_MARKER || terminals.contains(s)));
        }
    }
}

#[test]
fn test_dangling_else_conflict_reported_once() {
    let ll1 = Ll1Grammar::from_text(GRAMMARS[2]).expect("grammar");
    assert_eq!(ll1.conflicts().len(), 1);

    let Some(Diagnostic::GrammarConflict {
        terminal,
        existing,
        incoming,
        ..
    }) = ll1.conflicts().iter().next()
    else {
        panic!("expected a grammar conflict");
    };
    assert_eq!(terminal, "ELSE");
    assert!(existing < incoming);

    // the first rule written to the cell is kept
    let kept = ll1.conflicts().iter().next().and_then(|d| match d {
        Diagnostic::GrammarConflict { nonterminal, .. } => ll1.table().get(nonterminal, "ELSE"),
        _ => None,
    });
    assert_eq!(kept, Some(TableEntry::Rule(*existing)));
}

#[test]
fn test_builtin_table_reports() {
    let ll1 = Ll1Grammar::builtin();
    assert!(ll1.conflicts().is_empty());

    let rows = ll1.set_rows();
    let program = rows.iter().find(|r| r.nonterminal == "Program").expect("Program row");
    assert_eq!(program.follow, vec!["$", "RC"]);
    assert!(program.first.contains(&"TYPE".to_string()));
    assert!(program.first.contains(&EPSILON.to_string()));

    let select = ll1.select_rows();
    assert_eq!(select[0].production, "Program -> ε");
    assert_eq!(select[0].select, "$ RC");

    let nested = ll1.table().to_nested();
    let factor_id = select
        .iter()
        .position(|r| r.production == "Factor -> ID")
        .expect("rule");
    assert_eq!(nested["Factor"]["ID"], TableEntry::Rule(factor_id));
    assert_eq!(nested["Factor"]["SEMI"], TableEntry::Synch);
}
