//! Expression code generation
//!
//! After normalization every precedence level has the same shape: an
//! operand followed by a tail. A tail is empty (`ε`), starts with the
//! operator leaf itself (`Expression' -> OR Conjunction Expression'`,
//! `RelationSum -> RELOP Sum`), or starts with a factored operator group
//! (`Sum' -> SumSum Sum'` with `SumSum -> PLUS Term`). Operands fold left to
//! right through the tail, so `a - b - c` is `(a - b) - c`.

use crate::parser::ast::AstNode;
use crate::semantic::analyzer::SemanticAnalyzer;
use crate::semantic::code::Instruction;
use crate::semantic::symbols::TypeDescriptor;

/// Terminal categories that act as binary operators, with their code op.
fn operator(node: &AstNode) -> Option<&str> {
    let op = match node.symbol.as_str() {
        "OR" => "||",
        "AND" => "&&",
        "PLUS" => "+",
        "MINUS" => "-",
        "STAR" => "*",
        "DIV" => "/",
        "MOD" => "%",
        "RELOP" => return node.value_str(),
        _ => return None,
    };
    Some(op)
}

fn is_relational(op: &str) -> bool {
    matches!(op, "<" | "<=" | ">" | ">=" | "==" | "!=")
}

/// A value an expression produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Operand {
    /// Name, literal or temporary holding the value
    pub place: String,
    /// `None` when the type is unknown (undeclared name)
    pub ty: Option<TypeDescriptor>,
    /// True when an instruction was emitted to produce it
    pub computed: bool,
}

impl SemanticAnalyzer {
    /// Generate code for `node` and return where its value lives. A bare
    /// leaf is copied into a fresh temporary first.
    pub(crate) fn value(&mut self, node: &AstNode) -> Option<String> {
        let operand = self.operand(node)?;
        if operand.computed {
            return Some(operand.place);
        }
        let temp = self.new_temp();
        self.code.emit(Instruction::Copy {
            src: operand.place,
            dst: temp.clone(),
        });
        Some(temp)
    }

    /// Generate a control-flow guard and return the line of its jump, whose
    /// target is left for the caller to patch.
    ///
    /// A lone relational comparison becomes one `j<op>`; anything else is
    /// evaluated and tested with `jnz`.
    pub(crate) fn guard(&mut self, node: &AstNode) -> usize {
        // Operands lost to recovery read as 0 so the jump is still emitted
        // and patching stays well-defined.
        let place = |operand: Option<Operand>| operand.map_or_else(|| "0".to_string(), |o| o.place);

        if let Some((lhs, op, line, rhs)) = comparison(node) {
            let left = self.operand(lhs);
            let right = self.operand(rhs);
            if let (Some(l), Some(r)) = (&left, &right) {
                self.check_types(line, l, r);
            }
            return self.code.emit(Instruction::CondJump {
                op: op.to_string(),
                lhs: place(left),
                rhs: place(right),
                target: None,
            });
        }

        let cond = self.value(node).unwrap_or_else(|| "0".to_string());
        self.code.emit(Instruction::JumpNonZero { cond, target: None })
    }

    pub(crate) fn operand(&mut self, node: &AstNode) -> Option<Operand> {
        if node.children.is_empty() {
            return self.leaf(node);
        }
        if node.child(0).is_some_and(|c| c.is("LP")) {
            return self.operand(node.child(1)?);
        }

        let mut children = node.children.iter();
        let first = children.next()?;
        let mut acc = self.operand(first);
        for tail in children {
            acc = self.fold(acc, tail);
        }
        acc
    }

    fn leaf(&mut self, node: &AstNode) -> Option<Operand> {
        let value = node.value_str()?;
        let ty = match node.symbol.as_str() {
            "INT" => Some(TypeDescriptor::primitive("int")),
            "FLOAT" => Some(TypeDescriptor::primitive("float")),
            "ID" => {
                let ty = self.symbols.get(value).cloned();
                if ty.is_none() {
                    self.error(node.line, format!("undeclared identifier '{}'", value));
                }
                ty
            }
            _ => return None,
        };
        Some(Operand {
            place: value.to_string(),
            ty,
            computed: false,
        })
    }

    /// Apply one tail to the accumulated left operand.
    fn fold(&mut self, mut acc: Option<Operand>, tail: &AstNode) -> Option<Operand> {
        let mut current = Some(tail);
        while let Some(node) = current.take() {
            let Some(head) = node.child(0) else {
                break;
            };

            if let Some(op) = operator(head) {
                // Tail -> op operand [Tail]
                let rhs = node.child(1).and_then(|n| self.operand(n));
                acc = self.binary(acc, op, head.line, rhs);
                current = node.child(2);
            } else if let Some(op_leaf) = head.child(0).filter(|c| operator(c).is_some()) {
                // Tail -> Group Tail, Group -> op operand
                let rhs = head.child(1).and_then(|n| self.operand(n));
                let op = operator(op_leaf).unwrap_or_default();
                acc = self.binary(acc, op, op_leaf.line, rhs);
                current = node.child(1);
            } else {
                break;
            }
        }
        acc
    }

    fn binary(
        &mut self,
        lhs: Option<Operand>,
        op: &str,
        line: usize,
        rhs: Option<Operand>,
    ) -> Option<Operand> {
        let (lhs, rhs) = match (lhs, rhs) {
            (Some(lhs), Some(rhs)) => (lhs, rhs),
            (lhs, rhs) => return lhs.or(rhs),
        };
        self.check_types(line, &lhs, &rhs);

        let ty = if is_relational(op) || op == "&&" || op == "||" {
            Some(TypeDescriptor::primitive("int"))
        } else {
            lhs.ty.clone().or(rhs.ty.clone())
        };
        let dst = self.new_temp();
        self.code.emit(Instruction::Binary {
            op: op.to_string(),
            lhs: lhs.place,
            rhs: rhs.place,
            dst: dst.clone(),
        });
        Some(Operand {
            place: dst,
            ty,
            computed: true,
        })
    }

    fn check_types(&mut self, line: usize, lhs: &Operand, rhs: &Operand) {
        if let (Some(left), Some(right)) = (&lhs.ty, &rhs.ty) {
            if left != right {
                self.error(line, format!("type mismatch: {} vs {}", left, right));
            }
        }
    }
}

/// Find a guard of the form `operand RELOP operand` with nothing else
/// around it, looking through parentheses and empty tails.
fn comparison(node: &AstNode) -> Option<(&AstNode, &str, usize, &AstNode)> {
    let mut node = node;
    loop {
        match node.children.as_slice() {
            [lp, inner, _] if lp.is("LP") => node = inner,
            [only] if !only.children.is_empty() => node = only,
            [operand, tail] if tail.children.is_empty() => node = operand,
            [lhs, tail] => {
                return match tail.children.as_slice() {
                    [relop, rhs] if relop.is("RELOP") => {
                        relop.value_str().map(|op| (lhs, op, relop.line, rhs))
                    }
                    _ => None,
                };
            }
            _ => return None,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::grammar::Ll1Grammar;
    use crate::parser::{tokenize, PredictiveParser};
    use crate::semantic::{Analysis, SemanticAnalyzer};

    fn analyze(source: &str) -> Analysis {
        let grammar = Ll1Grammar::builtin();
        let (tokens, _) = tokenize(source);
        let outcome = PredictiveParser::new(&grammar).parse(&tokens);
        assert!(outcome.diagnostics.is_empty(), "{:?}", outcome.diagnostics.messages());
        SemanticAnalyzer::new().analyze(&outcome.tree)
    }

    #[test]
    fn test_precedence_and_left_association() {
        let analysis = analyze("int a = 1; int b = a - 2 - 3 * a;");
        assert!(analysis.diagnostics.is_empty());
        assert_eq!(
            analysis.code.render()[2..],
            [
                "3: (-, a, 2, t2)  t2 = a - 2",
                "4: (*, 3, a, t3)  t3 = 3 * a",
                "5: (-, t2, t3, t4)  t4 = t2 - t3",
                "6: (=, t4, , b)  b = t4",
            ]
        );
    }

    #[test]
    fn test_parentheses_and_logic() {
        let analysis = analyze("int a; int b; a = (a + 1) * b || a < b;");
        assert_eq!(
            analysis.code.render(),
            vec![
                "1: (+, a, 1, t1)  t1 = a + 1",
                "2: (*, t1, b, t2)  t2 = t1 * b",
                "3: (<, a, b, t3)  t3 = a < b",
                "4: (||, t2, t3, t4)  t4 = t2 || t3",
                "5: (=, t4, , a)  a = t4",
            ]
        );
    }

    #[test]
    fn test_type_mismatch_continues() {
        let analysis = analyze("int a; float f; a = a + f % 2;");
        let messages = analysis.diagnostics.messages();
        // f % 2 is float vs int, then a + (float) is int vs float
        assert_eq!(
            messages,
            vec![
                "Semantic error at Line 1: type mismatch: float vs int",
                "Semantic error at Line 1: type mismatch: int vs float",
            ]
        );
        assert_eq!(analysis.code.len(), 3);
    }

    #[test]
    fn test_undeclared_operand_has_unknown_type() {
        let analysis = analyze("float f; f = f + y;");
        assert_eq!(
            analysis.diagnostics.messages(),
            vec!["Semantic error at Line 1: undeclared identifier 'y'"]
        );
        assert_eq!(analysis.code.render()[0], "1: (+, f, y, t1)  t1 = f + y");
    }

    #[test]
    fn test_single_token_copies_into_temporary() {
        let analysis = analyze("float f = 2.5;");
        assert_eq!(
            analysis.code.render(),
            vec!["1: (=, 2.5, , t1)  t1 = 2.5", "2: (=, t1, , f)  f = t1"]
        );
    }
}
