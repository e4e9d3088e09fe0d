//! Analyzer state and declaration handling
//!
//! [`SemanticAnalyzer`] walks the parse tree once. Statement lists are
//! followed iteratively through their trailing `Program` child; nested
//! bodies of control statements recurse. Expression and control-flow code
//! generation live in sibling modules as further `impl SemanticAnalyzer`
//! blocks.
//!
//! Missing or empty subtrees come from syntax-error recovery. They are
//! skipped without a further diagnostic.

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::parser::ast::AstNode;
use crate::semantic::code::{CodeBuffer, Instruction};
use crate::semantic::symbols::{SymbolTable, TypeDescriptor};
use serde::Serialize;

/// Everything one analysis produces.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Analysis {
    pub symbols: SymbolTable,
    pub code: CodeBuffer,
    pub diagnostics: Diagnostics,
}

pub struct SemanticAnalyzer {
    pub(crate) symbols: SymbolTable,
    pub(crate) code: CodeBuffer,
    pub(crate) diagnostics: Diagnostics,
    /// Number for the next temporary (`t1`, `t2`, ...)
    next_temp: usize,
}

impl Default for SemanticAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl SemanticAnalyzer {
    pub fn new() -> Self {
        SemanticAnalyzer {
            symbols: SymbolTable::new(),
            code: CodeBuffer::new(),
            diagnostics: Diagnostics::new(),
            next_temp: 1,
        }
    }

    /// Analyze the tree rooted at `root` and hand back the results.
    pub fn analyze(mut self, root: &AstNode) -> Analysis {
        self.program(root);
        log::info!(
            "semantic analysis: {} symbols, {} instructions, {} errors",
            self.symbols.len(),
            self.code.len(),
            self.diagnostics.len()
        );
        Analysis {
            symbols: self.symbols,
            code: self.code,
            diagnostics: self.diagnostics,
        }
    }

    pub(crate) fn new_temp(&mut self) -> String {
        let name = format!("t{}", self.next_temp);
        self.next_temp += 1;
        name
    }

    pub(crate) fn error(&mut self, line: usize, message: String) {
        self.diagnostics.push(Diagnostic::Semantic { line, message });
    }

    /// A statement list: every non-`Program` child is a statement, the
    /// `Program` child (if any) continues the list.
    pub(crate) fn program(&mut self, node: &AstNode) {
        let mut current = Some(node);
        while let Some(program) = current.take() {
            for child in &program.children {
                if child.is("Program") {
                    current = Some(child);
                } else {
                    self.statement(child);
                }
            }
        }
    }

    fn statement(&mut self, node: &AstNode) {
        match node.symbol.as_str() {
            "VariableDeclaration" => self.variable_declaration(node),
            "StructDeclaration" => self.struct_declaration(node),
            "IfStatement" => self.if_statement(node),
            "WhileStatement" => self.while_statement(node),
            "DoWhileStatement" => self.do_while_statement(node),
            "ForStatement" => self.for_statement(node),
            // SEMI and other separators
            _ => {}
        }
    }

    // VariableDeclaration -> TYPE ID Init | ID Init
    pub(crate) fn variable_declaration(&mut self, node: &AstNode) {
        match node.child(0) {
            Some(first) if first.is("TYPE") => self.declaration(node),
            Some(first) if first.is("ID") => self.assignment(node),
            _ => {}
        }
    }

    fn declaration(&mut self, node: &AstNode) {
        let (Some(type_name), Some(name)) = (
            node.child(0).and_then(AstNode::value_str),
            node.child(1).and_then(AstNode::value_str),
        ) else {
            return;
        };

        if self.symbols.contains(name) {
            self.error(node.line, format!("redeclaration of '{}'", name));
            return;
        }

        // Init -> LB INT RB Init, repeated, optionally ending in ASSIGNOP Expression
        let mut dims = Vec::new();
        let mut init = node.child(2);
        while let Some(suffix) = init {
            if !suffix.child(0).is_some_and(|c| c.is("LB")) {
                break;
            }
            let literal = suffix.child(1).and_then(AstNode::value_str).unwrap_or("");
            match parse_int_literal(literal) {
                Some(size) => dims.push(size),
                None => {
                    self.error(
                        suffix.line,
                        format!("invalid array size '{}' for '{}'", literal, name),
                    );
                    dims.push(0);
                }
            }
            init = suffix.child(3);
        }

        let ty = TypeDescriptor::array_of(TypeDescriptor::primitive(type_name), &dims);
        let is_array = ty.is_array();
        self.symbols.insert(name, ty);

        let Some(expression) = init.and_then(initializer) else {
            return;
        };
        if is_array {
            self.error(
                node.line,
                format!("array '{}' cannot be initialized with a scalar", name),
            );
            return;
        }
        self.store(expression, name);
    }

    fn assignment(&mut self, node: &AstNode) {
        let Some(name) = node.child(0).and_then(AstNode::value_str) else {
            return;
        };
        if !self.symbols.contains(name) {
            self.error(node.line, format!("undeclared identifier '{}'", name));
            return;
        }

        let Some(init) = node.child(1) else {
            return;
        };
        if init.child(0).is_some_and(|c| c.is("LB")) {
            self.error(
                node.line,
                format!("array suffix is not allowed when assigning to '{}'", name),
            );
            return;
        }
        if let Some(expression) = initializer(init) {
            self.store(expression, name);
        }
    }

    /// `name = expression` for an already-declared name.
    pub(crate) fn assign_to(&mut self, id: &AstNode, expression: &AstNode) {
        let Some(name) = id.value_str() else {
            return;
        };
        if !self.symbols.contains(name) {
            self.error(id.line, format!("undeclared identifier '{}'", name));
            return;
        }
        self.store(expression, name);
    }

    fn store(&mut self, expression: &AstNode, name: &str) {
        if let Some(place) = self.value(expression) {
            self.code.emit(Instruction::Copy {
                src: place,
                dst: name.to_string(),
            });
        }
    }

    // StructDeclaration -> STRUCT ID LC StructBody RC
    fn struct_declaration(&mut self, node: &AstNode) {
        let Some(name) = node.child(1).and_then(AstNode::value_str) else {
            return;
        };

        // StructBody -> TYPE ID SEMI StructBody | ε
        let mut fields: Vec<(String, TypeDescriptor)> = Vec::new();
        let mut body = node.child(3);
        while let Some(member) = body {
            let (Some(field_type), Some(field)) = (
                member.child(0).and_then(AstNode::value_str),
                member.child(1).and_then(AstNode::value_str),
            ) else {
                break;
            };
            if fields.iter().any(|(existing, _)| existing == field) {
                self.error(
                    member.line,
                    format!("duplicate field '{}' in struct '{}'", field, name),
                );
            } else {
                fields.push((field.to_string(), TypeDescriptor::primitive(field_type)));
            }
            body = member.child(3);
        }

        if !self.symbols.insert(name, TypeDescriptor::Record(fields)) {
            self.error(node.line, format!("redeclaration of '{}'", name));
        }
    }
}

/// The expression of an `Init -> ASSIGNOP Expression` node.
fn initializer(init: &AstNode) -> Option<&AstNode> {
    if init.child(0)?.is("ASSIGNOP") {
        init.child(1)
    } else {
        None
    }
}

/// Decimal, `0x` hexadecimal or leading-zero octal.
pub(crate) fn parse_int_literal(text: &str) -> Option<u64> {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).ok()
    } else if text.len() > 1 && text.starts_with('0') {
        u64::from_str_radix(&text[1..], 8).ok()
    } else {
        text.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Ll1Grammar;
    use crate::parser::{tokenize, PredictiveParser};

    fn analyze(source: &str) -> Analysis {
        let grammar = Ll1Grammar::builtin();
        let (tokens, _) = tokenize(source);
        let outcome = PredictiveParser::new(&grammar).parse(&tokens);
        assert!(outcome.diagnostics.is_empty(), "{:?}", outcome.diagnostics.messages());
        SemanticAnalyzer::new().analyze(&outcome.tree)
    }

    #[test]
    fn test_int_literals() {
        assert_eq!(parse_int_literal("42"), Some(42));
        assert_eq!(parse_int_literal("0x1F"), Some(31));
        assert_eq!(parse_int_literal("017"), Some(15));
        assert_eq!(parse_int_literal("0"), Some(0));
        assert_eq!(parse_int_literal("0x"), None);
        assert_eq!(parse_int_literal(""), None);
    }

    #[test]
    fn test_declaration_with_initializer() {
        let analysis = analyze("int a = 0;");
        assert!(analysis.diagnostics.is_empty());
        assert_eq!(analysis.symbols.render(), vec!["a: int"]);
        assert_eq!(
            analysis.code.render(),
            vec!["1: (=, 0, , t1)  t1 = 0", "2: (=, t1, , a)  a = t1"]
        );
    }

    #[test]
    fn test_redeclaration_reported_once() {
        let analysis = analyze("int a; int a;");
        assert_eq!(
            analysis.diagnostics.messages(),
            vec!["Semantic error at Line 1: redeclaration of 'a'"]
        );
        assert_eq!(analysis.symbols.len(), 1);
    }

    #[test]
    fn test_undeclared_assignment_is_skipped() {
        let analysis = analyze("x = 1;");
        assert_eq!(
            analysis.diagnostics.messages(),
            vec!["Semantic error at Line 1: undeclared identifier 'x'"]
        );
        assert!(analysis.code.is_empty());
    }

    #[test]
    fn test_array_dimensions_nest() {
        let analysis = analyze("int m[2][0x3];\nfloat v[010];");
        assert!(analysis.diagnostics.is_empty());
        assert_eq!(
            analysis.symbols.render(),
            vec!["m: array(2, array(3, int))", "v: array(8, float)"]
        );
    }

    #[test]
    fn test_array_misuse() {
        let analysis = analyze("int a[3] = 1;\nint b;\nb[1] = 2;");
        let messages = analysis.diagnostics.messages();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].contains("array 'a'"));
        assert!(messages[1].starts_with("Semantic error at Line 3"));
        assert!(analysis.code.is_empty());
    }

    #[test]
    fn test_struct_record() {
        let analysis = analyze("struct P { int x; float y; int x; };\nint P;");
        assert_eq!(analysis.symbols.render(), vec!["P: record((x, int), (y, float))"]);
        let messages = analysis.diagnostics.messages();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].contains("duplicate field 'x'"));
        assert_eq!(messages[1], "Semantic error at Line 2: redeclaration of 'P'");
    }

    #[test]
    fn test_temporaries_are_fresh() {
        let analysis = analyze("int a = 1; int b = 2;");
        let code = analysis.code.render();
        assert_eq!(code[0], "1: (=, 1, , t1)  t1 = 1");
        assert_eq!(code[2], "3: (=, 2, , t2)  t2 = 2");
    }
}
