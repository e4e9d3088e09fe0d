//! Control-flow code generation with backpatching.
//!
//! Every guard jumps when its condition holds. Forward targets are unknown
//! while the guarded code is being generated, so a placeholder `j` is
//! emitted and patched to the line after the code once it exists.

use crate::parser::ast::AstNode;
use crate::semantic::analyzer::SemanticAnalyzer;
use crate::semantic::code::Instruction;

impl SemanticAnalyzer {
    // IfStatement -> IF LP Expression RP LC Program RC ElsePart
    // ElsePart -> ELSE LC Program RC | ε
    pub(crate) fn if_statement(&mut self, node: &AstNode) {
        let Some(condition) = node.child(2) else {
            return;
        };

        let guard = self.guard(condition);
        let skip_true = self.code.emit(Instruction::Jump { target: None });
        self.code.patch(guard, skip_true + 1);

        if let Some(body) = node.child(5) {
            self.program(body);
        }

        let else_body = node.child(7).and_then(|part| part.child(2));
        match else_body {
            Some(body) => {
                let skip_false = self.code.emit(Instruction::Jump { target: None });
                self.code.patch(skip_true, self.code.next_line());
                self.program(body);
                self.code.patch(skip_false, self.code.next_line());
            }
            None => {
                self.code.patch(skip_true, self.code.next_line());
            }
        }
    }

    // WhileStatement -> WHILE LP Expression RP LC Program RC
    pub(crate) fn while_statement(&mut self, node: &AstNode) {
        let Some(condition) = node.child(2) else {
            return;
        };
        self.loop_with_exit(condition, node.child(5), None);
    }

    // DoWhileStatement -> DO LC Program RC WHILE LP Expression RP
    pub(crate) fn do_while_statement(&mut self, node: &AstNode) {
        let start = self.code.next_line();
        if let Some(body) = node.child(2) {
            self.program(body);
        }
        if let Some(condition) = node.child(6) {
            let guard = self.guard(condition);
            self.code.patch(guard, start);
        }
    }

    // ForStatement -> FOR LP ForInit SEMI Expression SEMI ForStep RP LC Program RC
    // ForInit -> VariableDeclaration | ε
    // ForStep -> ID ASSIGNOP Expression | ε
    pub(crate) fn for_statement(&mut self, node: &AstNode) {
        if let Some(init) = node.child(2).and_then(|n| n.child(0)) {
            self.variable_declaration(init);
        }
        let Some(condition) = node.child(4) else {
            return;
        };
        self.loop_with_exit(condition, node.child(9), node.child(6));
    }

    /// Guard, exit placeholder, body, optional step, jump back to the guard.
    fn loop_with_exit(&mut self, condition: &AstNode, body: Option<&AstNode>, step: Option<&AstNode>) {
        let start = self.code.next_line();
        let guard = self.guard(condition);
        let exit = self.code.emit(Instruction::Jump { target: None });
        self.code.patch(guard, exit + 1);

        if let Some(body) = body {
            self.program(body);
        }
        if let Some(step) = step {
            if let (Some(id), Some(expression)) = (step.child(0), step.child(2)) {
                self.assign_to(id, expression);
            }
        }

        self.code.emit(Instruction::Jump {
            target: Some(start),
        });
        self.code.patch(exit, self.code.next_line());
    }
}
