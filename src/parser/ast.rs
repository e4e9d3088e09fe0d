// AST (Abstract Syntax Tree) definitions for the predictive parser

use serde::Serialize;

/// A parse-tree node labelled with a grammar symbol.
///
/// Interior nodes carry nonterminals and own their children. Leaves carry
/// matched terminals and the token's semantic value. A nonterminal that was
/// expanded with an `ε` rule, or discarded during error recovery, is a node
/// with no children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AstNode {
    #[serde(rename = "type")]
    pub symbol: String,
    pub line: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<AstNode>,
}

impl AstNode {
    pub fn new(symbol: &str, line: usize) -> Self {
        AstNode {
            symbol: symbol.to_string(),
            line,
            value: None,
            children: Vec::new(),
        }
    }

    pub fn is(&self, symbol: &str) -> bool {
        self.symbol == symbol
    }

    pub fn child(&self, index: usize) -> Option<&AstNode> {
        self.children.get(index)
    }

    /// Semantic value of a matched leaf.
    pub fn value_str(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Number of nodes in the tree, this one included.
    pub fn size(&self) -> usize {
        let mut count = 0;
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            count += 1;
            pending.extend(node.children.iter());
        }
        count
    }

    /// Preorder listing, one `symbol(line)` per line, four spaces per level.
    pub fn render(&self) -> Vec<String> {
        let mut lines = Vec::new();
        let mut pending = vec![(self, 0)];
        while let Some((node, depth)) = pending.pop() {
            let indent = "    ".repeat(depth);
            match &node.value {
                Some(value) => lines.push(format!("{}{}({}) {}", indent, node.symbol, node.line, value)),
                None => lines.push(format!("{}{}({})", indent, node.symbol, node.line)),
            }
            pending.extend(node.children.iter().rev().map(|child| (child, depth + 1)));
        }
        lines
    }
}

// Statement lists nest one level per statement, so a long program is a deep
// tree. Children are freed from a worklist instead of recursively.
impl Drop for AstNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AstNode {
        let mut root = AstNode::new("Program", 1);
        let mut decl = AstNode::new("VariableDeclaration", 1);
        let mut id = AstNode::new("ID", 1);
        id.value = Some("a".to_string());
        decl.children.push(AstNode::new("TYPE", 1));
        decl.children.push(id);
        root.children.push(decl);
        root.children.push(AstNode::new("Program", 2));
        root
    }

    #[test]
    fn test_child_access() {
        let root = sample();
        let id = root.child(0).and_then(|decl| decl.child(1)).unwrap();
        assert_eq!(id.value_str(), Some("a"));
        assert!(root.child(5).is_none());
        assert_eq!(root.size(), 5);
    }

    #[test]
    fn test_deep_tree_is_measured_and_dropped() {
        let depth = 200_000;
        let mut tree = AstNode::new("Program", depth);
        for line in (1..depth).rev() {
            let mut parent = AstNode::new("Program", line);
            parent.children.push(AstNode::new("SEMI", line));
            parent.children.push(tree);
            tree = parent;
        }
        assert_eq!(tree.size(), 2 * depth - 1);
        drop(tree);
    }

    #[test]
    fn test_render() {
        assert_eq!(
            sample().render(),
            vec![
                "Program(1)",
                "    VariableDeclaration(1)",
                "        TYPE(1)",
                "        ID(1) a",
                "    Program(2)",
            ]
        );
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["type"], "Program");
        assert_eq!(json["children"][0]["children"][1]["value"], "a");
        assert!(json["children"][1].get("children").is_none());
    }
}
