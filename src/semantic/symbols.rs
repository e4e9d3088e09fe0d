//! Type descriptors and the flat, insertion-ordered symbol table.

use rustc_hash::FxHashMap;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::fmt;

/// Type of a declared name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDescriptor {
    /// `int`, `float`, `char`, ...
    Primitive(String),
    /// One bracket pair; multi-dimensional arrays nest outermost first
    Array { size: u64, element: Box<TypeDescriptor> },
    /// Struct body: ordered `(field, type)` pairs
    Record(Vec<(String, TypeDescriptor)>),
}

impl TypeDescriptor {
    pub fn primitive(name: &str) -> Self {
        TypeDescriptor::Primitive(name.to_string())
    }

    /// Wrap `base` in one array layer per dimension, first dimension outermost.
    pub fn array_of(base: TypeDescriptor, dims: &[u64]) -> Self {
        dims.iter().rev().fold(base, |element, &size| TypeDescriptor::Array {
            size,
            element: Box::new(element),
        })
    }

    pub fn is_array(&self) -> bool {
        matches!(self, TypeDescriptor::Array { .. })
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Primitive(name) => f.write_str(name),
            TypeDescriptor::Array { size, element } => write!(f, "array({}, {})", size, element),
            TypeDescriptor::Record(fields) => {
                f.write_str("record(")?;
                for (i, (name, ty)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "({}, {})", name, ty)?;
                }
                f.write_str(")")
            }
        }
    }
}

impl Serialize for TypeDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One declared name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolEntry {
    pub name: String,
    pub ty: TypeDescriptor,
}

impl Serialize for SymbolEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("SymbolEntry", 2)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("type", &self.ty)?;
        state.end()
    }
}

/// Single flat namespace. Entries are never removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    entries: Vec<SymbolEntry>,
    index: FxHashMap<String, usize>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `name`. Returns `false` and leaves the table untouched if the
    /// name already exists.
    pub fn insert(&mut self, name: &str, ty: TypeDescriptor) -> bool {
        if self.index.contains_key(name) {
            return false;
        }
        self.index.insert(name.to_string(), self.entries.len());
        self.entries.push(SymbolEntry {
            name: name.to_string(),
            ty,
        });
        true
    }

    pub fn get(&self, name: &str) -> Option<&TypeDescriptor> {
        self.index.get(name).map(|&i| &self.entries[i].ty)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, SymbolEntry> {
        self.entries.iter()
    }

    /// `name: type`, one line per entry.
    pub fn render(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|e| format!("{}: {}", e.name, e.ty))
            .collect()
    }
}

impl Serialize for SymbolTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_array_display() {
        let ty = TypeDescriptor::array_of(TypeDescriptor::primitive("int"), &[2, 3]);
        assert_eq!(ty.to_string(), "array(2, array(3, int))");
        assert!(ty.is_array());
    }

    #[test]
    fn test_record_display() {
        let ty = TypeDescriptor::Record(vec![
            ("x".to_string(), TypeDescriptor::primitive("int")),
            ("y".to_string(), TypeDescriptor::primitive("float")),
        ]);
        assert_eq!(ty.to_string(), "record((x, int), (y, float))");
        assert_eq!(TypeDescriptor::Record(Vec::new()).to_string(), "record()");
    }

    #[test]
    fn test_insert_keeps_first_declaration() {
        let mut table = SymbolTable::new();
        assert!(table.insert("a", TypeDescriptor::primitive("int")));
        assert!(table.insert("b", TypeDescriptor::primitive("float")));
        assert!(!table.insert("a", TypeDescriptor::primitive("char")));

        assert_eq!(table.len(), 2);
        assert_eq!(table.get("a"), Some(&TypeDescriptor::primitive("int")));
        assert_eq!(table.render(), vec!["a: int", "b: float"]);
    }

    #[test]
    fn test_serializes_in_order() {
        let mut table = SymbolTable::new();
        table.insert("z", TypeDescriptor::primitive("int"));
        table.insert("a", TypeDescriptor::array_of(TypeDescriptor::primitive("char"), &[4]));

        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json[0]["name"], "z");
        assert_eq!(json[1]["type"], "array(4, char)");
    }
}
