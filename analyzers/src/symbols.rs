//! Scoped symbol tables.
//!
//! Declaration entries live in an arena indexed by [`DeclId`]; identifiers
//! hold an optional index back into it. Scopes exist only while a language
//! walker runs; what survives is the arena plus the edges stored on the
//! identifiers, so no shared mutable graphs are ever built.

use crate::mast::{DeclId, Expr, IdentKind};
use std::collections::HashMap;

/// Canonical token string of a literal expression, used to compare
/// constants by value. Identifiers (including `iota`) yield `None`, which
/// makes implicit-value const groups incomparable by construction.
#[must_use]
pub fn literal_tokens(expr: &Expr) -> Option<String> {
    match expr {
        Expr::IntLit(text)
        | Expr::FloatLit(text)
        | Expr::ImaginaryLit(text)
        | Expr::StringLit(text)
        | Expr::CharLit(text) => Some(text.clone()),
        Expr::BoolLit(value) => Some(value.to_string()),
        Expr::Unary { op, operand } => {
            literal_tokens(operand).map(|tokens| format!("{op}{tokens}"))
        }
        Expr::Paren(inner) => literal_tokens(inner).map(|tokens| format!("({tokens})")),
        Expr::Binary { op, left, right } => match (literal_tokens(left), literal_tokens(right)) {
            (Some(left), Some(right)) => Some(format!("{left}{op}{right}")),
            _ => None,
        },
        _ => None,
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Visibility {
    Private,
    Public,
}

/// Which name universe a lookup searches. Labels are disjoint from
/// everything else; the same text may name both a label and a variable.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Namespace {
    Value,
    Type,
    Label,
}

/// One declaration entry.
///
/// The `const_value`, `struct_fields`, and `import_path` payloads are
/// denormalized copies recorded at declaration time; the equivalence
/// checker reads them without ever holding a reference into the tree.
#[derive(Clone, Debug)]
pub struct DeclEntry {
    pub name: String,
    pub kind: IdentKind,
    pub visibility: Visibility,
    pub is_const: bool,
    /// Whether the declaring walker permits renaming at all. Go struct
    /// fields, for example, are declared but never renamed because their
    /// uses cannot be linked without type information.
    pub renameable: bool,
    /// Set by the renamer.
    pub new_name: Option<String>,
    /// Canonical token string of a literal const value, when the value is
    /// a literal expression. Implicit-value const specs record `None`.
    pub const_value: Option<String>,
    /// Field names of a Go struct type declaration, in declaration order.
    pub struct_fields: Option<Vec<String>>,
    /// Unquoted import path of an import entry.
    pub import_path: Option<String>,
}

impl DeclEntry {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: IdentKind, visibility: Visibility) -> Self {
        Self {
            name: name.into(),
            kind,
            visibility,
            is_const: false,
            renameable: true,
            new_name: None,
            const_value: None,
            struct_fields: None,
            import_path: None,
        }
    }

    #[must_use]
    pub fn constant(name: impl Into<String>, visibility: Visibility) -> Self {
        Self {
            is_const: true,
            renameable: false,
            ..Self::new(name, IdentKind::Constant, visibility)
        }
    }

    /// Whether the renamer may assign this entry a synthetic name.
    #[must_use]
    pub fn renames(&self) -> bool {
        self.renameable && !self.is_const && self.visibility == Visibility::Private
    }
}

#[derive(Debug, Default)]
pub struct SymbolTable {
    pub entries: Vec<DeclEntry>,
}

impl SymbolTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, entry: DeclEntry) -> DeclId {
        self.entries.push(entry);
        self.entries.len() - 1
    }

    #[must_use]
    pub fn entry(&self, id: DeclId) -> &DeclEntry {
        &self.entries[id]
    }
}

#[derive(Debug, Default)]
struct Scope {
    values: HashMap<String, DeclId>,
    types: HashMap<String, DeclId>,
    labels: HashMap<String, DeclId>,
    /// Labels do not resolve past a function boundary.
    label_boundary: bool,
    /// Marks a class-body scope; `this.x` searches only these.
    class_body: bool,
}

impl Scope {
    fn map(&self, namespace: Namespace) -> &HashMap<String, DeclId> {
        match namespace {
            Namespace::Value => &self.values,
            Namespace::Type => &self.types,
            Namespace::Label => &self.labels,
        }
    }

    fn map_mut(&mut self, namespace: Namespace) -> &mut HashMap<String, DeclId> {
        match namespace {
            Namespace::Value => &mut self.values,
            Namespace::Type => &mut self.types,
            Namespace::Label => &mut self.labels,
        }
    }
}

/// A stack of lexical scopes. The bottom scope is the package (or module)
/// scope, shared across every file of the package.
#[derive(Debug)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
}

impl ScopeStack {
    #[must_use]
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::default()],
        }
    }

    pub fn push(&mut self) {
        self.scopes.push(Scope::default());
    }

    /// Pushes a scope that labels cannot resolve past (a function body).
    pub fn push_function(&mut self) {
        self.scopes.push(Scope {
            label_boundary: true,
            ..Scope::default()
        });
    }

    /// Pushes a class-body scope.
    pub fn push_class(&mut self) {
        self.scopes.push(Scope {
            class_body: true,
            ..Scope::default()
        });
    }

    pub fn pop(&mut self) {
        debug_assert!(self.scopes.len() > 1, "cannot pop the package scope");
        self.scopes.pop();
    }

    /// Declares `name` in the innermost scope.
    pub fn declare(&mut self, namespace: Namespace, name: &str, id: DeclId) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.map_mut(namespace).insert(name.to_owned(), id);
        }
    }

    /// Declares `name` in the bottom (package) scope.
    pub fn declare_package(&mut self, namespace: Namespace, name: &str, id: DeclId) {
        self.scopes[0].map_mut(namespace).insert(name.to_owned(), id);
    }

    /// Innermost-wins lookup. Label lookups stop at function boundaries.
    #[must_use]
    pub fn lookup(&self, namespace: Namespace, name: &str) -> Option<DeclId> {
        for scope in self.scopes.iter().rev() {
            if let Some(&id) = scope.map(namespace).get(name) {
                return Some(id);
            }
            if namespace == Namespace::Label && scope.label_boundary {
                return None;
            }
        }
        None
    }

    /// Lookup restricted to enclosing class-body scopes (and the package
    /// scope they hang from), for `this.x` / `super.x`.
    #[must_use]
    pub fn lookup_in_classes(&self, namespace: Namespace, name: &str) -> Option<DeclId> {
        for (index, scope) in self.scopes.iter().enumerate().rev() {
            if !(scope.class_body || index == 0) {
                continue;
            }
            if let Some(&id) = scope.map(namespace).get(name) {
                return Some(id);
            }
        }
        None
    }

    /// Whether the *innermost* scope already declares `name`. This is what
    /// Go's `:=` consults: names already present in the current scope are
    /// reassigned, not redeclared.
    #[must_use]
    pub fn declared_in_current(&self, namespace: Namespace, name: &str) -> Option<DeclId> {
        self.scopes
            .last()
            .and_then(|scope| scope.map(namespace).get(name).copied())
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::{DeclEntry, Namespace, ScopeStack, SymbolTable, Visibility};
    use crate::mast::IdentKind;

    #[test]
    fn shadowing_innermost_wins() {
        let mut table = SymbolTable::new();
        let outer = table.declare(DeclEntry::new("x", IdentKind::Variable, Visibility::Private));
        let inner = table.declare(DeclEntry::new("x", IdentKind::Variable, Visibility::Private));

        let mut scopes = ScopeStack::new();
        scopes.push_function();
        scopes.declare(Namespace::Value, "x", outer);
        scopes.push();
        scopes.declare(Namespace::Value, "x", inner);

        assert_eq!(Some(inner), scopes.lookup(Namespace::Value, "x"));
        scopes.pop();
        assert_eq!(Some(outer), scopes.lookup(Namespace::Value, "x"));
    }

    #[test]
    fn labels_are_disjoint_and_function_bounded() {
        let mut table = SymbolTable::new();
        let label = table.declare(DeclEntry::new("x", IdentKind::Label, Visibility::Private));

        let mut scopes = ScopeStack::new();
        scopes.push_function();
        scopes.declare(Namespace::Label, "x", label);

        assert_eq!(Some(label), scopes.lookup(Namespace::Label, "x"));
        assert_eq!(None, scopes.lookup(Namespace::Value, "x"));

        scopes.push_function();
        assert_eq!(None, scopes.lookup(Namespace::Label, "x"));
    }

    #[test]
    fn constants_never_rename() {
        let entry = DeclEntry::constant("limit", Visibility::Private);
        assert!(!entry.renames());
    }
}
