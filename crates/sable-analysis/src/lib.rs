//! Name binding and symbol queries over sable syntax trees.
//!
//! The checker computes per-tree bindings lazily and caches them by tree id.
//! Symbols are identity values: two queries that land on the same declaration
//! return the same symbol.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU32, Ordering};

use rustc_hash::FxHashMap;
use sable_syntax::SyntaxKind::{self, *};
use sable_syntax::{NodeKey, SyntaxNode, TreeId};

/// Stable identity of a symbol, usable as a cache key.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct SymbolId(u32);

impl SymbolId {
    fn next() -> Self {
        static NEXT: AtomicU32 = AtomicU32::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// A named declaration. Cheap to clone; equality is identity.
#[derive(Clone)]
pub struct Symbol {
    inner: Rc<SymbolData>,
}

struct SymbolData {
    id: SymbolId,
    name: String,
    declaration: SyntaxNode,
}

impl Symbol {
    fn new(name: String, declaration: SyntaxNode) -> Self {
        Self { inner: Rc::new(SymbolData { id: SymbolId::next(), name, declaration }) }
    }

    pub fn id(&self) -> SymbolId {
        self.inner.id
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The declaration node this symbol was created for.
    pub fn declaration(&self) -> &SyntaxNode {
        &self.inner.declaration
    }

    pub fn is_alias(&self) -> bool {
        self.inner.declaration.kind() == IMPORT_ALIAS
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for Symbol {}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({:?}, {:?})", self.inner.id, self.inner.name)
    }
}

/// Returns true for kinds that declare a name.
fn is_declaration(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        CLASS_DECL
            | FUNCTION_DECL
            | NAMESPACE_DECL
            | VARIABLE_DECL
            | PARAM
            | METHOD_DECL
            | PROPERTY_DECL
            | IMPORT_ALIAS
    )
}

/// Returns true for kinds that open a lexical scope.
fn is_scope(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SOURCE_FILE | NAMESPACE_DECL | CLASS_DECL | FUNCTION_DECL | METHOD_DECL | BLOCK
    )
}

/// The name token of a declaration: its first direct `IDENT` child.
fn declared_name(declaration: &SyntaxNode) -> Option<SyntaxNode> {
    declaration.children().find(|child| child.kind() == IDENT)
}

struct FileBindings {
    by_declaration: FxHashMap<NodeKey, Symbol>,
}

impl FileBindings {
    fn compute(root: &SyntaxNode) -> Self {
        let mut by_declaration = FxHashMap::default();
        for node in root.preorder() {
            if !is_declaration(node.kind()) {
                continue;
            }
            if let Some(name) = declared_name(&node) {
                by_declaration
                    .insert(node.key(), Symbol::new(name.text().to_owned(), node.clone()));
            }
        }
        Self { by_declaration }
    }
}

/// Lazy, per-tree symbol tables.
#[derive(Default)]
pub struct Checker {
    bindings: RefCell<FxHashMap<TreeId, Rc<FileBindings>>>,
}

impl Checker {
    pub fn new() -> Self {
        Self::default()
    }

    fn bindings_for(&self, node: &SyntaxNode) -> Rc<FileBindings> {
        let id = node.tree().id();
        if let Some(bindings) = self.bindings.borrow().get(&id) {
            return bindings.clone();
        }

        let mut root = node.clone();
        while let Some(parent) = root.parent() {
            root = parent;
        }
        let bindings = Rc::new(FileBindings::compute(&root));
        self.bindings.borrow_mut().insert(id, bindings.clone());
        bindings
    }

    /// Drops cached bindings for a tree that is no longer live.
    pub fn forget_tree(&self, id: TreeId) {
        self.bindings.borrow_mut().remove(&id);
    }

    /// The symbol for the declaration, declared name, or name reference at
    /// `node`, if any.
    pub fn symbol_at_location(&self, node: &SyntaxNode) -> Option<Symbol> {
        match node.kind() {
            kind if is_declaration(kind) => {
                self.bindings_for(node).by_declaration.get(&node.key()).cloned()
            }
            NAME_EXPR => {
                let ident = node.children().find(|child| child.kind() == IDENT)?;
                self.symbol_at_location(&ident)
            }
            IDENT => {
                let parent = node.parent()?;
                if is_declaration(parent.kind()) && declared_name(&parent).as_ref() == Some(node) {
                    return self.symbol_at_location(&parent);
                }
                // Member accesses need type information this layer does not
                // have, so only plain references resolve.
                if parent.kind() == MEMBER_EXPR {
                    return None;
                }
                self.resolve_name(node, node.text())
            }
            _ => None,
        }
    }

    /// Follows an import alias to the symbol it renames.
    ///
    /// Alias cycles resolve to `None`.
    pub fn aliased_symbol(&self, symbol: &Symbol) -> Option<Symbol> {
        let mut current = symbol.clone();
        for _ in 0..32 {
            if !current.is_alias() {
                return (current != *symbol).then_some(current);
            }
            // The alias target is the first identifier after the `=`.
            let declaration = current.declaration().clone();
            let mut after_eq = false;
            let target = declaration.children().find(|child| {
                if child.kind() == EQ {
                    after_eq = true;
                    return false;
                }
                after_eq && child.kind() == IDENT
            })?;
            let next = self.resolve_name(&declaration, target.text())?;
            if next == current {
                return None;
            }
            current = next;
        }
        None
    }

    /// Resolves `name` lexically, walking scopes outward from `from`.
    fn resolve_name(&self, from: &SyntaxNode, name: &str) -> Option<Symbol> {
        let bindings = self.bindings_for(from);
        for scope in std::iter::once(from.clone()).chain(from.ancestors()) {
            if !is_scope(scope.kind()) {
                continue;
            }
            for declaration in scope_declarations(&scope) {
                if declared_name(&declaration).is_some_and(|ident| ident.text() == name) {
                    return bindings.by_declaration.get(&declaration.key()).cloned();
                }
            }
        }
        None
    }
}

/// Declarations directly contained in a scope node.
fn scope_declarations(scope: &SyntaxNode) -> Vec<SyntaxNode> {
    let mut declarations = Vec::new();
    for child in scope.children() {
        match child.kind() {
            SYNTAX_LIST | PARAM_LIST | VARIABLE_STMT => {
                declarations.extend(scope_declarations(&child));
            }
            kind if is_declaration(kind) => declarations.push(child),
            _ => {}
        }
    }
    declarations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> SyntaxNode {
        sable_parse::parse("test.sable", text).root()
    }

    fn ident_at(root: &SyntaxNode, offset: u32) -> SyntaxNode {
        let node = root.descendant_at_pos(offset.into()).unwrap();
        assert_eq!(node.kind(), IDENT, "{node:?}");
        node
    }

    #[test]
    fn declaration_and_reference_share_a_symbol() {
        let root = parse("const x = 1;\nlet y = x + 1;");
        let checker = Checker::new();

        let declared = checker.symbol_at_location(&ident_at(&root, 6)).unwrap();
        assert_eq!(declared.name(), "x");
        assert_eq!(declared.declaration().kind(), VARIABLE_DECL);

        let referenced = checker.symbol_at_location(&ident_at(&root, 21)).unwrap();
        assert_eq!(declared, referenced);
    }

    #[test]
    fn scopes_shadow_outer_declarations() {
        let root = parse("const a = 1;\nfunction f(a: Number) {\n    return a;\n}");
        let checker = Checker::new();

        let outer = checker.symbol_at_location(&ident_at(&root, 6)).unwrap();
        let inner = checker.symbol_at_location(&ident_at(&root, 48)).unwrap();
        assert_ne!(outer, inner);
        assert_eq!(inner.declaration().kind(), PARAM);
    }

    #[test]
    fn import_aliases_resolve_to_their_target() {
        let root = parse("class A {}\nimport B = A;\n");
        let checker = Checker::new();

        let alias = checker.symbol_at_location(&ident_at(&root, 18)).unwrap();
        assert!(alias.is_alias());

        let target = checker.aliased_symbol(&alias).unwrap();
        assert_eq!(target.declaration().kind(), CLASS_DECL);
        assert_eq!(target.name(), "A");
        assert!(checker.aliased_symbol(&target).is_none());
    }

    #[test]
    fn same_location_returns_the_same_symbol() {
        let root = parse("class A {}");
        let checker = Checker::new();
        let ident = ident_at(&root, 6);
        assert_eq!(
            checker.symbol_at_location(&ident).unwrap(),
            checker.symbol_at_location(&ident).unwrap(),
        );
    }
}
