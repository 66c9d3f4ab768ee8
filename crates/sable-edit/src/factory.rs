//! The wrapper cache: a bijection between live syntax nodes and wrappers.

use std::cell::RefCell;
use std::hash::Hash;

use rustc_hash::FxHashMap;
use sable_analysis::{Symbol, SymbolId};
use sable_syntax::{NodeKey, SyntaxNode, TreeId};

use crate::error::{EditError, Result};
use crate::node::Node;
use crate::symbol::SymbolRef;

/// A map whose keys can be swapped in place, preserving the value.
pub(crate) struct KeyedCache<K, V> {
    map: FxHashMap<K, V>,
}

impl<K: Copy + Eq + Hash, V: Clone> KeyedCache<K, V> {
    pub(crate) fn new() -> Self {
        Self { map: FxHashMap::default() }
    }

    pub(crate) fn get(&self, key: K) -> Option<V> {
        self.map.get(&key).cloned()
    }

    pub(crate) fn insert(&mut self, key: K, value: V) {
        self.map.insert(key, value);
    }

    /// Removes the entry; a miss is not an error.
    pub(crate) fn remove(&mut self, key: K) -> Option<V> {
        self.map.remove(&key)
    }

    /// Moves the value stored under `old` to `new`.
    pub(crate) fn replace_key(&mut self, old: K, new: K) -> Result<()> {
        let value = self
            .map
            .remove(&old)
            .ok_or_else(|| EditError::invalid_operation("cannot replace a key that is not cached"))?;
        self.map.insert(new, value);
        Ok(())
    }

    pub(crate) fn len(&self) -> usize {
        self.map.len()
    }

    pub(crate) fn retain(&mut self, keep: impl FnMut(&K, &mut V) -> bool) {
        self.map.retain(keep);
    }
}

/// Creates wrappers on demand and keeps them unique per live syntax node.
pub struct NodeFactory {
    nodes: RefCell<KeyedCache<NodeKey, Node>>,
    symbols: RefCell<KeyedCache<SymbolId, SymbolRef>>,
}

impl Default for NodeFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeFactory {
    pub fn new() -> Self {
        Self { nodes: RefCell::new(KeyedCache::new()), symbols: RefCell::new(KeyedCache::new()) }
    }

    /// The unique wrapper for `syntax`; created on first lookup.
    pub fn node_for(&self, syntax: &SyntaxNode) -> Node {
        if let Some(node) = self.nodes.borrow().get(syntax.key()) {
            return node;
        }

        let node = Node::new(syntax.clone());
        self.nodes.borrow_mut().insert(syntax.key(), node.clone());
        node
    }

    /// The wrapper for `key`, if one was created and not disposed.
    pub(crate) fn cached_node(&self, key: NodeKey) -> Option<Node> {
        self.nodes.borrow().get(key)
    }

    /// The unique wrapper for a symbol; created on first lookup.
    pub fn symbol_for(&self, symbol: &Symbol) -> SymbolRef {
        if let Some(wrapper) = self.symbols.borrow().get(symbol.id()) {
            return wrapper;
        }

        let wrapper = SymbolRef::new(symbol.clone());
        self.symbols.borrow_mut().insert(symbol.id(), wrapper.clone());
        wrapper
    }

    /// Deletes the wrapper's cache entry; a miss is a no-op.
    pub(crate) fn remove_from_cache(&self, node: &Node) {
        if let Ok(syntax) = node.syntax_node() {
            self.nodes.borrow_mut().remove(syntax.key());
        }
    }

    /// Rebinds a wrapper to a node of a newer tree: the old cache entry is
    /// deleted, the wrapper's pointer updated, and the new entry inserted, as
    /// one step.
    ///
    /// Mapping a syntax node to a second wrapper indicates a reconciliation
    /// bug and fails with `InvalidOperation`.
    pub(crate) fn replace_syntax_node(&self, node: &Node, new: SyntaxNode) -> Result<()> {
        let old_key = node.syntax_node()?.key();
        let mut nodes = self.nodes.borrow_mut();

        if nodes.get(new.key()).is_some_and(|existing| existing != *node) {
            return Err(EditError::invalid_operation(
                "a different wrapper is already registered for the replacement node",
            ));
        }

        nodes.replace_key(old_key, new.key())?;
        node.set_syntax(new);
        Ok(())
    }

    /// Evicts symbol wrappers whose declarations belong to a dropped tree.
    pub(crate) fn evict_symbols_of_tree(&self, tree: TreeId) {
        self.symbols
            .borrow_mut()
            .retain(|_, symbol| symbol.symbol().declaration().tree().id() != tree);
    }

    /// Number of live node wrappers. Exposed for invariant checks in tests.
    pub fn node_count(&self) -> usize {
        self.nodes.borrow().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_key_moves_the_value() {
        let mut cache: KeyedCache<u32, &str> = KeyedCache::new();
        cache.insert(1, "v");

        cache.replace_key(1, 2).unwrap();
        assert_eq!(cache.get(1), None);
        assert_eq!(cache.get(2), Some("v"));
    }

    #[test]
    fn replace_key_of_missing_entry_is_invalid() {
        let mut cache: KeyedCache<u32, &str> = KeyedCache::new();
        cache.insert(1, "v");

        let err = cache.replace_key(7, 8).unwrap_err();
        assert!(matches!(err, EditError::InvalidOperation(_)));
        assert_eq!(cache.get(1), Some("v"));
    }
}
