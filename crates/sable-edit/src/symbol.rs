use std::rc::Rc;

use sable_analysis::Symbol;

use crate::node::Node;
use crate::workspace::Workspace;

/// Stable wrapper over a compiler symbol. Identity is preserved across
/// lookups through the factory's symbol cache.
#[derive(Clone)]
pub struct SymbolRef {
    inner: Rc<Symbol>,
}

impl SymbolRef {
    pub(crate) fn new(symbol: Symbol) -> Self {
        Self { inner: Rc::new(symbol) }
    }

    pub(crate) fn symbol(&self) -> &Symbol {
        &self.inner
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// The wrapper for the declaration this symbol names.
    pub fn declaration(&self, ws: &Workspace) -> Node {
        ws.factory().node_for(self.inner.declaration())
    }

    /// Follows an import alias to the symbol it renames.
    pub fn aliased(&self, ws: &Workspace) -> Option<SymbolRef> {
        let target = ws.checker().aliased_symbol(&self.inner)?;
        Some(ws.factory().symbol_for(&target))
    }
}

impl PartialEq for SymbolRef {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for SymbolRef {}

impl std::fmt::Debug for SymbolRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SymbolRef({:?})", self.inner)
    }
}
