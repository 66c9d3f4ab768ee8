//! Reconciliation: walk the old and new trees in lock-step and rebind
//! surviving wrappers to the new tree's nodes.
//!
//! Wrappers scheduled for removal are disposed before their structural
//! neighbors are paired, so the cache never holds an entry for a node that
//! also has a fresh wrapper candidate.

use sable_syntax::SyntaxKind::SYNTAX_LIST;
use sable_syntax::{NodeKey, SyntaxNode};

use crate::error::{EditError, Result};
use crate::node::Node;
use crate::workspace::Workspace;

pub(crate) trait NodeHandler {
    fn handle(&self, ws: &Workspace, current: &SyntaxNode, new: &SyntaxNode) -> Result<()>;
}

fn ensure_same_kind(current: &SyntaxNode, new: &SyntaxNode) -> Result<()> {
    if current.kind() == new.kind() {
        Ok(())
    } else {
        Err(EditError::tree_replacement(format!(
            "expected a node of kind {:?}, the reparsed tree has {:?}",
            current.kind(),
            new.kind(),
        )))
    }
}

/// Moves the wrapper for `current`, if one exists, onto `new`.
fn rebind(ws: &Workspace, current: &SyntaxNode, new: &SyntaxNode) -> Result<()> {
    if let Some(wrapper) = ws.factory().cached_node(current.key()) {
        ws.factory().replace_syntax_node(&wrapper, new.clone())?;
    }
    Ok(())
}

/// Assumes `current` and `new` have the same shape and rebinds the whole
/// subtree pairwise.
pub(crate) struct StraightReplacementHandler;

impl NodeHandler for StraightReplacementHandler {
    fn handle(&self, ws: &Workspace, current: &SyntaxNode, new: &SyntaxNode) -> Result<()> {
        ensure_same_kind(current, new)?;
        if current.child_count() != new.child_count() {
            return Err(EditError::tree_replacement(format!(
                "child count changed under {:?}: {} before, {} after",
                current.kind(),
                current.child_count(),
                new.child_count(),
            )));
        }

        for (current_child, new_child) in current.children().zip(new.children()) {
            self.handle(ws, &current_child, &new_child)?;
        }
        rebind(ws, current, new)
    }
}

/// Handles the direct parent of an insertion: children before `child_index`
/// pair straight, `insert_count` new children are left for lazy wrapping,
/// replaced wrappers are disposed, and the remainder pairs straight again.
pub(crate) struct ChildIndexHandler {
    pub(crate) child_index: usize,
    pub(crate) insert_count: usize,
    pub(crate) replacing: Vec<Node>,
}

impl NodeHandler for ChildIndexHandler {
    fn handle(&self, ws: &Workspace, current: &SyntaxNode, new: &SyntaxNode) -> Result<()> {
        ensure_same_kind(current, new)?;

        let current_children: Vec<_> = current.children().collect();
        let new_children: Vec<_> = new.children().collect();
        let replaced = self.replacing.len();

        if self.child_index + replaced > current_children.len()
            || current_children.len() - replaced + self.insert_count != new_children.len()
        {
            return Err(EditError::tree_replacement(format!(
                "the reparsed {:?} has {} children; expected {} after inserting {} and \
                 removing {} at index {}",
                current.kind(),
                new_children.len(),
                current_children.len() - replaced + self.insert_count,
                self.insert_count,
                replaced,
                self.child_index,
            )));
        }

        let straight = StraightReplacementHandler;
        for (current_child, new_child) in
            current_children.iter().zip(&new_children).take(self.child_index)
        {
            straight.handle(ws, current_child, new_child)?;
        }

        // New children in [child_index, child_index + insert_count) have no
        // wrappers yet; callers resolve them lazily.

        for node in &self.replacing {
            node.dispose(ws);
        }

        for (current_child, new_child) in current_children[self.child_index + replaced..]
            .iter()
            .zip(&new_children[self.child_index + self.insert_count..])
        {
            straight.handle(ws, current_child, new_child)?;
        }

        rebind(ws, current, new)
    }
}

/// Removes the child at `child_index` while lifting the contents of its own
/// syntax list into this node's child sequence.
pub(crate) struct UnwrapParentHandler {
    pub(crate) child_index: usize,
}

impl NodeHandler for UnwrapParentHandler {
    fn handle(&self, ws: &Workspace, current: &SyntaxNode, new: &SyntaxNode) -> Result<()> {
        ensure_same_kind(current, new)?;

        let current_children: Vec<_> = current.children().collect();
        let new_children: Vec<_> = new.children().collect();

        let unwrapped = current_children.get(self.child_index).ok_or_else(|| {
            EditError::tree_replacement("no child at the unwrap index")
        })?;
        let inner_list = unwrapped
            .children()
            .find(|child| child.kind() == SYNTAX_LIST)
            .ok_or_else(|| EditError::tree_replacement("the unwrapped node has no syntax list"))?;
        let inner_children: Vec<_> = inner_list.children().collect();

        if current_children.len() - 1 + inner_children.len() != new_children.len() {
            return Err(EditError::tree_replacement(format!(
                "the reparsed {:?} has {} children; expected {} after unwrapping",
                current.kind(),
                new_children.len(),
                current_children.len() - 1 + inner_children.len(),
            )));
        }

        let straight = StraightReplacementHandler;
        for (current_child, new_child) in
            current_children.iter().zip(&new_children).take(self.child_index)
        {
            straight.handle(ws, current_child, new_child)?;
        }

        // The lifted statements keep their wrappers.
        for (inner_child, new_child) in
            inner_children.iter().zip(&new_children[self.child_index..])
        {
            straight.handle(ws, inner_child, new_child)?;
        }

        // Everything else under the unwrapped node is gone. The list itself
        // is disposed shallowly; its children were just rebound.
        let obsolete = collect_skipping(unwrapped, inner_list.key());
        for node in obsolete.iter().rev() {
            if let Some(wrapper) = ws.factory().cached_node(node.key()) {
                wrapper.dispose_only_this(ws);
            }
        }
        if let Some(wrapper) = ws.factory().cached_node(inner_list.key()) {
            wrapper.dispose_only_this(ws);
        }

        for (current_child, new_child) in current_children[self.child_index + 1..]
            .iter()
            .zip(&new_children[self.child_index + inner_children.len()..])
        {
            straight.handle(ws, current_child, new_child)?;
        }

        rebind(ws, current, new)
    }
}

/// Preorder nodes of `root`'s subtree, with the subtree under `skip` left out.
fn collect_skipping(root: &SyntaxNode, skip: NodeKey) -> Vec<SyntaxNode> {
    let mut collected = Vec::new();
    let mut stack = vec![root.clone()];
    while let Some(node) = stack.pop() {
        if node.key() == skip {
            continue;
        }
        for child in node.children().rev() {
            stack.push(child);
        }
        collected.push(node);
    }
    collected
}

/// Walks from the root pairing nodes straight, and delegates to the inner
/// handler at the edit's parent node. This is what rebinds every ancestor
/// (and all untouched subtrees) after a reparse.
pub(crate) struct ParentFinderHandler<'h, H> {
    pub(crate) target: NodeKey,
    pub(crate) inner: &'h H,
}

impl<H: NodeHandler> NodeHandler for ParentFinderHandler<'_, H> {
    fn handle(&self, ws: &Workspace, current: &SyntaxNode, new: &SyntaxNode) -> Result<()> {
        if current.key() == self.target {
            return self.inner.handle(ws, current, new);
        }

        ensure_same_kind(current, new)?;
        if current.child_count() != new.child_count() {
            return Err(EditError::tree_replacement(format!(
                "child count changed under {:?} outside the edited range",
                current.kind(),
            )));
        }

        for (current_child, new_child) in current.children().zip(new.children()) {
            self.handle(ws, &current_child, &new_child)?;
        }
        rebind(ws, current, new)
    }
}
