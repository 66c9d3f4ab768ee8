//! The stable wrapper over one syntax node.
//!
//! A `Node` keeps its identity across reparses: edits rebind the wrapper to
//! the corresponding node of the new tree instead of handing out a new
//! wrapper. A wrapper whose node disappears from the tree is disposed;
//! after that, only identity comparison is allowed.
//!
//! Operations that need the cache, settings, or checker take the owning
//! [`Workspace`] explicitly.

use std::fmt;
use std::rc::Rc;

use sable_syntax::SyntaxKind::SYNTAX_LIST;
use sable_syntax::{SyntaxKind, SyntaxNode};
use text_size::TextSize;

use crate::error::{EditError, Result};
use crate::manipulation::insertion::{self, InsertRequest, Replacing};
use crate::position;
use crate::source_file::SourceFile;
use crate::symbol::SymbolRef;
use crate::workspace::Workspace;

#[derive(Clone)]
pub struct Node {
    inner: Rc<NodeInner>,
}

struct NodeInner {
    syntax: std::cell::RefCell<Option<SyntaxNode>>,
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Node {}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.inner.syntax.borrow() {
            Some(syntax) => write!(f, "Node({syntax:?})"),
            None => write!(f, "Node(<disposed>)"),
        }
    }
}

impl Node {
    pub(crate) fn new(syntax: SyntaxNode) -> Self {
        Self { inner: Rc::new(NodeInner { syntax: std::cell::RefCell::new(Some(syntax)) }) }
    }

    /// The underlying syntax node, or `InvalidOperation` if this wrapper was
    /// disposed. This is the bridge every other accessor builds on.
    pub fn syntax_node(&self) -> Result<SyntaxNode> {
        self.inner.syntax.borrow().clone().ok_or_else(|| {
            EditError::invalid_operation(
                "this node was removed from the tree or forgotten; only identity comparison \
                 is still possible",
            )
        })
    }

    #[track_caller]
    fn syntax(&self) -> SyntaxNode {
        match self.syntax_node() {
            Ok(syntax) => syntax,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.syntax.borrow().is_none()
    }

    pub(crate) fn set_syntax(&self, syntax: SyntaxNode) {
        *self.inner.syntax.borrow_mut() = Some(syntax);
    }

    pub(crate) fn clear_syntax(&self) {
        *self.inner.syntax.borrow_mut() = None;
    }

    // --- positional queries ----------------------------------------------

    pub fn kind(&self) -> SyntaxKind {
        self.syntax().kind()
    }

    /// Start including leading trivia.
    pub fn pos(&self) -> TextSize {
        self.syntax().pos()
    }

    /// Start excluding leading trivia.
    pub fn start(&self) -> TextSize {
        self.syntax().start()
    }

    pub fn end(&self) -> TextSize {
        self.syntax().end()
    }

    pub fn width(&self) -> TextSize {
        self.end() - self.start()
    }

    pub fn full_width(&self) -> TextSize {
        self.end() - self.pos()
    }

    pub fn contains_range(&self, pos: TextSize, end: TextSize) -> bool {
        self.pos() <= pos && end <= self.end()
    }

    pub fn text(&self) -> String {
        self.syntax().text().to_owned()
    }

    pub fn full_text(&self) -> String {
        self.syntax().full_text().to_owned()
    }

    // --- structural navigation -------------------------------------------

    /// The parent wrapper. Syntax lists are transparent: the parent of a
    /// statement is the block-like node, and the list shows up among that
    /// node's children instead.
    pub fn parent(&self, ws: &Workspace) -> Option<Node> {
        let mut parent = self.syntax().parent()?;
        if parent.kind() == SYNTAX_LIST {
            parent = parent.parent()?;
        }
        Some(ws.factory().node_for(&parent))
    }

    pub fn parent_or_err(&self, ws: &Workspace) -> Result<Node> {
        self.parent(ws)
            .ok_or_else(|| EditError::invalid_operation("the root node has no parent"))
    }

    pub fn children(&self, ws: &Workspace) -> Vec<Node> {
        self.children_iter(ws).collect()
    }

    /// Children in source order, wrapped lazily.
    pub fn children_iter<'ws>(&self, ws: &'ws Workspace) -> impl Iterator<Item = Node> + 'ws {
        self.syntax().children().map(move |child| ws.factory().node_for(&child))
    }

    pub fn child_count(&self) -> usize {
        self.syntax().child_count()
    }

    /// Ancestors from the parent up to the source file, syntax lists skipped.
    pub fn ancestors<'ws>(&self, ws: &'ws Workspace) -> impl Iterator<Item = Node> + 'ws {
        let mut current = self.syntax().parent();
        std::iter::from_fn(move || {
            loop {
                let node = current.take()?;
                current = node.parent();
                if node.kind() != SYNTAX_LIST {
                    return Some(ws.factory().node_for(&node));
                }
            }
        })
    }

    pub fn descendants(&self, ws: &Workspace) -> Vec<Node> {
        self.descendants_iter(ws).collect()
    }

    /// Descendants in preorder, this node excluded.
    pub fn descendants_iter<'ws>(&self, ws: &'ws Workspace) -> impl Iterator<Item = Node> + 'ws {
        self.syntax().preorder().skip(1).map(move |node| ws.factory().node_for(&node))
    }

    fn sibling_at(&self, ws: &Workspace, offset: isize) -> Option<Node> {
        let syntax = self.syntax();
        let parent = syntax.parent()?;
        let index = syntax.index_in_parent()?;
        let index = index.checked_add_signed(offset)?;
        Some(ws.factory().node_for(&parent.child(index)?))
    }

    /// The sibling before this node, within the parent syntax list if one
    /// wraps this node.
    pub fn previous_sibling(&self, ws: &Workspace) -> Option<Node> {
        self.sibling_at(ws, -1)
    }

    pub fn next_sibling(&self, ws: &Workspace) -> Option<Node> {
        self.sibling_at(ws, 1)
    }

    /// Previous siblings, closest first.
    pub fn previous_siblings(&self, ws: &Workspace) -> Vec<Node> {
        let mut siblings = Vec::new();
        let mut offset = -1;
        while let Some(sibling) = self.sibling_at(ws, offset) {
            siblings.push(sibling);
            offset -= 1;
        }
        siblings
    }

    pub fn next_siblings(&self, ws: &Workspace) -> Vec<Node> {
        let mut siblings = Vec::new();
        let mut offset = 1;
        while let Some(sibling) = self.sibling_at(ws, offset) {
            siblings.push(sibling);
            offset += 1;
        }
        siblings
    }

    /// The syntax list this node is a member of, if any.
    pub fn parent_syntax_list(&self, ws: &Workspace) -> Option<Node> {
        let parent = self.syntax().parent()?;
        (parent.kind() == SYNTAX_LIST).then(|| ws.factory().node_for(&parent))
    }

    /// The syntax list holding this node's variable-length children, walking
    /// through body-bearing layers: a class's member list, a function's
    /// statement list. This is the canonical insertion point.
    pub fn child_syntax_list(&self, ws: &Workspace) -> Option<Node> {
        let syntax = self.syntax();
        if let Some(list) = syntax.children().find(|child| child.kind() == SYNTAX_LIST) {
            return Some(ws.factory().node_for(&list));
        }
        let body = syntax.children().find(|child| child.kind() == SyntaxKind::BLOCK)?;
        let list = body.children().find(|child| child.kind() == SYNTAX_LIST)?;
        Some(ws.factory().node_for(&list))
    }

    pub fn child_syntax_list_or_err(&self, ws: &Workspace) -> Result<Node> {
        self.child_syntax_list(ws).ok_or_else(|| {
            EditError::invalid_operation(format!("{:?} has no child syntax list", self.kind()))
        })
    }

    /// The unique direct child whose `[pos, end)` contains `pos`.
    pub fn child_at_pos(&self, ws: &Workspace, pos: TextSize) -> Option<Node> {
        Some(ws.factory().node_for(&self.syntax().child_at_pos(pos)?))
    }

    /// The deepest descendant whose `[pos, end)` contains `pos`.
    pub fn descendant_at_pos(&self, ws: &Workspace, pos: TextSize) -> Option<Node> {
        Some(ws.factory().node_for(&self.syntax().descendant_at_pos(pos)?))
    }

    /// The deepest descendant starting exactly at `start` with exactly
    /// `width` of token text.
    pub fn descendant_at_start_with_width(
        &self,
        ws: &Workspace,
        start: TextSize,
        width: TextSize,
    ) -> Option<Node> {
        let mut current = self.syntax();
        let mut best = None;
        loop {
            if current.start() == start && current.end() - current.start() == width {
                best = Some(current.clone());
            }
            match current.child_at_pos(start) {
                Some(child) => current = child,
                None => break,
            }
        }
        Some(ws.factory().node_for(&best?))
    }

    // --- kind-filtered lookups -------------------------------------------

    /// The first child of the given kind, however deep in the child list.
    pub fn first_child_by_kind(&self, ws: &Workspace, kind: SyntaxKind) -> Option<Node> {
        let child = self.syntax().children().find(|child| child.kind() == kind)?;
        Some(ws.factory().node_for(&child))
    }

    /// The first child, only if it has the given kind.
    pub fn first_child_if_kind(&self, ws: &Workspace, kind: SyntaxKind) -> Option<Node> {
        let child = self.syntax().child(0).filter(|child| child.kind() == kind)?;
        Some(ws.factory().node_for(&child))
    }

    pub fn last_child_by_kind(&self, ws: &Workspace, kind: SyntaxKind) -> Option<Node> {
        let child = self.syntax().children().rev().find(|child| child.kind() == kind)?;
        Some(ws.factory().node_for(&child))
    }

    pub fn last_child_if_kind(&self, ws: &Workspace, kind: SyntaxKind) -> Option<Node> {
        let syntax = self.syntax();
        let child = syntax.child(syntax.child_count().checked_sub(1)?)?;
        (child.kind() == kind).then(|| ws.factory().node_for(&child))
    }

    pub fn first_ancestor_by_kind(&self, ws: &Workspace, kind: SyntaxKind) -> Option<Node> {
        self.ancestors(ws).find(|ancestor| ancestor.kind() == kind)
    }

    pub fn parent_if_kind(&self, ws: &Workspace, kind: SyntaxKind) -> Option<Node> {
        self.parent(ws).filter(|parent| parent.kind() == kind)
    }

    pub fn first_descendant_by_kind(&self, ws: &Workspace, kind: SyntaxKind) -> Option<Node> {
        let node = self.syntax().preorder().skip(1).find(|node| node.kind() == kind)?;
        Some(ws.factory().node_for(&node))
    }

    /// The closest previous sibling of the given kind.
    pub fn previous_sibling_by_kind(&self, ws: &Workspace, kind: SyntaxKind) -> Option<Node> {
        self.previous_siblings(ws).into_iter().find(|sibling| sibling.kind() == kind)
    }

    pub fn next_sibling_by_kind(&self, ws: &Workspace, kind: SyntaxKind) -> Option<Node> {
        self.next_siblings(ws).into_iter().find(|sibling| sibling.kind() == kind)
    }

    pub fn previous_sibling_if_kind(&self, ws: &Workspace, kind: SyntaxKind) -> Option<Node> {
        self.previous_sibling(ws).filter(|sibling| sibling.kind() == kind)
    }

    pub fn next_sibling_if_kind(&self, ws: &Workspace, kind: SyntaxKind) -> Option<Node> {
        self.next_sibling(ws).filter(|sibling| sibling.kind() == kind)
    }

    pub fn first_child_by_kind_or_err(&self, ws: &Workspace, kind: SyntaxKind) -> Result<Node> {
        self.first_child_by_kind(ws, kind).ok_or_else(|| expected(kind, "child"))
    }

    pub fn first_child_if_kind_or_err(&self, ws: &Workspace, kind: SyntaxKind) -> Result<Node> {
        self.first_child_if_kind(ws, kind).ok_or_else(|| expected(kind, "first child"))
    }

    pub fn last_child_by_kind_or_err(&self, ws: &Workspace, kind: SyntaxKind) -> Result<Node> {
        self.last_child_by_kind(ws, kind).ok_or_else(|| expected(kind, "child"))
    }

    pub fn first_ancestor_by_kind_or_err(&self, ws: &Workspace, kind: SyntaxKind) -> Result<Node> {
        self.first_ancestor_by_kind(ws, kind).ok_or_else(|| expected(kind, "ancestor"))
    }

    pub fn first_descendant_by_kind_or_err(
        &self,
        ws: &Workspace,
        kind: SyntaxKind,
    ) -> Result<Node> {
        self.first_descendant_by_kind(ws, kind).ok_or_else(|| expected(kind, "descendant"))
    }

    pub fn previous_sibling_by_kind_or_err(
        &self,
        ws: &Workspace,
        kind: SyntaxKind,
    ) -> Result<Node> {
        self.previous_sibling_by_kind(ws, kind).ok_or_else(|| expected(kind, "previous sibling"))
    }

    pub fn next_sibling_by_kind_or_err(&self, ws: &Workspace, kind: SyntaxKind) -> Result<Node> {
        self.next_sibling_by_kind(ws, kind).ok_or_else(|| expected(kind, "next sibling"))
    }

    // --- text and formatting ---------------------------------------------

    /// The whitespace indenting the line this node starts on.
    pub fn indentation_text(&self) -> String {
        let syntax = self.syntax();
        position::line_indentation(syntax.tree().text(), syntax.start()).to_owned()
    }

    /// The indentation one level deeper than this node's own.
    pub fn child_indentation_text(&self, ws: &Workspace) -> String {
        let mut text = self.indentation_text();
        text.push_str(ws.settings().indentation_text());
        text
    }

    /// True if only indentation separates this node from the start of its
    /// line.
    pub fn is_first_node_on_line(&self) -> bool {
        let syntax = self.syntax();
        position::is_first_on_line(syntax.tree().text(), syntax.start())
    }

    // --- tree membership --------------------------------------------------

    /// The source file this node currently belongs to.
    pub fn source_file(&self, ws: &Workspace) -> SourceFile {
        let mut root = self.syntax();
        while let Some(parent) = root.parent() {
            root = parent;
        }
        SourceFile::from_root(ws.factory().node_for(&root))
    }

    /// The symbol for this node, if the checker can resolve one here.
    pub fn symbol(&self, ws: &Workspace) -> Option<SymbolRef> {
        let symbol = ws.checker().symbol_at_location(&self.syntax())?;
        Some(ws.factory().symbol_for(&symbol))
    }

    // --- disposal ---------------------------------------------------------

    /// Disposes this wrapper and every wrapped descendant, deepest first.
    /// Disposing twice is a no-op.
    pub fn dispose(&self, ws: &Workspace) {
        let Ok(syntax) = self.syntax_node() else {
            return;
        };
        let nodes: Vec<SyntaxNode> = syntax.preorder().collect();
        for node in nodes.iter().rev() {
            if let Some(wrapper) = ws.factory().cached_node(node.key()) {
                wrapper.dispose_only_this(ws);
            }
        }
    }

    /// Removes this wrapper from the cache and severs its tree pointer,
    /// without touching descendants.
    pub fn dispose_only_this(&self, ws: &Workspace) {
        if self.is_disposed() {
            return;
        }
        ws.factory().remove_from_cache(self);
        self.clear_syntax();
    }

    /// Shifts the recorded positions of this node and all its descendants.
    /// Used when surrounding text moved without a structural change.
    pub fn offset_positions(&self, delta: i32) -> Result<()> {
        let syntax = self.syntax_node()?;
        if i64::from(u32::from(syntax.pos())) + i64::from(delta) < 0 {
            return Err(EditError::argument("offset would move positions below zero"));
        }
        syntax.shift_positions(delta);
        Ok(())
    }

    // --- editing ----------------------------------------------------------

    /// Replaces this node's text with `new_text`, which must parse to exactly
    /// one node in this position. This wrapper is disposed; the wrapper for
    /// the replacement is returned.
    pub fn replace_with_text(&self, ws: &Workspace, new_text: &str) -> Result<Node> {
        let syntax = self.syntax_node()?;
        let parent = syntax
            .parent()
            .ok_or_else(|| EditError::invalid_operation("cannot replace the root node"))?;
        let child_index = syntax
            .index_in_parent()
            .ok_or_else(|| EditError::invalid_operation("node is detached from its parent"))?;

        let parent_wrapper = ws.factory().node_for(&parent);
        insertion::insert_into_parent(
            ws,
            InsertRequest {
                parent: parent_wrapper.clone(),
                insert_pos: syntax.start(),
                new_text,
                child_index,
                insert_count: 1,
                replacing: Some(Replacing {
                    text_len: syntax.end() - syntax.start(),
                    nodes: vec![self.clone()],
                }),
            },
        )?;

        let new_child = parent_wrapper.syntax_node()?.child(child_index).ok_or_else(|| {
            EditError::tree_replacement("replacement did not produce a node at the same position")
        })?;
        Ok(ws.factory().node_for(&new_child))
    }
}

fn expected(kind: SyntaxKind, what: &str) -> EditError {
    EditError::invalid_operation(format!("expected a {what} of kind {kind:?}"))
}
