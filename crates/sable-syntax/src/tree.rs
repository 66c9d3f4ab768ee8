//! The immutable tree and the cheap node handle over it.
//!
//! A `SyntaxTree` owns the source text and an arena of node records; every
//! parse produces a tree with a fresh id, so `NodeKey`s never collide across
//! reparses of the same file. Position fields live in `Cell`s: the structure
//! of a tree never changes after `Builder::finish`, but a whole subtree may
//! be shifted without rebuilding.

use std::cell::Cell;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use camino::{Utf8Path, Utf8PathBuf};
use la_arena::{Arena, Idx};
use text_size::{TextRange, TextSize};
use triomphe::Arc;

use crate::SyntaxKind;

/// Identifies one parse. Monotonically increasing across the process.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct TreeId(u32);

impl TreeId {
    fn next() -> Self {
        static NEXT: AtomicU32 = AtomicU32::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

pub(crate) struct NodeData {
    pub(crate) kind: SyntaxKind,
    pub(crate) parent: Option<Idx<NodeData>>,
    pub(crate) children: Box<[Idx<NodeData>]>,
    /// Start including leading trivia. Sibling ranges tile: a node's `pos`
    /// equals the previous sibling's `end`.
    pub(crate) pos: Cell<TextSize>,
    /// Start of the first token, excluding trivia.
    pub(crate) start: Cell<TextSize>,
    pub(crate) end: Cell<TextSize>,
}

pub struct SyntaxTree {
    pub(crate) id: TreeId,
    pub(crate) path: Utf8PathBuf,
    pub(crate) text: Box<str>,
    pub(crate) nodes: Arena<NodeData>,
    pub(crate) root: Idx<NodeData>,
}

impl SyntaxTree {
    pub(crate) fn new(
        path: Utf8PathBuf,
        text: Box<str>,
        nodes: Arena<NodeData>,
        root: Idx<NodeData>,
    ) -> Self {
        Self { id: TreeId::next(), path, text, nodes, root }
    }

    #[inline]
    pub fn id(&self) -> TreeId {
        self.id
    }

    #[inline]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the root node. Trees are handed around behind an `Arc` so the
    /// handle can keep its tree alive.
    pub fn root(tree: &Arc<SyntaxTree>) -> SyntaxNode {
        SyntaxNode { tree: tree.clone(), index: tree.root }
    }
}

impl fmt::Debug for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntaxTree")
            .field("id", &self.id)
            .field("path", &self.path)
            .field("text_len", &self.text.len())
            .finish_non_exhaustive()
    }
}

/// Structural identity of a node: which parse it came from and where it sits
/// in that parse's arena.
#[derive(Clone, Copy, Eq, Hash, PartialEq)]
pub struct NodeKey {
    tree: TreeId,
    index: Idx<NodeData>,
}

impl fmt::Debug for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeKey({:?}, {:?})", self.tree, self.index.into_raw())
    }
}

/// A cheap handle to one node. Cloning bumps the tree's refcount only.
#[derive(Clone)]
pub struct SyntaxNode {
    tree: Arc<SyntaxTree>,
    index: Idx<NodeData>,
}

impl PartialEq for SyntaxNode {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for SyntaxNode {}

impl std::hash::Hash for SyntaxNode {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Debug for SyntaxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{:?}", self.kind(), self.range())
    }
}

impl SyntaxNode {
    #[inline]
    fn data(&self) -> &NodeData {
        &self.tree.nodes[self.index]
    }

    #[inline]
    fn sibling(&self, index: Idx<NodeData>) -> SyntaxNode {
        SyntaxNode { tree: self.tree.clone(), index }
    }

    #[inline]
    pub fn key(&self) -> NodeKey {
        NodeKey { tree: self.tree.id, index: self.index }
    }

    #[inline]
    pub fn tree(&self) -> &Arc<SyntaxTree> {
        &self.tree
    }

    #[inline]
    pub fn kind(&self) -> SyntaxKind {
        self.data().kind
    }

    /// Start including leading trivia.
    #[inline]
    pub fn pos(&self) -> TextSize {
        self.data().pos.get()
    }

    /// Start of the first token, excluding trivia.
    #[inline]
    pub fn start(&self) -> TextSize {
        self.data().start.get()
    }

    #[inline]
    pub fn end(&self) -> TextSize {
        self.data().end.get()
    }

    /// `[start, end)` — the token text without leading trivia.
    #[inline]
    pub fn range(&self) -> TextRange {
        TextRange::new(self.start(), self.end())
    }

    /// `[pos, end)` — including leading trivia.
    #[inline]
    pub fn full_range(&self) -> TextRange {
        TextRange::new(self.pos(), self.end())
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.tree.text[self.range()]
    }

    #[inline]
    pub fn full_text(&self) -> &str {
        &self.tree.text[self.full_range()]
    }

    pub fn parent(&self) -> Option<SyntaxNode> {
        Some(self.sibling(self.data().parent?))
    }

    #[inline]
    pub fn child_count(&self) -> usize {
        self.data().children.len()
    }

    pub fn child(&self, index: usize) -> Option<SyntaxNode> {
        Some(self.sibling(*self.data().children.get(index)?))
    }

    #[inline]
    pub fn children(&self) -> Children {
        Children { node: self.clone(), front: 0, back: self.child_count() }
    }

    /// The position of this node in its parent's child list.
    pub fn index_in_parent(&self) -> Option<usize> {
        let parent = self.parent()?;
        parent.data().children.iter().position(|&child| child == self.index)
    }

    pub fn ancestors(&self) -> Ancestors {
        Ancestors { next: self.parent() }
    }

    /// Preorder walk starting with this node itself.
    pub fn preorder(&self) -> Descendants {
        Descendants { stack: vec![self.clone()] }
    }

    /// The unique direct child whose `[pos, end)` contains `pos`.
    ///
    /// Children tile the parent's range, so a binary search suffices.
    /// Zero-width children never match.
    pub fn child_at_pos(&self, pos: TextSize) -> Option<SyntaxNode> {
        let children = &self.data().children;
        let index = children.partition_point(|&child| self.tree.nodes[child].end.get() <= pos);
        let child = self.sibling(*children.get(index)?);
        (child.pos() <= pos && pos < child.end()).then_some(child)
    }

    /// The deepest node whose `[pos, end)` contains `pos`.
    pub fn descendant_at_pos(&self, pos: TextSize) -> Option<SyntaxNode> {
        let mut current = self.child_at_pos(pos)?;
        while let Some(child) = current.child_at_pos(pos) {
            current = child;
        }
        Some(current)
    }

    /// Shifts the positions of this node and all its descendants.
    ///
    /// The caller guarantees the shifted range stays inside the tree's text.
    pub fn shift_positions(&self, delta: i32) {
        let mut stack = vec![self.index];
        while let Some(index) = stack.pop() {
            let data = &self.tree.nodes[index];
            data.pos.set(shifted(data.pos.get(), delta));
            data.start.set(shifted(data.start.get(), delta));
            data.end.set(shifted(data.end.get(), delta));
            stack.extend(data.children.iter().copied());
        }
    }
}

fn shifted(size: TextSize, delta: i32) -> TextSize {
    let shifted = i64::from(u32::from(size)) + i64::from(delta);
    TextSize::new(u32::try_from(shifted).expect("position shifted out of range"))
}

pub struct Ancestors {
    next: Option<SyntaxNode>,
}

impl Iterator for Ancestors {
    type Item = SyntaxNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.next.take()?;
        self.next = node.parent();
        Some(node)
    }
}

pub struct Children {
    node: SyntaxNode,
    front: usize,
    back: usize,
}

impl Clone for Children {
    fn clone(&self) -> Self {
        Self { node: self.node.clone(), front: self.front, back: self.back }
    }
}

impl Iterator for Children {
    type Item = SyntaxNode;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        let child = self.node.child(self.front);
        self.front += 1;
        child
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.back - self.front;
        (len, Some(len))
    }
}

impl DoubleEndedIterator for Children {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        self.node.child(self.back)
    }
}

impl ExactSizeIterator for Children {
    fn len(&self) -> usize {
        self.back - self.front
    }
}

pub struct Descendants {
    stack: Vec<SyntaxNode>,
}

impl Iterator for Descendants {
    type Item = SyntaxNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        let data = node.data();
        self.stack.reserve(data.children.len());
        for &child in data.children.iter().rev() {
            self.stack.push(node.sibling(child));
        }
        Some(node)
    }
}
