//! Builds an immutable `SyntaxTree` from parser events.

use camino::Utf8PathBuf;
use la_arena::{Arena, Idx};
use text_size::TextSize;
use triomphe::Arc;

use crate::tree::NodeData;
use crate::{SyntaxKind, SyntaxTree, Trivia};

pub struct Builder {
    path: Utf8PathBuf,
    text: Box<str>,
    nodes: Arena<NodeData>,
    pending: Vec<Pending>,
    root: Option<Idx<NodeData>>,
    /// End of the last token added, trivia included.
    consumed: TextSize,
}

struct Pending {
    kind: SyntaxKind,
    children: Vec<Idx<NodeData>>,
}

impl Drop for Builder {
    fn drop(&mut self) {
        if !std::thread::panicking() && !self.pending.is_empty() {
            panic!("you should call `Builder::finish()`");
        }
    }
}

impl Builder {
    pub fn new(path: impl Into<Utf8PathBuf>, text: &str) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
            nodes: Arena::new(),
            pending: Vec::with_capacity(16),
            root: None,
            consumed: TextSize::new(0),
        }
    }

    /// Starts a new interior node of the given kind.
    pub fn start_node(&mut self, kind: SyntaxKind) {
        debug_assert!(kind.is_node(), "{kind:?} is a token kind");
        self.pending.push(Pending { kind, children: Vec::with_capacity(8) });
    }

    /// Adds a token with its leading trivia to the current node.
    ///
    /// The token's `pos` covers the trivia; its `start` is where the token
    /// text itself begins.
    pub fn token(&mut self, leading: &Trivia, kind: SyntaxKind, len: TextSize) {
        let parent = self.pending.last_mut().expect("no started node to add a token to");
        let pos = self.consumed;
        let start = pos + leading.len();
        let end = start + len;
        debug_assert!(self.text.is_char_boundary(usize::from(end)));

        let index = self.nodes.alloc(NodeData {
            kind,
            parent: None,
            children: Box::new([]),
            pos: pos.into(),
            start: start.into(),
            end: end.into(),
        });
        parent.children.push(index);
        self.consumed = end;
    }

    /// Finishes the most recently started node.
    ///
    /// An empty node is given a zero-width range at the current position, so
    /// sibling ranges always tile.
    pub fn finish_node(&mut self) {
        let Pending { kind, children } = self.pending.pop().expect("no started node to finish");

        let (pos, start, end) = match (children.first(), children.last()) {
            (Some(&first), Some(&last)) => {
                let first = &self.nodes[first];
                (first.pos.get(), first.start.get(), self.nodes[last].end.get())
            }
            _ => (self.consumed, self.consumed, self.consumed),
        };

        let index = self.nodes.alloc(NodeData {
            kind,
            parent: None,
            children: children.into_boxed_slice(),
            pos: pos.into(),
            start: start.into(),
            end: end.into(),
        });
        for child_index in 0..self.nodes[index].children.len() {
            let child = self.nodes[index].children[child_index];
            self.nodes[child].parent = Some(index);
        }

        match self.pending.last_mut() {
            Some(parent) => parent.children.push(index),
            None => {
                assert!(self.root.is_none(), "finished a second root node");
                self.root = Some(index);
            }
        }
    }

    /// Finishes building and returns the immutable tree.
    pub fn finish(mut self) -> Arc<SyntaxTree> {
        assert!(self.pending.is_empty(), "unfinished nodes remain");
        let root = self.root.take().expect("no root node was built");
        debug_assert_eq!(
            self.consumed,
            TextSize::of(&*self.text),
            "the built tree does not cover the whole text",
        );
        let tree = SyntaxTree::new(
            std::mem::take(&mut self.path),
            std::mem::take(&mut self.text),
            std::mem::take(&mut self.nodes),
            root,
        );
        Arc::new(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SyntaxKind::*;
    use crate::{TriviaPiece, TriviaPieceKind};

    fn leading(pieces: &[(TriviaPieceKind, u32)]) -> Trivia {
        let pieces: Vec<_> =
            pieces.iter().map(|&(kind, len)| TriviaPiece::new(kind, len.into())).collect();
        Trivia::new(&pieces)
    }

    #[test]
    fn ranges_tile_and_trivia_belongs_to_the_next_token() {
        // "const x = 1;" followed by a trailing newline owned by EOF.
        let text = "const x = 1;\n";
        let mut builder = Builder::new("lib.sable", text);
        builder.start_node(SOURCE_FILE);
        builder.start_node(SYNTAX_LIST);
        builder.start_node(VARIABLE_STMT);
        builder.token(&Trivia::empty(), CONST_KW, 5.into());
        builder.start_node(VARIABLE_DECL);
        builder.token(&Trivia::whitespace(1), IDENT, 1.into());
        builder.token(&Trivia::whitespace(1), EQ, 1.into());
        builder.token(&Trivia::whitespace(1), NUMBER, 1.into());
        builder.finish_node();
        builder.token(&Trivia::empty(), SEMICOLON, 1.into());
        builder.finish_node();
        builder.finish_node();
        builder.token(&leading(&[(TriviaPieceKind::Newline, 1)]), EOF, 0.into());
        builder.finish_node();

        let tree = builder.finish();
        let root = SyntaxTree::root(&tree);
        assert_eq!(root.kind(), SOURCE_FILE);
        assert_eq!(root.full_text(), text);

        let list = root.child(0).unwrap();
        let stmt = list.child(0).unwrap();
        assert_eq!(stmt.text(), "const x = 1;");

        let decl = stmt.child(1).unwrap();
        assert_eq!(decl.kind(), VARIABLE_DECL);
        let ident = decl.child(0).unwrap();
        // `pos` includes the space before `x`, `start` does not.
        assert_eq!(u32::from(ident.pos()), 5);
        assert_eq!(u32::from(ident.start()), 6);
        assert_eq!(ident.text(), "x");

        // Siblings tile exactly.
        let eq = decl.child(1).unwrap();
        assert_eq!(ident.end(), eq.pos());

        let eof = root.child(1).unwrap();
        assert_eq!(eof.kind(), EOF);
        assert_eq!(u32::from(eof.pos()), 12);
        assert_eq!(eof.start(), eof.end());
    }

    #[test]
    fn empty_nodes_are_zero_width_at_the_current_position() {
        let text = "class A {\n}";
        let mut builder = Builder::new("lib.sable", text);
        builder.start_node(SOURCE_FILE);
        builder.start_node(SYNTAX_LIST);
        builder.start_node(CLASS_DECL);
        builder.token(&Trivia::empty(), CLASS_KW, 5.into());
        builder.token(&Trivia::whitespace(1), IDENT, 1.into());
        builder.token(&Trivia::whitespace(1), LEFT_BRACE, 1.into());
        builder.start_node(SYNTAX_LIST);
        builder.finish_node();
        builder.token(&leading(&[(TriviaPieceKind::Newline, 1)]), RIGHT_BRACE, 1.into());
        builder.finish_node();
        builder.finish_node();
        builder.token(&Trivia::empty(), EOF, 0.into());
        builder.finish_node();

        let tree = builder.finish();
        let root = SyntaxTree::root(&tree);
        let class = root.child(0).unwrap().child(0).unwrap();
        let members = class.child(3).unwrap();
        assert_eq!(members.kind(), SYNTAX_LIST);
        assert_eq!(u32::from(members.pos()), 9);
        assert_eq!(members.pos(), members.end());

        // The zero-width list never matches a position lookup; the brace after
        // it does.
        let brace = class.child_at_pos(9.into()).unwrap();
        assert_eq!(brace.kind(), RIGHT_BRACE);
        assert_eq!(root.descendant_at_pos(9.into()).unwrap().kind(), RIGHT_BRACE);
    }

    #[test]
    fn shift_positions_moves_a_whole_subtree() {
        let text = "let a;";
        let mut builder = Builder::new("lib.sable", text);
        builder.start_node(SOURCE_FILE);
        builder.start_node(VARIABLE_STMT);
        builder.token(&Trivia::empty(), LET_KW, 3.into());
        builder.token(&Trivia::whitespace(1), IDENT, 1.into());
        builder.token(&Trivia::empty(), SEMICOLON, 1.into());
        builder.finish_node();
        builder.token(&Trivia::empty(), EOF, 0.into());
        builder.finish_node();

        let tree = builder.finish();
        let stmt = SyntaxTree::root(&tree).child(0).unwrap();
        stmt.shift_positions(4);
        assert_eq!(u32::from(stmt.start()), 4);
        assert_eq!(u32::from(stmt.child(1).unwrap().start()), 8);
        stmt.shift_positions(-4);
        assert_eq!(u32::from(stmt.start()), 0);
    }
}
