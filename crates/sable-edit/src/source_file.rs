//! The wrapper over a file's root node, and the text-level operations that
//! go with it.

use camino::Utf8PathBuf;
use sable_syntax::SyntaxKind;
use sable_syntax::SyntaxTree;
use text_size::{TextRange, TextSize};

use crate::error::{EditError, Result};
use crate::manipulation::insertion;
use crate::node::Node;
use crate::views::View;
use crate::workspace::Workspace;

/// A source file. The authoritative text lives in the current tree, so
/// `full_text` is always exactly what the compiler last parsed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceFile {
    node: Node,
}

impl View for SourceFile {
    fn cast(node: Node) -> Option<Self> {
        (node.kind() == SyntaxKind::SOURCE_FILE).then_some(Self { node })
    }

    fn node(&self) -> &Node {
        &self.node
    }
}

impl SourceFile {
    pub(crate) fn from_root(node: Node) -> Self {
        debug_assert_eq!(node.kind(), SyntaxKind::SOURCE_FILE);
        Self { node }
    }

    pub fn path(&self) -> Utf8PathBuf {
        self.node.syntax_node().map_or_else(|_| Utf8PathBuf::new(), |syntax| {
            syntax.tree().path().to_owned()
        })
    }

    /// The file's full current text.
    pub fn full_text(&self) -> String {
        match self.node.syntax_node() {
            Ok(syntax) => syntax.tree().text().to_owned(),
            Err(_) => String::new(),
        }
    }

    /// Top-level statements, in source order.
    pub fn statements(&self, ws: &Workspace) -> Vec<Node> {
        self.node
            .child_syntax_list(ws)
            .map(|list| list.children(ws))
            .unwrap_or_default()
    }

    /// Inserts one statement's text at the given statement index.
    pub fn insert_statement_text(
        &self,
        ws: &Workspace,
        index: usize,
        text: &str,
    ) -> Result<Node> {
        insertion::insert_into_file_list(ws, &self.node, index, text)
    }

    /// True if the line containing `pos` holds only whitespace.
    pub fn is_blank_line_at(&self, pos: TextSize) -> Result<bool> {
        let syntax = self.node.syntax_node()?;
        Ok(crate::position::is_blank_line_at(syntax.tree().text(), pos))
    }

    /// Zero-based line and column for a position.
    pub fn line_col(&self, ws: &Workspace, pos: TextSize) -> Result<(u32, u32)> {
        let syntax = self.node.syntax_node()?;
        let index = ws.line_index(syntax.tree());
        let line_col = index.line_col(pos);
        Ok((line_col.line, line_col.col))
    }

    pub fn is_saved(&self, ws: &Workspace) -> bool {
        self.node.syntax_node().is_ok_and(|syntax| ws.is_saved(syntax.tree().path()))
    }

    /// Writes the current text through the filesystem host.
    pub fn save(&self, ws: &Workspace) -> Result<()> {
        let syntax = self.node.syntax_node()?;
        let path = syntax.tree().path().to_owned();

        if let Some(parent) = path.parent() {
            ws.host().create_dir_all(parent).map_err(|source| EditError::Io {
                path: parent.to_owned(),
                source,
            })?;
        }
        ws.host()
            .write_file(&path, syntax.tree().text())
            .map_err(|source| EditError::Io { path: path.clone(), source })?;
        ws.mark_saved(&path, true);
        Ok(())
    }

    /// Replaces an arbitrary text range.
    ///
    /// This is the coarse fallback: every descendant wrapper of the file is
    /// disposed and the file reparsed. Only the file wrapper itself keeps its
    /// identity; use [`Node::replace_with_text`] to keep surrounding wrappers
    /// alive.
    pub fn replace_text(&self, ws: &Workspace, range: TextRange, new_text: &str) -> Result<()> {
        let syntax = self.node.syntax_node()?;
        let tree = syntax.tree().clone();
        let text = tree.text();
        if usize::from(range.end()) > text.len() {
            return Err(EditError::argument("replacement range is outside the source text"));
        }

        let mut patched = String::with_capacity(text.len() + new_text.len());
        patched.push_str(&text[..usize::from(range.start())]);
        patched.push_str(new_text);
        patched.push_str(&text[usize::from(range.end())..]);

        let new_tree = sable_parse::parse(tree.path(), &patched).into_tree();

        let descendants: Vec<_> = syntax.preorder().skip(1).collect();
        for node in descendants.iter().rev() {
            if let Some(wrapper) = ws.factory().cached_node(node.key()) {
                wrapper.dispose_only_this(ws);
            }
        }

        ws.factory().replace_syntax_node(&self.node, SyntaxTree::root(&new_tree))?;
        ws.after_edit(&tree);
        Ok(())
    }
}
