//! Typed views over the uniform [`Node`] wrapper.
//!
//! The cache stores plain wrappers; kind dispatch happens here, at the call
//! boundary, by casting. A view is just a witness that the node had the
//! right kind when it was cast.

use sable_syntax::SyntaxKind::EXPORT_KW;

use crate::error::{EditError, Result};
use crate::manipulation::insertion::{self, InsertRequest, Replacing};
use crate::node::Node;
use crate::workspace::Workspace;

mod class;
mod statements;

pub use class::{ClassDecl, Decorator, MethodDecl, PropertyDecl};
pub use statements::{FunctionDecl, ImportAlias, NamespaceDecl, VariableDecl, VariableStmt};

pub trait View: Sized {
    /// Casts the wrapper if it has this view's kind.
    fn cast(node: Node) -> Option<Self>;

    /// The underlying wrapper.
    fn node(&self) -> &Node;
}

/// True if the declaration carries an `export` keyword.
pub(crate) fn has_export_keyword(node: &Node) -> bool {
    node.syntax_node()
        .is_ok_and(|syntax| syntax.children().any(|child| child.kind() == EXPORT_KW))
}

/// Adds or removes the `export` modifier in front of the declaration
/// keyword.
pub(crate) fn set_exported(ws: &Workspace, node: &Node, value: bool) -> Result<()> {
    let syntax = node.syntax_node()?;
    let export_kw = syntax.children().find(|child| child.kind() == EXPORT_KW);

    match (export_kw, value) {
        (Some(_), true) | (None, false) => Ok(()),
        (None, true) => {
            // The modifier goes after any decorators, right before the
            // declaration keyword.
            let anchor = syntax
                .children()
                .find(|child| child.kind().is_keyword())
                .ok_or_else(|| {
                    EditError::invalid_operation("the declaration has no keyword to modify")
                })?;
            let child_index = anchor.index_in_parent().unwrap_or(0);
            insertion::insert_into_parent(
                ws,
                InsertRequest {
                    parent: node.clone(),
                    insert_pos: anchor.start(),
                    new_text: "export ",
                    child_index,
                    insert_count: 1,
                    replacing: None,
                },
            )
        }
        (Some(export_kw), false) => {
            let child_index = export_kw.index_in_parent().unwrap_or(0);
            let next = syntax.child(child_index + 1).ok_or_else(|| {
                EditError::invalid_operation("`export` is not followed by a declaration")
            })?;
            insertion::insert_into_parent(
                ws,
                InsertRequest {
                    parent: node.clone(),
                    insert_pos: export_kw.start(),
                    new_text: "",
                    child_index,
                    insert_count: 0,
                    replacing: Some(Replacing {
                        text_len: next.start() - export_kw.start(),
                        nodes: vec![ws.factory().node_for(&export_kw)],
                    }),
                },
            )
        }
    }
}
