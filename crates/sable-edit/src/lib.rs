//! A programmatic editing layer over immutable sable syntax trees.
//!
//! The parser produces fresh, immutable trees from text. This crate gives
//! callers the illusion of one mutable, navigable tree: every syntax node
//! gets a single stable wrapper, edits patch the text and reparse, and a
//! reconciliation pass migrates the wrappers onto the new tree so callers'
//! references stay valid.
//!
//! ```no_run
//! use sable_edit::{ClassDecl, View, Workspace};
//!
//! # fn main() -> sable_edit::Result<()> {
//! let ws = Workspace::new();
//! let file = ws.create_source_file("lib.sable", "class A {}")?;
//!
//! let class = file
//!     .statements(&ws)
//!     .into_iter()
//!     .find_map(ClassDecl::cast)
//!     .expect("the file declares a class");
//! class.set_exported(&ws, true)?;
//!
//! assert_eq!(file.full_text(), "export class A {}");
//! file.save(&ws)?;
//! # Ok(())
//! # }
//! ```

mod error;
mod factory;
mod manipulation;
mod node;
pub mod position;
mod settings;
mod source_file;
mod symbol;
mod views;
mod workspace;

#[cfg(test)]
mod tests;

pub use error::{EditError, Result};
pub use factory::NodeFactory;
pub use node::Node;
pub use settings::{EditSettings, NewLineKind};
pub use source_file::SourceFile;
pub use symbol::SymbolRef;
pub use views::{
    ClassDecl, Decorator, FunctionDecl, ImportAlias, MethodDecl, NamespaceDecl, PropertyDecl,
    VariableDecl, VariableStmt, View,
};
pub use workspace::Workspace;
