//! Parser for sable source files.
//!
//! Parsing is error tolerant: it always produces a tree covering the whole
//! text, with `ERROR` nodes around unexpected tokens, and reports problems as
//! diagnostics on the side.

use camino::Utf8PathBuf;
use sable_errors::Diagnostic;
use sable_syntax::{SyntaxNode, SyntaxTree};
use triomphe::Arc;

mod grammar;
mod parser;
#[cfg(test)]
mod tests;

pub struct Parse {
    tree: Arc<SyntaxTree>,
    diagnostics: Vec<Diagnostic>,
}

impl std::fmt::Debug for Parse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parse").field("tree", &self.tree).finish_non_exhaustive()
    }
}

impl Parse {
    pub fn tree(&self) -> &Arc<SyntaxTree> {
        &self.tree
    }

    pub fn into_tree(self) -> Arc<SyntaxTree> {
        self.tree
    }

    pub fn root(&self) -> SyntaxNode {
        SyntaxTree::root(&self.tree)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

/// Parses one source file.
pub fn parse(path: impl Into<Utf8PathBuf>, text: &str) -> Parse {
    let mut parser = parser::Parser::new(text);
    grammar::items::source_file(&mut parser);
    let finished = parser.finish(path, text);
    Parse { tree: finished.tree, diagnostics: finished.diagnostics }
}
