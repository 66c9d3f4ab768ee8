mod builder;
mod syntax_kind;
mod syntax_set;
mod tree;
mod trivia;

pub use builder::Builder;
pub use syntax_kind::SyntaxKind;
pub use syntax_set::SyntaxSet;
pub use tree::{Ancestors, Children, Descendants, NodeKey, SyntaxNode, SyntaxTree, TreeId};
pub use trivia::{Trivia, TriviaPiece, TriviaPieceKind};
