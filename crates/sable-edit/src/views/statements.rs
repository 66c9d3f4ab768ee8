use sable_syntax::SyntaxKind::{
    self, FUNCTION_DECL, IDENT, IMPORT_ALIAS, LEFT_BRACE, NAMESPACE_DECL, RIGHT_BRACE,
    VARIABLE_DECL, VARIABLE_STMT,
};

use super::View;
use crate::error::Result;
use crate::manipulation::insertion;
use crate::node::Node;
use crate::symbol::SymbolRef;
use crate::workspace::Workspace;

/// A `namespace` declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamespaceDecl {
    node: Node,
}

impl View for NamespaceDecl {
    fn cast(node: Node) -> Option<Self> {
        (node.kind() == NAMESPACE_DECL).then_some(Self { node })
    }

    fn node(&self) -> &Node {
        &self.node
    }
}

impl NamespaceDecl {
    pub fn name(&self, ws: &Workspace) -> Option<Node> {
        self.node.first_child_by_kind(ws, IDENT)
    }

    pub fn statements(&self, ws: &Workspace) -> Vec<Node> {
        self.node
            .child_syntax_list(ws)
            .map(|list| list.children(ws))
            .unwrap_or_default()
    }

    pub fn has_export_keyword(&self) -> bool {
        super::has_export_keyword(&self.node)
    }

    pub fn set_exported(&self, ws: &Workspace, value: bool) -> Result<()> {
        super::set_exported(ws, &self.node, value)
    }

    /// Replaces the namespace with its own body, dedented one level. The
    /// statement wrappers inside survive with their identity; the namespace
    /// wrapper and its other descendants are disposed.
    pub fn unwrap(&self, ws: &Workspace) -> Result<Node> {
        let lbrace = self.node.first_child_by_kind_or_err(ws, LEFT_BRACE)?;
        let rbrace = self.node.last_child_by_kind_or_err(ws, RIGHT_BRACE)?;

        let syntax = self.node.syntax_node()?;
        let tree = syntax.tree().clone();
        let body = &tree.text()[usize::from(lbrace.end())..usize::from(rbrace.start())];

        // The newline after `{` disappears along with the braces.
        let body = body.strip_prefix("\r\n").or_else(|| body.strip_prefix('\n')).unwrap_or(body);
        let unwrapped = dedent(body, ws.settings().indentation_text());

        let parent = self.node.parent_or_err(ws)?;
        insertion::unwrap_node(ws, &self.node, &unwrapped)?;
        Ok(parent)
    }
}

/// Strips one level of indentation from every line.
fn dedent(text: &str, indentation: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for line in text.split_inclusive('\n') {
        out.push_str(line.strip_prefix(indentation).unwrap_or(line));
    }
    out
}

/// A `function` declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionDecl {
    node: Node,
}

impl View for FunctionDecl {
    fn cast(node: Node) -> Option<Self> {
        (node.kind() == FUNCTION_DECL).then_some(Self { node })
    }

    fn node(&self) -> &Node {
        &self.node
    }
}

impl FunctionDecl {
    pub fn name(&self, ws: &Workspace) -> Option<Node> {
        self.node.first_child_by_kind(ws, IDENT)
    }

    pub fn body(&self, ws: &Workspace) -> Option<Node> {
        self.node.first_child_by_kind(ws, SyntaxKind::BLOCK)
    }

    pub fn has_export_keyword(&self) -> bool {
        super::has_export_keyword(&self.node)
    }

    pub fn set_exported(&self, ws: &Workspace, value: bool) -> Result<()> {
        super::set_exported(ws, &self.node, value)
    }
}

/// A `const` or `let` statement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariableStmt {
    node: Node,
}

impl View for VariableStmt {
    fn cast(node: Node) -> Option<Self> {
        (node.kind() == VARIABLE_STMT).then_some(Self { node })
    }

    fn node(&self) -> &Node {
        &self.node
    }
}

impl VariableStmt {
    pub fn declarations(&self, ws: &Workspace) -> Vec<VariableDecl> {
        self.node.children_iter(ws).filter_map(VariableDecl::cast).collect()
    }

    pub fn has_export_keyword(&self) -> bool {
        super::has_export_keyword(&self.node)
    }

    pub fn set_exported(&self, ws: &Workspace, value: bool) -> Result<()> {
        super::set_exported(ws, &self.node, value)
    }
}

/// One declarator inside a variable statement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariableDecl {
    node: Node,
}

impl View for VariableDecl {
    fn cast(node: Node) -> Option<Self> {
        (node.kind() == VARIABLE_DECL).then_some(Self { node })
    }

    fn node(&self) -> &Node {
        &self.node
    }
}

impl VariableDecl {
    pub fn name(&self, ws: &Workspace) -> Option<Node> {
        self.node.first_child_by_kind(ws, IDENT)
    }

    pub fn name_text(&self, ws: &Workspace) -> Option<String> {
        Some(self.name(ws)?.text())
    }

    /// The initializer expression after `=`, if any.
    pub fn initializer(&self, ws: &Workspace) -> Option<Node> {
        let syntax = self.node.syntax_node().ok()?;
        let eq = syntax.children().position(|child| child.kind() == SyntaxKind::EQ)?;
        let init = syntax.child(eq + 1)?;
        Some(ws.factory().node_for(&init))
    }
}

/// An `import Name = path;` alias.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportAlias {
    node: Node,
}

impl View for ImportAlias {
    fn cast(node: Node) -> Option<Self> {
        (node.kind() == IMPORT_ALIAS).then_some(Self { node })
    }

    fn node(&self) -> &Node {
        &self.node
    }
}

impl ImportAlias {
    pub fn name(&self, ws: &Workspace) -> Option<Node> {
        self.node.first_child_by_kind(ws, IDENT)
    }

    /// The symbol the alias renames, resolved through the checker.
    pub fn target_symbol(&self, ws: &Workspace) -> Option<SymbolRef> {
        self.node.symbol(ws)?.aliased(ws)
    }
}
