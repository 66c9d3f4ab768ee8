use sable_syntax::SyntaxKind::{
    self, CLASS_DECL, DECORATOR, IDENT, METHOD_DECL, PROPERTY_DECL, SYNTAX_LIST,
};

use super::View;
use crate::error::{EditError, Result};
use crate::manipulation::insertion::{self, InsertRequest, Replacing};
use crate::node::Node;
use crate::workspace::Workspace;

/// A `class` declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassDecl {
    node: Node,
}

impl View for ClassDecl {
    fn cast(node: Node) -> Option<Self> {
        (node.kind() == CLASS_DECL).then_some(Self { node })
    }

    fn node(&self) -> &Node {
        &self.node
    }
}

impl ClassDecl {
    /// The class name token.
    pub fn name(&self, ws: &Workspace) -> Option<Node> {
        self.node.first_child_by_kind(ws, IDENT)
    }

    pub fn name_text(&self, ws: &Workspace) -> Option<String> {
        Some(self.name(ws)?.text())
    }

    pub fn decorators(&self, ws: &Workspace) -> Vec<Decorator> {
        self.node.children_iter(ws).filter_map(Decorator::cast).collect()
    }

    /// The members of the class body, in source order.
    pub fn members(&self, ws: &Workspace) -> Vec<Node> {
        self.node
            .child_syntax_list(ws)
            .map(|list| list.children(ws))
            .unwrap_or_default()
    }

    pub fn has_export_keyword(&self) -> bool {
        super::has_export_keyword(&self.node)
    }

    /// Toggles the `export` modifier. The class wrapper stays valid.
    pub fn set_exported(&self, ws: &Workspace, value: bool) -> Result<()> {
        super::set_exported(ws, &self.node, value)
    }

    /// Inserts a member's text at the given member index and returns the new
    /// member's wrapper.
    pub fn insert_member_text(&self, ws: &Workspace, index: usize, text: &str) -> Result<Node> {
        insertion::insert_into_braced_list(ws, &self.node, index, text)
    }
}

/// A `@decorator` attached to a class or member.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decorator {
    node: Node,
}

impl View for Decorator {
    fn cast(node: Node) -> Option<Self> {
        (node.kind() == DECORATOR).then_some(Self { node })
    }

    fn node(&self) -> &Node {
        &self.node
    }
}

impl Decorator {
    /// The decorator expression after the `@`.
    pub fn expression(&self, ws: &Workspace) -> Option<Node> {
        self.node.children_iter(ws).find(|child| child.kind().is_node())
    }

    pub fn name_text(&self, ws: &Workspace) -> Option<String> {
        Some(self.node.first_descendant_by_kind(ws, IDENT)?.text())
    }

    /// Removes the decorator's text, including the gap to whatever follows
    /// it. This wrapper is disposed; the decorated node stays valid.
    pub fn remove(&self, ws: &Workspace) -> Result<()> {
        let syntax = self.node.syntax_node()?;
        let parent = syntax
            .parent()
            .ok_or_else(|| EditError::invalid_operation("a decorator always has a parent"))?;
        let child_index = syntax
            .index_in_parent()
            .ok_or_else(|| EditError::invalid_operation("node is detached from its parent"))?;
        let next = parent.child(child_index + 1).ok_or_else(|| {
            EditError::invalid_operation("a decorator cannot be the last child of its parent")
        })?;

        insertion::insert_into_parent(
            ws,
            InsertRequest {
                parent: ws.factory().node_for(&parent),
                insert_pos: syntax.start(),
                new_text: "",
                child_index,
                insert_count: 0,
                replacing: Some(Replacing {
                    text_len: next.start() - syntax.start(),
                    nodes: vec![self.node.clone()],
                }),
            },
        )
    }
}

/// A method member of a class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodDecl {
    node: Node,
}

impl View for MethodDecl {
    fn cast(node: Node) -> Option<Self> {
        (node.kind() == METHOD_DECL).then_some(Self { node })
    }

    fn node(&self) -> &Node {
        &self.node
    }
}

impl MethodDecl {
    pub fn name(&self, ws: &Workspace) -> Option<Node> {
        self.node.first_child_by_kind(ws, IDENT)
    }

    pub fn name_text(&self, ws: &Workspace) -> Option<String> {
        Some(self.name(ws)?.text())
    }

    /// The parameter syntax list, commas included.
    pub fn parameter_list(&self, ws: &Workspace) -> Option<Node> {
        let params = self.node.first_child_by_kind(ws, SyntaxKind::PARAM_LIST)?;
        params.first_child_by_kind(ws, SYNTAX_LIST)
    }

    pub fn parameters(&self, ws: &Workspace) -> Vec<Node> {
        self.parameter_list(ws)
            .map(|list| {
                list.children_iter(ws)
                    .filter(|child| child.kind() == SyntaxKind::PARAM)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Inserts a parameter's text at the given parameter index.
    pub fn insert_parameter_text(&self, ws: &Workspace, index: usize, text: &str) -> Result<Node> {
        let list = self.parameter_list(ws).ok_or_else(|| {
            EditError::invalid_operation("the method has no parameter list")
        })?;
        let list_syntax = list.syntax_node()?;

        // Count parameters, skipping separator tokens.
        let params: Vec<_> =
            list_syntax.children().filter(|child| child.kind() == SyntaxKind::PARAM).collect();
        if index > params.len() {
            return Err(EditError::argument(format!(
                "parameter index {index} is out of range for {} parameters",
                params.len(),
            )));
        }

        if params.is_empty() {
            let insert_pos = list_syntax.pos();
            insertion::insert_into_parent(
                ws,
                InsertRequest {
                    parent: list.clone(),
                    insert_pos,
                    new_text: text,
                    child_index: 0,
                    insert_count: 1,
                    replacing: None,
                },
            )?;
        } else if index == params.len() {
            // Append: `, text` after the last parameter.
            let last = params.last().expect("params is non-empty");
            let child_index = last.index_in_parent().unwrap_or(0) + 1;
            let new_text = format!(", {text}");
            insertion::insert_into_parent(
                ws,
                InsertRequest {
                    parent: list.clone(),
                    insert_pos: last.end(),
                    new_text: &new_text,
                    child_index,
                    insert_count: 2,
                    replacing: None,
                },
            )?;
        } else {
            // Prepend before an existing parameter: `text, `.
            let following = &params[index];
            let child_index = following.index_in_parent().unwrap_or(0);
            let new_text = format!("{text}, ");
            insertion::insert_into_parent(
                ws,
                InsertRequest {
                    parent: list.clone(),
                    insert_pos: following.start(),
                    new_text: &new_text,
                    child_index,
                    insert_count: 2,
                    replacing: None,
                },
            )?;
        }

        let list_syntax = list.syntax_node()?;
        let inserted = list_syntax
            .children()
            .filter(|child| child.kind() == SyntaxKind::PARAM)
            .nth(index)
            .ok_or_else(|| {
                EditError::tree_replacement(
                    "insertion did not produce a parameter at the requested index",
                )
            })?;
        Ok(ws.factory().node_for(&inserted))
    }

    pub fn body(&self, ws: &Workspace) -> Option<Node> {
        self.node.first_child_by_kind(ws, SyntaxKind::BLOCK)
    }
}

/// A property member of a class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyDecl {
    node: Node,
}

impl View for PropertyDecl {
    fn cast(node: Node) -> Option<Self> {
        (node.kind() == PROPERTY_DECL).then_some(Self { node })
    }

    fn node(&self) -> &Node {
        &self.node
    }
}

impl PropertyDecl {
    pub fn name(&self, ws: &Workspace) -> Option<Node> {
        self.node.first_child_by_kind(ws, IDENT)
    }

    pub fn type_node(&self, ws: &Workspace) -> Option<Node> {
        self.node.first_child_by_kind(ws, SyntaxKind::PATH_TYPE)
    }
}
