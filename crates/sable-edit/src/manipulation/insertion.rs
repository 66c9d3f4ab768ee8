//! The edit planner: compute a patched text, reparse, and hand the old and
//! new trees to the reconciler.

use sable_syntax::SyntaxKind::{LEFT_BRACE, RIGHT_BRACE};
use sable_syntax::SyntaxTree;
use text_size::TextSize;
use tracing::{debug, trace};

use crate::error::{EditError, Result};
use crate::manipulation::handlers::{
    ChildIndexHandler, NodeHandler as _, ParentFinderHandler, UnwrapParentHandler,
};
use crate::node::Node;
use crate::workspace::Workspace;

pub(crate) struct InsertRequest<'a> {
    /// The wrapper under which the insertion happens, typically a syntax
    /// list.
    pub(crate) parent: Node,
    pub(crate) insert_pos: TextSize,
    pub(crate) new_text: &'a str,
    /// Index in `parent`'s children where the first inserted node appears in
    /// the new tree.
    pub(crate) child_index: usize,
    /// How many new children the insertion creates. Zero for pure
    /// replacement.
    pub(crate) insert_count: usize,
    pub(crate) replacing: Option<Replacing>,
}

pub(crate) struct Replacing {
    /// Characters replaced (not inserted over) starting at `insert_pos`.
    pub(crate) text_len: TextSize,
    /// Wrappers logically replaced; the reconciler disposes them.
    pub(crate) nodes: Vec<Node>,
}

pub(crate) fn insert_into_parent(ws: &Workspace, request: InsertRequest<'_>) -> Result<()> {
    let parent_syntax = request.parent.syntax_node()?;
    let tree = parent_syntax.tree().clone();
    let text = tree.text();

    let insert_pos = usize::from(request.insert_pos);
    let replaced_len = request.replacing.as_ref().map_or(0, |r| usize::from(r.text_len));
    let replaced_nodes = request.replacing.as_ref().map_or(0, |r| r.nodes.len());
    if insert_pos + replaced_len > text.len() {
        return Err(EditError::argument("insertion range is outside the source text"));
    }
    if request.child_index + replaced_nodes > parent_syntax.child_count() {
        return Err(EditError::argument("child index is outside the parent's children"));
    }

    let mut patched = String::with_capacity(text.len() + request.new_text.len());
    patched.push_str(&text[..insert_pos]);
    patched.push_str(request.new_text);
    patched.push_str(&text[insert_pos + replaced_len..]);

    debug!(
        path = %tree.path(),
        insert_pos,
        replaced_len,
        inserted = request.new_text.len(),
        "applying text edit"
    );
    let parse = sable_parse::parse(tree.path(), &patched);
    for diagnostic in parse.diagnostics() {
        trace!(message = diagnostic.message(), "inserted text parses with errors");
    }
    let new_tree = parse.into_tree();

    let handler = ChildIndexHandler {
        child_index: request.child_index,
        insert_count: request.insert_count,
        replacing: request.replacing.map_or_else(Vec::new, |r| r.nodes),
    };
    let finder = ParentFinderHandler { target: parent_syntax.key(), inner: &handler };
    finder.handle(ws, &SyntaxTree::root(&tree), &SyntaxTree::root(&new_tree))?;

    ws.after_edit(&tree);
    Ok(())
}

/// Replaces `node`'s text with `new_text` and lifts the contents of its
/// syntax list into its parent.
pub(crate) fn unwrap_node(ws: &Workspace, node: &Node, new_text: &str) -> Result<()> {
    let syntax = node.syntax_node()?;
    let parent = syntax
        .parent()
        .ok_or_else(|| EditError::invalid_operation("cannot unwrap the root node"))?;
    let child_index = syntax
        .index_in_parent()
        .ok_or_else(|| EditError::invalid_operation("node is detached from its parent"))?;

    let tree = syntax.tree().clone();
    let text = tree.text();
    let mut patched = String::with_capacity(text.len());
    patched.push_str(&text[..usize::from(syntax.start())]);
    patched.push_str(new_text);
    patched.push_str(&text[usize::from(syntax.end())..]);

    debug!(path = %tree.path(), kind = ?syntax.kind(), "unwrapping node");
    let new_tree = sable_parse::parse(tree.path(), &patched).into_tree();

    let handler = UnwrapParentHandler { child_index };
    let finder = ParentFinderHandler { target: parent.key(), inner: &handler };
    finder.handle(ws, &SyntaxTree::root(&tree), &SyntaxTree::root(&new_tree))?;

    ws.after_edit(&tree);
    Ok(())
}

/// Inserts one item into a brace-delimited syntax list owned by `owner`,
/// placing newlines and indentation around it.
pub(crate) fn insert_into_braced_list(
    ws: &Workspace,
    owner: &Node,
    index: usize,
    item_text: &str,
) -> Result<Node> {
    let list = owner.child_syntax_list_or_err(ws)?;
    let list_syntax = list.syntax_node()?;
    let count = list_syntax.child_count();
    if index > count {
        return Err(EditError::argument(format!(
            "insertion index {index} is out of range for a list of {count}",
        )));
    }

    let newline = ws.settings().newline();
    let indent = owner.child_indentation_text(ws);

    if count == 0 {
        // Replace the blank region between the braces wholesale.
        let owner_syntax = owner.syntax_node()?;
        let lbrace = owner_syntax
            .children()
            .find(|child| child.kind() == LEFT_BRACE)
            .ok_or_else(|| EditError::invalid_operation("the list's owner has no `{`"))?;
        let rbrace = owner_syntax
            .children()
            .find(|child| child.kind() == RIGHT_BRACE)
            .ok_or_else(|| EditError::invalid_operation("the list's owner has no `}`"))?;

        let region_len = rbrace.start() - lbrace.end();
        let tree = owner_syntax.tree();
        let region = &tree.text()[usize::from(lbrace.end())..usize::from(rbrace.start())];
        if !region.chars().all(|ch| ch.is_ascii_whitespace()) {
            // An empty list whose braces still hold comment trivia.
            return Err(EditError::NotImplemented(
                "inserting into an empty body that contains comments".to_owned(),
            ));
        }
        let replacing = Some(Replacing { text_len: region_len, nodes: Vec::new() });

        let new_text =
            format!("{newline}{indent}{item_text}{newline}{}", owner.indentation_text());
        insert_into_parent(
            ws,
            InsertRequest {
                parent: list.clone(),
                insert_pos: lbrace.end(),
                new_text: &new_text,
                child_index: 0,
                insert_count: 1,
                replacing,
            },
        )?;
    } else if index == 0 {
        let first = list_syntax.child(0).expect("list is non-empty");
        let new_text = format!("{newline}{indent}{item_text}");
        insert_into_parent(
            ws,
            InsertRequest {
                parent: list.clone(),
                insert_pos: first.pos(),
                new_text: &new_text,
                child_index: 0,
                insert_count: 1,
                replacing: None,
            },
        )?;
    } else {
        let previous = list_syntax.child(index - 1).expect("index is in range");
        let new_text = format!("{newline}{indent}{item_text}");
        insert_into_parent(
            ws,
            InsertRequest {
                parent: list.clone(),
                insert_pos: previous.end(),
                new_text: &new_text,
                child_index: index,
                insert_count: 1,
                replacing: None,
            },
        )?;
    }

    let inserted = list.syntax_node()?.child(index).ok_or_else(|| {
        EditError::tree_replacement("insertion did not produce a node at the requested index")
    })?;
    Ok(ws.factory().node_for(&inserted))
}

/// Inserts one statement into a source file's top-level list.
pub(crate) fn insert_into_file_list(
    ws: &Workspace,
    root: &Node,
    index: usize,
    item_text: &str,
) -> Result<Node> {
    let list = root.child_syntax_list_or_err(ws)?;
    let list_syntax = list.syntax_node()?;
    let count = list_syntax.child_count();
    if index > count {
        return Err(EditError::argument(format!(
            "insertion index {index} is out of range for a list of {count}",
        )));
    }

    let newline = ws.settings().newline();
    let (insert_pos, new_text) = if index == 0 {
        (TextSize::new(0), format!("{item_text}{newline}"))
    } else {
        let previous = list_syntax.child(index - 1).expect("index is in range");
        (previous.end(), format!("{newline}{item_text}"))
    };

    insert_into_parent(
        ws,
        InsertRequest {
            parent: list.clone(),
            insert_pos,
            new_text: &new_text,
            child_index: index,
            insert_count: 1,
            replacing: None,
        },
    )?;

    let inserted = list.syntax_node()?.child(index).ok_or_else(|| {
        EditError::tree_replacement("insertion did not produce a node at the requested index")
    })?;
    Ok(ws.factory().node_for(&inserted))
}
