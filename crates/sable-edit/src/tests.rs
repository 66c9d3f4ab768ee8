use std::rc::Rc;

use camino::Utf8Path;
use expect_test::expect;
use sable_syntax::SyntaxKind::*;
use sable_vfs::{FileSystemHost, MemoryFileSystem};
use text_size::{TextRange, TextSize};

use crate::views::{ClassDecl, MethodDecl, NamespaceDecl, View};
use crate::{EditError, EditSettings, NewLineKind, Node, SourceFile, Workspace};

fn workspace() -> Workspace {
    Workspace::with_host(Rc::new(MemoryFileSystem::new()))
}

fn single_file(text: &str) -> (Workspace, SourceFile) {
    let ws = workspace();
    let file = ws.create_source_file("/lib.sable", text).unwrap();
    (ws, file)
}

fn class_of(ws: &Workspace, file: &SourceFile) -> ClassDecl {
    file.statements(ws).into_iter().find_map(ClassDecl::cast).expect("file declares a class")
}

#[track_caller]
fn assert_positions_consistent(ws: &Workspace, file: &SourceFile) {
    let root = file.node().clone();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        assert!(node.pos() <= node.start());
        assert!(node.start() <= node.end());
        let children = node.children(ws);
        for pair in children.windows(2) {
            assert!(pair[0].end() <= pair[1].pos(), "{pair:?} overlap");
        }
        stack.extend(children);
    }
}

// --- the concrete edit scenarios -----------------------------------------

#[test]
fn add_export_modifier() {
    let (ws, file) = single_file("class A {}");
    let class = class_of(&ws, &file);

    class.set_exported(&ws, true).unwrap();

    assert_eq!(file.full_text(), "export class A {}");
    assert!(!class.node().is_disposed());
    assert!(class.has_export_keyword());
    assert_eq!(class.name_text(&ws).as_deref(), Some("A"));
    assert_positions_consistent(&ws, &file);
}

#[test]
fn remove_export_modifier() {
    let (ws, file) = single_file("export class A {}");
    let class = class_of(&ws, &file);

    class.set_exported(&ws, false).unwrap();

    assert_eq!(file.full_text(), "class A {}");
    assert!(!class.has_export_keyword());
    assert_eq!(u32::from(class.node().start()), 0);
}

#[test]
fn remove_decorator_on_its_own_line() {
    let (ws, file) = single_file("@dec\nclass A {}");
    let class = class_of(&ws, &file);
    let class_node = class.node().clone();
    let decorator = class.decorators(&ws).into_iter().next().unwrap();

    decorator.remove(&ws).unwrap();

    assert_eq!(file.full_text(), "class A {}");
    assert!(decorator.node().is_disposed());
    assert!(!class_node.is_disposed());
    assert_eq!(u32::from(class_node.start()), 0);
    assert_positions_consistent(&ws, &file);
}

#[test]
fn remove_decorator_on_a_member_keeps_indentation() {
    let (ws, file) = single_file("class A {\n    @dec\n    m() {}\n}");
    let class = class_of(&ws, &file);
    let method = class.members(&ws).into_iter().next().unwrap();
    let decorator = method.first_child_by_kind(&ws, DECORATOR).unwrap();
    let decorator = crate::views::Decorator::cast(decorator).unwrap();

    decorator.remove(&ws).unwrap();

    assert_eq!(file.full_text(), "class A {\n    m() {}\n}");
    assert!(decorator.node().is_disposed());
    assert!(!method.is_disposed());
    assert_eq!(method.indentation_text(), "    ");
    assert_positions_consistent(&ws, &file);
}

#[test]
fn replace_identifier_with_text() {
    let (ws, file) = single_file("const x = 1;");
    let ident = file.node().descendant_at_pos(&ws, 6.into()).unwrap();
    assert_eq!(ident.kind(), IDENT);

    let replacement = ident.replace_with_text(&ws, "yy").unwrap();

    assert_eq!(file.full_text(), "const yy = 1;");
    assert!(ident.is_disposed());
    assert!(matches!(ident.syntax_node(), Err(EditError::InvalidOperation(_))));

    let found = file.node().descendant_at_pos(&ws, 6.into()).unwrap();
    assert_eq!(found, replacement);
    assert_eq!(found.kind(), IDENT);
    assert_eq!(found.text(), "yy");
}

#[test]
fn insert_method_into_empty_class() {
    let (ws, file) = single_file("class A {\n}");
    let class = class_of(&ws, &file);

    let method = class.insert_member_text(&ws, 0, "m() {}").unwrap();

    assert_eq!(file.full_text(), "class A {\n    m() {}\n}");
    assert_eq!(method.kind(), METHOD_DECL);
    assert!(!class.node().is_disposed());

    let members = class.members(&ws);
    assert_eq!(members, vec![method]);
    assert_positions_consistent(&ws, &file);
}

#[test]
fn insert_second_method_keeps_the_first_wrapper() {
    let (ws, file) = single_file("class A {\n    first() {}\n}");
    let class = class_of(&ws, &file);
    let first = class.members(&ws).into_iter().next().unwrap();

    let second = class.insert_member_text(&ws, 1, "second() {}").unwrap();

    assert_eq!(file.full_text(), "class A {\n    first() {}\n    second() {}\n}");
    assert!(!first.is_disposed());
    assert_eq!(class.members(&ws), vec![first, second]);
}

#[test]
fn unwrap_namespace() {
    let (ws, file) = single_file("namespace N {\n    const x = 1;\n}");
    let namespace =
        file.statements(&ws).into_iter().find_map(NamespaceDecl::cast).unwrap();
    let statement = namespace.statements(&ws).into_iter().next().unwrap();

    namespace.unwrap(&ws).unwrap();

    assert_eq!(file.full_text(), "const x = 1;\n");
    assert!(namespace.node().is_disposed());
    assert!(!statement.is_disposed());
    assert_eq!(u32::from(statement.start()), 0);
    assert_eq!(file.statements(&ws), vec![statement]);
    assert_positions_consistent(&ws, &file);
}

// --- wrapper identity and cache invariants --------------------------------

#[test]
fn wrappers_are_unique_per_node() {
    let (ws, file) = single_file("class A {\n    m() {}\n}");
    let first = file.node().descendant_at_pos(&ws, 14.into()).unwrap();
    let second = file.node().descendant_at_pos(&ws, 14.into()).unwrap();
    assert_eq!(first, second);

    let via_children = class_of(&ws, &file)
        .members(&ws)
        .into_iter()
        .next()
        .unwrap()
        .first_child_by_kind(&ws, IDENT)
        .unwrap();
    assert_eq!(via_children, first);
}

#[test]
fn edits_preserve_identity_of_surviving_wrappers() {
    let (ws, file) = single_file("class A {}\nconst x = 1;");
    let class = class_of(&ws, &file);
    let statements = file.statements(&ws);
    let variable = statements[1].clone();

    class.set_exported(&ws, true).unwrap();

    // Both statements are resolved again after the reparse; the wrapper
    // objects must be the same ones.
    let statements_after = file.statements(&ws);
    assert_eq!(statements_after[0], *class.node());
    assert_eq!(statements_after[1], variable);
    assert_eq!(variable.text(), "const x = 1;");
}

#[test]
fn dispose_is_recursive_and_idempotent() {
    let (ws, file) = single_file("class A {\n    m() {}\n}");
    let class = class_of(&ws, &file);
    let method = class.members(&ws).into_iter().next().unwrap();
    let name = method.first_child_by_kind(&ws, IDENT).unwrap();
    let count_before = ws.factory().node_count();

    class.node().dispose(&ws);

    assert!(class.node().is_disposed());
    assert!(method.is_disposed());
    assert!(name.is_disposed());
    assert!(ws.factory().node_count() < count_before);

    // A second dispose is a no-op.
    class.node().dispose(&ws);
    method.dispose_only_this(&ws);
}

#[test]
fn disposed_wrappers_only_support_identity() {
    let (ws, file) = single_file("const x = 1;");
    let ident = file.node().descendant_at_pos(&ws, 6.into()).unwrap();
    let same = ident.clone();

    ident.dispose(&ws);

    assert_eq!(ident, same);
    assert!(matches!(ident.syntax_node(), Err(EditError::InvalidOperation(_))));
}

// --- navigation and positional queries ------------------------------------

#[test]
fn descendants_match_recursive_children() {
    fn collect(ws: &Workspace, node: &Node, out: &mut Vec<Node>) {
        for child in node.children(ws) {
            out.push(child.clone());
            collect(ws, &child, out);
        }
    }

    let (ws, file) = single_file("class A {\n    m(a: Number) {\n        return a;\n    }\n}");
    let mut expected = Vec::new();
    collect(&ws, file.node(), &mut expected);
    assert_eq!(file.node().descendants(&ws), expected);

    let lazy: Vec<Node> = file.node().descendants_iter(&ws).collect();
    assert_eq!(lazy, expected);
}

#[test]
fn siblings_partition_the_parent() {
    let (ws, file) = single_file("const a = 1;\nconst b = 2;\nconst c = 3;");
    let statements = file.statements(&ws);
    let middle = statements[1].clone();

    let mut reconstructed: Vec<Node> =
        middle.previous_siblings(&ws).into_iter().rev().collect();
    reconstructed.push(middle.clone());
    reconstructed.extend(middle.next_siblings(&ws));
    assert_eq!(reconstructed, statements);

    assert_eq!(middle.previous_sibling(&ws), Some(statements[0].clone()));
    assert_eq!(middle.next_sibling(&ws), Some(statements[2].clone()));
    assert_eq!(statements[0].previous_sibling(&ws), None);
}

#[test]
fn descendant_at_pos_always_contains_the_position() {
    let (ws, file) = single_file("class A {\n    m() {}\n}\nconst x = f(1);\n");
    let end = u32::from(file.node().end());
    for pos in 0..end {
        let pos = TextSize::new(pos);
        let node = file.node().descendant_at_pos(&ws, pos).unwrap();
        assert!(node.contains_range(pos, pos), "{node:?} at {pos:?}");
    }
}

#[test]
fn syntax_list_discovery() {
    let (ws, file) = single_file("class A {\n    m() {}\n}");
    let class = class_of(&ws, &file);
    let list = class.node().child_syntax_list(&ws).unwrap();
    assert_eq!(list.kind(), SYNTAX_LIST);

    let method = class.members(&ws).into_iter().next().unwrap();
    assert_eq!(method.parent_syntax_list(&ws), Some(list.clone()));
    assert_eq!(method.parent(&ws).as_ref(), Some(class.node()));

    // A method's own list is its body's statement list.
    let method_view = MethodDecl::cast(method).unwrap();
    let body_list = method_view.node().child_syntax_list(&ws).unwrap();
    assert_eq!(body_list.parent(&ws), method_view.body(&ws));

    // The class keyword is not in any list.
    let keyword = class.node().first_child_by_kind(&ws, CLASS_KW).unwrap();
    assert_eq!(keyword.parent_syntax_list(&ws), None);
}

#[test]
fn kind_filtered_lookups() {
    let (ws, file) = single_file("@dec\nexport class A {\n    m() {}\n}");
    let class = class_of(&ws, &file);

    assert_eq!(class.node().first_child_if_kind(&ws, DECORATOR).unwrap().kind(), DECORATOR);
    assert!(class.node().first_child_if_kind(&ws, CLASS_KW).is_none());
    assert_eq!(class.node().first_child_by_kind(&ws, CLASS_KW).unwrap().text(), "class");
    assert_eq!(class.node().last_child_by_kind(&ws, RIGHT_BRACE).unwrap().text(), "}");

    let method = class.members(&ws).into_iter().next().unwrap();
    assert_eq!(
        method.first_ancestor_by_kind(&ws, SOURCE_FILE).as_ref(),
        Some(file.node()),
    );
    assert_eq!(method.parent_if_kind(&ws, CLASS_DECL).as_ref(), Some(class.node()));
    assert!(method.parent_if_kind(&ws, BLOCK).is_none());

    let err = method.first_child_by_kind_or_err(&ws, DECORATOR).unwrap_err();
    assert!(err.to_string().contains("DECORATOR"), "{err}");

    let export = class.node().first_child_by_kind(&ws, EXPORT_KW).unwrap();
    assert_eq!(export.next_sibling_by_kind(&ws, IDENT).unwrap().text(), "A");
    assert_eq!(export.previous_sibling_if_kind(&ws, DECORATOR).unwrap().kind(), DECORATOR);
}

#[test]
fn descendant_at_start_with_width() {
    let (ws, file) = single_file("const x = f(1);");
    // `f(1)` spans [10, 14).
    let call = file
        .node()
        .descendant_at_start_with_width(&ws, 10.into(), 4.into())
        .unwrap();
    assert_eq!(call.kind(), CALL_EXPR);

    // Width 1 at the same start is the `f` identifier, the deepest match.
    let f = file
        .node()
        .descendant_at_start_with_width(&ws, 10.into(), 1.into())
        .unwrap();
    assert_eq!(f.kind(), IDENT);
    assert!(file.node().descendant_at_start_with_width(&ws, 10.into(), 3.into()).is_none());
}

#[test]
fn parent_of_root_errors() {
    let (ws, file) = single_file("class A {}");
    assert!(file.node().parent(&ws).is_none());
    assert!(matches!(
        file.node().parent_or_err(&ws),
        Err(EditError::InvalidOperation(_)),
    ));
}

#[test]
fn indentation_and_line_queries() {
    let (ws, file) = single_file("class A {\n    m() {}\n}");
    let method = class_of(&ws, &file).members(&ws).into_iter().next().unwrap();

    assert_eq!(method.indentation_text(), "    ");
    assert_eq!(method.child_indentation_text(&ws), "        ");
    assert!(method.is_first_node_on_line());

    let name = method.first_child_by_kind(&ws, IDENT).unwrap();
    assert!(name.is_first_node_on_line());
    let paren = method.first_descendant_by_kind(&ws, LEFT_PAREN).unwrap();
    assert!(!paren.is_first_node_on_line());

    assert_eq!(file.line_col(&ws, 14.into()).unwrap(), (1, 4));
}

#[test]
fn offset_positions_shifts_a_subtree() {
    let (ws, file) = single_file("const x = 1;");
    let statement = file.statements(&ws)[0].clone();
    let start_before = statement.start();

    statement.offset_positions(3).unwrap();
    assert_eq!(statement.start(), start_before + TextSize::new(3));
    statement.offset_positions(-3).unwrap();
    assert_eq!(statement.start(), start_before);

    assert!(matches!(
        statement.offset_positions(-100),
        Err(EditError::Argument(_)),
    ));
}

// --- source file operations -----------------------------------------------

#[test]
fn replace_text_reparses_and_keeps_the_file_wrapper() {
    let (ws, file) = single_file("const x = 1;");
    let ident = file.node().descendant_at_pos(&ws, 6.into()).unwrap();

    file.replace_text(&ws, TextRange::new(10.into(), 11.into()), "42").unwrap();

    assert_eq!(file.full_text(), "const x = 42;");
    assert!(!file.node().is_disposed());
    assert!(ident.is_disposed());
    assert_eq!(file.statements(&ws).len(), 1);
}

#[test]
fn save_writes_through_the_host() {
    let host = Rc::new(MemoryFileSystem::new());
    let ws = Workspace::with_host(host.clone());
    let file = ws.create_source_file("/src/lib.sable", "class A {}").unwrap();
    assert!(!file.is_saved(&ws));

    file.save(&ws).unwrap();
    assert!(file.is_saved(&ws));
    let path = Utf8Path::new("/src/lib.sable");
    assert_eq!(host.read_file(path).unwrap(), "class A {}");

    // An edit marks the file unsaved again.
    class_of(&ws, &file).set_exported(&ws, true).unwrap();
    assert!(!file.is_saved(&ws));
    file.save(&ws).unwrap();
    assert_eq!(host.read_file(path).unwrap(), "export class A {}");
}

#[test]
fn open_missing_file_is_file_not_found() {
    let ws = workspace();
    assert!(matches!(
        ws.open_source_file("/missing.sable"),
        Err(EditError::FileNotFound(_)),
    ));
}

#[test]
fn add_source_files_by_glob() {
    let host = Rc::new(MemoryFileSystem::with_files([
        ("/src/a.sable", "class A {}"),
        ("/src/b.sable", "class B {}"),
        ("/src/ignore.txt", ""),
    ]));
    let ws = Workspace::with_host(host);

    let added = ws.add_source_files_by_glob(&["**/*.sable"]).unwrap();
    assert_eq!(added.len(), 2);
    assert!(ws.source_file("/src/a.sable").is_some());
    assert!(ws.source_file("/src/missing.sable").is_none());

    // Already-open files are not reopened.
    assert!(ws.add_source_files_by_glob(&["**/*.sable"]).unwrap().is_empty());
}

#[test]
fn insert_statement_text_at_top_level() {
    let (ws, file) = single_file("const a = 1;");
    let existing = file.statements(&ws)[0].clone();

    let inserted = file.insert_statement_text(&ws, 1, "const b = 2;").unwrap();
    assert_eq!(file.full_text(), "const a = 1;\nconst b = 2;");
    assert_eq!(inserted.kind(), VARIABLE_STMT);
    assert!(!existing.is_disposed());

    let first = file.insert_statement_text(&ws, 0, "const z = 0;").unwrap();
    assert_eq!(file.full_text(), "const z = 0;\nconst a = 1;\nconst b = 2;");
    assert_eq!(file.statements(&ws), vec![first, existing, inserted]);
}

#[test]
fn insert_parameter_text() {
    let (ws, file) = single_file("class A {\n    m(a: Number) {}\n}");
    let method = class_of(&ws, &file)
        .members(&ws)
        .into_iter()
        .find_map(MethodDecl::cast)
        .unwrap();
    let first = method.parameters(&ws)[0].clone();

    let appended = method.insert_parameter_text(&ws, 1, "b: Text").unwrap();
    assert_eq!(file.full_text(), "class A {\n    m(a: Number, b: Text) {}\n}");
    assert!(!first.is_disposed());

    let prepended = method.insert_parameter_text(&ws, 0, "z: Flag").unwrap();
    assert_eq!(file.full_text(), "class A {\n    m(z: Flag, a: Number, b: Text) {}\n}");
    assert_eq!(method.parameters(&ws), vec![prepended, first, appended]);
}

#[test]
fn crlf_settings_shape_inserted_text() {
    let ws = Workspace::with_host(Rc::new(MemoryFileSystem::new()))
        .with_settings(EditSettings::new().with_newline_kind(NewLineKind::CrLf));
    let file = ws.create_source_file("/lib.sable", "class A {\r\n}").unwrap();
    let class = file.statements(&ws).into_iter().find_map(ClassDecl::cast).unwrap();

    class.insert_member_text(&ws, 0, "m() {}").unwrap();
    assert_eq!(file.full_text(), "class A {\r\n    m() {}\r\n}");
}

#[test]
fn forget_file_disposes_its_wrappers() {
    let (ws, file) = single_file("class A {}");
    let class_node = class_of(&ws, &file).node().clone();

    assert!(ws.forget_file("/lib.sable"));
    assert!(class_node.is_disposed());
    assert!(file.node().is_disposed());
    assert!(ws.source_file("/lib.sable").is_none());
    assert!(!ws.forget_file("/lib.sable"));
}

// --- symbols ---------------------------------------------------------------

#[test]
fn symbols_are_unique_and_follow_aliases() {
    let (ws, file) = single_file("class A {}\nimport B = A;\nconst c = A;");
    let class = class_of(&ws, &file);

    let class_symbol = class.node().symbol(&ws).unwrap();
    assert_eq!(class_symbol.name(), "A");
    assert_eq!(class.node().symbol(&ws).unwrap(), class_symbol);
    assert_eq!(class_symbol.declaration(&ws), *class.node());

    let alias = file
        .statements(&ws)
        .into_iter()
        .find_map(crate::views::ImportAlias::cast)
        .unwrap();
    let target = alias.target_symbol(&ws).unwrap();
    assert_eq!(target, class_symbol);

    // A reference resolves to the same symbol wrapper.
    let reference = file.node().descendant_at_pos(&ws, 35.into()).unwrap();
    assert_eq!(reference.kind(), IDENT);
    assert_eq!(reference.symbol(&ws).unwrap(), class_symbol);
}

// --- tree shape after edits ------------------------------------------------

#[test]
fn tree_shape_after_member_insertion() {
    let (ws, file) = single_file("class A {\n}");
    class_of(&ws, &file).insert_member_text(&ws, 0, "m() {}").unwrap();

    let mut rendered = String::new();
    let mut stack = vec![(file.node().clone(), 0usize)];
    while let Some((node, depth)) = stack.pop() {
        rendered.push_str(&"  ".repeat(depth));
        rendered.push_str(&format!("{:?}\n", node.kind()));
        for child in node.children(&ws).into_iter().rev() {
            stack.push((child, depth + 1));
        }
    }

    expect![[r#"
        SOURCE_FILE
          SYNTAX_LIST
            CLASS_DECL
              CLASS_KW
              IDENT
              LEFT_BRACE
              SYNTAX_LIST
                METHOD_DECL
                  IDENT
                  PARAM_LIST
                    LEFT_PAREN
                    SYNTAX_LIST
                    RIGHT_PAREN
                  BLOCK
                    LEFT_BRACE
                    SYNTAX_LIST
                    RIGHT_BRACE
              RIGHT_BRACE
          EOF
    "#]]
    .assert_eq(&rendered);
}
