use std::fmt::{self, Debug};

use expect_test::{Expect, expect};
use sable_syntax::SyntaxNode;

struct Printer(SyntaxNode);

impl Debug for Printer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_rec(f, 0, &self.0)
    }
}

fn fmt_rec(f: &mut fmt::Formatter<'_>, level: usize, node: &SyntaxNode) -> fmt::Result {
    let indent = "  ".repeat(level);
    if node.kind().is_token() {
        writeln!(f, "{}{:?} {:?}", indent, node.kind(), node.text())
    } else {
        writeln!(f, "{}{:?}", indent, node.kind())?;
        for child in node.children() {
            fmt_rec(f, level + 1, &child)?;
        }
        Ok(())
    }
}

#[track_caller]
fn check(text: &str, expected: Expect) {
    let parse = crate::parse("test.sable", text);
    let mut rendered = format!("{:?}", Printer(parse.root()));
    if !parse.diagnostics().is_empty() {
        rendered.push_str("---\n");
        for diagnostic in parse.diagnostics() {
            rendered.push_str(&format!("{:?}: {}\n", diagnostic.range(), diagnostic.message()));
        }
    }
    expected.assert_eq(&rendered);
}

#[test]
fn empty_class() {
    check(
        "class A {}",
        expect![[r#"
            SOURCE_FILE
              SYNTAX_LIST
                CLASS_DECL
                  CLASS_KW "class"
                  IDENT "A"
                  LEFT_BRACE "{"
                  SYNTAX_LIST
                  RIGHT_BRACE "}"
              EOF ""
        "#]],
    );
}

#[test]
fn decorated_exported_class_with_members() {
    check(
        "@dec\nexport class A {\n    size: Number = 0;\n    m(a: Number): Number {\n        return a + 1;\n    }\n}",
        expect![[r#"
            SOURCE_FILE
              SYNTAX_LIST
                CLASS_DECL
                  DECORATOR
                    AT "@"
                    NAME_EXPR
                      IDENT "dec"
                  EXPORT_KW "export"
                  CLASS_KW "class"
                  IDENT "A"
                  LEFT_BRACE "{"
                  SYNTAX_LIST
                    PROPERTY_DECL
                      IDENT "size"
                      COLON ":"
                      PATH_TYPE
                        IDENT "Number"
                      EQ "="
                      LITERAL
                        NUMBER "0"
                      SEMICOLON ";"
                    METHOD_DECL
                      IDENT "m"
                      PARAM_LIST
                        LEFT_PAREN "("
                        SYNTAX_LIST
                          PARAM
                            IDENT "a"
                            COLON ":"
                            PATH_TYPE
                              IDENT "Number"
                        RIGHT_PAREN ")"
                      COLON ":"
                      PATH_TYPE
                        IDENT "Number"
                      BLOCK
                        LEFT_BRACE "{"
                        SYNTAX_LIST
                          RETURN_STMT
                            RETURN_KW "return"
                            BINARY_EXPR
                              NAME_EXPR
                                IDENT "a"
                              PLUS "+"
                              LITERAL
                                NUMBER "1"
                            SEMICOLON ";"
                        RIGHT_BRACE "}"
                  RIGHT_BRACE "}"
              EOF ""
        "#]],
    );
}

#[test]
fn variables_namespaces_and_imports() {
    check(
        "namespace N {\n    const x = 1;\n}\nimport y = N.x;\nlet a: Text, b = f(a);",
        expect![[r#"
            SOURCE_FILE
              SYNTAX_LIST
                NAMESPACE_DECL
                  NAMESPACE_KW "namespace"
                  IDENT "N"
                  LEFT_BRACE "{"
                  SYNTAX_LIST
                    VARIABLE_STMT
                      CONST_KW "const"
                      VARIABLE_DECL
                        IDENT "x"
                        EQ "="
                        LITERAL
                          NUMBER "1"
                      SEMICOLON ";"
                  RIGHT_BRACE "}"
                IMPORT_ALIAS
                  IMPORT_KW "import"
                  IDENT "y"
                  EQ "="
                  IDENT "N"
                  DOT "."
                  IDENT "x"
                  SEMICOLON ";"
                VARIABLE_STMT
                  LET_KW "let"
                  VARIABLE_DECL
                    IDENT "a"
                    COLON ":"
                    PATH_TYPE
                      IDENT "Text"
                  COMMA ","
                  VARIABLE_DECL
                    IDENT "b"
                    EQ "="
                    CALL_EXPR
                      NAME_EXPR
                        IDENT "f"
                      ARG_LIST
                        LEFT_PAREN "("
                        SYNTAX_LIST
                          NAME_EXPR
                            IDENT "a"
                        RIGHT_PAREN ")"
                  SEMICOLON ";"
              EOF ""
        "#]],
    );
}

#[test]
fn recovers_from_stray_tokens() {
    check(
        "class A {}\n%\nconst x = 1;",
        expect![[r#"
            SOURCE_FILE
              SYNTAX_LIST
                CLASS_DECL
                  CLASS_KW "class"
                  IDENT "A"
                  LEFT_BRACE "{"
                  SYNTAX_LIST
                  RIGHT_BRACE "}"
                ERROR
                  UNKNOWN "%"
                VARIABLE_STMT
                  CONST_KW "const"
                  VARIABLE_DECL
                    IDENT "x"
                    EQ "="
                    LITERAL
                      NUMBER "1"
                  SEMICOLON ";"
              EOF ""
            ---
            11..12: expected a statement
        "#]],
    );
}

#[test]
fn member_and_call_chains() {
    check(
        "a.b.c(1, 2).d;",
        expect![[r#"
            SOURCE_FILE
              SYNTAX_LIST
                EXPR_STMT
                  MEMBER_EXPR
                    CALL_EXPR
                      MEMBER_EXPR
                        MEMBER_EXPR
                          NAME_EXPR
                            IDENT "a"
                          DOT "."
                          IDENT "b"
                        DOT "."
                        IDENT "c"
                      ARG_LIST
                        LEFT_PAREN "("
                        SYNTAX_LIST
                          LITERAL
                            NUMBER "1"
                          COMMA ","
                          LITERAL
                            NUMBER "2"
                        RIGHT_PAREN ")"
                    DOT "."
                    IDENT "d"
                  SEMICOLON ";"
              EOF ""
        "#]],
    );
}

#[test]
fn parse_is_total_over_garbage() {
    let parse = crate::parse("test.sable", "@@@ class 1 { ] }");
    assert_eq!(parse.root().full_text(), "@@@ class 1 { ] }");
    assert!(!parse.diagnostics().is_empty());
}
