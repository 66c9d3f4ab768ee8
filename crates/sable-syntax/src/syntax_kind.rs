#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SyntaxKind {
    // Tokens. Everything before `SOURCE_FILE` is a leaf in the tree.
    AT,
    LEFT_PAREN,
    RIGHT_PAREN,
    LEFT_BRACKET,
    RIGHT_BRACKET,
    LEFT_BRACE,
    RIGHT_BRACE,
    COLON,
    COMMA,
    SEMICOLON,
    DOT,
    EQ,
    EQEQ,
    NEQ,
    PLUS,
    MINUS,
    STAR,
    SLASH,
    BANG,
    LESS_THAN,
    GREATER_THAN,

    CLASS_KW,
    CONST_KW,
    EXPORT_KW,
    FALSE_KW,
    FUNCTION_KW,
    IMPORT_KW,
    LET_KW,
    NAMESPACE_KW,
    RETURN_KW,
    TRUE_KW,

    IDENT,
    NUMBER,
    STRING,

    UNKNOWN,
    EOF,

    // Nodes.
    SOURCE_FILE,
    SYNTAX_LIST,
    CLASS_DECL,
    METHOD_DECL,
    PROPERTY_DECL,
    PARAM_LIST,
    PARAM,
    DECORATOR,
    NAMESPACE_DECL,
    FUNCTION_DECL,
    VARIABLE_STMT,
    VARIABLE_DECL,
    IMPORT_ALIAS,
    BLOCK,
    RETURN_STMT,
    EXPR_STMT,
    PATH_TYPE,
    NAME_EXPR,
    LITERAL,
    CALL_EXPR,
    ARG_LIST,
    MEMBER_EXPR,
    PAREN_EXPR,
    BINARY_EXPR,
    PREFIX_EXPR,
    ERROR,
    TOMBSTONE,
}

impl SyntaxKind {
    /// Returns true for kinds that form interior nodes rather than tokens.
    #[inline]
    pub const fn is_node(self) -> bool {
        self as u16 >= SyntaxKind::SOURCE_FILE as u16
    }

    #[inline]
    pub const fn is_token(self) -> bool {
        !self.is_node()
    }

    #[inline]
    pub const fn is_keyword(self) -> bool {
        matches!(
            self,
            SyntaxKind::CLASS_KW
                | SyntaxKind::CONST_KW
                | SyntaxKind::EXPORT_KW
                | SyntaxKind::FALSE_KW
                | SyntaxKind::FUNCTION_KW
                | SyntaxKind::IMPORT_KW
                | SyntaxKind::LET_KW
                | SyntaxKind::NAMESPACE_KW
                | SyntaxKind::RETURN_KW
                | SyntaxKind::TRUE_KW
        )
    }
}
