use sable_syntax::SyntaxKind::{self, *};
use sable_syntax::SyntaxSet;

use crate::parser::Parser;

mod exprs;
pub(crate) mod items;
mod types;

/// Kinds that can begin a statement; used as recovery points.
pub(crate) const STMT_FIRST: SyntaxSet = SyntaxSet::new([
    AT,
    CLASS_KW,
    CONST_KW,
    EXPORT_KW,
    FUNCTION_KW,
    IMPORT_KW,
    LET_KW,
    NAMESPACE_KW,
    RETURN_KW,
    RIGHT_BRACE,
]);

pub(crate) fn name(p: &mut Parser<'_>, recovery: &SyntaxSet) {
    if p.at(IDENT) {
        p.advance();
    } else {
        p.error_recover("expected identifier", recovery);
    }
}

/// Parses a brace-delimited `SYNTAX_LIST` of items.
pub(crate) fn braced_list(
    p: &mut Parser<'_>,
    mut item: impl FnMut(&mut Parser<'_>),
) {
    p.expect(LEFT_BRACE);
    let m = p.start();
    while !matches!(p.peek_kind(), RIGHT_BRACE | EOF) {
        item(p);
    }
    m.complete(p, SYNTAX_LIST);
    p.expect(RIGHT_BRACE);
}

/// Parses a paren-delimited, comma-separated `SYNTAX_LIST`.
///
/// Separators live inside the list, between the items they separate.
pub(crate) fn delimited_list(
    p: &mut Parser<'_>,
    ket: SyntaxKind,
    unexpected_message: &'static str,
    first_set: &SyntaxSet,
    mut item: impl FnMut(&mut Parser<'_>) -> bool,
) {
    let m = p.start();
    while !p.at(ket) && !p.at(EOF) {
        if p.at(COMMA) {
            p.error_and_bump(unexpected_message);
            continue;
        }

        if !item(p) {
            break;
        }

        if !p.at(ket) && !p.eat(COMMA) {
            if first_set.contains(p.peek_kind()) {
                p.expect(COMMA);
            } else {
                break;
            }
        }
    }
    m.complete(p, SYNTAX_LIST);
}
