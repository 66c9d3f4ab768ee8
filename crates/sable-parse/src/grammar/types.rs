use sable_syntax::SyntaxKind::*;

use super::STMT_FIRST;
use crate::parser::Parser;

/// Parses `: Type`. The colon lands on the annotated node, not the type.
pub(crate) fn ascription(p: &mut Parser<'_>) {
    p.expect(COLON);
    path_type(p);
}

fn path_type(p: &mut Parser<'_>) {
    if !p.at(IDENT) {
        p.error_recover("expected a type", &STMT_FIRST);
        return;
    }

    let m = p.start();
    p.advance();
    while p.eat(DOT) {
        p.expect(IDENT);
    }
    m.complete(p, PATH_TYPE);
}
