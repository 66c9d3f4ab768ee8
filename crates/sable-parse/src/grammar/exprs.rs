use sable_syntax::SyntaxKind::{self, *};
use sable_syntax::SyntaxSet;

use super::delimited_list;
use crate::parser::{CompletedMarker, Parser};

const EXPR_FIRST: SyntaxSet =
    SyntaxSet::new([IDENT, NUMBER, STRING, TRUE_KW, FALSE_KW, MINUS, BANG, LEFT_PAREN]);

/// Parses an expression. Returns `None` if no expression starts here.
pub(crate) fn expr(p: &mut Parser<'_>) -> Option<CompletedMarker> {
    expr_bp(p, 0)
}

/// The callee of a decorator: a name, member chain, or call.
pub(crate) fn decorator_expr(p: &mut Parser<'_>) {
    if postfix(p).is_none() {
        p.error("expected a decorator expression");
    }
}

fn binding_power(kind: SyntaxKind) -> Option<u8> {
    match kind {
        EQEQ | NEQ => Some(1),
        LESS_THAN | GREATER_THAN => Some(2),
        PLUS | MINUS => Some(3),
        STAR | SLASH => Some(4),
        _ => None,
    }
}

fn expr_bp(p: &mut Parser<'_>, min_bp: u8) -> Option<CompletedMarker> {
    let mut lhs = postfix(p)?;

    while let Some(bp) = binding_power(p.peek_kind()) {
        if bp < min_bp {
            break;
        }

        let m = lhs.precede(p);
        p.advance();
        if expr_bp(p, bp + 1).is_none() {
            p.error("expected a right-hand operand");
        }
        lhs = m.complete(p, BINARY_EXPR);
    }

    Some(lhs)
}

fn postfix(p: &mut Parser<'_>) -> Option<CompletedMarker> {
    let mut lhs = primary(p)?;

    loop {
        lhs = match p.peek_kind() {
            DOT => {
                let m = lhs.precede(p);
                p.advance();
                p.expect(IDENT);
                m.complete(p, MEMBER_EXPR)
            }
            LEFT_PAREN => {
                let m = lhs.precede(p);
                arg_list(p);
                m.complete(p, CALL_EXPR)
            }
            _ => return Some(lhs),
        };
    }
}

fn arg_list(p: &mut Parser<'_>) {
    let m = p.start();
    p.expect(LEFT_PAREN);
    delimited_list(p, RIGHT_PAREN, "expected an argument", &EXPR_FIRST, |p| expr(p).is_some());
    p.expect(RIGHT_PAREN);
    m.complete(p, ARG_LIST);
}

fn primary(p: &mut Parser<'_>) -> Option<CompletedMarker> {
    match p.peek_kind() {
        IDENT => {
            let m = p.start();
            p.advance();
            Some(m.complete(p, NAME_EXPR))
        }
        NUMBER | STRING | TRUE_KW | FALSE_KW => {
            let m = p.start();
            p.advance();
            Some(m.complete(p, LITERAL))
        }
        MINUS | BANG => {
            let m = p.start();
            p.advance();
            if postfix(p).is_none() {
                p.error("expected an operand");
            }
            Some(m.complete(p, PREFIX_EXPR))
        }
        LEFT_PAREN => {
            let m = p.start();
            p.advance();
            if expr(p).is_none() {
                p.error("expected an expression");
            }
            p.expect(RIGHT_PAREN);
            Some(m.complete(p, PAREN_EXPR))
        }
        _ => None,
    }
}
