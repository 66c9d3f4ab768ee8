use sable_syntax::SyntaxKind::*;
use sable_syntax::SyntaxSet;

use super::{STMT_FIRST, braced_list, delimited_list, exprs, name, types};

const PARAM_FIRST: SyntaxSet = SyntaxSet::new([IDENT]);
use crate::parser::Parser;

pub(crate) fn source_file(p: &mut Parser<'_>) {
    let m = p.start();

    let list = p.start();
    while !p.at(EOF) {
        statement(p);
    }
    list.complete(p, SYNTAX_LIST);

    p.advance_eof();
    m.complete(p, SOURCE_FILE);
}

pub(crate) fn statement(p: &mut Parser<'_>) {
    match p.peek_kind() {
        AT | CLASS_KW | CONST_KW | EXPORT_KW | FUNCTION_KW | IMPORT_KW | LET_KW | NAMESPACE_KW => {
            declaration(p);
        }
        RETURN_KW => return_stmt(p),
        SEMICOLON => p.error_and_bump("expected a statement, found `;`"),
        _ => expr_stmt(p),
    }
}

fn declaration(p: &mut Parser<'_>) {
    let m = p.start();

    while p.at(AT) {
        decorator(p);
    }
    p.eat(EXPORT_KW);

    match p.peek_kind() {
        CLASS_KW => {
            p.advance();
            name(p, &STMT_FIRST);
            braced_list(p, member);
            m.complete(p, CLASS_DECL);
        }
        FUNCTION_KW => {
            p.advance();
            name(p, &STMT_FIRST);
            param_list(p);
            if p.at(COLON) {
                types::ascription(p);
            }
            block(p);
            m.complete(p, FUNCTION_DECL);
        }
        NAMESPACE_KW => {
            p.advance();
            name(p, &STMT_FIRST);
            braced_list(p, statement);
            m.complete(p, NAMESPACE_DECL);
        }
        CONST_KW | LET_KW => {
            p.advance();
            variable_declarator(p);
            while p.eat(COMMA) {
                variable_declarator(p);
            }
            p.expect(SEMICOLON);
            m.complete(p, VARIABLE_STMT);
        }
        IMPORT_KW => {
            p.advance();
            name(p, &STMT_FIRST);
            p.expect(EQ);
            name(p, &STMT_FIRST);
            while p.eat(DOT) {
                name(p, &STMT_FIRST);
            }
            p.expect(SEMICOLON);
            m.complete(p, IMPORT_ALIAS);
        }
        _ => {
            // At least a decorator or `export` was consumed to get here.
            p.error("expected a declaration");
            m.complete(p, ERROR);
        }
    }
}

fn variable_declarator(p: &mut Parser<'_>) {
    let m = p.start();
    name(p, &STMT_FIRST);
    if p.at(COLON) {
        types::ascription(p);
    }
    if p.eat(EQ) {
        exprs::expr(p);
    }
    m.complete(p, VARIABLE_DECL);
}

fn decorator(p: &mut Parser<'_>) {
    let m = p.start();
    p.advance();
    exprs::decorator_expr(p);
    m.complete(p, DECORATOR);
}

/// A class member: a method or a property, optionally decorated.
fn member(p: &mut Parser<'_>) {
    if !p.at(AT) && !p.at(IDENT) {
        p.error_and_bump("expected a class member");
        return;
    }

    let m = p.start();

    while p.at(AT) {
        decorator(p);
    }

    if !p.at(IDENT) {
        p.error("expected a class member");
        if !matches!(p.peek_kind(), RIGHT_BRACE | EOF) {
            p.advance();
        }
        m.complete(p, ERROR);
        return;
    }
    p.advance();

    if p.at(LEFT_PAREN) {
        param_list(p);
        if p.at(COLON) {
            types::ascription(p);
        }
        block(p);
        m.complete(p, METHOD_DECL);
    } else {
        if p.at(COLON) {
            types::ascription(p);
        }
        if p.eat(EQ) {
            exprs::expr(p);
        }
        p.expect(SEMICOLON);
        m.complete(p, PROPERTY_DECL);
    }
}

fn param_list(p: &mut Parser<'_>) {
    let m = p.start();
    p.expect(LEFT_PAREN);
    delimited_list(p, RIGHT_PAREN, "expected a parameter", &PARAM_FIRST, param);
    p.expect(RIGHT_PAREN);
    m.complete(p, PARAM_LIST);
}

fn param(p: &mut Parser<'_>) -> bool {
    if !p.at(IDENT) {
        p.error("expected parameter name");
        return false;
    }

    let m = p.start();
    p.advance();
    if p.at(COLON) {
        types::ascription(p);
    }
    m.complete(p, PARAM);
    true
}

pub(crate) fn block(p: &mut Parser<'_>) {
    let m = p.start();
    braced_list(p, statement);
    m.complete(p, BLOCK);
}

fn return_stmt(p: &mut Parser<'_>) {
    let m = p.start();
    p.advance();
    if !p.at(SEMICOLON) && !p.at(RIGHT_BRACE) && !p.at(EOF) {
        exprs::expr(p);
    }
    p.expect(SEMICOLON);
    m.complete(p, RETURN_STMT);
}

fn expr_stmt(p: &mut Parser<'_>) {
    let m = p.start();
    if exprs::expr(p).is_none() {
        m.abandon(p);
        p.error_and_bump("expected a statement");
        return;
    }
    p.expect(SEMICOLON);
    m.complete(p, EXPR_STMT);
}
