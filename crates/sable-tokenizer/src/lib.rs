//! Tokenizer for sable source text.
//!
//! All trivia (whitespace, newlines, comments) is attached to the token that
//! follows it, so token positions-with-trivia tile the whole text.

mod cursor;

use ascii::AsciiChar;
use cursor::{Cursor, EOF_CHAR};
pub use sable_syntax::SyntaxKind;
use sable_syntax::SyntaxKind::*;
use sable_syntax::{Trivia, TriviaPiece, TriviaPieceKind};
use text_size::{TextRange, TextSize};

#[derive(Debug, Clone)]
pub struct Token {
    /// Trivia between the previous token and this one.
    pub leading: Trivia,
    pub kind: SyntaxKind,
    /// Range of the token text itself, trivia excluded.
    pub range: TextRange,
}

impl Token {
    const EOF: Self = Self {
        leading: Trivia::empty(),
        kind: EOF,
        range: TextRange::empty(TextSize::new(0)),
    };

    pub fn len(&self) -> TextSize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

#[derive(Clone)]
pub struct Tokenizer<'t> {
    text: &'t str,
    cursor: Cursor<'t>,
    current: Token,
    trivia_pieces: Vec<TriviaPiece>,
}

impl<'t> Tokenizer<'t> {
    pub fn new(text: &'t str) -> Self {
        let mut tokenizer = Self {
            text,
            cursor: Cursor::new(text),
            current: Token::EOF,
            trivia_pieces: Vec::with_capacity(4),
        };

        tokenizer.next_token();
        tokenizer
    }

    pub fn peek(&self) -> &Token {
        &self.current
    }

    fn offset(&self) -> TextSize {
        TextSize::of(self.text) - self.cursor.len()
    }

    fn range(&self) -> TextRange {
        let end = self.offset();
        let len = self.cursor.pos_within_token();
        TextRange::at(end - len, len)
    }

    fn text(&self) -> &'t str {
        &self.text[self.range()]
    }

    /// Returns the current token and advances to the next one.
    pub fn next_token(&mut self) -> Token {
        self.trivia();
        let leading = match self.trivia_pieces.as_slice() {
            [] => Trivia::empty(),
            pieces => Trivia::new(pieces),
        };
        self.trivia_pieces.clear();

        let (kind, range) = self.syntax_kind();
        std::mem::replace(&mut self.current, Token { leading, kind, range })
    }

    fn trivia(&mut self) {
        loop {
            let kind = match self.cursor.peek() {
                '/' if self.cursor.second() == '/' => {
                    self.cursor.advance_until(AsciiChar::LineFeed);
                    TriviaPieceKind::LineComment
                }
                '/' if self.cursor.second() == '*' => {
                    self.block_comment();
                    TriviaPieceKind::BlockComment
                }
                '\n' | '\r' => {
                    self.cursor.advance_while(|ch| matches!(ch, '\n' | '\r'));
                    TriviaPieceKind::Newline
                }
                ' ' | '\t' => {
                    self.cursor.advance_while(|ch| matches!(ch, ' ' | '\t'));
                    TriviaPieceKind::Whitespace
                }
                _ => break,
            };

            self.trivia_pieces.push(TriviaPiece::new(kind, self.cursor.pos_within_token()));
            self.cursor.reset_pos_within_token();
        }
    }

    fn block_comment(&mut self) {
        self.cursor.advance();
        self.cursor.advance();
        loop {
            match self.cursor.peek() {
                EOF_CHAR => break,
                '*' if self.cursor.second() == '/' => {
                    self.cursor.advance();
                    self.cursor.advance();
                    break;
                }
                _ => {
                    self.cursor.advance();
                }
            }
        }
    }

    fn syntax_kind(&mut self) -> (SyntaxKind, TextRange) {
        let kind = match self.cursor.advance() {
            '@' => AT,
            '(' => LEFT_PAREN,
            ')' => RIGHT_PAREN,
            '[' => LEFT_BRACKET,
            ']' => RIGHT_BRACKET,
            '{' => LEFT_BRACE,
            '}' => RIGHT_BRACE,
            ':' => COLON,
            ',' => COMMA,
            ';' => SEMICOLON,
            '.' => DOT,
            '+' => PLUS,
            '-' => MINUS,
            '*' => STAR,
            '/' => SLASH,
            '=' => {
                if self.cursor.matches('=') {
                    self.cursor.advance();
                    EQEQ
                } else {
                    EQ
                }
            }
            '!' => {
                if self.cursor.matches('=') {
                    self.cursor.advance();
                    NEQ
                } else {
                    BANG
                }
            }
            '<' => LESS_THAN,
            '>' => GREATER_THAN,
            '"' => self.string_literal(),
            '0'..='9' => self.number(),
            'A'..='Z' | 'a'..='z' | '_' => self.identifier_or_keyword(),
            EOF_CHAR => EOF,
            _ => UNKNOWN,
        };

        let range = self.range();
        self.cursor.reset_pos_within_token();

        (kind, range)
    }

    fn identifier_or_keyword(&mut self) -> SyntaxKind {
        self.cursor.advance_while(|ch| ch.is_ascii_alphanumeric() || ch == '_');

        match self.text() {
            "class" => CLASS_KW,
            "const" => CONST_KW,
            "export" => EXPORT_KW,
            "false" => FALSE_KW,
            "function" => FUNCTION_KW,
            "import" => IMPORT_KW,
            "let" => LET_KW,
            "namespace" => NAMESPACE_KW,
            "return" => RETURN_KW,
            "true" => TRUE_KW,
            _ => IDENT,
        }
    }

    fn number(&mut self) -> SyntaxKind {
        self.cursor.advance_while(|ch| ch.is_ascii_digit() || ch == '_');
        if self.cursor.matches('.') && self.cursor.second().is_ascii_digit() {
            self.cursor.advance();
            self.cursor.advance_while(|ch| ch.is_ascii_digit() || ch == '_');
        }
        NUMBER
    }

    fn string_literal(&mut self) -> SyntaxKind {
        loop {
            match self.cursor.peek() {
                '"' => {
                    self.cursor.advance();
                    break;
                }
                '\\' => {
                    self.cursor.advance();
                    if self.cursor.peek() != EOF_CHAR {
                        self.cursor.advance();
                    }
                }
                EOF_CHAR | '\n' => break,
                _ => {
                    self.cursor.advance();
                }
            }
        }
        STRING
    }
}
