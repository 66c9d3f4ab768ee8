use drop_bomb::DropBomb;
use sable_errors::Diagnostic;
use sable_syntax::{Builder, SyntaxKind, SyntaxSet, SyntaxTree};
use sable_tokenizer::{Token, Tokenizer};
use triomphe::Arc;

pub(crate) struct Parser<'t> {
    tokenizer: Tokenizer<'t>,
    events: Vec<Event>,
    diagnostics: Vec<Diagnostic>,
}

impl<'t> Parser<'t> {
    pub(crate) fn new(text: &'t str) -> Self {
        Self { tokenizer: Tokenizer::new(text), events: Vec::new(), diagnostics: Vec::new() }
    }

    pub(crate) fn peek_kind(&self) -> SyntaxKind {
        self.tokenizer.peek().kind
    }

    pub(crate) fn at(&self, kind: SyntaxKind) -> bool {
        self.peek_kind() == kind
    }

    pub(crate) fn advance(&mut self) {
        if self.at(SyntaxKind::EOF) {
            return;
        }

        let token = self.tokenizer.next_token();
        self.events.push(Event::Token(token));
    }

    pub(crate) fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, kind: SyntaxKind) {
        if !self.eat(kind) {
            self.error(format!("expected {kind:?}, found {:?}", self.peek_kind()));
        }
    }

    /// Consumes the end-of-file token so its leading trivia lands in the tree.
    pub(crate) fn advance_eof(&mut self) {
        debug_assert!(self.at(SyntaxKind::EOF));
        let token = self.tokenizer.next_token();
        self.events.push(Event::Token(token));
    }

    pub(crate) fn error(&mut self, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::error(message, self.tokenizer.peek().range));
    }

    /// Reports an error and wraps the offending token in an `ERROR` node.
    pub(crate) fn error_and_bump(&mut self, message: &str) {
        let m = self.start();
        self.error(message);
        self.advance();
        m.complete(self, SyntaxKind::ERROR);
    }

    /// Reports an error; skips the token unless it is a recovery point.
    pub(crate) fn error_recover(&mut self, message: &str, recovery: &SyntaxSet) {
        if recovery.contains(self.peek_kind()) || self.at(SyntaxKind::EOF) {
            self.error(message);
        } else {
            self.error_and_bump(message);
        }
    }

    pub(crate) fn start(&mut self) -> Marker {
        let pos = self.events.len() as u32;
        self.events.push(Event::TOMBSTONE);
        Marker::new(pos)
    }

    pub(crate) fn finish(self, path: impl Into<camino::Utf8PathBuf>, text: &str) -> Finished {
        let Parser { tokenizer: _, mut events, diagnostics } = self;
        let mut builder = Builder::new(path, text);
        let mut forward_parents = Vec::new();

        for i in 0..events.len() {
            match std::mem::replace(&mut events[i], Event::TOMBSTONE) {
                Event::Start { kind, forward_parent } => {
                    if kind == SyntaxKind::TOMBSTONE {
                        continue;
                    }

                    forward_parents.push(kind);
                    let mut idx = i;
                    let mut fp = forward_parent;
                    while let Some(fwd) = fp {
                        idx += fwd as usize;

                        fp = match std::mem::replace(&mut events[idx], Event::TOMBSTONE) {
                            Event::Start { kind, forward_parent } => {
                                if kind != SyntaxKind::TOMBSTONE {
                                    forward_parents.push(kind);
                                }
                                forward_parent
                            }
                            _ => unreachable!(),
                        };
                    }

                    for kind in forward_parents.drain(..).rev() {
                        builder.start_node(kind);
                    }
                }
                Event::Finish => builder.finish_node(),
                Event::Token(Token { leading, kind, range }) => {
                    builder.token(&leading, kind, range.len());
                }
            }
        }

        Finished { tree: builder.finish(), diagnostics }
    }
}

pub(crate) struct Finished {
    pub(crate) tree: Arc<SyntaxTree>,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

enum Event {
    Start { kind: SyntaxKind, forward_parent: Option<u32> },
    Token(Token),
    Finish,
}

impl Event {
    const TOMBSTONE: Self = Event::Start { kind: SyntaxKind::TOMBSTONE, forward_parent: None };
}

pub(crate) struct Marker {
    position: u32,
    bomb: DropBomb,
}

impl Marker {
    fn new(position: u32) -> Marker {
        Marker { position, bomb: DropBomb::new("Marker must be either completed or abandoned") }
    }

    pub(crate) fn complete(mut self, p: &mut Parser<'_>, kind: SyntaxKind) -> CompletedMarker {
        self.bomb.defuse();

        match &mut p.events[self.position as usize] {
            Event::Start { kind: slot, .. } => *slot = kind,
            _ => unreachable!(),
        }

        p.events.push(Event::Finish);
        CompletedMarker { position: self.position }
    }

    /// Abandons the node; children are attached to the enclosing node.
    pub(crate) fn abandon(mut self, p: &mut Parser<'_>) {
        self.bomb.defuse();

        if self.position as usize == p.events.len() - 1
            && matches!(p.events.last(), Some(Event::Start { kind: SyntaxKind::TOMBSTONE, forward_parent: None }))
        {
            p.events.pop();
        }
    }
}

pub(crate) struct CompletedMarker {
    position: u32,
}

impl CompletedMarker {
    /// Starts a new node that will wrap the completed one.
    pub(crate) fn precede(self, p: &mut Parser<'_>) -> Marker {
        let new_marker = p.start();

        match &mut p.events[self.position as usize] {
            Event::Start { forward_parent, .. } => {
                *forward_parent = Some(new_marker.position - self.position);
            }
            _ => unreachable!(),
        }

        new_marker
    }
}
