//! Trivia attached to the token that follows it.

use text_size::TextSize;
use triomphe::ThinArc;

/// Kinds of trivia recorded between tokens.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TriviaPieceKind {
    Whitespace,
    Newline,
    LineComment,
    BlockComment,
}

/// A trivia fragment with its kind and length.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct TriviaPiece {
    pub kind: TriviaPieceKind,
    pub len: TextSize,
}

impl TriviaPiece {
    pub fn new(kind: TriviaPieceKind, len: TextSize) -> Self {
        Self { kind, len }
    }
}

/// Shared, immutable run of trivia pieces. The header caches the total length.
#[derive(Clone, Eq, Hash, PartialEq)]
pub struct Trivia {
    ptr: Option<ThinArc<TextSize, TriviaPiece>>,
}

impl Trivia {
    pub fn new(pieces: &[TriviaPiece]) -> Self {
        if pieces.is_empty() {
            return Self::empty();
        }
        let total_len = pieces.iter().map(|piece| piece.len).sum();
        Self { ptr: Some(ThinArc::from_header_and_slice(total_len, pieces)) }
    }

    pub fn whitespace(len: u32) -> Self {
        Self::new(&[TriviaPiece::new(TriviaPieceKind::Whitespace, len.into())])
    }

    pub const fn empty() -> Self {
        Self { ptr: None }
    }

    pub fn len(&self) -> TextSize {
        match self.ptr {
            None => TextSize::new(0),
            Some(ref ptr) => ptr.header.header,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ptr.is_none()
    }

    pub fn pieces(&self) -> &[TriviaPiece] {
        match &self.ptr {
            None => &[],
            Some(ptr) => &ptr.slice,
        }
    }

    /// True if any piece is a newline.
    pub fn has_newline(&self) -> bool {
        self.pieces().iter().any(|piece| piece.kind == TriviaPieceKind::Newline)
    }
}

impl std::fmt::Debug for Trivia {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Trivia")
            .field("pieces", &self.pieces())
            .field("total_len", &self.len())
            .finish()
    }
}
