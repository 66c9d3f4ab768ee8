/// The newline sequence inserted at edit boundaries.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum NewLineKind {
    #[default]
    Lf,
    CrLf,
}

impl NewLineKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NewLineKind::Lf => "\n",
            NewLineKind::CrLf => "\r\n",
        }
    }
}

/// Formatting choices applied when the engine synthesizes text.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EditSettings {
    newline_kind: NewLineKind,
    indentation_text: String,
}

impl Default for EditSettings {
    fn default() -> Self {
        Self { newline_kind: NewLineKind::default(), indentation_text: "    ".to_owned() }
    }
}

impl EditSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_newline_kind(mut self, kind: NewLineKind) -> Self {
        self.newline_kind = kind;
        self
    }

    pub fn with_indentation_text(mut self, text: impl Into<String>) -> Self {
        self.indentation_text = text.into();
        self
    }

    pub fn newline_kind(&self) -> NewLineKind {
        self.newline_kind
    }

    pub fn newline(&self) -> &'static str {
        self.newline_kind.as_str()
    }

    /// One level of indentation.
    pub fn indentation_text(&self) -> &str {
        &self.indentation_text
    }
}
