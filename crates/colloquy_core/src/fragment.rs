//! Streaming output fragments.

/// One incremental piece of generated text, delivered before the full
/// reply is complete.
///
/// Fragments are ephemeral: the relay forwards each one to the client as
/// soon as it is decoded and never retains it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    text: String,
}

impl Fragment {
    /// Create a fragment from cleaned text.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// The fragment text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Consume the fragment, yielding its text.
    pub fn into_text(self) -> String {
        self.text
    }
}

impl std::fmt::Display for Fragment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}
