//! Type definitions for the application state.

/// Which form field has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Url,
    Token,
    EventName,
    Data,
}

impl Focus {
    const ORDER: [Focus; 4] = [Focus::Url, Focus::Token, Focus::EventName, Focus::Data];

    fn position(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.position() + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        Self::ORDER[(self.position() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    /// Fields of the connect form, as opposed to the send form.
    pub fn is_connect_field(self) -> bool {
        matches!(self, Focus::Url | Focus::Token)
    }
}
