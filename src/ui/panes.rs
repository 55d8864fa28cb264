/// Focusable regions of the browser screen, top to bottom
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Focus {
    /// Search box
    Search,
    /// Letter bar (A-Z)
    Alphabet,
    /// Card list
    Results,
}

impl Focus {
    pub const ALL: [Focus; 3] = [Focus::Search, Focus::Alphabet, Focus::Results];

    pub fn title(self) -> &'static str {
        match self {
            Focus::Search => "SEARCH",
            Focus::Alphabet => "LETTERS",
            Focus::Results => "RESULTS",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Focus::Search => 0,
            Focus::Alphabet => 1,
            Focus::Results => 2,
        }
    }

    /// Next region, wrapping around
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// Previous region, wrapping around
    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}
