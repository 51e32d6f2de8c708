//! Character/word counters shown above each pane

/// Text statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PromptStats {
    pub characters: usize,
    pub words: usize,
}

impl PromptStats {
    /// Compute stats for `text`
    ///
    /// Characters counts Unicode scalar values of the untrimmed text; words
    /// counts maximal runs of non-whitespace.
    pub fn of(text: &str) -> Self {
        Self {
            characters: text.chars().count(),
            words: text.split_whitespace().count(),
        }
    }
}
