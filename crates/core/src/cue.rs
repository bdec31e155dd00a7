//! In-memory representation of a subtitle entry.

/// A single timed subtitle entry (index, time range, text lines).
///
/// `index` is carried through untouched; ordering always comes from the
/// position of the cue in its sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    pub index: String,
    pub start_ms: u64,
    pub end_ms: u64,
    pub text: Vec<String>,
}

impl Cue {
    pub fn new(index: impl Into<String>, start_ms: u64, end_ms: u64, text: Vec<String>) -> Self {
        Self {
            index: index.into(),
            start_ms,
            end_ms,
            text,
        }
    }

    /// Length of the cue in milliseconds, zero for an inverted interval.
    pub fn duration_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }

    /// Number of displayed characters, not counting line breaks.
    pub fn char_count(&self) -> usize {
        self.text.iter().map(|l| l.chars().count()).sum()
    }

    /// Move the whole cue later in time.
    pub fn shift(&mut self, ms: u64) {
        self.start_ms = self.start_ms.saturating_add(ms);
        self.end_ms = self.end_ms.saturating_add(ms);
    }
}
