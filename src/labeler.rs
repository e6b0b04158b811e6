//! Sequential product-code generation

use crate::config::LabelConfig;

/// Generates `{base_text}{counter}{suffix}` labels for one batch run
///
/// A labeler is created per Pipeline Driver invocation, so every run starts
/// again at the configured start value.
#[derive(Debug, Clone)]
pub struct SequenceLabeler {
    base_text: String,
    suffix: String,
    start: u64,
    next: u64,
}

impl SequenceLabeler {
    #[must_use]
    pub fn new(config: &LabelConfig) -> Self {
        Self {
            base_text: config.base_text.clone(),
            suffix: config.suffix.clone(),
            start: config.start,
            next: config.start,
        }
    }

    /// Return the label for the current counter value, then advance the counter
    pub fn next_label(&mut self) -> String {
        let label = self.format(self.next);
        self.next = self.next.saturating_add(1);
        label
    }

    /// Counter value the next call to [`next_label`](Self::next_label) will embed
    #[must_use]
    pub fn peek(&self) -> u64 {
        self.next
    }

    /// Number of labels handed out so far
    #[must_use]
    pub fn issued(&self) -> u64 {
        self.next - self.start
    }

    fn format(&self, counter: u64) -> String {
        format!("{}{}{}", self.base_text, counter, self.suffix)
    }
}
