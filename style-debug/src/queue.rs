use serde::{Deserialize, Serialize};

/// A resolved annotation waiting for the next flush.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugEntry {
    pub selector: String,
    pub file_name: String,
    /// 1-based.
    pub line_number: u32,
}

impl DebugEntry {
    pub fn new(selector: &str, file_name: &str, line_number: u32) -> Self {
        Self {
            selector: selector.to_string(),
            file_name: file_name.to_string(),
            line_number,
        }
    }
}

/// Append-only buffer of pending entries, drained whole by each flush.
#[derive(Debug, Default)]
pub struct DebugQueue {
    entries: Vec<DebugEntry>,
}

impl DebugQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. Returns `true` when the queue was empty before,
    /// i.e. this entry opens a new flush cycle.
    pub fn push(&mut self, entry: DebugEntry) -> bool {
        let was_empty = self.entries.is_empty();
        self.entries.push(entry);
        was_empty
    }

    /// Take every pending entry, leaving an empty queue behind.
    pub fn take(&mut self) -> Vec<DebugEntry> {
        std::mem::take(&mut self.entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DebugEntry> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_first_push_reports_empty() {
        let mut queue = DebugQueue::new();
        assert!(queue.push(DebugEntry::new(".a", "a.js", 1)));
        assert!(!queue.push(DebugEntry::new(".b", "a.js", 2)));
        assert!(!queue.push(DebugEntry::new(".c", "b.js", 3)));
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn take_preserves_order_and_resets() {
        let mut queue = DebugQueue::new();
        queue.push(DebugEntry::new(".a", "a.js", 1));
        queue.push(DebugEntry::new(".b", "b.js", 2));

        let drained = queue.take();
        let selectors: Vec<_> = drained.iter().map(|e| e.selector.as_str()).collect();
        assert_eq!(selectors, [".a", ".b"]);
        assert!(queue.is_empty());

        // Next push starts a new cycle.
        assert!(queue.push(DebugEntry::new(".c", "c.js", 3)));
    }
}
