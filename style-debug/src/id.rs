//! Unique identifiers for debug classes.
//!
//! Ids start at 0 and increase by one per call for the lifetime of the
//! owning context. Each id names a class (`__debug_<id>` by default) and
//! the selector matching it.

use std::cell::Cell;

pub const DEFAULT_CLASS_PREFIX: &str = "__debug_";

/// One allocated debug identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugId {
    pub id: u64,
    pub class_name: String,
    pub selector: String,
}

/// Allocator for debug ids. Interior mutability lets it live inside a
/// shared context without `&mut` access.
#[derive(Debug)]
pub struct IdGenerator {
    next: Cell<u64>,
    prefix: String,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::with_prefix(DEFAULT_CLASS_PREFIX)
    }
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            next: Cell::new(0),
            prefix: prefix.to_string(),
        }
    }

    /// Allocate the next id.
    pub fn next_id(&self) -> DebugId {
        let id = self.next.get();
        self.next.set(id + 1);
        let class_name = format!("{}{id}", self.prefix);
        DebugId {
            id,
            selector: format!(".{class_name}"),
            class_name,
        }
    }

    /// Number of ids handed out so far.
    pub fn allocated(&self) -> u64 {
        self.next.get()
    }
}
