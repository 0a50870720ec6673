//! Turning drained queue entries into one injectable style block.

use std::cell::RefCell;
use std::rc::Rc;

use sourcemap::{SourceMap, SourceMapBuilder};

use crate::error::Result;
use crate::inline_map::to_comment;
use crate::queue::DebugEntry;
use crate::trace::SourceCache;

/// Destination for finished style blocks (in a browser, a new `<style>`
/// element in `<head>`).
pub trait StyleSink {
    fn append_style(&self, css: &str) -> Result<()>;
}

impl<T: StyleSink + ?Sized> StyleSink for Rc<T> {
    fn append_style(&self, css: &str) -> Result<()> {
        (**self).append_style(css)
    }
}

/// Sink that keeps every block in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    blocks: Rc<RefCell<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blocks(&self) -> Vec<String> {
        self.blocks.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.blocks.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.borrow().is_empty()
    }
}

impl StyleSink for MemorySink {
    fn append_style(&self, css: &str) -> Result<()> {
        self.blocks.borrow_mut().push(css.to_string());
        Ok(())
    }
}

/// The output of one flush: an empty rule per entry, the map pointing
/// each rule at its origin, and the combined CSS text.
#[derive(Debug)]
pub struct StyleBlock {
    pub rules: Vec<String>,
    pub source_map: SourceMap,
    pub css: String,
}

impl StyleBlock {
    /// Build the block for `entries`, in order. Rule `i` sits on generated
    /// line `i` and maps to `(file, line - 1, 0)`.
    pub fn build(entries: &[DebugEntry], cache: &SourceCache) -> Result<Self> {
        let mut builder = SourceMapBuilder::new(None);
        let mut sources: Vec<&str> = Vec::new();
        let mut rules = Vec::with_capacity(entries.len());

        for (line, entry) in entries.iter().enumerate() {
            let source_id = match sources.iter().position(|s| *s == entry.file_name) {
                Some(index) => index as u32,
                None => {
                    sources.push(&entry.file_name);
                    let id = builder.add_source(&entry.file_name);
                    if let Some(content) = cache.get(&entry.file_name) {
                        builder.set_source_contents(id, Some(&content));
                    }
                    id
                }
            };
            rules.push(format!("{} {{}}", entry.selector));
            builder.add_raw(
                line as u32,
                0,
                entry.line_number.saturating_sub(1),
                0,
                Some(source_id),
                None,
                false,
            );
        }

        let source_map = builder.into_sourcemap();
        let css = format!("{}\n{}", rules.join("\n"), to_comment(&source_map)?);

        Ok(Self {
            rules,
            source_map,
            css,
        })
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn source_count(&self) -> usize {
        self.source_map.get_source_count() as usize
    }
}
