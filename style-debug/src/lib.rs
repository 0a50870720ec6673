//! Source-mapped debug rules for generated styles.
//!
//! When a style object is created, [`DebugContext::add_debug_annotation`]
//! tags it with a unique class and resolves the caller's stack in the
//! background. Resolved locations are batched; one low-priority flush per
//! batch injects an empty rule for each class plus an inline source map,
//! so browser tooling can jump from a generated rule to the line that
//! created it.

pub mod config;
pub mod context;
pub mod error;
pub mod flush;
pub mod gate;
pub mod id;
pub mod inline_map;
pub mod queue;
pub mod scheduler;
pub mod spawn;
pub mod trace;

#[cfg(feature = "wasm")]
pub mod browser;
#[cfg(feature = "wasm")]
pub mod wasm;

pub use config::DebugConfig;
pub use context::{DebugContext, DebugContextBuilder, DebugTarget};
pub use error::{DebugError, Result, TraceError};
pub use flush::{MemorySink, StyleBlock, StyleSink};
pub use queue::DebugEntry;
pub use scheduler::{FlushTask, ManualScheduler, ScheduleStrategy, Scheduler};
pub use inline_map::{RuleOrigin, SOURCE_MAPPING_URL_PREFIX};
pub use sourcemap::SourceMap;
pub use spawn::TaskSpawner;
pub use trace::{PendingTrace, SourceCache, StackFrame, TraceResolver};

/// Build the style block for an already-resolved batch without running
/// the async pipeline.
pub fn render_entries(entries: &[DebugEntry], cache: &SourceCache) -> Result<String> {
    Ok(StyleBlock::build(entries, cache)?.css)
}

/// Resolve every inline map in `css` to `(selector, file, 1-based line)`.
pub fn inspect_stylesheet(css: &str) -> Result<Vec<(String, String, u32)>> {
    let mut found = Vec::new();
    for (generated, map) in inline_map::extract_inline_maps(css)? {
        let rules: Vec<&str> = generated.trim_start().lines().collect();
        for origin in inline_map::rule_origins(&map) {
            let selector = rules
                .get(origin.generated_line as usize)
                .map(|rule| rule.trim_end_matches("{}").trim().to_string())
                .unwrap_or_default();
            found.push((selector, origin.source, origin.source_line + 1));
        }
    }
    Ok(found)
}

#[cfg(test)]
mod integration_tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn render_then_inspect_recovers_locations() {
        let entries = vec![
            DebugEntry::new(".__debug_0", "a.js", 10),
            DebugEntry::new(".__debug_1", "b.js", 20),
        ];
        let css = render_entries(&entries, &SourceCache::new()).unwrap();
        assert_eq!(
            inspect_stylesheet(&css).unwrap(),
            vec![
                (".__debug_0".to_string(), "a.js".to_string(), 10),
                (".__debug_1".to_string(), "b.js".to_string(), 20),
            ]
        );
    }

    #[test]
    fn inspect_handles_several_blocks() {
        let cache = SourceCache::new();
        let first = render_entries(&[DebugEntry::new(".x", "x.js", 1)], &cache).unwrap();
        let second = render_entries(&[DebugEntry::new(".y", "y.js", 2)], &cache).unwrap();
        let css = format!("{first}\n{second}");
        let found = inspect_stylesheet(&css).unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[1], (".y".to_string(), "y.js".to_string(), 2));
    }

    #[test]
    fn stylesheet_without_maps_is_empty() {
        assert!(inspect_stylesheet(".plain { color: red }").unwrap().is_empty());
    }
}
