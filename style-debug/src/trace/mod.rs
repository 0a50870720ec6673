//! Stack trace resolution.
//!
//! A [`TraceResolver`] captures the current stack when called and resolves
//! it to source locations later. [`TraceAdapter`] pairs a resolver with the
//! shared [`SourceCache`] so every resolution reuses file contents fetched
//! by earlier ones.

#[cfg(not(target_arch = "wasm32"))]
mod native;

#[cfg(not(target_arch = "wasm32"))]
pub use native::BacktraceResolver;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use futures::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};

use crate::error::TraceError;

/// One resolved stack frame. Line and column numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackFrame {
    pub file_name: String,
    pub line_number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_name: Option<String>,
}

impl StackFrame {
    pub fn new(file_name: &str, line_number: u32) -> Self {
        Self {
            file_name: file_name.to_string(),
            line_number,
            column_number: None,
            function_name: None,
        }
    }
}

/// Deferred result of a stack resolution.
pub type PendingTrace = LocalBoxFuture<'static, Result<Vec<StackFrame>, TraceError>>;

/// File name -> file content, shared by every resolution and by the flush
/// that embeds `sourcesContent`. Entries are never evicted.
#[derive(Debug, Clone, Default)]
pub struct SourceCache {
    files: Rc<RefCell<HashMap<String, String>>>,
}

impl SourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, file_name: &str) -> Option<String> {
        self.files.borrow().get(file_name).cloned()
    }

    pub fn contains(&self, file_name: &str) -> bool {
        self.files.borrow().contains_key(file_name)
    }

    pub fn insert(&self, file_name: impl Into<String>, content: impl Into<String>) {
        self.files.borrow_mut().insert(file_name.into(), content.into());
    }

    /// Return the cached content, calling `load` only on a miss. A `None`
    /// from `load` is not cached, so a later call may retry.
    pub fn get_or_load(
        &self,
        file_name: &str,
        load: impl FnOnce(&str) -> Option<String>,
    ) -> Option<String> {
        if let Some(hit) = self.get(file_name) {
            return Some(hit);
        }
        let content = load(file_name)?;
        self.insert(file_name, content.clone());
        Some(content)
    }

    pub fn len(&self) -> usize {
        self.files.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.borrow().is_empty()
    }
}

fn is_wasm_frame(frame: &StackFrame) -> bool {
    let file = frame.file_name.as_str();
    file.starts_with("wasm") || file.contains(".wasm") || file.contains("wasm-function")
}

/// Drop the frames the binding layer itself contributes to a stack captured
/// from inside a wasm export.
///
/// Such a stack reads, innermost first: the JS glue shim that constructs the
/// `Error`, any number of wasm frames (how many depends on what the optimiser
/// inlined), the JS glue wrapper of the exported function, then the caller.
/// Everything up to the last wasm frame and the one wrapper after it is
/// removed, so index 0 of the result is the JS code that called the export.
/// Stacks without wasm frames are returned unchanged.
pub fn skip_binding_frames(mut frames: Vec<StackFrame>) -> Vec<StackFrame> {
    let Some(last_wasm) = frames.iter().rposition(is_wasm_frame) else {
        return frames;
    };
    let cut = (last_wasm + 2).min(frames.len());
    frames.drain(..cut);
    frames
}

/// Stack resolution backend.
///
/// `resolve` must capture the stack synchronously, before it returns, so
/// the frames describe the caller. Turning the capture into file/line
/// information happens inside the returned future.
pub trait TraceResolver {
    fn resolve(&self, cache: &SourceCache) -> PendingTrace;
}

impl<T: TraceResolver + ?Sized> TraceResolver for Rc<T> {
    fn resolve(&self, cache: &SourceCache) -> PendingTrace {
        (**self).resolve(cache)
    }
}

/// A resolver bound to the shared source cache.
pub struct TraceAdapter {
    resolver: Rc<dyn TraceResolver>,
    cache: SourceCache,
}

impl TraceAdapter {
    pub fn new(resolver: Rc<dyn TraceResolver>, cache: SourceCache) -> Self {
        Self { resolver, cache }
    }

    /// Capture the current stack and return its deferred resolution.
    pub fn resolve_trace(&self) -> PendingTrace {
        self.resolver.resolve(&self.cache)
    }

    pub fn cache(&self) -> &SourceCache {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use futures::executor::block_on;
    use futures::FutureExt;

    use super::*;

    struct Fixed {
        calls: Cell<usize>,
    }

    impl TraceResolver for Fixed {
        fn resolve(&self, cache: &SourceCache) -> PendingTrace {
            self.calls.set(self.calls.get() + 1);
            let cache = cache.clone();
            async move {
                cache.get_or_load("app.js", |_| Some("body { }".to_string()));
                Ok(vec![StackFrame::new("app.js", 3)])
            }
            .boxed_local()
        }
    }

    #[test]
    fn adapter_shares_its_cache_with_the_resolver() {
        let resolver = Rc::new(Fixed { calls: Cell::new(0) });
        let adapter = TraceAdapter::new(resolver.clone(), SourceCache::new());

        let frames = block_on(adapter.resolve_trace()).unwrap();
        assert_eq!(frames, vec![StackFrame::new("app.js", 3)]);
        assert_eq!(adapter.cache().get("app.js").as_deref(), Some("body { }"));
        assert_eq!(resolver.calls.get(), 1);
    }

    #[test]
    fn get_or_load_only_loads_on_miss() {
        let cache = SourceCache::new();
        let loads = Cell::new(0);
        let load = |_: &str| {
            loads.set(loads.get() + 1);
            Some("x".to_string())
        };
        assert_eq!(cache.get_or_load("a.js", load).as_deref(), Some("x"));
        assert_eq!(cache.get_or_load("a.js", load).as_deref(), Some("x"));
        assert_eq!(loads.get(), 1);
    }

    #[test]
    fn failed_load_is_not_cached() {
        let cache = SourceCache::new();
        assert_eq!(cache.get_or_load("gone.js", |_| None), None);
        assert!(cache.is_empty());
    }

    fn frame(file_name: &str) -> StackFrame {
        StackFrame::new(file_name, 1)
    }

    #[test]
    fn binding_frames_are_skipped_whatever_the_inlining() {
        let caller = || vec![frame("http://localhost/app.js"), frame("http://localhost/lib.js")];
        for wasm_depth in [1, 3, 7] {
            let mut stack = vec![frame("http://localhost/pkg/style_debug.js")];
            stack.extend((0..wasm_depth).map(|_| frame("wasm://wasm/00a1b2c3")));
            stack.push(frame("http://localhost/pkg/style_debug.js"));
            stack.extend(caller());
            assert_eq!(skip_binding_frames(stack), caller(), "depth {wasm_depth}");
        }
    }

    #[test]
    fn other_wasm_url_shapes_are_recognised() {
        let stack = vec![
            frame("http://localhost/pkg/style_debug_bg.wasm"),
            frame("<anonymous>:wasm-function[42]:0x1f"),
            frame("http://localhost/pkg/style_debug.js"),
            frame("http://localhost/app.js"),
        ];
        assert_eq!(skip_binding_frames(stack), vec![frame("http://localhost/app.js")]);
    }

    #[test]
    fn stacks_without_wasm_are_untouched() {
        let stack = vec![frame("a.js"), frame("b.js")];
        assert_eq!(skip_binding_frames(stack.clone()), stack);
        let trailing = vec![frame("a.js"), frame("wasm://wasm/1")];
        assert!(skip_binding_frames(trailing).is_empty());
    }

    #[test]
    fn frames_deserialize_from_js_shape() {
        let frame: StackFrame = serde_json::from_str(
            r#"{"fileName":"http://localhost/app.js","lineNumber":12,"columnNumber":4,"functionName":"render","source":"ignored"}"#,
        )
        .unwrap();
        assert_eq!(frame.file_name, "http://localhost/app.js");
        assert_eq!(frame.line_number, 12);
        assert_eq!(frame.column_number, Some(4));
        assert_eq!(frame.function_name.as_deref(), Some("render"));
    }
}
