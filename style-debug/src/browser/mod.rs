//! Browser implementations of the context's capabilities.
//!
//! - `scheduler`: `requestIdleCallback` with timeout, `requestAnimationFrame` fallback
//! - `sink`: appends `<style>` elements to `document.head`
//! - `resolver`: delegates stack resolution to a JS function (e.g. stacktrace.js)
//!
//! Deferred work runs through [`WasmSpawner`] on the page's event loop.

mod resolver;
mod scheduler;
mod sink;

pub use resolver::JsStackResolver;
pub use scheduler::BrowserScheduler;
pub use sink::HeadSink;

use futures::future::LocalBoxFuture;
use wasm_bindgen::JsValue;

use crate::spawn::TaskSpawner;

/// Spawns onto the browser microtask queue.
#[derive(Debug, Clone, Copy, Default)]
pub struct WasmSpawner;

impl TaskSpawner for WasmSpawner {
    fn spawn_task(&self, task: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(task);
    }
}

/// Best-effort text for a thrown JS value.
pub(crate) fn describe_js(value: &JsValue) -> String {
    use wasm_bindgen::JsCast;

    if let Some(text) = value.as_string() {
        return text;
    }
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    format!("{value:?}")
}
