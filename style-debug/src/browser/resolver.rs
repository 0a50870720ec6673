use futures::FutureExt;
use js_sys::{Array, Function, Object, Promise, Reflect};
use tracing::warn;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;

use super::describe_js;
use crate::error::TraceError;
use crate::trace::{skip_binding_frames, PendingTrace, SourceCache, StackFrame, TraceResolver};

/// Delegates resolution to a JS function with the shape
/// `(error, { sourceCache }) => Promise<StackFrame[]>`, which is what
/// `StackTrace.fromError` from stacktrace.js provides.
///
/// The `sourceCache` object handed to JS persists across calls; string
/// entries it gains are copied into the Rust [`SourceCache`] after every
/// resolution.
///
/// The `Error` is constructed from Rust, so the raw stack starts inside the
/// module. Those frames are stripped with [`skip_binding_frames`]: frame 0
/// of the result is the JS caller of the exported entry point.
pub struct JsStackResolver {
    resolve: Function,
    js_cache: Object,
}

impl JsStackResolver {
    pub fn new(resolve: Function) -> Self {
        Self {
            resolve,
            js_cache: Object::new(),
        }
    }
}

impl TraceResolver for JsStackResolver {
    fn resolve(&self, cache: &SourceCache) -> PendingTrace {
        // The stack is captured here, in the caller's turn.
        let error = js_sys::Error::new("");
        let options = Object::new();
        match Reflect::set(&options, &JsValue::from_str("sourceCache"), &self.js_cache) {
            Ok(true) => {}
            Ok(false) => warn!("sourceCache was not set on resolver options"),
            Err(err) => warn!(error = %describe_js(&err), "cannot set sourceCache on resolver options"),
        }
        let call = self.resolve.call2(&JsValue::NULL, &error, &options);

        let js_cache = self.js_cache.clone();
        let cache = cache.clone();
        async move {
            let returned = call.map_err(|err| TraceError::backend(describe_js(&err)))?;
            let resolved = JsFuture::from(Promise::resolve(&returned))
                .await
                .map_err(|err| TraceError::backend(describe_js(&err)))?;
            let frames: Vec<StackFrame> = serde_wasm_bindgen::from_value(resolved)
                .map_err(|err| TraceError::backend(err.to_string()))?;
            copy_cache(&js_cache, &cache);
            let frames = skip_binding_frames(frames);
            if frames.is_empty() {
                return Err(TraceError::NoFrames);
            }
            Ok(frames)
        }
        .boxed_local()
    }
}

fn copy_cache(js_cache: &Object, cache: &SourceCache) {
    for entry in Object::entries(js_cache).iter() {
        let pair = Array::from(&entry);
        let (Some(name), Some(content)) = (pair.get(0).as_string(), pair.get(1).as_string()) else {
            continue;
        };
        if !cache.contains(&name) {
            cache.insert(name, content);
        }
    }
}
