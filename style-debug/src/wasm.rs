//! WASM bindings for the debug annotator.
//!
//! Exposes the entry points the style generator calls from JavaScript.
//! Build with: `wasm-pack build --target web --features wasm`
//!
//! ```js
//! import StackTrace from "stacktrace-js";
//! setTraceResolver((error, opts) => StackTrace.fromError(error, opts));
//! enableDebug();
//! addDebugAnnotation(styleObject, 1); // maps to our caller's caller
//! ```

use std::cell::RefCell;
use std::time::Duration;

use js_sys::{Function, Reflect};
use wasm_bindgen::prelude::*;
use tracing::warn;
use wasm_bindgen::JsCast;

use crate::browser::{describe_js, BrowserScheduler, HeadSink, JsStackResolver, WasmSpawner};
use crate::config::DebugConfig;
use crate::context::{DebugContext, DebugTarget};

thread_local! {
    static CONTEXT: RefCell<Option<DebugContext>> = const { RefCell::new(None) };
    static RESOLVER: RefCell<Option<Function>> = const { RefCell::new(None) };
    static CONFIG: RefCell<Option<DebugConfig>> = const { RefCell::new(None) };
}

/// A JS style object; the class lands on its `debugClassName` property.
struct JsTarget<'a>(&'a JsValue);

impl DebugTarget for JsTarget<'_> {
    fn set_debug_class_name(&mut self, class_name: &str) {
        let set = Reflect::set(
            self.0,
            &JsValue::from_str("debugClassName"),
            &JsValue::from_str(class_name),
        );
        match set {
            Ok(true) => {}
            Ok(false) => warn!(class_name, "debugClassName is read-only on the style object"),
            Err(err) => warn!(class_name, error = %describe_js(&err), "cannot set debugClassName"),
        }
    }
}

/// Register the stack resolution function used once debugging is enabled.
#[wasm_bindgen(js_name = setTraceResolver)]
pub fn set_trace_resolver(resolve: Function) {
    RESOLVER.with(|slot| *slot.borrow_mut() = Some(resolve));
}

/// Override start-up settings (`{ idleTimeoutMs, classPrefix }`). Only
/// takes effect if called before `enableDebug`.
#[wasm_bindgen(js_name = configureDebug)]
pub fn configure_debug(json: &str) -> Result<(), JsError> {
    let config = DebugConfig::from_json(json).map_err(|e| JsError::new(&e.to_string()))?;
    CONFIG.with(|slot| *slot.borrow_mut() = Some(config));
    Ok(())
}

/// Turn debug annotations on. The first call builds the context; without a
/// registered resolver it falls back to `StackTrace.fromError` on the
/// global object.
#[wasm_bindgen(js_name = enableDebug)]
pub fn enable_debug() -> Result<(), JsError> {
    let existing = CONTEXT.with(|slot| slot.borrow().clone());
    let ctx = match existing {
        Some(ctx) => ctx,
        None => {
            let ctx = build_context()?;
            CONTEXT.with(|slot| *slot.borrow_mut() = Some(ctx.clone()));
            ctx
        }
    };
    ctx.enable_debug();
    Ok(())
}

/// Attach a debug class to `target` and map it to the caller at
/// `frame_index` in the resolved stack. Frames inside this module and its
/// JS glue are not counted: index 0 is the function that called
/// `addDebugAnnotation`. No-op until `enableDebug` runs.
#[wasm_bindgen(js_name = addDebugAnnotation)]
pub fn add_debug_annotation(target: &JsValue, frame_index: usize) {
    let Some(ctx) = CONTEXT.with(|slot| slot.borrow().clone()) else {
        return;
    };
    ctx.add_debug_annotation(&mut JsTarget(target), frame_index);
}

fn build_context() -> Result<DebugContext, JsError> {
    let config = CONFIG.with(|slot| slot.borrow().clone()).unwrap_or_default();
    let resolve = match RESOLVER.with(|slot| slot.borrow().clone()) {
        Some(resolve) => resolve,
        None => global_stacktrace()?,
    };
    let scheduler = BrowserScheduler::detect(Duration::from_millis(config.idle_timeout_ms.into()))
        .map_err(|e| JsError::new(&e.to_string()))?;
    let sink = HeadSink::new().map_err(|e| JsError::new(&e.to_string()))?;

    DebugContext::builder()
        .config(config)
        .resolver(JsStackResolver::new(resolve))
        .scheduler(scheduler)
        .sink(sink)
        .spawner(WasmSpawner)
        .build()
        .map_err(|e| JsError::new(&e.to_string()))
}

fn global_stacktrace() -> Result<Function, JsError> {
    let missing = || JsError::new("no trace resolver registered and no global StackTrace found");
    let stacktrace = Reflect::get(&js_sys::global(), &JsValue::from_str("StackTrace"))
        .ok()
        .filter(|value| value.is_object())
        .ok_or_else(missing)?;
    let from_error = Reflect::get(&stacktrace, &JsValue::from_str("fromError"))
        .ok()
        .and_then(|value| value.dyn_into::<Function>().ok())
        .ok_or_else(missing)?;
    Ok(from_error.bind(&stacktrace))
}
