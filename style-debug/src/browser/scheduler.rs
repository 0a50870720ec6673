use std::time::Duration;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{IdleRequestOptions, Window};

use super::describe_js;
use crate::error::{DebugError, Result};
use crate::scheduler::{FlushTask, ScheduleStrategy, Scheduler};

/// Schedules flushes on the page's idle time, falling back to the next
/// animation frame where `requestIdleCallback` does not exist.
pub struct BrowserScheduler {
    window: Window,
    strategy: ScheduleStrategy,
}

impl BrowserScheduler {
    /// Feature-detect once, at construction.
    pub fn detect(idle_timeout: Duration) -> Result<Self> {
        let window = web_sys::window().ok_or_else(|| DebugError::Host("no global window".into()))?;
        let idle_available =
            js_sys::Reflect::has(&window, &JsValue::from_str("requestIdleCallback")).unwrap_or(false);
        Ok(Self {
            strategy: ScheduleStrategy::select(idle_available, idle_timeout),
            window,
        })
    }

    pub fn strategy(&self) -> ScheduleStrategy {
        self.strategy
    }
}

impl Scheduler for BrowserScheduler {
    fn schedule_low_priority(&self, task: FlushTask) {
        // A failed flush is thrown from the callback.
        let callback = Closure::once_into_js(move || -> std::result::Result<(), JsValue> {
            task().map_err(|err| JsError::new(&err.to_string()).into())
        });
        let scheduled = match self.strategy {
            ScheduleStrategy::Idle { timeout } => {
                let options = IdleRequestOptions::new();
                options.set_timeout(u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX));
                self.window
                    .request_idle_callback_with_options(callback.unchecked_ref(), &options)
                    .map(drop)
            }
            ScheduleStrategy::NextPaint => self
                .window
                .request_animation_frame(callback.unchecked_ref())
                .map(drop),
        };
        if let Err(err) = scheduled {
            tracing::error!(err = %describe_js(&err), "could not schedule debug flush");
        }
    }
}
