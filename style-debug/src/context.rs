//! The entry point used by the style generator.
//!
//! A [`DebugContext`] owns the gate, id counter, queue and source cache.
//! Construct it once at start-up and hand clones to every place that
//! creates style objects:
//!
//! ```text
//! add_debug_annotation ─► resolve trace (async) ─► enqueue ─► schedule flush
//!                                                               │
//!                         <style> in <head> ◄─ build block ◄────┘
//! ```

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use futures::FutureExt;
use tracing::{debug, trace, warn};

use crate::config::DebugConfig;
use crate::error::{DebugError, Result};
use crate::flush::{StyleBlock, StyleSink};
use crate::gate::DebugGate;
use crate::id::{DebugId, IdGenerator};
use crate::queue::{DebugEntry, DebugQueue};
use crate::scheduler::Scheduler;
use crate::spawn::TaskSpawner;
use crate::trace::{SourceCache, TraceAdapter, TraceResolver};

/// A generated style object that can carry the debug class.
pub trait DebugTarget {
    fn set_debug_class_name(&mut self, class_name: &str);
}

struct Inner {
    gate: DebugGate,
    ids: IdGenerator,
    queue: RefCell<DebugQueue>,
    trace: TraceAdapter,
    scheduler: Rc<dyn Scheduler>,
    sink: Rc<dyn StyleSink>,
    spawner: Rc<dyn TaskSpawner>,
    config: DebugConfig,
}

/// Shared handle; clones refer to the same state.
#[derive(Clone)]
pub struct DebugContext {
    inner: Rc<Inner>,
}

impl DebugContext {
    pub fn builder() -> DebugContextBuilder {
        DebugContextBuilder::default()
    }

    pub fn enable_debug(&self) {
        self.inner.gate.enable();
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.gate.is_enabled()
    }

    pub fn config(&self) -> &DebugConfig {
        &self.inner.config
    }

    pub fn source_cache(&self) -> &SourceCache {
        self.inner.trace.cache()
    }

    /// Entries waiting for the next flush.
    pub fn pending(&self) -> usize {
        self.inner.queue.borrow().len()
    }

    /// Tag `target` with a fresh debug class and, once the caller's stack
    /// resolves, queue a rule mapped to the frame at `frame_index`.
    ///
    /// `frame_index` skips the frames between the resolver and the real
    /// call site. Does nothing and returns `None` while the gate is off.
    /// Resolution failures are logged and the annotation is dropped.
    pub fn add_debug_annotation<T>(&self, target: &mut T, frame_index: usize) -> Option<DebugId>
    where
        T: DebugTarget + ?Sized,
    {
        if !self.inner.gate.is_enabled() {
            return None;
        }
        let id = self.inner.ids.next_id();
        target.set_debug_class_name(&id.class_name);

        let pending = self.inner.trace.resolve_trace();
        let ctx = Rc::downgrade(&self.inner);
        let selector = id.selector.clone();
        self.inner.spawner.spawn_task(
            async move {
                let frames = match pending.await {
                    Ok(frames) => frames,
                    Err(err) => {
                        warn!(%err, %selector, "stack trace resolution failed; dropping debug rule");
                        return;
                    }
                };
                let Some(frame) = frames.get(frame_index) else {
                    warn!(
                        %selector,
                        frame_index,
                        resolved = frames.len(),
                        "stack frame index out of range; dropping debug rule"
                    );
                    return;
                };
                if let Some(inner) = ctx.upgrade() {
                    let entry = DebugEntry {
                        selector,
                        file_name: frame.file_name.clone(),
                        line_number: frame.line_number,
                    };
                    DebugContext { inner }.enqueue(entry);
                }
            }
            .boxed_local(),
        );
        Some(id)
    }

    /// Queue an entry, scheduling a flush if it is the first one since the
    /// last flush.
    pub fn enqueue(&self, entry: DebugEntry) {
        trace!(selector = %entry.selector, file = %entry.file_name, line = entry.line_number, "queued debug rule");
        let opened_cycle = self.inner.queue.borrow_mut().push(entry);
        if !opened_cycle {
            return;
        }
        let ctx: Weak<Inner> = Rc::downgrade(&self.inner);
        self.inner.scheduler.schedule_low_priority(Box::new(move || match ctx.upgrade() {
            Some(inner) => DebugContext { inner }.flush(),
            None => Ok(()),
        }));
        debug!("scheduled debug flush");
    }

    /// Drain the queue and inject one style block for everything in it.
    /// Entries queued while this runs belong to the next flush.
    pub fn flush(&self) -> Result<()> {
        let entries = self.inner.queue.borrow_mut().take();
        if entries.is_empty() {
            return Ok(());
        }
        let block = StyleBlock::build(&entries, self.inner.trace.cache())?;
        self.inner.sink.append_style(&block.css)?;
        debug!(
            rules = block.rule_count(),
            sources = block.source_count(),
            "injected debug style block"
        );
        Ok(())
    }
}

/// Collects the capabilities a [`DebugContext`] runs on.
#[derive(Default)]
pub struct DebugContextBuilder {
    config: DebugConfig,
    cache: SourceCache,
    resolver: Option<Rc<dyn TraceResolver>>,
    scheduler: Option<Rc<dyn Scheduler>>,
    sink: Option<Rc<dyn StyleSink>>,
    spawner: Option<Rc<dyn TaskSpawner>>,
}

impl DebugContextBuilder {
    pub fn config(mut self, config: DebugConfig) -> Self {
        self.config = config;
        self
    }

    /// Use an existing cache instead of a fresh one.
    pub fn source_cache(mut self, cache: SourceCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn resolver(mut self, resolver: impl TraceResolver + 'static) -> Self {
        self.resolver = Some(Rc::new(resolver));
        self
    }

    pub fn scheduler(mut self, scheduler: impl Scheduler + 'static) -> Self {
        self.scheduler = Some(Rc::new(scheduler));
        self
    }

    pub fn sink(mut self, sink: impl StyleSink + 'static) -> Self {
        self.sink = Some(Rc::new(sink));
        self
    }

    pub fn spawner(mut self, spawner: impl TaskSpawner + 'static) -> Self {
        self.spawner = Some(Rc::new(spawner));
        self
    }

    pub fn build(self) -> Result<DebugContext> {
        self.config.validate()?;
        let resolver = self.resolver.ok_or_else(|| missing("trace resolver"))?;
        let scheduler = self.scheduler.ok_or_else(|| missing("scheduler"))?;
        let sink = self.sink.ok_or_else(|| missing("style sink"))?;
        let spawner = self.spawner.ok_or_else(|| missing("task spawner"))?;

        let gate = DebugGate::new();
        if self.config.enabled {
            gate.enable();
        }
        Ok(DebugContext {
            inner: Rc::new(Inner {
                gate,
                ids: IdGenerator::with_prefix(&self.config.class_prefix),
                queue: RefCell::new(DebugQueue::new()),
                trace: TraceAdapter::new(resolver, self.cache),
                scheduler,
                sink,
                spawner,
                config: self.config,
            }),
        })
    }
}

fn missing(what: &str) -> DebugError {
    DebugError::Config(format!("no {what} configured"))
}
