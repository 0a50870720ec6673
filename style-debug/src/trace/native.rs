use std::fs;

use backtrace::Backtrace;
use futures::FutureExt;

use super::{PendingTrace, SourceCache, StackFrame, TraceResolver};
use crate::error::TraceError;

/// Resolves native stacks through the `backtrace` crate.
///
/// Capture is unresolved and cheap; symbolication runs when the returned
/// future is first polled. Symbols without file/line debug info are left
/// out, so frame indices count only frames that carry a location.
#[derive(Debug, Clone)]
pub struct BacktraceResolver {
    read_sources: bool,
}

impl Default for BacktraceResolver {
    fn default() -> Self {
        Self { read_sources: true }
    }
}

impl BacktraceResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Do not read source files into the cache.
    pub fn without_sources() -> Self {
        Self {
            read_sources: false,
        }
    }
}

impl TraceResolver for BacktraceResolver {
    fn resolve(&self, cache: &SourceCache) -> PendingTrace {
        let mut trace = Backtrace::new_unresolved();
        let cache = cache.clone();
        let read_sources = self.read_sources;
        async move {
            trace.resolve();
            let frames = frames_of(&trace);
            if frames.is_empty() {
                return Err(TraceError::NoFrames);
            }
            if read_sources {
                for frame in &frames {
                    cache.get_or_load(&frame.file_name, |path| fs::read_to_string(path).ok());
                }
            }
            Ok(frames)
        }
        .boxed_local()
    }
}

fn frames_of(trace: &Backtrace) -> Vec<StackFrame> {
    trace
        .frames()
        .iter()
        .flat_map(|frame| frame.symbols())
        .filter_map(|symbol| {
            let file_name = symbol.filename()?.to_string_lossy().into_owned();
            let line_number = symbol.lineno()?;
            Some(StackFrame {
                file_name,
                line_number,
                column_number: symbol.colno(),
                function_name: symbol.name().map(|name| name.to_string()),
            })
        })
        .collect()
}
