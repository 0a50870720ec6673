use std::cell::Cell;

/// Process-wide switch for debug annotations. Starts disabled and can
/// only be turned on.
#[derive(Debug, Default)]
pub struct DebugGate {
    enabled: Cell<bool>,
}

impl DebugGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enable(&self) {
        self.enabled.set(true);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }
}
