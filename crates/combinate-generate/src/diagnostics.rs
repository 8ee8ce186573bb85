use std::cell::RefCell;

use tracing::info;

/// Receiver for key/value diagnostics emitted by the engine.
pub trait DiagnosticSink {
    fn record(&self, key: &str, value: &str);
}

/// Forwards diagnostics to `tracing` on the `combinate::diagnostics` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, key: &str, value: &str) {
        info!(target: "combinate::diagnostics", key, value, "diagnostic");
    }
}

/// Keeps diagnostics in memory, in the order they were recorded.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: RefCell<Vec<(String, String)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(String, String)> {
        self.entries.borrow().clone()
    }

    /// Values recorded under `key`.
    pub fn values(&self, key: &str) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .filter(|(recorded, _)| recorded == key)
            .map(|(_, value)| value.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

impl DiagnosticSink for MemorySink {
    fn record(&self, key: &str, value: &str) {
        self.entries
            .borrow_mut()
            .push((key.to_string(), value.to_string()));
    }
}
