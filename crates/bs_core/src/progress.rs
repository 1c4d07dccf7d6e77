use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Observer for human-readable progress messages. Only used for feedback,
/// never for data flow.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, message: &str);
}

/// Adapts a closure into a sink.
pub struct ProgressFn<F>(pub F);

impl<F> ProgressSink for ProgressFn<F>
where
    F: Fn(&str) + Send + Sync,
{
    fn emit(&self, message: &str) {
        (self.0)(message)
    }
}

impl ProgressSink for mpsc::UnboundedSender<String> {
    fn emit(&self, message: &str) {
        // A dropped receiver just means nobody is watching anymore.
        let _ = self.send(message.to_string());
    }
}

impl<T: ProgressSink + ?Sized> ProgressSink for Arc<T> {
    fn emit(&self, message: &str) {
        (**self).emit(message)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn emit(&self, _message: &str) {}
}

/// Prepends a fixed prefix, e.g. `(2/5) ` during batch runs.
pub struct Prefixed<'a> {
    prefix: String,
    inner: &'a dyn ProgressSink,
}

impl<'a> Prefixed<'a> {
    pub fn new(prefix: impl Into<String>, inner: &'a dyn ProgressSink) -> Self {
        Self {
            prefix: prefix.into(),
            inner,
        }
    }
}

impl ProgressSink for Prefixed<'_> {
    fn emit(&self, message: &str) {
        self.inner.emit(&format!("{}{}", self.prefix, message));
    }
}

/// Keeps every message; handy for tests and for reporting the latest one.
#[derive(Debug, Default, Clone)]
pub struct ProgressRecorder {
    messages: Arc<Mutex<Vec<String>>>,
}

impl ProgressRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().map(|m| m.clone()).unwrap_or_default()
    }

    pub fn last(&self) -> Option<String> {
        self.messages.lock().ok().and_then(|m| m.last().cloned())
    }
}

impl ProgressSink for ProgressRecorder {
    fn emit(&self, message: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(message.to_string());
        }
    }
}
