use tracing::Level;
use std::sync::Once;
use std::collections::VecDeque;

use crate::progress::ProgressSink;

static INIT: Once = Once::new();

/// Progress sink that writes through `tracing`, with stacked prefixes such
/// as a batch counter or the topic being generated.
#[derive(Debug, Clone, Default)]
pub struct ProgressLogger {
    prefixes: VecDeque<String>,
}

impl ProgressLogger {
    pub fn new() -> Self {
        Self {
            prefixes: VecDeque::new(),
        }
    }

    pub fn with_prefix(mut self, prefix: String) -> Self {
        self.prefixes.push_back(prefix);
        self
    }

    fn prefix(&self) -> String {
        self.prefixes.iter().map(|p| format!("{} ", p)).collect::<String>()
    }

    pub fn info(&self, message: &str) {
        tracing::info!("{}{}", self.prefix(), message);
    }

    pub fn warn(&self, message: &str) {
        tracing::warn!("{}{}", self.prefix(), message);
    }

    pub fn debug(&self, message: &str) {
        tracing::debug!("{}{}", self.prefix(), message);
    }
}

impl ProgressSink for ProgressLogger {
    fn emit(&self, message: &str) {
        self.info(&format!("⏳ {}", message));
    }
}

/// Installs the fmt subscriber once. Later calls, or a subscriber installed
/// by someone else, are left alone.
pub fn init_logging(level: Level) -> ProgressLogger {
    if !tracing::dispatcher::has_been_set() {
        INIT.call_once(|| {
            tracing_subscriber::fmt()
                .with_max_level(level)
                .init();
        });
    }
    ProgressLogger::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixes_stack() {
        let logger = ProgressLogger::new()
            .with_prefix("(1/2)".to_string())
            .with_prefix("📝".to_string());
        assert_eq!(logger.prefix(), "(1/2) 📝 ");
    }

    #[test]
    fn test_topic_prefix_leaves_parent_untouched() {
        let parent = ProgressLogger::new();
        let child = parent.clone().with_prefix("[deep-focus]".to_string());
        assert_eq!(child.prefix(), "[deep-focus] ");
        assert_eq!(parent.prefix(), "");
        child.warn("failed");
        child.debug("publishing");
    }
}
