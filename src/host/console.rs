use std::sync::Mutex;

use log::{debug, info, warn};

use super::{ClickHandler, ClickTarget, Notifier, SelectionContext, ViewEvents};
use crate::output::{failure, success};

/// Prints operator notifications on stderr.
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, message: &str) {
        info!("{message}");
        eprintln!("{} {message}", success("✓"));
    }

    fn error(&self, message: &str) {
        warn!("{message}");
        eprintln!("{} {message}", failure("✗"));
    }
}

/// A node selection that never changes.
#[derive(Debug, Clone, Default)]
pub struct FixedSelection(pub Option<String>);

impl SelectionContext for FixedSelection {
    fn selected_node(&self) -> Option<String> {
        self.0.clone()
    }
}

/// Delegated click handlers, dispatched by CSS class selector.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: Mutex<Vec<(String, String, ClickHandler)>>,
}

impl HandlerRegistry {
    pub fn handler_count(&self) -> usize {
        self.handlers
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    /// Runs every handler bound to `selector`, returns how many ran.
    pub fn click(&self, selector: &str, target: &ClickTarget) -> usize {
        let matching: Vec<ClickHandler> = self
            .handlers
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .iter()
            .filter(|(_, bound, _)| bound == selector)
            .map(|(_, _, handler)| handler.clone())
            .collect();

        // Handlers run outside the lock, they may bind further handlers
        for handler in &matching {
            handler(target.clone());
        }
        matching.len()
    }
}

impl ViewEvents for HandlerRegistry {
    fn on_click(&self, namespace: &str, selector: &str, handler: ClickHandler) {
        debug!("Binding {namespace} on {selector}");
        self.handlers
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push((namespace.to_string(), selector.to_string(), handler));
    }
}
