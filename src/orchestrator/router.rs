use crate::llm::ProviderAdapter;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Deterministic round-robin over an ordered adapter list
pub struct ProviderRouter {
    adapters: Vec<Arc<dyn ProviderAdapter>>,
    counter: AtomicUsize,
}

impl ProviderRouter {
    pub fn new(adapters: Vec<Arc<dyn ProviderAdapter>>) -> Self {
        Self {
            adapters,
            counter: AtomicUsize::new(0),
        }
    }

    /// Next adapter in rotation, `None` only when the list is empty.
    /// The counter is bumped before the modulo, so a fresh router starts at index 1.
    pub fn select(&self) -> Option<Arc<dyn ProviderAdapter>> {
        if self.adapters.is_empty() {
            return None;
        }
        let tick = self.counter.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        let index = tick % self.adapters.len();
        self.adapters.get(index).cloned()
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.adapters.iter().map(|a| a.name().to_string()).collect()
    }
}

impl std::fmt::Debug for ProviderRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRouter")
            .field("adapters", &self.provider_names())
            .field("counter", &self.counter.load(Ordering::Relaxed))
            .finish()
    }
}
