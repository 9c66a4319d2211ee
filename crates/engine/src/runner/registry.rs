use crate::adapters::{CheckovAdapter, ReportAdapter, TfsecAdapter, TrivyAdapter};
use crate::core::Tool;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Adapter lookup keyed by tool tag. `BTreeMap` keeps listings in a stable
/// order.
pub struct AdapterRegistry {
    adapters: BTreeMap<Tool, Arc<dyn ReportAdapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self {
            adapters: BTreeMap::new(),
        }
    }

    /// A registry with every built-in adapter.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(TfsecAdapter);
        registry.register(CheckovAdapter);
        registry.register(TrivyAdapter);
        registry
    }

    pub fn register<A: ReportAdapter + 'static>(&mut self, adapter: A) {
        self.adapters.insert(adapter.tool(), Arc::new(adapter));
    }

    pub fn get(&self, tool: Tool) -> Option<Arc<dyn ReportAdapter>> {
        self.adapters.get(&tool).cloned()
    }

    pub fn list(&self) -> Vec<(Tool, &'static str)> {
        self.adapters
            .values()
            .map(|a| (a.tool(), a.description()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
