//! Registry of workflow definitions keyed by kind.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::{WorkflowConfig, WorkflowDefinition};
use crate::errors::{codes, DefinitionError};

/// Read-only lookup of workflow definitions, filled once at start-up.
#[derive(Debug, Clone, Default)]
pub struct WorkflowRegistry {
    definitions: BTreeMap<String, Arc<WorkflowDefinition>>,
}

impl WorkflowRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from tables.
    ///
    /// # Errors
    ///
    /// Returns the first invalid table or duplicate kind.
    pub fn from_configs<'a>(
        configs: impl IntoIterator<Item = &'a WorkflowConfig>,
    ) -> Result<Self, DefinitionError> {
        let mut registry = Self::new();
        for config in configs {
            registry.register(config.build()?)?;
        }
        Ok(registry)
    }

    /// Registers a definition under its kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the kind is already registered.
    pub fn register(
        &mut self,
        definition: WorkflowDefinition,
    ) -> Result<Arc<WorkflowDefinition>, DefinitionError> {
        let kind = definition.kind().to_string();
        if self.definitions.contains_key(&kind) {
            return Err(DefinitionError::new(
                &kind,
                codes::CONFIG,
                format!("Workflow kind '{kind}' is already registered"),
            ));
        }
        let definition = Arc::new(definition);
        self.definitions.insert(kind, Arc::clone(&definition));
        Ok(definition)
    }

    /// Looks up a definition.
    #[must_use]
    pub fn get(&self, kind: &str) -> Option<Arc<WorkflowDefinition>> {
        self.definitions.get(kind).cloned()
    }

    /// Registered kinds in sorted order.
    #[must_use]
    pub fn kinds(&self) -> Vec<&str> {
        self.definitions.keys().map(String::as_str).collect()
    }

    /// Number of registered kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
