use hashbrown::HashMap;

use super::{
    node::{FactoryCtx, Node, NodeId, NodeSpec, UnitGenerator},
    param::ParamSet,
};
use crate::error::GraphError;

/// Builds a fresh unit generator for a node type.
pub type Factory = Box<dyn Fn(&FactoryCtx<'_>) -> Box<dyn UnitGenerator> + Send + Sync>;

struct Entry {
    spec: &'static NodeSpec,
    factory: Factory,
}

/// Map from type name to node spec and factory.
pub struct NodeRegistry {
    entries: HashMap<&'static str, Entry>,
}

impl NodeRegistry {
    /// A registry with no types at all.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// A registry holding every node type shipped with the crate.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        crate::nodes::register_builtins(&mut registry);
        registry
    }

    /// Add or replace a type.
    pub fn register<F>(&mut self, spec: &'static NodeSpec, factory: F)
    where
        F: Fn(&FactoryCtx<'_>) -> Box<dyn UnitGenerator> + Send + Sync + 'static,
    {
        self.entries.insert(
            spec.type_name,
            Entry {
                spec,
                factory: Box::new(factory),
            },
        );
    }

    pub fn spec(&self, type_name: &str) -> Option<&'static NodeSpec> {
        self.entries.get(type_name).map(|entry| entry.spec)
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.entries.contains_key(type_name)
    }

    /// Registered type names, sorted.
    pub fn type_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.entries.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Build a node with default parameters overridden by `params`.
    pub fn instantiate(
        &self,
        type_name: &str,
        id: NodeId,
        params: &[(&str, f32)],
        sample_rate: f32,
        seed: u64,
    ) -> Result<Node, GraphError> {
        let entry = self
            .entries
            .get(type_name)
            .ok_or_else(|| GraphError::UnknownType(type_name.to_string()))?;

        let mut values = ParamSet::new(entry.spec.params);
        for &(name, value) in params {
            values.set(name, value).ok_or_else(|| GraphError::UnknownParam {
                node: id,
                name: name.to_string(),
            })?;
        }

        let ctx = FactoryCtx {
            params: &values,
            sample_rate,
            // Distinct deterministic stream per node
            seed: seed ^ (id.0 as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15),
        };
        let generator = (entry.factory)(&ctx);
        Ok(Node::new(id, entry.spec, values, generator))
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
