//! Input contracts for the tool surface.
//!
//! Every tool declares a [`ToolContract`]: its name, a human description, and
//! a [`Schema`] describing the argument object. The [`SchemaRegistry`] is the
//! process-wide lookup table built once at startup; validation never mutates
//! it. Raw caller arguments only become [`Args`] by passing validation, so
//! handlers downstream can rely on defaults being applied and bounds holding.

mod types;
mod validate;

pub use types::{Args, FieldKind, FieldSpec, Schema, ToolContract, ValidationError};
pub use validate::validate;

use std::collections::HashMap;

/// Process-wide mapping from tool name to input contract.
///
/// Constructed once when the registry of handlers is built, read-only after.
pub struct SchemaRegistry {
    contracts: HashMap<&'static str, ToolContract>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self {
            contracts: HashMap::new(),
        }
    }

    /// Registers a contract. Tool names are unique; a duplicate registration
    /// is a programming error and panics at startup rather than shadowing.
    pub fn register(&mut self, contract: ToolContract) {
        let name = contract.name;
        if self.contracts.insert(name, contract).is_some() {
            panic!("duplicate tool contract: {name}");
        }
    }

    pub fn lookup(&self, tool_name: &str) -> Option<&ToolContract> {
        self.contracts.get(tool_name)
    }

    /// Validates a raw argument bag against a registered contract, producing
    /// a typed argument object with defaults applied, or the complete list of
    /// field problems.
    pub fn validate(
        &self,
        contract: &ToolContract,
        raw: &serde_json::Value,
    ) -> Result<Args, Vec<ValidationError>> {
        validate(&contract.schema, raw)
    }

    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_contract() -> ToolContract {
        ToolContract {
            name: "sample",
            description: "sample tool",
            schema: Schema::new(vec![FieldSpec::string("key").required()]),
        }
    }

    #[test]
    fn lookup_miss_is_none() {
        let mut registry = SchemaRegistry::new();
        registry.register(sample_contract());
        assert!(registry.lookup("sample").is_some());
        assert!(registry.lookup("nope").is_none());
    }

    #[test]
    #[should_panic(expected = "duplicate tool contract")]
    fn duplicate_registration_panics() {
        let mut registry = SchemaRegistry::new();
        registry.register(sample_contract());
        registry.register(sample_contract());
    }
}
