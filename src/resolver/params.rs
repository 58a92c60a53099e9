//! Parameter-binding plan.
//!
//! Every parameter occurrence gets an id in left-to-right resolution order;
//! operator resolution back-fills expected types through inference. The
//! resulting spec list is what the (out-of-scope) executor binds against.

use crate::meta::types::RelationalType;

#[derive(Clone, Debug, PartialEq)]
pub struct ParameterSpec {
    /// Occurrence index, 0-based, in resolution order.
    pub position: usize,
    /// Name for named parameters.
    pub name: Option<String>,
    /// Inferred expected type; None when no operand context constrained it
    /// (left to the executor's defaulting rules).
    pub expected_type: Option<RelationalType>,
}

#[derive(Debug, Default)]
pub struct ParameterRegistry {
    specs: Vec<ParameterSpec>,
}

impl ParameterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: Option<String>) -> usize {
        let position = self.specs.len();
        self.specs.push(ParameterSpec {
            position,
            name,
            expected_type: None,
        });
        position
    }

    /// Record an inferred type; the first inference wins, later ones are
    /// ignored (resolution visits some nodes twice).
    pub fn infer(&mut self, id: usize, ty: &RelationalType) {
        if let Some(spec) = self.specs.get_mut(id) {
            if spec.expected_type.is_none() {
                log::debug!("parameter {}: inferred type {:?}", id, ty.category());
                spec.expected_type = Some(ty.clone());
            }
        }
    }

    pub fn specs(&self) -> &[ParameterSpec] {
        &self.specs
    }

    pub fn into_specs(self) -> Vec<ParameterSpec> {
        self.specs
    }
}
