use lumen_ir::{Name, NodeId};

use crate::Value;

/// A value built by evaluating a structure definition.
#[derive(Clone, Debug)]
pub struct StructureValue {
    pub definition: NodeId,
    pub name: Name,
    pub fields: Vec<(Name, Value)>,
}

impl StructureValue {
    pub fn new(definition: NodeId, name: Name, fields: Vec<(Name, Value)>) -> Self {
        StructureValue {
            definition,
            name,
            fields,
        }
    }

    pub fn get(&self, field: Name) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, value)| value)
    }

    pub(crate) fn equals(&self, other: &StructureValue) -> bool {
        self.definition == other.definition
            && self.fields.len() == other.fields.len()
            && self
                .fields
                .iter()
                .zip(&other.fields)
                .all(|((name, value), (other_name, other_value))| {
                    name == other_name && value.equals(other_value)
                })
    }
}
