//! Function and structure-constructor values.

use std::fmt;
use std::sync::Arc;

use lumen_ir::{Name, NodeKind, NodeRef};
use lumen_types::FunctionType;

use crate::SharedScope;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FunctionKind {
    Function,
    /// Evaluating it constructs a structure value.
    Structure,
}

/// A definition closed over the scope it was evaluated in.
#[derive(Clone)]
pub struct FunctionValue {
    pub definition: NodeRef,
    pub name: Name,
    pub kind: FunctionKind,
    pub scope: SharedScope,
    pub ty: Arc<FunctionType>,
}

impl FunctionValue {
    /// Returns `None` when `definition` is not a function or structure
    /// definition.
    pub fn new(definition: NodeRef, scope: SharedScope, ty: Arc<FunctionType>) -> Option<Self> {
        let (name, kind) = match definition.kind() {
            NodeKind::FunctionDefinition { name, .. } => (*name, FunctionKind::Function),
            NodeKind::StructureDefinition { name, .. } => (*name, FunctionKind::Structure),
            _ => return None,
        };
        Some(FunctionValue {
            definition,
            name,
            kind,
            scope,
            ty,
        })
    }

    pub fn inputs(&self) -> &[NodeRef] {
        match self.definition.kind() {
            NodeKind::FunctionDefinition { inputs, .. }
            | NodeKind::StructureDefinition { inputs, .. } => inputs,
            _ => &[],
        }
    }

    pub fn body(&self) -> Option<&NodeRef> {
        match self.definition.kind() {
            NodeKind::FunctionDefinition { body, .. } => body.as_ref(),
            _ => None,
        }
    }

    pub(crate) fn equals(&self, other: &FunctionValue) -> bool {
        self.definition.id() == other.definition.id() && Arc::ptr_eq(&self.scope, &other.scope)
    }
}

impl fmt::Debug for FunctionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionValue")
            .field("name", &self.name)
            .field("definition", &self.definition.id())
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}
