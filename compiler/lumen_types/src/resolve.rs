//! Name resolution.
//!
//! Names resolve lexically, walking outward from the referring node:
//! block statements (the nearest preceding definition wins, later ones are
//! still visible), then function and structure inputs, then the program's
//! borrows, and finally the project's declared streams.

use lumen_ir::{Name, Node, NodeId, NodeKind, NodeRef};

use crate::{Context, Definition, Source, StreamSource};

impl Context {
    /// What a `Reference` or `NameType` node refers to.
    pub fn resolve(&self, node: &Node) -> Option<Definition> {
        let name = match node.kind() {
            NodeKind::Reference { name } | NodeKind::NameType { name } => *name,
            _ => return None,
        };
        if let Some(cached) = self.cached_resolution(node.id()) {
            return cached;
        }
        let definition = self.resolve_name(node.id(), name);
        self.cache_resolution(node.id(), definition.clone());
        definition
    }

    /// Resolve `name` as seen from node `from`.
    pub fn resolve_name(&self, from: NodeId, name: Name) -> Option<Definition> {
        let defines = |node: &&NodeRef| node.defines_name() == Some(name);
        let tree = self.project().tree_of(from)?;
        let mut child = from;
        let mut via_reaction: Option<&NodeRef> = None;

        for ancestor in tree.ancestors(from) {
            match ancestor.kind() {
                NodeKind::Reaction {
                    condition, next, ..
                } if via_reaction.is_none()
                    && (child == condition.id() || child == next.id()) =>
                {
                    via_reaction = Some(ancestor);
                }
                NodeKind::Block { statements } => {
                    let found = match statements.iter().position(|s| s.id() == child) {
                        Some(position) => statements[..=position]
                            .iter()
                            .rev()
                            .find(defines)
                            .or_else(|| statements[position + 1..].iter().find(defines)),
                        None => statements.iter().rev().find(defines),
                    };
                    if let Some(statement) = found {
                        let encloses = statement.id() == child;
                        return Some(statement_definition(statement, encloses, via_reaction));
                    }
                }
                NodeKind::FunctionDefinition { inputs, .. }
                | NodeKind::StructureDefinition { inputs, .. } => {
                    if let Some(input) = inputs.iter().find(defines) {
                        return Some(Definition::Bind(NodeRef::clone(input)));
                    }
                }
                NodeKind::Program { borrows, .. } => {
                    if let Some(borrow) = borrows.iter().rev().find(defines) {
                        return Some(Definition::Borrow(NodeRef::clone(borrow)));
                    }
                }
                _ => {}
            }
            child = ancestor.id();
        }

        self.project()
            .stream(name)
            .map(|stream| Definition::Stream(stream.id))
    }

    /// Whether `reference` resolves to a bind that contains it, outside of
    /// a reaction. Such a bind's value would need itself to be evaluated.
    pub fn is_reference_cycle(&self, reference: &Node) -> bool {
        match self.resolve(reference) {
            Some(Definition::Bind(bind)) => self
                .project()
                .tree_of(reference.id())
                .is_some_and(|tree| tree.is_within(reference.id(), bind.id())),
            _ => false,
        }
    }

    /// The source and, for `↓ source.name`, the definition a borrow names.
    ///
    /// `None` if the source or the definition does not exist.
    pub fn borrowed(&self, borrow: &Node) -> Option<(&Source, Option<&NodeRef>)> {
        let NodeKind::Borrow { source, name } = borrow.kind() else {
            return None;
        };
        let source = self.project().source(*source)?;
        match name {
            Some(name) => source
                .top_level(*name)
                .map(|definition| (source, Some(definition))),
            None => Some((source, None)),
        }
    }

    /// The stream a `Previous` or `Changed` operand names, if it names one:
    /// a declared stream, or a bind whose value is a reaction.
    pub fn stream_source(&self, operand: &Node) -> Option<StreamSource> {
        match self.resolve(operand)? {
            Definition::Stream(id) => Some(StreamSource::External(id)),
            Definition::Bind(bind) | Definition::ReactionValue { bind, .. } => {
                reaction_of(&bind).map(|reaction| StreamSource::Reaction(reaction.id()))
            }
            Definition::Borrow(borrow) => match self.borrowed(&borrow)? {
                (_, Some(definition)) => {
                    reaction_of(definition).map(|reaction| StreamSource::Reaction(reaction.id()))
                }
                (_, None) => None,
            },
            Definition::Function(_) | Definition::Structure(_) => None,
        }
    }
}

fn statement_definition(
    statement: &NodeRef,
    encloses: bool,
    via_reaction: Option<&NodeRef>,
) -> Definition {
    let statement = NodeRef::clone(statement);
    match statement.kind() {
        NodeKind::FunctionDefinition { .. } => Definition::Function(statement),
        NodeKind::StructureDefinition { .. } => Definition::Structure(statement),
        _ => match via_reaction {
            Some(reaction) if encloses => Definition::ReactionValue {
                bind: statement,
                reaction: NodeRef::clone(reaction),
            },
            _ => Definition::Bind(statement),
        },
    }
}

/// The reaction a bind's value is, if it is one.
pub fn reaction_of(bind: &NodeRef) -> Option<&NodeRef> {
    match bind.kind() {
        NodeKind::Bind {
            value: Some(value), ..
        } if matches!(value.kind(), NodeKind::Reaction { .. }) => Some(value),
        _ => None,
    }
}
