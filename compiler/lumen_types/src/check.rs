//! Conflict detection.
//!
//! Every node of every source is visited exactly once per context, in
//! pre-order. Type mismatches are only reported when neither side contains
//! an unknown type; the unknown's own cause is reported where it arises.

use tracing::debug;

use lumen_diagnostic::Template;
use lumen_ir::{Node, NodeKind, NodeRef, OperatorGroup, UnaryOp};

use crate::{Conflict, ConflictKind, ConflictSet, Context, Definition, Type};

fn mismatch(expected: &Type, given: &Type) -> bool {
    !expected.contains_unknown() && !given.contains_unknown() && !expected.accepts(given)
}

fn template(kind: ConflictKind) -> Template {
    Template::new(kind.key())
}

impl Context {
    /// All conflicts in the project, in source order then pre-order.
    #[tracing::instrument(level = "debug", skip_all, fields(sources = self.project().sources().len()))]
    pub fn conflicts(&self) -> ConflictSet {
        let mut set = ConflictSet::new();
        for source in self.project().sources() {
            for node in source.tree().preorder() {
                set.extend(self.conflicts_of(node));
            }
        }
        debug!(count = set.len(), "conflicts found");
        set
    }

    /// Conflicts whose primary node is `node`'s own concern.
    pub fn conflicts_of(&self, node: &Node) -> Vec<Conflict> {
        let mut found = Vec::new();
        let id = node.id();
        match node.kind() {
            NodeKind::Bind {
                name,
                annotation: Some(annotation),
                value: Some(value),
            } => {
                let expected = self.type_of(annotation);
                let given = self.type_of(value);
                if mismatch(&expected, &given) {
                    let kind = ConflictKind::IncompatibleBind;
                    found.push(
                        Conflict::new(
                            kind,
                            id,
                            template(kind).arg(*name).ty(&expected).ty(&given),
                        )
                        .with_secondary(
                            value.id(),
                            Template::new("conflict.incompatible-bind.value").ty(&given),
                        ),
                    );
                }
            }
            NodeKind::Block { statements } => {
                duplicates(statements, &mut found);
                let program = self.is_program_block(node);
                match statements.last() {
                    None if !program => {
                        let kind = ConflictKind::NoExpression;
                        found.push(Conflict::new(kind, id, template(kind)));
                    }
                    Some(last) if !program && matches!(last.kind(), NodeKind::Bind { .. }) => {
                        let kind = ConflictKind::ExpectedEndingExpression;
                        found.push(Conflict::new(kind, last.id(), template(kind)));
                    }
                    _ => {}
                }
            }
            NodeKind::FunctionDefinition { inputs, body, .. } => {
                duplicates(inputs, &mut found);
                if body.is_none() {
                    let kind = ConflictKind::NoExpression;
                    found.push(Conflict::new(kind, id, template(kind)));
                }
            }
            NodeKind::StructureDefinition { inputs, .. } => duplicates(inputs, &mut found),
            NodeKind::Program { borrows, .. } => duplicates(borrows, &mut found),
            NodeKind::Borrow { source, name } => match self.borrowed(node) {
                None => {
                    let kind = ConflictKind::UnknownBorrow;
                    let mut message = template(kind).arg(*source);
                    if let Some(name) = name {
                        message = message.arg(*name);
                    }
                    found.push(Conflict::new(kind, id, message));
                }
                Some(_) => {
                    let cyclic = &self.evaluation_order().cyclic;
                    let own = self.project().source_of(id).map(crate::Source::name);
                    if cyclic.contains(source) && own.is_some_and(|own| cyclic.contains(&own)) {
                        let kind = ConflictKind::BorrowCycle;
                        found.push(Conflict::new(kind, id, template(kind).arg(*source)));
                    }
                }
            },
            NodeKind::Reference { name } => match self.resolve(node) {
                None => {
                    let kind = ConflictKind::UnknownName;
                    found.push(Conflict::new(kind, id, template(kind).arg(*name)));
                }
                Some(Definition::Bind(bind)) if self.is_reference_cycle(node) => {
                    let kind = ConflictKind::ReferenceCycle;
                    found.push(
                        Conflict::new(kind, id, template(kind).arg(*name)).with_secondary(
                            bind.id(),
                            Template::new("conflict.reference-cycle.bind").arg(*name),
                        ),
                    );
                }
                Some(_) => {}
            },
            NodeKind::NameType { name } => {
                if !matches!(self.resolve(node), Some(Definition::Structure(_))) {
                    let kind = ConflictKind::UnknownName;
                    found.push(Conflict::new(kind, id, template(kind).arg(*name)));
                }
            }
            NodeKind::MapLiteral { entries } => {
                for entry in entries {
                    if !matches!(entry.kind(), NodeKind::KeyValue { .. }) {
                        let kind = ConflictKind::NotAMap;
                        found.push(Conflict::new(kind, id, template(kind)).with_secondary(
                            entry.id(),
                            Template::new("conflict.not-a-map.entry").arg(entry.id()),
                        ));
                    }
                }
            }
            NodeKind::ListAccess { list, index } => {
                let list_type = self.type_of(list);
                if !matches!(list_type, Type::List(_) | Type::Any) && !list_type.contains_unknown()
                {
                    let kind = ConflictKind::NotAList;
                    found.push(Conflict::new(kind, list.id(), template(kind).ty(&list_type)));
                }
                let index_type = self.type_of(index);
                if mismatch(&Type::unitless(), &index_type) {
                    let kind = ConflictKind::NotAListIndex;
                    found.push(Conflict::new(kind, index.id(), template(kind).ty(&index_type)));
                }
            }
            NodeKind::Evaluate { function, inputs } => {
                self.evaluate_conflicts(node, function, inputs, &mut found);
            }
            NodeKind::BinaryOperation { left, op, right } => {
                let operation = self.operation(node, *op, left, right);
                let left_type = self.type_of(left);
                let kind = ConflictKind::IncompatibleInput;
                if !operation.defined {
                    found.push(
                        Conflict::new(kind, id, template(kind).text(op.as_symbol()).ty(&left_type))
                            .with_secondary(
                                left.id(),
                                Template::new("conflict.incompatible-input.operand").ty(&left_type),
                            ),
                    );
                } else if let Some(expected) = &operation.expected_right {
                    let given = self.type_of(right);
                    if mismatch(expected, &given) {
                        found.push(
                            Conflict::new(
                                kind,
                                right.id(),
                                template(kind).text(op.as_symbol()).ty(expected).ty(&given),
                            )
                            .with_secondary(
                                left.id(),
                                Template::new("conflict.incompatible-input.operand")
                                    .ty(&left_type),
                            ),
                        );
                    }
                }
                if let NodeKind::BinaryOperation { op: inner, .. } = left.kind() {
                    let arithmetic = |group| {
                        matches!(
                            group,
                            OperatorGroup::Additive
                                | OperatorGroup::Multiplicative
                                | OperatorGroup::Exponential
                        )
                    };
                    if inner.group() != op.group()
                        && arithmetic(inner.group())
                        && arithmetic(op.group())
                    {
                        let kind = ConflictKind::OrderOfOperations;
                        found.push(Conflict::new(
                            kind,
                            id,
                            template(kind).text(inner.as_symbol()).text(op.as_symbol()),
                        ));
                    }
                }
            }
            NodeKind::UnaryOperation { op, operand } => {
                let given = self.type_of(operand);
                let fits = match op {
                    UnaryOp::Negate => matches!(given, Type::Number(_) | Type::Any),
                    UnaryOp::Not => Type::Bool.accepts(&given),
                };
                if !fits && !given.contains_unknown() {
                    let kind = ConflictKind::IncompatibleInput;
                    found.push(Conflict::new(
                        kind,
                        operand.id(),
                        template(kind).text(op.as_symbol()).ty(&given),
                    ));
                }
            }
            NodeKind::Conditional { condition, .. } | NodeKind::Reaction { condition, .. } => {
                let given = self.type_of(condition);
                if mismatch(&Type::Bool, &given) {
                    let kind = ConflictKind::ExpectedBooleanCondition;
                    found.push(Conflict::new(kind, condition.id(), template(kind).ty(&given)));
                }
            }
            NodeKind::Previous { stream, offset } => {
                self.stream_conflict(stream, &mut found);
                if let Some(offset) = offset {
                    let given = self.type_of(offset);
                    if mismatch(&Type::unitless(), &given) {
                        let kind = ConflictKind::NotAStreamIndex;
                        found.push(Conflict::new(kind, offset.id(), template(kind).ty(&given)));
                    }
                }
            }
            NodeKind::Changed { stream } => self.stream_conflict(stream, &mut found),
            NodeKind::Placeholder => {
                let kind = ConflictKind::Placeholder;
                found.push(Conflict::new(kind, id, template(kind)));
            }
            NodeKind::Unparsable { text } => {
                let kind = ConflictKind::UnparsableConflict;
                found.push(Conflict::new(kind, id, template(kind).text(text.clone())));
            }
            _ => {}
        }
        found
    }

    fn stream_conflict(&self, stream: &NodeRef, found: &mut Vec<Conflict>) {
        if self.stream_source(stream).is_none() {
            let kind = ConflictKind::NotAStream;
            found.push(Conflict::new(kind, stream.id(), template(kind)));
        }
    }

    fn evaluate_conflicts(
        &self,
        evaluate: &Node,
        function: &NodeRef,
        inputs: &[NodeRef],
        found: &mut Vec<Conflict>,
    ) {
        let signature = match self.type_of(function) {
            Type::Function(signature) => signature,
            Type::Any => return,
            other if other.contains_unknown() => return,
            other => {
                let kind = ConflictKind::NotAFunction;
                found.push(Conflict::new(kind, function.id(), template(kind).ty(&other)));
                return;
            }
        };
        let definitions: Vec<NodeRef> = signature
            .definition
            .and_then(|definition| self.project().get(definition))
            .map(|definition| match definition.kind() {
                NodeKind::FunctionDefinition { inputs, .. }
                | NodeKind::StructureDefinition { inputs, .. } => inputs.clone(),
                _ => Vec::new(),
            })
            .unwrap_or_default();

        for (position, argument) in inputs.iter().enumerate() {
            let Some(input) = signature.inputs.get(position) else {
                let kind = ConflictKind::UnexpectedInput;
                found.push(
                    Conflict::new(kind, argument.id(), template(kind).arg(argument.id()))
                        .with_secondary(
                            evaluate.id(),
                            Template::new("conflict.unexpected-input.evaluate"),
                        ),
                );
                continue;
            };
            let given = self.type_of(argument);
            if mismatch(&input.ty, &given) {
                let kind = ConflictKind::IncompatibleInput;
                let mut conflict = Conflict::new(
                    kind,
                    argument.id(),
                    template(kind).arg(input.name).ty(&input.ty).ty(&given),
                );
                if let Some(definition) = definitions.get(position) {
                    conflict = conflict.with_secondary(
                        definition.id(),
                        Template::new("conflict.incompatible-input.input").arg(input.name),
                    );
                }
                found.push(conflict);
            }
        }

        for (position, input) in signature.inputs.iter().enumerate().skip(inputs.len()) {
            if input.optional {
                continue;
            }
            let kind = ConflictKind::MissingInput;
            let mut conflict =
                Conflict::new(kind, evaluate.id(), template(kind).arg(input.name).ty(&input.ty));
            if let Some(definition) = definitions.get(position) {
                conflict = conflict.with_secondary(
                    definition.id(),
                    Template::new("conflict.missing-input.input").arg(input.name),
                );
            }
            found.push(conflict);
        }
    }
}

/// A `DuplicateName` for each node that reuses a name defined earlier in
/// the same list.
fn duplicates(nodes: &[NodeRef], found: &mut Vec<Conflict>) {
    for (position, node) in nodes.iter().enumerate() {
        let Some(name) = node.defines_name() else {
            continue;
        };
        if let Some(original) = nodes[..position]
            .iter()
            .find(|earlier| earlier.defines_name() == Some(name))
        {
            let kind = ConflictKind::DuplicateName;
            found.push(
                Conflict::new(kind, node.id(), template(kind).arg(name)).with_secondary(
                    original.id(),
                    Template::new("conflict.duplicate-name.original").arg(name),
                ),
            );
        }
    }
}
