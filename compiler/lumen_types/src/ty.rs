//! Static types.
//!
//! `Type` is a closed enum over everything a node may evaluate to. Types are
//! compared with [`Type::accepts`], a structural compatibility relation, and
//! never unified. When analysis cannot determine a type it produces
//! [`Type::Unknown`], which records why (and optionally which other type
//! caused it) so diagnostics can explain the chain.

use std::fmt;
use std::sync::Arc;

use lumen_ir::{Name, NodeId, StreamId, Unit};

use crate::TypeSet;

/// Where a stream's values come from.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum StreamSource {
    /// A producer declared to the project.
    External(StreamId),
    /// A reaction node, whose successive values form a stream.
    Reaction(NodeId),
}

impl fmt::Display for StreamSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamSource::External(id) => write!(f, "{id}"),
            StreamSource::Reaction(node) => write!(f, "reaction {node}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    /// Accepts every known type.
    Any,
    Bool,
    Number(Unit),
    Text,
    None,
    List(Box<Type>),
    Set(Box<Type>),
    Map(Box<Type>, Box<Type>),
    Function(Arc<FunctionType>),
    /// A value built by a structure definition.
    Structure {
        definition: NodeId,
        name: Name,
    },
    Stream {
        source: StreamSource,
        value: Box<Type>,
    },
    Union(Box<Type>, Box<Type>),
    Unknown(Box<UnknownType>),
}

/// Signature of a function or structure constructor.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FunctionType {
    /// Defining node, absent for function type annotations.
    pub definition: Option<NodeId>,
    pub inputs: Vec<InputType>,
    pub output: Type,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct InputType {
    pub name: Name,
    pub ty: Type,
    /// Has a default value, so callers may omit it.
    pub optional: bool,
}

impl FunctionType {
    /// Number of inputs a caller must provide.
    pub fn required(&self) -> usize {
        self.inputs.iter().filter(|input| !input.optional).count()
    }
}

/// Why a type could not be determined.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum UnknownReason {
    /// The type depends on itself.
    Cycle,
    Placeholder,
    Unparsable,
    UnknownName,
    UnknownBorrow,
    NotAFunction,
    NotAList,
    NotAMap,
    NotAStructure,
    UnknownProperty,
    NotAStream,
    /// No operator of that name is defined on the operand.
    NoOperator,
    /// Nothing to evaluate: a function without a body or an empty block.
    NoExpression,
    /// Narrowing removed every possibility.
    Unreachable,
    /// The type of a halted evaluation's exception value.
    Exception,
}

impl UnknownReason {
    pub fn key(self) -> &'static str {
        match self {
            UnknownReason::Cycle => "unknown.cycle",
            UnknownReason::Placeholder => "unknown.placeholder",
            UnknownReason::Unparsable => "unknown.unparsable",
            UnknownReason::UnknownName => "unknown.name",
            UnknownReason::UnknownBorrow => "unknown.borrow",
            UnknownReason::NotAFunction => "unknown.not-a-function",
            UnknownReason::NotAList => "unknown.not-a-list",
            UnknownReason::NotAMap => "unknown.not-a-map",
            UnknownReason::NotAStructure => "unknown.not-a-structure",
            UnknownReason::UnknownProperty => "unknown.property",
            UnknownReason::NotAStream => "unknown.not-a-stream",
            UnknownReason::NoOperator => "unknown.no-operator",
            UnknownReason::NoExpression => "unknown.no-expression",
            UnknownReason::Unreachable => "unknown.unreachable",
            UnknownReason::Exception => "unknown.exception",
        }
    }
}

/// An unresolved type and its cause.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UnknownType {
    /// The node whose type could not be determined.
    pub node: Option<NodeId>,
    pub reason: UnknownReason,
    /// The type that led here, when the problem is inherited.
    pub why: Option<Type>,
}

impl UnknownType {
    /// Reasons from this type back to the root cause.
    pub fn reasons(&self) -> Vec<UnknownReason> {
        let mut reasons = vec![self.reason];
        let mut cause = self.why.as_ref();
        while let Some(ty) = cause {
            match ty {
                Type::Unknown(unknown) => {
                    reasons.push(unknown.reason);
                    cause = unknown.why.as_ref();
                }
                _ => break,
            }
        }
        reasons
    }
}

impl Type {
    pub fn unknown(node: NodeId, reason: UnknownReason) -> Type {
        Type::Unknown(Box::new(UnknownType {
            node: Some(node),
            reason,
            why: None,
        }))
    }

    pub fn unknown_because(node: NodeId, reason: UnknownReason, why: Type) -> Type {
        Type::Unknown(Box::new(UnknownType {
            node: Some(node),
            reason,
            why: Some(why),
        }))
    }

    pub fn unitless() -> Type {
        Type::Number(Unit::unitless())
    }

    pub fn list(item: Type) -> Type {
        Type::List(Box::new(item))
    }

    pub fn set(item: Type) -> Type {
        Type::Set(Box::new(item))
    }

    pub fn map(key: Type, value: Type) -> Type {
        Type::Map(Box::new(key), Box::new(value))
    }

    /// `a | b`, with members accepted by an earlier member dropped.
    ///
    /// Returns the single remaining member when the union collapses.
    pub fn union(a: Type, b: Type) -> Type {
        let mut members = TypeSet::of(&a);
        members.extend(&TypeSet::of(&b));
        members.reduced().to_type()
    }

    /// Union of many types, `Any` for none.
    pub fn union_all(types: impl IntoIterator<Item = Type>) -> Type {
        types
            .into_iter()
            .reduce(Type::union)
            .unwrap_or(Type::Any)
    }

    /// `self | none`
    pub fn or_none(self) -> Type {
        Type::union(self, Type::None)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Type::Unknown(_))
    }

    /// Whether this type or any nested type is unknown.
    pub fn contains_unknown(&self) -> bool {
        match self {
            Type::Unknown(_) => true,
            Type::List(item) | Type::Set(item) => item.contains_unknown(),
            Type::Map(key, value) => key.contains_unknown() || value.contains_unknown(),
            Type::Union(left, right) => left.contains_unknown() || right.contains_unknown(),
            Type::Stream { value, .. } => value.contains_unknown(),
            Type::Function(function) => {
                function.output.contains_unknown()
                    || function.inputs.iter().any(|input| input.ty.contains_unknown())
            }
            Type::Any
            | Type::Bool
            | Type::Number(_)
            | Type::Text
            | Type::None
            | Type::Structure { .. } => false,
        }
    }

    /// The first unknown found in this type, depth first.
    pub fn first_unknown(&self) -> Option<&UnknownType> {
        match self {
            Type::Unknown(unknown) => Some(unknown),
            Type::List(item) | Type::Set(item) => item.first_unknown(),
            Type::Map(key, value) | Type::Union(key, value) => {
                key.first_unknown().or_else(|| value.first_unknown())
            }
            Type::Stream { value, .. } => value.first_unknown(),
            Type::Function(function) => function
                .inputs
                .iter()
                .find_map(|input| input.ty.first_unknown())
                .or_else(|| function.output.first_unknown()),
            _ => None,
        }
    }

    /// Whether every value of `candidate` is a value of `self`.
    pub fn accepts(&self, candidate: &Type) -> bool {
        self.accepts_all(&TypeSet::of(candidate))
    }

    /// Whether every type in `candidates` is accepted.
    ///
    /// Each member of `self` removes the candidates it accepts; the set is
    /// accepted if nothing remains.
    pub fn accepts_all(&self, candidates: &TypeSet) -> bool {
        let mut remaining = candidates.clone();
        for member in TypeSet::of(self).iter() {
            remaining = remaining.without(|candidate| member.accepts_member(candidate));
            if remaining.is_empty() {
                return true;
            }
        }
        remaining.is_empty()
    }

    /// Acceptance between two non-union types.
    fn accepts_member(&self, candidate: &Type) -> bool {
        match (self, candidate) {
            (Type::Unknown(_), _) | (_, Type::Unknown(_)) => false,
            (Type::Any, _) => true,
            (Type::Bool, Type::Bool) | (Type::Text, Type::Text) | (Type::None, Type::None) => {
                true
            }
            (Type::Number(unit), Type::Number(other)) => unit == other,
            (Type::List(item), Type::List(other)) | (Type::Set(item), Type::Set(other)) => {
                element_accepts(item, other)
            }
            (Type::Map(key, value), Type::Map(other_key, other_value)) => {
                element_accepts(key, other_key) && element_accepts(value, other_value)
            }
            (Type::Function(function), Type::Function(other)) => {
                function.inputs.len() == other.inputs.len()
                    && function.output.accepts(&other.output)
                    && function
                        .inputs
                        .iter()
                        .zip(&other.inputs)
                        .all(|(mine, theirs)| theirs.ty.accepts(&mine.ty))
            }
            (
                Type::Structure { definition, .. },
                Type::Structure {
                    definition: other, ..
                },
            ) => definition == other,
            (
                Type::Stream { source, value },
                Type::Stream {
                    source: other_source,
                    value: other_value,
                },
            ) => source == other_source && value.accepts(other_value),
            _ => false,
        }
    }
}

fn element_accepts(element: &Type, candidate: &Type) -> bool {
    matches!(element, Type::Any) || matches!(candidate, Type::Any) || element.accepts(candidate)
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Any => f.write_str("*"),
            Type::Bool => f.write_str("?"),
            Type::Number(unit) => write!(f, "#{unit}"),
            Type::Text => f.write_str("\"\""),
            Type::None => f.write_str("ø"),
            Type::List(item) => write!(f, "[{item}]"),
            Type::Set(item) => write!(f, "{{{item}}}"),
            Type::Map(key, value) => write!(f, "{{{key}:{value}}}"),
            Type::Function(function) => {
                f.write_str("ƒ(")?;
                for (i, input) in function.inputs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    if !input.name.is_empty() {
                        write!(f, "{}•", input.name)?;
                    }
                    write!(f, "{}", input.ty)?;
                }
                write!(f, ") {}", function.output)
            }
            Type::Structure { name, .. } => write!(f, "{name}"),
            Type::Stream { value, .. } => write!(f, "…{value}"),
            Type::Union(left, right) => write!(f, "{left}|{right}"),
            Type::Unknown(_) => f.write_str("∄"),
        }
    }
}
