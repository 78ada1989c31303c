//! The runtime value enum.
//!
//! Values are cheap to clone: scalars are inline and containers are
//! reference counted behind [`Heap`]. Equality is structural; sets and maps
//! ignore order.

use std::fmt;
use std::sync::Arc;

use lumen_ir::{NodeId, Unit};
use lumen_types::{Type, UnknownReason, UnknownType};

use crate::{
    Exception, FunctionValue, Heap, ListValue, MapValue, Number, SetValue, StreamValue,
    StructureValue,
};

#[derive(Clone, Debug)]
pub enum Value {
    Bool(bool),
    Number(Number),
    Text(Arc<str>),
    None,
    List(Heap<ListValue>),
    Set(Heap<SetValue>),
    Map(Heap<MapValue>),
    Structure(Heap<StructureValue>),
    Function(Heap<FunctionValue>),
    Stream(Heap<StreamValue>),
    /// The result of a halted evaluation.
    Exception(Heap<Exception>),
}

// Factory methods
impl Value {
    #[inline]
    pub fn number(value: f64) -> Self {
        Value::Number(Number::unitless(value))
    }

    #[inline]
    pub fn measure(value: f64, unit: Unit) -> Self {
        Value::Number(Number::new(value, unit))
    }

    #[inline]
    pub fn text(text: impl Into<Arc<str>>) -> Self {
        Value::Text(text.into())
    }

    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Heap::new(ListValue::new(items)))
    }

    pub fn set(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Set(Heap::new(SetValue::new(items)))
    }

    pub fn map(entries: impl IntoIterator<Item = (Value, Value)>) -> Self {
        Value::Map(Heap::new(MapValue::new(entries)))
    }

    pub fn from_list(list: ListValue) -> Self {
        Value::List(Heap::new(list))
    }

    pub fn from_set(set: SetValue) -> Self {
        Value::Set(Heap::new(set))
    }

    pub fn from_map(map: MapValue) -> Self {
        Value::Map(Heap::new(map))
    }

    pub fn structure(structure: StructureValue) -> Self {
        Value::Structure(Heap::new(structure))
    }

    pub fn function(function: FunctionValue) -> Self {
        Value::Function(Heap::new(function))
    }

    pub fn stream(stream: StreamValue) -> Self {
        Value::Stream(Heap::new(stream))
    }

    #[cold]
    pub fn exception(exception: Exception) -> Self {
        Value::Exception(Heap::new(exception))
    }
}

// Accessors
impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListValue> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionValue> {
        match self {
            Value::Function(function) => Some(function),
            _ => None,
        }
    }

    pub fn as_exception(&self) -> Option<&Exception> {
        match self {
            Value::Exception(exception) => Some(exception),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    pub fn is_exception(&self) -> bool {
        matches!(self, Value::Exception(_))
    }

    /// Whether this value holds a function anywhere inside it.
    pub fn contains_function(&self) -> bool {
        match self {
            Value::Function(_) => true,
            Value::List(list) => list.items().iter().any(Value::contains_function),
            Value::Set(set) => set.items().iter().any(Value::contains_function),
            Value::Map(map) => map
                .entries()
                .iter()
                .any(|(key, value)| key.contains_function() || value.contains_function()),
            Value::Structure(structure) => structure
                .fields
                .iter()
                .any(|(_, value)| value.contains_function()),
            _ => false,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::Text(_) => "text",
            Value::None => "none",
            Value::List(_) => "list",
            Value::Set(_) => "set",
            Value::Map(_) => "map",
            Value::Structure(_) => "structure",
            Value::Function(_) => "function",
            Value::Stream(_) => "stream",
            Value::Exception(_) => "exception",
        }
    }

    /// The static type describing this value. Containers union their
    /// elements' types; empty containers hold `Any`.
    pub fn type_of(&self) -> Type {
        fn union_of<'a>(values: impl Iterator<Item = &'a Value>) -> Type {
            Type::union_all(values.map(Value::type_of))
        }
        match self {
            Value::Bool(_) => Type::Bool,
            Value::Number(n) => Type::Number(n.unit.clone()),
            Value::Text(_) => Type::Text,
            Value::None => Type::None,
            Value::List(list) => Type::list(union_of(list.items().iter())),
            Value::Set(set) => Type::set(union_of(set.items().iter())),
            Value::Map(map) => Type::map(
                union_of(map.entries().iter().map(|(key, _)| key)),
                union_of(map.entries().iter().map(|(_, value)| value)),
            ),
            Value::Structure(structure) => Type::Structure {
                definition: structure.definition,
                name: structure.name,
            },
            Value::Function(function) => Type::Function(Arc::clone(&function.ty)),
            Value::Stream(stream) => Type::Stream {
                source: stream.source,
                value: Box::new(stream.value_type.clone()),
            },
            Value::Exception(exception) => Type::Unknown(Box::new(UnknownType {
                node: Some(exception.node),
                reason: UnknownReason::Exception,
                why: None,
            })),
        }
    }

    /// Structural equality. Values of different kinds are never equal.
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::None, Value::None) => true,
            (Value::List(a), Value::List(b)) => Heap::ptr_eq(a, b) || a.equals(b),
            (Value::Set(a), Value::Set(b)) => Heap::ptr_eq(a, b) || a.equals(b),
            (Value::Map(a), Value::Map(b)) => Heap::ptr_eq(a, b) || a.equals(b),
            (Value::Structure(a), Value::Structure(b)) => a.equals(b),
            (Value::Function(a), Value::Function(b)) => a.equals(b),
            (Value::Stream(a), Value::Stream(b)) => a.source == b.source,
            (Value::Exception(a), Value::Exception(b)) => a.kind == b.kind && a.node == b.node,
            _ => false,
        }
    }

    /// Node that produced an exception value.
    pub fn exception_node(&self) -> Option<NodeId> {
        self.as_exception().map(|exception| exception.node)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

fn write_spaced<'a>(
    f: &mut fmt::Formatter<'_>,
    values: impl Iterator<Item = &'a Value>,
) -> fmt::Result {
    for (i, value) in values.enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{value}")?;
    }
    Ok(())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(true) => f.write_str("⊤"),
            Value::Bool(false) => f.write_str("⊥"),
            Value::Number(n) => write!(f, "{n}"),
            Value::Text(s) => write!(f, "\"{s}\""),
            Value::None => f.write_str("ø"),
            Value::List(list) => {
                f.write_str("[")?;
                write_spaced(f, list.items().iter())?;
                f.write_str("]")
            }
            Value::Set(set) => {
                f.write_str("{")?;
                write_spaced(f, set.items().iter())?;
                f.write_str("}")
            }
            Value::Map(map) => {
                if map.is_empty() {
                    return f.write_str("{:}");
                }
                f.write_str("{")?;
                for (i, (key, value)) in map.entries().iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{key}:{value}")?;
                }
                f.write_str("}")
            }
            Value::Structure(structure) => {
                write!(f, "{}(", structure.name)?;
                for (i, (name, value)) in structure.fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{name}:{value}")?;
                }
                f.write_str(")")
            }
            Value::Function(function) => write!(f, "ƒ {}", function.name),
            Value::Stream(stream) => write!(f, "…{}", stream.source),
            Value::Exception(exception) => write!(f, "{}", **exception),
        }
    }
}
