use lumen_types::{StreamSource, Type};

/// A stream itself rather than its latest value, as seen by `Previous` and
/// `Changed`.
#[derive(Clone, Debug, PartialEq)]
pub struct StreamValue {
    pub source: StreamSource,
    pub value_type: Type,
}

impl StreamValue {
    pub fn new(source: StreamSource, value_type: Type) -> Self {
        StreamValue { source, value_type }
    }
}
