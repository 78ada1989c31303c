//! Sets: unordered for equality, insertion-ordered for rendering.

use crate::Value;

#[derive(Clone, Debug, Default)]
pub struct SetValue {
    items: Vec<Value>,
}

impl SetValue {
    /// A set of `items`, dropping repeats after their first occurrence.
    pub fn new(items: impl IntoIterator<Item = Value>) -> Self {
        let mut set = SetValue::default();
        for item in items {
            if !set.has(&item) {
                set.items.push(item);
            }
        }
        set
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has(&self, value: &Value) -> bool {
        self.items.iter().any(|item| item.equals(value))
    }

    #[must_use]
    pub fn add(&self, value: Value) -> SetValue {
        SetValue::new(self.items.iter().cloned().chain(std::iter::once(value)))
    }

    #[must_use]
    pub fn remove(&self, value: &Value) -> SetValue {
        SetValue {
            items: self
                .items
                .iter()
                .filter(|item| !item.equals(value))
                .cloned()
                .collect(),
        }
    }

    #[must_use]
    pub fn union(&self, other: &SetValue) -> SetValue {
        SetValue::new(self.items.iter().chain(&other.items).cloned())
    }

    #[must_use]
    pub fn intersection(&self, other: &SetValue) -> SetValue {
        SetValue {
            items: self
                .items
                .iter()
                .filter(|item| other.has(item))
                .cloned()
                .collect(),
        }
    }

    #[must_use]
    pub fn difference(&self, other: &SetValue) -> SetValue {
        SetValue {
            items: self
                .items
                .iter()
                .filter(|item| !other.has(item))
                .cloned()
                .collect(),
        }
    }

    pub(crate) fn equals(&self, other: &SetValue) -> bool {
        self.items.len() == other.items.len() && self.items.iter().all(|item| other.has(item))
    }
}
