//! Lists: ordered, 1-indexed, immutable.

use crate::Value;

#[derive(Clone, Debug, Default)]
pub struct ListValue {
    items: Vec<Value>,
}

impl ListValue {
    pub fn new(items: Vec<Value>) -> Self {
        ListValue { items }
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

    /// Position of `index` in `items`.
    ///
    /// Indices start at 1; negative indices count back from the end, so -1
    /// is the last item. Zero, fractions and anything out of range have no
    /// position.
    fn position(&self, index: f64) -> Option<usize> {
        if index.fract() != 0.0 || index == 0.0 || !index.is_finite() {
            return None;
        }
        let len = self.items.len() as f64;
        let position = if index > 0.0 { index - 1.0 } else { len + index };
        if position < 0.0 || position >= len {
            None
        } else {
            Some(position as usize)
        }
    }

    pub fn get(&self, index: f64) -> Option<&Value> {
        self.position(index).map(|position| &self.items[position])
    }

    pub fn first(&self) -> Option<&Value> {
        self.items.first()
    }

    pub fn last(&self) -> Option<&Value> {
        self.items.last()
    }

    pub fn has(&self, value: &Value) -> bool {
        self.items.iter().any(|item| item.equals(value))
    }

    #[must_use]
    pub fn add(&self, value: Value) -> ListValue {
        let mut items = Vec::with_capacity(self.items.len() + 1);
        items.extend(self.items.iter().cloned());
        items.push(value);
        ListValue { items }
    }

    #[must_use]
    pub fn append(&self, other: &ListValue) -> ListValue {
        let mut items = self.items.clone();
        items.extend(other.items.iter().cloned());
        ListValue { items }
    }

    /// A copy with the item at `index` replaced; unchanged if out of range.
    #[must_use]
    pub fn replace(&self, index: f64, value: Value) -> ListValue {
        let mut items = self.items.clone();
        if let Some(position) = self.position(index) {
            items[position] = value;
        }
        ListValue { items }
    }

    /// A copy without the first item equal to `value`.
    #[must_use]
    pub fn sans(&self, value: &Value) -> ListValue {
        let mut items = self.items.clone();
        if let Some(position) = items.iter().position(|item| item.equals(value)) {
            items.remove(position);
        }
        ListValue { items }
    }

    /// A copy without any item equal to `value`.
    #[must_use]
    pub fn sans_all(&self, value: &Value) -> ListValue {
        ListValue {
            items: self
                .items
                .iter()
                .filter(|item| !item.equals(value))
                .cloned()
                .collect(),
        }
    }

    #[must_use]
    pub fn sans_first(&self) -> ListValue {
        ListValue {
            items: self.items.iter().skip(1).cloned().collect(),
        }
    }

    #[must_use]
    pub fn sans_last(&self) -> ListValue {
        let keep = self.items.len().saturating_sub(1);
        ListValue {
            items: self.items[..keep].to_vec(),
        }
    }

    #[must_use]
    pub fn reverse(&self) -> ListValue {
        ListValue {
            items: self.items.iter().rev().cloned().collect(),
        }
    }

    /// Items rendered and joined by `separator`. Text items contribute their
    /// raw text rather than their quoted rendering.
    pub fn join(&self, separator: &str) -> String {
        let mut joined = String::new();
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                joined.push_str(separator);
            }
            match item {
                Value::Text(text) => joined.push_str(text),
                other => joined.push_str(&other.to_string()),
            }
        }
        joined
    }

    pub(crate) fn equals(&self, other: &ListValue) -> bool {
        self.items.len() == other.items.len()
            && self
                .items
                .iter()
                .zip(&other.items)
                .all(|(mine, theirs)| mine.equals(theirs))
    }
}

#[cfg(test)]
mod tests;
