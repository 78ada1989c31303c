//! Maps: key/value pairs in insertion order, keys compared structurally.

use crate::Value;

#[derive(Clone, Debug, Default)]
pub struct MapValue {
    entries: Vec<(Value, Value)>,
}

impl MapValue {
    /// A map of `entries`. A repeated key keeps its first position and its
    /// last value.
    pub fn new(entries: impl IntoIterator<Item = (Value, Value)>) -> Self {
        let mut map = MapValue::default();
        for (key, value) in entries {
            map.insert(key, value);
        }
        map
    }

    fn insert(&mut self, key: Value, value: Value) {
        match self.entries.iter_mut().find(|(existing, _)| existing.equals(&key)) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn entries(&self) -> &[(Value, Value)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(existing, _)| existing.equals(key))
            .map(|(_, value)| value)
    }

    pub fn has_key(&self, key: &Value) -> bool {
        self.get(key).is_some()
    }

    #[must_use]
    pub fn set(&self, key: Value, value: Value) -> MapValue {
        let mut map = self.clone();
        map.insert(key, value);
        map
    }

    #[must_use]
    pub fn remove(&self, key: &Value) -> MapValue {
        MapValue {
            entries: self
                .entries
                .iter()
                .filter(|(existing, _)| !existing.equals(key))
                .cloned()
                .collect(),
        }
    }

    pub(crate) fn equals(&self, other: &MapValue) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .all(|(key, value)| other.get(key).is_some_and(|theirs| value.equals(theirs)))
    }
}
