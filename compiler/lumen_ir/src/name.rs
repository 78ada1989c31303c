//! Interned identifiers.
//!
//! A `Name` is a 32-bit handle into one process-wide table. Interned text is
//! leaked on first insertion, which lets `Name::as_str` return `&'static str`
//! without holding the table lock.

use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

/// Interned identifier.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct Name(u32);

struct InternTable {
    map: FxHashMap<&'static str, u32>,
    strings: Vec<&'static str>,
}

impl InternTable {
    fn with_empty() -> Self {
        let mut map = FxHashMap::default();
        map.insert("", 0);
        InternTable {
            map,
            strings: vec![""],
        }
    }
}

static INTERNER: LazyLock<RwLock<InternTable>> =
    LazyLock::new(|| RwLock::new(InternTable::with_empty()));

impl Name {
    /// The empty name, pre-interned at index 0.
    pub const EMPTY: Name = Name(0);

    /// Intern a string, returning its handle.
    pub fn intern(text: &str) -> Self {
        if let Some(&index) = INTERNER.read().map.get(text) {
            return Name(index);
        }
        let mut table = INTERNER.write();
        // Another thread may have won the race between the two locks.
        if let Some(&index) = table.map.get(text) {
            return Name(index);
        }
        let leaked: &'static str = Box::leak(text.to_owned().into_boxed_str());
        let index = u32::try_from(table.strings.len()).unwrap_or(u32::MAX);
        table.strings.push(leaked);
        table.map.insert(leaked, index);
        Name(index)
    }

    /// Look up the interned text.
    pub fn as_str(self) -> &'static str {
        INTERNER
            .read()
            .strings
            .get(self.0 as usize)
            .copied()
            .unwrap_or("")
    }

    /// Get the raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Names order by their text so that anything sorted by name is stable
/// across runs regardless of interning order.
impl Ord for Name {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.0 == other.0 {
            return Ordering::Equal;
        }
        self.as_str().cmp(other.as_str())
    }
}

impl PartialOrd for Name {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({:?})", self.as_str())
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Name {
    fn from(text: &str) -> Self {
        Name::intern(text)
    }
}

#[cfg(test)]
mod tests;
