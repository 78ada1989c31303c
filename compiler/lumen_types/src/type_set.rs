//! Flattened sets of types.

use smallvec::SmallVec;

use crate::{Type, UnknownReason};

/// The members of a (possibly nested) union, in order, without duplicates.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypeSet {
    types: SmallVec<[Type; 4]>,
}

impl TypeSet {
    pub fn new() -> Self {
        TypeSet::default()
    }

    /// The members of `ty`, flattening nested unions.
    pub fn of(ty: &Type) -> Self {
        let mut set = TypeSet::new();
        set.add(ty);
        set
    }

    /// Add `ty` (or each of its union members) unless already present.
    pub fn add(&mut self, ty: &Type) {
        match ty {
            Type::Union(left, right) => {
                self.add(left);
                self.add(right);
            }
            _ => {
                if !self.types.contains(ty) {
                    self.types.push(ty.clone());
                }
            }
        }
    }

    pub fn extend(&mut self, other: &TypeSet) {
        for ty in other.iter() {
            self.add(ty);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Type> {
        self.types.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Members for which `remove` is false.
    #[must_use]
    pub fn without(&self, mut remove: impl FnMut(&Type) -> bool) -> TypeSet {
        TypeSet {
            types: self.types.iter().filter(|ty| !remove(ty)).cloned().collect(),
        }
    }

    /// Members not accepted by `ty`. Used to narrow the `no` branch of a
    /// type test.
    #[must_use]
    pub fn difference(&self, ty: &Type) -> TypeSet {
        self.without(|member| ty.accepts(member))
    }

    /// Drop members accepted by another member, keeping the first of any
    /// mutually accepting pair.
    #[must_use]
    pub fn reduced(&self) -> TypeSet {
        let mut kept: SmallVec<[Type; 4]> = SmallVec::new();
        for ty in &self.types {
            if kept.iter().any(|existing| existing.accepts(ty)) {
                continue;
            }
            kept.retain(|existing| !ty.accepts(existing));
            kept.push(ty.clone());
        }
        TypeSet { types: kept }
    }

    /// Fold back into a single type.
    ///
    /// An empty set has no possible values; it becomes an unknown type
    /// explaining that the code is unreachable.
    pub fn to_type(&self) -> Type {
        let mut members = self.types.iter().rev();
        let Some(last) = members.next() else {
            return Type::Unknown(Box::new(crate::UnknownType {
                node: None,
                reason: UnknownReason::Unreachable,
                why: None,
            }));
        };
        members.fold(last.clone(), |union, member| {
            Type::Union(Box::new(member.clone()), Box::new(union))
        })
    }
}

#[cfg(test)]
mod tests;
