//! Units of measure.
//!
//! A unit is a product of named base units raised to non-zero integer
//! exponents, kept sorted by name so equal units compare equal no matter how
//! they were built. `m·kg/s^2` is `{kg:1, m:1, s:-2}`.

use std::fmt;

use smallvec::SmallVec;

use crate::Name;

#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Unit {
    factors: SmallVec<[(Name, i32); 2]>,
}

impl Unit {
    /// The empty unit.
    pub fn unitless() -> Self {
        Unit::default()
    }

    /// A single base unit with exponent 1. The empty string is unitless.
    pub fn base(name: &str) -> Self {
        if name.is_empty() {
            return Unit::unitless();
        }
        Unit::from_factors([(Name::intern(name), 1)])
    }

    /// Parse the display form: `·`-separated factors, an optional `/`
    /// followed by denominator factors, each factor optionally `^n`.
    pub fn parse(text: &str) -> Self {
        let (numerator, denominator) = text.split_once('/').unwrap_or((text, ""));
        let factors = parse_factors(numerator, 1)
            .chain(parse_factors(denominator, -1))
            .collect::<Vec<_>>();
        Unit::from_factors(factors)
    }

    fn from_factors(factors: impl IntoIterator<Item = (Name, i32)>) -> Self {
        let mut combined: SmallVec<[(Name, i32); 2]> = SmallVec::new();
        for (name, exponent) in factors {
            match combined.iter_mut().find(|(existing, _)| *existing == name) {
                Some((_, total)) => *total += exponent,
                None => combined.push((name, exponent)),
            }
        }
        combined.retain(|(_, exponent)| *exponent != 0);
        combined.sort_by(|a, b| a.0.cmp(&b.0));
        Unit { factors: combined }
    }

    #[inline]
    pub fn is_unitless(&self) -> bool {
        self.factors.is_empty()
    }

    pub fn factors(&self) -> impl Iterator<Item = (Name, i32)> + '_ {
        self.factors.iter().copied()
    }

    /// Unit of `a · b`.
    pub fn product(&self, other: &Unit) -> Unit {
        Unit::from_factors(self.factors().chain(other.factors()))
    }

    /// Unit of `a ÷ b`.
    pub fn quotient(&self, other: &Unit) -> Unit {
        Unit::from_factors(
            self.factors()
                .chain(other.factors().map(|(name, exponent)| (name, -exponent))),
        )
    }

    /// Unit of `a ^ n`.
    pub fn power(&self, exponent: i32) -> Unit {
        Unit::from_factors(
            self.factors()
                .map(|(name, own)| (name, own.saturating_mul(exponent))),
        )
    }
}

fn parse_factors(text: &str, sign: i32) -> impl Iterator<Item = (Name, i32)> + '_ {
    text.split('·')
        .map(str::trim)
        .filter(|factor| !factor.is_empty())
        .map(move |factor| {
            let (name, exponent) = match factor.split_once('^') {
                Some((name, exponent)) => (name, exponent.trim().parse::<i32>().unwrap_or(1)),
                None => (factor, 1),
            };
            (Name::intern(name.trim()), exponent * sign)
        })
}

fn write_factors(
    f: &mut fmt::Formatter<'_>,
    factors: impl Iterator<Item = (Name, i32)>,
) -> fmt::Result {
    for (i, (name, exponent)) in factors.enumerate() {
        if i > 0 {
            f.write_str("·")?;
        }
        if exponent == 1 {
            write!(f, "{name}")?;
        } else {
            write!(f, "{name}^{exponent}")?;
        }
    }
    Ok(())
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_factors(f, self.factors().filter(|(_, exponent)| *exponent > 0))?;
        if self.factors().any(|(_, exponent)| exponent < 0) {
            f.write_str("/")?;
            write_factors(
                f,
                self.factors()
                    .filter(|(_, exponent)| *exponent < 0)
                    .map(|(name, exponent)| (name, -exponent)),
            )?;
        }
        Ok(())
    }
}

impl fmt::Debug for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unit({self})")
    }
}

#[cfg(test)]
mod tests;
