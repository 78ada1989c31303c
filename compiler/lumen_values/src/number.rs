//! Numbers with units.
//!
//! Addition, subtraction, remainder and comparison need equal units;
//! multiplication and division combine them. Violations are reported as
//! [`UnitMismatch`] and become type-mismatch exceptions in the evaluator.

use std::cmp::Ordering;
use std::fmt;

use lumen_ir::Unit;

#[derive(Clone, Debug, PartialEq)]
pub struct Number {
    pub value: f64,
    pub unit: Unit,
}

/// The units of two operands did not fit the operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnitMismatch {
    pub expected: Unit,
    pub given: Unit,
}

impl Number {
    pub fn new(value: f64, unit: Unit) -> Self {
        Number { value, unit }
    }

    pub fn unitless(value: f64) -> Self {
        Number::new(value, Unit::unitless())
    }

    fn same_unit(&self, other: &Number) -> Result<(), UnitMismatch> {
        if self.unit == other.unit {
            Ok(())
        } else {
            Err(UnitMismatch {
                expected: self.unit.clone(),
                given: other.unit.clone(),
            })
        }
    }

    pub fn add(&self, other: &Number) -> Result<Number, UnitMismatch> {
        self.same_unit(other)?;
        Ok(Number::new(self.value + other.value, self.unit.clone()))
    }

    pub fn subtract(&self, other: &Number) -> Result<Number, UnitMismatch> {
        self.same_unit(other)?;
        Ok(Number::new(self.value - other.value, self.unit.clone()))
    }

    pub fn remainder(&self, other: &Number) -> Result<Number, UnitMismatch> {
        self.same_unit(other)?;
        Ok(Number::new(self.value % other.value, self.unit.clone()))
    }

    pub fn multiply(&self, other: &Number) -> Number {
        Number::new(self.value * other.value, self.unit.product(&other.unit))
    }

    pub fn divide(&self, other: &Number) -> Number {
        Number::new(self.value / other.value, self.unit.quotient(&other.unit))
    }

    /// `self ^ exponent`. The exponent must be unitless; a base with a unit
    /// also needs an integral exponent so the result's unit exists.
    pub fn power(&self, exponent: &Number) -> Result<Number, UnitMismatch> {
        let mismatch = || UnitMismatch {
            expected: Unit::unitless(),
            given: exponent.unit.clone(),
        };
        if !exponent.unit.is_unitless() {
            return Err(mismatch());
        }
        let value = self.value.powf(exponent.value);
        if self.unit.is_unitless() {
            return Ok(Number::unitless(value));
        }
        if exponent.value.fract() != 0.0 || exponent.value.abs() > f64::from(i32::MAX) {
            return Err(UnitMismatch {
                expected: self.unit.clone(),
                given: self.unit.clone(),
            });
        }
        Ok(Number::new(value, self.unit.power(exponent.value as i32)))
    }

    #[must_use]
    pub fn negate(&self) -> Number {
        Number::new(-self.value, self.unit.clone())
    }

    /// Ordering between numbers of the same unit. NaN orders as equal.
    pub fn compare(&self, other: &Number) -> Result<Ordering, UnitMismatch> {
        self.same_unit(other)?;
        Ok(self.value.partial_cmp(&other.value).unwrap_or(Ordering::Equal))
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit)
    }
}
