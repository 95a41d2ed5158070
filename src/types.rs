//! The type algebra: value-domain descriptors, their arithmetic
//! composition, and the `dp()` operator each numeric descriptor exposes.

use log::debug;

use crate::error::{DpError, Result};
use crate::mechanisms::{geometric_noise, laplace_noise};
use crate::rng::{RngSource, ThreadRngSource};

/// `maxint` in the original stood for "a large default bound"; we use
/// `i64::MAX` rather than carry over its literal (`2e31 - 1`, a float
/// literal that overflows every fixed-width integer type and was almost
/// certainly meant as `2^31 - 1`). Keeping bounds symmetric around zero
/// avoids the `i64::MIN.abs()` overflow in `absmin`/`absmax`.
pub const MAXINT: i64 = i64::MAX;

/// A value-type descriptor: numeric scalars with inclusive bounds, arrays
/// of such scalars, boolean, and categorical.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Integer { min: i64, max: i64 },
    Float { min: f64, max: f64 },
    Array(Box<Type>),
    Boolean,
    Categorical,
}

/// The arithmetic operators the type algebra and expression algebra share.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    TrueDiv,
    FloorDiv,
}

impl Type {
    /// An `Integer` with the default, effectively-unbounded range.
    pub fn default_integer() -> Type {
        Type::Integer { min: -MAXINT, max: MAXINT }
    }

    /// A `Float` with the default, unbounded range.
    pub fn default_float() -> Type {
        Type::Float { min: f64::NEG_INFINITY, max: f64::INFINITY }
    }

    pub fn integer(min: i64, max: i64) -> Type {
        Type::Integer { min, max }
    }

    pub fn float(min: f64, max: f64) -> Type {
        Type::Float { min, max }
    }

    pub fn array(elem: Type) -> Type {
        Type::Array(Box::new(elem))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Type::Array(_))
    }

    pub fn is_numeric(&self) -> bool {
        match self {
            Type::Integer { .. } | Type::Float { .. } => true,
            Type::Array(inner) => inner.is_numeric(),
            Type::Boolean | Type::Categorical => false,
        }
    }

    /// The scalar numeric type underneath any `Array` wrapping (one level
    /// only; arrays of arrays are not part of this algebra).
    pub fn elem(&self) -> Result<&Type> {
        match self {
            Type::Array(inner) => Ok(inner),
            Type::Integer { .. } | Type::Float { .. } => Ok(self),
            other => Err(DpError::TypeMismatch(format!("{other:?} is not numeric"))),
        }
    }

    /// The scalar `(min, max)` bounds, looking through one `Array` layer.
    pub fn bounds(&self) -> Result<(f64, f64)> {
        match self {
            Type::Integer { min, max } => Ok((*min as f64, *max as f64)),
            Type::Float { min, max } => Ok((*min, *max)),
            Type::Array(inner) => inner.bounds(),
            other => Err(DpError::TypeMismatch(format!("{other:?} has no numeric bounds"))),
        }
    }

    pub fn range(&self) -> Result<f64> {
        let (min, max) = self.bounds()?;
        Ok(max - min)
    }

    pub fn absmin(&self) -> Result<f64> {
        let (min, max) = self.bounds()?;
        Ok(min.abs().min(max.abs()))
    }

    pub fn absmax(&self) -> Result<f64> {
        let (min, max) = self.bounds()?;
        Ok(min.abs().max(max.abs()))
    }

    /// Combines `self` (the left operand) with `other` under `op`.
    ///
    /// Array-ness is contagious: if either side is an `Array`, the result
    /// is `Array` of the combined element type. Otherwise the *left*
    /// operand's variant decides the resulting kind — `Integer + Numeric`
    /// is `Integer`, `Float + Numeric` is `Float` — with bounds computed
    /// by the formula given for that operator, or reset to the type's
    /// default range when no precise formula applies.
    pub fn combine(&self, op: ArithOp, other: &Type) -> Result<Type> {
        match (self, other) {
            (Type::Array(l), Type::Array(r)) => Ok(Type::array(l.combine(op, r)?)),
            (Type::Array(l), r) => Ok(Type::array(l.combine(op, r)?)),
            (l, Type::Array(r)) => Ok(Type::array(l.combine(op, r)?)),
            (Type::Integer { min, max }, r) => {
                if !r.is_numeric() {
                    return Err(DpError::TypeMismatch(format!("cannot combine Integer with {r:?}")));
                }
                let (rmin, rmax) = r.bounds()?;
                match op {
                    ArithOp::Add => Ok(Type::Integer {
                        min: (*min as f64 + rmin).floor() as i64,
                        max: (*max as f64 + rmax).ceil() as i64,
                    }),
                    ArithOp::Sub | ArithOp::Mul | ArithOp::TrueDiv | ArithOp::FloorDiv => {
                        Ok(Type::default_integer())
                    }
                }
            }
            (Type::Float { min, max }, r) => {
                if !r.is_numeric() {
                    return Err(DpError::TypeMismatch(format!("cannot combine Float with {r:?}")));
                }
                let (rmin, rmax) = r.bounds()?;
                match op {
                    ArithOp::Add => Ok(Type::Float { min: min + rmin, max: max + rmax }),
                    ArithOp::Sub => Ok(Type::Float { min: min - rmax, max: max - rmin }),
                    ArithOp::Mul | ArithOp::TrueDiv | ArithOp::FloorDiv => Ok(Type::default_float()),
                }
            }
            (left, right) => Err(DpError::TypeMismatch(format!(
                "cannot combine {left:?} with {right:?}"
            ))),
        }
    }

    /// Collapses a numeric scalar type into the type of its array's sum,
    /// with bounds reset to the type's default range.
    pub fn sum(&self) -> Result<Type> {
        match self {
            Type::Integer { .. } => Ok(Type::default_integer()),
            Type::Float { .. } => Ok(Type::default_float()),
            other => Err(DpError::TypeMismatch(format!("{other:?} has no sum"))),
        }
    }

    /// As `sum`, but widens the bounds by a known element count `n`
    /// (`[min*n, max*n]`), when the caller has one to hand.
    pub fn sum_with_len(&self, n: i64) -> Result<Type> {
        match self {
            Type::Integer { min, max } => Ok(Type::Integer { min: min * n, max: max * n }),
            Type::Float { min, max } => Ok(Type::Float { min: min * n as f64, max: max * n as f64 }),
            other => Err(DpError::TypeMismatch(format!("{other:?} has no sum"))),
        }
    }

    /// Adds calibrated noise to `value` (sensitivity `sensitivity`, budget
    /// `epsilon`) and clamps to this type's range, drawing from the
    /// process-wide thread-local sampler.
    pub fn dp(&self, value: f64, sensitivity: f64, epsilon: f64) -> Result<f64> {
        self.dp_with(value, sensitivity, epsilon, &mut ThreadRngSource::new())
    }

    /// As `dp`, but drawing noise from the supplied sampler — the
    /// injection point tests use for determinism.
    pub fn dp_with(
        &self,
        value: f64,
        sensitivity: f64,
        epsilon: f64,
        rng: &mut dyn RngSource,
    ) -> Result<f64> {
        match self {
            Type::Integer { min, max } => {
                debug!("releasing via symmetric geometric mechanism: epsilon={epsilon}, sensitivity={sensitivity}");
                let noised = value + geometric_noise(epsilon, true, rng) as f64 * sensitivity;
                Ok(noised.max(*min as f64).min(*max as f64))
            }
            Type::Float { min, max } => {
                debug!("releasing via Laplace mechanism: epsilon={epsilon}, sensitivity={sensitivity}");
                let noised = value + laplace_noise(epsilon, rng) * sensitivity;
                Ok(noised.max(*min).min(*max))
            }
            Type::Array(_) => Err(DpError::NotReleasable(
                "arrays cannot be released directly; aggregate (e.g. sum) first".into(),
            )),
            Type::Boolean => Err(DpError::NotReleasable(
                "boolean DP (randomized response) is not implemented".into(),
            )),
            Type::Categorical => Err(DpError::NotReleasable(
                "categorical types are not directly releasable".into(),
            )),
        }
    }
}

/// The true, unnoised value flowing through an expression tree.
///
/// Arrays are stored as `f64` regardless of whether the declaring column
/// was `Integer` or `Float` — the `Type` tree is what remembers which
/// mechanism and bounds apply; the value itself is just arithmetic.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(f64),
    Array(Vec<f64>),
    BoolArray(Vec<bool>),
}

impl Value {
    pub fn scalar(&self) -> Result<f64> {
        match self {
            Value::Scalar(v) => Ok(*v),
            other => Err(DpError::TypeMismatch(format!("{other:?} is not a scalar"))),
        }
    }

    pub fn array(&self) -> Result<&[f64]> {
        match self {
            Value::Array(v) => Ok(v),
            other => Err(DpError::TypeMismatch(format!("{other:?} is not a numeric array"))),
        }
    }

    pub fn bool_array(&self) -> Result<&[bool]> {
        match self {
            Value::BoolArray(v) => Ok(v),
            other => Err(DpError::TypeMismatch(format!("{other:?} is not a boolean array"))),
        }
    }

    pub fn len(&self) -> Result<usize> {
        match self {
            Value::Array(v) => Ok(v.len()),
            Value::BoolArray(v) => Ok(v.len()),
            other => Err(DpError::TypeMismatch(format!("{other:?} has no length"))),
        }
    }

    pub fn sum(&self) -> Result<f64> {
        Ok(self.array()?.iter().sum())
    }

    /// Combines two values elementwise under `op`, broadcasting a scalar
    /// across an array on either side.
    pub fn combine(&self, op: ArithOp, other: &Value) -> Result<Value> {
        let apply = |a: f64, b: f64| -> f64 {
            match op {
                ArithOp::Add => a + b,
                ArithOp::Sub => a - b,
                ArithOp::Mul => a * b,
                ArithOp::TrueDiv => a / b,
                ArithOp::FloorDiv => (a / b).floor(),
            }
        };
        match (self, other) {
            (Value::Scalar(a), Value::Scalar(b)) => Ok(Value::Scalar(apply(*a, *b))),
            (Value::Scalar(a), Value::Array(bs)) => {
                Ok(Value::Array(bs.iter().map(|b| apply(*a, *b)).collect()))
            }
            (Value::Array(as_), Value::Scalar(b)) => {
                Ok(Value::Array(as_.iter().map(|a| apply(*a, *b)).collect()))
            }
            (Value::Array(as_), Value::Array(bs)) => {
                if as_.len() != bs.len() {
                    return Err(DpError::TypeMismatch(format!(
                        "array length mismatch: {} vs {}",
                        as_.len(),
                        bs.len()
                    )));
                }
                Ok(Value::Array(as_.iter().zip(bs).map(|(a, b)| apply(*a, *b)).collect()))
            }
            (left, right) => Err(DpError::TypeMismatch(format!(
                "cannot combine values {left:?} and {right:?}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_add_bounds() {
        let a = Type::integer(0, 200);
        let b = Type::integer(0, 200);
        let sum = a.combine(ArithOp::Add, &b).unwrap();
        assert_eq!(sum, Type::integer(0, 400));
    }

    #[test]
    fn array_contagion() {
        let scalar = Type::integer(0, 5);
        let array = Type::array(Type::integer(0, 10));
        let result = scalar.combine(ArithOp::Add, &array).unwrap();
        assert_eq!(result, Type::array(Type::integer(0, 15)));
    }

    #[test]
    fn float_sub_is_precise() {
        let a = Type::float(0.0, 200.0);
        let b = Type::float(0.0, 200.0);
        let diff = a.combine(ArithOp::Sub, &b).unwrap();
        assert_eq!(diff, Type::float(-200.0, 200.0));
    }

    #[test]
    fn mul_resets_to_default_bounds() {
        let a = Type::float(0.0, 200.0);
        let b = Type::float(0.0, 200.0);
        let product = a.combine(ArithOp::Mul, &b).unwrap();
        assert_eq!(product, Type::default_float());
    }

    #[test]
    fn dp_clamps_to_range() {
        let t = Type::integer(0, 10);
        let mut rng = crate::rng::FixedRngSource::new(vec![0.999, 0.01]);
        // a huge sensitivity should still get clamped into range.
        let v = t.dp_with(5.0, 1_000_000.0, 0.5, &mut rng).unwrap();
        assert!((0.0..=10.0).contains(&v));
    }

    #[test]
    fn array_cannot_be_released() {
        let t = Type::array(Type::integer(0, 10));
        assert!(matches!(t.dp(1.0, 1.0, 0.5), Err(DpError::NotReleasable(_))));
    }
}
