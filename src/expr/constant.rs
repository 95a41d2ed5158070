//! `Constant`: a literal lifted into the expression tree.
//!
//! Grounded on `original_source/dwork/language/expression.py`'s `Constant`
//! class — sensitivity zero, `true()` is the literal itself, and `dp()`
//! releases it unnoised since a literal written into a query carries no
//! privacy loss of its own.

use log::debug;

use crate::error::Result;
use crate::rng::RngSource;
use crate::types::{Type, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct Constant {
    value: f64,
    ty: Type,
}

impl Constant {
    /// Lifts an integer literal; its type is `Integer` with the default
    /// (unbounded) range, not narrowed to the literal's own value.
    pub fn integer(value: i64) -> Constant {
        Constant { value: value as f64, ty: Type::default_integer() }
    }

    /// Lifts a float literal, typed `Float` with the default range.
    pub fn float(value: f64) -> Constant {
        Constant { value, ty: Type::default_float() }
    }

    pub fn type_of(&self) -> Type {
        self.ty.clone()
    }

    pub fn true_value(&self) -> Value {
        Value::Scalar(self.value)
    }

    pub fn sensitivity(&self) -> f64 {
        0.0
    }

    pub fn is_dp(&self) -> bool {
        false
    }

    pub fn dp(&self, epsilon: f64) -> Result<f64> {
        self.dp_with(epsilon, &mut crate::rng::ThreadRngSource::new())
    }

    pub fn dp_with(&self, epsilon: f64, _rng: &mut dyn RngSource) -> Result<f64> {
        debug!("releasing Constant unnoised: epsilon={epsilon} (a literal spends no budget)");
        Ok(self.value)
    }
}
