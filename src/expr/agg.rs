//! `Length` and `Sum`: the two aggregations that turn a dataset or array
//! into a scalar releasable value.
//!
//! Grounded on `original_source/dwork/language/expression.py`'s `Length`
//! and `Sum` classes. Both pass the noised-already case through unchanged,
//! matching every other compound node.

use std::rc::Rc;

use log::debug;

use crate::dataset::Table;
use crate::error::{DpError, Result};
use crate::expr::Expr;
use crate::rng::RngSource;
use crate::types::{Type, Value, MAXINT};

/// The row count of a backing table.
#[derive(Clone)]
pub struct Length {
    table: Rc<dyn Table>,
}

impl Length {
    pub fn new(table: Rc<dyn Table>) -> Length {
        Length { table }
    }

    pub fn type_of(&self) -> Type {
        Type::integer(0, MAXINT)
    }

    pub fn true_value(&self) -> Result<Value> {
        Ok(Value::Scalar(self.table.len() as f64))
    }

    pub fn is_dp(&self) -> bool {
        false
    }

    /// Adding or removing one row changes the count by exactly one.
    pub fn sensitivity(&self) -> f64 {
        1.0
    }

    pub fn dp(&self, epsilon: f64) -> Result<f64> {
        self.dp_with(epsilon, &mut crate::rng::ThreadRngSource::new())
    }

    pub fn dp_with(&self, epsilon: f64, rng: &mut dyn RngSource) -> Result<f64> {
        let value = self.true_value()?.scalar()?;
        self.type_of().dp_with(value, self.sensitivity(), epsilon, rng)
    }
}

/// The sum of an array-typed expression, e.g. `ds["Weight"].sum()`.
#[derive(Clone)]
pub struct Sum {
    child: Box<Expr>,
}

impl Sum {
    pub fn new(child: Expr) -> Result<Sum> {
        let ty = child.type_of()?;
        if !ty.is_array() {
            return Err(DpError::TypeMismatch("Sum requires an array-typed expression".into()));
        }
        Ok(Sum { child: Box::new(child) })
    }

    pub fn type_of(&self) -> Result<Type> {
        self.child.type_of()?.elem()?.sum()
    }

    pub fn true_value(&self) -> Result<Value> {
        Ok(Value::Scalar(self.child.true_value()?.sum()?))
    }

    pub fn is_dp(&self) -> bool {
        self.child.is_dp()
    }

    pub fn sensitivity(&self) -> Result<f64> {
        self.child.sensitivity()
    }

    pub fn dp(&self, epsilon: f64) -> Result<f64> {
        self.dp_with(epsilon, &mut crate::rng::ThreadRngSource::new())
    }

    pub fn dp_with(&self, epsilon: f64, rng: &mut dyn RngSource) -> Result<f64> {
        let value = self.true_value()?.scalar()?;
        if self.child.is_dp() {
            debug!("releasing Sum of an already-dp child unnoised: epsilon={epsilon} (no further budget spent)");
            return Ok(value);
        }
        let ty = self.type_of()?;
        let sensitivity = self.sensitivity()?;
        ty.dp_with(value, sensitivity, epsilon, rng)
    }
}
