//! `Attribute` and `Condition`: the two leaves that read from a backing
//! table — a raw column, and a boolean mask built by comparing one against
//! a literal.
//!
//! Grounded on `original_source/dwork/language/expression.py`'s
//! `Attribute` and `Condition` classes. Neither is directly releasable:
//! an `Attribute` is an array (`dp()` must aggregate first), and a
//! `Condition`'s boolean array only ever feeds `Dataset::filter`.

use std::rc::Rc;

use crate::dataset::Table;
use crate::error::{DpError, Result};
use crate::rng::RngSource;
use crate::schema::Schema;
use crate::types::{Type, Value};

/// A single column read off the backing table.
#[derive(Clone)]
pub struct Attribute {
    table: Rc<dyn Table>,
    schema: Rc<Schema>,
    column: String,
}

impl Attribute {
    pub fn new(table: Rc<dyn Table>, schema: Rc<Schema>, column: impl Into<String>) -> Result<Attribute> {
        let column = column.into();
        schema.get(&column)?;
        Ok(Attribute { table, schema, column })
    }

    pub fn name(&self) -> &str {
        &self.column
    }

    pub fn type_of(&self) -> Result<Type> {
        Ok(Type::array(self.schema.get(&self.column)?.clone()))
    }

    pub fn true_value(&self) -> Result<Value> {
        Ok(Value::Array(self.table.column(&self.column)?))
    }

    pub fn is_dp(&self) -> bool {
        false
    }

    /// The neighbour-swap bound: one row changing this column can move it
    /// by at most its declared range.
    pub fn sensitivity(&self) -> Result<f64> {
        self.schema.get(&self.column)?.range()
    }

    pub fn dp(&self, epsilon: f64) -> Result<f64> {
        self.dp_with(epsilon, &mut crate::rng::ThreadRngSource::new())
    }

    pub fn dp_with(&self, _epsilon: f64, _rng: &mut dyn RngSource) -> Result<f64> {
        Err(DpError::NotReleasable(format!(
            "attribute {:?} is an array; aggregate (e.g. sum) before releasing",
            self.column
        )))
    }

    pub fn gt(&self, operand: f64) -> Condition {
        Condition::new(self.clone(), CmpOp::Gt, operand)
    }
    pub fn lt(&self, operand: f64) -> Condition {
        Condition::new(self.clone(), CmpOp::Lt, operand)
    }
    pub fn ge(&self, operand: f64) -> Condition {
        Condition::new(self.clone(), CmpOp::Ge, operand)
    }
    pub fn le(&self, operand: f64) -> Condition {
        Condition::new(self.clone(), CmpOp::Le, operand)
    }
    pub fn eq(&self, operand: f64) -> Condition {
        Condition::new(self.clone(), CmpOp::Eq, operand)
    }
    pub fn ne(&self, operand: f64) -> Condition {
        Condition::new(self.clone(), CmpOp::Ne, operand)
    }
}

/// The comparison operators `Condition` supports against a literal operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Gt,
    Lt,
    Ge,
    Le,
    Eq,
    Ne,
}

/// A boolean mask produced by comparing an `Attribute` against a literal.
///
/// Not releasable on its own — it exists to drive `Dataset::filter`.
#[derive(Clone)]
pub struct Condition {
    attribute: Attribute,
    op: CmpOp,
    operand: f64,
}

impl Condition {
    pub fn new(attribute: Attribute, op: CmpOp, operand: f64) -> Condition {
        Condition { attribute, op, operand }
    }

    pub fn type_of(&self) -> Type {
        Type::array(Type::Boolean)
    }

    pub fn true_value(&self) -> Result<Value> {
        let column = self.attribute.true_value()?;
        let column = column.array()?;
        let operand = self.operand;
        let mask = column
            .iter()
            .map(|v| match self.op {
                CmpOp::Gt => *v > operand,
                CmpOp::Lt => *v < operand,
                CmpOp::Ge => *v >= operand,
                CmpOp::Le => *v <= operand,
                CmpOp::Eq => *v == operand,
                CmpOp::Ne => *v != operand,
            })
            .collect();
        Ok(Value::BoolArray(mask))
    }

    pub fn is_dp(&self) -> bool {
        false
    }

    pub fn sensitivity(&self) -> Result<f64> {
        Err(DpError::TypeMismatch("a boolean Condition has no numeric sensitivity".into()))
    }

    pub fn dp(&self, epsilon: f64) -> Result<f64> {
        self.dp_with(epsilon, &mut crate::rng::ThreadRngSource::new())
    }

    pub fn dp_with(&self, _epsilon: f64, _rng: &mut dyn RngSource) -> Result<f64> {
        Err(DpError::NotReleasable(
            "a Condition is a boolean mask, not a releasable value; it feeds Dataset::filter".into(),
        ))
    }
}
