//! The expression tree: a closed set of node kinds, each exposing the same
//! four queries (`type_of`, `true_value`, `sensitivity`, `is_dp`) plus the
//! `dp` release.
//!
//! The original (`original_source/dwork/language/expression.py`) models
//! this as a class hierarchy rooted at `Expression`, with each operator
//! and leaf as a subclass. Rust has no open class hierarchy to mirror, and
//! a trait-object tree would hide the finite set of node kinds behind
//! `dyn` dispatch for no benefit — the set of operators this engine
//! supports is fixed, so a closed `Expr` enum says so directly and lets
//! every query be an exhaustive match instead of a virtual call.

use std::rc::Rc;

use crate::error::Result;
use crate::rng::{RngSource, ThreadRngSource};
use crate::schema::Schema;
use crate::types::{ArithOp, Type, Value};

pub mod agg;
pub mod attribute;
pub mod binary;
pub mod constant;

pub use agg::{Length, Sum};
pub use attribute::{Attribute, CmpOp, Condition};
pub use binary::Binary;
pub use constant::Constant;

use crate::dataset::Table;

/// A node in a query's expression tree.
#[derive(Clone)]
pub enum Expr {
    Constant(Constant),
    Attribute(Attribute),
    Condition(Condition),
    Length(Length),
    Sum(Box<Sum>),
    Binary(Box<Binary>),
}

impl Expr {
    pub fn type_of(&self) -> Result<Type> {
        match self {
            Expr::Constant(c) => Ok(c.type_of()),
            Expr::Attribute(a) => a.type_of(),
            Expr::Condition(c) => Ok(c.type_of()),
            Expr::Length(l) => Ok(l.type_of()),
            Expr::Sum(s) => s.type_of(),
            Expr::Binary(b) => b.type_of(),
        }
    }

    pub fn true_value(&self) -> Result<Value> {
        match self {
            Expr::Constant(c) => Ok(c.true_value()),
            Expr::Attribute(a) => a.true_value(),
            Expr::Condition(c) => c.true_value(),
            Expr::Length(l) => l.true_value(),
            Expr::Sum(s) => s.true_value(),
            Expr::Binary(b) => b.true_value(),
        }
    }

    /// True only when every operand feeding this node is itself already a
    /// DP release. None of this engine's leaves are ever marked so —
    /// matching the original, where no `Expression` subclass overrides the
    /// base `is_dp() -> False` — but compound nodes still honour the rule
    /// so a future releasing leaf composes correctly without touching
    /// this code.
    pub fn is_dp(&self) -> bool {
        match self {
            Expr::Constant(c) => c.is_dp(),
            Expr::Attribute(a) => a.is_dp(),
            Expr::Condition(c) => c.is_dp(),
            Expr::Length(l) => l.is_dp(),
            Expr::Sum(s) => s.is_dp(),
            Expr::Binary(b) => b.is_dp(),
        }
    }

    pub fn sensitivity(&self) -> Result<f64> {
        match self {
            Expr::Constant(c) => Ok(c.sensitivity()),
            Expr::Attribute(a) => a.sensitivity(),
            Expr::Condition(c) => c.sensitivity(),
            Expr::Length(l) => Ok(l.sensitivity()),
            Expr::Sum(s) => s.sensitivity(),
            Expr::Binary(b) => b.sensitivity(),
        }
    }

    /// Releases this node under budget `epsilon`, drawing noise from the
    /// process-wide thread-local sampler.
    pub fn dp(&self, epsilon: f64) -> Result<f64> {
        self.dp_with(epsilon, &mut ThreadRngSource::new())
    }

    /// As `dp`, but drawing from the supplied sampler.
    pub fn dp_with(&self, epsilon: f64, rng: &mut dyn RngSource) -> Result<f64> {
        match self {
            Expr::Constant(c) => c.dp_with(epsilon, rng),
            Expr::Attribute(a) => a.dp_with(epsilon, rng),
            Expr::Condition(c) => c.dp_with(epsilon, rng),
            Expr::Length(l) => l.dp_with(epsilon, rng),
            Expr::Sum(s) => s.dp_with(epsilon, rng),
            Expr::Binary(b) => b.dp_with(epsilon, rng),
        }
    }

    pub fn sum(self) -> Result<Expr> {
        Ok(Expr::Sum(Box::new(Sum::new(self)?)))
    }

    pub fn add(self, other: impl IntoExpr) -> Result<Expr> {
        binary_op(ArithOp::Add, self, other.into_expr())
    }

    pub fn sub(self, other: impl IntoExpr) -> Result<Expr> {
        binary_op(ArithOp::Sub, self, other.into_expr())
    }

    pub fn mul(self, other: impl IntoExpr) -> Result<Expr> {
        binary_op(ArithOp::Mul, self, other.into_expr())
    }

    pub fn true_div(self, other: impl IntoExpr) -> Result<Expr> {
        binary_op(ArithOp::TrueDiv, self, other.into_expr())
    }

    pub fn floor_div(self, other: impl IntoExpr) -> Result<Expr> {
        binary_op(ArithOp::FloorDiv, self, other.into_expr())
    }
}

impl From<Condition> for Expr {
    fn from(c: Condition) -> Expr {
        Expr::Condition(c)
    }
}

fn binary_op(op: ArithOp, left: Expr, right: Expr) -> Result<Expr> {
    Ok(Expr::Binary(Box::new(Binary::new(op, left, right)?)))
}

/// Lifts a bare numeric literal into an `Expr::Constant`; arithmetic
/// methods on `Expr` accept `impl IntoExpr` so a literal can sit on either
/// side without the caller calling `to_expression` explicitly.
pub trait IntoExpr {
    fn into_expr(self) -> Expr;
}

impl IntoExpr for Expr {
    fn into_expr(self) -> Expr {
        self
    }
}

impl IntoExpr for i64 {
    fn into_expr(self) -> Expr {
        Expr::Constant(Constant::integer(self))
    }
}

impl IntoExpr for f64 {
    fn into_expr(self) -> Expr {
        Expr::Constant(Constant::float(self))
    }
}

/// `to_expression(value)`: the analyst-facing entry point for lifting a
/// literal into the tree.
pub fn to_expression(value: impl IntoExpr) -> Expr {
    value.into_expr()
}

/// Builds an `Attribute` leaf directly, for callers that already hold a
/// table and schema (`Dataset::column` is the usual entry point).
pub fn attribute(table: Rc<dyn Table>, schema: Rc<Schema>, column: impl Into<String>) -> Result<Expr> {
    Ok(Expr::Attribute(Attribute::new(table, schema, column)?))
}
