//! Binary arithmetic nodes: `Add`, `Sub`, `Mul`, `TrueDiv`, `FloorDiv`.
//!
//! Grounded on `original_source/dwork/language/expression.py`'s arithmetic
//! `Expression` subclasses and `original_source/dwork/language/types.py`'s
//! per-operator sensitivity formulas. Division additionally guards against
//! an unbounded divisor, where no finite sensitivity exists.

use log::debug;

use crate::error::{DpError, Result};
use crate::expr::Expr;
use crate::rng::RngSource;
use crate::types::{ArithOp, Type, Value};

#[derive(Clone)]
pub struct Binary {
    op: ArithOp,
    left: Box<Expr>,
    right: Box<Expr>,
}

impl Binary {
    pub fn new(op: ArithOp, left: Expr, right: Expr) -> Result<Binary> {
        let lt = left.type_of()?;
        let rt = right.type_of()?;
        if !lt.is_numeric() || !rt.is_numeric() {
            return Err(DpError::TypeMismatch(format!(
                "{op:?} requires numeric operands, got {lt:?} and {rt:?}"
            )));
        }
        Ok(Binary { op, left: Box::new(left), right: Box::new(right) })
    }

    pub fn type_of(&self) -> Result<Type> {
        self.left.type_of()?.combine(self.op, &self.right.type_of()?)
    }

    pub fn true_value(&self) -> Result<Value> {
        self.left.true_value()?.combine(self.op, &self.right.true_value()?)
    }

    pub fn is_dp(&self) -> bool {
        self.left.is_dp() && self.right.is_dp()
    }

    pub fn sensitivity(&self) -> Result<f64> {
        match self.op {
            ArithOp::Add | ArithOp::Sub => {
                Ok(self.left.sensitivity()?.max(self.right.sensitivity()?))
            }
            ArithOp::Mul => self.mul_sensitivity(),
            ArithOp::TrueDiv | ArithOp::FloorDiv => self.div_sensitivity(),
        }
    }

    pub fn dp(&self, epsilon: f64) -> Result<f64> {
        self.dp_with(epsilon, &mut crate::rng::ThreadRngSource::new())
    }

    pub fn dp_with(&self, epsilon: f64, rng: &mut dyn RngSource) -> Result<f64> {
        let value = self.true_value()?.scalar()?;
        if self.is_dp() {
            // Both operands already carry noise; releasing their exact
            // combination spends no further budget.
            debug!("releasing {:?} of two dp operands unnoised: epsilon={epsilon} (no further budget spent)", self.op);
            return Ok(value);
        }
        let ty = self.type_of()?;
        let sensitivity = self.sensitivity()?;
        ty.dp_with(value, sensitivity, epsilon, rng)
    }

    /// `(value - sensitivity, value + sensitivity)`, clamped to the
    /// expression's declared bounds — the interval the true value could
    /// have occupied on a neighbouring dataset.
    fn reachable(expr: &Expr) -> Result<(f64, f64)> {
        let value = expr.true_value()?.scalar()?;
        let sensitivity = expr.sensitivity()?;
        let (min, max) = expr.type_of()?.bounds()?;
        Ok(((value - sensitivity).max(min), (value + sensitivity).min(max)))
    }

    fn mul_sensitivity(&self) -> Result<f64> {
        let ls = self.left.sensitivity()?;
        let rs = self.right.sensitivity()?;
        let l_array = self.left.type_of()?.is_array();
        let r_array = self.right.type_of()?.is_array();
        match (l_array, r_array) {
            (true, true) => Ok(ls * rs),
            (true, false) => {
                let (rmin, rmax) = Binary::reachable(&self.right)?;
                Ok(ls * rmin.abs().max(rmax.abs()))
            }
            (false, true) => {
                let (lmin, lmax) = Binary::reachable(&self.left)?;
                Ok(rs * lmin.abs().max(lmax.abs()))
            }
            (false, false) => {
                let lv = self.left.true_value()?.scalar()?;
                let rv = self.right.true_value()?.scalar()?;
                let (lmin, lmax) = Binary::reachable(&self.left)?;
                let (rmin, rmax) = Binary::reachable(&self.right)?;
                let base = lv * rv;
                let corners = [lmin * rmin, lmin * rmax, lmax * rmin, lmax * rmax];
                Ok(corners.iter().map(|c| (c - base).abs()).fold(0.0_f64, f64::max))
            }
        }
    }

    /// A divisor is only safe when both its declared type and its
    /// reachable value range stay strictly on one side of zero.
    fn check_divisor_range(&self) -> Result<()> {
        let rt = self.right.type_of()?;
        let (rmin, rmax) = rt.bounds()?;
        if rmin < 0.0 && rmax > 0.0 {
            return Err(DpError::InfiniteSensitivity(
                "divisor's declared type straddles zero".into(),
            ));
        }
        if !rt.is_array() {
            let (vmin, vmax) = Binary::reachable(&self.right)?;
            if vmin < 0.0 && vmax > 0.0 {
                return Err(DpError::InfiniteSensitivity(
                    "divisor's reachable range straddles zero".into(),
                ));
            }
        }
        Ok(())
    }

    fn div_sensitivity(&self) -> Result<f64> {
        self.check_divisor_range()?;
        let lt = self.left.type_of()?;
        let rt = self.right.type_of()?;
        let l_array = lt.is_array();
        let r_array = rt.is_array();
        match (l_array, r_array) {
            (true, true) => Ok(lt.absmax()? / rt.absmin()?),
            (true, false) => {
                let (rmin, rmax) = Binary::reachable(&self.right)?;
                Ok(lt.absmax()? / rmin.abs().min(rmax.abs()))
            }
            (false, true) => {
                let (lmin, lmax) = Binary::reachable(&self.left)?;
                Ok(lmin.abs().max(lmax.abs()) / rt.absmin()?)
            }
            (false, false) => {
                let lv = self.left.true_value()?.scalar()?;
                let rv = self.right.true_value()?.scalar()?;
                let (lmin, lmax) = Binary::reachable(&self.left)?;
                let (rmin, rmax) = Binary::reachable(&self.right)?;
                let base = lv / rv;
                let corners = [lmin / rmin, lmin / rmax, lmax / rmin, lmax / rmax];
                Ok(corners.iter().map(|c| (c - base).abs()).fold(0.0_f64, f64::max))
            }
        }
    }
}
