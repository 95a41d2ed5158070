//! `Dataset`: a schema paired with a backing table, plus the row-level
//! operations (`column`, `filter`, `group_by`) that lift a table into the
//! expression tree.
//!
//! Grounded on `original_source/dwork/dataset/dataset.py` (`Dataset`,
//! `GroupedDataset`) and `original_source/dwork/dataset/pandas.py`
//! (`PandasDataset`, whose `__getitem__` dispatches on whether it was
//! handed a column name or a `Condition`). The backing store itself is
//! abstracted behind the `Table` trait so the engine isn't tied to one
//! tabular representation; `VecTable` is the in-memory reference impl.

use std::rc::Rc;

use log::debug;

use crate::error::{DpError, Result};
use crate::expr::{Attribute, Expr, Length};
use crate::rng::{RngSource, ThreadRngSource};
use crate::schema::Schema;
use crate::types::{Type, MAXINT};

pub mod vec_table;
pub use vec_table::VecTable;

/// The narrow capability surface a backing tabular store must expose.
///
/// Column access always returns owned `f64` data — the `Schema` is what
/// remembers whether a column is conceptually `Integer` or `Float`, and
/// `f64` represents every magnitude this engine's mechanisms care about.
pub trait Table {
    fn len(&self) -> usize;

    /// Reads `name` as a dense `f64` column.
    fn column(&self, name: &str) -> Result<Vec<f64>>;

    /// Returns a new table containing only the rows where `mask[i]` holds.
    fn select(&self, mask: &[bool]) -> Result<Rc<dyn Table>>;

    /// Partitions rows by the tuple of values found in `keys`, returning
    /// `(key_values, sub_table)` pairs in first-seen order.
    fn group_by(&self, keys: &[&str]) -> Result<Vec<(Vec<f64>, Rc<dyn Table>)>>;
}

/// A schema paired with a backing table — the entry point for building
/// expression trees over a table's columns.
#[derive(Clone)]
pub struct Dataset {
    schema: Rc<Schema>,
    table: Rc<dyn Table>,
}

impl Dataset {
    pub fn new(schema: Rc<Schema>, table: Rc<dyn Table>) -> Dataset {
        Dataset { schema, table }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// `len(ds)`: the row count, as a releasable expression.
    pub fn len(&self) -> Expr {
        Expr::Length(Length::new(self.table.clone()))
    }

    /// `ds[column]`: a single column, lifted to an `Attribute` leaf.
    pub fn column(&self, name: &str) -> Result<Expr> {
        Ok(Expr::Attribute(Attribute::new(self.table.clone(), self.schema.clone(), name)?))
    }

    /// `ds[condition]`: rows matching a boolean mask built from one of
    /// this dataset's own columns. Any other expression kind signals
    /// `UnsupportedIndex` — conditions are the only releasable row
    /// selector this engine supports.
    pub fn filter(&self, cond: &Expr) -> Result<Dataset> {
        let Expr::Condition(condition) = cond else {
            return Err(DpError::UnsupportedIndex(
                "a dataset can only be indexed by a column name or a Condition".into(),
            ));
        };
        let mask = condition.true_value()?;
        let table = self.table.select(mask.bool_array()?)?;
        Ok(Dataset { schema: self.schema.clone(), table })
    }

    /// Partitions the dataset by `keys`, suppressing any group whose
    /// noised row count falls below `options.threshold` — a safeguard the
    /// original left as a configuration knob (`GroupedPandasDataset`'s
    /// `treshold`/`epsilon` constructor arguments) rather than an
    /// unconditional release.
    pub fn group_by(&self, keys: &[&str], options: GroupByOptions) -> Result<GroupedDataset> {
        self.group_by_with(keys, options, &mut ThreadRngSource::new())
    }

    /// As `group_by`, but drawing the per-group suppression noise from the
    /// supplied sampler — the injection point tests use for determinism.
    pub fn group_by_with(
        &self,
        keys: &[&str],
        options: GroupByOptions,
        rng: &mut dyn RngSource,
    ) -> Result<GroupedDataset> {
        let count_type = Type::integer(0, MAXINT);
        let mut groups = Vec::new();
        for (key, sub_table) in self.table.group_by(keys)? {
            let count = sub_table.len() as f64;
            let noisy_count = count_type.dp_with(count, 1.0, options.epsilon, rng)?;
            if noisy_count < options.threshold as f64 {
                debug!("suppressing group {key:?}: noisy count {noisy_count} below threshold {}", options.threshold);
                continue;
            }
            groups.push((key, Dataset { schema: self.schema.clone(), table: sub_table }));
        }
        Ok(GroupedDataset { groups })
    }
}

/// Configuration for `Dataset::group_by`'s suppression check.
///
/// Grounded on `original_source/dwork/dataset/pandas.py`'s
/// `GroupedPandasDataset(dataset, treshold=10, epsilon=0.3, **kwargs)`.
#[derive(Debug, Clone, Copy)]
pub struct GroupByOptions {
    /// Groups whose differentially private row count falls below this are
    /// dropped rather than released.
    pub threshold: usize,
    /// Privacy budget spent computing each group's noised row count for
    /// the suppression check.
    pub epsilon: f64,
}

impl Default for GroupByOptions {
    fn default() -> Self {
        GroupByOptions { threshold: 10, epsilon: 0.3 }
    }
}

/// The surviving groups of a `Dataset::group_by` call.
pub struct GroupedDataset {
    groups: Vec<(Vec<f64>, Dataset)>,
}

impl GroupedDataset {
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Vec<f64>, &Dataset)> {
        self.groups.iter().map(|(key, ds)| (key, ds))
    }
}
