//! A differential-privacy query engine: symbolic expressions over tabular
//! data, calibrated to the sensitivity of the query that produced them.
//!
//! An analyst builds a [`Dataset`](dataset::Dataset) over some backing
//! [`Table`](dataset::Table), derives an [`Expr`](expr::Expr) tree from its
//! columns (`Attribute`, `Length`, `Sum`, arithmetic, `Condition`-based
//! filtering), and calls [`Expr::dp`] to release a value with noise
//! calibrated to that expression's worst-case sensitivity and a chosen
//! privacy budget `epsilon`.
//!
//! The type algebra in [`types`] tracks declared value ranges and picks the
//! calibrated mechanism (Laplace for `Float`, symmetric geometric for
//! `Integer`); [`expr`] computes sensitivity bounds by walking the tree;
//! [`dataset`] adapts an abstract tabular store so the engine isn't tied to
//! one representation.
//!
//! This is a reproduction of a private differential-privacy query
//! language, built from scratch around Rust's closed sum types rather than
//! the open class hierarchy the original used — see the crate's design
//! notes for why a `dyn`-free `Expr` enum fits this problem better.

pub mod dataset;
pub mod error;
pub mod expr;
pub mod mechanisms;
pub mod rng;
pub mod schema;
pub mod types;

pub use dataset::{Dataset, GroupByOptions, GroupedDataset, Table};
pub use error::{DpError, Result};
pub use expr::{to_expression, Expr};
pub use schema::{Schema, SchemaBuilder};
pub use types::Type;
