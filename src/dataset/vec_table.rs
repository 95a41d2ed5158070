//! `VecTable`: an in-memory reference `Table`, columns as parallel
//! `Vec<f64>`s keyed by name.
//!
//! Grounded on `original_source/dwork/dataset/pandas.py`'s `PandasDataset`
//! — same row/column/group-by surface, minus the pandas dependency this
//! engine has no reason to carry.

use std::collections::HashMap;
use std::rc::Rc;

use crate::error::{DpError, Result};

use super::Table;

/// A table backed by named, equal-length `f64` columns.
#[derive(Clone)]
pub struct VecTable {
    columns: HashMap<String, Vec<f64>>,
    len: usize,
}

impl VecTable {
    pub fn new(columns: HashMap<String, Vec<f64>>) -> Result<VecTable> {
        let len = columns.values().next().map(Vec::len).unwrap_or(0);
        if columns.values().any(|c| c.len() != len) {
            return Err(DpError::TypeMismatch("all columns must have the same length".into()));
        }
        Ok(VecTable { columns, len })
    }
}

impl Table for VecTable {
    fn len(&self) -> usize {
        self.len
    }

    fn column(&self, name: &str) -> Result<Vec<f64>> {
        self.columns
            .get(name)
            .cloned()
            .ok_or_else(|| DpError::SchemaMismatch(name.to_string()))
    }

    fn select(&self, mask: &[bool]) -> Result<Rc<dyn Table>> {
        if mask.len() != self.len {
            return Err(DpError::TypeMismatch(format!(
                "selection mask length {} does not match table length {}",
                mask.len(),
                self.len
            )));
        }
        let columns = self
            .columns
            .iter()
            .map(|(name, values)| {
                let filtered = values.iter().zip(mask).filter(|(_, keep)| **keep).map(|(v, _)| *v).collect();
                (name.clone(), filtered)
            })
            .collect();
        Ok(Rc::new(VecTable::new(columns)?))
    }

    fn group_by(&self, keys: &[&str]) -> Result<Vec<(Vec<f64>, Rc<dyn Table>)>> {
        let key_columns = keys
            .iter()
            .map(|k| self.columns.get(*k).ok_or_else(|| DpError::SchemaMismatch(k.to_string())))
            .collect::<Result<Vec<_>>>()?;

        let mut order: Vec<Vec<u64>> = Vec::new();
        let mut partitions: HashMap<Vec<u64>, (Vec<f64>, Vec<bool>)> = HashMap::new();
        for row in 0..self.len {
            let key: Vec<f64> = key_columns.iter().map(|col| col[row]).collect();
            let bucket: Vec<u64> = key.iter().map(|v| v.to_bits()).collect();
            let entry = partitions.entry(bucket.clone()).or_insert_with(|| {
                order.push(bucket.clone());
                (key, vec![false; self.len])
            });
            entry.1[row] = true;
        }

        order
            .into_iter()
            .map(|bucket| {
                let (key, mask) = partitions.remove(&bucket).expect("bucket was inserted above");
                Ok((key, self.select(&mask)?))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> VecTable {
        let mut columns = HashMap::new();
        columns.insert("Weight".to_string(), vec![60.0, 70.0, 80.0, 90.0]);
        columns.insert("Age".to_string(), vec![20.0, 40.0, 40.0, 50.0]);
        VecTable::new(columns).unwrap()
    }

    #[test]
    fn select_filters_rows() {
        let table = sample();
        let filtered = table.select(&[true, false, true, false]).unwrap();
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered.column("Weight").unwrap(), vec![60.0, 80.0]);
    }

    #[test]
    fn group_by_partitions_on_equal_keys() {
        let table = sample();
        let groups = table.group_by(&["Age"]).unwrap();
        assert_eq!(groups.len(), 3);
        let forty = groups.iter().find(|(k, _)| k == &vec![40.0]).unwrap();
        assert_eq!(forty.1.len(), 2);
    }

    #[test]
    fn mismatched_mask_length_errors() {
        let table = sample();
        assert!(table.select(&[true, false]).is_err());
    }
}
