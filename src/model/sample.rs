use std::collections::HashMap;
use std::fmt;

use crate::input::grid::Cell;

/// A parsed intensity value, or the NA sentinel for values excluded from
/// statistics. NA is never a numeric zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Measurement {
    Value(f64),
    Na,
}

impl Measurement {
    pub fn value(self) -> Option<f64> {
        match self {
            Measurement::Value(v) => Some(v),
            Measurement::Na => None,
        }
    }

    pub fn is_na(self) -> bool {
        matches!(self, Measurement::Na)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SampleId {
    pub plate: u32,
    pub name: String,
}

impl SampleId {
    pub fn new(plate: u32, name: impl Into<String>) -> Self {
        Self {
            plate,
            name: name.into(),
        }
    }
}

impl fmt::Display for SampleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.plate, self.name)
    }
}

/// Underscores become hyphens so that the plate prefix separator stays
/// unambiguous and name variants can be pooled on the first hyphen.
pub fn normalize_sample_name(raw: &str) -> String {
    raw.trim().replace('_', "-")
}

/// Analyte names in column order, captured once from the first plate.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BeadNames {
    names: Vec<String>,
}

impl BeadNames {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn get(&self, idx: usize) -> Option<&str> {
        self.names.get(idx).map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.names
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Record<T> {
    pub id: SampleId,
    pub values: Vec<T>,
}

impl<T> Record<T> {
    /// One slice per stored row. Repeated rows for an ID append a full
    /// `width`-long segment each.
    pub fn replicates(&self, width: usize) -> std::slice::Chunks<'_, T> {
        self.values.chunks(width.max(1))
    }
}

pub type SampleRecord = Record<Measurement>;

/// Insertion-ordered store keyed by sample ID. The first write fixes the
/// display position; later writes for the same ID append to its values.
#[derive(Debug, Clone)]
pub struct Registry<T> {
    records: Vec<Record<T>>,
    index: HashMap<SampleId, usize>,
}

pub type SampleRegistry = Registry<Measurement>;
pub type BeadCountRegistry = Registry<Cell>;

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T> Registry<T> {
    /// Returns true when the ID was seen for the first time.
    pub fn append(&mut self, id: SampleId, values: Vec<T>) -> bool {
        if let Some(&idx) = self.index.get(&id) {
            self.records[idx].values.extend(values);
            return false;
        }
        self.index.insert(id.clone(), self.records.len());
        self.records.push(Record { id, values });
        true
    }

    pub fn records(&self) -> &[Record<T>] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/sample.rs"]
mod tests;
