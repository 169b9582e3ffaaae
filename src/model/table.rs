use serde::{Serialize, Serializer};

use crate::model::flags::QcFlag;
use crate::model::sample::Measurement;

pub const NA_TEXT: &str = "NA";

#[derive(Debug, Clone, PartialEq)]
pub enum TableValue {
    Empty,
    Number(f64),
    Text(String),
    Na,
}

impl From<Measurement> for TableValue {
    fn from(value: Measurement) -> Self {
        match value {
            Measurement::Value(v) => TableValue::Number(v),
            Measurement::Na => TableValue::Na,
        }
    }
}

impl Serialize for TableValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TableValue::Empty => serializer.serialize_none(),
            TableValue::Number(v) => serializer.serialize_f64(*v),
            TableValue::Text(s) => serializer.serialize_str(s),
            TableValue::Na => serializer.serialize_str(NA_TEXT),
        }
    }
}

/// A value plus the styling a renderer should apply to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedCell {
    pub value: TableValue,
    pub flag: QcFlag,
    pub bold: bool,
}

impl AnnotatedCell {
    pub fn plain(value: TableValue) -> Self {
        Self {
            value,
            flag: QcFlag::Ok,
            bold: false,
        }
    }

    pub fn label(text: impl Into<String>, bold: bool) -> Self {
        Self {
            value: TableValue::Text(text.into()),
            flag: QcFlag::Ok,
            bold,
        }
    }

    /// NA always renders as an error.
    pub fn measurement(value: Measurement) -> Self {
        let flag = if value.is_na() {
            QcFlag::Error
        } else {
            QcFlag::Ok
        };
        Self {
            value: value.into(),
            flag,
            bold: false,
        }
    }

    pub fn flagged(value: TableValue, flag: QcFlag, bold: bool) -> Self {
        Self { value, flag, bold }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub label: AnnotatedCell,
    pub cells: Vec<AnnotatedCell>,
}

/// Column headers are rendered bold; the label column has no header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<TableRow>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, label: AnnotatedCell, cells: Vec<AnnotatedCell>) {
        self.rows.push(TableRow { label, cells });
    }
}
