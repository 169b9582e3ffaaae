use crate::model::flags::QcFlag;
use crate::model::qc::{GroupQc, PlateDetail};
use crate::model::sample::{BeadCountRegistry, BeadNames, Measurement, SampleRegistry};
use crate::model::table::{AnnotatedCell, Table, TableValue};
use crate::model::thresholds::Thresholds;
use crate::pipeline::stage2_reliability::count_is_reliable;

pub const COMBINED_SHEET: &str = "Combined";
pub const BEAD_COUNTS_SHEET: &str = "BeadCounts";
pub const CVS_SHEET: &str = "CVs";
pub const MASTER_SHEET: &str = "Master";
pub const ERRORS_COLUMN: &str = "Errors";
pub const ERRORS_WARNINGS_COLUMN: &str = "Errors+Warnings";

#[derive(Debug, Clone, Copy)]
pub struct Stage5Inputs<'a> {
    pub bead_names: &'a BeadNames,
    pub samples: &'a SampleRegistry,
    pub bead_counts: &'a BeadCountRegistry,
    pub qc: &'a [GroupQc],
    pub ordinary: &'a [usize],
    pub thresholds: &'a Thresholds,
    pub include_perplate: bool,
    pub include_bead_counts: bool,
}

#[derive(Debug, Clone)]
pub struct Stage5Output {
    pub combined: Table,
    pub bead_counts: Option<Table>,
    pub cvs: Table,
    pub master: Table,
}

impl Stage5Output {
    /// Sheets in workbook order.
    pub fn sheets(&self) -> Vec<&Table> {
        let mut out = vec![&self.combined];
        if let Some(t) = &self.bead_counts {
            out.push(t);
        }
        out.push(&self.cvs);
        out.push(&self.master);
        out
    }
}

pub fn run_stage5(inputs: &Stage5Inputs<'_>) -> Stage5Output {
    Stage5Output {
        combined: build_combined(inputs.bead_names, inputs.samples),
        bead_counts: inputs
            .include_bead_counts
            .then(|| build_bead_counts(inputs.bead_names, inputs.bead_counts, inputs.thresholds)),
        cvs: build_cvs(inputs.bead_names, inputs.qc, inputs.include_perplate),
        master: build_master(inputs.bead_names, inputs.samples, inputs.ordinary),
    }
}

/// One row per record in discovery order; repeated rows for an ID extend the
/// row past the bead columns.
pub fn build_combined(bead_names: &BeadNames, samples: &SampleRegistry) -> Table {
    let mut table = Table::new(COMBINED_SHEET, bead_names.as_slice().to_vec());
    for record in samples.records() {
        let cells = record
            .values
            .iter()
            .map(|&m| AnnotatedCell::measurement(m))
            .collect();
        table.push_row(AnnotatedCell::label(record.id.to_string(), false), cells);
    }
    table
}

pub fn build_bead_counts(
    bead_names: &BeadNames,
    bead_counts: &BeadCountRegistry,
    thresholds: &Thresholds,
) -> Table {
    let mut table = Table::new(BEAD_COUNTS_SHEET, bead_names.as_slice().to_vec());
    for record in bead_counts.records() {
        let cells = record
            .values
            .iter()
            .map(|count| {
                let value = match count.as_number() {
                    Some(v) => TableValue::Number(v),
                    None if count.is_empty() => TableValue::Empty,
                    None => TableValue::Text(count.to_string()),
                };
                let flag = if count_is_reliable(count, thresholds) {
                    QcFlag::Ok
                } else {
                    QcFlag::Error
                };
                AnnotatedCell::flagged(value, flag, false)
            })
            .collect();
        table.push_row(AnnotatedCell::label(record.id.to_string(), false), cells);
    }
    table
}

/// Per group: optional per-plate detail rows, then the bold CV summary row.
pub fn build_cvs(bead_names: &BeadNames, qc: &[GroupQc], include_perplate: bool) -> Table {
    let mut columns = bead_names.as_slice().to_vec();
    if include_perplate {
        columns.push(ERRORS_COLUMN.to_string());
        columns.push(ERRORS_WARNINGS_COLUMN.to_string());
    }
    let mut table = Table::new(CVS_SHEET, columns);

    for group in qc {
        if include_perplate {
            for detail in &group.plates {
                let (label, cells) = detail_row(detail);
                table.push_row(label, cells);
            }
        }
        let cells = group
            .cvs
            .iter()
            .map(|c| {
                let value = c.cv.map_or(TableValue::Na, TableValue::Number);
                AnnotatedCell::flagged(value, c.flag, true)
            })
            .collect();
        table.push_row(AnnotatedCell::label(group.group_id.clone(), true), cells);
    }
    table
}

fn detail_row(detail: &PlateDetail) -> (AnnotatedCell, Vec<AnnotatedCell>) {
    let mut cells: Vec<AnnotatedCell> = detail
        .cells
        .iter()
        .map(|c| {
            let value = match c.value {
                Some(m) => TableValue::from(m),
                None => TableValue::Empty,
            };
            AnnotatedCell::flagged(value, c.flag, false)
        })
        .collect();
    cells.push(AnnotatedCell::flagged(
        TableValue::Number(detail.errors as f64),
        QcFlag::Ok,
        true,
    ));
    cells.push(AnnotatedCell::plain(TableValue::Number(
        detail.errors_and_warnings as f64,
    )));
    (
        AnnotatedCell::label(detail.label.clone(), false),
        cells,
    )
}

/// Bead rows by sample columns: column labels are sample names without the
/// plate prefix, row labels are bead names. A sample stored from several rows
/// gets one column per row.
pub fn build_master(bead_names: &BeadNames, samples: &SampleRegistry, ordinary: &[usize]) -> Table {
    let n_beads = bead_names.len();
    let records = samples.records();
    let sample_columns: Vec<(&str, &[Measurement])> = ordinary
        .iter()
        .flat_map(|&idx| {
            let record = &records[idx];
            record
                .replicates(n_beads)
                .map(move |row| (record.id.name.as_str(), row))
        })
        .collect();

    let columns = sample_columns
        .iter()
        .map(|(name, _)| name.to_string())
        .collect();
    let mut table = Table::new(MASTER_SHEET, columns);
    for (bead, name) in bead_names.as_slice().iter().enumerate() {
        let cells = sample_columns
            .iter()
            .map(|(_, row)| {
                let m = row.get(bead).copied().unwrap_or(Measurement::Na);
                AnnotatedCell::measurement(m)
            })
            .collect();
        table.push_row(AnnotatedCell::label(name.clone(), true), cells);
    }
    table
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage5_tables.rs"]
mod tests;
