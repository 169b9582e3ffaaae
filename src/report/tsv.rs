use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::model::table::Table;
use crate::report::{ReportError, render_value};

/// Label column first, headerless; rows may run past the header width.
pub fn write_table_tsv(table: &Table, path: &Path) -> Result<(), ReportError> {
    let file = File::create(path).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut w = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_writer(BufWriter::new(file));
    let csv_err = |source: csv::Error| ReportError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut header = Vec::with_capacity(table.columns.len() + 1);
    header.push(String::new());
    header.extend(table.columns.iter().cloned());
    w.write_record(&header).map_err(csv_err)?;

    for row in &table.rows {
        let mut record = Vec::with_capacity(row.cells.len() + 1);
        record.push(render_value(&row.label.value));
        record.extend(row.cells.iter().map(|c| render_value(&c.value)));
        w.write_record(&record).map_err(csv_err)?;
    }
    w.flush().map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}
