use std::collections::HashMap;

use thiserror::Error;

use crate::config::PipelineConfig;
use crate::input::grid::{Cell, Grid};
use crate::input::plate::{BEAD_COUNT_SHEET, FI_SHEET, PlateWorkbook};
use crate::model::controls::looks_like_control;
use crate::model::sample::{
    BeadCountRegistry, BeadNames, SampleId, SampleRegistry, normalize_sample_name,
};
use crate::pipeline::stage2_reliability::{BeadReading, Verdict, assess};

/// 1-based column holding the comma-separated replicate-well list.
pub const LOCATION_COL: usize = 2;
/// 1-based column holding the sample description and the header marker.
pub const DESCRIPTION_COL: usize = 3;
/// First bead column; beads run contiguously to the right.
pub const FIRST_VALUE_COL: usize = 4;
pub const DESCRIPTION_MARKER: &str = "Description";
/// The intensity sheet's data follows the first header block.
pub const FI_HEADER_OCCURRENCE: usize = 1;
/// The bead-count sheet carries two header blocks; data follows the second.
pub const BEAD_COUNT_HEADER_OCCURRENCE: usize = 2;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error(
        "plate {plate}: sheet '{sheet}' never reaches 'Description' header occurrence {occurrence}"
    )]
    MissingHeader {
        plate: String,
        sheet: &'static str,
        occurrence: usize,
    },
    #[error("plate {plate}: no bead names above the intensity header")]
    NoBeadNames { plate: String },
    #[error("plate {plate}: bead names {found:?} differ from first plate {expected:?}")]
    BeadNameMismatch {
        plate: String,
        expected: Vec<String>,
        found: Vec<String>,
    },
    #[error("plate {plate}, row {row}: replicate-well list is missing or malformed ('{cell}')")]
    MisalignedRow {
        plate: String,
        row: usize,
        cell: String,
    },
    #[error("plate {plate}: sample names '{first}' and '{second}' both normalize to '{id}'")]
    NameCollision {
        plate: String,
        id: String,
        first: String,
        second: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlateSummary {
    pub label: String,
    pub fi_data_row: usize,
    pub bead_count_data_row: usize,
    pub rows: usize,
    pub na_cells: usize,
    pub rescued_cells: usize,
}

#[derive(Debug)]
pub struct Stage1Output {
    pub bead_names: BeadNames,
    pub samples: SampleRegistry,
    pub bead_counts: BeadCountRegistry,
    pub plates: Vec<PlateSummary>,
}

/// Row index where data starts: the row after the `occurrence`-th marker in
/// the description column. The scan stops at the last stored row.
pub fn find_data_start(grid: &Grid, occurrence: usize) -> Option<usize> {
    let mut seen = 0usize;
    for row in 1..=grid.n_rows() {
        if grid.get(row, DESCRIPTION_COL).as_text() == Some(DESCRIPTION_MARKER) {
            seen += 1;
            if seen == occurrence {
                return Some(row + 1);
            }
        }
    }
    None
}

/// Names sit on the row directly above the intensity header row.
pub fn read_bead_names(fi: &Grid, fi_data_row: usize) -> Vec<String> {
    let Some(names_row) = fi_data_row.checked_sub(2) else {
        return Vec::new();
    };
    let mut names = Vec::new();
    let mut col = FIRST_VALUE_COL;
    loop {
        let cell = fi.get(names_row, col);
        if cell.is_empty() {
            break;
        }
        names.push(cell.to_string());
        col += 1;
    }
    names
}

/// Number of raw wells averaged into an intensity row. Bead-count sheets keep
/// one row per well, so this is how far the bead-count cursor moves.
pub fn replicate_well_count(cell: &Cell) -> Option<usize> {
    match cell {
        Cell::Number(_) => Some(1),
        Cell::Text(list) => {
            let n = list.split(',').filter(|w| !w.trim().is_empty()).count();
            (n > 0).then_some(n)
        }
        Cell::Empty => None,
    }
}

#[derive(Debug, Default)]
struct IngestState {
    bead_names: Option<BeadNames>,
    samples: SampleRegistry,
    bead_counts: BeadCountRegistry,
    original_names: HashMap<SampleId, String>,
}

pub fn run_stage1(
    plates: &[PlateWorkbook],
    config: &PipelineConfig,
) -> Result<Stage1Output, ParseError> {
    let mut state = IngestState::default();
    let mut summaries = Vec::with_capacity(plates.len());
    for plate in plates {
        summaries.push(parse_plate(&mut state, plate, config)?);
    }
    Ok(Stage1Output {
        bead_names: state.bead_names.unwrap_or_default(),
        samples: state.samples,
        bead_counts: state.bead_counts,
        plates: summaries,
    })
}

fn parse_plate(
    state: &mut IngestState,
    plate: &PlateWorkbook,
    config: &PipelineConfig,
) -> Result<PlateSummary, ParseError> {
    let label = plate.label();
    let fi_data_row =
        find_data_start(&plate.fi, FI_HEADER_OCCURRENCE).ok_or_else(|| ParseError::MissingHeader {
            plate: label.clone(),
            sheet: FI_SHEET,
            occurrence: FI_HEADER_OCCURRENCE,
        })?;
    let bead_count_data_row = find_data_start(&plate.bead_count, BEAD_COUNT_HEADER_OCCURRENCE)
        .ok_or_else(|| ParseError::MissingHeader {
            plate: label.clone(),
            sheet: BEAD_COUNT_SHEET,
            occurrence: BEAD_COUNT_HEADER_OCCURRENCE,
        })?;
    tracing::debug!(
        "plate {}: first data row {}, first bead count row {}",
        label,
        fi_data_row,
        bead_count_data_row
    );

    let found = read_bead_names(&plate.fi, fi_data_row);
    match &state.bead_names {
        None => {
            if found.is_empty() {
                return Err(ParseError::NoBeadNames { plate: label });
            }
            tracing::debug!("bead ID count is {}", found.len());
            state.bead_names = Some(BeadNames::new(found));
        }
        Some(expected) => {
            if found.as_slice() != expected.as_slice() {
                return Err(ParseError::BeadNameMismatch {
                    plate: label,
                    expected: expected.as_slice().to_vec(),
                    found,
                });
            }
        }
    }
    let n_beads = state.bead_names.as_ref().map_or(0, BeadNames::len);

    let thresholds = &config.thresholds;
    let mut summary = PlateSummary {
        label: label.clone(),
        fi_data_row,
        bead_count_data_row,
        rows: 0,
        na_cells: 0,
        rescued_cells: 0,
    };

    let mut row = fi_data_row;
    let mut bead_row = bead_count_data_row;
    loop {
        let description = plate.fi.get(row, DESCRIPTION_COL);
        if description.is_empty() {
            break;
        }
        let original = description.to_string();
        let id = SampleId::new(plate.plate, normalize_sample_name(&original));
        check_collision(state, &id, &original, &label)?;

        let location = plate.fi.get(row, LOCATION_COL);
        let wells = replicate_well_count(location).ok_or_else(|| ParseError::MisalignedRow {
            plate: label.clone(),
            row,
            cell: location.to_string(),
        })?;

        let is_control = looks_like_control(&id.name);
        let mut values = Vec::with_capacity(n_beads);
        let mut counts = Vec::with_capacity(n_beads);
        for bead in 0..n_beads {
            let col = FIRST_VALUE_COL + bead;
            let count = plate.bead_count.get(bead_row, col);
            let reading = BeadReading {
                intensity: plate.fi.get(row, col),
                count,
                secondary_count: plate.bead_count.get(bead_row + 1, col),
            };
            let assessment = assess(&reading, is_control, thresholds);
            match assessment.verdict {
                Verdict::BelowCutoff => {
                    summary.na_cells += 1;
                    tracing::debug!(
                        "{} column {} below bead threshold of {}",
                        id,
                        col,
                        thresholds.bead_cutoff
                    );
                }
                Verdict::NonNumeric => {
                    summary.na_cells += 1;
                    tracing::debug!("{} column {} is not numeric", id, col);
                }
                Verdict::Rescued => {
                    summary.rescued_cells += 1;
                    tracing::debug!(
                        "{} column {} kept: secondary bead count row passed",
                        id,
                        col
                    );
                }
                Verdict::Accepted => {}
            }
            values.push(assessment.measurement);
            counts.push(count.clone());
        }

        if !state.samples.append(id.clone(), values) {
            tracing::warn!("{} appears on more than one row; values appended", id);
        }
        state.bead_counts.append(id, counts);

        summary.rows += 1;
        row += 1;
        bead_row += wells;
    }

    Ok(summary)
}

fn check_collision(
    state: &mut IngestState,
    id: &SampleId,
    original: &str,
    label: &str,
) -> Result<(), ParseError> {
    match state.original_names.get(id) {
        Some(first) if first != original => Err(ParseError::NameCollision {
            plate: label.to_string(),
            id: id.to_string(),
            first: first.clone(),
            second: original.to_string(),
        }),
        Some(_) => Ok(()),
        None => {
            state.original_names.insert(id.clone(), original.to_string());
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage1_parse.rs"]
mod tests;
