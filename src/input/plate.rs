use std::path::{Path, PathBuf};

use crate::config::PipelineConfig;
use crate::input::InputError;
use crate::input::grid::{Grid, load_grid};

pub const FI_SHEET: &str = "FI";
pub const BEAD_COUNT_SHEET: &str = "Bead Count";

/// One exported plate: the intensity and bead-count sheets for a
/// (plate number, plate type) pair.
#[derive(Debug, Clone)]
pub struct PlateWorkbook {
    pub plate: u32,
    pub plate_type: String,
    pub source: PathBuf,
    pub fi: Grid,
    pub bead_count: Grid,
}

impl PlateWorkbook {
    pub fn label(&self) -> String {
        format!("{}{}", self.plate, self.plate_type)
    }
}

pub fn workbook_dir(input_dir: &Path, protocol: &str, plate: u32, plate_type: &str) -> PathBuf {
    input_dir.join(format!("{protocol}_{plate}{plate_type}"))
}

/// `<sheet>.csv` wins over `<sheet>.csv.gz` when both exist.
pub fn find_sheet_path(workbook: &Path, sheet: &str) -> Result<PathBuf, InputError> {
    let candidates = [format!("{sheet}.csv"), format!("{sheet}.csv.gz")];
    for name in &candidates {
        let path = workbook.join(name);
        if path.is_file() {
            return Ok(path);
        }
    }
    Err(InputError::MissingInput(format!(
        "sheet '{}' not found in {} (expected {})",
        sheet,
        workbook.display(),
        candidates.join(" or ")
    )))
}

pub fn load_plate_workbook(
    input_dir: &Path,
    protocol: &str,
    plate: u32,
    plate_type: &str,
) -> Result<PlateWorkbook, InputError> {
    let dir = workbook_dir(input_dir, protocol, plate, plate_type);
    if !dir.is_dir() {
        return Err(InputError::MissingInput(format!(
            "plate workbook {} not found",
            dir.display()
        )));
    }
    let fi_path = find_sheet_path(&dir, FI_SHEET)?;
    let bead_path = find_sheet_path(&dir, BEAD_COUNT_SHEET)?;
    tracing::debug!(
        "plate {}{}: fi={}, bead_count={}",
        plate,
        plate_type,
        fi_path.display(),
        bead_path.display()
    );

    Ok(PlateWorkbook {
        plate,
        plate_type: plate_type.to_string(),
        fi: load_grid(&fi_path)?,
        bead_count: load_grid(&bead_path)?,
        source: dir,
    })
}

/// Plates in ingestion order: plate 1..=N, and the configured type order
/// within each plate.
pub fn load_plates(
    input_dir: &Path,
    config: &PipelineConfig,
) -> Result<Vec<PlateWorkbook>, InputError> {
    let mut plates = Vec::with_capacity(config.plate_count as usize * config.plate_types.len());
    for plate in 1..=config.plate_count {
        for plate_type in &config.plate_types {
            let workbook = load_plate_workbook(input_dir, &config.protocol, plate, plate_type)?;
            tracing::info!("adding {}", workbook.source.display());
            plates.push(workbook);
        }
    }
    Ok(plates)
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/plate.rs"]
mod tests;
