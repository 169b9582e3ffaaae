use thiserror::Error;

use crate::model::controls::{ControlGroup, GroupLayout};
use crate::model::flags::QcFlag;
use crate::model::qc::{CvCell, GroupQc, PlateDetail, PooledStats, ZCell};
use crate::model::sample::{BeadNames, Measurement, SampleRecord, SampleRegistry};
use crate::model::thresholds::Thresholds;

#[derive(Debug, Error, PartialEq)]
pub enum QcError {
    #[error("control group '{group}', bead '{bead}': pooled mean is zero, CV is undefined")]
    ZeroMean { group: String, bead: String },
}

#[derive(Debug, Clone, Copy)]
pub struct Stage4Inputs<'a> {
    pub samples: &'a SampleRegistry,
    pub bead_names: &'a BeadNames,
    pub groups: &'a [ControlGroup],
    pub thresholds: &'a Thresholds,
    pub include_perplate: bool,
}

/// Mean and population standard deviation; `None` for an empty set.
pub fn pooled_stats(values: &[f64]) -> Option<PooledStats> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    Some(PooledStats {
        mean,
        stdev: var.sqrt(),
    })
}

/// CV in percent. `None` signals a zero mean.
pub fn coefficient_of_variation(stats: &PooledStats) -> Option<f64> {
    if stats.mean == 0.0 {
        return None;
    }
    Some(stats.stdev / stats.mean * 100.0)
}

/// With zero spread every pooled value equals the mean, so the distance is 0.
pub fn zscore(value: f64, stats: &PooledStats) -> f64 {
    if stats.stdev == 0.0 {
        return 0.0;
    }
    (value - stats.mean).abs() / stats.stdev
}

pub fn run_stage4(inputs: &Stage4Inputs<'_>) -> Result<Vec<GroupQc>, QcError> {
    inputs.groups.iter().map(|g| evaluate_group(inputs, g)).collect()
}

fn evaluate_group(inputs: &Stage4Inputs<'_>, group: &ControlGroup) -> Result<GroupQc, QcError> {
    let n_beads = inputs.bead_names.len();
    let records: &[SampleRecord] = inputs.samples.records();
    let members = group.members();

    let mut stats = Vec::with_capacity(n_beads);
    let mut cvs = Vec::with_capacity(n_beads);
    for bead in 0..n_beads {
        let pooled: Vec<f64> = members
            .iter()
            .flat_map(|&idx| records[idx].replicates(n_beads))
            .filter_map(|row| row.get(bead).and_then(|m| m.value()))
            .collect();
        let bead_stats = pooled_stats(&pooled);
        let cell = match &bead_stats {
            Some(s) => {
                let cv = coefficient_of_variation(s).ok_or_else(|| QcError::ZeroMean {
                    group: group.id.clone(),
                    bead: inputs.bead_names.get(bead).unwrap_or_default().to_string(),
                })?;
                CvCell {
                    cv: Some(cv),
                    flag: inputs.thresholds.classify_cv(cv),
                }
            }
            None => {
                tracing::warn!(
                    "control {} has no reliable values for bead {}; CV undefined",
                    group.id,
                    inputs.bead_names.get(bead).unwrap_or_default()
                );
                CvCell {
                    cv: None,
                    flag: QcFlag::Error,
                }
            }
        };
        stats.push(bead_stats);
        cvs.push(cell);
    }

    let plates = if inputs.include_perplate {
        let mut plates = Vec::new();
        for (base, slot) in plate_slots(group, records) {
            let Some(idx) = slot else {
                plates.push(plate_detail(base, None, &stats, inputs.thresholds));
                continue;
            };
            let rows: Vec<&[Measurement]> = records[idx].replicates(n_beads).collect();
            let multi = rows.len() > 1;
            for (k, row) in rows.into_iter().enumerate() {
                let label = if multi {
                    format!("{} #{}", base, k + 1)
                } else {
                    base.clone()
                };
                plates.push(plate_detail(label, Some(row), &stats, inputs.thresholds));
            }
        }
        plates
    } else {
        Vec::new()
    };

    Ok(GroupQc {
        group_id: group.id.clone(),
        cvs,
        plates,
    })
}

/// (row label, registry index) per group member or plate slot.
fn plate_slots(group: &ControlGroup, records: &[SampleRecord]) -> Vec<(String, Option<usize>)> {
    match &group.layout {
        GroupLayout::PerPlate(slots) => slots
            .iter()
            .enumerate()
            .map(|(i, slot)| (format!("Plate {}", i + 1), *slot))
            .collect(),
        GroupLayout::Pooled(members) => members
            .iter()
            .map(|&idx| (records[idx].id.to_string(), Some(idx)))
            .collect(),
    }
}

fn plate_detail(
    label: String,
    values: Option<&[Measurement]>,
    stats: &[Option<PooledStats>],
    thresholds: &Thresholds,
) -> PlateDetail {
    let mut cells = Vec::with_capacity(stats.len());
    for (bead, bead_stats) in stats.iter().enumerate() {
        let value = values.map(|v| v.get(bead).copied().unwrap_or(Measurement::Na));
        let cell = match (value, bead_stats) {
            (Some(Measurement::Value(v)), Some(s)) => {
                let z = zscore(v, s);
                ZCell {
                    value,
                    zscore: Some(z),
                    flag: thresholds.classify_zscore(z),
                }
            }
            _ => ZCell {
                value,
                zscore: None,
                flag: QcFlag::Error,
            },
        };
        cells.push(cell);
    }
    let errors = cells.iter().filter(|c| c.flag.is_error()).count();
    let errors_and_warnings = cells.iter().filter(|c| c.flag.is_flagged()).count();
    PlateDetail {
        label,
        cells,
        errors,
        errors_and_warnings,
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage4_qc.rs"]
mod tests;
