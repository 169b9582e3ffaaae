use crate::input::grid::Cell;
use crate::model::sample::Measurement;
use crate::model::thresholds::Thresholds;

/// Raw cells feeding one (sample, bead) decision. `secondary_count` is the
/// bead-count row right after the sample's primary row.
#[derive(Debug, Clone, Copy)]
pub struct BeadReading<'a> {
    pub intensity: &'a Cell,
    pub count: &'a Cell,
    pub secondary_count: &'a Cell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    /// Control whose primary count was low but whose secondary row passed.
    Rescued,
    BelowCutoff,
    NonNumeric,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assessment {
    pub measurement: Measurement,
    pub verdict: Verdict,
}

pub fn assess(reading: &BeadReading<'_>, is_control: bool, thresholds: &Thresholds) -> Assessment {
    let mut rescued = false;
    if let Some(count) = reading.count.as_number() {
        if thresholds.count_below_cutoff(count) {
            let secondary_low = reading
                .secondary_count
                .as_number()
                .is_some_and(|c| thresholds.count_below_cutoff(c));
            if !is_control || secondary_low {
                return Assessment {
                    measurement: Measurement::Na,
                    verdict: Verdict::BelowCutoff,
                };
            }
            rescued = true;
        }
    }

    match reading.intensity.as_number() {
        Some(v) => Assessment {
            measurement: Measurement::Value(v),
            verdict: if rescued {
                Verdict::Rescued
            } else {
                Verdict::Accepted
            },
        },
        None => Assessment {
            measurement: Measurement::Na,
            verdict: Verdict::NonNumeric,
        },
    }
}

/// Diagnostic view of a raw count: non-numeric or low counts are unreliable.
pub fn count_is_reliable(count: &Cell, thresholds: &Thresholds) -> bool {
    count
        .as_number()
        .is_some_and(|c| !thresholds.count_below_cutoff(c))
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage2_reliability.rs"]
mod tests;
