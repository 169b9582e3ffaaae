use crate::model::flags::QcFlag;
use crate::model::sample::Measurement;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PooledStats {
    pub mean: f64,
    /// Population standard deviation (divides by N).
    pub stdev: f64,
}

/// `cv` is `None` when every replicate for the bead was NA.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CvCell {
    pub cv: Option<f64>,
    pub flag: QcFlag,
}

/// `value` is `None` for an empty plate slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZCell {
    pub value: Option<Measurement>,
    pub zscore: Option<f64>,
    pub flag: QcFlag,
}

/// One detail row per stored replicate. `label` is `Plate N` for per-plate
/// groups and the member's sample ID for pooled groups, with a `#k` suffix
/// when that record holds several rows.
#[derive(Debug, Clone, PartialEq)]
pub struct PlateDetail {
    pub label: String,
    pub cells: Vec<ZCell>,
    pub errors: usize,
    pub errors_and_warnings: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupQc {
    pub group_id: String,
    pub cvs: Vec<CvCell>,
    pub plates: Vec<PlateDetail>,
}

impl GroupQc {
    pub fn flagged_beads(&self) -> usize {
        self.cvs.iter().filter(|c| c.flag.is_flagged()).count()
    }
}
