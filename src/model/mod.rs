pub mod controls;
pub mod flags;
pub mod qc;
pub mod sample;
pub mod table;
pub mod thresholds;
