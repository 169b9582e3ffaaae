pub mod stage1_parse;
pub mod stage2_reliability;
pub mod stage3_controls;
pub mod stage4_qc;
pub mod stage5_tables;
pub mod stage6_report;
