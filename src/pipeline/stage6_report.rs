use std::fs;
use std::path::{Path, PathBuf};

use crate::config::PipelineConfig;
use crate::model::qc::GroupQc;
use crate::model::sample::BeadNames;
use crate::pipeline::stage1_parse::PlateSummary;
use crate::pipeline::stage5_tables::Stage5Output;
use crate::report::ReportError;
use crate::report::json::{WorkbookMeta, render_workbook_json};
use crate::report::text::{ReportContext, render_report_text};
use crate::report::tsv::write_table_tsv;

#[derive(Debug, Clone)]
pub struct Stage6Input<'a> {
    pub config: &'a PipelineConfig,
    pub plates: &'a [PlateSummary],
    pub bead_names: &'a BeadNames,
    pub tables: &'a Stage5Output,
    pub qc: &'a [GroupQc],
    pub n_samples: usize,
    pub n_ordinary: usize,
    pub tool_version: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub combined_json: PathBuf,
    pub combined_dir: PathBuf,
    pub master_json: PathBuf,
    pub master_tsv: PathBuf,
    pub report: PathBuf,
}

pub fn write_reports(input: &Stage6Input<'_>, out_dir: &Path) -> Result<ReportPaths, ReportError> {
    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| ReportError::Io { path, source }
    };
    fs::create_dir_all(out_dir).map_err(io_err(out_dir))?;

    let config = input.config;
    let meta = WorkbookMeta {
        tool: env!("CARGO_PKG_NAME"),
        version: input.tool_version,
        protocol: &config.protocol,
        palette: &config.palette,
        thresholds: &config.thresholds,
    };

    let sheets = input.tables.sheets();
    let combined_json = out_dir.join(format!("{}.json", config.combined_name()));
    let json = render_workbook_json(&meta, &sheets)?;
    fs::write(&combined_json, json).map_err(io_err(&combined_json))?;

    let combined_dir = out_dir.join(config.combined_name());
    fs::create_dir_all(&combined_dir).map_err(io_err(&combined_dir))?;
    for table in &sheets {
        write_table_tsv(table, &combined_dir.join(format!("{}.tsv", table.name)))?;
    }
    tracing::info!("{} saved", combined_json.display());

    let master = [&input.tables.master];
    let master_json = out_dir.join(format!("{}.json", config.master_name()));
    let json = render_workbook_json(&meta, &master)?;
    fs::write(&master_json, json).map_err(io_err(&master_json))?;
    let master_tsv = out_dir.join(format!("{}.tsv", config.master_name()));
    write_table_tsv(&input.tables.master, &master_tsv)?;
    tracing::info!("{} saved", master_json.display());

    let report = out_dir.join(config.report_name());
    let ctx = ReportContext {
        protocol: &config.protocol,
        control_policy: config.control_policy.label(),
        thresholds: &config.thresholds,
        plates: input.plates,
        bead_names: input.bead_names.as_slice(),
        n_samples: input.n_samples,
        n_ordinary: input.n_ordinary,
        qc: input.qc,
    };
    fs::write(&report, render_report_text(&ctx)).map_err(io_err(&report))?;

    Ok(ReportPaths {
        combined_json,
        combined_dir,
        master_json,
        master_tsv,
        report,
    })
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage6_report.rs"]
mod tests;
