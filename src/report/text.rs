use crate::model::flags::QcFlag;
use crate::model::qc::GroupQc;
use crate::model::thresholds::Thresholds;
use crate::pipeline::stage1_parse::PlateSummary;
use crate::report::format_number;

#[derive(Debug, Clone)]
pub struct ReportContext<'a> {
    pub protocol: &'a str,
    pub control_policy: String,
    pub thresholds: &'a Thresholds,
    pub plates: &'a [PlateSummary],
    pub bead_names: &'a [String],
    pub n_samples: usize,
    pub n_ordinary: usize,
    pub qc: &'a [GroupQc],
}

pub fn render_report_text(ctx: &ReportContext<'_>) -> String {
    let mut out = String::new();

    out.push_str("Luminex Plate QC Report\n");
    out.push_str("=======================\n\n");

    out.push_str("1. Run\n");
    out.push_str(&format!("Protocol: {}\n", ctx.protocol));
    out.push_str(&format!("Control policy: {}\n", ctx.control_policy));
    let t = ctx.thresholds;
    out.push_str(&format!(
        "Thresholds: bead_cutoff={}, cv_warning={}, cv_error={}, zsc_warning={}, zsc_error={}\n\n",
        t.bead_cutoff,
        format_number(t.cv_warning),
        format_number(t.cv_error),
        format_number(t.zsc_warning),
        format_number(t.zsc_error)
    ));

    out.push_str("2. Plates\n");
    for p in ctx.plates {
        out.push_str(&format!(
            "Plate {}: {} rows (FI row {}, Bead Count row {}), {} NA cells, {} control cells kept by secondary count\n",
            p.label, p.rows, p.fi_data_row, p.bead_count_data_row, p.na_cells, p.rescued_cells
        ));
    }
    out.push_str(&format!(
        "Beads: {}\nSamples: {} ({} ordinary, {} in controls)\n\n",
        ctx.bead_names.len(),
        ctx.n_samples,
        ctx.n_ordinary,
        ctx.n_samples - ctx.n_ordinary.min(ctx.n_samples)
    ));

    out.push_str("3. Controls\n");
    if ctx.qc.is_empty() {
        out.push_str("No control samples found.\n");
    }
    for group in ctx.qc {
        out.push_str(&format!(
            "{}: {} of {} beads flagged\n",
            group.group_id,
            group.flagged_beads(),
            group.cvs.len()
        ));
        for (bead, cell) in group.cvs.iter().enumerate() {
            if cell.flag == QcFlag::Ok {
                continue;
            }
            let name = ctx.bead_names.get(bead).map(String::as_str).unwrap_or("?");
            let cv = cell.cv.map_or_else(|| "NA".to_string(), format_number);
            out.push_str(&format!("  {} CV={} [{}]\n", name, cv, cell.flag.as_str()));
        }
        for plate in &group.plates {
            if plate.errors_and_warnings > 0 {
                out.push_str(&format!(
                    "  {}: {} errors, {} errors+warnings\n",
                    plate.label, plate.errors, plate.errors_and_warnings
                ));
            }
        }
    }

    out
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/text.rs"]
mod tests;
