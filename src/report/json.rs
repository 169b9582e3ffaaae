use serde::Serialize;

use crate::config::Palette;
use crate::model::table::Table;
use crate::model::thresholds::Thresholds;

#[derive(Debug, Clone, Serialize)]
pub struct WorkbookMeta<'a> {
    pub tool: &'a str,
    pub version: &'a str,
    pub protocol: &'a str,
    pub palette: &'a Palette,
    pub thresholds: &'a Thresholds,
}

#[derive(Serialize)]
struct WorkbookJson<'a> {
    #[serde(flatten)]
    meta: &'a WorkbookMeta<'a>,
    sheets: &'a [&'a Table],
}

/// Every cell carries `value`, `flag` and `bold`; a renderer maps the flag
/// to the palette color.
pub fn render_workbook_json(
    meta: &WorkbookMeta<'_>,
    sheets: &[&Table],
) -> Result<String, serde_json::Error> {
    let mut out = serde_json::to_string_pretty(&WorkbookJson { meta, sheets })?;
    out.push('\n');
    Ok(out)
}
