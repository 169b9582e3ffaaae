use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::model::flags::QcFlag;
use crate::model::qc::CvCell;
use crate::model::table::{AnnotatedCell, Table, TableValue};

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn make_temp_dir() -> PathBuf {
    let mut dir = std::env::temp_dir();
    let id = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    dir.push(format!("kira_luminexqc_report_{}_{}", std::process::id(), id));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn table(name: &str, label: &str, value: TableValue) -> Table {
    let mut t = Table::new(name, vec!["B1".to_string()]);
    t.push_row(
        AnnotatedCell::label(label, false),
        vec![AnnotatedCell::plain(value)],
    );
    t
}

fn tables() -> Stage5Output {
    Stage5Output {
        combined: table("Combined", "1_S1", TableValue::Number(5.0)),
        bead_counts: None,
        cvs: table("CVs", "Control-1", TableValue::Number(2.5)),
        master: table("Master", "B1", TableValue::Na),
    }
}

#[test]
fn test_write_reports_layout() {
    let out = make_temp_dir().join("nested");
    let config = PipelineConfig {
        protocol: "IL6".to_string(),
        ..PipelineConfig::default()
    };
    let bead_names = BeadNames::new(vec!["B1".to_string()]);
    let tables = tables();
    let qc = vec![GroupQc {
        group_id: "Control-1".to_string(),
        cvs: vec![CvCell {
            cv: Some(2.5),
            flag: QcFlag::Ok,
        }],
        plates: Vec::new(),
    }];
    let input = Stage6Input {
        config: &config,
        plates: &[],
        bead_names: &bead_names,
        tables: &tables,
        qc: &qc,
        n_samples: 2,
        n_ordinary: 1,
        tool_version: "0.0.0",
    };

    let paths = write_reports(&input, &out).unwrap();
    assert_eq!(paths.combined_json, out.join("IL6_results_combined.json"));
    assert_eq!(paths.combined_dir, out.join("IL6_results_combined"));
    assert_eq!(paths.master_json, out.join("IL6_results_master.json"));
    assert_eq!(paths.master_tsv, out.join("IL6_results_master.tsv"));
    assert_eq!(paths.report, out.join("IL6_qc_report.txt"));

    let combined_tsv = fs::read_to_string(paths.combined_dir.join("Combined.tsv")).unwrap();
    assert_eq!(combined_tsv, "\tB1\n1_S1\t5\n");
    let cvs_tsv = fs::read_to_string(paths.combined_dir.join("CVs.tsv")).unwrap();
    assert_eq!(cvs_tsv, "\tB1\nControl-1\t2.500000\n");
    assert!(!paths.combined_dir.join("BeadCounts.tsv").exists());
    let master_tsv = fs::read_to_string(&paths.master_tsv).unwrap();
    assert_eq!(master_tsv, "\tB1\nB1\tNA\n");

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&paths.combined_json).unwrap()).unwrap();
    assert_eq!(json["protocol"], "IL6");
    assert_eq!(json["palette"]["warning_color"], "FFFFA500");
    assert_eq!(json["thresholds"]["bead_cutoff"], 25);
    let names: Vec<&str> = json["sheets"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Combined", "CVs", "Master"]);
    assert_eq!(json["sheets"][2]["rows"][0]["cells"][0]["value"], "NA");

    let master: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&paths.master_json).unwrap()).unwrap();
    assert_eq!(master["sheets"].as_array().unwrap().len(), 1);

    let report = fs::read_to_string(&paths.report).unwrap();
    assert!(report.contains("Protocol: IL6"));
    assert!(report.contains("Control-1: 0 of 1 beads flagged"));
}
