use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use flate2::Compression;
use flate2::write::GzEncoder;

use super::*;

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn make_temp_dir() -> PathBuf {
    let mut dir = std::env::temp_dir();
    let id = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    dir.push(format!("kira_luminexqc_grid_{}_{}", std::process::id(), id));
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn test_cell_parse() {
    assert_eq!(Cell::parse(""), Cell::Empty);
    assert_eq!(Cell::parse("   "), Cell::Empty);
    assert_eq!(Cell::parse("42"), Cell::Number(42.0));
    assert_eq!(Cell::parse(" 3.5 "), Cell::Number(3.5));
    assert_eq!(
        Cell::parse("Description"),
        Cell::Text("Description".to_string())
    );
    assert_eq!(Cell::parse("NaN"), Cell::Text("NaN".to_string()));
    assert_eq!(Cell::parse("***"), Cell::Text("***".to_string()));
}

#[test]
fn test_cell_display() {
    assert_eq!(Cell::Number(30.0).to_string(), "30");
    assert_eq!(Cell::Number(2.25).to_string(), "2.25");
    assert_eq!(Cell::Empty.to_string(), "");
}

#[test]
fn test_grid_one_based_and_out_of_range() {
    let grid = Grid::from_rows(vec![
        vec![Cell::parse("a"), Cell::parse("1")],
        vec![Cell::parse("b")],
    ]);
    assert_eq!(grid.n_rows(), 2);
    assert_eq!(grid.get(1, 1).as_text(), Some("a"));
    assert_eq!(grid.get(1, 2).as_number(), Some(1.0));
    assert!(grid.get(2, 2).is_empty());
    assert!(grid.get(0, 1).is_empty());
    assert!(grid.get(9, 9).is_empty());
}

#[test]
fn test_load_grid_plain_and_gz() {
    let dir = make_temp_dir();
    let contents = "x,,Description,B1\n,A1,S_1,120.5\n";

    let plain = dir.join("FI.csv");
    fs::write(&plain, contents).unwrap();
    let grid = load_grid(&plain).unwrap();
    assert_eq!(grid.get(1, 3).as_text(), Some("Description"));
    assert!(grid.get(1, 2).is_empty());
    assert_eq!(grid.get(2, 4).as_number(), Some(120.5));

    let gz = dir.join("Bead Count.csv.gz");
    let mut enc = GzEncoder::new(File::create(&gz).unwrap(), Compression::default());
    enc.write_all(contents.as_bytes()).unwrap();
    enc.finish().unwrap();
    let grid_gz = load_grid(&gz).unwrap();
    assert_eq!(grid_gz, grid);
}

#[test]
fn test_load_grid_ragged_rows() {
    let dir = make_temp_dir();
    let path = dir.join("ragged.csv");
    fs::write(&path, "a\nb,c,d\n\ne\n").unwrap();
    let grid = load_grid(&path).unwrap();
    assert_eq!(grid.get(2, 3).as_text(), Some("d"));
    assert!(grid.get(1, 3).is_empty());
}

#[test]
fn test_load_grid_missing_file() {
    let dir = make_temp_dir();
    let err = load_grid(&dir.join("nope.csv")).unwrap_err();
    assert!(matches!(err, InputError::Io { .. }));
}
