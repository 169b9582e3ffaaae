use super::*;
use crate::model::sample::{Measurement, SampleId};

fn registry(ids: &[(u32, &str)]) -> SampleRegistry {
    let mut reg = SampleRegistry::default();
    for (plate, name) in ids {
        reg.append(SampleId::new(*plate, *name), vec![Measurement::Value(1.0)]);
    }
    reg
}

fn assert_partition(out: &Stage3Output, n: usize) {
    let mut seen = out.ordinary.clone();
    for g in &out.groups {
        seen.extend(g.members());
    }
    seen.sort_unstable();
    assert_eq!(seen, (0..n).collect::<Vec<_>>());
}

#[test]
fn test_substring_per_plate_slots() {
    let reg = registry(&[
        (1, "Control-1"),
        (1, "S1"),
        (2, "S2"),
        (2, "Control-1"),
        (3, "control-2"),
    ]);
    let out = run_stage3(&reg, &ControlPolicy::default(), 3);
    assert_eq!(out.ordinary, vec![1, 2]);
    assert_eq!(out.groups.len(), 2);
    assert_eq!(out.groups[0].id, "Control-1");
    assert_eq!(
        out.groups[0].layout,
        GroupLayout::PerPlate(vec![Some(0), Some(3), None])
    );
    assert_eq!(out.groups[1].id, "control-2");
    assert_eq!(
        out.groups[1].layout,
        GroupLayout::PerPlate(vec![None, None, Some(4)])
    );
    assert_partition(&out, reg.len());
}

#[test]
fn test_substring_pooling() {
    let reg = registry(&[
        (1, "Control-Low"),
        (1, "Control-Low-2"),
        (2, "Control-High"),
        (2, "Sample"),
    ]);
    let policy = ControlPolicy::Substring {
        pool_variants: true,
    };
    let out = run_stage3(&reg, &policy, 2);
    assert_eq!(out.groups.len(), 1);
    assert_eq!(out.groups[0].id, "Control");
    assert_eq!(out.groups[0].layout, GroupLayout::Pooled(vec![0, 1, 2]));
    assert_eq!(out.ordinary, vec![3]);
    assert_partition(&out, reg.len());
}

#[test]
fn test_explicit_list_partition() {
    let reg = registry(&[(1, "QC-A"), (1, "Control-1"), (2, "QC-A"), (2, "Std")]);
    let policy = ControlPolicy::ExplicitList {
        names: vec!["QC".to_string(), "Std".to_string()],
    };
    let out = run_stage3(&reg, &policy, 2);
    let ids: Vec<&str> = out.groups.iter().map(|g| g.id.as_str()).collect();
    assert_eq!(ids, vec!["QC-A", "Std"]);
    assert_eq!(out.ordinary, vec![1]);
    assert_partition(&out, reg.len());
}

#[test]
fn test_no_controls() {
    let reg = registry(&[(1, "S1"), (1, "S2")]);
    let out = run_stage3(&reg, &ControlPolicy::default(), 1);
    assert!(out.groups.is_empty());
    assert_eq!(out.ordinary, vec![0, 1]);
}
