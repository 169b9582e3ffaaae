use crate::model::controls::{ControlGroup, ControlPolicy, GroupLayout};
use crate::model::sample::SampleRegistry;

#[derive(Debug, Clone)]
pub struct Stage3Output {
    /// Groups in first-discovery order.
    pub groups: Vec<ControlGroup>,
    /// Registry indices of samples the policy does not match, in registry order.
    pub ordinary: Vec<usize>,
}

/// Partitions the registry: every record lands in exactly one group or in
/// the ordinary list.
pub fn run_stage3(samples: &SampleRegistry, policy: &ControlPolicy, plate_count: u32) -> Stage3Output {
    let mut groups: Vec<ControlGroup> = Vec::new();
    let mut ordinary = Vec::new();
    let pooled = policy.pools_variants();

    for (idx, record) in samples.records().iter().enumerate() {
        let Some(group_id) = policy.group_id(&record.id.name) else {
            ordinary.push(idx);
            continue;
        };

        let pos = match groups.iter().position(|g| g.id == group_id) {
            Some(pos) => pos,
            None => {
                let layout = if pooled {
                    GroupLayout::Pooled(Vec::new())
                } else {
                    GroupLayout::PerPlate(vec![None; plate_count as usize])
                };
                groups.push(ControlGroup {
                    id: group_id,
                    layout,
                });
                groups.len() - 1
            }
        };

        let group = &mut groups[pos];
        match &mut group.layout {
            GroupLayout::Pooled(members) => members.push(idx),
            GroupLayout::PerPlate(slots) => {
                let slot = record.id.plate as usize;
                match slot.checked_sub(1).and_then(|s| slots.get_mut(s)) {
                    Some(entry) if entry.is_none() => *entry = Some(idx),
                    Some(_) => {
                        tracing::warn!(
                            "control {} already has a record for plate {}; keeping the first",
                            group.id,
                            record.id.plate
                        );
                    }
                    None => {
                        tracing::warn!(
                            "control {} is on plate {} beyond plate count {}; ignored",
                            record.id,
                            record.id.plate,
                            plate_count
                        );
                    }
                }
            }
        }
    }

    tracing::debug!("{} controls found", groups.len());
    Stage3Output { groups, ordinary }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage3_controls.rs"]
mod tests;
