use serde::{Deserialize, Serialize};

const CONTROL_MARKER: &str = "control";

/// How control samples are recognized and grouped. Selected once from the
/// configuration and applied uniformly to every sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlPolicy {
    /// Names containing "control" (any case). With `pool_variants`, the group
    /// ID is the name up to the first hyphen, so `Control-Low` and
    /// `Control-Low-2` land in the same group.
    Substring {
        #[serde(default)]
        pool_variants: bool,
    },
    /// Names containing any of the listed substrings. Groups by full name.
    ExplicitList { names: Vec<String> },
}

impl Default for ControlPolicy {
    fn default() -> Self {
        ControlPolicy::Substring {
            pool_variants: false,
        }
    }
}

/// Name-only control test used by the bead-count rescue. It ignores the
/// configured policy.
pub fn looks_like_control(name: &str) -> bool {
    name.to_lowercase().contains(CONTROL_MARKER)
}

impl ControlPolicy {
    pub fn is_control(&self, name: &str) -> bool {
        match self {
            ControlPolicy::Substring { .. } => looks_like_control(name),
            ControlPolicy::ExplicitList { names } => {
                names.iter().any(|needle| name.contains(needle.as_str()))
            }
        }
    }

    /// Group ID for a control sample, `None` for ordinary samples.
    pub fn group_id(&self, name: &str) -> Option<String> {
        if !self.is_control(name) {
            return None;
        }
        match self {
            ControlPolicy::Substring {
                pool_variants: true,
            } => {
                let stem = name.split('-').next().unwrap_or(name);
                Some(stem.to_string())
            }
            _ => Some(name.to_string()),
        }
    }

    pub fn pools_variants(&self) -> bool {
        matches!(
            self,
            ControlPolicy::Substring {
                pool_variants: true
            }
        )
    }

    pub fn label(&self) -> String {
        match self {
            ControlPolicy::Substring { pool_variants } => {
                if *pool_variants {
                    "substring \"control\" (pooled variants)".to_string()
                } else {
                    "substring \"control\"".to_string()
                }
            }
            ControlPolicy::ExplicitList { names } => {
                format!("explicit list [{}]", names.join(", "))
            }
        }
    }
}

/// Members are indices into the sample registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupLayout {
    /// One slot per plate, slot `i` holds plate `i + 1`; may be sparse.
    PerPlate(Vec<Option<usize>>),
    /// Every matching record across names and plates, in registry order.
    Pooled(Vec<usize>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlGroup {
    pub id: String,
    pub layout: GroupLayout,
}

impl ControlGroup {
    pub fn members(&self) -> Vec<usize> {
        match &self.layout {
            GroupLayout::PerPlate(slots) => slots.iter().flatten().copied().collect(),
            GroupLayout::Pooled(members) => members.clone(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/controls.rs"]
mod tests;
