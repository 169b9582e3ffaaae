use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QcFlag {
    Ok,
    Warning,
    Error,
}

impl QcFlag {
    pub fn as_str(self) -> &'static str {
        match self {
            QcFlag::Ok => "ok",
            QcFlag::Warning => "warning",
            QcFlag::Error => "error",
        }
    }

    pub fn is_error(self) -> bool {
        self == QcFlag::Error
    }

    /// Warning or worse.
    pub fn is_flagged(self) -> bool {
        self != QcFlag::Ok
    }
}

