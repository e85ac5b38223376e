use crate::error::ServiceError;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A (task, build variant) identity, the unit of inclusion in a patch.
///
/// `Ord` exists only so callers can sort results for display.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskVariantPair {
    pub task_name: String,
    pub variant: String,
}

impl TaskVariantPair {
    pub fn new(task_name: impl Into<String>, variant: impl Into<String>) -> Self {
        Self {
            task_name: task_name.into(),
            variant: variant.into(),
        }
    }
}

impl fmt::Display for TaskVariantPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.task_name, self.variant)
    }
}

/// Parses `task:variant`
impl FromStr for TaskVariantPair {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':').map(|(task, variant)| (task.trim(), variant.trim())) {
            Some((task, variant)) if !task.is_empty() && !variant.is_empty() => {
                Ok(Self::new(task, variant))
            }
            _ => Err(ServiceError::InvalidSelection(format!(
                "'{}' is not of the form task:variant",
                s
            ))),
        }
    }
}
