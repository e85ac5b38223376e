// Project Definition Data Models
// Tasks, task groups and build variants as declared in a project YAML file

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;

/// Variant wildcard: "every variant that has this task"
pub const ALL_VARIANTS: &str = "*";

/// Task name wildcard: "every task"
pub const ALL_DEPENDENCIES: &str = "*";

/// Root project structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Project {
    /// Project identifier, used in diagnostics
    #[serde(default)]
    pub identifier: String,

    /// Task definitions, holding the defaults for every variant
    #[serde(default)]
    pub tasks: Vec<ProjectTask>,

    /// Named, ordered groups of tasks
    #[serde(default)]
    pub task_groups: Vec<TaskGroup>,

    /// Build variants and the tasks they run
    #[serde(default, rename = "buildvariants", alias = "build_variants")]
    pub build_variants: Vec<BuildVariant>,
}

impl Project {
    /// Get a task definition by name
    pub fn find_project_task(&self, name: &str) -> Option<&ProjectTask> {
        self.tasks.iter().find(|t| t.name == name)
    }

    /// Get a build variant by name
    pub fn find_build_variant(&self, name: &str) -> Option<&BuildVariant> {
        self.build_variants.iter().find(|bv| bv.name == name)
    }
}

// =============================================================================
// Tasks
// =============================================================================

/// A task definition
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectTask {
    pub name: String,

    /// Unset means patchable
    #[serde(default)]
    pub patchable: Option<bool>,

    #[serde(default, deserialize_with = "deserialize_one_or_many")]
    pub requires: Vec<TaskUnitRequirement>,

    #[serde(default, deserialize_with = "deserialize_one_or_many")]
    pub depends_on: Vec<TaskUnitDependency>,
}

/// A named, ordered collection of tasks
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct TaskGroup {
    pub name: String,
    #[serde(default)]
    pub tasks: Vec<String>,
}

impl TaskGroup {
    pub fn contains(&self, task: &str) -> bool {
        self.tasks.iter().any(|t| t == task)
    }
}

/// A task this unit additionally requires to run.
///
/// An empty variant means "the requiring pair's variant", [`ALL_VARIANTS`]
/// means every variant that has the task.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TaskUnitRequirement {
    pub name: String,
    #[serde(default)]
    pub variant: String,
}

/// A task this unit depends on.
///
/// Either side may be a wildcard. Patch-optional dependencies are invisible to
/// patch closure computation.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TaskUnitDependency {
    pub name: String,
    #[serde(default)]
    pub variant: String,
    #[serde(default)]
    pub patch_optional: bool,
}

// =============================================================================
// Build Variants
// =============================================================================

/// A build variant
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct BuildVariant {
    pub name: String,

    #[serde(default)]
    pub display_name: Option<String>,

    /// Tasks (or task groups) this variant runs
    #[serde(default, deserialize_with = "deserialize_task_units")]
    pub tasks: Vec<BuildVariantTaskUnit>,
}

/// The concrete definition of one task on one variant.
///
/// In a variant's task list the fields are per-variant overrides; once
/// resolved through [`crate::ProjectGraph::find_task_for_variant`] they hold
/// the effective values.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BuildVariantTaskUnit {
    pub name: String,

    #[serde(default)]
    pub patchable: Option<bool>,

    #[serde(default, deserialize_with = "deserialize_one_or_many")]
    pub requires: Vec<TaskUnitRequirement>,

    #[serde(default, deserialize_with = "deserialize_one_or_many")]
    pub depends_on: Vec<TaskUnitDependency>,
}

impl BuildVariantTaskUnit {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Fill unset fields from the task definition
    pub fn populate_from(mut self, task: &ProjectTask) -> Self {
        if self.patchable.is_none() {
            self.patchable = task.patchable;
        }
        if self.requires.is_empty() {
            self.requires = task.requires.clone();
        }
        if self.depends_on.is_empty() {
            self.depends_on = task.depends_on.clone();
        }
        self
    }

    /// `patchable: false` is the only value that blocks a patch build
    pub fn is_patchable(&self) -> bool {
        self.patchable != Some(false)
    }
}

// =============================================================================
// Deserialization helpers
// =============================================================================

// Nested entries go through `Value` rather than untagged enums so that
// field errors such as unknown keys keep their message.

fn from_value<'de, D, T>(value: Value) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    serde_yaml::from_value(value).map_err(D::Error::custom)
}

/// Accepts either a single entry or a list of entries
fn deserialize_one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Option::<Value>::deserialize(deserializer)? {
        None => Ok(Vec::new()),
        Some(Value::Sequence(items)) => items.into_iter().map(from_value::<D, T>).collect(),
        Some(item) => Ok(vec![from_value::<D, T>(item)?]),
    }
}

/// Variant task entries may be a bare task name or a full unit
fn deserialize_task_units<'de, D>(deserializer: D) -> Result<Vec<BuildVariantTaskUnit>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Vec<Value>>::deserialize(deserializer)?
        .unwrap_or_default()
        .into_iter()
        .map(|entry| match entry {
            Value::String(name) => Ok(BuildVariantTaskUnit::new(name)),
            unit => from_value::<D, BuildVariantTaskUnit>(unit),
        })
        .collect()
}
