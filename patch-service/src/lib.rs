// Patch Service Library
// Dependency closure for partial (patch) builds of CI projects

pub mod closure;
pub mod config;
pub mod error;
pub mod project;
pub mod utils;

// Re-export commonly used types
pub use error::{ServiceError, ServiceResult};

// Re-export project types
pub use project::{
    BuildVariant, BuildVariantTaskUnit, ParseError, ParseErrorKind, ParseResult, Project,
    ProjectGraph, ProjectParser, ProjectTask, ProjectValidator, TaskGroup, TaskUnitDependency,
    TaskUnitRequirement, ValidationError, ALL_DEPENDENCIES, ALL_VARIANTS,
};

// Re-export closure types
pub use closure::{
    include_dependencies, pairs_for_selection, ClosureReport, DependencyIncluder, ExcludedPair,
    ExclusionReason, TaskVariantPair,
};

// Re-export config types
pub use config::{OutputFormat, SelectorConfig};
