// Patch Closure Module
// Expands a selection of task/variant pairs into everything a patch build must run

pub mod expand;
pub mod includer;
pub mod pair;
pub mod selection;

pub use expand::{expand_dependencies, expand_requirements, DependencySelector};
pub use includer::{
    include_dependencies, ClosureReport, Decision, DependencyIncluder, ExcludedPair,
    ExclusionReason,
};
pub use pair::TaskVariantPair;
pub use selection::{pairs_for_selection, SELECT_ALL};
