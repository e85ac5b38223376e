// Prerequisite Expansion
// Turns a unit's requirements and dependencies into concrete task/variant pairs

use crate::closure::pair::TaskVariantPair;
use crate::project::graph::ProjectGraph;
use crate::project::models::{
    TaskUnitDependency, TaskUnitRequirement, ALL_DEPENDENCIES, ALL_VARIANTS,
};

/// What a single dependency selects
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencySelector<'a> {
    /// One task on one variant
    Exact { name: &'a str, variant: &'a str },
    /// One task on every variant that has it
    TaskOnAllVariants { name: &'a str },
    /// Every task on one variant
    AllTasksOnVariant { variant: &'a str },
    /// Every task on every variant
    AllTasksOnAllVariants,
}

impl<'a> DependencySelector<'a> {
    /// Classify a dependency declared by a unit on `variant`.
    /// An empty dependency variant means the declaring variant.
    pub fn classify(dep: &'a TaskUnitDependency, variant: &'a str) -> Self {
        let dep_variant = if dep.variant.is_empty() {
            variant
        } else {
            dep.variant.as_str()
        };

        match (dep.name == ALL_DEPENDENCIES, dep.variant == ALL_VARIANTS) {
            (true, true) => Self::AllTasksOnAllVariants,
            (false, true) => Self::TaskOnAllVariants { name: &dep.name },
            (true, false) => Self::AllTasksOnVariant {
                variant: dep_variant,
            },
            (false, false) => Self::Exact {
                name: &dep.name,
                variant: dep_variant,
            },
        }
    }
}

/// Find all pairs required by the given pair
pub fn expand_requirements<G>(
    graph: &G,
    pair: &TaskVariantPair,
    reqs: &[TaskUnitRequirement],
) -> Vec<TaskVariantPair>
where
    G: ProjectGraph + ?Sized,
{
    let mut deps = Vec::new();
    for req in reqs {
        if req.variant == ALL_VARIANTS {
            // every other variant that has the task
            for v in graph.find_variants_with_task(&req.name) {
                if v != pair.variant {
                    deps.push(TaskVariantPair::new(req.name.as_str(), v));
                }
            }
        } else {
            let variant = if req.variant.is_empty() {
                pair.variant.as_str()
            } else {
                req.variant.as_str()
            };
            deps.push(TaskVariantPair::new(req.name.as_str(), variant));
        }
    }
    deps
}

/// Find all pairs the given pair depends on, skipping patch-optional dependencies
pub fn expand_dependencies<G>(
    graph: &G,
    pair: &TaskVariantPair,
    depends_on: &[TaskUnitDependency],
) -> Vec<TaskVariantPair>
where
    G: ProjectGraph + ?Sized,
{
    let is_self = |task: &str, variant: &str| task == pair.task_name && variant == pair.variant;

    let mut deps = Vec::new();
    for dep in depends_on.iter().filter(|d| !d.patch_optional) {
        match DependencySelector::classify(dep, &pair.variant) {
            DependencySelector::AllTasksOnAllVariants => {
                for v in graph.find_all_variants() {
                    for t in graph.find_tasks_for_variant(&v) {
                        if !is_self(t.as_str(), v.as_str()) {
                            deps.push(TaskVariantPair::new(t, v.as_str()));
                        }
                    }
                }
            }
            DependencySelector::TaskOnAllVariants { name } => {
                for v in graph.find_variants_with_task(name) {
                    if !is_self(name, v.as_str()) {
                        deps.push(TaskVariantPair::new(name, v));
                    }
                }
            }
            DependencySelector::AllTasksOnVariant { variant } => {
                for t in graph.find_tasks_for_variant(variant) {
                    if !is_self(t.as_str(), variant) {
                        deps.push(TaskVariantPair::new(t, variant));
                    }
                }
            }
            DependencySelector::Exact { name, variant } => {
                deps.push(TaskVariantPair::new(name, variant));
            }
        }
    }
    deps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::models::{BuildVariant, BuildVariantTaskUnit, Project, ProjectTask};

    fn make_project() -> Project {
        let task = |name: &str| ProjectTask {
            name: name.to_string(),
            ..Default::default()
        };
        let variant = |name: &str, tasks: &[&str]| BuildVariant {
            name: name.to_string(),
            display_name: None,
            tasks: tasks.iter().map(|t| BuildVariantTaskUnit::new(*t)).collect(),
        };

        Project {
            identifier: "proj".to_string(),
            tasks: vec![task("t1"), task("t2"), task("t3")],
            task_groups: Vec::new(),
            build_variants: vec![
                variant("v1", &["t1", "t2"]),
                variant("v2", &["t1", "t2", "t3"]),
            ],
        }
    }

    fn dep(name: &str, variant: &str) -> TaskUnitDependency {
        TaskUnitDependency {
            name: name.to_string(),
            variant: variant.to_string(),
            patch_optional: false,
        }
    }

    fn req(name: &str, variant: &str) -> TaskUnitRequirement {
        TaskUnitRequirement {
            name: name.to_string(),
            variant: variant.to_string(),
        }
    }

    fn pairs(list: &[(&str, &str)]) -> Vec<TaskVariantPair> {
        list.iter()
            .map(|(t, v)| TaskVariantPair::new(*t, *v))
            .collect()
    }

    #[test]
    fn test_classify_is_exhaustive() {
        let all = dep("*", "*");
        let task_all = dep("t1", "*");
        let all_on = dep("*", "v2");
        let all_here = dep("*", "");
        let exact = dep("t1", "");

        assert_eq!(
            DependencySelector::classify(&all, "v1"),
            DependencySelector::AllTasksOnAllVariants
        );
        assert_eq!(
            DependencySelector::classify(&task_all, "v1"),
            DependencySelector::TaskOnAllVariants { name: "t1" }
        );
        assert_eq!(
            DependencySelector::classify(&all_on, "v1"),
            DependencySelector::AllTasksOnVariant { variant: "v2" }
        );
        assert_eq!(
            DependencySelector::classify(&all_here, "v1"),
            DependencySelector::AllTasksOnVariant { variant: "v1" }
        );
        assert_eq!(
            DependencySelector::classify(&exact, "v1"),
            DependencySelector::Exact {
                name: "t1",
                variant: "v1"
            }
        );
    }

    #[test]
    fn test_requirement_all_variants_skips_own_variant() {
        let project = make_project();
        let pair = TaskVariantPair::new("t1", "v1");

        let deps = expand_requirements(&project, &pair, &[req("t2", "*")]);
        assert_eq!(deps, pairs(&[("t2", "v2")]));
    }

    #[test]
    fn test_requirement_defaults_to_own_variant() {
        let project = make_project();
        let pair = TaskVariantPair::new("t1", "v1");

        let deps = expand_requirements(&project, &pair, &[req("t2", ""), req("t3", "v2")]);
        assert_eq!(deps, pairs(&[("t2", "v1"), ("t3", "v2")]));
    }

    #[test]
    fn test_dependency_on_everything_excludes_self() {
        let project = make_project();
        let pair = TaskVariantPair::new("t1", "v1");

        let deps = expand_dependencies(&project, &pair, &[dep("*", "*")]);
        assert_eq!(
            deps,
            pairs(&[("t2", "v1"), ("t1", "v2"), ("t2", "v2"), ("t3", "v2")])
        );
        assert!(!deps.contains(&pair));
    }

    #[test]
    fn test_dependency_on_task_across_variants_excludes_self() {
        let project = make_project();
        let pair = TaskVariantPair::new("t1", "v1");

        let deps = expand_dependencies(&project, &pair, &[dep("t1", "*")]);
        assert_eq!(deps, pairs(&[("t1", "v2")]));

        let deps = expand_dependencies(&project, &pair, &[dep("t2", "*")]);
        assert_eq!(deps, pairs(&[("t2", "v1"), ("t2", "v2")]));
    }

    #[test]
    fn test_dependency_on_all_tasks_of_variant() {
        let project = make_project();
        let pair = TaskVariantPair::new("t1", "v1");

        // same variant: self excluded
        let deps = expand_dependencies(&project, &pair, &[dep("*", "")]);
        assert_eq!(deps, pairs(&[("t2", "v1")]));

        // other variant: same task name is not self
        let deps = expand_dependencies(&project, &pair, &[dep("*", "v2")]);
        assert_eq!(deps, pairs(&[("t1", "v2"), ("t2", "v2"), ("t3", "v2")]));
    }

    #[test]
    fn test_exact_dependency() {
        let project = make_project();
        let pair = TaskVariantPair::new("t1", "v1");

        let deps = expand_dependencies(&project, &pair, &[dep("t2", ""), dep("t3", "v2")]);
        assert_eq!(deps, pairs(&[("t2", "v1"), ("t3", "v2")]));
    }

    #[test]
    fn test_patch_optional_dependencies_are_skipped() {
        let project = make_project();
        let pair = TaskVariantPair::new("t1", "v1");
        let optional = TaskUnitDependency {
            patch_optional: true,
            ..dep("*", "*")
        };

        assert!(expand_dependencies(&project, &pair, &[optional]).is_empty());
    }
}
