// Dependency Includer
// Expands a patch selection into the dependency-closed set of task/variant pairs

use crate::closure::expand::{expand_dependencies, expand_requirements};
use crate::closure::pair::TaskVariantPair;
use crate::project::graph::ProjectGraph;

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Why a pair was left out of the closure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    /// No build variant task unit exists for the pair
    NotFound,
    /// The unit is explicitly marked `patchable: false`
    Unpatchable,
    /// A requirement, dependency or task group member was excluded
    UnsatisfiedPrerequisite(TaskVariantPair),
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExclusionReason::NotFound => write!(f, "task not found in project"),
            ExclusionReason::Unpatchable => write!(f, "task is not patchable"),
            ExclusionReason::UnsatisfiedPrerequisite(pair) => {
                write!(f, "prerequisite {} is excluded", pair)
            }
        }
    }
}

/// Memoized inclusion decision for one pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Included,
    Excluded(ExclusionReason),
}

impl Decision {
    pub fn is_included(&self) -> bool {
        matches!(self, Decision::Included)
    }
}

/// An excluded pair and the reason it was dropped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExcludedPair {
    pub pair: TaskVariantPair,
    pub reason: ExclusionReason,
}

/// Outcome of one closure computation
#[derive(Debug, Clone, Default, Serialize)]
pub struct ClosureReport {
    /// Pairs to run, in no particular order
    pub included: Vec<TaskVariantPair>,
    /// Pairs visited and dropped, in no particular order
    pub excluded: Vec<ExcludedPair>,
}

impl ClosureReport {
    /// Sort both lists for stable output
    pub fn sorted(mut self) -> Self {
        self.included.sort();
        self.excluded.sort_by(|a, b| a.pair.cmp(&b.pair));
        self
    }

    /// Included task names keyed by variant
    pub fn variant_tasks(&self) -> BTreeMap<String, Vec<String>> {
        let mut by_variant: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for pair in &self.included {
            by_variant
                .entry(pair.variant.clone())
                .or_default()
                .push(pair.task_name.clone());
        }
        for tasks in by_variant.values_mut() {
            tasks.sort();
        }
        by_variant
    }
}

/// Crawls the requirement and dependency graph of a patch selection.
///
/// Required and depended-on tasks are added; tasks that depend on
/// unpatchable or missing tasks are pruned. The memo table lives for one
/// call to [`DependencyIncluder::include`] and is never shared.
pub struct DependencyIncluder<'a, G: ProjectGraph + ?Sized> {
    project: &'a G,
    included: HashMap<TaskVariantPair, Decision>,
}

impl<'a, G: ProjectGraph + ?Sized> DependencyIncluder<'a, G> {
    pub fn new(project: &'a G) -> Self {
        Self {
            project,
            included: HashMap::new(),
        }
    }

    /// Expand the initial pairs into the closure of pairs to run
    pub fn include(&mut self, initial: &[TaskVariantPair]) -> Vec<TaskVariantPair> {
        self.include_with_report(initial).included
    }

    /// Like [`include`](Self::include), also reporting every excluded pair
    pub fn include_with_report(&mut self, initial: &[TaskVariantPair]) -> ClosureReport {
        self.included.clear();

        for pair in initial {
            self.handle(pair);
        }

        let mut report = ClosureReport::default();
        for (pair, decision) in self.included.drain() {
            match decision {
                Decision::Included => report.included.push(pair),
                Decision::Excluded(reason) => report.excluded.push(ExcludedPair { pair, reason }),
            }
        }

        tracing::debug!(
            project = %self.project.identifier(),
            selected = initial.len(),
            included = report.included.len(),
            excluded = report.excluded.len(),
            "computed patch closure"
        );

        report
    }

    /// Resolve one pair, returning whether it and everything it needs can run
    fn handle(&mut self, pair: &TaskVariantPair) -> bool {
        if let Some(decision) = self.included.get(pair) {
            return decision.is_included();
        }

        let project = self.project;

        // A task group stands for its members and is never emitted itself
        if let Some(tg) = project.find_task_group(&pair.task_name) {
            for task in &tg.tasks {
                let member = TaskVariantPair::new(task.as_str(), pair.variant.as_str());
                if !self.handle(&member) {
                    return self.exclude(pair, ExclusionReason::UnsatisfiedPrerequisite(member));
                }
            }
            return true;
        }

        let Some(bvt) = project.find_task_for_variant(&pair.task_name, &pair.variant) else {
            tracing::error!(
                "task {} does not exist in project {}",
                pair.task_name,
                project.identifier()
            );
            return self.exclude(pair, ExclusionReason::NotFound);
        };

        if !bvt.is_patchable() {
            return self.exclude(pair, ExclusionReason::Unpatchable);
        }

        // Marked before recursing so dependency cycles terminate
        self.included.insert(pair.clone(), Decision::Included);

        let mut prerequisites = expand_requirements(project, pair, &bvt.requires);
        prerequisites.extend(expand_dependencies(project, pair, &bvt.depends_on));

        for prerequisite in prerequisites {
            if !self.handle(&prerequisite) {
                return self.exclude(pair, ExclusionReason::UnsatisfiedPrerequisite(prerequisite));
            }
        }

        true
    }

    fn exclude(&mut self, pair: &TaskVariantPair, reason: ExclusionReason) -> bool {
        tracing::debug!(pair = %pair, reason = %reason, "excluding from patch");
        self.included.insert(pair.clone(), Decision::Excluded(reason));
        false
    }
}

/// Compute the patch closure of `initial` with a fresh includer
pub fn include_dependencies<G>(project: &G, initial: &[TaskVariantPair]) -> Vec<TaskVariantPair>
where
    G: ProjectGraph + ?Sized,
{
    DependencyIncluder::new(project).include(initial)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::models::{
        BuildVariant, BuildVariantTaskUnit, Project, ProjectTask, TaskGroup,
        TaskUnitDependency, TaskUnitRequirement,
    };

    use std::collections::HashSet;

    fn task(name: &str) -> ProjectTask {
        ProjectTask {
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn unpatchable(name: &str) -> ProjectTask {
        ProjectTask {
            patchable: Some(false),
            ..task(name)
        }
    }

    fn depends(name: &str, deps: &[(&str, &str)]) -> ProjectTask {
        ProjectTask {
            depends_on: deps
                .iter()
                .map(|(n, v)| TaskUnitDependency {
                    name: n.to_string(),
                    variant: v.to_string(),
                    patch_optional: false,
                })
                .collect(),
            ..task(name)
        }
    }

    fn variant(name: &str, tasks: &[&str]) -> BuildVariant {
        BuildVariant {
            name: name.to_string(),
            display_name: None,
            tasks: tasks.iter().map(|t| BuildVariantTaskUnit::new(*t)).collect(),
        }
    }

    fn project(
        tasks: Vec<ProjectTask>,
        task_groups: Vec<TaskGroup>,
        build_variants: Vec<BuildVariant>,
    ) -> Project {
        Project {
            identifier: "sample".to_string(),
            tasks,
            task_groups,
            build_variants,
        }
    }

    fn pair(task: &str, variant: &str) -> TaskVariantPair {
        TaskVariantPair::new(task, variant)
    }

    fn set(pairs: &[(&str, &str)]) -> HashSet<TaskVariantPair> {
        pairs.iter().map(|(t, v)| pair(t, v)).collect()
    }

    fn closure(project: &Project, initial: &[TaskVariantPair]) -> HashSet<TaskVariantPair> {
        include_dependencies(project, initial).into_iter().collect()
    }

    #[test]
    fn test_single_task_without_dependencies() {
        let p = project(vec![task("t1")], vec![], vec![variant("v1", &["t1"])]);
        assert_eq!(closure(&p, &[pair("t1", "v1")]), set(&[("t1", "v1")]));
    }

    #[test]
    fn test_dependency_on_unpatchable_task_excludes_both() {
        let p = project(
            vec![depends("t1", &[("t2", "v1")]), unpatchable("t2")],
            vec![],
            vec![variant("v1", &["t1", "t2"])],
        );
        assert!(closure(&p, &[pair("t1", "v1")]).is_empty());
    }

    #[test]
    fn test_requirement_on_all_variants() {
        let t1 = ProjectTask {
            requires: vec![TaskUnitRequirement {
                name: "t2".to_string(),
                variant: "*".to_string(),
            }],
            ..task("t1")
        };
        let p = project(
            vec![t1, task("t2")],
            vec![],
            vec![variant("v1", &["t1", "t2"]), variant("v2", &["t2"])],
        );

        assert_eq!(
            closure(&p, &[pair("t1", "v1")]),
            set(&[("t1", "v1"), ("t2", "v2")])
        );

        // t2 on v1 is only included when reached some other way
        assert_eq!(
            closure(&p, &[pair("t1", "v1"), pair("t2", "v1")]),
            set(&[("t1", "v1"), ("t2", "v1"), ("t2", "v2")])
        );
    }

    #[test]
    fn test_task_group_with_unpatchable_member() {
        let p = project(
            vec![task("t1"), unpatchable("t2")],
            vec![TaskGroup {
                name: "tg".to_string(),
                tasks: vec!["t1".to_string(), "t2".to_string()],
            }],
            vec![variant("v1", &["tg"])],
        );

        let mut includer = DependencyIncluder::new(&p);
        let report = includer.include_with_report(&[pair("tg", "v1")]);

        // t1 was resolved before the group failed and keeps its own decision
        assert_eq!(report.included, vec![pair("t1", "v1")]);
        assert!(report.excluded.contains(&ExcludedPair {
            pair: pair("tg", "v1"),
            reason: ExclusionReason::UnsatisfiedPrerequisite(pair("t2", "v1")),
        }));
        assert!(report.excluded.contains(&ExcludedPair {
            pair: pair("t2", "v1"),
            reason: ExclusionReason::Unpatchable,
        }));
    }

    #[test]
    fn test_task_group_failing_first_member_includes_nothing() {
        let p = project(
            vec![task("t1"), unpatchable("t2")],
            vec![TaskGroup {
                name: "tg".to_string(),
                tasks: vec!["t2".to_string(), "t1".to_string()],
            }],
            vec![variant("v1", &["tg"])],
        );
        assert!(closure(&p, &[pair("tg", "v1")]).is_empty());
    }

    #[test]
    fn test_task_group_is_never_emitted() {
        let p = project(
            vec![task("t1"), task("t2")],
            vec![TaskGroup {
                name: "tg".to_string(),
                tasks: vec!["t1".to_string(), "t2".to_string()],
            }],
            vec![variant("v1", &["tg"])],
        );

        let mut includer = DependencyIncluder::new(&p);
        let report = includer.include_with_report(&[pair("tg", "v1")]);

        assert_eq!(
            report.included.iter().cloned().collect::<HashSet<_>>(),
            set(&[("t1", "v1"), ("t2", "v1")])
        );
        assert!(report.excluded.is_empty());
    }

    #[test]
    fn test_missing_task_propagates_exclusion() {
        let p = project(
            vec![depends("t1", &[("t2", "")]), task("t2"), depends("t3", &[("t1", "")])],
            vec![],
            vec![variant("v1", &["t1", "t3"])],
        );

        let mut includer = DependencyIncluder::new(&p);
        let report = includer.include_with_report(&[pair("t3", "v1")]).sorted();

        assert!(report.included.is_empty());
        assert_eq!(
            report.excluded,
            vec![
                ExcludedPair {
                    pair: pair("t1", "v1"),
                    reason: ExclusionReason::UnsatisfiedPrerequisite(pair("t2", "v1")),
                },
                ExcludedPair {
                    pair: pair("t2", "v1"),
                    reason: ExclusionReason::NotFound,
                },
                ExcludedPair {
                    pair: pair("t3", "v1"),
                    reason: ExclusionReason::UnsatisfiedPrerequisite(pair("t1", "v1")),
                },
            ]
        );
    }

    #[test]
    fn test_exclusion_propagates_through_chain() {
        let p = project(
            vec![
                depends("a", &[("b", "")]),
                depends("b", &[("c", "")]),
                depends("c", &[("d", "")]),
                unpatchable("d"),
                task("e"),
            ],
            vec![],
            vec![variant("v1", &["a", "b", "c", "d", "e"])],
        );

        assert_eq!(
            closure(&p, &[pair("a", "v1"), pair("e", "v1")]),
            set(&[("e", "v1")])
        );
    }

    #[test]
    fn test_patch_optional_dependency_is_invisible() {
        let optional = |target: &str| ProjectTask {
            depends_on: vec![TaskUnitDependency {
                name: target.to_string(),
                variant: String::new(),
                patch_optional: true,
            }],
            ..task("t1")
        };

        // never pulls the target in
        let p = project(
            vec![optional("t2"), task("t2")],
            vec![],
            vec![variant("v1", &["t1", "t2"])],
        );
        assert_eq!(closure(&p, &[pair("t1", "v1")]), set(&[("t1", "v1")]));

        // never blocks inclusion
        let p = project(
            vec![optional("t2"), unpatchable("t2")],
            vec![],
            vec![variant("v1", &["t1", "t2"])],
        );
        assert_eq!(closure(&p, &[pair("t1", "v1")]), set(&[("t1", "v1")]));
    }

    #[test]
    fn test_wildcard_dependency_does_not_depend_on_itself() {
        let p = project(
            vec![depends("t1", &[("*", "*")]), task("t2")],
            vec![],
            vec![variant("v1", &["t1", "t2"]), variant("v2", &["t1"])],
        );

        assert_eq!(
            closure(&p, &[pair("t1", "v1")]),
            set(&[("t1", "v1"), ("t2", "v1"), ("t1", "v2")])
        );
    }

    #[test]
    fn test_cycle_terminates_and_includes_members() {
        let p = project(
            vec![depends("t1", &[("t2", "")]), depends("t2", &[("t1", "")])],
            vec![],
            vec![variant("v1", &["t1", "t2"])],
        );

        assert_eq!(
            closure(&p, &[pair("t1", "v1")]),
            set(&[("t1", "v1"), ("t2", "v1")])
        );
    }

    #[test]
    fn test_cycle_keeps_optimistically_included_member() {
        // t2 sees t1 marked as included before t1 discovers its unpatchable
        // dependency, so t2 stays in the closure
        let p = project(
            vec![
                depends("t1", &[("t2", ""), ("t3", "")]),
                depends("t2", &[("t1", "")]),
                unpatchable("t3"),
            ],
            vec![],
            vec![variant("v1", &["t1", "t2", "t3"])],
        );

        assert_eq!(closure(&p, &[pair("t1", "v1")]), set(&[("t2", "v1")]));
    }

    #[test]
    fn test_repeated_and_duplicate_includes_are_stable() {
        let p = project(
            vec![depends("t1", &[("t2", "*")]), task("t2"), unpatchable("t3")],
            vec![],
            vec![variant("v1", &["t1", "t2", "t3"]), variant("v2", &["t2"])],
        );
        let initial = [pair("t1", "v1"), pair("t1", "v1"), pair("t3", "v1")];

        let mut includer = DependencyIncluder::new(&p);
        let first: HashSet<_> = includer.include(&initial).into_iter().collect();
        let second: HashSet<_> = includer.include(&initial).into_iter().collect();

        assert_eq!(first, set(&[("t1", "v1"), ("t2", "v1"), ("t2", "v2")]));
        assert_eq!(first, second);
    }

    #[test]
    fn test_memo_is_reset_between_calls() {
        let p = project(
            vec![task("t1"), task("t2")],
            vec![],
            vec![variant("v1", &["t1", "t2"])],
        );

        let mut includer = DependencyIncluder::new(&p);
        includer.include(&[pair("t1", "v1")]);
        assert_eq!(includer.include(&[pair("t2", "v1")]), vec![pair("t2", "v1")]);
    }

    #[test]
    fn test_concurrent_includers_share_project() {
        let p = project(
            vec![depends("t1", &[("t2", "")]), task("t2"), unpatchable("t3")],
            vec![],
            vec![variant("v1", &["t1", "t2", "t3"])],
        );

        let (a, b) = std::thread::scope(|s| {
            let a = s.spawn(|| closure(&p, &[pair("t1", "v1")]));
            let b = s.spawn(|| closure(&p, &[pair("t3", "v1"), pair("t2", "v1")]));
            (a.join().unwrap(), b.join().unwrap())
        });

        assert_eq!(a, set(&[("t1", "v1"), ("t2", "v1")]));
        assert_eq!(b, set(&[("t2", "v1")]));
    }

    #[test]
    fn test_demo_project_closure() {
        let p = crate::project::ProjectParser::parse(include_str!("../../../demos/project.yml"))
            .unwrap();
        assert!(crate::project::ProjectValidator::validate(&p).is_ok());

        assert_eq!(
            closure(&p, &[pair("tests", "linux")]),
            set(&[
                ("unit", "linux"),
                ("integration", "linux"),
                ("compile", "linux"),
                ("fetch", "linux"),
                ("package", "windows"),
                ("compile", "windows"),
                ("fetch", "windows"),
            ])
        );

        // release depends on everything, including the unpatchable lint task
        let mut includer = DependencyIncluder::new(&p);
        let report = includer.include_with_report(&[pair("release", "linux")]);
        assert!(!report.included.contains(&pair("release", "linux")));
        assert!(report.excluded.contains(&ExcludedPair {
            pair: pair("lint", "linux"),
            reason: ExclusionReason::Unpatchable,
        }));
    }

    #[test]
    fn test_report_serializes_reasons() {
        let report = ClosureReport {
            included: vec![pair("t1", "v1")],
            excluded: vec![
                ExcludedPair {
                    pair: pair("t2", "v1"),
                    reason: ExclusionReason::Unpatchable,
                },
                ExcludedPair {
                    pair: pair("t3", "v1"),
                    reason: ExclusionReason::UnsatisfiedPrerequisite(pair("t2", "v1")),
                },
            ],
        };

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["included"][0]["task_name"], "t1");
        assert_eq!(value["excluded"][0]["reason"], "unpatchable");
        assert_eq!(
            value["excluded"][1]["reason"]["unsatisfied_prerequisite"]["task_name"],
            "t2"
        );
    }

    #[test]
    fn test_report_groups_by_variant() {
        let report = ClosureReport {
            included: vec![
                pair("test", "linux"),
                pair("compile", "windows"),
                pair("compile", "linux"),
            ],
            excluded: Vec::new(),
        };

        let grouped = report.variant_tasks();
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped["linux"], vec!["compile", "test"]);
        assert_eq!(grouped["windows"], vec!["compile"]);
    }
}
