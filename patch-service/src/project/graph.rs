// Project Graph Lookups
// Read-only queries over tasks, task groups and build variants

use crate::project::models::{BuildVariantTaskUnit, Project, TaskGroup};

/// Read-only view of a project's task/variant graph.
///
/// Implementations must not change while a closure is being computed; any
/// number of closures may read the same graph at once.
pub trait ProjectGraph {
    /// Project identifier used in diagnostics
    fn identifier(&self) -> &str;

    /// Task group with the given name, if one exists
    fn find_task_group(&self, name: &str) -> Option<&TaskGroup>;

    /// Effective unit for one task on one variant
    fn find_task_for_variant(&self, task: &str, variant: &str) -> Option<BuildVariantTaskUnit>;

    /// Names of every variant that runs the task
    fn find_variants_with_task(&self, task: &str) -> Vec<String>;

    /// Names of every task that runs on the variant
    fn find_tasks_for_variant(&self, variant: &str) -> Vec<String>;

    /// Names of every variant
    fn find_all_variants(&self) -> Vec<String>;
}

impl ProjectGraph for Project {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn find_task_group(&self, name: &str) -> Option<&TaskGroup> {
        self.task_groups.iter().find(|tg| tg.name == name)
    }

    fn find_task_for_variant(&self, task: &str, variant: &str) -> Option<BuildVariantTaskUnit> {
        let bv = self.find_build_variant(variant)?;
        let definition = self.find_project_task(task)?;

        if let Some(unit) = bv.tasks.iter().find(|u| u.name == task) {
            return Some(unit.clone().populate_from(definition));
        }

        // Listed through a task group: the group entry's overrides apply
        bv.tasks
            .iter()
            .find(|u| {
                self.find_task_group(&u.name)
                    .is_some_and(|tg| tg.contains(task))
            })
            .map(|group_entry| {
                BuildVariantTaskUnit {
                    name: task.to_string(),
                    ..group_entry.clone()
                }
                .populate_from(definition)
            })
    }

    fn find_variants_with_task(&self, task: &str) -> Vec<String> {
        self.build_variants
            .iter()
            .filter(|bv| {
                self.find_tasks_for_variant(&bv.name)
                    .iter()
                    .any(|t| t == task)
            })
            .map(|bv| bv.name.clone())
            .collect()
    }

    fn find_tasks_for_variant(&self, variant: &str) -> Vec<String> {
        let Some(bv) = self.find_build_variant(variant) else {
            return Vec::new();
        };

        let mut tasks: Vec<String> = Vec::with_capacity(bv.tasks.len());
        for unit in &bv.tasks {
            let names = match self.find_task_group(&unit.name) {
                Some(tg) => tg.tasks.clone(),
                None => vec![unit.name.clone()],
            };
            for name in names {
                if !tasks.contains(&name) {
                    tasks.push(name);
                }
            }
        }
        tasks
    }

    fn find_all_variants(&self) -> Vec<String> {
        self.build_variants.iter().map(|bv| bv.name.clone()).collect()
    }
}
