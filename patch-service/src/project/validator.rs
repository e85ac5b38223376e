// Project Validator
// Semantic checks on a parsed project definition

use crate::project::error::ValidationError;
use crate::project::models::{Project, ALL_DEPENDENCIES, ALL_VARIANTS};

use std::collections::HashSet;

/// Validator for parsed projects
pub struct ProjectValidator;

impl ProjectValidator {
    /// Validate a parsed project for semantic correctness
    pub fn validate(project: &Project) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if project.identifier.trim().is_empty() {
            errors.push(
                ValidationError::new("project must have an identifier", "identifier")
                    .with_suggestion("add 'identifier: my-project' at the top level"),
            );
        }

        let task_names = Self::unique_names(
            project.tasks.iter().map(|t| t.name.as_str()),
            "tasks",
            &mut errors,
        );
        let group_names = Self::unique_names(
            project.task_groups.iter().map(|tg| tg.name.as_str()),
            "task_groups",
            &mut errors,
        );
        let variant_names = Self::unique_names(
            project.build_variants.iter().map(|bv| bv.name.as_str()),
            "buildvariants",
            &mut errors,
        );

        for tg in &project.task_groups {
            let path = format!("task_groups.{}", tg.name);
            if task_names.contains(tg.name.as_str()) {
                errors.push(ValidationError::new(
                    format!("task group '{}' has the same name as a task", tg.name),
                    path.clone(),
                ));
            }
            if tg.tasks.is_empty() {
                errors.push(ValidationError::new("task group has no tasks", path.clone()));
            }
            for member in &tg.tasks {
                if !task_names.contains(member.as_str()) {
                    errors.push(ValidationError::new(
                        format!("task group member '{}' is not a defined task", member),
                        format!("{}.tasks", path),
                    ));
                }
            }
        }

        for bv in &project.build_variants {
            for unit in &bv.tasks {
                if !task_names.contains(unit.name.as_str())
                    && !group_names.contains(unit.name.as_str())
                {
                    errors.push(
                        ValidationError::new(
                            format!("unknown task or task group '{}'", unit.name),
                            format!("buildvariants.{}.tasks", bv.name),
                        )
                        .with_suggestion("define it under 'tasks:' or 'task_groups:'"),
                    );
                }
            }
        }

        let references = project
            .tasks
            .iter()
            .map(|t| (format!("tasks.{}", t.name), &t.requires, &t.depends_on))
            .chain(project.build_variants.iter().flat_map(|bv| {
                bv.tasks.iter().map(move |u| {
                    (
                        format!("buildvariants.{}.tasks.{}", bv.name, u.name),
                        &u.requires,
                        &u.depends_on,
                    )
                })
            }));

        for (path, requires, depends_on) in references {
            for req in requires {
                Self::check_reference(
                    &req.name,
                    &req.variant,
                    false,
                    &format!("{}.requires", path),
                    &task_names,
                    &variant_names,
                    &mut errors,
                );
            }
            for dep in depends_on {
                Self::check_reference(
                    &dep.name,
                    &dep.variant,
                    true,
                    &format!("{}.depends_on", path),
                    &task_names,
                    &variant_names,
                    &mut errors,
                );
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn unique_names<'a>(
        names: impl Iterator<Item = &'a str>,
        path: &str,
        errors: &mut Vec<ValidationError>,
    ) -> HashSet<&'a str> {
        let mut seen = HashSet::new();
        for name in names {
            if name.is_empty() {
                errors.push(ValidationError::new("name must not be empty", path));
            } else if !seen.insert(name) {
                errors.push(ValidationError::new(
                    format!("'{}' is defined more than once", name),
                    path,
                ));
            }
        }
        seen
    }

    #[allow(clippy::too_many_arguments)]
    fn check_reference(
        name: &str,
        variant: &str,
        name_wildcard_allowed: bool,
        path: &str,
        task_names: &HashSet<&str>,
        variant_names: &HashSet<&str>,
        errors: &mut Vec<ValidationError>,
    ) {
        let is_wildcard = name_wildcard_allowed && name == ALL_DEPENDENCIES;
        if !is_wildcard && !task_names.contains(name) {
            errors.push(ValidationError::new(
                format!("reference to unknown task '{}'", name),
                path,
            ));
        }
        if !variant.is_empty() && variant != ALL_VARIANTS && !variant_names.contains(variant) {
            let mut available: Vec<&str> = variant_names.iter().copied().collect();
            available.sort_unstable();
            errors.push(
                ValidationError::new(
                    format!("reference to unknown variant '{}'", variant),
                    path,
                )
                .with_suggestion(format!("available variants: {}", available.join(", "))),
            );
        }
    }
}
