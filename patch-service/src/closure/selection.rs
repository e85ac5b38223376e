// Patch Selection
// Builds the initial task/variant pairs from a variants x tasks selection

use crate::closure::pair::TaskVariantPair;
use crate::error::{ServiceError, ServiceResult};
use crate::project::graph::ProjectGraph;

/// Selects every variant or every task
pub const SELECT_ALL: &str = "all";

/// Cross the selected variants with the selected tasks.
///
/// Only tasks that run on a variant are paired with it; a task group is paired
/// with a variant when all of its members run there. An unknown variant is an
/// error, an unknown task simply pairs with nothing.
pub fn pairs_for_selection<G>(
    graph: &G,
    variants: &[String],
    tasks: &[String],
) -> ServiceResult<Vec<TaskVariantPair>>
where
    G: ProjectGraph + ?Sized,
{
    let all_variants = graph.find_all_variants();

    let selected_variants: Vec<String> = if variants.iter().any(|v| v == SELECT_ALL) {
        all_variants
    } else {
        for v in variants {
            if !all_variants.contains(v) {
                return Err(ServiceError::InvalidSelection(format!(
                    "build variant '{}' does not exist in project {}",
                    v,
                    graph.identifier()
                )));
            }
        }
        variants.to_vec()
    };

    let all_tasks = tasks.iter().any(|t| t == SELECT_ALL);

    let mut pairs: Vec<TaskVariantPair> = Vec::new();
    for variant in &selected_variants {
        let on_variant = graph.find_tasks_for_variant(variant);

        let names: Vec<&String> = if all_tasks {
            on_variant.iter().collect()
        } else {
            tasks
                .iter()
                .filter(|t| match graph.find_task_group(t.as_str()) {
                    Some(tg) => tg.tasks.iter().all(|member| on_variant.contains(member)),
                    None => on_variant.contains(*t),
                })
                .collect()
        };

        for name in names {
            let pair = TaskVariantPair::new(name.as_str(), variant.as_str());
            if !pairs.contains(&pair) {
                pairs.push(pair);
            }
        }
    }

    tracing::debug!(
        variants = selected_variants.len(),
        pairs = pairs.len(),
        "expanded patch selection"
    );

    Ok(pairs)
}
