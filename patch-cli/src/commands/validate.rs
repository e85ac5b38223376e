use crate::commands::{load_project, project_path};
use crate::output;

use std::path::PathBuf;

use clap::Args;
use color_eyre::Result;

use patch_service::{ProjectValidator, SelectorConfig};

/// Validate a project definition file
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Project definition file (default: from config, else project.yml)
    #[arg(short, long, value_name = "FILE")]
    pub project: Option<PathBuf>,
}

pub fn execute(args: ValidateArgs, config: &SelectorConfig) -> Result<()> {
    let path = project_path(args.project, &config.project);

    // Step 1: Parse YAML
    output::status("Validating", &format!("{}", path.display()));
    let project = load_project(&path)?;
    output::check("YAML syntax valid");

    output::check(&format!(
        "Structure: {} tasks, {} task groups, {} variants",
        project.tasks.len(),
        project.task_groups.len(),
        project.build_variants.len()
    ));

    // Step 2: Semantic validation
    match ProjectValidator::validate(&project) {
        Ok(()) => {
            output::check("Semantic validation passed");
        }
        Err(errors) => {
            output::error(&format!("{} validation error(s):", errors.len()));
            for error in &errors {
                output::error(&format!("  - [{}] {}", error.path, error.message));
                if let Some(suggestion) = &error.suggestion {
                    output::info(&format!("    Suggestion: {}", suggestion));
                }
            }
            std::process::exit(1);
        }
    }

    eprintln!();
    output::success(&format!("Project '{}' is valid", project.identifier));

    Ok(())
}
