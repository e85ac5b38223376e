pub mod include;
pub mod validate;

use crate::output;

use std::path::{Path, PathBuf};

use color_eyre::Result;
use patch_service::{ParseErrorKind, Project, ProjectParser};

/// Explicit `--project`, else the configured default
pub fn project_path(arg: Option<PathBuf>, configured: &Path) -> PathBuf {
    arg.unwrap_or_else(|| configured.to_path_buf())
}

/// Load a project file, reporting parse failures the way `validate` does
pub fn load_project(path: &Path) -> Result<Project> {
    if !path.exists() {
        color_eyre::eyre::bail!("Project file not found: {}", path.display());
    }

    tracing::debug!(path = %path.display(), "loading project definition");

    match ProjectParser::parse_file(path) {
        Ok(project) => Ok(project),
        Err(e) => {
            if e.kind == ParseErrorKind::IoError {
                output::error(&e.message);
            } else {
                output::error(&format!("Parse error: {}", e.message));
                if !e.context.is_empty() {
                    eprint!("{}", e.context);
                }
            }
            if let Some(suggestion) = &e.suggestion {
                output::info(&format!("  Suggestion: {}", suggestion));
            }
            std::process::exit(1);
        }
    }
}
