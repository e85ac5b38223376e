// Project YAML Loader
// Parses project definition files into the in-memory project graph

use crate::project::error::{ParseError, ParseResult};
use crate::project::models::Project;

use std::fs;
use std::path::Path;

/// Project definition parser
pub struct ProjectParser;

impl ProjectParser {
    /// Parse project from YAML string
    pub fn parse(content: &str) -> ParseResult<Project> {
        let project: Project =
            serde_yaml::from_str(content).map_err(|e| ParseError::from_yaml_error(&e, content))?;

        tracing::debug!(
            project = %project.identifier,
            tasks = project.tasks.len(),
            task_groups = project.task_groups.len(),
            variants = project.build_variants.len(),
            "parsed project definition"
        );

        Ok(project)
    }

    /// Parse project from file
    pub fn parse_file<P: AsRef<Path>>(path: P) -> ParseResult<Project> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ParseError::io(format!("failed to read {}: {}", path.display(), e))
        })?;

        let mut project = Self::parse(&content)?;
        if project.identifier.is_empty() {
            // Fall back to the file stem so diagnostics still name the project
            if let Some(stem) = path.file_stem() {
                project.identifier = stem.to_string_lossy().into_owned();
            }
        }
        Ok(project)
    }
}
