use crate::commands::{load_project, project_path};
use crate::output;

use std::path::PathBuf;

use clap::Args;
use color_eyre::Result;

use patch_service::{
    pairs_for_selection, ClosureReport, DependencyIncluder, OutputFormat, SelectorConfig,
    TaskVariantPair,
};

/// Compute the tasks a patch build must run
#[derive(Args, Debug)]
pub struct IncludeArgs {
    /// Project definition file (default: from config, else project.yml)
    #[arg(short, long, value_name = "FILE")]
    pub project: Option<PathBuf>,

    /// Build variants to patch, comma separated, or "all"
    #[arg(short = 'b', long, value_delimiter = ',', value_name = "VARIANTS")]
    pub variants: Vec<String>,

    /// Tasks or task groups to patch, comma separated, or "all"
    #[arg(short, long, value_delimiter = ',', value_name = "TASKS")]
    pub tasks: Vec<String>,

    /// Select a single task on a single variant (repeatable)
    #[arg(long = "pair", value_name = "TASK:VARIANT")]
    pub pairs: Vec<TaskVariantPair>,

    /// Output format: text or json
    #[arg(long)]
    pub format: Option<OutputFormat>,

    /// Also list pairs that were dropped and why
    #[arg(long)]
    pub show_excluded: bool,
}

pub fn execute(args: IncludeArgs, config: &SelectorConfig) -> Result<()> {
    if args.variants.is_empty() != args.tasks.is_empty() {
        color_eyre::eyre::bail!("--variants and --tasks must be given together");
    }
    if args.variants.is_empty() && args.pairs.is_empty() {
        color_eyre::eyre::bail!("nothing selected: use --variants/--tasks or --pair");
    }

    let path = project_path(args.project, &config.project);
    let project = load_project(&path)?;

    let mut initial = if args.variants.is_empty() {
        Vec::new()
    } else {
        pairs_for_selection(&project, &args.variants, &args.tasks)?
    };
    tracing::debug!(
        project = %path.display(),
        variants = ?args.variants,
        tasks = ?args.tasks,
        pairs = args.pairs.len(),
        "expanded selection into {} pair(s)",
        initial.len()
    );

    for pair in args.pairs {
        if !initial.contains(&pair) {
            initial.push(pair);
        }
    }

    output::status(
        "Resolving",
        &format!(
            "{} selected pair(s) in project {}",
            initial.len(),
            project.identifier
        ),
    );

    let report = DependencyIncluder::new(&project)
        .include_with_report(&initial)
        .sorted();

    let show_excluded = args.show_excluded || config.show_excluded;
    match args.format.unwrap_or(config.format) {
        OutputFormat::Json => print_json(&project.identifier, &report, show_excluded)?,
        OutputFormat::Text => print_text(&report, show_excluded),
    }

    Ok(())
}

fn print_json(identifier: &str, report: &ClosureReport, show_excluded: bool) -> Result<()> {
    let mut value = serde_json::json!({
        "project": identifier,
        "variants": report.variant_tasks(),
        "pairs": report.included,
    });
    if show_excluded {
        value["excluded"] = serde_json::to_value(&report.excluded)?;
    }

    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn print_text(report: &ClosureReport, show_excluded: bool) {
    let by_variant = report.variant_tasks();

    for (variant, tasks) in &by_variant {
        output::variant_header(variant, tasks.len());
        for task in tasks {
            output::task_line(task);
        }
    }

    if show_excluded && !report.excluded.is_empty() {
        eprintln!();
        output::dim(&format!("  {} pair(s) excluded:", report.excluded.len()));
        for excluded in &report.excluded {
            output::excluded(&excluded.pair.to_string(), &excluded.reason.to_string());
        }
    }

    eprintln!();
    if report.included.is_empty() {
        output::warning("no selected task can be patched");
    } else {
        output::success(&format!(
            "{} task(s) across {} variant(s)",
            report.included.len(),
            by_variant.len()
        ));
    }
}
