//! Command implementations for driftdoc CLI

use crate::cli::{Commands, OutputFormat};
use crate::config::{ReportConfig, DEFAULT_CONFIG_FILE};
use crate::error::{DriftError, Result};
use crate::output::{format_bytes, JsonFormatter, PrettyPrinter, SectionSummary};
use crate::progress::ProgressReporter;
use crate::report::{Report, ReportSection};
use crate::section::{collect_section_files, SectionSpec};
use std::path::{Path, PathBuf};

/// Execute a command relative to the current directory
pub fn execute_command(command: Commands, config_path: Option<&Path>) -> Result<()> {
    let current_dir = std::env::current_dir()?;
    execute_command_in(command, config_path, &current_dir)
}

/// Execute a command; relative paths and the default config resolve against `root`
pub fn execute_command_in(command: Commands, config_path: Option<&Path>, root: &Path) -> Result<()> {
    let config_path = config_path.map(|p| resolve_path(root, p));
    match command {
        Commands::Report {
            inputs,
            output,
            title,
        } => report_command(root, config_path.as_deref(), &inputs, &output, title),
        Commands::Summary { inputs, format } => {
            summary_command(root, config_path.as_deref(), &inputs, &format)
        }
        Commands::InitConfig { force } => init_config_command(root, config_path.as_deref(), force),
    }
}

fn resolve_path(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// Load and diff every section file under the inputs
fn load_sections(
    root: &Path,
    config_path: Option<&Path>,
    inputs: &[PathBuf],
    show_progress: bool,
) -> Result<Vec<ReportSection>> {
    let inputs: Vec<PathBuf> = inputs.iter().map(|p| resolve_path(root, p)).collect();
    let files = collect_section_files(&inputs, config_path)?;
    if files.is_empty() {
        return Err(DriftError::invalid_input("no section files found in the given inputs"));
    }

    let mut progress = if show_progress {
        ProgressReporter::new_for_sections(files.len() as u64)
    } else {
        ProgressReporter::new_minimal()
    };

    let mut sections = Vec::with_capacity(files.len());
    for file in &files {
        log::debug!("Loading section file {}", file.display());
        let spec = SectionSpec::load(file)?;
        let section = spec.to_report_section()?;
        progress.section_done(&section.id);
        sections.push(section);
    }
    progress.finish(&format!("Diffed {} sections", sections.len()));
    Ok(sections)
}

/// Render the HTML drift report
fn report_command(
    root: &Path,
    config_path: Option<&Path>,
    inputs: &[PathBuf],
    output: &Path,
    title: Option<String>,
) -> Result<()> {
    let mut config = ReportConfig::resolve(config_path, root)?;
    if let Some(title) = title {
        config.title = title;
    }

    let sections = load_sections(root, config_path, inputs, true)?;
    let total = sections.len();
    let mut report = Report::new(config);
    for section in sections {
        report.add_section(section);
    }
    let html = report.render()?;

    let output = resolve_path(root, output);
    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&output, &html)?;

    let changed = report
        .sections()
        .iter()
        .filter(|s| !s.diffgram.can_hide())
        .count();
    log::info!(
        "Wrote {} ({}), {} of {} sections, {} changed",
        output.display(),
        format_bytes(html.len() as u64),
        report.sections().len(),
        total,
        changed
    );
    println!("✅ Report written to: {}", output.display());
    Ok(())
}

/// Print per-section change counts
fn summary_command(root: &Path, config_path: Option<&Path>, inputs: &[PathBuf], format: &str) -> Result<()> {
    let output_format = OutputFormat::parse(format).map_err(DriftError::invalid_input)?;
    let sections = load_sections(root, config_path, inputs, false)?;
    let summaries: Vec<SectionSummary> = sections.iter().map(SectionSummary::from_section).collect();

    match output_format {
        OutputFormat::Pretty => PrettyPrinter::print_summaries(&summaries),
        OutputFormat::Json => println!("{}", JsonFormatter::format(&summaries)?),
    }
    Ok(())
}

/// Write a default config file
fn init_config_command(root: &Path, config_path: Option<&Path>, force: bool) -> Result<()> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| root.join(DEFAULT_CONFIG_FILE));
    let written = ReportConfig::default().save(&path, force)?;
    println!("✅ Wrote report config: {}", written.display());
    Ok(())
}
