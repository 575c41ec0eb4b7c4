use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use ro_prefix_patcher::config::{
    apply_patches, load_from_path, ro_prefix_patches, ApplicationError, ApplyOptions,
    PatchConfig, PatchReport, StepResult,
};
use similar::{ChangeTag, TextDiff};
use std::env;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "ro-prefix-patcher")]
#[command(
    about = "Add the RO prefix toggle to the POS client card CUI field",
    long_about = None
)]
#[command(version)]
struct Cli {
    /// Project root containing the target file (defaults to the current directory)
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// Patch set to apply instead of the built-in RO prefix patches
    #[arg(short, long)]
    patches: Option<PathBuf>,

    /// Dry run - show what would be changed without modifying files
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Show unified diff of changes
    #[arg(short, long)]
    diff: bool,

    /// Print the outcome of every step
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.patches {
        Some(path) => load_from_path(path)?,
        None => ro_prefix_patches().context("built-in patch set is invalid")?,
    };

    let (root, display_path) = resolve_root(cli.root, &config.meta.target)?;

    if cli.verbose {
        println!("Patch set: {}", config.meta.name);
        if let Some(description) = &config.meta.description {
            println!("{}", description.dimmed());
        }
        println!("Root: {}", root.display());
        println!();
    }

    let options = ApplyOptions {
        dry_run: cli.dry_run,
    };

    match apply_patches(&config, &root, options) {
        Ok(report) => {
            if cli.verbose {
                print_steps(&config, &report);
            }
            if cli.diff && report.plan.changed() {
                display_diff(&display_path, &report.plan.original, &report.plan.patched);
            }

            if cli.dry_run {
                println!("{}", "[DRY RUN - no files were modified]".cyan());
                println!("Would patch {}", display_path.display());
            } else if report.written {
                println!("Patched {}", display_path.display());
            } else {
                println!("Nothing to change in {}", display_path.display());
            }
            Ok(())
        }
        Err(e @ ApplicationError::MissingRequired { .. }) => {
            println!("{}", e.to_string().red());
            if let ApplicationError::MissingRequired {
                id,
                near_miss: Some(hit),
                ..
            } = &e
            {
                eprintln!("  Patch: {}", id);
                eprintln!("  File: {}", display_path.display());
                eprintln!("  {}", hit.to_string().yellow());
                eprintln!("  Possible causes:");
                eprintln!("    - The block was edited by hand");
                eprintln!("    - Formatting or indentation changed");
            }
            std::process::exit(1);
        }
        Err(e @ ApplicationError::AlreadyApplied { .. }) => {
            println!("{}", e.to_string().yellow());
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}

/// Resolve the project root: the explicit --root flag, or else the current
/// directory. The target is never looked up anywhere else, so a missing file
/// fails the read.
///
/// Returns the root and the path to show in messages: the target itself when
/// the root is the current directory, otherwise root joined with the target.
fn resolve_root(cli_root: Option<PathBuf>, target: &str) -> Result<(PathBuf, PathBuf)> {
    match cli_root {
        Some(root) => {
            let display = root.join(target);
            Ok((root, display))
        }
        None => {
            let cwd = env::current_dir().context("cannot determine current directory")?;
            Ok((cwd, PathBuf::from(target)))
        }
    }
}

fn print_steps(config: &PatchConfig, report: &PatchReport) {
    for (patch_id, result) in &report.plan.steps {
        let required = config
            .patches
            .iter()
            .any(|p| &p.id == patch_id && p.required);

        match result {
            StepResult::Applied { occurrences } => {
                println!("{} {}: {}", "✓".green(), patch_id, result);
                if required && *occurrences > 1 {
                    println!(
                        "  {}",
                        format!("warning: required block matched {} times", occurrences)
                            .yellow()
                    );
                }
            }
            StepResult::AlreadyApplied => {
                println!("{} {}: {}", "⊙".yellow(), patch_id, result)
            }
            StepResult::Skipped { .. } => println!("{} {}: {}", "⊘".cyan(), patch_id, result),
        }
    }

    println!(
        "  {} bytes, {} {}",
        format!("{:+}", report.plan.byte_delta()).bold(),
        if report.written { "written to" } else { "not written to" },
        report.file.display()
    );
    println!();
}

/// Helper: Show unified diff between original and modified content
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (patched)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for hunk in diff.unified_diff().context_radius(3).iter_hunks() {
        println!("{}", hunk.header().to_string().cyan());
        for change in hunk.iter_changes() {
            let line = match change.tag() {
                ChangeTag::Delete => format!("-{}", change).red(),
                ChangeTag::Insert => format!("+{}", change).green(),
                ChangeTag::Equal => format!(" {}", change).normal(),
            };
            print!("{}", line);
            if change.missing_newline() {
                println!();
            }
        }
    }
    println!();
}
