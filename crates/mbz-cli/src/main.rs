//! mbz2zip - Moodle backup to browsable ZIP converter
//!
//! Turns a course backup (`.mbz`, ZIP or TAR.GZ inside) into a ZIP archive
//! with one numbered folder per section and readable file names.

mod config;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use config::Config;
use log::LevelFilter;
use mbz_core::{BuildOptions, Compression, CourseSummary};
use std::fs;
use std::path::{Path, PathBuf};

/// Format bytes as human-readable size (e.g., "1.5 MB")
#[allow(clippy::cast_precision_loss)]
fn format_bytes(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;
    const GB: usize = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} bytes")
    }
}

/// Output path for `input` when none was given
///
/// `course.mbz` becomes `course.zip`, in `output_dir` if set, otherwise next
/// to the input. A backup that is already named `*.zip` gets a
/// `-browsable` suffix so it is never overwritten by its own conversion.
fn smart_output_path(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let dir = output_dir.map_or_else(
        || input.parent().map(Path::to_path_buf).unwrap_or_default(),
        Path::to_path_buf,
    );

    let candidate = dir.join(format!("{stem}.zip"));
    if candidate == input {
        dir.join(format!("{stem}-browsable.zip"))
    } else {
        candidate
    }
}

/// Verbosity level for output control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Verbosity {
    /// Suppress all output except errors
    Quiet,
    /// Normal output (default)
    Normal,
    /// Verbose output with extra details
    Verbose,
}

impl Verbosity {
    const fn from_flags(quiet: bool, verbose: bool) -> Self {
        if quiet {
            Self::Quiet
        } else if verbose {
            Self::Verbose
        } else {
            Self::Normal
        }
    }

    const fn should_show_output(self) -> bool {
        !matches!(self, Self::Quiet)
    }

    const fn log_level(self) -> LevelFilter {
        match self {
            Self::Quiet => LevelFilter::Error,
            Self::Normal => LevelFilter::Warn,
            Self::Verbose => LevelFilter::Debug,
        }
    }
}

/// Log to stderr; `RUST_LOG` overrides the level picked from the flags
fn init_logging(verbosity: Verbosity) {
    env_logger::Builder::new()
        .filter_level(verbosity.log_level())
        .target(env_logger::Target::Stderr)
        .parse_default_env()
        .init();
}

#[derive(Parser, Debug)]
#[command(
    name = "mbz2zip",
    about = "Convert Moodle course backups into browsable ZIP archives",
    long_about = "Convert Moodle course backups (.mbz) into browsable ZIP archives.\n\
                  \n\
                  Accepts backups packed as ZIP or as gzip-compressed TAR.",
    version
)]
struct Args {
    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Show detailed processing information
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert a backup into a browsable ZIP archive
    #[command(long_about = "Convert a Moodle backup into a browsable ZIP archive.\n\
                      \n\
                      Sections become numbered folders (newest first); activities become\n\
                      files or subfolders named after the activity.")]
    Convert {
        /// Backup file (.mbz)
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output ZIP path (default: INPUT with .zip extension)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Overwrite the output file if it exists
        #[arg(short, long)]
        force: bool,

        /// Entry compression: deflated or stored
        #[arg(long, value_name = "METHOD", value_parser = parse_compression)]
        compression: Option<Compression>,
    },

    /// Show the sections and activities a backup contains
    Info {
        /// Backup file (.mbz)
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

fn parse_compression(s: &str) -> std::result::Result<Compression, String> {
    s.parse()
}

fn main() -> Result<()> {
    let args = Args::parse();
    let verbosity = Verbosity::from_flags(args.quiet, args.verbose);
    init_logging(verbosity);

    let (user_config, project_config) = Config::discover_configs();
    let config = Config::merge(user_config, project_config);

    match args.command {
        Commands::Convert {
            input,
            output,
            force,
            compression,
        } => {
            let defaults = config.convert_defaults();
            let compression = match (compression, defaults.compression.as_deref()) {
                (Some(compression), _) => compression,
                (None, Some(name)) => name
                    .parse()
                    .map_err(|e: String| anyhow::anyhow!("Invalid config: {e}"))?,
                (None, None) => Compression::default(),
            };
            let force = force || defaults.force.unwrap_or(false);
            let output = output.unwrap_or_else(|| {
                smart_output_path(&input, defaults.output_dir.as_deref())
            });

            run_convert(&input, &output, force, compression, verbosity)
        }
        Commands::Info { input, json } => run_info(&input, json),
    }
}

fn read_backup(input: &Path) -> Result<Vec<u8>> {
    if !input.exists() {
        bail!("File not found: {}", input.display());
    }
    fs::read(input).with_context(|| format!("Failed to read {}", input.display()))
}

fn run_convert(
    input: &Path,
    output: &Path,
    force: bool,
    compression: Compression,
    verbosity: Verbosity,
) -> Result<()> {
    if output.exists() && !force {
        bail!(
            "Output file already exists: {} (use --force to overwrite)",
            output.display()
        );
    }

    let backup = read_backup(input)?;
    let zip = mbz_core::convert(&backup, &BuildOptions { compression })
        .with_context(|| format!("Failed to convert {}", input.display()))?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    fs::write(output, &zip).with_context(|| format!("Failed to write {}", output.display()))?;

    if verbosity.should_show_output() {
        println!(
            "{} {} -> {} ({})",
            "Converted".green().bold(),
            input.display(),
            output.display(),
            format_bytes(zip.len())
        );
    }
    Ok(())
}

fn run_info(input: &Path, json: bool) -> Result<()> {
    let backup = read_backup(input)?;
    let course = mbz_core::read_course(&backup)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let summary = CourseSummary::from_course(&course);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!(
        "{} {} sections, {} activities, {} files ({})",
        "Course:".bold(),
        summary.sections.len(),
        summary.activity_count,
        summary.file_count,
        format_bytes(summary.total_file_bytes)
    );
    for (position, section) in summary.sections.iter().enumerate() {
        println!("{}", format!("{}_{}", position + 1, section.name).cyan().bold());
        for activity in &section.activities {
            if activity.resolved {
                println!(
                    "  {:<40} {:<9} {} file(s){}",
                    activity.display_name,
                    activity.activity_type.to_string(),
                    activity.file_count,
                    if activity.has_description { ", description" } else { "" }
                );
            } else {
                println!(
                    "  {} activity {} is missing from the backup",
                    "!".red().bold(),
                    activity.id
                );
            }
        }
    }
    Ok(())
}
