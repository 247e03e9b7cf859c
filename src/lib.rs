//! dupscan - Fast Duplicate File Finder
//!
//! Walks one or more directory trees concurrently and groups files by
//! basename, size and an XxHash64 fingerprint of their first 512 KiB.
//!
//! The library can be used without the binary:
//!
//! ```no_run
//! use dupscan::duplicates::{DuplicateFinder, FinderConfig, KeyFields};
//!
//! let finder = DuplicateFinder::new(FinderConfig::default().with_key_fields(KeyFields::content()));
//! let report = finder.find_duplicates(&["."]).unwrap();
//! println!("{} duplicate bytes", report.summary.duplicate_bytes);
//! ```

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::Context;
use bytesize::ByteSize;
use yansi::Paint;

use crate::cli::Cli;
use crate::config::Config;
use crate::duplicates::{DuplicateFinder, ScanReport};
use crate::error::ExitCode;
use crate::output::TextOutput;
use crate::progress::Progress;

/// Run the application for parsed command-line arguments.
///
/// # Errors
///
/// Returns an error for invalid options, a scan that could not be started
/// or a report that could not be saved. Unreadable files and directories
/// are not errors; they show up in the exit code.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);
    if cli.no_color {
        yansi::disable();
    }

    let mut config = Config::load_from_path(cli.config.as_deref());
    config.merge_cli(&cli);

    let mut finder_config = config
        .to_finder_config()
        .context("Invalid compare fields")?;
    if !cli.no_progress && !cli.quiet {
        finder_config = finder_config.with_progress_callback(Arc::new(Progress::new(false)));
    }
    log::debug!("Finder configuration: {:?}", finder_config);

    let roots = config.scan_roots();
    let report = DuplicateFinder::new(finder_config)
        .find_duplicates(&roots)
        .context("Scan failed")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if cli.list {
        TextOutput::new(&report.groups)
            .write_to(&mut out)
            .context("Failed to print duplicate list")?;
    }
    print_summary(&mut out, &report).context("Failed to print summary")?;

    if let Some(path) = &cli.save_to {
        output::save_report(path, cli.format, &report)
            .with_context(|| format!("Failed to save report to {}", path.display()))?;
    }

    Ok(ExitCode::for_report(&report))
}

fn print_summary<W: Write>(out: &mut W, report: &ScanReport) -> io::Result<()> {
    let summary = &report.summary;

    writeln!(
        out,
        "Scanned {} files of total {}",
        summary.total_files.bold(),
        ByteSize::b(summary.total_bytes).bold()
    )?;
    writeln!(out)?;

    let duplicated = format!(
        "{} files ({}) are duplicated",
        summary.duplicate_files,
        ByteSize::b(summary.duplicate_bytes)
    );
    if summary.has_duplicates() {
        writeln!(out, "{}", duplicated.yellow())?;
    } else {
        writeln!(out, "{}", duplicated.green())?;
    }

    if report.is_partial() {
        writeln!(
            out,
            "{}",
            format!("{} files or directories could not be read", report.errors.len()).red()
        )?;
    }

    writeln!(out)?;
    writeln!(out, "Done. used {:.2?}", report.duration)
}
