//! sheetmerge: merge Excel workbooks sheet-wise from an interactive picker

mod excel;
mod merge;
mod tui;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Result, bail};
use clap::Parser;
use colored::Colorize;
use is_terminal::IsTerminal;

/// Merge Excel workbooks sheet-wise
///
/// Sheets sharing a name across multi-sheet workbooks are concatenated into
/// one output sheet each; single-sheet workbooks are pooled into one sheet
/// with a SourceFile column.
#[derive(Debug, Parser)]
#[command(name = "sheetmerge-cli", version, about)]
struct Args {
    /// Workbook files to preload into the upload list
    paths: Vec<PathBuf>,

    /// Directory the merged workbook is saved into
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Number of rows shown per merged sheet in the preview
    #[arg(long, default_value_t = 5)]
    preview_rows: usize,
}

fn main() -> ExitCode {
    // stderr logging would corrupt the alternate screen, so nothing is
    // emitted unless RUST_LOG asks for it (e.g. RUST_LOG=debug 2>log)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("off")).init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {:#}", "error:".red().bold(), err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    if !std::io::stdout().is_terminal() {
        bail!("sheetmerge-cli is interactive and needs a terminal");
    }

    for path in &args.paths {
        if !path.is_file() {
            bail!("not a file: {}", path.display());
        }
        if !tui::is_workbook(path) {
            bail!(
                "not a workbook (expected .xls or .xlsx): {}",
                path.display()
            );
        }
    }

    if !args.output_dir.is_dir() {
        bail!("output directory does not exist: {}", args.output_dir.display());
    }

    tui::run(tui::Options {
        preload: args.paths,
        output_dir: args.output_dir,
        preview_rows: args.preview_rows,
    })
}
