use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::LevelFilter;

use covxml::mapping::CoverageStore;
use covxml::report::XmlExporter;
use covxml::{cli, ingest};

/// covxml — Convert llvm-cov JSON exports into Cobertura XML.
#[derive(Parser)]
#[command(name = "covxml", version, about)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a Cobertura XML report.
    Export {
        /// Path to the `llvm-cov export -format=text` JSON file.
        input: PathBuf,

        /// Output file (default: stdout).
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip source files whose names match this regular expression.
        #[arg(long = "ignore-filename-regex")]
        ignore: Vec<String>,

        /// Export only these source files, in this order.
        #[arg(long = "source")]
        sources: Vec<String>,
    },

    /// Show per-file and total coverage.
    Summary {
        /// Path to the `llvm-cov export -format=text` JSON file.
        input: PathBuf,

        /// Skip source files whose names match this regular expression.
        #[arg(long = "ignore-filename-regex")]
        ignore: Vec<String>,

        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    match cli.command {
        Commands::Export {
            input,
            output,
            ignore,
            sources,
        } => export(&input, output.as_deref(), &ignore, &sources),
        Commands::Summary {
            input,
            ignore,
            json,
        } => summary(&input, &ignore, json),
    }
}

fn init_logging(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!("[{}] {}", record.level(), message))
        })
        .level(level)
        .chain(io::stderr())
        .apply()
        .context("Failed to initialize logging")?;
    Ok(())
}

fn load(input: &Path) -> Result<CoverageStore> {
    ingest::load(input).with_context(|| format!("Failed to load {}", input.display()))
}

fn export(input: &Path, output: Option<&Path>, ignore: &[String], sources: &[String]) -> Result<()> {
    let store = load(input)?;
    let files = cli::select_files(&store, ignore, sources)?;
    let exporter = XmlExporter::new();

    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let status = cli::cmd_export(&store, &files, &exporter, &mut BufWriter::new(file))
                .context("Failed to write XML report")?;
            eprint!("{status}");
        }
        None => {
            cli::cmd_export(&store, &files, &exporter, &mut BufWriter::new(io::stdout().lock()))
                .context("Failed to write XML report")?;
        }
    }
    Ok(())
}

fn summary(input: &Path, ignore: &[String], json: bool) -> Result<()> {
    let store = load(input)?;
    let files = cli::select_files(&store, ignore, &[])?;
    print!("{}", cli::cmd_summary(&store, &files, json)?);
    Ok(())
}
