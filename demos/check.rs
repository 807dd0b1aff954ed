use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use color_eyre::eyre::WrapErr;
use log::{debug, info};

use symex_rs::check_source_with;
use symex_rs::config::{EngineConfig, UnboundRead};

#[derive(Debug, Copy, Clone, ValueEnum)]
enum Unbound {
    /// An unassigned variable may hold any value.
    Any,
    /// An unassigned variable reads as 0.
    Zero,
}

impl From<Unbound> for UnboundRead {
    fn from(value: Unbound) -> Self {
        match value {
            Unbound::Any => UnboundRead::Unconstrained,
            Unbound::Zero => UnboundRead::Zero,
        }
    }
}

#[derive(Debug, Parser)]
#[command(author, version, about = "Check the assertion of each program")]
struct Cli {
    /// Program files, or directories to scan (non-recursively).
    #[arg(value_name = "PATH", required = true)]
    paths: Vec<PathBuf>,

    /// Maximum number of live paths (0 for no limit).
    #[arg(long, value_name = "INT", default_value_t = EngineConfig::DEFAULT_MAX_PATHS)]
    max_paths: usize,

    /// How variables read before assignment are treated.
    #[arg(long, value_enum, default_value = "any")]
    unbound: Unbound,

    /// Write results to this file instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Log engine decisions.
    #[arg(short, long)]
    verbose: bool,
}

/// Expands directories into the files they contain, sorted by name.
fn collect_files(paths: &[PathBuf]) -> color_eyre::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut entries = Vec::new();
            for entry in fs::read_dir(path).wrap_err_with(|| format!("reading {}", path.display()))? {
                let entry = entry?.path();
                if entry.is_file() {
                    entries.push(entry);
                }
            }
            entries.sort();
            files.extend(entries);
        } else {
            files.push(path.clone());
        }
    }
    Ok(files)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Cli::parse();

    simplelog::TermLogger::init(
        if args.verbose {
            simplelog::LevelFilter::Debug
        } else {
            simplelog::LevelFilter::Info
        },
        simplelog::Config::default(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )?;
    debug!("args = {:?}", args);

    let config = EngineConfig::default()
        .with_max_paths((args.max_paths > 0).then_some(args.max_paths))
        .with_unbound(args.unbound.into());

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(fs::File::create(path).wrap_err_with(|| format!("creating {}", path.display()))?),
        None => Box::new(std::io::stdout().lock()),
    };

    let time_total = std::time::Instant::now();
    let files = collect_files(&args.paths)?;
    let mut failing = 0;
    for path in &files {
        let name = file_name(path);
        // A failure in one program is reported on its line and does not stop the rest.
        let line = match fs::read_to_string(path) {
            Ok(source) => match check_source_with(&source, config.clone()) {
                Ok(verdict) => {
                    if verdict.can_fail() {
                        failing += 1;
                    }
                    verdict.to_string()
                }
                Err(e) => e.to_string(),
            },
            Err(e) => format!("cannot read file: {}", e),
        };
        writeln!(out, "{}: {}", name, line)?;
    }
    out.flush()?;

    info!(
        "Checked {} files ({} with a failing assertion) in {:.3} s",
        files.len(),
        failing,
        time_total.elapsed().as_secs_f64()
    );
    Ok(())
}
