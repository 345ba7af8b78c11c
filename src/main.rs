//! Command-line interface for fginspect

#[cfg(feature = "cli")]
use clap::error::ErrorKind;
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
use fginspect::{Environment, ReportGenerator};

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(name = "fginspect")]
#[command(
    author,
    version,
    about = "Inspect an ESRI File Geodatabase and write a schema report",
    long_about = None
)]
struct Cli {
    /// Path to the file geodatabase directory
    #[arg(value_name = "FILEGDB")]
    filegdb: PathBuf,
}

#[cfg(feature = "cli")]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(_) => {
            eprintln!("Usage: fginspect filegdb");
            std::process::exit(1);
        }
    };

    if !cli.filegdb.is_dir() {
        eprintln!("The File geodatabase is missing...");
        std::process::exit(1);
    }

    if let Err(e) = cmd_inspect(cli.filegdb) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(feature = "cli")]
fn cmd_inspect(filegdb: PathBuf) -> fginspect::Result<()> {
    let generator = ReportGenerator::open(Environment::new(filegdb))?;
    let report = generator.process()?;
    log::info!("Report written to {}", report.display());
    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Rebuild with --features cli");
    std::process::exit(1);
}
