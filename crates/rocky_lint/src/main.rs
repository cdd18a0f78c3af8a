//! # rocky-lint
//!
//! Checks Rocky.js watchface scripts against the Rocky.js API declarations
//! using the TypeScript compiler, and reports calls into APIs the watch
//! runtime does not implement.

mod check;
mod config;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use tracing::level_filters::LevelFilter;

use rocky_canon::{CanonError, ExitStatus, Style, Tag};

#[derive(Parser, Debug)]
#[command(name = "rocky-lint")]
#[command(about = "Check Rocky.js watchface scripts against the Rocky.js API", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(flatten)]
    check: check::CheckArgs,
}

fn init_logging(verbose: u8, color: bool) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_ansi(color)
        .with_target(false)
        .init();
}

fn print_usage_help() {
    println!();
    // Nothing useful left to report if stdout is gone
    let _ = Cli::command().print_help();
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                let _ = e.print();
                std::process::exit(ExitStatus::Success.code());
            }
            _ => {
                let _ = e.print();
                print_usage_help();
                std::process::exit(ExitStatus::Usage.code());
            }
        },
    };

    let color = !cli.check.no_color;
    init_logging(cli.verbose, color);
    let style = Style::new(color);

    let status = match check::run(cli.check) {
        Ok(status) => status,
        Err(e) if e.is_usage() => {
            eprintln!("{} {}", style.paint(Tag::Error, "Error:"), e);
            print_usage_help();
            ExitStatus::Usage
        }
        Err(CanonError::CheckerNotFound(e)) => {
            tracing::error!(
                "checker unavailable: {:?} not found (package manager: {:?})",
                e.missing(),
                e.detected_package_manager()
            );
            eprintln!("{}", e.display_message());
            ExitStatus::Fault
        }
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("{} {}", style.paint(Tag::Error, "Error:"), e);
            ExitStatus::Fault
        }
    };

    std::process::exit(status.code());
}
