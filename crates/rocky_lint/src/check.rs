//! Check command - Type check Rocky.js watchface scripts
//!
//! Stages the scripts next to the Rocky.js declaration file, runs the
//! TypeScript compiler through node and reports what it finds.

use clap::Args;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use rocky_canon::{
    check_workspace, format_summary, CanonResult, CheckOptions, CompilerOptions, ExitStatus,
    NodeChecker, NodeCheckerConfig, PresentOptions, Style, SuppressionPolicy, Tag, Workspace,
};

use crate::config::load_config;

#[derive(Args, Debug, Default)]
pub struct CheckArgs {
    /// JavaScript or TypeScript files to check
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,

    /// Declaration file to check against (repeatable, replaces the bundled one)
    #[arg(short = 'd', long = "definition", value_name = "PATH")]
    pub definitions: Vec<PathBuf>,

    /// Show the offending source line under each diagnostic
    #[arg(long)]
    pub pretty: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Fail when there are more warnings than this
    #[arg(long, value_name = "N")]
    pub max_warnings: Option<usize>,

    /// Config file (defaults to ./rocky-lint.config.json)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Settings after merging the config file under the command line.
#[derive(Debug)]
struct Settings {
    definitions: Vec<PathBuf>,
    check: CheckOptions,
    checker: NodeCheckerConfig,
}

fn resolve_settings(args: &CheckArgs, cwd: PathBuf) -> Settings {
    let color = !args.no_color;
    let config = load_config(args.config.as_deref(), &cwd, &Style::new(color)).check;

    let definitions = if args.definitions.is_empty() {
        config.definitions
    } else {
        args.definitions.clone()
    };

    let suppression = if config.suppress_object_literal_property {
        SuppressionPolicy::ObjectLiteralProperty
    } else {
        SuppressionPolicy::None
    };

    Settings {
        definitions,
        check: CheckOptions {
            compiler: CompilerOptions::default(),
            present: PresentOptions {
                pretty: args.pretty || config.pretty,
                color,
                suppression,
            },
            max_warnings: args.max_warnings.or(config.max_warnings),
        },
        checker: NodeCheckerConfig {
            node: config.node,
            typescript: config.typescript,
            search_root: cwd,
        },
    }
}

pub fn run(args: CheckArgs) -> CanonResult<ExitStatus> {
    let start = Instant::now();
    let settings = resolve_settings(&args, std::env::current_dir()?);
    tracing::debug!(?settings, "resolved settings");

    let workspace =
        Workspace::stage(&args.files, &settings.definitions, &settings.check.compiler)?;
    tracing::info!("workspace: {}", workspace.root().display());
    for file in workspace.files() {
        tracing::info!("staged {} ({:?})", file.checker_name, file.source);
    }

    // Locate the toolchain relative to the launch directory, then move in.
    let checker = NodeChecker::new(&settings.checker)?;
    workspace.enter()?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let outcome = check_workspace(&checker, &workspace, &settings.check, &mut out)?;
    out.flush()?;

    let style = Style::new(settings.check.present.color);
    eprintln!();
    eprintln!(
        "{} {}",
        format_summary(outcome.stats.errors, outcome.stats.warnings),
        style.paint(Tag::Muted, &format!("({:.2?})", start.elapsed()))
    );
    eprintln!("{}", outcome.verdict.message(&style));

    Ok(outcome.verdict.exit_status())
}
