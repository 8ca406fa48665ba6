//! `blueprint` renders a directory of templates into an output directory.
use anyhow::{Context as _, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod context;
mod ctx;
mod prompt;
mod render;
mod util;

use ctx::Ctx;
use prompt::{LinePrompter, NoInput, Prompter};
use render::{FailurePolicy, report::TermReporter};

#[derive(Parser)]
#[command(
    name = "blueprint",
    version,
    about = "Render a directory of templates into an output directory"
)]
struct Cli {
    /// Root of the template tree
    #[arg(short = 'i', long, env = "BLUEPRINT_TEMPLATES_DIR", default_value = "templates")]
    templates_dir: PathBuf,

    /// Root of the generated tree
    #[arg(short = 'o', long, env = "BLUEPRINT_OUTPUT_DIR", default_value = "output")]
    output_dir: PathBuf,

    /// JSON file with template variables
    #[arg(short = 'c', long, env = "BLUEPRINT_CONTEXT", default_value = "context.json")]
    context: PathBuf,

    /// What to do when a template fails to render
    #[arg(long, value_enum, default_value_t = FailurePolicy::Continue)]
    on_error: FailurePolicy,

    /// Never prompt; empty context values are an error
    #[arg(long)]
    no_input: bool,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let ctx = Ctx::new(cli.templates_dir, cli.output_dir, cli.context);
    info!(?ctx, policy = ?cli.on_error, "starting");

    let mut prompter: Box<dyn Prompter> = if cli.no_input {
        Box::new(NoInput)
    } else {
        Box::new(LinePrompter::stdio())
    };
    let vars = context::load(&ctx.context_path, prompter.as_mut()).context("load context")?;
    info!(keys = vars.len(), "context ready");

    let summary = render::render_all(&ctx, &vars, cli.on_error, &mut TermReporter)
        .context("render templates")?;
    info!(%summary, "done");

    Ok(())
}

/// Logs go to stderr so they never mix with the per-file report.
fn setup_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}
