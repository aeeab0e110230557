//! Basecoat CLI - add Basecoat components to your project

use anyhow::Result;
use basecoat_core::tui::AddArgs;
use basecoat_core::TemplateEngine;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "basecoat-cli")]
#[command(about = "Add Basecoat components to your project")]
#[command(version)]
pub struct Args {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add one or more Basecoat components to your project
    Add(CliAddArgs),
}

#[derive(Parser, Debug)]
pub struct CliAddArgs {
    /// Names of components to add (e.g., dialog select)
    pub components: Vec<String>,

    /// Directory holding the bundled component assets (for development use)
    #[arg(long = "assets-dir", env = "BASECOAT_ASSETS_DIR")]
    pub assets_dir: Option<PathBuf>,

    /// Template engine used by the project
    #[arg(short, long, value_enum)]
    pub engine: Option<TemplateEngine>,

    /// Where template files should be placed
    #[arg(long = "template-dest")]
    pub template_dest: Option<PathBuf>,

    /// Where script files should be placed
    #[arg(long = "script-dest")]
    pub script_dest: Option<PathBuf>,

    /// Accept defaults for every question (non-interactive mode)
    #[arg(short, long)]
    pub yes: bool,
}

impl From<CliAddArgs> for AddArgs {
    fn from(args: CliAddArgs) -> Self {
        AddArgs {
            components: args.components,
            assets_dir: args.assets_dir,
            engine: args.engine,
            template_dest: args.template_dest,
            script_dest: args.script_dest,
            yes: args.yes,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    match args.command {
        Command::Add(add_args) => {
            let result = basecoat_core::run(add_args.into()).await;

            // Ensure cursor is visible on normal exit
            let _ = console::Term::stderr().show_cursor();

            result.map_err(Into::into)
        }
    }
}
