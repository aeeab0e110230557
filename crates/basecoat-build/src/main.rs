//! Basecoat build - produce the CLI and CSS packages from the component sources

use anyhow::Result;
use basecoat_core::build::tools::{DEFAULT_LAUNCHER, LAUNCHER_ENV};
use basecoat_core::{BuildLayout, Builder, NpxTools};
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "basecoat-build")]
#[command(about = "Build the Basecoat CLI and CSS packages")]
#[command(version)]
pub struct Args {
    /// Repository root containing src/ and packages/
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Launcher used to run terser and tailwindcss
    #[arg(long, env = LAUNCHER_ENV, default_value = DEFAULT_LAUNCHER)]
    pub npx: String,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[tokio::main]
async fn main() {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

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
        .without_time()
        .init();

    if let Err(e) = build(args).await {
        eprintln!();
        eprintln!("{} {:#}", "Build failed:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn build(args: Args) -> Result<()> {
    let layout = BuildLayout::from_root(&args.root);
    let builder = Builder::new(layout, NpxTools::new(args.npx));
    let summary = builder.run().await?;

    println!(
        "{} bundle: {}",
        "->".blue(),
        summary.bundle.join(", ")
    );
    println!("{}", "Build process finished successfully!".green().bold());
    Ok(())
}
