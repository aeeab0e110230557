//! Charm-style CLI prompts using cliclack

use crate::catalog::{Catalog, TemplateEngine};
use crate::error::{Error, Result};
use crate::install::{
    self, AddRequest, AutoPrompter, ComponentOutcome, ConfigOverrides, DestinationConfig,
    InstallReport, Prompter, Selection,
};
use std::path::PathBuf;

/// CLI arguments for the add command
#[derive(Debug, Clone, Default)]
pub struct AddArgs {
    /// Names of components to add; prompt when empty
    pub components: Vec<String>,

    /// Bundled assets to install from instead of the ones next to the binary
    pub assets_dir: Option<PathBuf>,

    /// Template engine used by the project
    pub engine: Option<TemplateEngine>,

    /// Where template files are placed
    pub template_dest: Option<PathBuf>,

    /// Where script files are placed
    pub script_dest: Option<PathBuf>,

    /// Accept defaults instead of prompting (non-interactive mode)
    pub yes: bool,
}

impl AddArgs {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            template_engine: self.engine,
            template_dest: self.template_dest.clone(),
            script_dest: self.script_dest.clone(),
        }
    }
}

/// Asks the installer's questions in the terminal
#[derive(Debug, Clone, Copy, Default)]
pub struct ClackPrompter;

/// Map a cliclack failure, telling Esc/Ctrl+C apart from real errors
fn prompt_error(e: std::io::Error) -> Error {
    if e.kind() == std::io::ErrorKind::Interrupted {
        Error::Cancelled
    } else {
        Error::Prompt(e)
    }
}

impl Prompter for ClackPrompter {
    fn select_component(&mut self, components: &[String]) -> Result<Selection> {
        let mut select = cliclack::select("Which component(s) would you like to add?")
            .item(Selection::All, "All components", "");
        for name in components {
            select = select.item(Selection::One(name.clone()), name, "");
        }
        select.interact().map_err(prompt_error)
    }

    fn select_engine(&mut self) -> Result<TemplateEngine> {
        let mut select = cliclack::select("Which template engine are you using?");
        for engine in TemplateEngine::ALL {
            select = select.item(engine, engine.dir_name(), engine.display_name());
        }
        select.interact().map_err(prompt_error)
    }

    fn input(&mut self, message: &str, default: &str) -> Result<String> {
        cliclack::input(message)
            .placeholder(default)
            .default_input(default)
            .interact()
            .map_err(prompt_error)
    }
}

/// Run the add command with interactive prompts
///
/// Cancelling a prompt is reported and treated as a normal exit.
pub async fn run(args: AddArgs) -> Result<()> {
    cliclack::intro("Basecoat").map_err(Error::Prompt)?;

    match add_components(&args).await {
        Ok(report) => finish(&report),
        Err(Error::Cancelled) => {
            cliclack::outro_cancel("Operation cancelled by user.").map_err(Error::Prompt)?;
            Ok(())
        }
        Err(e) => Err(e),
    }
}

async fn add_components(args: &AddArgs) -> Result<InstallReport> {
    let project_root =
        std::env::current_dir().map_err(|e| Error::io("locate", "current directory", e))?;
    let assets_dir = install::resolve_assets_dir(args.assets_dir.clone())?;

    let mut config = DestinationConfig::default();
    if let Some(file) = ConfigOverrides::load(&project_root)? {
        cliclack::log::info(format!("Using {}", install::config::CONFIG_FILE))
            .map_err(Error::Prompt)?;
        config = config.with_overrides(&file);
    }
    let config = config.with_overrides(&args.overrides());

    let request = AddRequest {
        components: args.components.clone(),
        catalog: Catalog::new(assets_dir),
        project_root,
        config,
    };

    if args.yes {
        install::add(&request, &mut AutoPrompter, log_outcome).await
    } else {
        install::add(&request, &mut ClackPrompter, log_outcome).await
    }
}

fn log_outcome(outcome: &ComponentOutcome) -> Result<()> {
    match outcome {
        ComponentOutcome::Installed(installed) => {
            cliclack::log::success(format!(
                "{}\n-> Copied template to: {}\n-> Copied script to:   {}",
                installed.name,
                installed.template.display(),
                installed.script.display()
            ))
            .map_err(Error::Prompt)?;
        }
        ComponentOutcome::Skipped { missing, .. } => {
            for asset in missing {
                cliclack::log::error(format!("Error: {}", asset)).map_err(Error::Prompt)?;
            }
        }
    }
    Ok(())
}

fn finish(report: &InstallReport) -> Result<()> {
    let installed = report.installed().count();
    let skipped = report.outcomes.len() - installed;

    if skipped > 0 {
        cliclack::log::warning(format!(
            "{} component(s) skipped because of missing files",
            skipped
        ))
        .map_err(Error::Prompt)?;
    }

    cliclack::outro("Component addition process finished.").map_err(Error::Prompt)?;
    Ok(())
}
