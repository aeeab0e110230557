//! Installing components into a consumer project
//!
//! An `add` run moves through selection, configuration and installation:
//!
//! - selection: explicit names are taken as given, otherwise the user picks
//!   one component (or all) from the catalog
//! - configuration: engine and destinations are prompted for only while unset
//! - installation: each component is copied as a template + script pair, or
//!   skipped entirely when either file is missing from the catalog
//!
//! A cancelled prompt ends the run with [`Error::Cancelled`].

pub mod config;
pub mod prompter;

use crate::catalog::{self, Catalog};
use crate::error::{Error, Result};
use crate::fsutil;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

pub use config::{ConfigOverrides, DestinationConfig, ResolvedConfig};
pub use prompter::{AutoPrompter, Prompter, Selection};

/// Environment variable pointing at the bundled assets
pub const ASSETS_DIR_ENV: &str = "BASECOAT_ASSETS_DIR";

/// Locate the bundled assets: explicit path, then `BASECOAT_ASSETS_DIR`,
/// then `assets/` next to the running executable
pub fn resolve_assets_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir);
    }
    if let Ok(dir) = std::env::var(ASSETS_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }

    let exe = std::env::current_exe()
        .map_err(|e| Error::io("locate", "current executable", e))?;
    let dir = exe.parent().unwrap_or_else(|| Path::new("."));
    Ok(dir.join("assets"))
}

/// Which of a component's two files is meant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Template,
    Script,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetKind::Template => write!(f, "Template"),
            AssetKind::Script => write!(f, "Script"),
        }
    }
}

/// A catalog file that a requested component needs but does not have
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingAsset {
    pub component: String,
    pub kind: AssetKind,
    pub path: PathBuf,
}

impl fmt::Display for MissingAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} file for component '{}' not found in CLI assets. Searched: {}",
            self.kind,
            self.component,
            self.path.display()
        )
    }
}

/// Files written for one installed component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledComponent {
    pub name: String,
    pub template: PathBuf,
    pub script: PathBuf,
}

/// Result of installing one component
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentOutcome {
    Installed(InstalledComponent),
    /// Nothing was copied; lists every missing source file
    Skipped {
        name: String,
        missing: Vec<MissingAsset>,
    },
}

impl ComponentOutcome {
    pub fn name(&self) -> &str {
        match self {
            ComponentOutcome::Installed(installed) => &installed.name,
            ComponentOutcome::Skipped { name, .. } => name,
        }
    }
}

/// Everything an install run did, in selection order
#[derive(Debug, Clone, Default)]
pub struct InstallReport {
    pub config: Option<ResolvedConfig>,
    pub outcomes: Vec<ComponentOutcome>,
}

impl InstallReport {
    pub fn installed(&self) -> impl Iterator<Item = &InstalledComponent> {
        self.outcomes.iter().filter_map(|o| match o {
            ComponentOutcome::Installed(installed) => Some(installed),
            ComponentOutcome::Skipped { .. } => None,
        })
    }

    pub fn missing(&self) -> impl Iterator<Item = &MissingAsset> {
        self.outcomes.iter().flat_map(|o| match o {
            ComponentOutcome::Installed(_) => &[] as &[MissingAsset],
            ComponentOutcome::Skipped { missing, .. } => missing.as_slice(),
        })
    }
}

/// Decide which components to install
///
/// Explicit names are returned untouched; their existence is checked per
/// component at install time.
pub async fn resolve_selection<P: Prompter>(
    requested: &[String],
    catalog: &Catalog,
    prompter: &mut P,
) -> Result<Vec<String>> {
    if !requested.is_empty() {
        return Ok(requested.to_vec());
    }

    let available = catalog.components().await;
    if available.is_empty() {
        return Err(Error::EmptyCatalog {
            dir: catalog.script_dir(),
        });
    }

    match prompter.select_component(&available)? {
        Selection::All => Ok(available),
        Selection::One(name) => Ok(vec![name]),
    }
}

/// Copies component files from a catalog into a project
#[derive(Debug, Clone)]
pub struct Installer {
    catalog: Catalog,
    project_root: PathBuf,
    config: ResolvedConfig,
}

impl Installer {
    pub fn new(catalog: Catalog, project_root: impl Into<PathBuf>, config: ResolvedConfig) -> Self {
        Self {
            catalog,
            project_root: project_root.into(),
            config,
        }
    }

    /// Destination directory for templates, resolved against the project root
    pub fn template_dir(&self) -> PathBuf {
        self.project_root.join(&self.config.template_dest)
    }

    /// Destination directory for scripts, resolved against the project root
    pub fn script_dir(&self) -> PathBuf {
        self.project_root.join(&self.config.script_dest)
    }

    /// Install one component's template and script, or neither
    ///
    /// Missing sources are reported in the outcome. Failures while copying
    /// are returned as errors.
    pub async fn install_component(&self, name: &str) -> Result<ComponentOutcome> {
        let engine = self.config.engine;
        let template_src = self.catalog.template_path(name, engine);
        let script_src = self.catalog.script_path(name);

        let mut missing = Vec::new();
        for (kind, path) in [
            (AssetKind::Template, &template_src),
            (AssetKind::Script, &script_src),
        ] {
            if !path_exists(path).await? {
                missing.push(MissingAsset {
                    component: name.to_string(),
                    kind,
                    path: path.clone(),
                });
            }
        }
        if !missing.is_empty() {
            debug!(component = name, missing = missing.len(), "skipping component");
            return Ok(ComponentOutcome::Skipped {
                name: name.to_string(),
                missing,
            });
        }

        let template_dir = self.template_dir();
        let script_dir = self.script_dir();
        fsutil::ensure_dir(&template_dir).await?;
        fsutil::ensure_dir(&script_dir).await?;

        let template = template_dir.join(engine.template_file(name));
        let script = script_dir.join(catalog::script_file(name));
        fsutil::copy_file(&template_src, &template).await?;
        fsutil::copy_file(&script_src, &script).await?;

        Ok(ComponentOutcome::Installed(InstalledComponent {
            name: name.to_string(),
            template,
            script,
        }))
    }
}

async fn path_exists(path: &Path) -> Result<bool> {
    tokio::fs::try_exists(path)
        .await
        .map_err(|e| Error::io("inspect", path, e))
}

/// Inputs of an `add` run
#[derive(Debug, Clone)]
pub struct AddRequest {
    /// Component names given on the command line
    pub components: Vec<String>,
    /// Bundled assets of the CLI package
    pub catalog: Catalog,
    /// Directory destination paths are resolved against
    pub project_root: PathBuf,
    /// Starting configuration, before prompting
    pub config: DestinationConfig,
}

/// Run selection, configuration and installation in order
///
/// `on_outcome` is called as soon as each component has been handled; an error
/// from it stops the run.
pub async fn add<P, F>(request: &AddRequest, prompter: &mut P, mut on_outcome: F) -> Result<InstallReport>
where
    P: Prompter,
    F: FnMut(&ComponentOutcome) -> Result<()>,
{
    let selected = resolve_selection(&request.components, &request.catalog, prompter).await?;
    let resolved = request.config.clone().resolve(prompter)?;
    debug!(?selected, ?resolved, "install plan");

    let installer = Installer::new(
        request.catalog.clone(),
        request.project_root.clone(),
        resolved.clone(),
    );

    let mut report = InstallReport {
        config: Some(resolved),
        outcomes: Vec::with_capacity(selected.len()),
    };
    for name in &selected {
        let outcome = installer.install_component(name).await?;
        on_outcome(&outcome)?;
        report.outcomes.push(outcome);
    }

    Ok(report)
}
