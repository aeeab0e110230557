//! Component catalog: which components exist and where their assets live
//!
//! The set of script file stems in the script directory is the authoritative
//! list of component names. Template files are looked up per engine.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// Directory holding `<component>.js` files, both in sources and built assets
pub const SCRIPT_DIR: &str = "js";

/// Extension of component scripts
pub const SCRIPT_EXT: &str = ".js";

/// Suffix of minified scripts produced by the build
pub const MINIFIED_SUFFIX: &str = ".min";

/// Stem of the combined bundle files (`all.js`, `all.min.js`)
pub const BUNDLE_STEM: &str = "all";

/// Supported template engines
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum TemplateEngine {
    Nunjucks,
    Jinja,
}

impl TemplateEngine {
    pub const ALL: [TemplateEngine; 2] = [TemplateEngine::Nunjucks, TemplateEngine::Jinja];

    /// Directory name holding this engine's templates
    pub fn dir_name(&self) -> &'static str {
        match self {
            TemplateEngine::Nunjucks => "nunjucks",
            TemplateEngine::Jinja => "jinja",
        }
    }

    /// File extension of a component template, including the leading dot
    pub fn extension(&self) -> &'static str {
        match self {
            TemplateEngine::Nunjucks => ".njk",
            TemplateEngine::Jinja => ".html.jinja",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            TemplateEngine::Nunjucks => "Nunjucks",
            TemplateEngine::Jinja => "Jinja",
        }
    }

    /// Template file name for a component
    pub fn template_file(&self, component: &str) -> String {
        format!("{}{}", component, self.extension())
    }
}

impl fmt::Display for TemplateEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dir_name())
    }
}

/// Script file name for a component
pub fn script_file(component: &str) -> String {
    format!("{}{}", component, SCRIPT_EXT)
}

/// Component name for a script file name, if it names a component
///
/// Minified siblings and the combined bundles are build outputs, not
/// components, so they are rejected.
pub fn component_name(file_name: &str) -> Option<&str> {
    let stem = file_name.strip_suffix(SCRIPT_EXT)?;
    if stem.is_empty() || stem.ends_with(MINIFIED_SUFFIX) || stem == BUNDLE_STEM {
        return None;
    }
    Some(stem)
}

/// Read component names from a script directory, sorted by name
pub async fn read_components(script_dir: &Path) -> Result<Vec<String>> {
    let mut entries = fs::read_dir(script_dir)
        .await
        .map_err(|e| Error::io("read directory", script_dir, e))?;

    let mut names = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| Error::io("read directory", script_dir, e))?
    {
        let file_name = entry.file_name();
        if let Some(name) = file_name.to_str().and_then(component_name) {
            names.push(name.to_string());
        }
    }

    names.sort();
    debug!(dir = %script_dir.display(), count = names.len(), "listed components");
    Ok(names)
}

/// List component names found in a script directory, sorted by name
///
/// An unreadable directory yields an empty list; callers decide whether an
/// empty catalog is fatal.
pub async fn list_available_components(script_dir: &Path) -> Vec<String> {
    match read_components(script_dir).await {
        Ok(names) => names,
        Err(e) => {
            warn!(error = %e, "cannot read component directory");
            Vec::new()
        }
    }
}

/// Bundled assets of a built CLI package
///
/// Layout: `<root>/js/<component>.js` plus one `<root>/<engine>/` directory
/// per template engine.
#[derive(Debug, Clone)]
pub struct Catalog {
    root: PathBuf,
}

impl Catalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn script_dir(&self) -> PathBuf {
        self.root.join(SCRIPT_DIR)
    }

    pub fn template_dir(&self, engine: TemplateEngine) -> PathBuf {
        self.root.join(engine.dir_name())
    }

    pub fn script_path(&self, component: &str) -> PathBuf {
        self.script_dir().join(script_file(component))
    }

    pub fn template_path(&self, component: &str, engine: TemplateEngine) -> PathBuf {
        self.template_dir(engine).join(engine.template_file(component))
    }

    /// Components available in this catalog
    pub async fn components(&self) -> Vec<String> {
        list_available_components(&self.script_dir()).await
    }
}
