//! Destination configuration for an install run
//!
//! A run starts from the built-in defaults, layers the optional project file
//! and command-line flags on top, then prompts for whatever is still unset.
//! Each step returns a new value; nothing is mutated behind the caller's back.

use super::prompter::Prompter;
use crate::catalog::TemplateEngine;
use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default directory for component templates, relative to the project
pub const DEFAULT_TEMPLATE_DEST: &str = "./components/basecoat";

/// Default directory for component scripts, relative to the project
pub const DEFAULT_SCRIPT_DEST: &str = "./static/js/basecoat";

/// Optional project configuration file
pub const CONFIG_FILE: &str = "basecoat.yaml";

/// Where an install run writes, possibly still undecided
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationConfig {
    pub engine: Option<TemplateEngine>,
    pub template_dest: PathBuf,
    pub script_dest: PathBuf,
}

impl Default for DestinationConfig {
    fn default() -> Self {
        Self {
            engine: None,
            template_dest: PathBuf::from(DEFAULT_TEMPLATE_DEST),
            script_dest: PathBuf::from(DEFAULT_SCRIPT_DEST),
        }
    }
}

/// Values that override the defaults, from the config file or from flags
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigOverrides {
    pub template_engine: Option<TemplateEngine>,
    pub template_dest: Option<PathBuf>,
    pub script_dest: Option<PathBuf>,
}

impl ConfigOverrides {
    /// Load `basecoat.yaml` from the project root, if there is one
    pub fn load(project_root: &Path) -> Result<Option<Self>> {
        let path = project_root.join(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::io("read", path, e)),
        };

        // An empty file parses as null; treat it as "no overrides"
        if content.trim().is_empty() {
            return Ok(Some(Self::default()));
        }

        let overrides = serde_yaml::from_str(&content).map_err(|source| Error::Config {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), ?overrides, "loaded project configuration");
        Ok(Some(overrides))
    }
}

impl DestinationConfig {
    /// Apply overrides, keeping current values where an override is unset
    pub fn with_overrides(self, overrides: &ConfigOverrides) -> Self {
        Self {
            engine: overrides.template_engine.or(self.engine),
            template_dest: overrides
                .template_dest
                .clone()
                .unwrap_or(self.template_dest),
            script_dest: overrides.script_dest.clone().unwrap_or(self.script_dest),
        }
    }

    /// True while the template destination still equals the built-in default
    ///
    /// This compares the literal path text, so `./components/basecoat/` counts
    /// as decided while a value set on purpose to the default literal is
    /// prompted for again.
    pub fn template_dest_is_default(&self) -> bool {
        self.template_dest.as_os_str().is_empty()
            || self.template_dest.as_os_str() == DEFAULT_TEMPLATE_DEST
    }

    /// True while the script destination still equals the built-in default
    pub fn script_dest_is_default(&self) -> bool {
        self.script_dest.as_os_str().is_empty()
            || self.script_dest.as_os_str() == DEFAULT_SCRIPT_DEST
    }

    /// Prompt for every value that is still undecided
    pub fn resolve<P: Prompter>(self, prompter: &mut P) -> Result<ResolvedConfig> {
        let template_is_default = self.template_dest_is_default();
        let script_is_default = self.script_dest_is_default();

        let engine = match self.engine {
            Some(engine) => engine,
            None => prompter.select_engine()?,
        };

        let template_dest = if template_is_default {
            prompt_path(
                prompter,
                "Where should template files be placed?",
                DEFAULT_TEMPLATE_DEST,
            )?
        } else {
            self.template_dest
        };

        let script_dest = if script_is_default {
            prompt_path(
                prompter,
                "Where should script files be placed?",
                DEFAULT_SCRIPT_DEST,
            )?
        } else {
            self.script_dest
        };

        Ok(ResolvedConfig {
            engine,
            template_dest,
            script_dest,
        })
    }
}

fn prompt_path<P: Prompter>(prompter: &mut P, message: &str, default: &str) -> Result<PathBuf> {
    let answer = prompter.input(message, default)?;
    let answer = answer.trim();
    if answer.is_empty() {
        Ok(PathBuf::from(default))
    } else {
        Ok(PathBuf::from(answer))
    }
}

/// Fully decided destination configuration, fixed for the rest of the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub engine: TemplateEngine,
    pub template_dest: PathBuf,
    pub script_dest: PathBuf,
}
