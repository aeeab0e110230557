//! Basecoat Core - packaging and installing Basecoat components
//!
//! The component sources (one script per component, one template per
//! component and template engine, plus the stylesheets) are turned into two
//! published packages by the build pipeline. The `add` flow of the CLI later
//! copies a subset of the CLI package's bundled assets into a project.
//!
//! The two halves share nothing at runtime except the on-disk layout:
//!
//! ```text
//! assets/
//!   js/<component>.js, <component>.min.js, all.js, all.min.js
//!   nunjucks/<component>.njk
//!   jinja/<component>.html.jinja
//! ```
//!
//! # Modules
//!
//! - [`fsutil`] - directory creation, cleaning and recursive copies
//! - [`catalog`] - component discovery and asset paths
//! - [`build`] - the build pipeline and the external tool interface
//! - [`install`] - selection, destination configuration and installation
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based prompts for the `add` flow

pub mod build;
pub mod catalog;
pub mod error;
pub mod fsutil;
pub mod install;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use build::{AssetTools, BuildLayout, BuildSummary, Builder, NpxTools};
pub use catalog::{Catalog, TemplateEngine};
pub use error::{Error, Result};
pub use install::{
    AddRequest, ComponentOutcome, ConfigOverrides, DestinationConfig, InstallReport, Installer,
    Prompter, ResolvedConfig, Selection,
};

#[cfg(feature = "tui")]
pub use tui::run;
