//! Interactive questions asked during an install run
//!
//! The installer only depends on [`Prompter`]. The terminal implementation
//! lives in the `tui` module; [`AutoPrompter`] answers without asking.

use crate::catalog::TemplateEngine;
use crate::error::Result;

/// Answer to "which component(s) would you like to add?"
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Every component in the catalog
    All,
    /// A single named component
    One(String),
}

/// Source of answers for the installer
///
/// Implementations return [`crate::Error::Cancelled`] when the user backs out.
pub trait Prompter {
    /// Pick one component from `components`, or all of them
    fn select_component(&mut self, components: &[String]) -> Result<Selection>;

    /// Pick the template engine used by the project
    fn select_engine(&mut self) -> Result<TemplateEngine>;

    /// Free-text answer with a default
    fn input(&mut self, message: &str, default: &str) -> Result<String>;
}

/// Accepts every default without asking: the whole catalog, Nunjucks, and
/// the built-in destination paths
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoPrompter;

impl Prompter for AutoPrompter {
    fn select_component(&mut self, _components: &[String]) -> Result<Selection> {
        Ok(Selection::All)
    }

    fn select_engine(&mut self) -> Result<TemplateEngine> {
        Ok(TemplateEngine::Nunjucks)
    }

    fn input(&mut self, _message: &str, default: &str) -> Result<String> {
        Ok(default.to_string())
    }
}
