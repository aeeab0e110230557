//! Build pipeline producing the CLI and CSS packages
//!
//! Runs as a strict sequence against one repository root:
//!
//! 1. Clean both package distribution directories
//! 2. Assemble the CLI package (entry file, asset directories)
//! 3. Copy every component script into both packages, minify it once and
//!    copy the minified output into both packages
//! 4. Build the combined `all.js` / `all.min.js` bundles from a fixed list
//! 5. Copy the template tree of every engine into the CLI assets
//! 6. Assemble the CSS package (base stylesheet, compiled CDN builds)
//!
//! The first failing step aborts the build. Nothing is rolled back; the clean
//! step of the next build takes care of leftovers.

pub mod tools;

use crate::catalog::{self, TemplateEngine, BUNDLE_STEM, MINIFIED_SUFFIX, SCRIPT_DIR, SCRIPT_EXT};
use crate::error::{Error, Result};
use crate::fsutil;
use colored::Colorize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

pub use tools::{AssetTools, NpxTools};

/// Components concatenated into the combined bundles, in load order
///
/// Later entries may rely on globals declared by earlier ones, so this list is
/// maintained by hand rather than derived from the source directory.
pub const BUNDLE_COMPONENTS: &[&str] = &[
    "dropdown-menu",
    "popover",
    "select",
    "sidebar",
    "tabs",
    "toast",
];

/// Appended after each source in the plain bundle
pub const BUNDLE_SEPARATOR: &str = "\n";

/// Hand-authored stylesheet shipped as-is
pub const BASE_STYLESHEET: &str = "basecoat.css";

/// Entry stylesheet compiled for CDN use
pub const CDN_STYLESHEET: &str = "basecoat.cdn.css";

/// Minified output of [`CDN_STYLESHEET`]
pub const CDN_STYLESHEET_MIN: &str = "basecoat.cdn.min.css";

/// Source and output locations of a build
#[derive(Debug, Clone)]
pub struct BuildLayout {
    /// Component scripts (`src/js`)
    pub src_js: PathBuf,
    /// Stylesheets (`src/css`)
    pub src_css: PathBuf,
    /// Parent of the per-engine template directories (`src`)
    pub src_templates: PathBuf,
    /// CLI entry file copied verbatim (`packages/cli/index.js`)
    pub cli_entry: PathBuf,
    /// CLI package output (`packages/cli/dist`)
    pub cli_dist: PathBuf,
    /// CSS package output (`packages/css/dist`)
    pub css_dist: PathBuf,
}

impl BuildLayout {
    /// Standard layout of a repository checkout
    pub fn from_root(root: &Path) -> Self {
        let src = root.join("src");
        let packages = root.join("packages");
        Self {
            src_js: src.join("js"),
            src_css: src.join("css"),
            src_templates: src.clone(),
            cli_entry: packages.join("cli").join("index.js"),
            cli_dist: packages.join("cli").join("dist"),
            css_dist: packages.join("css").join("dist"),
        }
    }

    /// Bundled assets read by the installer
    pub fn cli_assets(&self) -> PathBuf {
        self.cli_dist.join("assets")
    }

    pub fn cli_js(&self) -> PathBuf {
        self.cli_assets().join(SCRIPT_DIR)
    }

    pub fn css_js(&self) -> PathBuf {
        self.css_dist.join(SCRIPT_DIR)
    }

    pub fn template_src(&self, engine: TemplateEngine) -> PathBuf {
        self.src_templates.join(engine.dir_name())
    }

    pub fn template_dest(&self, engine: TemplateEngine) -> PathBuf {
        self.cli_assets().join(engine.dir_name())
    }
}

/// What a finished build produced
#[derive(Debug, Clone, Default)]
pub struct BuildSummary {
    /// Components whose scripts were copied and minified
    pub components: Vec<String>,
    /// Bundle members, in bundle order
    pub bundle: Vec<String>,
    /// Template files copied per engine
    pub templates: Vec<(TemplateEngine, usize)>,
    /// Files written across both packages
    pub files_written: usize,
}

/// Build orchestrator
pub struct Builder<T: AssetTools> {
    layout: BuildLayout,
    tools: T,
    bundle: Vec<String>,
}

impl<T: AssetTools> Builder<T> {
    pub fn new(layout: BuildLayout, tools: T) -> Self {
        Self {
            layout,
            tools,
            bundle: BUNDLE_COMPONENTS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Replace the bundle list
    pub fn with_bundle<I, S>(mut self, components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bundle = components.into_iter().map(Into::into).collect();
        self
    }

    pub fn layout(&self) -> &BuildLayout {
        &self.layout
    }

    /// Run the whole pipeline
    pub async fn run(&self) -> Result<BuildSummary> {
        println!("{}", "Starting build process...".cyan().bold());
        self.tools.preflight().await?;

        let mut summary = BuildSummary::default();

        self.clean().await?;
        self.assemble_cli(&mut summary).await?;
        self.process_scripts(&mut summary).await?;
        self.build_bundles(&mut summary).await?;
        self.copy_templates(&mut summary).await?;
        self.assemble_css(&mut summary).await?;

        println!();
        println!(
            "{} {} component(s), {} file(s) written",
            "Built".green().bold(),
            summary.components.len(),
            summary.files_written
        );
        Ok(summary)
    }

    async fn clean(&self) -> Result<()> {
        step("Cleaning distribution directories");
        for dir in [&self.layout.cli_dist, &self.layout.css_dist] {
            if fsutil::clean_dir(dir).await? {
                item(format!("cleaned {}", dir.display()));
            } else {
                item(format!("{} not found, nothing to clean", dir.display()));
            }
        }
        Ok(())
    }

    async fn assemble_cli(&self, summary: &mut BuildSummary) -> Result<()> {
        step("Building CLI package");
        let layout = &self.layout;
        fsutil::ensure_dir(&layout.cli_dist).await?;
        fsutil::ensure_dir(&layout.cli_assets()).await?;

        let file_name = layout
            .cli_entry
            .file_name()
            .ok_or_else(|| {
                Error::io(
                    "copy",
                    &layout.cli_entry,
                    std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a file path"),
                )
            })?;
        let dest = layout.cli_dist.join(file_name);
        fsutil::copy_file(&layout.cli_entry, &dest).await?;
        summary.files_written += 1;
        item(format!("copied {}", dest.display()));
        Ok(())
    }

    async fn process_scripts(&self, summary: &mut BuildSummary) -> Result<()> {
        step("Copying and minifying scripts");
        let layout = &self.layout;
        let cli_js = layout.cli_js();
        let css_js = layout.css_js();
        fsutil::ensure_dir(&cli_js).await?;
        fsutil::ensure_dir(&css_js).await?;

        let components = catalog::read_components(&layout.src_js).await?;
        if components.is_empty() {
            return Err(Error::EmptyCatalog {
                dir: layout.src_js.clone(),
            });
        }

        for name in &components {
            let plain = catalog::script_file(name);
            let minified = minified_file(name);
            let src = layout.src_js.join(&plain);

            fsutil::copy_file(&src, &cli_js.join(&plain)).await?;
            fsutil::copy_file(&src, &css_js.join(&plain)).await?;

            // Minify once, then duplicate so both packages get identical bytes
            let cli_min = cli_js.join(&minified);
            self.tools.minify(std::slice::from_ref(&src), &cli_min).await?;
            fsutil::copy_file(&cli_min, &css_js.join(&minified)).await?;

            summary.files_written += 4;
            item(name);
        }

        summary.components = components;
        Ok(())
    }

    async fn build_bundles(&self, summary: &mut BuildSummary) -> Result<()> {
        step("Creating combined component files");
        let layout = &self.layout;
        let cli_js = layout.cli_js();
        let css_js = layout.css_js();

        let sources: Vec<PathBuf> = self
            .bundle
            .iter()
            .map(|name| layout.src_js.join(catalog::script_file(name)))
            .collect();

        let combined = concat_sources(&sources).await?;
        let bundle = catalog::script_file(BUNDLE_STEM);
        let cli_bundle = cli_js.join(&bundle);
        fs::write(&cli_bundle, combined)
            .await
            .map_err(|e| Error::io("write", &cli_bundle, e))?;
        fsutil::copy_file(&cli_bundle, &css_js.join(&bundle)).await?;
        item(&bundle);

        let bundle_min = minified_file(BUNDLE_STEM);
        let cli_bundle_min = cli_js.join(&bundle_min);
        self.tools.minify(&sources, &cli_bundle_min).await?;
        fsutil::copy_file(&cli_bundle_min, &css_js.join(&bundle_min)).await?;
        item(&bundle_min);

        summary.files_written += 4;
        summary.bundle = self.bundle.clone();
        Ok(())
    }

    async fn copy_templates(&self, summary: &mut BuildSummary) -> Result<()> {
        step("Copying templates");
        for engine in TemplateEngine::ALL {
            let dest = self.layout.template_dest(engine);
            let copied = fsutil::copy_dir_recursive(&self.layout.template_src(engine), &dest).await?;
            item(format!(
                "{} ({} files) -> {}",
                engine.display_name(),
                copied.len(),
                dest.display()
            ));
            summary.files_written += copied.len();
            summary.templates.push((engine, copied.len()));
        }
        Ok(())
    }

    async fn assemble_css(&self, summary: &mut BuildSummary) -> Result<()> {
        step("Building CSS package");
        let layout = &self.layout;
        fsutil::ensure_dir(&layout.css_dist).await?;

        let base = layout.css_dist.join(BASE_STYLESHEET);
        fsutil::copy_file(&layout.src_css.join(BASE_STYLESHEET), &base).await?;
        item(BASE_STYLESHEET);

        let cdn_src = layout.src_css.join(CDN_STYLESHEET);
        self.tools
            .compile_css(&cdn_src, &layout.css_dist.join(CDN_STYLESHEET), false)
            .await?;
        item(CDN_STYLESHEET);
        self.tools
            .compile_css(&cdn_src, &layout.css_dist.join(CDN_STYLESHEET_MIN), true)
            .await?;
        item(CDN_STYLESHEET_MIN);

        summary.files_written += 3;
        Ok(())
    }
}

/// `<name>.min.js`
fn minified_file(name: &str) -> String {
    format!("{}{}{}", name, MINIFIED_SUFFIX, SCRIPT_EXT)
}

/// Concatenate sources in order, each followed by [`BUNDLE_SEPARATOR`]
async fn concat_sources(sources: &[PathBuf]) -> Result<String> {
    let mut combined = String::new();
    for path in sources {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| Error::io("read", path, e))?;
        combined.push_str(&content);
        combined.push_str(BUNDLE_SEPARATOR);
    }
    debug!(files = sources.len(), bytes = combined.len(), "concatenated bundle");
    Ok(combined)
}

fn step(label: &str) {
    println!("{}", format!("{}...", label).cyan());
}

fn item(label: impl std::fmt::Display) {
    println!("  {} {}", "->".blue(), label);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fsutil::tests::relative_files;
    use std::cell::RefCell;
    use tempfile::{tempdir, TempDir};

    /// Minifier/compiler double: strips whitespace and records every call
    #[derive(Default)]
    struct FakeTools {
        minify_calls: RefCell<Vec<Vec<PathBuf>>>,
        css_calls: RefCell<Vec<(PathBuf, bool)>>,
        fail_minify_on: Option<&'static str>,
        fail_css: bool,
    }

    impl AssetTools for FakeTools {
        async fn minify(&self, inputs: &[PathBuf], output: &Path) -> Result<()> {
            self.minify_calls.borrow_mut().push(inputs.to_vec());
            if let Some(name) = self.fail_minify_on {
                if inputs.iter().any(|p| p.ends_with(catalog::script_file(name))) {
                    return Err(Error::ExternalTool {
                        tool: "terser".to_string(),
                        status: "exit status: 1".to_string(),
                        stderr: "SyntaxError".to_string(),
                    });
                }
            }
            let mut out = String::new();
            for input in inputs {
                let content = std::fs::read_to_string(input).unwrap();
                out.extend(content.chars().filter(|c| !c.is_whitespace()));
            }
            std::fs::write(output, out).unwrap();
            Ok(())
        }

        async fn compile_css(&self, input: &Path, output: &Path, minify: bool) -> Result<()> {
            self.css_calls.borrow_mut().push((output.to_path_buf(), minify));
            if self.fail_css {
                return Err(Error::ExternalTool {
                    tool: "tailwindcss".to_string(),
                    status: "exit status: 1".to_string(),
                    stderr: String::new(),
                });
            }
            let content = std::fs::read_to_string(input).unwrap();
            let content = if minify {
                content.replace('\n', "")
            } else {
                content
            };
            std::fs::write(output, content).unwrap();
            Ok(())
        }
    }

    const SOURCES: &[&str] = &[
        "dialog",
        "dropdown-menu",
        "popover",
        "select",
        "sidebar",
        "tabs",
        "toast",
    ];

    fn write(path: &Path, content: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn fixture() -> (TempDir, BuildLayout) {
        let temp = tempdir().unwrap();
        let root = temp.path();
        for name in SOURCES {
            write(
                &root.join(format!("src/js/{}.js", name)),
                &format!("(() => {{\n  window.{} = true;\n}})();", name.replace('-', "_")),
            );
            write(&root.join(format!("src/nunjucks/{}.njk", name)), name);
            write(&root.join(format!("src/jinja/{}.html.jinja", name)), name);
        }
        write(&root.join("src/nunjucks/partials/icon.njk"), "icon");
        write(&root.join("src/css/basecoat.css"), ".btn { color: red; }\n");
        write(&root.join("src/css/basecoat.cdn.css"), "@import 'tailwindcss';\n@import './basecoat.css';\n");
        write(&root.join("packages/cli/index.js"), "#!/usr/bin/env node\n");
        let layout = BuildLayout::from_root(root);
        (temp, layout)
    }

    #[tokio::test]
    async fn test_build_produces_both_packages() {
        let (_temp, layout) = fixture();
        let builder = Builder::new(layout.clone(), FakeTools::default());

        let summary = builder.run().await.unwrap();

        assert_eq!(summary.components.len(), SOURCES.len());
        assert!(layout.cli_dist.join("index.js").exists());
        for name in SOURCES {
            for file in [format!("{}.js", name), format!("{}.min.js", name)] {
                let cli = std::fs::read(layout.cli_js().join(&file)).unwrap();
                let css = std::fs::read(layout.css_js().join(&file)).unwrap();
                assert_eq!(cli, css, "{} differs between packages", file);
            }
        }
        for file in ["all.js", "all.min.js"] {
            assert_eq!(
                std::fs::read(layout.cli_js().join(file)).unwrap(),
                std::fs::read(layout.css_js().join(file)).unwrap()
            );
        }
        assert!(layout.css_dist.join(BASE_STYLESHEET).exists());
        assert!(layout.css_dist.join(CDN_STYLESHEET).exists());
        assert!(layout.css_dist.join(CDN_STYLESHEET_MIN).exists());
    }

    #[tokio::test]
    async fn test_minifies_each_script_once() {
        let (_temp, layout) = fixture();
        let builder = Builder::new(layout, FakeTools::default());

        builder.run().await.unwrap();

        let calls = builder.tools.minify_calls.borrow();
        // One call per component plus one for the bundle
        assert_eq!(calls.len(), SOURCES.len() + 1);
        assert_eq!(calls.last().unwrap().len(), BUNDLE_COMPONENTS.len());

        let css_calls = builder.tools.css_calls.borrow();
        assert_eq!(css_calls.len(), 2);
        assert!(!css_calls[0].1);
        assert!(css_calls[1].1);
    }

    #[tokio::test]
    async fn test_bundle_follows_configured_order() {
        let (_temp, layout) = fixture();
        let builder = Builder::new(layout.clone(), FakeTools::default());
        builder.run().await.unwrap();

        let bundle = std::fs::read_to_string(layout.cli_js().join("all.js")).unwrap();
        let mut expected = String::new();
        for name in BUNDLE_COMPONENTS {
            expected.push_str(&std::fs::read_to_string(layout.src_js.join(format!("{}.js", name))).unwrap());
            expected.push_str(BUNDLE_SEPARATOR);
        }
        assert_eq!(bundle, expected);
        assert!(!bundle.contains("window.dialog"));
    }

    #[tokio::test]
    async fn test_reordered_bundle_changes_content_not_files() {
        let (_temp, layout) = fixture();

        Builder::new(layout.clone(), FakeTools::default())
            .run()
            .await
            .unwrap();
        let first = std::fs::read(layout.cli_js().join("all.js")).unwrap();
        let first_files = relative_files(&layout.cli_dist);

        let mut reversed: Vec<&str> = BUNDLE_COMPONENTS.to_vec();
        reversed.reverse();
        Builder::new(layout.clone(), FakeTools::default())
            .with_bundle(reversed)
            .run()
            .await
            .unwrap();
        let second = std::fs::read(layout.cli_js().join("all.js")).unwrap();

        assert_ne!(first, second);
        assert_eq!(first.len(), second.len());
        assert_eq!(first_files, relative_files(&layout.cli_dist));
    }

    #[tokio::test]
    async fn test_templates_mirror_sources() {
        let (_temp, layout) = fixture();
        Builder::new(layout.clone(), FakeTools::default())
            .run()
            .await
            .unwrap();

        for engine in TemplateEngine::ALL {
            assert_eq!(
                relative_files(&layout.template_src(engine)),
                relative_files(&layout.template_dest(engine))
            );
        }
        assert!(layout
            .template_dest(TemplateEngine::Nunjucks)
            .join("partials/icon.njk")
            .exists());
    }

    #[tokio::test]
    async fn test_rebuild_drops_removed_components() {
        let (_temp, layout) = fixture();
        write(&layout.cli_js().join("removed.js"), "stale");
        write(&layout.css_dist.join("old.css"), "stale");

        Builder::new(layout.clone(), FakeTools::default())
            .run()
            .await
            .unwrap();

        assert!(!layout.cli_js().join("removed.js").exists());
        assert!(!layout.css_dist.join("old.css").exists());
    }

    #[tokio::test]
    async fn test_rebuild_is_reproducible() {
        let (_temp, layout) = fixture();
        Builder::new(layout.clone(), FakeTools::default())
            .run()
            .await
            .unwrap();
        let first = relative_files(&layout.cli_dist);
        let first_bundle = std::fs::read(layout.cli_js().join("all.min.js")).unwrap();

        Builder::new(layout.clone(), FakeTools::default())
            .run()
            .await
            .unwrap();

        assert_eq!(first, relative_files(&layout.cli_dist));
        assert_eq!(
            first_bundle,
            std::fs::read(layout.cli_js().join("all.min.js")).unwrap()
        );
    }

    #[tokio::test]
    async fn test_minifier_failure_aborts_build() {
        let (_temp, layout) = fixture();
        let tools = FakeTools {
            fail_minify_on: Some("popover"),
            ..Default::default()
        };

        let err = Builder::new(layout.clone(), tools).run().await.unwrap_err();

        assert!(matches!(err, Error::ExternalTool { .. }));
        assert!(!layout.cli_js().join("all.js").exists());
        assert!(!layout.template_dest(TemplateEngine::Jinja).exists());
        assert!(!layout.css_dist.join(BASE_STYLESHEET).exists());
    }

    #[tokio::test]
    async fn test_css_failure_aborts_build() {
        let (_temp, layout) = fixture();
        let tools = FakeTools {
            fail_css: true,
            ..Default::default()
        };

        let err = Builder::new(layout.clone(), tools).run().await.unwrap_err();

        assert!(matches!(err, Error::ExternalTool { .. }));
        assert!(!layout.css_dist.join(CDN_STYLESHEET_MIN).exists());
    }

    #[tokio::test]
    async fn test_missing_bundle_member_names_path() {
        let (_temp, layout) = fixture();
        let err = Builder::new(layout, FakeTools::default())
            .with_bundle(["tabs", "accordion"])
            .run()
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Io { .. }));
        assert!(err.to_string().contains("accordion.js"));
    }

    #[tokio::test]
    async fn test_empty_script_directory_is_fatal() {
        let (_temp, layout) = fixture();
        std::fs::remove_dir_all(&layout.src_js).unwrap();
        std::fs::create_dir_all(&layout.src_js).unwrap();

        let err = Builder::new(layout, FakeTools::default())
            .run()
            .await
            .unwrap_err();
        assert!(matches!(err, Error::EmptyCatalog { .. }));
    }
}
