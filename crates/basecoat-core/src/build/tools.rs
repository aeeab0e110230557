//! External asset tools: the script minifier and the CSS compiler
//!
//! The orchestrator only sees the [`AssetTools`] trait. [`NpxTools`] runs the
//! real tools through an npm launcher; tests swap in in-process doubles.

use crate::error::{Error, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Default launcher for the external tools
pub const DEFAULT_LAUNCHER: &str = "npx";

/// Environment variable overriding the launcher
pub const LAUNCHER_ENV: &str = "BASECOAT_NPX";

/// Script minifier package run by the launcher
pub const MINIFIER: &str = "terser";

/// CSS compiler package run by the launcher
pub const CSS_COMPILER: &str = "tailwindcss";

/// Capabilities the build needs from outside tools
///
/// Each call completes (the tool has exited) before it returns. A failure is
/// fatal to the build.
#[allow(async_fn_in_trait)]
pub trait AssetTools {
    /// Verify the tools can be launched at all
    async fn preflight(&self) -> Result<()> {
        Ok(())
    }

    /// Minify one or more scripts, in order, into a single output file
    async fn minify(&self, inputs: &[PathBuf], output: &Path) -> Result<()>;

    /// Compile a stylesheet, optionally minified
    async fn compile_css(&self, input: &Path, output: &Path, minify: bool) -> Result<()>;
}

/// Arguments for `terser <inputs...> -o <output> --compress --mangle`
pub fn minify_args(inputs: &[PathBuf], output: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![MINIFIER.into()];
    args.extend(inputs.iter().map(|p| p.as_os_str().to_owned()));
    args.push("-o".into());
    args.push(output.as_os_str().to_owned());
    args.push("--compress".into());
    args.push("--mangle".into());
    args
}

/// Arguments for `tailwindcss -i <input> -o <output> [--minify]`
pub fn css_args(input: &Path, output: &Path, minify: bool) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        CSS_COMPILER.into(),
        "-i".into(),
        input.as_os_str().to_owned(),
        "-o".into(),
        output.as_os_str().to_owned(),
    ];
    if minify {
        args.push("--minify".into());
    }
    args
}

/// Runs terser and tailwindcss through an npm-style launcher
#[derive(Debug, Clone)]
pub struct NpxTools {
    launcher: String,
}

impl NpxTools {
    pub fn new(launcher: impl Into<String>) -> Self {
        Self {
            launcher: launcher.into(),
        }
    }

    /// Run the launcher with `args` and wait for it to exit
    async fn run(&self, tool: &str, args: Vec<OsString>) -> Result<()> {
        debug!(launcher = %self.launcher, ?args, "running external tool");

        let output = Command::new(&self.launcher)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| Error::ToolUnavailable {
                tool: self.launcher.clone(),
                source,
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(Error::ExternalTool {
                tool: tool.to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            })
        }
    }
}

impl AssetTools for NpxTools {
    async fn preflight(&self) -> Result<()> {
        self.run(&self.launcher, vec!["--version".into()]).await
    }

    async fn minify(&self, inputs: &[PathBuf], output: &Path) -> Result<()> {
        self.run(MINIFIER, minify_args(inputs, output)).await
    }

    async fn compile_css(&self, input: &Path, output: &Path, minify: bool) -> Result<()> {
        self.run(CSS_COMPILER, css_args(input, output, minify)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minify_args_keep_input_order() {
        let inputs = vec![PathBuf::from("src/js/popover.js"), PathBuf::from("src/js/tabs.js")];
        let args = minify_args(&inputs, Path::new("dist/all.min.js"));
        let args: Vec<_> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();

        assert_eq!(
            args,
            vec![
                "terser",
                "src/js/popover.js",
                "src/js/tabs.js",
                "-o",
                "dist/all.min.js",
                "--compress",
                "--mangle",
            ]
        );
    }

    #[test]
    fn test_css_args_minify_flag() {
        let plain = css_args(Path::new("in.css"), Path::new("out.css"), false);
        let minified = css_args(Path::new("in.css"), Path::new("out.min.css"), true);

        assert_eq!(plain.len(), 5);
        assert_eq!(minified.last().unwrap(), "--minify");
        assert_eq!(plain[0], "tailwindcss");
    }

    #[tokio::test]
    async fn test_missing_launcher_is_unavailable() {
        let tools = NpxTools::new("basecoat-launcher-that-does-not-exist");
        let err = tools.preflight().await.unwrap_err();
        assert!(matches!(err, Error::ToolUnavailable { .. }));
    }
}
