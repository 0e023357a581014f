//! External colorspace converter.
//!
//! The pixel transform is delegated to a command-line tool such as
//! `oiiotool` or `ocioconvert`. [`ExternalConverter`] expands an argument
//! template and runs the tool once per file; anything that implements
//! [`Converter`] can stand in for it.

use std::path::{Path, PathBuf};
use std::process::Command;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{Error, Result};

/// Source path placeholder.
pub const SRC_PLACEHOLDER: &str = "{src}";
/// Destination path placeholder.
pub const DST_PLACEHOLDER: &str = "{dst}";
/// Source colorspace placeholder.
pub const FROM_PLACEHOLDER: &str = "{from}";
/// Destination colorspace placeholder.
pub const TO_PLACEHOLDER: &str = "{to}";

/// Converts one file between two named colorspaces.
pub trait Converter: Send + Sync {
    /// Writes `dst` from `src`. Returns the path of the converted file.
    fn convert(&self, src: &Path, dst: &Path, from: &str, to: &str) -> Result<PathBuf>;
}

impl<C: Converter + ?Sized> Converter for Box<C> {
    fn convert(&self, src: &Path, dst: &Path, from: &str, to: &str) -> Result<PathBuf> {
        (**self).convert(src, dst, from, to)
    }
}

impl<C: Converter + ?Sized> Converter for &C {
    fn convert(&self, src: &Path, dst: &Path, from: &str, to: &str) -> Result<PathBuf> {
        (**self).convert(src, dst, from, to)
    }
}

/// Runs an executable per file.
///
/// Every template argument is expanded separately and passed as its own
/// argv entry, so paths with spaces need no quoting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalConverter {
    /// Executable name or path.
    pub program: String,
    /// Argument template.
    pub args: Vec<String>,
}

impl Default for ExternalConverter {
    fn default() -> Self {
        Self {
            program: "oiiotool".into(),
            args: ["{src}", "--colorconvert", "{from}", "{to}", "-o", "{dst}"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl ExternalConverter {
    /// Creates a converter with an explicit program and argument template.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Same template, different executable.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Expanded argument list for one conversion.
    pub fn expand_args(&self, src: &Path, dst: &Path, from: &str, to: &str) -> Vec<String> {
        let src = src.to_string_lossy();
        let dst = dst.to_string_lossy();
        self.args
            .iter()
            .map(|a| {
                a.replace(SRC_PLACEHOLDER, &src)
                    .replace(DST_PLACEHOLDER, &dst)
                    .replace(FROM_PLACEHOLDER, from)
                    .replace(TO_PLACEHOLDER, to)
            })
            .collect()
    }
}

impl Converter for ExternalConverter {
    fn convert(&self, src: &Path, dst: &Path, from: &str, to: &str) -> Result<PathBuf> {
        trace!(src = %src.display(), dst = %dst.display(), from, to, "ExternalConverter::convert");
        let args = self.expand_args(src, dst, from, to);
        debug!(program = %self.program, ?args, "running converter");

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|source| Error::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(Error::ConverterFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        if !dst.is_file() {
            return Err(Error::MissingOutput(dst.to_path_buf()));
        }
        Ok(dst.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_template() {
        let conv = ExternalConverter::default();
        let args = conv.expand_args(
            Path::new("/my tex/a b.png"),
            Path::new("/tmp/a b.exr"),
            "Utility - sRGB - Texture",
            "ACES - ACEScg",
        );
        assert_eq!(
            args,
            [
                "/my tex/a b.png",
                "--colorconvert",
                "Utility - sRGB - Texture",
                "ACES - ACEScg",
                "-o",
                "/tmp/a b.exr",
            ]
        );
    }

    #[test]
    fn placeholders_inside_arguments() {
        let conv = ExternalConverter::new("tool", vec!["--in={src}".into(), "--cs={from}:{to}".into()]);
        let args = conv.expand_args(Path::new("s.png"), Path::new("d.exr"), "A", "B");
        assert_eq!(args, ["--in=s.png", "--cs=A:B"]);
    }

    #[test]
    fn missing_program_is_spawn_error() {
        let conv = ExternalConverter::default().with_program("acescvt-no-such-tool-xyz");
        let err = conv
            .convert(Path::new("a.png"), Path::new("b.exr"), "A", "B")
            .unwrap_err();
        assert!(matches!(err, Error::Spawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn shell_copy_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("in file.png");
        let dst = dir.path().join("out file.exr");
        std::fs::write(&src, b"pixels").unwrap();

        let conv = ExternalConverter::new(
            "sh",
            vec!["-c".into(), "cp \"$0\" \"$1\"".into(), "{src}".into(), "{dst}".into()],
        );
        let out = conv.convert(&src, &dst, "A", "B").unwrap();
        assert_eq!(out, dst);
        assert_eq!(std::fs::read(&dst).unwrap(), b"pixels");
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_is_failure() {
        let conv = ExternalConverter::new("sh", vec!["-c".into(), "echo nope >&2; exit 3".into()]);
        let err = conv
            .convert(Path::new("a.png"), Path::new("b.exr"), "A", "B")
            .unwrap_err();
        match err {
            Error::ConverterFailed { stderr, .. } => assert_eq!(stderr, "nope"),
            other => panic!("unexpected: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn success_without_output_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let conv = ExternalConverter::new("sh", vec!["-c".into(), "true".into()]);
        let dst = dir.path().join("never.exr");
        let err = conv.convert(Path::new("a.png"), &dst, "A", "B").unwrap_err();
        assert!(matches!(err, Error::MissingOutput(_)));
    }
}
