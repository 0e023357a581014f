//! Host environment probes.
//!
//! When the converter runs inside a host application, the host can suggest a
//! starting directory (for instance the publish texture folder of the open
//! scene). That lookup sits behind [`EnvironmentProbe`]; the standalone build
//! uses [`Standalone`], which suggests nothing.

use std::path::PathBuf;

use tracing::debug;

/// Default variable read by [`EnvVarProbe`].
pub const DEFAULT_PROBE_VAR: &str = "ACESCVT_TEXTURE_DIR";

/// Supplies host-specific defaults.
pub trait EnvironmentProbe: Send + Sync {
    /// Host name for status output.
    fn host_name(&self) -> &str;

    /// Directory to open on startup, if the host knows one.
    fn default_directory(&self) -> Option<PathBuf>;
}

/// No host.
#[derive(Debug, Clone, Copy, Default)]
pub struct Standalone;

impl EnvironmentProbe for Standalone {
    fn host_name(&self) -> &str {
        "standalone"
    }

    fn default_directory(&self) -> Option<PathBuf> {
        None
    }
}

/// Reads the default directory from an environment variable.
///
/// Host launch scripts export the directory of the current scene; the value
/// is ignored unless it names an existing directory.
#[derive(Debug, Clone)]
pub struct EnvVarProbe {
    var: String,
}

impl EnvVarProbe {
    /// Probe reading `var`.
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }

    /// Variable name.
    pub fn var(&self) -> &str {
        &self.var
    }
}

impl Default for EnvVarProbe {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_VAR)
    }
}

impl EnvironmentProbe for EnvVarProbe {
    fn host_name(&self) -> &str {
        "environment"
    }

    fn default_directory(&self) -> Option<PathBuf> {
        let value = std::env::var_os(&self.var)?;
        let dir = PathBuf::from(value);
        if dir.is_dir() {
            debug!(var = %self.var, dir = %dir.display(), "probe found directory");
            Some(dir)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standalone_is_empty() {
        assert!(Standalone.default_directory().is_none());
        assert_eq!(Standalone.host_name(), "standalone");
    }

    #[test]
    fn unset_variable() {
        let probe = EnvVarProbe::new("ACESCVT_TEST_UNSET_VARIABLE_1234");
        assert!(probe.default_directory().is_none());
    }

    #[test]
    fn boxed_probe() {
        let probes: Vec<Box<dyn EnvironmentProbe>> =
            vec![Box::new(Standalone), Box::new(EnvVarProbe::default())];
        assert_eq!(probes[1].host_name(), "environment");
    }
}
