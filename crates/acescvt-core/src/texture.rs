//! Texture file entries.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local};
use serde::Serialize;

/// Timestamp format used when listing files.
pub const MTIME_FORMAT: &str = "%y/%m/%d %H:%M:%S";

/// A texture file on disk with attributes derived from its path.
///
/// Nothing here touches the filesystem except [`TextureFile::modified`],
/// which stats the file lazily and yields `None` on failure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TextureFile {
    path: PathBuf,
}

impl TextureFile {
    /// Wraps a path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Full path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name with extension, e.g. `wood_diffuse.1001.png`.
    pub fn base_name(&self) -> String {
        self.path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// File name without its final extension.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Lower-cased extension with leading dot (`.exr`), empty if none.
    pub fn extension(&self) -> String {
        self.path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
            .unwrap_or_default()
    }

    /// Directory containing the file; `.` for bare file names.
    pub fn directory(&self) -> &Path {
        match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        }
    }

    /// Last modification time, if the file can be stat'ed.
    pub fn modified(&self) -> Option<SystemTime> {
        std::fs::metadata(&self.path).and_then(|m| m.modified()).ok()
    }

    /// Last modification time formatted as `yy/mm/dd HH:MM:SS` local time.
    pub fn modified_display(&self) -> Option<String> {
        self.modified()
            .map(|t| DateTime::<Local>::from(t).format(MTIME_FORMAT).to_string())
    }
}

impl From<PathBuf> for TextureFile {
    fn from(path: PathBuf) -> Self {
        Self::new(path)
    }
}

impl From<&Path> for TextureFile {
    fn from(path: &Path) -> Self {
        Self::new(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_names() {
        let tex = TextureFile::new("/tex/Wood_Diffuse.1001.PNG");
        assert_eq!(tex.base_name(), "Wood_Diffuse.1001.PNG");
        assert_eq!(tex.stem(), "Wood_Diffuse.1001");
        assert_eq!(tex.extension(), ".png");
        assert_eq!(tex.directory(), Path::new("/tex"));
    }

    #[test]
    fn no_extension() {
        let tex = TextureFile::new("README");
        assert_eq!(tex.extension(), "");
        assert_eq!(tex.directory(), Path::new("."));
    }

    #[test]
    fn missing_file_has_no_mtime() {
        let tex = TextureFile::new("/definitely/not/here.exr");
        assert!(tex.modified().is_none());
        assert!(tex.modified_display().is_none());
    }

    #[test]
    fn existing_file_has_mtime() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.png");
        std::fs::write(&path, b"x").unwrap();
        let shown = TextureFile::new(&path).modified_display().unwrap();
        // yy/mm/dd HH:MM:SS
        assert_eq!(shown.len(), 17);
        assert_eq!(&shown[2..3], "/");
    }
}
