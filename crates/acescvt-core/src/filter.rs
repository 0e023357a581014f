//! Extension filter presets for the group list.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use glob::{MatchOptions, Pattern};
use serde::{Deserialize, Serialize};

use crate::Error;

/// Which image types are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ExtensionFilter {
    /// 8/16-bit display-referred formats.
    Srgb,
    /// Floating point formats.
    Hdr,
    /// Everything.
    #[default]
    All,
}

impl ExtensionFilter {
    /// All presets in display order.
    pub const fn all() -> &'static [Self] {
        &[Self::Srgb, Self::Hdr, Self::All]
    }

    /// Display label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Srgb => "sRGB Images",
            Self::Hdr => "HDR Images",
            Self::All => "All Files",
        }
    }

    /// Wildcard patterns of the preset.
    pub const fn patterns(self) -> &'static [&'static str] {
        match self {
            Self::Srgb => &["*.png", "*.jpg", "*.jpeg", "*.tif", "*.tiff"],
            Self::Hdr => &["*.exr", "*.hdr"],
            Self::All => &["*.*"],
        }
    }

    /// True if the file name matches any pattern, ignoring case.
    pub fn matches(self, path: &Path) -> bool {
        let name = match path.file_name() {
            Some(n) => n.to_string_lossy(),
            None => return false,
        };
        let options = MatchOptions {
            case_sensitive: false,
            ..MatchOptions::new()
        };
        self.patterns().iter().any(|p| {
            Pattern::new(p)
                .map(|pat| pat.matches_with(&name, options))
                .unwrap_or(false)
        })
    }
}

impl fmt::Display for ExtensionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ExtensionFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "srgb" | "srgb images" | "ldr" => Ok(Self::Srgb),
            "hdr" | "hdr images" => Ok(Self::Hdr),
            "all" | "all files" => Ok(Self::All),
            _ => Err(Error::UnknownFilter(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn srgb_preset() {
        let f = ExtensionFilter::Srgb;
        assert!(f.matches(Path::new("/t/a.png")));
        assert!(f.matches(Path::new("/t/a.1001.TIF")));
        assert!(!f.matches(Path::new("/t/a.exr")));
    }

    #[test]
    fn hdr_preset() {
        let f = ExtensionFilter::Hdr;
        assert!(f.matches(Path::new("sky.hdr")));
        assert!(f.matches(Path::new("wood.1001.EXR")));
        assert!(!f.matches(Path::new("wood.jpg")));
    }

    #[test]
    fn all_needs_a_dot() {
        assert!(ExtensionFilter::All.matches(Path::new("a.b")));
        assert!(!ExtensionFilter::All.matches(Path::new("noext")));
    }

    #[test]
    fn parse() {
        assert_eq!("HDR".parse::<ExtensionFilter>().unwrap(), ExtensionFilter::Hdr);
        assert_eq!("sRGB Images".parse::<ExtensionFilter>().unwrap(), ExtensionFilter::Srgb);
        assert!("tga".parse::<ExtensionFilter>().is_err());
    }
}
