//! Texture map types and their colorspace transforms.
//!
//! A [`MapType`] is the semantic role of a texture. It fixes the colorspace
//! pair handed to the external converter and the extension of the converted
//! file:
//!
//! | Map type | From | To | Output |
//! |----------|------|----|--------|
//! | Raw | `Utility - Raw` | `ACES - ACEScg` | `.exr` |
//! | Color | `Utility - sRGB - Texture` | `ACES - ACEScg` | `.exr` |
//! | HDR | `Utility - Linear - sRGB` | `ACES - ACEScg` | `.exr` |
//! | Plate | `Output - sRGB` | `ACES - ACEScg` | `.exr` |
//! | Out-sRGB | `ACES - ACEScg` | `Output - sRGB` | `.png` |

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, TextureFile};

/// Colorspace names understood by the converter's OCIO config.
pub mod names {
    /// Non-color data, no transform.
    pub const UTILITY_RAW: &str = "Utility - Raw";
    /// sRGB encoded texture.
    pub const UTILITY_SRGB_TEXTURE: &str = "Utility - sRGB - Texture";
    /// Linear sRGB primaries.
    pub const UTILITY_LINEAR_SRGB: &str = "Utility - Linear - sRGB";
    /// sRGB display output.
    pub const OUTPUT_SRGB: &str = "Output - sRGB";
    /// ACEScg working space.
    pub const ACES_CG: &str = "ACES - ACEScg";
}

/// Extensions hinting at HDR linear maps.
pub const HDR_EXT_HINTS: &[&str] = &[".hdr"];
/// Extensions hinting at maps already in ACEScg.
pub const ACES_EXT_HINTS: &[&str] = &[".exr"];
/// Stem substrings hinting at color maps.
pub const COLOR_NAME_HINTS: &[&str] = &["diffuse", "albedo", "specular", "reflection"];
/// Stem substrings hinting at back plates.
pub const PLATE_NAME_HINTS: &[&str] = &["backplate"];

/// Output extension for ACEScg results.
pub const ACES_EXT: &str = ".exr";
/// Output extension for sRGB results.
pub const SRGB_EXT: &str = ".png";

/// Source and destination colorspace names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ColorspacePair {
    /// Colorspace of the source file.
    pub from: &'static str,
    /// Colorspace of the converted file.
    pub to: &'static str,
}

/// Semantic role of a texture.
///
/// Declaration order is the sort order used when sorting by map type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum MapType {
    /// Data maps (normal, displacement, roughness...).
    #[default]
    Raw,
    /// sRGB color maps (diffuse, albedo).
    Color,
    /// High dynamic range linear maps.
    #[serde(rename = "HDR")]
    Hdr,
    /// Back plates that must look identical after conversion.
    Plate,
    /// ACEScg maps going out to sRGB.
    #[serde(rename = "Out-sRGB")]
    OutSrgb,
}

impl MapType {
    /// All map types in display order.
    pub const fn all() -> &'static [Self] {
        &[Self::Raw, Self::Color, Self::Hdr, Self::Plate, Self::OutSrgb]
    }

    /// Display label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Raw => "Raw",
            Self::Color => "Color",
            Self::Hdr => "HDR",
            Self::Plate => "Plate",
            Self::OutSrgb => "Out-sRGB",
        }
    }

    /// One-line description for help output.
    pub const fn description(self) -> &'static str {
        match self {
            Self::Raw => "Maps describing data (normal, displacement, roughness and others)",
            Self::Color => "Maps describing color (diffuse/albedo)",
            Self::Hdr => "High dynamic range color maps",
            Self::Plate => "Maps needing an identical look after conversion (back plate)",
            Self::OutSrgb => "ACEScg maps converted out to sRGB",
        }
    }

    /// Colorspace transform for this map type.
    pub const fn colorspaces(self) -> ColorspacePair {
        use names::*;
        let (from, to) = match self {
            Self::Raw => (UTILITY_RAW, ACES_CG),
            Self::Color => (UTILITY_SRGB_TEXTURE, ACES_CG),
            Self::Hdr => (UTILITY_LINEAR_SRGB, ACES_CG),
            Self::Plate => (OUTPUT_SRGB, ACES_CG),
            Self::OutSrgb => (ACES_CG, OUTPUT_SRGB),
        };
        ColorspacePair { from, to }
    }

    /// Extension of the converted file, with leading dot.
    pub const fn output_extension(self) -> &'static str {
        match self {
            Self::OutSrgb => SRGB_EXT,
            _ => ACES_EXT,
        }
    }
}

impl fmt::Display for MapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MapType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "raw" | "data" => Ok(Self::Raw),
            "color" | "colour" | "ldr" => Ok(Self::Color),
            "hdr" | "linear" => Ok(Self::Hdr),
            "plate" => Ok(Self::Plate),
            "out-srgb" | "outsrgb" | "out_srgb" | "srgb" => Ok(Self::OutSrgb),
            _ => Err(Error::UnknownMapType(s.to_string())),
        }
    }
}

/// Guesses the map type of a texture from its name.
///
/// Checks run in order and the first match wins:
/// 1. `.hdr` extension: [`MapType::Hdr`]
/// 2. `.exr` extension: [`MapType::OutSrgb`]
/// 3. stem contains a color hint: [`MapType::Color`]
/// 4. stem contains `backplate`: [`MapType::Plate`]
/// 5. anything else: [`MapType::Raw`]
pub fn classify_map_type(path: &Path) -> MapType {
    let tex = TextureFile::new(path);
    let ext = tex.extension();
    let stem = tex.stem().to_lowercase();

    if HDR_EXT_HINTS.contains(&ext.as_str()) {
        MapType::Hdr
    } else if ACES_EXT_HINTS.contains(&ext.as_str()) {
        MapType::OutSrgb
    } else if COLOR_NAME_HINTS.iter().any(|h| stem.contains(h)) {
        MapType::Color
    } else if PLATE_NAME_HINTS.iter().any(|h| stem.contains(h)) {
        MapType::Plate
    } else {
        MapType::Raw
    }
}
