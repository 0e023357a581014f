//! Filename pattern tokenizer.
//!
//! Folds the variable part of a texture filename (UDIM tile, UV tile, frame
//! number) into a placeholder so that every member of a texture series maps
//! to the same pattern string:
//!
//! | Mode | Example | Pattern |
//! |------|---------|---------|
//! | [`TilingMode::Udim`] | `wood.1012.exr` | `wood.<UDIM>.exr` |
//! | [`TilingMode::ZBrush`] | `wood_u0_v1.exr` | `wood_u<u>_v<v>.exr` |
//! | [`TilingMode::Mudbox`] | `wood_u1_v2.exr` | `wood_u<U>_v<V>.exr` |
//! | frame extension | `plate.0042.png` | `plate.<f>.png` |
//!
//! Only the file stem is rewritten; the directory and extension are kept.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// UDIM placeholder.
pub const UDIM_TOKEN: &str = "<UDIM>";
/// 0-based UV tile placeholder.
pub const ZBRUSH_TOKEN: &str = "_u<u>_v<v>";
/// 1-based UV tile placeholder.
pub const MUDBOX_TOKEN: &str = "_u<U>_v<V>";
/// Frame number placeholder.
pub const FRAME_TOKEN: &str = "<f>";

/// UDIM number range (U 0-9, V 0-99).
const UDIM_RANGE: std::ops::RangeInclusive<u32> = 1001..=1999;

fn uv_tile_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"_u[0-9]+_v[0-9]+").expect("valid uv tile regex"))
}

fn frame_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[._]([0-9]+)$").expect("valid frame regex"))
}

/// UV tiling convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TilingMode {
    /// No tile token.
    Off,
    /// `_u0_v0`, 0-based.
    ZBrush,
    /// `_u1_v1`, 1-based.
    Mudbox,
    /// Mari-style `1001`.
    #[default]
    Udim,
}

impl TilingMode {
    /// Maps a resolver code (0 off, 1 ZBrush, 2 Mudbox, 3 UDIM).
    ///
    /// Unknown codes fall back to [`TilingMode::Off`].
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => Self::ZBrush,
            2 => Self::Mudbox,
            3 => Self::Udim,
            _ => Self::Off,
        }
    }

    /// Resolver code for this mode.
    pub fn code(self) -> u8 {
        match self {
            Self::Off => 0,
            Self::ZBrush => 1,
            Self::Mudbox => 2,
            Self::Udim => 3,
        }
    }
}

/// Rewrites filenames into series patterns.
///
/// The default replaces UDIM numbers and leaves frame numbers alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternTokenizer {
    /// Replace a trailing frame number with `<f>`.
    pub frame_extension: bool,
    /// Tile token convention.
    pub tiling: TilingMode,
}

impl PatternTokenizer {
    /// Creates a tokenizer.
    pub fn new(frame_extension: bool, tiling: TilingMode) -> Self {
        Self { frame_extension, tiling }
    }

    /// Builds a tokenizer from resolver codes, e.g. `(0, 3)` for UDIM only.
    pub fn from_codes(frame_extension: u8, tiling: u8) -> Self {
        Self::new(frame_extension != 0, TilingMode::from_code(tiling))
    }

    /// Pattern string for a full path; the directory part is preserved.
    pub fn pattern(&self, path: &Path) -> String {
        let name = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let pattern = self.pattern_name(&name);
        match path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => parent.join(pattern).to_string_lossy().into_owned(),
            None => pattern,
        }
    }

    /// Pattern for a bare file name.
    pub fn pattern_name(&self, name: &str) -> String {
        let (stem, ext) = split_extension(name);
        let mut stem = stem.to_string();

        match self.tiling {
            TilingMode::Off => {}
            TilingMode::Udim => {
                if let Some((start, end)) = find_udim(&stem) {
                    stem.replace_range(start..end, UDIM_TOKEN);
                }
            }
            TilingMode::ZBrush | TilingMode::Mudbox => {
                let found = uv_tile_regex().find_iter(&stem).last().map(|m| m.range());
                if let Some(range) = found {
                    let token = if self.tiling == TilingMode::ZBrush {
                        ZBRUSH_TOKEN
                    } else {
                        MUDBOX_TOKEN
                    };
                    stem.replace_range(range, token);
                }
            }
        }

        if self.frame_extension {
            let found = frame_regex()
                .captures(&stem)
                .and_then(|c| c.get(1))
                .map(|m| m.range());
            if let Some(range) = found {
                stem.replace_range(range, FRAME_TOKEN);
            }
        }

        format!("{stem}{ext}")
    }

    /// Group key for a path: the base name of its pattern.
    pub fn group_key(&self, path: &Path) -> String {
        let name = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.pattern_name(&name)
    }
}

/// Splits `name` at its last dot; a leading dot does not start an extension.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(0) | None => (name, ""),
        Some(i) => name.split_at(i),
    }
}

/// Byte range of the last standalone 4-digit UDIM number in `stem`.
fn find_udim(stem: &str) -> Option<(usize, usize)> {
    let bytes = stem.as_bytes();
    let mut found = None;
    let mut i = 0;
    while i < bytes.len() {
        if !bytes[i].is_ascii_digit() {
            i += 1;
            continue;
        }
        let start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i - start != 4 {
            continue;
        }
        let udim: u32 = stem[start..i].parse().ok()?;
        if UDIM_RANGE.contains(&udim) {
            found = Some((start, i));
        }
    }
    found
}
