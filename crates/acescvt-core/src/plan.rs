//! Conversion planning.
//!
//! Turns a group (or a partial selection of its files) and a map type into
//! concrete source/destination pairs. Pure data, no I/O.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::{ColorspacePair, MapType, TextureFile, TextureGroup};

/// One file to convert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionStep {
    /// Original texture.
    pub src: PathBuf,
    /// Converted file in the temp directory.
    pub dst: PathBuf,
}

impl ConversionStep {
    /// Base name of the source, used in progress and failure reports.
    pub fn file_name(&self) -> String {
        self.src
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// All conversions for one group with one transform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionJob {
    /// Group title.
    pub title: String,
    /// Map type the transform comes from.
    pub map_type: MapType,
    /// Transform handed to the converter.
    pub colorspaces: ColorspacePair,
    /// Files in order.
    pub steps: Vec<ConversionStep>,
}

impl ConversionJob {
    /// Number of files.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// True when there is nothing to convert.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Two-line summary: title, then file count and type.
    pub fn summary(&self) -> String {
        format!(
            "- {}\n  {} File(s), Type: {}",
            self.title,
            self.steps.len(),
            self.map_type
        )
    }
}

/// Files chosen for conversion from one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectedGroup {
    /// Group title.
    pub title: String,
    /// Map type currently set on the group.
    pub map_type: MapType,
    /// Chosen files, a subset of the group in group order.
    pub files: Vec<TextureFile>,
}

/// Ordered conversion selection, one entry per group.
pub type Selection = Vec<SelectedGroup>;

/// Plans a whole group.
pub fn plan_conversion(group: &TextureGroup, map_type: MapType, temp_dir: &Path) -> ConversionJob {
    plan_files(group.key(), group.files(), map_type, temp_dir)
}

/// Plans an explicit list of files under one title.
///
/// Each destination is `temp_dir/<stem><ext>` where the extension is fixed
/// by the map type.
pub fn plan_files(
    title: &str,
    files: &[TextureFile],
    map_type: MapType,
    temp_dir: &Path,
) -> ConversionJob {
    let ext = map_type.output_extension();
    let steps = files
        .iter()
        .map(|f| ConversionStep {
            src: f.path().to_path_buf(),
            dst: temp_dir.join(format!("{}{}", f.stem(), ext)),
        })
        .collect();

    ConversionJob {
        title: title.to_string(),
        map_type,
        colorspaces: map_type.colorspaces(),
        steps,
    }
}

/// Plans every entry of a selection, keeping its order.
pub fn plan_batch(selection: &[SelectedGroup], temp_dir: &Path) -> Vec<ConversionJob> {
    selection
        .iter()
        .map(|s| plan_files(&s.title, &s.files, s.map_type, temp_dir))
        .collect()
}

/// Confirmation text listing every job.
pub fn batch_summary(jobs: &[ConversionJob]) -> String {
    let mut text = String::from("List of file(s) to convert\n");
    for job in jobs {
        text.push_str(&job.summary());
        text.push('\n');
    }
    text
}
