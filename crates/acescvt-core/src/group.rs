//! Texture grouping.
//!
//! Files of one texture series (all UDIM tiles of `wood_diffuse`, all frames
//! of a plate) are folded into a [`TextureGroup`] keyed by the series pattern
//! produced by [`PatternTokenizer`]. Each group is given a default
//! [`MapType`] from its first file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use tracing::{debug, info, trace};

use serde::Serialize;

use crate::{classify_map_type, Error, MapType, PatternTokenizer, Result, TextureFile};

/// Files sharing one group key, plus their map type.
///
/// Never empty: a group is created from its first file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextureGroup {
    key: String,
    files: Vec<TextureFile>,
    map_type: MapType,
}

impl TextureGroup {
    /// Starts a group from its first file and classifies it.
    pub fn new(key: impl Into<String>, first: TextureFile) -> Self {
        let map_type = classify_map_type(first.path());
        Self {
            key: key.into(),
            files: vec![first],
            map_type,
        }
    }

    /// Group key (display name).
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Member files in insertion order.
    pub fn files(&self) -> &[TextureFile] {
        &self.files
    }

    /// First member, the one used for classification.
    pub fn first(&self) -> &TextureFile {
        &self.files[0]
    }

    /// Number of files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// True if the group has no files, which grouping never produces.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Current map type.
    pub fn map_type(&self) -> MapType {
        self.map_type
    }

    /// Overrides the map type.
    pub fn set_map_type(&mut self, map_type: MapType) {
        self.map_type = map_type;
    }

    /// `"1 file"` / `"3 file(s)"`.
    pub fn count_label(&self) -> String {
        if self.files.len() > 1 {
            format!("{} file(s)", self.files.len())
        } else {
            format!("{} file", self.files.len())
        }
    }

    fn push(&mut self, file: TextureFile) {
        self.files.push(file);
    }
}

/// Insertion-ordered mapping from group key to group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct GroupMap {
    groups: Vec<TextureGroup>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl GroupMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `file` to the group for `key`, creating it on first sight.
    pub fn insert(&mut self, key: String, file: TextureFile) {
        match self.index.get(&key) {
            Some(&i) => self.groups[i].push(file),
            None => {
                self.index.insert(key.clone(), self.groups.len());
                self.groups.push(TextureGroup::new(key, file));
            }
        }
    }

    /// Group for a key.
    pub fn get(&self, key: &str) -> Option<&TextureGroup> {
        self.index.get(key).map(|&i| &self.groups[i])
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// True if there are no groups.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Keys in first-seen order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.key())
    }

    /// Groups in first-seen order.
    pub fn iter(&self) -> std::slice::Iter<'_, TextureGroup> {
        self.groups.iter()
    }

    /// Total number of files across groups.
    pub fn file_count(&self) -> usize {
        self.groups.iter().map(|g| g.len()).sum()
    }

    /// Consumes the map, yielding groups in order.
    pub fn into_groups(self) -> Vec<TextureGroup> {
        self.groups
    }
}

impl<'a> IntoIterator for &'a GroupMap {
    type Item = &'a TextureGroup;
    type IntoIter = std::slice::Iter<'a, TextureGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}

/// Groups paths into texture series.
///
/// Paths are sorted lexicographically first so the result does not depend on
/// directory enumeration order. Keys keep first-seen order. Paths are not
/// validated; missing files simply pass through.
pub fn group_files<I, P>(paths: I, tokenizer: &PatternTokenizer) -> GroupMap
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    group_files_with_progress(paths, tokenizer, |_, _| {})
}

/// [`group_files`] reporting `(done, total)` after each file.
pub fn group_files_with_progress<I, P, F>(
    paths: I,
    tokenizer: &PatternTokenizer,
    mut on_progress: F,
) -> GroupMap
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
    F: FnMut(usize, usize),
{
    let mut paths: Vec<PathBuf> = paths.into_iter().map(|p| p.as_ref().to_path_buf()).collect();
    paths.sort_by(|a, b| a.to_string_lossy().cmp(&b.to_string_lossy()));
    trace!(files = paths.len(), "group_files");

    let total = paths.len();
    let mut groups = GroupMap::new();
    for (i, path) in paths.into_iter().enumerate() {
        let key = tokenizer.group_key(&path);
        debug!(file = %path.display(), key = %key, "grouped");
        groups.insert(key, TextureFile::new(path));
        on_progress(i + 1, total);
    }
    groups
}

/// Lists the `*.*` files directly inside `dir`.
///
/// No recursion. Dot-files are skipped, as are subdirectories whose names
/// happen to contain a dot.
pub fn scan_directory(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::InvalidDirectory(dir.to_path_buf()));
    }

    let pattern = format!("{}/*.*", Pattern::escape(&dir.to_string_lossy()));
    let options = MatchOptions {
        require_literal_leading_dot: true,
        ..MatchOptions::new()
    };
    let entries = glob::glob_with(&pattern, options)
        .map_err(|_| Error::InvalidDirectory(dir.to_path_buf()))?;

    let files: Vec<PathBuf> = entries
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file())
        .collect();
    info!(dir = %dir.display(), files = files.len(), "Scanned directory");
    Ok(files)
}

/// Scans `dir` and groups its files.
pub fn scan_and_group(dir: &Path, tokenizer: &PatternTokenizer) -> Result<GroupMap> {
    Ok(group_files(scan_directory(dir)?, tokenizer))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(map: &GroupMap) -> Vec<&str> {
        map.keys().collect()
    }

    #[test]
    fn empty_input() {
        let map = group_files(Vec::<PathBuf>::new(), &PatternTokenizer::default());
        assert!(map.is_empty());
        assert_eq!(map.file_count(), 0);
    }

    #[test]
    fn udim_tiles_fold_together() {
        let paths = [
            "/tex/shot_diffuse.1002.exr",
            "/tex/shot_normal.1001.exr",
            "/tex/shot_diffuse.1001.exr",
        ];
        let map = group_files(paths, &PatternTokenizer::default());

        assert_eq!(keys(&map), ["shot_diffuse.<UDIM>.exr", "shot_normal.<UDIM>.exr"]);
        let diffuse = map.get("shot_diffuse.<UDIM>.exr").unwrap();
        assert_eq!(diffuse.len(), 2);
        assert_eq!(diffuse.first().base_name(), "shot_diffuse.1001.exr");
        assert_eq!(diffuse.map_type(), MapType::OutSrgb);
        assert_eq!(map.get("shot_normal.<UDIM>.exr").unwrap().map_type(), MapType::OutSrgb);
    }

    #[test]
    fn every_path_in_exactly_one_group() {
        let paths = [
            "b_albedo.1001.png",
            "a_rough.1001.png",
            "b_albedo.1002.png",
            "plate.png",
            "a_rough.1003.png",
        ];
        let map = group_files(paths, &PatternTokenizer::default());
        assert_eq!(map.file_count(), paths.len());
        for p in paths {
            let hits = map
                .iter()
                .filter(|g| g.files().iter().any(|f| f.path() == Path::new(p)))
                .count();
            assert_eq!(hits, 1, "{p}");
        }
        // Sorted input means keys come out in name order.
        assert_eq!(keys(&map), ["a_rough.<UDIM>.png", "b_albedo.<UDIM>.png", "plate.png"]);
    }

    #[test]
    fn map_keeps_first_seen_key_order() {
        let mut map = GroupMap::new();
        map.insert("z.png".into(), TextureFile::new("/t/z.png"));
        map.insert("a.<UDIM>.png".into(), TextureFile::new("/t/a.1001.png"));
        map.insert("z.png".into(), TextureFile::new("/t/z.png"));
        map.insert("a.<UDIM>.png".into(), TextureFile::new("/t/a.1002.png"));

        assert_eq!(keys(&map), ["z.png", "a.<UDIM>.png"]);
        assert_eq!(map.get("a.<UDIM>.png").unwrap().len(), 2);
        assert_eq!(map.get("z.png").unwrap().len(), 2);
        assert_eq!(map.file_count(), 4);
    }

    #[test]
    fn differing_names_stay_apart() {
        let map = group_files(
            ["wood_diffuse.1001.png", "wood_diffuze.1001.png"],
            &PatternTokenizer::default(),
        );
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn map_type_from_first_file() {
        let map = group_files(["x_diffuse.1001.png"], &PatternTokenizer::default());
        assert_eq!(map.iter().next().unwrap().map_type(), MapType::Color);
    }

    #[test]
    fn progress_reports_every_file() {
        let mut seen = Vec::new();
        group_files_with_progress(["a.png", "b.png"], &PatternTokenizer::default(), |d, t| {
            seen.push((d, t))
        });
        assert_eq!(seen, [(1, 2), (2, 2)]);
    }

    #[test]
    fn count_labels() {
        let map = group_files(["a.1001.png", "a.1002.png", "b.png"], &PatternTokenizer::default());
        assert_eq!(map.get("a.<UDIM>.png").unwrap().count_label(), "2 file(s)");
        assert_eq!(map.get("b.png").unwrap().count_label(), "1 file");
    }

    #[test]
    fn scan_rejects_missing_directory() {
        let err = scan_directory(Path::new("/no/such/dir/here")).unwrap_err();
        assert!(matches!(err, Error::InvalidDirectory(_)));
    }

    #[test]
    fn scan_lists_dotted_files_only() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.1001.png", "b.exr", "README", ".hidden.png"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        std::fs::create_dir(dir.path().join("sub.dir")).unwrap();

        let mut names: Vec<String> = scan_directory(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, ["a.1001.png", "b.exr"]);
    }

    #[test]
    fn empty_directory_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let map = scan_and_group(dir.path(), &PatternTokenizer::default()).unwrap();
        assert!(map.is_empty());
    }
}
