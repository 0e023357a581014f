//! Session view-model.
//!
//! Holds the scanned groups together with their UI state: map type
//! overrides, selection, extension filter and sort order. Front-ends call
//! explicit methods instead of wiring widget callbacks; the session is the
//! single owner of that state.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::plan::{SelectedGroup, Selection};
use crate::{Error, ExtensionFilter, GroupMap, MapType, Result, TextureGroup};

/// Sort column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortKey {
    /// Group name, ascending.
    #[default]
    Name,
    /// Map type in declaration order, then name.
    MapType,
}

/// One group row and its UI state.
#[derive(Debug, Clone)]
pub struct GroupEntry {
    group: TextureGroup,
    selected: bool,
    hidden: bool,
    selected_files: BTreeSet<usize>,
}

impl GroupEntry {
    fn new(group: TextureGroup) -> Self {
        Self {
            group,
            selected: false,
            hidden: false,
            selected_files: BTreeSet::new(),
        }
    }

    /// The group.
    pub fn group(&self) -> &TextureGroup {
        &self.group
    }

    /// Whole group selected.
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Hidden by the current filter.
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Indices of individually selected files.
    pub fn selected_files(&self) -> impl Iterator<Item = usize> + '_ {
        self.selected_files.iter().copied()
    }
}

/// Groups of one directory scan plus their UI state.
#[derive(Debug, Clone, Default)]
pub struct Session {
    directory: Option<PathBuf>,
    entries: Vec<GroupEntry>,
    filter: ExtensionFilter,
    sort: SortKey,
}

impl Session {
    /// Creates a session from scan results, sorted by name.
    pub fn new(directory: Option<PathBuf>, groups: GroupMap) -> Self {
        let mut session = Self {
            directory,
            entries: groups.into_groups().into_iter().map(GroupEntry::new).collect(),
            filter: ExtensionFilter::All,
            sort: SortKey::Name,
        };
        session.sort_by(SortKey::Name);
        session
    }

    /// Session without a directory.
    pub fn from_groups(groups: GroupMap) -> Self {
        Self::new(None, groups)
    }

    /// Scanned directory, if any.
    pub fn directory(&self) -> Option<&Path> {
        self.directory.as_deref()
    }

    /// Number of groups, hidden ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the scan found nothing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rows not hidden by the filter.
    pub fn visible(&self) -> impl Iterator<Item = &GroupEntry> {
        self.entries.iter().filter(|e| !e.hidden)
    }

    /// All groups in display order, hidden ones included.
    pub fn groups(&self) -> impl Iterator<Item = &TextureGroup> {
        self.entries.iter().map(|e| &e.group)
    }

    /// Group by key.
    pub fn group(&self, key: &str) -> Option<&TextureGroup> {
        self.entries.iter().find(|e| e.group.key() == key).map(|e| &e.group)
    }

    fn index_of(&self, key: &str) -> Result<usize> {
        self.entries
            .iter()
            .position(|e| e.group.key() == key)
            .ok_or_else(|| Error::UnknownGroup(key.to_string()))
    }

    /// Current filter.
    pub fn filter(&self) -> ExtensionFilter {
        self.filter
    }

    /// Current sort column.
    pub fn sort_key(&self) -> SortKey {
        self.sort
    }

    /// Sets the map type of `key`.
    ///
    /// While any group is selected, the new type is applied to every
    /// selected group as well and `key` joins the selection. Returns the
    /// keys whose type actually changed.
    pub fn set_map_type(&mut self, key: &str, map_type: MapType) -> Result<Vec<String>> {
        let idx = self.index_of(key)?;
        let broadcast = self.entries.iter().any(|e| e.selected);

        let mut changed = Vec::new();
        for (i, entry) in self.entries.iter_mut().enumerate() {
            let target = i == idx || (broadcast && entry.selected);
            if target && entry.group.map_type() != map_type {
                entry.group.set_map_type(map_type);
                changed.push(entry.group.key().to_string());
            }
        }
        if broadcast && !self.entries[idx].hidden {
            self.entries[idx].selected = true;
        }
        debug!(key, %map_type, broadcast, changed = changed.len(), "set map type");
        Ok(changed)
    }

    /// Sets the map type on every group that contributes to
    /// [`Session::selection`], whole or by single files. The selection
    /// itself is left alone.
    pub fn set_selection_map_type(&mut self, map_type: MapType) -> Vec<String> {
        let mut changed = Vec::new();
        for entry in self.entries.iter_mut().filter(|e| !e.hidden) {
            let contributes = entry.selected || !entry.selected_files.is_empty();
            if contributes && entry.group.map_type() != map_type {
                entry.group.set_map_type(map_type);
                changed.push(entry.group.key().to_string());
            }
        }
        changed
    }

    /// Selects a whole group. Without `additive` the previous selection is
    /// cleared first. Hidden groups cannot be selected.
    pub fn select(&mut self, key: &str, additive: bool) -> Result<()> {
        let idx = self.index_of(key)?;
        if !additive {
            self.clear_selection();
        }
        let entry = &mut self.entries[idx];
        if !entry.hidden {
            entry.selected = true;
        }
        Ok(())
    }

    /// Selects every visible group.
    pub fn select_all(&mut self) {
        for entry in self.entries.iter_mut() {
            entry.selected = !entry.hidden;
        }
    }

    /// Selects a single file of a group by index, additively.
    pub fn select_file(&mut self, key: &str, index: usize) -> Result<()> {
        let idx = self.index_of(key)?;
        let entry = &mut self.entries[idx];
        if !entry.hidden && index < entry.group.len() {
            entry.selected_files.insert(index);
        }
        Ok(())
    }

    /// Removes a group from the selection.
    pub fn deselect(&mut self, key: &str) -> Result<()> {
        let idx = self.index_of(key)?;
        self.entries[idx].selected = false;
        self.entries[idx].selected_files.clear();
        Ok(())
    }

    /// Clears group and file selection.
    pub fn clear_selection(&mut self) {
        for entry in self.entries.iter_mut() {
            entry.selected = false;
            entry.selected_files.clear();
        }
    }

    /// Groups selected as a whole, in display order.
    pub fn selected_groups(&self) -> Vec<&TextureGroup> {
        self.entries
            .iter()
            .filter(|e| e.selected)
            .map(|e| &e.group)
            .collect()
    }

    /// Hides groups whose first file does not match `filter`.
    ///
    /// Hidden groups lose their selection.
    pub fn apply_filter(&mut self, filter: ExtensionFilter) {
        self.filter = filter;
        for entry in self.entries.iter_mut() {
            entry.hidden = !filter.matches(entry.group.first().path());
            if entry.hidden {
                entry.selected = false;
                entry.selected_files.clear();
            }
        }
    }

    /// Reorders rows.
    pub fn sort_by(&mut self, key: SortKey) {
        self.sort = key;
        match key {
            SortKey::Name => self
                .entries
                .sort_by(|a, b| a.group.key().cmp(b.group.key())),
            SortKey::MapType => self.entries.sort_by(|a, b| {
                a.group
                    .map_type()
                    .cmp(&b.group.map_type())
                    .then_with(|| a.group.key().cmp(b.group.key()))
            }),
        }
    }

    /// Files to convert, grouped by title.
    ///
    /// A selected group contributes all of its files. A group that is not
    /// selected but has individually selected files contributes only those.
    pub fn selection(&self) -> Selection {
        self.entries
            .iter()
            .filter(|e| !e.hidden)
            .filter_map(|e| {
                let files = if e.selected {
                    e.group.files().to_vec()
                } else if !e.selected_files.is_empty() {
                    e.selected_files
                        .iter()
                        .map(|&i| e.group.files()[i].clone())
                        .collect()
                } else {
                    return None;
                };
                Some(SelectedGroup {
                    title: e.group.key().to_string(),
                    map_type: e.group.map_type(),
                    files,
                })
            })
            .collect()
    }
}
