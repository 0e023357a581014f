//! Batch conversion.
//!
//! Runs planned jobs one file at a time through a [`Converter`], copies each
//! result back next to its source and keeps going after failures. Progress is
//! reported through a callback as [`BatchEvent`]s with two nested counters:
//! files within the current group, and groups within the batch.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, trace, warn};

use crate::plan::{plan_batch, ConversionJob, ConversionStep, SelectedGroup};
use crate::{Converter, Error, Result};

/// Progress notifications emitted while a batch runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum BatchEvent {
    /// A group is about to be processed.
    GroupStarted {
        /// Group title.
        title: String,
        /// 1-based group number.
        index: usize,
        /// Number of groups.
        total: usize,
    },
    /// A file is about to be converted.
    FileStarted {
        /// Group title.
        title: String,
        /// Source base name.
        file: String,
        /// 1-based group number.
        group_index: usize,
        /// Number of groups.
        group_total: usize,
    },
    /// A file finished, successfully or not.
    FileFinished {
        /// Group title.
        title: String,
        /// Source base name.
        file: String,
        /// Where the result landed, if it succeeded.
        output: Option<PathBuf>,
        /// Failure message, if it failed.
        error: Option<String>,
    },
    /// Files done within the current group.
    FileProgress {
        /// Files done.
        current: usize,
        /// Files in the group.
        total: usize,
    },
    /// A group finished; `ok` is false if any of its files failed.
    GroupFinished {
        /// Group title.
        title: String,
        /// All files succeeded.
        ok: bool,
    },
    /// Groups done within the batch.
    OverallProgress {
        /// Groups done.
        current: usize,
        /// Groups in the batch.
        total: usize,
    },
}

/// Outcome of a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// True when every file converted and copied back.
    pub success: bool,
    /// Base names of failed sources, in processing order.
    pub failed: Vec<String>,
    /// Final locations of converted files, next to their sources.
    pub converted: Vec<PathBuf>,
}

impl BatchReport {
    /// Failure count and names, one per line.
    pub fn summary(&self) -> String {
        if self.failed.is_empty() {
            return format!("{} file(s) converted", self.converted.len());
        }
        format!(
            "{} Failed image(s):\n- {}",
            self.failed.len(),
            self.failed.join("\n- ")
        )
    }
}

/// Runs every job in order.
///
/// A failing file is recorded and skipped; the remaining files and groups
/// still run. The report is a failure if any file failed.
pub fn run_batch<C, F>(jobs: &[ConversionJob], converter: &C, mut on_event: F) -> BatchReport
where
    C: Converter + ?Sized,
    F: FnMut(BatchEvent),
{
    trace!(groups = jobs.len(), "run_batch");
    let total_groups = jobs.len();
    let total_files: usize = jobs.iter().map(|j| j.len()).sum();
    info!(groups = total_groups, files = total_files, "Starting batch conversion");

    let mut report = BatchReport {
        success: true,
        ..Default::default()
    };

    for (gi, job) in jobs.iter().enumerate() {
        on_event(BatchEvent::GroupStarted {
            title: job.title.clone(),
            index: gi + 1,
            total: total_groups,
        });

        let mut group_ok = true;
        for (fi, step) in job.steps.iter().enumerate() {
            let file = step.file_name();
            on_event(BatchEvent::FileStarted {
                title: job.title.clone(),
                file: file.clone(),
                group_index: gi + 1,
                group_total: total_groups,
            });

            match convert_step(step, job, converter) {
                Ok(placed) => {
                    debug!(file = %file, output = %placed.display(), "converted");
                    report.converted.push(placed.clone());
                    on_event(BatchEvent::FileFinished {
                        title: job.title.clone(),
                        file,
                        output: Some(placed),
                        error: None,
                    });
                }
                Err(e) => {
                    warn!(file = %file, error = %e, "conversion failed");
                    group_ok = false;
                    report.success = false;
                    report.failed.push(file.clone());
                    on_event(BatchEvent::FileFinished {
                        title: job.title.clone(),
                        file,
                        output: None,
                        error: Some(e.to_string()),
                    });
                }
            }

            on_event(BatchEvent::FileProgress {
                current: fi + 1,
                total: job.len(),
            });
        }

        on_event(BatchEvent::GroupFinished {
            title: job.title.clone(),
            ok: group_ok,
        });
        on_event(BatchEvent::OverallProgress {
            current: gi + 1,
            total: total_groups,
        });
    }

    info!(
        converted = report.converted.len(),
        failed = report.failed.len(),
        "Batch conversion complete"
    );
    report
}

/// Converts one file and copies the result next to its source.
fn convert_step<C>(step: &ConversionStep, job: &ConversionJob, converter: &C) -> Result<PathBuf>
where
    C: Converter + ?Sized,
{
    let converted = converter.convert(
        &step.src,
        &step.dst,
        job.colorspaces.from,
        job.colorspaces.to,
    )?;
    let name = converted
        .file_name()
        .ok_or_else(|| Error::MissingOutput(converted.clone()))?;
    let placed = step.src.parent().unwrap_or(Path::new(".")).join(name);
    fs::copy(&converted, &placed)?;
    Ok(placed)
}

/// True if a file can be created in `dir`.
pub fn is_writable(dir: &Path) -> bool {
    tempfile::NamedTempFile::new_in(dir).is_ok()
}

/// Plans and runs a selection through a scratch directory.
///
/// Every target directory is checked for write access before anything runs.
/// The scratch directory is removed afterwards; removal errors are ignored.
pub fn run_conversion<C, F>(selection: &[SelectedGroup], converter: &C, on_event: F) -> Result<BatchReport>
where
    C: Converter + ?Sized,
    F: FnMut(BatchEvent),
{
    if selection.iter().all(|s| s.files.is_empty()) {
        return Err(Error::NothingSelected);
    }

    let dirs: BTreeSet<PathBuf> = selection
        .iter()
        .flat_map(|s| s.files.iter().map(|f| f.directory().to_path_buf()))
        .collect();
    if let Some(dir) = dirs.into_iter().find(|d| !is_writable(d)) {
        return Err(Error::NotWritable(dir));
    }

    let temp = tempfile::Builder::new().prefix("acescvt-").tempdir()?;
    debug!(temp = %temp.path().display(), "created scratch directory");

    let jobs = plan_batch(selection, temp.path());
    let report = run_batch(&jobs, converter, on_event);

    let _ = temp.close();
    Ok(report)
}
