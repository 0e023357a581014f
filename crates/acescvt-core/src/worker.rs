//! Single background worker.
//!
//! Scans and conversions run off the calling thread, one at a time. The
//! caller sends commands, the worker answers with [`WorkerEvent`]s:
//!
//! ```text
//! caller --WorkerMsg--> worker thread --WorkerEvent--> caller
//! ```
//!
//! A second operation is refused with [`Error::Busy`] while one is in
//! flight. There is no cancellation; a running operation always completes.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, trace};

use crate::group::group_files_with_progress;
use crate::plan::Selection;
use crate::{
    run_conversion, scan_directory, BatchEvent, BatchReport, Converter, Error, GroupMap,
    PatternTokenizer, Result,
};

/// Commands for the worker thread.
#[derive(Debug)]
enum WorkerMsg {
    Scan {
        directory: PathBuf,
        tokenizer: PatternTokenizer,
    },
    Convert(Selection),
    Shutdown,
}

/// Events from the worker thread.
#[derive(Debug)]
pub enum WorkerEvent {
    /// Files grouped so far during a scan.
    ScanProgress {
        /// Files done.
        done: usize,
        /// Files found.
        total: usize,
    },
    /// Scan finished.
    ScanFinished {
        /// Scanned directory.
        directory: PathBuf,
        /// Groups found; empty when the directory has no files.
        groups: GroupMap,
    },
    /// Progress of a running conversion.
    Batch(BatchEvent),
    /// Conversion finished; per-file failures are inside the report.
    ConvertFinished(BatchReport),
    /// Operation could not run at all.
    Failed(Error),
}

impl WorkerEvent {
    /// True for the last event of an operation.
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            Self::ScanFinished { .. } | Self::ConvertFinished(_) | Self::Failed(_)
        )
    }
}

/// Handle to the background worker.
pub struct Worker {
    tx: Sender<WorkerMsg>,
    rx: Receiver<WorkerEvent>,
    busy: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    /// Spawns the worker thread.
    pub fn spawn(converter: Arc<dyn Converter>) -> Self {
        let (tx_to_worker, rx_in_worker) = channel();
        let (tx_to_caller, rx_from_worker) = channel();
        let busy = Arc::new(AtomicBool::new(false));

        let worker_busy = Arc::clone(&busy);
        let handle = thread::spawn(move || {
            worker_loop(rx_in_worker, tx_to_caller, converter, worker_busy);
        });

        Self {
            tx: tx_to_worker,
            rx: rx_from_worker,
            busy,
            handle: Some(handle),
        }
    }

    /// True while an operation runs.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Starts scanning `directory`.
    ///
    /// An invalid directory is rejected here and no scan starts.
    pub fn start_scan(&self, directory: PathBuf, tokenizer: PatternTokenizer) -> Result<()> {
        if !directory.is_dir() {
            return Err(Error::InvalidDirectory(directory));
        }
        self.submit(WorkerMsg::Scan { directory, tokenizer })
    }

    /// Starts converting a selection.
    pub fn start_convert(&self, selection: Selection) -> Result<()> {
        if selection.iter().all(|s| s.files.is_empty()) {
            return Err(Error::NothingSelected);
        }
        self.submit(WorkerMsg::Convert(selection))
    }

    fn submit(&self, msg: WorkerMsg) -> Result<()> {
        if self.busy.swap(true, Ordering::SeqCst) {
            return Err(Error::Busy);
        }
        trace!(?msg, "submit");
        self.tx.send(msg).map_err(|_| {
            self.busy.store(false, Ordering::SeqCst);
            Error::WorkerGone
        })
    }

    /// Next event, blocking.
    pub fn recv(&self) -> Result<WorkerEvent> {
        self.rx.recv().map_err(|_| Error::WorkerGone)
    }

    /// Next event if one is queued.
    pub fn try_recv(&self) -> Option<WorkerEvent> {
        self.rx.try_recv().ok()
    }

    /// Blocks until the running operation finishes, passing progress events
    /// to `on_progress`. Returns the final event.
    pub fn wait<F>(&self, mut on_progress: F) -> Result<WorkerEvent>
    where
        F: FnMut(&WorkerEvent),
    {
        loop {
            let event = self.recv()?;
            if event.is_final() {
                return Ok(event);
            }
            on_progress(&event);
        }
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        let _ = self.tx.send(WorkerMsg::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn worker_loop(
    rx: Receiver<WorkerMsg>,
    tx: Sender<WorkerEvent>,
    converter: Arc<dyn Converter>,
    busy: Arc<AtomicBool>,
) {
    while let Ok(msg) = rx.recv() {
        let event = match msg {
            WorkerMsg::Shutdown => break,
            WorkerMsg::Scan { directory, tokenizer } => {
                match scan_directory(&directory) {
                    Ok(paths) => {
                        let groups = group_files_with_progress(paths, &tokenizer, |done, total| {
                            let _ = tx.send(WorkerEvent::ScanProgress { done, total });
                        });
                        WorkerEvent::ScanFinished { directory, groups }
                    }
                    Err(e) => WorkerEvent::Failed(e),
                }
            }
            WorkerMsg::Convert(selection) => {
                let report = run_conversion(&selection, converter.as_ref(), |e| {
                    let _ = tx.send(WorkerEvent::Batch(e));
                });
                match report {
                    Ok(report) => WorkerEvent::ConvertFinished(report),
                    Err(e) => WorkerEvent::Failed(e),
                }
            }
        };
        // Clear before reporting so a caller reacting to the final event can
        // start the next operation.
        busy.store(false, Ordering::SeqCst);
        if tx.send(event).is_err() {
            break;
        }
    }
    debug!("worker shutdown");
}
