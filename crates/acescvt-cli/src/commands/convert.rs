//! Convert command: plan, confirm, run the batch on the worker.

use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::{Result, bail};
use tracing::{info, trace, warn};

use acescvt_core::{BatchEvent, BatchReport, WorkerEvent};

use super::plan::print_plan;
use super::{Context, build_session, scan, spawn_worker};
use crate::ConvertArgs;

pub fn run(args: ConvertArgs, ctx: &Context) -> Result<()> {
    trace!(dir = ?args.select.dir, yes = args.yes, "convert::run");

    let dir = ctx.resolve_directory(args.select.dir.as_deref())?;
    let worker = spawn_worker(ctx, args.program.as_deref());
    let groups = scan(&worker, &dir, ctx)?;
    let session = build_session(&dir, groups, &args.select)?;

    let selection = session.selection();
    if selection.is_empty() {
        bail!("Nothing selected in {}", dir.display());
    }
    print_plan(&selection, ctx.verbose);

    if args.dry_run {
        return Ok(());
    }
    if !args.yes && !confirm("Start conversion?")? {
        println!("Cancelled.");
        return Ok(());
    }

    info!(groups = selection.len(), "starting conversion");
    worker.start_convert(selection)?;

    let mut progress = Progress::default();
    let event = worker.wait(|e| {
        if let WorkerEvent::Batch(b) = e {
            progress.print(b, ctx.verbose);
        }
    })?;

    let report = match event {
        WorkerEvent::ConvertFinished(report) => report,
        WorkerEvent::Failed(e) => return Err(e.into()),
        other => bail!("Unexpected worker event: {other:?}"),
    };
    finish(&report, &dir)
}

fn finish(report: &BatchReport, dir: &Path) -> Result<()> {
    if report.success {
        println!("Finished. Please check your result.");
        println!("{}", dir.display());
        return Ok(());
    }
    eprintln!("{}", report.summary());
    bail!("{} file(s) failed", report.failed.len())
}

/// Asks a yes/no question on stdin; anything but y/yes is no.
fn confirm(question: &str) -> Result<bool> {
    print!("{question} [y/N] ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(is_yes(&line))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Current counters of a running batch.
#[derive(Default)]
struct Progress {
    group: usize,
    groups: usize,
    file: usize,
    files: usize,
}

impl Progress {
    fn print(&mut self, event: &BatchEvent, verbose: u8) {
        match event {
            BatchEvent::GroupStarted { title, index, total } => {
                self.group = *index;
                self.groups = *total;
                self.file = 0;
                self.files = 0;
                println!("[{index}/{total}] {title}");
            }
            BatchEvent::FileStarted { file, .. } => {
                if verbose > 0 {
                    println!("  Converting: {file}");
                }
            }
            BatchEvent::FileFinished {
                file,
                error: Some(err),
                ..
            } => {
                warn!(file = %file, error = %err, "conversion failed");
                eprintln!("  Error converting {file}: {err}");
            }
            BatchEvent::FileFinished { file, output, .. } => {
                if let (true, Some(out)) = (verbose > 0, output) {
                    println!("  {file} -> {}", out.display());
                }
            }
            BatchEvent::FileProgress { current, total } => {
                self.file = *current;
                self.files = *total;
                println!(
                    "  file {}/{} ({}%), group {}/{}",
                    self.file,
                    self.files,
                    percent(self.file, self.files),
                    self.group,
                    self.groups
                );
            }
            BatchEvent::GroupFinished { title, ok } => {
                if !ok {
                    println!("  {title}: finished with errors");
                }
            }
            BatchEvent::OverallProgress { current, total } => {
                println!("Overall {current}/{total} ({}%)", percent(*current, *total));
            }
        }
    }
}

fn percent(current: usize, total: usize) -> usize {
    if total == 0 {
        return 100;
    }
    current * 100 / total
}
