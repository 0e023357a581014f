//! Plan command: show what `convert` would do without running it.

use anyhow::{Result, bail};
use tracing::trace;

use acescvt_core::{ConversionJob, SelectedGroup, batch_summary, plan_batch};

use super::{Context, build_session, scan, spawn_worker};
use crate::SelectArgs;

pub fn run(args: SelectArgs, ctx: &Context) -> Result<()> {
    trace!(dir = ?args.dir, "plan::run");

    let dir = ctx.resolve_directory(args.dir.as_deref())?;
    let worker = spawn_worker(ctx, None);
    let groups = scan(&worker, &dir, ctx)?;
    let session = build_session(&dir, groups, &args)?;

    let selection = session.selection();
    if selection.is_empty() {
        bail!("Nothing selected in {}", dir.display());
    }
    print_plan(&selection, ctx.verbose);
    Ok(())
}

/// Prints the batch summary, and every step when verbose.
pub fn print_plan(selection: &[SelectedGroup], verbose: u8) {
    // Destinations are only shown by name, the temp directory is not created.
    let jobs = plan_batch(selection, &std::env::temp_dir());
    print!("{}", batch_summary(&jobs));
    if verbose > 0 {
        for job in &jobs {
            print_steps(job);
        }
    }
}

fn print_steps(job: &ConversionJob) {
    println!("{}: {} -> {}", job.title, job.colorspaces.from, job.colorspaces.to);
    for step in &job.steps {
        let dst = step.dst.file_name().map(|n| n.to_string_lossy());
        println!("    {} -> {}", step.file_name(), dst.unwrap_or_default());
    }
}
