//! Scan command: list texture groups and their guessed map types.

use anyhow::Result;
use serde::Serialize;
use tracing::trace;

use acescvt_core::{ExtensionFilter, Session};

use super::{Context, parse_sort, scan, spawn_worker};
use crate::ScanArgs;

#[derive(Serialize)]
struct GroupRow<'a> {
    key: &'a str,
    map_type: acescvt_core::MapType,
    from: &'static str,
    to: &'static str,
    files: Vec<FileRow>,
}

#[derive(Serialize)]
struct FileRow {
    name: String,
    modified: Option<String>,
}

pub fn run(args: ScanArgs, ctx: &Context) -> Result<()> {
    trace!(dir = ?args.dir, filter = %args.filter, "scan::run");

    let filter: ExtensionFilter = args.filter.parse()?;
    let sort = parse_sort(&args.sort)?;
    let dir = ctx.resolve_directory(args.dir.as_deref())?;

    let worker = spawn_worker(ctx, None);
    let groups = scan(&worker, &dir, ctx)?;

    let mut session = Session::new(Some(dir.clone()), groups);
    session.apply_filter(filter);
    session.sort_by(sort);

    let rows: Vec<GroupRow> = session
        .visible()
        .map(|e| {
            let g = e.group();
            let cs = g.map_type().colorspaces();
            GroupRow {
                key: g.key(),
                map_type: g.map_type(),
                from: cs.from,
                to: cs.to,
                files: g
                    .files()
                    .iter()
                    .map(|f| FileRow {
                        name: f.base_name(),
                        modified: f.modified_display(),
                    })
                    .collect(),
            }
        })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!("No textures found in {} ({})", dir.display(), filter);
        return Ok(());
    }

    println!("{} ({})", dir.display(), filter);
    let width = rows.iter().map(|r| r.key.len()).max().unwrap_or(0);
    for e in session.visible() {
        let g = e.group();
        println!(
            "  {:<width$}  {:>10}  {}",
            g.key(),
            g.count_label(),
            g.map_type(),
        );
        if ctx.verbose > 0 {
            for f in g.files() {
                let mtime = f.modified_display().unwrap_or_else(|| "-".into());
                println!("      {:<width$}  {}", f.base_name(), mtime);
            }
        }
    }
    let files: usize = rows.iter().map(|r| r.files.len()).sum();
    println!("{} group(s), {} file(s)", rows.len(), files);
    Ok(())
}
