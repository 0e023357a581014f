//! CLI command implementations.

pub mod config;
pub mod convert;
pub mod plan;
pub mod scan;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use acescvt_core::{
    EnvVarProbe, EnvironmentProbe, ExtensionFilter, ExternalConverter, GroupMap, MapType,
    Session, Settings, SortKey, Worker, WorkerEvent,
};
use anyhow::{Context as _, Result, bail};
use tracing::{debug, info, warn};

use crate::SelectArgs;

/// State shared by all commands.
pub struct Context {
    pub settings: Settings,
    pub settings_path: Option<PathBuf>,
    pub verbose: u8,
}

impl Context {
    /// Loads settings from `path` or the platform location.
    pub fn load(path: Option<PathBuf>, verbose: u8) -> Result<Self> {
        let settings_path = path.or_else(Settings::default_path);
        let settings = match &settings_path {
            Some(p) => Settings::load(p)
                .with_context(|| format!("Failed to load settings: {}", p.display()))?,
            None => Settings::default(),
        };
        Ok(Self {
            settings,
            settings_path,
            verbose,
        })
    }

    /// Picks the directory to work on: argument, host probe, last directory.
    pub fn resolve_directory(&self, arg: Option<&Path>) -> Result<PathBuf> {
        if let Some(dir) = arg {
            return Ok(dir.to_path_buf());
        }
        let probe = EnvVarProbe::new(&self.settings.probe_var);
        if let Some(dir) = probe.default_directory() {
            info!(host = probe.host_name(), dir = %dir.display(), "using probed directory");
            return Ok(dir);
        }
        match &self.settings.last_directory {
            Some(dir) => Ok(dir.clone()),
            None => bail!(
                "No directory given. Pass one, or set {}",
                self.settings.probe_var
            ),
        }
    }

    /// Converter from settings, with an optional program override.
    pub fn converter(&self, program: Option<&str>) -> ExternalConverter {
        let converter = self.settings.converter.clone();
        match program {
            Some(p) => converter.with_program(p),
            None => converter,
        }
    }

    /// Remembers `dir` as the last scanned directory.
    pub fn remember_directory(&self, dir: &Path) {
        let Some(path) = &self.settings_path else {
            return;
        };
        if self.settings.last_directory.as_deref() == Some(dir) {
            return;
        }
        let mut settings = self.settings.clone();
        settings.last_directory = Some(dir.to_path_buf());
        if let Err(e) = settings.save(path) {
            warn!(path = %path.display(), error = %e, "could not save settings");
        }
    }
}

/// Scans `dir` on the worker and returns the groups.
pub fn scan(worker: &Worker, dir: &Path, ctx: &Context) -> Result<GroupMap> {
    let dir = dir
        .canonicalize()
        .with_context(|| format!("Invalid directory: {}", dir.display()))?;
    worker.start_scan(dir.clone(), ctx.settings.tokenizer)?;

    let event = worker.wait(|e| {
        if let WorkerEvent::ScanProgress { done, total } = e {
            debug!(done, total, "grouping");
        }
    })?;
    match event {
        WorkerEvent::ScanFinished { directory, groups } => {
            info!(
                dir = %directory.display(),
                groups = groups.len(),
                files = groups.file_count(),
                "scan finished"
            );
            ctx.remember_directory(&directory);
            Ok(groups)
        }
        WorkerEvent::Failed(e) => Err(e.into()),
        other => bail!("Unexpected worker event: {other:?}"),
    }
}

/// Parses `name` or `type` into a sort key.
pub fn parse_sort(s: &str) -> Result<SortKey> {
    match s.trim().to_lowercase().as_str() {
        "name" => Ok(SortKey::Name),
        "type" | "map-type" | "maptype" => Ok(SortKey::MapType),
        _ => bail!("Unknown sort key: {s} (use name or type)"),
    }
}

/// Splits `KEY=TYPE`.
pub fn parse_type_override(s: &str) -> Result<(&str, MapType)> {
    let Some((key, ty)) = s.rsplit_once('=') else {
        bail!("Expected KEY=TYPE, got: {s}");
    };
    if key.is_empty() {
        bail!("Empty group key in: {s}");
    }
    Ok((key, ty.parse()?))
}

/// Splits `KEY:INDEX`.
pub fn parse_pick(s: &str) -> Result<(&str, usize)> {
    let Some((key, idx)) = s.rsplit_once(':') else {
        bail!("Expected KEY:INDEX, got: {s}");
    };
    let idx = idx
        .parse()
        .with_context(|| format!("Invalid file index in: {s}"))?;
    Ok((key, idx))
}

/// Builds a session from scan results and applies the selection flags.
///
/// Overrides from `--type` are set before anything is selected so they
/// stay local to their group; `--all-type` reaches every group in the
/// selection, including groups chosen only through `--pick`.
pub fn build_session(dir: &Path, groups: GroupMap, args: &SelectArgs) -> Result<Session> {
    let filter: ExtensionFilter = args.filter.parse()?;
    let mut session = Session::new(Some(dir.to_path_buf()), groups);
    session.apply_filter(filter);

    for arg in &args.types {
        let (key, map_type) = parse_type_override(arg)?;
        session.set_map_type(key, map_type)?;
    }

    if args.only.is_empty() && args.pick.is_empty() {
        session.select_all();
    } else {
        for key in &args.only {
            session.select(key, true)?;
        }
        for arg in &args.pick {
            let (key, idx) = parse_pick(arg)?;
            session.select_file(key, idx)?;
        }
    }

    if let Some(ty) = &args.all_type {
        let map_type: MapType = ty.parse()?;
        let changed = session.set_selection_map_type(map_type);
        debug!(%map_type, changed = changed.len(), "--all-type applied");
    }
    Ok(session)
}

/// Worker backed by the configured external converter.
pub fn spawn_worker(ctx: &Context, program: Option<&str>) -> Worker {
    Worker::spawn(Arc::new(ctx.converter(program)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_override_splits_on_last_equals() {
        let (key, ty) = parse_type_override("odd=name.png=plate").unwrap();
        assert_eq!(key, "odd=name.png");
        assert_eq!(ty, MapType::Plate);
        assert!(parse_type_override("wood.png").is_err());
        assert!(parse_type_override("=raw").is_err());
        assert!(parse_type_override("wood.png=bogus").is_err());
    }

    #[test]
    fn pick_parses_index() {
        assert_eq!(parse_pick("wood.<UDIM>.png:2").unwrap(), ("wood.<UDIM>.png", 2));
        assert!(parse_pick("wood.png:x").is_err());
        assert!(parse_pick("wood.png").is_err());
    }

    #[test]
    fn sort_keys() {
        assert_eq!(parse_sort("Name").unwrap(), SortKey::Name);
        assert_eq!(parse_sort("type").unwrap(), SortKey::MapType);
        assert!(parse_sort("size").is_err());
    }

    #[test]
    fn explicit_directory_wins() {
        let ctx = Context {
            settings: Settings::default(),
            settings_path: None,
            verbose: 0,
        };
        let dir = ctx.resolve_directory(Some(Path::new("/tex"))).unwrap();
        assert_eq!(dir, PathBuf::from("/tex"));
    }

    #[test]
    fn session_flags_apply_in_order() {
        let groups = acescvt_core::group_files(
            ["/t/a_mask.png", "/t/b_mask.png", "/t/c_diffuse.png", "/t/sky.hdr"],
            &Default::default(),
        );
        let args = SelectArgs {
            dir: None,
            filter: "srgb".into(),
            types: vec!["a_mask.png=plate".into()],
            only: vec!["b_mask.png".into(), "c_diffuse.png".into()],
            pick: Vec::new(),
            all_type: Some("hdr".into()),
        };
        let session = build_session(Path::new("/t"), groups, &args).unwrap();

        assert!(session.group("sky.hdr").is_some());
        assert_eq!(session.group("a_mask.png").unwrap().map_type(), MapType::Plate);
        let sel = session.selection();
        assert_eq!(sel.len(), 2);
        assert!(sel.iter().all(|s| s.map_type == MapType::Hdr));
    }

    #[test]
    fn scan_remembers_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("wood.1001.png"), b"").unwrap();
        let settings_path = dir.path().join("cfg").join("settings.ron");
        let ctx = Context::load(Some(settings_path.clone()), 0).unwrap();

        let worker = spawn_worker(&ctx, None);
        let groups = scan(&worker, dir.path(), &ctx).unwrap();
        assert_eq!(groups.keys().collect::<Vec<_>>(), ["wood.<UDIM>.png"]);

        let saved = Settings::load(&settings_path).unwrap();
        assert_eq!(saved.last_directory, Some(dir.path().canonicalize().unwrap()));
    }

    #[test]
    fn all_type_reaches_picked_groups() {
        let groups = acescvt_core::group_files(
            ["/t/a_mask.1001.png", "/t/a_mask.1002.png", "/t/b_mask.png", "/t/c_mask.png"],
            &Default::default(),
        );
        let args = SelectArgs {
            dir: None,
            filter: "all".into(),
            types: Vec::new(),
            only: Vec::new(),
            pick: vec!["a_mask.<UDIM>.png:1".into()],
            all_type: Some("color".into()),
        };
        let session = build_session(Path::new("/t"), groups, &args).unwrap();

        let sel = session.selection();
        assert_eq!(sel.len(), 1);
        assert_eq!(sel[0].map_type, MapType::Color);
        assert_eq!(sel[0].files.len(), 1);
        assert_eq!(session.group("b_mask.png").unwrap().map_type(), MapType::Raw);
    }
}
