//! End-to-end tests: scan a directory, adjust the session, convert.

use std::fs;
use std::path::{Path, PathBuf};

use acescvt_core::{
    run_conversion, scan_and_group, BatchEvent, Converter, Error, MapType, PatternTokenizer,
    Result, Session,
};

/// Writes the source bytes plus the transform to `dst`; fails on "broken".
struct RecordingConverter;

impl Converter for RecordingConverter {
    fn convert(&self, src: &Path, dst: &Path, from: &str, to: &str) -> Result<PathBuf> {
        let name = src.file_name().unwrap().to_string_lossy();
        if name.contains("broken") {
            return Err(Error::ConverterFailed {
                status: "exit status: 1".into(),
                stderr: format!("cannot read {name}"),
            });
        }
        let mut bytes = fs::read(src)?;
        bytes.extend_from_slice(format!("|{from}->{to}").as_bytes());
        fs::write(dst, bytes)?;
        Ok(dst.to_path_buf())
    }
}

fn touch(dir: &Path, names: &[&str]) {
    for n in names {
        fs::write(dir.join(n), n.as_bytes()).unwrap();
    }
}

#[test]
fn udim_series_grouped_and_classified() {
    let dir = tempfile::tempdir().unwrap();
    touch(
        dir.path(),
        &["shot_diffuse.1001.exr", "shot_diffuse.1002.exr", "shot_normal.1001.exr"],
    );

    let groups = scan_and_group(dir.path(), &PatternTokenizer::default()).unwrap();
    let keys: Vec<&str> = groups.keys().collect();
    assert_eq!(keys, ["shot_diffuse.<UDIM>.exr", "shot_normal.<UDIM>.exr"]);

    let diffuse = groups.get("shot_diffuse.<UDIM>.exr").unwrap();
    assert_eq!(diffuse.len(), 2);
    for g in &groups {
        assert_eq!(g.map_type(), MapType::OutSrgb);
        assert_eq!(g.map_type().output_extension(), ".png");
    }
}

#[test]
fn one_failure_among_two_groups() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), &["good_albedo.png", "broken_rough.png"]);

    let groups = scan_and_group(dir.path(), &PatternTokenizer::default()).unwrap();
    let mut session = Session::new(Some(dir.path().to_path_buf()), groups);
    session.select_all();

    let mut group_results = Vec::new();
    let report = run_conversion(&session.selection(), &RecordingConverter, |e| {
        if let BatchEvent::GroupFinished { title, ok } = e {
            group_results.push((title, ok));
        }
    })
    .unwrap();

    assert!(!report.success);
    assert_eq!(report.failed, ["broken_rough.png"]);
    assert_eq!(
        group_results,
        [("broken_rough.png".to_string(), false), ("good_albedo.png".to_string(), true)]
    );

    let placed = dir.path().join("good_albedo.exr");
    assert_eq!(report.converted, [placed.clone()]);
    let bytes = fs::read_to_string(&placed).unwrap();
    assert_eq!(bytes, "good_albedo.png|Utility - sRGB - Texture->ACES - ACEScg");
    assert!(!dir.path().join("broken_rough.exr").exists());
}

#[test]
fn override_broadcast_reaches_converter() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), &["a_mask.1001.png", "a_mask.1002.png", "b_mask.png", "c_mask.png"]);

    let groups = scan_and_group(dir.path(), &PatternTokenizer::default()).unwrap();
    let mut session = Session::new(Some(dir.path().to_path_buf()), groups);
    session.select("a_mask.<UDIM>.png", false).unwrap();
    session.select("b_mask.png", true).unwrap();
    session.set_map_type("b_mask.png", MapType::Plate).unwrap();

    let selection = session.selection();
    assert_eq!(selection.len(), 2);
    assert!(selection.iter().all(|s| s.map_type == MapType::Plate));
    assert_eq!(session.group("c_mask.png").unwrap().map_type(), MapType::Raw);

    let report = run_conversion(&selection, &RecordingConverter, |_| {}).unwrap();
    assert!(report.success);
    assert_eq!(report.converted.len(), 3);
    let text = fs::read_to_string(dir.path().join("a_mask.1002.exr")).unwrap();
    assert!(text.ends_with("|Output - sRGB->ACES - ACEScg"));
}

#[test]
fn out_srgb_writes_png_next_to_source() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), &["render.1001.exr"]);

    let groups = scan_and_group(dir.path(), &PatternTokenizer::default()).unwrap();
    let mut session = Session::from_groups(groups);
    session.select_all();

    let report = run_conversion(&session.selection(), &RecordingConverter, |_| {}).unwrap();
    assert!(report.success);
    let text = fs::read_to_string(dir.path().join("render.1001.png")).unwrap();
    assert_eq!(text, "render.1001.exr|ACES - ACEScg->Output - sRGB");
}

#[test]
fn empty_directory_yields_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let groups = scan_and_group(dir.path(), &PatternTokenizer::default()).unwrap();
    assert!(groups.is_empty());

    let session = Session::from_groups(groups);
    let err = run_conversion(&session.selection(), &RecordingConverter, |_| {}).unwrap_err();
    assert!(matches!(err, Error::NothingSelected));
}
