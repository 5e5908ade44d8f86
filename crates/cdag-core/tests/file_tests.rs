use cdag_core::prelude::*;
use cdag_core::FileError;
use pretty_assertions::assert_eq;
use std::io::Write;

const PODCAST_TOML: &str = r#"
exposure = "podcast"
outcome = "exam"
relations = [
    "podcast ~ mood + humor + prepared",
    "exam ~ mood + prepared + podcast",
]
"#;

fn write_temp(suffix: &str, text: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_toml_and_solve() {
    let file = write_temp(".toml", PODCAST_TOML);
    let dag = DagFile::load(file.path()).unwrap().build().unwrap();

    let sets = AdjustmentSetSolver::for_designated(&dag)
        .unwrap()
        .find_adjustment_sets()
        .unwrap();
    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].to_string(), "{mood, prepared}");
}

#[test]
fn test_load_json() {
    let file = write_temp(
        ".json",
        r#"{"exposure": "x", "outcome": "y", "relations": ["x ~ q", "y ~ q"]}"#,
    );
    let dag = DagFile::load(file.path()).unwrap().build().unwrap();
    assert_eq!(dag.parents("y").unwrap(), vec!["q"]);
}

#[test]
fn test_unsupported_extension() {
    let file = write_temp(".yaml", "exposure: x");
    assert!(matches!(
        DagFile::load(file.path()),
        Err(FileError::UnsupportedFormat(_))
    ));
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");
    assert!(matches!(DagFile::load(&missing), Err(FileError::Io { .. })));
}

#[test]
fn test_cyclic_file_fails_to_build() {
    let file = write_temp(".toml", "relations = [\"b ~ a\", \"a ~ b\"]\n");
    let parsed = DagFile::load(file.path()).unwrap();
    assert!(matches!(parsed.build(), Err(GraphError::Cycle { .. })));
}
