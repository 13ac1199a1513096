use std::path::PathBuf;

use cedict_db::{Cedict, LoadMode, LoadStats};

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("cedict_sample.u8")
}

#[test]
fn loads_fixture_with_full_fields() {
    let dict = Cedict::load(fixture_path()).expect("load fixture");
    let china = &dict.entries()[0];
    assert_eq!(china.line, "中國 中国 [Zhong1 guo2] /China/Middle Kingdom/");
    assert_eq!(china.traditional, "中國");
    assert_eq!(china.simplified, "中国");
    assert_eq!(china.pinyin, "Zhong1 guo2");
    assert_eq!(china.gloss, "China/Middle Kingdom");
    assert_eq!(china.keys.pmash, "zhong1guo2");
    assert_eq!(china.keys.psmash, "zg");
    assert_eq!(china.keys.phash, "ghnouz");
}

#[test]
fn both_load_modes_agree() {
    let mapped = Cedict::load_with_mode(fixture_path(), LoadMode::Mmap).expect("mmap");
    let owned = Cedict::load_with_mode(fixture_path(), LoadMode::Owned).expect("owned");
    assert_eq!(mapped.entries(), owned.entries());
    assert_eq!(mapped.stats(), owned.stats());
}

#[test]
fn reports_line_statistics() {
    let dict = Cedict::load(fixture_path()).expect("load fixture");
    assert_eq!(
        dict.stats(),
        LoadStats {
            lines: 24,
            comments: 13,
            blanks: 1,
            rejected: 2,
            entries: 8,
        }
    );
    assert_eq!(
        dict.header_value("entries").and_then(|n| n.parse::<usize>().ok()),
        Some(dict.len())
    );
    assert_eq!(dict.header_value("format"), Some("ts"));
}

#[test]
fn umlaut_entries_fold_to_v() {
    let dict = Cedict::load(fixture_path()).expect("load fixture");
    let green = dict
        .entries()
        .iter()
        .find(|e| e.simplified == "绿色")
        .expect("green present");
    assert_eq!(green.keys.pbash, "lu:se");
    assert_eq!(green.keys.ppush, "lvse");
    assert_eq!(green.keys.pmush, "lv4se4");
}

#[test]
fn keeps_supplementary_plane_headwords() {
    let dict = Cedict::load(fixture_path()).expect("load fixture");
    assert!(dict.entries().iter().any(|e| e.traditional == "𠮷"));
}

#[test]
fn missing_file_is_an_error_with_path() {
    let err = match Cedict::load("/nonexistent/cedict_ts.u8") {
        Ok(_) => panic!("loading a missing file should fail"),
        Err(err) => err,
    };
    assert!(format!("{err:#}").contains("/nonexistent/cedict_ts.u8"));
}

#[test]
fn loads_generated_file_from_tempdir() {
    let tempdir = tempfile::tempdir().unwrap();
    let path = tempdir.path().join("cedict_ts.u8");
    std::fs::write(&path, "#! version=1\r\n好 好 [hao3] /good/\r\n").unwrap();
    let dict = Cedict::load_with_mode(&path, LoadMode::Owned).unwrap();
    assert_eq!(dict.len(), 1);
    assert_eq!(dict.entries()[0].gloss, "good");
    assert_eq!(dict.header_value("version"), Some("1"));
}
