use std::fs::File;
use std::io::BufWriter;

use cedict_db::{Cedict, LoadMode};
use cedict_json::{ExportOptions, OutputFormat, parse_fields, write_json};

const SAMPLE: &str = "\
# CC-CEDICT
#! version=1

中國 中国 [zhong1 guo2] /China/Middle Kingdom/
hello world [ni3 hao3] /hi/
好 好 [hao3] /good/
女孩 女孩 [nu:3 hai2] /girl/
";

fn load_sample(dir: &tempfile::TempDir) -> Cedict {
    let input = dir.path().join("cedict_ts.u8");
    std::fs::write(&input, SAMPLE).unwrap();
    Cedict::load_with_mode(&input, LoadMode::Mmap).unwrap()
}

#[test]
fn converts_file_to_json_array() {
    let dir = tempfile::tempdir().unwrap();
    let dict = load_sample(&dir);
    let output = dir.path().join("cedict.json");

    let file = File::create(&output).unwrap();
    let written = write_json(BufWriter::new(file), dict.entries(), &ExportOptions::default())
        .expect("write json");
    assert_eq!(written, 3);

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    let rows = value.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["line"], "中國 中国 [zhong1 guo2] /China/Middle Kingdom/");
    assert_eq!(rows[0]["d"], "China/Middle Kingdom");
    assert_eq!(rows[0]["phash"], "ghnouz");
    assert_eq!(rows[2]["pmush"], "nv3hai2");
}

#[test]
fn two_character_subset_as_json_lines() {
    let dir = tempfile::tempdir().unwrap();
    let dict = load_sample(&dir);
    let options = ExportOptions {
        fields: Some(parse_fields("s,d").unwrap()),
        simplified_len: Some(2),
        format: OutputFormat::Lines,
    };

    let mut out = Vec::new();
    let written = write_json(&mut out, dict.entries(), &options).unwrap();
    assert_eq!(written, 2);
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            r#"{"s":"中国","d":"China/Middle Kingdom"}"#,
            r#"{"s":"女孩","d":"girl"}"#,
        ]
    );
}
