//! JSON export of annotated entries, with optional projection and filtering.
//!
//! Output objects use the short field names `line, t, s, p, d` followed by the
//! six metapinyin keys, so the file can be sliced further with tools such as
//! `jq '.[] | {s,d}'`.

use std::io::Write;
use std::str::FromStr;

use cedict_types::{DictionaryEntry, KeyKind};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// A single output field, by its JSON name.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Field {
    Line,
    Traditional,
    Simplified,
    Pinyin,
    Gloss,
    Key(KeyKind),
}

impl Field {
    pub fn name(self) -> &'static str {
        match self {
            Field::Line => "line",
            Field::Traditional => "t",
            Field::Simplified => "s",
            Field::Pinyin => "p",
            Field::Gloss => "d",
            Field::Key(kind) => kind.as_str(),
        }
    }

    fn value<'a>(self, entry: &'a DictionaryEntry) -> &'a str {
        match self {
            Field::Line => &entry.line,
            Field::Traditional => &entry.traditional,
            Field::Simplified => &entry.simplified,
            Field::Pinyin => &entry.pinyin,
            Field::Gloss => &entry.gloss,
            Field::Key(kind) => entry.keys.get(kind),
        }
    }
}

impl FromStr for Field {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "line" => Ok(Field::Line),
            "t" => Ok(Field::Traditional),
            "s" => Ok(Field::Simplified),
            "p" => Ok(Field::Pinyin),
            "d" => Ok(Field::Gloss),
            other => other
                .parse::<KeyKind>()
                .map(Field::Key)
                .map_err(|_| ExportError::UnknownField(other.to_string())),
        }
    }
}

/// Parse a comma separated field list such as `s,d` or `{s,d}`.
pub fn parse_fields(raw: &str) -> Result<Vec<Field>, ExportError> {
    let inner = raw.trim().trim_start_matches('{').trim_end_matches('}');
    let fields = inner
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::parse)
        .collect::<Result<Vec<Field>, _>>()?;
    if fields.is_empty() {
        return Err(ExportError::EmptyFieldList);
    }
    Ok(fields)
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum OutputFormat {
    /// JSON array indented by two spaces.
    #[default]
    Pretty,
    /// JSON array on one line.
    Compact,
    /// One object per line.
    Lines,
}

#[derive(Clone, Debug, Default)]
pub struct ExportOptions {
    pub fields: Option<Vec<Field>>,
    /// Keep only entries whose simplified form has this many characters.
    pub simplified_len: Option<usize>,
    pub format: OutputFormat,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("unknown field: {0}")]
    UnknownField(String),
    #[error("field list is empty")]
    EmptyFieldList,
    #[error("failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Serialize)]
#[serde(untagged)]
enum Row<'a> {
    Full(&'a DictionaryEntry),
    Projected(Map<String, Value>),
}

impl ExportOptions {
    fn keeps(&self, entry: &DictionaryEntry) -> bool {
        self.simplified_len
            .is_none_or(|len| entry.simplified.chars().count() == len)
    }

    fn row<'a>(&self, entry: &'a DictionaryEntry) -> Row<'a> {
        match &self.fields {
            None => Row::Full(entry),
            Some(fields) => Row::Projected(
                fields
                    .iter()
                    .map(|f| (f.name().to_string(), Value::from(f.value(entry))))
                    .collect(),
            ),
        }
    }
}

/// Write the selected entries as JSON and return how many were written.
pub fn write_json<W: Write>(
    mut writer: W,
    entries: &[DictionaryEntry],
    options: &ExportOptions,
) -> Result<usize, ExportError> {
    let rows: Vec<Row<'_>> = entries
        .iter()
        .filter(|entry| options.keeps(entry))
        .map(|entry| options.row(entry))
        .collect();

    match options.format {
        OutputFormat::Pretty => serde_json::to_writer_pretty(&mut writer, &rows)?,
        OutputFormat::Compact => serde_json::to_writer(&mut writer, &rows)?,
        OutputFormat::Lines => {
            for row in &rows {
                serde_json::to_writer(&mut writer, row)?;
                writer.write_all(b"\n")?;
            }
        }
    }
    if options.format != OutputFormat::Lines {
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cedict_db::Cedict;

    fn entries() -> Vec<DictionaryEntry> {
        Cedict::parse_str(
            "中國 中国 [zhong1 guo2] /China/Middle Kingdom/\n\
             好 好 [hao3] /good/\n\
             女孩 女孩 [nu:3 hai2] /girl/\n",
        )
        .into_entries()
    }

    fn export(options: &ExportOptions) -> (usize, String) {
        let mut out = Vec::new();
        let written = write_json(&mut out, &entries(), options).unwrap();
        (written, String::from_utf8(out).unwrap())
    }

    #[test]
    fn pretty_output_keeps_field_order() {
        let (written, text) = export(&ExportOptions::default());
        assert_eq!(written, 3);
        assert!(text.starts_with("[\n  {\n    \"line\": "));
        let value: Value = serde_json::from_str(&text).unwrap();
        let first = value[0].as_object().unwrap();
        let keys: Vec<&str> = first.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "line", "t", "s", "p", "d", "pmash", "pbash", "psmash", "phash", "pmush", "ppush"
            ]
        );
        assert_eq!(value[2]["ppush"], "nvhai");
    }

    #[test]
    fn projects_requested_fields_in_order() {
        let options = ExportOptions {
            fields: Some(parse_fields("{d,s}").unwrap()),
            format: OutputFormat::Compact,
            ..ExportOptions::default()
        };
        let (_, text) = export(&options);
        assert!(text.starts_with(r#"[{"d":"China/Middle Kingdom","s":"中国"}"#));
    }

    #[test]
    fn filters_by_simplified_length() {
        let options = ExportOptions {
            fields: Some(vec![Field::Simplified]),
            simplified_len: Some(2),
            format: OutputFormat::Lines,
        };
        let (written, text) = export(&options);
        assert_eq!(written, 2);
        assert_eq!(text, "{\"s\":\"中国\"}\n{\"s\":\"女孩\"}\n");
    }

    #[test]
    fn empty_selection_is_an_empty_array() {
        let options = ExportOptions {
            simplified_len: Some(9),
            format: OutputFormat::Compact,
            ..ExportOptions::default()
        };
        assert_eq!(export(&options), (0, "[]\n".to_string()));
    }

    #[test]
    fn rejects_unknown_fields() {
        assert!(matches!(
            parse_fields("s,x"),
            Err(ExportError::UnknownField(name)) if name == "x"
        ));
        assert!(matches!(parse_fields("{}"), Err(ExportError::EmptyFieldList)));
        assert_eq!(
            parse_fields("line, pbash").unwrap(),
            vec![Field::Line, Field::Key(KeyKind::Pbash)]
        );
    }
}
