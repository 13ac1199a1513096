//! Load CEDICT dictionaries into owned, metapinyin-annotated entries.
//!
//! Each line of the source is split off, comment (`#`) and blank lines are
//! skipped, and every remaining line is matched against the entry grammar
//! ([`classify`]). Lines that match become [`DictionaryEntry`] values with all
//! six metapinyin keys filled in; lines that do not are counted and dropped.
//! Callers choose between memory-mapped files or owned buffers at runtime via
//! [`LoadMode`].
//!
//! # Features
//! - Unicode-script grammar: headwords must be Han script, including CJK
//!   extension blocks outside the BMP.
//! - Input order is preserved.
//! - `#! key=value` header lines are kept as ordered metadata.
//! - Load statistics (comments, blanks, rejected lines, entries).
//!
//! # Example
//! ```no_run
//! use cedict_db::{Cedict, LoadMode};
//!
//! # fn main() -> anyhow::Result<()> {
//! let dict = Cedict::load_with_mode("cedict_ts.u8", LoadMode::Mmap)?;
//! println!("version: {:?}", dict.header_value("version"));
//! for entry in dict.entries().iter().take(3) {
//!     println!("{} [{}] {}", entry.simplified, entry.keys.pbash, entry.gloss);
//! }
//! # Ok(()) }
//! ```
//!
//! For a runnable demo, see `cargo run -p cedict-db --example stats -- <cedict_ts.u8>`.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use cedict_types::DictionaryEntry;
use memmap2::Mmap;
use tracing::debug;

mod grammar;

pub use grammar::{NotAnEntry, annotate, classify, parse_line};

const COMMENT_MARKER: u8 = b'#';
const HEADER_MARKER: &str = "#!";
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Strategy for loading the dictionary file.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LoadMode {
    /// Memory-map the file (fast, no copy of the raw text).
    Mmap,
    /// Read the file into an owned buffer (portable fallback).
    Owned,
}

enum Buffer {
    Mmap(Mmap),
    Owned(Vec<u8>),
}

impl Buffer {
    fn as_slice(&self) -> &[u8] {
        match self {
            Buffer::Mmap(m) => m.as_ref(),
            Buffer::Owned(v) => v.as_slice(),
        }
    }
}

/// Line counts gathered while loading.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct LoadStats {
    /// Physical lines seen, including blanks and comments.
    pub lines: usize,
    pub comments: usize,
    pub blanks: usize,
    /// Lines that reached the grammar and did not match (or were not UTF-8).
    pub rejected: usize,
    pub entries: usize,
}

/// Parsed dictionary: annotated entries in source order plus header metadata.
pub struct Cedict {
    entries: Vec<DictionaryEntry>,
    header: Vec<(String, String)>,
    stats: LoadStats,
}

impl Cedict {
    /// Load a CEDICT file, memory-mapping it.
    ///
    /// Use [`load_with_mode`](Self::load_with_mode) to force an owned buffer.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with_mode(path, LoadMode::Mmap)
    }

    /// Load a CEDICT file choosing between mmap and owned buffers at runtime.
    pub fn load_with_mode(path: impl AsRef<Path>, mode: LoadMode) -> Result<Self> {
        let path = path.as_ref();
        let buffer = load_file(path, mode)?;
        let dict = Self::parse_bytes(buffer.as_slice());
        debug!(
            "loaded {} entries from {} ({} rejected)",
            dict.stats.entries,
            path.display(),
            dict.stats.rejected
        );
        Ok(dict)
    }

    /// Parse dictionary text already in memory.
    pub fn parse_str(text: &str) -> Self {
        Self::parse_bytes(text.as_bytes())
    }

    /// Parse raw dictionary bytes. Lines that are not UTF-8 count as rejected.
    pub fn parse_bytes(bytes: &[u8]) -> Self {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        let mut entries = Vec::new();
        let mut header = Vec::new();
        let mut stats = LoadStats::default();

        for raw_line in split_lines(bytes) {
            stats.lines += 1;
            if raw_line.is_empty() {
                stats.blanks += 1;
                continue;
            }
            if raw_line[0] == COMMENT_MARKER {
                stats.comments += 1;
                if let Some(pair) = std::str::from_utf8(raw_line).ok().and_then(parse_header) {
                    header.push(pair);
                }
                continue;
            }
            let Ok(line) = std::str::from_utf8(raw_line) else {
                stats.rejected += 1;
                continue;
            };
            match parse_line(line) {
                Ok(entry) => entries.push(entry),
                Err(NotAnEntry) => stats.rejected += 1,
            }
        }

        stats.entries = entries.len();
        Self {
            entries,
            header,
            stats,
        }
    }

    /// All entries in source order.
    pub fn entries(&self) -> &[DictionaryEntry] {
        &self.entries
    }

    /// Take ownership of the entries.
    pub fn into_entries(self) -> Vec<DictionaryEntry> {
        self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `#! key=value` pairs in the order they appeared.
    pub fn header(&self) -> &[(String, String)] {
        &self.header
    }

    /// Last header value recorded for `key`.
    pub fn header_value(&self, key: &str) -> Option<&str> {
        self.header
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn stats(&self) -> LoadStats {
        self.stats
    }
}

fn load_file(path: &Path, mode: LoadMode) -> Result<Buffer> {
    match mode {
        LoadMode::Mmap => {
            let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
            unsafe { Mmap::map(&file) }
                .map(Buffer::Mmap)
                .with_context(|| format!("mmap {}", path.display()))
        }
        LoadMode::Owned => {
            let mut file = File::open(path).with_context(|| format!("open {}", path.display()))?;
            let mut buf = Vec::new();
            file.read_to_end(&mut buf)
                .with_context(|| format!("read {}", path.display()))?;
            Ok(Buffer::Owned(buf))
        }
    }
}

/// Split on `\n`, `\r\n` or a lone `\r`. A trailing terminator does not
/// produce a final empty line.
fn split_lines(bytes: &[u8]) -> impl Iterator<Item = &[u8]> {
    let mut rest = bytes;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        match rest.iter().position(|b| matches!(b, b'\n' | b'\r')) {
            Some(end) => {
                let line = &rest[..end];
                let skip = if rest[end] == b'\r' && rest.get(end + 1) == Some(&b'\n') {
                    2
                } else {
                    1
                };
                rest = &rest[end + skip..];
                Some(line)
            }
            None => {
                let line = rest;
                rest = &[];
                Some(line)
            }
        }
    })
}

fn parse_header(line: &str) -> Option<(String, String)> {
    let body = line.strip_prefix(HEADER_MARKER)?;
    let (key, value) = body.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key.to_string(), value.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# CC-CEDICT
#! version=1
#! entries=3
中國 中国 [zhong1 guo2] /China/Middle Kingdom/

hello world [ni3 hao3] /hi/
女孩 女孩 [nu:3 hai2] /girl/lass/
你好 你好 [ni3 hao3] /hello/hi/
";

    #[test]
    fn keeps_entries_in_source_order() {
        let dict = Cedict::parse_str(SAMPLE);
        let simplified: Vec<&str> = dict
            .entries()
            .iter()
            .map(|e| e.simplified.as_str())
            .collect();
        assert_eq!(simplified, vec!["中国", "女孩", "你好"]);
        assert_eq!(dict.entries()[1].keys.ppush, "nvhai");
    }

    #[test]
    fn counts_every_line_kind() {
        let stats = Cedict::parse_str(SAMPLE).stats();
        assert_eq!(
            stats,
            LoadStats {
                lines: 8,
                comments: 3,
                blanks: 1,
                rejected: 1,
                entries: 3,
            }
        );
    }

    #[test]
    fn collects_header_metadata() {
        let dict = Cedict::parse_str(SAMPLE);
        assert_eq!(
            dict.header(),
            &[
                ("version".to_string(), "1".to_string()),
                ("entries".to_string(), "3".to_string()),
            ]
        );
        assert_eq!(dict.header_value("entries"), Some("3"));
        assert_eq!(dict.header_value("license"), None);
    }

    #[test]
    fn splits_on_any_line_terminator() {
        let lines: Vec<&[u8]> = split_lines(b"a\r\nb\rc\n\nd").collect();
        assert_eq!(lines, vec![&b"a"[..], &b"b"[..], &b"c"[..], &b""[..], &b"d"[..]]);
        assert_eq!(split_lines(b"a\n").count(), 1);
        assert_eq!(split_lines(b"").count(), 0);
    }

    #[test]
    fn windows_line_endings_do_not_leak_into_gloss() {
        let dict = Cedict::parse_str("你好 你好 [ni3 hao3] /hello/\r\n好 好 [hao3] /good/\r\n");
        assert_eq!(dict.len(), 2);
        assert_eq!(dict.entries()[0].gloss, "hello");
        assert_eq!(dict.stats().blanks, 0);
    }

    #[test]
    fn indented_comment_is_rejected_not_skipped() {
        let dict = Cedict::parse_str(" # not at column zero\n");
        assert!(dict.is_empty());
        assert_eq!(dict.stats().comments, 0);
        assert_eq!(dict.stats().rejected, 1);
    }

    #[test]
    fn leading_byte_order_mark_is_ignored() {
        let dict = Cedict::parse_str("\u{feff}#! version=1\n好 好 [hao3] /good/\n");
        assert_eq!(dict.header_value("version"), Some("1"));
        assert_eq!(dict.len(), 1);
    }

    #[test]
    fn invalid_utf8_counts_as_rejected() {
        let mut bytes = "好 好 [hao3] /good/\n".as_bytes().to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe, b'\n']);
        let dict = Cedict::parse_bytes(&bytes);
        assert_eq!(dict.len(), 1);
        assert_eq!(dict.stats().rejected, 1);
    }

    #[test]
    fn header_requires_key_value() {
        assert_eq!(
            parse_header("#! date = 2024-01-01"),
            Some(("date".into(), "2024-01-01".into()))
        );
        assert_eq!(parse_header("#! no equals"), None);
        assert_eq!(parse_header("# version=1"), None);
        assert_eq!(parse_header("#! =x"), None);
    }
}
