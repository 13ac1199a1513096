//! Single-line CEDICT grammar.
//!
//! `Traditional Simplified [pinyin] /gloss/`, anchored at both ends. Both
//! headwords are one or more code points whose Unicode script is Han. The
//! pinyin payload may not contain brackets; the gloss is everything between
//! the first `/` after the pinyin and the final `/`. Separators and fields
//! never span a line break, and a gloss that opens a second `] /` group is
//! two entries run together.

use cedict_types::{DictionaryEntry, EntryFields};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(\p{Script=Han}+)[\s&&[^\r\n]](\p{Script=Han}+)[\s&&[^\r\n]]\[([^\[\]\r\n]*)\][\s&&[^\r\n]]/([^\r\n]*)/$",
    )
    .expect("CEDICT line pattern compiles")
});

static SECOND_GROUP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\]\s/").expect("second group pattern compiles"));

/// The line does not match the entry grammar. No partial fields survive.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
#[error("not a CEDICT entry")]
pub struct NotAnEntry;

/// Match a whole line against the grammar and split it into its fields.
pub fn classify(line: &str) -> Result<EntryFields<'_>, NotAnEntry> {
    let caps = LINE_RE.captures(line).ok_or(NotAnEntry)?;
    let (matched, [traditional, simplified, pinyin, gloss]) = caps.extract();
    if SECOND_GROUP_RE.is_match(gloss) {
        return Err(NotAnEntry);
    }
    Ok(EntryFields {
        line: matched,
        traditional,
        simplified,
        pinyin,
        gloss,
    })
}

/// Attach metapinyin keys to matched fields.
pub fn annotate(fields: EntryFields<'_>) -> DictionaryEntry {
    let keys = metapinyin::derive(fields.pinyin);
    fields.into_entry(keys)
}

/// [`classify`] then [`annotate`].
pub fn parse_line(line: &str) -> Result<DictionaryEntry, NotAnEntry> {
    classify(line).map(annotate)
}
