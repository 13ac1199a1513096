//! Shared types that mirror a CEDICT dictionary line and its metapinyin keys.
//!
//! A line is first recognised as borrowed [`EntryFields`] (zero-copy slices of
//! the source line), then annotated into an owned [`DictionaryEntry`] that
//! carries all six [`MetapinyinKeys`]. An entry is never half-populated: it is
//! either fully built from a matching line or not built at all.
//!
//! Serialization keeps the short field names used by the JSON export
//! (`t`, `s`, `p`, `d`) with the keys flattened alongside them.
//!
//! ```rust
//! use cedict_types::{EntryFields, KeyKind};
//!
//! let fields = EntryFields {
//!     line: "中國 中国 [zhong1 guo2] /China/Middle Kingdom/",
//!     traditional: "中國",
//!     simplified: "中国",
//!     pinyin: "zhong1 guo2",
//!     gloss: "China/Middle Kingdom",
//! };
//! assert_eq!(fields.definitions().collect::<Vec<_>>(), ["China", "Middle Kingdom"]);
//! assert_eq!("phash".parse::<KeyKind>(), Ok(KeyKind::Phash));
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The five fields captured from a matching line, borrowed from that line.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EntryFields<'a> {
    pub line: &'a str,
    pub traditional: &'a str,
    pub simplified: &'a str,
    pub pinyin: &'a str,
    pub gloss: &'a str,
}

impl<'a> EntryFields<'a> {
    /// Individual senses of the gloss, split on `/` with empty pieces dropped.
    pub fn definitions(&self) -> impl Iterator<Item = &'a str> + 'a {
        split_gloss(self.gloss)
    }

    /// Copy the fields into an owned entry carrying the given keys.
    pub fn into_entry(self, keys: MetapinyinKeys) -> DictionaryEntry {
        DictionaryEntry {
            line: self.line.to_owned(),
            traditional: self.traditional.to_owned(),
            simplified: self.simplified.to_owned(),
            pinyin: self.pinyin.to_owned(),
            gloss: self.gloss.to_owned(),
            keys,
        }
    }
}

/// The six derived search keys for one romanization.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct MetapinyinKeys {
    pub pmash: String,
    pub pbash: String,
    pub psmash: String,
    pub phash: String,
    pub pmush: String,
    pub ppush: String,
}

impl MetapinyinKeys {
    /// Value of a single key by kind.
    pub fn get(&self, kind: KeyKind) -> &str {
        match kind {
            KeyKind::Pmash => &self.pmash,
            KeyKind::Pbash => &self.pbash,
            KeyKind::Psmash => &self.psmash,
            KeyKind::Phash => &self.phash,
            KeyKind::Pmush => &self.pmush,
            KeyKind::Ppush => &self.ppush,
        }
    }
}

/// A fully annotated dictionary record with no reference to its source text.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct DictionaryEntry {
    pub line: String,
    #[serde(rename = "t")]
    pub traditional: String,
    #[serde(rename = "s")]
    pub simplified: String,
    #[serde(rename = "p")]
    pub pinyin: String,
    #[serde(rename = "d")]
    pub gloss: String,
    #[serde(flatten)]
    pub keys: MetapinyinKeys,
}

impl DictionaryEntry {
    /// Individual senses of the gloss, split on `/` with empty pieces dropped.
    pub fn definitions(&self) -> impl Iterator<Item = &str> + '_ {
        split_gloss(&self.gloss)
    }

    /// Borrow the entry back as plain fields.
    pub fn fields(&self) -> EntryFields<'_> {
        EntryFields {
            line: &self.line,
            traditional: &self.traditional,
            simplified: &self.simplified,
            pinyin: &self.pinyin,
            gloss: &self.gloss,
        }
    }
}

/// Names one of the six metapinyin keys.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum KeyKind {
    /// Spaces removed, tone digits kept.
    Pmash,
    /// Spaces and tone digits removed.
    Pbash,
    /// First letter of every syllable.
    Psmash,
    /// Sorted distinct characters of `pbash`.
    Phash,
    /// `pmash` with `u:` folded to `v`.
    Pmush,
    /// `pbash` with `u:` folded to `v`.
    Ppush,
}

impl KeyKind {
    /// Every kind, in definition order.
    pub const ALL: [KeyKind; 6] = [
        KeyKind::Pmash,
        KeyKind::Pbash,
        KeyKind::Psmash,
        KeyKind::Phash,
        KeyKind::Pmush,
        KeyKind::Ppush,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            KeyKind::Pmash => "pmash",
            KeyKind::Pbash => "pbash",
            KeyKind::Psmash => "psmash",
            KeyKind::Phash => "phash",
            KeyKind::Pmush => "pmush",
            KeyKind::Ppush => "ppush",
        }
    }
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a metapinyin key.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnknownKeyKind(pub String);

impl fmt::Display for UnknownKeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown metapinyin key: {}", self.0)
    }
}

impl std::error::Error for UnknownKeyKind {}

impl FromStr for KeyKind {
    type Err = UnknownKeyKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KeyKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownKeyKind(s.to_owned()))
    }
}

fn split_gloss(gloss: &str) -> impl Iterator<Item = &str> {
    gloss.split('/').map(str::trim).filter(|s| !s.is_empty())
}
