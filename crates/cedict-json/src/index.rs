use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use bitvec::prelude::*;
use cedict_db::{Cedict, LoadMode};
use cedict_types::{DictionaryEntry, KeyKind};
use thiserror::Error;
use tracing::info;

const ALPHABET: usize = 26;
const KINDS: usize = KeyKind::ALL.len();

type BitSet = BitVec<usize, Lsb0>;

/// Exact-match lookup over the six metapinyin keys of a dictionary.
#[derive(Debug, Clone)]
pub struct KeyIndex {
    entries: Vec<DictionaryEntry>,
    by_key: [HashMap<String, Vec<usize>>; KINDS],
    contains: [BitSet; ALPHABET],
}

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("failed to load dictionary: {0:#}")]
    Load(anyhow::Error),
}

#[derive(Debug)]
pub struct LookupParams<'a> {
    pub kind: KeyKind,
    pub query: &'a str,
    pub must_include: &'a [u8],
    pub cannot_include: &'a [u8],
    pub page: usize,
    pub page_size: usize,
}

#[derive(Debug, Clone)]
pub struct QueryResult {
    /// The query after applying the key's own normalization.
    pub normalized: String,
    pub total: usize,
    pub items: Vec<DictionaryEntry>,
    pub has_more: bool,
}

impl KeyIndex {
    pub fn build_from_file<P: AsRef<Path>>(
        path: P,
        mode: LoadMode,
    ) -> Result<Arc<Self>, IndexError> {
        let dict = Cedict::load_with_mode(path, mode).map_err(IndexError::Load)?;
        let stats = dict.stats();
        info!(
            "parsed {} entries ({} comments, {} blank, {} rejected)",
            stats.entries, stats.comments, stats.blanks, stats.rejected
        );
        Ok(Arc::new(Self::build(dict.into_entries())))
    }

    pub fn build(entries: Vec<DictionaryEntry>) -> Self {
        let n = entries.len();
        let mut by_key: [HashMap<String, Vec<usize>>; KINDS] =
            array_init::array_init(|_| HashMap::new());
        let mut contains: [BitSet; ALPHABET] =
            array_init::array_init(|_| bitvec![usize, Lsb0; 0; n]);

        for (idx, entry) in entries.iter().enumerate() {
            for (slot, kind) in KeyKind::ALL.into_iter().enumerate() {
                by_key[slot]
                    .entry(entry.keys.get(kind).to_string())
                    .or_default()
                    .push(idx);
            }
            for slot in entry.keys.pbash.bytes().filter_map(letter_slot) {
                contains[slot].set(idx, true);
            }
        }

        for (slot, kind) in KeyKind::ALL.into_iter().enumerate() {
            info!("{} distinct {} keys", by_key[slot].len(), kind);
        }

        Self {
            entries,
            by_key,
            contains,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn lookup(&self, params: LookupParams<'_>) -> QueryResult {
        let normalized = normalize_query(params.kind, params.query);
        let slot = kind_slot(params.kind);
        let Some(ids) = self.by_key[slot].get(&normalized) else {
            return QueryResult {
                normalized,
                total: 0,
                items: Vec::new(),
                has_more: false,
            };
        };

        let mut candidates = bitvec![usize, Lsb0; 0; self.entries.len()];
        for idx in ids {
            candidates.set(*idx, true);
        }

        for slot in params.must_include.iter().filter_map(|l| letter_slot(*l)) {
            candidates &= &self.contains[slot];
            if candidates.not_any() {
                break;
            }
        }

        for slot in params.cannot_include.iter().filter_map(|l| letter_slot(*l)) {
            let mask = !self.contains[slot].clone();
            candidates &= &mask;
            if candidates.not_any() {
                break;
            }
        }

        let total = candidates.count_ones();
        let offset = params
            .page
            .saturating_sub(1)
            .saturating_mul(params.page_size);
        let items: Vec<DictionaryEntry> = candidates
            .iter_ones()
            .skip(offset)
            .take(params.page_size)
            .filter_map(|idx| self.entries.get(idx).cloned())
            .collect();
        let has_more = offset + items.len() < total;

        QueryResult {
            normalized,
            total,
            items,
            has_more,
        }
    }
}

/// Bitset slot for an ASCII letter; anything else has none.
fn letter_slot(letter: u8) -> Option<usize> {
    letter
        .to_ascii_lowercase()
        .checked_sub(b'a')
        .map(usize::from)
        .filter(|slot| *slot < ALPHABET)
}

fn kind_slot(kind: KeyKind) -> usize {
    KeyKind::ALL
        .iter()
        .position(|k| *k == kind)
        .unwrap_or_default()
}

/// Bring a user query into the same shape as the stored key.
///
/// Acronym queries are already acronyms, so they only get lower-cased and
/// stripped of whitespace; every other key is idempotent under its own
/// function.
pub fn normalize_query(kind: KeyKind, raw: &str) -> String {
    match kind {
        KeyKind::Psmash => metapinyin::strip_spaces(raw),
        other => metapinyin::key_for(other, raw),
    }
}

pub fn parse_letters(raw: &str) -> Result<Vec<u8>, LetterError> {
    let mut seen = HashSet::new();
    let mut result = Vec::new();
    for c in raw.chars() {
        if !c.is_ascii_alphabetic() {
            return Err(LetterError::InvalidChar(c));
        }
        let lower = c.to_ascii_lowercase() as u8;
        if seen.insert(lower) {
            result.push(lower);
        }
    }
    Ok(result)
}

#[derive(Debug, Error)]
pub enum LetterError {
    #[error("invalid letter filter character: {0}")]
    InvalidChar(char),
}
