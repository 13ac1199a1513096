//! Metapinyin: lenient search keys derived from a CEDICT romanization.
//!
//! Every key is a pure, total function of the pinyin string. Two primitive
//! normalizations ([`strip_spaces`], [`strip_digits`]) and the umlaut fold
//! ([`umlaut_fold`]) are composed into six separately named keys:
//!
//! | key      | definition                                   | `nu:3 hai2` |
//! |----------|----------------------------------------------|-------------|
//! | `pmash`  | `strip_spaces(p)`                            | `nu:3hai2`  |
//! | `pbash`  | `strip_spaces(strip_digits(p))`              | `nu:hai`    |
//! | `psmash` | first char of each space-separated syllable  | `nh`        |
//! | `phash`  | distinct chars of `pbash`, sorted            | `:ahinu`    |
//! | `pmush`  | `umlaut_fold(pmash)`                         | `nv3hai2`   |
//! | `ppush`  | `umlaut_fold(pbash)`                         | `nvhai`     |
//!
//! Lower-casing uses the full Unicode mapping; only ASCII `0`-`9` count as
//! digits.
//!
//! # Example
//! ```rust
//! let keys = metapinyin::derive("zhong1 guo2");
//! assert_eq!(keys.pmash, "zhong1guo2");
//! assert_eq!(keys.pbash, "zhongguo");
//! assert_eq!(keys.psmash, "zg");
//! assert_eq!(keys.phash, "ghnouz");
//! ```
//!
//! For a runnable demo, see `cargo run -p metapinyin --example keys -- "nu:3 hai2"`.

use std::collections::BTreeSet;

use cedict_types::{KeyKind, MetapinyinKeys};

/// Compute all six keys for a romanization.
pub fn derive(pinyin: &str) -> MetapinyinKeys {
    MetapinyinKeys {
        pmash: pmash(pinyin),
        pbash: pbash(pinyin),
        psmash: psmash(pinyin),
        phash: phash(pinyin),
        pmush: pmush(pinyin),
        ppush: ppush(pinyin),
    }
}

/// Compute a single key by kind.
pub fn key_for(kind: KeyKind, pinyin: &str) -> String {
    match kind {
        KeyKind::Pmash => pmash(pinyin),
        KeyKind::Pbash => pbash(pinyin),
        KeyKind::Psmash => psmash(pinyin),
        KeyKind::Phash => phash(pinyin),
        KeyKind::Pmush => pmush(pinyin),
        KeyKind::Ppush => ppush(pinyin),
    }
}

/// Syllables run together, tone digits kept.
pub fn pmash(pinyin: &str) -> String {
    strip_spaces(pinyin)
}

/// Syllables run together, tone digits dropped.
pub fn pbash(pinyin: &str) -> String {
    strip_spaces(&strip_digits(pinyin))
}

/// Syllable-initial acronym.
///
/// Splits on the literal space only. Empty tokens (leading, trailing or
/// doubled spaces) contribute nothing. A token starting with a digit
/// contributes that digit as-is.
pub fn psmash(pinyin: &str) -> String {
    pinyin
        .to_lowercase()
        .split(' ')
        .filter_map(|syllable| syllable.chars().next())
        .collect()
}

/// Order- and repetition-independent fingerprint of the letters in `pbash`.
pub fn phash(pinyin: &str) -> String {
    pbash(pinyin)
        .chars()
        .collect::<BTreeSet<char>>()
        .into_iter()
        .collect()
}

/// `pmash` with `u:` folded to `v`.
pub fn pmush(pinyin: &str) -> String {
    umlaut_fold(&strip_spaces(pinyin))
}

/// `pbash` with `u:` folded to `v`.
pub fn ppush(pinyin: &str) -> String {
    umlaut_fold(&strip_spaces(&strip_digits(pinyin)))
}

/// Lower-case, then drop every Unicode whitespace character.
pub fn strip_spaces(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

/// Lower-case, then drop every ASCII digit.
pub fn strip_digits(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .filter(|c| !c.is_ascii_digit())
        .collect()
}

/// Replace each `u:` (either case of `u`) with `v`.
pub fn umlaut_fold(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if matches!(c, 'u' | 'U') && chars.peek() == Some(&':') {
            chars.next();
            out.push('v');
        } else {
            out.push(c);
        }
    }
    out
}
