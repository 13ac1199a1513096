use std::collections::HashSet;
use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use cedict_db::{Cedict, LoadMode};
use cedict_types::KeyKind;

fn main() -> Result<()> {
    let path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .context("usage: cargo run -p cedict-db --example stats -- <path-to-cedict_ts.u8>")?;

    let dict = Cedict::load_with_mode(&path, LoadMode::Mmap)
        .with_context(|| format!("loading CEDICT from {}", path.display()))?;
    let stats = dict.stats();

    println!("Dictionary: {}", path.display());
    for (key, value) in dict.header() {
        println!("  {:<10} {}", key, value);
    }
    println!("Lines        : {}", stats.lines);
    println!("Comments     : {}", stats.comments);
    println!("Blank lines  : {}", stats.blanks);
    println!("Rejected     : {}", stats.rejected);
    println!("Entries      : {}", stats.entries);

    let definitions: usize = dict.entries().iter().map(|e| e.definitions().count()).sum();
    println!("Definitions  : {}", definitions);

    for kind in KeyKind::ALL {
        let distinct: HashSet<&str> = dict.entries().iter().map(|e| e.keys.get(kind)).collect();
        println!("Distinct {:<6}: {}", kind.as_str(), distinct.len());
    }

    Ok(())
}
