use std::env;

use cedict_types::KeyKind;

fn main() {
    let inputs: Vec<String> = env::args().skip(1).collect();
    if inputs.is_empty() {
        eprintln!("usage: cargo run -p metapinyin --example keys -- <pinyin> [<pinyin>...]");
        std::process::exit(2);
    }

    for pinyin in inputs {
        let keys = metapinyin::derive(&pinyin);
        println!("\n[{}]", pinyin);
        for kind in KeyKind::ALL {
            println!("  {:<7} {}", kind.as_str(), keys.get(kind));
        }
    }
}
