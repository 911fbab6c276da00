//! Load a prefix list and report how much of the IPv4 space it covers.
//!
//! Every /24 block is probed with its first address. The per-/16 counts of covered blocks are
//! written as `a<TAB>b<TAB>count` lines, ready for a heat map.
//!
//! ```text
//! RUST_LOG=info cargo run --release --example coverage -- prefixes.txt [output]
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::net::{IpAddr, Ipv4Addr};
use std::process::ExitCode;

use netmask_trie::{load, PrefixTrie};

fn run(input: &str, output: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut trie = PrefixTrie::new();
    let stats = load::load_prefix_file(input, &mut trie)?;
    println!(
        "Have {} netmasks ({} lines read)",
        trie.len(),
        stats.inserted + stats.skipped_default + stats.blank
    );

    let mut plot = vec![[0u16; 256]; 256];
    let mut announced: u64 = 0;
    for a in 0..=255u8 {
        for b in 0..=255u8 {
            for c in 0..=255u8 {
                if trie.matches(IpAddr::V4(Ipv4Addr::new(a, b, c, 0))) {
                    plot[a as usize][b as usize] += 1;
                    announced += 256;
                }
            }
        }
    }
    println!(
        "{} IPv4 addresses announced ({:.4}%)",
        announced,
        100.0 * announced as f64 / (1u64 << 32) as f64
    );

    println!("Writing data to file '{output}'");
    let mut out = BufWriter::new(File::create(output)?);
    for (a, row) in plot.iter().enumerate() {
        for (b, count) in row.iter().enumerate() {
            writeln!(out, "{a}\t{b}\t{count}")?;
        }
    }
    out.flush()?;
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let (input, output) = match args.as_slice() {
        [_, input] => (input.as_str(), "denso"),
        [_, input, output] => (input.as_str(), output.as_str()),
        _ => {
            eprintln!("Syntax: coverage prefixesfile [output]");
            return ExitCode::FAILURE;
        }
    };

    match run(input, output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("coverage: {e}");
            ExitCode::FAILURE
        }
    }
}
