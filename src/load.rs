//! Loading of line-oriented prefix lists.
//!
//! Each line holds one prefix in its textual form (`192.0.2.0/24`, `2001:db8::/32`, or a single
//! address). Everything from the first space, tab, carriage return or `;` on is ignored, which
//! allows trailing comments or extra columns:
//!
//! ```text
//! 192.0.2.0/24 AS64496
//! 2001:db8::/32;documentation
//! 0.0.0.0/0    ignored, default route
//! ```
//!
//! Lines that are empty after truncation are skipped. Default routes (prefixes with zero bits)
//! would match every address of their family and are skipped as well.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::{debug, info};

use crate::{parse_prefix, Error, PrefixTrie, Result};

/// Summary of a load operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Number of prefixes that were inserted (including ones that were already present).
    pub inserted: usize,
    /// Number of default routes that were skipped.
    pub skipped_default: usize,
    /// Number of lines without a prefix.
    pub blank: usize,
}

/// Cut a line at the first space, tab, carriage return, newline or `;`.
pub fn truncate_line(line: &str) -> &str {
    match line.find([' ', '\t', '\r', '\n', ';']) {
        Some(pos) => &line[..pos],
        None => line,
    }
}

/// Read a prefix list from `reader` and insert every prefix into `trie` with value `true`.
///
/// Loading stops at the first line that does not contain a valid prefix. Prefixes inserted before
/// that line remain in the trie.
///
/// ```
/// # use netmask_trie::*;
/// # fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
/// let list = "10.0.0.0/8 first\n0.0.0.0/0\n\n2001:db8::/32;second\n";
/// let mut trie = PrefixTrie::new();
/// let stats = load::load_prefixes(list.as_bytes(), &mut trie)?;
/// assert_eq!(stats.inserted, 2);
/// assert_eq!(stats.skipped_default, 1);
/// assert!(trie.matches("10.1.2.3".parse()?));
/// assert!(!trie.matches("11.1.2.3".parse()?));
/// # Ok(())
/// # }
/// ```
pub fn load_prefixes<R: BufRead>(reader: R, trie: &mut PrefixTrie<bool>) -> Result<LoadStats> {
    let mut stats = LoadStats::default();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        let text = truncate_line(&line);
        if text.is_empty() {
            stats.blank += 1;
            continue;
        }
        let prefix = parse_prefix(text).map_err(|e| Error::Line {
            line: lineno + 1,
            source: Box::new(e),
        })?;
        if prefix.prefix_len() == 0 {
            debug!("line {}: skipping default route {}", lineno + 1, prefix);
            stats.skipped_default += 1;
            continue;
        }
        *trie.insert(prefix) = true;
        stats.inserted += 1;
    }
    info!(
        "loaded {} prefixes ({} stored, {} default routes skipped)",
        stats.inserted,
        trie.len(),
        stats.skipped_default
    );
    Ok(stats)
}

/// Open the file at `path` and load it with [`load_prefixes`].
pub fn load_prefix_file<P: AsRef<Path>>(path: P, trie: &mut PrefixTrie<bool>) -> Result<LoadStats> {
    let path = path.as_ref();
    debug!("reading prefix list from {}", path.display());
    let file = File::open(path)?;
    load_prefixes(BufReader::new(file), trie)
}
