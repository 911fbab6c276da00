//! Formatting implementation for the PrefixTrie and the AddressSet

use std::fmt::{Debug, Display, Formatter, Result};

use super::*;

/// Shows the tree structure: every node is a map containing its IPv4 and IPv6 entries, and its
/// children under the keys `0` and `1`. The root is shown even if it is empty.
impl<V: Debug> Debug for PrefixTrie<V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        if self.table.is_empty() {
            f.debug_map().finish()
        } else {
            DebugNode(self, 0).fmt(f)
        }
    }
}

struct DebugNode<'a, V>(&'a PrefixTrie<V>, usize);

impl<V: Debug> Debug for DebugNode<'_, V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let trie = self.0;
        let node = &trie.table[self.1];
        let mut map = f.debug_map();
        for pos in [node.v4, node.v6].into_iter().flatten() {
            let entry = &trie.entries[pos];
            map.entry(&format_args!("{}", entry.prefix), &entry.value);
        }
        if let Some(left) = node.left {
            map.entry(&0, &Self(trie, left));
        }
        if let Some(right) = node.right {
            map.entry(&1, &Self(trie, right));
        }
        map.finish()
    }
}

impl Debug for AddressSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        self.0.fmt(f)
    }
}

/// Comma separated list of all masks, in insertion order. Negative masks start with `!`.
impl Display for AddressSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        for (i, mask) in self.to_string_list().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(mask)?;
        }
        Ok(())
    }
}
