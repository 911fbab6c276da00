//! Implementation of the per-bit prefix trie.

use std::net::IpAddr;

use ipnet::IpNet;

use crate::family::{self, Family};
use crate::{parse_addr, parse_prefix, Result};

mod iter;

pub use iter::*;

/// Index of the root node in the table. The root only exists after the first insert.
const ROOT: usize = 0;

/// Prefix trie storing one value per IPv4 or IPv6 prefix. Every node represents exactly one bit of
/// the address, so all operations take at most 32 (IPv4) or 128 (IPv6) steps.
///
/// The trie keeps its entries in insertion order next to the tree. This gives `O(1)` access to
/// [`PrefixTrie::len`] and lets the iterators yield entries in the order they were inserted.
pub struct PrefixTrie<V> {
    pub(crate) table: Vec<Node>,
    free: Vec<usize>,
    pub(crate) entries: Vec<Entry<V>>,
    compact: bool,
}

/// A single node in the tree. Children and the parent are indices into the table.
#[derive(Debug, Clone, Default)]
pub(crate) struct Node {
    /// Number of bits consumed to reach this node.
    pub(crate) depth: u8,
    pub(crate) parent: Option<usize>,
    pub(crate) left: Option<usize>,
    pub(crate) right: Option<usize>,
    /// Position of the IPv4 entry ending at this node.
    pub(crate) v4: Option<usize>,
    /// Position of the IPv6 entry ending at this node.
    pub(crate) v6: Option<usize>,
}

impl Node {
    #[inline(always)]
    pub(crate) fn slot(&self, family: Family) -> Option<usize> {
        match family {
            Family::V4 => self.v4,
            Family::V6 => self.v6,
        }
    }

    #[inline(always)]
    fn slot_mut(&mut self, family: Family) -> &mut Option<usize> {
        match family {
            Family::V4 => &mut self.v4,
            Family::V6 => &mut self.v6,
        }
    }

    #[inline(always)]
    pub(crate) fn child(&self, right: bool) -> Option<usize> {
        if right {
            self.right
        } else {
            self.left
        }
    }

    /// A node without children and without any payload can be removed from the tree.
    #[inline(always)]
    fn is_vacant(&self) -> bool {
        self.left.is_none() && self.right.is_none() && self.v4.is_none() && self.v6.is_none()
    }
}

/// A stored prefix and its value, together with the node it ends at.
#[derive(Debug, Clone)]
pub(crate) struct Entry<V> {
    pub(crate) node: usize,
    pub(crate) prefix: IpNet,
    pub(crate) value: V,
}

impl<V> Default for PrefixTrie<V> {
    fn default() -> Self {
        Self {
            table: Vec::new(),
            free: Vec::new(),
            entries: Vec::new(),
            compact: false,
        }
    }
}

impl<V> PrefixTrie<V> {
    /// Create an empty trie that keeps the tree structure when erasing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty trie. If `compact` is set, [`PrefixTrie::erase`] removes all nodes that
    /// became useless (without children and without payload in either family).
    ///
    /// ```
    /// # use netmask_trie::*;
    /// let trie: PrefixTrie<u32> = PrefixTrie::with_compaction(true);
    /// assert!(trie.compacts_on_erase());
    /// assert!(!PrefixTrie::<u32>::new().compacts_on_erase());
    /// ```
    pub fn with_compaction(compact: bool) -> Self {
        Self {
            compact,
            ..Self::default()
        }
    }

    /// Whether erasing compacts the tree.
    pub fn compacts_on_erase(&self) -> bool {
        self.compact
    }

    /// Returns the number of entries stored in `self`.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the trie contains no entries.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert `prefix` and return a mutable reference to its value. If the prefix is new, its value
    /// is `V::default()`. Host bits of `prefix` are ignored; the stored key is `prefix.trunc()`.
    ///
    /// ```
    /// # use netmask_trie::*;
    /// # fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    /// let mut trie: PrefixTrie<u32> = PrefixTrie::new();
    /// *trie.insert("10.0.0.0/8".parse()?) = 1;
    /// *trie.insert("10.0.0.0/8".parse()?) += 1;
    /// assert_eq!(trie.get(&"10.0.0.0/8".parse()?), Some(&2));
    /// assert_eq!(trie.len(), 1);
    /// # Ok(())
    /// # }
    /// ```
    pub fn insert(&mut self, prefix: IpNet) -> &mut V
    where
        V: Default,
    {
        let (node, prefix) = self.make_path(prefix);
        let pos = match self.table[node].slot(Family::of_net(&prefix)) {
            Some(pos) => pos,
            None => self.push_entry(node, prefix, V::default()),
        };
        &mut self.entries[pos].value
    }

    /// Insert `prefix` with `value`. If the prefix was already present, the old value is replaced
    /// and returned.
    ///
    /// ```
    /// # use netmask_trie::*;
    /// # fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    /// let mut trie: PrefixTrie<&str> = PrefixTrie::new();
    /// assert_eq!(trie.insert_or_assign("2001:db8::/32".parse()?, "a"), None);
    /// assert_eq!(trie.insert_or_assign("2001:db8::/32".parse()?, "b"), Some("a"));
    /// assert_eq!(trie.len(), 1);
    /// # Ok(())
    /// # }
    /// ```
    pub fn insert_or_assign(&mut self, prefix: IpNet, value: V) -> Option<V> {
        let (node, prefix) = self.make_path(prefix);
        match self.table[node].slot(Family::of_net(&prefix)) {
            Some(pos) => Some(std::mem::replace(&mut self.entries[pos].value, value)),
            None => {
                self.push_entry(node, prefix, value);
                None
            }
        }
    }

    /// Parse `text` as a prefix and insert it. See [`PrefixTrie::insert`].
    pub fn insert_str(&mut self, text: &str) -> Result<&mut V>
    where
        V: Default,
    {
        Ok(self.insert(parse_prefix(text)?))
    }

    /// Parse `text` as a prefix and insert it with `value`. See [`PrefixTrie::insert_or_assign`].
    pub fn insert_or_assign_str(&mut self, text: &str, value: V) -> Result<Option<V>> {
        Ok(self.insert_or_assign(parse_prefix(text)?, value))
    }

    /// Longest-prefix match of `addr`, considering only prefixes of at most `max_bits` bits.
    /// `max_bits` is clamped to the width of the address family.
    ///
    /// ```
    /// # use netmask_trie::*;
    /// # fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    /// let mut trie: PrefixTrie<char> = PrefixTrie::new();
    /// trie.insert_or_assign("10.0.0.0/8".parse()?, 'a');
    /// trie.insert_or_assign("10.1.0.0/16".parse()?, 'b');
    /// let addr = "10.1.2.3".parse()?;
    /// assert_eq!(trie.lookup(addr, 32), Some((&"10.1.0.0/16".parse()?, &'b')));
    /// assert_eq!(trie.lookup(addr, 15), Some((&"10.0.0.0/8".parse()?, &'a')));
    /// assert_eq!(trie.lookup(addr, 7), None);
    /// # Ok(())
    /// # }
    /// ```
    pub fn lookup(&self, addr: IpAddr, max_bits: u8) -> Option<(&IpNet, &V)> {
        self.best_match(&addr, max_bits).map(|pos| {
            let entry = &self.entries[pos];
            (&entry.prefix, &entry.value)
        })
    }

    /// Longest-prefix match of `addr`, using all bits of the address.
    pub fn lookup_addr(&self, addr: IpAddr) -> Option<(&IpNet, &V)> {
        self.lookup(addr, Family::of(&addr).width())
    }

    /// Longest-prefix match of `prefix`, using only its significant bits. The result is either
    /// `prefix` itself or the longest stored prefix that contains it.
    ///
    /// ```
    /// # use netmask_trie::*;
    /// # fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    /// let mut trie: PrefixTrie<u32> = PrefixTrie::new();
    /// trie.insert_or_assign("192.168.0.0/16".parse()?, 1);
    /// trie.insert_or_assign("192.168.1.0/24".parse()?, 2);
    /// assert_eq!(trie.lookup_prefix(&"192.168.1.0/24".parse()?), Some((&"192.168.1.0/24".parse()?, &2)));
    /// assert_eq!(trie.lookup_prefix(&"192.168.1.0/23".parse()?), Some((&"192.168.0.0/16".parse()?, &1)));
    /// assert_eq!(trie.lookup_prefix(&"192.0.0.0/8".parse()?), None);
    /// # Ok(())
    /// # }
    /// ```
    pub fn lookup_prefix(&self, prefix: &IpNet) -> Option<(&IpNet, &V)> {
        self.lookup(prefix.network(), prefix.prefix_len())
    }

    /// Longest-prefix match of `addr` like [`PrefixTrie::lookup`], returning a mutable reference to
    /// the value.
    pub fn lookup_mut(&mut self, addr: IpAddr, max_bits: u8) -> Option<(&IpNet, &mut V)> {
        let pos = self.best_match(&addr, max_bits)?;
        let entry = &mut self.entries[pos];
        Some((&entry.prefix, &mut entry.value))
    }

    /// Get the value of an element by matching exactly on the prefix.
    ///
    /// ```
    /// # use netmask_trie::*;
    /// # fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    /// let mut trie: PrefixTrie<u32> = PrefixTrie::new();
    /// trie.insert_or_assign("192.168.1.0/24".parse()?, 1);
    /// assert_eq!(trie.get(&"192.168.1.0/24".parse()?), Some(&1));
    /// assert_eq!(trie.get(&"192.168.1.0/25".parse()?), None);
    /// assert_eq!(trie.get(&"192.168.0.0/23".parse()?), None);
    /// # Ok(())
    /// # }
    /// ```
    pub fn get(&self, prefix: &IpNet) -> Option<&V> {
        let pos = self.find_entry(prefix)?;
        Some(&self.entries[pos].value)
    }

    /// Get a mutable reference to the value of an element by matching exactly on the prefix.
    pub fn get_mut(&mut self, prefix: &IpNet) -> Option<&mut V> {
        let pos = self.find_entry(prefix)?;
        Some(&mut self.entries[pos].value)
    }

    /// Check if `prefix` itself is stored (no longest-prefix match).
    ///
    /// ```
    /// # use netmask_trie::*;
    /// # fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    /// let mut trie: PrefixTrie<u32> = PrefixTrie::new();
    /// trie.insert_or_assign("10.0.0.0/8".parse()?, 1);
    /// assert!(trie.contains_key(&"10.0.0.0/8".parse()?));
    /// assert!(!trie.contains_key(&"10.0.0.0/9".parse()?));
    /// # Ok(())
    /// # }
    /// ```
    pub fn contains_key(&self, prefix: &IpNet) -> bool {
        self.lookup_prefix(prefix)
            .map_or(false, |(p, _)| p.prefix_len() == prefix.prefix_len())
    }

    /// Remove `prefix` from the trie and return its value. Erasing a prefix that is not stored is a
    /// no-op. If the trie was created with compaction enabled, all ancestors that no longer hold
    /// anything are removed as well.
    ///
    /// ```
    /// # use netmask_trie::*;
    /// # fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    /// let mut trie: PrefixTrie<u32> = PrefixTrie::with_compaction(true);
    /// trie.insert_or_assign("10.0.0.0/8".parse()?, 1);
    /// trie.insert_or_assign("10.0.0.0/9".parse()?, 2);
    /// assert_eq!(trie.erase(&"10.0.0.0/9".parse()?), Some(2));
    /// assert_eq!(trie.erase(&"10.0.0.0/9".parse()?), None);
    /// assert_eq!(trie.lookup_addr("10.0.0.1".parse()?), Some((&"10.0.0.0/8".parse()?, &1)));
    /// # Ok(())
    /// # }
    /// ```
    pub fn erase(&mut self, prefix: &IpNet) -> Option<V> {
        let node = self.find_node(prefix)?;
        let value = self.table[node]
            .slot_mut(Family::of_net(prefix))
            .take()
            .map(|pos| self.remove_entry(pos));
        if self.compact {
            self.compact_from(node);
        }
        value
    }

    /// Parse `text` as a prefix and erase it. See [`PrefixTrie::erase`].
    pub fn erase_str(&mut self, text: &str) -> Result<Option<V>> {
        Ok(self.erase(&parse_prefix(text)?))
    }

    /// Check if any stored prefix contains `addr`.
    ///
    /// ```
    /// # use netmask_trie::*;
    /// # fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    /// let mut trie: PrefixTrie<()> = PrefixTrie::new();
    /// trie.insert("2001:db8::/32".parse()?);
    /// assert!(trie.matches("2001:db8::1".parse()?));
    /// assert!(!trie.matches("2001:db9::1".parse()?));
    /// assert!(!trie.matches("32.1.13.184".parse()?));
    /// # Ok(())
    /// # }
    /// ```
    pub fn matches(&self, addr: IpAddr) -> bool {
        self.lookup_addr(addr).is_some()
    }

    /// Parse `text` as an address and check if any stored prefix contains it.
    pub fn matches_str(&self, text: &str) -> Result<bool> {
        Ok(self.matches(parse_addr(text)?))
    }

    /// Remove all entries and nodes. The root is recreated on the next insert.
    pub fn clear(&mut self) {
        self.table.clear();
        self.free.clear();
        self.entries.clear();
    }

    /// Exchange the contents of `self` and `other` without touching a single node. The compaction
    /// policy stays with each trie.
    ///
    /// ```
    /// # use netmask_trie::*;
    /// # fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    /// let mut a: PrefixTrie<u32> = PrefixTrie::new();
    /// let mut b: PrefixTrie<u32> = PrefixTrie::new();
    /// a.insert_or_assign("10.0.0.0/8".parse()?, 1);
    /// a.swap(&mut b);
    /// assert!(a.is_empty());
    /// assert_eq!(b.get(&"10.0.0.0/8".parse()?), Some(&1));
    /// # Ok(())
    /// # }
    /// ```
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(&mut self.table, &mut other.table);
        std::mem::swap(&mut self.free, &mut other.free);
        std::mem::swap(&mut self.entries, &mut other.entries);
    }

    /// Number of nodes currently materialized in the tree, including the root.
    pub(crate) fn node_count(&self) -> usize {
        self.table.len() - self.free.len()
    }
}

impl<V> PrefixTrie<V> {
    /// Walk towards `prefix`, creating all missing nodes. Returns the node at which `prefix` ends,
    /// and the canonical form of `prefix`.
    fn make_path(&mut self, prefix: IpNet) -> (usize, IpNet) {
        let prefix = prefix.trunc();
        let mut idx = if self.table.is_empty() {
            self.new_node(None, 0)
        } else {
            ROOT
        };
        for right in family::prefix_path(&prefix) {
            idx = match self.table[idx].child(right) {
                Some(child) => child,
                None => {
                    let child = self.new_node(Some(idx), self.table[idx].depth + 1);
                    self.set_child(idx, child, right);
                    child
                }
            };
        }
        (idx, prefix)
    }

    /// Walk towards `prefix` without creating nodes. Returns `None` if the walk runs off the tree.
    fn find_node(&self, prefix: &IpNet) -> Option<usize> {
        if self.table.is_empty() {
            return None;
        }
        let prefix = prefix.trunc();
        let mut idx = ROOT;
        for right in family::prefix_path(&prefix) {
            idx = self.table[idx].child(right)?;
        }
        Some(idx)
    }

    fn find_entry(&self, prefix: &IpNet) -> Option<usize> {
        self.table[self.find_node(prefix)?].slot(Family::of_net(prefix))
    }

    /// Position (in `entries`) of the longest match for `addr` using at most `max_bits` bits.
    ///
    /// The payload of each node is recorded *before* trying to descend, and the last node is
    /// checked once more after the loop. The walk can stop early because a child is missing, and
    /// the node it stopped at must still be considered.
    fn best_match(&self, addr: &IpAddr, max_bits: u8) -> Option<usize> {
        if self.table.is_empty() {
            return None;
        }
        let family = Family::of(addr);
        let mut idx = ROOT;
        let mut best = None;
        for right in family::path(addr, max_bits) {
            best = self.table[idx].slot(family).or(best);
            match self.table[idx].child(right) {
                Some(child) => idx = child,
                None => break,
            }
        }
        self.table[idx].slot(family).or(best)
    }

    fn push_entry(&mut self, node: usize, prefix: IpNet, value: V) -> usize {
        let pos = self.entries.len();
        *self.table[node].slot_mut(Family::of_net(&prefix)) = Some(pos);
        self.entries.push(Entry {
            node,
            prefix,
            value,
        });
        pos
    }

    /// Remove the entry at `pos`, keeping the insertion order. All nodes that point to later
    /// entries are updated.
    fn remove_entry(&mut self, pos: usize) -> V {
        let entry = self.entries.remove(pos);
        for moved in &self.entries[pos..] {
            if let Some(p) = self.table[moved.node].slot_mut(Family::of_net(&moved.prefix)) {
                *p -= 1;
            }
        }
        entry.value
    }

    /// Detach `idx` and its ancestors as long as they have neither children nor payload. Stops at
    /// the root.
    fn compact_from(&mut self, mut idx: usize) {
        while let Some(parent) = self.table[idx].parent {
            if !self.table[idx].is_vacant() {
                break;
            }
            let parent_node = &mut self.table[parent];
            if parent_node.left == Some(idx) {
                parent_node.left = None;
            } else {
                parent_node.right = None;
            }
            self.free_node(idx);
            idx = parent;
        }
    }

    #[inline(always)]
    fn set_child(&mut self, idx: usize, child: usize, right: bool) -> Option<usize> {
        if right {
            self.table[idx].right.replace(child)
        } else {
            self.table[idx].left.replace(child)
        }
    }

    #[inline(always)]
    fn new_node(&mut self, parent: Option<usize>, depth: u8) -> usize {
        let node = Node {
            depth,
            parent,
            ..Default::default()
        };
        if let Some(idx) = self.free.pop() {
            self.table[idx] = node;
            idx
        } else {
            self.table.push(node);
            self.table.len() - 1
        }
    }

    /// Return a detached node to the free list. Its links are cleared, so a stale parent index is
    /// never followed.
    #[inline(always)]
    fn free_node(&mut self, idx: usize) {
        self.table[idx] = Node::default();
        self.free.push(idx);
    }
}

impl<V: Clone> Clone for PrefixTrie<V> {
    /// Rebuild the trie by inserting every entry in iteration order. Nodes that do not lead to any
    /// entry are not copied.
    fn clone(&self) -> Self {
        let mut trie = Self::with_compaction(self.compact);
        for (prefix, value) in self.iter() {
            trie.insert_or_assign(*prefix, value.clone());
        }
        trie
    }
}

impl<V: PartialEq> PartialEq for PrefixTrie<V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<V: Eq> Eq for PrefixTrie<V> {}

impl<V> FromIterator<(IpNet, V)> for PrefixTrie<V> {
    fn from_iter<I: IntoIterator<Item = (IpNet, V)>>(iter: I) -> Self {
        let mut trie = Self::new();
        trie.extend(iter);
        trie
    }
}

impl<V> Extend<(IpNet, V)> for PrefixTrie<V> {
    fn extend<I: IntoIterator<Item = (IpNet, V)>>(&mut self, iter: I) {
        for (prefix, value) in iter {
            self.insert_or_assign(prefix, value);
        }
    }
}
