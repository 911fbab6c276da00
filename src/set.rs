//! AddressSet, an allow/deny list of prefixes based on the [`PrefixTrie`].

use std::io::BufRead;
use std::net::IpAddr;
use std::path::Path;
use std::str::FromStr;

use ipnet::IpNet;

use crate::load::{self, LoadStats};
use crate::{parse_prefix, Error, PrefixTrie, Result};

/// Marker that flips the polarity of a textual mask.
pub const NEGATION: char = '!';

/// Set of addresses, described by a list of positive and negative prefixes. An address is a member
/// if its longest matching prefix is positive. More specific negative prefixes therefore punch
/// holes into broader positive ones.
///
/// ```
/// # use netmask_trie::*;
/// # fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
/// let mut set = AddressSet::new();
/// set.add_mask_str("10.0.0.0/8", true)?;
/// set.add_mask_str("!10.0.0.1/32", true)?;
/// assert!(!set.matches("10.0.0.1".parse()?));
/// assert!(set.matches("10.0.0.2".parse()?));
/// assert!(!set.matches("11.0.0.1".parse()?));
/// # Ok(())
/// # }
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct AddressSet(pub(crate) PrefixTrie<bool>);

impl Default for AddressSet {
    fn default() -> Self {
        Self::new()
    }
}

impl AddressSet {
    /// Create a new, empty set. Deleting masks compacts the underlying tree.
    pub fn new() -> Self {
        Self::with_compaction(true)
    }

    /// Create a new, empty set, choosing whether deleting masks compacts the underlying tree.
    pub fn with_compaction(compact: bool) -> Self {
        Self(PrefixTrie::with_compaction(compact))
    }

    /// Returns the number of masks stored in `self`.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the set contains no masks.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Access the underlying trie.
    pub fn trie(&self) -> &PrefixTrie<bool> {
        &self.0
    }

    /// Add a mask given as text with polarity `positive`. If the text starts with `!`, the
    /// remaining prefix is added with the flipped polarity.
    ///
    /// ```
    /// # use netmask_trie::*;
    /// # fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    /// let mut set = AddressSet::new();
    /// set.add_mask_str("192.0.2.0/24", true)?;
    /// set.add_mask_str("!2001:db8::/32", true)?;
    /// set.add_mask_str("198.51.100.0/24", false)?;
    /// set.add_mask_str("!203.0.113.0/24", false)?;
    /// assert_eq!(
    ///     set.to_string(),
    ///     "192.0.2.0/24, !2001:db8::/32, !198.51.100.0/24, 203.0.113.0/24"
    /// );
    /// assert!(set.add_mask_str("192.0.2.0/40", true).is_err());
    /// # Ok(())
    /// # }
    /// ```
    pub fn add_mask_str(&mut self, text: &str, positive: bool) -> Result<()> {
        match text.strip_prefix(NEGATION) {
            Some(rest) => self.add_mask(parse_prefix(rest)?, !positive),
            None => self.add_mask(parse_prefix(text)?, positive),
        }
        Ok(())
    }

    /// Add `prefix` with the given polarity. Adding a prefix twice overwrites its polarity.
    pub fn add_mask(&mut self, prefix: IpNet, positive: bool) {
        *self.0.insert(prefix) = positive;
    }

    /// Delete `prefix` from the set. Returns the polarity it had, if it was present.
    pub fn delete_mask(&mut self, prefix: &IpNet) -> Option<bool> {
        self.0.erase(prefix)
    }

    /// Delete the mask given as text. An empty string is ignored.
    pub fn delete_mask_str(&mut self, text: &str) -> Result<Option<bool>> {
        if text.is_empty() {
            return Ok(None);
        }
        Ok(self.delete_mask(&parse_prefix(text)?))
    }

    /// Check if `addr` is a member of the set. An address without any matching prefix is not a
    /// member.
    pub fn matches(&self, addr: IpAddr) -> bool {
        self.lookup(addr).0
    }

    /// Check if `addr` is a member of the set, and report the prefix that decided it.
    ///
    /// ```
    /// # use netmask_trie::*;
    /// # fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    /// let set: AddressSet = "10.0.0.0/8, !10.1.0.0/16".parse()?;
    /// assert_eq!(set.lookup("10.2.0.1".parse()?), (true, Some("10.0.0.0/8".parse()?)));
    /// assert_eq!(set.lookup("10.1.0.1".parse()?), (false, Some("10.1.0.0/16".parse()?)));
    /// assert_eq!(set.lookup("11.0.0.1".parse()?), (false, None));
    /// # Ok(())
    /// # }
    /// ```
    pub fn lookup(&self, addr: IpAddr) -> (bool, Option<IpNet>) {
        match self.0.lookup_addr(addr) {
            Some((prefix, positive)) => (*positive, Some(*prefix)),
            None => (false, None),
        }
    }

    /// Remove all masks.
    pub fn clear(&mut self) {
        self.0.clear()
    }

    /// Iterate over all masks and their polarity in insertion order.
    pub fn iter(&self) -> crate::trie::Iter<'_, bool> {
        self.0.iter()
    }

    /// Render every mask as text, in insertion order. Negative masks are prefixed with `!`.
    pub fn to_string_list(&self) -> Vec<String> {
        self.iter()
            .map(|(prefix, positive)| {
                if *positive {
                    prefix.to_string()
                } else {
                    format!("{NEGATION}{prefix}")
                }
            })
            .collect()
    }

    /// Read a prefix list (see [`crate::load`]) and add every prefix as a positive mask.
    pub fn load<R: BufRead>(&mut self, reader: R) -> Result<LoadStats> {
        load::load_prefixes(reader, &mut self.0)
    }

    /// Read a prefix list from a file and add every prefix as a positive mask.
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> Result<LoadStats> {
        load::load_prefix_file(path, &mut self.0)
    }
}

impl FromStr for AddressSet {
    type Err = Error;

    /// Parse a list of masks, separated by commas or whitespace.
    fn from_str(s: &str) -> Result<Self> {
        let mut set = Self::new();
        for mask in s
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|m| !m.is_empty())
        {
            set.add_mask_str(mask, true)?;
        }
        Ok(set)
    }
}

impl Extend<(IpNet, bool)> for AddressSet {
    fn extend<I: IntoIterator<Item = (IpNet, bool)>>(&mut self, iter: I) {
        for (prefix, positive) in iter {
            self.add_mask(prefix, positive);
        }
    }
}

impl FromIterator<(IpNet, bool)> for AddressSet {
    fn from_iter<I: IntoIterator<Item = (IpNet, bool)>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<'a> IntoIterator for &'a AddressSet {
    type Item = (&'a IpNet, &'a bool);
    type IntoIter = crate::trie::Iter<'a, bool>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
