//! This crate provides a per-bit binary trie for IPv4 and IPv6 prefixes. Any lookup performs
//! longest-prefix match. Both families live in the same tree: every node keeps a separate payload
//! slot for an IPv4 prefix and for an IPv6 prefix ending there, so the two never interfere.
//!
//! On top of the [`PrefixTrie`], the [`AddressSet`] stores a polarity for each prefix. Prefixes
//! written as `!prefix` are negative, which allows expressing allow and deny lists in a single
//! list of masks:
//!
//! ```
//! # use netmask_trie::*;
//! # fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let set: AddressSet = "10.0.0.0/8, !10.0.0.1/32".parse()?;
//! assert!(set.matches("10.0.0.2".parse()?));
//! assert!(!set.matches("10.0.0.1".parse()?));
//! # Ok(())
//! # }
//! ```
//!
//! # Description of the Tree
//!
//! Each node represents the bits consumed on the way from the root: the left child extends the
//! path with a `0` bit, the right child with a `1` bit. Inserting a prefix of length `n` creates
//! (at most) the `n` nodes on its path; nodes are only created when needed. A lookup walks along
//! the bits of the address and remembers the deepest node holding a payload for the address
//! family.
//!
//! All nodes are stored in a single table, and refer to their children and their parent by index.
//! The parent is only used to remove useless nodes after erasing (see
//! [`PrefixTrie::with_compaction`]).
//!
//! The entries themselves are kept in a separate list in insertion order. Iteration, `len`, and
//! the textual representation of an [`AddressSet`] follow that order.
//!
//! # Operations on the tree
//!
//! The following are the computational complexities of the functions, where `w` is the width of
//! the address (32 or 128) and `n` the number of entries.
//!
//! | Operation                                     | Complexity |
//! |-----------------------------------------------|------------|
//! | `insert`, `insert_or_assign`                  | `O(w)`     |
//! | `lookup`, `get`, `contains_key`, `matches`    | `O(w)`     |
//! | `erase`                                       | `O(w + n)` |
//! | `clone` (rebuilds the tree)                   | `O(n * w)` |
//! | `swap`, `len`, `is_empty`                     | `O(1)`     |
//!
//! # Concurrency
//!
//! The trie is not synchronized. Build it first, then share it (for instance, in an `Arc`) with
//! any number of threads that only perform lookups.
//!
//! # Loading prefix lists
//!
//! The [`load`] module reads line-oriented prefix lists (one prefix per line, optionally followed
//! by a comment), skipping default routes.

#![allow(clippy::collapsible_else_if)]
#![deny(missing_docs)]

mod error;
pub mod family;
mod fmt;
pub mod load;
#[cfg(feature = "serde")]
mod serde;
pub mod set;
pub mod trie;

#[cfg(test)]
mod fuzzing;

pub use error::{Error, Result};
pub use family::{parse_addr, parse_prefix, AddressFamily, Family};
pub use set::AddressSet;
pub use trie::PrefixTrie;
