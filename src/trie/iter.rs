//! Module that contains the implementation for the iterators. All iterators yield entries in the
//! order in which they were inserted.

use std::slice;

use ipnet::IpNet;

use super::{Entry, PrefixTrie};

/// An iterator over all entries of a [`PrefixTrie`] in insertion order.
#[derive(Clone)]
pub struct Iter<'a, V> {
    inner: slice::Iter<'a, Entry<V>>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a IpNet, &'a V);

    fn next(&mut self) -> Option<(&'a IpNet, &'a V)> {
        self.inner.next().map(|e| (&e.prefix, &e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> DoubleEndedIterator for Iter<'_, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|e| (&e.prefix, &e.value))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

/// A mutable iterator over all entries of a [`PrefixTrie`] in insertion order. Only the values
/// can be modified.
pub struct IterMut<'a, V> {
    inner: slice::IterMut<'a, Entry<V>>,
}

impl<'a, V> Iterator for IterMut<'a, V> {
    type Item = (&'a IpNet, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|e| (&e.prefix, &mut e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> ExactSizeIterator for IterMut<'_, V> {}

/// An iterator over all prefixes of a [`PrefixTrie`] in insertion order.
#[derive(Clone)]
pub struct Keys<'a, V> {
    pub(crate) inner: Iter<'a, V>,
}

impl<'a, V> Iterator for Keys<'a, V> {
    type Item = &'a IpNet;

    fn next(&mut self) -> Option<&'a IpNet> {
        self.inner.next().map(|(k, _)| k)
    }
}

/// An iterator over all values of a [`PrefixTrie`] in insertion order of their prefixes.
#[derive(Clone)]
pub struct Values<'a, V> {
    pub(crate) inner: Iter<'a, V>,
}

impl<'a, V> Iterator for Values<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        self.inner.next().map(|(_, v)| v)
    }
}

/// A mutable iterator over all values of a [`PrefixTrie`] in insertion order of their prefixes.
pub struct ValuesMut<'a, V> {
    pub(crate) inner: IterMut<'a, V>,
}

impl<'a, V> Iterator for ValuesMut<'a, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<&'a mut V> {
        self.inner.next().map(|(_, v)| v)
    }
}

/// An iterator over all owned entries of a [`PrefixTrie`] in insertion order.
pub struct IntoIter<V> {
    inner: std::vec::IntoIter<Entry<V>>,
}

impl<V> Iterator for IntoIter<V> {
    type Item = (IpNet, V);

    fn next(&mut self) -> Option<(IpNet, V)> {
        self.inner.next().map(|e| (e.prefix, e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> ExactSizeIterator for IntoIter<V> {}

impl<V> PrefixTrie<V> {
    /// An iterator visiting all key-value pairs in insertion order. The iterator element type is
    /// `(&IpNet, &V)`.
    ///
    /// ```
    /// # use netmask_trie::*;
    /// # fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    /// let mut trie: PrefixTrie<u32> = PrefixTrie::new();
    /// trie.insert_or_assign("192.168.2.0/24".parse()?, 1);
    /// trie.insert_or_assign("2001:db8::/32".parse()?, 2);
    /// trie.insert_or_assign("192.168.0.0/22".parse()?, 3);
    /// trie.insert_or_assign("192.168.2.0/24".parse()?, 4);
    /// assert_eq!(
    ///     trie.iter().collect::<Vec<_>>(),
    ///     vec![
    ///         (&"192.168.2.0/24".parse()?, &4),
    ///         (&"2001:db8::/32".parse()?, &2),
    ///         (&"192.168.0.0/22".parse()?, &3),
    ///     ]
    /// );
    /// # Ok(())
    /// # }
    /// ```
    #[inline(always)]
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            inner: self.entries.iter(),
        }
    }

    /// Get a mutable iterator over all key-value pairs in insertion order.
    #[inline(always)]
    pub fn iter_mut(&mut self) -> IterMut<'_, V> {
        IterMut {
            inner: self.entries.iter_mut(),
        }
    }

    /// An iterator visiting all prefixes in insertion order.
    #[inline(always)]
    pub fn keys(&self) -> Keys<'_, V> {
        Keys { inner: self.iter() }
    }

    /// An iterator visiting all values in insertion order of their prefixes.
    #[inline(always)]
    pub fn values(&self) -> Values<'_, V> {
        Values { inner: self.iter() }
    }

    /// Get a mutable iterator over all values in insertion order of their prefixes.
    #[inline(always)]
    pub fn values_mut(&mut self) -> ValuesMut<'_, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }

    /// Creates a consuming iterator visiting all prefixes in insertion order.
    #[inline(always)]
    pub fn into_keys(self) -> impl Iterator<Item = IpNet> {
        self.into_iter().map(|(p, _)| p)
    }

    /// Creates a consuming iterator visiting all values in insertion order of their prefixes.
    #[inline(always)]
    pub fn into_values(self) -> impl Iterator<Item = V> {
        self.into_iter().map(|(_, v)| v)
    }
}

impl<V> IntoIterator for PrefixTrie<V> {
    type Item = (IpNet, V);
    type IntoIter = IntoIter<V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.entries.into_iter(),
        }
    }
}

impl<'a, V> IntoIterator for &'a PrefixTrie<V> {
    type Item = (&'a IpNet, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, V> IntoIterator for &'a mut PrefixTrie<V> {
    type Item = (&'a IpNet, &'a mut V);
    type IntoIter = IterMut<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
