use std::collections::HashMap;

use super::*;
use itertools::Itertools;

/// Naive model of the trie: a list of entries in insertion order, searched linearly.
#[derive(Default)]
struct Reference(Vec<(IpNet, i32)>);

impl Reference {
    fn apply(&mut self, op: &Operation<TestPrefix, i32>) {
        match op {
            Operation::Add(p, t) => match self.0.iter_mut().find(|(q, _)| *q == p.0) {
                Some((_, v)) => *v = *t,
                None => self.0.push((p.0, *t)),
            },
            Operation::Remove(p) => self.0.retain(|(q, _)| *q != p.0),
        }
    }

    fn lookup(&self, addr: IpAddr, max_bits: u8) -> Option<(&IpNet, &i32)> {
        self.0
            .iter()
            .filter(|(p, _)| p.prefix_len() <= max_bits && p.contains(&addr))
            .max_by_key(|(p, _)| p.prefix_len())
            .map(|(p, t)| (p, t))
    }
}

qc!(new, _new);
fn _new(list: Vec<(TestPrefix, i32)>) -> bool {
    let mut trie = PrefixTrie::new();
    let mut hmap = HashMap::new();

    for (p, t) in list {
        trie.insert_or_assign(p.0, t);
        hmap.insert(p.0, t);
    }

    trie.len() == hmap.len() && trie.into_iter().sorted().eq(hmap.into_iter().sorted())
}

qc!(new_mods, _new_mods);
fn _new_mods((ops, compact): (Vec<Operation<TestPrefix, i32>>, bool)) -> bool {
    let trie = build(&ops, compact);
    let mut reference = Reference::default();
    ops.iter().for_each(|op| reference.apply(op));

    // same entries, in the same order
    trie.iter().map(|(p, t)| (*p, *t)).eq(reference.0.iter().copied())
}

qc!(lookup, _lookup);
fn _lookup((ops, addrs, compact): (Vec<Operation<TestPrefix, i32>>, Vec<TestAddr>, bool)) -> bool {
    let trie = build(&ops, compact);
    let mut reference = Reference::default();
    ops.iter().for_each(|op| reference.apply(op));

    addrs.into_iter().all(|TestAddr(addr)| {
        trie.lookup_addr(addr) == reference.lookup(addr, Family::of(&addr).width())
            && trie.matches(addr) == reference.lookup(addr, 128).is_some()
    })
}

qc!(lookup_max_bits, _lookup_max_bits);
fn _lookup_max_bits((trie, addr, max_bits): (PrefixTrie<i32>, TestAddr, u8)) -> bool {
    let max_bits = max_bits % 12;
    let reference = Reference(trie.iter().map(|(p, t)| (*p, *t)).collect());
    trie.lookup(addr.0, max_bits) == reference.lookup(addr.0, max_bits)
}

qc!(get, _get);
fn _get((trie, prefix): (PrefixTrie<i32>, TestPrefix)) -> bool {
    let want = trie.iter().find(|(p, _)| **p == prefix.0).map(|(_, t)| t);
    trie.get(&prefix.0) == want && trie.contains_key(&prefix.0) == want.is_some()
}

qc!(erase, _erase);
fn _erase((mut trie, prefix): (PrefixTrie<i32>, TestPrefix)) -> bool {
    let want: Vec<_> = trie
        .iter()
        .filter(|(p, _)| **p != prefix.0)
        .map(|(p, t)| (*p, *t))
        .collect();
    let old = trie.get(&prefix.0).copied();
    trie.erase(&prefix.0) == old && trie.len() == want.len() && trie.into_iter().eq(want)
}

qc!(equality, _equality);
fn _equality((ops, compact): (Vec<Operation<TestPrefix, i32>>, bool)) -> bool {
    let trie = build(&ops, compact);
    let clone = trie.clone().into_iter().collect::<PrefixTrie<_>>();

    trie == clone && trie.len() == clone.len() && trie.is_empty() == clone.is_empty()
}

qc!(address_set, _address_set);
fn _address_set((ops, addrs): (Vec<Operation<TestPrefix, bool>>, Vec<TestAddr>)) -> bool {
    let mut set = AddressSet::new();
    let mut masks: Vec<(IpNet, bool)> = Vec::new();
    for op in ops {
        match op {
            Operation::Add(p, positive) => {
                set.add_mask(p.0, positive);
                match masks.iter_mut().find(|(q, _)| *q == p.0) {
                    Some((_, v)) => *v = positive,
                    None => masks.push((p.0, positive)),
                }
            }
            Operation::Remove(p) => {
                set.delete_mask(&p.0);
                masks.retain(|(q, _)| *q != p.0);
            }
        }
    }
    addrs.into_iter().all(|TestAddr(addr)| {
        let want = masks
            .iter()
            .filter(|(p, _)| p.contains(&addr))
            .max_by_key(|(p, _)| p.prefix_len())
            .map_or(false, |(_, positive)| *positive);
        set.matches(addr) == want
    })
}
