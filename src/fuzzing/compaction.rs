use std::collections::HashSet;

use super::*;
use crate::test::{check_structure, dangling_nodes};

/// Number of distinct nodes on the paths of all stored prefixes, including the root.
fn path_nodes<V>(trie: &PrefixTrie<V>) -> usize {
    let mut nodes = HashSet::new();
    for (prefix, _) in trie {
        let mut path = Vec::new();
        nodes.insert(path.clone());
        for bit in family::prefix_path(prefix) {
            path.push(bit);
            nodes.insert(path.clone());
        }
    }
    nodes.len()
}

qc!(compact_tree, _compact_tree);
fn _compact_tree(ops: Vec<Operation<TestPrefix, i32>>) -> bool {
    let trie = build(&ops, true);
    let expected = if trie.is_empty() {
        // only the root survives once it was created
        usize::from(ops.iter().any(|op| matches!(op, Operation::Add(..))))
    } else {
        path_nodes(&trie)
    };
    check_structure(&trie) && dangling_nodes(&trie) == 0 && trie.node_count() == expected
}

qc!(keep_tree, _keep_tree);
fn _keep_tree(ops: Vec<Operation<TestPrefix, i32>>) -> bool {
    let kept = build(&ops, false);
    let compact = build(&ops, true);
    check_structure(&kept)
        && check_structure(&compact)
        && kept == compact
        && kept.node_count() >= compact.node_count()
}

qc!(clone_is_minimal, _clone_is_minimal);
fn _clone_is_minimal(ops: Vec<Operation<TestPrefix, i32>>) -> bool {
    let trie = build(&ops, false);
    let clone = trie.clone();
    clone == trie
        && clone.compacts_on_erase() == trie.compacts_on_erase()
        && dangling_nodes(&clone) == 0
}

qc!(swap, _swap);
fn _swap((a, b): (Vec<Operation<TestPrefix, i32>>, Vec<Operation<TestPrefix, i32>>)) -> bool {
    let mut x = build(&a, true);
    let mut y = build(&b, false);
    let (want_x, want_y) = (y.clone(), x.clone());
    x.swap(&mut y);
    x == want_x && y == want_y && x.compacts_on_erase() && !y.compacts_on_erase()
}
