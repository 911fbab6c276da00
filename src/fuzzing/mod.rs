//! Module for testing using fuzzing (quickcheck)
#![allow(clippy::type_complexity)]

use std::fmt::Debug;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use ipnet::IpNet;
use quickcheck::Arbitrary;

use crate::*;

mod basic;
mod compaction;

#[derive(Debug, PartialEq, Clone, Copy)]
enum Operation<P, T> {
    Add(P, T),
    Remove(P),
}

#[cfg(miri)]
const DEFAULT_NUM_TESTS: usize = 10;
#[cfg(not(miri))]
const DEFAULT_NUM_TESTS: usize = 2000;
const DEFAULT_GEN_SIZE: usize = 100;

fn proptest_runner<A: Arbitrary + Debug + PartialEq, F: Fn(A) -> bool>(f: F) {
    let num_tests: usize = std::env::var("QUICKCHECK_TESTS")
        .ok()
        .and_then(|x| x.parse::<usize>().ok())
        .unwrap_or(DEFAULT_NUM_TESTS);

    let gen_size: usize = std::env::var("QUICKCHECK_GENERATOR_SIZE")
        .ok()
        .and_then(|x| x.parse::<usize>().ok())
        .unwrap_or(DEFAULT_GEN_SIZE);

    let mut gen = quickcheck::Gen::new(gen_size);

    // sample all inputs
    for _ in 0..num_tests {
        let input = A::arbitrary(&mut gen);
        let input_c = input.clone();
        let success = f(input_c);
        if !success {
            shrink_failure(f, input)
        }
    }
}

fn shrink_failure<A: Arbitrary + Debug + PartialEq, F: Fn(A) -> bool>(f: F, input: A) -> ! {
    for i in input.shrink() {
        let i_c = i.clone();
        let success = f(i_c);
        if !success {
            shrink_failure(f, i)
        }
    }
    // if we reach this point, then all shrunken inputs work. Therefore, `inputs` is the minimal
    // input
    panic!(
        "[QUICKCHECK] Test case failed!\n  Minimal input:\n    {:?}",
        input
    );
}

#[allow(missing_docs)]
#[macro_export]
macro_rules! qc {
    ($name:ident, $f:ident) => {
        #[test]
        fn $name() {
            proptest_runner($f)
        }
    };
}

/// Apply all operations to a trie with the given compaction policy.
fn build<T: Clone>(ops: &[Operation<TestPrefix, T>], compact: bool) -> PrefixTrie<T> {
    let mut trie = PrefixTrie::with_compaction(compact);
    for op in ops {
        match op {
            Operation::Add(p, t) => {
                trie.insert_or_assign(p.0, t.clone());
            }
            Operation::Remove(p) => {
                trie.erase(&p.0);
            }
        }
    }
    trie
}

impl<T: Arbitrary> Arbitrary for PrefixTrie<T> {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        <Vec<(TestPrefix, T)> as Arbitrary>::arbitrary(g)
            .into_iter()
            .map(|(p, t)| (p.0, t))
            .collect()
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        let elems = self
            .clone()
            .into_iter()
            .map(|(p, t)| (TestPrefix(p), t))
            .collect::<Vec<_>>();
        let shrinked = elems.shrink();
        Box::new(shrinked.map(|elems| elems.into_iter().map(|(p, t)| (p.0, t)).collect()))
    }
}

impl<P: Arbitrary, T: Arbitrary> Arbitrary for Operation<P, T> {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        let p = P::arbitrary(g);
        if g.choose(&[
            true, true, true, true, true, true, true, false, false, false,
        ])
        .copied()
        .unwrap_or_default()
        {
            let t = T::arbitrary(g);
            Self::Add(p, t)
        } else {
            Self::Remove(p)
        }
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        match self {
            Operation::Add(p, t) => {
                let t = t.clone();
                Box::new(
                    p.clone()
                        .shrink()
                        .map(move |p| Operation::Add(p, t.clone())),
                )
            }
            Operation::Remove(p) => Box::new(p.clone().shrink().map(|p| Operation::Remove(p))),
        }
    }
}

/// Build an address of either family whose leading 32 bits are `bits`. IPv4 and IPv6 addresses
/// built from the same bits walk the same path through the tree.
fn make_addr(bits: u32, v6: bool) -> IpAddr {
    if v6 {
        IpAddr::V6(Ipv6Addr::from((bits as u128) << 96))
    } else {
        IpAddr::V4(Ipv4Addr::from(bits))
    }
}

/// Short prefixes of both families, so that operations frequently hit the same nodes.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
struct TestPrefix(IpNet);

impl Debug for TestPrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Arbitrary for TestPrefix {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        #[rustfmt::skip]
        let len: u8 = *g
            .choose(&[
                0,
                1, 1,
                2, 2, 2,
                3, 3, 3, 3,
                4, 4, 4, 4, 4,
                5, 5, 5, 5, 5, 5,
                6, 6, 6, 6, 6, 6, 6,
                7, 7, 7, 7, 7, 7, 7, 7,
                8, 8, 8, 8, 8, 8, 8, 8, 8,
                9, 9, 9, 9, 9, 9, 9, 9, 9, 9,
            ])
            .unwrap();
        let addr = make_addr(u32::arbitrary(g), bool::arbitrary(g));
        Self(IpNet::new(addr, len).unwrap().trunc())
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        if self.0.prefix_len() == 0 {
            quickcheck::empty_shrinker()
        } else {
            let x = IpNet::new(self.0.addr(), self.0.prefix_len() - 1)
                .unwrap()
                .trunc();
            quickcheck::single_shrinker(Self(x))
        }
    }
}

/// Addresses of both families that mostly fall into the space covered by [`TestPrefix`].
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
struct TestAddr(IpAddr);

impl Arbitrary for TestAddr {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        Self(make_addr(u32::arbitrary(g), bool::arbitrary(g)))
    }
}
