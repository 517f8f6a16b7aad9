//! Module for testing using fuzzing (quickcheck)

use std::fmt::Debug;

use crate::*;
use quickcheck::Arbitrary;

mod basic;

#[derive(Debug, PartialEq, Clone, Copy)]
enum Operation<P, T> {
    Add(P, T),
    Delete(P, T),
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

impl<P: Arbitrary, T: Arbitrary> Arbitrary for Operation<P, T> {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        let p = P::arbitrary(g);
        let t = T::arbitrary(g);
        if g.choose(&[true, true, true, true, true, true, true, false, false, false])
            .copied()
            .unwrap_or_default()
        {
            Self::Add(p, t)
        } else {
            Self::Delete(p, t)
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
            Operation::Delete(p, t) => {
                let t = t.clone();
                Box::new(
                    p.clone()
                        .shrink()
                        .map(move |p| Operation::Delete(p, t.clone())),
                )
            }
        }
    }
}

/// A masked IPv4 prefix, generated with short lengths so that prefixes overlap often.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
struct TestPrefix(u32, u8);

impl TestPrefix {
    fn new(repr: u32, len: u8) -> Self {
        let mask = u32::MAX.checked_shl(32 - len as u32).unwrap_or(0);
        Self(repr & mask, len)
    }

    /// Check if `self` covers `other`, or is identical to it.
    fn contains(&self, other: &Self) -> bool {
        self.1 <= other.1 && Self::new(other.0, self.1) == *self
    }

    /// The same address with the full 32 bits.
    fn host(self) -> Self {
        Self(self.0, 32)
    }
}

impl Debug for TestPrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let addr = format!("{:032b}", self.0)[..10].to_string();
        write!(f, "0b{addr}/{}", self.1)
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
        let x = u32::arbitrary(g);
        Self::new(x, len)
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        if self.1 == 0 {
            quickcheck::empty_shrinker()
        } else {
            quickcheck::single_shrinker(Self::new(self.0, self.1 - 1))
        }
    }
}

impl Prefix for TestPrefix {
    type Octets = [u8; 4];

    fn octets(&self) -> [u8; 4] {
        self.0.to_be_bytes()
    }

    fn prefix_len(&self) -> u8 {
        self.1
    }
}

/// Tags are compared by their lower two bits when deleting, so that deletions hit often.
fn same_class(tag: &u8, value: &u8) -> bool {
    tag % 4 == value % 4
}

/// Naive model of the tree: a list of all (prefix, tag) pairs in insertion order.
#[derive(Default)]
struct Reference(Vec<(TestPrefix, u8)>);

impl Reference {
    fn apply(&mut self, tree: &mut Tree<u8>, op: Operation<TestPrefix, u8>) -> bool {
        match op {
            Operation::Add(p, t) => {
                self.0.push((p, t));
                tree.add_prefix(&p, t).is_ok()
            }
            Operation::Delete(p, t) => {
                let before = self.0.len();
                self.0.retain(|(q, u)| !(*q == p && same_class(u, &t)));
                let expected = before - self.0.len();
                tree.delete_prefix(&p, same_class, &t) == Ok(expected)
            }
        }
    }

    /// Tags of all covering prefixes, least specific first.
    fn find_tags(&self, query: &TestPrefix) -> Vec<u8> {
        let mut matches: Vec<&(TestPrefix, u8)> =
            self.0.iter().filter(|(p, _)| p.contains(query)).collect();
        matches.sort_by_key(|(p, _)| p.1);
        matches.into_iter().map(|(_, t)| *t).collect()
    }
}

/// Check that every node besides the root either holds tags or branches, and that no node is
/// lost or shared.
fn is_compact<T>(tree: &Tree<T>) -> bool {
    let mut reachable = 0;
    let mut stack = vec![(0, 0)];
    while let Some((idx, depth)) = stack.pop() {
        reachable += 1;
        let node = &tree.table[idx];
        let depth = depth + node.prefix.len();
        if depth > tree.max_bits() as usize {
            return false;
        }
        if idx != 0 {
            let branches = node.left.is_some() && node.right.is_some();
            if node.tags.is_empty() && !branches {
                return false;
            }
        }
        for (child, right) in [(node.left, false), (node.right, true)] {
            if let Some(child) = child {
                if tree.table[child].prefix.first() != Some(&right) {
                    return false;
                }
                stack.push((child, depth));
            }
        }
    }
    reachable == tree.count_nodes() && reachable + tree.free.len() == tree.table.len()
}
