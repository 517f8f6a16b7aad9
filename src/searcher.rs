//! Read accessor that reuses its scratch buffer across lookups.

use crate::error::Result;
use crate::{Prefix, Tree};

/// A lookup handle bound to a [`Tree`], created with [`Tree::searcher`].
///
/// The searcher owns the bit buffer that every lookup decodes the queried address into, so
/// repeated lookups do not allocate it again. [`Searcher::find_tags_into`] additionally writes
/// into a caller-owned vector, which makes a hot lookup loop allocation-free.
///
/// A searcher needs `&mut self` for every lookup, so one searcher serves one caller at a time.
/// Any number of searchers can exist on the same tree, and the tree cannot be modified while
/// one of them is alive.
///
/// ```
/// # use tag_trie::*;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut tree = Tree::ipv4();
/// tree.add(&[], 0, "any")?;
/// tree.add(&[192, 168], 16, "lan")?;
///
/// let mut searcher = tree.searcher();
/// let mut tags = Vec::new();
/// for host in 0..4u8 {
///     tags.clear();
///     searcher.find_tags_into(&[192, 168, 0, host], 32, &mut tags)?;
///     assert_eq!(tags, vec![&"any", &"lan"]);
/// }
/// # Ok(())
/// # }
/// ```
pub struct Searcher<'a, T> {
    tree: &'a Tree<T>,
    bits: Vec<bool>,
}

impl<'a, T> Searcher<'a, T> {
    pub(crate) fn new(tree: &'a Tree<T>) -> Self {
        Self {
            tree,
            bits: Vec::with_capacity(tree.max_bits as usize),
        }
    }

    /// The tree this searcher reads from.
    pub fn tree(&self) -> &'a Tree<T> {
        self.tree
    }

    /// Same as [`Tree::find_tags`].
    pub fn find_tags(&mut self, address: &[u8], prefix_len: u8) -> Result<Vec<&'a T>> {
        let mut tags = Vec::new();
        self.find_tags_into(address, prefix_len, &mut tags)?;
        Ok(tags)
    }

    /// Same as [`Tree::find_tags_with_filter`].
    pub fn find_tags_with_filter<C, F>(
        &mut self,
        address: &[u8],
        prefix_len: u8,
        mut filter: F,
        context: &C,
    ) -> Result<Vec<&'a T>>
    where
        C: ?Sized,
        F: FnMut(&T, &C) -> bool,
    {
        self.tree.load_bits(&mut self.bits, address, prefix_len)?;
        let mut tags = Vec::new();
        self.tree
            .collect_tags(&self.bits, |t| filter(t, context), &mut tags);
        Ok(tags)
    }

    /// Same as [`Tree::find_prefix_tags`].
    pub fn find_prefix_tags<P: Prefix>(&mut self, prefix: &P) -> Result<Vec<&'a T>> {
        self.find_tags(prefix.octets().as_ref(), prefix.prefix_len())
    }

    /// Append the tags of all prefixes covering the query to `out`, in the order of
    /// [`Tree::find_tags`]. Existing entries of `out` are kept. On error, `out` is unchanged.
    pub fn find_tags_into(
        &mut self,
        address: &[u8],
        prefix_len: u8,
        out: &mut Vec<&'a T>,
    ) -> Result<()> {
        self.tree.load_bits(&mut self.bits, address, prefix_len)?;
        self.tree.collect_tags(&self.bits, |_| true, out);
        Ok(())
    }
}
