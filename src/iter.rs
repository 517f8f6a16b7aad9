//! Iteration over all tagged prefixes of a tree.

use crate::bits::pack_bits;
use crate::tree::Node;
use crate::Tree;

impl<T> Tree<T> {
    /// Iterate over all prefixes that hold tags, in lexicographic order (shorter prefixes before
    /// the longer ones they cover). Each item is the address bytes (with all bits past the prefix
    /// length set to zero), the prefix length and the tags.
    ///
    /// ```
    /// # use tag_trie::*;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut tree = Tree::ipv4();
    /// tree.add(&[192, 168, 1, 1], 24, "b")?;
    /// tree.add(&[10, 1], 16, "c")?;
    /// tree.add(&[192, 168, 0, 0], 16, "a")?;
    /// let prefixes: Vec<_> = tree.iter().map(|(addr, len, _)| (addr, len)).collect();
    /// assert_eq!(
    ///     prefixes,
    ///     vec![(vec![10, 1], 16), (vec![192, 168], 16), (vec![192, 168, 1], 24)]
    /// );
    /// # Ok(())
    /// # }
    /// ```
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            table: &self.table,
            stack: vec![(0, 0)],
            path: Vec::with_capacity(self.max_bits as usize),
        }
    }
}

/// An iterator over all tagged prefixes of a [`Tree`], created by [`Tree::iter`].
pub struct Iter<'a, T> {
    table: &'a [Node<T>],
    /// Nodes still to visit, each with the length of its parent's full prefix.
    stack: Vec<(usize, usize)>,
    path: Vec<bool>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (Vec<u8>, u8, &'a [T]);

    fn next(&mut self) -> Option<Self::Item> {
        let table = self.table;
        while let Some((idx, depth)) = self.stack.pop() {
            let node = &table[idx];
            self.path.truncate(depth);
            self.path.extend_from_slice(&node.prefix);
            let depth = self.path.len();
            // push right first, so that left is visited first
            if let Some(right) = node.right {
                self.stack.push((right, depth));
            }
            if let Some(left) = node.left {
                self.stack.push((left, depth));
            }
            if !node.tags.is_empty() {
                return Some((pack_bits(&self.path), depth as u8, &node.tags));
            }
        }
        None
    }
}

impl<'a, T> IntoIterator for &'a Tree<T> {
    type Item = (Vec<u8>, u8, &'a [T]);
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
