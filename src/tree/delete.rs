//! Deletion of tags, and compaction of the nodes left behind.

use super::*;

impl<T> Tree<T> {
    /// Remove every tag stored on exactly this prefix for which `matches(tag, match_value)`
    /// returns `true`, and return how many were removed. Covering and more specific prefixes are
    /// left untouched. Deleting from a prefix that is not in the tree removes nothing.
    ///
    /// A node left without tags is removed from the tree if it is no longer needed as a branch
    /// point. The root (the default scope) always stays.
    ///
    /// ```
    /// # use tag_trie::*;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut tree = Tree::ipv4();
    /// tree.add(&[10], 8, "a")?;
    /// tree.add(&[10], 8, "b")?;
    /// tree.add(&[10, 1], 16, "a")?;
    /// let same = |tag: &&str, value: &str| *tag == value;
    /// assert_eq!(tree.delete(&[10], 8, same, "a")?, 1);
    /// assert_eq!(tree.find_tags(&[10, 1, 0, 0], 32)?, vec![&"b", &"a"]);
    /// assert_eq!(tree.delete(&[10, 2], 16, same, "a")?, 0);
    /// # Ok(())
    /// # }
    /// ```
    pub fn delete<M, F>(
        &mut self,
        address: &[u8],
        prefix_len: u8,
        mut matches: F,
        match_value: &M,
    ) -> Result<usize>
    where
        M: ?Sized,
        F: FnMut(&T, &M) -> bool,
    {
        let bits = self.bits_of(address, prefix_len)?;
        let Some(loc) = self.locate(&bits) else {
            return Ok(0);
        };
        let tags = &mut self.table[loc.idx].tags;
        let before = tags.len();
        tags.retain(|t| !matches(t, match_value));
        let removed = before - tags.len();
        if tags.is_empty() {
            self.compact(loc);
        }
        tracing::debug!(prefix_len, removed, "deleted tags");
        Ok(removed)
    }

    /// Remove a typed prefix's matching tags. See [`Tree::delete`].
    pub fn delete_prefix<P, M, F>(
        &mut self,
        prefix: &P,
        matches: F,
        match_value: &M,
    ) -> Result<usize>
    where
        P: Prefix,
        M: ?Sized,
        F: FnMut(&T, &M) -> bool,
    {
        self.delete(
            prefix.octets().as_ref(),
            prefix.prefix_len(),
            matches,
            match_value,
        )
    }

    /// Take all tags of the node with exactly this prefix, and compact the tree afterwards.
    pub(super) fn take_tags(&mut self, bits: &[bool]) -> Vec<T> {
        let Some(loc) = self.locate(bits) else {
            return Vec::new();
        };
        let tags = std::mem::take(&mut self.table[loc.idx].tags);
        self.compact(loc);
        tags
    }

    /// Restore the tree structure after the node at `loc` lost all its tags: a leaf is unlinked,
    /// and a node with a single child is merged into that child. The root is never removed.
    fn compact(&mut self, loc: Location) {
        let Some((par, par_right)) = loc.par else {
            return;
        };
        let node = &self.table[loc.idx];
        match (node.left, node.right) {
            (Some(_), Some(_)) => {}
            (Some(child), None) | (None, Some(child)) => {
                self.merge_into_child(loc.idx, child, par, par_right);
            }
            (None, None) => {
                self.clear_child(par, par_right);
                self.free_node(loc.idx);
                tracing::trace!(node = loc.idx, "pruned leaf");
                // the parent may now be a tagless node with one child. The root is exempt, and
                // only the root has no grandparent.
                let Some((grp, grp_right)) = loc.grp else {
                    return;
                };
                if !self.table[par].tags.is_empty() {
                    return;
                }
                if let Some(sibling) = self.get_child(par, !par_right) {
                    self.merge_into_child(par, sibling, grp, grp_right);
                }
            }
        }
    }

    /// Replace `idx` at its parent by its only child `child`, prepending the prefix of `idx` to
    /// the prefix of the child.
    fn merge_into_child(&mut self, idx: usize, child: usize, par: usize, par_right: bool) {
        let mut prefix = std::mem::take(&mut self.table[idx].prefix);
        prefix.append(&mut self.table[child].prefix);
        self.table[child].prefix = prefix;
        self.set_child(par, child, par_right);
        self.free_node(idx);
        tracing::trace!(node = idx, child, "merged node into its child");
    }
}
