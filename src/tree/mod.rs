//! Implementation of the tag tree.

use crate::bits::{count_matches, unpack_bits};
use crate::error::{Result, TrieError};
use crate::{Prefix, Searcher};

mod delete;

/// Largest key width a [`Tree`] can be configured with.
pub const MAX_BITS_LIMIT: u8 = 128;

/// Key width of IPv4 addresses.
pub const IPV4_BITS: u8 = 32;

/// Key width of IPv6 addresses.
pub const IPV6_BITS: u8 = 128;

/// Patricia tree that associates tags with prefixes of a fixed-width key space, and returns the
/// tags of every prefix covering a queried address.
///
/// ```
/// # use tag_trie::*;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut tree = Tree::new(32)?;
/// tree.add(&[], 0, "default")?;
/// tree.add(&[10], 8, "private")?;
/// tree.add(&[10, 1, 2], 24, "office")?;
/// assert_eq!(tree.find_tags(&[10, 1, 2, 3], 32)?, vec![&"default", &"private", &"office"]);
/// assert_eq!(tree.find_tags(&[10, 1, 3, 3], 32)?, vec![&"default", &"private"]);
/// assert_eq!(tree.find_tags(&[192, 168, 0, 1], 32)?, vec![&"default"]);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Tree<T> {
    pub(crate) max_bits: u8,
    pub(crate) table: Vec<Node<T>>,
    pub(crate) free: Vec<usize>,
}

/// A node of the tree. `prefix` holds the bits this node consumes after its parent, so the
/// first bit of any non-root prefix is the bit that selects the node at its parent.
#[derive(Clone)]
pub(crate) struct Node<T> {
    pub(crate) prefix: Vec<bool>,
    pub(crate) tags: Vec<T>,
    pub(crate) left: Option<usize>,
    pub(crate) right: Option<usize>,
}

impl<T> Node<T> {
    fn empty() -> Self {
        Self {
            prefix: Vec::new(),
            tags: Vec::new(),
            left: None,
            right: None,
        }
    }
}

impl<T> Tree<T> {
    /// Create an empty tree for keys of `max_bits` bits. Fails if `max_bits` is zero or larger
    /// than [`MAX_BITS_LIMIT`].
    ///
    /// ```
    /// # use tag_trie::*;
    /// assert!(Tree::<u32>::new(32).is_ok());
    /// assert!(Tree::<u32>::new(0).is_err());
    /// assert!(Tree::<u32>::new(129).is_err());
    /// ```
    pub fn new(max_bits: u8) -> Result<Self> {
        if max_bits == 0 || max_bits > MAX_BITS_LIMIT {
            return Err(TrieError::InvalidMaxBits {
                max_bits,
                limit: MAX_BITS_LIMIT,
            });
        }
        Ok(Self::with_width(max_bits))
    }

    /// Create an empty tree for IPv4 addresses.
    pub fn ipv4() -> Self {
        Self::with_width(IPV4_BITS)
    }

    /// Create an empty tree for IPv6 addresses.
    pub fn ipv6() -> Self {
        Self::with_width(IPV6_BITS)
    }

    /// Key width of the tree in bits.
    pub fn max_bits(&self) -> u8 {
        self.max_bits
    }

    /// Attach `tag` to the prefix made of the first `prefix_len` bits of `address`. Tags already
    /// stored on that prefix are kept; identical tags are not deduplicated. The empty address
    /// with length zero is the default scope, matched by every query.
    ///
    /// ```
    /// # use tag_trie::*;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut tree = Tree::ipv4();
    /// tree.add(&[127, 0, 0, 1], 32, 1)?;
    /// tree.add(&[127, 0, 0, 1], 32, 2)?;
    /// assert_eq!(tree.find_exact_tags(&[127, 0, 0, 1], 32)?, &[1, 2]);
    /// assert!(tree.add(&[127, 0, 0, 1], 33, 3).is_err());
    /// assert!(tree.add(&[127, 0], 24, 3).is_err());
    /// # Ok(())
    /// # }
    /// ```
    pub fn add(&mut self, address: &[u8], prefix_len: u8, tag: T) -> Result<()> {
        let bits = self.bits_of(address, prefix_len)?;
        let idx = self.node_for_insert(&bits);
        self.table[idx].tags.push(tag);
        Ok(())
    }

    /// Attach `tag` to a typed prefix. See [`Tree::add`].
    ///
    /// ```
    /// # use tag_trie::*;
    /// # use ipnet::Ipv4Net;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut tree = Tree::ipv4();
    /// tree.add_prefix(&"10.0.0.0/8".parse::<Ipv4Net>()?, "a")?;
    /// assert_eq!(tree.find_prefix_tags(&"10.1.0.0/16".parse::<Ipv4Net>()?)?, vec![&"a"]);
    /// # Ok(())
    /// # }
    /// ```
    pub fn add_prefix<P: Prefix>(&mut self, prefix: &P, tag: T) -> Result<()> {
        self.add(prefix.octets().as_ref(), prefix.prefix_len(), tag)
    }

    /// Replace all tags stored on exactly this prefix by `tags`, and return the previous ones.
    /// Setting an empty list removes the prefix from the tree like [`Tree::delete`] would.
    ///
    /// ```
    /// # use tag_trie::*;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut tree = Tree::ipv4();
    /// tree.add(&[10], 8, 1)?;
    /// assert_eq!(tree.set(&[10], 8, vec![2, 3])?, vec![1]);
    /// assert_eq!(tree.find_tags(&[10, 0, 0, 1], 32)?, vec![&2, &3]);
    /// assert_eq!(tree.set(&[10], 8, vec![])?, vec![2, 3]);
    /// assert_eq!(tree.count_nodes(), 1);
    /// # Ok(())
    /// # }
    /// ```
    pub fn set(&mut self, address: &[u8], prefix_len: u8, tags: Vec<T>) -> Result<Vec<T>> {
        let bits = self.bits_of(address, prefix_len)?;
        if tags.is_empty() {
            return Ok(self.take_tags(&bits));
        }
        let idx = self.node_for_insert(&bits);
        Ok(std::mem::replace(&mut self.table[idx].tags, tags))
    }

    /// Get all tags stored on any prefix that covers the first `prefix_len` bits of `address`,
    /// including the default scope. Tags are ordered from the least specific prefix to the most
    /// specific one, and by insertion order within a prefix.
    ///
    /// Prefixes that are more specific than the query are never included, even if they start
    /// with the queried bits.
    ///
    /// ```
    /// # use tag_trie::*;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut tree = Tree::ipv4();
    /// tree.add(&[10], 8, "a")?;
    /// tree.add(&[10, 1], 16, "b")?;
    /// assert_eq!(tree.find_tags(&[10, 1, 0, 0], 32)?, vec![&"a", &"b"]);
    /// assert_eq!(tree.find_tags(&[10, 1], 16)?, vec![&"a", &"b"]);
    /// assert_eq!(tree.find_tags(&[10], 8)?, vec![&"a"]);
    /// assert_eq!(tree.find_tags(&[10], 7)?, Vec::<&&str>::new());
    /// # Ok(())
    /// # }
    /// ```
    pub fn find_tags(&self, address: &[u8], prefix_len: u8) -> Result<Vec<&T>> {
        let bits = self.bits_of(address, prefix_len)?;
        let mut tags = Vec::new();
        self.collect_tags(&bits, |_| true, &mut tags);
        Ok(tags)
    }

    /// Like [`Tree::find_tags`], but only include tags for which `filter(tag, context)` returns
    /// `true`.
    ///
    /// ```
    /// # use tag_trie::*;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut tree = Tree::ipv4();
    /// tree.add(&[], 0, 1)?;
    /// tree.add(&[10], 8, 2)?;
    /// tree.add(&[10], 8, 3)?;
    /// let above = |tag: &i32, min: &i32| tag > min;
    /// assert_eq!(tree.find_tags_with_filter(&[10, 0, 0, 1], 32, above, &1)?, vec![&2, &3]);
    /// # Ok(())
    /// # }
    /// ```
    pub fn find_tags_with_filter<C, F>(
        &self,
        address: &[u8],
        prefix_len: u8,
        mut filter: F,
        context: &C,
    ) -> Result<Vec<&T>>
    where
        C: ?Sized,
        F: FnMut(&T, &C) -> bool,
    {
        let bits = self.bits_of(address, prefix_len)?;
        let mut tags = Vec::new();
        self.collect_tags(&bits, |t| filter(t, context), &mut tags);
        Ok(tags)
    }

    /// Get the tags of all prefixes covering a typed prefix. See [`Tree::find_tags`].
    pub fn find_prefix_tags<P: Prefix>(&self, prefix: &P) -> Result<Vec<&T>> {
        self.find_tags(prefix.octets().as_ref(), prefix.prefix_len())
    }

    /// Get the tags stored on exactly this prefix, without the covering ones.
    ///
    /// ```
    /// # use tag_trie::*;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut tree = Tree::ipv4();
    /// tree.add(&[], 0, 1)?;
    /// tree.add(&[10], 8, 2)?;
    /// assert_eq!(tree.find_exact_tags(&[10], 8)?, &[2]);
    /// assert!(tree.find_exact_tags(&[10, 0], 16)?.is_empty());
    /// # Ok(())
    /// # }
    /// ```
    pub fn find_exact_tags(&self, address: &[u8], prefix_len: u8) -> Result<&[T]> {
        let bits = self.bits_of(address, prefix_len)?;
        Ok(self
            .locate(&bits)
            .map(|loc| self.table[loc.idx].tags.as_slice())
            .unwrap_or_default())
    }

    /// Get the tags of the most specific prefix covering the query that has any tags.
    ///
    /// ```
    /// # use tag_trie::*;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut tree = Tree::ipv4();
    /// tree.add(&[], 0, 1)?;
    /// tree.add(&[10], 8, 2)?;
    /// tree.add(&[10, 1], 16, 3)?;
    /// assert_eq!(tree.find_deepest_tags(&[10, 1, 1, 1], 32)?, &[3]);
    /// assert_eq!(tree.find_deepest_tags(&[10, 2, 1, 1], 32)?, &[2]);
    /// assert_eq!(tree.find_deepest_tags(&[11, 2, 1, 1], 32)?, &[1]);
    /// # Ok(())
    /// # }
    /// ```
    pub fn find_deepest_tags(&self, address: &[u8], prefix_len: u8) -> Result<&[T]> {
        let bits = self.bits_of(address, prefix_len)?;
        let mut idx = 0;
        let mut pos = 0;
        let mut deepest: &[T] = &[];
        loop {
            if !self.table[idx].tags.is_empty() {
                deepest = &self.table[idx].tags;
            }
            match self.get_direction(idx, &bits, pos) {
                Direction::Enter { next } => {
                    pos += self.table[next].prefix.len();
                    idx = next;
                }
                _ => return Ok(deepest),
            }
        }
    }

    /// Create a [`Searcher`] on this tree that reuses its scratch buffer across lookups.
    pub fn searcher(&self) -> Searcher<'_, T> {
        Searcher::new(self)
    }

    /// Number of nodes reachable from the root, including the root itself.
    pub fn count_nodes(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![0];
        while let Some(idx) = stack.pop() {
            count += 1;
            let node = &self.table[idx];
            stack.extend(node.left);
            stack.extend(node.right);
        }
        count
    }

    /// Number of tags stored in the tree.
    pub fn count_tags(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![0];
        while let Some(idx) = stack.pop() {
            let node = &self.table[idx];
            count += node.tags.len();
            stack.extend(node.left);
            stack.extend(node.right);
        }
        count
    }

    /// Check whether the tree holds no tags at all.
    pub fn is_empty(&self) -> bool {
        self.table.iter().all(|node| node.tags.is_empty())
    }

    /// Remove all prefixes and tags, but keep the allocated memory.
    pub fn clear(&mut self) {
        self.table.clear();
        self.free.clear();
        self.table.push(Node::empty());
    }
}

/// Private function implementations
impl<T> Tree<T> {
    fn with_width(max_bits: u8) -> Self {
        tracing::debug!(max_bits, "created tag tree");
        Self {
            max_bits,
            table: vec![Node::empty()],
            free: Vec::new(),
        }
    }

    /// Unpack the first `prefix_len` bits of `address` into `buf`, after checking them against
    /// the key width.
    pub(crate) fn load_bits(
        &self,
        buf: &mut Vec<bool>,
        address: &[u8],
        prefix_len: u8,
    ) -> Result<()> {
        if prefix_len > self.max_bits {
            return Err(TrieError::PrefixTooLong {
                prefix_len,
                max_bits: self.max_bits,
            });
        }
        unpack_bits(buf, address, prefix_len as usize)
    }

    fn bits_of(&self, address: &[u8], prefix_len: u8) -> Result<Vec<bool>> {
        let mut bits = Vec::with_capacity(self.max_bits as usize);
        self.load_bits(&mut bits, address, prefix_len)?;
        Ok(bits)
    }

    /// Push every tag on the path towards `bits` that passes `keep` into `out`.
    pub(crate) fn collect_tags<'a, F>(
        &'a self,
        bits: &[bool],
        mut keep: F,
        out: &mut Vec<&'a T>,
    ) where
        F: FnMut(&T) -> bool,
    {
        let mut idx = 0;
        let mut pos = 0;
        loop {
            for tag in &self.table[idx].tags {
                if keep(tag) {
                    out.push(tag);
                }
            }
            match self.get_direction(idx, bits, pos) {
                Direction::Enter { next } => {
                    pos += self.table[next].prefix.len();
                    idx = next;
                }
                _ => return,
            }
        }
    }

    /// Find the node whose full prefix is exactly `bits`, along with its parent and grandparent.
    fn locate(&self, bits: &[bool]) -> Option<Location> {
        let mut loc = Location {
            idx: 0,
            par: None,
            grp: None,
        };
        let mut pos = 0;
        loop {
            match self.get_direction(loc.idx, bits, pos) {
                Direction::Reached => return Some(loc),
                Direction::Enter { next } => {
                    let right = bits[pos];
                    pos += self.table[next].prefix.len();
                    loc = Location {
                        idx: next,
                        par: Some((loc.idx, right)),
                        grp: loc.par,
                    };
                }
                Direction::Missing => return None,
            }
        }
    }

    /// Get the node whose full prefix is exactly `bits`, creating it (and possibly a branch node)
    /// if it does not exist yet.
    fn node_for_insert(&mut self, bits: &[bool]) -> usize {
        let mut idx = 0;
        let mut pos = 0;
        loop {
            match self.get_direction_for_insert(idx, bits, pos) {
                DirectionForInsert::Reached => return idx,
                DirectionForInsert::Enter { next } => {
                    pos += self.table[next].prefix.len();
                    idx = next;
                }
                DirectionForInsert::NewLeaf { right } => {
                    let leaf = self.new_node(bits[pos..].to_vec());
                    self.set_child(idx, leaf, right);
                    tracing::trace!(prefix_len = bits.len(), "new leaf");
                    return leaf;
                }
                DirectionForInsert::Split {
                    child,
                    right,
                    matched,
                } => {
                    let branch = self.split(child, matched);
                    self.set_child(idx, branch, right);
                    pos += matched;
                    tracing::trace!(prefix_len = bits.len(), branch_len = pos, "split node");
                    if pos == bits.len() {
                        return branch;
                    }
                    let leaf = self.new_node(bits[pos..].to_vec());
                    self.set_child(branch, leaf, bits[pos]);
                    return leaf;
                }
            }
        }
    }

    /// Cut the prefix of `child` after `at` bits. The leading bits move into a new branch node
    /// that takes `child` as its only child. Returns the index of the branch.
    fn split(&mut self, child: usize, at: usize) -> usize {
        let tail = self.table[child].prefix.split_off(at);
        let head = std::mem::replace(&mut self.table[child].prefix, tail);
        let child_right = self.table[child].prefix[0];
        let branch = self.new_node(head);
        self.set_child(branch, child, child_right);
        branch
    }

    /// Get the child of a node, either to the left or the right
    #[inline(always)]
    pub(crate) fn get_child(&self, idx: usize, right: bool) -> Option<usize> {
        if right {
            self.table[idx].right
        } else {
            self.table[idx].left
        }
    }

    /// set the child of a node (either to the left or the right), and return the index of the old child.
    #[inline(always)]
    fn set_child(&mut self, idx: usize, child: usize, right: bool) -> Option<usize> {
        if right {
            self.table[idx].right.replace(child)
        } else {
            self.table[idx].left.replace(child)
        }
    }

    /// remove a child from a node (just the reference).
    #[inline(always)]
    fn clear_child(&mut self, idx: usize, right: bool) -> Option<usize> {
        if right {
            self.table[idx].right.take()
        } else {
            self.table[idx].left.take()
        }
    }

    /// insert a new node into the table and return its index.
    #[inline(always)]
    fn new_node(&mut self, prefix: Vec<bool>) -> usize {
        if let Some(idx) = self.free.pop() {
            self.table[idx].prefix = prefix;
            idx
        } else {
            let idx = self.table.len();
            self.table.push(Node {
                prefix,
                ..Node::empty()
            });
            idx
        }
    }

    /// Release a node back into the free list. The node must already be unlinked.
    fn free_node(&mut self, idx: usize) {
        self.table[idx] = Node::empty();
        self.free.push(idx);
    }

    /// Get the directions from some node `cur` (whose full prefix matches the first `pos` bits)
    /// to get to `bits`.
    #[inline(always)]
    fn get_direction(&self, cur: usize, bits: &[bool], pos: usize) -> Direction {
        let Some(&right) = bits.get(pos) else {
            return Direction::Reached;
        };
        match self.get_child(cur, right) {
            Some(child) if self.is_covered_by(child, &bits[pos..]) => {
                Direction::Enter { next: child }
            }
            _ => Direction::Missing,
        }
    }

    /// Get the directions from some node `cur` to insert `bits`.
    #[inline(always)]
    fn get_direction_for_insert(
        &self,
        cur: usize,
        bits: &[bool],
        pos: usize,
    ) -> DirectionForInsert {
        let Some(&right) = bits.get(pos) else {
            return DirectionForInsert::Reached;
        };
        let Some(child) = self.get_child(cur, right) else {
            return DirectionForInsert::NewLeaf { right };
        };
        let matched = count_matches(&self.table[child].prefix, &bits[pos..]);
        if matched == self.table[child].prefix.len() {
            DirectionForInsert::Enter { next: child }
        } else {
            DirectionForInsert::Split {
                child,
                right,
                matched,
            }
        }
    }

    /// Check if the whole prefix of `child` is a prefix of `rest`.
    #[inline(always)]
    fn is_covered_by(&self, child: usize, rest: &[bool]) -> bool {
        let prefix = &self.table[child].prefix;
        prefix.len() <= rest.len() && count_matches(prefix, rest) == prefix.len()
    }
}

/// Position of a node, with the direction under which it hangs at its parent and the one under
/// which the parent hangs at the grandparent.
#[derive(Clone, Copy)]
struct Location {
    idx: usize,
    par: Option<(usize, bool)>,
    grp: Option<(usize, bool)>,
}

enum Direction {
    /// The prefix is already reached.
    Reached,
    /// Enter the next index and search again.
    Enter { next: usize },
    /// The node was not found.
    Missing,
}

enum DirectionForInsert {
    /// The prefix is already reached.
    Reached,
    /// Enter the next index and search again.
    Enter { next: usize },
    /// Insert a new child at the given position as a leaf.
    NewLeaf { right: bool },
    /// Only the first `matched` bits of `child` agree with the prefix. The child must be split
    /// into a branch node holding those bits, which is inserted at `right`.
    Split {
        child: usize,
        right: bool,
        matched: usize,
    },
}
