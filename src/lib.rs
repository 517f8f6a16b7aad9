//! This crate provides a patricia tree that attaches tags to IP prefixes (or prefixes of any other
//! fixed-width key space). In contrast to a routing table, a lookup does not only return the
//! longest matching prefix, but the tags of *every* prefix that covers the queried address, from
//! the least specific to the most specific one. This is the information needed to classify
//! packets, requests or records by nested network ranges (GeoIP, ACL or policy tags).
//!
//! Addresses are given as bytes (most significant first) together with a prefix length in bits.
//! Typed prefixes from [ipnet](https://docs.rs/ipnet), [ipnetwork](https://docs.rs/ipnetwork)
//! or [cidr](https://docs.rs/cidr), and tuples `(R, u8)` of an unsigned integer and a length,
//! can be used through the [`Prefix`] trait.
//!
//! ```
//! # use tag_trie::*;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut tree = Tree::ipv4();
//! tree.add(&[], 0, "internet")?;
//! tree.add(&[10], 8, "private")?;
//! tree.add(&[10, 0, 42], 24, "lab")?;
//!
//! assert_eq!(
//!     tree.find_tags(&[10, 0, 42, 7], 32)?,
//!     vec![&"internet", &"private", &"lab"]
//! );
//!
//! let matches = |tag: &&str, name: &str| *tag == name;
//! assert_eq!(tree.delete(&[10, 0, 42], 24, matches, "lab")?, 1);
//! assert_eq!(tree.find_tags(&[10, 0, 42, 7], 32)?, vec![&"internet", &"private"]);
//! # Ok(())
//! # }
//! ```
//!
//! # Description of the Tree
//!
//! The nodes are stored in a table and refer to their children by index. Each node consists of
//! the bits it adds to the prefix of its parent, a list of tags, and two optional children.
//! Traversing into the tree is done as follows: we look at the first bit of the query that is
//! **not** covered by the current node. If it is not set, then we take the left branch, and
//! otherwise, we take the right one. The root has the empty prefix and is always present; its
//! tags are returned by every lookup.
//!
//! Inserting a prefix that diverges from a node in the middle of the node's bits splits that node
//! into a branch node that holds the common bits. Deleting the last tag of a node removes the
//! node if it has no children, and merges it into its child if it has exactly one. Thus, after
//! any sequence of operations, every node except the root either holds tags or branches.
//!
//! # Operations on the tree
//!
//! The following are the computational complexities of the functions, where `w` is the key width
//! of the tree, `n` the number of nodes and `t` the number of returned or stored tags.
//!
//! | Operation                                       | Complexity |
//! |-------------------------------------------------|------------|
//! | `add`, `set`                                    | `O(w)`     |
//! | `delete`                                        | `O(w + t)` |
//! | `find_tags`, `find_exact_tags`, `find_deepest_tags` | `O(w + t)` |
//! | `count_nodes`, `count_tags`, `iter`, `clear`    | `O(n)`     |
//!
//! # Concurrency
//!
//! The tree has no internal synchronization. All modifications take `&mut self`, and all lookups
//! take `&self`. Repeated lookups should go through a [`Searcher`], which reuses the buffer the
//! queried address is decoded into. Every thread needs its own searcher.

#![deny(missing_docs)]

pub mod bits;
pub mod error;
mod fmt;
#[cfg(test)]
mod fuzzing;
mod iter;
mod prefix;
mod searcher;
#[cfg(feature = "serde")]
mod serde;
mod tree;

pub use error::TrieError;
pub use iter::Iter;
pub use prefix::Prefix;
pub use searcher::Searcher;
pub use tree::{Tree, IPV4_BITS, IPV6_BITS, MAX_BITS_LIMIT};
