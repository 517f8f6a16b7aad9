//! Error types of the tag trie.

use thiserror::Error;

/// Result type for tree operations.
pub type Result<T> = std::result::Result<T, TrieError>;

/// Errors that can occur when building, modifying or querying a [`crate::Tree`].
///
/// All of them are argument errors: they are reported before the tree is touched, so a failed
/// call never leaves the tree in a partially modified state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TrieError {
    /// The key width requested at construction is zero or above the supported limit.
    #[error("invalid key width of {max_bits} bits: must be between 1 and {limit}")]
    InvalidMaxBits {
        /// Requested key width.
        max_bits: u8,
        /// Largest supported key width.
        limit: u8,
    },

    /// The prefix length is longer than the key width of the tree.
    #[error("prefix length {prefix_len} exceeds the key width of {max_bits} bits")]
    PrefixTooLong {
        /// Requested prefix length.
        prefix_len: u8,
        /// Key width of the tree.
        max_bits: u8,
    },

    /// The address does not contain enough bytes to cover the prefix length.
    #[error("address supplies {available} bits, but the prefix length is {prefix_len}")]
    AddressTooShort {
        /// Requested prefix length.
        prefix_len: usize,
        /// Number of bits the address can supply.
        available: usize,
    },
}
