//! Serialization and Deserialization implementation

use ::serde::de::Error;
use ::serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::*;

/// A tree is serialized as the tuple `(max_bits, entries)`, where each entry is
/// `(address, prefix_len, tags)` as yielded by [`Tree::iter`].
impl<T: Serialize> Serialize for Tree<T> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let entries: Vec<(Vec<u8>, u8, &[T])> = self.iter().collect();
        (self.max_bits, entries).serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Tree<T> {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (max_bits, entries): (u8, Vec<(Vec<u8>, u8, Vec<T>)>) =
            Deserialize::deserialize(deserializer)?;
        let mut tree = Tree::new(max_bits).map_err(D::Error::custom)?;
        for (address, prefix_len, tags) in entries {
            for tag in tags {
                tree.add(&address, prefix_len, tag)
                    .map_err(D::Error::custom)?;
            }
        }
        Ok(tree)
    }
}
