//! Formatting implementation for the Tree

use std::fmt::{Debug, Formatter, Result};

use super::*;

impl<T: Debug> Debug for Tree<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        DebugTree(self, 0).fmt(f)
    }
}

struct DebugTree<'a, T>(&'a Tree<T>, usize);

/// The bits a node consumes, written as `0b1011`. The empty prefix of the root is written as `*`.
struct DebugBits<'a>(&'a [bool]);

impl Debug for DebugBits<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        if self.0.is_empty() {
            return f.write_str("*");
        }
        f.write_str("0b")?;
        for bit in self.0 {
            f.write_str(if *bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl<T: Debug> Debug for DebugTree<'_, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let tree = self.0;
        let idx = self.1;
        let node = &tree.table[idx];
        let prefix = DebugBits(&node.prefix);
        let tags = &node.tags;
        match (tags.is_empty(), node.left, node.right) {
            (true, None, None) => prefix.fmt(f),
            (true, None, Some(child)) | (true, Some(child), None) => f
                .debug_map()
                .entry(&prefix, &Self(tree, child))
                .finish(),
            (true, Some(left), Some(right)) => f
                .debug_map()
                .entry(&prefix, &(Self(tree, left), Self(tree, right)))
                .finish(),
            (false, None, None) => f.debug_map().entry(&prefix, tags).finish(),
            (false, None, Some(child)) | (false, Some(child), None) => f
                .debug_map()
                .entry(&prefix, &(tags, Self(tree, child)))
                .finish(),
            (false, Some(left), Some(right)) => f
                .debug_map()
                .entry(&prefix, &(tags, Self(tree, left), Self(tree, right)))
                .finish(),
        }
    }
}
