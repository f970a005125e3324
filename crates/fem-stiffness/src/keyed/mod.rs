//! Dense matrices and vectors addressed by domain keys.
//!
//! A [`KeyIndex`] fixes the position of every key when it is built; the
//! keyed containers translate key-addressed operations into index-addressed
//! `nalgebra` operations. Binary operations require the participating key
//! sequences to agree position by position and fail fast otherwise.

mod matrix;
mod vector;

pub use matrix::KeyedMatrix;
pub use vector::KeyedVector;

use crate::error::{Result, StiffnessError};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

/// Anything usable as a row or column key
pub trait Key: Clone + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync {}

impl<T> Key for T where T: Clone + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync {}

/// Ordered, duplicate-free key sequence with O(1) key-to-position lookup
#[derive(Debug, Clone)]
pub struct KeyIndex<K: Key> {
    keys: Vec<K>,
    positions: HashMap<K, usize>,
}

impl<K: Key> KeyIndex<K> {
    pub fn new(keys: impl IntoIterator<Item = K>) -> Result<Self> {
        let keys: Vec<K> = keys.into_iter().collect();
        let mut positions = HashMap::with_capacity(keys.len());
        for (position, key) in keys.iter().enumerate() {
            if positions.insert(key.clone(), position).is_some() {
                return Err(StiffnessError::InvalidArgument(format!(
                    "duplicate key {} in key sequence",
                    key
                )));
            }
        }
        Ok(Self { keys, positions })
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    pub fn position(&self, key: &K) -> Option<usize> {
        self.positions.get(key).copied()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.positions.contains_key(key)
    }

    pub(crate) fn require(&self, key: &K, role: &str) -> Result<usize> {
        self.position(key)
            .ok_or_else(|| StiffnessError::OutOfRange(format!("{} key {} is not present", role, key)))
    }

    /// Fail unless both sequences hold the same keys in the same positions
    pub(crate) fn ensure_aligned(&self, other: &KeyIndex<K>, context: &str) -> Result<()> {
        if self.len() != other.len() {
            return Err(StiffnessError::InvalidArgument(format!(
                "{}: key count mismatch ({} vs {})",
                context,
                self.len(),
                other.len()
            )));
        }
        if let Some((position, (a, b))) = self
            .keys
            .iter()
            .zip(other.keys.iter())
            .enumerate()
            .find(|(_, (a, b))| a != b)
        {
            return Err(StiffnessError::InvalidArgument(format!(
                "{}: keys differ at position {} ({} vs {})",
                context, position, a, b
            )));
        }
        Ok(())
    }
}

impl<K: Key> PartialEq for KeyIndex<K> {
    fn eq(&self, other: &Self) -> bool {
        self.keys == other.keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_follow_insertion_order() {
        let index = KeyIndex::new(["b", "a", "c"]).unwrap();
        assert_eq!(index.position(&"b"), Some(0));
        assert_eq!(index.position(&"c"), Some(2));
        assert_eq!(index.position(&"d"), None);
        assert_eq!(index.keys(), &["b", "a", "c"]);
    }

    #[test]
    fn rejects_duplicates() {
        let err = KeyIndex::new(["a", "b", "a"]).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn alignment_requires_same_order() {
        let a = KeyIndex::new([1, 2, 3]).unwrap();
        let b = KeyIndex::new([1, 3, 2]).unwrap();
        let err = a.ensure_aligned(&b, "test").unwrap_err();
        assert!(err.to_string().contains("position 1"));
        assert!(a.ensure_aligned(&a.clone(), "test").is_ok());
    }
}
