use super::{Key, KeyIndex};
use crate::error::{Result, StiffnessError};
use nalgebra::DVector;

/// Dense vector addressed by keys
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedVector<K: Key> {
    keys: KeyIndex<K>,
    data: DVector<f64>,
}

impl<K: Key> KeyedVector<K> {
    pub fn zeros(keys: impl IntoIterator<Item = K>) -> Result<Self> {
        let keys = KeyIndex::new(keys)?;
        let data = DVector::zeros(keys.len());
        Ok(Self { keys, data })
    }

    pub fn from_dense(keys: impl IntoIterator<Item = K>, data: DVector<f64>) -> Result<Self> {
        Self::from_parts(KeyIndex::new(keys)?, data)
    }

    pub fn from_parts(keys: KeyIndex<K>, data: DVector<f64>) -> Result<Self> {
        if keys.len() != data.len() {
            return Err(StiffnessError::InvalidArgument(format!(
                "dense vector has {} entries but {} keys were given",
                data.len(),
                keys.len()
            )));
        }
        Ok(Self { keys, data })
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[K] {
        self.keys.keys()
    }

    pub fn index(&self) -> &KeyIndex<K> {
        &self.keys
    }

    pub fn as_dense(&self) -> &DVector<f64> {
        &self.data
    }

    pub fn at(&self, key: &K) -> Result<f64> {
        Ok(self.data[self.keys.require(key, "vector")?])
    }

    pub fn set(&mut self, key: &K, value: f64) -> Result<()> {
        let i = self.keys.require(key, "vector")?;
        self.data[i] = value;
        Ok(())
    }

    pub fn add_at(&mut self, key: &K, value: f64) -> Result<()> {
        let i = self.keys.require(key, "vector")?;
        self.data[i] += value;
        Ok(())
    }

    pub fn dot(&self, other: &Self) -> Result<f64> {
        self.keys.ensure_aligned(&other.keys, "dot")?;
        Ok(self.data.dot(&other.data))
    }

    pub fn add(&self, other: &Self) -> Result<Self> {
        self.keys.ensure_aligned(&other.keys, "add")?;
        Ok(Self {
            keys: self.keys.clone(),
            data: &self.data + &other.data,
        })
    }

    pub fn scale(&self, factor: f64) -> Self {
        Self {
            keys: self.keys.clone(),
            data: &self.data * factor,
        }
    }

    /// Euclidean norm
    pub fn norm(&self) -> f64 {
        self.data.norm()
    }

    pub fn normalize(&self) -> Result<Self> {
        let norm = self.norm();
        if norm == 0.0 || !norm.is_finite() {
            return Err(StiffnessError::InvalidArgument(format!(
                "cannot normalize a vector of norm {}",
                norm
            )));
        }
        Ok(self.scale(1.0 / norm))
    }
}
