use super::{Key, KeyIndex, KeyedVector};
use crate::error::{Result, StiffnessError};
use nalgebra::DMatrix;

/// Dense matrix addressed by row and column keys.
///
/// The backing store's index for a key is the key's position in the
/// corresponding [`KeyIndex`], fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedMatrix<R: Key, C: Key> {
    rows: KeyIndex<R>,
    cols: KeyIndex<C>,
    data: DMatrix<f64>,
}

impl<R: Key, C: Key> KeyedMatrix<R, C> {
    /// Zero matrix sized to the given key sequences
    pub fn zeros(row_keys: impl IntoIterator<Item = R>, col_keys: impl IntoIterator<Item = C>) -> Result<Self> {
        let rows = KeyIndex::new(row_keys)?;
        let cols = KeyIndex::new(col_keys)?;
        let data = DMatrix::zeros(rows.len(), cols.len());
        Ok(Self { rows, cols, data })
    }

    /// Wrap an existing dense matrix; its shape must match the key counts
    pub fn from_dense(
        row_keys: impl IntoIterator<Item = R>,
        col_keys: impl IntoIterator<Item = C>,
        data: DMatrix<f64>,
    ) -> Result<Self> {
        Self::from_parts(KeyIndex::new(row_keys)?, KeyIndex::new(col_keys)?, data)
    }

    pub fn from_parts(rows: KeyIndex<R>, cols: KeyIndex<C>, data: DMatrix<f64>) -> Result<Self> {
        if data.nrows() != rows.len() || data.ncols() != cols.len() {
            return Err(StiffnessError::InvalidArgument(format!(
                "dense matrix is {}x{} but {} row keys and {} column keys were given",
                data.nrows(),
                data.ncols(),
                rows.len(),
                cols.len()
            )));
        }
        Ok(Self { rows, cols, data })
    }

    pub fn nrows(&self) -> usize {
        self.rows.len()
    }

    pub fn ncols(&self) -> usize {
        self.cols.len()
    }

    pub fn row_keys(&self) -> &[R] {
        self.rows.keys()
    }

    pub fn col_keys(&self) -> &[C] {
        self.cols.keys()
    }

    pub fn row_index(&self) -> &KeyIndex<R> {
        &self.rows
    }

    pub fn col_index(&self) -> &KeyIndex<C> {
        &self.cols
    }

    pub fn as_dense(&self) -> &DMatrix<f64> {
        &self.data
    }

    pub fn at(&self, row: &R, col: &C) -> Result<f64> {
        let (i, j) = self.locate(row, col)?;
        Ok(self.data[(i, j)])
    }

    pub fn at_mut(&mut self, row: &R, col: &C) -> Result<&mut f64> {
        let (i, j) = self.locate(row, col)?;
        Ok(&mut self.data[(i, j)])
    }

    pub fn set(&mut self, row: &R, col: &C, value: f64) -> Result<()> {
        *self.at_mut(row, col)? = value;
        Ok(())
    }

    pub fn add_at(&mut self, row: &R, col: &C, value: f64) -> Result<()> {
        *self.at_mut(row, col)? += value;
        Ok(())
    }

    fn locate(&self, row: &R, col: &C) -> Result<(usize, usize)> {
        Ok((self.rows.require(row, "row")?, self.cols.require(col, "column")?))
    }

    /// `self · other`, keyed by this matrix's rows and `other`'s columns.
    ///
    /// This matrix's column keys and `other`'s row keys must coincide
    /// position by position.
    pub fn multiply<C2: Key>(&self, other: &KeyedMatrix<C, C2>) -> Result<KeyedMatrix<R, C2>> {
        self.cols.ensure_aligned(&other.rows, "multiply")?;
        Ok(KeyedMatrix {
            rows: self.rows.clone(),
            cols: other.cols.clone(),
            data: &self.data * &other.data,
        })
    }

    pub fn mul_vector(&self, vector: &KeyedVector<C>) -> Result<KeyedVector<R>> {
        self.cols.ensure_aligned(vector.index(), "matrix-vector product")?;
        KeyedVector::from_parts(self.rows.clone(), &self.data * vector.as_dense())
    }

    pub fn add(&self, other: &Self) -> Result<Self> {
        self.ensure_same_keys(other, "add")?;
        Ok(Self {
            rows: self.rows.clone(),
            cols: self.cols.clone(),
            data: &self.data + &other.data,
        })
    }

    pub fn sub(&self, other: &Self) -> Result<Self> {
        self.ensure_same_keys(other, "sub")?;
        Ok(Self {
            rows: self.rows.clone(),
            cols: self.cols.clone(),
            data: &self.data - &other.data,
        })
    }

    fn ensure_same_keys(&self, other: &Self, context: &str) -> Result<()> {
        self.rows.ensure_aligned(&other.rows, context)?;
        self.cols.ensure_aligned(&other.cols, context)
    }

    pub fn transpose(&self) -> KeyedMatrix<C, R> {
        KeyedMatrix {
            rows: self.cols.clone(),
            cols: self.rows.clone(),
            data: self.data.transpose(),
        }
    }

    pub fn scale(&self, factor: f64) -> Self {
        Self {
            rows: self.rows.clone(),
            cols: self.cols.clone(),
            data: &self.data * factor,
        }
    }

    pub fn determinant(&self) -> Result<f64> {
        if !self.data.is_square() {
            return Err(StiffnessError::InvalidOperation(format!(
                "determinant of a non-square {}x{} matrix",
                self.nrows(),
                self.ncols()
            )));
        }
        Ok(self.data.determinant())
    }

    /// Largest absolute entry (zero for an empty matrix)
    pub fn max_abs(&self) -> f64 {
        self.data.iter().fold(0.0, |acc, v| acc.max(v.abs()))
    }

    /// Maximum absolute column sum
    pub fn norm_l1(&self) -> f64 {
        self.data
            .column_iter()
            .map(|col| col.iter().map(|v| v.abs()).sum::<f64>())
            .fold(0.0, f64::max)
    }

    pub fn norm_frobenius(&self) -> f64 {
        self.data.norm()
    }

    /// Maximum absolute row sum
    pub fn norm_infinity(&self) -> f64 {
        self.data
            .row_iter()
            .map(|row| row.iter().map(|v| v.abs()).sum::<f64>())
            .fold(0.0, f64::max)
    }

    /// All entries with their keys, row by row
    pub fn entries(&self) -> impl Iterator<Item = (&R, &C, f64)> + '_ {
        self.rows.keys().iter().enumerate().flat_map(move |(i, r)| {
            self.cols
                .keys()
                .iter()
                .enumerate()
                .map(move |(j, c)| (r, c, self.data[(i, j)]))
        })
    }
}
