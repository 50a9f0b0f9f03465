use std::fmt::{self, Debug};
use std::ops::{AddAssign, Index, IndexMut};

use num::Num;
use serde::{Deserialize, Serialize};

/// DenseMatrix
/// row-major の密行列です
/// 小規模コーパス前提なので全要素を持ちます
///
/// 要素 (r, c) は `data[r * cols + c]` にあります
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseMatrix<N = f64>
where
    N: Num + Copy,
{
    rows: usize,
    cols: usize,
    data: Vec<N>,
}

impl<N> DenseMatrix<N>
where
    N: Num + Copy,
{
    /// Zero-initialized `rows x cols` matrix
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![N::zero(); rows * cols],
        }
    }

    /// Identity matrix of size `n`
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m[(i, i)] = N::one();
        }
        m
    }

    /// Build from nested rows
    /// every row must have the same length
    pub fn from_rows(rows: &[Vec<N>]) -> Self {
        let cols = rows.first().map(|r| r.len()).unwrap_or(0);
        debug_assert!(rows.iter().all(|r| r.len() == cols), "ragged rows");
        let mut data = Vec::with_capacity(rows.len() * cols);
        for row in rows {
            data.extend_from_slice(row);
        }
        Self {
            rows: rows.len(),
            cols,
            data,
        }
    }

    /// Square matrix with `diag` on the diagonal
    pub fn from_diagonal(diag: &[N]) -> Self {
        let mut m = Self::zeros(diag.len(), diag.len());
        for (i, &v) in diag.iter().enumerate() {
            m[(i, i)] = v;
        }
        m
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<N> {
        if row < self.rows && col < self.cols {
            Some(self.data[row * self.cols + col])
        } else {
            None
        }
    }

    /// Row as a slice
    #[inline]
    pub fn row(&self, row: usize) -> &[N] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    #[inline]
    pub fn row_mut(&mut self, row: usize) -> &mut [N] {
        &mut self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Column values, top to bottom
    pub fn column(&self, col: usize) -> impl Iterator<Item = N> + '_ {
        (0..self.rows).map(move |r| self.data[r * self.cols + col])
    }

    /// Rows as nested vectors, for report tables
    pub fn to_rows(&self) -> Vec<Vec<N>> {
        (0..self.rows).map(|r| self.row(r).to_vec()).collect()
    }

    pub fn is_zero(&self) -> bool {
        self.data.iter().all(|v| v.is_zero())
    }

    pub fn transpose(&self) -> Self {
        let mut t = Self::zeros(self.cols, self.rows);
        for r in 0..self.rows {
            for c in 0..self.cols {
                t[(c, r)] = self[(r, c)];
            }
        }
        t
    }

    /// Copy of the block `[row_start, row_end) x [col_start, col_end)`
    pub fn sub_matrix(&self, row_start: usize, row_end: usize, col_start: usize, col_end: usize) -> Self {
        debug_assert!(row_end <= self.rows && col_end <= self.cols, "sub_matrix out of range");
        let mut m = Self::zeros(row_end - row_start, col_end - col_start);
        for r in row_start..row_end {
            m.row_mut(r - row_start)
                .copy_from_slice(&self.row(r)[col_start..col_end]);
        }
        m
    }

    /// Convert every element
    pub fn map<R, F>(&self, f: F) -> DenseMatrix<R>
    where
        R: Num + Copy,
        F: Fn(N) -> R,
    {
        DenseMatrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }
}

impl<N> DenseMatrix<N>
where
    N: Num + Copy + AddAssign,
{
    /// 行列積 self * other
    ///
    /// # Arguments
    /// * `other` - 右から掛ける行列 (self.cols == other.rows)
    pub fn matmul(&self, other: &Self) -> Self {
        debug_assert_eq!(self.cols, other.rows, "matmul shape mismatch");
        let mut out = Self::zeros(self.rows, other.cols);
        for r in 0..self.rows {
            for k in 0..self.cols {
                let a = self[(r, k)];
                if a.is_zero() {
                    continue;
                }
                let other_row = other.row(k);
                let out_row = out.row_mut(r);
                for (o, &b) in out_row.iter_mut().zip(other_row) {
                    *o += a * b;
                }
            }
        }
        out
    }

    /// 右から対角行列を掛ける (列 j を diag[j] 倍)
    pub fn scale_columns(&self, diag: &[N]) -> Self {
        debug_assert_eq!(self.cols, diag.len());
        let mut out = self.clone();
        for r in 0..out.rows {
            for (v, &d) in out.row_mut(r).iter_mut().zip(diag) {
                *v = *v * d;
            }
        }
        out
    }

    /// 左から対角行列を掛ける (行 i を diag[i] 倍)
    pub fn scale_rows(&self, diag: &[N]) -> Self {
        debug_assert_eq!(self.rows, diag.len());
        let mut out = self.clone();
        for (r, &d) in diag.iter().enumerate() {
            for v in out.row_mut(r) {
                *v = *v * d;
            }
        }
        out
    }
}

impl<N> Index<(usize, usize)> for DenseMatrix<N>
where
    N: Num + Copy,
{
    type Output = N;

    #[inline]
    fn index(&self, (row, col): (usize, usize)) -> &N {
        &self.data[row * self.cols + col]
    }
}

impl<N> IndexMut<(usize, usize)> for DenseMatrix<N>
where
    N: Num + Copy,
{
    #[inline]
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut N {
        &mut self.data[row * self.cols + col]
    }
}

impl<N> Debug for DenseMatrix<N>
where
    N: Num + Copy + Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            writeln!(f, "DenseMatrix {}x{} [", self.rows, self.cols)?;
            for r in 0..self.rows {
                writeln!(f, "    {:?}", self.row(r))?;
            }
            write!(f, "]")
        } else {
            f.debug_struct("DenseMatrix")
                .field("rows", &self.rows)
                .field("cols", &self.cols)
                .field("data", &self.data)
                .finish()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matmul_and_transpose() {
        let a = DenseMatrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]);
        let at = a.transpose();
        assert_eq!(at.shape(), (2, 3));
        let ata = at.matmul(&a);
        assert_eq!(ata.to_rows(), vec![vec![35.0, 44.0], vec![44.0, 56.0]]);
    }

    #[test]
    fn sub_matrix_copies_block() {
        let a = DenseMatrix::from_rows(&[vec![1u32, 2, 3], vec![4, 5, 6], vec![7, 8, 9]]);
        let b = a.sub_matrix(1, 3, 0, 2);
        assert_eq!(b.to_rows(), vec![vec![4, 5], vec![7, 8]]);
    }

    #[test]
    fn diagonal_scaling() {
        let a = DenseMatrix::from_rows(&[vec![1.0, 1.0], vec![2.0, 2.0]]);
        let cols = a.scale_columns(&[2.0, 3.0]);
        assert_eq!(cols.to_rows(), vec![vec![2.0, 3.0], vec![4.0, 6.0]]);
        let rows = a.scale_rows(&[2.0, 3.0]);
        assert_eq!(rows.to_rows(), vec![vec![2.0, 2.0], vec![6.0, 6.0]]);
        let s = DenseMatrix::from_diagonal(&[2.0, 3.0]);
        assert_eq!(a.matmul(&s), cols);
    }

    #[test]
    fn map_converts_counts() {
        let counts = DenseMatrix::from_rows(&[vec![1u32, 0], vec![2, 3]]);
        let f: DenseMatrix<f64> = counts.map(f64::from);
        assert_eq!(f[(1, 1)], 3.0);
        assert!(!f.is_zero());
        assert!(DenseMatrix::<f64>::zeros(2, 2).is_zero());
    }
}
