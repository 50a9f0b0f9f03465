use serde::Serialize;
use tracing::debug;

use crate::error::{LsaError, Result};
use crate::lsa::matrix::TermDocumentMatrix;
use crate::utils::math::matrix::DenseMatrix;
use crate::utils::math::svd::Svd;

/// LatentFactors
/// term-document 行列の SVD を rank k で打ち切ったもの
///
/// - `term_space` (U_k): terms x k、列は正規直交
/// - `singular_values` (S_k の対角): 非負かつ降順
/// - `document_space` (Vt_k): k x documents
///
/// クエリ射影と類似度計算は U_k·S_k と S_k·Vt_k しか使わないので、
/// 構築時に一度だけ計算して保持します
#[derive(Debug, Clone, Serialize)]
pub struct LatentFactors {
    rank: usize,
    term_space: DenseMatrix<f64>,
    singular_values: Vec<f64>,
    document_space: DenseMatrix<f64>,
    /// U_k · S_k
    scaled_term_space: DenseMatrix<f64>,
    /// S_k · Vt_k
    scaled_document_space: DenseMatrix<f64>,
}

impl LatentFactors {
    /// SVD を計算し rank `k` で打ち切る
    ///
    /// # Arguments
    /// * `matrix` - term-document 行列
    /// * `k` - 残す次元数 (1 <= k <= min(terms, documents))
    ///
    /// # Errors
    /// * `InvalidRank` - k が範囲外
    pub fn factorize(matrix: &TermDocumentMatrix, k: usize) -> Result<Self> {
        let max = matrix.term_count().min(matrix.document_count());
        if max == 0 {
            return Err(LsaError::EmptyCorpus);
        }
        if k == 0 || k > max {
            return Err(LsaError::InvalidRank { rank: k, max });
        }

        let svd = Svd::decompose(&matrix.to_f64());
        debug!(
            sweeps = svd.sweeps,
            converged = svd.converged,
            singular_values = ?svd.singular_values,
            "decomposed term-document matrix"
        );
        Ok(Self::from_svd(&svd, k))
    }

    /// 計算済みの SVD から打ち切る
    /// `k` は `svd.len()` で頭打ち
    pub fn from_svd(svd: &Svd, k: usize) -> Self {
        let (term_space, singular_values, document_space) = svd.truncate(k);
        let scaled_term_space = term_space.scale_columns(&singular_values);
        let scaled_document_space = document_space.scale_rows(&singular_values);
        Self {
            rank: singular_values.len(),
            term_space,
            singular_values,
            document_space,
            scaled_term_space,
            scaled_document_space,
        }
    }

    /// k
    #[inline]
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// U_k
    #[inline]
    pub fn term_space(&self) -> &DenseMatrix<f64> {
        &self.term_space
    }

    /// diag(S_k)
    #[inline]
    pub fn singular_values(&self) -> &[f64] {
        &self.singular_values
    }

    /// S_k as a k x k matrix
    pub fn singular_matrix(&self) -> DenseMatrix<f64> {
        DenseMatrix::from_diagonal(&self.singular_values)
    }

    /// Vt_k
    #[inline]
    pub fn document_space(&self) -> &DenseMatrix<f64> {
        &self.document_space
    }

    /// U_k · S_k
    #[inline]
    pub fn scaled_term_space(&self) -> &DenseMatrix<f64> {
        &self.scaled_term_space
    }

    /// S_k · Vt_k
    #[inline]
    pub fn scaled_document_space(&self) -> &DenseMatrix<f64> {
        &self.scaled_document_space
    }

    /// 文書 `doc` の潜在空間ベクトル (S_k · Vt_k の列)
    pub fn document_vector(&self, doc: usize) -> Vec<f64> {
        self.scaled_document_space.column(doc).collect()
    }

    #[inline]
    pub fn document_count(&self) -> usize {
        self.document_space.cols()
    }
}
