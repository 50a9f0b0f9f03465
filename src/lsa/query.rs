use serde::Serialize;

use crate::error::{LsaError, Result};
use crate::lsa::factorize::LatentFactors;
use crate::lsa::token::DocumentSentence;
use crate::lsa::vocabulary::Vocabulary;
use crate::utils::math::matrix::DenseMatrix;
use crate::utils::math::vector::add_assign;

/// QueryVector
/// k 次元潜在空間上のクエリ 1 行分
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryVector {
    values: Vec<f64>,
    /// vocabulary に見つかった term の数 (平均の分母)
    matched_terms: usize,
}

impl QueryVector {
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[inline]
    pub fn matched_terms(&self) -> usize {
        self.matched_terms
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.values.len()
    }
}

/// QueryProjector
/// 未知の文を潜在空間へ写します
///
/// クエリの各 term について U_k·S_k の対応する行を足し合わせ、
/// vocabulary に見つかった term 数で割った平均を返します
/// vocabulary に無い term は無視します (潜在空間に表現が無いため)
#[derive(Debug, Clone, Copy)]
pub struct QueryProjector<'a> {
    vocabulary: &'a Vocabulary,
    scaled_term_space: &'a DenseMatrix<f64>,
}

impl<'a> QueryProjector<'a> {
    pub fn new(vocabulary: &'a Vocabulary, factors: &'a LatentFactors) -> Self {
        Self {
            vocabulary,
            scaled_term_space: factors.scaled_term_space(),
        }
    }

    /// クエリを射影する
    ///
    /// 分母はクエリ長ではなく「見つかった term の数」
    /// 同じ term が 2 回出れば 2 回足して 2 と数える
    ///
    /// # Errors
    /// * `UndefinedProjection` - 1 つも見つからない
    pub fn project(&self, query: &DocumentSentence) -> Result<QueryVector> {
        let mut values = vec![0.0; self.scaled_term_space.cols()];
        let mut matched_terms = 0usize;
        for term in query.iter() {
            if let Some(idx) = self.vocabulary.index_of(term) {
                add_assign(&mut values, self.scaled_term_space.row(idx));
                matched_terms += 1;
            }
        }
        if matched_terms == 0 {
            return Err(LsaError::UndefinedProjection);
        }
        let inv = 1.0 / matched_terms as f64;
        for v in values.iter_mut() {
            *v *= inv;
        }
        Ok(QueryVector { values, matched_terms })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lsa::matrix::TermDocumentMatrix;

    fn setup() -> (TermDocumentMatrix, LatentFactors) {
        let docs = vec![
            DocumentSentence::from_terms(&["cat", "sat", "mat"]),
            DocumentSentence::from_terms(&["dog", "sat", "log"]),
        ];
        let tdm = TermDocumentMatrix::build(&docs).unwrap();
        let factors = LatentFactors::factorize(&tdm, 2).unwrap();
        (tdm, factors)
    }

    #[test]
    fn averages_over_matched_terms_only() {
        let (tdm, factors) = setup();
        let projector = QueryProjector::new(tdm.vocabulary(), &factors);
        let q = projector
            .project(&DocumentSentence::from_terms(&["cat", "unknown", "sat"]))
            .unwrap();
        assert_eq!(q.matched_terms(), 2);
        assert_eq!(q.dimension(), 2);

        let us = factors.scaled_term_space();
        let cat = tdm.vocabulary().index_of("cat").unwrap();
        let sat = tdm.vocabulary().index_of("sat").unwrap();
        for j in 0..2 {
            let expected = (us[(cat, j)] + us[(sat, j)]) / 2.0;
            assert!((q.values()[j] - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn out_of_vocabulary_query_is_undefined() {
        let (tdm, factors) = setup();
        let projector = QueryProjector::new(tdm.vocabulary(), &factors);
        let err = projector
            .project(&DocumentSentence::from_terms(&["xyz"]))
            .unwrap_err();
        assert!(matches!(err, LsaError::UndefinedProjection));
        assert!(matches!(
            projector.project(&DocumentSentence::default()),
            Err(LsaError::UndefinedProjection)
        ));
    }
}
