use std::fmt::{self, Debug};

use serde::{Serialize, Serializer};

use crate::error::{LsaError, Result};
use crate::lsa::factorize::LatentFactors;
use crate::lsa::query::QueryVector;
use crate::utils::math::matrix::DenseMatrix;
use crate::utils::math::vector::cosine_similarity;

/// 1 文書分の結果
/// norm が 0 の場合 score は `UndefinedSimilarity`
#[derive(Debug)]
pub struct HitEntry {
    pub document: usize,
    pub score: Result<f64>,
}

impl HitEntry {
    /// Score if defined
    #[inline]
    pub fn value(&self) -> Option<f64> {
        self.score.as_ref().ok().copied()
    }
}

impl Serialize for HitEntry {
    /// undefined は `null` として出力します
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        (self.document, self.value()).serialize(serializer)
    }
}

/// Structure to store similarity results
/// 並びは元の文書順、並べ替えは呼び出し側の責務です
#[derive(Serialize)]
#[serde(transparent)]
pub struct Hits {
    pub list: Vec<HitEntry>,
}

impl Hits {
    pub fn new(list: Vec<HitEntry>) -> Self {
        Hits { list }
    }

    /// Sort results by descending score
    /// undefined は取り除き、同点は文書順のまま (stable)
    pub fn sort_by_score(&mut self) -> &mut Self {
        self.list.retain(|e| e.score.is_ok());
        self.list.sort_by(|a, b| {
            let (a, b) = (a.value().unwrap_or(f64::NEG_INFINITY), b.value().unwrap_or(f64::NEG_INFINITY));
            b.total_cmp(&a)
        });
        self
    }

    /// Sort results by ascending score
    /// 同点は文書順のまま
    pub fn sort_by_score_rev(&mut self) -> &mut Self {
        self.list.retain(|e| e.score.is_ok());
        self.list.sort_by(|a, b| {
            let (a, b) = (a.value().unwrap_or(f64::INFINITY), b.value().unwrap_or(f64::INFINITY));
            a.total_cmp(&b)
        });
        self
    }

    /// Best scoring document, if any score is defined
    pub fn best(&self) -> Option<(usize, f64)> {
        self.list
            .iter()
            .filter_map(|e| e.value().map(|s| (e.document, s)))
            .fold(None, |best: Option<(usize, f64)>, cur| match best {
                Some(b) if b.1 >= cur.1 => Some(b),
                _ => Some(cur),
            })
    }

    /// `(document, score)` for defined entries only
    pub fn scores(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.list.iter().filter_map(|e| e.value().map(|s| (e.document, s)))
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}

impl Debug for Hits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            writeln!(f, "Hits [")?;
            for entry in &self.list {
                match entry.value() {
                    Some(s) => writeln!(f, "    S{}: {:.6}", entry.document + 1, s)?,
                    None => writeln!(f, "    S{}: undefined", entry.document + 1)?,
                }
            }
            write!(f, "]")
        } else {
            f.debug_list().entries(&self.list).finish()
        }
    }
}

/// SimilarityRanker
/// 射影済みクエリと各文書 (S_k·Vt_k の列) のコサイン類似度を計算します
#[derive(Debug, Clone, Copy)]
pub struct SimilarityRanker<'a> {
    scaled_document_space: &'a DenseMatrix<f64>,
}

impl<'a> SimilarityRanker<'a> {
    pub fn new(factors: &'a LatentFactors) -> Self {
        Self {
            scaled_document_space: factors.scaled_document_space(),
        }
    }

    #[inline]
    pub fn document_count(&self) -> usize {
        self.scaled_document_space.cols()
    }

    /// 1 文書分のコサイン類似度
    ///
    /// # Errors
    /// * `UndefinedSimilarity` - 文書かクエリの norm が 0
    pub fn similarity(&self, query: &QueryVector, document: usize) -> Result<f64> {
        debug_assert_eq!(query.dimension(), self.scaled_document_space.rows());
        let doc_vec: Vec<f64> = self.scaled_document_space.column(document).collect();
        cosine_similarity(&doc_vec, query.values()).ok_or(LsaError::UndefinedSimilarity { document })
    }

    /// 全文書のスコアを文書順で返す
    pub fn rank(&self, query: &QueryVector) -> Hits {
        let list = (0..self.document_count())
            .map(|document| HitEntry {
                document,
                score: self.similarity(query, document),
            })
            .collect();
        Hits::new(list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(document: usize, score: Option<f64>) -> HitEntry {
        HitEntry {
            document,
            score: score.ok_or(LsaError::UndefinedSimilarity { document }),
        }
    }

    #[test]
    fn sort_drops_undefined_and_is_stable() {
        let mut hits = Hits::new(vec![
            hit(0, Some(0.2)),
            hit(1, None),
            hit(2, Some(0.9)),
            hit(3, Some(0.2)),
        ]);
        hits.sort_by_score();
        let order: Vec<usize> = hits.list.iter().map(|e| e.document).collect();
        assert_eq!(order, vec![2, 0, 3]);
    }

    #[test]
    fn sort_rev_is_ascending_and_stable() {
        let mut hits = Hits::new(vec![
            hit(0, Some(0.2)),
            hit(1, Some(0.9)),
            hit(2, None),
            hit(3, Some(0.2)),
            hit(4, Some(-0.1)),
        ]);
        hits.sort_by_score_rev();
        let order: Vec<usize> = hits.list.iter().map(|e| e.document).collect();
        assert_eq!(order, vec![4, 0, 3, 1]);
    }

    #[test]
    fn best_skips_undefined() {
        let hits = Hits::new(vec![hit(0, None), hit(1, Some(-0.5)), hit(2, Some(0.1))]);
        assert_eq!(hits.best(), Some((2, 0.1)));
        assert_eq!(hits.scores().count(), 2);
        let none = Hits::new(vec![hit(0, None)]);
        assert_eq!(none.best(), None);
    }

    #[test]
    fn serializes_undefined_as_null() {
        let hits = Hits::new(vec![hit(0, Some(1.0)), hit(1, None)]);
        let json = serde_json::to_string(&hits).unwrap();
        assert_eq!(json, "[[0,1.0],[1,null]]");
    }
}
