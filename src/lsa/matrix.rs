use serde::Serialize;
use tracing::debug;

use crate::error::{LsaError, Result};
use crate::lsa::token::DocumentSentence;
use crate::lsa::vocabulary::Vocabulary;
use crate::utils::math::matrix::DenseMatrix;

/// TermDocumentMatrix
/// 行 = term index、列 = 文書 index の出現回数行列
/// TF-IDF などの重み付けはせず生カウントのみ
#[derive(Debug, Clone, Serialize)]
pub struct TermDocumentMatrix {
    counts: DenseMatrix<u32>,
    vocabulary: Vocabulary,
}

impl TermDocumentMatrix {
    /// コーパスから行列を作る
    ///
    /// term は辞書順で index を振り、(文書, term) の出現ごとにセルを 1 増やす
    ///
    /// # Errors
    /// * `EmptyCorpus` - 文書が 0 件、またはフィルタ後の term が 0 個
    pub fn build(documents: &[DocumentSentence]) -> Result<Self> {
        if documents.is_empty() {
            return Err(LsaError::EmptyCorpus);
        }
        let vocabulary = Vocabulary::from_terms(documents.iter().flat_map(|d| d.iter()));
        if vocabulary.is_empty() {
            return Err(LsaError::EmptyCorpus);
        }

        let mut counts = DenseMatrix::zeros(vocabulary.len(), documents.len());
        for (doc_idx, doc) in documents.iter().enumerate() {
            for term in doc.iter() {
                // vocabulary は同じ documents から作っているので必ず見つかる
                if let Some(term_idx) = vocabulary.index_of(term) {
                    counts[(term_idx, doc_idx)] += 1;
                }
            }
        }
        debug!(terms = vocabulary.len(), documents = documents.len(), "built term-document matrix");

        Ok(Self { counts, vocabulary })
    }

    #[inline]
    pub fn term_count(&self) -> usize {
        self.counts.rows()
    }

    #[inline]
    pub fn document_count(&self) -> usize {
        self.counts.cols()
    }

    /// Count of `term` in document `doc`
    pub fn count(&self, term: &str, doc: usize) -> Option<u32> {
        self.vocabulary
            .index_of(term)
            .and_then(|t| self.counts.get(t, doc))
    }

    #[inline]
    pub fn counts(&self) -> &DenseMatrix<u32> {
        &self.counts
    }

    #[inline]
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// 分解用に f64 へ変換
    pub fn to_f64(&self) -> DenseMatrix<f64> {
        self.counts.map(f64::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus(lines: &[&[&str]]) -> Vec<DocumentSentence> {
        lines.iter().map(|l| DocumentSentence::from_terms(*l)).collect()
    }

    #[test]
    fn builds_counts_in_sorted_term_order() {
        let docs = corpus(&[&["cat", "sat", "mat"], &["dog", "sat", "log"]]);
        let tdm = TermDocumentMatrix::build(&docs).unwrap();
        assert_eq!(
            tdm.vocabulary().iter().collect::<Vec<_>>(),
            vec!["cat", "dog", "log", "mat", "sat"]
        );
        assert_eq!(
            tdm.counts().to_rows(),
            vec![vec![1, 0], vec![0, 1], vec![0, 1], vec![1, 0], vec![1, 1]]
        );
    }

    #[test]
    fn repeated_terms_accumulate() {
        let docs = corpus(&[&["run", "run", "fast"]]);
        let tdm = TermDocumentMatrix::build(&docs).unwrap();
        assert_eq!(tdm.count("run", 0), Some(2));
        assert_eq!(tdm.count("fast", 0), Some(1));
        assert_eq!(tdm.count("slow", 0), None);
    }

    #[test]
    fn empty_document_gives_zero_column() {
        let docs = corpus(&[&["cat"], &[], &["dog"]]);
        let tdm = TermDocumentMatrix::build(&docs).unwrap();
        assert_eq!(tdm.document_count(), 3);
        assert!(tdm.counts().column(1).all(|c| c == 0));
    }

    #[test]
    fn empty_corpus_is_rejected() {
        assert!(matches!(TermDocumentMatrix::build(&[]), Err(LsaError::EmptyCorpus)));
        let docs = corpus(&[&[], &[]]);
        assert!(matches!(TermDocumentMatrix::build(&docs), Err(LsaError::EmptyCorpus)));
    }

    #[test]
    fn build_is_deterministic() {
        let docs = corpus(&[&["zeta", "alpha"], &["mid", "alpha"]]);
        let a = TermDocumentMatrix::build(&docs).unwrap();
        let b = TermDocumentMatrix::build(&docs).unwrap();
        assert_eq!(a.vocabulary(), b.vocabulary());
        assert_eq!(a.counts(), b.counts());
    }
}
