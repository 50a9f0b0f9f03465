pub mod annotator;
pub mod factorize;
pub mod matrix;
pub mod normalizer;
pub mod query;
pub mod report;
pub mod scoring;
pub mod stem;
pub mod token;
pub mod vocabulary;

use std::time::Instant;

use tracing::info;

use crate::error::Result;
use crate::lsa::{
    factorize::LatentFactors,
    matrix::TermDocumentMatrix,
    query::{QueryProjector, QueryVector},
    scoring::{Hits, SimilarityRanker},
    token::DocumentSentence,
    vocabulary::Vocabulary,
};

/// LatentSemanticAnalyzer
/// コーパス 1 回分の LSA の状態をまとめて持ちます
///
/// - 正規化済み文書
/// - term-document 行列 (vocabulary を含む)
/// - rank k で打ち切った潜在因子
///
/// 構築後は読み取り専用で、クエリごとに `project` / `rank_documents` を呼びます
#[derive(Debug, Clone)]
pub struct LatentSemanticAnalyzer {
    documents: Vec<DocumentSentence>,
    matrix: TermDocumentMatrix,
    factors: LatentFactors,
}

impl LatentSemanticAnalyzer {
    /// 行列を作り、SVD して rank `k` で打ち切る
    ///
    /// # Errors
    /// * `EmptyCorpus` - 文書が無い、または term が 1 つも残らない (分解前に判定)
    /// * `InvalidRank` - k が 1..=min(terms, documents) の外
    pub fn fit(documents: Vec<DocumentSentence>, k: usize) -> Result<Self> {
        let start = Instant::now();
        let matrix = TermDocumentMatrix::build(&documents)?;
        info!(
            terms = matrix.term_count(),
            documents = matrix.document_count(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "constructed term-document matrix"
        );

        let start = Instant::now();
        let factors = LatentFactors::factorize(&matrix, k)?;
        info!(
            rank = factors.rank(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "decomposed term-document matrix"
        );

        Ok(Self {
            documents,
            matrix,
            factors,
        })
    }

    #[inline]
    pub fn documents(&self) -> &[DocumentSentence] {
        &self.documents
    }

    #[inline]
    pub fn matrix(&self) -> &TermDocumentMatrix {
        &self.matrix
    }

    #[inline]
    pub fn vocabulary(&self) -> &Vocabulary {
        self.matrix.vocabulary()
    }

    #[inline]
    pub fn factors(&self) -> &LatentFactors {
        &self.factors
    }

    pub fn projector(&self) -> QueryProjector<'_> {
        QueryProjector::new(self.matrix.vocabulary(), &self.factors)
    }

    pub fn ranker(&self) -> SimilarityRanker<'_> {
        SimilarityRanker::new(&self.factors)
    }

    /// クエリ文を潜在空間へ射影する
    pub fn project(&self, query: &DocumentSentence) -> Result<QueryVector> {
        self.projector().project(query)
    }

    /// 射影済みクエリで全文書をスコアリングする (文書順)
    pub fn rank_documents(&self, query: &QueryVector) -> Hits {
        self.ranker().rank(query)
    }

    /// 射影してそのまま全文書をスコアリングする
    pub fn similarity(&self, query: &DocumentSentence) -> Result<Hits> {
        let q = self.project(query)?;
        Ok(self.rank_documents(&q))
    }
}
