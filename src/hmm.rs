//! HMM transition / emission estimation from tagged sentences.
//!
//! 頻度を数えて行ごとに正規化するだけで、分解は無し

use std::fmt;

use serde::Serialize;
use tracing::info;

use crate::lsa::report::Table;
use crate::lsa::token::TaggedTerm;
use crate::lsa::vocabulary::Vocabulary;
use crate::utils::math::matrix::DenseMatrix;

/// タグが無いトークンをまとめるタグ
pub const UNKNOWN_TAG: &str = "UNK";

/// HiddenMarkovModel
///
/// - `transition` (A): tag x tag、隣接タグ対の頻度を行和で割ったもの
/// - `emission` (B): word x tag、単語ごとのタグ分布
/// - `initial` (Pi): 文頭タグの頻度 / トークンを持つ文の数
///
/// 行和が 0 の行は 0 のまま (NaN にはしない)
#[derive(Debug, Clone, Serialize)]
pub struct HiddenMarkovModel {
    tags: Vocabulary,
    words: Vocabulary,
    transition: DenseMatrix<f64>,
    emission: DenseMatrix<f64>,
    initial: Vec<f64>,
}

/// 系列確率とその因子 (Pi, A, A, ...)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SequenceProbability {
    pub factors: Vec<f64>,
    pub probability: f64,
}

impl fmt::Display for SequenceProbability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.factors.iter().enumerate() {
            if i > 0 {
                f.write_str(" * ")?;
            }
            write!(f, "{:.2}", v)?;
        }
        write!(f, " = {}", self.probability)
    }
}

fn tag_of(term: &TaggedTerm) -> &str {
    term.tag.as_deref().unwrap_or(UNKNOWN_TAG)
}

impl HiddenMarkovModel {
    /// タグ付き文の列から推定する
    pub fn estimate(sentences: &[Vec<TaggedTerm>]) -> Self {
        let tags = Vocabulary::from_terms(sentences.iter().flatten().map(tag_of));
        let words = Vocabulary::from_terms(sentences.iter().flatten().map(|t| t.term.as_str()));
        let tag_count = tags.len();

        let mut transition = DenseMatrix::zeros(tag_count, tag_count);
        let mut emission = DenseMatrix::zeros(words.len(), tag_count);
        let mut initial = vec![0.0; tag_count];
        let mut started = 0usize;

        for sentence in sentences {
            // vocabulary は同じ sentences から作っているので index は必ずある
            let tag_idx: Vec<usize> = sentence
                .iter()
                .filter_map(|t| tags.index_of(tag_of(t)))
                .collect();
            for pair in tag_idx.windows(2) {
                transition[(pair[0], pair[1])] += 1.0;
            }
            for (term, &t) in sentence.iter().zip(&tag_idx) {
                if let Some(w) = words.index_of(&term.term) {
                    emission[(w, t)] += 1.0;
                }
            }
            if let Some(&first) = tag_idx.first() {
                initial[first] += 1.0;
                started += 1;
            }
        }

        normalize_rows(&mut transition);
        normalize_rows(&mut emission);
        if started > 0 {
            for p in initial.iter_mut() {
                *p /= started as f64;
            }
        }
        info!(tags = tag_count, words = words.len(), sentences = started, "estimated hmm matrices");

        Self {
            tags,
            words,
            transition,
            emission,
            initial,
        }
    }

    #[inline]
    pub fn tags(&self) -> &Vocabulary {
        &self.tags
    }

    #[inline]
    pub fn words(&self) -> &Vocabulary {
        &self.words
    }

    /// A
    #[inline]
    pub fn transition(&self) -> &DenseMatrix<f64> {
        &self.transition
    }

    /// B
    #[inline]
    pub fn emission(&self) -> &DenseMatrix<f64> {
        &self.emission
    }

    /// Pi
    #[inline]
    pub fn initial(&self) -> &[f64] {
        &self.initial
    }

    /// P(from -> to)
    pub fn transition_probability(&self, from: &str, to: &str) -> f64 {
        match (self.tags.index_of(from), self.tags.index_of(to)) {
            (Some(a), Some(b)) => self.transition[(a, b)],
            _ => 0.0,
        }
    }

    /// タグ列の確率 Pi[t0] * Π A[t_i][t_i+1]
    /// 未知のタグは確率 0、空の列も 0
    pub fn sequence_probability<T: AsRef<str>>(&self, tags: &[T]) -> SequenceProbability {
        let Some(first) = tags.first() else {
            return SequenceProbability {
                factors: Vec::new(),
                probability: 0.0,
            };
        };
        let pi = self
            .tags
            .index_of(first.as_ref())
            .map(|i| self.initial[i])
            .unwrap_or(0.0);
        let mut factors = vec![pi];
        let mut probability = pi;
        for pair in tags.windows(2) {
            let a = self.transition_probability(pair[0].as_ref(), pair[1].as_ref());
            factors.push(a);
            probability *= a;
        }
        SequenceProbability { factors, probability }
    }

    /// タグ付き文の確率
    /// 文のタグ列 (タグ無しは `UNK`) で `sequence_probability` を計算する
    pub fn sentence_probability(&self, sentence: &[TaggedTerm]) -> SequenceProbability {
        let tags: Vec<&str> = sentence.iter().map(tag_of).collect();
        self.sequence_probability(&tags)
    }

    /// A / B / Pi をレポート用の表にする
    pub fn tables(&self) -> [Table; 3] {
        let tag_labels: Vec<String> = self.tags.iter().map(str::to_string).collect();
        let word_labels: Vec<String> = self.words.iter().map(str::to_string).collect();
        let pi = DenseMatrix::from_rows(&[self.initial.clone()]);
        [
            Table::new("A", tag_labels.clone(), tag_labels.clone(), &self.transition),
            Table::new("B", tag_labels.clone(), word_labels, &self.emission),
            Table::new("Pi", tag_labels, vec![String::new()], &pi),
        ]
    }
}

/// 各行を行和で割る (行和 0 はそのまま)
fn normalize_rows(m: &mut DenseMatrix<f64>) {
    for r in 0..m.rows() {
        let row = m.row_mut(r);
        let sum: f64 = row.iter().sum();
        if sum > 0.0 {
            for v in row.iter_mut() {
                *v /= sum;
            }
        }
    }
}

impl fmt::Display for HiddenMarkovModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for table in self.tables() {
            write!(f, "{}", table)?;
        }
        Ok(())
    }
}
