use std::collections::BTreeSet;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Vocabulary
/// term <-> index の双方向対応です
///
/// 全 term を辞書順に並べた位置がそのまま index になるので、
/// 同じコーパスからは常に同じ index が得られます
/// `IndexSet` なので term -> index は O(1)、index -> term も O(1)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    terms: IndexSet<String>,
}

impl Vocabulary {
    /// 全 term の集合から作る
    /// 重複は 1 つにまとめ、辞書順で index を振る
    pub fn from_terms<'a, I>(terms: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let sorted: BTreeSet<&str> = terms.into_iter().collect();
        Self {
            terms: sorted.into_iter().map(str::to_string).collect(),
        }
    }

    /// Number of distinct terms
    #[inline]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// term -> index
    #[inline]
    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.terms.get_index_of(term)
    }

    /// index -> term
    #[inline]
    pub fn term(&self, index: usize) -> Option<&str> {
        self.terms.get_index(index).map(|t| t.as_str())
    }

    #[inline]
    pub fn contains(&self, term: &str) -> bool {
        self.terms.contains(term)
    }

    /// Terms in index order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(|t| t.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_follow_sorted_order() {
        let vocab = Vocabulary::from_terms(["sat", "cat", "mat", "cat", "dog"]);
        assert_eq!(vocab.len(), 4);
        assert_eq!(vocab.iter().collect::<Vec<_>>(), vec!["cat", "dog", "mat", "sat"]);
        assert_eq!(vocab.index_of("mat"), Some(2));
        assert_eq!(vocab.term(3), Some("sat"));
        assert_eq!(vocab.index_of("log"), None);
        assert_eq!(vocab.term(4), None);
    }

    #[test]
    fn bijection_onto_index_range() {
        let vocab = Vocabulary::from_terms(["b", "a", "c", "a"]);
        for i in 0..vocab.len() {
            let term = vocab.term(i).unwrap();
            assert_eq!(vocab.index_of(term), Some(i));
        }
    }
}
