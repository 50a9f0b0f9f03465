use crate::error::Result;
use crate::lsa::token::{AnnotatedToken, Annotator, DocumentSentence, TaggedTerm};
use crate::utils::datastruct::trie::StopWordTrie;

/// TokenNormalizer
/// annotator のトークン列を canonical な term 列に変換します
///
/// 1. lemma を小文字化
/// 2. ASCII 英字以外を全て除去
/// 3. 空になったら捨てる
/// 4. stop word なら捨てる
///
/// 残った term の順序は元の文の順序のままです
#[derive(Debug, Clone, Copy)]
pub struct TokenNormalizer<'a> {
    stop_words: &'a StopWordTrie,
}

impl<'a> TokenNormalizer<'a> {
    pub fn new(stop_words: &'a StopWordTrie) -> Self {
        Self { stop_words }
    }

    /// 1 つの lemma を正規化する
    ///
    /// # Returns
    /// * `Option<String>` - 残る term、捨てる場合は `None`
    #[inline]
    pub fn normalize_lemma(&self, lemma: &str) -> Option<String> {
        let term: String = lemma
            .chars()
            .flat_map(char::to_lowercase)
            .filter(char::is_ascii_lowercase)
            .collect();
        if term.is_empty() || self.stop_words.contains(&term) {
            return None;
        }
        Some(term)
    }

    /// 1 文分のトークンを正規化する
    /// 全部捨てられても空の文書として返す
    pub fn normalize_sentence<'t, I>(&self, tokens: I) -> DocumentSentence
    where
        I: IntoIterator<Item = &'t AnnotatedToken>,
    {
        DocumentSentence::new(
            tokens
                .into_iter()
                .filter_map(|tok| self.normalize_lemma(&tok.lemma))
                .collect(),
        )
    }

    /// 品詞タグ付きで正規化する (HMM 用)
    pub fn normalize_tagged<'t, I>(&self, tokens: I) -> Vec<TaggedTerm>
    where
        I: IntoIterator<Item = &'t AnnotatedToken>,
    {
        tokens
            .into_iter()
            .filter_map(|tok| {
                self.normalize_lemma(&tok.lemma).map(|term| TaggedTerm {
                    term,
                    tag: tok.pos.clone(),
                })
            })
            .collect()
    }

    /// 入力 1 行を annotate して 1 つの文書にする
    /// annotator が複数文に分けても 1 行 = 1 文書として連結します
    pub fn normalize_text<A: Annotator + ?Sized>(&self, annotator: &A, text: &str) -> Result<DocumentSentence> {
        let sentences = annotator.annotate(text)?;
        Ok(self.normalize_sentence(sentences.iter().flatten()))
    }

    /// `normalize_text` の品詞タグ付き版
    pub fn normalize_text_tagged<A: Annotator + ?Sized>(&self, annotator: &A, text: &str) -> Result<Vec<TaggedTerm>> {
        let sentences = annotator.annotate(text)?;
        Ok(self.normalize_tagged(sentences.iter().flatten()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lsa::annotator::{PlainAnnotator, TaggedAnnotator};

    fn tokens(lemmas: &[&str]) -> Vec<AnnotatedToken> {
        lemmas.iter().map(|l| AnnotatedToken::plain(*l)).collect()
    }

    #[test]
    fn lowercases_and_strips_non_letters() {
        let trie = StopWordTrie::new();
        let n = TokenNormalizer::new(&trie);
        assert_eq!(n.normalize_lemma("Don't"), Some("dont".to_string()));
        assert_eq!(n.normalize_lemma("e-mail42"), Some("email".to_string()));
        assert_eq!(n.normalize_lemma("café"), Some("caf".to_string()));
        assert_eq!(n.normalize_lemma("123"), None);
        assert_eq!(n.normalize_lemma(""), None);
    }

    #[test]
    fn filters_stop_words_after_normalizing() {
        let trie = StopWordTrie::from_words(["the", "a"]);
        let n = TokenNormalizer::new(&trie);
        let doc = n.normalize_sentence(&tokens(&["The", "cat", "sat", "on", "A", "mat."]));
        assert_eq!(doc.terms(), ["cat", "sat", "on", "mat"]);
    }

    #[test]
    fn all_filtered_sentence_is_kept_empty() {
        let trie = StopWordTrie::from_words(["the"]);
        let n = TokenNormalizer::new(&trie);
        let doc = n.normalize_sentence(&tokens(&["THE", "!!", "42"]));
        assert!(doc.is_empty());
    }

    #[test]
    fn text_with_several_sentences_becomes_one_document() {
        let trie = StopWordTrie::new();
        let n = TokenNormalizer::new(&trie);
        let doc = n.normalize_text(&PlainAnnotator, "Cat sat. Dog ran.").unwrap();
        assert_eq!(doc.to_string(), "cat sat dog ran");
    }

    #[test]
    fn tagged_normalization_keeps_tags_and_order() {
        let trie = StopWordTrie::from_words(["the"]);
        let n = TokenNormalizer::new(&trie);
        let tagged = n
            .normalize_text_tagged(&TaggedAnnotator, "The_DT Dog_NN barks_VBZ ._.")
            .unwrap();
        let rendered: Vec<String> = tagged.iter().map(|t| t.to_string()).collect();
        assert_eq!(rendered, vec!["dog_NN", "barks_VBZ"]);
    }
}
