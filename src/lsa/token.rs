use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// 注釈付きトークン
/// 外部の NLP サービスが返す 1 トークン分の情報です
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedToken {
    /// surface form as it appeared in the text
    pub text: String,
    /// lemma (base form)
    pub lemma: String,
    /// part-of-speech tag, if the annotator produces one
    pub pos: Option<String>,
}

impl AnnotatedToken {
    pub fn new(text: impl Into<String>, lemma: impl Into<String>, pos: Option<String>) -> Self {
        Self {
            text: text.into(),
            lemma: lemma.into(),
            pos,
        }
    }

    /// token whose lemma is its own surface form
    pub fn plain(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            lemma: text.clone(),
            text,
            pos: None,
        }
    }
}

/// 1 文分のトークン列
pub type AnnotatedSentence = Vec<AnnotatedToken>;

/// NLP annotation service
/// 生テキストから文の列を返す。各文は lemma と品詞を持つトークンの列
///
/// 実装は副作用のない純関数として扱われます
pub trait Annotator {
    fn annotate(&self, text: &str) -> Result<Vec<AnnotatedSentence>>;
}

impl<A: Annotator + ?Sized> Annotator for &A {
    fn annotate(&self, text: &str) -> Result<Vec<AnnotatedSentence>> {
        (**self).annotate(text)
    }
}

impl<A: Annotator + ?Sized> Annotator for Box<A> {
    fn annotate(&self, text: &str) -> Result<Vec<AnnotatedSentence>> {
        (**self).annotate(text)
    }
}

/// DocumentSentence
/// 入力 1 行から得た正規化済み term の列
/// 0 term の文も有効な文書として保持します (列は全て 0)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSentence {
    terms: Vec<String>,
}

impl DocumentSentence {
    pub fn new(terms: Vec<String>) -> Self {
        Self { terms }
    }

    /// Build from raw terms that are already canonical
    pub fn from_terms<T: AsRef<str>>(terms: &[T]) -> Self {
        Self {
            terms: terms.iter().map(|t| t.as_ref().to_string()).collect(),
        }
    }

    #[inline]
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(|t| t.as_str())
    }
}

impl fmt::Display for DocumentSentence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.terms.join(" "))
    }
}

/// term と品詞タグのペア (HMM 用)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedTerm {
    pub term: String,
    pub tag: Option<String>,
}

impl fmt::Display for TaggedTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tag {
            Some(tag) => write!(f, "{}_{}", self.term, tag),
            None => f.write_str(&self.term),
        }
    }
}
