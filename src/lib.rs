/// This crate is a Document Similarity Engine using Latent Semantic Analysis.
pub mod config;
pub mod error;
pub mod hmm;
pub mod lsa;
pub mod utils;

/// Latent Semantic Analyzer
/// The top-level struct of this crate, running the whole pipeline for one corpus.
/// It turns normalized sentences into a term-document count matrix, factorizes it
/// with a truncated SVD and compares unseen query sentences against every
/// document in the k-dimensional latent space.
///
/// Internally, it holds:
/// - The normalized documents
/// - The sorted vocabulary and the term-document count matrix
/// - The truncated factors U_k, S_k, Vt_k and their scaled forms
///
/// The analyzer is read-only after `fit`; projection and ranking borrow it.
pub use lsa::LatentSemanticAnalyzer;

/// Error type and result alias
/// `InvalidRank`, `EmptyCorpus`, `UndefinedProjection` and `UndefinedSimilarity`
/// are the analysis conditions a caller handles and continues past.
pub use error::{LsaError, Result};

/// Stop Word Trie
/// Exact-match prefix tree holding the stop words, loaded once and read-only
/// while normalizing.
pub use utils::datastruct::trie::StopWordTrie;

/// Token and annotator types
/// - `Annotator`: the NLP service seam, text to sentences of lemma/tag tokens
/// - `AnnotatedToken`: one token from the service
/// - `DocumentSentence`: normalized terms of one input line
pub use lsa::token::{AnnotatedSentence, AnnotatedToken, Annotator, DocumentSentence, TaggedTerm};

/// Built-in annotators
pub use lsa::annotator::{CommandAnnotator, PlainAnnotator, TaggedAnnotator};

/// Token Normalizer
/// Lowercases lemmas, keeps ASCII letters only and drops stop words.
pub use lsa::normalizer::TokenNormalizer;

/// Term-document matrix and its vocabulary
pub use lsa::matrix::TermDocumentMatrix;
pub use lsa::vocabulary::Vocabulary;

/// Truncated latent factors
pub use lsa::factorize::LatentFactors;

/// Query projection into the latent space
pub use lsa::query::{QueryProjector, QueryVector};

/// Similarity Hits and Hit Entry structures
/// - `Hits`: per-document scores in document order, with sorting by score
/// - `HitEntry`: one document index and its cosine score, or `UndefinedSimilarity`
pub use lsa::scoring::{HitEntry, Hits, SimilarityRanker};

/// Porter stemmer and sorted stem counts
pub use lsa::stem::{PorterStemmer, StemFrequency, Stemmer};

/// Diagnostic report tables
pub use lsa::report::{LsaReport, ReportFormat, Table};

/// HMM transition / emission estimation over tagged sentences
pub use hmm::HiddenMarkovModel;

/// Configuration
pub use config::{AnnotatorKind, LsaConfig};
