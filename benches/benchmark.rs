use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use lsa_similarity::{DocumentSentence, LatentSemanticAnalyzer, PlainAnnotator, StopWordTrie, TokenNormalizer};

const WORDS: &[&str] = &[
    "the", "cat", "sat", "on", "a", "mat", "dog", "ran", "after", "ball", "bird", "flew", "over", "tree", "fish",
    "swam", "in", "river", "sun", "rose", "above", "hill", "child", "read", "book", "under", "lamp",
];

// 疑似乱数で決定的なコーパスを作る (外部データ無し)
fn synthetic_corpus(docs: usize, words_per_doc: usize) -> Vec<String> {
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    (0..docs)
        .map(|_| {
            (0..words_per_doc)
                .map(|_| {
                    state ^= state << 13;
                    state ^= state >> 7;
                    state ^= state << 17;
                    WORDS[(state % WORDS.len() as u64) as usize]
                })
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

fn normalize(lines: &[String], stop_words: &StopWordTrie) -> Vec<DocumentSentence> {
    let normalizer = TokenNormalizer::new(stop_words);
    lines
        .iter()
        .map(|l| normalizer.normalize_text(&PlainAnnotator, l).unwrap())
        .collect()
}

fn bench_fit(c: &mut Criterion) {
    let stop_words = StopWordTrie::from_words(["the", "a", "on", "in", "over", "under", "after", "above"]);
    let mut group = c.benchmark_group("fit");
    for docs in [10usize, 40, 120] {
        let corpus = normalize(&synthetic_corpus(docs, 12), &stop_words);
        group.bench_with_input(BenchmarkId::from_parameter(docs), &corpus, |b, corpus| {
            b.iter(|| LatentSemanticAnalyzer::fit(black_box(corpus.clone()), 2).unwrap())
        });
    }
    group.finish();
}

fn bench_similarity(c: &mut Criterion) {
    let stop_words = StopWordTrie::from_words(["the", "a", "on", "in"]);
    let corpus = normalize(&synthetic_corpus(120, 12), &stop_words);
    let analyzer = LatentSemanticAnalyzer::fit(corpus, 5).unwrap();
    let query = normalize(&["cat sat under tree".to_string()], &stop_words).remove(0);

    c.bench_function("similarity", |b| {
        b.iter(|| {
            let mut hits = analyzer.similarity(black_box(&query)).unwrap();
            hits.sort_by_score();
            hits.best()
        })
    });
}

fn bench_normalize(c: &mut Criterion) {
    let stop_words = StopWordTrie::from_words(WORDS.iter().step_by(3));
    let lines = synthetic_corpus(200, 20);
    c.bench_function("normalize", |b| b.iter(|| normalize(black_box(&lines), &stop_words)));
}

criterion_group!(benches, bench_fit, bench_similarity, bench_normalize);
criterion_main!(benches);
