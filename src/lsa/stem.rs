//! Stemming and stem frequency counting.
//!
//! 正規化済み term (ASCII 小文字) に Porter 法をかけて語幹ごとに数える

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// term -> 語幹
pub trait Stemmer {
    fn stem(&self, word: &str) -> String;
}

/// Porter stemmer (M. F. Porter, 1980)
///
/// ASCII 小文字以外を含む語と 2 文字以下の語はそのまま返す
#[derive(Debug, Clone, Copy, Default)]
pub struct PorterStemmer;

const STEP2: &[(&str, &str)] = &[
    ("ational", "ate"),
    ("tional", "tion"),
    ("enci", "ence"),
    ("anci", "ance"),
    ("izer", "ize"),
    ("abli", "able"),
    ("alli", "al"),
    ("entli", "ent"),
    ("eli", "e"),
    ("ousli", "ous"),
    ("ization", "ize"),
    ("ation", "ate"),
    ("ator", "ate"),
    ("alism", "al"),
    ("iveness", "ive"),
    ("fulness", "ful"),
    ("ousness", "ous"),
    ("aliti", "al"),
    ("iviti", "ive"),
    ("biliti", "ble"),
];

const STEP3: &[(&str, &str)] = &[
    ("icate", "ic"),
    ("ative", ""),
    ("alize", "al"),
    ("iciti", "ic"),
    ("ical", "ic"),
    ("ful", ""),
    ("ness", ""),
];

// 重なる接尾辞は長い方を先に置く
const STEP4: &[&str] = &[
    "al", "ance", "ence", "er", "ic", "able", "ible", "ant", "ement", "ment", "ent", "ion", "ou", "ism", "ate",
    "iti", "ous", "ive", "ize",
];

impl Stemmer for PorterStemmer {
    fn stem(&self, word: &str) -> String {
        if word.len() <= 2 || !word.bytes().all(|b| b.is_ascii_lowercase()) {
            return word.to_string();
        }
        let mut w = word.as_bytes().to_vec();
        step1a(&mut w);
        step1b(&mut w);
        step1c(&mut w);
        replace_first(&mut w, STEP2, |stem| measure(stem) > 0);
        replace_first(&mut w, STEP3, |stem| measure(stem) > 0);
        step4(&mut w);
        step5(&mut w);
        // ASCII のバイト列しか扱っていない
        w.into_iter().map(char::from).collect()
    }
}

/// y は先頭か母音の直後なら子音
fn is_consonant(w: &[u8], i: usize) -> bool {
    match w[i] {
        b'a' | b'e' | b'i' | b'o' | b'u' => false,
        b'y' => i == 0 || !is_consonant(w, i - 1),
        _ => true,
    }
}

/// [C](VC){m}[V] の m
fn measure(w: &[u8]) -> usize {
    (1..w.len())
        .filter(|&i| is_consonant(w, i) && !is_consonant(w, i - 1))
        .count()
}

fn has_vowel(w: &[u8]) -> bool {
    (0..w.len()).any(|i| !is_consonant(w, i))
}

fn ends_double_consonant(w: &[u8]) -> bool {
    let n = w.len();
    n >= 2 && w[n - 1] == w[n - 2] && is_consonant(w, n - 1)
}

/// 子音-母音-子音 で終わり、最後が w / x / y でない
fn ends_cvc(w: &[u8]) -> bool {
    let n = w.len();
    n >= 3
        && is_consonant(w, n - 3)
        && !is_consonant(w, n - 2)
        && is_consonant(w, n - 1)
        && !matches!(w[n - 1], b'w' | b'x' | b'y')
}

/// 語幹部分 (suffix を除いた残り)
fn stem_before<'a>(w: &'a [u8], suffix: &str) -> Option<&'a [u8]> {
    w.strip_suffix(suffix.as_bytes())
}

/// 最初に一致した規則だけを見る。条件を満たさなければ何もしない
fn replace_first<F>(w: &mut Vec<u8>, rules: &[(&str, &str)], condition: F)
where
    F: Fn(&[u8]) -> bool,
{
    for &(suffix, replacement) in rules {
        if let Some(stem) = stem_before(w, suffix) {
            if condition(stem) {
                let keep = stem.len();
                w.truncate(keep);
                w.extend_from_slice(replacement.as_bytes());
            }
            return;
        }
    }
}

fn step1a(w: &mut Vec<u8>) {
    if w.ends_with(b"sses") || w.ends_with(b"ies") {
        w.truncate(w.len() - 2);
    } else if !w.ends_with(b"ss") && w.ends_with(b"s") {
        w.pop();
    }
}

fn step1b(w: &mut Vec<u8>) {
    if let Some(stem) = stem_before(w, "eed") {
        if measure(stem) > 0 {
            w.pop();
        }
        return;
    }
    let word: &[u8] = w;
    let removed = ["ed", "ing"]
        .into_iter()
        .find(|suffix| stem_before(word, suffix).is_some_and(has_vowel));
    let Some(suffix) = removed else {
        return;
    };
    w.truncate(w.len() - suffix.len());

    if w.ends_with(b"at") || w.ends_with(b"bl") || w.ends_with(b"iz") {
        w.push(b'e');
    } else if ends_double_consonant(w) && !matches!(w.last(), Some(b'l' | b's' | b'z')) {
        w.pop();
    } else if measure(w) == 1 && ends_cvc(w) {
        w.push(b'e');
    }
}

fn step1c(w: &mut [u8]) {
    let n = w.len();
    if w[n - 1] == b'y' && has_vowel(&w[..n - 1]) {
        w[n - 1] = b'i';
    }
}

fn step4(w: &mut Vec<u8>) {
    let Some(suffix) = STEP4.iter().find(|s| w.ends_with(s.as_bytes())) else {
        return;
    };
    let keep = w.len() - suffix.len();
    let stem = &w[..keep];
    let ion_ok = *suffix != "ion" || matches!(stem.last(), Some(b's' | b't'));
    if ion_ok && measure(stem) > 1 {
        w.truncate(keep);
    }
}

fn step5(w: &mut Vec<u8>) {
    if let Some(stem) = stem_before(w, "e") {
        let m = measure(stem);
        if m > 1 || (m == 1 && !ends_cvc(stem)) {
            w.pop();
        }
    }
    if measure(w) > 1 && ends_double_consonant(w) && w.ends_with(b"l") {
        w.pop();
    }
}

/// StemFrequency
/// 語幹 -> 出現回数、語幹の辞書順
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StemFrequency {
    counts: BTreeMap<String, usize>,
}

impl StemFrequency {
    /// term 列を語幹にして数える
    pub fn count<'a, S, I>(stemmer: &S, terms: I) -> Self
    where
        S: Stemmer + ?Sized,
        I: IntoIterator<Item = &'a str>,
    {
        let mut counts = BTreeMap::new();
        for term in terms {
            *counts.entry(stemmer.stem(term)).or_insert(0) += 1;
        }
        Self { counts }
    }

    /// Number of distinct stems
    #[inline]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    #[inline]
    pub fn get(&self, stem: &str) -> Option<usize> {
        self.counts.get(stem).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(s, &c)| (s.as_str(), c))
    }
}

impl fmt::Display for StemFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (stem, count) in self.iter() {
            writeln!(f, "{} -> {}", stem, count)?;
        }
        writeln!(f, "Found {} stem words", self.len())
    }
}
