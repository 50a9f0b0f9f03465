use std::collections::BTreeMap;
use std::fmt;
use std::io::BufRead;

/// StopWordTrie
/// 完全一致のみを判定する prefix tree です
/// 単語の追加と存在確認のみを提供し、削除はありません
///
/// 大文字小文字の正規化は呼び出し側の責務です
///
/// # Examples
/// ```
/// use lsa_similarity::StopWordTrie;
/// let mut trie = StopWordTrie::new();
/// trie.add("the");
/// assert!(trie.contains("the"));
/// assert!(!trie.contains("th"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct StopWordTrie {
    root: TrieNode,
    len: usize,
}

#[derive(Debug, Clone, Default)]
struct TrieNode {
    /// root からこのノードまでの経路が登録済みの単語かどうか
    terminal: bool,
    /// BTreeMap なので走査順は常に辞書順
    children: BTreeMap<char, TrieNode>,
}

impl StopWordTrie {
    /// Create an empty trie
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a trie from a word list
    pub fn from_words<I, T>(words: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut trie = Self::new();
        trie.extend(words);
        trie
    }

    /// Read one word per line
    /// lines are trimmed and lowercased, blank lines are skipped
    ///
    /// # Arguments
    /// * `reader` - stop word source
    pub fn load<R: BufRead>(reader: R) -> std::io::Result<Self> {
        let mut trie = Self::new();
        for line in reader.lines() {
            let line = line?;
            let word = line.trim();
            if word.is_empty() {
                continue;
            }
            trie.add(&word.to_lowercase());
        }
        Ok(trie)
    }

    /// 単語を追加する
    /// 足りないノードを作り、最後のノードを terminal にする
    /// 同じ単語を再追加しても変化はない
    ///
    /// # Arguments
    /// * `word` - 追加する単語
    pub fn add(&mut self, word: &str) {
        let mut node = &mut self.root;
        for c in word.chars() {
            node = node.children.entry(c).or_default();
        }
        if !node.terminal {
            node.terminal = true;
            self.len += 1;
        }
    }

    /// 単語が完全な形で追加済みかどうか
    /// 途中の prefix だけでは true にならない
    ///
    /// # Arguments
    /// * `word` - 調べる単語
    pub fn contains(&self, word: &str) -> bool {
        let mut node = &self.root;
        for c in word.chars() {
            match node.children.get(&c) {
                Some(child) => node = child,
                None => return false,
            }
        }
        node.terminal
    }

    /// Number of distinct stored words
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// All stored words in lexicographic order
    pub fn words(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.len);
        let mut buf = String::new();
        Self::collect_words(&self.root, &mut buf, &mut out);
        out
    }

    fn collect_words(node: &TrieNode, buf: &mut String, out: &mut Vec<String>) {
        if node.terminal {
            out.push(buf.clone());
        }
        for (c, child) in &node.children {
            buf.push(*c);
            Self::collect_words(child, buf, out);
            buf.pop();
        }
    }

    fn fmt_node(node: &TrieNode, c: char, path: &mut String, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        path.push(c);
        let depth = path.chars().count();
        write!(f, "{:width$}{}", "", c, width = depth)?;
        if node.terminal {
            write!(f, " -> {}", path)?;
        }
        writeln!(f)?;
        for (next, child) in &node.children {
            Self::fmt_node(child, *next, path, f)?;
        }
        path.pop();
        Ok(())
    }
}

/// 木構造をそのまま表示する
/// root は `\0`、各ノードは深さ分インデントし、terminal には ` -> word` を付ける
impl fmt::Display for StopWordTrie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\\0")?;
        let mut path = String::new();
        for (c, child) in &self.root.children {
            Self::fmt_node(child, *c, &mut path, f)?;
        }
        Ok(())
    }
}

impl<T> Extend<T> for StopWordTrie
where
    T: AsRef<str>,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for word in iter {
            self.add(word.as_ref());
        }
    }
}

impl<T> FromIterator<T> for StopWordTrie
where
    T: AsRef<str>,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_words(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_then_contains() {
        let mut trie = StopWordTrie::new();
        trie.add("the");
        trie.add("then");
        assert!(trie.contains("the"));
        assert!(trie.contains("then"));
        assert!(!trie.contains("th"));
        assert!(!trie.contains("thenx"));
        assert!(!trie.contains(""));
    }

    #[test]
    fn re_adding_is_idempotent() {
        let mut trie = StopWordTrie::new();
        trie.add("a");
        trie.add("a");
        assert_eq!(trie.len(), 1);
        assert!(trie.contains("a"));
    }

    #[test]
    fn empty_word_only_when_added() {
        let mut trie = StopWordTrie::new();
        assert!(!trie.contains(""));
        trie.add("");
        assert!(trie.contains(""));
        assert_eq!(trie.len(), 1);
    }

    #[test]
    fn load_trims_and_lowercases() {
        let src = "The\n\n  and \nOF\n";
        let trie = StopWordTrie::load(src.as_bytes()).unwrap();
        assert_eq!(trie.words(), vec!["and", "of", "the"]);
        assert!(!trie.contains("The"));
    }

    #[test]
    fn display_renders_tree() {
        let trie: StopWordTrie = ["an", "a", "be"].into_iter().collect();
        let rendered = trie.to_string();
        assert_eq!(rendered, "\\0\n a -> a\n  n -> an\n b\n  e -> be\n");
    }
}
