use std::io::Write;
use std::process::{Command, Stdio};

use tracing::{debug, warn};

use crate::error::{LsaError, Result};
use crate::lsa::token::{AnnotatedSentence, AnnotatedToken, Annotator};

/// 空白区切りの簡易 annotator
/// `.` `!` `?` で文を切り、lemma は表層形そのまま、品詞は無し
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainAnnotator;

impl Annotator for PlainAnnotator {
    fn annotate(&self, text: &str) -> Result<Vec<AnnotatedSentence>> {
        let mut sentences = Vec::new();
        let mut current = AnnotatedSentence::new();
        for word in text.split_whitespace() {
            let ends_sentence = word.ends_with(['.', '!', '?']);
            let word = word.trim_end_matches(['.', '!', '?']);
            if !word.is_empty() {
                current.push(AnnotatedToken::plain(word));
            }
            if ends_sentence && !current.is_empty() {
                sentences.push(std::mem::take(&mut current));
            }
        }
        if !current.is_empty() {
            sentences.push(current);
        }
        Ok(sentences)
    }
}

/// `word_TAG` 形式のタグ付きテキスト用
/// 最後の `_` で分割し、`_` が無いトークンは品詞無し
/// 1 行 = 1 文
#[derive(Debug, Clone, Copy, Default)]
pub struct TaggedAnnotator;

impl Annotator for TaggedAnnotator {
    fn annotate(&self, text: &str) -> Result<Vec<AnnotatedSentence>> {
        let sentences = text
            .lines()
            .map(|line| {
                line.split_whitespace()
                    .map(|raw| match raw.rfind('_') {
                        Some(i) => {
                            let word = &raw[..i];
                            let tag = &raw[i + 1..];
                            AnnotatedToken::new(word, word, (!tag.is_empty()).then(|| tag.to_string()))
                        }
                        None => AnnotatedToken::plain(raw),
                    })
                    .collect::<AnnotatedSentence>()
            })
            .filter(|s| !s.is_empty())
            .collect();
        Ok(sentences)
    }
}

/// 外部コマンドを NLP サービスとして使う annotator
///
/// text を stdin に流し、stdout の各行を `surface<TAB>lemma[<TAB>pos]` として読む
/// 空行か `EOS` で文が終わる。lemma 列が無い行は表層形を lemma にする
#[derive(Debug, Clone)]
pub struct CommandAnnotator {
    program: String,
    args: Vec<String>,
}

impl CommandAnnotator {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// `"prog --flag value"` のような 1 行指定から作る
    pub fn from_command_line(command_line: &str) -> Result<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| LsaError::config("annotator command is empty"))?;
        Ok(Self::new(program, parts.collect()))
    }

    /// 外部コマンドを 1 回だけ実行して stdout を得る
    fn run_once(&self, text: &str) -> Result<String> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| LsaError::annotator(format!("failed to spawn `{}`: {}", self.program, e)))?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes())?;
        }
        let output = child.wait_with_output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(LsaError::annotator(format!(
                "`{}` exited with status {:?}: {}",
                self.program,
                output.status.code(),
                stderr.trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Annotator for CommandAnnotator {
    fn annotate(&self, text: &str) -> Result<Vec<AnnotatedSentence>> {
        let stdout = self.run_once(text)?;
        let sentences = parse_annotation_output(&stdout);
        debug!(program = %self.program, sentences = sentences.len(), "annotated text");
        Ok(sentences)
    }
}

/// annotator の出力を文ごとに分ける
pub(crate) fn parse_annotation_output(stdout: &str) -> Vec<AnnotatedSentence> {
    let mut sentences = Vec::new();
    let mut current = AnnotatedSentence::new();
    for line in stdout.lines() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() || line.trim() == "EOS" {
            if !current.is_empty() {
                sentences.push(std::mem::take(&mut current));
            }
            continue;
        }
        let mut cols = line.split('\t');
        let surface = cols.next().unwrap_or_default().trim();
        if surface.is_empty() {
            warn!(line, "annotator line without surface form skipped");
            continue;
        }
        let lemma = cols.next().map(str::trim).filter(|l| !l.is_empty()).unwrap_or(surface);
        let pos = cols.next().map(str::trim).filter(|p| !p.is_empty()).map(str::to_string);
        current.push(AnnotatedToken::new(surface, lemma, pos));
    }
    if !current.is_empty() {
        sentences.push(current);
    }
    sentences
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_splits_sentences() {
        let out = PlainAnnotator.annotate("The cat sat. A dog ran!  ").unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].len(), 3);
        assert_eq!(out[0][2].lemma, "sat");
        assert_eq!(out[1][0].text, "A");
        assert!(out[1][0].pos.is_none());
    }

    #[test]
    fn plain_empty_text_has_no_sentences() {
        assert!(PlainAnnotator.annotate("   ").unwrap().is_empty());
    }

    #[test]
    fn tagged_splits_at_last_underscore() {
        let out = TaggedAnnotator.annotate("my_PRP$ e_mail_NN plain").unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0][0].pos.as_deref(), Some("PRP$"));
        assert_eq!(out[0][1].text, "e_mail");
        assert_eq!(out[0][1].pos.as_deref(), Some("NN"));
        assert_eq!(out[0][2].pos, None);
    }

    #[test]
    fn parses_command_output() {
        let stdout = "Cats\tcat\tNNS\nran\trun\tVBD\nEOS\nDogs\tdog\n\n";
        let out = parse_annotation_output(stdout);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0][0].lemma, "cat");
        assert_eq!(out[0][1].pos.as_deref(), Some("VBD"));
        assert_eq!(out[1][0].lemma, "dog");
        assert_eq!(out[1][0].pos, None);
    }

    #[test]
    fn missing_lemma_falls_back_to_surface() {
        let out = parse_annotation_output("word\n");
        assert_eq!(out[0][0].lemma, "word");
    }

    #[test]
    fn empty_command_line_is_config_error() {
        assert!(matches!(
            CommandAnnotator::from_command_line("   "),
            Err(LsaError::Config(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn command_annotator_runs_external_program() {
        // `cat` echoes stdin, so each input line becomes one token
        let annotator = CommandAnnotator::new("cat", vec![]);
        let out = annotator.annotate("hello\thello\tUH\n").unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0][0].pos.as_deref(), Some("UH"));
    }

    #[test]
    fn missing_program_is_annotator_error() {
        let annotator = CommandAnnotator::new("definitely-not-a-real-annotator-binary", vec![]);
        assert!(matches!(annotator.annotate("x"), Err(LsaError::Annotator(_))));
    }
}
