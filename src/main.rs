use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use rayon::prelude::*;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use lsa_similarity::{
    AnnotatorKind, DocumentSentence, HiddenMarkovModel, LatentSemanticAnalyzer, LsaConfig, LsaReport,
    PorterStemmer, ReportFormat, Result, StemFrequency, StopWordTrie, TaggedTerm, TokenNormalizer,
};

/// Compare sentences by latent semantic analysis
#[derive(Parser, Debug)]
#[command(name = "lsa", version, about)]
struct Cli {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of latent dimensions
    #[arg(short = 'k', long, env = "LSA_RANK")]
    rank: Option<usize>,

    /// Newline-separated stop-word list
    #[arg(long)]
    stop_words: Option<PathBuf>,

    /// Annotator used on corpus and query lines
    #[arg(long, value_enum)]
    annotator: Option<AnnotatorKind>,

    /// External annotator program and arguments (implies --annotator command)
    #[arg(long, env = "LSA_ANNOTATOR_CMD")]
    annotator_cmd: Option<String>,

    /// Report encoding
    #[arg(short, long, value_enum)]
    format: Option<ReportFormat>,

    /// Estimate HMM matrices instead; QUERY is tagged by the annotator and scored as Pi * A * ...
    #[arg(long)]
    hmm: bool,

    /// Count Porter stems of the normalized corpus instead; QUERY is ignored
    #[arg(long, conflicts_with = "hmm")]
    stems: bool,

    /// Corpus file, one sentence per line, ends at the first empty line
    corpus: PathBuf,

    /// Query sentence
    query: Vec<String>,
}

impl Cli {
    /// File config first, then flags on top
    fn config(&self) -> Result<LsaConfig> {
        let mut config = match &self.config {
            Some(path) => LsaConfig::from_file(path)?,
            None => LsaConfig::default(),
        };
        if let Some(rank) = self.rank {
            config.rank = rank;
        }
        if let Some(path) = &self.stop_words {
            config.stop_words = Some(path.clone());
        }
        if let Some(cmd) = &self.annotator_cmd {
            config.annotator_command = Some(cmd.clone());
            config.annotator = AnnotatorKind::Command;
        }
        if let Some(kind) = self.annotator {
            config.annotator = kind;
        }
        if let Some(format) = self.format {
            config.format = format;
        }
        Ok(config)
    }

    fn query_text(&self) -> Option<String> {
        (!self.query.is_empty()).then(|| self.query.join(" "))
    }
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let program_start = Instant::now();
    let config = cli.config()?;
    let stop_words = config.load_stop_words()?;
    let annotator = config.annotator()?;
    let normalizer = TokenNormalizer::new(&stop_words);

    let lines = read_corpus(&cli.corpus)?;
    info!(lines = lines.len(), stop_words = stop_words.len(), "read corpus");
    if lines.is_empty() {
        warn!(path = %cli.corpus.display(), "corpus has no sentence before the first empty line");
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if cli.hmm {
        let sentences = annotate_parallel(&lines, |line| normalizer.normalize_text_tagged(&annotator, line))?;
        let hmm = HiddenMarkovModel::estimate(&sentences);
        let query: Option<Vec<TaggedTerm>> = cli
            .query_text()
            .map(|text| normalizer.normalize_text_tagged(&annotator, &text))
            .transpose()?;
        write_hmm(&hmm, query.as_deref(), config.format, &mut out)?;
    } else if cli.stems {
        let documents = annotate_parallel(&lines, |line| normalizer.normalize_text(&annotator, line))?;
        let stems = StemFrequency::count(&PorterStemmer, documents.iter().flat_map(DocumentSentence::iter));
        info!(stems = stems.len(), "counted stems");
        write_stems(&stems, &stop_words, config.format, &mut out)?;
    } else {
        let documents = annotate_parallel(&lines, |line| normalizer.normalize_text(&annotator, line))?;
        let analyzer = LatentSemanticAnalyzer::fit(documents, config.rank)?;
        let query: Option<DocumentSentence> = cli
            .query_text()
            .map(|text| normalizer.normalize_text(&annotator, &text))
            .transpose()?;
        LsaReport::build(&analyzer, query.as_ref())?.write_to(config.format, &mut out)?;
    }

    info!(elapsed_ms = program_start.elapsed().as_secs_f64() * 1000.0, "done");
    Ok(())
}

/// 最初の空行までを 1 行 1 文として読む
fn read_corpus(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(|l| l.trim_end_matches('\r'))
        .take_while(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}

/// annotator 呼び出しだけ並列、結果は入力順
fn annotate_parallel<T, F>(lines: &[String], f: F) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(&str) -> Result<T> + Sync,
{
    let start = Instant::now();
    let out = lines.par_iter().map(|line| f(line)).collect::<Result<Vec<T>>>()?;
    info!(
        sentences = out.len(),
        threads = rayon::current_num_threads(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "annotated corpus"
    );
    Ok(out)
}

fn write_hmm<W: Write>(
    hmm: &HiddenMarkovModel,
    query: Option<&[TaggedTerm]>,
    format: ReportFormat,
    out: &mut W,
) -> Result<()> {
    let probability = query.map(|sentence| hmm.sentence_probability(sentence));
    match format {
        ReportFormat::Text => {
            write!(out, "{}", hmm)?;
            if let (Some(sentence), Some(p)) = (query, &probability) {
                let tagged: Vec<String> = sentence.iter().map(|t| t.to_string()).collect();
                writeln!(out, "P({}) = {}", tagged.join(" "), p)?;
            }
        }
        ReportFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &(hmm, &probability))?;
            writeln!(out)?;
        }
        ReportFormat::Cbor => serde_cbor::to_writer(&mut *out, &(hmm, &probability))?,
    }
    out.flush()?;
    Ok(())
}

/// テキストでは stop word の trie も出す
fn write_stems<W: Write>(
    stems: &StemFrequency,
    stop_words: &StopWordTrie,
    format: ReportFormat,
    out: &mut W,
) -> Result<()> {
    match format {
        ReportFormat::Text => {
            write!(out, "{}", stop_words)?;
            write!(out, "{}", stems)?;
        }
        ReportFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, stems)?;
            writeln!(out)?;
        }
        ReportFormat::Cbor => serde_cbor::to_writer(&mut *out, stems)?,
    }
    out.flush()?;
    Ok(())
}
