use std::fmt;
use std::io::Write;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::lsa::scoring::Hits;
use crate::lsa::token::DocumentSentence;
use crate::lsa::LatentSemanticAnalyzer;
use crate::utils::math::matrix::DenseMatrix;

/// 行ラベルの幅
const LABEL_WIDTH: usize = 14;
/// セルの幅
const CELL_WIDTH: usize = 7;

/// Output encoding for reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// fixed-width text tables
    #[default]
    Text,
    /// JSON
    Json,
    /// CBOR (binary)
    Cbor,
}

/// Table
/// 行・列ラベル付きの数値表です
/// 内部と同じ term / 文書 index で並んでいます
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub title: String,
    pub column_labels: Vec<String>,
    pub row_labels: Vec<String>,
    pub cells: Vec<Vec<f64>>,
    /// true なら整数として表示 (カウント行列)
    #[serde(skip)]
    pub integral: bool,
}

impl Table {
    pub fn new<N>(title: &str, column_labels: Vec<String>, row_labels: Vec<String>, matrix: &DenseMatrix<N>) -> Self
    where
        N: num::Num + Copy + Into<f64>,
    {
        Self {
            title: title.to_string(),
            column_labels,
            row_labels,
            cells: matrix
                .to_rows()
                .into_iter()
                .map(|r| r.into_iter().map(|v| v.into()).collect::<Vec<f64>>())
                .collect(),
            integral: false,
        }
    }

    pub fn integral(mut self) -> Self {
        self.integral = true;
        self
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<w$}", self.title, w = LABEL_WIDTH)?;
        for label in &self.column_labels {
            write!(f, "{:<w$}", label, w = CELL_WIDTH)?;
        }
        write!(f, "\n\n")?;
        for (label, row) in self.row_labels.iter().zip(&self.cells) {
            write!(f, "{:<w$}", label, w = LABEL_WIDTH)?;
            for v in row {
                if self.integral {
                    write!(f, "{:<w$}", *v as i64, w = CELL_WIDTH)?;
                } else {
                    write!(f, "{:<w$.2}", v, w = CELL_WIDTH)?;
                }
            }
            write!(f, "\n\n")?;
        }
        Ok(())
    }
}

/// 文書列ラベル S1, S2, ...
pub fn document_labels(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("S{}", i)).collect()
}

/// 潜在次元ラベル 1, 2, ...
pub fn dimension_labels(k: usize) -> Vec<String> {
    (1..=k).map(|i| i.to_string()).collect()
}

/// クエリ部分のレポート
#[derive(Debug, Serialize)]
pub struct QueryReport {
    pub sentence: String,
    pub vector: Table,
    pub scores: Hits,
}

/// LsaReport
/// 診断用にパイプラインの全中間結果を表にしたもの
///
/// - 正規化済み文書
/// - A (term-document 行列)
/// - U, S, V (打ち切り後の因子)
/// - US, SV (スケール済み因子)
/// - Q と各文書とのコサイン類似度 (クエリがある場合)
#[derive(Debug, Serialize)]
pub struct LsaReport {
    pub documents: Vec<String>,
    pub term_document: Table,
    pub u: Table,
    pub s: Table,
    pub v: Table,
    pub us: Table,
    pub sv: Table,
    pub query: Option<QueryReport>,
}

impl LsaReport {
    /// Build the report, projecting and ranking `query` when given
    ///
    /// # Errors
    /// * `UndefinedProjection` - query has no term in the vocabulary
    pub fn build(analyzer: &LatentSemanticAnalyzer, query: Option<&DocumentSentence>) -> Result<Self> {
        let terms: Vec<String> = analyzer.vocabulary().iter().map(str::to_string).collect();
        let factors = analyzer.factors();
        let docs = document_labels(analyzer.matrix().document_count());
        let dims = dimension_labels(factors.rank());

        let query = match query {
            Some(sentence) => {
                let q = analyzer.project(sentence)?;
                let scores = analyzer.rank_documents(&q);
                let q_matrix = DenseMatrix::from_rows(&[q.values().to_vec()]);
                Some(QueryReport {
                    sentence: sentence.to_string(),
                    vector: Table::new("Q", dims.clone(), dimension_labels(1), &q_matrix),
                    scores,
                })
            }
            None => None,
        };

        Ok(Self {
            documents: analyzer.documents().iter().map(|d| d.to_string()).collect(),
            term_document: Table::new("A", docs.clone(), terms.clone(), analyzer.matrix().counts()).integral(),
            u: Table::new("U", dims.clone(), terms.clone(), factors.term_space()),
            s: Table::new("S", dims.clone(), dims.clone(), &factors.singular_matrix()),
            v: Table::new("V", docs.clone(), dims.clone(), factors.document_space()),
            us: Table::new("US", dims.clone(), terms, factors.scaled_term_space()),
            sv: Table::new("SV", docs, dims, factors.scaled_document_space()),
            query,
        })
    }

    /// Write in the requested encoding
    pub fn write_to<W: Write>(&self, format: ReportFormat, mut writer: W) -> Result<()> {
        match format {
            ReportFormat::Text => write!(writer, "{}", self)?,
            ReportFormat::Json => {
                serde_json::to_writer_pretty(&mut writer, self)?;
                writeln!(writer)?;
            }
            ReportFormat::Cbor => serde_cbor::to_writer(&mut writer, self)?,
        }
        writer.flush()?;
        Ok(())
    }
}

impl fmt::Display for LsaReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for doc in &self.documents {
            writeln!(f, "{}", doc)?;
        }
        writeln!(f)?;
        for table in [&self.term_document, &self.u, &self.s, &self.v, &self.us, &self.sv] {
            write!(f, "{}", table)?;
        }
        if let Some(query) = &self.query {
            write!(f, "{}\n\n", query.sentence)?;
            write!(f, "{}", query.vector)?;
            for entry in &query.scores.list {
                match entry.value() {
                    Some(s) => writeln!(f, "cos(S{}, Q) = {:.4}", entry.document + 1, s)?,
                    None => writeln!(f, "cos(S{}, Q) = undefined", entry.document + 1)?,
                }
            }
        }
        Ok(())
    }
}
