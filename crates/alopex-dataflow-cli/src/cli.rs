//! CLI Parser - Command-line argument parsing with clap

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Run a built-in alopex-dataflow pipeline over a JSON-lines file
#[derive(Parser, Debug)]
#[command(name = "alopex-dataflow")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Pipeline to run
    #[arg(long, value_enum)]
    pub experiment: Experiment,

    /// Input file, one JSON object per line (travel times for average-speed)
    #[arg(long)]
    pub input: PathBuf,

    /// Road edges with start/end coordinates (average-speed only)
    #[arg(long)]
    pub edges: Option<PathBuf>,

    /// Write results to this file instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Column holding the text to tokenize
    #[arg(long, default_value = "text")]
    pub text_column: String,

    /// Column identifying a document (tf-idf and pmi)
    #[arg(long, default_value = "doc_id")]
    pub doc_column: String,

    /// Stop after this many output rows
    #[arg(long)]
    pub limit: Option<usize>,

    /// Materialize every stage instead of streaming
    #[arg(long)]
    pub eager: bool,

    /// Print the pipeline plan and exit without reading the input
    #[arg(long)]
    pub explain: bool,

    /// Suppress log output
    #[arg(long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long)]
    pub verbose: bool,
}

/// Built-in pipelines
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Experiment {
    /// Word occurrence counts, least frequent first
    WordCount,
    /// Top three documents per word by TF-IDF
    TfIdf,
    /// Top ten words per document by pointwise mutual information
    Pmi,
    /// Average road speed per weekday and hour
    AverageSpeed,
}
