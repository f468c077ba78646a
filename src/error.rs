use thiserror::Error;

/// Structural problems when assembling a [`crate::data::model::Table`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TableError {
    #[error("column '{column}' has {found} rows, expected {expected}")]
    RaggedColumn {
        column: String,
        expected: usize,
        found: usize,
    },
    #[error("duplicate column name '{0}'")]
    DuplicateColumn(String),
}

/// Why a dataset source could not be turned into a table.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not reach {url}: {reason}")]
    Unreachable { url: String, reason: String },
    #[error("timed out after {secs}s fetching {url}")]
    Timeout { url: String, secs: u64 },
    #[error("{url} answered with HTTP {status}")]
    HttpStatus { url: String, status: u16 },
    #[error("reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),
    #[error("source contained no data")]
    EmptyInput,
    #[error("failed to parse dataset: {0:#}")]
    Parse(anyhow::Error),
}

/// Per-section analysis failures. None of these abort sibling sections.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("the dataset has no numeric columns")]
    EmptyNumericSet,
    #[error("column '{column}' has zero variance and cannot be standardized")]
    DegenerateColumn { column: String },
    #[error("need at least {needed} numeric features, found {found}")]
    InsufficientFeatures { needed: usize, found: usize },
    #[error("unknown or non-numeric column '{0}'")]
    UnknownColumn(String),
    #[error("no rows are complete across the selected features")]
    NoCompleteRows,
    #[error("visualization failed: {0}")]
    VisualizationFailure(String),
    #[error("numerical failure: {0}")]
    Numerical(String),
}
