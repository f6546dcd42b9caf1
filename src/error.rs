use thiserror::Error;

// ---------------------------------------------------------------------------
// Typed errors for the library layer. Binaries wrap them in `anyhow`.
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq)]
pub enum HistogramError {
    #[error("bin {bin} out of range (histogram has {nbins} bins, numbered from 1)")]
    BinOutOfRange { bin: usize, nbins: usize },

    #[error("rebin factor must be at least 1, got {0}")]
    InvalidRebin(u32),

    #[error("rebin factor {factor} larger than the number of bins ({nbins})")]
    RebinTooLarge { factor: u32, nbins: usize },

    #[error("histogram has no bins")]
    Empty,

    #[error("expected {expected} {what}, got {got}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("bin edges must be strictly increasing (edge {index})")]
    UnorderedEdges { index: usize },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("section '{0}' not found in configuration")]
    MissingSection(String),

    #[error("'{key}' has {got} entries but PtMin has {expected}")]
    LengthMismatch {
        key: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("configuration defines no pT bins")]
    NoBins,

    #[error("pT bin {index}: {reason}")]
    InvalidBin { index: usize, reason: String },

    #[error("pT bin {index} out of range ({count} bins configured)")]
    BinOutOfRange { index: usize, count: usize },
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("object '{0}' not found in results file")]
    MissingObject(String),

    #[error("object '{name}' is a {found}, expected a {expected}")]
    WrongKind {
        name: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("object '{0}' appears more than once")]
    DuplicateObject(String),

    #[error("object '{name}': {source}")]
    InvalidHistogram {
        name: String,
        #[source]
        source: HistogramError,
    },

    #[error("curve '{name}': {reason}")]
    InvalidCurve { name: String, reason: String },

    #[error("unknown object kind '{0}' (expected 'hist' or 'curve')")]
    UnknownKind(String),
}

#[derive(Debug, Error)]
pub enum PlotError {
    #[error("no input file is known for {0}; pass one with --input")]
    NoInputFile(&'static str),

    #[error("empty y range [{ymin}, {ymax}] for the frame")]
    EmptyFrame { ymin: f64, ymax: f64 },

    #[error("drawing failed: {0}")]
    Drawing(String),
}
