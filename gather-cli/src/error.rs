//! Error types emitted by the Gather CLI.
//!
//! Keep this error type reasonably small, as most CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use gather_cluster::DbscanParamsError;
use gather_core::{GeoError, ScopeParseError, StoreError};
use gather_reco::RecoConfigError;
use thiserror::Error;

/// Errors emitted by the Gather CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Flag name of the missing option.
        field: &'static str,
        /// Environment variable that can supply it.
        env: &'static str,
    },
    /// A referenced input path does not exist or is not a file.
    #[error("{field} path {path:?} does not exist or is not a file")]
    MissingSourceFile {
        /// Flag name of the offending option.
        field: &'static str,
        /// Path that failed the check.
        path: Utf8PathBuf,
    },
    /// Opening an input file failed.
    #[error("failed to open {path:?}: {source}")]
    OpenInput {
        /// Path that could not be opened.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// An input file held JSON the engine cannot use, including records
    /// with out-of-range coordinates.
    #[error("failed to parse JSON records in {path:?}: {source}")]
    ParseInput {
        /// Path whose payload failed to decode.
        path: Utf8PathBuf,
        /// Decoder error, carrying coordinate validation failures too.
        #[source]
        source: serde_json::Error,
    },
    /// The requested scope name is unknown.
    #[error(transparent)]
    InvalidScope(#[from] ScopeParseError),
    /// Clustering parameters failed validation.
    #[error(transparent)]
    InvalidClusterParams(#[from] DbscanParamsError),
    /// Recommendation configuration failed validation.
    #[error(transparent)]
    InvalidRecoConfig(#[from] RecoConfigError),
    /// The query point was outside the valid coordinate ranges.
    #[error(transparent)]
    InvalidCoordinate(#[from] GeoError),
    /// A `--now` override was not a valid RFC 3339 timestamp.
    #[error("invalid --now timestamp {value:?}: {source}")]
    InvalidTimestamp {
        /// Rejected timestamp text.
        value: String,
        /// Parser error from `chrono`.
        #[source]
        source: chrono::ParseError,
    },
    /// A store rejected an engine write.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Serialising the run output failed.
    #[error("failed to serialise output: {0}")]
    SerialiseOutput(#[source] serde_json::Error),
    /// Writing the run output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
