//! Command-line interface for Gather's offline batch tooling.
//!
//! The binary drives the three engine pipelines over JSON files: `cluster`
//! replaces the per-scope cluster sets, `recommend` appends recommendation
//! snapshots, and `search` ranks active plans around a point. Every
//! subcommand merges flags with `GATHER_*` environment variables and
//! configuration files through `ortho_config`, validates its inputs before
//! doing any work, and prints a JSON payload on stdout (or `--output`).

#![forbid(unsafe_code)]

use std::io::{BufReader, Write};

use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde::de::DeserializeOwned;

mod cluster;
mod error;
mod recommend;
mod search;

pub use error::CliError;

pub(crate) const ARG_CLUSTER_ENTITIES: &str = "entities";
pub(crate) const ENV_CLUSTER_ENTITIES: &str = "GATHER_CMDS_CLUSTER_ENTITIES";
pub(crate) const ARG_RECOMMEND_PLANS: &str = "plans";
pub(crate) const ENV_RECOMMEND_PLANS: &str = "GATHER_CMDS_RECOMMEND_PLANS";
pub(crate) const ARG_RECOMMEND_INTERACTIONS: &str = "interactions";
pub(crate) const ENV_RECOMMEND_INTERACTIONS: &str = "GATHER_CMDS_RECOMMEND_INTERACTIONS";
pub(crate) const ARG_SEARCH_PLANS: &str = "plans";
pub(crate) const ENV_SEARCH_PLANS: &str = "GATHER_CMDS_SEARCH_PLANS";
pub(crate) const ARG_SEARCH_LAT: &str = "lat";
pub(crate) const ENV_SEARCH_LAT: &str = "GATHER_CMDS_SEARCH_LAT";
pub(crate) const ARG_SEARCH_LON: &str = "lon";
pub(crate) const ENV_SEARCH_LON: &str = "GATHER_CMDS_SEARCH_LON";

/// Run the Gather CLI with the current process arguments and environment.
///
/// # Errors
/// Returns [`CliError`] when argument parsing, configuration merging,
/// input validation, or the requested engine run fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    match cli.command {
        Command::Cluster(args) => cluster::run_cluster(args, &mut stdout),
        Command::Recommend(args) => recommend::run_recommend(args, &mut stdout),
        Command::Search(args) => search::run_search(args, &mut stdout),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "gather",
    about = "Offline batch tooling for the Gather engine",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Cluster geolocated entities per scope.
    Cluster(cluster::ClusterArgs),
    /// Generate recommendation snapshots for every user with history.
    Recommend(recommend::RecommendArgs),
    /// Rank active plans around a point within a time window.
    Search(search::SearchArgs),
}

/// Reject paths that do not point at an existing regular file.
pub(crate) fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    if path.as_std_path().is_file() {
        Ok(())
    } else {
        Err(CliError::MissingSourceFile {
            field,
            path: path.to_path_buf(),
        })
    }
}

/// Load a JSON-encoded record collection from disk.
pub(crate) fn load_json<T>(path: &Utf8Path) -> Result<T, CliError>
where
    T: DeserializeOwned,
{
    let file =
        fs_utf8::File::open_ambient(path, ambient_authority()).map_err(|source| {
            CliError::OpenInput {
                path: path.to_path_buf(),
                source,
            }
        })?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|source| CliError::ParseInput {
        path: path.to_path_buf(),
        source,
    })
}

/// Serialise `value` to pretty JSON on stdout or into `output`.
pub(crate) fn emit<T>(
    output: Option<&Utf8Path>,
    writer: &mut dyn Write,
    value: &T,
) -> Result<(), CliError>
where
    T: Serialize,
{
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerialiseOutput)?;
    match output {
        Some(path) => {
            std::fs::write(path.as_std_path(), payload + "\n").map_err(CliError::WriteOutput)
        }
        None => {
            writer
                .write_all(payload.as_bytes())
                .map_err(CliError::WriteOutput)?;
            writer.write_all(b"\n").map_err(CliError::WriteOutput)
        }
    }
}

/// Resolve a `--now` override, defaulting to the wall clock.
pub(crate) fn parse_now(value: Option<&str>) -> Result<DateTime<Utc>, CliError> {
    value.map_or_else(
        || Ok(Utc::now()),
        |text| {
            DateTime::parse_from_rfc3339(text)
                .map(|instant| instant.with_timezone(&Utc))
                .map_err(|source| CliError::InvalidTimestamp {
                    value: text.to_owned(),
                    source,
                })
        },
    )
}
