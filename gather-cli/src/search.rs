//! Search command implementation for the Gather CLI.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use gather_core::{GeoPoint, Plan};
use gather_search::{SearchHit, SearchQuery, search_plans};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_SEARCH_LAT, ARG_SEARCH_LON, ARG_SEARCH_PLANS, CliError, ENV_SEARCH_LAT, ENV_SEARCH_LON,
    ENV_SEARCH_PLANS,
};

/// CLI arguments for the `search` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Rank the active plans around a query point that overlap \
                 the forward time window, optionally filtered to plans \
                 sharing at least one of the given tags. Results are the \
                 full ranked sequence; pagination is the caller's concern.",
    about = "Rank active plans around a point within a time window"
)]
#[ortho_config(prefix = "GATHER")]
pub(crate) struct SearchArgs {
    /// Path to a JSON array of plans.
    #[arg(long = ARG_SEARCH_PLANS, value_name = "path")]
    #[serde(default)]
    plans: Option<Utf8PathBuf>,
    /// Query point latitude in degrees.
    #[arg(long = ARG_SEARCH_LAT, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    lat: Option<f64>,
    /// Query point longitude in degrees.
    #[arg(long = ARG_SEARCH_LON, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    lon: Option<f64>,
    /// Search radius in kilometres.
    #[arg(long, value_name = "km")]
    #[serde(default)]
    radius_km: Option<f64>,
    /// Forward time window in hours.
    #[arg(long, value_name = "hours")]
    #[serde(default)]
    window_hours: Option<i64>,
    /// Comma-separated tags; plans sharing any of them match.
    #[arg(long, value_name = "tags")]
    #[serde(default)]
    tags: Option<String>,
    /// Reference instant as RFC 3339; defaults to the wall clock.
    #[arg(long, value_name = "timestamp")]
    #[serde(default)]
    now: Option<String>,
    /// Write the JSON output here instead of stdout.
    #[arg(long, value_name = "path")]
    #[serde(default)]
    output: Option<Utf8PathBuf>,
}

impl SearchArgs {
    fn into_config(self) -> Result<SearchConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SearchConfig::try_from(merged)
    }
}

/// Resolved `search` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SearchConfig {
    plans: Utf8PathBuf,
    query: SearchQuery,
    output: Option<Utf8PathBuf>,
}

impl TryFrom<SearchArgs> for SearchConfig {
    type Error = CliError;

    fn try_from(args: SearchArgs) -> Result<Self, Self::Error> {
        let plans = args.plans.ok_or(CliError::MissingArgument {
            field: ARG_SEARCH_PLANS,
            env: ENV_SEARCH_PLANS,
        })?;
        let lat = args.lat.ok_or(CliError::MissingArgument {
            field: ARG_SEARCH_LAT,
            env: ENV_SEARCH_LAT,
        })?;
        let lon = args.lon.ok_or(CliError::MissingArgument {
            field: ARG_SEARCH_LON,
            env: ENV_SEARCH_LON,
        })?;

        let origin = GeoPoint::new(lon, lat)?;
        let now = crate::parse_now(args.now.as_deref())?;

        let mut query = SearchQuery::new(origin, now);
        if let Some(radius_km) = args.radius_km {
            query = query.with_radius_km(radius_km);
        }
        if let Some(window_hours) = args.window_hours {
            query = query.with_window_hours(window_hours);
        }
        if let Some(tags) = args.tags.as_deref() {
            query = query.with_tags(parse_tags(tags));
        }

        Ok(Self {
            plans,
            query,
            output: args.output,
        })
    }
}

fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

/// JSON payload produced by a search run.
#[derive(Debug, Serialize)]
pub(crate) struct SearchRunOutput {
    /// Ranked hits, closest first.
    hits: Vec<SearchHit>,
}

pub(crate) fn run_search(args: SearchArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    crate::require_existing(&config.plans, ARG_SEARCH_PLANS)?;
    let output = execute_search(&config)?;
    crate::emit(config.output.as_deref(), writer, &output)
}

fn execute_search(config: &SearchConfig) -> Result<SearchRunOutput, CliError> {
    let plans: Vec<Plan> = crate::load_json(&config.plans)?;
    let hits = search_plans(&plans, &config.query);
    Ok(SearchRunOutput { hits })
}
