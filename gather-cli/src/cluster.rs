//! Cluster command implementation for the Gather CLI.

use std::collections::BTreeSet;
use std::io::Write;
use std::str::FromStr;

use camino::Utf8PathBuf;
use clap::Parser;
use gather_cluster::{DbscanParams, run_scope};
use gather_core::batch::run_batch;
use gather_core::{Cluster, ClusterStore, LocatedEntity, MemoryClusterStore, Scope};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{ARG_CLUSTER_ENTITIES, CliError, ENV_CLUSTER_ENTITIES};

/// CLI arguments for the `cluster` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Run density-based clustering over a JSON array of located \
                 entities. Each scope present in the input (or the single \
                 scope requested) is one isolated unit of work whose \
                 cluster set is replaced atomically.",
    about = "Cluster geolocated entities per scope"
)]
#[ortho_config(prefix = "GATHER")]
pub(crate) struct ClusterArgs {
    /// Path to a JSON array of located entities.
    #[arg(long = ARG_CLUSTER_ENTITIES, value_name = "path")]
    #[serde(default)]
    entities: Option<Utf8PathBuf>,
    /// Cluster only this scope instead of every scope in the input.
    #[arg(long, value_name = "scope")]
    #[serde(default)]
    scope: Option<String>,
    /// Neighbourhood radius in degrees.
    #[arg(long, value_name = "degrees")]
    #[serde(default)]
    eps: Option<f64>,
    /// Minimum neighbourhood size for a core point, itself included.
    #[arg(long, value_name = "count")]
    #[serde(default)]
    min_samples: Option<usize>,
    /// Write the JSON output here instead of stdout.
    #[arg(long, value_name = "path")]
    #[serde(default)]
    output: Option<Utf8PathBuf>,
}

impl ClusterArgs {
    fn into_config(self) -> Result<ClusterConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ClusterConfig::try_from(merged)
    }
}

/// Resolved `cluster` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ClusterConfig {
    entities: Utf8PathBuf,
    scope: Option<Scope>,
    params: DbscanParams,
    output: Option<Utf8PathBuf>,
}

impl TryFrom<ClusterArgs> for ClusterConfig {
    type Error = CliError;

    fn try_from(args: ClusterArgs) -> Result<Self, Self::Error> {
        let entities = args.entities.ok_or(CliError::MissingArgument {
            field: ARG_CLUSTER_ENTITIES,
            env: ENV_CLUSTER_ENTITIES,
        })?;
        let scope = args.scope.as_deref().map(Scope::from_str).transpose()?;

        let defaults = DbscanParams::default();
        let params = DbscanParams {
            eps_degrees: args.eps.unwrap_or(defaults.eps_degrees),
            min_samples: args.min_samples.unwrap_or(defaults.min_samples),
        }
        .validate()?;

        Ok(Self {
            entities,
            scope,
            params,
            output: args.output,
        })
    }
}

/// JSON payload produced by a clustering run.
#[derive(Debug, Serialize)]
pub(crate) struct ClusterRunOutput {
    /// New cluster sets, ordered by scope.
    clusters: Vec<Cluster>,
    /// Scopes whose cluster set was replaced (or skipped as a no-op).
    completed: usize,
    /// Scopes whose replacement failed.
    failed: usize,
}

pub(crate) fn run_cluster(args: ClusterArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    crate::require_existing(&config.entities, ARG_CLUSTER_ENTITIES)?;
    let output = execute_cluster(&config)?;
    crate::emit(config.output.as_deref(), writer, &output)
}

fn execute_cluster(config: &ClusterConfig) -> Result<ClusterRunOutput, CliError> {
    let entities: Vec<LocatedEntity> = crate::load_json(&config.entities)?;
    let scopes: BTreeSet<Scope> = config.scope.map_or_else(
        || entities.iter().map(|entity| entity.scope).collect(),
        |scope| BTreeSet::from([scope]),
    );

    let store = MemoryClusterStore::default();
    let report = run_batch("clustering", scopes.iter().copied(), |scope| {
        run_scope(&store, &entities, scope, config.params)
    });

    let mut clusters = Vec::new();
    for scope in scopes {
        clusters.extend(store.clusters_for(scope)?);
    }

    Ok(ClusterRunOutput {
        clusters,
        completed: report.completed,
        failed: report.failed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gather_core::GeoPoint;
    use rstest::rstest;
    use tempfile::TempDir;
    use uuid::Uuid;

    fn write_entities(dir: &TempDir, entities: &[LocatedEntity]) -> Utf8PathBuf {
        let path = Utf8PathBuf::from_path_buf(dir.path().join("entities.json"))
            .expect("utf8 temp path");
        let payload = serde_json::to_string(entities).expect("serialise entities");
        std::fs::write(path.as_std_path(), payload).expect("write entities fixture");
        path
    }

    fn entity(scope: Scope, lon: f64, lat: f64) -> LocatedEntity {
        LocatedEntity::new(
            Uuid::new_v4(),
            scope,
            GeoPoint::new(lon, lat).expect("valid point"),
        )
    }

    fn config_for(entities: Utf8PathBuf, scope: Option<Scope>) -> ClusterConfig {
        ClusterConfig {
            entities,
            scope,
            params: DbscanParams::default(),
            output: None,
        }
    }

    #[rstest]
    fn clusters_every_scope_in_the_input() {
        let dir = TempDir::new().expect("tempdir");
        let path = write_entities(
            &dir,
            &[
                entity(Scope::Places, -74.0060, 40.7128),
                entity(Scope::Places, -74.0061, 40.7129),
                entity(Scope::Venues, 2.3500, 48.8500),
                entity(Scope::Venues, 2.3501, 48.8501),
            ],
        );

        let output = execute_cluster(&config_for(path, None)).expect("run clustering");

        assert_eq!(output.clusters.len(), 2);
        assert_eq!(output.completed, 2);
        assert_eq!(output.failed, 0);
    }

    #[rstest]
    fn a_requested_scope_limits_the_run() {
        let dir = TempDir::new().expect("tempdir");
        let path = write_entities(
            &dir,
            &[
                entity(Scope::Places, -74.0060, 40.7128),
                entity(Scope::Places, -74.0061, 40.7129),
                entity(Scope::Venues, 2.3500, 48.8500),
                entity(Scope::Venues, 2.3501, 48.8501),
            ],
        );

        let output =
            execute_cluster(&config_for(path, Some(Scope::Venues))).expect("run clustering");

        assert_eq!(output.clusters.len(), 1);
        assert_eq!(
            output.clusters.first().map(|cluster| cluster.scope),
            Some(Scope::Venues)
        );
    }

    #[rstest]
    fn invalid_coordinates_in_the_input_are_a_parse_error() {
        let dir = TempDir::new().expect("tempdir");
        let path = Utf8PathBuf::from_path_buf(dir.path().join("entities.json"))
            .expect("utf8 temp path");
        std::fs::write(
            path.as_std_path(),
            r#"[{"id":"7f2c1e9a-0000-0000-0000-000000000000","scope":"places","location":{"lon":0.0,"lat":123.0}}]"#,
        )
        .expect("write fixture");

        let error = execute_cluster(&config_for(path, None)).expect_err("invalid latitude");
        assert!(matches!(error, CliError::ParseInput { .. }));
    }

    #[rstest]
    fn unknown_scope_names_are_rejected_before_running() {
        let args = ClusterArgs {
            entities: Some(Utf8PathBuf::from("entities.json")),
            scope: Some("galaxies".to_owned()),
            ..ClusterArgs::default()
        };

        let error = ClusterConfig::try_from(args).expect_err("unknown scope");
        assert!(matches!(error, CliError::InvalidScope(_)));
    }

    #[rstest]
    fn invalid_eps_is_rejected_before_running() {
        let args = ClusterArgs {
            entities: Some(Utf8PathBuf::from("entities.json")),
            eps: Some(-1.0),
            ..ClusterArgs::default()
        };

        let error = ClusterConfig::try_from(args).expect_err("invalid eps");
        assert!(matches!(error, CliError::InvalidClusterParams(_)));
    }

    #[rstest]
    fn a_missing_entities_flag_names_its_environment_fallback() {
        let error = ClusterConfig::try_from(ClusterArgs::default()).expect_err("missing input");
        assert!(error.to_string().contains(ENV_CLUSTER_ENTITIES));
    }
}
