//! Recommend command implementation for the Gather CLI.

use std::collections::BTreeSet;
use std::io::Write;

use camino::Utf8PathBuf;
use chrono::{DateTime, Utc};
use clap::Parser;
use gather_core::{InteractionRecord, MemorySnapshotStore, Plan, RecoSnapshot, SnapshotStore};
use gather_reco::{RecoConfig, generate_for_users};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    ARG_RECOMMEND_INTERACTIONS, ARG_RECOMMEND_PLANS, CliError, ENV_RECOMMEND_INTERACTIONS,
    ENV_RECOMMEND_PLANS,
};

/// CLI arguments for the `recommend` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Aggregate per-user interaction history and append one \
                 recommendation snapshot per user with both history and \
                 upcoming candidates. Users are isolated units of work; a \
                 failure for one user only costs that user's snapshot.",
    about = "Generate recommendation snapshots for every user with history"
)]
#[ortho_config(prefix = "GATHER")]
pub(crate) struct RecommendArgs {
    /// Path to a JSON array of plans.
    #[arg(long = ARG_RECOMMEND_PLANS, value_name = "path")]
    #[serde(default)]
    plans: Option<Utf8PathBuf>,
    /// Path to a JSON array of interaction records.
    #[arg(long = ARG_RECOMMEND_INTERACTIONS, value_name = "path")]
    #[serde(default)]
    interactions: Option<Utf8PathBuf>,
    /// Reference instant as RFC 3339; defaults to the wall clock.
    #[arg(long, value_name = "timestamp")]
    #[serde(default)]
    now: Option<String>,
    /// Write the JSON output here instead of stdout.
    #[arg(long, value_name = "path")]
    #[serde(default)]
    output: Option<Utf8PathBuf>,
}

impl RecommendArgs {
    fn into_config(self) -> Result<RecommendConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        RecommendConfig::try_from(merged)
    }
}

/// Resolved `recommend` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecommendConfig {
    plans: Utf8PathBuf,
    interactions: Utf8PathBuf,
    now: DateTime<Utc>,
    scoring: RecoConfig,
    output: Option<Utf8PathBuf>,
}

impl TryFrom<RecommendArgs> for RecommendConfig {
    type Error = CliError;

    fn try_from(args: RecommendArgs) -> Result<Self, Self::Error> {
        let plans = args.plans.ok_or(CliError::MissingArgument {
            field: ARG_RECOMMEND_PLANS,
            env: ENV_RECOMMEND_PLANS,
        })?;
        let interactions = args.interactions.ok_or(CliError::MissingArgument {
            field: ARG_RECOMMEND_INTERACTIONS,
            env: ENV_RECOMMEND_INTERACTIONS,
        })?;
        let now = crate::parse_now(args.now.as_deref())?;
        let scoring = RecoConfig::default().validate()?;

        Ok(Self {
            plans,
            interactions,
            now,
            scoring,
            output: args.output,
        })
    }
}

/// JSON payload produced by a recommendation run.
#[derive(Debug, Serialize)]
pub(crate) struct RecommendRunOutput {
    /// Latest appended snapshot per user, ordered by user id.
    snapshots: Vec<RecoSnapshot>,
    /// Users processed without a store failure, skips included.
    completed: usize,
    /// Users whose snapshot could not be appended.
    failed: usize,
}

pub(crate) fn run_recommend(args: RecommendArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    crate::require_existing(&config.plans, ARG_RECOMMEND_PLANS)?;
    crate::require_existing(&config.interactions, ARG_RECOMMEND_INTERACTIONS)?;
    let output = execute_recommend(&config)?;
    crate::emit(config.output.as_deref(), writer, &output)
}

fn execute_recommend(config: &RecommendConfig) -> Result<RecommendRunOutput, CliError> {
    let plans: Vec<Plan> = crate::load_json(&config.plans)?;
    let interactions: Vec<InteractionRecord> = crate::load_json(&config.interactions)?;

    let store = MemorySnapshotStore::default();
    let report = generate_for_users(&store, &interactions, &plans, config.now, &config.scoring);

    let users: BTreeSet<Uuid> = interactions.iter().map(|record| record.user_id).collect();
    let mut snapshots = Vec::new();
    for user_id in users {
        if let Some(snapshot) = store.latest_for(user_id)? {
            snapshots.push(snapshot);
        }
    }

    Ok(RecommendRunOutput {
        snapshots,
        completed: report.completed,
        failed: report.failed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use gather_core::InteractionKind;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    fn write_fixture<T: Serialize>(dir: &TempDir, name: &str, value: &T) -> Utf8PathBuf {
        let path =
            Utf8PathBuf::from_path_buf(dir.path().join(name)).expect("utf8 temp path");
        let payload = serde_json::to_string(value).expect("serialise fixture");
        std::fs::write(path.as_std_path(), payload).expect("write fixture");
        path
    }

    #[fixture]
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0)
            .single()
            .expect("valid time")
    }

    fn upcoming_plan(tag: &str, now: DateTime<Utc>) -> Plan {
        Plan::new(
            Uuid::new_v4(),
            None,
            BTreeSet::from([tag.to_owned()]),
            now + chrono::TimeDelta::hours(2),
            now + chrono::TimeDelta::hours(4),
            true,
            10,
        )
    }

    fn check_in(user_id: Uuid, tag: &str, now: DateTime<Utc>) -> InteractionRecord {
        InteractionRecord::new(
            user_id,
            Uuid::new_v4(),
            InteractionKind::CheckIn,
            BTreeSet::from([tag.to_owned()]),
            now - chrono::TimeDelta::days(2),
            None,
        )
    }

    #[rstest]
    fn produces_one_snapshot_per_active_user(now: DateTime<Utc>) {
        let dir = TempDir::new().expect("tempdir");
        let user_a = Uuid::new_v4();
        let user_b = Uuid::new_v4();
        let plans_path = write_fixture(
            &dir,
            "plans.json",
            &vec![upcoming_plan("coffee", now), upcoming_plan("music", now)],
        );
        let interactions_path = write_fixture(
            &dir,
            "interactions.json",
            &vec![check_in(user_a, "coffee", now), check_in(user_b, "music", now)],
        );

        let config = RecommendConfig {
            plans: plans_path,
            interactions: interactions_path,
            now,
            scoring: RecoConfig::default(),
            output: None,
        };
        let output = execute_recommend(&config).expect("run recommendations");

        assert_eq!(output.snapshots.len(), 2);
        assert_eq!(output.completed, 2);
        assert_eq!(output.failed, 0);
        assert!(output.snapshots.iter().all(|s| !s.items.is_empty()));
    }

    #[rstest]
    fn users_without_candidates_produce_no_snapshot(now: DateTime<Utc>) {
        let dir = TempDir::new().expect("tempdir");
        let user_id = Uuid::new_v4();
        let plans_path = write_fixture(&dir, "plans.json", &Vec::<Plan>::new());
        let interactions_path = write_fixture(
            &dir,
            "interactions.json",
            &vec![check_in(user_id, "coffee", now)],
        );

        let config = RecommendConfig {
            plans: plans_path,
            interactions: interactions_path,
            now,
            scoring: RecoConfig::default(),
            output: None,
        };
        let output = execute_recommend(&config).expect("run recommendations");

        assert!(output.snapshots.is_empty(), "skip is not an error");
        assert_eq!(output.completed, 1);
    }

    #[rstest]
    fn missing_inputs_name_their_environment_fallback() {
        let error =
            RecommendConfig::try_from(RecommendArgs::default()).expect_err("missing input");
        assert!(error.to_string().contains(ENV_RECOMMEND_PLANS));
    }
}
