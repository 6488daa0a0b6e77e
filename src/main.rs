use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};

use exam_planner::config::PlannerConfig;
use exam_planner::logging::init_tracing;
use exam_planner::planner::StudyPlanner;
use exam_planner::service::{InMemorySources, JsonFileSink, SnapshotFile, StudyPlanService};

const USAGE: &str =
    "usage: exam-planner <snapshot.json> [--seed N] [--today YYYY-MM-DD] [--out plan.json]";

struct Args {
    snapshot: PathBuf,
    seed: Option<u64>,
    today: Option<NaiveDate>,
    out: Option<PathBuf>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = std::env::args().skip(1);
    let mut snapshot = None;
    let mut seed = None;
    let mut today = None;
    let mut out = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--seed" => {
                let value = args.next().ok_or("--seed needs a value")?;
                seed = Some(value.parse::<u64>().map_err(|e| format!("invalid seed: {e}"))?);
            }
            "--today" => {
                let value = args.next().ok_or("--today needs a value")?;
                today = Some(
                    NaiveDate::parse_from_str(&value, "%Y-%m-%d")
                        .map_err(|e| format!("invalid date: {e}"))?,
                );
            }
            "--out" => {
                out = Some(PathBuf::from(args.next().ok_or("--out needs a value")?));
            }
            "-h" | "--help" => return Err(USAGE.to_string()),
            other if snapshot.is_none() => snapshot = Some(PathBuf::from(other)),
            other => return Err(format!("unexpected argument: {other}")),
        }
    }

    Ok(Args {
        snapshot: snapshot.ok_or(USAGE)?,
        seed,
        today,
        out,
    })
}

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let mut config = PlannerConfig::from_env();
    let _log_guard = init_tracing(&config.log_level);

    let args = match parse_args() {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::from(2);
        }
    };
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }

    let raw = match std::fs::read_to_string(&args.snapshot) {
        Ok(raw) => raw,
        Err(err) => {
            tracing::error!(
                error = %err,
                path = %args.snapshot.display(),
                "failed to read snapshot"
            );
            return ExitCode::FAILURE;
        }
    };
    let file: SnapshotFile = match serde_json::from_str(&raw) {
        Ok(file) => file,
        Err(err) => {
            tracing::error!(error = %err, "invalid snapshot JSON");
            return ExitCode::FAILURE;
        }
    };

    let sources = Arc::new(InMemorySources::from_snapshot_file(&file));
    let mut service = StudyPlanService::new(
        StudyPlanner::new(config),
        sources.clone(),
        sources.clone(),
        sources,
    );
    if let Some(out) = &args.out {
        service = service.with_sink(Arc::new(JsonFileSink::new(out)));
    }

    let today = args.today.unwrap_or_else(|| Utc::now().date_naive());
    match service.generate(&file.request, today) {
        Ok(plan) => {
            if args.out.is_none() {
                match serde_json::to_string_pretty(&plan) {
                    Ok(json) => println!("{json}"),
                    Err(err) => {
                        tracing::error!(error = %err, "failed to serialize plan");
                        return ExitCode::FAILURE;
                    }
                }
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, code = err.code(), "plan generation failed");
            ExitCode::FAILURE
        }
    }
}
