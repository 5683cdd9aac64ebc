// SPDX-License-Identifier: MIT
//! `oneshot`: a single-task command-line front end for the Worker/Auditor
//! run loop (spec §6). Parses flags, merges them over a config file, builds
//! one `Engine`, runs it to a terminal state, and maps `COMPLETED` to exit
//! code 0.

mod config;

use anyhow::{bail, Context, Result};
use clap::Parser;
use config::FileConfig;
use oneshot_core::{SystemClock, TaskId, UuidIdGen, IdGen};
use oneshot_engine::{Engine, EngineConfig, Orchestrator, OrchestratorConfig};
use oneshot_executor::{
    DirectHttpExecutor, DirectHttpExecutorConfig, ExecutorMetadata, ExecutorRegistry,
    SubprocessExecutor, SubprocessExecutorConfig, DEFAULT_GRACE_PERIOD,
};
use oneshot_storage::DurableContext;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Run a single task through the Worker/Auditor loop until it completes,
/// is rejected, fails, or is interrupted.
#[derive(Debug, Parser)]
#[command(name = "oneshot", version, about)]
struct Cli {
    /// The task to run, e.g. "add a retry to the HTTP client".
    prompt: Option<String>,

    #[arg(long)]
    max_iterations: Option<u32>,

    /// Which registered executor kind to run the worker and auditor under.
    #[arg(long)]
    executor: Option<String>,

    #[arg(long)]
    worker_model: Option<String>,

    #[arg(long)]
    auditor_model: Option<String>,

    /// Inactivity timeout, in seconds, for the first iteration.
    #[arg(long)]
    initial_timeout: Option<f64>,

    /// Inactivity timeout ceiling, in seconds, across iterations.
    #[arg(long)]
    max_timeout: Option<f64>,

    /// How often the pipeline polls for stream inactivity, in seconds.
    #[arg(long)]
    activity_interval: Option<f64>,

    /// Resume a previously started task instead of creating a new one.
    #[arg(long)]
    resume: bool,

    /// Durable context file to create or resume from.
    #[arg(long)]
    session: Option<PathBuf>,

    /// Activity log file to create or resume from.
    #[arg(long)]
    session_log: Option<PathBuf>,

    /// Keep the activity log on disk after the task completes.
    #[arg(long)]
    keep_log: bool,

    #[arg(long)]
    max_concurrent: Option<usize>,

    /// Seconds of no progress before the engine gives up on the task.
    #[arg(long)]
    idle_threshold: Option<f64>,
}

/// Flags merged with file-sourced defaults; CLI flags always win.
struct ResolvedConfig {
    prompt: String,
    max_iterations: u32,
    executor: String,
    worker_model: Option<String>,
    auditor_model: Option<String>,
    initial_timeout: f64,
    activity_interval: f64,
    resume: bool,
    session: PathBuf,
    session_log: PathBuf,
    keep_log: bool,
    max_concurrent: usize,
    idle_threshold: f64,
}

const DEFAULT_MAX_ITERATIONS: u32 = 5;
const DEFAULT_INITIAL_TIMEOUT: f64 = 120.0;
const DEFAULT_ACTIVITY_INTERVAL: f64 = 0.25;
// original_source/src/oneshot/config.py's DEFAULT_CONFIG.
const DEFAULT_MAX_CONCURRENT: usize = 5;
const DEFAULT_IDLE_THRESHOLD: f64 = 60.0;

fn resolve(cli: Cli, file: FileConfig) -> Result<ResolvedConfig> {
    let prompt = cli
        .prompt
        .or_else(|| std::env::var("ONESHOT_PROMPT").ok())
        .context("a prompt is required (positional argument)")?;

    let executor = cli.executor.or(file.executor).unwrap_or_else(|| "subprocess".to_string());
    let session = cli
        .session
        .or(file.session)
        .unwrap_or_else(|| PathBuf::from(".oneshot-session.json"));
    let session_log = cli
        .session_log
        .or(file.session_log)
        .unwrap_or_else(|| PathBuf::from(".oneshot-session.ndjson"));

    Ok(ResolvedConfig {
        prompt,
        max_iterations: cli
            .max_iterations
            .or(file.max_iterations)
            .unwrap_or(DEFAULT_MAX_ITERATIONS),
        executor,
        worker_model: cli.worker_model.or(file.worker_model),
        auditor_model: cli.auditor_model.or(file.auditor_model),
        initial_timeout: cli
            .initial_timeout
            .or(file.initial_timeout)
            .unwrap_or(DEFAULT_INITIAL_TIMEOUT),
        activity_interval: cli
            .activity_interval
            .or(file.activity_interval)
            .unwrap_or(DEFAULT_ACTIVITY_INTERVAL),
        resume: cli.resume || cli.session.is_some(),
        session,
        session_log,
        keep_log: cli.keep_log || file.keep_log.unwrap_or(false),
        max_concurrent: cli
            .max_concurrent
            .or(file.max_concurrent)
            .unwrap_or(DEFAULT_MAX_CONCURRENT),
        idle_threshold: cli
            .idle_threshold
            .or(file.idle_threshold)
            .unwrap_or(DEFAULT_IDLE_THRESHOLD),
    })
}

/// Populate an `ExecutorRegistry` with the one executor kind the CLI needs
/// for this role, then resolve it by name. Env vars that a kind requires are
/// validated up front: the registry's constructor closures can't return
/// `Result`, so a missing `ONESHOT_HTTP_ENDPOINT` must fail here rather than
/// inside `create()`.
fn build_executor(kind: &str, role: &str, model: Option<&str>, created_at: f64) -> Result<Arc<dyn oneshot_executor::Executor>> {
    let registry = ExecutorRegistry::new();
    let name = format!("{kind}-{role}");

    match kind {
        "subprocess" => {
            let mut args = Vec::new();
            if let Some(model) = model {
                args.push("--model".to_string());
                args.push(model.to_string());
            }
            let config = SubprocessExecutorConfig {
                name: name.clone(),
                command: std::env::var("ONESHOT_AGENT_COMMAND").unwrap_or_else(|_| "claude".to_string()),
                args,
                cwd: std::env::current_dir().context("resolving current directory")?,
                env: Vec::new(),
                grace_period: DEFAULT_GRACE_PERIOD,
                created_at,
                session_history_path: None,
                captures_git: true,
            };
            registry.register(
                ExecutorMetadata {
                    name: name.clone(),
                    captures_git: true,
                    supports_model_selection: true,
                },
                move || Arc::new(SubprocessExecutor::new(config.clone())),
            );
        }
        "direct-http" => {
            let endpoint = std::env::var("ONESHOT_HTTP_ENDPOINT")
                .with_context(|| format!("{role} executor \"direct-http\" requires ONESHOT_HTTP_ENDPOINT"))?;
            let config = DirectHttpExecutorConfig {
                name: name.clone(),
                endpoint,
                bearer_token: std::env::var("ONESHOT_HTTP_TOKEN").ok(),
                request_timeout: Duration::from_secs(120),
            };
            registry.register(
                ExecutorMetadata {
                    name: name.clone(),
                    captures_git: false,
                    supports_model_selection: true,
                },
                move || Arc::new(DirectHttpExecutor::new(config.clone())),
            );
        }
        other => bail!("unknown executor kind {other:?} (known: subprocess, direct-http)"),
    }

    registry
        .create(&name)
        .with_context(|| format!("resolving executor {name:?} from the registry"))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let file_config = FileConfig::load_default().context("loading configuration file")?;
    let config = resolve(cli, file_config)?;

    let clock = SystemClock;
    let task_id = if config.resume {
        TaskId::new(
            config
                .session
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("task")
                .to_string(),
        )
    } else {
        TaskId::new(UuidIdGen.next())
    };

    let context = DurableContext::open(
        config.session.clone(),
        task_id.clone(),
        config.max_iterations,
        clock.now(),
    )
    .context("opening durable context")?;
    let created_at = context.task().created_at;

    let worker_executor = build_executor(&config.executor, "worker", config.worker_model.as_deref(), created_at)?;
    let auditor_executor = build_executor(&config.executor, "auditor", config.auditor_model.as_deref(), created_at)?;

    let engine = Engine::new(
        task_id,
        context,
        config.session_log.clone(),
        worker_executor,
        auditor_executor,
        clock,
        EngineConfig {
            task: config.prompt.clone(),
            inactivity_timeout: Duration::from_secs_f64(config.initial_timeout),
            poll_interval: Duration::from_secs_f64(config.activity_interval),
            prompt_config: oneshot_engine::prompts::PromptConfig::default(),
            keep_log: config.keep_log,
        },
    )
    .context("constructing engine")?;

    // A single task is still routed through the Orchestrator so
    // `--idle-threshold` governs a real global watchdog and `--max-concurrent`
    // is honored rather than silently dropped, even though there is only one
    // Engine to bound here.
    let orchestrator = Orchestrator::new(
        clock,
        OrchestratorConfig {
            max_concurrent: config.max_concurrent,
            global_idle_threshold: Duration::from_secs_f64(config.idle_threshold),
            ..Default::default()
        },
    );
    let mut results = orchestrator.run(vec![engine]).await;
    let result = match results.pop() {
        Some(r) => r,
        None => bail!("orchestrator returned no result for the submitted task"),
    };
    let completed = result.context("running task")?;
    if completed {
        Ok(())
    } else {
        std::process::exit(1);
    }
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
