// src/lib.rs

pub mod chain;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod gate;
pub mod history;
pub mod logging;
pub mod types;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::chain::{DependencyChain, RunOutcome};
use crate::cli::CliArgs;
use crate::config::PipelineConfig;
use crate::config::loader::load_and_validate;
use crate::engine::{
    ChainLauncher, Clock, CoreRuntime, RunTrigger, Runtime, RuntimeEvent, RuntimeOptions,
    SystemClock, spawn_ticker,
};
use crate::history::HistoryStore;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - dependency chain + launcher
/// - single-flight runtime
/// - ticker (or a single manual trigger in `--once` mode)
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)
        .with_context(|| format!("loading config {}", config_path.display()))?;

    if args.history {
        return print_history(&cfg);
    }

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    info!(
        pipeline = %cfg.name,
        schedule = %cfg.cadence.expression(),
        gate = %cfg.gate.describe(),
        stages = cfg.stages.len(),
        "pipeline loaded"
    );

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let chain = Arc::new(DependencyChain::from_config(&cfg).with_clock(Arc::clone(&clock)));

    // Runtime event channel.
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    let mut launcher =
        ChainLauncher::new(chain, Arc::clone(&clock), cfg.settle_delay, rt_tx.clone());
    if let Some(path) = cfg.history.as_ref() {
        launcher = launcher.with_history(Arc::new(HistoryStore::new(path)));
    }

    // Manual trigger in --once mode, otherwise the cadence ticker.
    let _ticker_handle = if args.once {
        let logical_time = args
            .at
            .unwrap_or_else(|| clock.now().with_timezone(&cfg.cadence.offset()));
        let trigger = RunTrigger::new(logical_time);
        info!(run_id = %trigger.run_id, %logical_time, "firing manual trigger");
        rt_tx.send(RuntimeEvent::TriggerFired(trigger)).await?;
        None
    } else {
        Some(spawn_ticker(
            cfg.cadence.clone(),
            Arc::clone(&clock),
            rt_tx.clone(),
        ))
    };

    // Ctrl-C → graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    let options = RuntimeOptions {
        exit_when_idle: args.once,
    };

    let core = CoreRuntime::new(
        cfg.triggered_while_running_behaviour,
        cfg.queue_length,
        options,
    );
    let runtime = Runtime::new(core, rt_rx, launcher);
    let summary = runtime.run().await?;

    if args.once {
        if let Some(outcome) = summary.last_outcome.as_ref() {
            print_outcome(outcome);
        }
        if summary.failed > 0 {
            bail!("{} run(s) failed", summary.failed);
        }
    }

    Ok(())
}

/// Simple dry-run output: print the cadence, gate and stages.
fn print_dry_run(cfg: &PipelineConfig) {
    println!("lastfriday dry-run: {}", cfg.name);
    if let Some(ref description) = cfg.description {
        println!("  description = {description}");
    }
    if let Some(ref owner) = cfg.owner {
        println!("  owner = {owner}");
    }
    if !cfg.tags.is_empty() {
        println!("  tags = {:?}", cfg.tags);
    }
    println!(
        "  schedule = {} (offset {})",
        cfg.cadence.expression(),
        cfg.cadence.offset()
    );
    println!("  gate = {}", cfg.gate.describe());
    println!("  settle_delay = {:?}", cfg.settle_delay);
    println!(
        "  triggered_while_running_behaviour = {:?}, queue_length = {}",
        cfg.triggered_while_running_behaviour, cfg.queue_length
    );
    if let Some(ref history) = cfg.history {
        println!("  history = {}", history.display());
    }
    println!();

    let chain = DependencyChain::from_config(cfg);
    println!("stages ({}), in order:", chain.stages().len());
    for (idx, stage) in chain.stages().iter().enumerate() {
        println!("  {}. {}", idx + 1, stage.name);
        println!("      run: {}", stage.runnable.describe());
        println!(
            "      retries: {} (every {:?})",
            stage.retry.max_retries, stage.retry.retry_delay
        );
        if let Some(timeout) = stage.timeout {
            println!("      timeout: {timeout:?}");
        }
    }

    debug!("dry-run complete (no execution)");
}

fn print_history(cfg: &PipelineConfig) -> Result<()> {
    let Some(path) = cfg.history.as_ref() else {
        bail!("no [pipeline].history file configured");
    };
    let outcomes = HistoryStore::new(path).load()?;
    if outcomes.is_empty() {
        println!("no recorded runs in {}", path.display());
    }
    for outcome in &outcomes {
        print_outcome(outcome);
    }
    Ok(())
}

fn print_outcome(outcome: &RunOutcome) {
    println!(
        "{} {} {:?} (gate {})",
        outcome.logical_time.to_rfc3339(),
        outcome.run_id,
        outcome.final_status,
        if outcome.gate_passed { "passed" } else { "rejected" }
    );
    for result in &outcome.stage_results {
        match result.error_detail {
            Some(ref detail) => println!(
                "    {}: {:?} after {} attempt(s): {}",
                result.stage_name, result.outcome, result.attempt_count, detail
            ),
            None => println!(
                "    {}: {:?} after {} attempt(s)",
                result.stage_name, result.outcome, result.attempt_count
            ),
        }
    }
}
