//! Fairqueue - bounded fair request scheduler
//!
//! CLI entry point for driving synthetic load through the scheduler.

use clap::{CommandFactory, Parser};
use eyre::{Context, Result};
use tracing::info;

use fairqueue::cli::{Cli, Command, OutputFormat};
use fairqueue::config::Config;
use fairqueue::scheduler::Scheduler;
use fairqueue::workload;

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    match cli.command {
        Some(Command::Run {
            ops,
            op_delay_ms,
            fail_percent,
            max_concurrent,
            max_queue_size,
            timeout_ms,
            format,
        }) => {
            let mut config = config;
            if let Some(ops) = ops {
                config.workload.ops = ops;
            }
            if let Some(delay) = op_delay_ms {
                config.workload.op_delay_ms = delay;
            }
            if let Some(fail) = fail_percent {
                config.workload.fail_percent = fail;
            }
            if let Some(max) = max_concurrent {
                config.scheduler.max_concurrent = max;
            }
            if let Some(size) = max_queue_size {
                config.scheduler.max_queue_size = size;
            }
            if let Some(timeout) = timeout_ms {
                config.scheduler.request_timeout_ms = timeout;
            }
            config.validate()?;

            cmd_run(&config, format).await
        }
        None => {
            Cli::command().print_help()?;
            println!();
            Ok(())
        }
    }
}

/// Run one synthetic burst against a freshly constructed scheduler
async fn cmd_run(config: &Config, format: OutputFormat) -> Result<()> {
    let scheduler = Scheduler::new(config.scheduler.clone());
    info!(
        max_concurrent = config.scheduler.max_concurrent,
        max_queue_size = config.scheduler.max_queue_size,
        request_timeout_ms = config.scheduler.request_timeout_ms,
        "scheduler initialized"
    );

    let report = workload::run_burst(&scheduler, &config.workload).await;
    let stats = scheduler.stats().await;
    scheduler.shutdown().await;

    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({ "report": report, "stats": stats });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            println!("Burst Report");
            println!("------------");
            println!("Submitted: {}", report.submitted);
            println!("  Succeeded: {}", report.succeeded);
            println!("  Failed:    {}", report.failed);
            println!("  Evicted:   {}", report.evicted);
            println!("  Timed out: {}", report.timed_out);
            println!("  Shut down: {}", report.shut_down);
            println!();
            println!("Peak concurrent:  {}", stats.peak_concurrent);
            println!("Peak queue depth: {}", stats.peak_queue_depth);
        }
    }

    Ok(())
}
