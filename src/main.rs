// src/main.rs
use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, info_span, Instrument};

use troublemaker::{
    config::{self, Args, Settings},
    cpu_load::{self, DEFAULT_SCRIPT},
    decision,
    jitter::{OsSeedSource, SeedPair, SeededJitter},
    lifecycle::{self, Command, CommandError, LifecycleController, ProcessExit, StdProcessExit},
    metrics::MetricsRegistry,
    server::{RequestHandler, ServerBuilder},
};

#[tokio::main]
async fn main() {
    let started = Instant::now();
    let t0 = chrono::Utc::now();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("troublemaker=info")),
        )
        .init();

    let instance = uuid::Uuid::new_v4();
    let span = info_span!("troublemaker", %instance);

    if let Err(err) = run(started, t0).instrument(span).await {
        error!("{err:#}");
        std::process::exit(1);
    }
}

async fn run(started: Instant, t0: chrono::DateTime<chrono::Utc>) -> Result<()> {
    info!(t0 = %t0.to_rfc3339(), "started");

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) if !err.use_stderr() => err.exit(),
        Err(err) => {
            error!(%err, "could not parse flags");
            std::process::exit(1);
        }
    };
    let settings = config::load_settings(&args).context("could not parse flags")?;
    info!(args = ?args.command, "command line args");

    let registry = Arc::new(MetricsRegistry::new()?);
    let metrics = registry.collector();
    let exiter: Arc<dyn ProcessExit> = Arc::new(StdProcessExit);

    if settings.signals.ignore {
        lifecycle::ignore_signals(started, Some(metrics.clone()))
            .context("could not install signal handlers")?;
    }

    let seeds = SeedPair::resolve(settings.rand.seed1, settings.rand.seed2, &mut OsSeedSource);
    let effective = decision::resolve(&settings, &mut SeededJitter::new(seeds));

    info!(data = %serde_json::to_string(&settings)?, "flags");
    info!(seed1 = seeds.seed1, seed2 = seeds.seed2, "random seeds");
    info!(data = %serde_json::to_string(&effective)?, "effective settings");

    match Command::parse(&args.command) {
        Ok(None) => {}
        Ok(Some(Command::Sleep(duration))) => {
            info!(?duration, "sleep");
            tokio::time::sleep(duration).await;
            info!(code = settings.exit.code, "exit after sleep command");
            exiter.exit(settings.exit.code);
            return Ok(());
        }
        Err(CommandError::Unknown(name)) => {
            println!("unknown subcommand: {name}");
            exiter.exit(1);
            return Ok(());
        }
        Err(err) => {
            error!(%err, "invalid subcommand");
            exiter.exit(1);
            return Ok(());
        }
    }

    LifecycleController::new(settings.exit.code, exiter.clone())
        .with_metrics(metrics.clone())
        .apply(&effective);

    if settings.web.enable {
        start_web(&settings, effective.web_delay, registry, exiter.clone())?;
    }

    if settings.cpu_load.enable {
        cpu_load::spawn_workers(settings.cpu_load.workers, DEFAULT_SCRIPT, Some(metrics))
            .context("could not start cpu load workers")?;
    }

    // Everything else runs detached; only an exit ends the process.
    std::future::pending::<()>().await;
    Ok(())
}

fn start_web(
    settings: &Settings,
    delay: std::time::Duration,
    registry: Arc<MetricsRegistry>,
    exiter: Arc<dyn ProcessExit>,
) -> Result<()> {
    let addr = settings.web.bind_addr()?;
    let handler = RequestHandler::new(exiter.clone()).with_metrics(registry);

    tokio::spawn(
        async move {
            let served = ServerBuilder::new(addr)
                .with_handler(handler)
                .with_delay(delay)
                .serve()
                .await;
            if let Err(err) = served {
                error!("http listen error: {err:#}");
                exiter.exit(1);
            }
        }
        .in_current_span(),
    );

    Ok(())
}
