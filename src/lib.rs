// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod fs;
pub mod logging;
pub mod resource;
pub mod types;
pub mod watch;

use anyhow::{anyhow, Result};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::config::{ConfigFile, ResourceSpec};
use crate::engine::{format_state, Runtime, RuntimeEvent};
use crate::resource::HttpClientConfig;
use crate::watch::{probe, ResourceWatcher, WatchOptions};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (or ad-hoc locations from the command line)
/// - one armed watcher per resource
/// - the runtime loop that prints changes
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = resolve_config(&args)?;

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    // One agent for every HTTP resource, so they share a connection pool.
    let agent = cfg.http.build_agent()?;

    if args.once {
        return probe_once(&cfg, &agent).await;
    }

    let (rt_tx, rt_rx) = mpsc::unbounded_channel::<RuntimeEvent>();

    let mut handles = Vec::with_capacity(cfg.resources.len());
    for spec in &cfg.resources {
        let mut watcher = arm_watcher(spec.clone(), agent.clone(), cfg.http.clone()).await?;

        let tx = rt_tx.clone();
        watcher.on_change(move |change| {
            tx.send(RuntimeEvent::ResourceChanged(change.clone()))
                .map_err(|_| anyhow!("runtime event channel closed"))
        });

        handles.push(watcher.start()?);
    }

    // Ctrl-C → graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested);
        });
    }
    drop(rt_tx);

    Runtime::new(rt_rx, handles, std::io::stdout()).run().await?;
    Ok(())
}

/// Resources from the command line win over the config file; flags override
/// the per-resource watch options either way.
fn resolve_config(args: &CliArgs) -> Result<ConfigFile> {
    let mut cfg = if args.locations.is_empty() {
        let path = &args.config;
        debug!(?path, "loading config");
        load_and_validate(path)?
    } else {
        let resources = args
            .locations
            .iter()
            .map(|loc| ResourceSpec::from_location(loc, WatchOptions::default()))
            .collect();
        ConfigFile::new_unchecked(HttpClientConfig::default(), resources)
    };

    for spec in cfg.resources.iter_mut() {
        if let Some(interval) = args.poll_interval {
            spec.options.poll_interval = interval;
        }
        if let Some(n) = args.retry_attempts {
            spec.options.retry_attempts = n;
        }
    }

    Ok(cfg)
}

/// Build the resource and run the blocking initial probe off the async
/// workers.
async fn arm_watcher(
    spec: ResourceSpec,
    agent: ureq::Agent,
    http: HttpClientConfig,
) -> Result<ResourceWatcher> {
    let name = spec.name.clone();
    let watcher = tokio::task::spawn_blocking(move || {
        let resource = spec.build_resource(&agent, &http)?;
        ResourceWatcher::with_options(resource, spec.options)
    })
    .await
    .map_err(|e| anyhow!("arming watcher for resource '{name}' panicked: {e}"))?;

    Ok(watcher?)
}

async fn probe_once(cfg: &ConfigFile, agent: &ureq::Agent) -> Result<()> {
    let mut failed = 0usize;

    for spec in &cfg.resources {
        let spec = spec.clone();
        let agent = agent.clone();
        let http = cfg.http.clone();
        let name = spec.name.clone();
        let location = spec.location.clone();

        let outcome = tokio::task::spawn_blocking(move || {
            let resource = spec.build_resource(&agent, &http)?;
            probe(resource.as_ref(), spec.options.retry_attempts)
        })
        .await
        .map_err(|e| anyhow!("probing resource '{name}' panicked: {e}"))?;

        match outcome {
            Ok(state) => println!("{}", format_state(&name, &location, &state)),
            Err(err) => {
                warn!(resource = %name, error = %err, "probe failed");
                println!("{name}\t{location}\terror\t{err}");
                failed += 1;
            }
        }
    }

    info!(resources = cfg.resources.len(), failed, "probe complete");
    if failed > 0 {
        return Err(anyhow!("{failed} resource(s) could not be probed"));
    }
    Ok(())
}

fn print_dry_run(cfg: &ConfigFile) {
    println!("reswatch dry-run");
    println!("  http:");
    println!("    connect_timeout: {:?}", cfg.http.connect_timeout);
    println!("    read_timeout: {:?}", cfg.http.read_timeout);
    println!("    max_idle_connections: {}", cfg.http.max_idle_connections);
    if let Some(ref proxy) = cfg.http.proxy {
        println!("    proxy: {proxy}");
    }

    println!("  resources:");
    for spec in &cfg.resources {
        println!("    - {}", spec.name);
        println!("      location: {}", spec.location);
        println!("      kind: {:?}", spec.kind);
        println!("      poll_interval: {:?}", spec.options.poll_interval);
        println!("      retry_attempts: {}", spec.options.retry_attempts);
        println!("      poll_failure: {:?}", spec.options.failure_policy);
        if !spec.replace.is_empty() {
            let keys: Vec<_> = spec.replace.keys().collect();
            println!("      replace: {:?}", keys);
        }
    }

    debug!("dry-run complete (no resources touched)");
}
