//! lockscope: live viewer and driver for the deadlock-detection backend.
//!
//! Usage:
//!   # Follow the state stream, rewriting an SVG of the graph on every snapshot
//!   lockscope watch --svg graph.svg
//!
//!   # One-shot state poll
//!   lockscope state --json
//!
//!   # Drive the backend
//!   lockscope resource create R1 --instances 2
//!   lockscope process create worker --resource 1
//!   lockscope process request 1 1
//!   lockscope scenario run simple-deadlock --svg deadlock.svg
//!
//! Logs go to stderr; set `RUST_LOG=lockscope_client=debug` for stream detail.

mod config;
mod output;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use lockscope_client::{
    CommandClient, Endpoints, StateUpdate, UpdateCause, spawn_reconnector, spawn_ws_store,
};
use lockscope_types::{Scenario, ServerEvent, SystemSnapshot};
use lockscope_view::{GraphRenderer, Size};
use tokio::sync::broadcast;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

#[derive(Parser, Debug)]
#[command(name = "lockscope", version)]
#[command(about = "Live view of a resource-allocation / deadlock-detection backend")]
struct Args {
    /// Config file (default: <config dir>/lockscope/config.ron)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL, overriding the config file
    #[arg(long, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Follow the live state stream
    Watch {
        /// Rewrite this SVG file on every snapshot
        #[arg(long)]
        svg: Option<PathBuf>,
        /// Exit after this many snapshots
        #[arg(long)]
        max_updates: Option<usize>,
    },
    /// Fetch the current state once
    State {
        #[arg(long)]
        svg: Option<PathBuf>,
        /// Print the raw snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    #[command(subcommand)]
    Process(ProcessCommand),
    #[command(subcommand)]
    Resource(ResourceCommand),
    /// Clear all processes and resources
    Reset,
    #[command(subcommand)]
    Scenario(ScenarioCommand),
}

#[derive(Subcommand, Debug)]
enum ProcessCommand {
    /// Create a process, optionally requesting resources up front
    Create {
        name: String,
        /// Resource ids to request (repeat or comma-separate)
        #[arg(long = "resource", value_delimiter = ',')]
        resources: Vec<u64>,
    },
    /// Ask for one instance of a resource
    Request { process_id: u64, resource_id: u64 },
    /// Give back one instance of a resource
    Release { process_id: u64, resource_id: u64 },
}

#[derive(Subcommand, Debug)]
enum ResourceCommand {
    Create {
        name: String,
        #[arg(long, default_value_t = 1)]
        instances: u32,
    },
}

#[derive(Subcommand, Debug)]
enum ScenarioCommand {
    /// List canned scenarios
    List,
    /// Reset the backend and set up a scenario
    Run {
        name: Scenario,
        #[arg(long)]
        svg: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let mut config = Config::load(args.config.as_deref())?;
    if let Some(server) = args.server {
        config.server.base_url = server;
    }
    let endpoints = Endpoints::from_base(&config.server.base_url)
        .with_context(|| format!("bad server URL {:?}", config.server.base_url))?;

    match args.command {
        Command::Watch { svg, max_updates } => {
            watch(&config, &endpoints, svg.as_deref(), max_updates).await
        }
        Command::State { svg, json } => {
            let client = CommandClient::new(endpoints)?;
            let snapshot = client.fetch_state().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                println!("{}", output::snapshot_line(&snapshot));
            }
            write_svg_if(svg.as_deref(), &snapshot, config.canvas.size())
        }
        Command::Process(cmd) => {
            let client = CommandClient::new(endpoints)?;
            match cmd {
                ProcessCommand::Create { name, resources } => {
                    let created = client.create_process(&name, &resources).await?;
                    println!("process {} {}", created.process_id, created.status);
                }
                ProcessCommand::Request {
                    process_id,
                    resource_id,
                } => {
                    let outcome = client.request_resource(process_id, resource_id).await?;
                    println!("{}", output::outcome_line(&outcome));
                }
                ProcessCommand::Release {
                    process_id,
                    resource_id,
                } => {
                    let ack = client.release_resource(process_id, resource_id).await?;
                    println!("{}", ack.status);
                }
            }
            Ok(())
        }
        Command::Resource(ResourceCommand::Create { name, instances }) => {
            let client = CommandClient::new(endpoints)?;
            let created = client.create_resource(&name, instances).await?;
            println!("resource {} {}", created.resource_id, created.status);
            Ok(())
        }
        Command::Reset => {
            CommandClient::new(endpoints)?.reset().await?;
            println!("reset");
            Ok(())
        }
        Command::Scenario(ScenarioCommand::List) => {
            for scenario in Scenario::all() {
                println!("{:<16} {}", scenario.to_string(), scenario.title());
                println!("{:<16} {}", "", scenario.description());
            }
            Ok(())
        }
        Command::Scenario(ScenarioCommand::Run { name, svg }) => {
            let client = CommandClient::new(endpoints)?;
            let run = client.run_scenario(name).await?;
            println!("{}", output::scenario_line(name, &run.report));
            println!("{}", output::snapshot_line(&run.snapshot));
            if run.report.deadlock_detected != name.expects_deadlock() {
                warn!(scenario = %name, "backend result differs from the scenario's expectation");
            }
            write_svg_if(svg.as_deref(), &run.snapshot, config.canvas.size())
        }
    }
}

/// Stream state until interrupted, the update budget runs out, or the
/// backend stays unreachable past the retry budget.
async fn watch(
    config: &Config,
    endpoints: &Endpoints,
    svg: Option<&Path>,
    max_updates: Option<usize>,
) -> Result<()> {
    let policy = config.reconnect.policy();
    let canvas = config.canvas.size();
    if svg.is_some() {
        check_canvas(canvas)?;
    }
    let renderer = GraphRenderer::default();

    let handle = spawn_ws_store(endpoints);
    let mut updates = handle.subscribe().await?;
    let events = handle.subscribe_events().await?;
    let supervisor = spawn_reconnector(handle.clone(), policy).await?;
    let printer = tokio::spawn(print_events(events));

    info!(url = %endpoints.stream_url(), "watching state stream");
    handle.connect()?;

    let mut snapshots = 0usize;
    let result = loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break Ok(());
            }
            update = updates.recv() => {
                let Some(update) = update else { break Ok(()) };
                if let Some(line) = output::update_line(&update) {
                    println!("{line}");
                }
                match &update.cause {
                    UpdateCause::Snapshot => {
                        if let (Some(path), Some(snapshot)) = (svg, &update.state.latest_snapshot) {
                            let scene = renderer.render(snapshot, canvas);
                            if let Err(e) = std::fs::write(path, scene.to_svg())
                                .with_context(|| format!("writing {}", path.display()))
                            {
                                break Err(e);
                            }
                        }
                        snapshots += 1;
                        if max_updates.is_some_and(|max| snapshots >= max) {
                            break Ok(());
                        }
                    }
                    _ if retries_exhausted(&update, policy.max_retries) => {
                        break Err(anyhow::anyhow!(
                            "state stream unreachable after {} retries",
                            update.state.retry_count
                        ));
                    }
                    _ => {}
                }
            }
        }
    };

    supervisor.stop().await;
    handle.shutdown().await?;
    printer.abort();
    result
}

/// Whether the reconnect supervisor has given up after `update`.
fn retries_exhausted(update: &StateUpdate, max_retries: u32) -> bool {
    match &update.cause {
        UpdateCause::ConnectFailed { .. } => update.state.retry_count >= max_retries,
        // A lost connection restarts the budget, so only an empty one stops here.
        UpdateCause::ConnectionLost { .. } => max_retries == 0,
        _ => false,
    }
}

fn check_canvas(canvas: Size) -> Result<()> {
    if canvas.width <= 0.0 || canvas.height <= 0.0 {
        bail!("canvas size must be positive, got {}x{}", canvas.width, canvas.height);
    }
    Ok(())
}

async fn print_events(mut events: broadcast::Receiver<ServerEvent>) {
    loop {
        match events.recv().await {
            Ok(ServerEvent::DeadlockResolved { victim }) => {
                println!("deadlock resolved: terminated {victim}");
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(skipped = n, "event printer lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

fn write_svg_if(path: Option<&Path>, snapshot: &SystemSnapshot, canvas: Size) -> Result<()> {
    let Some(path) = path else { return Ok(()) };
    check_canvas(canvas)?;
    let scene = GraphRenderer::default().render(snapshot, canvas);
    std::fs::write(path, scene.to_svg()).with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), "wrote graph");
    Ok(())
}
