//! CLI host for nudge.
//!
//! 実機の代わりにこのバイナリがホストになり、lifecycle の変化と
//! 「Schedule Notification (30s)」ボタンを再現します。

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use nudge_core::app::{
    AppBuilder, ControllerStatus, RunningApp, drain_events, ensure_permission,
};
use nudge_core::config::NudgeConfig;
use nudge_core::domain::{ArmingEvent, LifecycleState, PermissionStatus};
use nudge_core::impls::{
    DeliveredNotification, InMemoryScheduler, ScriptedLifecycle, StaticPermissions,
};
use nudge_core::observability::init_tracing;
use serde::Serialize;
use tokio::time::sleep;
use tracing::{info, warn};

/// Local notification arming demo.
#[derive(Parser)]
#[command(name = "nudge", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Schedule a one-off notification and wait for it to arrive.
    Schedule {
        /// Override the configured manual delay.
        #[arg(long)]
        delay_secs: Option<u64>,
    },

    /// Drive the app through lifecycle states. The first state is the state at launch.
    Simulate {
        #[arg(required = true, num_args = 1..)]
        states: Vec<LifecycleState>,

        /// Pause between lifecycle events.
        #[arg(long, default_value_t = 500)]
        step_ms: u64,

        /// Override the configured arming delay.
        #[arg(long)]
        delay_secs: Option<u64>,

        /// Permission reported by the platform.
        #[arg(long, default_value = "granted")]
        permission: PermissionStatus,
    },

    /// Run the startup permission check.
    Permissions {
        #[arg(long, default_value = "undetermined")]
        status: PermissionStatus,

        /// Answer given when the permission is requested.
        #[arg(long, default_value = "granted")]
        on_request: PermissionStatus,
    },

    /// Print the effective configuration as TOML.
    Config,
}

#[derive(Serialize)]
struct SimulationReport {
    status: ControllerStatus,
    delivered: Vec<DeliveredNotification>,
    events: Vec<ArmingEvent>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing("nudge_core=info,nudge=info");

    let cli = Cli::parse();

    let config = if let Some(ref path) = cli.config {
        NudgeConfig::from_file(path)?
    } else {
        NudgeConfig::default()
    };

    match cli.command {
        Command::Schedule { delay_secs } => run_schedule(config, delay_secs).await,
        Command::Simulate {
            states,
            step_ms,
            delay_secs,
            permission,
        } => run_simulate(config, states, step_ms, delay_secs, permission).await,
        Command::Permissions { status, on_request } => run_permissions(status, on_request).await,
        Command::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

async fn run_schedule(mut config: NudgeConfig, delay_secs: Option<u64>) -> anyhow::Result<()> {
    if let Some(secs) = delay_secs {
        config.manual_delay_secs = secs;
    }
    let delay = config.manual_delay();

    let scheduler = Arc::new(InMemoryScheduler::new());
    let mut delivered = scheduler.subscribe_delivered();
    let app = AppBuilder::new()
        .scheduler(scheduler.clone())
        .permissions(Arc::new(StaticPermissions::granted()))
        .lifecycle(Arc::new(ScriptedLifecycle::new(LifecycleState::Active)))
        .config(config)
        .build()?
        .start()
        .await;

    let handle = app.schedule_manual().await?;
    println!(
        "Notification Scheduled: you will receive a notification in {} seconds! ({handle})",
        delay.as_secs()
    );

    let notification = delivered.recv().await?;
    println!("{}", serde_json::to_string_pretty(&notification)?);

    app.shutdown().await?;
    Ok(())
}

async fn run_simulate(
    mut config: NudgeConfig,
    states: Vec<LifecycleState>,
    step_ms: u64,
    delay_secs: Option<u64>,
    permission: PermissionStatus,
) -> anyhow::Result<()> {
    if let Some(secs) = delay_secs {
        config.arming_delay_secs = secs;
    }
    let arming_delay = config.arming_delay();

    let mut states = states.into_iter();
    let initial = states.next().unwrap_or(LifecycleState::Active);

    let scheduler = Arc::new(InMemoryScheduler::new());
    let lifecycle = Arc::new(ScriptedLifecycle::new(initial));
    let app = AppBuilder::new()
        .scheduler(scheduler.clone())
        .permissions(Arc::new(StaticPermissions::new(permission, permission)))
        .lifecycle(lifecycle.clone())
        .config(config)
        .build()?
        .start()
        .await;
    alert_if_denied(&app);

    let mut events = app.events();
    let mut status = app.watch_status();
    let mut sent = 0;
    for next in states {
        info!(%next, "host reports lifecycle change");
        lifecycle.set(next).await;
        sent += 1;
        sleep(Duration::from_millis(step_ms)).await;
    }
    status.wait_for(|s| s.counts.transitions >= sent).await?;

    // まだ armed なら配信まで待つ
    if app.status().armed.is_some() {
        info!(delay = ?arming_delay, "waiting for the armed notification");
        sleep(arming_delay + Duration::from_millis(100)).await;
    }

    let report = SimulationReport {
        status: app.status(),
        delivered: scheduler.delivered().await,
        events: drain_events(&mut events),
    };
    app.shutdown().await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn run_permissions(
    status: PermissionStatus,
    on_request: PermissionStatus,
) -> anyhow::Result<()> {
    let service = StaticPermissions::new(status, on_request);
    let granted = ensure_permission(&service).await?;
    println!("notification permission: {granted}");
    Ok(())
}

fn alert_if_denied(app: &RunningApp) {
    if let Some(alert) = app.permission_alert() {
        warn!(status = %app.permission(), "continuing without notification permission");
        eprintln!("{alert}");
    }
}
