use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::OnceLock,
    time::{Duration, Instant},
};

use anyhow::Context;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
    time::MissedTickBehavior,
};
use tracing::{debug, info, warn};

use thermoclock_common::{Board, Controller, ControllerEvent, RuntimeConfig};

use crate::sim::{ButtonCommand, SimBoard};

const DEFAULT_CONFIG_PATH: &str = "./thermoclock.json";

pub async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let path = config_path();
    let mut runtime = load_runtime_config(&path).await.unwrap_or_else(|err| {
        warn!("failed to load runtime config from {}: {err:#}", path.display());
        RuntimeConfig::default()
    });
    runtime.sanitize();
    if let Err(err) = runtime.validate() {
        warn!("invalid runtime config in {}, using defaults: {err}", path.display());
        runtime = RuntimeConfig::default();
    }
    if let Some(tick_ms) = tick_override(std::env::var("THERMOCLOCK_TICK_MS").ok().as_deref()) {
        runtime.tick_ms = tick_ms;
    }

    let mut controller =
        Controller::from_config(&runtime.controller).context("invalid calibration")?;
    let mut board = SimBoard::new(&runtime, *controller.calibration());

    let (commands_tx, mut commands) = mpsc::channel(32);
    spawn_stdin_reader(commands_tx);

    let mut ticker = tokio::time::interval(Duration::from_millis(runtime.tick_ms));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut status_timer =
        tokio::time::interval(Duration::from_millis(runtime.status_interval_ms));
    status_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!(
        "controller running: tick {}ms, clock starts at {}, target {}F",
        runtime.tick_ms, runtime.clock_epoch, runtime.controller.default_target
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let now_ms = monotonic_ms();
                board.begin_tick(now_ms);
                let report = controller.tick(&mut board, now_ms);
                log_events(&report.events);
                if let Some(rows) = board.take_changed_frame() {
                    println!("{}", format_frame(rows));
                }
            }
            Some(command) = commands.recv() => {
                debug!("button command: {command:?}");
                board.queue(command);
            }
            _ = status_timer.tick() => {
                let Some(status) = controller.status() else {
                    continue;
                };
                match serde_json::to_string(&status) {
                    Ok(body) => info!(room_f = board.room_temp_f(), "status {body}"),
                    Err(err) => warn!("status serialization failed: {err}"),
                }
            }
            result = &mut shutdown => {
                if let Err(err) = result {
                    warn!("ctrl-c handler failed: {err}");
                }
                break;
            }
        }
    }

    board.write_heater(false);
    info!("controller stopped, heater off");
    Ok(())
}

fn config_path() -> PathBuf {
    std::env::var("THERMOCLOCK_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}

async fn load_runtime_config(path: &Path) -> anyhow::Result<RuntimeConfig> {
    match tokio::fs::read(path).await {
        Ok(raw) => Ok(RuntimeConfig::from_json_slice(&raw)?),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(RuntimeConfig::default()),
        Err(err) => Err(err.into()),
    }
}

fn tick_override(value: Option<&str>) -> Option<u64> {
    let value = value?.trim();
    match value.parse::<u64>() {
        Ok(tick_ms) if tick_ms > 0 => Some(tick_ms),
        _ => {
            warn!("ignoring THERMOCLOCK_TICK_MS={value:?}");
            None
        }
    }
}

fn spawn_stdin_reader(commands: mpsc::Sender<ButtonCommand>) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    match line.parse::<ButtonCommand>() {
                        Ok(command) => {
                            if commands.send(command).await.is_err() {
                                break;
                            }
                        }
                        Err(err) => warn!("{err:#}"),
                    }
                }
                Ok(None) => {
                    debug!("stdin closed, no more button input");
                    break;
                }
                Err(err) => {
                    warn!("stdin read failed: {err}");
                    break;
                }
            }
        }
    });
}

fn log_events(events: &[ControllerEvent]) {
    for event in events {
        match event {
            ControllerEvent::ModeChanged { from, to } => {
                info!("mode {} -> {}", from.as_str(), to.as_str());
            }
            ControllerEvent::TargetChanged { from, to } => info!("target {from}F -> {to}F"),
            ControllerEvent::ClockAdjusted { delta_seconds } => {
                info!("clock adjusted by {delta_seconds:+}s");
            }
            ControllerEvent::HeaterSwitched { on } => {
                info!("heater {}", if *on { "ON" } else { "OFF" });
            }
        }
    }
}

fn format_frame(rows: &[String; 2]) -> String {
    let width = rows.iter().map(|row| row.chars().count()).max().unwrap_or(0);
    let border = format!("+{}+", "-".repeat(width));
    format!("{border}\n|{}|\n|{}|\n{border}", rows[0], rows[1])
}

fn monotonic_ms() -> u64 {
    static START: OnceLock<Instant> = OnceLock::new();
    START
        .get_or_init(Instant::now)
        .elapsed()
        .as_millis()
        .try_into()
        .unwrap_or(u64::MAX)
}
