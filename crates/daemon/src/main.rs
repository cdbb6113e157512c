// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent Orchestrator Daemon (`aod`).
//!
//! Background process that owns the reconciliation loop and exposes the
//! Session Manager over a Unix socket. Normally started by the `ao` CLI;
//! not meant to be run directly by a human.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

use ao_daemon::lifecycle::{self, Config, LifecycleError};
use ao_daemon::Listener;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" => {
                println!("aod {}", ao_daemon::PROTOCOL_VERSION);
                return Ok(());
            }
            "--help" | "-h" => {
                println!("aod {}", ao_daemon::PROTOCOL_VERSION);
                println!("Agent Orchestrator daemon - owns the reconciliation loop");
                println!();
                println!("USAGE:\n    aod");
                println!();
                println!("Normally started by the `ao` CLI; listens on a Unix socket.");
                return Ok(());
            }
            other => {
                eprintln!("error: unexpected argument '{other}'");
                std::process::exit(1);
            }
        }
    }

    let _log_guard = setup_logging();

    let config = Config::load()?;
    info!(state_dir = %config.state_dir.display(), "starting daemon");

    let (daemon, unix_listener) = match lifecycle::startup(&config).await {
        Ok(r) => r,
        Err(LifecycleError::LockFailed(path)) => {
            eprintln!("aod is already running (lock held on {})", path.display());
            std::process::exit(1);
        }
        Err(e) => {
            error!(error = %e, "failed to start daemon");
            return Err(e.into());
        }
    };

    let manager = daemon.manager.clone();
    let listener = Listener::new(unix_listener, manager.clone(), daemon.start_time);
    tokio::spawn(listener.run());

    let poll_interval = config.poll_interval;
    let poll_manager = manager.clone();
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(poll_interval);
        loop {
            tick.tick().await;
            poll_manager.poll().await;
        }
    });

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    info!(socket = %config.socket_path.display(), "daemon ready");
    println!("READY");

    tokio::select! {
        _ = sigterm.recv() => info!("received SIGTERM"),
        _ = sigint.recv() => info!("received SIGINT"),
    }

    info!("shutting down");
    lifecycle::shutdown(&config);
    Ok(())
}

fn setup_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_from_env("AO_LOG")
        .or_else(|_| EnvFilter::try_from_env("RUST_LOG"))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let state_dir = ao_daemon::env::state_dir().ok();
    if let Some(dir) = state_dir {
        let _ = std::fs::create_dir_all(&dir);
        let appender = tracing_appender::rolling::never(&dir, "daemon.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(non_blocking)
            .with_ansi(false)
            .init();
        Some(guard)
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
        None
    }
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
