use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::Parser;
use commands::Command;
use config::get_config;
use engine::Engine;
use fullscreen::{FullscreenWatch, Monitors};
use futures::StreamExt;
use log::{info, warn};
use session::GnomeSession;
use tokio::io::{AsyncBufReadExt, BufReader};
use zbus::zvariant::OwnedObjectPath;

mod cause;
mod commands;
mod config;
mod delayed;
mod engine;
mod fullscreen;
mod pending;
mod registry;
mod session;
mod signals;

/// Keeps the GNOME session from suspending while forced on or while a window
/// is fullscreen. Reads `toggle`, `fullscreen <monitor> on|off`, `status` and
/// `quit` from stdin.
#[derive(Parser)]
#[clap(name = "inhibit-suspend", version)]
struct Cli {
    /// Config file to read instead of the per-user one.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Do not inhibit while a monitor is fullscreen.
    #[arg(long)]
    no_fullscreen: bool,

    /// Start with a user-forced inhibition.
    #[arg(long)]
    force: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = get_config(cli.config.as_deref()).context("Could not load configuration")?;

    let connection = zbus::Connection::session()
        .await
        .context("Could not connect to session bus! Is d-bus running?")?;
    let session = GnomeSession::new(&connection, &config.reason, config.flags)
        .await
        .context("Could not reach org.gnome.SessionManager")?;
    let mut added = session.manager().receive_inhibitor_added().await?;
    let mut removed = session.manager().receive_inhibitor_removed().await?;

    let engine = Engine::new(Arc::new(session));
    engine
        .connect_enable(|| {
            info!("indicator shown");
            println!("enabled");
        })
        .await;
    engine
        .connect_disable(|| {
            info!("indicator hidden");
            println!("disabled");
        })
        .await;

    let monitors = Arc::new(Monitors::new(config.monitors));
    let mut watch = (config.watch_fullscreen && !cli.no_fullscreen).then(|| {
        FullscreenWatch::new(engine.clone(), monitors.clone(), config.fullscreen_delay())
    });

    if cli.force {
        engine.toggle_clicked().await;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            Some(signal) = added.next() => {
                match signal.args() {
                    Ok(args) => {
                        let object = OwnedObjectPath::from(args.id().clone());
                        let engine = engine.clone();
                        tokio::spawn(async move { engine.on_inhibitor_added(object).await });
                    }
                    Err(err) => warn!("Malformed InhibitorAdded: {err}"),
                }
            }
            Some(signal) = removed.next() => {
                match signal.args() {
                    Ok(args) => {
                        let object = OwnedObjectPath::from(args.id().clone());
                        let engine = engine.clone();
                        tokio::spawn(async move { engine.on_inhibitor_removed(object).await });
                    }
                    Err(err) => warn!("Malformed InhibitorRemoved: {err}"),
                }
            }
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(err) => {
                        warn!("Could not read stdin: {err}");
                        break;
                    }
                };
                match Command::parse(&line) {
                    Some(Command::Toggle) => {
                        let engine = engine.clone();
                        tokio::spawn(async move { engine.toggle_clicked().await });
                    }
                    Some(Command::Fullscreen { monitor, on }) => {
                        if !monitors.set_fullscreen(monitor, on) {
                            println!("unknown monitor: {monitor}");
                            continue;
                        }
                        if let Some(watch) = watch.as_mut() {
                            watch.on_fullscreen_changed().await;
                        }
                    }
                    Some(Command::Status) => {
                        let status = engine.status().await;
                        println!(
                            "active={} checked={} records={} pending={}",
                            status.active,
                            status.checked,
                            status.records,
                            status
                                .pending
                                .map(|cause| cause.to_string())
                                .unwrap_or_else(|| "none".to_string()),
                        );
                    }
                    Some(Command::Quit) => break,
                    None => {
                        if !line.trim().is_empty() {
                            println!("unknown command: {}", line.trim());
                        }
                    }
                }
            }
            _ = &mut ctrl_c => break,
            else => break,
        }
    }

    drop(watch);
    if engine.is_active().await {
        engine.release_all().await;
    }
    engine.shutdown().await;
    Ok(())
}
