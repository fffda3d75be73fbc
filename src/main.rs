use anyhow::Result;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use whitelist_sync::command::Command;
use whitelist_sync::config::Config;
use whitelist_sync::engine::{ReloadTimer, Source};
use whitelist_sync::executor::HostQueue;
use whitelist_sync::init::{build_reloader, setup_logging};
use whitelist_sync::registry::NameRegistry;
use whitelist_sync::stats::StatsCollector;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load Config
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or("whitelist-sync.toml".to_string());
    let config_exists = std::path::Path::new(&config_path).exists();
    let config = if config_exists {
        Config::load(&config_path).await?
    } else {
        Config::default()
    };

    // 2. Setup Logging
    setup_logging(&config);
    info!("Starting whitelist-sync...");
    if !config_exists {
        info!("Config file {} not found, using defaults.", config_path);
    }

    // 3. Init Stats
    let stats = StatsCollector::new(config.stats.log_interval_seconds);

    // 4. Host loop queue & name registry
    let (executor, mut host_queue) = HostQueue::channel();
    let registry = Arc::new(NameRegistry::default());

    // 5. Build Reloader
    let reloader = build_reloader(
        &config,
        registry.clone(),
        Arc::new(executor),
        stats.clone(),
    )?;
    let sources: Arc<[Source]> = config.sources().into();
    let cache_ttl = config.cache_ttl();

    // 6. Admin commands from stdin
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<Command>(8);
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if line.trim().is_empty() {
                continue;
            }
            match Command::parse_line(&line) {
                Ok(cmd) => {
                    if cmd_tx.send(cmd).await.is_err() {
                        break;
                    }
                }
                Err(e) => println!("{}", e),
            }
        }
    });

    // 7. Host tick loop
    let mut timer = ReloadTimer::new(config.reload.auto_reload, config.reload_interval_ticks());
    let mut ticker = tokio::time::interval(config.tick_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let shutdown = signal::ctrl_c();
    tokio::pin!(shutdown);

    info!(
        "Host loop running (auto reload: {}, every {:?})",
        config.reload.auto_reload,
        config.reload_interval()
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                host_queue.run_pending();
                if timer.tick() {
                    reloader.reload(sources.clone(), cache_ttl, None);
                }
            }
            Some(cmd) = cmd_rx.recv() => match cmd {
                Command::Reload => {
                    println!("Reloading whitelists...");
                    let started = reloader.reload(
                        sources.clone(),
                        cache_ttl,
                        Some(Box::new(|registered| {
                            println!("Reloaded whitelists - registered {} names.", registered);
                        })),
                    );
                    if !started {
                        warn!("Reload requested while another reload is running, ignored");
                    }
                }
                Command::Status => {
                    println!("{}", serde_json::to_string_pretty(&stats.snapshot())?);
                    println!("Registry holds {} names.", registry.len());
                }
                Command::Spawn => match registry.spawn_next() {
                    Some(name) => println!("Spawned {}.", name),
                    None => println!("No whitelisted name left to spawn."),
                },
            },
            _ = &mut shutdown => {
                info!("Shutdown signal received.");
                break;
            }
        }
    }

    Ok(())
}
