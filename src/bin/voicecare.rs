use anyhow::Result;
use dotenvy::dotenv;
use log::{error, info};
use std::sync::Arc;
use tokio::sync::mpsc;

use voicecare::core::Config;
use voicecare::engine::{Event, ReminderEngine, SystemClock};
use voicecare::features::medications::MedicationRegistry;
use voicecare::features::reminders::TokioTimers;
use voicecare::ipc::IpcServer;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting VoiceCare reminder engine...");

    let (event_tx, event_rx) = mpsc::unbounded_channel::<Event>();

    let ipc_server = Arc::new(IpcServer::new(&config.socket_path, event_tx.clone()));
    if let Err(e) = ipc_server.clone().start().await {
        error!("Failed to start IPC server: {e}. No console or speech client can attach.");
    } else {
        info!("📡 IPC server started on {}", config.socket_path);
    }

    // Spawn IPC heartbeat task
    let heartbeat_ipc = ipc_server.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(30));
        loop {
            interval.tick().await;
            heartbeat_ipc.send_heartbeat();
        }
    });

    let timers = Arc::new(TokioTimers::new(event_tx.clone()));
    let registry = MedicationRegistry::seeded(&config.medications);
    info!(
        "Loaded {} medication(s); default reminder time {}",
        registry.len(),
        config.reminder_time
    );

    let engine = ReminderEngine::new(
        registry,
        timers,
        ipc_server.clone(),
        ipc_server.clone(),
        Arc::new(SystemClock),
    );
    let engine_handle = tokio::spawn(engine.run(event_rx));

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested, cancelling reminders...");
    if event_tx.send(Event::Shutdown).is_err() {
        error!("Reminder engine already stopped");
    }
    engine_handle.await?;

    if let Err(e) = std::fs::remove_file(&config.socket_path) {
        error!("Failed to remove IPC socket {}: {e}", config.socket_path);
    }
    info!("VoiceCare stopped");
    Ok(())
}
