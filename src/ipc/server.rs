//! # IPC Server
//!
//! Unix socket server bridging the reminder engine and its clients. The
//! server doubles as the engine's [`Notifier`] and [`VoiceGateway`]: every
//! outward call becomes a broadcast [`EngineEvent`].
//!
//! - **Version**: 1.4.0
//! - **Since**: 0.2.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.4.0: New clients trigger a state replay so late attachers see the list
//! - 1.3.0: Acts as voice gateway; listening requires an attached client
//! - 1.2.0: Commands forwarded straight into the engine event channel
//! - 1.1.0: Status snapshot on GetStatus
//! - 1.0.0: Initial IPC implementation with Unix socket protocol

use anyhow::Result;
use async_trait::async_trait;
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{broadcast, mpsc, RwLock};

use crate::core::VoiceError;
use crate::engine::{Event, UiAction};
use crate::features::notify::{EngineSnapshot, Notifier, Severity};
use crate::features::voice::VoiceGateway;
use crate::ipc::protocol::{encode_message, ClientCommand, EngineEvent, MAX_MESSAGE_SIZE};

/// Maximum number of connected clients
const MAX_CLIENTS: usize = 10;

/// Broadcast channel capacity for events
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// IPC server handle for the engine
#[derive(Clone)]
pub struct IpcServer {
    socket_path: PathBuf,
    /// Broadcast sender for events to all clients
    event_tx: broadcast::Sender<EngineEvent>,
    /// Inbound side of the engine's event channel
    engine_tx: mpsc::UnboundedSender<Event>,
    /// Connected client count
    client_count: Arc<RwLock<usize>>,
}

impl IpcServer {
    /// Create a new IPC server (does not start listening yet)
    pub fn new(socket_path: impl Into<PathBuf>, engine_tx: mpsc::UnboundedSender<Event>) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        IpcServer {
            socket_path: socket_path.into(),
            event_tx,
            engine_tx,
            client_count: Arc::new(RwLock::new(0)),
        }
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Start the IPC server in a background task
    pub async fn start(self: Arc<Self>) -> Result<()> {
        // Remove stale socket file from a previous run
        if self.socket_path.exists() {
            std::fs::remove_file(&self.socket_path)?;
        }

        let listener = UnixListener::bind(&self.socket_path)?;
        info!("IPC server listening on {}", self.socket_path.display());

        let server = self.clone();
        tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, _addr)) => {
                        let Some(total) = server.try_admit().await else {
                            warn!("Maximum IPC clients reached ({}), rejecting connection", MAX_CLIENTS);
                            continue;
                        };
                        info!("Client connected (total: {})", total);

                        let server_clone = server.clone();
                        let client_count_ref = server.client_count.clone();
                        tokio::spawn(async move {
                            if let Err(e) = server_clone.handle_client(stream).await {
                                debug!("Client handler ended: {}", e);
                            }
                            *client_count_ref.write().await -= 1;
                            info!("Client disconnected");
                        });
                    }
                    Err(e) => {
                        error!("Failed to accept IPC connection: {}", e);
                    }
                }
            }
        });

        Ok(())
    }

    /// Count a new client unless the limit is reached. Returns the new total.
    async fn try_admit(&self) -> Option<usize> {
        let mut count = self.client_count.write().await;
        if *count >= MAX_CLIENTS {
            return None;
        }
        *count += 1;
        Some(*count)
    }

    /// Handle a connected client
    async fn handle_client(self: Arc<Self>, stream: UnixStream) -> Result<()> {
        let (mut reader, mut writer) = stream.into_split();

        let mut event_rx = self.event_tx.subscribe();

        // Subscribed first, so the engine's replay reaches this client
        if self
            .engine_tx
            .send(Event::UiActionInvoked(UiAction::RequestStatus))
            .is_err()
        {
            debug!("Engine stopped, no state replay for new client");
        }

        let write_handle = tokio::spawn(async move {
            loop {
                match event_rx.recv().await {
                    Ok(event) => match encode_message(&event) {
                        Ok(data) => {
                            if let Err(e) = writer.write_all(&data).await {
                                debug!("Failed to write to client: {}", e);
                                break;
                            }
                            if let Err(e) = writer.flush().await {
                                debug!("Failed to flush to client: {}", e);
                                break;
                            }
                        }
                        Err(e) => {
                            error!("Failed to encode event: {}", e);
                        }
                    },
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!("Client lagged behind by {} events", n);
                    }
                }
            }
        });

        loop {
            let mut len_buf = [0u8; 4];
            if reader.read_exact(&mut len_buf).await.is_err() {
                break;
            }
            let len = u32::from_be_bytes(len_buf) as usize;

            if len > MAX_MESSAGE_SIZE {
                error!("Message too large from client: {} bytes", len);
                break;
            }

            let mut buf = vec![0u8; len];
            if reader.read_exact(&mut buf).await.is_err() {
                break;
            }

            match serde_json::from_slice::<ClientCommand>(&buf) {
                Ok(cmd) => {
                    if !self.forward(cmd) {
                        break;
                    }
                }
                Err(e) => {
                    warn!("Failed to parse command from client: {}", e);
                    self.broadcast(EngineEvent::CommandRejected {
                        reason: format!("Unrecognised command: {e}"),
                    });
                }
            }
        }

        write_handle.abort();
        Ok(())
    }

    /// Hand a client command to the engine. Returns false once the engine
    /// has stopped accepting events.
    pub fn forward(&self, cmd: ClientCommand) -> bool {
        debug!("Client command: {:?}", cmd);
        let Some(event) = cmd.into_event() else {
            return true;
        };

        if let Err(e) = self.engine_tx.send(event) {
            error!("Failed to forward command, engine stopped: {}", e);
            self.broadcast(EngineEvent::CommandRejected {
                reason: "Reminder engine is not running".to_string(),
            });
            return false;
        }
        true
    }

    /// Broadcast an event to all connected clients
    pub fn broadcast(&self, event: EngineEvent) {
        // No receivers is not an error; nobody is watching yet
        let _ = self.event_tx.send(event);
    }

    /// Subscribe to the broadcast stream without a socket
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.event_tx.subscribe()
    }

    /// Get connected client count
    pub async fn client_count(&self) -> usize {
        *self.client_count.read().await
    }

    /// Send a heartbeat to all clients
    pub fn send_heartbeat(&self) {
        let timestamp = chrono::Utc::now().timestamp();
        self.broadcast(EngineEvent::Heartbeat { timestamp });
    }
}

#[async_trait]
impl Notifier for IpcServer {
    async fn set_status(&self, text: &str) {
        self.broadcast(EngineEvent::Status {
            text: text.to_string(),
        });
    }

    async fn append_log(&self, text: &str, severity: Severity) {
        self.broadcast(EngineEvent::Log {
            text: text.to_string(),
            severity,
        });
    }

    async fn clear_log(&self) {
        self.broadcast(EngineEvent::ClearLog);
    }

    async fn render_medications(&self, medications: &[String]) {
        self.broadcast(EngineEvent::MedicationList {
            items: medications.to_vec(),
        });
    }

    async fn report_snapshot(&self, snapshot: &EngineSnapshot) {
        self.broadcast(EngineEvent::Snapshot {
            snapshot: snapshot.clone(),
        });
    }
}

#[async_trait]
impl VoiceGateway for IpcServer {
    async fn speak(&self, text: &str) {
        self.broadcast(EngineEvent::Speak {
            text: text.to_string(),
        });
    }

    async fn cancel_speech(&self) {
        self.broadcast(EngineEvent::CancelSpeech);
    }

    async fn start_listening(&self) -> Result<(), VoiceError> {
        if self.client_count().await == 0 {
            return Err(VoiceError::NoListener);
        }
        self.broadcast(EngineEvent::StartListening);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::messages as msg;
    use crate::engine::testing::FixedClock;
    use crate::engine::ReminderEngine;
    use crate::features::medications::MedicationRegistry;
    use crate::features::reminders::timer::manual::ManualTimers;
    use chrono::NaiveDate;
    use std::time::Duration;
    use tokio::time::timeout;

    async fn read_frame(stream: &mut UnixStream) -> EngineEvent {
        let mut len_buf = [0u8; 4];
        stream.read_exact(&mut len_buf).await.unwrap();
        let mut buf = vec![0u8; u32::from_be_bytes(len_buf) as usize];
        stream.read_exact(&mut buf).await.unwrap();
        serde_json::from_slice(&buf).unwrap()
    }

    async fn wait_for_clients(server: &IpcServer, expected: usize) {
        timeout(Duration::from_secs(5), async {
            while server.client_count().await != expected {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_listening_requires_a_client() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let server = IpcServer::new("/nonexistent/voicecare.sock", tx);

        assert_eq!(server.start_listening().await, Err(VoiceError::NoListener));
    }

    #[tokio::test]
    async fn test_notifier_calls_are_broadcast() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let server = IpcServer::new("/nonexistent/voicecare.sock", tx);
        let mut events = server.subscribe();

        server.set_status("Idle (Tap mic to speak)").await;
        server.append_log("Added medication: Aspirin", Severity::Normal).await;
        server.speak("Hello").await;

        assert_eq!(
            events.recv().await.unwrap(),
            EngineEvent::Status {
                text: "Idle (Tap mic to speak)".to_string()
            }
        );
        assert_eq!(
            events.recv().await.unwrap(),
            EngineEvent::Log {
                text: "Added medication: Aspirin".to_string(),
                severity: Severity::Normal
            }
        );
        assert_eq!(
            events.recv().await.unwrap(),
            EngineEvent::Speak {
                text: "Hello".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_forward_after_engine_stopped() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let server = IpcServer::new("/nonexistent/voicecare.sock", tx);
        let mut events = server.subscribe();

        assert!(!server.forward(ClientCommand::GetStatus));
        assert!(matches!(
            events.recv().await.unwrap(),
            EngineEvent::CommandRejected { .. }
        ));
        // Pong never reaches the engine
        assert!(server.forward(ClientCommand::Pong { timestamp: 0 }));
    }

    #[tokio::test]
    async fn test_socket_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("voicecare.sock");
        let (tx, mut rx) = mpsc::unbounded_channel();
        let server = Arc::new(IpcServer::new(&path, tx));
        server.clone().start().await.unwrap();

        let mut stream = UnixStream::connect(&path).await.unwrap();
        wait_for_clients(&server, 1).await;

        let replay = timeout(Duration::from_secs(5), rx.recv()).await.unwrap();
        assert_eq!(replay, Some(Event::UiActionInvoked(UiAction::RequestStatus)));

        let frame = encode_message(&ClientCommand::AddMedication {
            name: "Aspirin".to_string(),
        })
        .unwrap();
        stream.write_all(&frame).await.unwrap();

        let event = timeout(Duration::from_secs(5), rx.recv()).await.unwrap();
        assert_eq!(
            event,
            Some(Event::UiActionInvoked(UiAction::AddMedication {
                name: "Aspirin".to_string()
            }))
        );

        assert_eq!(server.start_listening().await, Ok(()));
        assert_eq!(read_frame(&mut stream).await, EngineEvent::StartListening);

        drop(stream);
        wait_for_clients(&server, 0).await;
    }

    #[tokio::test]
    async fn test_garbage_command_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("voicecare.sock");
        let (tx, _rx) = mpsc::unbounded_channel();
        let server = Arc::new(IpcServer::new(&path, tx));
        server.clone().start().await.unwrap();

        let mut stream = UnixStream::connect(&path).await.unwrap();
        wait_for_clients(&server, 1).await;

        let body = br#"{"type":"Dance"}"#;
        stream
            .write_all(&(body.len() as u32).to_be_bytes())
            .await
            .unwrap();
        stream.write_all(body).await.unwrap();

        assert!(matches!(
            read_frame(&mut stream).await,
            EngineEvent::CommandRejected { .. }
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_admission_never_exceeds_limit() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let server = Arc::new(IpcServer::new("/nonexistent/voicecare.sock", tx));
        let barrier = Arc::new(tokio::sync::Barrier::new(MAX_CLIENTS * 2));

        let attempts: Vec<_> = (0..MAX_CLIENTS * 2)
            .map(|_| {
                let server = server.clone();
                let barrier = barrier.clone();
                tokio::spawn(async move {
                    barrier.wait().await;
                    server.try_admit().await
                })
            })
            .collect();

        let mut totals = Vec::new();
        for attempt in attempts {
            totals.extend(attempt.await.unwrap());
        }
        totals.sort_unstable();

        // Every admitted client saw a distinct total
        assert_eq!(totals, (1..=MAX_CLIENTS).collect::<Vec<_>>());
        assert_eq!(server.client_count().await, MAX_CLIENTS);
        assert_eq!(server.try_admit().await, None);
    }

    #[tokio::test]
    async fn test_late_client_receives_medication_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("voicecare.sock");
        let (tx, rx) = mpsc::unbounded_channel();
        let server = Arc::new(IpcServer::new(&path, tx.clone()));
        server.clone().start().await.unwrap();

        let now = NaiveDate::from_ymd_opt(2024, 5, 20)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let engine = ReminderEngine::new(
            MedicationRegistry::seeded(["Metformin 500mg"]),
            Arc::new(ManualTimers::new()),
            server.clone(),
            server.clone(),
            Arc::new(FixedClock::new(now)),
        );

        let mut watcher = server.subscribe();
        let engine_handle = tokio::spawn(engine.run(rx));

        // The welcome goes out before anyone is attached
        timeout(Duration::from_secs(5), async {
            while watcher.recv().await.unwrap()
                != (EngineEvent::Status {
                    text: msg::WELCOME.to_string(),
                })
            {}
        })
        .await
        .unwrap();

        let mut stream = UnixStream::connect(&path).await.unwrap();

        let first = timeout(Duration::from_secs(5), read_frame(&mut stream))
            .await
            .unwrap();
        assert_eq!(
            first,
            EngineEvent::MedicationList {
                items: vec!["Metformin 500mg".to_string()]
            }
        );
        assert_eq!(
            read_frame(&mut stream).await,
            EngineEvent::Status {
                text: msg::WELCOME.to_string()
            }
        );
        assert!(matches!(
            read_frame(&mut stream).await,
            EngineEvent::Snapshot { .. }
        ));

        tx.send(Event::Shutdown).unwrap();
        engine_handle.await.unwrap();
    }
}
