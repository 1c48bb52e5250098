//! # IPC Client
//!
//! Unix socket client used by consoles and speech clients to drive the
//! reminder engine.

use crate::ipc::protocol::{encode_message, ClientCommand, EngineEvent, MAX_MESSAGE_SIZE};
use anyhow::{anyhow, Result};
use log::{debug, error, info, warn};
use std::path::Path;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio::sync::mpsc;
use tokio::time::{timeout, Duration};

/// Connection timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Read timeout for events
const READ_TIMEOUT: Duration = Duration::from_secs(60);

/// IPC client handle
pub struct IpcClient {
    /// Event receiver channel
    event_rx: mpsc::Receiver<EngineEvent>,
    /// Command sender channel
    command_tx: mpsc::Sender<ClientCommand>,
}

impl IpcClient {
    /// Connect to the engine's IPC server
    pub async fn connect(socket_path: &Path) -> Result<Self> {
        info!("Connecting to IPC server at {}", socket_path.display());

        let stream = timeout(CONNECT_TIMEOUT, UnixStream::connect(socket_path))
            .await
            .map_err(|_| anyhow!("Connection timeout"))?
            .map_err(|e| anyhow!("Failed to connect: {}", e))?;

        info!("Connected to IPC server");

        let (event_tx, event_rx) = mpsc::channel(256);
        let (command_tx, command_rx) = mpsc::channel(64);

        tokio::spawn(async move {
            Self::connection_loop(stream, event_tx, command_rx).await;
        });

        Ok(IpcClient {
            event_rx,
            command_tx,
        })
    }

    /// Main connection loop - handles reading events and writing commands
    async fn connection_loop(
        stream: UnixStream,
        event_tx: mpsc::Sender<EngineEvent>,
        mut command_rx: mpsc::Receiver<ClientCommand>,
    ) {
        let (mut reader, mut writer) = stream.into_split();

        let write_handle = tokio::spawn(async move {
            while let Some(cmd) = command_rx.recv().await {
                match encode_message(&cmd) {
                    Ok(data) => {
                        if let Err(e) = writer.write_all(&data).await {
                            error!("Failed to write command: {}", e);
                            break;
                        }
                        if let Err(e) = writer.flush().await {
                            error!("Failed to flush command: {}", e);
                            break;
                        }
                    }
                    Err(e) => {
                        error!("Failed to encode command: {}", e);
                    }
                }
            }
        });

        loop {
            let mut len_buf = [0u8; 4];
            match timeout(READ_TIMEOUT, reader.read_exact(&mut len_buf)).await {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => {
                    if e.kind() != std::io::ErrorKind::UnexpectedEof {
                        error!("Read error: {}", e);
                    }
                    break;
                }
                Err(_) => {
                    debug!("Read timeout, connection may be idle");
                    continue;
                }
            }

            let len = u32::from_be_bytes(len_buf) as usize;

            if len > MAX_MESSAGE_SIZE {
                error!("Message too large: {} bytes", len);
                break;
            }

            let mut buf = vec![0u8; len];
            if let Err(e) = reader.read_exact(&mut buf).await {
                error!("Failed to read message body: {}", e);
                break;
            }

            match serde_json::from_slice::<EngineEvent>(&buf) {
                Ok(event) => {
                    if let EngineEvent::Heartbeat { timestamp } = &event {
                        debug!("Received heartbeat: {}", timestamp);
                    }

                    if event_tx.send(event).await.is_err() {
                        debug!("Event receiver closed");
                        break;
                    }
                }
                Err(e) => {
                    warn!("Failed to parse event: {}", e);
                }
            }
        }

        write_handle.abort();
        info!("IPC connection closed");
    }

    /// Receive an event (blocking)
    pub async fn recv(&mut self) -> Option<EngineEvent> {
        self.event_rx.recv().await
    }

    /// Send a command to the engine
    pub async fn send(&self, cmd: ClientCommand) -> Result<()> {
        self.command_tx
            .send(cmd)
            .await
            .map_err(|e| anyhow!("Failed to send command: {}", e))
    }

    pub async fn add_medication(&self, name: impl Into<String>) -> Result<()> {
        self.send(ClientCommand::AddMedication { name: name.into() })
            .await
    }

    pub async fn remove_medication(&self, index: usize) -> Result<()> {
        self.send(ClientCommand::RemoveMedication { index }).await
    }

    pub async fn start_reminder(&self, time: impl Into<String>) -> Result<()> {
        self.send(ClientCommand::StartReminder { time: time.into() })
            .await
    }

    /// Enter setup mode and dictate a medication
    pub async fn add_medication_by_voice(&self) -> Result<()> {
        self.send(ClientCommand::AddMedicationByVoice).await
    }

    /// Listen for the patient's reply to a reminder
    pub async fn respond_to_reminder(&self) -> Result<()> {
        self.send(ClientCommand::RespondToReminder).await
    }

    /// Report a final recognition transcript
    pub async fn transcript(&self, text: impl Into<String>) -> Result<()> {
        self.send(ClientCommand::Transcript { text: text.into() })
            .await
    }

    /// Report a recognition failure by class, e.g. `no-speech`
    pub async fn recognition_error(&self, error: impl Into<String>) -> Result<()> {
        self.send(ClientCommand::RecognitionError {
            error: error.into(),
        })
        .await
    }

    pub async fn recognition_ended(&self) -> Result<()> {
        self.send(ClientCommand::RecognitionEnded).await
    }

    /// Request engine status
    pub async fn request_status(&self) -> Result<()> {
        self.send(ClientCommand::GetStatus).await
    }

    /// Answer a heartbeat
    pub async fn pong(&self, timestamp: i64) -> Result<()> {
        self.send(ClientCommand::Pong { timestamp }).await
    }
}

/// Try to connect with retries
pub async fn connect_with_retry(
    socket_path: &Path,
    max_attempts: u32,
    delay: Duration,
) -> Result<IpcClient> {
    let mut attempt = 1;
    loop {
        match IpcClient::connect(socket_path).await {
            Ok(client) => return Ok(client),
            Err(e) if attempt < max_attempts => {
                warn!(
                    "Connection attempt {} failed: {}. Retrying in {:?}...",
                    attempt, e, delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                return Err(anyhow!(
                    "Failed to connect after {} attempts: {}",
                    attempt,
                    e
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Event, UiAction};
    use crate::ipc::IpcServer;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_connect_to_missing_socket_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.sock");

        let result = connect_with_retry(&path, 2, Duration::from_millis(10)).await;
        assert!(result
            .err()
            .unwrap()
            .to_string()
            .contains("after 2 attempts"));
    }

    #[tokio::test]
    async fn test_client_server_exchange() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("voicecare.sock");
        let (tx, mut rx) = mpsc::unbounded_channel();
        let server = Arc::new(IpcServer::new(&path, tx));
        server.clone().start().await.unwrap();

        let mut client = IpcClient::connect(&path).await.unwrap();

        // Every new connection first asks the engine to replay its state
        let replay = timeout(Duration::from_secs(5), rx.recv()).await.unwrap();
        assert_eq!(replay, Some(Event::UiActionInvoked(UiAction::RequestStatus)));

        client.start_reminder("07:45").await.unwrap();
        client.transcript("done").await.unwrap();

        let first = timeout(Duration::from_secs(5), rx.recv()).await.unwrap();
        assert_eq!(
            first,
            Some(Event::UiActionInvoked(UiAction::StartReminder {
                time: "07:45".to_string()
            }))
        );
        let second = timeout(Duration::from_secs(5), rx.recv()).await.unwrap();
        assert_eq!(second, Some(Event::TranscriptReceived("done".to_string())));

        server.send_heartbeat();

        let event = timeout(Duration::from_secs(5), client.recv()).await.unwrap();
        assert!(matches!(event, Some(EngineEvent::Heartbeat { .. })));
    }
}
