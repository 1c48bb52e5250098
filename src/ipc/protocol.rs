//! # IPC Protocol
//!
//! Message types for engine <-> client communication over Unix socket.
//!
//! Uses length-prefixed JSON framing:
//! - 4 bytes: message length (big-endian u32)
//! - N bytes: JSON payload

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::engine::{Event, UiAction};
use crate::features::notify::{EngineSnapshot, Severity};
use crate::features::voice::RecognitionErrorKind;

/// Largest accepted frame body
pub const MAX_MESSAGE_SIZE: usize = 10 * 1024 * 1024;

// ============================================================================
// Engine -> Client Events
// ============================================================================

/// Events broadcast from the engine to connected clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EngineEvent {
    /// Single-line status replaced
    Status { text: String },
    /// Line appended to the activity log
    Log { text: String, severity: Severity },
    /// Activity log emptied
    ClearLog,
    /// Utterance for the speech client to queue
    Speak { text: String },
    /// Drop queued and in-flight speech
    CancelSpeech,
    /// Open one recognition session
    StartListening,
    /// Medication list re-rendered
    MedicationList { items: Vec<String> },
    /// Response to GetStatus
    Snapshot { snapshot: EngineSnapshot },
    /// A client command could not be accepted
    CommandRejected { reason: String },
    /// Heartbeat to keep connection alive
    Heartbeat { timestamp: i64 },
}

// ============================================================================
// Client -> Engine Commands
// ============================================================================

/// Commands sent from clients to the engine. Operator actions and speech
/// client results share one stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientCommand {
    AddMedication { name: String },
    RemoveMedication { index: usize },
    StartReminder { time: String },
    AddMedicationByVoice,
    RespondToReminder,
    /// Final transcript of a recognition session
    Transcript { text: String },
    /// Recognition failed with an error class such as `no-speech`
    RecognitionError { error: String },
    /// Recognition session closed
    RecognitionEnded,
    /// Request current status
    GetStatus,
    /// Heartbeat response
    Pong { timestamp: i64 },
}

impl ClientCommand {
    /// Engine event for this command, if it is one the engine handles
    pub fn into_event(self) -> Option<Event> {
        let event = match self {
            ClientCommand::AddMedication { name } => UiAction::AddMedication { name }.into(),
            ClientCommand::RemoveMedication { index } => {
                UiAction::RemoveMedication { index }.into()
            }
            ClientCommand::StartReminder { time } => UiAction::StartReminder { time }.into(),
            ClientCommand::AddMedicationByVoice => UiAction::AddMedicationByVoice.into(),
            ClientCommand::RespondToReminder => UiAction::RespondToReminder.into(),
            ClientCommand::GetStatus => UiAction::RequestStatus.into(),
            ClientCommand::Transcript { text } => Event::TranscriptReceived(text),
            ClientCommand::RecognitionError { error } => {
                Event::RecognitionErrorOccurred(RecognitionErrorKind::from(error.as_str()))
            }
            ClientCommand::RecognitionEnded => Event::RecognitionEnded,
            ClientCommand::Pong { .. } => return None,
        };
        Some(event)
    }
}

// ============================================================================
// Framing - Length-prefixed JSON messages
// ============================================================================

/// Encode a message with length prefix
pub fn encode_message<T: Serialize>(msg: &T) -> Result<Vec<u8>> {
    let json = serde_json::to_vec(msg)?;
    if json.len() > MAX_MESSAGE_SIZE {
        return Err(anyhow!("Message too large: {} bytes", json.len()));
    }
    let len = json.len() as u32;
    let mut buf = Vec::with_capacity(4 + json.len());
    buf.extend_from_slice(&len.to_be_bytes());
    buf.extend_from_slice(&json);
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::voice::InteractionMode;
    use serde::de::DeserializeOwned;

    /// Split one frame back into its message
    fn decode<T: DeserializeOwned>(frame: &[u8]) -> T {
        let (len, body) = frame.split_at(4);
        assert_eq!(u32::from_be_bytes(len.try_into().unwrap()) as usize, body.len());
        serde_json::from_slice(body).unwrap()
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let event = EngineEvent::Heartbeat { timestamp: 12345 };
        let encoded = encode_message(&event).unwrap();

        let decoded: EngineEvent = decode(&encoded);

        match decoded {
            EngineEvent::Heartbeat { timestamp } => assert_eq!(timestamp, 12345),
            _ => panic!("Wrong event type"),
        }
    }

    #[test]
    fn test_length_prefix_is_big_endian() {
        let encoded = encode_message(&ClientCommand::GetStatus).unwrap();
        let body = &encoded[4..];
        assert_eq!(&encoded[..4], &(body.len() as u32).to_be_bytes());
        assert_eq!(body, br#"{"type":"GetStatus"}"#);
    }

    #[test]
    fn test_oversized_message_is_rejected() {
        let event = EngineEvent::Speak {
            text: "a".repeat(MAX_MESSAGE_SIZE),
        };
        let err = encode_message(&event).unwrap_err();
        assert!(err.to_string().contains("too large"));
    }

    #[test]
    fn test_command_serialization() {
        let cmd = ClientCommand::StartReminder {
            time: "09:30".to_string(),
        };

        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains("StartReminder"));
        assert!(json.contains("09:30"));
    }

    #[test]
    fn test_log_event_severity_is_lowercase() {
        let json = serde_json::to_string(&EngineEvent::Log {
            text: "Medications confirmed by patient.".to_string(),
            severity: Severity::Ok,
        })
        .unwrap();
        assert!(json.contains(r#""severity":"ok""#));
    }

    #[test]
    fn test_snapshot_event_roundtrip() {
        let event = EngineEvent::Snapshot {
            snapshot: EngineSnapshot {
                status: "Idle (Tap mic to speak)".to_string(),
                mode: InteractionMode::Confirmation,
                missed_confirmations: 2,
                medications: vec!["Metformin 500mg".to_string()],
                reminder_time: Some("18:00".to_string()),
                next_fire: None,
            },
        };
        let decoded: EngineEvent = decode(&encode_message(&event).unwrap());
        assert_eq!(decoded, event);
    }

    #[test]
    fn test_commands_map_to_engine_events() {
        assert_eq!(
            ClientCommand::RemoveMedication { index: 1 }.into_event(),
            Some(Event::UiActionInvoked(UiAction::RemoveMedication { index: 1 }))
        );
        assert_eq!(
            ClientCommand::GetStatus.into_event(),
            Some(Event::UiActionInvoked(UiAction::RequestStatus))
        );
        assert_eq!(
            ClientCommand::RecognitionError {
                error: "not-allowed".to_string()
            }
            .into_event(),
            Some(Event::RecognitionErrorOccurred(
                RecognitionErrorKind::PermissionDenied
            ))
        );
        assert_eq!(ClientCommand::Pong { timestamp: 1 }.into_event(), None);
    }
}
