//! Recording collaborators for engine tests

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use super::clock::Clock;
use crate::core::VoiceError;
use crate::features::notify::{EngineSnapshot, Notifier, Severity};
use crate::features::voice::VoiceGateway;

/// Clock pinned to a local wall-clock time
pub struct FixedClock(Mutex<DateTime<Local>>);

fn local(wall: NaiveDateTime) -> DateTime<Local> {
    Local.from_local_datetime(&wall).earliest().unwrap()
}

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self(Mutex::new(local(now)))
    }

    pub fn set(&self, now: NaiveDateTime) {
        *self.0.lock().unwrap() = local(now);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        *self.0.lock().unwrap()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Note {
    Status(String),
    Log(String, Severity),
    ClearLog,
    List(Vec<String>),
    Snapshot(EngineSnapshot),
}

#[derive(Default)]
pub struct RecordingNotifier {
    notes: Mutex<Vec<Note>>,
}

impl RecordingNotifier {
    pub fn notes(&self) -> Vec<Note> {
        self.notes.lock().unwrap().clone()
    }

    pub fn statuses(&self) -> Vec<String> {
        self.notes()
            .into_iter()
            .filter_map(|n| match n {
                Note::Status(s) => Some(s),
                _ => None,
            })
            .collect()
    }

    pub fn last_status(&self) -> Option<String> {
        self.statuses().pop()
    }

    pub fn logs(&self) -> Vec<(String, Severity)> {
        self.notes()
            .into_iter()
            .filter_map(|n| match n {
                Note::Log(text, severity) => Some((text, severity)),
                _ => None,
            })
            .collect()
    }

    pub fn logged(&self, needle: &str) -> usize {
        self.logs().iter().filter(|(t, _)| t.contains(needle)).count()
    }

    pub fn clear(&self) {
        self.notes.lock().unwrap().clear();
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn set_status(&self, text: &str) {
        self.notes.lock().unwrap().push(Note::Status(text.to_string()));
    }

    async fn append_log(&self, text: &str, severity: Severity) {
        self.notes
            .lock()
            .unwrap()
            .push(Note::Log(text.to_string(), severity));
    }

    async fn clear_log(&self) {
        self.notes.lock().unwrap().push(Note::ClearLog);
    }

    async fn render_medications(&self, medications: &[String]) {
        self.notes.lock().unwrap().push(Note::List(medications.to_vec()));
    }

    async fn report_snapshot(&self, snapshot: &EngineSnapshot) {
        self.notes
            .lock()
            .unwrap()
            .push(Note::Snapshot(snapshot.clone()));
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceCall {
    Speak(String),
    CancelSpeech,
    Listen,
}

pub struct RecordingVoice {
    calls: Mutex<Vec<VoiceCall>>,
    available: AtomicBool,
}

impl Default for RecordingVoice {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            available: AtomicBool::new(true),
        }
    }
}

impl RecordingVoice {
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<VoiceCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn spoken(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                VoiceCall::Speak(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn said(&self, needle: &str) -> usize {
        self.spoken().iter().filter(|t| t.contains(needle)).count()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}

#[async_trait]
impl VoiceGateway for RecordingVoice {
    async fn speak(&self, text: &str) {
        self.calls
            .lock()
            .unwrap()
            .push(VoiceCall::Speak(text.to_string()));
    }

    async fn cancel_speech(&self) {
        self.calls.lock().unwrap().push(VoiceCall::CancelSpeech);
    }

    async fn start_listening(&self) -> Result<(), VoiceError> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(VoiceError::NoListener);
        }
        self.calls.lock().unwrap().push(VoiceCall::Listen);
        Ok(())
    }
}
